//! HTTP request handlers for the case API.
//!
//! Every route is a JSON POST authenticated with a bearer token. Responses
//! always carry an `error` string, empty on success.

use crate::session::{SessionError, SessionManager};
use crate::views::{payload, LinkView};
use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Path, Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use casebook_domain::{
    Case, Entity, EntityType, Event, File, Kind, ObjectId, Person, RequestContext, TargetSet,
};
use casebook_service::{ServiceError, Services};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Case services
    pub services: Services,
    /// Token verification
    pub session_manager: Arc<SessionManager>,
    /// Deadline applied to each request
    pub request_timeout: Duration,
}

impl AppState {
    fn context(&self, headers: &HeaderMap) -> Result<RequestContext, AppError> {
        let authorization = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        Ok(self
            .session_manager
            .authenticate(authorization, self.request_timeout)?)
    }
}

/// Target ids per kind, as sent by clients
#[derive(Debug, Default, Deserialize)]
pub struct TargetIds {
    /// Event ids
    #[serde(default)]
    pub event_ids: Vec<ObjectId>,
    /// Person ids
    #[serde(default)]
    pub person_ids: Vec<ObjectId>,
    /// Entity ids
    #[serde(default)]
    pub entity_ids: Vec<ObjectId>,
    /// File ids
    #[serde(default)]
    pub file_ids: Vec<ObjectId>,
}

impl TargetIds {
    fn to_targets(&self) -> TargetSet {
        TargetSet {
            events: self.event_ids.clone(),
            persons: self.person_ids.clone(),
            entities: self.entity_ids.clone(),
            files: self.file_ids.clone(),
        }
    }
}

/// Link.Create request
#[derive(Debug, Deserialize)]
pub struct CreateLinkRequest {
    /// Case the link belongs to
    pub case_id: ObjectId,
    /// Owner record
    pub from_id: ObjectId,
    /// Kind of the owner record
    pub from_kind: Kind,
    /// Records to link
    #[serde(flatten)]
    pub targets: TargetIds,
    /// Also create one reverse link per target
    #[serde(default)]
    pub bidirectional: bool,
}

/// Link.Create response
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateLinkResponse {
    /// The new link
    pub linked: LinkView,
    /// Ids of the reverse links, if any
    pub mirror_ids: Vec<ObjectId>,
    /// Empty on success
    pub error: String,
}

/// Reference to a record or link in a case
#[derive(Debug, Deserialize)]
pub struct RecordRef {
    /// Record identifier
    pub id: ObjectId,
    /// Owning case
    pub case_id: ObjectId,
}

/// Link.Get response
#[derive(Debug, Serialize, Deserialize)]
pub struct LinkResponse {
    /// The link
    pub link: LinkView,
    /// Empty on success
    pub error: String,
}

/// Link.Add / Link.Remove request
#[derive(Debug, Deserialize)]
pub struct LinkTargetsRequest {
    /// Link identifier
    pub id: ObjectId,
    /// Owning case
    pub case_id: ObjectId,
    /// Records to add or remove
    #[serde(flatten)]
    pub targets: TargetIds,
}

/// Link.Add response
#[derive(Debug, Serialize, Deserialize)]
pub struct AddLinksResponse {
    /// The updated link
    pub added_links: LinkView,
    /// Empty on success
    pub error: String,
}

/// Link.Remove response
#[derive(Debug, Serialize, Deserialize)]
pub struct RemoveLinksResponse {
    /// The updated link
    pub removed_links: LinkView,
    /// Empty on success
    pub error: String,
}

/// Keywords.Add / Keywords.Remove request
#[derive(Debug, Deserialize)]
pub struct KeywordsRequest {
    /// Owner record
    pub id: ObjectId,
    /// Owning case
    pub case_id: ObjectId,
    /// Keyword names
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Keywords.Add response
#[derive(Debug, Serialize, Deserialize)]
pub struct AddKeywordsResponse {
    /// Whether the keywords were applied
    pub ok: bool,
    /// Empty on success
    pub error: String,
}

/// Response with nothing but the error string
#[derive(Debug, Serialize, Deserialize)]
pub struct EmptyResponse {
    /// Empty on success
    pub error: String,
}

impl EmptyResponse {
    fn ok() -> Json<Self> {
        Json(Self {
            error: String::new(),
        })
    }
}

/// Case.Keywords request
#[derive(Debug, Deserialize)]
pub struct CaseKeywordsRequest {
    /// Case identifier
    pub id: ObjectId,
}

/// Case.Keywords response
#[derive(Debug, Serialize, Deserialize)]
pub struct CaseKeywordsResponse {
    /// Keyword names, most recently modified first
    pub keywords: Vec<String>,
    /// Empty on success
    pub error: String,
}

/// Case creation request
#[derive(Debug, Deserialize)]
pub struct CreateCaseRequest {
    /// Display name
    pub name: String,
    /// Additional investigators; the caller is always added
    #[serde(default)]
    pub investigators: Vec<String>,
}

/// Case response
#[derive(Debug, Serialize, Deserialize)]
pub struct CaseResponse {
    /// The case
    pub case: Case,
    /// Empty on success
    pub error: String,
}

/// Record creation request; which fields apply depends on the kind
#[derive(Debug, Deserialize)]
pub struct CreateObjectRequest {
    /// Owning case
    pub case_id: ObjectId,
    /// Event title
    #[serde(default)]
    pub title: Option<String>,
    /// Person, entity or file name
    #[serde(default)]
    pub name: Option<String>,
    /// Event or entity description
    #[serde(default)]
    pub description: String,
    /// When an event occurred (ms)
    #[serde(default)]
    pub occurred_at: Option<u64>,
    /// Person role
    #[serde(default)]
    pub role: String,
    /// Person notes
    #[serde(default)]
    pub notes: String,
    /// Entity type
    #[serde(default)]
    pub entity_type: EntityType,
    /// File MIME type
    #[serde(default)]
    pub content_type: String,
    /// File size in bytes
    #[serde(default)]
    pub size: u64,
}

impl CreateObjectRequest {
    fn label(&self) -> Result<String, AppError> {
        self.title
            .clone()
            .or_else(|| self.name.clone())
            .filter(|label| !label.trim().is_empty())
            .ok_or_else(|| AppError::BadRequest("name or title is required".to_string()))
    }
}

/// Record response
#[derive(Debug, Serialize, Deserialize)]
pub struct ObjectResponse {
    /// Kind of the record
    pub kind: Kind,
    /// The record
    pub object: Value,
    /// Empty on success
    pub error: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Service-level failure
    Service(ServiceError),
    /// Missing or invalid credentials
    Session(SessionError),
    /// Malformed request
    BadRequest(String),
    /// Internal server error
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Service(e) => {
                let status = match e {
                    ServiceError::NotAllowed(_) => StatusCode::FORBIDDEN,
                    ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                    ServiceError::CannotPerformOperation(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, e.to_string())
            }
            AppError::Session(e) => (StatusCode::UNAUTHORIZED, e.to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            debug!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        AppError::Service(e)
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        AppError::Session(e)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::BadRequest(e.body_text())
    }
}

/// JSON request body whose rejections render as [`ErrorResponse`]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

fn parse_kind(kind: &str) -> Result<Kind, AppError> {
    Kind::parse(kind).ok_or_else(|| AppError::BadRequest(format!("unknown record kind: {kind}")))
}

/// POST /link/create
async fn create_link(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<CreateLinkRequest>,
) -> Result<Json<CreateLinkResponse>, AppError> {
    let ctx = state.context(&headers)?;
    let linked = state
        .services
        .links
        .create(
            &ctx,
            request.case_id,
            request.from_kind,
            request.from_id,
            &request.targets.to_targets(),
            request.bidirectional,
        )
        .await?;

    Ok(Json(CreateLinkResponse {
        mirror_ids: linked.mirrors.iter().map(|m| m.id).collect(),
        linked: LinkView::from_link(linked.link)?,
        error: String::new(),
    }))
}

/// POST /link/get
async fn get_link(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<RecordRef>,
) -> Result<Json<LinkResponse>, AppError> {
    let ctx = state.context(&headers)?;
    let link = state.services.links.get(&ctx, request.case_id, request.id).await?;
    Ok(Json(LinkResponse {
        link: LinkView::from_link(link)?,
        error: String::new(),
    }))
}

/// POST /link/add
async fn add_links(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<LinkTargetsRequest>,
) -> Result<Json<AddLinksResponse>, AppError> {
    let ctx = state.context(&headers)?;
    let link = state
        .services
        .links
        .add(&ctx, request.case_id, request.id, &request.targets.to_targets())
        .await?;
    Ok(Json(AddLinksResponse {
        added_links: LinkView::from_link(link)?,
        error: String::new(),
    }))
}

/// POST /link/remove
async fn remove_links(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<LinkTargetsRequest>,
) -> Result<Json<RemoveLinksResponse>, AppError> {
    let ctx = state.context(&headers)?;
    let link = state
        .services
        .links
        .remove(&ctx, request.case_id, request.id, &request.targets.to_targets())
        .await?;
    Ok(Json(RemoveLinksResponse {
        removed_links: LinkView::from_link(link)?,
        error: String::new(),
    }))
}

/// POST /link/delete
async fn delete_link(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<RecordRef>,
) -> Result<Json<EmptyResponse>, AppError> {
    let ctx = state.context(&headers)?;
    state
        .services
        .links
        .delete(&ctx, request.case_id, request.id)
        .await?;
    Ok(EmptyResponse::ok())
}

/// POST /:kind/keywords/add
async fn add_keywords(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<KeywordsRequest>,
) -> Result<Json<AddKeywordsResponse>, AppError> {
    let kind = parse_kind(&kind)?;
    let ctx = state.context(&headers)?;
    let ok = state
        .services
        .keywords
        .add_keywords(&ctx, request.case_id, kind, request.id, &request.keywords)
        .await?;
    Ok(Json(AddKeywordsResponse {
        ok,
        error: String::new(),
    }))
}

/// POST /:kind/keywords/remove
async fn remove_keywords(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<KeywordsRequest>,
) -> Result<Json<EmptyResponse>, AppError> {
    let kind = parse_kind(&kind)?;
    let ctx = state.context(&headers)?;
    state
        .services
        .keywords
        .remove_keywords(&ctx, request.case_id, kind, request.id, &request.keywords)
        .await?;
    Ok(EmptyResponse::ok())
}

/// POST /case/keywords
async fn case_keywords(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<CaseKeywordsRequest>,
) -> Result<Json<CaseKeywordsResponse>, AppError> {
    let ctx = state.context(&headers)?;
    let keywords = state.services.cases.case_keywords(&ctx, request.id).await?;
    Ok(Json(CaseKeywordsResponse {
        keywords,
        error: String::new(),
    }))
}

/// POST /case/create
async fn create_case(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<CreateCaseRequest>,
) -> Result<Json<CaseResponse>, AppError> {
    if request.name.trim().is_empty() {
        return Err(AppError::BadRequest("case name is required".to_string()));
    }
    let ctx = state.context(&headers)?;
    let case = state
        .services
        .cases
        .create_case(&ctx, &request.name, request.investigators)
        .await?;
    Ok(Json(CaseResponse {
        case,
        error: String::new(),
    }))
}

/// POST /:kind/create
async fn create_object(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<CreateObjectRequest>,
) -> Result<Json<ObjectResponse>, AppError> {
    let kind = parse_kind(&kind)?;
    let ctx = state.context(&headers)?;
    let label = request.label()?;
    let objects = &state.services.objects;
    let case_id = request.case_id;

    let object = match kind {
        Kind::Event => {
            let mut event = Event::new(case_id, label);
            event.description = request.description;
            event.occurred_at = request.occurred_at;
            serde_json::to_value(objects.create(&ctx, event).await?)?
        }
        Kind::Person => {
            let mut person = Person::new(case_id, label);
            person.role = request.role;
            person.notes = request.notes;
            serde_json::to_value(objects.create(&ctx, person).await?)?
        }
        Kind::Entity => {
            let mut entity = Entity::new(case_id, label, request.entity_type);
            entity.description = request.description;
            serde_json::to_value(objects.create(&ctx, entity).await?)?
        }
        Kind::File => {
            let file = File::new(case_id, label, request.content_type, request.size);
            serde_json::to_value(objects.create(&ctx, file).await?)?
        }
    };

    Ok(Json(ObjectResponse {
        kind,
        object,
        error: String::new(),
    }))
}

/// POST /:kind/get
async fn get_object(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<RecordRef>,
) -> Result<Json<ObjectResponse>, AppError> {
    let kind = parse_kind(&kind)?;
    let ctx = state.context(&headers)?;
    let object = state
        .services
        .objects
        .get_linkable(&ctx, request.case_id, kind, request.id)
        .await?;
    Ok(Json(ObjectResponse {
        kind,
        object: payload(&object)?,
        error: String::new(),
    }))
}

/// POST /:kind/delete
async fn delete_object(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<RecordRef>,
) -> Result<Json<EmptyResponse>, AppError> {
    let kind = parse_kind(&kind)?;
    let ctx = state.context(&headers)?;
    state
        .services
        .objects
        .delete_kind(&ctx, request.case_id, kind, request.id)
        .await?;
    Ok(EmptyResponse::ok())
}

/// GET /health - Liveness check
async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
    })
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/link/create", post(create_link))
        .route("/link/get", post(get_link))
        .route("/link/add", post(add_links))
        .route("/link/remove", post(remove_links))
        .route("/link/delete", post(delete_link))
        .route("/case/create", post(create_case))
        .route("/case/keywords", post(case_keywords))
        .route("/:kind/keywords/add", post(add_keywords))
        .route("/:kind/keywords/remove", post(remove_keywords))
        .route("/:kind/create", post(create_object))
        .route("/:kind/get", post(get_object))
        .route("/:kind/delete", post(delete_object))
        .route("/health", get(health_check))
        .with_state(state)
}
