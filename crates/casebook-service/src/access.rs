use crate::{Result, ServiceError};
use casebook_domain::{CaseId, RequestContext};
use casebook_gatekeeper::AccessGate;

/// Consult the gate for the calling principal
pub(crate) async fn authorize(
    gate: &dyn AccessGate,
    ctx: &RequestContext,
    case_id: CaseId,
) -> Result<()> {
    if gate.is_allowed(ctx, case_id, ctx.email()).await? {
        Ok(())
    } else {
        Err(ServiceError::NotAllowed(format!(
            "{} is not an investigator on case {case_id}",
            ctx.email()
        )))
    }
}
