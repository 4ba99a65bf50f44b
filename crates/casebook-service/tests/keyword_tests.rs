//! Integration tests for keyword reference counting

mod common;

use casebook_domain::{Collection, Event, Keyword, Kind, Namespace, ObjectId, Person};
use casebook_service::{RetryConfig, ServiceError};
use casebook_store::{DocumentStore, KeywordStore, MemoryStore};
use common::{ctx, names, stranger, Fault, FaultyStore, Harness};
use std::sync::Arc;

async fn keyword(h: &Harness, name: &str) -> Option<Keyword> {
    let store: Arc<dyn DocumentStore> = h.memory.clone();
    KeywordStore::new(store)
        .get(&ctx(), h.case.id, name)
        .await
        .unwrap()
        .map(|v| v.value)
}

async fn event(h: &Harness, id: ObjectId) -> Event {
    h.services.objects.get::<Event>(&ctx(), h.case.id, id).await.unwrap()
}

#[tokio::test]
async fn test_keyword_lifecycle_across_three_events() {
    let h = Harness::new().await;
    let e1 = h.event("same").await;
    let e2 = h.event("same").await;
    let e3 = h.event("same").await;
    let kw = &h.services.keywords;

    assert!(kw
        .add_keywords(&ctx(), h.case.id, Kind::Event, e1.id, &names(&["healthy", "green"]))
        .await
        .unwrap());
    kw.add_keywords(&ctx(), h.case.id, Kind::Event, e2.id, &names(&["healthy", "green", "boom"]))
        .await
        .unwrap();
    kw.add_keywords(
        &ctx(),
        h.case.id,
        Kind::Event,
        e3.id,
        &names(&["healthy", "green", "boom", "sauce"]),
    )
    .await
    .unwrap();

    assert_eq!(h.keywords().await, names(&["sauce", "boom", "green", "healthy"]));

    kw.remove_keywords(&ctx(), h.case.id, Kind::Event, e3.id, &names(&["sauce"]))
        .await
        .unwrap();
    assert_eq!(h.keywords().await.len(), 3);
    assert_eq!(event(&h, e3.id).await.keywords, names(&["healthy", "green", "boom"]));
    assert!(keyword(&h, "sauce").await.is_none());

    let objects = &h.services.objects;
    objects.delete::<Event>(&ctx(), h.case.id, e3.id).await.unwrap();
    assert_eq!(h.keywords().await.len(), 3);

    objects.delete::<Event>(&ctx(), h.case.id, e1.id).await.unwrap();
    assert_eq!(h.keywords().await.len(), 3);
    assert_eq!(keyword(&h, "healthy").await.unwrap().references(Kind::Event), [e2.id]);

    objects.delete::<Event>(&ctx(), h.case.id, e2.id).await.unwrap();
    assert!(h.keywords().await.is_empty());
}

#[tokio::test]
async fn test_add_grows_case_by_new_names_and_owner_by_all() {
    let h = Harness::new().await;
    let ada = h.person("Ada").await;
    let bob = h.person("Bob").await;
    let kw = &h.services.keywords;

    kw.add_keywords(&ctx(), h.case.id, Kind::Person, ada.id, &names(&["witness", "dock"]))
        .await
        .unwrap();
    let before_case = h.keywords().await.len();

    // K = 2 new ("night", "boat"), M = 4
    kw.add_keywords(
        &ctx(),
        h.case.id,
        Kind::Person,
        bob.id,
        &names(&["witness", "night", "dock", "boat"]),
    )
    .await
    .unwrap();
    assert_eq!(h.keywords().await.len(), before_case + 2);

    // K = 0, M = 2, duplicates on the owner allowed
    kw.add_keywords(&ctx(), h.case.id, Kind::Person, bob.id, &names(&["night", "night"]))
        .await
        .unwrap();
    assert_eq!(h.keywords().await.len(), before_case + 2);

    let bob = h.services.objects.get::<Person>(&ctx(), h.case.id, bob.id).await.unwrap();
    assert_eq!(
        bob.keywords,
        names(&["witness", "night", "dock", "boat", "night", "night"])
    );
    assert_eq!(
        keyword(&h, "night").await.unwrap().references(Kind::Person),
        [bob.id, bob.id, bob.id]
    );
}

#[tokio::test]
async fn test_remove_strips_adjacent_duplicates() {
    let h = Harness::new().await;
    let photo = h.file("photo.png").await;
    let kw = &h.services.keywords;

    kw.add_keywords(
        &ctx(),
        h.case.id,
        Kind::File,
        photo.id,
        &names(&["blurry", "blurry", "night", "blurry"]),
    )
    .await
    .unwrap();

    kw.remove_keywords(&ctx(), h.case.id, Kind::File, photo.id, &names(&["blurry"]))
        .await
        .unwrap();

    let photo = h
        .services
        .objects
        .get::<casebook_domain::File>(&ctx(), h.case.id, photo.id)
        .await
        .unwrap();
    assert_eq!(photo.keywords, names(&["night"]));
    assert!(keyword(&h, "blurry").await.is_none());
    assert_eq!(h.keywords().await, names(&["night"]));
}

#[tokio::test]
async fn test_keyword_shared_across_kinds() {
    let h = Harness::new().await;
    let fire = h.event("fire").await;
    let acme = h.entity("Acme").await;
    let kw = &h.services.keywords;

    kw.add_keywords(&ctx(), h.case.id, Kind::Event, fire.id, &names(&["arson"]))
        .await
        .unwrap();
    kw.add_keywords(&ctx(), h.case.id, Kind::Entity, acme.id, &names(&["arson"]))
        .await
        .unwrap();

    let arson = keyword(&h, "arson").await.unwrap();
    assert_eq!(arson.references(Kind::Event), [fire.id]);
    assert_eq!(arson.references(Kind::Entity), [acme.id]);

    kw.remove_keywords(&ctx(), h.case.id, Kind::Event, fire.id, &names(&["arson"]))
        .await
        .unwrap();
    let arson = keyword(&h, "arson").await.unwrap();
    assert!(arson.references(Kind::Event).is_empty());
    assert_eq!(arson.reference_count(), 1);

    h.services
        .objects
        .delete_kind(&ctx(), h.case.id, Kind::Entity, acme.id)
        .await
        .unwrap();
    assert!(keyword(&h, "arson").await.is_none());
}

#[tokio::test]
async fn test_names_are_trimmed_and_blanks_ignored() {
    let h = Harness::new().await;
    let fire = h.event("fire").await;

    h.services
        .keywords
        .add_keywords(&ctx(), h.case.id, Kind::Event, fire.id, &names(&["  smoke ", "", "   "]))
        .await
        .unwrap();

    assert_eq!(event(&h, fire.id).await.keywords, names(&["smoke"]));
    assert_eq!(h.keywords().await, names(&["smoke"]));
}

#[tokio::test]
async fn test_removing_unknown_names_is_noop() {
    let h = Harness::new().await;
    let fire = h.event("fire").await;
    let kw = &h.services.keywords;

    kw.add_keywords(&ctx(), h.case.id, Kind::Event, fire.id, &names(&["smoke"]))
        .await
        .unwrap();
    kw.remove_keywords(&ctx(), h.case.id, Kind::Event, fire.id, &names(&["ghost"]))
        .await
        .unwrap();

    assert_eq!(event(&h, fire.id).await.keywords, names(&["smoke"]));
    assert_eq!(h.keywords().await, names(&["smoke"]));
}

#[tokio::test]
async fn test_recently_touched_keyword_sorts_first() {
    let h = Harness::new().await;
    let e1 = h.event("one").await;
    let e2 = h.event("two").await;
    let kw = &h.services.keywords;

    kw.add_keywords(&ctx(), h.case.id, Kind::Event, e1.id, &names(&["alpha", "beta"]))
        .await
        .unwrap();
    assert_eq!(h.keywords().await, names(&["beta", "alpha"]));

    kw.add_keywords(&ctx(), h.case.id, Kind::Event, e2.id, &names(&["alpha"]))
        .await
        .unwrap();
    assert_eq!(h.keywords().await, names(&["alpha", "beta"]));
}

#[tokio::test]
async fn test_missing_owner_is_not_found() {
    let h = Harness::new().await;
    let fire = h.event("fire").await;

    let err = h
        .services
        .keywords
        .add_keywords(&ctx(), h.case.id, Kind::Person, fire.id, &names(&["smoke"]))
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("not found: person"));
    assert!(h.keywords().await.is_empty());

    let err = h
        .services
        .keywords
        .remove_keywords(&ctx(), h.case.id, Kind::Event, ObjectId::new(), &names(&["smoke"]))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_stranger_cannot_tag_or_list() {
    let h = Harness::new().await;
    let fire = h.event("fire").await;

    let err = h
        .services
        .keywords
        .add_keywords(&stranger(), h.case.id, Kind::Event, fire.id, &names(&["smoke"]))
        .await
        .unwrap_err();
    assert!(err.is_not_allowed());

    let err = h
        .services
        .cases
        .case_keywords(&stranger(), h.case.id)
        .await
        .unwrap_err();
    assert!(err.is_not_allowed());
    assert!(event(&h, fire.id).await.keywords.is_empty());
}

#[tokio::test]
async fn test_owner_write_failure_aborts_after_keywords() {
    let memory = Arc::new(MemoryStore::new());
    let store: Arc<dyn DocumentStore> =
        Arc::new(FaultyStore::new(Arc::clone(&memory), Fault::FailReplace("/events")));
    let h = Harness::with_store(memory, store, RetryConfig::eager()).await;
    let fire = h.event("fire").await;

    let err = h
        .services
        .keywords
        .add_keywords(&ctx(), h.case.id, Kind::Event, fire.id, &names(&["smoke"]))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ServiceError::CannotPerformOperation("store task failed: disk unplugged".to_string())
    );

    // Keyword written, owner not: no rollback
    assert_eq!(h.keywords().await, names(&["smoke"]));
    assert!(event(&h, fire.id).await.keywords.is_empty());
}

#[tokio::test]
async fn test_keywords_live_in_case_namespace() {
    let h = Harness::new().await;
    let fire = h.event("fire").await;
    h.services
        .keywords
        .add_keywords(&ctx(), h.case.id, Kind::Event, fire.id, &names(&["smoke"]))
        .await
        .unwrap();

    let ns = Namespace::scoped(h.case.id, Collection::Keywords);
    assert_eq!(h.memory.count(&ns).await, 1);
    let other = Namespace::scoped(ObjectId::new(), Collection::Keywords);
    assert_eq!(h.memory.count(&other).await, 0);
}

async fn faulty_harness(fault: Fault) -> (Harness, Arc<FaultyStore>) {
    let memory = Arc::new(MemoryStore::new());
    let faulty = Arc::new(FaultyStore::new(Arc::clone(&memory), fault));
    let store: Arc<dyn DocumentStore> = faulty.clone();
    let h = Harness::with_store(memory, store, RetryConfig::eager()).await;
    (h, faulty)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_use_of_shared_keyword() {
    let memory = Arc::new(MemoryStore::new());
    let store: Arc<dyn DocumentStore> = memory.clone();
    let retry = RetryConfig {
        max_attempts: 64,
        base_delay_ms: 1,
        max_delay_ms: 5,
    };
    let h = Harness::with_store(memory, store, retry).await;

    let mut events = Vec::new();
    for i in 0..16 {
        events.push(h.event(&format!("sighting {i}")).await);
    }

    let mut tasks = Vec::new();
    for event in &events {
        let keywords = h.services.keywords.clone();
        let (case_id, id) = (h.case.id, event.id);
        tasks.push(tokio::spawn(async move {
            keywords
                .add_keywords(&ctx(), case_id, Kind::Event, id, &names(&["shared"]))
                .await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(h.keywords().await, names(&["shared"]));
    let shared = keyword(&h, "shared").await.unwrap();
    assert_eq!(shared.references(Kind::Event).len(), 16);
    for event in &events {
        assert!(shared.references(Kind::Event).contains(&event.id));
    }

    let mut tasks = Vec::new();
    for event in &events {
        let objects = h.services.objects.clone();
        let (case_id, id) = (h.case.id, event.id);
        tasks.push(tokio::spawn(async move {
            objects.delete::<Event>(&ctx(), case_id, id).await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }
    assert!(h.keywords().await.is_empty());
}

#[tokio::test]
async fn test_keyword_replace_retries_on_conflict() {
    let (h, faulty) = faulty_harness(Fault::ConflictReplacesIn("/keywords", 2)).await;
    let e1 = h.event("first").await;
    let e2 = h.event("second").await;
    let kw = &h.services.keywords;

    kw.add_keywords(&ctx(), h.case.id, Kind::Event, e1.id, &names(&["green"]))
        .await
        .unwrap();
    assert_eq!(faulty.hits(), 0);

    kw.add_keywords(&ctx(), h.case.id, Kind::Event, e2.id, &names(&["green"]))
        .await
        .unwrap();
    assert_eq!(faulty.hits(), 2);
    assert_eq!(
        keyword(&h, "green").await.unwrap().references(Kind::Event),
        [e1.id, e2.id]
    );
    assert_eq!(event(&h, e2.id).await.keywords, names(&["green"]));
}

#[tokio::test]
async fn test_keyword_deleted_before_replace_is_recreated() {
    let (h, faulty) = faulty_harness(Fault::VanishBeforeReplace("/keywords")).await;
    let e1 = h.event("first").await;
    let e2 = h.event("second").await;
    let kw = &h.services.keywords;

    kw.add_keywords(&ctx(), h.case.id, Kind::Event, e1.id, &names(&["green"]))
        .await
        .unwrap();
    kw.add_keywords(&ctx(), h.case.id, Kind::Event, e2.id, &names(&["green"]))
        .await
        .unwrap();

    assert_eq!(faulty.hits(), 1);
    assert_eq!(h.keywords().await, names(&["green"]));
    assert_eq!(keyword(&h, "green").await.unwrap().references(Kind::Event), [e2.id]);
}

#[tokio::test]
async fn test_orphan_delete_retries_on_conflict() {
    let (h, faulty) = faulty_harness(Fault::ConflictDeletesIn("/keywords", 1)).await;
    let fire = h.event("fire").await;
    let kw = &h.services.keywords;

    kw.add_keywords(&ctx(), h.case.id, Kind::Event, fire.id, &names(&["smoke"]))
        .await
        .unwrap();
    kw.remove_keywords(&ctx(), h.case.id, Kind::Event, fire.id, &names(&["smoke"]))
        .await
        .unwrap();

    assert_eq!(faulty.hits(), 1);
    assert!(keyword(&h, "smoke").await.is_none());
    assert!(event(&h, fire.id).await.keywords.is_empty());
}

#[tokio::test]
async fn test_tag_added_during_owner_delete_is_released() {
    let (h, faulty) = faulty_harness(Fault::TagEventBeforeDelete("late")).await;
    let fire = h.event("fire").await;
    h.services
        .keywords
        .add_keywords(&ctx(), h.case.id, Kind::Event, fire.id, &names(&["smoke"]))
        .await
        .unwrap();

    h.services
        .objects
        .delete::<Event>(&ctx(), h.case.id, fire.id)
        .await
        .unwrap();

    assert_eq!(faulty.hits(), 1);
    assert!(h.keywords().await.is_empty());
    assert!(keyword(&h, "late").await.is_none());
    let err = h
        .services
        .objects
        .get::<Event>(&ctx(), h.case.id, fire.id)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}
