//! Audit stamping through a full save against the in-memory store.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use store::{
    Auditable, AuditableEntityInterceptor, Entity, FixedClock, InMemoryStore,
    InMemoryTodoRepository, Repository, TodoEntity, UserId,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap()
}

fn session(
    store: &InMemoryStore,
    clock: &Arc<FixedClock>,
    user: UserId,
) -> InMemoryTodoRepository {
    store.session().with_interceptor(AuditableEntityInterceptor::new(
        clock.clone(),
        Arc::new(user),
    ))
}

#[tokio::test]
async fn batch_save_shares_one_timestamp() {
    let store = InMemoryStore::new();
    let clock = Arc::new(FixedClock::new(t0()));
    let repo = session(&store, &clock, UserId::anonymous());

    let added = repo
        .add_range(
            (0..10)
                .map(|i| TodoEntity::new(format!("item {i}"), i, None, None))
                .collect(),
        )
        .await
        .unwrap();
    assert_eq!(repo.save_changes().await.unwrap(), 10);

    for entity in added {
        let stored = store.find(entity.id()).await.unwrap();
        assert_eq!(stored.audit().last_modified, Some(t0()));
    }
}

#[tokio::test]
async fn first_save_sets_matching_created_and_modified() {
    let store = InMemoryStore::new();
    let clock = Arc::new(FixedClock::new(t0()));
    let user = UserId::from_uuid(uuid::Uuid::new_v4());
    let repo = session(&store, &clock, user);

    let entity = repo
        .add(TodoEntity::new("new", 1, None, None))
        .await
        .unwrap();
    repo.save_changes().await.unwrap();

    let audit = store.find(entity.id()).await.unwrap().audit().clone();
    assert_eq!(audit.created, audit.last_modified);
    assert_eq!(audit.created_by, audit.last_modified_by);
    assert_eq!(audit.created_by, Some(user.to_string()));
}

#[tokio::test]
async fn later_save_only_moves_modification_stamp() {
    let store = InMemoryStore::new();
    let clock = Arc::new(FixedClock::new(t0()));
    let creator = UserId::from_uuid(uuid::Uuid::new_v4());
    let editor = UserId::from_uuid(uuid::Uuid::new_v4());

    let repo = session(&store, &clock, creator);
    let entity = repo
        .add(TodoEntity::new("new", 1, None, None))
        .await
        .unwrap();
    repo.save_changes().await.unwrap();

    clock.advance(Duration::hours(1));
    let repo = session(&store, &clock, editor);
    let mut loaded = repo.get_by_id(entity.id()).await.unwrap().unwrap();
    loaded.title = "edited".to_string();
    repo.update(loaded).await.unwrap();
    repo.save_changes().await.unwrap();

    let audit = store.find(entity.id()).await.unwrap().audit().clone();
    assert_eq!(audit.created, Some(t0()));
    assert_eq!(audit.created_by, Some(creator.to_string()));
    assert_eq!(audit.last_modified, Some(t0() + Duration::hours(1)));
    assert_eq!(audit.last_modified_by, Some(editor.to_string()));
}

#[tokio::test]
async fn untouched_entities_keep_their_stamp() {
    let store = InMemoryStore::new();
    let clock = Arc::new(FixedClock::new(t0()));

    let repo = session(&store, &clock, UserId::anonymous());
    let untouched = repo
        .add(TodoEntity::new("untouched", 1, None, None))
        .await
        .unwrap();
    repo.save_changes().await.unwrap();

    clock.advance(Duration::minutes(10));
    let repo = session(&store, &clock, UserId::anonymous());
    repo.get_by_id(untouched.id()).await.unwrap();
    repo.add(TodoEntity::new("other", 2, None, None))
        .await
        .unwrap();
    assert_eq!(repo.save_changes().await.unwrap(), 1);

    let audit = store.find(untouched.id()).await.unwrap().audit().clone();
    assert_eq!(audit.last_modified, Some(t0()));
}
