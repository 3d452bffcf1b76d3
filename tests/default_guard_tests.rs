/// Default term guard tests
///
/// One default per kind, and the protection it grants.
/// Run with: cargo test --test default_guard_tests

use std::sync::Arc;
use term_lifecycle::{
    Command, EngineConfig, EntityId, EntityStore, Kind, LifecycleError, MemoryEntityStore,
    Status, TermEngine,
};

async fn setup(kind: Kind, names: &[&str]) -> (Arc<MemoryEntityStore>, TermEngine, Vec<EntityId>) {
    let store = Arc::new(MemoryEntityStore::new());
    let engine = TermEngine::with_store(store.clone(), &EngineConfig::new());
    let mut ids = Vec::new();
    for name in names {
        ids.push(store.create(kind, name).await.unwrap());
    }
    (store, engine, ids)
}

#[tokio::test]
async fn test_promotion_moves_the_flag() {
    let (_store, engine, ids) = setup(Kind::Category, &["A", "B", "C"]).await;
    let (a, b) = (ids[0], ids[1]);

    engine.defaults.promote_to_default(Kind::Category, a).await.unwrap();
    assert_eq!(engine.defaults.current_default(Kind::Category).await.unwrap(), Some(a));

    engine.defaults.promote_to_default(Kind::Category, b).await.unwrap();
    assert_eq!(engine.defaults.current_default(Kind::Category).await.unwrap(), Some(b));
    assert!(!engine.defaults.is_protected(Kind::Category, a).await.unwrap());
    assert_eq!(engine.defaults.default_count(Kind::Category).await.unwrap(), 1);
}

#[tokio::test]
async fn test_at_most_one_default_over_any_sequence() {
    let (_store, engine, ids) = setup(Kind::Tag, &["A", "B", "C", "D"]).await;
    let sequence = [0usize, 2, 2, 1, 3, 0, 3, 1];

    for index in sequence {
        engine.defaults.promote_to_default(Kind::Tag, ids[index]).await.unwrap();
        assert_eq!(engine.defaults.default_count(Kind::Tag).await.unwrap(), 1);
        assert_eq!(
            engine.defaults.current_default(Kind::Tag).await.unwrap(),
            Some(ids[index])
        );
    }
}

#[tokio::test]
async fn test_promoting_the_default_again_changes_nothing() {
    let (_store, engine, ids) = setup(Kind::Ribbon, &["A"]).await;
    engine.defaults.promote_to_default(Kind::Ribbon, ids[0]).await.unwrap();
    engine.defaults.promote_to_default(Kind::Ribbon, ids[0]).await.unwrap();
    assert_eq!(engine.defaults.default_count(Kind::Ribbon).await.unwrap(), 1);
}

#[tokio::test]
async fn test_default_blocks_protected_commands() {
    let (_store, engine, ids) = setup(Kind::Category, &["Uncategorized"]).await;
    let id = ids[0];
    engine.defaults.promote_to_default(Kind::Category, id).await.unwrap();

    for command in [
        Command::MoveToDraft,
        Command::MoveToTrash,
        Command::DeletePermanently,
        Command::SetStatus(Status::Draft),
        Command::SetStatus(Status::Published),
    ] {
        let err = engine.lifecycle.apply(Kind::Category, id, command).await.unwrap_err();
        assert_eq!(err, LifecycleError::DefaultProtected { kind: Kind::Category, id });
        assert_eq!(err.to_string(), "Cannot change status of default category.");
    }
    assert_eq!(engine.lifecycle.status(Kind::Category, id).await.unwrap(), Status::Published);
}

#[tokio::test]
async fn test_demoted_term_can_be_trashed() {
    let (_store, engine, ids) = setup(Kind::Tag, &["Main"]).await;
    let id = ids[0];
    engine.defaults.promote_to_default(Kind::Tag, id).await.unwrap();
    engine.defaults.demote(Kind::Tag, id).await.unwrap();

    assert_eq!(engine.defaults.current_default(Kind::Tag).await.unwrap(), None);
    let outcome = engine.lifecycle.apply(Kind::Tag, id, Command::MoveToTrash).await.unwrap();
    assert_eq!(outcome.status(), Some(Status::Trashed));
}

#[tokio::test]
async fn test_trashed_term_cannot_become_default() {
    let (_store, engine, ids) = setup(Kind::Ribbon, &["Old"]).await;
    let id = ids[0];
    engine.lifecycle.apply(Kind::Ribbon, id, Command::MoveToTrash).await.unwrap();

    let err = engine.defaults.promote_to_default(Kind::Ribbon, id).await.unwrap_err();
    assert!(matches!(
        err,
        LifecycleError::InvalidCommand { status: Status::Trashed, .. }
    ));
    assert_eq!(engine.defaults.default_count(Kind::Ribbon).await.unwrap(), 0);
}

#[tokio::test]
async fn test_default_in_trash_can_still_be_restored() {
    // Only reachable by editing the store directly.
    let (store, engine, ids) = setup(Kind::Category, &["Legacy"]).await;
    let id = ids[0];
    store.set_meta(Kind::Category, id, "_aps_category_status", "trashed").await.unwrap();
    store.set_meta(Kind::Category, id, "_aps_category_is_default", "1").await.unwrap();

    let err = engine
        .lifecycle
        .apply(Kind::Category, id, Command::DeletePermanently)
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::DefaultProtected { .. }));

    let outcome = engine.lifecycle.apply(Kind::Category, id, Command::Restore).await.unwrap();
    assert_eq!(outcome.status(), Some(Status::Published));
}

#[tokio::test]
async fn test_defaults_are_per_kind() {
    let store = Arc::new(MemoryEntityStore::new());
    let engine = TermEngine::with_store(store.clone(), &EngineConfig::new());
    let category = store.create(Kind::Category, "Main").await.unwrap();
    let tag = store.create(Kind::Tag, "Main").await.unwrap();

    engine.defaults.promote_to_default(Kind::Category, category).await.unwrap();
    engine.defaults.promote_to_default(Kind::Tag, tag).await.unwrap();

    assert_eq!(engine.defaults.current_default(Kind::Category).await.unwrap(), Some(category));
    assert_eq!(engine.defaults.current_default(Kind::Tag).await.unwrap(), Some(tag));
}

#[tokio::test]
async fn test_promoting_a_missing_term_fails() {
    let (_store, engine, _ids) = setup(Kind::Tag, &[]).await;
    let err = engine
        .defaults
        .promote_to_default(Kind::Tag, EntityId(99))
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::NotFound { .. }));
}
