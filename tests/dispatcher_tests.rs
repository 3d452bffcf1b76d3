/// Command dispatcher tests
///
/// Token and permission checks ahead of the engine, response messages.
/// Run with: cargo test --test dispatcher_tests

use std::sync::Arc;
use term_lifecycle::dispatch::{
    BULK_ACTION, Permission, ROW_ACTION, TOGGLE_STATUS_ACTION, User,
};
use term_lifecycle::{
    BulkAction, CommandDispatcher, DispatchError, EngineConfig, EntityId, EntityStore, Kind,
    LifecycleError, MemoryAuthority, MemoryEntityStore, RequestContext, RowAction, Status,
    TermEngine,
};

struct Harness {
    store: Arc<MemoryEntityStore>,
    authority: Arc<MemoryAuthority>,
    dispatcher: CommandDispatcher,
}

impl Harness {
    fn new() -> Self {
        let store = Arc::new(MemoryEntityStore::new());
        let engine = TermEngine::with_store(store.clone(), &EngineConfig::new());
        let authority = Arc::new(MemoryAuthority::with_admin("admin"));
        let dispatcher = CommandDispatcher::new(engine, authority.clone());
        Self {
            store,
            authority,
            dispatcher,
        }
    }

    async fn ctx(&self, user: &str, kind: Kind, action: &str) -> RequestContext {
        let token = self
            .authority
            .issue_token(&CommandDispatcher::token_action(kind, action))
            .await;
        RequestContext::new(user, token)
    }
}

#[tokio::test]
async fn test_token_action_names() {
    assert_eq!(
        CommandDispatcher::token_action(Kind::Category, ROW_ACTION),
        "aps_aps_category_row_action"
    );
    assert_eq!(
        CommandDispatcher::token_action(Kind::Ribbon, TOGGLE_STATUS_ACTION),
        "aps_aps_ribbon_toggle_status"
    );
}

#[tokio::test]
async fn test_bad_token_short_circuits() {
    let h = Harness::new();
    let id = h.store.create(Kind::Tag, "Sale").await.unwrap();
    let ctx = RequestContext::new("admin", "forged");

    let err = h
        .dispatcher
        .row_action(&ctx, Kind::Tag, id, RowAction::Trash)
        .await
        .unwrap_err();
    assert_eq!(err, DispatchError::Unauthorized);
    assert_eq!(err.to_string(), "Security check failed.");
    assert_eq!(h.dispatcher.engine().lifecycle.status(Kind::Tag, id).await.unwrap(), Status::Published);
}

#[tokio::test]
async fn test_token_for_another_kind_is_rejected() {
    let h = Harness::new();
    let id = h.store.create(Kind::Tag, "Sale").await.unwrap();
    let ctx = h.ctx("admin", Kind::Category, ROW_ACTION).await;

    let err = h
        .dispatcher
        .row_action(&ctx, Kind::Tag, id, RowAction::Draft)
        .await
        .unwrap_err();
    assert_eq!(err, DispatchError::Unauthorized);
}

#[tokio::test]
async fn test_token_for_another_action_is_rejected() {
    let h = Harness::new();
    let id = h.store.create(Kind::Tag, "Sale").await.unwrap();
    let ctx = h.ctx("admin", Kind::Tag, BULK_ACTION).await;

    let err = h
        .dispatcher
        .toggle_status(&ctx, Kind::Tag, id, Status::Draft)
        .await
        .unwrap_err();
    assert!(err.is_auth_failure());
}

#[tokio::test]
async fn test_permission_is_checked_per_kind() {
    let h = Harness::new();
    h.authority
        .add_user(User::new("editor", vec![Permission::ManageTags]))
        .await;
    let category = h.store.create(Kind::Category, "Books").await.unwrap();
    let tag = h.store.create(Kind::Tag, "Sale").await.unwrap();

    let ctx = h.ctx("editor", Kind::Category, ROW_ACTION).await;
    let err = h
        .dispatcher
        .row_action(&ctx, Kind::Category, category, RowAction::Draft)
        .await
        .unwrap_err();
    assert_eq!(err, DispatchError::Forbidden);

    let ctx = h.ctx("editor", Kind::Tag, ROW_ACTION).await;
    let response = h
        .dispatcher
        .row_action(&ctx, Kind::Tag, tag, RowAction::Draft)
        .await
        .unwrap();
    assert_eq!(response.status, Some(Status::Draft));

    let ctx = h.ctx("nobody", Kind::Tag, ROW_ACTION).await;
    let err = h
        .dispatcher
        .row_action(&ctx, Kind::Tag, tag, RowAction::Trash)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "forbidden");
}

#[tokio::test]
async fn test_toggle_reports_new_status() {
    let h = Harness::new();
    let id = h.store.create(Kind::Ribbon, "Hot").await.unwrap();
    let ctx = h.ctx("admin", Kind::Ribbon, TOGGLE_STATUS_ACTION).await;

    let response = h
        .dispatcher
        .toggle_status(&ctx, Kind::Ribbon, id, Status::Draft)
        .await
        .unwrap();
    assert_eq!(response.status, Status::Draft);
    assert_eq!(response.message, "Ribbon status updated successfully.");

    // Tokens are reusable until revoked.
    let response = h
        .dispatcher
        .toggle_status(&ctx, Kind::Ribbon, id, Status::Published)
        .await
        .unwrap();
    assert_eq!(response.status, Status::Published);
}

#[tokio::test]
async fn test_toggle_rejects_bad_input() {
    let h = Harness::new();
    let id = h.store.create(Kind::Category, "Books").await.unwrap();
    let ctx = h.ctx("admin", Kind::Category, TOGGLE_STATUS_ACTION).await;

    let err = h
        .dispatcher
        .toggle_status(&ctx, Kind::Category, EntityId(0), Status::Draft)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid request: Invalid category ID.");

    let err = h
        .dispatcher
        .toggle_status(&ctx, Kind::Category, id, Status::Trashed)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "invalid_request");
}

#[tokio::test]
async fn test_default_protection_message() {
    let h = Harness::new();
    let id = h.store.create(Kind::Category, "Uncategorized").await.unwrap();
    h.dispatcher
        .engine()
        .defaults
        .promote_to_default(Kind::Category, id)
        .await
        .unwrap();
    let ctx = h.ctx("admin", Kind::Category, ROW_ACTION).await;

    let err = h
        .dispatcher
        .row_action(&ctx, Kind::Category, id, RowAction::Trash)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        DispatchError::Lifecycle(LifecycleError::DefaultProtected { kind: Kind::Category, id })
    );
    assert_eq!(err.to_string(), "Cannot change status of default category.");
    assert_eq!(err.code(), "default_protected");
}

#[tokio::test]
async fn test_permanent_delete_response() {
    let h = Harness::new();
    let id = h.store.create(Kind::Tag, "Old").await.unwrap();
    let ctx = h.ctx("admin", Kind::Tag, ROW_ACTION).await;

    let response = h
        .dispatcher
        .row_action(&ctx, Kind::Tag, id, RowAction::Trash)
        .await
        .unwrap();
    assert_eq!(response.message, "Tag moved to trash.");

    let response = h
        .dispatcher
        .row_action(&ctx, Kind::Tag, id, RowAction::DeletePermanently)
        .await
        .unwrap();
    assert!(response.deleted);
    assert_eq!(response.status, None);
    assert_eq!(response.message, "Tag permanently deleted.");

    let err = h
        .dispatcher
        .row_action(&ctx, Kind::Tag, id, RowAction::Restore)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "not_found");
}

#[tokio::test]
async fn test_bulk_counts_and_message() {
    let h = Harness::new();
    let mut ids = Vec::new();
    for name in ["a", "b", "c"] {
        ids.push(h.store.create(Kind::Tag, name).await.unwrap());
    }
    h.dispatcher
        .engine()
        .defaults
        .promote_to_default(Kind::Tag, ids[0])
        .await
        .unwrap();
    let ctx = h.ctx("admin", Kind::Tag, BULK_ACTION).await;

    let response = h
        .dispatcher
        .bulk_action(&ctx, Kind::Tag, &ids, BulkAction::MoveToTrash)
        .await
        .unwrap();
    assert_eq!(response.succeeded, 2);
    assert_eq!(response.skipped, 1);
    assert_eq!(response.message, "2 tag(s) moved to trash.");

    let response = h
        .dispatcher
        .bulk_action(&ctx, Kind::Tag, &[], BulkAction::Restore)
        .await
        .unwrap();
    assert_eq!((response.succeeded, response.skipped), (0, 0));
}

#[tokio::test]
async fn test_bulk_store_failure_is_reported() {
    let h = Harness::new();
    let id = h.store.create(Kind::Ribbon, "x").await.unwrap();
    let ctx = h.ctx("admin", Kind::Ribbon, BULK_ACTION).await;
    h.store.set_offline(true);

    let err = h
        .dispatcher
        .bulk_action(&ctx, Kind::Ribbon, &[id], BulkAction::MoveToDraft)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "storage_error");
}
