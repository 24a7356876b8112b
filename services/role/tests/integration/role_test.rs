use shop_domain::pagination::PageRequest;
use shop_domain::view::ListView;
use shop_role::domain::types::DEFAULT_ROLES;
use shop_role::error::RoleServiceError;
use shop_role::usecase::seed::seed_roles;
use shop_testing::cache::InMemoryCache;
use shop_testing::fixture;

use crate::helpers::{MockRoleRepo, commands, ctx, first_page, queries};

// ── Create / update ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_role_with_trimmed_name() {
    let repo = MockRoleRepo::default();
    let cache = InMemoryCache::new();

    let role = commands(&repo, &cache)
        .create(&ctx(), "  moderator ")
        .await
        .unwrap();

    assert_eq!(role.id, 1);
    assert_eq!(role.name, "moderator");
}

#[tokio::test]
async fn should_reject_duplicate_active_role_name() {
    let repo = MockRoleRepo::new(vec![fixture::role(1, "admin")]);
    let cache = InMemoryCache::new();

    let result = commands(&repo, &cache).create(&ctx(), "admin").await;

    assert!(
        matches!(result, Err(RoleServiceError::NameTaken)),
        "expected NameTaken, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_rename_onto_another_active_role() {
    let repo = MockRoleRepo::new(vec![fixture::role(1, "admin"), fixture::role(2, "user")]);
    let cache = InMemoryCache::new();

    let result = commands(&repo, &cache).update(&ctx(), 2, "admin").await;

    assert!(matches!(result, Err(RoleServiceError::NameTaken)));
    assert_eq!(repo.get(2).unwrap().name, "user");
}

#[tokio::test]
async fn should_forget_old_name_key_on_rename() {
    let repo = MockRoleRepo::new(vec![fixture::role(1, "staff")]);
    let cache = InMemoryCache::new();
    let ctx = ctx();

    queries(&repo, &cache).find_by_name(&ctx, "staff").await.unwrap();
    assert!(cache.contains("roles:name:staff"));

    let role = commands(&repo, &cache).update(&ctx, 1, "crew").await.unwrap();

    assert_eq!(role.name, "crew");
    assert!(!cache.contains("roles:name:staff"));
    assert!(!cache.contains("roles:id:1"));
}

#[tokio::test]
async fn should_forget_name_key_on_permanent_delete() {
    let repo = MockRoleRepo::new(vec![fixture::role(1, "staff")]);
    let cache = InMemoryCache::new();
    let ctx = ctx();

    queries(&repo, &cache).find_by_name(&ctx, "staff").await.unwrap();
    commands(&repo, &cache).delete_permanent(&ctx, 1).await.unwrap();

    assert!(!cache.contains("roles:name:staff"));
    assert!(matches!(
        queries(&repo, &cache).find_by_name(&ctx, "staff").await,
        Err(RoleServiceError::RoleNotFound)
    ));
}

#[tokio::test]
async fn should_not_update_trashed_role() {
    let repo = MockRoleRepo::new(vec![fixture::trashed(fixture::role(1, "staff"))]);
    let cache = InMemoryCache::new();

    let result = commands(&repo, &cache).update(&ctx(), 1, "crew").await;

    assert!(matches!(result, Err(RoleServiceError::RoleNotFound)));
}

#[tokio::test]
async fn should_replace_repository_failure_with_canonical_error() {
    let repo = MockRoleRepo::default();
    repo.fail_writes();
    let cache = InMemoryCache::new();

    let result = commands(&repo, &cache).create(&ctx(), "auditor").await;

    assert!(
        matches!(result, Err(RoleServiceError::CreateFailed)),
        "expected CreateFailed, got {result:?}"
    );
}

// ── Lifecycle ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_move_role_between_views_on_trash_and_restore() {
    let repo = MockRoleRepo::new(vec![fixture::role(1, "admin"), fixture::role(2, "user")]);
    let cache = InMemoryCache::new();
    let ctx = ctx();
    let queries = queries(&repo, &cache);
    let commands = commands(&repo, &cache);

    let active = queries
        .find_page(&ctx, ListView::Active, first_page())
        .await
        .unwrap();
    assert_eq!(active.total_records, 2);

    let trashed = commands.trash(&ctx, 2).await.unwrap();
    assert!(trashed.deleted_at.is_some());

    let active = queries
        .find_page(&ctx, ListView::Active, first_page())
        .await
        .unwrap();
    let in_trash = queries
        .find_page(&ctx, ListView::Trashed, first_page())
        .await
        .unwrap();
    let all = queries
        .find_page(&ctx, ListView::All, first_page())
        .await
        .unwrap();
    assert_eq!(active.total_records, 1);
    assert_eq!(in_trash.items[0].id, 2);
    assert_eq!(all.total_records, 2);

    let restored = commands.restore(&ctx, 2).await.unwrap();
    assert!(restored.deleted_at.is_none());
    let in_trash = queries
        .find_page(&ctx, ListView::Trashed, first_page())
        .await
        .unwrap();
    assert_eq!(in_trash.total_records, 0);
}

#[tokio::test]
async fn should_report_not_found_when_trashing_twice() {
    let repo = MockRoleRepo::new(vec![fixture::role(1, "admin")]);
    let cache = InMemoryCache::new();
    let commands = commands(&repo, &cache);

    commands.trash(&ctx(), 1).await.unwrap();
    let result = commands.trash(&ctx(), 1).await;

    assert!(matches!(result, Err(RoleServiceError::RoleNotFound)));
}

#[tokio::test]
async fn should_delete_only_trashed_roles_and_be_idempotent() {
    let repo = MockRoleRepo::new(vec![
        fixture::role(1, "admin"),
        fixture::trashed(fixture::role(2, "old")),
        fixture::trashed(fixture::role(3, "older")),
    ]);
    let cache = InMemoryCache::new();
    let commands = commands(&repo, &cache);

    assert_eq!(commands.delete_all(&ctx()).await.unwrap(), 2);
    assert_eq!(commands.delete_all(&ctx()).await.unwrap(), 0);
    assert!(repo.get(1).is_some());
}

#[tokio::test]
async fn should_restore_every_trashed_role() {
    let repo = MockRoleRepo::new(vec![
        fixture::trashed(fixture::role(1, "a")),
        fixture::trashed(fixture::role(2, "b")),
    ]);
    let cache = InMemoryCache::new();

    let affected = commands(&repo, &cache).restore_all(&ctx()).await.unwrap();

    assert_eq!(affected, 2);
    assert!(repo.get(1).unwrap().deleted_at.is_none());
}

#[tokio::test]
async fn should_return_empty_page_with_real_total_beyond_end() {
    let repo = MockRoleRepo::new((1..=3).map(|i| fixture::role(i, &format!("r{i}"))).collect());
    let cache = InMemoryCache::new();

    let page = queries(&repo, &cache)
        .find_page(&ctx(), ListView::All, PageRequest::new(5, 10, ""))
        .await
        .unwrap();

    assert!(page.items.is_empty());
    assert_eq!(page.total_records, 3);
}

// ── Lookup by user ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_drop_user_role_lists_when_role_is_trashed() {
    let repo = MockRoleRepo::new(vec![fixture::role(1, "admin"), fixture::role(2, "user")])
        .with_assignments(vec![fixture::user_role(1, 10, 1), fixture::user_role(2, 10, 2)]);
    let cache = InMemoryCache::new();
    let ctx = ctx();
    let queries = queries(&repo, &cache);

    let roles = queries.find_by_user_id(&ctx, 10).await.unwrap();
    assert_eq!(roles.len(), 2);
    assert!(cache.contains("roles:user:10"));

    commands(&repo, &cache).trash(&ctx, 1).await.unwrap();
    assert!(!cache.contains("roles:user:10"));

    let roles = queries.find_by_user_id(&ctx, 10).await.unwrap();
    assert_eq!(roles.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(), ["user"]);
}

// ── Seeding ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_seed_missing_default_roles_once() {
    let repo = MockRoleRepo::new(vec![fixture::role(1, "admin")]);

    let created = seed_roles(&repo, &ctx(), &DEFAULT_ROLES).await.unwrap();
    assert_eq!(created, 1);

    let created = seed_roles(&repo, &ctx(), &DEFAULT_ROLES).await.unwrap();
    assert_eq!(created, 0);
    assert_eq!(repo.roles.lock().unwrap().len(), 2);
}
