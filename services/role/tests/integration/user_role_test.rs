use shop_role::error::RoleServiceError;
use shop_testing::cache::InMemoryCache;
use shop_testing::fixture;

use crate::helpers::{MockRoleRepo, ctx, queries, user_roles};

fn seeded() -> MockRoleRepo {
    MockRoleRepo::new(vec![
        fixture::role(1, "admin"),
        fixture::role(2, "user"),
        fixture::trashed(fixture::role(3, "retired")),
    ])
}

#[tokio::test]
async fn should_assign_role_and_drop_cached_user_roles() {
    let repo = seeded();
    let cache = InMemoryCache::new();
    let ctx = ctx();

    let before = queries(&repo, &cache).find_by_user_id(&ctx, 5).await.unwrap();
    assert!(before.is_empty());

    let assignment = user_roles(&repo, &cache).assign(&ctx, 5, 2).await.unwrap();
    assert_eq!((assignment.user_id, assignment.role_id), (5, 2));
    assert!(!cache.contains("roles:user:5"));

    let after = queries(&repo, &cache).find_by_user_id(&ctx, 5).await.unwrap();
    assert_eq!(after[0].name, "user");
}

#[tokio::test]
async fn should_reject_duplicate_assignment() {
    let repo = seeded().with_assignments(vec![fixture::user_role(1, 5, 2)]);
    let cache = InMemoryCache::new();

    let result = user_roles(&repo, &cache).assign(&ctx(), 5, 2).await;

    assert!(
        matches!(result, Err(RoleServiceError::AlreadyAssigned)),
        "expected AlreadyAssigned, got {result:?}"
    );
}

#[tokio::test]
async fn should_not_assign_unknown_or_trashed_role() {
    let repo = seeded();
    let cache = InMemoryCache::new();
    let usecase = user_roles(&repo, &cache);

    assert!(matches!(
        usecase.assign(&ctx(), 5, 99).await,
        Err(RoleServiceError::RoleNotFound)
    ));
    assert!(matches!(
        usecase.assign(&ctx(), 5, 3).await,
        Err(RoleServiceError::RoleNotFound)
    ));
    assert!(repo.assignments().is_empty());
}

#[tokio::test]
async fn should_validate_ids_before_lookup() {
    let repo = seeded();
    let cache = InMemoryCache::new();

    let result = user_roles(&repo, &cache).assign(&ctx(), 0, 1).await;

    assert!(matches!(result, Err(RoleServiceError::Validation(_))));
    assert_eq!(repo.reads(), 0);
}

#[tokio::test]
async fn should_repoint_existing_assignment() {
    let repo = seeded().with_assignments(vec![fixture::user_role(1, 5, 2)]);
    let cache = InMemoryCache::new();

    let updated = user_roles(&repo, &cache)
        .update_role(&ctx(), 5, 1)
        .await
        .unwrap();

    assert_eq!(updated.id, 1);
    assert_eq!(updated.role_id, 1);
}

#[tokio::test]
async fn should_report_missing_assignment_on_update() {
    let repo = seeded();
    let cache = InMemoryCache::new();

    let result = user_roles(&repo, &cache).update_role(&ctx(), 5, 1).await;

    assert!(matches!(result, Err(RoleServiceError::UserRoleNotFound)));
}

#[tokio::test]
async fn should_remove_assignment_once() {
    let repo = seeded().with_assignments(vec![fixture::user_role(1, 5, 2)]);
    let cache = InMemoryCache::new();
    let usecase = user_roles(&repo, &cache);

    usecase.remove(&ctx(), 5, 2).await.unwrap();
    let again = usecase.remove(&ctx(), 5, 2).await;

    assert!(matches!(again, Err(RoleServiceError::UserRoleNotFound)));
    assert!(repo.assignments().is_empty());
}

#[tokio::test]
async fn should_surface_canonical_error_when_store_fails() {
    let repo = seeded();
    repo.fail_writes();
    let cache = InMemoryCache::new();

    let result = user_roles(&repo, &cache).assign(&ctx(), 5, 1).await;

    assert!(matches!(result, Err(RoleServiceError::AssignFailed)));
}
