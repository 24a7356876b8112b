use shop_domain::view::ListView;
use shop_testing::cache::InMemoryCache;
use shop_testing::fixture;
use shop_user::domain::types::{CreateUser, UpdateUser};
use shop_user::error::UserServiceError;

use crate::helpers::{MockRoleClient, MockUserRepo, commands, ctx, first_page, queries};

fn signup(email: &str) -> CreateUser {
    CreateUser {
        firstname: "Ada".into(),
        lastname: "Lovelace".into(),
        email: email.into(),
        password: "secret1".into(),
        confirm_password: "secret1".into(),
    }
}

fn verified(id: i32, email: &str) -> shop_domain::user::User {
    let mut user = fixture::user(id, email);
    user.is_verified = true;
    user
}

// ── Create ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_user_with_hash_code_and_default_role() {
    let repo = MockUserRepo::default();
    let roles = MockRoleClient::with_role("user", 2);
    let cache = InMemoryCache::new();

    let user = commands(&repo, &roles, &cache)
        .create(&ctx(), signup("  Ada@Example.com "))
        .await
        .unwrap();

    assert_eq!(user.email, "ada@example.com");
    assert!(!user.is_verified);
    let secret = repo.secret(user.id).unwrap();
    assert_eq!(secret.password_hash, "hashed:secret1");
    assert_eq!(secret.verification_code.len(), 32);
    assert_eq!(roles.assigned(), vec![(user.id, 2)]);
}

#[tokio::test]
async fn should_reject_duplicate_active_email() {
    let repo = MockUserRepo::new(vec![fixture::user(1, "ada@example.com")]);
    let roles = MockRoleClient::with_role("user", 2);
    let cache = InMemoryCache::new();

    let result = commands(&repo, &roles, &cache)
        .create(&ctx(), signup("ada@example.com"))
        .await;

    assert!(
        matches!(result, Err(UserServiceError::EmailTaken)),
        "expected EmailTaken, got {result:?}"
    );
    assert!(roles.assigned().is_empty());
}

#[tokio::test]
async fn should_allow_email_of_trashed_user() {
    let repo = MockUserRepo::new(vec![fixture::trashed(fixture::user(1, "ada@example.com"))]);
    let roles = MockRoleClient::with_role("user", 2);
    let cache = InMemoryCache::new();

    let user = commands(&repo, &roles, &cache)
        .create(&ctx(), signup("ada@example.com"))
        .await
        .unwrap();
    assert_eq!(user.id, 2);
}

#[tokio::test]
async fn should_reject_mismatched_password_without_writing() {
    let repo = MockUserRepo::default();
    let roles = MockRoleClient::with_role("user", 2);
    let cache = InMemoryCache::new();
    let mut input = signup("ada@example.com");
    input.confirm_password = "different".into();

    let result = commands(&repo, &roles, &cache).create(&ctx(), input).await;

    assert!(matches!(result, Err(UserServiceError::PasswordMismatch)));
    assert_eq!(repo.reads(), 0);
    assert!(repo.users.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_surface_role_service_outage_after_insert() {
    let repo = MockUserRepo::default();
    let roles = MockRoleClient::with_role("user", 2);
    roles.go_down();
    let cache = InMemoryCache::new();

    let result = commands(&repo, &roles, &cache)
        .create(&ctx(), signup("ada@example.com"))
        .await;

    match result {
        Err(UserServiceError::Role(err)) => assert_eq!(err.code, 503),
        other => panic!("expected role error, got {other:?}"),
    }
    assert!(repo.get(1).is_some());
}

#[tokio::test]
async fn should_fail_when_default_role_is_missing() {
    let repo = MockUserRepo::default();
    let roles = MockRoleClient::with_role("admin", 1);
    let cache = InMemoryCache::new();

    let result = commands(&repo, &roles, &cache)
        .create(&ctx(), signup("ada@example.com"))
        .await;

    assert!(matches!(result, Err(UserServiceError::Role(e)) if e.is_not_found()));
}

#[tokio::test]
async fn should_replace_repository_failure_with_canonical_error() {
    let repo = MockUserRepo::default();
    repo.fail_writes();
    let roles = MockRoleClient::with_role("user", 2);
    let cache = InMemoryCache::new();

    let result = commands(&repo, &roles, &cache)
        .create(&ctx(), signup("ada@example.com"))
        .await;

    assert!(matches!(result, Err(UserServiceError::CreateFailed)));
}

// ── Update ───────────────────────────────────────────────────────────────────

fn update(id: i32, email: &str, password: &str) -> UpdateUser {
    UpdateUser {
        id,
        firstname: "Ada".into(),
        lastname: "King".into(),
        email: email.into(),
        password: password.into(),
        confirm_password: password.into(),
    }
}

#[tokio::test]
async fn should_keep_password_when_update_leaves_it_blank() {
    let repo = MockUserRepo::new(vec![fixture::user(1, "ada@example.com")])
        .with_secret(1, "hashed:old", "code");
    let roles = MockRoleClient::default();
    let cache = InMemoryCache::new();

    let user = commands(&repo, &roles, &cache)
        .update(&ctx(), update(1, "ada@example.com", ""))
        .await
        .unwrap();

    assert_eq!(user.lastname, "King");
    assert_eq!(repo.secret(1).unwrap().password_hash, "hashed:old");
}

#[tokio::test]
async fn should_rehash_changed_password() {
    let repo = MockUserRepo::new(vec![fixture::user(1, "ada@example.com")])
        .with_secret(1, "hashed:old", "code");
    let roles = MockRoleClient::default();
    let cache = InMemoryCache::new();

    commands(&repo, &roles, &cache)
        .update(&ctx(), update(1, "ada@example.com", "newpass1"))
        .await
        .unwrap();

    assert_eq!(repo.secret(1).unwrap().password_hash, "hashed:newpass1");
}

#[tokio::test]
async fn should_reject_email_owned_by_another_user() {
    let repo = MockUserRepo::new(vec![
        fixture::user(1, "ada@example.com"),
        fixture::user(2, "bob@example.com"),
    ]);
    let roles = MockRoleClient::default();
    let cache = InMemoryCache::new();

    let result = commands(&repo, &roles, &cache)
        .update(&ctx(), update(2, "ada@example.com", ""))
        .await;

    assert!(matches!(result, Err(UserServiceError::EmailTaken)));
}

#[tokio::test]
async fn should_forget_cached_email_lookups_on_update() {
    let repo = MockUserRepo::new(vec![fixture::user(1, "ada@example.com")]);
    let roles = MockRoleClient::default();
    let cache = InMemoryCache::new();
    let ctx = ctx();

    queries(&repo, &cache)
        .find_by_email(&ctx, "ada@example.com")
        .await
        .unwrap();
    assert!(cache.contains("users:email:ada@example.com"));

    commands(&repo, &roles, &cache)
        .update(&ctx, update(1, "ada@lovelace.org", ""))
        .await
        .unwrap();

    assert!(!cache.contains("users:email:ada@example.com"));
    let result = queries(&repo, &cache).find_by_email(&ctx, "ada@example.com").await;
    assert!(matches!(result, Err(UserServiceError::UserNotFound)));
}

#[tokio::test]
async fn should_toggle_verification_flag() {
    let repo = MockUserRepo::new(vec![fixture::user(1, "ada@example.com")]);
    let roles = MockRoleClient::default();
    let cache = InMemoryCache::new();

    let user = commands(&repo, &roles, &cache)
        .update_is_verified(&ctx(), 1, true)
        .await
        .unwrap();

    assert!(user.is_verified);
}

// ── Lookups ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_return_hash_only_for_verified_users() {
    let repo = MockUserRepo::new(vec![
        verified(1, "ada@example.com"),
        fixture::user(2, "bob@example.com"),
    ])
    .with_secret(1, "hashed:secret1", "a")
    .with_secret(2, "hashed:secret2", "b");
    let cache = InMemoryCache::new();
    let queries = queries(&repo, &cache);

    let found = queries
        .find_by_email_and_verify(&ctx(), "ada@example.com")
        .await
        .unwrap();
    assert_eq!(found.password_hash, "hashed:secret1");
    assert!(cache.keys().is_empty());

    let unverified = queries.find_by_email_and_verify(&ctx(), "bob@example.com").await;
    assert!(matches!(unverified, Err(UserServiceError::UserNotFound)));
}

#[tokio::test]
async fn should_find_user_by_verification_code() {
    let repo = MockUserRepo::new(vec![fixture::user(1, "ada@example.com")])
        .with_secret(1, "hashed:x", "ABC123");
    let cache = InMemoryCache::new();
    let queries = queries(&repo, &cache);

    let user = queries.find_by_verification_code(&ctx(), "ABC123").await.unwrap();
    assert_eq!(user.id, 1);

    let blank = queries.find_by_verification_code(&ctx(), "  ").await;
    assert!(matches!(blank, Err(UserServiceError::Validation(_))));
}

#[tokio::test]
async fn should_serve_second_lookup_from_cache() {
    let repo = MockUserRepo::new(vec![fixture::user(3, "cy@example.com")]);
    let cache = InMemoryCache::new();
    let queries = queries(&repo, &cache);

    queries.find_by_id(&ctx(), 3).await.unwrap();
    queries.find_by_id(&ctx(), 3).await.unwrap();

    assert_eq!(repo.reads(), 1);
}

// ── Lifecycle ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_hide_trashed_user_from_email_lookup_until_restored() {
    let repo = MockUserRepo::new(vec![fixture::user(1, "ada@example.com")]);
    let roles = MockRoleClient::default();
    let cache = InMemoryCache::new();
    let ctx = ctx();
    let commands = commands(&repo, &roles, &cache);

    queries(&repo, &cache)
        .find_by_email(&ctx, "ada@example.com")
        .await
        .unwrap();
    commands.trash(&ctx, 1).await.unwrap();

    let lookup = queries(&repo, &cache).find_by_email(&ctx, "ada@example.com").await;
    assert!(matches!(lookup, Err(UserServiceError::UserNotFound)));
    let trashed = queries(&repo, &cache)
        .find_page(&ctx, ListView::Trashed, first_page())
        .await
        .unwrap();
    assert_eq!(trashed.total_records, 1);

    commands.restore(&ctx, 1).await.unwrap();
    let found = queries(&repo, &cache)
        .find_by_email(&ctx, "ada@example.com")
        .await
        .unwrap();
    assert_eq!(found.id, 1);
}

#[tokio::test]
async fn should_forget_cached_email_lookup_on_permanent_delete() {
    let repo = MockUserRepo::new(vec![fixture::user(1, "ada@example.com")]);
    let roles = MockRoleClient::default();
    let cache = InMemoryCache::new();
    let ctx = ctx();

    queries(&repo, &cache)
        .find_by_email(&ctx, "ada@example.com")
        .await
        .unwrap();
    commands(&repo, &roles, &cache)
        .delete_permanent(&ctx, 1)
        .await
        .unwrap();

    assert!(!cache.contains("users:email:ada@example.com"));
    let lookup = queries(&repo, &cache).find_by_email(&ctx, "ada@example.com").await;
    assert!(matches!(lookup, Err(UserServiceError::UserNotFound)));
}

#[tokio::test]
async fn should_delete_all_trashed_users_idempotently() {
    let repo = MockUserRepo::new(vec![
        fixture::user(1, "a@example.com"),
        fixture::trashed(fixture::user(2, "b@example.com")),
    ]);
    let roles = MockRoleClient::default();
    let cache = InMemoryCache::new();
    let commands = commands(&repo, &roles, &cache);

    assert_eq!(commands.delete_all(&ctx()).await.unwrap(), 1);
    assert_eq!(commands.delete_all(&ctx()).await.unwrap(), 0);
    assert!(matches!(
        commands.delete_permanent(&ctx(), 2).await,
        Err(UserServiceError::UserNotFound)
    ));
}
