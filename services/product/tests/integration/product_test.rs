use shop_domain::pagination::PageRequest;
use shop_domain::view::ListView;
use shop_product::domain::types::{CreateProduct, UpdateProduct};
use shop_product::error::ProductServiceError;
use shop_testing::cache::InMemoryCache;
use shop_testing::fixture;

use crate::helpers::{MockProductRepo, commands, ctx, first_page, queries};

fn create_input(name: &str, price: i32, stock: i32) -> CreateProduct {
    CreateProduct {
        name: name.into(),
        price,
        stock,
    }
}

// ── Create ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_product_and_drop_listing_cache() {
    let repo = MockProductRepo::default();
    let cache = InMemoryCache::new();
    let ctx = ctx();

    queries(&repo, &cache)
        .find_page(&ctx, ListView::All, first_page())
        .await
        .unwrap();
    assert!(cache.contains("products:all:page:1:pageSize:10:search:"));

    let product = commands(&repo, &cache)
        .create(&ctx, create_input("Keyboard", 4500, 12))
        .await
        .unwrap();

    assert_eq!(product.id, 1);
    assert_eq!(product.stock, 12);
    assert!(!cache.contains("products:all:page:1:pageSize:10:search:"));
}

#[tokio::test]
async fn should_reject_duplicate_active_name() {
    let repo = MockProductRepo::new(vec![fixture::product(1, "Keyboard", 100, 1)]);
    let cache = InMemoryCache::new();

    let result = commands(&repo, &cache)
        .create(&ctx(), create_input("Keyboard", 200, 2))
        .await;

    assert!(
        matches!(result, Err(ProductServiceError::NameTaken)),
        "expected NameTaken, got {result:?}"
    );
}

#[tokio::test]
async fn should_allow_reusing_name_of_trashed_product() {
    let repo = MockProductRepo::new(vec![fixture::trashed(fixture::product(
        1, "Keyboard", 100, 1,
    ))]);
    let cache = InMemoryCache::new();

    let product = commands(&repo, &cache)
        .create(&ctx(), create_input("Keyboard", 200, 2))
        .await
        .unwrap();
    assert_eq!(product.id, 2);
}

#[tokio::test]
async fn should_replace_repository_failure_with_canonical_error() {
    let repo = MockProductRepo::default();
    repo.fail_writes();
    let cache = InMemoryCache::new();

    let result = commands(&repo, &cache)
        .create(&ctx(), create_input("Mouse", 100, 1))
        .await;

    assert!(
        matches!(result, Err(ProductServiceError::CreateFailed)),
        "expected CreateFailed, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_invalid_input_before_touching_repository() {
    let repo = MockProductRepo::default();
    let cache = InMemoryCache::new();

    let result = commands(&repo, &cache)
        .create(&ctx(), create_input("", 100, 1))
        .await;

    assert!(matches!(result, Err(ProductServiceError::Validation(_))));
    assert_eq!(repo.reads(), 0);
}

// ── Read-through cache ───────────────────────────────────────────────────────

#[tokio::test]
async fn should_serve_second_lookup_from_cache() {
    let repo = MockProductRepo::new(vec![fixture::product(7, "Lamp", 900, 3)]);
    let cache = InMemoryCache::new();
    let ctx = ctx();
    let queries = queries(&repo, &cache);

    let first = queries.find_by_id(&ctx, 7).await.unwrap();
    let second = queries.find_by_id(&ctx, 7).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(repo.reads(), 1);
    assert!(cache.contains("products:id:7"));
}

#[tokio::test]
async fn should_not_serve_stale_listing_after_update() {
    let repo = MockProductRepo::new(vec![fixture::product(1, "Lamp", 900, 3)]);
    let cache = InMemoryCache::new();
    let ctx = ctx();

    let before = queries(&repo, &cache)
        .find_page(&ctx, ListView::All, first_page())
        .await
        .unwrap();
    assert_eq!(before.items[0].price, 900);

    commands(&repo, &cache)
        .update(
            &ctx,
            UpdateProduct {
                id: 1,
                name: "Lamp".into(),
                price: 1200,
                stock: 3,
            },
        )
        .await
        .unwrap();

    let after = queries(&repo, &cache)
        .find_page(&ctx, ListView::All, first_page())
        .await
        .unwrap();
    assert_eq!(after.items[0].price, 1200);
    let by_id = queries(&repo, &cache).find_by_id(&ctx, 1).await.unwrap();
    assert_eq!(by_id.price, 1200);
}

#[tokio::test]
async fn should_fall_back_to_repository_when_cache_is_down() {
    let repo = MockProductRepo::new(vec![fixture::product(1, "Lamp", 900, 3)]);
    let cache = InMemoryCache::new();
    cache.break_store();

    let product = queries(&repo, &cache).find_by_id(&ctx(), 1).await.unwrap();
    assert_eq!(product.name, "Lamp");
}

#[tokio::test]
async fn should_treat_undecodable_cache_entry_as_miss() {
    let repo = MockProductRepo::new(vec![fixture::product(1, "Lamp", 900, 3)]);
    let cache = InMemoryCache::new();
    cache.insert_raw("products:id:1", "{not json");

    let product = queries(&repo, &cache).find_by_id(&ctx(), 1).await.unwrap();
    assert_eq!(product.id, 1);
    assert_eq!(repo.reads(), 1);
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_report_total_for_page_beyond_end() {
    let repo = MockProductRepo::new(vec![
        fixture::product(1, "a", 1, 1),
        fixture::product(2, "b", 1, 1),
        fixture::product(3, "c", 1, 1),
    ]);
    let cache = InMemoryCache::new();
    let page = PageRequest::new(100, 10, "");

    let result = queries(&repo, &cache)
        .find_page(&ctx(), ListView::All, page.clone())
        .await
        .unwrap();

    assert!(result.items.is_empty());
    let pagination = result.pagination(&page);
    assert_eq!(pagination.total_records, 3);
    assert_eq!(pagination.total_pages, 1);
    assert_eq!(pagination.current_page, 100);
}

#[tokio::test]
async fn should_default_non_positive_paging_and_filter_by_search() {
    let repo = MockProductRepo::new(vec![
        fixture::product(1, "red shirt", 1, 1),
        fixture::product(2, "blue shirt", 1, 1),
        fixture::product(3, "hat", 1, 1),
    ]);
    let cache = InMemoryCache::new();

    let result = queries(&repo, &cache)
        .find_page(&ctx(), ListView::All, PageRequest::new(0, 0, "shirt"))
        .await
        .unwrap();

    let ids: Vec<_> = result.items.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![2, 1]);
    assert!(cache.contains("products:all:page:1:pageSize:10:search:shirt"));
}

// ── Stock ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_set_absolute_stock() {
    let repo = MockProductRepo::new(vec![fixture::product(10, "X", 500, 10)]);
    let cache = InMemoryCache::new();

    let product = commands(&repo, &cache)
        .update_stock(&ctx(), 10, 3)
        .await
        .unwrap();

    assert_eq!(product.stock, 3);
    assert_eq!(repo.get(10).unwrap().stock, 3);
}

#[tokio::test]
async fn should_reject_negative_stock() {
    let repo = MockProductRepo::new(vec![fixture::product(10, "X", 500, 10)]);
    let cache = InMemoryCache::new();

    let result = commands(&repo, &cache).update_stock(&ctx(), 10, -1).await;

    assert!(matches!(result, Err(ProductServiceError::NegativeStock)));
    assert_eq!(repo.get(10).unwrap().stock, 10);
}

#[tokio::test]
async fn should_report_unknown_product_on_stock_update() {
    let repo = MockProductRepo::default();
    let cache = InMemoryCache::new();

    let result = commands(&repo, &cache).update_stock(&ctx(), 99, 1).await;
    assert!(matches!(result, Err(ProductServiceError::ProductNotFound)));
}

// ── Lifecycle ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_move_product_between_views_on_trash_and_restore() {
    let repo = MockProductRepo::new(vec![fixture::product(5, "Chair", 100, 1)]);
    let cache = InMemoryCache::new();
    let ctx = ctx();
    let ids = |page: shop_domain::pagination::Page<shop_domain::product::Product>| {
        page.items.iter().map(|p| p.id).collect::<Vec<_>>()
    };

    commands(&repo, &cache).trash(&ctx, 5).await.unwrap();
    let active = queries(&repo, &cache)
        .find_page(&ctx, ListView::Active, first_page())
        .await
        .unwrap();
    let trashed = queries(&repo, &cache)
        .find_page(&ctx, ListView::Trashed, first_page())
        .await
        .unwrap();
    assert!(ids(active).is_empty());
    assert_eq!(ids(trashed), vec![5]);

    commands(&repo, &cache).restore(&ctx, 5).await.unwrap();
    let active = queries(&repo, &cache)
        .find_page(&ctx, ListView::Active, first_page())
        .await
        .unwrap();
    assert_eq!(ids(active), vec![5]);
}

#[tokio::test]
async fn should_not_trash_twice_or_restore_active() {
    let repo = MockProductRepo::new(vec![fixture::product(5, "Chair", 100, 1)]);
    let cache = InMemoryCache::new();
    let ctx = ctx();
    let commands = commands(&repo, &cache);

    assert!(matches!(
        commands.restore(&ctx, 5).await,
        Err(ProductServiceError::ProductNotFound)
    ));
    commands.trash(&ctx, 5).await.unwrap();
    assert!(matches!(
        commands.trash(&ctx, 5).await,
        Err(ProductServiceError::ProductNotFound)
    ));
}

#[tokio::test]
async fn should_delete_permanently_from_any_state() {
    let repo = MockProductRepo::new(vec![
        fixture::product(1, "a", 1, 1),
        fixture::trashed(fixture::product(2, "b", 1, 1)),
    ]);
    let cache = InMemoryCache::new();
    let ctx = ctx();
    let commands = commands(&repo, &cache);

    commands.delete_permanent(&ctx, 1).await.unwrap();
    commands.delete_permanent(&ctx, 2).await.unwrap();
    assert!(matches!(
        commands.delete_permanent(&ctx, 2).await,
        Err(ProductServiceError::ProductNotFound)
    ));
    assert!(matches!(
        queries(&repo, &cache).find_by_id(&ctx, 1).await,
        Err(ProductServiceError::ProductNotFound)
    ));
}

#[tokio::test]
async fn should_forget_cached_name_lookup_on_permanent_delete() {
    let repo = MockProductRepo::new(vec![fixture::product(1, "Lamp", 900, 3)]);
    let cache = InMemoryCache::new();
    let ctx = ctx();

    queries(&repo, &cache).find_by_name(&ctx, "Lamp").await.unwrap();
    assert!(cache.contains("products:name:Lamp"));

    commands(&repo, &cache).delete_permanent(&ctx, 1).await.unwrap();

    assert!(!cache.contains("products:name:Lamp"));
    assert!(matches!(
        queries(&repo, &cache).find_by_name(&ctx, "Lamp").await,
        Err(ProductServiceError::ProductNotFound)
    ));
}

#[tokio::test]
async fn should_delete_all_trashed_idempotently() {
    let repo = MockProductRepo::new(vec![
        fixture::product(1, "a", 1, 1),
        fixture::trashed(fixture::product(2, "b", 1, 1)),
        fixture::trashed(fixture::product(3, "c", 1, 1)),
    ]);
    let cache = InMemoryCache::new();
    let ctx = ctx();
    let commands = commands(&repo, &cache);

    assert_eq!(commands.delete_all(&ctx).await.unwrap(), 2);
    assert_eq!(commands.delete_all(&ctx).await.unwrap(), 0);
    assert!(repo.get(1).is_some());
}

#[tokio::test]
async fn should_restore_all_trashed() {
    let repo = MockProductRepo::new(vec![
        fixture::trashed(fixture::product(1, "a", 1, 1)),
        fixture::trashed(fixture::product(2, "b", 1, 1)),
    ]);
    let cache = InMemoryCache::new();

    let affected = commands(&repo, &cache).restore_all(&ctx()).await.unwrap();

    assert_eq!(affected, 2);
    assert!(repo.get(1).unwrap().deleted_at.is_none());
}
