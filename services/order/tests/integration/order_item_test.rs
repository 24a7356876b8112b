use shop_domain::view::ListView;
use shop_order::error::OrderServiceError;
use shop_order::state::ORDER_ITEM_KEYS;
use shop_testing::cache::InMemoryCache;
use shop_testing::fixture;

use crate::helpers::{MockOrderStore, ctx, first_page, item_commands, item_queries};

fn store() -> MockOrderStore {
    MockOrderStore::new(
        vec![fixture::order(1, 1, 1300), fixture::order(2, 2, 400)],
        vec![
            fixture::order_item(1, 1, 10, 2, 500),
            fixture::order_item(2, 1, 11, 1, 300),
            fixture::order_item(3, 2, 10, 1, 400),
            fixture::trashed(fixture::order_item(4, 1, 12, 1, 50)),
        ],
    )
}

#[tokio::test]
async fn should_list_active_lines_of_order_and_cache_them() {
    let store = store();
    let cache = InMemoryCache::new();

    let items = item_queries(&store, &cache)
        .find_by_order(&ctx(), 1)
        .await
        .unwrap();
    assert_eq!(items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 2]);
    assert!(cache.contains(&ORDER_ITEM_KEYS.by_parent("order", 1)));

    item_queries(&store, &cache)
        .find_by_order(&ctx(), 1)
        .await
        .unwrap();
    assert_eq!(store.reads(), 1);
}

#[tokio::test]
async fn should_return_empty_list_for_unknown_order() {
    let items = item_queries(&store(), &InMemoryCache::new())
        .find_by_order(&ctx(), 99)
        .await
        .unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn should_require_positive_order_id() {
    let result = item_queries(&store(), &InMemoryCache::new())
        .find_by_order(&ctx(), 0)
        .await;
    assert!(matches!(result, Err(OrderServiceError::Validation(_))));
}

#[tokio::test]
async fn should_page_lines_per_view() {
    let store = store();
    let cache = InMemoryCache::new();

    let all = item_queries(&store, &cache)
        .find_page(&ctx(), ListView::All, first_page())
        .await
        .unwrap();
    let trashed = item_queries(&store, &cache)
        .find_page(&ctx(), ListView::Trashed, first_page())
        .await
        .unwrap();

    assert_eq!(all.total_records, 4);
    assert_eq!(trashed.items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![4]);
}

#[tokio::test]
async fn should_forget_order_lines_when_trashing_item() {
    let store = store();
    let cache = InMemoryCache::new();
    item_queries(&store, &cache)
        .find_by_order(&ctx(), 1)
        .await
        .unwrap();

    let item = item_commands(&store, &cache).trash(&ctx(), 2).await.unwrap();

    assert!(item.deleted_at.is_some());
    assert!(!cache.contains(&ORDER_ITEM_KEYS.by_parent("order", 1)));
    let items = item_queries(&store, &cache)
        .find_by_order(&ctx(), 1)
        .await
        .unwrap();
    assert_eq!(items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1]);
}

#[tokio::test]
async fn should_reject_transitions_from_wrong_state() {
    let store = store();
    let commands = item_commands(&store, &InMemoryCache::new());

    assert!(matches!(
        commands.restore(&ctx(), 1).await,
        Err(OrderServiceError::OrderItemNotFound)
    ));
    assert!(matches!(
        commands.trash(&ctx(), 4).await,
        Err(OrderServiceError::OrderItemNotFound)
    ));
    assert!(matches!(
        commands.delete_permanent(&ctx(), 40).await,
        Err(OrderServiceError::OrderItemNotFound)
    ));
}

#[tokio::test]
async fn should_forget_every_order_list_on_bulk_operations() {
    let store = store();
    let cache = InMemoryCache::new();
    cache.insert_raw(&ORDER_ITEM_KEYS.by_parent("order", 1), "[]");
    cache.insert_raw(&ORDER_ITEM_KEYS.by_parent("order", 2), "[]");
    let commands = item_commands(&store, &cache);

    assert_eq!(commands.restore_all(&ctx()).await.unwrap(), 1);
    assert!(cache.keys().is_empty());

    commands.trash(&ctx(), 3).await.unwrap();
    assert_eq!(commands.delete_all(&ctx()).await.unwrap(), 1);
    assert_eq!(commands.delete_all(&ctx()).await.unwrap(), 0);
    assert!(store.item(3).is_none());
}

#[tokio::test]
async fn should_use_canonical_error_on_storage_failure() {
    let store = store();
    store.fail_writes();

    let err = item_commands(&store, &InMemoryCache::new())
        .trash(&ctx(), 1)
        .await
        .unwrap_err();

    assert!(matches!(err, OrderServiceError::TrashItemFailed));
    assert_eq!(err.to_string(), "failed to trash order item");
}
