//! Domain → protobuf mapping.

use shop_core::timestamp::{format_optional, format_rfc3339};
use shop_domain::order::{Order, OrderItem};
use shop_domain::pagination::Pagination;
use shop_proto::common;
use shop_proto::order::{OrderItemResponse, OrderResponse};

pub fn order_response(order: Order) -> OrderResponse {
    OrderResponse {
        id: order.id,
        user_id: order.user_id,
        total_price: order.total_price,
        created_at: format_rfc3339(&order.created_at),
        updated_at: format_rfc3339(&order.updated_at),
        deleted_at: format_optional(order.deleted_at),
    }
}

pub fn order_item_response(item: OrderItem) -> OrderItemResponse {
    OrderItemResponse {
        id: item.id,
        order_id: item.order_id,
        product_id: item.product_id,
        quantity: item.quantity,
        price: item.price,
        created_at: format_rfc3339(&item.created_at),
        updated_at: format_rfc3339(&item.updated_at),
        deleted_at: format_optional(item.deleted_at),
    }
}

pub fn pagination(pagination: Pagination) -> common::Pagination {
    common::Pagination {
        current_page: pagination.current_page,
        page_size: pagination.page_size,
        total_pages: pagination.total_pages,
        total_records: pagination.total_records,
    }
}
