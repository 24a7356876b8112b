//! Domain → protobuf mapping.

use shop_core::timestamp::{format_optional, format_rfc3339};
use shop_domain::pagination::Pagination;
use shop_domain::product::Product;
use shop_proto::common;
use shop_proto::product::ProductResponse;

pub fn product_response(product: Product) -> ProductResponse {
    ProductResponse {
        id: product.id,
        name: product.name,
        price: product.price,
        stock: product.stock,
        created_at: format_rfc3339(&product.created_at),
        updated_at: format_rfc3339(&product.updated_at),
        deleted_at: format_optional(product.deleted_at),
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
