use shop_core::timestamp::{format_optional, format_rfc3339};
use shop_domain::pagination::Pagination;
use shop_domain::user::{User, UserWithPassword};
use shop_proto::common;
use shop_proto::user::{UserResponse, UserWithPasswordResponse};

pub fn user_response(user: User) -> UserResponse {
    UserResponse {
        id: user.id,
        firstname: user.firstname,
        lastname: user.lastname,
        email: user.email,
        is_verified: user.is_verified,
        created_at: format_rfc3339(&user.created_at),
        updated_at: format_rfc3339(&user.updated_at),
        deleted_at: format_optional(user.deleted_at),
    }
}

pub fn user_with_password_response(found: UserWithPassword) -> UserWithPasswordResponse {
    UserWithPasswordResponse {
        user: Some(user_response(found.user)),
        password: found.password_hash,
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
