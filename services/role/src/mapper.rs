use shop_core::timestamp::{format_optional, format_rfc3339};
use shop_domain::pagination::Pagination;
use shop_domain::role::{Role, UserRole};
use shop_proto::common;
use shop_proto::role::{RoleResponse, UserRoleResponse};

pub fn role_response(role: Role) -> RoleResponse {
    RoleResponse {
        id: role.id,
        name: role.name,
        created_at: format_rfc3339(&role.created_at),
        updated_at: format_rfc3339(&role.updated_at),
        deleted_at: format_optional(role.deleted_at),
    }
}

pub fn user_role_response(assignment: UserRole) -> UserRoleResponse {
    UserRoleResponse {
        id: assignment.id,
        user_id: assignment.user_id,
        role_id: assignment.role_id,
        created_at: format_rfc3339(&assignment.created_at),
        updated_at: format_rfc3339(&assignment.updated_at),
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
