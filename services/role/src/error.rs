use tonic::Status;

use shop_core::context::Cancelled;
use shop_core::error::{DomainError, ErrorResponse};

/// Role service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum RoleServiceError {
    #[error("role not found")]
    RoleNotFound,
    #[error("user role not found")]
    UserRoleNotFound,
    #[error("role name already exists")]
    NameTaken,
    #[error("role already assigned to user")]
    AlreadyAssigned,
    #[error("{0}")]
    Validation(String),
    #[error("failed to fetch roles")]
    FindFailed,
    #[error("failed to create role")]
    CreateFailed,
    #[error("failed to update role")]
    UpdateFailed,
    #[error("failed to trash role")]
    TrashFailed,
    #[error("failed to restore role")]
    RestoreFailed,
    #[error("failed to delete role permanently")]
    DeleteFailed,
    #[error("failed to restore all roles")]
    RestoreAllFailed,
    #[error("failed to delete all roles permanently")]
    DeleteAllFailed,
    #[error("failed to assign role")]
    AssignFailed,
    #[error("failed to update user role")]
    UpdateUserRoleFailed,
    #[error("failed to remove role")]
    RemoveFailed,
    #[error("request cancelled")]
    Cancelled,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl DomainError for RoleServiceError {
    fn kind(&self) -> &'static str {
        match self {
            Self::RoleNotFound => "ROLE_NOT_FOUND",
            Self::UserRoleNotFound => "USER_ROLE_NOT_FOUND",
            Self::NameTaken => "ROLE_ALREADY_EXISTS",
            Self::AlreadyAssigned => "ROLE_ALREADY_ASSIGNED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::FindFailed => "FIND_ROLES_FAILED",
            Self::CreateFailed => "CREATE_ROLE_FAILED",
            Self::UpdateFailed => "UPDATE_ROLE_FAILED",
            Self::TrashFailed => "TRASH_ROLE_FAILED",
            Self::RestoreFailed => "RESTORE_ROLE_FAILED",
            Self::DeleteFailed => "DELETE_ROLE_FAILED",
            Self::RestoreAllFailed => "RESTORE_ALL_ROLES_FAILED",
            Self::DeleteAllFailed => "DELETE_ALL_ROLES_FAILED",
            Self::AssignFailed => "ASSIGN_ROLE_FAILED",
            Self::UpdateUserRoleFailed => "UPDATE_USER_ROLE_FAILED",
            Self::RemoveFailed => "REMOVE_ROLE_FAILED",
            Self::Cancelled => "CANCELLED",
            Self::Internal(_) => "INTERNAL",
        }
    }

    fn to_response(&self) -> ErrorResponse {
        match self {
            Self::RoleNotFound | Self::UserRoleNotFound => ErrorResponse::not_found(self.to_string()),
            Self::NameTaken | Self::AlreadyAssigned => ErrorResponse::conflict(self.to_string()),
            Self::Validation(_) => ErrorResponse::validation(self.to_string()),
            Self::Cancelled => ErrorResponse::cancelled(),
            _ => ErrorResponse::internal(self.to_string()),
        }
    }

    fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

impl From<Cancelled> for RoleServiceError {
    fn from(_: Cancelled) -> Self {
        Self::Cancelled
    }
}

impl From<RoleServiceError> for Status {
    fn from(err: RoleServiceError) -> Self {
        if let RoleServiceError::Internal(ref e) = err {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        err.to_response().into()
    }
}
