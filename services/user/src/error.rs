use tonic::Status;

use shop_core::context::Cancelled;
use shop_core::error::{DomainError, ErrorResponse};

/// User service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    #[error("user not found")]
    UserNotFound,
    #[error("email already exists")]
    EmailTaken,
    #[error("password and confirm password do not match")]
    PasswordMismatch,
    #[error("{0}")]
    Validation(String),
    /// Error returned by the role service while assigning the default role.
    #[error("{0}")]
    Role(ErrorResponse),
    #[error("failed to hash password")]
    HashFailed,
    #[error("failed to fetch users")]
    FindFailed,
    #[error("failed to create user")]
    CreateFailed,
    #[error("failed to update user")]
    UpdateFailed,
    #[error("failed to update user verification")]
    UpdateVerifiedFailed,
    #[error("failed to trash user")]
    TrashFailed,
    #[error("failed to restore user")]
    RestoreFailed,
    #[error("failed to delete user permanently")]
    DeleteFailed,
    #[error("failed to restore all users")]
    RestoreAllFailed,
    #[error("failed to delete all users permanently")]
    DeleteAllFailed,
    #[error("request cancelled")]
    Cancelled,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl DomainError for UserServiceError {
    fn kind(&self) -> &'static str {
        match self {
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::EmailTaken => "EMAIL_ALREADY_EXISTS",
            Self::PasswordMismatch => "PASSWORD_MISMATCH",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Role(_) => "ASSIGN_DEFAULT_ROLE_FAILED",
            Self::HashFailed => "HASH_PASSWORD_FAILED",
            Self::FindFailed => "FIND_USERS_FAILED",
            Self::CreateFailed => "CREATE_USER_FAILED",
            Self::UpdateFailed => "UPDATE_USER_FAILED",
            Self::UpdateVerifiedFailed => "UPDATE_USER_VERIFIED_FAILED",
            Self::TrashFailed => "TRASH_USER_FAILED",
            Self::RestoreFailed => "RESTORE_USER_FAILED",
            Self::DeleteFailed => "DELETE_USER_FAILED",
            Self::RestoreAllFailed => "RESTORE_ALL_USERS_FAILED",
            Self::DeleteAllFailed => "DELETE_ALL_USERS_FAILED",
            Self::Cancelled => "CANCELLED",
            Self::Internal(_) => "INTERNAL",
        }
    }

    fn to_response(&self) -> ErrorResponse {
        match self {
            Self::UserNotFound => ErrorResponse::not_found(self.to_string()),
            Self::EmailTaken => ErrorResponse::conflict(self.to_string()),
            Self::PasswordMismatch | Self::Validation(_) => {
                ErrorResponse::validation(self.to_string())
            }
            Self::Role(remote) => remote.clone(),
            Self::Cancelled => ErrorResponse::cancelled(),
            _ => ErrorResponse::internal(self.to_string()),
        }
    }

    fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

impl From<Cancelled> for UserServiceError {
    fn from(_: Cancelled) -> Self {
        Self::Cancelled
    }
}

impl From<UserServiceError> for Status {
    fn from(err: UserServiceError) -> Self {
        if let UserServiceError::Internal(ref e) = err {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        err.to_response().into()
    }
}
