use tonic::Status;

use shop_core::context::Cancelled;
use shop_core::error::{DomainError, ErrorResponse};

/// Product service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum ProductServiceError {
    #[error("product not found")]
    ProductNotFound,
    #[error("product name already exists")]
    NameTaken,
    #[error("{0}")]
    Validation(String),
    #[error("stock cannot be negative")]
    NegativeStock,
    #[error("failed to fetch products")]
    FindFailed,
    #[error("failed to create product")]
    CreateFailed,
    #[error("failed to update product")]
    UpdateFailed,
    #[error("failed to update product stock")]
    UpdateStockFailed,
    #[error("failed to trash product")]
    TrashFailed,
    #[error("failed to restore product")]
    RestoreFailed,
    #[error("failed to delete product permanently")]
    DeleteFailed,
    #[error("failed to restore all products")]
    RestoreAllFailed,
    #[error("failed to delete all products permanently")]
    DeleteAllFailed,
    #[error("request cancelled")]
    Cancelled,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl DomainError for ProductServiceError {
    fn kind(&self) -> &'static str {
        match self {
            Self::ProductNotFound => "PRODUCT_NOT_FOUND",
            Self::NameTaken => "PRODUCT_ALREADY_EXISTS",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NegativeStock => "NEGATIVE_STOCK",
            Self::FindFailed => "FIND_PRODUCTS_FAILED",
            Self::CreateFailed => "CREATE_PRODUCT_FAILED",
            Self::UpdateFailed => "UPDATE_PRODUCT_FAILED",
            Self::UpdateStockFailed => "UPDATE_PRODUCT_STOCK_FAILED",
            Self::TrashFailed => "TRASH_PRODUCT_FAILED",
            Self::RestoreFailed => "RESTORE_PRODUCT_FAILED",
            Self::DeleteFailed => "DELETE_PRODUCT_FAILED",
            Self::RestoreAllFailed => "RESTORE_ALL_PRODUCTS_FAILED",
            Self::DeleteAllFailed => "DELETE_ALL_PRODUCTS_FAILED",
            Self::Cancelled => "CANCELLED",
            Self::Internal(_) => "INTERNAL",
        }
    }

    fn to_response(&self) -> ErrorResponse {
        match self {
            Self::ProductNotFound => ErrorResponse::not_found(self.to_string()),
            Self::NameTaken => ErrorResponse::conflict(self.to_string()),
            Self::Validation(_) | Self::NegativeStock => ErrorResponse::validation(self.to_string()),
            Self::Cancelled => ErrorResponse::cancelled(),
            _ => ErrorResponse::internal(self.to_string()),
        }
    }

    fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

impl From<Cancelled> for ProductServiceError {
    fn from(_: Cancelled) -> Self {
        Self::Cancelled
    }
}

impl From<ProductServiceError> for Status {
    fn from(err: ProductServiceError) -> Self {
        if let ProductServiceError::Internal(ref e) = err {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        err.to_response().into()
    }
}
