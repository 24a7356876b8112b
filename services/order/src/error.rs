use tonic::Status;

use shop_core::context::Cancelled;
use shop_core::error::{DomainError, ErrorResponse};

/// Order service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum OrderServiceError {
    #[error("user not found")]
    UserNotFound,
    #[error("order not found")]
    OrderNotFound,
    #[error("order item not found")]
    OrderItemNotFound,
    /// A line referenced a product that does not exist. Reported as a bad
    /// request: the caller supplied the reference.
    #[error("product not found")]
    ProductNotFound,
    #[error("insufficient stock for product '{name}'")]
    InsufficientStock {
        name: String,
        requested: i32,
        available: i32,
    },
    #[error("{0} service unavailable")]
    UpstreamUnavailable(&'static str),
    #[error("failed to update product stock")]
    StockUpdateFailed,
    #[error("{0}")]
    Validation(String),
    #[error("failed to fetch orders")]
    FindFailed,
    #[error("failed to create order")]
    CreateFailed,
    #[error("failed to create order item")]
    CreateItemFailed,
    #[error("failed to update order")]
    UpdateFailed,
    #[error("failed to finalize order")]
    FinalizeFailed,
    #[error("failed to trash order")]
    TrashFailed,
    #[error("failed to restore order")]
    RestoreFailed,
    #[error("failed to delete order permanently")]
    DeleteFailed,
    #[error("failed to restore all orders")]
    RestoreAllFailed,
    #[error("failed to delete all orders permanently")]
    DeleteAllFailed,
    #[error("failed to fetch order items")]
    FindItemsFailed,
    #[error("failed to trash order item")]
    TrashItemFailed,
    #[error("failed to restore order item")]
    RestoreItemFailed,
    #[error("failed to delete order item permanently")]
    DeleteItemFailed,
    #[error("failed to restore all order items")]
    RestoreAllItemsFailed,
    #[error("failed to delete all order items permanently")]
    DeleteAllItemsFailed,
    #[error("request cancelled")]
    Cancelled,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl DomainError for OrderServiceError {
    fn kind(&self) -> &'static str {
        match self {
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::OrderNotFound => "ORDER_NOT_FOUND",
            Self::OrderItemNotFound => "ORDER_ITEM_NOT_FOUND",
            Self::ProductNotFound => "PRODUCT_NOT_FOUND",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            Self::StockUpdateFailed => "STOCK_UPDATE_FAILED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::FindFailed => "FIND_ORDERS_FAILED",
            Self::CreateFailed => "CREATE_ORDER_FAILED",
            Self::CreateItemFailed => "CREATE_ORDER_ITEM_FAILED",
            Self::UpdateFailed => "UPDATE_ORDER_FAILED",
            Self::FinalizeFailed => "FINALIZE_ORDER_FAILED",
            Self::TrashFailed => "TRASH_ORDER_FAILED",
            Self::RestoreFailed => "RESTORE_ORDER_FAILED",
            Self::DeleteFailed => "DELETE_ORDER_FAILED",
            Self::RestoreAllFailed => "RESTORE_ALL_ORDERS_FAILED",
            Self::DeleteAllFailed => "DELETE_ALL_ORDERS_FAILED",
            Self::FindItemsFailed => "FIND_ORDER_ITEMS_FAILED",
            Self::TrashItemFailed => "TRASH_ORDER_ITEM_FAILED",
            Self::RestoreItemFailed => "RESTORE_ORDER_ITEM_FAILED",
            Self::DeleteItemFailed => "DELETE_ORDER_ITEM_FAILED",
            Self::RestoreAllItemsFailed => "RESTORE_ALL_ORDER_ITEMS_FAILED",
            Self::DeleteAllItemsFailed => "DELETE_ALL_ORDER_ITEMS_FAILED",
            Self::Cancelled => "CANCELLED",
            Self::Internal(_) => "INTERNAL",
        }
    }

    fn to_response(&self) -> ErrorResponse {
        match self {
            Self::UserNotFound | Self::OrderNotFound | Self::OrderItemNotFound => {
                ErrorResponse::not_found(self.to_string())
            }
            Self::ProductNotFound | Self::InsufficientStock { .. } | Self::Validation(_) => {
                ErrorResponse::validation(self.to_string())
            }
            Self::UpstreamUnavailable(service) => ErrorResponse::upstream_unavailable(service),
            Self::StockUpdateFailed => {
                ErrorResponse::new(shop_core::error::UNAVAILABLE, self.to_string())
            }
            Self::Cancelled => ErrorResponse::cancelled(),
            _ => ErrorResponse::internal(self.to_string()),
        }
    }

    fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

impl From<Cancelled> for OrderServiceError {
    fn from(_: Cancelled) -> Self {
        Self::Cancelled
    }
}

impl From<OrderServiceError> for Status {
    fn from(err: OrderServiceError) -> Self {
        if let OrderServiceError::Internal(ref e) = err {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        err.to_response().into()
    }
}
