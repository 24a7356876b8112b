use serde::{Deserialize, Serialize};
use tonic::{Code, Status};

use shop_domain::response::STATUS_ERROR;

pub const BAD_REQUEST: u16 = 400;
pub const UNAUTHORIZED: u16 = 401;
pub const FORBIDDEN: u16 = 403;
pub const NOT_FOUND: u16 = 404;
pub const CONFLICT: u16 = 409;
pub const UNPROCESSABLE: u16 = 422;
pub const TOO_MANY_REQUESTS: u16 = 429;
pub const CLIENT_CLOSED: u16 = 499;
pub const INTERNAL: u16 = 500;
pub const UNAVAILABLE: u16 = 503;
pub const GATEWAY_TIMEOUT: u16 = 504;

/// Error payload carried across service boundaries.
///
/// Serialized as JSON into the gRPC status message:
/// `{ "status": "error", "message": "...", "code": 404 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            status: STATUS_ERROR.to_owned(),
            message: message.into(),
            code,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(CONFLICT, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(INTERNAL, message)
    }

    pub fn upstream_unavailable(service: &str) -> Self {
        Self::new(UNAVAILABLE, format!("{service} service unavailable"))
    }

    pub fn cancelled() -> Self {
        Self::new(CLIENT_CLOSED, "request cancelled")
    }

    pub fn deadline_exceeded() -> Self {
        Self::new(GATEWAY_TIMEOUT, "deadline exceeded")
    }

    pub fn grpc_code(&self) -> Code {
        grpc_code_for(self.code)
    }

    pub fn is_not_found(&self) -> bool {
        self.code == NOT_FOUND
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.code, CLIENT_CLOSED | GATEWAY_TIMEOUT)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.message.clone())
    }

    /// Decode the error a remote service returned.
    ///
    /// A JSON payload is preserved as-is. Cancellation and deadline codes keep
    /// their meaning; everything else becomes `UpstreamUnavailable(service)`.
    pub fn from_status(status: &Status, service: &str) -> Self {
        if let Ok(remote) = serde_json::from_str::<ErrorResponse>(status.message()) {
            return remote;
        }
        match status.code() {
            Code::Cancelled => Self::cancelled(),
            Code::DeadlineExceeded => Self::deadline_exceeded(),
            _ => Self::upstream_unavailable(service),
        }
    }
}

/// HTTP-like status → gRPC code.
pub fn grpc_code_for(code: u16) -> Code {
    match code {
        BAD_REQUEST => Code::InvalidArgument,
        UNAUTHORIZED => Code::Unauthenticated,
        FORBIDDEN => Code::PermissionDenied,
        NOT_FOUND => Code::NotFound,
        CONFLICT => Code::Aborted,
        UNPROCESSABLE => Code::FailedPrecondition,
        TOO_MANY_REQUESTS => Code::ResourceExhausted,
        CLIENT_CLOSED => Code::Cancelled,
        INTERNAL => Code::Internal,
        UNAVAILABLE => Code::Unavailable,
        GATEWAY_TIMEOUT => Code::DeadlineExceeded,
        _ => Code::Unknown,
    }
}

impl From<ErrorResponse> for Status {
    fn from(err: ErrorResponse) -> Self {
        Status::new(err.grpc_code(), err.to_json())
    }
}

/// Implemented by each service's error enum so the shared error handler and
/// the gRPC boundary can treat them uniformly.
pub trait DomainError: std::error::Error + Send + Sync + 'static {
    /// Stable machine-readable token, e.g. `PRODUCT_NOT_FOUND`.
    fn kind(&self) -> &'static str;

    /// Payload sent to clients.
    fn to_response(&self) -> ErrorResponse;

    /// `true` for raw repository / infrastructure failures that must be
    /// replaced by a canonical per-operation error before leaving the service.
    fn is_internal(&self) -> bool;
}
