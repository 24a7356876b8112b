//! Per-request context: trace correlation and deadline.
//!
//! Every service, repository, cache and client method takes a
//! `&RequestContext` as its first argument. Dropping the handler future
//! (client disconnect) cancels whatever is in flight; the deadline is
//! enforced by [`RequestContext::guard`].

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tonic::Request;
use tonic::metadata::{MetadataMap, MetadataValue};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";
const GRPC_TIMEOUT_HEADER: &str = "grpc-timeout";

/// Returned when the request deadline passes before an operation completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("request cancelled: deadline exceeded")]
pub struct Cancelled;

#[derive(Debug, Clone)]
pub struct RequestContext {
    trace_id: String,
    deadline: Option<Instant>,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            trace_id: Uuid::new_v4().to_string(),
            deadline: None,
        }
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = trace_id.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Build from inbound metadata: `x-request-id` (set by the request-id
    /// layer or the caller) and the `grpc-timeout` header.
    pub fn from_metadata(metadata: &MetadataMap) -> Self {
        let trace_id = metadata
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let deadline = metadata
            .get(GRPC_TIMEOUT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_grpc_timeout)
            .map(|timeout| Instant::now() + timeout);
        Self { trace_id, deadline }
    }

    pub fn from_request<T>(request: &Request<T>) -> Self {
        Self::from_metadata(request.metadata())
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_some_and(|left| left.is_zero())
    }

    /// Run `fut` until it completes or the deadline passes.
    pub async fn guard<F: Future>(&self, fut: F) -> Result<F::Output, Cancelled> {
        match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, fut)
                .await
                .map_err(|_| Cancelled),
            None => Ok(fut.await),
        }
    }

    /// Wrap an outbound message, propagating the trace id and the remaining deadline.
    pub fn outbound<T>(&self, message: T) -> Request<T> {
        let mut request = Request::new(message);
        if let Ok(value) = MetadataValue::try_from(self.trace_id.as_str()) {
            request.metadata_mut().insert(REQUEST_ID_HEADER, value);
        }
        if let Some(left) = self.remaining() {
            request.set_timeout(left);
        }
        request
    }
}

/// Parse a `grpc-timeout` value such as `"250m"` or `"5S"`.
fn parse_grpc_timeout(value: &str) -> Option<Duration> {
    if value.len() < 2 {
        return None;
    }
    let (amount, unit) = value.split_at(value.len() - 1);
    let amount: u64 = amount.parse().ok()?;
    match unit {
        "H" => Some(Duration::from_secs(amount * 3600)),
        "M" => Some(Duration::from_secs(amount * 60)),
        "S" => Some(Duration::from_secs(amount)),
        "m" => Some(Duration::from_millis(amount)),
        "u" => Some(Duration::from_micros(amount)),
        "n" => Some(Duration::from_nanos(amount)),
        _ => None,
    }
}
