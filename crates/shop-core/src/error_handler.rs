//! Span-per-operation tracing and the shared error handler.
//!
//! ```ignore
//! let mut op = Operation::start(ctx, "CreateProduct");
//! let product = match self.repo.create(ctx, &input).await {
//!     Ok(p) => p,
//!     Err(e) => return op.fail(e, "create_product", ProductServiceError::CreateFailed),
//! };
//! ```

use std::fmt::Display;
use std::time::Instant;

use tracing::{Span, field};
use uuid::Uuid;

use crate::context::RequestContext;
use crate::error::DomainError;

pub const STATUS_OK: &str = "success";

/// One traced service operation. Logs on start, records the outcome on the
/// span, and logs the end (with status and elapsed time) when dropped.
pub struct Operation {
    method: &'static str,
    span: Span,
    status: String,
    started: Instant,
}

impl Operation {
    pub fn start(ctx: &RequestContext, method: &'static str) -> Self {
        let span = tracing::info_span!(
            "rpc",
            method,
            trace_id = %ctx.trace_id(),
            status = field::Empty,
            error_id = field::Empty,
            otel.status_code = field::Empty,
            error.message = field::Empty,
        );
        span.in_scope(|| tracing::debug!(method, "starting operation"));
        Self {
            method,
            span,
            status: STATUS_OK.to_owned(),
            started: Instant::now(),
        }
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn method(&self) -> &'static str {
        self.method
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Log a cache hit inside the operation span.
    pub fn cache_hit(&self, key: &str) {
        self.span
            .in_scope(|| tracing::debug!(method = self.method, key, "cache hit"));
    }

    /// Handle a failed step.
    ///
    /// Raw repository failures (`is_internal`) are replaced by `canonical`;
    /// domain errors pass through unchanged. Either way the original error is
    /// logged with a correlation id keyed by `trace_prefix`, recorded on the
    /// span, and the status slot is set to the snake-cased message of the
    /// returned error.
    pub fn fail<T, E: DomainError>(
        &mut self,
        err: E,
        trace_prefix: &str,
        canonical: E,
    ) -> Result<T, E> {
        self.fail_with(err, trace_prefix, canonical, &[])
    }

    /// Like [`fail`](Self::fail) with extra structured fields in the log line.
    pub fn fail_with<T, E: DomainError>(
        &mut self,
        err: E,
        trace_prefix: &str,
        canonical: E,
        fields: &[(&str, &dyn Display)],
    ) -> Result<T, E> {
        let mut original = None;
        let returned = if err.is_internal() {
            original = Some(err.to_string());
            canonical
        } else {
            err
        };
        self.record_with_cause(trace_prefix, &returned, original.as_deref(), fields);
        Err(returned)
    }

    /// Record a domain rejection that did not come from a lower layer
    /// (validation, not-found, stock rule).
    pub fn reject<T, E: DomainError>(&mut self, err: E, trace_prefix: &str) -> Result<T, E> {
        self.record_with_cause(trace_prefix, &err, None, &[]);
        Err(err)
    }

    fn record_with_cause<E: DomainError>(
        &mut self,
        trace_prefix: &str,
        err: &E,
        cause: Option<&str>,
        fields: &[(&str, &dyn Display)],
    ) {
        let error_id = correlation_id(trace_prefix);
        let extra = render_fields(fields);
        let response = err.to_response();
        self.status = snake_case(&response.message);

        self.span.record("status", self.status.as_str());
        self.span.record("error_id", error_id.as_str());
        self.span.record("otel.status_code", "ERROR");
        self.span.record("error.message", response.message.as_str());

        self.span.in_scope(|| {
            tracing::error!(
                method = self.method,
                error_id = %error_id,
                kind = err.kind(),
                code = response.code,
                error = %err,
                cause = cause.unwrap_or(""),
                fields = %extra,
                "operation failed"
            );
        });
    }
}

impl Drop for Operation {
    fn drop(&mut self) {
        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        self.span.record("status", self.status.as_str());
        self.span.in_scope(|| {
            tracing::info!(
                method = self.method,
                status = %self.status,
                elapsed_ms,
                "operation finished"
            );
        });
    }
}

/// `"{prefix}-{8 hex chars}"`, short enough to quote in a support ticket.
pub fn correlation_id(trace_prefix: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{trace_prefix}-{}", &id[..8])
}

/// `"Failed to create order"` → `"failed_to_create_order"`.
pub fn snake_case(message: &str) -> String {
    let mut out = String::with_capacity(message.len());
    let mut pending_sep = false;
    for ch in message.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}

fn render_fields(fields: &[(&str, &dyn Display)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(" ")
}
