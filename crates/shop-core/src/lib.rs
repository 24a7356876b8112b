//! Cross-cutting infrastructure shared by every shop service: the error
//! taxonomy, request context, cache protocol, sea-orm helpers and the
//! tracing / config / health plumbing.

pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod error_handler;
pub mod health;
pub mod middleware;
pub mod sea_ext;
pub mod timestamp;
pub mod tracing;
