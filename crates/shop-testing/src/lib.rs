//! Test utilities for shop services.
//!
//! Provides an in-memory `CacheStore`, in-memory listing helpers that follow
//! the repository paging rules, and entity fixtures.
//! Import from dev-dependencies only, never from production code.

pub mod cache;
pub mod fixture;
pub mod store;
