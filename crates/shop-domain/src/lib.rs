//! Domain types shared across all shop services.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers; `infra/` maps to and from them.

pub mod order;
pub mod pagination;
pub mod product;
pub mod response;
pub mod role;
pub mod user;
pub mod view;
