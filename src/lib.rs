//! Stagepass
//!
//! Domain layer of the stagepass storefront: a persisted cart bundling event
//! tickets with a hotel stay, live package quotes, and typed catalog rows.

pub mod cart;
pub mod catalog;
pub mod config;
pub mod favorites;
pub mod observability;
pub mod prelude;
pub mod pricing;
pub mod quote;
pub mod storage;
pub mod store;
pub mod summary;
