//! Products domain module.
//!
//! This crate contains the catalog's product entity and its active/deleted
//! lifecycle, implemented purely as deterministic domain logic (no IO, no
//! HTTP, no storage).

pub mod product;

pub use catalog_core::ProductId;
pub use product::{Product, ProductDetails, ProductState};
