//! Infrastructure layer: product persistence and configuration.

pub mod config;
pub mod store;


pub use config::StoreConfig;
pub use store::{
    InMemoryProductStore, MissingIdPolicy, ProductCounts, ProductStore, SqliteProductStore,
    StoreError,
};
