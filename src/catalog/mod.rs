//! Catalog Stores
//! Mission: Read-side access to products and the compatibility graph
//!
//! The generator consumes two interfaces: a keyed product lookup and an
//! indexed edge lookup. Production data is served from SQLite; tests and
//! local development run against the in-memory catalog.

pub mod memory;
pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

use crate::models::{Edge, Product};

pub use memory::InMemoryCatalog;
pub use sqlite::SqliteCatalog;

/// Keyed `sku -> Product` lookup.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn get(&self, sku: &str) -> Result<Option<Product>>;

    /// Batch lookup. Missing keys are omitted from the returned map.
    async fn get_many(&self, skus: &[String]) -> Result<HashMap<String, Product>>;
}

/// Indexed access to the precomputed compatibility graph.
#[async_trait]
pub trait EdgeStore: Send + Sync {
    /// Edges out of `sku` with `score >= min_score`, ordered by score
    /// descending, ties broken by peer SKU ascending. `limit = None` means
    /// all qualifying edges.
    async fn neighbors(&self, sku: &str, min_score: f64, limit: Option<usize>)
        -> Result<Vec<Edge>>;

    /// All stored edges whose endpoints both lie in `skus`. Feeds the
    /// request-local pairwise score table.
    async fn edges_among(&self, skus: &[String]) -> Result<Vec<Edge>>;
}
