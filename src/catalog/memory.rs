//! In-memory catalog for tests and local development.

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};

use crate::catalog::{EdgeStore, ProductStore};
use crate::models::{Edge, Product};

/// HashMap-backed catalog. Insertions are expected to happen up front;
/// reads dominate afterwards.
#[derive(Default)]
pub struct InMemoryCatalog {
    products: RwLock<HashMap<String, Product>>,
    edges: RwLock<Vec<Edge>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_product(&self, product: Product) {
        self.products.write().insert(product.sku.clone(), product);
    }

    pub fn insert_edge(&self, edge: Edge) {
        self.edges.write().push(edge);
    }

    /// Convenience for fixtures: inserts the edge in both directions with
    /// the same score.
    pub fn insert_pair(&self, a: &Product, b: &Product, score: f64) {
        self.insert_edge(Edge {
            from_sku: a.sku.clone(),
            to_sku: b.sku.clone(),
            target_slot: b.slot,
            score,
        });
        self.insert_edge(Edge {
            from_sku: b.sku.clone(),
            to_sku: a.sku.clone(),
            target_slot: a.slot,
            score,
        });
    }

    pub fn product_count(&self) -> usize {
        self.products.read().len()
    }
}

#[async_trait]
impl ProductStore for InMemoryCatalog {
    async fn get(&self, sku: &str) -> Result<Option<Product>> {
        Ok(self.products.read().get(sku).cloned())
    }

    async fn get_many(&self, skus: &[String]) -> Result<HashMap<String, Product>> {
        let products = self.products.read();
        Ok(skus
            .iter()
            .filter_map(|sku| products.get(sku).map(|p| (sku.clone(), p.clone())))
            .collect())
    }
}

#[async_trait]
impl EdgeStore for InMemoryCatalog {
    async fn neighbors(
        &self,
        sku: &str,
        min_score: f64,
        limit: Option<usize>,
    ) -> Result<Vec<Edge>> {
        let mut out: Vec<Edge> = self
            .edges
            .read()
            .iter()
            .filter(|e| e.from_sku == sku && e.score >= min_score)
            .cloned()
            .collect();

        out.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.to_sku.cmp(&b.to_sku))
        });

        if let Some(limit) = limit {
            out.truncate(limit);
        }
        Ok(out)
    }

    async fn edges_among(&self, skus: &[String]) -> Result<Vec<Edge>> {
        let members: HashSet<&str> = skus.iter().map(|s| s.as_str()).collect();
        Ok(self
            .edges
            .read()
            .iter()
            .filter(|e| members.contains(e.from_sku.as_str()) && members.contains(e.to_sku.as_str()))
            .cloned()
            .collect())
    }
}
