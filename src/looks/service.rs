//! Look Generation Service
//! Mission: Turn one anchor SKU into a handful of coherent outfits
//!
//! The only public entry point of the core. Owns the fingerprint cache and
//! drives the fixed pipeline: edges first, then a single batched metadata
//! fetch, then pure CPU work (filter, cluster, assemble, score) with no
//! further suspension points.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::catalog::{EdgeStore, ProductStore};
use crate::config::LookConfig;
use crate::error::{LookError, Result};
use crate::looks::assembler;
use crate::looks::cache::FingerprintCache;
use crate::looks::cluster::{self, ClusterSelector};
use crate::looks::scorer::PairScoreTable;
use crate::looks::validity;
use crate::models::{Candidate, GeneratedLook, Look, LookItem, LooksResponse, Product};

/// Bound on each external store call.
const STORE_TIMEOUT: Duration = Duration::from_millis(300);

/// Soft bound on one uncached generate.
const REQUEST_TIMEOUT: Duration = Duration::from_millis(1_000);

pub struct LookService {
    products: Arc<dyn ProductStore>,
    edges: Arc<dyn EdgeStore>,
    cache: FingerprintCache,
    config: LookConfig,
}

impl LookService {
    pub fn new(
        products: Arc<dyn ProductStore>,
        edges: Arc<dyn EdgeStore>,
        config: LookConfig,
    ) -> Self {
        let cache = FingerprintCache::new(config.cache_ttl_seconds, config.cache_capacity);
        Self {
            products,
            edges,
            cache,
            config,
        }
    }

    /// Generate up to `num_looks` distinct looks around `anchor_sku`.
    ///
    /// An unknown anchor is an error; an anchor with no usable candidates is
    /// not — it yields a successful response with zero looks.
    pub async fn generate(&self, anchor_sku: &str, num_looks: usize) -> Result<Arc<LooksResponse>> {
        if num_looks < 1 || num_looks > self.config.max_looks {
            return Err(LookError::InvalidArgument {
                got: num_looks,
                max: self.config.max_looks,
            });
        }

        let fingerprint = (anchor_sku.to_string(), num_looks);
        if let Some(cached) = self.cache.get(&fingerprint) {
            debug!(anchor = anchor_sku, num_looks, "fingerprint cache hit");
            return Ok(cached);
        }

        let response = timeout(REQUEST_TIMEOUT, self.generate_uncached(anchor_sku, num_looks))
            .await
            .map_err(|_| LookError::StoreUnavailable("look generation timed out".into()))??;

        let response = Arc::new(response);
        self.cache.put(fingerprint, response.clone());
        Ok(response)
    }

    async fn generate_uncached(&self, anchor_sku: &str, num_looks: usize) -> Result<LooksResponse> {
        let anchor = self
            .bounded(self.products.get(anchor_sku), "product store get")
            .await?
            .ok_or_else(|| LookError::AnchorNotFound(anchor_sku.to_string()))?;

        let anchor_edges = self
            .bounded(
                self.edges
                    .neighbors(anchor_sku, self.config.min_edge_score, None),
                "edge store neighbors",
            )
            .await?;

        if anchor_edges.is_empty() {
            debug!(anchor = anchor_sku, "no edges above threshold");
            return Ok(empty_response(&anchor));
        }

        // Pair table over the whole pool, anchor included: one batched edge
        // read, issued before the metadata fetch.
        let peer_skus: Vec<String> = anchor_edges.iter().map(|e| e.to_sku.clone()).collect();
        let mut pool_skus = peer_skus.clone();
        pool_skus.push(anchor_sku.to_string());
        let pool_edges = self
            .bounded(self.edges.edges_among(&pool_skus), "edge store edges_among")
            .await?;

        let mut table = PairScoreTable::from_edges(&anchor_edges);
        for edge in &pool_edges {
            table.insert(&edge.from_sku, &edge.to_sku, edge.score);
        }

        let peer_products = self
            .bounded(self.products.get_many(&peer_skus), "product store get_many")
            .await?;

        let mut candidates = Vec::with_capacity(anchor_edges.len());
        for edge in &anchor_edges {
            match peer_products.get(&edge.to_sku) {
                Some(product) if product.slot == edge.target_slot => {
                    candidates.push(Candidate {
                        product: product.clone(),
                        anchor_score: edge.score,
                    });
                }
                Some(product) => {
                    warn!(
                        peer = %edge.to_sku,
                        stored = product.slot.wire_name(),
                        edge = edge.target_slot.wire_name(),
                        "edge target slot disagrees with product; peer dropped"
                    );
                }
                None => {
                    debug!(peer = %edge.to_sku, "peer missing from product store; dropped");
                }
            }
        }

        if candidates.is_empty() {
            // Edges exist but none of their peers resolved: the stores
            // disagree with each other.
            warn!(anchor = anchor_sku, "no edge peers could be resolved");
            return Err(LookError::StoreUnavailable(
                "edge peers missing from product store".into(),
            ));
        }

        let pool = validity::filter_pool(&anchor, candidates, &self.config);
        if pool.is_empty() {
            debug!(anchor = anchor_sku, "candidate pool empty after filtering");
            return Ok(empty_response(&anchor));
        }

        let clusters = cluster::build_clusters(&anchor, &pool);
        let mut selector = ClusterSelector::new(clusters);
        let mut looks: Vec<Look> = Vec::new();
        let mut seen_sets = HashSet::new();

        while looks.len() < num_looks {
            let Some(cluster) = selector.next(&looks) else {
                break;
            };
            if let Some(look) = assembler::assemble(&anchor, &cluster, &table, &self.config) {
                if seen_sets.insert(look.skus()) {
                    looks.push(look);
                } else {
                    debug!(
                        dimension = cluster.dimension.wire_name(),
                        value = %cluster.value,
                        "look discarded: duplicate item set"
                    );
                }
            }
        }

        let generated: Vec<GeneratedLook> = looks
            .iter()
            .enumerate()
            .map(|(i, look)| GeneratedLook::from_look(look, i + 1))
            .collect();

        debug!(anchor = anchor_sku, looks = generated.len(), "looks generated");
        Ok(LooksResponse {
            anchor: LookItem::from_product(&anchor),
            total_looks: generated.len(),
            looks: generated,
        })
    }

    /// Run one store call under the per-call timeout, folding transport
    /// failures into `StoreUnavailable`.
    async fn bounded<T>(
        &self,
        fut: impl Future<Output = anyhow::Result<T>>,
        what: &str,
    ) -> Result<T> {
        match timeout(STORE_TIMEOUT, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!(call = what, error = %e, "store call failed");
                Err(LookError::StoreUnavailable(format!("{}: {}", what, e)))
            }
            Err(_) => {
                warn!(call = what, "store call timed out");
                Err(LookError::StoreUnavailable(format!("{} timed out", what)))
            }
        }
    }
}

fn empty_response(anchor: &Product) -> LooksResponse {
    LooksResponse {
        anchor: LookItem::from_product(anchor),
        looks: vec![],
        total_looks: 0,
    }
}
