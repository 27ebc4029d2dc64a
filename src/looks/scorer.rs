//! Coherence Scorer
//! Mission: Score candidate fits and finished looks from one pair table
//!
//! All pairwise compatibility reads during assembly go through a
//! request-local table materialized from the store's edges up front, so the
//! hot loop never touches I/O.

use std::collections::HashMap;

use crate::config::CoherenceWeights;
use crate::looks::cluster::Cluster;
use crate::models::{Edge, Product, Slot};

/// Symmetric `(sku, sku) -> score` lookup. Directions are collapsed by
/// keeping the max of the two stored edges; absent pairs score 0.
#[derive(Debug, Default)]
pub struct PairScoreTable {
    scores: HashMap<(String, String), f64>,
}

impl PairScoreTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_edges(edges: &[Edge]) -> Self {
        let mut table = Self::new();
        for edge in edges {
            table.insert(&edge.from_sku, &edge.to_sku, edge.score);
        }
        table
    }

    pub fn insert(&mut self, a: &str, b: &str, score: f64) {
        let key = Self::key(a, b);
        let entry = self.scores.entry(key).or_insert(0.0);
        if score > *entry {
            *entry = score;
        }
    }

    pub fn score(&self, a: &str, b: &str) -> f64 {
        self.scores.get(&Self::key(a, b)).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    fn key(a: &str, b: &str) -> (String, String) {
        if a <= b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        }
    }
}

/// Marginal coherence of adding `candidate` to the partial look: mean pair
/// score against the items already chosen, plus a weighted bonus for
/// keeping the cluster's dimension value unanimous.
pub fn coherence_increment(
    candidate: &Product,
    look_items: &[Product],
    cluster: &Cluster,
    table: &PairScoreTable,
    weights: &CoherenceWeights,
) -> f64 {
    if look_items.is_empty() {
        return 0.0;
    }

    let mean = look_items
        .iter()
        .map(|p| table.score(&candidate.sku, &p.sku))
        .sum::<f64>()
        / look_items.len() as f64;

    let matching = look_items
        .iter()
        .filter(|p| cluster.matches(p))
        .count()
        + usize::from(cluster.matches(candidate));
    let bonus = matching as f64 / (look_items.len() + 1) as f64;

    mean + bonus * weights.beta
}

/// Final reported score of a finished look. Informational only; looks are
/// peers and must not be ranked by this value.
pub fn look_coherence(
    items: &[Product],
    slots_filled: usize,
    cluster: &Cluster,
    table: &PairScoreTable,
    weights: &CoherenceWeights,
) -> f64 {
    let n = items.len();

    let mut pair_sum = 0.0;
    let mut pairs = 0usize;
    for i in 0..n {
        for j in (i + 1)..n {
            pair_sum += table.score(&items[i].sku, &items[j].sku);
            pairs += 1;
        }
    }
    let mean_pairwise = if pairs > 0 { pair_sum / pairs as f64 } else { 0.0 };

    let agreement = if n > 0 {
        items.iter().filter(|p| cluster.matches(p)).count() as f64 / n as f64
    } else {
        0.0
    };

    let coverage = slots_filled as f64 / Slot::COUNT as f64;

    round3(weights.alpha * mean_pairwise + weights.beta * agreement + weights.gamma * coverage)
}

/// Scores carry three decimal digits of precision on the wire.
pub fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}
