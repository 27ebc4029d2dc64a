//! Dimension Clusterer
//! Mission: Partition the candidate pool into overlapping themed clusters
//!
//! A cluster is a `(dimension, value)` pair plus the candidates sharing that
//! value. Candidates may appear in several clusters; a cluster that cannot
//! even dress two distinct slots is useless and gets dropped. The selection
//! order is dimension priority first (occasion, aesthetic, color strategy,
//! formality), then mean anchor score, size, and value.

use std::collections::{HashSet, VecDeque};
use tracing::debug;

use crate::looks::color;
use crate::models::{Candidate, Dimension, Look, Product};

pub const MONOCHROME: &str = "Monochrome";
pub const NEUTRAL: &str = "Neutral";
pub const ACCENT: &str = "Accent";
pub const TONAL: &str = "Tonal";

/// A `(dimension, value)` cluster over the candidate pool.
#[derive(Debug, Clone)]
pub struct Cluster {
    pub dimension: Dimension,
    pub value: String,
    /// Anchor's primary color, needed to evaluate color-strategy membership.
    pub anchor_color: String,
    pub members: Vec<Candidate>,
    pub mean_anchor_score: f64,
}

impl Cluster {
    fn new(dimension: Dimension, value: &str, anchor_color: &str, members: Vec<Candidate>) -> Self {
        let mean_anchor_score = if members.is_empty() {
            0.0
        } else {
            members.iter().map(|c| c.anchor_score).sum::<f64>() / members.len() as f64
        };
        Self {
            dimension,
            value: value.to_string(),
            anchor_color: anchor_color.to_string(),
            members,
            mean_anchor_score,
        }
    }

    /// Does `product` share this cluster's dimension value? Used both for
    /// membership and for dimension-agreement scoring (where the anchor
    /// itself is evaluated too).
    pub fn matches(&self, product: &Product) -> bool {
        match self.dimension {
            Dimension::Occasion => product.has_occasion(&self.value),
            Dimension::Aesthetic => product.has_aesthetic(&self.value),
            Dimension::Color => match self.value.as_str() {
                MONOCHROME => color::same_color(&product.primary_color, &self.anchor_color),
                NEUTRAL => color::is_neutral(&product.primary_color),
                ACCENT => color::is_accent_pair(&product.primary_color, &self.anchor_color),
                TONAL => color::is_tonal(&product.primary_color, &self.anchor_color),
                _ => false,
            },
            Dimension::Formality => product
                .formality_score
                .map(|f| f.to_string() == self.value)
                .unwrap_or(false),
        }
    }

    pub fn member_skus(&self) -> HashSet<&str> {
        self.members.iter().map(|c| c.sku()).collect()
    }

    fn distinct_slots(&self) -> usize {
        self.members
            .iter()
            .map(|c| c.slot())
            .collect::<HashSet<_>>()
            .len()
    }
}

/// Build all clusters for `anchor` over the validity-filtered pool, in
/// selection order.
pub fn build_clusters(anchor: &Product, pool: &[Candidate]) -> Vec<Cluster> {
    let mut clusters = Vec::new();
    let anchor_color = anchor.primary_color.as_str();

    for value in dedup_ci(&anchor.occasion) {
        let members = collect(pool, |p| p.has_occasion(value));
        clusters.push(Cluster::new(Dimension::Occasion, value, anchor_color, members));
    }

    for value in dedup_ci(&anchor.aesthetics) {
        let members = collect(pool, |p| p.has_aesthetic(value));
        clusters.push(Cluster::new(Dimension::Aesthetic, value, anchor_color, members));
    }

    // Color strategies. Monochrome, accent and tonal are relative to the
    // anchor's own color; the neutral bucket stands on its own.
    if !anchor_color.is_empty() {
        let members = collect(pool, |p| color::same_color(&p.primary_color, anchor_color));
        clusters.push(Cluster::new(Dimension::Color, MONOCHROME, anchor_color, members));
    }
    let members = collect(pool, |p| color::is_neutral(&p.primary_color));
    clusters.push(Cluster::new(Dimension::Color, NEUTRAL, anchor_color, members));
    if !anchor_color.is_empty() {
        let members = collect(pool, |p| color::is_accent_pair(&p.primary_color, anchor_color));
        clusters.push(Cluster::new(Dimension::Color, ACCENT, anchor_color, members));

        let members = collect(pool, |p| color::is_tonal(&p.primary_color, anchor_color));
        clusters.push(Cluster::new(Dimension::Color, TONAL, anchor_color, members));
    }

    if let Some(anchor_formality) = anchor.formality_score {
        for delta in [-1i16, 0, 1] {
            let value = anchor_formality as i16 + delta;
            if !(1..=5).contains(&value) {
                continue;
            }
            let members = collect(pool, |p| p.formality_score == Some(value as u8));
            clusters.push(Cluster::new(
                Dimension::Formality,
                &value.to_string(),
                anchor_color,
                members,
            ));
        }
    }

    // A cluster must cover at least two distinct non-anchor slots to build
    // even a pair.
    clusters.retain(|c| c.distinct_slots() >= 2);

    clusters.sort_by(|a, b| {
        a.dimension
            .cmp(&b.dimension)
            .then_with(|| {
                b.mean_anchor_score
                    .partial_cmp(&a.mean_anchor_score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| b.members.len().cmp(&a.members.len()))
            .then_with(|| a.value.cmp(&b.value))
    });

    debug!(anchor = %anchor.sku, clusters = clusters.len(), "clusters built");
    clusters
}

fn collect(pool: &[Candidate], pred: impl Fn(&Product) -> bool) -> Vec<Candidate> {
    pool.iter().filter(|c| pred(&c.product)).cloned().collect()
}

fn dedup_ci(values: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    values
        .iter()
        .filter(|v| seen.insert(v.to_ascii_lowercase()))
        .map(|v| v.as_str())
        .collect()
}

/// Orders clusters for look generation and enforces diversity across the
/// emitted set.
pub struct ClusterSelector {
    queue: VecDeque<Cluster>,
    used: HashSet<(Dimension, String)>,
}

impl ClusterSelector {
    pub fn new(clusters: Vec<Cluster>) -> Self {
        Self {
            queue: clusters.into(),
            used: HashSet::new(),
        }
    }

    /// Pop the highest-priority unused cluster whose membership is not a
    /// subset of an already-emitted look. Subset clusters can only produce
    /// duplicate looks under a different label, so they are discarded
    /// outright.
    pub fn next(&mut self, emitted: &[Look]) -> Option<Cluster> {
        while let Some(cluster) = self.queue.pop_front() {
            let pair = (cluster.dimension, cluster.value.clone());
            if self.used.contains(&pair) {
                continue;
            }

            let member_skus = cluster.member_skus();
            let subsumed = emitted.iter().any(|look| {
                let look_skus = look.skus();
                member_skus.iter().all(|sku| look_skus.contains(*sku))
            });
            if subsumed {
                debug!(
                    dimension = cluster.dimension.wire_name(),
                    value = %cluster.value,
                    "cluster subsumed by an emitted look"
                );
                continue;
            }

            self.used.insert(pair);
            return Some(cluster);
        }
        None
    }
}
