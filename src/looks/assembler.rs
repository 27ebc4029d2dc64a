//! Look Assembler
//! Mission: Fill wardrobe slots greedily without breaking fashion rules
//!
//! Assembly is a pure function of the anchor, the cluster, and the pair
//! table. Slots are attempted in a fixed order; each pick maximises the
//! coherence increment subject to the pairwise rules against everything
//! already in the look.

use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

use crate::config::LookConfig;
use crate::looks::cluster::{Cluster, ACCENT};
use crate::looks::color;
use crate::looks::scorer::{self, PairScoreTable};
use crate::models::{Candidate, Dimension, Look, Product, Slot};

/// Outerwear categories that read as closed silhouettes.
const CLOSED_OUTERWEAR: [&str; 4] = ["hoodie", "knit", "puffer", "zip jacket"];

fn is_closed_outerwear(product: &Product) -> bool {
    product.slot == Slot::Outerwear
        && CLOSED_OUTERWEAR
            .iter()
            .any(|c| product.category.eq_ignore_ascii_case(c))
}

/// Pairwise fashion rules between two items of the same look.
fn pair_allowed(a: &Product, b: &Product, config: &LookConfig) -> bool {
    if a.sku == b.sku {
        return false;
    }

    if let (Some(fa), Some(fb)) = (a.formality_score, b.formality_score) {
        if fa.abs_diff(fb) > config.intra_look_formality_spread {
            return false;
        }
    }

    // A statement top tolerates neither athletic bottoms nor closed
    // outerwear in the same look.
    for (top, other) in [(a, b), (b, a)] {
        if top.is_statement_top() {
            if other.slot.is_bottom() && other.has_aesthetic("Athletic") {
                return false;
            }
            if is_closed_outerwear(other) {
                return false;
            }
        }
    }

    true
}

/// Accessory color constraint against the non-accessory palette of the
/// partial look. Items without color data stay unconstrained.
fn accessory_palette_allowed(candidate: &Product, look_items: &[Product], cluster: &Cluster) -> bool {
    let palette: Vec<&str> = look_items
        .iter()
        .filter(|p| p.slot != Slot::Accessory)
        .map(|p| p.primary_color.as_str())
        .filter(|c| !c.is_empty())
        .collect();
    if palette.is_empty() || candidate.primary_color.is_empty() {
        return true;
    }

    let accessory_color = candidate.primary_color.as_str();
    let distinct: HashSet<String> = palette.iter().map(|c| c.to_ascii_lowercase()).collect();
    let in_palette = distinct.contains(&accessory_color.to_ascii_lowercase());

    // Monochrome palette: the palette color or a neutral
    if distinct.len() == 1 {
        return color::is_neutral(accessory_color) || in_palette;
    }

    // All-neutral palette: stay neutral or repeat a palette color
    if palette.iter().all(|c| color::is_neutral(c)) {
        return color::is_neutral(accessory_color) || in_palette;
    }

    // Accent strategy: the accent color or a neutral
    if cluster.dimension == Dimension::Color && cluster.value == ACCENT {
        return color::is_neutral(accessory_color)
            || color::is_accent_pair(accessory_color, &cluster.anchor_color);
    }

    true
}

/// Assemble one look for `cluster` around `anchor`. Returns `None` when the
/// result would break the footwear-or-accessory rule or stay below three
/// pieces.
pub fn assemble(
    anchor: &Product,
    cluster: &Cluster,
    table: &PairScoreTable,
    config: &LookConfig,
) -> Option<Look> {
    // Slot index over the cluster, built once; the greedy loop below only
    // ever looks at one slot's bucket.
    let mut by_slot: HashMap<Slot, Vec<&Candidate>> = HashMap::new();
    for candidate in &cluster.members {
        by_slot.entry(candidate.slot()).or_default().push(candidate);
    }

    let mut items: Vec<Product> = vec![anchor.clone()];
    let mut slots_filled: Vec<Slot> = vec![anchor.slot];

    for slot in Slot::ASSEMBLY_ORDER {
        if slot == anchor.slot {
            continue;
        }
        let Some(bucket) = by_slot.get(&slot) else {
            continue;
        };

        let mut best: Option<(f64, f64, &Candidate)> = None;
        for &candidate in bucket {
            if items.iter().any(|p| !pair_allowed(p, &candidate.product, config)) {
                continue;
            }
            if slot == Slot::Accessory
                && !accessory_palette_allowed(&candidate.product, &items, cluster)
            {
                continue;
            }

            let increment = scorer::coherence_increment(
                &candidate.product,
                &items,
                cluster,
                table,
                &config.coherence_weights,
            );

            let better = match &best {
                None => true,
                Some((best_inc, best_score, best_cand)) => {
                    increment > *best_inc
                        || (increment == *best_inc
                            && (candidate.anchor_score > *best_score
                                || (candidate.anchor_score == *best_score
                                    && candidate.sku() < best_cand.sku())))
                }
            };
            if better {
                best = Some((increment, candidate.anchor_score, candidate));
            }
        }

        if let Some((_, _, chosen)) = best {
            items.push(chosen.product.clone());
            slots_filled.push(slot);
        }
    }

    let grounded = slots_filled
        .iter()
        .any(|s| matches!(s, Slot::Footwear | Slot::Accessory));
    if !grounded {
        debug!(
            dimension = cluster.dimension.wire_name(),
            value = %cluster.value,
            "look rejected: neither footwear nor accessory filled"
        );
        return None;
    }

    if items.len() < 3 {
        debug!(
            dimension = cluster.dimension.wire_name(),
            value = %cluster.value,
            size = items.len(),
            "look rejected: below minimum size"
        );
        return None;
    }

    let coherence = scorer::look_coherence(
        &items,
        slots_filled.len(),
        cluster,
        table,
        &config.coherence_weights,
    );

    let items: BTreeMap<Slot, Product> = items.into_iter().map(|p| (p.slot, p)).collect();
    Some(Look {
        dimension: cluster.dimension,
        dimension_value: cluster.value.clone(),
        items,
        slots_filled,
        coherence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::looks::cluster::build_clusters;

    fn product(sku: &str, slot: Slot) -> Product {
        Product {
            sku: sku.to_string(),
            slot,
            occasion: vec!["Gym".into()],
            aesthetics: vec![],
            season: vec![],
            formality_score: Some(1),
            formality_level: String::new(),
            primary_color: String::new(),
            statement_piece: false,
            title: String::new(),
            brand: String::new(),
            image_url: String::new(),
            item_type: String::new(),
            category: String::new(),
        }
    }

    fn candidate(sku: &str, slot: Slot, score: f64) -> Candidate {
        Candidate {
            product: product(sku, slot),
            anchor_score: score,
        }
    }

    fn anchor() -> Product {
        product("ANCHOR", Slot::BaseTop)
    }

    /// First cluster over the pool for a plain gym anchor.
    fn cluster_of(pool: Vec<Candidate>) -> Cluster {
        let mut clusters = build_clusters(&anchor(), &pool);
        assert!(!clusters.is_empty(), "fixture pool built no clusters");
        clusters.remove(0)
    }

    #[test]
    fn test_greedy_fill_prefers_higher_increment() {
        let pool = vec![
            candidate("SHOE_LOW", Slot::Footwear, 0.6),
            candidate("SHOE_HIGH", Slot::Footwear, 0.6),
            candidate("CAP", Slot::Accessory, 0.8),
        ];
        let cluster = cluster_of(pool);

        let mut table = PairScoreTable::new();
        table.insert("ANCHOR", "SHOE_HIGH", 0.9);
        table.insert("ANCHOR", "SHOE_LOW", 0.5);
        table.insert("ANCHOR", "CAP", 0.8);

        let look = assemble(&anchor(), &cluster, &table, &LookConfig::default()).unwrap();
        assert_eq!(look.items[&Slot::Footwear].sku, "SHOE_HIGH");
        assert_eq!(look.slots_filled, vec![Slot::BaseTop, Slot::Footwear, Slot::Accessory]);
    }

    #[test]
    fn test_tie_breaks_on_anchor_score_then_sku() {
        // Identical pair scores; B wins on anchor score, then A on sku
        let pool = vec![
            candidate("SHOE_B", Slot::Footwear, 0.9),
            candidate("SHOE_A", Slot::Footwear, 0.6),
            candidate("CAP", Slot::Accessory, 0.8),
        ];
        let cluster = cluster_of(pool);
        let table = PairScoreTable::new();

        let look = assemble(&anchor(), &cluster, &table, &LookConfig::default()).unwrap();
        assert_eq!(look.items[&Slot::Footwear].sku, "SHOE_B");

        let pool = vec![
            candidate("SHOE_B", Slot::Footwear, 0.7),
            candidate("SHOE_A", Slot::Footwear, 0.7),
            candidate("CAP", Slot::Accessory, 0.8),
        ];
        let cluster = cluster_of(pool);
        let look = assemble(&anchor(), &cluster, &table, &LookConfig::default()).unwrap();
        assert_eq!(look.items[&Slot::Footwear].sku, "SHOE_A");
    }

    #[test]
    fn test_rejects_look_without_footwear_or_accessory() {
        let pool = vec![
            candidate("JACKET", Slot::Outerwear, 0.9),
            candidate("PANTS", Slot::PrimaryBottom, 0.8),
        ];
        let cluster = cluster_of(pool);
        let table = PairScoreTable::new();

        assert!(assemble(&anchor(), &cluster, &table, &LookConfig::default()).is_none());
    }

    #[test]
    fn test_rejects_look_below_minimum_size() {
        // Bottom is knocked out by the intra-look formality spread, leaving
        // anchor + footwear only
        let mut far = candidate("PANTS", Slot::PrimaryBottom, 0.9);
        far.product.formality_score = Some(4);
        let pool = vec![far, candidate("SHOE", Slot::Footwear, 0.8)];
        let cluster = cluster_of(pool);
        let table = PairScoreTable::new();

        assert!(assemble(&anchor(), &cluster, &table, &LookConfig::default()).is_none());
    }

    #[test]
    fn test_statement_anchor_skips_closed_outerwear() {
        let mut statement_anchor = anchor();
        statement_anchor.statement_piece = true;

        let mut hoodie = candidate("HOODIE_001", Slot::Outerwear, 0.95);
        hoodie.product.category = "Hoodie".into();
        let mut shacket = candidate("SHACKET_001", Slot::Outerwear, 0.7);
        shacket.product.category = "Overshirt".into();

        let pool = vec![
            hoodie,
            shacket,
            candidate("SHOE", Slot::Footwear, 0.8),
            candidate("CAP", Slot::Accessory, 0.7),
        ];
        let mut clusters = build_clusters(&statement_anchor, &pool);
        let cluster = clusters.remove(0);
        let table = PairScoreTable::new();

        let look = assemble(&statement_anchor, &cluster, &table, &LookConfig::default()).unwrap();
        // Open outerwear is preferred over violating the silhouette rule
        assert_eq!(look.items[&Slot::Outerwear].sku, "SHACKET_001");
    }

    #[test]
    fn test_statement_anchor_skips_athletic_bottoms() {
        let mut statement_anchor = anchor();
        statement_anchor.statement_piece = true;

        let mut joggers = candidate("JOGGERS", Slot::PrimaryBottom, 0.9);
        joggers.product.aesthetics = vec!["Athletic".into()];
        let pool = vec![
            joggers,
            candidate("JEANS", Slot::PrimaryBottom, 0.6),
            candidate("SHOE", Slot::Footwear, 0.8),
        ];
        let mut clusters = build_clusters(&statement_anchor, &pool);
        let cluster = clusters.remove(0);
        let table = PairScoreTable::new();

        let look = assemble(&statement_anchor, &cluster, &table, &LookConfig::default()).unwrap();
        assert_eq!(look.items[&Slot::PrimaryBottom].sku, "JEANS");
    }

    #[test]
    fn test_intra_look_formality_spread_tighter_than_anchor_gap() {
        let mut anchor = anchor();
        anchor.formality_score = Some(2);

        let mut low = candidate("LOW", Slot::PrimaryBottom, 0.9);
        low.product.formality_score = Some(1);
        // Passes the anchor gap (|4-2| = 2) but clashes with LOW (|4-1| = 3)
        let mut high = candidate("HIGH", Slot::Footwear, 0.9);
        high.product.formality_score = Some(4);
        let mut ok = candidate("OK", Slot::Footwear, 0.5);
        ok.product.formality_score = Some(2);

        let pool = vec![low, high, ok, candidate("CAP", Slot::Accessory, 0.6)];
        let mut clusters = build_clusters(&anchor, &pool);
        let cluster = clusters.remove(0);
        let table = PairScoreTable::new();

        let look = assemble(&anchor, &cluster, &table, &LookConfig::default()).unwrap();
        assert_eq!(look.items[&Slot::Footwear].sku, "OK");
    }

    #[test]
    fn test_accessory_respects_monochrome_palette() {
        let mut anchor = anchor();
        anchor.primary_color = "Red".into();

        let mut bottom = candidate("PANTS", Slot::PrimaryBottom, 0.9);
        bottom.product.primary_color = "Red".into();
        let mut clashing = candidate("BAG_GREEN", Slot::Accessory, 0.95);
        clashing.product.primary_color = "Green".into();
        let mut neutral = candidate("BAG_BLACK", Slot::Accessory, 0.5);
        neutral.product.primary_color = "Black".into();

        let pool = vec![bottom, clashing, neutral];
        let mut clusters = build_clusters(&anchor, &pool);
        let cluster = clusters.remove(0);
        let table = PairScoreTable::new();

        let look = assemble(&anchor, &cluster, &table, &LookConfig::default()).unwrap();
        assert_eq!(look.items[&Slot::Accessory].sku, "BAG_BLACK");
    }
}
