//! Validity Filter
//! Mission: Drop candidates that can never share a look with the anchor

use tracing::debug;

use crate::config::LookConfig;
use crate::models::{sets_intersect_ci, Candidate, Product};

/// True when `candidate` may appear in a look built around `anchor`.
///
/// Empty occasion/season sets are treated as "matches anything" while
/// `empty_sets_match_all` holds; with the flag off an empty set on either
/// side fails the rule.
pub fn is_valid(anchor: &Product, candidate: &Product, config: &LookConfig) -> bool {
    if candidate.slot == anchor.slot {
        return false;
    }

    if !tag_sets_compatible(&anchor.occasion, &candidate.occasion, config) {
        return false;
    }

    if !tag_sets_compatible(&anchor.season, &candidate.season, config) {
        return false;
    }

    if let (Some(a), Some(c)) = (anchor.formality_score, candidate.formality_score) {
        if a.abs_diff(c) > config.formality_spread {
            return false;
        }
    }

    if config.strict_aesthetics && !sets_intersect_ci(&anchor.aesthetics, &candidate.aesthetics) {
        return false;
    }

    true
}

fn tag_sets_compatible(a: &[String], b: &[String], config: &LookConfig) -> bool {
    if a.is_empty() || b.is_empty() {
        return config.empty_sets_match_all;
    }
    sets_intersect_ci(a, b)
}

/// Filter the candidate pool, preserving order and anchor scores.
pub fn filter_pool(
    anchor: &Product,
    candidates: Vec<Candidate>,
    config: &LookConfig,
) -> Vec<Candidate> {
    let before = candidates.len();
    let pool: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| is_valid(anchor, &c.product, config))
        .collect();

    debug!(
        anchor = %anchor.sku,
        kept = pool.len(),
        dropped = before - pool.len(),
        "validity filter applied"
    );
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Slot;

    fn product(sku: &str, slot: Slot) -> Product {
        Product {
            sku: sku.to_string(),
            slot,
            occasion: vec!["Casual".into()],
            aesthetics: vec!["Minimalist".into()],
            season: vec![],
            formality_score: Some(2),
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

    fn anchor() -> Product {
        product("ANCHOR", Slot::BaseTop)
    }

    #[test]
    fn test_same_slot_rejected() {
        let cfg = LookConfig::default();
        let other_top = product("TOP_2", Slot::BaseTop);
        assert!(!is_valid(&anchor(), &other_top, &cfg));
    }

    #[test]
    fn test_occasion_overlap_required() {
        let cfg = LookConfig::default();
        let mut c = product("C", Slot::Footwear);
        c.occasion = vec!["Formal".into()];
        assert!(!is_valid(&anchor(), &c, &cfg));

        c.occasion = vec!["casual".into()];
        assert!(is_valid(&anchor(), &c, &cfg));
    }

    #[test]
    fn test_empty_sets_follow_config_flag() {
        let mut cfg = LookConfig::default();
        let mut c = product("C", Slot::Footwear);
        c.occasion = vec![];
        assert!(is_valid(&anchor(), &c, &cfg));

        cfg.empty_sets_match_all = false;
        assert!(!is_valid(&anchor(), &c, &cfg));
    }

    #[test]
    fn test_season_any_when_empty() {
        let cfg = LookConfig::default();
        let mut a = anchor();
        a.season = vec!["Winter".into()];

        let mut c = product("C", Slot::Footwear);
        c.season = vec!["Summer".into()];
        assert!(!is_valid(&a, &c, &cfg));

        c.season = vec![];
        assert!(is_valid(&a, &c, &cfg));
    }

    #[test]
    fn test_formality_gap_ceiling() {
        let cfg = LookConfig::default();
        let mut a = anchor();
        a.formality_score = Some(1);

        // Gym tank against a blazer: gap of 3 exceeds the ceiling
        let mut blazer = product("BLAZER_001", Slot::Outerwear);
        blazer.formality_score = Some(4);
        assert!(!is_valid(&a, &blazer, &cfg));

        blazer.formality_score = Some(3);
        assert!(is_valid(&a, &blazer, &cfg));

        // Unset formality passes vacuously
        blazer.formality_score = None;
        assert!(is_valid(&a, &blazer, &cfg));
    }

    #[test]
    fn test_strict_aesthetics_flag() {
        let mut cfg = LookConfig::default();
        let mut c = product("C", Slot::Footwear);
        c.aesthetics = vec!["Streetwear".into()];

        assert!(is_valid(&anchor(), &c, &cfg));

        cfg.strict_aesthetics = true;
        assert!(!is_valid(&anchor(), &c, &cfg));

        c.aesthetics = vec!["minimalist".into()];
        assert!(is_valid(&anchor(), &c, &cfg));
    }

    #[test]
    fn test_filter_pool_keeps_scores() {
        let cfg = LookConfig::default();
        let valid = Candidate {
            product: product("OK", Slot::Footwear),
            anchor_score: 0.81,
        };
        let invalid = Candidate {
            product: product("SAME_SLOT", Slot::BaseTop),
            anchor_score: 0.9,
        };

        let pool = filter_pool(&anchor(), vec![valid, invalid], &cfg);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].sku(), "OK");
        assert_eq!(pool[0].anchor_score, 0.81);
    }
}
