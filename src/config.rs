//! Service Configuration
//! Mission: Defaults that match the production contract, env-var overridable

use serde::{Deserialize, Serialize};

/// Weights of the final coherence blend. Informational score only; looks
/// are peers and are never ranked by it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CoherenceWeights {
    /// Mean pairwise compatibility term
    pub alpha: f64,
    /// Dimension agreement term
    pub beta: f64,
    /// Slot coverage term
    pub gamma: f64,
}

impl Default for CoherenceWeights {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            beta: 0.3,
            gamma: 0.2,
        }
    }
}

/// Tunables of the look-generation core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookConfig {
    /// Fingerprint cache entry lifetime, seconds
    pub cache_ttl_seconds: u64,
    /// Soft upper bound on cached responses before LRU eviction
    pub cache_capacity: usize,
    /// Minimum edge score handed to the edge store
    pub min_edge_score: f64,
    /// Upper bound on requested looks per call
    pub max_looks: usize,
    /// Require anchor/candidate aesthetics to intersect during validity
    pub strict_aesthetics: bool,
    /// Anchor-vs-item formality gap ceiling
    pub formality_spread: u8,
    /// Within-look pairwise formality gap ceiling
    pub intra_look_formality_spread: u8,
    /// Empty occasion/season sets match everything when true
    pub empty_sets_match_all: bool,
    pub coherence_weights: CoherenceWeights,
}

impl Default for LookConfig {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: 300,
            cache_capacity: 2048,
            min_edge_score: 0.5,
            max_looks: 10,
            strict_aesthetics: false,
            formality_spread: 2,
            intra_look_formality_spread: 2,
            empty_sets_match_all: true,
            coherence_weights: CoherenceWeights::default(),
        }
    }
}

impl LookConfig {
    /// Defaults overridden by environment variables where present.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache_ttl_seconds: env_parse("CACHE_TTL_SECONDS", defaults.cache_ttl_seconds),
            cache_capacity: env_parse("CACHE_CAPACITY", defaults.cache_capacity),
            min_edge_score: env_parse("MIN_EDGE_SCORE", defaults.min_edge_score),
            max_looks: env_parse("MAX_LOOKS", defaults.max_looks),
            strict_aesthetics: env_flag("STRICT_AESTHETICS", defaults.strict_aesthetics),
            formality_spread: env_parse("FORMALITY_SPREAD", defaults.formality_spread),
            intra_look_formality_spread: env_parse(
                "INTRA_LOOK_FORMALITY_SPREAD",
                defaults.intra_look_formality_spread,
            ),
            empty_sets_match_all: env_flag("EMPTY_SETS_MATCH_ALL", defaults.empty_sets_match_all),
            coherence_weights: defaults.coherence_weights,
        }
    }
}

/// Binary-level configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_path: String,
    pub port: u16,
    pub looks: LookConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let database_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| "./outfitter.db".to_string());
        let port = env_parse("PORT", 8080);

        Self {
            database_path,
            port,
            looks: LookConfig::from_env(),
        }
    }
}

fn env_parse<T: std::str::FromStr + Copy>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "on" | "ON"))
        .unwrap_or(default)
}
