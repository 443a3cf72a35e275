//! Configuration loading and validation
//!
//! Config file resolution priority order:
//! 1. Command-line argument (highest priority)
//! 2. `ATLAS_CONFIG` environment variable
//! 3. Platform config directory (`<config_dir>/atlas/atlas.toml`)
//! 4. Compiled defaults (fallback)
//!
//! A missing or unreadable config file is never fatal: a warning is logged
//! and compiled defaults are used. A file that reads but does not parse or
//! validate is a [`Error::Config`].

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "ATLAS_CONFIG";

/// Top-level TOML configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    pub logging: LoggingConfig,
    pub taste: TasteConfig,
    pub structure: StructureConfig,
    pub labels: LabelConfig,
    pub query: QueryConfig,
    pub buckets: BucketConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Taste graph construction parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TasteConfig {
    /// Outgoing neighbors retained per artist
    pub neighbors: usize,

    /// Maximum artists considered per tag when pairing
    pub tag_hub_cap: usize,

    /// Maximum tags retained in one artist profile
    pub profile_cap: usize,

    /// Tags dropped at ingestion as non-sonic metadata
    pub non_sonic_tags: Vec<String>,
}

impl Default for TasteConfig {
    fn default() -> Self {
        Self {
            neighbors: 50,
            tag_hub_cap: 800,
            profile_cap: 15,
            non_sonic_tags: default_non_sonic_tags(),
        }
    }
}

/// Per-type hub caps and rerank weights for the structure graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureConfig {
    pub caps: PerTypeCaps,
    pub weights: PerTypeWeights,
}

/// Maximum neighbors per node, per relation type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerTypeCaps {
    pub members: usize,
    pub credits: usize,
    pub labels: usize,
    pub events: usize,
    pub country: usize,
}

impl Default for PerTypeCaps {
    fn default() -> Self {
        Self {
            members: 64,
            credits: 256,
            labels: 128,
            events: 128,
            country: 256,
        }
    }
}

/// Additive rerank weight per relation type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerTypeWeights {
    pub members: f32,
    pub credits: f32,
    pub labels: f32,
    pub events: f32,
    pub country: f32,
}

impl Default for PerTypeWeights {
    fn default() -> Self {
        Self {
            members: 0.15,
            credits: 0.12,
            labels: 0.06,
            events: 0.04,
            country: 0.02,
        }
    }
}

impl PerTypeWeights {
    fn all(&self) -> [(&'static str, f32); 5] {
        [
            ("members", self.members),
            ("credits", self.credits),
            ("labels", self.labels),
            ("events", self.events),
            ("country", self.country),
        ]
    }

    /// Largest boost any single relation type can contribute
    pub fn max_weight(&self) -> f32 {
        self.all().iter().map(|(_, w)| *w).fold(0.0, f32::max)
    }
}

/// Macro tag labeler parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Identity labels returned per artist
    pub identity_top: usize,

    /// Exploration labels returned per candidate set
    pub exploration_top: usize,

    /// Distinct artists a tag must cover to qualify as exploration label
    pub exploration_min_coverage: usize,

    /// Candidates considered for exploration labels
    pub exploration_set_size: usize,

    /// Tags carried by more artists than this are never identity labels
    pub ultra_generic_threshold: u32,

    /// Geographic / demographic tags never used as labels
    pub geo_adjectives: Vec<String>,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            identity_top: 5,
            exploration_top: 3,
            exploration_min_coverage: 2,
            exploration_set_size: 50,
            ultra_generic_threshold: 800,
            geo_adjectives: default_geo_adjectives(),
        }
    }
}

/// Query-time defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Per-query budget for per-seed lookups, must be > 0
    pub timeout_ms: u64,

    /// List size when the caller does not specify one
    pub default_limit: usize,

    /// Optional diversity cap on candidates sharing a primary tag
    pub max_per_primary_tag: Option<usize>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 2_000,
            default_limit: 20,
            max_per_primary_tag: None,
        }
    }
}

/// Taste bucket grouping of the final candidate list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketConfig {
    /// Minimum share of seed tag weight for a tag to get its own bucket
    pub min_share: f64,

    /// Stop opening buckets once included shares reach this total
    pub cumulative_target: f64,

    /// Candidates needed for a "Strong" bucket
    pub strong_threshold: usize,

    /// Candidates needed for a "Moderate" bucket
    pub moderate_threshold: usize,
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self {
            min_share: 0.03,
            cumulative_target: 0.85,
            strong_threshold: 20,
            moderate_threshold: 10,
        }
    }
}

fn default_non_sonic_tags() -> Vec<String> {
    [
        "seen live",
        "favourite",
        "favorite",
        "favorites",
        "favourites",
        "my favorite",
        "my favourite",
        "underrated",
        "underated",
        "underappreciated",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_geo_adjectives() -> Vec<String> {
    [
        // nationality / regional adjectives
        "american", "british", "english", "scottish", "irish", "welsh", "canadian",
        "australian", "swedish", "norwegian", "finnish", "danish", "icelandic",
        "german", "austrian", "swiss", "french", "belgian", "dutch", "italian",
        "spanish", "portuguese", "polish", "czech", "russian", "ukrainian",
        "hungarian", "greek", "turkish", "japanese", "korean", "chinese",
        "brazilian", "argentinian", "mexican", "chilean", "colombian", "african",
        "nigerian", "south african", "indian", "israeli", "european",
        "scandinavian", "nordic", "asian",
        // countries and codes used as tags
        "usa", "us", "uk", "united states", "united kingdom", "england", "scotland",
        "canada", "australia", "sweden", "norway", "finland", "germany", "france",
        "japan", "brazil",
        // demographic
        "female vocalists", "male vocalists", "female vocalist", "male vocalist",
        "female fronted", "female", "male",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl AtlasConfig {
    /// Parse and validate a config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AtlasConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Reject configurations the engine cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.taste.neighbors == 0 {
            return Err(Error::Config("taste.neighbors must be > 0".to_string()));
        }
        if self.taste.tag_hub_cap == 0 {
            return Err(Error::Config("taste.tag_hub_cap must be > 0".to_string()));
        }
        if self.taste.profile_cap == 0 {
            return Err(Error::Config("taste.profile_cap must be > 0".to_string()));
        }

        let caps = &self.structure.caps;
        for (name, cap) in [
            ("members", caps.members),
            ("credits", caps.credits),
            ("labels", caps.labels),
            ("events", caps.events),
            ("country", caps.country),
        ] {
            if cap == 0 {
                return Err(Error::Config(format!("structure.caps.{} must be > 0", name)));
            }
        }

        let weights = &self.structure.weights;
        for (name, weight) in weights.all() {
            if !(0.0..=1.0).contains(&weight) {
                return Err(Error::Config(format!(
                    "structure.weights.{} must be within [0, 1], got {}",
                    name, weight
                )));
            }
        }
        if weights.members < weights.max_weight() {
            return Err(Error::Config(
                "structure.weights.members must be the largest relation weight".to_string(),
            ));
        }

        if self.labels.identity_top == 0 || self.labels.exploration_top == 0 {
            return Err(Error::Config("label counts must be > 0".to_string()));
        }
        if self.labels.exploration_min_coverage < 2 {
            return Err(Error::Config(
                "labels.exploration_min_coverage must be at least 2".to_string(),
            ));
        }
        if self.query.timeout_ms == 0 {
            return Err(Error::Config("query.timeout_ms must be > 0".to_string()));
        }
        if self.query.default_limit == 0 {
            return Err(Error::Config("query.default_limit must be > 0".to_string()));
        }
        if self.query.max_per_primary_tag == Some(0) {
            return Err(Error::Config("query.max_per_primary_tag must be > 0 when set".to_string()));
        }

        let buckets = &self.buckets;
        for (name, share) in [
            ("min_share", buckets.min_share),
            ("cumulative_target", buckets.cumulative_target),
        ] {
            if !(share > 0.0 && share <= 1.0) {
                return Err(Error::Config(format!(
                    "buckets.{} must be within (0, 1], got {}",
                    name, share
                )));
            }
        }
        if buckets.moderate_threshold == 0 || buckets.strong_threshold < buckets.moderate_threshold {
            return Err(Error::Config(
                "buckets thresholds must satisfy 0 < moderate_threshold <= strong_threshold"
                    .to_string(),
            ));
        }

        Ok(())
    }
}

/// Config file resolver
///
/// Walks the priority chain and loads the first config file that exists,
/// falling back to compiled defaults.
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(cli_path: Option<PathBuf>) -> Self {
        Self { cli_path }
    }

    /// Candidate config path, by priority (the file may not exist)
    pub fn resolve_path(&self) -> Option<PathBuf> {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_path {
            return Some(path.clone());
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        // Priority 3: Platform config directory
        dirs::config_dir().map(|d| d.join("atlas").join("atlas.toml"))
    }

    /// Load the resolved config, or compiled defaults if no readable file exists
    pub fn load(&self) -> Result<AtlasConfig> {
        match self.resolve_path() {
            Some(path) if path.is_file() => match std::fs::read_to_string(&path) {
                Ok(content) => {
                    info!("Loading config from {}", path.display());
                    AtlasConfig::from_toml_str(&content)
                }
                Err(e) => {
                    warn!(
                        "Config file {} is unreadable ({}), using compiled defaults",
                        path.display(),
                        e
                    );
                    Ok(AtlasConfig::default())
                }
            },
            Some(path) => {
                warn!(
                    "Config file not found at {}, using compiled defaults",
                    path.display()
                );
                Ok(AtlasConfig::default())
            }
            None => {
                warn!("Could not determine config directory, using compiled defaults");
                Ok(AtlasConfig::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(AtlasConfig::default().validate().is_ok());
    }

    #[test]
    fn test_max_weight_is_members() {
        let weights = PerTypeWeights::default();
        assert_eq!(weights.max_weight(), 0.15);
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = AtlasConfig::from_toml_str(
            r#"
            [taste]
            neighbors = 10

            [query]
            timeout_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.taste.neighbors, 10);
        assert_eq!(config.taste.tag_hub_cap, 800);
        assert_eq!(config.query.timeout_ms, 250);
        assert_eq!(config.labels.identity_top, 5);
    }

    #[test]
    fn test_rejects_members_not_largest() {
        let result = AtlasConfig::from_toml_str(
            r#"
            [structure.weights]
            members = 0.05
            "#,
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_zero_query_timeout() {
        let result = AtlasConfig::from_toml_str(
            r#"
            [query]
            timeout_ms = 0
            "#,
        );
        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("timeout_ms")));
    }

    #[test]
    fn test_bucket_thresholds_validated() {
        let inverted = AtlasConfig::from_toml_str(
            r#"
            [buckets]
            strong_threshold = 5
            moderate_threshold = 10
            "#,
        );
        assert!(inverted.is_err());

        let share = AtlasConfig::from_toml_str("[buckets]\nmin_share = 1.5\n");
        assert!(matches!(share, Err(Error::Config(msg)) if msg.contains("min_share")));
    }

    #[test]
    fn test_rejects_single_artist_coverage() {
        let result = AtlasConfig::from_toml_str(
            r#"
            [labels]
            exploration_min_coverage = 1
            "#,
        );
        assert!(result.is_err());
    }
}
