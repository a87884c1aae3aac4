//! Configuration for retrieval and fusion

use crate::fusion::FusionConfig;
use policylens_domain::HopLimit;
use serde::{Deserialize, Serialize};

/// Configuration for the Context Retriever
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Passages returned by vector search
    pub top_k: usize,

    /// Per-name result budget for graph entity queries, and the policy limit
    pub graph_top_k: usize,

    /// Hops for the relationship walk; any integer is clamped to [1, 10],
    /// any non-integer value becomes 2
    #[serde(with = "lenient_hops")]
    pub max_hops: HopLimit,

    /// Paths returned by the relationship walk
    pub path_limit: usize,

    /// Composite context layout
    pub fusion: FusionConfig,
}

impl RetrievalConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.top_k == 0 {
            return Err("top_k must be greater than 0".to_string());
        }
        if self.graph_top_k == 0 {
            return Err("graph_top_k must be greater than 0".to_string());
        }
        if self.path_limit == 0 {
            return Err("path_limit must be greater than 0".to_string());
        }
        self.fusion.validate()
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            graph_top_k: 5,
            max_hops: HopLimit::default(),
            path_limit: 20,
            fusion: FusionConfig::default(),
        }
    }
}

mod lenient_hops {
    use policylens_domain::HopLimit;
    use serde::{Deserialize, Deserializer, Serializer};
    use tracing::warn;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawHops {
        Int(i64),
        Other(serde::de::IgnoredAny),
    }

    pub fn serialize<S: Serializer>(hops: &HopLimit, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(hops.get())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<HopLimit, D::Error> {
        Ok(match RawHops::deserialize(deserializer)? {
            RawHops::Int(hops) => {
                let limit = HopLimit::clamped(hops);
                if i64::from(limit.get()) != hops {
                    warn!("max_hops {} out of range, clamped to {}", hops, limit);
                }
                limit
            }
            RawHops::Other(_) => {
                warn!("max_hops is not an integer, using {}", HopLimit::default());
                HopLimit::default()
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RetrievalConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.top_k, 5);
        assert_eq!(config.max_hops.get(), 2);
    }

    #[test]
    fn test_max_hops_clamped() {
        let low = RetrievalConfig::from_toml("max_hops = 0").unwrap();
        assert_eq!(low.max_hops.get(), 1);

        let high = RetrievalConfig::from_toml("max_hops = 15").unwrap();
        assert_eq!(high.max_hops.get(), 10);
    }

    #[test]
    fn test_non_integer_max_hops_defaults() {
        let float = RetrievalConfig::from_toml("max_hops = 2.5").unwrap();
        assert_eq!(float.max_hops.get(), 2);

        let text = RetrievalConfig::from_toml("max_hops = \"deep\"").unwrap();
        assert_eq!(text.max_hops.get(), 2);
    }

    #[test]
    fn test_invalid_top_k() {
        let config = RetrievalConfig {
            top_k: 0,
            ..RetrievalConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = RetrievalConfig {
            max_hops: HopLimit::clamped(4),
            ..RetrievalConfig::default()
        };
        let parsed = RetrievalConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(config, parsed);
    }
}
