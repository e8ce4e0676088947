//! Engine configuration.
//!
//! Designed to be easily serializable and loadable from JSON or TOML while
//! keeping complexity minimal; the defaults reproduce the behavior the
//! split heuristics were tuned for.

use crate::error::{IndexError, Result};
use serde::{Deserialize, Serialize};

/// Configuration shared by the index adapters.
///
/// # Example
///
/// ```rust
/// use spanbox::IndexConfig;
///
/// let config = IndexConfig::default();
/// assert_eq!(config.limit_ratio, 0.3);
///
/// let json = r#"{ "limit_ratio": 0.25 }"#;
/// let config = IndexConfig::from_json(json).unwrap();
/// assert_eq!(config.limit_ratio, 0.25);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Minimum acceptable balance of a split: the smaller group must hold
    /// strictly more than this share of the entries, or the candidate is
    /// rejected. Must lie in `(0, 0.5)`.
    #[serde(default = "IndexConfig::default_limit_ratio")]
    pub limit_ratio: f64,
}

impl IndexConfig {
    const fn default_limit_ratio() -> f64 {
        0.3
    }

    /// Override the split balance floor.
    pub fn with_limit_ratio(mut self, ratio: f64) -> Self {
        self.limit_ratio = ratio;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if !self.limit_ratio.is_finite() || self.limit_ratio <= 0.0 || self.limit_ratio >= 0.5 {
            return Err(IndexError::InvalidConfig(format!(
                "limit_ratio must lie in (0, 0.5), got {}",
                self.limit_ratio
            )));
        }
        Ok(())
    }

    /// Load configuration from a JSON string.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        let config: IndexConfig = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(serde::de::Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as a JSON string.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load configuration from a TOML string (requires the `toml` feature).
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> std::result::Result<Self, toml::de::Error> {
        let config: IndexConfig = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(serde::de::Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as a TOML string (requires the `toml` feature).
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            limit_ratio: Self::default_limit_ratio(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = IndexConfig::default();
        assert_eq!(config.limit_ratio, 0.3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        assert!(IndexConfig::default().with_limit_ratio(0.0).validate().is_err());
        assert!(IndexConfig::default().with_limit_ratio(0.5).validate().is_err());
        assert!(
            IndexConfig::default()
                .with_limit_ratio(f64::NAN)
                .validate()
                .is_err()
        );
        assert!(IndexConfig::default().with_limit_ratio(0.4).validate().is_ok());
    }

    #[test]
    fn test_json_round_trip() {
        let config = IndexConfig::default().with_limit_ratio(0.35);
        let json = config.to_json().unwrap();
        let back = IndexConfig::from_json(&json).unwrap();
        assert_eq!(back.limit_ratio, 0.35);
    }

    #[test]
    fn test_json_rejects_invalid() {
        assert!(IndexConfig::from_json(r#"{ "limit_ratio": 0.9 }"#).is_err());
    }
}
