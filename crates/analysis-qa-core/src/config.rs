//! TOML configuration for embedding programs.
//!
//! ```toml
//! [recovery]
//! max_attempts = 3
//! base_delay_ms = 1000
//! early_exit_count = 2
//! attempt_timeout_ms = 30000
//!
//! [recovery.quality]
//! min_confidence = 0.3
//!
//! [[dimensions]]
//! dimension = "willingnessToPay"
//! keywords = ["pagar", "precio"]
//! ```
//!
//! Every section is optional. Omitting `dimensions` keeps the built-in
//! keyword rules; listing any replaces them entirely.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{QaError, Result};
use crate::recovery::RecoveryPolicy;
use crate::scoring::{default_keyword_rules, KeywordDimensionMapper, KeywordRule};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaConfig {
    #[serde(default)]
    pub recovery: RecoveryPolicy,
    #[serde(default = "default_keyword_rules")]
    pub dimensions: Vec<KeywordRule>,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            recovery: RecoveryPolicy::default(),
            dimensions: default_keyword_rules(),
        }
    }
}

impl QaConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        self.recovery.validate()?;
        if let Some(rule) = self.dimensions.iter().find(|r| r.keywords.is_empty()) {
            return Err(QaError::InvalidConfig(format!(
                "dimension rule for {} has no keywords",
                rule.dimension
            )));
        }
        Ok(())
    }

    pub fn dimension_mapper(&self) -> KeywordDimensionMapper {
        KeywordDimensionMapper::new(self.dimensions.clone())
    }
}
