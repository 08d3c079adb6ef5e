//! Store configuration
//!
//! Loaded from TOML:
//!
//! ```toml
//! section_order = ["1", "2", "3.1", "3.1.1", "3.1.2"]
//! log_noops = false
//!
//! [validation]
//! group_columns = ["grupoId"]
//! ccpp_columns = ["ccppId", "codigoCcpp"]
//! location_columns = ["ubigeo"]
//! check_group_links = true
//! check_group_scopes = true
//! ```

use crate::error::ConfigError;
use serde::Deserialize;
use sia_engine::ReferenceRules;
use sia_model::SectionOrder;
use std::path::Path;

/// Store configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreConfig {
    /// Canonical, hand-authored section order
    pub section_order: SectionOrder,
    /// Reference columns checked by the validation pass
    pub validation: ReferenceRules,
    /// Log no-op dispatches at debug instead of trace
    pub log_noops: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    section_order: Vec<String>,
    validation: ReferenceRules,
    log_noops: bool,
}

impl StoreConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a canonical section order
    #[inline]
    #[must_use]
    pub fn with_section_order(mut self, order: SectionOrder) -> Self {
        self.section_order = order;
        self
    }

    /// With validation reference rules
    #[inline]
    #[must_use]
    pub fn with_validation(mut self, rules: ReferenceRules) -> Self {
        self.validation = rules;
        self
    }

    /// With no-op logging at debug level
    #[inline]
    #[must_use]
    pub fn with_log_noops(mut self, enabled: bool) -> Self {
        self.log_noops = enabled;
        self
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// Returns error if the TOML is invalid or the section order repeats an id.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(text)?;
        Ok(Self {
            section_order: SectionOrder::new(raw.section_order)?,
            validation: raw.validation,
            log_noops: raw.log_noops,
        })
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(
            path = %path.display(),
            sections = config.section_order.len(),
            "loaded store config"
        );
        Ok(config)
    }
}
