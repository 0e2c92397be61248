//! # Inspector Configuration
//!
//! TOML-backed settings shared by the registry and the navigator.
//!
//! ```toml
//! [format]
//! spatial_precision = 4
//! scalar_precision = 6
//!
//! [navigator]
//! detect_cycles = true
//! max_children = 500
//! ```
//!
//! Every key is optional; missing keys take their defaults.

use crate::format::FormatOptions;
use crate::navigator::NavigatorConfig;
use crate::CadscopeError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectorConfig {
    pub format: FormatOptions,
    pub navigator: NavigatorConfig,
}

impl InspectorConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, CadscopeError> {
        let config: Self =
            toml::from_str(text).map_err(|e| CadscopeError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, CadscopeError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CadscopeError::IoError(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CadscopeError> {
        self.format.validate()?;
        if self.navigator.max_children == Some(0) {
            return Err(CadscopeError::ConfigError(
                "navigator.max_children must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
