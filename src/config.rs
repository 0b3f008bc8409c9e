//! Configuration for harness compilation
//!
//! Settings can be built in code or loaded from a TOML file:
//!
//! ```toml
//! template_separator = "."
//! color_mode = "SHORT"
//!
//! [bom]
//! restrict_printed_lengths = true
//! filter_empty_columns = false
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::bom::BomOptions;
use crate::color::ColorMode;

/// Errors that can occur when loading a configuration file
#[derive(Error, Debug)]
pub enum ConfigFileError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Configuration options for compiling a harness description
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompileConfig {
    /// Separates template and instance name, as in `KK254.X3`
    pub template_separator: char,

    /// How colors appear in BOM descriptions
    pub color_mode: ColorMode,

    /// BOM table output
    pub bom: BomOptions,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            template_separator: '.',
            color_mode: ColorMode::default(),
            bom: BomOptions::default(),
        }
    }
}

impl CompileConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template_separator(mut self, separator: char) -> Self {
        self.template_separator = separator;
        self
    }

    pub fn with_color_mode(mut self, mode: ColorMode) -> Self {
        self.color_mode = mode;
        self
    }

    pub fn with_bom_options(mut self, options: BomOptions) -> Self {
        self.bom = options;
        self
    }

    /// Load a configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigFileError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse a configuration from TOML text; missing keys keep their defaults
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigFileError> {
        Ok(toml::from_str(content)?)
    }
}
