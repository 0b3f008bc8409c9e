//! Harness Compiler - resolution engine for declarative wiring harness descriptions
//!
//! This library turns a YAML description of connectors, cables and the
//! connection sets between them into a fully resolved harness model and a
//! consolidated bill of materials.
//!
//! # Example
//!
//! ```rust
//! use harness_compiler::compile;
//!
//! let harness = compile(r#"
//! connectors:
//!   X1: {pinlabels: [GND, VCC]}
//!   X2: {pincount: 2}
//! cables:
//!   W1: {wirecount: 2, color_code: DIN, length: 0.5}
//! connections:
//!   - [{X1: [GND, VCC]}, {W1: [1, 2]}, {X2: [1, 2]}]
//! "#).unwrap();
//!
//! assert_eq!(harness.connections.len(), 2);
//! // X1 and X2 share one BOM line, W1 has its own
//! assert_eq!(harness.bom.len(), 2);
//! ```

pub mod bom;
pub mod color;
pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod resolve;
pub mod template;

pub use bom::{Bom, BomItem, BomOptions};
pub use config::{CompileConfig, ConfigFileError};
pub use error::ParseError;
pub use model::Harness;
pub use parser::{parse, parse_many, Document};
pub use resolve::{resolve, ResolveError};

use thiserror::Error;

/// Errors that can occur during the compile pipeline
#[derive(Debug, Error)]
pub enum CompileError {
    /// Malformed YAML
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Well-formed YAML describing an invalid harness
    #[error("{0}")]
    Resolve(#[from] ResolveError),
}

impl CompileError {
    /// Render the error for a terminal, with a source snippet for parse errors
    pub fn format(&self, source: &str, filename: &str) -> String {
        match self {
            CompileError::Parse(e) => e.format(source, filename),
            CompileError::Resolve(e) => format!("Error: {e}"),
        }
    }
}

/// Compile a harness description with default configuration
pub fn compile(source: &str) -> Result<Harness, CompileError> {
    compile_with_config(source, &CompileConfig::default())
}

/// Compile a harness description with custom configuration
///
/// # Example
///
/// ```rust
/// use harness_compiler::{compile_with_config, CompileConfig};
/// use harness_compiler::color::ColorMode;
///
/// let config = CompileConfig::new().with_color_mode(ColorMode::Full);
/// let harness = compile_with_config(
///     "cables:\n  W1: {category: bundle, wirecount: 1, colors: [RD]}\nconnectors:\n  X1: {pincount: 1}\nconnections:\n  - [X1, {W1: 1}]\n",
///     &config,
/// ).unwrap();
/// assert!(harness.bom.items.iter().any(|item| item.description.contains("red")));
/// ```
pub fn compile_with_config(source: &str, config: &CompileConfig) -> Result<Harness, CompileError> {
    let document = parse(source)?;
    Ok(resolve(&document, config)?)
}

/// Compile several descriptions merged into one, later sources on top
pub fn compile_sources(sources: &[&str], config: &CompileConfig) -> Result<Harness, CompileError> {
    let document = parse_many(sources)?;
    Ok(resolve(&document, config)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_simple_harness() {
        let harness = compile(
            "connectors:\n  X1: {pincount: 2}\n  X2: {pincount: 2}\ncables:\n  W1: {wirecount: 2}\nconnections:\n  - [{X1: [1, 2]}, {W1: [1, 2]}, {X2: [1, 2]}]\n",
        )
        .expect("Should compile");
        assert_eq!(harness.connectors.len(), 2);
        assert_eq!(harness.cables.len(), 1);
        assert_eq!(harness.connections.len(), 2);
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = compile("connectors: [").unwrap_err();
        assert!(matches!(err, CompileError::Parse(_)));
        assert!(err.format("connectors: [", "bad.yml").contains("bad.yml"));
    }

    #[test]
    fn test_resolve_error_is_reported() {
        let err = compile("connectors:\n  X1: {pincount: 0}\n").unwrap_err();
        assert!(matches!(err, CompileError::Resolve(ResolveError::Config { .. })));
    }

    #[test]
    fn test_compile_sources_merges_definitions() {
        let harness = compile_sources(
            &[
                "connectors:\n  X1: {pincount: 1, type: Molex}\n",
                "connectors:\n  X1: {subtype: female}\n  X2: {pincount: 1}\ncables:\n  W1: {wirecount: 1}\nconnections:\n  - [X1, {W1: 1}, X2]\n",
            ],
            &CompileConfig::default(),
        )
        .expect("Should compile");
        let x1 = harness.connector("X1").expect("Should have X1");
        assert_eq!(x1.type_.as_deref(), Some("Molex"));
        assert_eq!(x1.subtype.as_deref(), Some("female"));
    }
}
