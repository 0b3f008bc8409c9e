//! A harness description split into its sections

use indexmap::IndexMap;
use serde_yaml::Value;
use tracing::debug;

use super::{scalar_text, value_kind};
use crate::resolve::ResolveError;
use crate::template::resolve_merge_keys;

/// Sections of a harness description after merge keys are resolved.
///
/// Definitions stay raw here; the template registry validates them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub connectors: IndexMap<String, Value>,
    pub cables: IndexMap<String, Value>,
    pub connections: Vec<Value>,
    pub additional_bom_items: Vec<Value>,
    pub metadata: Value,
    pub options: Value,
}

fn document_scope(section: &str) -> String {
    format!("section '{section}'")
}

fn definitions(section: &str, value: Value) -> Result<IndexMap<String, Value>, ResolveError> {
    match value {
        Value::Null => Ok(IndexMap::new()),
        Value::Mapping(mapping) => mapping
            .into_iter()
            .map(|(key, body)| match scalar_text(&key) {
                Some(name) if !name.trim().is_empty() => Ok((name.trim().to_string(), body)),
                _ => Err(ResolveError::config(
                    document_scope(section),
                    format!("designators must be plain names, found {}", value_kind(&key)),
                )),
            })
            .collect(),
        other => Err(ResolveError::config(
            document_scope(section),
            format!("expected a mapping of designators, found {}", value_kind(&other)),
        )),
    }
}

fn list(section: &str, value: Value) -> Result<Vec<Value>, ResolveError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(items) => Ok(items),
        other => Err(ResolveError::config(
            document_scope(section),
            format!("expected a list, found {}", value_kind(&other)),
        )),
    }
}

impl Document {
    /// Resolve merge keys and split a parsed YAML tree into sections.
    ///
    /// Unknown top-level keys are ignored so they can hold anchors.
    pub fn from_value(value: Value) -> Result<Self, ResolveError> {
        let mapping = match resolve_merge_keys(value)? {
            Value::Null => return Ok(Self::default()),
            Value::Mapping(mapping) => mapping,
            other => {
                return Err(ResolveError::config(
                    "harness description",
                    format!("expected a mapping of sections, found {}", value_kind(&other)),
                ))
            }
        };

        let mut document = Self::default();
        for (key, value) in mapping {
            let Some(section) = key.as_str() else {
                debug!(key = ?key, "ignoring non-text top-level key");
                continue;
            };
            match section {
                "connectors" => document.connectors = definitions(section, value)?,
                "cables" => document.cables = definitions(section, value)?,
                "connections" => document.connections = list(section, value)?,
                "additional_bom_items" => document.additional_bom_items = list(section, value)?,
                "metadata" => document.metadata = value,
                "options" => document.options = value,
                other => debug!(section = other, "ignoring unknown top-level section"),
            }
        }
        Ok(document)
    }

    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
            && self.cables.is_empty()
            && self.connections.is_empty()
            && self.additional_bom_items.is_empty()
    }
}
