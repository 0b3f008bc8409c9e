//! Resolution of a harness description into the connected model
//!
//! Phases run strictly in order:
//! 1. every definition is validated into a prototype ([`TemplateRegistry`])
//! 2. connection sets are expanded, creating instances on first use
//! 3. the registry is finalized: pins are activated, wire links recorded
//! 4. the BOM is aggregated from the finalized components

mod error;
mod expander;
mod registry;
mod selector;

pub use error::ResolveError;
pub use expander::expand_connection_set;
pub use registry::{DesignatorRef, Registry, Resolved, AUTOGENERATED_PREFIX};
pub use selector::{
    expand_range, resolve_selector, resolve_single, Addressable, Selector,
    DISAMBIGUATION_SEPARATOR,
};

use tracing::debug;

use crate::bom::aggregate;
use crate::config::CompileConfig;
use crate::model::{AdditionalComponent, Harness, OwnerKind};
use crate::parser::{from_body, ComponentDef, Document};
use crate::template::TemplateRegistry;

/// Resolve a parsed document into a harness with its BOM
pub fn resolve(document: &Document, config: &CompileConfig) -> Result<Harness, ResolveError> {
    let templates = TemplateRegistry::from_document(document)?;
    let mut registry = Registry::new(templates, config.template_separator)?;

    for (i, set) in document.connections.iter().enumerate() {
        let connections = expand_connection_set(i + 1, set, &mut registry)?;
        debug!(set = i + 1, connections = connections.len(), "expanded connection set");
        registry.push_connections(connections);
    }
    let Resolved {
        connectors,
        cables,
        connections,
    } = registry.finalize()?;

    let additional_bom_items = document
        .additional_bom_items
        .iter()
        .enumerate()
        .map(|(i, body)| {
            let scope = format!("additional BOM item {}", i + 1);
            let def: ComponentDef =
                from_body(body).map_err(|e| ResolveError::config(&scope, e.to_string()))?;
            AdditionalComponent::from_def(&def, OwnerKind::Standalone, &scope)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let bom = aggregate(&connectors, &cables, &additional_bom_items, config.color_mode)?;
    debug!(
        connectors = connectors.len(),
        cables = cables.len(),
        connections = connections.len(),
        bom_items = bom.len(),
        "resolved harness"
    );

    Ok(Harness {
        metadata: document.metadata.clone(),
        options: document.options.clone(),
        connectors,
        cables,
        connections,
        additional_bom_items,
        bom,
    })
}
