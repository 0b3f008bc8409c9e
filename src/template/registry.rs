//! Registry of validated connector and cable definitions

use indexmap::IndexMap;
use tracing::debug;

use crate::model::{cable_scope, connector_scope, Cable, ComponentKind, Connector};
use crate::parser::{from_body, CableDef, ConnectorDef, Document};
use crate::resolve::ResolveError;

/// Every definition of a document, materialized once as a prototype.
///
/// Instances are cloned from these, so instantiation never changes a
/// prototype or its other instances.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    connectors: IndexMap<String, Connector>,
    cables: IndexMap<String, Cable>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate all definitions of a document
    pub fn from_document(document: &Document) -> Result<Self, ResolveError> {
        let mut registry = Self::new();
        for (name, body) in &document.connectors {
            let def: ConnectorDef = from_body(body)
                .map_err(|e| ResolveError::config(connector_scope(name), e.to_string()))?;
            registry.register_connector(Connector::from_def(name, &def)?)?;
        }
        for (name, body) in &document.cables {
            let def: CableDef = from_body(body)
                .map_err(|e| ResolveError::config(cable_scope(name), e.to_string()))?;
            registry.register_cable(Cable::from_def(name, &def)?)?;
        }
        debug!(
            connectors = registry.connectors.len(),
            cables = registry.cables.len(),
            "registered templates"
        );
        Ok(registry)
    }

    pub fn register_connector(&mut self, connector: Connector) -> Result<(), ResolveError> {
        self.check_unique(&connector.designator, ComponentKind::Connector)?;
        self.connectors
            .insert(connector.designator.clone(), connector);
        Ok(())
    }

    pub fn register_cable(&mut self, cable: Cable) -> Result<(), ResolveError> {
        self.check_unique(&cable.designator, ComponentKind::Cable)?;
        self.cables.insert(cable.designator.clone(), cable);
        Ok(())
    }

    fn check_unique(&self, name: &str, kind: ComponentKind) -> Result<(), ResolveError> {
        match self.kind_of(name) {
            Some(existing) if existing == kind => Err(ResolveError::config(
                format!("{} '{name}'", kind.noun()),
                "defined more than once",
            )),
            Some(existing) => Err(ResolveError::config(
                format!("{} '{name}'", kind.noun()),
                format!("the name is already used by a {}", existing.noun()),
            )),
            None => Ok(()),
        }
    }

    pub fn connector(&self, name: &str) -> Option<&Connector> {
        self.connectors.get(name)
    }

    pub fn cable(&self, name: &str) -> Option<&Cable> {
        self.cables.get(name)
    }

    pub fn kind_of(&self, name: &str) -> Option<ComponentKind> {
        if self.connectors.contains_key(name) {
            Some(ComponentKind::Connector)
        } else if self.cables.contains_key(name) {
            Some(ComponentKind::Cable)
        } else {
            None
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.kind_of(name).is_some()
    }

    /// Whether a plain reference to `name` creates a fresh instance each time
    pub fn autogenerates(&self, name: &str) -> bool {
        self.connectors.get(name).is_some_and(|c| c.autogenerate)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.connectors
            .keys()
            .chain(self.cables.keys())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.connectors.len() + self.cables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
