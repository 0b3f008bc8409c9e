//! Registry of the connector and cable instances of one harness

use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::debug;

use super::{Addressable, ResolveError};
use crate::model::{
    connector_scope, Cable, ComponentKind, Connection, Connector, PinRef, Side, WireLink,
};
use crate::template::TemplateRegistry;

/// Prefix of designators created for auto-generated instances
pub const AUTOGENERATED_PREFIX: &str = "AUTOGENERATED_";

/// What a designator written in a connection set refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesignatorRef {
    /// A named instance, created from `template` on first use
    Instance {
        kind: ComponentKind,
        designator: String,
        template: String,
    },
    /// A fresh instance of `template` for every use
    Autogenerate { kind: ComponentKind, template: String },
}

impl DesignatorRef {
    pub fn kind(&self) -> ComponentKind {
        match self {
            DesignatorRef::Instance { kind, .. } | DesignatorRef::Autogenerate { kind, .. } => {
                *kind
            }
        }
    }

    pub fn template(&self) -> &str {
        match self {
            DesignatorRef::Instance { template, .. }
            | DesignatorRef::Autogenerate { template, .. } => template,
        }
    }
}

/// Instances and connections built up while expanding connection sets.
///
/// Only the expander mutates it; `finalize` consumes it into the parts of
/// the resolved model.
#[derive(Debug)]
pub struct Registry {
    templates: TemplateRegistry,
    separator: char,
    connectors: IndexMap<String, Connector>,
    cables: IndexMap<String, Cable>,
    autogenerated: HashMap<String, usize>,
    connections: Vec<Connection>,
}

/// Everything the registry resolved, in registration order
#[derive(Debug, Clone, Default)]
pub struct Resolved {
    pub connectors: IndexMap<String, Connector>,
    pub cables: IndexMap<String, Cable>,
    pub connections: Vec<Connection>,
}

impl Registry {
    pub fn new(templates: TemplateRegistry, separator: char) -> Result<Self, ResolveError> {
        if let Some(name) = templates.names().find(|name| name.contains(separator)) {
            return Err(ResolveError::config(
                format!("designator '{name}'"),
                format!("names cannot contain the template separator '{separator}'"),
            ));
        }
        Ok(Self {
            templates,
            separator,
            connectors: IndexMap::new(),
            cables: IndexMap::new(),
            autogenerated: HashMap::new(),
            connections: Vec::new(),
        })
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    fn instance_template(&self, designator: &str) -> Option<&str> {
        self.connectors
            .get(designator)
            .map(|c| c.template.as_str())
            .or_else(|| self.cables.get(designator).map(|c| c.template.as_str()))
    }

    /// Interpret a designator as written in a connection set
    pub fn lookup(&self, written: &str, scope: &str) -> Result<DesignatorRef, ResolveError> {
        let written = written.trim();
        let parts: Vec<&str> = written.split(self.separator).collect();
        match parts.as_slice() {
            [name] => {
                if let Some(template) = self.instance_template(name) {
                    let kind = self.kind_of_template(template, scope)?;
                    return Ok(DesignatorRef::Instance {
                        kind,
                        designator: name.to_string(),
                        template: template.to_string(),
                    });
                }
                match self.templates.kind_of(name) {
                    Some(kind) if self.templates.autogenerates(name) => {
                        Ok(DesignatorRef::Autogenerate {
                            kind,
                            template: name.to_string(),
                        })
                    }
                    Some(kind) => Ok(DesignatorRef::Instance {
                        kind,
                        designator: name.to_string(),
                        template: name.to_string(),
                    }),
                    None => Err(ResolveError::reference(
                        scope,
                        *name,
                        "no connector or cable has this designator",
                    )),
                }
            }
            [template, designator] => {
                let kind = self.kind_of_template(template, scope)?;
                let designator = designator.trim();
                if designator.is_empty() {
                    return Ok(DesignatorRef::Autogenerate {
                        kind,
                        template: template.to_string(),
                    });
                }
                self.check_template(designator, template, scope)?;
                Ok(DesignatorRef::Instance {
                    kind,
                    designator: designator.to_string(),
                    template: template.to_string(),
                })
            }
            _ => Err(ResolveError::config(
                scope,
                format!(
                    "'{written}' has more than one template separator '{}'",
                    self.separator
                ),
            )),
        }
    }

    fn kind_of_template(&self, template: &str, scope: &str) -> Result<ComponentKind, ResolveError> {
        self.templates.kind_of(template).ok_or_else(|| {
            ResolveError::config(scope, format!("unknown template '{template}'"))
        })
    }

    /// A designator stays bound to the template it was first created from
    fn check_template(&self, designator: &str, template: &str, scope: &str) -> Result<(), ResolveError> {
        let bound = self
            .instance_template(designator)
            .or_else(|| self.templates.contains(designator).then_some(designator));
        match bound {
            Some(bound) if bound != template => Err(ResolveError::config(
                scope,
                format!(
                    "'{designator}' is already an instance of '{bound}' and cannot be \
                     created from '{template}'"
                ),
            )),
            _ => Ok(()),
        }
    }

    /// The connector a reference resolves against: the instance if it exists,
    /// the template otherwise
    pub fn connector_for(&self, reference: &DesignatorRef) -> Option<&Connector> {
        match reference {
            DesignatorRef::Instance { designator, .. } => self
                .connectors
                .get(designator)
                .or_else(|| self.templates.connector(reference.template())),
            DesignatorRef::Autogenerate { template, .. } => self.templates.connector(template),
        }
    }

    pub fn cable_for(&self, reference: &DesignatorRef) -> Option<&Cable> {
        match reference {
            DesignatorRef::Instance { designator, .. } => self
                .cables
                .get(designator)
                .or_else(|| self.templates.cable(reference.template())),
            DesignatorRef::Autogenerate { template, .. } => self.templates.cable(template),
        }
    }

    /// Pin or wire targets of a reference
    pub fn addressable(&self, reference: &DesignatorRef) -> Option<&dyn Addressable> {
        match reference.kind() {
            ComponentKind::Connector => self.connector_for(reference).map(|c| c as &dyn Addressable),
            ComponentKind::Cable => self.cable_for(reference).map(|c| c as &dyn Addressable),
        }
    }

    /// Return the designator of the instance a reference stands for,
    /// creating the instance if needed
    pub fn allocate(&mut self, reference: &DesignatorRef) -> Result<String, ResolveError> {
        match reference {
            DesignatorRef::Instance {
                kind,
                designator,
                template,
            } => {
                self.ensure_instance(*kind, designator, template, false)?;
                Ok(designator.clone())
            }
            DesignatorRef::Autogenerate { kind, template } => {
                let designator = self.next_autogenerated(template);
                self.ensure_instance(*kind, &designator, template, true)?;
                debug!(designator = %designator, template = %template, "auto-generated instance");
                Ok(designator)
            }
        }
    }

    fn next_autogenerated(&mut self, template: &str) -> String {
        loop {
            let counter = self.autogenerated.entry(template.to_string()).or_insert(0);
            *counter += 1;
            let designator = format!("{AUTOGENERATED_PREFIX}{template}_{counter}");
            if self.instance_template(&designator).is_none() && !self.templates.contains(&designator) {
                return designator;
            }
        }
    }

    fn ensure_instance(
        &mut self,
        kind: ComponentKind,
        designator: &str,
        template: &str,
        autogenerated: bool,
    ) -> Result<(), ResolveError> {
        if let Some(bound) = self.instance_template(designator) {
            if bound != template {
                return Err(ResolveError::config(
                    format!("{} '{designator}'", kind.noun()),
                    format!("already an instance of '{bound}'"),
                ));
            }
            return Ok(());
        }
        let scope = format!("{} '{designator}'", kind.noun());
        match kind {
            ComponentKind::Connector => {
                let prototype = self
                    .templates
                    .connector(template)
                    .ok_or_else(|| ResolveError::config(&scope, format!("unknown template '{template}'")))?;
                let instance = prototype.instantiate(designator, autogenerated);
                self.connectors.insert(designator.to_string(), instance);
            }
            ComponentKind::Cable => {
                let prototype = self
                    .templates
                    .cable(template)
                    .ok_or_else(|| ResolveError::config(&scope, format!("unknown template '{template}'")))?;
                let instance = prototype.instantiate(designator, autogenerated);
                self.cables.insert(designator.to_string(), instance);
            }
        }
        debug!(designator, template, kind = kind.noun(), "registered instance");
        Ok(())
    }

    pub fn push_connections(&mut self, connections: Vec<Connection>) {
        self.connections.extend(connections);
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Apply all connections to the instances and hand them out
    pub fn finalize(self) -> Result<Resolved, ResolveError> {
        let Registry {
            mut connectors,
            mut cables,
            connections,
            ..
        } = self;

        for (index, connection) in connections.iter().enumerate() {
            for (k, endpoint) in connection.endpoints.iter().enumerate() {
                match endpoint.kind {
                    ComponentKind::Connector => {
                        let connector = connectors.get_mut(&endpoint.designator).ok_or_else(|| {
                            ResolveError::reference(
                                format!("connection set {}", connection.set),
                                &endpoint.designator,
                                "connector was never registered",
                            )
                        })?;
                        if connector.connections.last() != Some(&index) {
                            connector.connections.push(index);
                        }
                    }
                    ComponentKind::Cable => {
                        let neighbour = |j: Option<usize>| {
                            j.and_then(|j| connection.endpoints.get(j))
                                .filter(|e| e.kind == ComponentKind::Connector)
                                .map(|e| PinRef {
                                    designator: e.designator.clone(),
                                    position: e.position,
                                    id: e.id.clone(),
                                })
                        };
                        let from = neighbour(k.checked_sub(1));
                        let to = neighbour(Some(k + 1));
                        for (pin, side) in [(&from, Side::Right), (&to, Side::Left)] {
                            if let Some(pin) = pin {
                                activate_pin(&mut connectors, pin, side)?;
                            }
                        }
                        let cable = cables.get_mut(&endpoint.designator).ok_or_else(|| {
                            ResolveError::reference(
                                format!("connection set {}", connection.set),
                                &endpoint.designator,
                                "cable was never registered",
                            )
                        })?;
                        cable.links.push(WireLink {
                            connection: index,
                            wire: endpoint.position,
                            from,
                            to,
                        });
                        if cable.connections.last() != Some(&index) {
                            cable.connections.push(index);
                        }
                    }
                }
            }
        }

        for connector in connectors.values_mut() {
            let default_side = if connector.ports_left || !connector.ports_right {
                Side::Left
            } else {
                Side::Right
            };
            let mut looped = Vec::new();
            for l in &mut connector.loops {
                l.side.get_or_insert(default_side);
                looped.push(l.first);
                looped.push(l.second);
            }
            for position in looped {
                connector.pins[position].connection_count += 1;
            }
            if !connector.ports_left && !connector.ports_right {
                connector.ports_left = true;
            }
        }

        Ok(Resolved {
            connectors,
            cables,
            connections,
        })
    }
}

fn activate_pin(
    connectors: &mut IndexMap<String, Connector>,
    pin: &PinRef,
    side: Side,
) -> Result<(), ResolveError> {
    let connector = connectors.get_mut(&pin.designator).ok_or_else(|| {
        ResolveError::reference("connections", &pin.designator, "connector was never registered")
    })?;
    let slot = connector.pins.get_mut(pin.position).ok_or_else(|| {
        ResolveError::reference(connector_scope(&pin.designator), &pin.id, "no such pin")
    })?;
    slot.connection_count += 1;
    match side {
        Side::Left => connector.ports_left = true,
        Side::Right => connector.ports_right = true,
    }
    Ok(())
}
