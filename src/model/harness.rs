//! The fully resolved harness handed to renderers and exporters

use indexmap::IndexMap;
use serde::Serialize;
use serde_yaml::Value;

use super::{AdditionalComponent, Cable, Connection, Connector};
use crate::bom::Bom;

#[derive(Debug, Clone, Serialize)]
pub struct Harness {
    pub metadata: Value,
    pub options: Value,
    pub connectors: IndexMap<String, Connector>,
    pub cables: IndexMap<String, Cable>,
    pub connections: Vec<Connection>,
    pub additional_bom_items: Vec<AdditionalComponent>,
    pub bom: Bom,
}

impl Harness {
    pub fn connector(&self, designator: &str) -> Option<&Connector> {
        self.connectors.get(designator)
    }

    pub fn cable(&self, designator: &str) -> Option<&Cable> {
        self.cables.get(designator)
    }

    pub fn connections_of<'a>(
        &'a self,
        designator: &'a str,
    ) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.iter().filter(move |c| c.touches(designator))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
