//! Elementary connections produced by expanding connection sets

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Connector,
    Cable,
}

impl ComponentKind {
    pub fn noun(self) -> &'static str {
        match self {
            ComponentKind::Connector => "connector",
            ComponentKind::Cable => "cable",
        }
    }
}

/// One resolved position on a connector or cable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    pub kind: ComponentKind,
    pub designator: String,
    /// 0-based pin or wire position
    pub position: usize,
    /// Pin or wire id at that position
    pub id: String,
}

/// One path through a connection set, e.g. `X1:1 - W1:1 - X2:3`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connection {
    /// 1-based index of the connection set this came from
    pub set: usize,
    /// Index within the set
    pub index: usize,
    pub endpoints: Vec<Endpoint>,
}

impl Connection {
    pub fn touches(&self, designator: &str) -> bool {
        self.endpoints.iter().any(|e| e.designator == designator)
    }
}
