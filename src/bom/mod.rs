//! Bill of materials: consolidation of every BOM-relevant entity of a harness

mod aggregate;
mod table;

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::model::{PartNumber, Quantity};

pub use aggregate::aggregate;
pub use table::{
    bom_table, to_tsv, BomOptions, BOM_COLUMNS, MAX_PRINTED_DESCRIPTION, MAX_PRINTED_DESIGNATORS,
};

/// BOM sections, in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BomCategory {
    Connector,
    Cable,
    Wire,
    Additional,
}

/// Designator with natural ordering (X2 < X10)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Designator(String);

impl Designator {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Designator {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for Designator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialOrd for Designator {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Designator {
    fn cmp(&self, other: &Self) -> Ordering {
        natord::compare(&self.0, &other.0).then_with(|| self.0.cmp(&other.0))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BomItem {
    pub id: usize,
    pub category: BomCategory,
    pub description: String,
    pub qty: Quantity,
    #[serde(flatten)]
    pub part: PartNumber,
    pub designators: BTreeSet<Designator>,
}

impl BomItem {
    pub fn designator_list(&self) -> Vec<&str> {
        self.designators.iter().map(Designator::as_str).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Bom {
    pub items: Vec<BomItem>,
    /// BOM item id of each connector and non-bundle cable
    pub ids: IndexMap<String, usize>,
}

impl Bom {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&BomItem> {
        id.checked_sub(1).and_then(|i| self.items.get(i))
    }

    /// BOM item id of a component, for cross references in drawings
    pub fn id_of(&self, designator: &str) -> Option<usize> {
        self.ids.get(designator).copied()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_designators_sort_naturally() {
        let set: BTreeSet<Designator> = ["X10", "X2", "W1", "X1"].into_iter().map(Designator::from).collect();
        let ordered: Vec<&str> = set.iter().map(Designator::as_str).collect();
        assert_eq!(ordered, vec!["W1", "X1", "X2", "X10"]);
    }

    #[test]
    fn test_category_order() {
        assert!(BomCategory::Connector < BomCategory::Cable);
        assert!(BomCategory::Wire < BomCategory::Additional);
    }
}
