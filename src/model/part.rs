//! Part number information shared by every BOM-relevant entity

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PartNumber {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mpn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spn: Option<String>,
}

impl PartNumber {
    pub fn is_empty(&self) -> bool {
        self.pn.is_none()
            && self.manufacturer.is_none()
            && self.mpn.is_none()
            && self.supplier.is_none()
            && self.spn.is_none()
    }

    /// Lines for a component label, e.g. `P/N: 123`, `Molex: 43020-0400`
    pub fn summary(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(pn) = &self.pn {
            lines.push(format!("P/N: {pn}"));
        }
        match (&self.manufacturer, &self.mpn) {
            (Some(manufacturer), Some(mpn)) => lines.push(format!("{manufacturer}: {mpn}")),
            (Some(manufacturer), None) => lines.push(manufacturer.clone()),
            (None, Some(mpn)) => lines.push(format!("MPN: {mpn}")),
            (None, None) => {}
        }
        match (&self.supplier, &self.spn) {
            (Some(supplier), Some(spn)) => lines.push(format!("{supplier}: {spn}")),
            (Some(supplier), None) => lines.push(supplier.clone()),
            (None, Some(spn)) => lines.push(format!("SPN: {spn}")),
            (None, None) => {}
        }
        lines
    }
}
