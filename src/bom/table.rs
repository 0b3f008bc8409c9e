//! Tabular BOM output

use serde::{Deserialize, Serialize};

use super::{Bom, BomItem};

pub const BOM_COLUMNS: [&str; 10] = [
    "#",
    "Qty",
    "Unit",
    "Description",
    "Designators",
    "P/N",
    "Manufacturer",
    "MPN",
    "Supplier",
    "SPN",
];

/// Longest description printed in full when lengths are restricted
pub const MAX_PRINTED_DESCRIPTION: usize = 40;
/// Designators printed per row when lengths are restricted
pub const MAX_PRINTED_DESIGNATORS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BomOptions {
    /// Shorten long descriptions and designator lists
    pub restrict_printed_lengths: bool,
    /// Drop columns that are empty in every row
    pub filter_empty_columns: bool,
}

impl Default for BomOptions {
    fn default() -> Self {
        Self {
            restrict_printed_lengths: true,
            filter_empty_columns: false,
        }
    }
}

impl BomOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_restricted_lengths(mut self, restrict: bool) -> Self {
        self.restrict_printed_lengths = restrict;
        self
    }

    pub fn with_empty_columns_filtered(mut self, filter: bool) -> Self {
        self.filter_empty_columns = filter;
        self
    }
}

fn restrict_description(description: &str) -> String {
    if description.chars().count() <= MAX_PRINTED_DESCRIPTION {
        description.to_string()
    } else {
        let head: String = description.chars().take(MAX_PRINTED_DESCRIPTION).collect();
        format!("{head} (...)")
    }
}

fn designators(item: &BomItem, restrict: bool) -> String {
    let list = item.designator_list();
    if restrict && list.len() > MAX_PRINTED_DESIGNATORS {
        format!("{}, ...", list[..MAX_PRINTED_DESIGNATORS].join(", "))
    } else {
        list.join(", ")
    }
}

fn row(item: &BomItem, options: &BomOptions) -> Vec<String> {
    let restrict = options.restrict_printed_lengths;
    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    vec![
        item.id.to_string(),
        item.qty.number_str(),
        item.qty.unit_str().to_string(),
        if restrict {
            restrict_description(&item.description)
        } else {
            item.description.clone()
        },
        designators(item, restrict),
        text(&item.part.pn),
        text(&item.part.manufacturer),
        text(&item.part.mpn),
        text(&item.part.supplier),
        text(&item.part.spn),
    ]
}

/// Header row followed by one row per BOM item
pub fn bom_table(bom: &Bom, options: &BomOptions) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = Vec::with_capacity(bom.len() + 1);
    rows.push(BOM_COLUMNS.iter().map(|c| c.to_string()).collect());
    rows.extend(bom.items.iter().map(|item| row(item, options)));

    if options.filter_empty_columns {
        let keep: Vec<bool> = (0..BOM_COLUMNS.len())
            .map(|column| rows[1..].iter().any(|r| !r[column].is_empty()))
            .collect();
        for r in &mut rows {
            let mut column = 0;
            r.retain(|_| {
                let kept = keep[column];
                column += 1;
                kept
            });
        }
    }
    rows
}

/// Tab separated values, one line per row
pub fn to_tsv(bom: &Bom, options: &BomOptions) -> String {
    bom_table(bom, options)
        .iter()
        .map(|r| {
            let cells: Vec<String> = r.iter().map(|c| c.replace(['\t', '\n'], " ")).collect();
            format!("{}\n", cells.join("\t"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bom::{BomCategory, Designator};
    use crate::model::{PartNumber, Quantity};

    fn item(id: usize, description: &str, designators: &[&str]) -> BomItem {
        BomItem {
            id,
            category: BomCategory::Connector,
            description: description.to_string(),
            qty: Quantity::count(designators.len() as f64),
            part: PartNumber {
                mpn: Some("MPN-1".into()),
                ..PartNumber::default()
            },
            designators: designators.iter().map(|d| Designator::from(*d)).collect(),
        }
    }

    fn bom(items: Vec<BomItem>) -> Bom {
        Bom {
            items,
            ..Bom::default()
        }
    }

    #[test]
    fn test_restricted_lengths() {
        let long = "Connector, Molex Micro-Fit 3.0, female, 12 pins";
        let table = bom_table(
            &bom(vec![item(1, long, &["X1", "X2", "X3"])]),
            &BomOptions::default(),
        );
        assert_eq!(table[1][3], format!("{} (...)", &long[..40]));
        assert_eq!(table[1][4], "X1, X2, ...");

        let table = bom_table(
            &bom(vec![item(1, long, &["X1", "X2", "X3"])]),
            &BomOptions::new().with_restricted_lengths(false),
        );
        assert_eq!(table[1][3], long);
        assert_eq!(table[1][4], "X1, X2, X3");
    }

    #[test]
    fn test_filter_empty_columns() {
        let table = bom_table(
            &bom(vec![item(1, "Connector, 2 pins", &["X1"])]),
            &BomOptions::new().with_empty_columns_filtered(true),
        );
        assert_eq!(table[0], vec!["#", "Qty", "Description", "Designators", "MPN"]);
        assert_eq!(table[1], vec!["1", "1", "Connector, 2 pins", "X1", "MPN-1"]);
    }

    #[test]
    fn test_tsv() {
        let tsv = to_tsv(
            &bom(vec![item(1, "Connector, 2 pins", &["X1", "X2"])]),
            &BomOptions::new().with_empty_columns_filtered(true),
        );
        assert_eq!(
            tsv,
            "#\tQty\tDescription\tDesignators\tMPN\n1\t2\tConnector, 2 pins\tX1, X2\tMPN-1\n"
        );
    }
}
