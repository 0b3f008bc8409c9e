//! Collecting and consolidating BOM entries

use std::collections::{BTreeSet, HashMap};

use indexmap::map::Entry;
use indexmap::IndexMap;
use tracing::debug;

use super::{Bom, BomCategory, BomItem, Designator};
use crate::color::ColorMode;
use crate::model::{
    cable_scope, AdditionalComponent, Cable, Connector, PartNumber, QtyMultiplier, Quantity,
};
use crate::resolve::ResolveError;

/// Items with the same key are the same part
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct BomKey {
    description: String,
    part: PartNumber,
    unit: Option<String>,
}

#[derive(Debug)]
struct Pending {
    category: BomCategory,
    qty: Quantity,
    designators: BTreeSet<Designator>,
}

/// The entity an additional component belongs to
enum Owner<'a> {
    Connector(&'a Connector),
    Cable(&'a Cable),
    Standalone(&'a str),
}

impl Owner<'_> {
    fn designator(&self) -> &str {
        match self {
            Owner::Connector(c) => &c.designator,
            Owner::Cable(c) => &c.designator,
            Owner::Standalone(name) => name,
        }
    }
}

#[derive(Default)]
struct Aggregator {
    entries: IndexMap<BomKey, Pending>,
    owners: Vec<(String, BomKey)>,
}

impl Aggregator {
    fn add(
        &mut self,
        category: BomCategory,
        description: String,
        qty: Quantity,
        part: &PartNumber,
        designators: &[&str],
    ) -> Result<BomKey, ResolveError> {
        let key = BomKey {
            description,
            part: part.clone(),
            unit: qty.unit.clone(),
        };
        match self.entries.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                let pending = occupied.get_mut();
                pending.qty = pending.qty.checked_add(&qty).ok_or_else(|| {
                    ResolveError::aggregation(
                        designators.first().copied().unwrap_or_default(),
                        format!("unit mismatch while adding to '{}'", key.description),
                    )
                })?;
                pending
                    .designators
                    .extend(designators.iter().map(|d| Designator::from(*d)));
                debug!(description = %key.description, "consolidated BOM entry");
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Pending {
                    category,
                    qty,
                    designators: designators.iter().map(|d| Designator::from(*d)).collect(),
                });
            }
        }
        Ok(key)
    }

    fn add_components(
        &mut self,
        owner: Owner<'_>,
        components: &[AdditionalComponent],
        designators: &[&str],
    ) -> Result<(), ResolveError> {
        for component in components {
            if !component.ignore_in_bom {
                let qty = component_qty(component, &owner)?;
                self.add(
                    BomCategory::Additional,
                    component.description(),
                    qty,
                    &component.part,
                    designators,
                )?;
            }
        }
        Ok(())
    }

    fn finish(self) -> Bom {
        let Aggregator { entries, owners } = self;
        let mut entries: Vec<(BomKey, Pending)> = entries.into_iter().collect();
        entries.sort_by(|(a_key, a), (b_key, b)| {
            a.category
                .cmp(&b.category)
                .then_with(|| a_key.description.cmp(&b_key.description))
        });

        let mut key_ids = HashMap::new();
        let items = entries
            .into_iter()
            .enumerate()
            .map(|(i, (key, pending))| {
                let id = i + 1;
                let item = BomItem {
                    id,
                    category: pending.category,
                    description: key.description.clone(),
                    qty: pending.qty,
                    part: key.part.clone(),
                    designators: pending.designators,
                };
                key_ids.insert(key, id);
                item
            })
            .collect();
        let ids = owners
            .into_iter()
            .filter_map(|(designator, key)| key_ids.get(&key).map(|id| (designator, *id)))
            .collect();
        Bom { items, ids }
    }
}

fn multiplier(component: &AdditionalComponent, owner: &Owner<'_>) -> Result<f64, ResolveError> {
    let unsupported = || {
        ResolveError::aggregation(
            owner.designator(),
            format!(
                "qty_multiplier {:?} does not apply to this owner",
                component.qty_multiplier
            ),
        )
    };
    let without_length = |cable: &Cable| {
        ResolveError::config(
            cable_scope(&cable.designator),
            "a length based qty_multiplier needs the cable length",
        )
    };
    match (component.qty_multiplier, owner) {
        (QtyMultiplier::Fixed(factor), _) => Ok(factor),
        (QtyMultiplier::PinCount, Owner::Connector(c)) => Ok(c.pincount() as f64),
        (QtyMultiplier::Populated, Owner::Connector(c)) => Ok(c.populated_pins() as f64),
        (QtyMultiplier::Connections, Owner::Connector(c)) => Ok(c.connection_count() as f64),
        (QtyMultiplier::WireCount, Owner::Cable(c)) => Ok(c.wirecount() as f64),
        (QtyMultiplier::Terminations, Owner::Cable(c)) => Ok(c.terminations() as f64),
        (QtyMultiplier::Length, Owner::Cable(c)) => c
            .length
            .as_ref()
            .map(|l| l.number)
            .ok_or_else(|| without_length(c)),
        (QtyMultiplier::TotalLength, Owner::Cable(c)) => c
            .total_length()
            .map(|l| l.number)
            .ok_or_else(|| without_length(c)),
        _ => Err(unsupported()),
    }
}

fn component_qty(component: &AdditionalComponent, owner: &Owner<'_>) -> Result<Quantity, ResolveError> {
    let mut qty = component.qty.scaled(multiplier(component, owner)?);
    if component.qty_multiplier.inherits_unit() {
        if let Owner::Cable(cable) = owner {
            qty.unit = cable.length.as_ref().and_then(|l| l.unit.clone());
        }
    }
    Ok(qty)
}

fn shown(show_name: bool, designator: &str) -> Vec<&str> {
    if show_name {
        vec![designator]
    } else {
        Vec::new()
    }
}

/// Build the BOM of a resolved harness.
///
/// Connectors come first, then cables, bundle wires, standalone items and
/// finally the additional components of all of these. Equal parts are
/// merged, then items are sorted by category and description and numbered.
pub fn aggregate(
    connectors: &IndexMap<String, Connector>,
    cables: &IndexMap<String, Cable>,
    standalone: &[AdditionalComponent],
    mode: ColorMode,
) -> Result<Bom, ResolveError> {
    let mut bom = Aggregator::default();

    for connector in connectors.values().filter(|c| !c.ignore_in_bom) {
        let key = bom.add(
            BomCategory::Connector,
            connector.description(mode),
            Quantity::count(1.0),
            &connector.part,
            &shown(connector.show_name, &connector.designator),
        )?;
        bom.owners.push((connector.designator.clone(), key));
    }

    for cable in cables.values().filter(|c| !c.ignore_in_bom && !c.is_bundle()) {
        let qty = cable.length.clone().unwrap_or_else(|| Quantity::count(1.0));
        let key = bom.add(
            BomCategory::Cable,
            cable.description(mode),
            qty,
            &cable.part,
            &shown(cable.show_name, &cable.designator),
        )?;
        bom.owners.push((cable.designator.clone(), key));
    }

    for cable in cables.values().filter(|c| !c.ignore_in_bom && c.is_bundle()) {
        for wire in cable.wires.iter().filter(|w| !w.is_shield) {
            let qty = cable.length.clone().unwrap_or_else(|| Quantity::count(1.0));
            bom.add(
                BomCategory::Wire,
                cable.wire_description(wire, mode),
                qty,
                &wire.part,
                &shown(cable.show_name, &cable.designator),
            )?;
        }
    }

    for item in standalone.iter().filter(|i| !i.ignore_in_bom) {
        let designators: Vec<&str> = item.designators.iter().map(String::as_str).collect();
        let owner = Owner::Standalone(designators.first().copied().unwrap_or_default());
        let qty = component_qty(item, &owner)?;
        bom.add(
            BomCategory::Additional,
            item.description(),
            qty,
            &item.part,
            &designators,
        )?;
    }

    for connector in connectors.values() {
        bom.add_components(
            Owner::Connector(connector),
            &connector.additional_components,
            &shown(connector.show_name, &connector.designator),
        )?;
    }
    for cable in cables.values() {
        bom.add_components(
            Owner::Cable(cable),
            &cable.additional_components,
            &shown(cable.show_name, &cable.designator),
        )?;
    }
    for item in standalone {
        let designators: Vec<&str> = item.designators.iter().map(String::as_str).collect();
        let owner = Owner::Standalone(designators.first().copied().unwrap_or_default());
        bom.add_components(owner, &item.additional_components, &designators)?;
    }

    let bom = bom.finish();
    debug!(items = bom.len(), "aggregated BOM");
    Ok(bom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OwnerKind;
    use crate::parser::{from_body, CableDef, ComponentDef, ConnectorDef};

    fn connector(name: &str, yaml: &str) -> Connector {
        let def: ConnectorDef =
            from_body(&serde_yaml::from_str(yaml).expect("Should parse yaml")).expect("Should deserialize");
        Connector::from_def(name, &def).expect("Should build")
    }

    fn cable(name: &str, yaml: &str) -> Cable {
        let def: CableDef =
            from_body(&serde_yaml::from_str(yaml).expect("Should parse yaml")).expect("Should deserialize");
        Cable::from_def(name, &def).expect("Should build")
    }

    fn connectors(list: Vec<Connector>) -> IndexMap<String, Connector> {
        list.into_iter().map(|c| (c.designator.clone(), c)).collect()
    }

    fn cables(list: Vec<Cable>) -> IndexMap<String, Cable> {
        list.into_iter().map(|c| (c.designator.clone(), c)).collect()
    }

    #[test]
    fn test_identical_connectors_consolidate() {
        let body = "type: KK\nmanufacturer: Molex\nmpn: '123'\npincount: 2";
        let bom = aggregate(
            &connectors(vec![connector("X2", body), connector("X1", body)]),
            &IndexMap::new(),
            &[],
            ColorMode::default(),
        )
        .expect("Should aggregate");
        assert_eq!(bom.len(), 1);
        assert_eq!(bom.items[0].qty, Quantity::count(2.0));
        assert_eq!(bom.items[0].designator_list(), vec!["X1", "X2"]);
        assert_eq!(bom.id_of("X1"), Some(1));
        assert_eq!(bom.id_of("X2"), Some(1));
    }

    #[test]
    fn test_different_part_numbers_stay_apart() {
        let bom = aggregate(
            &connectors(vec![
                connector("X1", "type: KK\npincount: 2\npn: A"),
                connector("X2", "type: KK\npincount: 2\npn: B"),
            ]),
            &IndexMap::new(),
            &[],
            ColorMode::default(),
        )
        .expect("Should aggregate");
        assert_eq!(bom.len(), 2);
    }

    #[test]
    fn test_cable_lengths_add_up() {
        let bom = aggregate(
            &IndexMap::new(),
            &cables(vec![
                cable("W1", "wirecount: 2\ngauge: 0.25\nlength: 1.5"),
                cable("W2", "wirecount: 2\ngauge: 0.25\nlength: 2"),
            ]),
            &[],
            ColorMode::default(),
        )
        .expect("Should aggregate");
        assert_eq!(bom.len(), 1);
        assert_eq!(bom.items[0].qty, Quantity::new(3.5, Some("m".into())));
        assert_eq!(bom.items[0].description, "Cable, 2 x 0.25 mm²");
    }

    #[test]
    fn test_bundle_wires_are_separate_items() {
        let bom = aggregate(
            &IndexMap::new(),
            &cables(vec![cable(
                "W1",
                "category: bundle\ncolors: [RD, BK, RD]\ngauge: 0.5\nlength: 2\nshield: true",
            )]),
            &[],
            ColorMode::default(),
        )
        .expect("Should aggregate");
        let descriptions: Vec<&str> = bom.items.iter().map(|i| i.description.as_str()).collect();
        assert_eq!(descriptions, vec!["Wire, 0.5 mm², BK", "Wire, 0.5 mm², RD"]);
        assert_eq!(bom.items[1].qty, Quantity::new(4.0, Some("m".into())));
        assert_eq!(bom.id_of("W1"), None);
    }

    #[test]
    fn test_additional_component_multipliers() {
        let mut x1 = connector(
            "X1",
            "pincount: 4\nadditional_components:\n  - {type: Crimp, qty_multiplier: populated}\n  - {type: Seal, qty: 2, qty_multiplier: pincount}",
        );
        x1.pins[0].connection_count = 1;
        x1.pins[3].connection_count = 2;
        let bom = aggregate(&connectors(vec![x1]), &IndexMap::new(), &[], ColorMode::default())
            .expect("Should aggregate");
        let crimp = bom.items.iter().find(|i| i.description == "Crimp").expect("Should have crimps");
        let seal = bom.items.iter().find(|i| i.description == "Seal").expect("Should have seals");
        assert_eq!(crimp.qty, Quantity::count(2.0));
        assert_eq!(seal.qty, Quantity::count(8.0));
        assert_eq!(crimp.designator_list(), vec!["X1"]);
    }

    #[test]
    fn test_length_multiplier_inherits_unit() {
        let w1 = cable(
            "W1",
            "wirecount: 3\nlength: 0.5 m\nadditional_components:\n  - {type: Sleeve, qty_multiplier: length}\n  - {type: Marker, qty_multiplier: total_length}",
        );
        let bom = aggregate(&IndexMap::new(), &cables(vec![w1]), &[], ColorMode::default())
            .expect("Should aggregate");
        let sleeve = bom.items.iter().find(|i| i.description == "Sleeve").expect("Should have sleeve");
        let marker = bom.items.iter().find(|i| i.description == "Marker").expect("Should have marker");
        assert_eq!(sleeve.qty, Quantity::new(0.5, Some("m".into())));
        assert_eq!(marker.qty, Quantity::new(1.5, Some("m".into())));
    }

    #[test]
    fn test_length_multiplier_without_length_is_config_error() {
        let w1 = cable(
            "W1",
            "wirecount: 1\nadditional_components:\n  - {type: Sleeve, qty_multiplier: length}",
        );
        let err = aggregate(&IndexMap::new(), &cables(vec![w1]), &[], ColorMode::default()).unwrap_err();
        assert!(matches!(err, ResolveError::Config { .. }));
    }

    #[test]
    fn test_ignore_in_bom_keeps_components() {
        let x1 = connector(
            "X1",
            "pincount: 1\nignore_in_bom: true\nadditional_components: [{type: Label}]",
        );
        let bom = aggregate(&connectors(vec![x1]), &IndexMap::new(), &[], ColorMode::default())
            .expect("Should aggregate");
        assert_eq!(bom.len(), 1);
        assert_eq!(bom.items[0].category, BomCategory::Additional);
    }

    #[test]
    fn test_standalone_items_and_ordering() {
        let def: ComponentDef = from_body(
            &serde_yaml::from_str("{type: Heat shrink, qty: 0.3 m, designators: [W1]}").expect("yaml"),
        )
        .expect("Should deserialize");
        let item = AdditionalComponent::from_def(&def, OwnerKind::Standalone, "item").expect("Should build");
        let bom = aggregate(
            &connectors(vec![connector("X1", "pincount: 1")]),
            &cables(vec![cable("W1", "wirecount: 1")]),
            &[item],
            ColorMode::default(),
        )
        .expect("Should aggregate");
        let categories: Vec<BomCategory> = bom.items.iter().map(|i| i.category).collect();
        assert_eq!(
            categories,
            vec![BomCategory::Connector, BomCategory::Cable, BomCategory::Additional]
        );
        assert_eq!(bom.items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(bom.items[2].qty.to_string(), "0.30 m");
    }

    #[test]
    fn test_unsupported_multiplier_is_aggregation_error() {
        let mut x1 = connector("X1", "pincount: 1\nadditional_components: [{type: Crimp}]");
        x1.additional_components[0].qty_multiplier = QtyMultiplier::WireCount;
        let err = aggregate(&connectors(vec![x1]), &IndexMap::new(), &[], ColorMode::default()).unwrap_err();
        assert!(matches!(err, ResolveError::Aggregation { .. }));
    }
}
