//! Cables and bundles, their wires and the per-wire connection links

use serde::Serialize;

use super::{build_components, AdditionalComponent, Appearance, OwnerKind, PartNumber, Quantity};
use crate::color::{assign_colors, gauge_str, gauge_str_with_equiv, translate_color, ColorMode};
use crate::parser::{CableDef, PerWire, ShieldDef};
use crate::resolve::{Addressable, ResolveError};

/// Id of the shield conductor
pub const SHIELD_ID: &str = "s";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CableCategory {
    #[default]
    Cable,
    /// Loose wires, each its own BOM line
    Bundle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Wire {
    pub index: usize,
    pub id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub is_shield: bool,
    #[serde(flatten)]
    pub part: PartNumber,
}

/// A connector pin attached to one end of a wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PinRef {
    pub designator: String,
    pub position: usize,
    pub id: String,
}

/// One wire of a cable as used by one connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireLink {
    pub connection: usize,
    pub wire: usize,
    pub from: Option<PinRef>,
    pub to: Option<PinRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cable {
    pub designator: String,
    pub template: String,
    pub autogenerated: bool,
    pub category: CableCategory,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(flatten)]
    pub part: PartNumber,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gauge: Option<Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_code: Option<String>,
    pub wires: Vec<Wire>,
    pub additional_components: Vec<AdditionalComponent>,
    #[serde(flatten)]
    pub appearance: Appearance,
    pub show_equiv: bool,
    pub show_wirecount: bool,
    pub show_name: bool,
    pub ignore_in_bom: bool,
    pub links: Vec<WireLink>,
    pub connections: Vec<usize>,
    #[serde(skip)]
    explicit_show_name: Option<bool>,
}

pub(crate) fn cable_scope(designator: &str) -> String {
    format!("cable '{designator}'")
}

fn non_blank(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

impl Cable {
    /// Validate a definition and materialize it as a prototype named `name`
    pub fn from_def(name: &str, def: &CableDef) -> Result<Self, ResolveError> {
        let scope = cable_scope(name);
        let category = match def.category.as_deref().map(str::trim) {
            None | Some("") => CableCategory::Cable,
            Some(c) if c.eq_ignore_ascii_case("cable") => CableCategory::Cable,
            Some(c) if c.eq_ignore_ascii_case("bundle") => CableCategory::Bundle,
            Some(other) => {
                return Err(ResolveError::config(
                    &scope,
                    format!("unknown category '{other}'; expected 'cable' or 'bundle'"),
                ))
            }
        };
        let gauge = def
            .gauge
            .as_ref()
            .filter(|g| !g.as_str().trim().is_empty())
            .map(|g| Quantity::parse(g.as_str(), Some("mm2")))
            .transpose()
            .map_err(|e| ResolveError::config(&scope, format!("gauge: {e}")))?;
        let length = def
            .length
            .as_ref()
            .filter(|l| !l.as_str().trim().is_empty())
            .map(|l| Quantity::parse(l.as_str(), Some("m")))
            .transpose()
            .map_err(|e| ResolveError::config(&scope, format!("length: {e}")))?;

        let colors: Vec<String> = def.colors.iter().map(|c| c.as_str().to_string()).collect();
        let assigned = assign_colors(def.wirecount, &colors, def.color_code.as_deref())
            .map_err(|e| ResolveError::config(&scope, e.to_string()))?;
        let wirecount = assigned.wirecount;
        if wirecount == 0 {
            return Err(ResolveError::config(&scope, "a cable needs at least one wire"));
        }

        let shield_color = match &def.shield {
            None | Some(ShieldDef::Flag(false)) => None,
            Some(ShieldDef::Flag(true)) => Some(None),
            Some(ShieldDef::Color(color)) => Some(non_blank(color.as_str())),
        };
        let labels: Vec<String> = def
            .wirelabels
            .iter()
            .map(|l| l.as_str().trim().to_string())
            .collect();
        if labels.len() > wirecount {
            return Err(ResolveError::config(
                &scope,
                format!("{} wirelabels given for {wirecount} wires", labels.len()),
            ));
        }
        if shield_color.is_some() && labels.iter().any(|l| l == SHIELD_ID) {
            return Err(ResolveError::config(
                &scope,
                "'s' is reserved for the shield and cannot be a wire label",
            ));
        }

        let mut cable_part: [Option<String>; 5] = Default::default();
        let mut wire_parts: Vec<[Option<String>; 5]> = vec![Default::default(); wirecount];
        for (field_index, (field, value)) in def.part_fields().into_iter().enumerate() {
            match value {
                None => {}
                Some(PerWire::One(text)) => cable_part[field_index] = non_blank(text.as_str()),
                Some(PerWire::Many(list)) => {
                    if category != CableCategory::Bundle {
                        return Err(ResolveError::config(
                            &scope,
                            format!("a list of {field} values is only allowed on bundles"),
                        ));
                    }
                    if list.len() != wirecount {
                        return Err(ResolveError::config(
                            &scope,
                            format!("{} {field} values given for {wirecount} wires", list.len()),
                        ));
                    }
                    for (wire, text) in wire_parts.iter_mut().zip(list) {
                        wire[field_index] = non_blank(text.as_str());
                    }
                }
            }
        }
        let to_part = |[pn, manufacturer, mpn, supplier, spn]: [Option<String>; 5]| PartNumber {
            pn,
            manufacturer,
            mpn,
            supplier,
            spn,
        };

        let mut wires: Vec<Wire> = assigned
            .colors
            .into_iter()
            .zip(wire_parts)
            .enumerate()
            .map(|(index, (color, own))| {
                // bundle wires fall back to the values given for the whole bundle
                let merged: [Option<String>; 5] = if category == CableCategory::Bundle {
                    let mut merged = own;
                    for (slot, shared) in merged.iter_mut().zip(cable_part.iter()) {
                        if slot.is_none() {
                            *slot = shared.clone();
                        }
                    }
                    merged
                } else {
                    own
                };
                Wire {
                    index,
                    id: (index + 1).to_string(),
                    label: labels.get(index).cloned().unwrap_or_default(),
                    color,
                    is_shield: false,
                    part: to_part(merged),
                }
            })
            .collect();
        if let Some(color) = shield_color {
            wires.push(Wire {
                index: wirecount,
                id: SHIELD_ID.to_string(),
                label: "Shield".to_string(),
                color,
                is_shield: true,
                part: PartNumber::default(),
            });
        }

        Ok(Cable {
            designator: name.to_string(),
            template: name.to_string(),
            autogenerated: false,
            category,
            type_: def.type_text(),
            subtype: def.subtype_text(),
            part: to_part(cable_part),
            gauge,
            length,
            color_code: def.color_code.clone(),
            wires,
            additional_components: build_components(
                &def.additional_components,
                OwnerKind::Cable,
                &scope,
            )?,
            appearance: Appearance::from(def.appearance()),
            show_equiv: def.show_equiv,
            show_wirecount: def.show_wirecount.unwrap_or(true),
            show_name: def.show_name.unwrap_or(true),
            ignore_in_bom: def.ignore_in_bom,
            links: Vec::new(),
            connections: Vec::new(),
            explicit_show_name: def.show_name,
        })
    }

    pub fn instantiate(&self, designator: &str, autogenerated: bool) -> Cable {
        let mut instance = self.clone();
        instance.designator = designator.to_string();
        instance.autogenerated = autogenerated;
        instance.show_name = self.explicit_show_name.unwrap_or(!autogenerated);
        instance
    }

    pub fn is_bundle(&self) -> bool {
        self.category == CableCategory::Bundle
    }

    /// Number of conductors, shield excluded
    pub fn wirecount(&self) -> usize {
        self.wires.iter().filter(|w| !w.is_shield).count()
    }

    pub fn shield(&self) -> Option<&Wire> {
        self.wires.iter().find(|w| w.is_shield)
    }

    /// Wire ends attached to a connector pin
    pub fn terminations(&self) -> usize {
        self.links
            .iter()
            .map(|l| usize::from(l.from.is_some()) + usize::from(l.to.is_some()))
            .sum()
    }

    /// Sum of all wire lengths, shield excluded
    pub fn total_length(&self) -> Option<Quantity> {
        self.length
            .as_ref()
            .map(|length| length.scaled(self.wirecount() as f64))
    }

    /// Gauge as shown on labels, with the equivalent when `show_equiv` is set
    pub fn gauge_display(&self) -> Option<String> {
        self.gauge.as_ref().map(|gauge| {
            if self.show_equiv {
                gauge_str_with_equiv(gauge)
            } else {
                gauge_str(gauge)
            }
        })
    }

    pub fn description(&self, mode: ColorMode) -> String {
        let mut parts = vec!["Cable".to_string()];
        parts.extend(self.type_.clone());
        parts.extend(self.subtype.clone());
        let wirecount = self.wirecount();
        match &self.gauge {
            Some(gauge) => parts.push(format!("{wirecount} x {}", gauge_str(gauge))),
            None => parts.push(format!("{wirecount} wires")),
        }
        if self.shield().is_some() {
            parts.push("shielded".to_string());
        }
        if let Some(color) = &self.appearance.color {
            parts.push(translate_color(color, mode));
        }
        parts.retain(|p| !p.is_empty());
        parts.join(", ")
    }

    /// BOM description of one bundle wire
    pub fn wire_description(&self, wire: &Wire, mode: ColorMode) -> String {
        let mut parts = vec!["Wire".to_string()];
        parts.extend(self.type_.clone());
        parts.extend(self.subtype.clone());
        parts.extend(self.gauge.as_ref().map(gauge_str));
        parts.extend(wire.color.as_deref().map(|c| translate_color(c, mode)));
        parts.retain(|p| !p.is_empty());
        parts.join(", ")
    }
}

impl Addressable for Cable {
    fn scope(&self) -> String {
        cable_scope(&self.designator)
    }

    fn describe(&self, position: usize) -> String {
        match self.wires.get(position) {
            Some(wire) if wire.is_shield => "shield".to_string(),
            Some(wire) => format!("wire {}", wire.id),
            None => format!("wire #{position}"),
        }
    }

    fn ids(&self) -> Vec<&str> {
        self.wires.iter().map(|w| w.id.as_str()).collect()
    }

    /// Wires carrying the label, followed by wires of that color
    fn label_matches(&self, label: &str) -> Vec<usize> {
        let mut matches: Vec<usize> = self
            .wires
            .iter()
            .filter(|w| !w.is_shield && !w.label.is_empty() && w.label == label)
            .map(|w| w.index)
            .collect();
        for wire in self.wires.iter().filter(|w| !w.is_shield) {
            let same_color = wire
                .color
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(label));
            if same_color && !matches.contains(&wire.index) {
                matches.push(wire.index);
            }
        }
        matches
    }

    fn sole_position(&self) -> Option<usize> {
        let mut conductors = self.wires.iter().filter(|w| !w.is_shield);
        match (conductors.next(), conductors.next()) {
            (Some(wire), None) => Some(wire.index),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::from_body;

    fn cable(yaml: &str) -> Result<Cable, ResolveError> {
        let def: CableDef =
            from_body(&serde_yaml::from_str(yaml).expect("Should parse yaml")).expect("Should deserialize");
        Cable::from_def("W1", &def)
    }

    #[test]
    fn test_wire_ids_and_shield() {
        let c = cable("wirecount: 2\nshield: true").expect("Should build");
        assert_eq!(c.wires.len(), 3);
        assert_eq!(c.wirecount(), 2);
        assert_eq!(c.wires[2].id, "s");
        assert_eq!(c.wires[2].label, "Shield");
    }

    #[test]
    fn test_twelve_wires_cycle_iec() {
        let c = cable("wirecount: 12\ncolor_code: IEC").expect("Should build");
        let colors: Vec<_> = c.wires.iter().map(|w| w.color.clone().unwrap_or_default()).collect();
        assert_eq!(&colors[10..], &["BN".to_string(), "RD".to_string()]);
    }

    #[test]
    fn test_shield_label_reserved() {
        let err = cable("wirecount: 2\nshield: true\nwirelabels: [a, s]").unwrap_err();
        assert!(matches!(err, ResolveError::Config { .. }));
        assert!(cable("wirecount: 2\nwirelabels: [a, s]").is_ok());
    }

    #[test]
    fn test_part_lists_only_on_bundles() {
        assert!(cable("wirecount: 2\npn: [A, B]").is_err());
        assert!(cable("category: bundle\nwirecount: 2\npn: [A]").is_err());
        let c = cable("category: bundle\nwirecount: 2\npn: [A, B]\nmanufacturer: Acme").expect("Should build");
        assert_eq!(c.wires[1].part.pn.as_deref(), Some("B"));
        assert_eq!(c.wires[1].part.manufacturer.as_deref(), Some("Acme"));
        assert_eq!(c.part.pn, None);
    }

    #[test]
    fn test_gauge_and_length_default_units() {
        let c = cable("wirecount: 1\ngauge: 0.25\nlength: 2\nshow_equiv: true").expect("Should build");
        assert_eq!(c.gauge.as_ref().and_then(|g| g.unit.as_deref()), Some("mm2"));
        assert_eq!(c.length, Some(Quantity::new(2.0, Some("m".into()))));
        assert_eq!(c.gauge_display().as_deref(), Some("0.25 mm² (24 AWG)"));
        assert_eq!(c.total_length(), Some(Quantity::new(2.0, Some("m".into()))));
    }

    #[test]
    fn test_color_and_label_matching() {
        let c = cable("colors: [RD, BK, RD]\nwirelabels: [VCC, GND]").expect("Should build");
        assert_eq!(c.label_matches("GND"), vec![1]);
        assert_eq!(c.label_matches("RD"), vec![0, 2]);
        assert_eq!(c.label_matches("BK"), vec![1]);
    }

    #[test]
    fn test_description() {
        let c = cable("type: LiYY\nwirecount: 3\ngauge: 0.25 mm2\nshield: true").expect("Should build");
        assert_eq!(
            c.description(ColorMode::ShortUpper),
            "Cable, LiYY, 3 x 0.25 mm², shielded"
        );
    }
}
