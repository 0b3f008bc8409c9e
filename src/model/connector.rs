//! Connectors, their pins and loops

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use super::{build_components, AdditionalComponent, Appearance, OwnerKind, PartNumber};
use crate::color::{translate_color, ColorMode};
use crate::parser::{ConnectorDef, LoopDef};
use crate::resolve::{resolve_single, Addressable, ResolveError};

/// Side of a connector on which wires or loops attach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "LEFT", alias = "left")]
    Left,
    #[serde(rename = "RIGHT", alias = "right")]
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorStyle {
    #[default]
    Default,
    /// A single-pin part such as a ferrule or splice
    Simple,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pin {
    pub index: usize,
    pub id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub connection_count: usize,
}

/// A jumper between two pins of the same connector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Loop {
    pub first: usize,
    pub second: usize,
    /// Filled in when the registry is finalized, if not given explicitly
    pub side: Option<Side>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub show_label: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connector {
    pub designator: String,
    /// Definition this connector was instantiated from
    pub template: String,
    pub autogenerated: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(flatten)]
    pub part: PartNumber,
    pub style: ConnectorStyle,
    pub pins: Vec<Pin>,
    pub loops: Vec<Loop>,
    pub additional_components: Vec<AdditionalComponent>,
    #[serde(flatten)]
    pub appearance: Appearance,
    pub show_name: bool,
    pub show_pincount: bool,
    pub hide_disconnected_pins: bool,
    pub ignore_in_bom: bool,
    pub autogenerate: bool,
    pub ports_left: bool,
    pub ports_right: bool,
    /// Indices of the connections touching this connector
    pub connections: Vec<usize>,
    #[serde(skip)]
    explicit_show_name: Option<bool>,
}

pub(crate) fn connector_scope(designator: &str) -> String {
    format!("connector '{designator}'")
}

fn texts(list: &[crate::parser::Scalar]) -> Vec<String> {
    list.iter().map(|s| s.as_str().trim().to_string()).collect()
}

impl Connector {
    /// Validate a definition and materialize it as a prototype named `name`
    pub fn from_def(name: &str, def: &ConnectorDef) -> Result<Self, ResolveError> {
        let scope = connector_scope(name);
        let style = match def.style.as_deref().map(str::trim) {
            None | Some("") => ConnectorStyle::Default,
            Some(style) if style.eq_ignore_ascii_case("simple") => ConnectorStyle::Simple,
            Some(other) => {
                return Err(ResolveError::config(
                    &scope,
                    format!("unknown style '{other}'; the only style is 'simple'"),
                ))
            }
        };

        let ids = texts(&def.pins);
        let labels = texts(&def.pinlabels);
        let colors = texts(&def.pincolors);
        let inferred = ids.len().max(labels.len()).max(colors.len());
        let pincount = match (def.pincount, style) {
            (Some(count), _) => count,
            (None, ConnectorStyle::Simple) => inferred.max(1),
            (None, ConnectorStyle::Default) => inferred,
        };
        if pincount == 0 {
            return Err(ResolveError::config(
                &scope,
                "connector has no pins; give pincount, pins, pinlabels or pincolors",
            ));
        }
        if style == ConnectorStyle::Simple && pincount > 1 {
            return Err(ResolveError::config(
                &scope,
                format!("simple connectors have exactly one pin, found {pincount}"),
            ));
        }

        let ids = if ids.is_empty() {
            (1..=pincount).map(|n| n.to_string()).collect()
        } else if ids.len() != pincount {
            return Err(ResolveError::config(
                &scope,
                format!("pincount is {pincount} but {} pins are listed", ids.len()),
            ));
        } else {
            ids
        };
        let mut seen = HashSet::new();
        for id in &ids {
            if id.is_empty() {
                return Err(ResolveError::config(&scope, "pin ids cannot be empty"));
            }
            if !seen.insert(id.as_str()) {
                return Err(ResolveError::config(
                    &scope,
                    format!("pin '{id}' is listed more than once"),
                ));
            }
        }
        for (field, list) in [("pinlabels", &labels), ("pincolors", &colors)] {
            if list.len() > pincount {
                return Err(ResolveError::config(
                    &scope,
                    format!("{} {field} given for {pincount} pins", list.len()),
                ));
            }
        }

        let pins = ids
            .into_iter()
            .enumerate()
            .map(|(index, id)| Pin {
                index,
                id,
                label: labels.get(index).cloned().unwrap_or_default(),
                color: colors.get(index).filter(|c| !c.is_empty()).cloned(),
                connection_count: 0,
            })
            .collect();

        let [pn, manufacturer, mpn, supplier, spn] = def.part_fields();
        let mut connector = Connector {
            designator: name.to_string(),
            template: name.to_string(),
            autogenerated: false,
            type_: def.type_text(),
            subtype: def.subtype_text(),
            part: PartNumber {
                pn,
                manufacturer,
                mpn,
                supplier,
                spn,
            },
            style,
            pins,
            loops: Vec::new(),
            additional_components: build_components(
                &def.additional_components,
                OwnerKind::Connector,
                &scope,
            )?,
            appearance: Appearance::from(def.appearance()),
            show_name: def.show_name.unwrap_or(style != ConnectorStyle::Simple),
            show_pincount: def.show_pincount.unwrap_or(style != ConnectorStyle::Simple),
            hide_disconnected_pins: def.hide_disconnected_pins,
            ignore_in_bom: def.ignore_in_bom,
            autogenerate: def.autogenerate,
            ports_left: false,
            ports_right: false,
            connections: Vec::new(),
            explicit_show_name: def.show_name,
        };

        let loops = def
            .loops
            .iter()
            .map(|l| connector.build_loop(l))
            .collect::<Result<Vec<_>, _>>()?;
        connector.loops = loops;
        Ok(connector)
    }

    fn build_loop(&self, def: &LoopDef) -> Result<Loop, ResolveError> {
        let scope = self.scope();
        let (first, second, side, color, label, show_label) = match def {
            LoopDef::Pair(pins) => {
                if pins.len() != 2 {
                    return Err(ResolveError::config(
                        &scope,
                        format!("a loop connects exactly two pins, found {}", pins.len()),
                    ));
                }
                (&pins[0], &pins[1], None, None, None, true)
            }
            LoopDef::Detailed(detail) => (
                &detail.first,
                &detail.second,
                detail.side,
                detail.color.clone().map(|c| c.into_string()),
                detail.label.clone().map(|l| l.into_string()),
                detail.show_label,
            ),
        };
        let first = self.loop_pin(first)?;
        let second = self.loop_pin(second)?;
        if first == second {
            return Err(ResolveError::config(
                &scope,
                format!("loop connects pin '{}' to itself", self.pins[first].id),
            ));
        }
        Ok(Loop {
            first,
            second,
            side,
            color: color.filter(|c| !c.trim().is_empty()),
            label: label.filter(|l| !l.trim().is_empty()),
            show_label,
        })
    }

    fn loop_pin(&self, value: &Value) -> Result<usize, ResolveError> {
        resolve_single(self, value)
    }

    /// A copy of this prototype under its own designator
    pub fn instantiate(&self, designator: &str, autogenerated: bool) -> Connector {
        let mut instance = self.clone();
        instance.designator = designator.to_string();
        instance.autogenerated = autogenerated;
        instance.autogenerate = false;
        instance.show_name = self
            .explicit_show_name
            .unwrap_or(!(autogenerated || self.is_simple()));
        instance
    }

    pub fn pincount(&self) -> usize {
        self.pins.len()
    }

    pub fn is_simple(&self) -> bool {
        self.style == ConnectorStyle::Simple
    }

    /// Pins with at least one wire or loop attached
    pub fn populated_pins(&self) -> usize {
        self.pins.iter().filter(|p| p.connection_count > 0).count()
    }

    /// Sum of connection counts over all pins
    pub fn connection_count(&self) -> usize {
        self.pins.iter().map(|p| p.connection_count).sum()
    }

    /// Pins a renderer should draw
    pub fn visible_pins(&self) -> impl Iterator<Item = &Pin> {
        let hide = self.hide_disconnected_pins;
        self.pins
            .iter()
            .filter(move |p| !hide || p.connection_count > 0)
    }

    pub fn description(&self, mode: ColorMode) -> String {
        let mut parts = vec!["Connector".to_string()];
        parts.extend(self.type_.clone());
        parts.extend(self.subtype.clone());
        if self.show_pincount {
            parts.push(format!("{} pins", self.pincount()));
        }
        if let Some(color) = &self.appearance.color {
            parts.push(translate_color(color, mode));
        }
        parts.retain(|p| !p.is_empty());
        parts.join(", ")
    }
}

impl Addressable for Connector {
    fn scope(&self) -> String {
        connector_scope(&self.designator)
    }

    fn describe(&self, position: usize) -> String {
        match self.pins.get(position) {
            Some(pin) => format!("pin {}", pin.id),
            None => format!("pin #{position}"),
        }
    }

    fn ids(&self) -> Vec<&str> {
        self.pins.iter().map(|p| p.id.as_str()).collect()
    }

    fn label_matches(&self, label: &str) -> Vec<usize> {
        self.pins
            .iter()
            .filter(|p| !p.label.is_empty() && p.label == label)
            .map(|p| p.index)
            .collect()
    }

    fn sole_position(&self) -> Option<usize> {
        (self.pins.len() == 1).then_some(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::from_body;

    fn connector(yaml: &str) -> Result<Connector, ResolveError> {
        let def: ConnectorDef =
            from_body(&serde_yaml::from_str(yaml).expect("Should parse yaml")).expect("Should deserialize");
        Connector::from_def("X1", &def)
    }

    #[test]
    fn test_pincount_inferred_from_labels() {
        let c = connector("pinlabels: [GND, VCC, RX, TX]").expect("Should build");
        assert_eq!(c.pincount(), 4);
        assert_eq!(c.pins[2].id, "3");
        assert_eq!(c.pins[2].label, "RX");
    }

    #[test]
    fn test_labels_padded_to_pincount() {
        let c = connector("pincount: 3\npinlabels: [A]").expect("Should build");
        assert_eq!(c.pins.len(), 3);
        assert_eq!(c.pins[1].label, "");
    }

    #[test]
    fn test_too_many_labels() {
        let err = connector("pincount: 1\npinlabels: [A, B]").unwrap_err();
        assert!(matches!(err, ResolveError::Config { .. }));
    }

    #[test]
    fn test_explicit_pins_must_match_pincount() {
        assert!(connector("pincount: 3\npins: [A, B]").is_err());
        let c = connector("pins: [A, B, C]").expect("Should build");
        assert_eq!(c.pincount(), 3);
    }

    #[test]
    fn test_duplicate_pins_rejected() {
        let err = connector("pins: [1, 2, 1]").unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_no_pins_rejected() {
        assert!(connector("type: Molex").is_err());
    }

    #[test]
    fn test_simple_style() {
        let c = connector("style: simple\ntype: Ferrule").expect("Should build");
        assert_eq!(c.pincount(), 1);
        assert!(!c.show_name);
        assert!(!c.show_pincount);
        assert!(connector("style: simple\npincount: 2").is_err());
    }

    #[test]
    fn test_loops_use_reference_resolution() {
        let c = connector("pinlabels: [A, B, C]\nloops: [[1, C], {first: A, second: 2, side: right}]")
            .expect("Should build");
        assert_eq!(c.loops[0].first, 0);
        assert_eq!(c.loops[0].second, 2);
        assert_eq!(c.loops[1].side, Some(Side::Right));
        assert!(connector("pincount: 2\nloops: [[1, 1]]").is_err());
        assert!(connector("pincount: 2\nloops: [[1, 5]]").is_err());
    }

    #[test]
    fn test_instantiate_keeps_prototype() {
        let prototype = connector("pincount: 2").expect("Should build");
        let instance = prototype.instantiate("X9", true);
        assert_eq!(instance.designator, "X9");
        assert_eq!(instance.template, "X1");
        assert!(!instance.show_name);
        assert_eq!(prototype.designator, "X1");
        assert!(prototype.show_name);
    }

    #[test]
    fn test_description() {
        let c = connector("type: Molex KK 254\nsubtype: female\npincount: 4\ncolor: WH")
            .expect("Should build");
        assert_eq!(
            c.description(ColorMode::ShortUpper),
            "Connector, Molex KK 254, female, 4 pins, WH"
        );
    }
}
