//! Raw component definitions as written in a harness description
//!
//! These mirror the YAML one to one. Validation and defaulting happen when
//! the template registry turns them into model prototypes.

use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

use crate::model::Side;

/// A YAML scalar read as text; numbers keep their written form (`1`, `0.25`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scalar(pub String);

impl Scalar {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        scalar_text(&value).map(Scalar).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "expected a single value, found {}",
                value_kind(&value)
            ))
        })
    }
}

/// Text of a scalar YAML value; `null` reads as an empty string
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "nothing",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

fn optional_text(value: &Option<Scalar>) -> Option<String> {
    value
        .as_ref()
        .map(|s| s.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// A part number field of a bundle: one value for all wires or one per wire
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PerWire {
    One(Scalar),
    Many(Vec<Scalar>),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ShieldDef {
    Flag(bool),
    Color(Scalar),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LoopDef {
    Pair(Vec<Value>),
    Detailed(LoopSpec),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoopSpec {
    pub first: Value,
    pub second: Value,
    #[serde(default)]
    pub side: Option<Side>,
    #[serde(default)]
    pub color: Option<Scalar>,
    #[serde(default)]
    pub label: Option<Scalar>,
    #[serde(default = "default_true")]
    pub show_label: bool,
}

fn default_true() -> bool {
    true
}

/// Presentation attributes shared by connectors and cables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppearanceDef {
    pub color: Option<Scalar>,
    pub bgcolor: Option<String>,
    pub bgcolor_title: Option<String>,
    pub notes: Option<String>,
    pub image: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectorDef {
    #[serde(rename = "type")]
    pub type_: Option<Scalar>,
    pub subtype: Option<Scalar>,
    pub pn: Option<Scalar>,
    pub manufacturer: Option<Scalar>,
    pub mpn: Option<Scalar>,
    pub supplier: Option<Scalar>,
    pub spn: Option<Scalar>,
    pub style: Option<String>,
    pub pincount: Option<usize>,
    pub pins: Vec<Scalar>,
    pub pinlabels: Vec<Scalar>,
    pub pincolors: Vec<Scalar>,
    pub loops: Vec<LoopDef>,
    pub additional_components: Vec<ComponentDef>,
    pub autogenerate: bool,
    pub ignore_in_bom: bool,
    pub show_name: Option<bool>,
    pub show_pincount: Option<bool>,
    pub hide_disconnected_pins: bool,
    pub color: Option<Scalar>,
    pub bgcolor: Option<String>,
    pub bgcolor_title: Option<String>,
    pub notes: Option<String>,
    pub image: Option<Value>,
}

impl ConnectorDef {
    pub fn type_text(&self) -> Option<String> {
        optional_text(&self.type_)
    }

    pub fn subtype_text(&self) -> Option<String> {
        optional_text(&self.subtype)
    }

    pub fn appearance(&self) -> AppearanceDef {
        AppearanceDef {
            color: self.color.clone(),
            bgcolor: self.bgcolor.clone(),
            bgcolor_title: self.bgcolor_title.clone(),
            notes: self.notes.clone(),
            image: self.image.clone(),
        }
    }

    pub fn part_fields(&self) -> [Option<String>; 5] {
        [
            optional_text(&self.pn),
            optional_text(&self.manufacturer),
            optional_text(&self.mpn),
            optional_text(&self.supplier),
            optional_text(&self.spn),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CableDef {
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub type_: Option<Scalar>,
    pub subtype: Option<Scalar>,
    pub pn: Option<PerWire>,
    pub manufacturer: Option<PerWire>,
    pub mpn: Option<PerWire>,
    pub supplier: Option<PerWire>,
    pub spn: Option<PerWire>,
    pub gauge: Option<Scalar>,
    pub length: Option<Scalar>,
    pub color_code: Option<String>,
    pub wirecount: Option<usize>,
    pub colors: Vec<Scalar>,
    pub wirelabels: Vec<Scalar>,
    pub shield: Option<ShieldDef>,
    pub show_equiv: bool,
    pub show_wirecount: Option<bool>,
    pub show_name: Option<bool>,
    pub additional_components: Vec<ComponentDef>,
    pub ignore_in_bom: bool,
    pub color: Option<Scalar>,
    pub bgcolor: Option<String>,
    pub bgcolor_title: Option<String>,
    pub notes: Option<String>,
    pub image: Option<Value>,
}

impl CableDef {
    pub fn type_text(&self) -> Option<String> {
        optional_text(&self.type_)
    }

    pub fn subtype_text(&self) -> Option<String> {
        optional_text(&self.subtype)
    }

    pub fn appearance(&self) -> AppearanceDef {
        AppearanceDef {
            color: self.color.clone(),
            bgcolor: self.bgcolor.clone(),
            bgcolor_title: self.bgcolor_title.clone(),
            notes: self.notes.clone(),
            image: self.image.clone(),
        }
    }

    /// pn, manufacturer, mpn, supplier and spn in that order
    pub fn part_fields(&self) -> [(&'static str, &Option<PerWire>); 5] {
        [
            ("pn", &self.pn),
            ("manufacturer", &self.manufacturer),
            ("mpn", &self.mpn),
            ("supplier", &self.supplier),
            ("spn", &self.spn),
        ]
    }
}

/// An additional component of a connector or cable, or a standalone BOM item
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComponentDef {
    #[serde(rename = "type")]
    pub type_: Option<Scalar>,
    pub subtype: Option<Scalar>,
    pub qty: Option<Scalar>,
    pub unit: Option<String>,
    pub qty_multiplier: Option<Scalar>,
    pub pn: Option<Scalar>,
    pub manufacturer: Option<Scalar>,
    pub mpn: Option<Scalar>,
    pub supplier: Option<Scalar>,
    pub spn: Option<Scalar>,
    pub ignore_in_bom: bool,
    pub designators: Vec<Scalar>,
    pub additional_components: Vec<ComponentDef>,
}

impl ComponentDef {
    pub fn type_text(&self) -> Option<String> {
        optional_text(&self.type_)
    }

    pub fn subtype_text(&self) -> Option<String> {
        optional_text(&self.subtype)
    }

    pub fn part_fields(&self) -> [Option<String>; 5] {
        [
            optional_text(&self.pn),
            optional_text(&self.manufacturer),
            optional_text(&self.mpn),
            optional_text(&self.supplier),
            optional_text(&self.spn),
        ]
    }
}

/// Deserialize a definition body; an empty body means all defaults
pub fn from_body<T>(value: &Value) -> Result<T, serde_yaml::Error>
where
    T: Default + for<'de> Deserialize<'de>,
{
    match value {
        Value::Null => Ok(T::default()),
        other => serde_yaml::from_value(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_keeps_written_number() {
        let s: Scalar = serde_yaml::from_str("0.25").expect("Should parse");
        assert_eq!(s.as_str(), "0.25");
        let s: Scalar = serde_yaml::from_str("12").expect("Should parse");
        assert_eq!(s.as_str(), "12");
    }

    #[test]
    fn test_scalar_rejects_list() {
        assert!(serde_yaml::from_str::<Scalar>("[1, 2]").is_err());
    }

    #[test]
    fn test_connector_def_rejects_unknown_field() {
        let value: Value = serde_yaml::from_str("pincount: 2\npincuont: 3").expect("Should parse");
        assert!(from_body::<ConnectorDef>(&value).is_err());
    }

    #[test]
    fn test_cable_per_wire_fields() {
        let value: Value = serde_yaml::from_str(
            "category: bundle\nwirecount: 2\npn: [A, B]\nmanufacturer: Acme",
        )
        .expect("Should parse");
        let def: CableDef = from_body(&value).expect("Should deserialize");
        assert!(matches!(def.pn, Some(PerWire::Many(ref list)) if list.len() == 2));
        assert!(matches!(def.manufacturer, Some(PerWire::One(_))));
    }

    #[test]
    fn test_shield_flag_and_color() {
        let def: CableDef = from_body(&serde_yaml::from_str("shield: true").expect("yaml"))
            .expect("Should deserialize");
        assert_eq!(def.shield, Some(ShieldDef::Flag(true)));
        let def: CableDef = from_body(&serde_yaml::from_str("shield: SN").expect("yaml"))
            .expect("Should deserialize");
        assert_eq!(def.shield, Some(ShieldDef::Color(Scalar("SN".into()))));
    }

    #[test]
    fn test_null_body_is_default() {
        let def: ConnectorDef = from_body(&Value::Null).expect("Should deserialize");
        assert_eq!(def, ConnectorDef::default());
    }
}
