//! Additional components attached to connectors and cables, and standalone BOM items

use serde::Serialize;

use super::{PartNumber, Quantity};
use crate::parser::ComponentDef;
use crate::resolve::ResolveError;

/// What an additional component's quantity is multiplied by
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QtyMultiplier {
    Fixed(f64),
    PinCount,
    Populated,
    Connections,
    WireCount,
    Terminations,
    Length,
    TotalLength,
}

impl QtyMultiplier {
    pub fn parse(text: &str) -> Result<Self, String> {
        let text = text.trim();
        if let Ok(number) = text.parse::<f64>() {
            if number.is_finite() {
                return Ok(QtyMultiplier::Fixed(number));
            }
        }
        match text.to_ascii_lowercase().as_str() {
            "pincount" => Ok(QtyMultiplier::PinCount),
            "populated" => Ok(QtyMultiplier::Populated),
            "connections" => Ok(QtyMultiplier::Connections),
            "wirecount" => Ok(QtyMultiplier::WireCount),
            "terminations" | "termination" => Ok(QtyMultiplier::Terminations),
            "length" => Ok(QtyMultiplier::Length),
            "total_length" => Ok(QtyMultiplier::TotalLength),
            _ => Err(format!(
                "unknown qty_multiplier '{text}'; expected a number, pincount, populated, \
                 connections, wirecount, terminations, length or total_length"
            )),
        }
    }

    pub fn applies_to(&self, owner: OwnerKind) -> bool {
        match self {
            QtyMultiplier::Fixed(_) => true,
            QtyMultiplier::PinCount | QtyMultiplier::Populated | QtyMultiplier::Connections => {
                owner == OwnerKind::Connector
            }
            QtyMultiplier::WireCount
            | QtyMultiplier::Terminations
            | QtyMultiplier::Length
            | QtyMultiplier::TotalLength => owner == OwnerKind::Cable,
        }
    }

    /// Length based multipliers take their unit from the cable
    pub fn inherits_unit(&self) -> bool {
        matches!(self, QtyMultiplier::Length | QtyMultiplier::TotalLength)
    }
}

/// The kind of entity an additional component belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerKind {
    Connector,
    Cable,
    Standalone,
}

impl OwnerKind {
    fn noun(self) -> &'static str {
        match self {
            OwnerKind::Connector => "connectors",
            OwnerKind::Cable => "cables",
            OwnerKind::Standalone => "standalone BOM items",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdditionalComponent {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    pub qty: Quantity,
    pub qty_multiplier: QtyMultiplier,
    #[serde(flatten)]
    pub part: PartNumber,
    pub ignore_in_bom: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub designators: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional_components: Vec<AdditionalComponent>,
}

impl AdditionalComponent {
    pub fn from_def(def: &ComponentDef, owner: OwnerKind, scope: &str) -> Result<Self, ResolveError> {
        let mut qty = match &def.qty {
            Some(qty) if !qty.as_str().trim().is_empty() => {
                Quantity::parse(qty.as_str(), None).map_err(|e| ResolveError::config(scope, e))?
            }
            _ => Quantity::count(1.0),
        };
        if let Some(unit) = def.unit.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            match &qty.unit {
                Some(existing) if existing != unit => {
                    return Err(ResolveError::config(
                        scope,
                        format!("qty unit '{existing}' conflicts with unit '{unit}'"),
                    ));
                }
                _ => qty.unit = Some(unit.to_string()),
            }
        }

        let qty_multiplier = match &def.qty_multiplier {
            Some(multiplier) => {
                QtyMultiplier::parse(multiplier.as_str()).map_err(|e| ResolveError::config(scope, e))?
            }
            None => QtyMultiplier::Fixed(1.0),
        };
        if !qty_multiplier.applies_to(owner) {
            return Err(ResolveError::config(
                scope,
                format!(
                    "qty_multiplier {qty_multiplier:?} is not available for {}",
                    owner.noun()
                ),
            ));
        }
        if qty_multiplier.inherits_unit() && qty.unit.is_some() {
            return Err(ResolveError::config(
                scope,
                "a length based qty_multiplier takes its unit from the cable length; \
                 remove the unit from qty",
            ));
        }

        if !def.designators.is_empty() && owner != OwnerKind::Standalone {
            return Err(ResolveError::config(
                scope,
                "designators are only allowed on standalone BOM items",
            ));
        }
        if !def.additional_components.is_empty() && owner != OwnerKind::Standalone {
            return Err(ResolveError::config(
                scope,
                "additional components cannot be nested",
            ));
        }
        let additional_components = def
            .additional_components
            .iter()
            .enumerate()
            .map(|(i, sub)| {
                Self::from_def(sub, OwnerKind::Standalone, &format!("{scope}, additional component {}", i + 1))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let [pn, manufacturer, mpn, supplier, spn] = def.part_fields();
        Ok(Self {
            type_: def.type_text(),
            subtype: def.subtype_text(),
            qty,
            qty_multiplier,
            part: PartNumber {
                pn,
                manufacturer,
                mpn,
                supplier,
                spn,
            },
            ignore_in_bom: def.ignore_in_bom,
            designators: def
                .designators
                .iter()
                .map(|d| d.as_str().trim().to_string())
                .filter(|d| !d.is_empty())
                .collect(),
            additional_components,
        })
    }

    /// `<type>, <subtype>`
    pub fn description(&self) -> String {
        [self.type_.as_deref(), self.subtype.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Build the additional components of one owner
pub fn build_components(
    defs: &[ComponentDef],
    owner: OwnerKind,
    scope: &str,
) -> Result<Vec<AdditionalComponent>, ResolveError> {
    defs.iter()
        .enumerate()
        .map(|(i, def)| {
            AdditionalComponent::from_def(def, owner, &format!("{scope}, additional component {}", i + 1))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::from_body;

    fn def(yaml: &str) -> ComponentDef {
        from_body(&serde_yaml::from_str(yaml).expect("Should parse yaml")).expect("Should deserialize")
    }

    #[test]
    fn test_defaults() {
        let component = AdditionalComponent::from_def(&def("type: Crimp"), OwnerKind::Connector, "c")
            .expect("Should build");
        assert_eq!(component.qty, Quantity::count(1.0));
        assert_eq!(component.qty_multiplier, QtyMultiplier::Fixed(1.0));
        assert_eq!(component.description(), "Crimp");
    }

    #[test]
    fn test_multiplier_names() {
        assert_eq!(QtyMultiplier::parse("PinCount"), Ok(QtyMultiplier::PinCount));
        assert_eq!(QtyMultiplier::parse("termination"), Ok(QtyMultiplier::Terminations));
        assert_eq!(QtyMultiplier::parse("2.5"), Ok(QtyMultiplier::Fixed(2.5)));
        assert!(QtyMultiplier::parse("pins").is_err());
    }

    #[test]
    fn test_connector_multiplier_on_cable_is_rejected() {
        let err = AdditionalComponent::from_def(
            &def("type: Sleeve\nqty_multiplier: populated"),
            OwnerKind::Cable,
            "cable 'W1'",
        )
        .unwrap_err();
        assert!(matches!(err, ResolveError::Config { .. }));
    }

    #[test]
    fn test_length_multiplier_rejects_unit() {
        let err = AdditionalComponent::from_def(
            &def("type: Sleeve\nqty: 1 m\nqty_multiplier: length"),
            OwnerKind::Cable,
            "cable 'W1'",
        )
        .unwrap_err();
        assert!(matches!(err, ResolveError::Config { .. }));
    }

    #[test]
    fn test_unit_key() {
        let component = AdditionalComponent::from_def(
            &def("type: Tape\nqty: 2\nunit: m"),
            OwnerKind::Standalone,
            "item",
        )
        .expect("Should build");
        assert_eq!(component.qty, Quantity::new(2.0, Some("m".into())));
        let conflict = AdditionalComponent::from_def(
            &def("type: Tape\nqty: 2 cm\nunit: m"),
            OwnerKind::Standalone,
            "item",
        );
        assert!(conflict.is_err());
    }
}
