//! Pin and wire selectors and their resolution to positions

use std::fmt;

use serde_yaml::Value;

use super::ResolveError;
use crate::parser::value_kind;

/// Separator between a label and its 1-based occurrence, as in `GND__2`
pub const DISAMBIGUATION_SEPARATOR: &str = "__";

/// A reference to one or more pins or wires, parsed once from YAML
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// A pin or wire id, usually a number
    Scalar(String),
    /// An inclusive range; `9-7` counts down
    Range { start: i64, end: i64 },
    /// A pin label, wire label or wire color
    Label(String),
    /// The n-th (1-based) carrier of a repeated label
    DisambiguatedLabel { label: String, index: usize },
    List(Vec<Selector>),
}

/// Inclusive integer range in the direction from `start` to `end`
pub fn expand_range(start: i64, end: i64) -> Vec<i64> {
    if start <= end {
        (start..=end).collect()
    } else {
        (end..=start).rev().collect()
    }
}

impl Selector {
    /// Parse a textual selector such as `3`, `1-4`, `GND` or `GND__2`
    pub fn parse(text: &str) -> Selector {
        let text = text.trim();
        if let Some((start, end)) = text.split_once('-') {
            if let (Ok(start), Ok(end)) = (start.trim().parse::<i64>(), end.trim().parse::<i64>()) {
                return Selector::Range { start, end };
            }
        }
        if let Some((label, index)) = text.rsplit_once(DISAMBIGUATION_SEPARATOR) {
            if let (false, Ok(index)) = (label.is_empty(), index.parse::<usize>()) {
                return Selector::DisambiguatedLabel {
                    label: label.to_string(),
                    index,
                };
            }
        }
        if text.parse::<i64>().is_ok() {
            Selector::Scalar(text.to_string())
        } else {
            Selector::Label(text.to_string())
        }
    }

    /// Read a selector from YAML; `null` means no selector was given
    pub fn from_value(value: &Value) -> Result<Option<Selector>, String> {
        match value {
            Value::Null => Ok(None),
            Value::Sequence(items) => items
                .iter()
                .map(Self::atom)
                .collect::<Result<Vec<_>, _>>()
                .map(|items| Some(Selector::List(items))),
            other => Self::atom(other).map(Some),
        }
    }

    fn atom(value: &Value) -> Result<Selector, String> {
        match value {
            Value::Number(n) => Ok(Selector::Scalar(n.to_string())),
            Value::String(s) if s.trim().is_empty() => Err("empty pin or wire reference".to_string()),
            Value::String(s) => Ok(Selector::parse(s)),
            Value::Tagged(tagged) => Self::atom(&tagged.value),
            Value::Sequence(_) => Err("nested lists of pins or wires are not allowed".to_string()),
            other => Err(format!(
                "expected a pin or wire reference, found {}",
                value_kind(other)
            )),
        }
    }

    /// Flatten lists and ranges into single-position selectors, in order
    pub fn expand(&self) -> Vec<Selector> {
        match self {
            Selector::List(items) => items.iter().flat_map(Selector::expand).collect(),
            Selector::Range { start, end } => expand_range(*start, *end)
                .into_iter()
                .map(|n| Selector::Scalar(n.to_string()))
                .collect(),
            other => vec![other.clone()],
        }
    }

    /// Explicit lists fix the width of a connection set
    pub fn is_list(&self) -> bool {
        matches!(self, Selector::List(_))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Scalar(id) => f.write_str(id),
            Selector::Range { start, end } => write!(f, "{start}-{end}"),
            Selector::Label(label) => f.write_str(label),
            Selector::DisambiguatedLabel { label, index } => {
                write!(f, "{label}{DISAMBIGUATION_SEPARATOR}{index}")
            }
            Selector::List(items) => {
                let items: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", items.join(", "))
            }
        }
    }
}

/// Something whose pins or wires can be selected: connectors and cables
pub trait Addressable {
    /// e.g. `connector 'X1'`
    fn scope(&self) -> String;

    /// e.g. `pin 3`
    fn describe(&self, position: usize) -> String;

    /// Ids by position
    fn ids(&self) -> Vec<&str>;

    /// Positions carrying `label`, in declaration order
    fn label_matches(&self, label: &str) -> Vec<usize>;

    /// The only selectable position, if there is exactly one
    fn sole_position(&self) -> Option<usize>;

    fn position_of_id(&self, id: &str) -> Option<usize> {
        self.ids().iter().position(|candidate| *candidate == id)
    }
}

/// Resolve a selector to 0-based positions, keeping order and repetition
pub fn resolve_selector<T: Addressable + ?Sized>(
    target: &T,
    selector: Option<&Selector>,
) -> Result<Vec<usize>, ResolveError> {
    let Some(selector) = selector else {
        return target.sole_position().map(|p| vec![p]).ok_or_else(|| {
            ResolveError::reference(
                target.scope(),
                "",
                format!(
                    "no pin or wire given and there are {} to choose from",
                    target.ids().len()
                ),
            )
        });
    };
    check_range_widths(target, selector)?;
    selector
        .expand()
        .iter()
        .map(|atom| resolve_atom(target, atom))
        .collect()
}

/// A range wider than the id list cannot consist of existing ids only
fn check_range_widths<T: Addressable + ?Sized>(target: &T, selector: &Selector) -> Result<(), ResolveError> {
    match selector {
        Selector::Range { start, end } => {
            let available = target.ids().len() as u64;
            if start.abs_diff(*end) >= available {
                return Err(ResolveError::reference(
                    target.scope(),
                    selector.to_string(),
                    format!(
                        "range spans {} positions but there are only {available}",
                        start.abs_diff(*end).saturating_add(1)
                    ),
                ));
            }
            Ok(())
        }
        Selector::List(items) => items
            .iter()
            .try_for_each(|item| check_range_widths(target, item)),
        _ => Ok(()),
    }
}

fn resolve_atom<T: Addressable + ?Sized>(target: &T, atom: &Selector) -> Result<usize, ResolveError> {
    match atom {
        Selector::Scalar(id) => target.position_of_id(id).ok_or_else(|| {
            ResolveError::reference(target.scope(), id, "no such pin or wire")
        }),
        Selector::Label(label) => resolve_label(target, label),
        Selector::DisambiguatedLabel { label, index } => {
            let matches = target.label_matches(label);
            index
                .checked_sub(1)
                .and_then(|i| matches.get(i).copied())
                .ok_or_else(|| {
                    ResolveError::reference(
                        target.scope(),
                        atom.to_string(),
                        format!("'{label}' occurs {} time(s)", matches.len()),
                    )
                })
        }
        Selector::Range { .. } | Selector::List(_) => {
            Err(ResolveError::config(target.scope(), "nested pin or wire lists are not allowed"))
        }
    }
}

fn resolve_label<T: Addressable + ?Sized>(target: &T, label: &str) -> Result<usize, ResolveError> {
    let matches = target.label_matches(label);
    let by_id = target.position_of_id(label);
    match (matches.as_slice(), by_id) {
        ([], Some(position)) => Ok(position),
        ([], None) => Err(ResolveError::reference(
            target.scope(),
            label,
            "no pin or wire has this id, label or color",
        )),
        ([only], Some(position)) if *only != position => Err(ResolveError::ambiguous(
            target.scope(),
            label,
            vec![
                format!("label of {}", target.describe(*only)),
                format!("id of {}", target.describe(position)),
            ],
        )),
        ([only], _) => Ok(*only),
        (many, _) => Err(ResolveError::ambiguous(
            target.scope(),
            label,
            many.iter()
                .enumerate()
                .map(|(i, p)| {
                    format!(
                        "{label}{DISAMBIGUATION_SEPARATOR}{} ({})",
                        i + 1,
                        target.describe(*p)
                    )
                })
                .collect(),
        )),
    }
}

/// Resolve a YAML pin reference that must name exactly one position
pub fn resolve_single<T: Addressable + ?Sized>(target: &T, value: &Value) -> Result<usize, ResolveError> {
    let selector = Selector::from_value(value)
        .map_err(|e| ResolveError::config(target.scope(), e))?
        .ok_or_else(|| ResolveError::config(target.scope(), "missing pin reference"))?;
    match resolve_selector(target, Some(&selector))?.as_slice() {
        [position] => Ok(*position),
        positions => Err(ResolveError::reference(
            target.scope(),
            selector.to_string(),
            format!("expected a single pin, found {}", positions.len()),
        )),
    }
}
