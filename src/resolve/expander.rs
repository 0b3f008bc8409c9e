//! Expansion of connection sets into elementary connections

use std::collections::HashMap;

use serde_yaml::Value;

use super::registry::{DesignatorRef, Registry};
use super::selector::{resolve_selector, Selector};
use super::ResolveError;
use crate::model::{ComponentKind, Connection, Endpoint};
use crate::parser::{scalar_text, value_kind};

/// One entry of a connection set after lookup and selector resolution
#[derive(Debug)]
struct PlannedEndpoint {
    written: String,
    kind: ComponentKind,
    /// One reference shared by every connection, or one per connection
    targets: Vec<DesignatorRef>,
    /// One position shared by every connection, or one per connection
    positions: Vec<usize>,
    ids: Vec<String>,
    /// Explicit lists and designator lists fix the width of the set
    fixed: bool,
}

impl PlannedEndpoint {
    fn width(&self) -> usize {
        self.targets.len().max(self.positions.len())
    }

    /// Whether this entry determines how many connections the set has
    fn constrains_width(&self) -> bool {
        self.fixed || self.width() > 1
    }

    fn pick<T>(items: &[T], i: usize) -> &T {
        if items.len() == 1 {
            &items[0]
        } else {
            &items[i]
        }
    }
}

fn set_scope(set: usize) -> String {
    format!("connection set {set}")
}

/// Expand the `set`-th (1-based) connection set.
///
/// All lookups and checks happen before the registry is touched; then
/// instances are allocated endpoint by endpoint, left to right.
pub fn expand_connection_set(
    set: usize,
    entries: &Value,
    registry: &mut Registry,
) -> Result<Vec<Connection>, ResolveError> {
    let scope = set_scope(set);
    let entries = match entries {
        Value::Sequence(entries) => entries,
        other => {
            return Err(ResolveError::config(
                scope,
                format!("expected a list of connectors and cables, found {}", value_kind(other)),
            ))
        }
    };
    if entries.len() < 2 {
        return Err(ResolveError::config(
            scope,
            "a connection set needs at least two entries",
        ));
    }

    let planned = entries
        .iter()
        .map(|entry| plan_endpoint(entry, &*registry, &scope))
        .collect::<Result<Vec<_>, _>>()?;

    for pair in planned.windows(2) {
        if pair[0].kind == pair[1].kind {
            return Err(ResolveError::config(
                &scope,
                format!(
                    "'{}' and '{}' are both {}s; connectors and cables must alternate",
                    pair[0].written,
                    pair[1].written,
                    pair[0].kind.noun()
                ),
            ));
        }
    }

    let mut width = None;
    for endpoint in planned.iter().filter(|e| e.constrains_width()) {
        match width {
            None => width = Some(endpoint.width()),
            Some(expected) if expected != endpoint.width() => {
                return Err(ResolveError::cardinality(
                    set,
                    &endpoint.written,
                    expected,
                    endpoint.width(),
                ))
            }
            Some(_) => {}
        }
    }
    let width = width.unwrap_or(1);
    check_instance_templates(&planned, &scope)?;

    let mut designators = Vec::with_capacity(planned.len());
    for endpoint in &planned {
        let allocated = (0..width)
            .map(|i| registry.allocate(PlannedEndpoint::pick(&endpoint.targets, i)))
            .collect::<Result<Vec<_>, _>>()?;
        designators.push(allocated);
    }

    Ok((0..width)
        .map(|i| Connection {
            set,
            index: i,
            endpoints: planned
                .iter()
                .zip(&designators)
                .map(|(endpoint, allocated)| Endpoint {
                    kind: endpoint.kind,
                    designator: allocated[i].clone(),
                    position: *PlannedEndpoint::pick(&endpoint.positions, i),
                    id: PlannedEndpoint::pick(&endpoint.ids, i).clone(),
                })
                .collect(),
        })
        .collect())
}

fn plan_endpoint(entry: &Value, registry: &Registry, scope: &str) -> Result<PlannedEndpoint, ResolveError> {
    match entry {
        Value::Mapping(mapping) if mapping.len() == 1 => {
            let Some((key, value)) = mapping.iter().next() else {
                return Err(ResolveError::config(scope, "empty entry"));
            };
            let written = designator_text(key, scope)?;
            let selector = Selector::from_value(value)
                .map_err(|e| ResolveError::config(format!("{scope}, '{written}'"), e))?;
            let target = registry.lookup(&written, scope)?;
            let (positions, ids) = resolve_target(registry, &target, selector.as_ref(), scope)?;
            if positions.is_empty() {
                return Err(ResolveError::config(
                    format!("{scope}, '{written}'"),
                    "empty list of pins or wires",
                ));
            }
            Ok(PlannedEndpoint {
                written,
                kind: target.kind(),
                fixed: selector.as_ref().is_some_and(Selector::is_list),
                targets: vec![target],
                positions,
                ids,
            })
        }
        Value::Mapping(mapping) => Err(ResolveError::config(
            scope,
            format!(
                "each entry names exactly one connector or cable, found {}",
                mapping.len()
            ),
        )),
        Value::Sequence(items) => {
            if items.is_empty() {
                return Err(ResolveError::config(scope, "empty list of designators"));
            }
            let mut targets: Vec<DesignatorRef> = Vec::with_capacity(items.len());
            let mut positions = Vec::with_capacity(items.len());
            let mut ids = Vec::with_capacity(items.len());
            let mut names = Vec::with_capacity(items.len());
            for item in items {
                let written = designator_text(item, scope)?;
                let target = registry.lookup(&written, scope)?;
                if let Some(first) = targets.first().map(DesignatorRef::kind) {
                    if first != target.kind() {
                        return Err(ResolveError::config(
                            scope,
                            format!("list of designators mixes connectors and cables at '{written}'"),
                        ));
                    }
                }
                let (position, id) = resolve_target(registry, &target, None, scope)?;
                positions.extend(position);
                ids.extend(id);
                names.push(written);
                targets.push(target);
            }
            Ok(PlannedEndpoint {
                written: format!("[{}]", names.join(", ")),
                kind: targets[0].kind(),
                targets,
                positions,
                ids,
                fixed: true,
            })
        }
        other => {
            let written = designator_text(other, scope)?;
            let target = registry.lookup(&written, scope)?;
            let (positions, ids) = resolve_target(registry, &target, None, scope)?;
            Ok(PlannedEndpoint {
                written,
                kind: target.kind(),
                targets: vec![target],
                positions,
                ids,
                fixed: false,
            })
        }
    }
}

/// A new instance named twice in one set must come from one template
fn check_instance_templates(planned: &[PlannedEndpoint], scope: &str) -> Result<(), ResolveError> {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for target in planned.iter().flat_map(|endpoint| &endpoint.targets) {
        if let DesignatorRef::Instance {
            designator,
            template,
            ..
        } = target
        {
            if let Some(previous) = seen.insert(designator, template) {
                if previous != template.as_str() {
                    return Err(ResolveError::config(
                        scope,
                        format!("'{designator}' is created from both '{previous}' and '{template}'"),
                    ));
                }
            }
        }
    }
    Ok(())
}

fn designator_text(value: &Value, scope: &str) -> Result<String, ResolveError> {
    match scalar_text(value) {
        Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        _ => Err(ResolveError::config(
            scope,
            format!("expected a designator, found {}", value_kind(value)),
        )),
    }
}

fn resolve_target(
    registry: &Registry,
    target: &DesignatorRef,
    selector: Option<&Selector>,
    scope: &str,
) -> Result<(Vec<usize>, Vec<String>), ResolveError> {
    let addressable = registry.addressable(target).ok_or_else(|| {
        ResolveError::config(scope, format!("unknown template '{}'", target.template()))
    })?;
    let positions = resolve_selector(addressable, selector)?;
    let all_ids = addressable.ids();
    let ids = positions
        .iter()
        .map(|&p| all_ids.get(p).map(|id| id.to_string()).unwrap_or_default())
        .collect();
    Ok((positions, ids))
}
