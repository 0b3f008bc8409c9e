//! Structural merging of YAML trees: merge keys and multi-document input

use serde_yaml::{Mapping, Value};

use crate::resolve::ResolveError;

/// YAML merge key
pub const MERGE_KEY: &str = "<<";

/// Replace every `<<` merge key in the tree by deep-merging its base(s)
/// underneath the mapping's own keys.
///
/// A list of bases gives precedence to earlier entries. Nested mappings
/// merge recursively; lists and scalars of the referencing mapping replace
/// those of the base.
pub fn resolve_merge_keys(value: Value) -> Result<Value, ResolveError> {
    match value {
        Value::Mapping(mapping) => {
            let mut own = Mapping::new();
            let mut bases = None;
            for (key, value) in mapping {
                let value = resolve_merge_keys(value)?;
                if key.as_str() == Some(MERGE_KEY) {
                    bases = Some(value);
                } else {
                    own.insert(key, value);
                }
            }
            match bases {
                None => Ok(Value::Mapping(own)),
                Some(bases) => Ok(deep_merge(
                    Value::Mapping(merge_bases(bases)?),
                    Value::Mapping(own),
                )),
            }
        }
        Value::Sequence(items) => items
            .into_iter()
            .map(resolve_merge_keys)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Sequence),
        Value::Tagged(mut tagged) => {
            tagged.value = resolve_merge_keys(tagged.value)?;
            Ok(Value::Tagged(tagged))
        }
        scalar => Ok(scalar),
    }
}

fn merge_bases(bases: Value) -> Result<Mapping, ResolveError> {
    let invalid = || {
        ResolveError::config(
            format!("merge key '{MERGE_KEY}'"),
            "must reference a mapping or a list of mappings",
        )
    };
    match bases {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Sequence(list) => {
            let mut merged = Value::Mapping(Mapping::new());
            for base in list.into_iter().rev() {
                if !base.is_mapping() {
                    return Err(invalid());
                }
                merged = deep_merge(merged, base);
            }
            match merged {
                Value::Mapping(mapping) => Ok(mapping),
                _ => Err(invalid()),
            }
        }
        _ => Err(invalid()),
    }
}

/// Merge `overlay` onto `base`: mappings recursively, anything else replaced
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(mut base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => {
                        let existing = std::mem::replace(slot, Value::Null);
                        *slot = deep_merge(existing, value);
                    }
                    None => {
                        base.insert(key, value);
                    }
                }
            }
            Value::Mapping(base)
        }
        (_, overlay) => overlay,
    }
}

/// Merge whole documents given as separate inputs, later ones on top.
///
/// Mappings merge recursively, lists concatenate (so connection sets from
/// every document are kept) and `null` never overrides.
pub fn merge_documents(documents: impl IntoIterator<Item = Value>) -> Value {
    documents.into_iter().fold(Value::Null, merge_document_item)
}

fn merge_document_item(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (base, Value::Null) => base,
        (Value::Null, overlay) => overlay,
        (Value::Mapping(mut base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => {
                        let existing = std::mem::replace(slot, Value::Null);
                        *slot = merge_document_item(existing, value);
                    }
                    None => {
                        base.insert(key, value);
                    }
                }
            }
            Value::Mapping(base)
        }
        (Value::Sequence(mut base), Value::Sequence(overlay)) => {
            base.extend(overlay);
            Value::Sequence(base)
        }
        (_, overlay) => overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).expect("Should parse yaml")
    }

    #[test]
    fn test_merge_key_deep_merges() {
        let resolved = resolve_merge_keys(yaml(
            r#"
base: &base
  type: Molex
  pinlabels: [A, B]
  image: {src: a.png, caption: old}
X1:
  <<: *base
  pinlabels: [C]
  image: {caption: new}
"#,
        ))
        .expect("Should resolve");
        assert_eq!(
            resolved["X1"],
            yaml("type: Molex\npinlabels: [C]\nimage: {src: a.png, caption: new}")
        );
    }

    #[test]
    fn test_merge_key_list_prefers_earlier() {
        let resolved = resolve_merge_keys(yaml(
            r#"
a: &a {type: A, color: RD}
b: &b {type: B, subtype: x}
X1:
  <<: [*a, *b]
"#,
        ))
        .expect("Should resolve");
        assert_eq!(resolved["X1"], yaml("{type: A, subtype: x, color: RD}"));
    }

    #[test]
    fn test_merge_key_rejects_scalar() {
        let err = resolve_merge_keys(yaml("X1:\n  <<: 3\n")).unwrap_err();
        assert!(matches!(err, ResolveError::Config { .. }));
    }

    #[test]
    fn test_merge_does_not_alias_bases() {
        let resolved = resolve_merge_keys(yaml(
            "base: &base {pins: [1, 2]}\nX1: {<<: *base, type: A}\nX2: {<<: *base}\n",
        ))
        .expect("Should resolve");
        assert_eq!(resolved["X2"], yaml("{pins: [1, 2]}"));
        assert_eq!(resolved["base"], yaml("{pins: [1, 2]}"));
    }

    #[test]
    fn test_merge_documents() {
        let merged = merge_documents([
            yaml("connectors: {X1: {pincount: 2}}\nconnections: [[X1]]"),
            yaml("connectors: {X2: {pincount: 3}}\nconnections: [[X2]]\nmetadata: ~"),
        ]);
        assert_eq!(
            merged,
            yaml("connectors: {X1: {pincount: 2}, X2: {pincount: 3}}\nconnections: [[X1], [X2]]\nmetadata: ~")
        );
    }
}
