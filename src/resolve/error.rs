//! Error types for harness resolution

use thiserror::Error;

/// Errors that abort resolution of a harness description
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResolveError {
    /// Structurally invalid or incomplete definition
    #[error("invalid {scope}: {reason}")]
    Config { scope: String, reason: String },

    /// A selector or designator that names nothing
    #[error("cannot resolve '{selector}' in {scope}: {reason}")]
    Reference {
        scope: String,
        selector: String,
        reason: String,
    },

    /// A label selector that matches more than one pin or wire
    #[error(
        "ambiguous reference '{selector}' in {scope}: matches {}; use <label>__<n> to pick one",
        .candidates.join(", ")
    )]
    AmbiguousReference {
        scope: String,
        selector: String,
        candidates: Vec<String>,
    },

    /// Endpoints of a connection set resolving to different widths
    #[error(
        "connection set {set}: '{designator}' resolves to {found} connection(s), expected {expected}"
    )]
    CardinalityMismatch {
        set: usize,
        designator: String,
        expected: usize,
        found: usize,
    },

    /// Inconsistent data reaching the BOM aggregator
    #[error("cannot aggregate BOM entry for '{designator}': {reason}")]
    Aggregation { designator: String, reason: String },
}

impl ResolveError {
    pub fn config(scope: impl Into<String>, reason: impl Into<String>) -> Self {
        ResolveError::Config {
            scope: scope.into(),
            reason: reason.into(),
        }
    }

    pub fn reference(
        scope: impl Into<String>,
        selector: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ResolveError::Reference {
            scope: scope.into(),
            selector: selector.into(),
            reason: reason.into(),
        }
    }

    pub fn ambiguous(
        scope: impl Into<String>,
        selector: impl Into<String>,
        candidates: Vec<String>,
    ) -> Self {
        ResolveError::AmbiguousReference {
            scope: scope.into(),
            selector: selector.into(),
            candidates,
        }
    }

    pub fn cardinality(
        set: usize,
        designator: impl Into<String>,
        expected: usize,
        found: usize,
    ) -> Self {
        ResolveError::CardinalityMismatch {
            set,
            designator: designator.into(),
            expected,
            found,
        }
    }

    pub fn aggregation(designator: impl Into<String>, reason: impl Into<String>) -> Self {
        ResolveError::Aggregation {
            designator: designator.into(),
            reason: reason.into(),
        }
    }

    /// Short name of the error category
    pub fn kind(&self) -> &'static str {
        match self {
            ResolveError::Config { .. } => "configuration error",
            ResolveError::Reference { .. } => "reference error",
            ResolveError::AmbiguousReference { .. } => "ambiguous reference",
            ResolveError::CardinalityMismatch { .. } => "cardinality mismatch",
            ResolveError::Aggregation { .. } => "internal BOM error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguous_message_lists_candidates() {
        let err = ResolveError::ambiguous(
            "connector 'X1'",
            "GND",
            vec!["GND__1 (pin 1)".into(), "GND__2 (pin 3)".into()],
        );
        let message = err.to_string();
        assert!(message.contains("GND__1 (pin 1), GND__2 (pin 3)"));
        assert!(message.contains("connector 'X1'"));
    }

    #[test]
    fn test_cardinality_message() {
        let err = ResolveError::cardinality(1, "X2", 2, 3);
        assert_eq!(
            err.to_string(),
            "connection set 1: 'X2' resolves to 3 connection(s), expected 2"
        );
        assert_eq!(err.kind(), "cardinality mismatch");
    }
}
