//! Loading of YAML harness descriptions

mod definitions;
mod document;

pub use definitions::*;
pub use document::Document;

use serde_yaml::Value;

use crate::error::ParseError;
use crate::template::merge_documents;
use crate::CompileError;

/// Parse YAML text into a tree, reporting syntax errors with their location
pub fn parse_value(source: &str) -> Result<Value, ParseError> {
    serde_yaml::from_str(source).map_err(|e| ParseError::from_yaml(&e, source))
}

/// Parse a single harness description
pub fn parse(source: &str) -> Result<Document, CompileError> {
    Ok(Document::from_value(parse_value(source)?)?)
}

/// Parse several descriptions and merge them into one, later ones on top
pub fn parse_many(sources: &[&str]) -> Result<Document, CompileError> {
    let values = sources
        .iter()
        .map(|source| parse_value(source))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Document::from_value(merge_documents(values))?)
}

/// Join shared snippets and a main description as text, so that anchors
/// defined in the snippets can be used in the main description
pub fn concat_sources<S: AsRef<str>>(prepend: &[S], main: &str) -> String {
    let mut text = String::new();
    for snippet in prepend {
        text.push_str(snippet.as_ref());
        if !text.ends_with('\n') {
            text.push('\n');
        }
    }
    text.push_str(main);
    text
}
