//! Error types for loading harness descriptions

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Number of characters that start before `byte`
fn char_offset(source: &str, byte: usize) -> usize {
    source.char_indices().take_while(|(i, _)| *i < byte).count()
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("YAML syntax error at {span:?}: {message}")]
    Syntax { span: Span, message: String },
}

impl ParseError {
    /// Convert a serde_yaml error, locating it in `source` when possible
    pub fn from_yaml(err: &serde_yaml::Error, source: &str) -> Self {
        let span = match err.location() {
            Some(location) => {
                let start = location.index().min(source.len());
                start..(start + 1).min(source.len())
            }
            None => 0..0,
        };
        ParseError::Syntax {
            span,
            message: err.to_string(),
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            ParseError::Syntax { span, .. } => span,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let mut buf = Vec::new();
        match self {
            ParseError::Syntax { span, message } => {
                // ariadne counts characters, not bytes
                let span = char_offset(source, span.start)..char_offset(source, span.end);
                let written = Report::build(ReportKind::Error, filename, span.start)
                    .with_message("invalid harness description")
                    .with_label(
                        Label::new((filename, span))
                            .with_message(message)
                            .with_color(Color::Red),
                    )
                    .finish()
                    .write((filename, Source::from(source)), &mut buf);
                if written.is_err() {
                    return self.to_string();
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}
