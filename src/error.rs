//! Error types for document parsing

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::style::StylesheetError;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Failure while decoding a single path's `d` attribute
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathError {
    #[error("expecting SVG path command at first position, got '{found}'")]
    MissingCommand { found: String, span: Span },

    #[error("unsupported path command '{found}'")]
    UnsupportedCommand { found: String, span: Span },

    #[error("invalid numeric argument '{found}'")]
    InvalidNumber { found: String, span: Span },

    #[error("expecting additional ({missing}) numeric arguments")]
    MissingArguments { missing: usize, span: Span },
}

impl PathError {
    pub fn span(&self) -> Span {
        match self {
            PathError::MissingCommand { span, .. }
            | PathError::UnsupportedCommand { span, .. }
            | PathError::InvalidNumber { span, .. }
            | PathError::MissingArguments { span, .. } => span.clone(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("SVG document is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("malformed SVG document: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("unacceptable values for basic SVG extent: {width:.2} x {height:.2}")]
    Extent { width: f64, height: f64 },

    #[error("path {index} (class '{class}'): {source}")]
    Path {
        index: usize,
        class: String,
        data: String,
        source: PathError,
    },

    #[error("style block {index}: {source}")]
    Stylesheet {
        index: usize,
        css: String,
        source: StylesheetError,
    },
}

impl ParseError {
    /// Format the error with source context using ariadne.
    ///
    /// Path and stylesheet errors are shown against the offending attribute
    /// or style text; other errors fall back to their display form.
    pub fn format(&self, filename: &str) -> String {
        let (text, span, message, expected) = match self {
            ParseError::Path { data, source, .. } => {
                (data.as_str(), source.span(), source.to_string(), Vec::new())
            }
            ParseError::Stylesheet { css, source, .. } => {
                let StylesheetError::Syntax {
                    span,
                    message,
                    expected,
                } = source;
                (css.as_str(), span.clone(), message.clone(), expected.clone())
            }
            other => return other.to_string(),
        };

        let expected_str = if expected.is_empty() {
            String::new()
        } else {
            format!("\nExpected: {}", expected.join(", "))
        };

        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message(self.to_string())
            .with_label(
                Label::new((filename, span))
                    .with_message(format!("{}{}", message, expected_str))
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(text)), &mut buf);

        match (written, String::from_utf8(buf)) {
            (Ok(()), Ok(report)) => report,
            _ => self.to_string(),
        }
    }
}
