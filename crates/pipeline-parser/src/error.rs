//! Parser error types

use pipeline_core::ValidationError;
use std::fmt;
use thiserror::Error;

/// Position of a syntax error in the source text, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Parser error
#[derive(Error, Debug)]
pub enum ParseError {
    /// Malformed YAML, including duplicate mapping keys
    #[error("{filename}: {message}")]
    Yaml {
        message: String,
        filename: String,
        location: Option<Location>,
        #[source]
        source: serde_yaml::Error,
    },

    /// The document has no content
    #[error("{filename}: document is empty")]
    EmptyDocument { filename: String },

    /// The top level of the document is not a mapping
    #[error("{filename}: top level of the document must be a mapping")]
    NotAMapping { filename: String },

    /// Reading the file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document parsed but did not validate
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ParseError {
    /// Whether this is a syntax-level error rather than a validation failure
    pub fn is_syntax_error(&self) -> bool {
        matches!(
            self,
            ParseError::Yaml { .. }
                | ParseError::EmptyDocument { .. }
                | ParseError::NotAMapping { .. }
        )
    }
}

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, ParseError>;
