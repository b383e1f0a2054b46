//! YAML Parser
//!
//! Parses YAML text into a `serde_yaml::Value` tree. Mapping keys keep their
//! document order, and a key repeated within one mapping is a syntax error.
//! `<<` merge keys are resolved, with explicit keys taking precedence.

use crate::error::{Location, ParseError, Result};
use serde_yaml::Value;

/// Name used in error messages when no filename is supplied
pub const DEFAULT_FILENAME: &str = "<unicode string>";

/// Parse YAML text into a raw tree
///
/// The top level must be a non-empty mapping. `filename` only affects error
/// messages.
pub fn parse_yaml(text: &str, filename: Option<&str>) -> Result<Value> {
    let filename = filename.unwrap_or(DEFAULT_FILENAME);

    if !has_content(text) {
        return Err(ParseError::EmptyDocument {
            filename: filename.to_string(),
        });
    }

    let mut value: Value =
        serde_yaml::from_str(text).map_err(|source| yaml_error(filename, source))?;
    value
        .apply_merge()
        .map_err(|source| yaml_error(filename, source))?;

    match value {
        Value::Null => Err(ParseError::EmptyDocument {
            filename: filename.to_string(),
        }),
        Value::Mapping(_) => Ok(value),
        _ => Err(ParseError::NotAMapping {
            filename: filename.to_string(),
        }),
    }
}

fn yaml_error(filename: &str, source: serde_yaml::Error) -> ParseError {
    let location = source.location().map(|loc| Location {
        line: loc.line(),
        column: loc.column(),
    });
    ParseError::Yaml {
        message: source.to_string(),
        filename: filename.to_string(),
        location,
        source,
    }
}

/// Whether the text holds anything besides blank lines, comments and document markers
fn has_content(text: &str) -> bool {
    text.lines().any(|line| {
        let line = line.trim();
        !(line.is_empty() || line.starts_with('#') || line == "---" || line == "...")
    })
}
