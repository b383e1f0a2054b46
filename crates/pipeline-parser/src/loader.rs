//! Pipeline loading entry points

use crate::error::{ParseError, Result};
use crate::yaml_parser::{parse_yaml, DEFAULT_FILENAME};
use pipeline_core::{Pipeline, ValidatorConfig};
use std::path::Path;

/// Parse and validate pipeline text with the built-in extraction tables
///
/// `filename` is only used to make syntax errors easier to locate.
pub fn load_pipeline(text: &str, filename: Option<&str>) -> Result<Pipeline> {
    load_pipeline_with(text, filename, &ValidatorConfig::default())
}

/// Parse and validate pipeline text against an explicit extraction table
pub fn load_pipeline_with(
    text: &str,
    filename: Option<&str>,
    config: &ValidatorConfig,
) -> Result<Pipeline> {
    let tree = parse_yaml(text, filename)?;

    Pipeline::build_with(&tree, config).map_err(|e| {
        log::debug!(
            "Rejected pipeline {}: {}",
            filename.unwrap_or(DEFAULT_FILENAME),
            e
        );
        ParseError::from(e)
    })
}

/// Read, parse and validate a pipeline file
pub fn load_pipeline_file(path: impl AsRef<Path>) -> Result<Pipeline> {
    let path = path.as_ref();
    log::debug!("Loading pipeline from {}", path.display());

    let text = std::fs::read_to_string(path)?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());

    load_pipeline(&text, filename.as_deref())
}
