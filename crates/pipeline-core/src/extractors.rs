//! Rules for data extraction actions
//!
//! Extraction steps write the files that every later action reads, so their
//! declared outputs are held to stricter rules than ordinary actions.

use crate::command::Command;
use crate::config::ValidatorConfig;
use crate::error::{Result, ValidationError};
use crate::outputs::{Outputs, PrivacyLevel};
use serde::Serialize;

/// Kind of extraction performed by a run command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Extraction {
    /// `cohortextractor generate_cohort`
    Legacy,
    /// `ehrql generate-dataset` and friends
    Dataset,
}

impl Extraction {
    /// Classify a run command against the configured pattern tables
    pub fn classify(run: &Command, config: &ValidatorConfig) -> Option<Self> {
        if config.is_legacy_extraction(run.raw()) {
            Some(Extraction::Legacy)
        } else if config.is_dataset_extraction(run.raw()) {
            Some(Extraction::Dataset)
        } else {
            None
        }
    }
}

/// Validate an action's outputs against the rules for its extraction kind
pub fn validate_extraction(
    action_id: &str,
    run: &Command,
    outputs: &Outputs,
    config: &ValidatorConfig,
) -> Result<()> {
    match Extraction::classify(run, config) {
        Some(Extraction::Legacy) => validate_legacy_extraction(action_id, run, outputs),
        Some(Extraction::Dataset) => validate_dataset_extraction(action_id, run, outputs),
        None => Ok(()),
    }
}

/// `generate_cohort` must declare one output tier and, unless told where to
/// write with `--output-dir`, keep every file in one directory.
pub fn validate_legacy_extraction(action_id: &str, run: &Command, outputs: &Outputs) -> Result<()> {
    if outputs.len() != 1 {
        return Err(ValidationError::ExtractionOutputCount {
            command: "generate_cohort".to_string(),
            action: action_id.to_string(),
            count: outputs.len(),
        });
    }

    if run.has_flag("--output-dir") {
        return Ok(());
    }

    let dirs = outputs.output_dirs();
    if dirs.len() > 1 {
        let listing = dirs
            .iter()
            .map(|dir| format!(" - {}/", dir))
            .collect::<Vec<_>>()
            .join("\n");
        return Err(ValidationError::MultipleOutputDirectories {
            count: dirs.len(),
            listing,
        });
    }

    Ok(())
}

/// `generate-dataset` output is always highly sensitive, and the `--output`
/// argument must agree with what the action declares.
pub fn validate_dataset_extraction(
    action_id: &str,
    run: &Command,
    outputs: &Outputs,
) -> Result<()> {
    if run.parts().iter().any(|part| part == "generate_dataset") {
        log::warn!(
            "Action {} uses the deprecated `generate_dataset` spelling, use `generate-dataset`",
            action_id
        );
    }

    let exposed = outputs
        .iter()
        .any(|(level, _)| level != PrivacyLevel::HighlySensitive);
    if exposed {
        return Err(ValidationError::DatasetOutputNotHighlySensitive {
            action: action_id.to_string(),
        });
    }

    let argument = run
        .flag_value("--output")
        .ok_or_else(|| ValidationError::DatasetOutputMissing {
            action: action_id.to_string(),
        })?;

    let declared: Vec<&str> = outputs.files().collect();

    if let Some((dir, _format)) = argument.split_once(':') {
        let prefix = format!("{}/", dir.trim_end_matches('/'));
        return match declared.iter().find(|file| !file.starts_with(&prefix)) {
            Some(file) => Err(ValidationError::DatasetOutputMismatch {
                action: action_id.to_string(),
                argument: argument.to_string(),
                declared: file.to_string(),
            }),
            None => Ok(()),
        };
    }

    match declared.as_slice() {
        [file] if *file == argument => Ok(()),
        _ => Err(ValidationError::DatasetOutputMismatch {
            action: action_id.to_string(),
            argument: argument.to_string(),
            declared: declared.join(", "),
        }),
    }
}
