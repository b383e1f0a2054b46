//! Preparing a validated action for the executor
//!
//! Extraction commands take a few arguments that depend on where they run:
//! against the real database, or against generated dummy data on a local
//! machine. [`resolve_action`] fills those in.

use crate::config::ValidatorConfig;
use crate::error::{Result, ValidationError};
use crate::extractors::Extraction;
use crate::outputs::Outputs;
use crate::pipeline::Pipeline;
use serde::Serialize;

/// Where an action is going to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    Database,
    DummyData,
}

/// An action ready to hand to the executor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedAction {
    pub run: String,
    pub needs: Vec<String>,
    pub outputs: Outputs,
}

/// Resolve the final run command for `action_id` using the built-in tables
pub fn resolve_action(
    pipeline: &Pipeline,
    action_id: &str,
    backend: Backend,
) -> Result<ResolvedAction> {
    resolve_action_with(pipeline, action_id, backend, &ValidatorConfig::default())
}

/// Resolve the final run command for `action_id`
pub fn resolve_action_with(
    pipeline: &Pipeline,
    action_id: &str,
    backend: Backend,
    config: &ValidatorConfig,
) -> Result<ResolvedAction> {
    let action = pipeline
        .get_action(action_id)
        .ok_or_else(|| ValidationError::UnknownAction {
            action: action_id.to_string(),
        })?;

    let mut run = action.run.raw().to_string();

    match Extraction::classify(&action.run, config) {
        Some(Extraction::Legacy) => {
            if backend == Backend::DummyData {
                match &action.dummy_data_file {
                    Some(file) => run.push_str(&format!(" --dummy-data-file={}", file)),
                    None => run.push_str(&format!(
                        " --expectations-population={}",
                        pipeline.expectations().population_size
                    )),
                }
            }

            let dirs = action.outputs.output_dirs();
            if let [dir] = dirs.as_slice() {
                if !action.run.has_flag("--output-dir") {
                    run.push_str(&format!(" --output-dir={}", dir));
                }
            }
        }
        Some(Extraction::Dataset) => {
            if backend == Backend::DummyData && !action.run.has_flag("--dummy-data-file") {
                let file = action
                    .dummy_data_file
                    .as_deref()
                    .ok_or_else(|| ValidationError::DummyDataFileRequired {
                        action: action_id.to_string(),
                    })?;
                run.push_str(&format!(" --dummy-data-file={}", file));
            }
        }
        None => {}
    }

    log::debug!("Resolved action {} to `{}`", action_id, run);

    Ok(ResolvedAction {
        run,
        needs: action.needs.clone(),
        outputs: action.outputs.clone(),
    })
}
