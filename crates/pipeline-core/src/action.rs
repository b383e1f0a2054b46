//! Action model
//!
//! An [`Action`] is one step of a pipeline: the command to run, the actions
//! it depends on and the files it promises to produce.

use crate::command::Command;
use crate::config::ValidatorConfig;
use crate::error::{Result, ValidationError};
use crate::json::to_spaced_json;
use crate::outputs::Outputs;
use serde::Serialize;
use serde_yaml::Mapping;

/// A validated pipeline action
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Action {
    /// Key of the action in the project's `actions` section
    #[serde(skip)]
    pub id: String,

    pub run: Command,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub needs: Vec<String>,

    pub outputs: Outputs,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Mapping>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dummy_data_file: Option<String>,
}

impl Action {
    /// Whether the action needs database access when it runs
    pub fn is_database_action(&self, config: &ValidatorConfig) -> bool {
        config.is_database_action(self.run.raw())
    }
}

/// Append an action's `config` section to its run string
///
/// The section is rendered as compact JSON and passed as a single-quoted
/// `--config` argument. Single quotes inside the JSON are written as
/// `\u0027` so the shell quoting stays balanced.
pub(crate) fn with_config(action_id: &str, run: &str, config: Option<&Mapping>) -> Result<String> {
    let Some(config) = config else {
        return Ok(run.to_string());
    };

    let json = to_spaced_json(config).map_err(|e| ValidationError::InvalidConfig {
        action: action_id.to_string(),
        reason: e.to_string(),
    })?;

    Ok(format!("{} --config '{}'", run, json.replace('\'', "\\u0027")))
}
