//! Pipeline model and validation
//!
//! [`Pipeline::build`] is the single entry point from a raw YAML tree to a
//! validated pipeline. Validation runs in stages and stops at the first
//! failure:
//!
//! 1. Type-checking pre-pass over the raw tree
//! 2. Version and feature flag resolution
//! 3. Per-action construction (command, outputs, extraction rules)
//! 4. Cross-action checks (unique commands, `needs` formatting and closure)
//! 5. Version-gated checks (expectations, unique outputs, legacy withdrawal)

use crate::action::{with_config, Action};
use crate::command::Command;
use crate::config::ValidatorConfig;
use crate::constants::{DEFAULT_POPULATION_SIZE, RUN_ALL_COMMAND};
use crate::error::{Result, Shape, ValidationError};
use crate::extractors::validate_extraction;
use crate::features::{feature_flags_for_version, FeatureFlags};
use crate::outputs::{Outputs, PrivacyLevel};
use crate::schema::{as_mapping, as_str, check_types, parse_version};
use crate::value::{field, key_text, present, untagged};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::collections::{BTreeSet, HashMap};

/// Dummy data expectations for local runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Expectations {
    pub population_size: i64,
}

impl Default for Expectations {
    fn default() -> Self {
        Self {
            population_size: DEFAULT_POPULATION_SIZE,
        }
    }
}

/// A fully validated pipeline
///
/// Only ever produced by [`Pipeline::build`] or [`Pipeline::build_with`], so
/// holding one means every rule for its version has passed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pipeline {
    version: f64,
    expectations: Expectations,
    actions: IndexMap<String, Action>,
    feature_flags: FeatureFlags,
}

type ActionCheck = fn(&IndexMap<String, Action>) -> Result<()>;

/// Checks over the complete action set, in the order they run
const ACTION_CHECKS: &[(&str, ActionCheck)] = &[
    ("unique commands", check_unique_commands),
    ("needs formatting", check_needs_comma_delimited),
    ("needs closure", check_needs_exist),
];

impl Pipeline {
    /// Validate a raw tree using the built-in extraction tables
    pub fn build(tree: &Value) -> Result<Self> {
        Self::build_with(tree, &ValidatorConfig::default())
    }

    /// Validate a raw tree against an explicit extraction table
    pub fn build_with(tree: &Value, config: &ValidatorConfig) -> Result<Self> {
        log::debug!("Type checking project document");
        check_types(tree)?;

        let project = as_mapping(tree)
            .ok_or_else(|| ValidationError::type_mismatch("Project file", Shape::Dictionary))?;

        let version = field(project, "version")
            .and_then(parse_version)
            .ok_or(ValidationError::InvalidVersion)?;
        let feature_flags = feature_flags_for_version(version)?;
        log::debug!("Project version {} resolved to {:?}", version, feature_flags);

        let actions = build_actions(project, config)?;

        for (name, check) in ACTION_CHECKS {
            log::trace!("Running {} check", name);
            check(&actions)?;
        }

        let expectations = resolve_expectations(project, &feature_flags)?;

        if feature_flags.unique_output_path {
            log::trace!("Running unique output paths check");
            check_unique_output_paths(&actions)?;
        }

        if feature_flags.remove_support_for_cohortextractor {
            log::trace!("Running legacy extraction withdrawal check");
            check_legacy_images(&actions, config)?;
        }

        log::debug!("Pipeline accepted with {} actions", actions.len());

        Ok(Self {
            version,
            expectations,
            actions,
            feature_flags,
        })
    }

    pub fn version(&self) -> f64 {
        self.version
    }

    pub fn expectations(&self) -> &Expectations {
        &self.expectations
    }

    pub fn feature_flags(&self) -> &FeatureFlags {
        &self.feature_flags
    }

    /// Every action, keyed by id, in declaration order
    pub fn actions(&self) -> &IndexMap<String, Action> {
        &self.actions
    }

    pub fn get_action(&self, action_id: &str) -> Option<&Action> {
        self.actions.get(action_id)
    }

    /// Action ids in declaration order, without the reserved `run_all` id
    pub fn all_actions(&self) -> Vec<&str> {
        self.actions
            .keys()
            .map(String::as_str)
            .filter(|id| *id != RUN_ALL_COMMAND)
            .collect()
    }

    /// Distinct `name:version` images used by the pipeline
    pub fn action_images(&self) -> BTreeSet<String> {
        self.actions.values().map(|action| action.run.image()).collect()
    }

    /// Every declared output pattern, in declaration order
    pub fn output_patterns(&self) -> IndexSet<&str> {
        self.actions
            .values()
            .flat_map(|action| action.outputs.files())
            .collect()
    }
}

fn build_actions(
    project: &Mapping,
    config: &ValidatorConfig,
) -> Result<IndexMap<String, Action>> {
    let section = field(project, "actions").and_then(as_mapping).ok_or_else(|| {
        ValidationError::type_mismatch("Project `actions` section", Shape::Dictionary)
    })?;

    let mut actions = IndexMap::with_capacity(section.len());
    for (key, value) in section {
        let action_id = key_text(key);
        if actions.contains_key(&action_id) {
            return Err(ValidationError::DuplicateAction { action: action_id });
        }
        let action = build_action(&action_id, value, config)?;
        actions.insert(action_id, action);
    }
    Ok(actions)
}

fn build_action(action_id: &str, value: &Value, config: &ValidatorConfig) -> Result<Action> {
    log::trace!("Building action {}", action_id);

    let mapping = as_mapping(value).ok_or_else(|| {
        ValidationError::type_mismatch(
            format!("Configuration for action {}", action_id),
            Shape::Dictionary,
        )
    })?;

    let run = field(mapping, "run")
        .and_then(as_str)
        .ok_or_else(|| ValidationError::MissingActionField {
            action: action_id.to_string(),
            field: "run".to_string(),
        })?;

    let action_config = present(mapping, "config").and_then(as_mapping).cloned();
    let raw = with_config(action_id, run, action_config.as_ref())?;
    let run = Command::parse(action_id, raw)?;

    let outputs = build_outputs(action_id, mapping)?;
    validate_extraction(action_id, &run, &outputs, config)?;

    let needs = match field(mapping, "needs").map(untagged) {
        Some(Value::Sequence(needs)) => needs
            .iter()
            .filter_map(as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };

    let dummy_data_file = present(mapping, "dummy_data_file")
        .and_then(as_str)
        .map(str::to_string);

    Ok(Action {
        id: action_id.to_string(),
        run,
        needs,
        outputs,
        config: action_config,
        dummy_data_file,
    })
}

fn build_outputs(action_id: &str, mapping: &Mapping) -> Result<Outputs> {
    let section = field(mapping, "outputs")
        .and_then(as_mapping)
        .ok_or_else(|| ValidationError::MissingActionField {
            action: action_id.to_string(),
            field: "outputs".to_string(),
        })?;

    let levels = PrivacyLevel::ALL.into_iter().filter_map(|level| {
        let files = present(section, level.as_str()).and_then(as_mapping)?;
        let files: IndexMap<String, String> = files
            .iter()
            .filter_map(|(id, filename)| Some((key_text(id), as_str(filename)?.to_string())))
            .collect();
        Some((level, files))
    });

    Outputs::build(action_id, levels)
}

fn check_unique_commands(actions: &IndexMap<String, Action>) -> Result<()> {
    let mut seen: HashMap<&Command, Vec<&str>> = HashMap::new();
    for (action_id, action) in actions {
        if let Some(others) = seen.get(&action.run) {
            return Err(ValidationError::DuplicateCommand {
                action: action_id.clone(),
                others: others.join(", "),
            });
        }
        seen.entry(&action.run).or_default().push(action_id);
    }
    Ok(())
}

fn check_needs_comma_delimited(actions: &IndexMap<String, Action>) -> Result<()> {
    for (action_id, action) in actions {
        if let Some(need) = action.needs.iter().find(|need| need.contains(' ')) {
            return Err(ValidationError::NeedsNotCommaDelimited {
                action: action_id.clone(),
                need: need.clone(),
            });
        }
    }
    Ok(())
}

fn check_needs_exist(actions: &IndexMap<String, Action>) -> Result<()> {
    for (action_id, action) in actions {
        let unknown: BTreeSet<&str> = action
            .needs
            .iter()
            .map(String::as_str)
            .filter(|need| !actions.contains_key(*need))
            .collect();

        if !unknown.is_empty() {
            return Err(ValidationError::UnknownNeeds {
                action: action_id.clone(),
                needs: unknown.into_iter().collect::<Vec<_>>().join(", "),
            });
        }
    }
    Ok(())
}

fn resolve_expectations(project: &Mapping, flags: &FeatureFlags) -> Result<Expectations> {
    if flags.remove_support_for_cohortextractor {
        return match field(project, "expectations") {
            Some(_) => Err(ValidationError::ExpectationsNotSupported),
            None => Ok(Expectations::default()),
        };
    }

    if !flags.expectations_population {
        return Ok(Expectations::default());
    }

    let section = present(project, "expectations")
        .and_then(as_mapping)
        .ok_or(ValidationError::MissingExpectations)?;
    let population_size = field(section, "population_size")
        .ok_or(ValidationError::MissingPopulationSize)?;

    Ok(Expectations {
        population_size: coerce_population_size(population_size)?,
    })
}

fn coerce_population_size(value: &Value) -> Result<i64> {
    let size = match untagged(value) {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    size.ok_or(ValidationError::InvalidPopulationSize)
}

fn check_unique_output_paths(actions: &IndexMap<String, Action>) -> Result<()> {
    let mut seen = IndexSet::new();
    for action in actions.values() {
        for path in action.outputs.files() {
            if !seen.insert(path) {
                return Err(ValidationError::DuplicateOutputPath {
                    path: path.to_string(),
                });
            }
        }
    }
    Ok(())
}

fn check_legacy_images(actions: &IndexMap<String, Action>, config: &ValidatorConfig) -> Result<()> {
    match actions
        .iter()
        .find(|(_, action)| config.is_legacy_image(action.run.name()))
    {
        Some((action_id, _)) => Err(ValidationError::LegacyExtractorUnsupported {
            action: action_id.clone(),
        }),
        None => Ok(()),
    }
}
