//! Type-checking pre-pass over the raw project tree
//!
//! Runs before any model is built so that shape problems are reported with
//! the offending action and field rather than surfacing deep inside model
//! construction. Within each level, existence is checked before shape, and
//! shape before content.

use crate::error::{Result, Shape, ValidationError};
use crate::outputs::PrivacyLevel;
use crate::value::{field, key_text, present, unexpected_keys, untagged};
use serde_yaml::{Mapping, Value};

pub const PROJECT_FIELDS: &[&str] = &["version", "expectations", "actions"];
pub const EXPECTATIONS_FIELDS: &[&str] = &["population_size"];
pub const ACTION_FIELDS: &[&str] = &["run", "needs", "outputs", "config", "dummy_data_file"];
pub const OUTPUT_FIELDS: &[&str] = &[
    "highly_sensitive",
    "moderately_sensitive",
    "minimally_sensitive",
];

/// Check the shape of every field in a raw project tree
pub fn check_types(tree: &Value) -> Result<()> {
    let project = as_mapping(tree)
        .ok_or_else(|| ValidationError::type_mismatch("Project file", Shape::Dictionary))?;

    if let Some(keys) = unexpected_keys(project, PROJECT_FIELDS) {
        return Err(ValidationError::UnexpectedParameters {
            keys,
            location: "project".to_string(),
        });
    }

    let version = present(project, "version").ok_or(ValidationError::MissingVersion)?;
    parse_version(version).ok_or(ValidationError::InvalidVersion)?;

    let actions = field(project, "actions").and_then(as_mapping).ok_or_else(|| {
        ValidationError::type_mismatch("Project `actions` section", Shape::Dictionary)
    })?;

    if let Some(expectations) = present(project, "expectations") {
        check_expectations(expectations)?;
    }

    for (key, action) in actions {
        check_action(&key_text(key), action)?;
    }

    Ok(())
}

/// Read a `version` value as a number; numeric strings such as `"4"` are accepted
pub(crate) fn parse_version(value: &Value) -> Option<f64> {
    let version = match untagged(value) {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    version.is_finite().then_some(version)
}

fn check_expectations(expectations: &Value) -> Result<()> {
    let mapping = as_mapping(expectations).ok_or_else(|| {
        ValidationError::type_mismatch("Project `expectations` section", Shape::Dictionary)
    })?;

    if let Some(keys) = unexpected_keys(mapping, EXPECTATIONS_FIELDS) {
        return Err(ValidationError::UnexpectedParameters {
            keys,
            location: "project `expectations` section".to_string(),
        });
    }

    Ok(())
}

fn check_action(action_id: &str, action: &Value) -> Result<()> {
    let mapping = as_mapping(action).ok_or_else(|| {
        ValidationError::type_mismatch(
            format!("Configuration for action {}", action_id),
            Shape::Dictionary,
        )
    })?;

    if let Some(keys) = unexpected_keys(mapping, ACTION_FIELDS) {
        return Err(ValidationError::UnexpectedParameters {
            keys,
            location: format!("action {}", action_id),
        });
    }

    let missing = |name: &str| ValidationError::MissingActionField {
        action: action_id.to_string(),
        field: name.to_string(),
    };
    let section = |name: &str| format!("`{}` section for action {}", name, action_id);

    let run = field(mapping, "run").ok_or_else(|| missing("run"))?;
    let run = as_str(run)
        .ok_or_else(|| ValidationError::type_mismatch(section("run"), Shape::String))?;
    if run.trim().is_empty() {
        return Err(ValidationError::EmptyRun {
            action: action_id.to_string(),
        });
    }

    let outputs = field(mapping, "outputs").ok_or_else(|| missing("outputs"))?;
    let outputs = as_mapping(outputs)
        .ok_or_else(|| ValidationError::type_mismatch(section("outputs"), Shape::Dictionary))?;

    if let Some(needs) = field(mapping, "needs") {
        let needs = match untagged(needs) {
            Value::Sequence(needs) => needs,
            _ => return Err(ValidationError::type_mismatch(section("needs"), Shape::List)),
        };
        if needs.iter().any(|need| as_str(need).is_none()) {
            return Err(ValidationError::type_mismatch(
                format!("Each `needs` entry for action {}", action_id),
                Shape::String,
            ));
        }
    }

    if let Some(config) = field(mapping, "config") {
        as_mapping(config)
            .ok_or_else(|| ValidationError::type_mismatch(section("config"), Shape::Dictionary))?;
    }

    if let Some(dummy_data_file) = field(mapping, "dummy_data_file") {
        as_str(dummy_data_file).ok_or_else(|| {
            ValidationError::type_mismatch(section("dummy_data_file"), Shape::String)
        })?;
    }

    check_outputs(action_id, outputs)
}

fn check_outputs(action_id: &str, outputs: &Mapping) -> Result<()> {
    let mut populated = 0;
    for level in PrivacyLevel::ALL {
        let Some(files) = present(outputs, level.as_str()) else {
            continue;
        };
        let files = as_mapping(files).ok_or_else(|| {
            ValidationError::type_mismatch(
                format!("`{}` section for action {}", level, action_id),
                Shape::Dictionary,
            )
        })?;
        if !files.is_empty() {
            populated += 1;
        }
    }

    if populated == 0 {
        return Err(ValidationError::NoOutputs {
            action: action_id.to_string(),
            levels: PrivacyLevel::names(),
        });
    }

    if let Some(keys) = unexpected_keys(outputs, OUTPUT_FIELDS) {
        return Err(ValidationError::UnexpectedParameters {
            keys,
            location: format!("`outputs` section for action {}", action_id),
        });
    }

    for level in PrivacyLevel::ALL {
        let Some(files) = present(outputs, level.as_str()).and_then(as_mapping) else {
            continue;
        };
        for (output_id, filename) in files {
            if as_str(filename).is_none() {
                return Err(ValidationError::type_mismatch(
                    format!("`{}` output for action {}", key_text(output_id), action_id),
                    Shape::String,
                ));
            }
        }
    }

    Ok(())
}

pub(crate) fn as_mapping(value: &Value) -> Option<&Mapping> {
    untagged(value).as_mapping()
}

pub(crate) fn as_str(value: &Value) -> Option<&str> {
    untagged(value).as_str()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(yaml: &str) -> Result<()> {
        check_types(&serde_yaml::from_str(yaml).unwrap())
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version(&Value::from(3)), Some(3.0));
        assert_eq!(parse_version(&Value::from("4")), Some(4.0));
        assert_eq!(parse_version(&Value::from(" 2.5 ")), Some(2.5));
        assert_eq!(parse_version(&Value::from("test")), None);
        assert_eq!(parse_version(&Value::from(true)), None);
        assert_eq!(parse_version(&Value::from("nan")), None);
    }

    #[test]
    fn test_root_must_be_mapping() {
        let err = check("- a\n- b").unwrap_err();
        assert_eq!(err.to_string(), "Project file must be a dictionary");
    }

    #[test]
    fn test_extra_keys_reported_before_missing_version() {
        let err = check("extra: 123").unwrap_err();
        assert_eq!(err.to_string(), "Unexpected parameters (extra) in project");
    }

    #[test]
    fn test_needs_entries_must_be_strings() {
        let err = check(
            r#"
version: 1
actions:
  a:
    run: test:v1
    needs: [[b]]
    outputs: {highly_sensitive: {x: x.csv}}
"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Each `needs` entry for action a must be a string");
    }

    #[test]
    fn test_null_tier_is_unset() {
        let result = check(
            r#"
version: 1
actions:
  a:
    run: test:v1
    outputs:
      highly_sensitive:
      moderately_sensitive: {x: x.csv}
"#,
        );
        assert!(result.is_ok());
    }
}
