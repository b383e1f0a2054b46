//! Error types for pipeline validation

use crate::features::LATEST_VERSION;
use std::fmt;
use thiserror::Error;

/// Broad category of a validation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A field is missing, has the wrong shape, or is not expected at all
    Structure,
    /// A field has the right shape but an unacceptable value
    Value,
}

/// Expected shape of a node in the raw tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Dictionary,
    String,
    List,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Dictionary => write!(f, "a dictionary"),
            Shape::String => write!(f, "a string"),
            Shape::List => write!(f, "a list"),
        }
    }
}

/// Validation error raised while building a [`crate::Pipeline`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{subject} must be {expected}")]
    TypeMismatch { subject: String, expected: Shape },

    #[error("Unexpected parameters ({keys}) in {location}")]
    UnexpectedParameters { keys: String, location: String },

    #[error(
        "Project file must have a `version` attribute specifying which version of the \
         project configuration format it uses (current latest version is {})",
        LATEST_VERSION
    )]
    MissingVersion,

    #[error("`version` must be a number between 1 and {}", LATEST_VERSION)]
    InvalidVersion,

    #[error("`version` {version} is not supported (the latest version is {})", LATEST_VERSION)]
    UnsupportedVersion { version: f64 },

    #[error("Action {action} must contain a configuration for '{field}'")]
    MissingActionField { action: String, field: String },

    #[error("Action {action} is defined more than once")]
    DuplicateAction { action: String },

    #[error("run must have a value, {action} has an empty run key")]
    EmptyRun { action: String },

    #[error("run command for action {action} could not be parsed: {reason}")]
    UnparsableCommand { action: String, reason: String },

    #[error("{name} must have a version specified (e.g. {name}:v1)")]
    MissingImageVersion { name: String },

    #[error("`config` section for action {action} could not be serialised: {reason}")]
    InvalidConfig { action: String, reason: String },

    #[error("Action {action} must specify at least one output of: {levels}")]
    NoOutputs { action: String, levels: String },

    #[error("Output path {path} is invalid: {source}")]
    InvalidOutputPath {
        path: String,
        #[source]
        source: InvalidPatternError,
    },

    #[error("Output path {path} is not unique")]
    DuplicateOutputPath { path: String },

    #[error("Action {action} has the same 'run' command as other actions: {others}")]
    DuplicateCommand { action: String, others: String },

    #[error("`needs` actions should be separated with commas, but {action} needs `{need}`")]
    NeedsNotCommaDelimited { action: String, need: String },

    #[error("Action `{action}` references an unknown action in its `needs` list: {needs}")]
    UnknownNeeds { action: String, needs: String },

    #[error("Project must include `expectations` section")]
    MissingExpectations,

    #[error("Project `expectations` section must include `population_size` section")]
    MissingPopulationSize,

    #[error("Project expectations population size must be a number")]
    InvalidPopulationSize,

    #[error("Project includes `expectations` section, which is not supported in this version")]
    ExpectationsNotSupported,

    #[error("A `{command}` action must have exactly one output; {action} had {count}")]
    ExtractionOutputCount {
        command: String,
        action: String,
        count: usize,
    },

    #[error("generate_cohort command should produce output in only one directory, found {count}:\n{listing}")]
    MultipleOutputDirectories { count: usize, listing: String },

    #[error(
        "`{action}` action uses `generate-dataset` and so all outputs must be labelled \
         `highly_sensitive`"
    )]
    DatasetOutputNotHighlySensitive { action: String },

    #[error(
        "`{action}` action does not provide an `--output` argument specifying where the \
         results of `generate-dataset` should be stored"
    )]
    DatasetOutputMissing { action: String },

    #[error(
        "--output in run command and outputs must match (action `{action}` writes to \
         `{argument}` but declares `{declared}`)"
    )]
    DatasetOutputMismatch {
        action: String,
        argument: String,
        declared: String,
    },

    #[error("Action {action} uses cohortextractor actions, which are not supported in this version.")]
    LegacyExtractorUnsupported { action: String },

    #[error("Action '{action}' not found in project.yaml")]
    UnknownAction { action: String },

    #[error("--dummy-data-file is required for a local run")]
    DummyDataFileRequired { action: String },
}

impl ValidationError {
    /// Whether the document had the wrong structure or a bad value
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::TypeMismatch { .. }
            | ValidationError::UnexpectedParameters { .. }
            | ValidationError::MissingVersion
            | ValidationError::InvalidVersion
            | ValidationError::MissingActionField { .. }
            | ValidationError::DuplicateAction { .. }
            | ValidationError::MissingExpectations
            | ValidationError::MissingPopulationSize
            | ValidationError::NoOutputs { .. } => ErrorKind::Structure,
            _ => ErrorKind::Value,
        }
    }

    pub(crate) fn type_mismatch(subject: impl Into<String>, expected: Shape) -> Self {
        ValidationError::TypeMismatch {
            subject: subject.into(),
            expected,
        }
    }
}

/// Reason an output glob pattern was rejected
///
/// `Display` renders only the reason; the pattern is available via [`Self::pattern`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidPatternError {
    #[error("contains back slashes (use forward slashes only)")]
    BackSlash { pattern: String },

    #[error("contains '{expr}' (only the * wildcard character is supported)")]
    UnsupportedWildcard { pattern: String, expr: &'static str },

    #[error("looks like a directory (only files should be specified)")]
    Directory { pattern: String },

    #[error("is not in standard form (contains double slashes or '..' elements)")]
    NotNormalised { pattern: String },

    #[error("should not include the metadata directory")]
    MetadataDirectory { pattern: String },

    #[error("is an absolute path")]
    Absolute { pattern: String },

    #[error("output paths must have a file type extension at the end")]
    MissingExtension { pattern: String },

    #[error("{pattern} is not an allowed file type for {level} outputs")]
    DisallowedFileType { pattern: String, level: &'static str },
}

impl InvalidPatternError {
    /// The pattern that failed validation
    pub fn pattern(&self) -> &str {
        match self {
            InvalidPatternError::BackSlash { pattern }
            | InvalidPatternError::UnsupportedWildcard { pattern, .. }
            | InvalidPatternError::Directory { pattern }
            | InvalidPatternError::NotNormalised { pattern }
            | InvalidPatternError::MetadataDirectory { pattern }
            | InvalidPatternError::Absolute { pattern }
            | InvalidPatternError::MissingExtension { pattern }
            | InvalidPatternError::DisallowedFileType { pattern, .. } => pattern,
        }
    }
}

/// Result type for validation operations
pub type Result<T> = std::result::Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_mismatch_message() {
        let error = ValidationError::type_mismatch("`run` section for action a", Shape::String);
        assert_eq!(error.to_string(), "`run` section for action a must be a string");
        assert_eq!(error.kind(), ErrorKind::Structure);
    }

    #[test]
    fn test_missing_version_names_latest_version() {
        let message = ValidationError::MissingVersion.to_string();
        assert!(message.contains("Project file must have a `version` attribute"));
        assert!(message.contains(&format!("current latest version is {}", LATEST_VERSION)));
    }

    #[test]
    fn test_invalid_output_path_keeps_source() {
        use std::error::Error;

        let error = ValidationError::InvalidOutputPath {
            path: "a//b.csv".to_string(),
            source: InvalidPatternError::NotNormalised {
                pattern: "a//b.csv".to_string(),
            },
        };
        assert_eq!(error.kind(), ErrorKind::Value);
        assert!(error.to_string().starts_with("Output path a//b.csv is invalid: "));
        assert!(error.source().is_some());
    }

    #[test]
    fn test_pattern_accessor() {
        let error = InvalidPatternError::UnsupportedWildcard {
            pattern: "a/**/b.csv".to_string(),
            expr: "**",
        };
        assert_eq!(error.pattern(), "a/**/b.csv");
        assert_eq!(
            error.to_string(),
            "contains '**' (only the * wildcard character is supported)"
        );
    }
}
