//! Validator configuration
//!
//! The image names and subcommand spellings that mark an action as a data
//! extraction step have changed over time, so they live in a table that can
//! be replaced without touching the validation rules.
//!
//! # Examples
//!
//! ```rust
//! use pipeline_core::{CommandPattern, ValidatorConfig};
//!
//! let config = ValidatorConfig::default()
//!     .with_database_action(CommandPattern::new(r"^tpp-export:\S+").unwrap());
//! assert!(config.is_database_action("tpp-export:v2 run"));
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

const LEGACY_EXTRACTION: &str = r"^cohortextractor:\S+\s+generate_cohort(\s|$)";
const DATASET_EXTRACTION: &str = r"^(databuilder|ehrql):\S+\s+generate[-_]dataset(\s|$)";
const MEASURES_EXTRACTION: &str = r"^ehrql:\S+\s+generate[-_]measures(\s|$)";
const SQL_RUNNER: &str = r"^sqlrunner:\S+(\s|$)";

/// A compiled regular expression matched against a raw run command
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommandPattern(Regex);

impl CommandPattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_match(&self, run: &str) -> bool {
        self.0.is_match(run)
    }

    /// Built-in patterns are constants, so compiling them cannot fail
    fn builtin(pattern: &'static str) -> Self {
        Self(Regex::new(pattern).expect("built-in command pattern is valid"))
    }
}

impl TryFrom<String> for CommandPattern {
    type Error = regex::Error;

    fn try_from(pattern: String) -> Result<Self, Self::Error> {
        Self::new(&pattern)
    }
}

impl From<CommandPattern> for String {
    fn from(pattern: CommandPattern) -> Self {
        pattern.0.as_str().to_string()
    }
}

impl fmt::Debug for CommandPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CommandPattern").field(&self.as_str()).finish()
    }
}

/// Tables of command patterns consulted while validating actions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Legacy extraction commands that must declare a single output
    pub legacy_extraction: Vec<CommandPattern>,

    /// Dataset generation commands whose `--output` must match the outputs
    pub dataset_extraction: Vec<CommandPattern>,

    /// Every command that needs access to the database
    pub database_actions: Vec<CommandPattern>,

    /// Image names rejected once legacy extraction support is removed
    pub legacy_images: Vec<String>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            legacy_extraction: vec![CommandPattern::builtin(LEGACY_EXTRACTION)],
            dataset_extraction: vec![CommandPattern::builtin(DATASET_EXTRACTION)],
            database_actions: vec![
                CommandPattern::builtin(LEGACY_EXTRACTION),
                CommandPattern::builtin(DATASET_EXTRACTION),
                CommandPattern::builtin(MEASURES_EXTRACTION),
                CommandPattern::builtin(SQL_RUNNER),
            ],
            legacy_images: vec!["cohortextractor".to_string()],
        }
    }
}

impl ValidatorConfig {
    /// Create a configuration with the built-in tables
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a legacy extraction pattern
    pub fn with_legacy_extraction(mut self, pattern: CommandPattern) -> Self {
        self.legacy_extraction.push(pattern);
        self
    }

    /// Add a dataset extraction pattern
    pub fn with_dataset_extraction(mut self, pattern: CommandPattern) -> Self {
        self.dataset_extraction.push(pattern);
        self
    }

    /// Add a database action pattern
    pub fn with_database_action(mut self, pattern: CommandPattern) -> Self {
        self.database_actions.push(pattern);
        self
    }

    /// Add a withdrawn legacy image name
    pub fn with_legacy_image(mut self, image: impl Into<String>) -> Self {
        self.legacy_images.push(image.into());
        self
    }

    pub fn is_legacy_extraction(&self, run: &str) -> bool {
        self.legacy_extraction.iter().any(|p| p.is_match(run))
    }

    pub fn is_dataset_extraction(&self, run: &str) -> bool {
        self.dataset_extraction.iter().any(|p| p.is_match(run))
    }

    pub fn is_database_action(&self, run: &str) -> bool {
        self.database_actions.iter().any(|p| p.is_match(run))
    }

    pub fn is_legacy_image(&self, name: &str) -> bool {
        self.legacy_images.iter().any(|image| image == name)
    }
}
