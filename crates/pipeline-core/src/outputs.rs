//! Declared action outputs, grouped by sensitivity tier

use crate::error::{Result, ValidationError};
use crate::glob::validate_output_pattern;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sensitivity tier of an output file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivacyLevel {
    HighlySensitive,
    ModeratelySensitive,
    MinimallySensitive,
}

impl PrivacyLevel {
    pub const ALL: [PrivacyLevel; 3] = [
        PrivacyLevel::HighlySensitive,
        PrivacyLevel::ModeratelySensitive,
        PrivacyLevel::MinimallySensitive,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PrivacyLevel::HighlySensitive => "highly_sensitive",
            PrivacyLevel::ModeratelySensitive => "moderately_sensitive",
            PrivacyLevel::MinimallySensitive => "minimally_sensitive",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.as_str() == name)
    }

    /// Comma separated list of every tier name, for messages
    pub(crate) fn names() -> String {
        Self::ALL.map(PrivacyLevel::as_str).join(", ")
    }
}

impl fmt::Display for PrivacyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output files of one action: output id -> filename pattern, per tier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Outputs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highly_sensitive: Option<IndexMap<String, String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderately_sensitive: Option<IndexMap<String, String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimally_sensitive: Option<IndexMap<String, String>>,
}

impl Outputs {
    /// Build and validate the outputs of `action_id`
    ///
    /// At least one tier must be non-empty and every filename must be a valid
    /// pattern for its tier.
    pub fn build(
        action_id: &str,
        levels: impl IntoIterator<Item = (PrivacyLevel, IndexMap<String, String>)>,
    ) -> Result<Self> {
        let mut outputs = Outputs::default();
        for (level, files) in levels {
            *outputs.slot_mut(level) = Some(files);
        }

        if outputs.is_empty() {
            return Err(ValidationError::NoOutputs {
                action: action_id.to_string(),
                levels: PrivacyLevel::names(),
            });
        }

        for (level, files) in outputs.iter() {
            for filename in files.values() {
                validate_output_pattern(filename, level).map_err(|source| {
                    ValidationError::InvalidOutputPath {
                        path: filename.clone(),
                        source,
                    }
                })?;
            }
        }

        Ok(outputs)
    }

    pub fn get(&self, level: PrivacyLevel) -> Option<&IndexMap<String, String>> {
        match level {
            PrivacyLevel::HighlySensitive => self.highly_sensitive.as_ref(),
            PrivacyLevel::ModeratelySensitive => self.moderately_sensitive.as_ref(),
            PrivacyLevel::MinimallySensitive => self.minimally_sensitive.as_ref(),
        }
        .filter(|files| !files.is_empty())
    }

    fn slot_mut(&mut self, level: PrivacyLevel) -> &mut Option<IndexMap<String, String>> {
        match level {
            PrivacyLevel::HighlySensitive => &mut self.highly_sensitive,
            PrivacyLevel::ModeratelySensitive => &mut self.moderately_sensitive,
            PrivacyLevel::MinimallySensitive => &mut self.minimally_sensitive,
        }
    }

    /// Populated tiers only, in tier order
    pub fn iter(&self) -> impl Iterator<Item = (PrivacyLevel, &IndexMap<String, String>)> {
        PrivacyLevel::ALL
            .into_iter()
            .filter_map(|level| self.get(level).map(|files| (level, files)))
    }

    /// Number of populated tiers (not files)
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every declared filename pattern, in declaration order
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.iter().flat_map(|(_, files)| files.values().map(String::as_str))
    }

    pub fn first_file(&self) -> Option<&str> {
        self.files().next()
    }

    /// Distinct parent directories of the declared files
    pub fn output_dirs(&self) -> Vec<String> {
        let dirs: IndexSet<String> = self.files().map(parent_dir).collect();
        dirs.into_iter().collect()
    }
}

fn parent_dir(path: &str) -> String {
    match path.rsplit_once('/') {
        Some(("", _)) => "/".to_string(),
        Some((dir, _)) => dir.to_string(),
        None => ".".to_string(),
    }
}
