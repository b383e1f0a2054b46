//! Version-gated feature flags
//!
//! Each feature switches on at a fixed project file version and stays on for
//! every later version. The table below is the single place where those
//! thresholds live.

use crate::error::{Result, ValidationError};
use serde::{Deserialize, Serialize};

/// Highest project file version this crate understands
pub const LATEST_VERSION: u32 = 4;

/// A behaviour change introduced at a given project file version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Feature {
    /// No two actions may declare the same output path
    UniqueOutputPath,
    /// The `expectations` section with `population_size` is required
    ExpectationsPopulation,
    /// cohortextractor actions (and `expectations`) are rejected
    RemoveSupportForCohortExtractor,
}

const FEATURE_THRESHOLDS: &[(Feature, u32)] = &[
    (Feature::UniqueOutputPath, 2),
    (Feature::ExpectationsPopulation, 3),
    (Feature::RemoveSupportForCohortExtractor, 4),
];

impl Feature {
    pub const ALL: [Feature; 3] = [
        Feature::UniqueOutputPath,
        Feature::ExpectationsPopulation,
        Feature::RemoveSupportForCohortExtractor,
    ];

    /// Version at which this feature switches on
    pub fn threshold(self) -> u32 {
        FEATURE_THRESHOLDS
            .iter()
            .find(|(feature, _)| *feature == self)
            .map(|(_, version)| *version)
            .unwrap_or(LATEST_VERSION)
    }
}

/// Feature flags resolved for one project file version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FeatureFlags {
    pub unique_output_path: bool,
    pub expectations_population: bool,
    pub remove_support_for_cohortextractor: bool,
}

impl FeatureFlags {
    pub fn is_enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::UniqueOutputPath => self.unique_output_path,
            Feature::ExpectationsPopulation => self.expectations_population,
            Feature::RemoveSupportForCohortExtractor => self.remove_support_for_cohortextractor,
        }
    }
}

/// Resolve the feature flags for a project file version
///
/// Versions newer than [`LATEST_VERSION`] are rejected rather than clamped.
pub fn feature_flags_for_version(version: f64) -> Result<FeatureFlags> {
    if version > f64::from(LATEST_VERSION) {
        return Err(ValidationError::UnsupportedVersion { version });
    }

    let enabled = |feature: Feature| version >= f64::from(feature.threshold());

    Ok(FeatureFlags {
        unique_output_path: enabled(Feature::UniqueOutputPath),
        expectations_population: enabled(Feature::ExpectationsPopulation),
        remove_support_for_cohortextractor: enabled(Feature::RemoveSupportForCohortExtractor),
    })
}
