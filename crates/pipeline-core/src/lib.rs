//! Pipeline Core - data model and validation engine for pipeline configuration files
//!
//! This crate turns an already-parsed YAML tree into a validated [`Pipeline`]:
//! - Type-checking pre-pass over the raw tree
//! - Action, command and output models
//! - Version-gated feature flags
//! - Output glob pattern validation
//! - Extraction command rules
//!
//! It performs no I/O. Reading and parsing YAML text lives in `pipeline-parser`.

pub mod action;
pub mod command;
pub mod config;
pub mod constants;
pub mod error;
pub mod extractors;
pub mod features;
pub mod glob;
pub mod outputs;
pub mod pipeline;
pub mod resolve;
pub mod schema;

mod json;
mod value;

// Re-export commonly used types
pub use action::Action;
pub use command::Command;
pub use config::{CommandPattern, ValidatorConfig};
pub use constants::{METADATA_DIR, RUN_ALL_COMMAND};
pub use error::{ErrorKind, InvalidPatternError, Result, ValidationError};
pub use extractors::Extraction;
pub use features::{feature_flags_for_version, Feature, FeatureFlags, LATEST_VERSION};
pub use glob::{validate_glob_pattern, validate_output_pattern};
pub use outputs::{Outputs, PrivacyLevel};
pub use pipeline::{Expectations, Pipeline};
pub use resolve::{resolve_action, resolve_action_with, Backend, ResolvedAction};
