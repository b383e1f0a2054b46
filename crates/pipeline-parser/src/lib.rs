//! Pipeline Parser - YAML loading for pipeline configuration files
//!
//! Turns YAML text into the raw tree consumed by `pipeline-core`, then runs
//! validation over it. Syntax errors carry the filename and position so they
//! can be shown to users directly.

pub mod error;
pub mod loader;
pub mod yaml_parser;

// Re-export main entry points
pub use error::{Location, ParseError, Result};
pub use loader::{load_pipeline, load_pipeline_file, load_pipeline_with};
pub use yaml_parser::{parse_yaml, DEFAULT_FILENAME};
