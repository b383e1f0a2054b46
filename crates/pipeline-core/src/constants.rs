//! Names shared with the execution engine

/// The magic action name which means "run every action"
pub const RUN_ALL_COMMAND: &str = "run_all";

/// Directory the execution engine keeps run bookkeeping in; outputs may not live there
pub const METADATA_DIR: &str = "metadata";

/// Population size used for dummy data when a project does not declare one
pub const DEFAULT_POPULATION_SIZE: i64 = 1000;

/// File types that may be released from the less sensitive output tiers
pub const LEVEL4_FILE_TYPES: &[&str] = &[
    // tables
    ".csv",
    // images
    ".jpg",
    ".jpeg",
    ".png",
    ".svg",
    ".svgz",
    // reports
    ".html",
    ".txt",
    ".log",
    ".json",
    ".md",
];
