//! Common test utilities for pipeline-core integration tests

#![allow(dead_code)]

use pipeline_core::{ErrorKind, Pipeline, Result, ValidationError};
use serde_yaml::Value;

/// Parse inline YAML into a raw tree
pub fn tree(yaml: &str) -> Value {
    serde_yaml::from_str(yaml).expect("test YAML should parse")
}

/// Build a pipeline from inline YAML
pub fn build(yaml: &str) -> Result<Pipeline> {
    Pipeline::build(&tree(yaml))
}

/// Build a pipeline that is expected to validate
pub fn build_ok(yaml: &str) -> Pipeline {
    match build(yaml) {
        Ok(pipeline) => pipeline,
        Err(err) => panic!("Expected pipeline to validate, got: {}", err),
    }
}

/// Build a pipeline that is expected to be rejected
pub fn build_err(yaml: &str) -> ValidationError {
    match build(yaml) {
        Ok(pipeline) => panic!("Expected validation error, got: {:?}", pipeline),
        Err(err) => err,
    }
}

/// A project with a single action, for tests that only vary one field
pub fn single_action(version: &str, run: &str, outputs: &str) -> String {
    format!(
        r#"
version: {}
actions:
  action1:
    run: {}
    outputs:
{}
"#,
        version,
        run,
        indent(outputs, 6)
    )
}

fn indent(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.trim()
        .lines()
        .map(|line| format!("{}{}", pad, line))
        .collect::<Vec<_>>()
        .join("\n")
}

pub trait ErrorAssertions {
    fn assert_message_contains(&self, expected: &str);
    fn assert_kind(&self, expected: ErrorKind);
}

impl ErrorAssertions for ValidationError {
    fn assert_message_contains(&self, expected: &str) {
        let message = self.to_string();
        assert!(
            message.contains(expected),
            "Expected error containing {:?}, got {:?}",
            expected,
            message
        );
    }

    fn assert_kind(&self, expected: ErrorKind) {
        assert_eq!(
            self.kind(),
            expected,
            "Expected {:?} error, got {:?} ({})",
            expected,
            self.kind(),
            self
        );
    }
}
