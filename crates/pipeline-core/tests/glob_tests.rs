//! Integration tests for output glob pattern validation

use pipeline_core::{validate_glob_pattern, validate_output_pattern, InvalidPatternError, PrivacyLevel};

#[test]
fn test_valid_glob_patterns() {
    assert!(validate_glob_pattern("foo/bar/*.txt").is_ok());
    assert!(validate_glob_pattern("foo").is_ok());
    assert!(validate_glob_pattern("output/metadata.csv").is_ok());
    assert!(validate_glob_pattern("metadata.csv").is_ok());
}

#[test]
fn test_invalid_glob_patterns() {
    let bad_patterns = [
        "/abs/path",
        "ends/in/slash/",
        "not//canonical",
        "path/../traversal",
        "c:/windows/absolute",
        "recursive/**/glob.pattern",
        "questionmark?",
        "/[square]brackets",
        "\\ftest",
        "metadata",
        "metadata/test",
        "./relative",
    ];

    for pattern in bad_patterns {
        let err = validate_glob_pattern(pattern)
            .expect_err(&format!("{:?} should be rejected", pattern));
        assert_eq!(err.pattern(), pattern);
    }
}

#[test]
fn test_first_failing_rule_wins() {
    // Absolute and contains '?': the wildcard rule runs first
    let err = validate_glob_pattern("/abs/file?.csv").unwrap_err();
    assert!(matches!(err, InvalidPatternError::UnsupportedWildcard { expr: "?", .. }));

    let err = validate_glob_pattern("a\\b/").unwrap_err();
    assert!(matches!(err, InvalidPatternError::BackSlash { .. }));
}

#[test]
fn test_reasons() {
    let reason = |pattern: &str| validate_glob_pattern(pattern).unwrap_err().to_string();

    assert_eq!(reason("a\\b"), "contains back slashes (use forward slashes only)");
    assert_eq!(
        reason("a/**/b"),
        "contains '**' (only the * wildcard character is supported)"
    );
    assert_eq!(reason("a/"), "looks like a directory (only files should be specified)");
    assert_eq!(
        reason("a//b"),
        "is not in standard form (contains double slashes or '..' elements)"
    );
    assert_eq!(reason("metadata/x"), "should not include the metadata directory");
    assert_eq!(reason("/a"), "is an absolute path");
}

#[test]
fn test_output_pattern_requires_extension() {
    for level in PrivacyLevel::ALL {
        let err = validate_output_pattern("output/*", level).unwrap_err();
        assert!(matches!(err, InvalidPatternError::MissingExtension { .. }));
    }
}

#[test]
fn test_output_pattern_file_types_per_tier() {
    assert!(validate_output_pattern("output/data.arrow", PrivacyLevel::HighlySensitive).is_ok());
    assert!(validate_output_pattern("output/*.csv.gz", PrivacyLevel::HighlySensitive).is_ok());

    for level in [PrivacyLevel::ModeratelySensitive, PrivacyLevel::MinimallySensitive] {
        assert!(validate_output_pattern("output/table.csv", level).is_ok());
        assert!(validate_output_pattern("output/*.png", level).is_ok());

        let err = validate_output_pattern("output/data.arrow", level).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("output/data.arrow is not an allowed file type for {} outputs", level)
        );
    }
}
