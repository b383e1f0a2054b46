//! Output glob pattern validation
//!
//! Output patterns are later turned into `find`-style matchers by the
//! execution engine. These checks keep them well-formed relative file paths
//! with `*` as the only wildcard.

use crate::constants::{LEVEL4_FILE_TYPES, METADATA_DIR};
use crate::error::InvalidPatternError;
use crate::outputs::PrivacyLevel;

type PatternResult = std::result::Result<(), InvalidPatternError>;

/// Check a pattern against the tier-independent rules
///
/// Rules are checked in a fixed order and the first failure wins.
pub fn validate_glob_pattern(pattern: &str) -> PatternResult {
    let owned = || pattern.to_string();

    // Only POSIX slashes please
    if pattern.contains('\\') {
        return Err(InvalidPatternError::BackSlash { pattern: owned() });
    }

    for expr in ["**", "?", "["] {
        if pattern.contains(expr) {
            return Err(InvalidPatternError::UnsupportedWildcard {
                pattern: owned(),
                expr,
            });
        }
    }

    if pattern.ends_with('/') {
        return Err(InvalidPatternError::Directory { pattern: owned() });
    }

    if normpath(pattern) != pattern {
        return Err(InvalidPatternError::NotNormalised { pattern: owned() });
    }

    if pattern == METADATA_DIR
        || pattern
            .strip_prefix(METADATA_DIR)
            .is_some_and(|rest| rest.starts_with('/'))
    {
        return Err(InvalidPatternError::MetadataDirectory { pattern: owned() });
    }

    if pattern.starts_with('/') || is_windows_absolute(pattern) {
        return Err(InvalidPatternError::Absolute { pattern: owned() });
    }

    Ok(())
}

/// Check a pattern declared under a particular sensitivity tier
///
/// Runs [`validate_glob_pattern`] and then requires a file extension. The
/// less sensitive tiers are further restricted to [`LEVEL4_FILE_TYPES`].
pub fn validate_output_pattern(pattern: &str, level: PrivacyLevel) -> PatternResult {
    validate_glob_pattern(pattern)?;

    let Some(suffix) = suffix(pattern) else {
        return Err(InvalidPatternError::MissingExtension {
            pattern: pattern.to_string(),
        });
    };

    if level != PrivacyLevel::HighlySensitive && !LEVEL4_FILE_TYPES.contains(&suffix) {
        return Err(InvalidPatternError::DisallowedFileType {
            pattern: pattern.to_string(),
            level: level.as_str(),
        });
    }

    Ok(())
}

/// Normalise a POSIX path lexically: collapse `//` and `.`, resolve `..`
pub(crate) fn normpath(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    // POSIX allows exactly two leading slashes to mean something special
    let leading = if path.starts_with("//") && !path.starts_with("///") {
        2
    } else if path.starts_with('/') {
        1
    } else {
        0
    };

    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." if leading == 0 && (parts.is_empty() || parts.last() == Some(&"..")) => {
                parts.push(part)
            }
            ".." => {
                parts.pop();
            }
            _ => parts.push(part),
        }
    }

    let joined = format!("{}{}", "/".repeat(leading), parts.join("/"));
    if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Extension of the final path component, including the dot
fn suffix(path: &str) -> Option<&str> {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(index) if index > 0 && index < name.len() - 1 => Some(&name[index..]),
        _ => None,
    }
}

/// `C:/...` style paths are absolute on Windows
fn is_windows_absolute(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'/'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normpath() {
        assert_eq!(normpath("a/b"), "a/b");
        assert_eq!(normpath("a//b"), "a/b");
        assert_eq!(normpath("a/./b"), "a/b");
        assert_eq!(normpath("a/../b"), "b");
        assert_eq!(normpath("../a"), "../a");
        assert_eq!(normpath("/../a"), "/a");
        assert_eq!(normpath("//a"), "//a");
        assert_eq!(normpath("///a"), "/a");
        assert_eq!(normpath("a/.."), ".");
        assert_eq!(normpath(""), ".");
    }

    #[test]
    fn test_suffix() {
        assert_eq!(suffix("output/input.csv"), Some(".csv"));
        assert_eq!(suffix("output/dataset.csv.gz"), Some(".gz"));
        assert_eq!(suffix("output/*.png"), Some(".png"));
        assert_eq!(suffix("output/*"), None);
        assert_eq!(suffix("output/.hidden"), None);
        assert_eq!(suffix("output/trailing."), None);
        assert_eq!(suffix("foo"), None);
    }

    #[test]
    fn test_windows_absolute() {
        assert!(is_windows_absolute("c:/windows"));
        assert!(is_windows_absolute("Z:/"));
        assert!(!is_windows_absolute("c:windows"));
        assert!(!is_windows_absolute("cc:/windows"));
    }

    #[test]
    fn test_metadata_prefix_is_not_metadata_dir() {
        assert!(validate_glob_pattern("metadata_summary.csv").is_ok());
        assert!(validate_glob_pattern("output/metadata/x.csv").is_ok());
    }
}
