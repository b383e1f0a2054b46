//! Run command parsing
//!
//! A run command looks like `image:version arg1 arg2 ...` and is split with
//! shell quoting rules, so `python:latest a.py --flag 'two words'` yields four
//! parts. `#` has no special meaning: `a.py #1` is two words.

use crate::error::{Result, ValidationError};
use regex::Regex;
use serde::{Serialize, Serializer};
use std::hash::{Hash, Hasher};
use std::sync::LazyLock;

static VERSION_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(v\d+(\.\d+)*|latest|dev)$").expect("valid version tag regex"));

/// A parsed `run` command
///
/// Two commands are equal exactly when their raw strings are equal; the
/// derived fields take no part in equality or hashing.
#[derive(Debug, Clone)]
pub struct Command {
    raw: String,
    name: String,
    version: String,
    parts: Vec<String>,
}

impl Command {
    /// Parse a run string, attributing failures to `action_id`
    pub fn parse(action_id: &str, raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();

        let parts = split_words(&raw).map_err(|reason| ValidationError::UnparsableCommand {
            action: action_id.to_string(),
            reason: reason.to_string(),
        })?;

        let Some(image) = parts.first() else {
            return Err(ValidationError::EmptyRun {
                action: action_id.to_string(),
            });
        };

        let (name, version) = image.split_once(':').unwrap_or((image.as_str(), ""));
        if !VERSION_TAG_RE.is_match(version) {
            return Err(ValidationError::MissingImageVersion {
                name: name.to_string(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            version: version.to_string(),
            parts,
            raw,
        })
    }

    /// The run string exactly as written (plus any `--config` flag)
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Image name, e.g. `python`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Image version tag, e.g. `latest` or `v2`
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Every argument after the image, joined with single spaces
    pub fn args(&self) -> String {
        self.parts[1..].join(" ")
    }

    /// All shell-split parts, image included
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// `name:version` with `latest` normalised to `v1`
    pub fn image(&self) -> String {
        let version = match self.version.as_str() {
            "latest" => "v1",
            other => other,
        };
        format!("{}:{}", self.name, version)
    }

    /// Whether `flag` appears either bare or as `flag=value`
    pub fn has_flag(&self, flag: &str) -> bool {
        self.parts[1..].iter().any(|part| {
            part == flag
                || part
                    .strip_prefix(flag)
                    .is_some_and(|rest| rest.starts_with('='))
        })
    }

    /// Value given to `flag`, either as `flag value` or `flag=value`
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        let mut args = self.parts[1..].iter();
        while let Some(part) = args.next() {
            if part == flag {
                return args.next().map(String::as_str);
            }
            if let Some(value) = part.strip_prefix(flag).and_then(|r| r.strip_prefix('=')) {
                return Some(value);
            }
        }
        None
    }
}

/// Split `raw` into words the way a POSIX shell would, without comments
///
/// Backslash escapes the next character outside quotes. Inside double quotes
/// it only escapes `"` and `\`. Quoted empty strings are kept as words.
fn split_words(raw: &str) -> std::result::Result<Vec<String>, &'static str> {
    let mut words = Vec::new();
    let mut current: Option<String> = None;
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        match c {
            ' ' | '\t' | '\r' | '\n' => {
                if let Some(word) = current.take() {
                    words.push(word);
                }
            }
            '\\' => {
                let escaped = chars.next().ok_or("no escaped character")?;
                current.get_or_insert_with(String::new).push(escaped);
            }
            '\'' => {
                let word = current.get_or_insert_with(String::new);
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => word.push(c),
                        None => return Err("no closing quotation"),
                    }
                }
            }
            '"' => {
                let word = current.get_or_insert_with(String::new);
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(c @ ('"' | '\\')) => word.push(c),
                            Some(c) => {
                                word.push('\\');
                                word.push(c);
                            }
                            None => return Err("no escaped character"),
                        },
                        Some(c) => word.push(c),
                        None => return Err("no closing quotation"),
                    }
                }
            }
            c => current.get_or_insert_with(String::new).push(c),
        }
    }

    if let Some(word) = current {
        words.push(word);
    }
    Ok(words)
}

impl PartialEq for Command {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Command {}

impl Hash for Command {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl Serialize for Command {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}
