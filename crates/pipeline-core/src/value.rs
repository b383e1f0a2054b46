//! Helpers for reading the raw YAML tree

use serde_yaml::{Mapping, Value};

/// Text of a mapping key; scalar keys such as `1` or `true` are read as text
pub(crate) fn key_text(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Tagged(tagged) => key_text(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => serde_yaml::to_string(key)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Look up a field by name
pub(crate) fn field<'a>(mapping: &'a Mapping, name: &str) -> Option<&'a Value> {
    mapping.iter().find(|(k, _)| key_text(k) == name).map(|(_, v)| v)
}

/// A field that is present and not `null`
pub(crate) fn present<'a>(mapping: &'a Mapping, name: &str) -> Option<&'a Value> {
    field(mapping, name).filter(|v| !v.is_null())
}

/// Keys of `mapping` that are not in `allowed`, comma separated in document order
pub(crate) fn unexpected_keys(mapping: &Mapping, allowed: &[&str]) -> Option<String> {
    let extra: Vec<String> = mapping
        .keys()
        .map(key_text)
        .filter(|k| !allowed.contains(&k.as_str()))
        .collect();

    if extra.is_empty() {
        None
    } else {
        Some(extra.join(", "))
    }
}

/// Strip any YAML tag so `!!str foo` reads like `foo`
pub(crate) fn untagged(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untagged(&tagged.value),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_text() {
        let mapping: Mapping = serde_yaml::from_str("1: a\ntrue: b\nname: c").unwrap();
        let keys: Vec<String> = mapping.keys().map(key_text).collect();
        assert_eq!(keys, vec!["1", "true", "name"]);
    }

    #[test]
    fn test_unexpected_keys_in_document_order() {
        let mapping: Mapping = serde_yaml::from_str("zeta: 1\nrun: x\nalpha: 2").unwrap();
        assert_eq!(
            unexpected_keys(&mapping, &["run"]),
            Some("zeta, alpha".to_string())
        );
        assert_eq!(unexpected_keys(&mapping, &["run", "zeta", "alpha"]), None);
    }

    #[test]
    fn test_present_ignores_null() {
        let mapping: Mapping = serde_yaml::from_str("a: ~\nb: 1").unwrap();
        assert!(field(&mapping, "a").is_some());
        assert!(present(&mapping, "a").is_none());
        assert!(present(&mapping, "b").is_some());
    }
}
