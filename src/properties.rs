//! Property handling for archetype generation.
//! Properties come from `-D key=value` definitions, JSON or YAML property files
//! and the defaults declared by the archetype manifest.

use crate::constants::PACKAGE_IN_PATH_FORMAT;
use crate::descriptor::RequiredProperty;
use crate::error::{Error, Result};
use crate::renderer::TemplateRenderer;
use indexmap::IndexMap;
use log::debug;
use regex::Regex;
use std::path::Path;

/// Flat, insertion-ordered mapping from property name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyBag {
    values: IndexMap<String, String>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Sets `key`, replacing a previous value in place.
    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.values.insert(key.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Copies every property of `other` into `self`; values of `other` win.
    pub fn merge(&mut self, other: PropertyBag) {
        self.values.extend(other.values);
    }

    /// Reads properties from a JSON or YAML object of scalar values.
    ///
    /// # Errors
    /// * `Error::ConfigError` if the file is not an object of scalars
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading properties from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parses a JSON object, falling back to YAML.
    pub fn parse(content: &str) -> Result<Self> {
        let raw: IndexMap<String, serde_json::Value> = match serde_json::from_str(content) {
            Ok(v) => v,
            Err(_) => serde_yaml::from_str(content)
                .map_err(|e| Error::ConfigError(format!("Invalid properties format: {e}")))?,
        };

        let mut bag = Self::new();
        for (key, value) in raw {
            let value = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Bool(b) => b.to_string(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Null => continue,
                _ => {
                    return Err(Error::ConfigError(format!(
                        "Property '{key}' must be a string, number or boolean"
                    )))
                }
            };
            bag.insert(key, value);
        }
        Ok(bag)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertyBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bag = Self::new();
        for (key, value) in iter {
            bag.insert(key, value);
        }
        bag
    }
}

/// Splits a `KEY=VALUE` definition.
pub fn parse_define(define: &str) -> std::result::Result<(String, String), String> {
    match define.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, found '{define}'")),
    }
}

fn validate(key: &str, value: &str, pattern: &str) -> Result<()> {
    let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
        Error::ConfigError(format!("Invalid validation pattern for '{key}': {e}"))
    })?;
    if regex.is_match(value) {
        Ok(())
    } else {
        Err(Error::ValidationError {
            key: key.to_string(),
            value: value.to_string(),
            pattern: pattern.to_string(),
        })
    }
}

/// Resolves the final property set used for generation.
///
/// Explicit values win over manifest defaults. Defaults are rendered against
/// the properties resolved so far, so `${groupId}` may seed `package`. When
/// `package` is still unset it falls back to `groupId`, and
/// `packageInPathFormat` is always derived from `package`.
///
/// # Errors
/// * `Error::MissingPropertyError` if a required property has no value and no default
/// * `Error::ValidationError` if a value does not match its validation pattern
pub fn resolve(
    explicit: &PropertyBag,
    required: &[RequiredProperty],
    renderer: &dyn TemplateRenderer,
) -> Result<PropertyBag> {
    let mut resolved = explicit.clone();

    for property in required {
        let existing = resolved.get(&property.key).map(str::to_string);
        let value = match (existing, &property.default_value) {
            (Some(value), _) => value,
            (None, Some(default_value)) => {
                let value = renderer.render(default_value, &resolved)?;
                debug!("Using default '{}' for property '{}'", value, property.key);
                resolved.insert(property.key.clone(), value.clone());
                value
            }
            (None, None) => {
                return Err(Error::MissingPropertyError { key: property.key.clone() });
            }
        };
        if let Some(pattern) = &property.validation_regex {
            validate(&property.key, &value, pattern)?;
        }
    }

    if !resolved.contains("package") {
        if let Some(group_id) = resolved.get("groupId").map(str::to_string) {
            resolved.insert("package", group_id);
        }
    }
    if let Some(package) = resolved.get("package").map(str::to_string) {
        resolved.insert(PACKAGE_IN_PATH_FORMAT, package_to_path(&package));
    }

    Ok(resolved)
}

/// `com.example` → `com/example`
pub fn package_to_path(package: &str) -> String {
    package
        .split('.')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_to_path() {
        assert_eq!(package_to_path("com.example"), "com/example");
        assert_eq!(package_to_path("single"), "single");
        assert_eq!(package_to_path(""), "");
    }

    #[test]
    fn test_validation_is_anchored() {
        assert!(validate("artifactId", "my-app", "[a-z-]+").is_ok());
        assert!(validate("artifactId", "My-app", "[a-z-]+").is_err());
    }
}
