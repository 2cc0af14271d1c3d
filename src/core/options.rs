//! Option model - the recipe's option schema and its resolution per platform.
//!
//! Resolution takes the schema, an explicit [`OptionDefaults`] table and the
//! platform, and yields the [`ActiveOptionSet`]: one value per option that
//! applies on that platform. Options unsupported on the platform's OS family
//! are pruned, not left with a stale default.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::errors::ConfigError;
use crate::core::platform::{split_assignment, OsFamily, PlatformContext};

/// A single option value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Text(String),
}

impl OptionValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            OptionValue::Text(_) => None,
        }
    }

    /// Value as a CMake cache entry (`ON`/`OFF` for toggles).
    pub fn to_cmake(&self) -> String {
        match self {
            OptionValue::Bool(true) => "ON".to_string(),
            OptionValue::Bool(false) => "OFF".to_string(),
            OptionValue::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(true) => f.write_str("True"),
            OptionValue::Bool(false) => f.write_str("False"),
            OptionValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Text(s.to_string())
    }
}

/// Parse the usual spellings of a boolean toggle.
pub fn parse_bool_like(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" => Some(false),
        _ => None,
    }
}

/// Declaration of one option: its legal values and where it applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDecl {
    pub values: Vec<OptionValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<OptionValue>,

    /// OS families on which the option is meaningless and gets pruned.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unsupported_on: Vec<OsFamily>,
}

impl OptionDecl {
    /// A boolean toggle with the given default.
    pub fn toggle(default: bool) -> Self {
        OptionDecl {
            values: vec![OptionValue::Bool(true), OptionValue::Bool(false)],
            default: Some(OptionValue::Bool(default)),
            unsupported_on: Vec::new(),
        }
    }

    pub fn unsupported_on(mut self, family: OsFamily) -> Self {
        if !self.unsupported_on.contains(&family) {
            self.unsupported_on.push(family);
        }
        self
    }

    pub fn is_supported_on(&self, platform: &PlatformContext) -> bool {
        !self.unsupported_on.contains(&platform.os_family())
    }

    /// Map a requested value onto a member of the domain.
    ///
    /// Text values are matched against toggles by their boolean spelling, so
    /// `-o shared=False` selects `Bool(false)`.
    pub fn coerce(&self, name: &str, value: &OptionValue) -> Result<OptionValue, ConfigError> {
        if self.values.contains(value) {
            return Ok(value.clone());
        }

        if let OptionValue::Text(raw) = value {
            if let Some(b) = parse_bool_like(raw) {
                if self.values.contains(&OptionValue::Bool(b)) {
                    return Ok(OptionValue::Bool(b));
                }
            }
            if let Some(found) = self.values.iter().find(|v| match v {
                OptionValue::Text(t) => t.eq_ignore_ascii_case(raw),
                OptionValue::Bool(_) => false,
            }) {
                return Ok(found.clone());
            }
        }

        Err(ConfigError::OptionDomain {
            option: name.to_string(),
            value: value.to_string(),
            expected: self.domain_display(),
        })
    }

    fn domain_display(&self) -> String {
        self.values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// The recipe's recognized options, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionSchema {
    options: BTreeMap<String, OptionDecl>,
}

impl OptionSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, decl: OptionDecl) -> Self {
        self.options.insert(name.into(), decl);
        self
    }

    pub fn get(&self, name: &str) -> Option<&OptionDecl> {
        self.options.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionDecl)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Defaults declared inline in the schema.
    pub fn declared_defaults(&self) -> OptionDefaults {
        let mut defaults = OptionDefaults::new();
        for (name, decl) in &self.options {
            if let Some(ref value) = decl.default {
                defaults.set(name.clone(), value.clone());
            }
        }
        defaults
    }
}

/// Explicit table of default option values.
///
/// Passed into [`resolve_options`] rather than living in process-wide state,
/// so callers (and tests) can supply any defaults they like.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionDefaults {
    values: BTreeMap<String, OptionValue>,
}

impl OptionDefaults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<OptionValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Apply a `name=value` assignment from the command line.
    pub fn assign(&mut self, assignment: &str) -> Result<(), ConfigError> {
        let (name, value) = split_assignment(assignment)?;
        self.set(name, OptionValue::Text(value.to_string()));
        Ok(())
    }

    /// Layer `other` on top of this table (other wins).
    pub fn merge(&mut self, other: &OptionDefaults) {
        for (name, value) in &other.values {
            self.values.insert(name.clone(), value.clone());
        }
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Options that apply on a platform, each with exactly one selected value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActiveOptionSet {
    values: BTreeMap<String, OptionValue>,
}

impl ActiveOptionSet {
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(OptionValue::as_bool)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for ActiveOptionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .values
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

/// Resolve the active option set for a platform.
///
/// Pure: the same schema, defaults and platform always give the same set.
pub fn resolve_options(
    schema: &OptionSchema,
    defaults: &OptionDefaults,
    platform: &PlatformContext,
) -> Result<ActiveOptionSet, ConfigError> {
    for (name, _) in defaults.iter() {
        if schema.get(name).is_none() {
            return Err(ConfigError::UnknownOption(name.to_string()));
        }
    }

    let mut active = ActiveOptionSet::default();
    for (name, decl) in schema.iter() {
        if !decl.is_supported_on(platform) {
            tracing::debug!(
                "Pruning option `{}` (unsupported on {})",
                name,
                platform.os_family()
            );
            continue;
        }

        let requested = defaults
            .get(name)
            .ok_or_else(|| ConfigError::MissingOptionValue(name.to_string()))?;
        let value = decl.coerce(name, requested)?;
        active.values.insert(name.to_string(), value);
    }

    Ok(active)
}
