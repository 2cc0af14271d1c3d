//! Requirement resolver - external dependencies, some gated on the platform.
//!
//! Declarations are kept in order. Resolution filters them by their
//! [`Condition`] and then merges duplicates with an explicit first-wins rule:
//! when a name appears twice, the earliest declaration's version is kept and
//! later ones are dropped without error.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::errors::ConfigError;
use crate::core::platform::{Os, OsFamily, PlatformContext};

static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z0-9_][a-z0-9_+.-]*)/([A-Za-z0-9_+.\[\]<>=~^ -]+)$")
        .expect("reference pattern is valid")
});

/// A `name/version` package reference.
///
/// The version is an opaque constraint; checking it is the package manager's
/// job, not ours.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Reference {
    pub name: String,
    pub version: String,
}

impl Reference {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Reference {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl FromStr for Reference {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = REFERENCE_RE
            .captures(s.trim())
            .ok_or_else(|| ConfigError::InvalidReference(s.to_string()))?;
        Ok(Reference::new(&caps[1], caps[2].trim()))
    }
}

impl TryFrom<String> for Reference {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Reference> for String {
    fn from(r: Reference) -> Self {
        r.to_string()
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

/// Predicate gating a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    #[default]
    Always,
    Os(Os),
    OsFamily(OsFamily),
}

impl Condition {
    pub fn holds(&self, platform: &PlatformContext) -> bool {
        match self {
            Condition::Always => true,
            Condition::Os(os) => platform.os == *os,
            Condition::OsFamily(family) => platform.os_family() == *family,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Always => f.write_str("always"),
            Condition::Os(os) => write!(f, "os == {}", os),
            Condition::OsFamily(family) => write!(f, "os family == {}", family),
        }
    }
}

/// A declared dependency with its gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementDecl {
    #[serde(rename = "ref")]
    pub reference: Reference,

    #[serde(default)]
    pub when: Condition,
}

impl RequirementDecl {
    pub fn always(reference: Reference) -> Self {
        RequirementDecl {
            reference,
            when: Condition::Always,
        }
    }

    pub fn when(reference: Reference, when: Condition) -> Self {
        RequirementDecl { reference, when }
    }
}

/// Resolved requirements, in declaration order, unique by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequirementSet {
    requirements: Vec<Reference>,
}

impl RequirementSet {
    pub fn get(&self, name: &str) -> Option<&Reference> {
        self.requirements.iter().find(|r| r.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.requirements.iter().map(|r| r.name.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Reference> {
        self.requirements.iter()
    }

    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }
}

impl<'a> IntoIterator for &'a RequirementSet {
    type Item = &'a Reference;
    type IntoIter = std::slice::Iter<'a, Reference>;

    fn into_iter(self) -> Self::IntoIter {
        self.requirements.iter()
    }
}

/// Merge references, keeping the first occurrence of each name.
pub fn merge_first_wins(references: impl IntoIterator<Item = Reference>) -> RequirementSet {
    let mut seen = HashSet::new();
    let mut requirements = Vec::new();

    for reference in references {
        if seen.insert(reference.name.clone()) {
            requirements.push(reference);
        } else {
            tracing::debug!("Dropping duplicate requirement `{}`", reference);
        }
    }

    RequirementSet { requirements }
}

/// Resolve the requirement set for a platform.
///
/// Names are not validated here; an unknown package only fails once the
/// package manager looks it up.
pub fn resolve_requirements(
    declarations: &[RequirementDecl],
    platform: &PlatformContext,
) -> RequirementSet {
    merge_first_wins(
        declarations
            .iter()
            .filter(|decl| decl.when.holds(platform))
            .map(|decl| decl.reference.clone()),
    )
}
