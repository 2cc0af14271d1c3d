//! Package metadata handed to consumers after a successful package phase.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::options::ActiveOptionSet;
use crate::core::platform::PlatformContext;
use crate::core::requirement::{Reference, RequirementSet};
use crate::util::hash::Fingerprint;

/// File written into the package folder next to the installed artifacts.
pub const PACKAGE_INFO_FILE: &str = "package_info.json";

/// Identity of one binary configuration of a package.
///
/// Two evaluations with the same settings, options and requirements get the
/// same id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageId(String);

impl PackageId {
    pub fn compute(
        platform: &PlatformContext,
        options: &ActiveOptionSet,
        requirements: &RequirementSet,
    ) -> Self {
        let mut fp = Fingerprint::new();

        fp.update_str("[settings]");
        for (name, value) in platform.settings() {
            fp.update_str(name).update_str(value);
        }

        fp.update_str("[options]");
        for (name, value) in options.iter() {
            fp.update_str(name).update_str(&value.to_string());
        }

        fp.update_str("[requires]");
        for reference in requirements {
            fp.update_str(&reference.to_string());
        }

        PackageId(fp.finish())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 16 hex digits, for display.
    pub fn short(&self) -> &str {
        &self.0[..16.min(self.0.len())]
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What downstream builds need to consume the package.
///
/// Produced once, after install succeeds, and never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub reference: Reference,
    pub package_id: PackageId,
    pub settings: PlatformContext,
    pub options: ActiveOptionSet,
    pub requires: RequirementSet,
    /// Library names to link against.
    pub libs: Vec<String>,
    pub package_folder: PathBuf,
}

impl PackageMetadata {
    pub fn libs(&self) -> &[String] {
        &self.libs
    }

    /// Serialize to the `package_info.json` format.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Read a previously written `package_info.json`.
    pub fn read(package_folder: &Path) -> anyhow::Result<Self> {
        let path = package_folder.join(PACKAGE_INFO_FILE);
        let content = crate::util::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
