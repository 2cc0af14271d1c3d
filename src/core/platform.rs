//! Platform context - the settings every conditional in a recipe reads.
//!
//! A [`PlatformContext`] is resolved once per evaluation (from `-s key=value`
//! settings, config, and host detection) and never mutated afterwards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::ConfigError;

/// Target operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Os {
    Windows,
    WindowsStore,
    Linux,
    Android,
    Macos,
    #[serde(rename = "iOS")]
    Ios,
    FreeBSD,
}

/// Operating system family, used by option pruning and requirement predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    Windows,
    Linux,
    Android,
    Apple,
    Bsd,
}

impl Os {
    pub const ALL: [Os; 7] = [
        Os::Windows,
        Os::WindowsStore,
        Os::Linux,
        Os::Android,
        Os::Macos,
        Os::Ios,
        Os::FreeBSD,
    ];

    /// The host operating system, `None` when it has no recipe setting.
    pub fn host() -> Option<Self> {
        if cfg!(target_os = "windows") {
            Some(Os::Windows)
        } else if cfg!(target_os = "linux") {
            Some(Os::Linux)
        } else if cfg!(target_os = "macos") {
            Some(Os::Macos)
        } else if cfg!(target_os = "ios") {
            Some(Os::Ios)
        } else if cfg!(target_os = "freebsd") {
            Some(Os::FreeBSD)
        } else if cfg!(target_os = "android") {
            Some(Os::Android)
        } else {
            None
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Os::Windows => "Windows",
            Os::WindowsStore => "WindowsStore",
            Os::Linux => "Linux",
            Os::Android => "Android",
            Os::Macos => "Macos",
            Os::Ios => "iOS",
            Os::FreeBSD => "FreeBSD",
        }
    }

    pub const fn family(&self) -> OsFamily {
        match self {
            Os::Windows | Os::WindowsStore => OsFamily::Windows,
            Os::Linux => OsFamily::Linux,
            Os::Android => OsFamily::Android,
            Os::Macos | Os::Ios => OsFamily::Apple,
            Os::FreeBSD => OsFamily::Bsd,
        }
    }
}

impl OsFamily {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OsFamily::Windows => "windows",
            OsFamily::Linux => "linux",
            OsFamily::Android => "android",
            OsFamily::Apple => "apple",
            OsFamily::Bsd => "bsd",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Os {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Os::ALL
            .iter()
            .copied()
            .find(|os| os.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| unknown_value("os", s, Os::ALL.iter().map(Os::as_str)))
    }
}

impl FromStr for OsFamily {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const ALL: [OsFamily; 5] = [
            OsFamily::Windows,
            OsFamily::Linux,
            OsFamily::Android,
            OsFamily::Apple,
            OsFamily::Bsd,
        ];
        ALL.iter()
            .copied()
            .find(|f| f.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| unknown_value("os_family", s, ALL.iter().map(OsFamily::as_str)))
    }
}

/// Target CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arch {
    X86,
    X86_64,
    Armv7,
    Armv8,
}

impl Arch {
    pub const ALL: [Arch; 4] = [Arch::X86, Arch::X86_64, Arch::Armv7, Arch::Armv8];

    /// The host architecture, `None` when it has no recipe setting.
    pub fn host() -> Option<Self> {
        if cfg!(target_arch = "x86_64") {
            Some(Arch::X86_64)
        } else if cfg!(target_arch = "x86") {
            Some(Arch::X86)
        } else if cfg!(target_arch = "aarch64") {
            Some(Arch::Armv8)
        } else if cfg!(target_arch = "arm") {
            Some(Arch::Armv7)
        } else {
            None
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Arch::X86 => "x86",
            Arch::X86_64 => "x86_64",
            Arch::Armv7 => "armv7",
            Arch::Armv8 => "armv8",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Arch::ALL
            .iter()
            .copied()
            .find(|a| a.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| unknown_value("arch", s, Arch::ALL.iter().map(Arch::as_str)))
    }
}

/// Compiler identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Compiler {
    Gcc,
    Clang,
    AppleClang,
    Msvc,
}

impl Compiler {
    pub const ALL: [Compiler; 4] = [
        Compiler::Gcc,
        Compiler::Clang,
        Compiler::AppleClang,
        Compiler::Msvc,
    ];

    /// The conventional compiler for an operating system.
    pub fn default_for(os: Os) -> Self {
        match os.family() {
            OsFamily::Windows => Compiler::Msvc,
            OsFamily::Apple => Compiler::AppleClang,
            OsFamily::Android | OsFamily::Bsd => Compiler::Clang,
            OsFamily::Linux => Compiler::Gcc,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Compiler::Gcc => "gcc",
            Compiler::Clang => "clang",
            Compiler::AppleClang => "apple-clang",
            Compiler::Msvc => "msvc",
        }
    }

    /// C and C++ driver names, `None` when the generator selects them itself.
    pub fn drivers(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Compiler::Gcc => Some(("gcc", "g++")),
            Compiler::Clang | Compiler::AppleClang => Some(("clang", "clang++")),
            Compiler::Msvc => None,
        }
    }
}

impl fmt::Display for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Compiler {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Compiler::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| unknown_value("compiler", s, Compiler::ALL.iter().map(Compiler::as_str)))
    }
}

/// Build configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BuildType {
    Debug,
    #[default]
    Release,
    RelWithDebInfo,
    MinSizeRel,
}

impl BuildType {
    pub const ALL: [BuildType; 4] = [
        BuildType::Debug,
        BuildType::Release,
        BuildType::RelWithDebInfo,
        BuildType::MinSizeRel,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            BuildType::Debug => "Debug",
            BuildType::Release => "Release",
            BuildType::RelWithDebInfo => "RelWithDebInfo",
            BuildType::MinSizeRel => "MinSizeRel",
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BuildType::ALL
            .iter()
            .copied()
            .find(|b| b.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                unknown_value("build_type", s, BuildType::ALL.iter().map(BuildType::as_str))
            })
    }
}

fn unknown_value<'a>(
    setting: &str,
    value: &str,
    expected: impl Iterator<Item = &'a str>,
) -> ConfigError {
    ConfigError::UnknownSettingValue {
        setting: setting.to_string(),
        value: value.to_string(),
        expected: expected.collect::<Vec<_>>().join(", "),
    }
}

/// Immutable facts about the build target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlatformContext {
    pub os: Os,
    pub arch: Arch,
    pub compiler: Compiler,
    pub build_type: BuildType,
}

impl PlatformContext {
    /// Create a context, picking the conventional compiler and a Release build.
    pub fn new(os: Os, arch: Arch) -> Self {
        PlatformContext {
            os,
            arch,
            compiler: Compiler::default_for(os),
            build_type: BuildType::default(),
        }
    }

    pub fn with_compiler(mut self, compiler: Compiler) -> Self {
        self.compiler = compiler;
        self
    }

    pub fn with_build_type(mut self, build_type: BuildType) -> Self {
        self.build_type = build_type;
        self
    }

    pub fn os_family(&self) -> OsFamily {
        self.os.family()
    }

    /// Settings as `(name, value)` pairs in a fixed order.
    pub fn settings(&self) -> [(&'static str, &'static str); 4] {
        [
            ("os", self.os.as_str()),
            ("arch", self.arch.as_str()),
            ("compiler", self.compiler.as_str()),
            ("build_type", self.build_type.as_str()),
        ]
    }
}

impl fmt::Display for PlatformContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{} ({} {})",
            self.arch, self.os, self.compiler, self.build_type
        )
    }
}

/// Settings as given on the command line or in config; resolved into a
/// [`PlatformContext`] in one step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsSpec {
    pub os: Option<String>,
    pub arch: Option<String>,
    pub compiler: Option<String>,
    pub build_type: Option<String>,
}

impl SettingsSpec {
    /// Apply a `key=value` assignment.
    pub fn assign(&mut self, assignment: &str) -> Result<(), ConfigError> {
        let (key, value) = split_assignment(assignment)?;
        let slot = match key {
            "os" => &mut self.os,
            "arch" => &mut self.arch,
            "compiler" => &mut self.compiler,
            "build_type" => &mut self.build_type,
            other => return Err(ConfigError::UnknownSetting(other.to_string())),
        };
        *slot = Some(value.to_string());
        Ok(())
    }

    /// Fill unset fields from `other`.
    pub fn or(mut self, other: &SettingsSpec) -> Self {
        if self.os.is_none() {
            self.os = other.os.clone();
        }
        if self.arch.is_none() {
            self.arch = other.arch.clone();
        }
        if self.compiler.is_none() {
            self.compiler = other.compiler.clone();
        }
        if self.build_type.is_none() {
            self.build_type = other.build_type.clone();
        }
        self
    }

    /// Resolve into a platform context, defaulting to the host.
    ///
    /// Unrecognized values fail instead of falling back to a default, and so
    /// does a host this recipe has no setting for.
    pub fn resolve(&self) -> Result<PlatformContext, ConfigError> {
        self.resolve_with_host(Os::host(), Arch::host())
    }

    fn resolve_with_host(
        &self,
        host_os: Option<Os>,
        host_arch: Option<Arch>,
    ) -> Result<PlatformContext, ConfigError> {
        let os = match &self.os {
            Some(s) => s.parse()?,
            None => host_os.ok_or(ConfigError::UndetectedHost { setting: "os" })?,
        };
        let arch = match &self.arch {
            Some(s) => s.parse()?,
            None => host_arch.ok_or(ConfigError::UndetectedHost { setting: "arch" })?,
        };
        let compiler = match &self.compiler {
            Some(s) => s.parse()?,
            None => Compiler::default_for(os),
        };
        let build_type = match &self.build_type {
            Some(s) => s.parse()?,
            None => BuildType::default(),
        };

        Ok(PlatformContext {
            os,
            arch,
            compiler,
            build_type,
        })
    }
}

/// Split `name=value`, trimming whitespace around both halves.
pub fn split_assignment(assignment: &str) -> Result<(&str, &str), ConfigError> {
    match assignment.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() && !value.trim().is_empty() => {
            Ok((key.trim(), value.trim()))
        }
        _ => Err(ConfigError::MalformedAssignment(assignment.to_string())),
    }
}
