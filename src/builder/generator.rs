//! Generator - toolchain files for the external CMake build.
//!
//! [`ToolchainDescriptor::generate`] is a pure function of the active options,
//! the platform and the bound layout. [`ToolchainDescriptor::write`] is the
//! only side effect before the build: it renders two files into the
//! generators folder,
//!
//! - `fmq_toolchain.cmake`: cache entries, compilers and flags
//! - `CMakePresets.json`: a configure and a build preset using that file
//!
//! Both are staged as temporary files first and only then moved into place,
//! presets first. A failed write never leaves a half-written file behind and
//! never replaces the toolchain file without also replacing the presets.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::core::errors::RecipeError;
use crate::core::layout::Layout;
use crate::core::options::ActiveOptionSet;
use crate::core::platform::{Arch, BuildType, Compiler, OsFamily, PlatformContext};
use crate::util::fs::{cmake_path, relative_path};

pub const TOOLCHAIN_FILE: &str = "fmq_toolchain.cmake";
pub const PRESETS_FILE: &str = "CMakePresets.json";

/// CMake generator selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CMakeGenerator {
    pub name: String,
    /// Generator platform (`-A`), Visual Studio only
    pub platform: Option<String>,
}

impl CMakeGenerator {
    /// The conventional generator for a platform.
    pub fn for_platform(platform: &PlatformContext) -> Self {
        let name = match (platform.os_family(), platform.compiler) {
            (OsFamily::Windows, Compiler::Msvc) => "Visual Studio 17 2022",
            (OsFamily::Windows, _) => "MinGW Makefiles",
            _ => "Unix Makefiles",
        };
        Self::named(name, platform)
    }

    pub fn named(name: impl Into<String>, platform: &PlatformContext) -> Self {
        let name = name.into();
        let vs_platform = if name.starts_with("Visual Studio") {
            Some(
                match platform.arch {
                    Arch::X86 => "Win32",
                    Arch::X86_64 => "x64",
                    Arch::Armv7 => "ARM",
                    Arch::Armv8 => "ARM64",
                }
                .to_string(),
            )
        } else {
            None
        };

        CMakeGenerator {
            name,
            platform: vs_platform,
        }
    }

    /// Whether one build tree holds every build type.
    pub fn is_multi_config(&self) -> bool {
        self.name.starts_with("Visual Studio")
            || self.name == "Xcode"
            || self.name == "Ninja Multi-Config"
    }
}

/// A typed CMake cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheEntry {
    pub value: String,
    pub kind: &'static str,
    pub doc: String,
}

impl CacheEntry {
    fn boolean(value: bool, doc: &str) -> Self {
        CacheEntry {
            value: if value { "ON" } else { "OFF" }.to_string(),
            kind: "BOOL",
            doc: doc.to_string(),
        }
    }

    fn string(value: impl Into<String>, doc: &str) -> Self {
        CacheEntry {
            value: value.into(),
            kind: "STRING",
            doc: doc.to_string(),
        }
    }

    fn path(value: &Path, doc: &str) -> Self {
        CacheEntry {
            value: cmake_path(value),
            kind: "PATH",
            doc: doc.to_string(),
        }
    }
}

/// Everything the external build needs to compile for the resolved
/// platform and options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolchainDescriptor {
    pub generator: CMakeGenerator,
    pub build_type: BuildType,
    pub c_compiler: Option<String>,
    pub cxx_compiler: Option<String>,
    pub flags: Vec<String>,
    pub cache: BTreeMap<String, CacheEntry>,
    pub source_folder: PathBuf,
    pub build_folder: PathBuf,
    pub generators_folder: PathBuf,
    pub install_prefix: PathBuf,
}

impl ToolchainDescriptor {
    /// Derive the descriptor. Pure and deterministic.
    pub fn generate(
        options: &ActiveOptionSet,
        platform: &PlatformContext,
        layout: &Layout,
        generator: CMakeGenerator,
    ) -> Self {
        let mut cache = BTreeMap::new();

        if !generator.is_multi_config() {
            cache.insert(
                "CMAKE_BUILD_TYPE".to_string(),
                CacheEntry::string(platform.build_type.as_str(), "Build type"),
            );
        }

        for (name, value) in options.iter() {
            let (variable, entry) = match (name, value.as_bool()) {
                ("shared", Some(b)) => (
                    "BUILD_SHARED_LIBS",
                    CacheEntry::boolean(b, "Build shared libraries"),
                ),
                ("fPIC", Some(b)) => (
                    "CMAKE_POSITION_INDEPENDENT_CODE",
                    CacheEntry::boolean(b, "Position independent code"),
                ),
                (other, Some(b)) => (other, CacheEntry::boolean(b, "Recipe option")),
                (other, None) => (other, CacheEntry::string(value.to_cmake(), "Recipe option")),
            };
            cache.insert(variable.to_string(), entry);
        }

        if platform.os_family() == OsFamily::Apple {
            let arch = match platform.arch {
                Arch::Armv8 => "arm64",
                Arch::Armv7 => "armv7",
                Arch::X86 => "i386",
                Arch::X86_64 => "x86_64",
            };
            cache.insert(
                "CMAKE_OSX_ARCHITECTURES".to_string(),
                CacheEntry::string(arch, "Target architectures"),
            );
        }

        cache.insert(
            "CMAKE_INSTALL_PREFIX".to_string(),
            CacheEntry::path(&layout.package_folder, "Install prefix"),
        );

        let (c_compiler, cxx_compiler) = match platform.compiler.drivers() {
            Some((c, cxx)) => (Some(c.to_string()), Some(cxx.to_string())),
            None => (None, None),
        };

        ToolchainDescriptor {
            generator,
            build_type: platform.build_type,
            c_compiler,
            cxx_compiler,
            flags: arch_flags(platform),
            cache,
            source_folder: layout.source_folder.clone(),
            build_folder: layout.build_folder.clone(),
            generators_folder: layout.generators_folder.clone(),
            install_prefix: layout.package_folder.clone(),
        }
    }

    pub fn toolchain_path(&self) -> PathBuf {
        self.generators_folder.join(TOOLCHAIN_FILE)
    }

    pub fn presets_path(&self) -> PathBuf {
        self.generators_folder.join(PRESETS_FILE)
    }

    pub fn is_multi_config(&self) -> bool {
        self.generator.is_multi_config()
    }

    /// Render `fmq_toolchain.cmake`.
    pub fn render_toolchain(&self) -> String {
        let mut out = String::new();
        out.push_str("# Generated by fmq-recipe. Do not edit.\n");
        out.push_str("include_guard()\n\n");

        if let Some(ref cc) = self.c_compiler {
            let _ = writeln!(out, "set(CMAKE_C_COMPILER \"{}\")", cc);
        }
        if let Some(ref cxx) = self.cxx_compiler {
            let _ = writeln!(out, "set(CMAKE_CXX_COMPILER \"{}\")", cxx);
        }

        if !self.flags.is_empty() {
            let flags = self.flags.join(" ");
            let _ = writeln!(out, "string(APPEND CMAKE_C_FLAGS_INIT \" {}\")", flags);
            let _ = writeln!(out, "string(APPEND CMAKE_CXX_FLAGS_INIT \" {}\")", flags);
        }

        if self.c_compiler.is_some() || !self.flags.is_empty() {
            out.push('\n');
        }

        for (name, entry) in &self.cache {
            let _ = writeln!(
                out,
                "set({} \"{}\" CACHE {} \"{}\" FORCE)",
                name, entry.value, entry.kind, entry.doc
            );
        }

        out
    }

    /// Render `CMakePresets.json`.
    pub fn render_presets(&self) -> String {
        let name = format!("fmq-{}", self.build_type.as_str().to_lowercase());
        let source_relative = |path: &Path| {
            format!(
                "${{sourceDir}}/{}",
                cmake_path(&relative_path(&self.source_folder, path))
            )
        };

        let presets = Presets {
            version: 3,
            cmake_minimum_required: CMakeVersion {
                major: 3,
                minor: 21,
                patch: 0,
            },
            configure_presets: vec![ConfigurePreset {
                name: name.clone(),
                display_name: format!("fmq-recipe {}", self.build_type),
                generator: self.generator.name.clone(),
                architecture: self.generator.platform.clone().map(|value| Architecture {
                    value,
                    strategy: "set",
                }),
                toolchain_file: source_relative(&self.toolchain_path()),
                binary_dir: source_relative(&self.build_folder),
                cache_variables: self
                    .cache
                    .iter()
                    .map(|(k, v)| (k.clone(), v.value.clone()))
                    .collect(),
            }],
            build_presets: vec![BuildPreset {
                name: name.clone(),
                configure_preset: name,
                configuration: self
                    .is_multi_config()
                    .then(|| self.build_type.as_str().to_string()),
            }],
        };

        // Serializing plain structs of strings cannot fail.
        let mut json = serde_json::to_string_pretty(&presets).unwrap_or_default();
        json.push('\n');
        json
    }

    /// Write both files into the generators folder.
    ///
    /// The folder must exist. The toolchain file, which the build reads, is
    /// moved into place last; if the presets cannot be replaced it is left
    /// untouched.
    pub fn write(&self) -> Result<Vec<PathBuf>, RecipeError> {
        let files = [
            (self.presets_path(), self.render_presets()),
            (self.toolchain_path(), self.render_toolchain()),
        ];

        let mut staged = Vec::with_capacity(files.len());
        for (path, content) in &files {
            let tmp = stage(&self.generators_folder, content.as_bytes()).map_err(|source| {
                RecipeError::Generation {
                    path: path.clone(),
                    source,
                }
            })?;
            staged.push((tmp, path.clone()));
        }

        let mut written = Vec::with_capacity(staged.len());
        for (tmp, path) in staged {
            tmp.persist(&path)
                .map_err(|e| RecipeError::Generation {
                    path: path.clone(),
                    source: e.error,
                })?;
            tracing::debug!("Wrote {}", path.display());
            written.push(path);
        }

        Ok(written)
    }
}

fn stage(dir: &Path, contents: &[u8]) -> std::io::Result<NamedTempFile> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    Ok(tmp)
}

/// Architecture flags for GCC-style drivers outside Apple platforms.
fn arch_flags(platform: &PlatformContext) -> Vec<String> {
    let gcc_like = matches!(platform.compiler, Compiler::Gcc | Compiler::Clang);
    if !gcc_like || platform.os_family() == OsFamily::Apple {
        return Vec::new();
    }
    match platform.arch {
        Arch::X86 => vec!["-m32".to_string()],
        Arch::X86_64 => vec!["-m64".to_string()],
        Arch::Armv7 | Arch::Armv8 => Vec::new(),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Presets {
    version: u32,
    cmake_minimum_required: CMakeVersion,
    configure_presets: Vec<ConfigurePreset>,
    build_presets: Vec<BuildPreset>,
}

#[derive(Serialize)]
struct CMakeVersion {
    major: u32,
    minor: u32,
    patch: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigurePreset {
    name: String,
    display_name: String,
    generator: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    architecture: Option<Architecture>,
    toolchain_file: String,
    binary_dir: String,
    cache_variables: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct Architecture {
    value: String,
    strategy: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BuildPreset {
    name: String,
    configure_preset: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    configuration: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::platform::Os;
    use crate::core::recipe::Recipe;
    use tempfile::TempDir;

    fn descriptor(platform: &PlatformContext, root: &Path) -> ToolchainDescriptor {
        let recipe = Recipe::finalmq();
        let options = recipe
            .resolve_options(&recipe.default_options(), platform)
            .unwrap();
        let generator = CMakeGenerator::for_platform(platform);
        let layout = Layout::bind(root, platform, generator.is_multi_config(), None);
        ToolchainDescriptor::generate(&options, platform, &layout, generator)
    }

    #[test]
    fn test_linux_descriptor() {
        let platform = PlatformContext::new(Os::Linux, Arch::X86_64);
        let desc = descriptor(&platform, Path::new("/src/finalmq"));

        assert_eq!(desc.generator.name, "Unix Makefiles");
        assert!(!desc.is_multi_config());
        assert_eq!(desc.c_compiler.as_deref(), Some("gcc"));
        assert_eq!(desc.flags, vec!["-m64"]);
        assert_eq!(desc.cache["BUILD_SHARED_LIBS"].value, "ON");
        assert_eq!(desc.cache["CMAKE_POSITION_INDEPENDENT_CODE"].value, "OFF");
        assert_eq!(desc.cache["CMAKE_BUILD_TYPE"].value, "Release");
        assert_eq!(
            desc.cache["CMAKE_INSTALL_PREFIX"].value,
            "/src/finalmq/build/Release/package"
        );

        let text = desc.render_toolchain();
        assert!(text.contains("set(BUILD_SHARED_LIBS \"ON\" CACHE BOOL"));
        assert!(text.contains("string(APPEND CMAKE_CXX_FLAGS_INIT \" -m64\")"));
    }

    #[test]
    fn test_windows_descriptor_has_no_pic() {
        let platform = PlatformContext::new(Os::Windows, Arch::X86_64);
        let desc = descriptor(&platform, Path::new("/src/finalmq"));

        assert_eq!(desc.generator.name, "Visual Studio 17 2022");
        assert_eq!(desc.generator.platform.as_deref(), Some("x64"));
        assert!(desc.is_multi_config());
        assert!(desc.c_compiler.is_none());
        assert!(!desc.cache.contains_key("CMAKE_POSITION_INDEPENDENT_CODE"));
        assert!(!desc.cache.contains_key("CMAKE_BUILD_TYPE"));
        assert!(!desc.render_toolchain().contains("POSITION_INDEPENDENT"));

        let presets: serde_json::Value = serde_json::from_str(&desc.render_presets()).unwrap();
        assert_eq!(presets["configurePresets"][0]["architecture"]["value"], "x64");
        assert_eq!(presets["buildPresets"][0]["configuration"], "Release");
    }

    #[test]
    fn test_apple_descriptor_uses_osx_architectures() {
        let platform = PlatformContext::new(Os::Macos, Arch::Armv8);
        let desc = descriptor(&platform, Path::new("/src/finalmq"));
        assert_eq!(desc.cache["CMAKE_OSX_ARCHITECTURES"].value, "arm64");
        assert!(desc.flags.is_empty());
        assert_eq!(desc.c_compiler.as_deref(), Some("clang"));
    }

    #[test]
    fn test_presets_paths_are_source_relative() {
        let platform = PlatformContext::new(Os::Linux, Arch::X86_64);
        let desc = descriptor(&platform, Path::new("/src/finalmq"));
        let presets: serde_json::Value = serde_json::from_str(&desc.render_presets()).unwrap();
        let preset = &presets["configurePresets"][0];

        assert_eq!(preset["name"], "fmq-release");
        assert_eq!(
            preset["toolchainFile"],
            "${sourceDir}/build/Release/generators/fmq_toolchain.cmake"
        );
        assert_eq!(preset["binaryDir"], "${sourceDir}/build/Release");
        assert_eq!(preset["cacheVariables"]["BUILD_SHARED_LIBS"], "ON");
        assert!(preset.get("architecture").is_none());
    }

    #[test]
    fn test_write_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let platform = PlatformContext::new(Os::Linux, Arch::X86_64);
        let desc = descriptor(&platform, tmp.path());
        std::fs::create_dir_all(&desc.generators_folder).unwrap();

        let written = desc.write().unwrap();
        assert_eq!(written.len(), 2);
        let first: Vec<Vec<u8>> = written.iter().map(|p| std::fs::read(p).unwrap()).collect();

        let again = descriptor(&platform, tmp.path());
        again.write().unwrap();
        let second: Vec<Vec<u8>> = written.iter().map(|p| std::fs::read(p).unwrap()).collect();

        assert_eq!(first, second);
        assert_eq!(std::fs::read_dir(&desc.generators_folder).unwrap().count(), 2);
    }

    #[test]
    fn test_write_into_missing_folder_fails_cleanly() {
        let tmp = TempDir::new().unwrap();
        let platform = PlatformContext::new(Os::Linux, Arch::X86_64);
        let desc = descriptor(&platform, tmp.path());

        let err = desc.write().unwrap_err();
        assert!(matches!(err, RecipeError::Generation { .. }));
        assert!(!desc.toolchain_path().exists());
        assert!(!desc.presets_path().exists());
    }

    #[test]
    fn test_failed_presets_leave_toolchain_untouched() {
        let tmp = TempDir::new().unwrap();
        let platform = PlatformContext::new(Os::Linux, Arch::X86_64);
        let desc = descriptor(&platform, tmp.path());
        std::fs::create_dir_all(&desc.generators_folder).unwrap();
        std::fs::write(desc.toolchain_path(), "# previous\n").unwrap();

        // A non-empty directory cannot be renamed over.
        std::fs::create_dir_all(desc.presets_path()).unwrap();
        std::fs::write(desc.presets_path().join("keep"), "").unwrap();

        let err = desc.write().unwrap_err();
        match err {
            RecipeError::Generation { path, .. } => assert_eq!(path, desc.presets_path()),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            std::fs::read_to_string(desc.toolchain_path()).unwrap(),
            "# previous\n"
        );
        assert_eq!(std::fs::read_dir(&desc.generators_folder).unwrap().count(), 2);
    }
}
