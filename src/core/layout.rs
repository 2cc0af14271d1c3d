//! Layout binder - canonical folders for a source tree.
//!
//! Follows the usual CMake layout: single-config generators get one build
//! folder per build type, multi-config generators share one. Binding is a
//! pure path computation; nothing is created here.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::platform::PlatformContext;

/// Folder roles used by the later phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layout {
    pub source_folder: PathBuf,
    pub build_folder: PathBuf,
    pub generators_folder: PathBuf,
    pub package_folder: PathBuf,
    pub export_folder: PathBuf,
}

impl Layout {
    /// Bind the layout for a source root.
    ///
    /// `package_folder` overrides the default `<build>/package` location.
    pub fn bind(
        source_root: &Path,
        platform: &PlatformContext,
        multi_config: bool,
        package_folder: Option<&Path>,
    ) -> Layout {
        let build_root = source_root.join("build");
        let build_folder = if multi_config {
            build_root
        } else {
            build_root.join(platform.build_type.as_str())
        };

        let package_folder = match package_folder {
            Some(p) if p.is_absolute() => p.to_path_buf(),
            Some(p) => source_root.join(p),
            None => build_folder.join("package"),
        };

        Layout {
            source_folder: source_root.to_path_buf(),
            generators_folder: build_folder.join("generators"),
            export_folder: build_folder.join("export"),
            package_folder,
            build_folder,
        }
    }

    /// Folders that must exist before generation.
    pub fn folders(&self) -> [&Path; 2] {
        [&self.build_folder, &self.generators_folder]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::platform::{Arch, BuildType, Os};

    #[test]
    fn test_single_config_layout() {
        let platform =
            PlatformContext::new(Os::Linux, Arch::X86_64).with_build_type(BuildType::Debug);
        let layout = Layout::bind(Path::new("/src/finalmq"), &platform, false, None);

        assert_eq!(layout.source_folder, PathBuf::from("/src/finalmq"));
        assert_eq!(layout.build_folder, PathBuf::from("/src/finalmq/build/Debug"));
        assert_eq!(
            layout.generators_folder,
            PathBuf::from("/src/finalmq/build/Debug/generators")
        );
        assert_eq!(
            layout.package_folder,
            PathBuf::from("/src/finalmq/build/Debug/package")
        );
    }

    #[test]
    fn test_multi_config_layout() {
        let platform = PlatformContext::new(Os::Windows, Arch::X86_64);
        let layout = Layout::bind(Path::new("/src/finalmq"), &platform, true, None);

        assert_eq!(layout.build_folder, PathBuf::from("/src/finalmq/build"));
        assert_eq!(
            layout.generators_folder,
            PathBuf::from("/src/finalmq/build/generators")
        );
    }

    #[test]
    fn test_package_folder_override() {
        let platform = PlatformContext::new(Os::Linux, Arch::X86_64);

        let relative = Layout::bind(Path::new("/src"), &platform, false, Some(Path::new("dist")));
        assert_eq!(relative.package_folder, PathBuf::from("/src/dist"));

        let absolute = Layout::bind(Path::new("/src"), &platform, false, Some(Path::new("/opt/fmq")));
        assert_eq!(absolute.package_folder, PathBuf::from("/opt/fmq"));
    }
}
