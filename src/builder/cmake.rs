//! CMake build system.

use std::path::{Path, PathBuf};

use crate::builder::backend::{BuildInvocation, BuildSystem};
use crate::core::errors::ProcessFailure;
use crate::util::fs::cmake_path;
use crate::util::process::{find_cmake, ProcessBuilder};

/// Drives `cmake` for configure, build and install.
#[derive(Debug, Clone)]
pub struct CMakeBuildSystem {
    cmake: PathBuf,
}

impl CMakeBuildSystem {
    pub fn new(cmake: impl Into<PathBuf>) -> Self {
        CMakeBuildSystem {
            cmake: cmake.into(),
        }
    }

    /// Use the configured executable, else the one on PATH.
    ///
    /// When neither exists the bare name is kept, so the failure surfaces
    /// as a spawn error in the build phase.
    pub fn locate(configured: Option<&Path>) -> Self {
        let cmake = configured
            .map(Path::to_path_buf)
            .or_else(find_cmake)
            .unwrap_or_else(|| PathBuf::from("cmake"));
        tracing::debug!("Using cmake at {}", cmake.display());
        Self::new(cmake)
    }

    pub fn program(&self) -> &Path {
        &self.cmake
    }

    pub fn configure_args(invocation: &BuildInvocation) -> Vec<String> {
        let mut args = vec![
            "-S".to_string(),
            invocation.source_folder.display().to_string(),
            "-B".to_string(),
            invocation.build_folder.display().to_string(),
            "-G".to_string(),
            invocation.generator.name.clone(),
        ];

        if let Some(ref platform) = invocation.generator.platform {
            args.push("-A".to_string());
            args.push(platform.clone());
        }

        args.push(format!(
            "-DCMAKE_TOOLCHAIN_FILE={}",
            cmake_path(&invocation.toolchain_file)
        ));

        if !invocation.is_multi_config() {
            args.push(format!("-DCMAKE_BUILD_TYPE={}", invocation.build_type));
        }

        args
    }

    pub fn build_args(invocation: &BuildInvocation) -> Vec<String> {
        let mut args = vec![
            "--build".to_string(),
            invocation.build_folder.display().to_string(),
        ];

        // Configuration (for multi-config generators like Visual Studio)
        if invocation.is_multi_config() {
            args.push("--config".to_string());
            args.push(invocation.build_type.to_string());
        }

        args.push("--parallel".to_string());
        if let Some(jobs) = invocation.jobs {
            args.push(jobs.to_string());
        }

        if invocation.verbose {
            args.push("--verbose".to_string());
        }

        args
    }

    pub fn install_args(invocation: &BuildInvocation) -> Vec<String> {
        let mut args = vec![
            "--install".to_string(),
            invocation.build_folder.display().to_string(),
        ];

        if invocation.is_multi_config() {
            args.push("--config".to_string());
            args.push(invocation.build_type.to_string());
        }

        args.push("--prefix".to_string());
        args.push(invocation.package_folder.display().to_string());
        args
    }

    fn run(&self, args: Vec<String>, invocation: &BuildInvocation) -> Result<(), ProcessFailure> {
        ProcessBuilder::new(&self.cmake)
            .args(args)
            .cwd(&invocation.source_folder)
            .run()
            .map(|output| {
                if invocation.verbose && !output.stdout.is_empty() {
                    tracing::debug!("{}", String::from_utf8_lossy(&output.stdout).trim_end());
                }
            })
    }
}

impl BuildSystem for CMakeBuildSystem {
    fn name(&self) -> &str {
        "cmake"
    }

    fn build(&self, invocation: &BuildInvocation) -> Result<(), ProcessFailure> {
        tracing::info!("Configuring CMake project");
        self.run(Self::configure_args(invocation), invocation)?;

        tracing::info!("Building CMake project");
        self.run(Self::build_args(invocation), invocation)
    }

    fn install(&self, invocation: &BuildInvocation) -> Result<(), ProcessFailure> {
        tracing::info!("Installing into {}", invocation.package_folder.display());
        self.run(Self::install_args(invocation), invocation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::generator::CMakeGenerator;
    use crate::core::platform::{Arch, BuildType, Os, PlatformContext};

    fn invocation(platform: &PlatformContext) -> BuildInvocation {
        BuildInvocation {
            source_folder: PathBuf::from("/src/finalmq"),
            build_folder: PathBuf::from("/src/finalmq/build/Release"),
            package_folder: PathBuf::from("/src/finalmq/build/Release/package"),
            toolchain_file: PathBuf::from(
                "/src/finalmq/build/Release/generators/fmq_toolchain.cmake",
            ),
            generator: CMakeGenerator::for_platform(platform),
            build_type: BuildType::Release,
            jobs: None,
            verbose: false,
        }
    }

    #[test]
    fn test_single_config_args() {
        let platform = PlatformContext::new(Os::Linux, Arch::X86_64);
        let inv = invocation(&platform).with_jobs(Some(8));

        let configure = CMakeBuildSystem::configure_args(&inv);
        assert_eq!(&configure[..6], &[
            "-S",
            "/src/finalmq",
            "-B",
            "/src/finalmq/build/Release",
            "-G",
            "Unix Makefiles"
        ]);
        assert!(configure.contains(
            &"-DCMAKE_TOOLCHAIN_FILE=/src/finalmq/build/Release/generators/fmq_toolchain.cmake"
                .to_string()
        ));
        assert!(configure.contains(&"-DCMAKE_BUILD_TYPE=Release".to_string()));

        let build = CMakeBuildSystem::build_args(&inv);
        assert_eq!(build, vec!["--build", "/src/finalmq/build/Release", "--parallel", "8"]);

        let install = CMakeBuildSystem::install_args(&inv);
        assert_eq!(install, vec![
            "--install",
            "/src/finalmq/build/Release",
            "--prefix",
            "/src/finalmq/build/Release/package"
        ]);
    }

    #[test]
    fn test_multi_config_args() {
        let platform = PlatformContext::new(Os::Windows, Arch::X86);
        let inv = invocation(&platform).with_verbose(true);

        let configure = CMakeBuildSystem::configure_args(&inv);
        assert!(configure.contains(&"-A".to_string()));
        assert!(configure.contains(&"Win32".to_string()));
        assert!(!configure.iter().any(|a| a.starts_with("-DCMAKE_BUILD_TYPE")));

        let build = CMakeBuildSystem::build_args(&inv);
        assert!(build.windows(2).any(|w| w == ["--config", "Release"]));
        assert_eq!(build.last().map(String::as_str), Some("--verbose"));

        let install = CMakeBuildSystem::install_args(&inv);
        assert!(install.windows(2).any(|w| w == ["--config", "Release"]));
    }

    #[test]
    fn test_locate_prefers_configured_path() {
        let cmake = CMakeBuildSystem::locate(Some(Path::new("/opt/cmake/bin/cmake")));
        assert_eq!(cmake.program(), Path::new("/opt/cmake/bin/cmake"));
        assert_eq!(cmake.name(), "cmake");
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_build_keeps_tool_output() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().unwrap();
        let fake = tmp.path().join("cmake");
        std::fs::write(
            &fake,
            "#!/bin/sh\nif [ \"$1\" = \"--build\" ]; then echo 'error: no rule' >&2; exit 2; fi\n",
        )
        .unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();

        let platform = PlatformContext::new(Os::Linux, Arch::X86_64);
        let mut inv = invocation(&platform);
        inv.source_folder = tmp.path().to_path_buf();

        let failure = CMakeBuildSystem::new(&fake).build(&inv).unwrap_err();
        assert_eq!(failure.status, Some(2));
        assert_eq!(failure.stderr, "error: no rule\n");
    }
}
