//! CMake/Ninja invocations for one build job.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::executor::CommandRunner;
use crate::builder::toolchain::vcvars_args;
use crate::core::job::BuildJob;
use crate::core::platform::Arch;
use crate::util::fs::ensure_dir;
use crate::util::process::ProcessBuilder;

/// Compiler flag selecting the ARM64EC ABI.
const ARM64EC_FLAG: &str = "-arm64EC";

/// Settings shared by every job of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CMakeSettings {
    /// Hermes checkout containing the top-level CMakeLists.txt
    pub sources: PathBuf,
    /// Import file exported by the host compiler build
    pub import_hermesc: PathBuf,
    /// Version stamped into binaries; `None` leaves the CMake default
    pub file_version: Option<String>,
    /// Windows SDK version; empty selects the toolchain default
    pub windows_sdk_version: String,
}

/// Configure, build and test commands for a job in a build directory.
pub struct CMakeBuilder<'a> {
    settings: &'a CMakeSettings,
    job: BuildJob,
    build_dir: PathBuf,
    target: Option<String>,
}

impl<'a> CMakeBuilder<'a> {
    pub fn new(settings: &'a CMakeSettings, job: BuildJob, build_dir: PathBuf) -> Self {
        CMakeBuilder {
            settings,
            job,
            build_dir,
            target: job.cmake_target().map(str::to_string),
        }
    }

    /// Override the target to build (`None` builds everything).
    pub fn target(mut self, target: Option<&str>) -> Self {
        self.target = target.map(str::to_string);
        self
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// Arguments for the generation step, without the program name.
    pub fn configure_args(&self) -> Vec<String> {
        let mut args = vec![
            "-G".to_string(),
            "Ninja".to_string(),
            format!(
                "-DCMAKE_BUILD_TYPE={}",
                self.job.configuration.cmake_build_type()
            ),
            "-DHERMESVM_PLATFORM_LOGGING=ON".to_string(),
        ];

        if let Some(ref file_version) = self.settings.file_version {
            args.push(format!("-DHERMES_FILE_VERSION={}", file_version));
        }

        args.push("-DHERMES_ENABLE_DEBUGGER=ON".to_string());
        args.push("-DHERMES_ENABLE_INTL=ON".to_string());
        args.push(format!(
            "-DHERMES_MSVC_USE_PLATFORM_UNICODE_WINGLOB={}",
            if self.job.is_uwp() { "OFF" } else { "ON" }
        ));

        let import_hermesc = format!(
            "-DIMPORT_HERMESC={}",
            self.settings.import_hermesc.display()
        );
        if self.job.is_uwp() {
            args.push("-DCMAKE_SYSTEM_NAME=WindowsStore".to_string());
            args.push(format!(
                "-DCMAKE_SYSTEM_VERSION={}",
                self.settings.windows_sdk_version
            ));
            args.push(import_hermesc);
        } else if self.job.arch.is_arm64() {
            args.push("-DHERMES_MSVC_ARM64=ON".to_string());
            args.push(import_hermesc);
        }

        args.push(self.settings.sources.display().to_string());
        args
    }

    pub fn configure_command(&self) -> ProcessBuilder {
        self.in_build_dir(ProcessBuilder::new("cmake").args(self.configure_args()))
    }

    pub fn build_command(&self) -> ProcessBuilder {
        let mut cmd = ProcessBuilder::new("cmake").args(["--build", "."]);
        if let Some(ref target) = self.target {
            cmd = cmd.arg("--target").arg(target);
        }
        self.in_build_dir(cmd)
    }

    pub fn test_command(&self) -> ProcessBuilder {
        self.in_build_dir(ProcessBuilder::new("ctest").arg("--output-on-failure"))
    }

    pub fn vcvars_args(&self) -> Vec<String> {
        vcvars_args(&self.job, &self.settings.windows_sdk_version)
    }

    /// Generate the Ninja build in the build directory.
    pub fn configure(&self, runner: &dyn CommandRunner) -> Result<()> {
        ensure_dir(&self.build_dir)?;
        runner.run_in_toolchain(&self.vcvars_args(), &self.configure_command())
    }

    /// Build, configuring first when the build directory does not exist.
    pub fn build(&self, runner: &dyn CommandRunner) -> Result<()> {
        if !self.build_dir.exists() {
            self.configure(runner)?;
        }
        runner.run_in_toolchain(&self.vcvars_args(), &self.build_command())
    }

    /// Run the CTest suite of an existing build.
    pub fn test(&self, runner: &dyn CommandRunner) -> Result<()> {
        ensure_dir(&self.build_dir)?;
        runner.run_in_toolchain(&self.vcvars_args(), &self.test_command())
    }

    fn in_build_dir(&self, cmd: ProcessBuilder) -> ProcessBuilder {
        let cmd = cmd.cwd(&self.build_dir);
        if self.job.arch == Arch::Arm64ec {
            cmd.env("CFLAGS", ARM64EC_FLAG).env("CXXFLAGS", ARM64EC_FLAG)
        } else {
            cmd
        }
    }
}
