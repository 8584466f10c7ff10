//! A single cell of the build matrix.

use std::fmt;

use super::platform::{AppPlatform, Arch, Configuration};

/// One (app platform, architecture, configuration) build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BuildJob {
    pub app_platform: AppPlatform,
    pub arch: Arch,
    pub configuration: Configuration,
}

impl BuildJob {
    pub fn new(app_platform: AppPlatform, arch: Arch, configuration: Configuration) -> Self {
        BuildJob {
            app_platform,
            arch,
            configuration,
        }
    }

    /// The job that builds the host compiler (`hermesc`) used when
    /// cross-compiling or targeting UWP.
    pub fn host_compiler() -> Self {
        BuildJob::new(AppPlatform::Win32, Arch::X64, Configuration::Release)
    }

    /// Directory name identifying this job, e.g. `uwp-arm64-debug`.
    pub fn triplet(&self) -> String {
        format!("{}-{}-{}", self.app_platform, self.arch, self.configuration)
    }

    pub fn is_uwp(&self) -> bool {
        self.app_platform.is_uwp()
    }

    /// UWP and ARM64 builds run `hermesc` produced by a native x64 build.
    pub fn needs_host_compiler(&self) -> bool {
        self.is_uwp() || self.arch.is_arm64()
    }

    /// CMake target to build; `None` builds everything.
    pub fn cmake_target(&self) -> Option<&'static str> {
        if self.is_uwp() {
            Some("libshared")
        } else {
            None
        }
    }
}

impl fmt::Display for BuildJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.triplet())
    }
}
