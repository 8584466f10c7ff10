//! Directory layout of the output tree and the Hermes source tree.

use std::path::{Path, PathBuf};

use super::job::BuildJob;

/// Name of the host compiler binary produced in the tools build.
pub const HOST_COMPILER_EXE: &str = "hermesc.exe";

/// CMake import file the cross builds use to locate the host compiler.
pub const IMPORT_HERMESC_CMAKE: &str = "ImportHermesc.cmake";

/// Output root and its fixed sub-directories.
///
/// ```text
/// <root>/
///   build/<app>-<arch>-<config>/
///   tools/
///   pkg-staging/
///   pkg/
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        OutputLayout { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn build(&self) -> PathBuf {
        self.root.join("build")
    }

    /// Build directory for the host compiler.
    pub fn tools(&self) -> PathBuf {
        self.root.join("tools")
    }

    pub fn pkg_staging(&self) -> PathBuf {
        self.root.join("pkg-staging")
    }

    pub fn pkg(&self) -> PathBuf {
        self.root.join("pkg")
    }

    /// Unique build directory for a job.
    pub fn build_dir(&self, job: &BuildJob) -> PathBuf {
        self.build().join(job.triplet())
    }

    pub fn host_compiler(&self) -> PathBuf {
        self.tools().join("bin").join(HOST_COMPILER_EXE)
    }

    pub fn import_hermesc(&self) -> PathBuf {
        self.tools().join(IMPORT_HERMESC_CMAKE)
    }

    pub fn staging(&self, job: &BuildJob) -> StagingPaths {
        let staging = self.pkg_staging();
        StagingPaths {
            lib: staging
                .join("lib")
                .join("native")
                .join(job.app_platform.as_str())
                .join(job.configuration.as_str())
                .join(job.arch.as_str()),
            tools: staging
                .join("tools")
                .join("native")
                .join(job.configuration.as_str())
                .join(job.arch.as_str()),
        }
    }
}

/// Per-job destinations inside the staging tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingPaths {
    /// `lib/native/<app>/<config>/<arch>`
    pub lib: PathBuf,
    /// `tools/native/<config>/<arch>`
    pub tools: PathBuf,
}

/// Well-known locations inside a Hermes checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLayout {
    root: PathBuf,
}

impl SourceLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        SourceLayout { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cmake_lists(&self) -> PathBuf {
        self.root.join("CMakeLists.txt")
    }

    pub fn npm_package_json(&self) -> PathBuf {
        self.root.join("npm").join("package.json")
    }

    fn api(&self) -> PathBuf {
        self.root.join("API")
    }

    pub fn jsi_headers(&self) -> PathBuf {
        self.api().join("jsi").join("jsi")
    }

    pub fn hermes_shared(&self) -> PathBuf {
        self.api().join("hermes_shared")
    }

    pub fn node_api_headers(&self) -> PathBuf {
        self.hermes_shared().join("node-api")
    }

    /// NuGet manifest, MSBuild integration files and NOTICE.
    pub fn nuget(&self) -> PathBuf {
        self.root.join(".ado").join("Nuget")
    }

    /// Sources dropped from release builds for component governance.
    pub fn unsupported_juno(&self) -> PathBuf {
        self.root.join("unsupported").join("juno")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::platform::{AppPlatform, Arch, Configuration};

    #[test]
    fn test_output_layout() {
        let layout = OutputLayout::new("/out");
        assert_eq!(layout.build(), Path::new("/out/build"));
        assert_eq!(layout.tools(), Path::new("/out/tools"));
        assert_eq!(layout.pkg_staging(), Path::new("/out/pkg-staging"));
        assert_eq!(layout.pkg(), Path::new("/out/pkg"));
        assert_eq!(layout.host_compiler(), Path::new("/out/tools/bin/hermesc.exe"));
    }

    #[test]
    fn test_build_dir_uses_triplet() {
        let layout = OutputLayout::new("/out");
        let job = BuildJob::new(AppPlatform::Uwp, Arch::X86, Configuration::Debug);
        assert_eq!(layout.build_dir(&job), Path::new("/out/build/uwp-x86-debug"));
    }

    #[test]
    fn test_staging_paths() {
        let layout = OutputLayout::new("/out");
        let job = BuildJob::new(AppPlatform::Win32, Arch::Arm64, Configuration::Release);
        let staging = layout.staging(&job);
        assert_eq!(
            staging.lib,
            Path::new("/out/pkg-staging/lib/native/win32/release/arm64")
        );
        assert_eq!(
            staging.tools,
            Path::new("/out/pkg-staging/tools/native/release/arm64")
        );
    }
}
