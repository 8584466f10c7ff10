//! Resolution of raw command-line values into validated build options.
//!
//! The CLI layer collects strings; this module lowercases them, checks each
//! enumerated value against its valid set and fills in defaults. Nothing
//! here touches the filesystem.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use super::job::BuildJob;
use super::layout::{OutputLayout, SourceLayout};
use super::platform::{AppPlatform, Arch, Configuration};

/// Default package semantic version; also marks canary builds.
pub const DEFAULT_SEMANTIC_VERSION: &str = "0.0.0";

/// File version meaning "not set by the pipeline".
pub const UNSET_FILE_VERSION: &str = "0.0.0.0";

/// Error raised while validating command-line values.
#[derive(Debug, Error)]
pub enum OptionError {
    #[error("Invalid value for {key}: {value}\nValid values are: {}", .valid.join(", "))]
    Invalid {
        key: &'static str,
        value: String,
        valid: &'static [&'static str],
    },
}

/// Which build stages run for every job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stages {
    pub configure: bool,
    pub build: bool,
    pub test: bool,
    pub pack: bool,
}

impl Default for Stages {
    fn default() -> Self {
        Stages {
            configure: false,
            build: true,
            test: false,
            pack: false,
        }
    }
}

/// Selective cleanup requested before building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CleanFlags {
    /// Delete the whole output directory.
    pub all: bool,
    /// Delete each targeted job's build directory.
    pub build: bool,
    /// Delete the host compiler build.
    pub tools: bool,
    /// Delete `pkg-staging` and `pkg`.
    pub pkg: bool,
}

/// Unvalidated values as collected from the command line.
#[derive(Debug, Clone, Default)]
pub struct RawOptions {
    pub app_platform: Option<String>,
    /// Shorthand for `--app-platform uwp`; wins when both are given.
    pub uwp: bool,
    pub platforms: Vec<String>,
    pub configurations: Vec<String>,
    pub sources_path: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
    pub semantic_version: Option<String>,
    pub file_version: Option<String>,
    pub windows_sdk_version: Option<String>,
    pub stages: Stages,
    pub clean: CleanFlags,
    pub fake_build: bool,
}

/// Fully resolved options for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub app_platform: AppPlatform,
    pub platforms: Vec<Arch>,
    pub configurations: Vec<Configuration>,
    pub sources_path: PathBuf,
    pub output_path: PathBuf,
    pub semantic_version: String,
    pub file_version: String,
    pub windows_sdk_version: String,
    pub stages: Stages,
    pub clean: CleanFlags,
    pub fake_build: bool,
}

impl BuildOptions {
    /// Cartesian product of platforms and configurations, platform-major.
    ///
    /// Repeated values collapse so that no two jobs share a build directory.
    pub fn jobs(&self) -> Vec<BuildJob> {
        let mut jobs: Vec<BuildJob> = Vec::new();
        for &arch in &self.platforms {
            for &configuration in &self.configurations {
                let job = BuildJob::new(self.app_platform, arch, configuration);
                if !jobs.contains(&job) {
                    jobs.push(job);
                }
            }
        }
        jobs
    }

    pub fn output(&self) -> OutputLayout {
        OutputLayout::new(&self.output_path)
    }

    pub fn sources(&self) -> SourceLayout {
        SourceLayout::new(&self.sources_path)
    }

    /// Whether the pipeline supplied a real file version.
    pub fn has_file_version(&self) -> bool {
        let fv = self.file_version.trim();
        !fv.is_empty() && fv != UNSET_FILE_VERSION
    }

    pub fn is_uwp(&self) -> bool {
        self.app_platform.is_uwp()
    }
}

/// Validate and default raw options. Relative paths resolve against `cwd`.
pub fn resolve(raw: RawOptions, cwd: &Path) -> Result<BuildOptions, OptionError> {
    let app_platform = if raw.uwp {
        AppPlatform::Uwp
    } else {
        match raw.app_platform {
            Some(value) => parse_one("app-platform", &value, AppPlatform::VALID)?,
            None => AppPlatform::default(),
        }
    };

    let platforms = parse_many("platform", &raw.platforms, Arch::VALID)?;
    let platforms = if platforms.is_empty() {
        vec![Arch::X64]
    } else {
        platforms
    };

    let configurations = parse_many("configuration", &raw.configurations, Configuration::VALID)?;
    let configurations = if configurations.is_empty() {
        vec![Configuration::Release]
    } else {
        configurations
    };

    let sources_path = absolutize(raw.sources_path.unwrap_or_else(|| cwd.to_path_buf()), cwd);
    let output_path = match raw.output_path {
        Some(path) => absolutize(path, cwd),
        None => sources_path.join("out"),
    };

    Ok(BuildOptions {
        app_platform,
        platforms,
        configurations,
        sources_path,
        output_path,
        semantic_version: fold(raw.semantic_version, DEFAULT_SEMANTIC_VERSION),
        file_version: fold(raw.file_version, UNSET_FILE_VERSION),
        windows_sdk_version: fold(raw.windows_sdk_version, ""),
        stages: raw.stages,
        clean: raw.clean,
        fake_build: raw.fake_build,
    })
}

fn parse_one<T: FromStr>(
    key: &'static str,
    value: &str,
    valid: &'static [&'static str],
) -> Result<T, OptionError> {
    let value = value.trim().to_lowercase();
    value.parse::<T>().map_err(|_| OptionError::Invalid {
        key,
        value,
        valid,
    })
}

/// Parse a repeatable option. Each occurrence may also hold a
/// comma-separated list.
fn parse_many<T: FromStr>(
    key: &'static str,
    values: &[String],
    valid: &'static [&'static str],
) -> Result<Vec<T>, OptionError> {
    values
        .iter()
        .flat_map(|v| v.split(','))
        .map(|v| parse_one(key, v, valid))
        .collect()
}

fn fold(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_lowercase())
        .unwrap_or_else(|| default.to_string())
}

fn absolutize(path: PathBuf, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}
