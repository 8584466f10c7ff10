//! MSVC toolchain discovery.
//!
//! Visual Studio is located with `vswhere.exe`; every toolchain command
//! then runs after `vcvarsall.bat` has set up the developer environment
//! for the job's target architecture and app platform.

use std::cell::OnceCell;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;

use crate::core::job::BuildJob;
use crate::util::process::{quote_arg, ProcessBuilder};

/// Spectre-mitigated libraries are always linked.
pub const SPECTRE_FLAG: &str = "-vcvars_spectre_libs=spectre";

/// Errors locating Visual Studio.
#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("Could not find vswhere.exe at {}", .0.display())]
    VsWhereNotFound(PathBuf),

    #[error("Could not find vswhere.exe: neither ProgramFiles(x86) nor ProgramFiles is set")]
    ProgramFilesNotSet,

    #[error("vswhere found no Visual Studio installation matching version {0}")]
    NoInstallation(String),

    #[error(
        "Could not find vcvarsall.bat at expected Visual Studio installation path: {}",
        .0.display()
    )]
    VcVarsNotFound(PathBuf),
}

/// One entry of `vswhere -format json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VsInstance {
    pub installation_path: PathBuf,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Default vswhere location, derived from `ProgramFiles(x86)` with a
/// fallback to `ProgramFiles`.
pub fn default_vswhere_path(env: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    let program_files = env("ProgramFiles(x86)")
        .filter(|v| !v.is_empty())
        .or_else(|| env("ProgramFiles").filter(|v| !v.is_empty()))?;
    Some(
        PathBuf::from(program_files)
            .join("Microsoft Visual Studio")
            .join("Installer")
            .join("vswhere.exe"),
    )
}

/// Parse the JSON array printed by `vswhere -format json`.
pub fn parse_instances(json: &str) -> Result<Vec<VsInstance>> {
    serde_json::from_str(json).context("failed to parse vswhere output")
}

/// Pick the first installation, warning when there is a choice.
pub fn select_instance<'a>(instances: &'a [VsInstance], version: &str) -> Result<&'a VsInstance> {
    if instances.len() > 1 {
        tracing::warn!("More than one VS install detected, picking the first one");
    }
    instances
        .first()
        .ok_or_else(|| ToolchainError::NoInstallation(version.to_string()).into())
}

/// `vcvarsall.bat` inside a Visual Studio installation.
pub fn vcvarsall_path(installation_path: &Path) -> PathBuf {
    installation_path
        .join("VC")
        .join("Auxiliary")
        .join("Build")
        .join("vcvarsall.bat")
}

/// Arguments passed to `vcvarsall.bat` for a job.
///
/// Order: architecture pair, optional `uwp`, optional SDK version, then
/// the Spectre flag.
pub fn vcvars_args(job: &BuildJob, windows_sdk_version: &str) -> Vec<String> {
    let mut args = vec![job.arch.vcvars_pair().to_string()];
    if job.is_uwp() {
        args.push("uwp".to_string());
    }
    if !windows_sdk_version.is_empty() {
        args.push(windows_sdk_version.to_string());
    }
    args.push(SPECTRE_FLAG.to_string());
    args
}

/// Batch script that enters the developer environment and runs `command`.
///
/// Written to a temporary file and run with `cmd /d /c` so that quoting of
/// the command line stays under our control.
pub fn env_script(vcvarsall: &Path, vcvars_args: &[String], command: &ProcessBuilder) -> String {
    format!(
        "@echo off\r\n\
         call {} {}\r\n\
         if errorlevel 1 exit /b %errorlevel%\r\n\
         {} 2>&1\r\n\
         exit /b %errorlevel%\r\n",
        quote_arg(&vcvarsall.to_string_lossy()),
        vcvars_args
            .iter()
            .map(|a| quote_arg(a))
            .collect::<Vec<_>>()
            .join(" "),
        command.to_command_line()
    )
}

/// Locates `vcvarsall.bat` once per process and caches the result.
#[derive(Debug, Default)]
pub struct ToolchainLocator {
    vswhere: Option<PathBuf>,
    vs_version: String,
    vcvarsall: OnceCell<PathBuf>,
}

impl ToolchainLocator {
    /// `vswhere` overrides the default install location.
    pub fn new(vswhere: Option<PathBuf>, vs_version: impl Into<String>) -> Self {
        ToolchainLocator {
            vswhere,
            vs_version: vs_version.into(),
            vcvarsall: OnceCell::new(),
        }
    }

    /// Path to `vcvarsall.bat`, running discovery on first use.
    pub fn vcvarsall(&self) -> Result<&Path> {
        if let Some(path) = self.vcvarsall.get() {
            return Ok(path);
        }
        let path = self.locate()?;
        tracing::debug!("Using vcvarsall.bat at {}", path.display());
        Ok(self.vcvarsall.get_or_init(|| path))
    }

    fn locate(&self) -> Result<PathBuf> {
        let vswhere = match &self.vswhere {
            Some(path) => path.clone(),
            None => default_vswhere_path(|key| std::env::var(key).ok())
                .ok_or(ToolchainError::ProgramFilesNotSet)?,
        };
        if !vswhere.exists() {
            return Err(ToolchainError::VsWhereNotFound(vswhere).into());
        }
        tracing::debug!("Found vswhere at: {}", vswhere.display());

        let output = ProcessBuilder::new(&vswhere)
            .args(["-format", "json", "-version", &self.vs_version])
            .exec_and_check()?;
        let instances = parse_instances(&String::from_utf8_lossy(&output.stdout))?;
        let instance = select_instance(&instances, &self.vs_version)?;
        tracing::debug!(
            "Found Visual Studio at: {}",
            instance.installation_path.display()
        );

        let vcvarsall = vcvarsall_path(&instance.installation_path);
        if !vcvarsall.exists() {
            return Err(ToolchainError::VcVarsNotFound(vcvarsall).into());
        }
        Ok(vcvarsall)
    }
}
