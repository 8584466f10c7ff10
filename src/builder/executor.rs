//! Execution of external tools.
//!
//! [`CommandRunner`] is the seam between the orchestration logic and the
//! operating system: the build driver and packager only describe commands,
//! and the runner decides how they are executed. [`SystemRunner`] spawns
//! real processes; tests substitute a recording runner.

use std::io::Write;

use anyhow::{Context, Result};

use crate::builder::toolchain::{env_script, ToolchainLocator};
use crate::util::process::{ProcessBuilder, ProcessError};

/// Runs external commands with inherited stdio.
pub trait CommandRunner {
    /// Run `cmd` inside the MSVC developer environment configured by
    /// `vcvars_args`. Working directory and environment come from `cmd`.
    fn run_in_toolchain(&self, vcvars_args: &[String], cmd: &ProcessBuilder) -> Result<()>;

    /// Run `cmd` directly.
    fn run(&self, cmd: &ProcessBuilder) -> Result<()>;
}

/// Runner that spawns real processes.
#[derive(Debug)]
pub struct SystemRunner {
    locator: ToolchainLocator,
}

impl SystemRunner {
    pub fn new(locator: ToolchainLocator) -> Self {
        SystemRunner { locator }
    }
}

impl CommandRunner for SystemRunner {
    fn run_in_toolchain(&self, vcvars_args: &[String], cmd: &ProcessBuilder) -> Result<()> {
        let vcvarsall = self.locator.vcvarsall()?;
        let script = env_script(vcvarsall, vcvars_args, cmd);

        let mut file = tempfile::Builder::new()
            .prefix("hermes-build-")
            .suffix(".cmd")
            .tempfile()
            .context("failed to create toolchain script")?;
        file.write_all(script.as_bytes())
            .context("failed to write toolchain script")?;
        let script_path = file.into_temp_path();

        tracing::info!(
            "Run command: \"{}\" {} && {}",
            vcvarsall.display(),
            vcvars_args.join(" "),
            cmd.display_command()
        );
        if let Some(cwd) = cmd.get_cwd() {
            tracing::debug!("Working directory: {}", cwd.display());
        }

        let mut shell = ProcessBuilder::new("cmd").arg("/d").arg("/c").arg(&*script_path);
        for (key, value) in cmd.get_envs() {
            shell = shell.env(key, value);
        }
        if let Some(cwd) = cmd.get_cwd() {
            shell = shell.cwd(cwd);
        }

        let status = shell.status()?;
        if !status.success() {
            return Err(ProcessError::from_status(cmd.display_command(), status).into());
        }
        Ok(())
    }

    fn run(&self, cmd: &ProcessBuilder) -> Result<()> {
        tracing::info!("Run command: {}", cmd.display_command());
        cmd.run()
    }
}
