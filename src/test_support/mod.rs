//! Test utilities and mocks for hermes-build unit tests.
//!
//! [`RecordingRunner`] stands in for the system runner: it records every
//! command instead of spawning it, can be told to fail commands matching a
//! pattern, and can simulate the files a real build would leave behind.
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::test_support::RecordingRunner;
//!
//! let runner = RecordingRunner::new().fail_on("ctest", 8);
//! // ... drive a build through `&runner` ...
//! assert_eq!(runner.lines()[0], "cmake --build .");
//! ```

pub mod fixtures;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Result;

use crate::builder::executor::CommandRunner;
use crate::util::process::{ProcessBuilder, ProcessError};

pub use fixtures::*;

/// One command seen by a [`RecordingRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCommand {
    /// Program and arguments joined by spaces.
    pub line: String,
    pub cwd: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
    /// vcvarsall arguments, or `None` for commands run outside the toolchain.
    pub vcvars: Option<Vec<String>>,
}

/// A command pattern that makes the runner report a failure.
#[derive(Debug, Clone)]
struct Failure {
    contains: String,
    code: i32,
}

/// Mock [`CommandRunner`] that records instead of executing.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<RecordedCommand>>,
    failures: Vec<Failure>,
    simulate_outputs: bool,
}

impl RecordingRunner {
    /// Create a runner that accepts every command.
    pub fn new() -> Self {
        RecordingRunner::default()
    }

    /// Fail commands whose line contains `contains` with exit `code`.
    pub fn fail_on(mut self, contains: &str, code: i32) -> Self {
        self.failures.push(Failure {
            contains: contains.to_string(),
            code,
        });
        self
    }

    /// Write the files a real `cmake --build` would produce into the
    /// command's working directory.
    pub fn with_build_outputs(mut self) -> Self {
        self.simulate_outputs = true;
        self
    }

    /// All recorded commands in order.
    pub fn calls(&self) -> Vec<RecordedCommand> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Command lines of all recorded commands.
    pub fn lines(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.line).collect()
    }

    /// Number of recorded commands whose line contains `needle`.
    pub fn count(&self, needle: &str) -> usize {
        self.lines().iter().filter(|l| l.contains(needle)).count()
    }

    fn record(&self, cmd: &ProcessBuilder, vcvars: Option<&[String]>) -> Result<()> {
        let line = cmd.display_command();
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCommand {
                line: line.clone(),
                cwd: cmd.get_cwd().map(PathBuf::from),
                env: cmd.get_envs().clone(),
                vcvars: vcvars.map(<[String]>::to_vec),
            });
        }

        if let Some(failure) = self.failures.iter().find(|f| line.contains(&f.contains)) {
            return Err(ProcessError::Failed {
                command: line,
                code: failure.code,
            }
            .into());
        }

        if self.simulate_outputs && line.starts_with("cmake --build") {
            if let Some(cwd) = cmd.get_cwd() {
                if line.ends_with("--target hermesc") {
                    write_host_compiler(cwd);
                } else {
                    write_build_outputs(cwd);
                }
            }
        }
        Ok(())
    }
}

impl CommandRunner for RecordingRunner {
    fn run_in_toolchain(&self, vcvars_args: &[String], cmd: &ProcessBuilder) -> Result<()> {
        self.record(cmd, Some(vcvars_args))
    }

    fn run(&self, cmd: &ProcessBuilder) -> Result<()> {
        self.record(cmd, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_records_commands() {
        let runner = RecordingRunner::new();
        let cmd = ProcessBuilder::new("cmake")
            .args(["--build", "."])
            .cwd("/out/build")
            .env("CFLAGS", "-arm64EC");
        runner
            .run_in_toolchain(&["x64".to_string()], &cmd)
            .unwrap();
        runner.run(&ProcessBuilder::new("nuget").arg("pack")).unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].line, "cmake --build .");
        assert_eq!(calls[0].cwd, Some(PathBuf::from("/out/build")));
        assert_eq!(calls[0].env.get("CFLAGS").map(String::as_str), Some("-arm64EC"));
        assert_eq!(calls[0].vcvars, Some(vec!["x64".to_string()]));
        assert_eq!(calls[1].vcvars, None);
        assert_eq!(runner.count("nuget"), 1);
    }

    #[test]
    fn test_fail_on_returns_process_error() {
        let runner = RecordingRunner::new().fail_on("ctest", 8);
        let err = runner
            .run(&ProcessBuilder::new("ctest").arg("--output-on-failure"))
            .unwrap_err();
        let process = err.downcast_ref::<ProcessError>().unwrap();
        assert_eq!(process.exit_code(), 8);
        assert_eq!(runner.lines(), ["ctest --output-on-failure"]);
    }

    #[test]
    fn test_simulated_outputs() {
        let tmp = TempDir::new().unwrap();
        let runner = RecordingRunner::new().with_build_outputs();
        let tools = tmp.path().join("tools");
        let build = tmp.path().join("build");

        runner
            .run_in_toolchain(
                &[],
                &ProcessBuilder::new("cmake")
                    .args(["--build", ".", "--target", "hermesc"])
                    .cwd(&tools),
            )
            .unwrap();
        runner
            .run_in_toolchain(&[], &ProcessBuilder::new("cmake").args(["--build", "."]).cwd(&build))
            .unwrap();

        assert!(tools.join("bin").join("hermesc.exe").exists());
        assert!(!tools.join("API").exists());
        assert!(build.join("API/hermes_shared/hermes.dll").exists());
    }
}
