//! Subprocess execution utilities.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output, Stdio};

use anyhow::{Context, Result};
use thiserror::Error;

/// A child process that ran but did not succeed.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("`{command}` failed with exit code {code}")]
    Failed { command: String, code: i32 },

    #[error("`{command}` was terminated by a signal")]
    Terminated { command: String },
}

impl ProcessError {
    /// Exit code the orchestrator should terminate with.
    pub fn exit_code(&self) -> i32 {
        match self {
            ProcessError::Failed { code, .. } => *code,
            ProcessError::Terminated { .. } => 1,
        }
    }

    pub(crate) fn from_status(command: String, status: ExitStatus) -> Self {
        match status.code() {
            Some(code) => ProcessError::Failed { command, code },
            None => ProcessError::Terminated { command },
        }
    }
}

/// Builder for subprocess execution.
///
/// Working directory and environment overrides apply to the child only;
/// the orchestrator's own process state is never changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    env: BTreeMap<String, String>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            env: BTreeMap::new(),
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set an environment variable.
    pub fn env(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.env
            .insert(key.as_ref().to_string(), value.as_ref().to_string());
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Get the program path.
    pub fn get_program(&self) -> &Path {
        &self.program
    }

    /// Get the arguments.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Get the environment overrides.
    pub fn get_envs(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Get the working directory.
    pub fn get_cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Build the Command.
    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Execute the command with captured output and wait for completion.
    pub fn exec(&self) -> Result<Output> {
        let mut cmd = self.build_command();
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let output = cmd
            .output()
            .with_context(|| format!("failed to execute `{}`", self.program.display()))?;

        Ok(output)
    }

    /// Execute with captured output and require success.
    pub fn exec_and_check(&self) -> Result<Output> {
        let output = self.exec()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !stderr.trim().is_empty() {
                tracing::error!("{}", stderr.trim());
            }
            return Err(ProcessError::from_status(self.display_command(), output.status).into());
        }
        Ok(output)
    }

    /// Execute with inherited stdio and return status only.
    pub fn status(&self) -> Result<ExitStatus> {
        let mut cmd = self.build_command();
        let status = cmd
            .status()
            .with_context(|| format!("failed to execute `{}`", self.program.display()))?;
        Ok(status)
    }

    /// Execute with inherited stdio and require success.
    pub fn run(&self) -> Result<()> {
        let status = self.status()?;
        if !status.success() {
            return Err(ProcessError::from_status(self.display_command(), status).into());
        }
        Ok(())
    }

    /// Display the command for log and error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }

    /// Render as a line for a `cmd.exe` batch file.
    pub fn to_command_line(&self) -> String {
        let mut parts = vec![quote_arg(&self.program.to_string_lossy())];
        parts.extend(self.args.iter().map(|a| quote_arg(a)));
        parts.join(" ")
    }
}

/// Characters that `cmd.exe` interprets outside of double quotes.
const CMD_SPECIAL: &[char] = &['"', '&', '|', '<', '>', '^', '%', '(', ')'];

/// Quote an argument for a `cmd.exe` batch line.
///
/// Empty arguments and arguments containing whitespace or shell
/// metacharacters are wrapped in double quotes. `%` is doubled because
/// batch files expand variables even inside quotes.
pub fn quote_arg(arg: &str) -> String {
    let needs_quotes = arg.is_empty()
        || arg
            .chars()
            .any(|c| c.is_whitespace() || CMD_SPECIAL.contains(&c));
    if !needs_quotes {
        return arg.to_string();
    }
    let escaped = arg.replace('"', "\"\"").replace('%', "%%");
    format!("\"{}\"", escaped)
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_command() {
        let pb = ProcessBuilder::new("cmake").args(["--build", ".", "--target", "hermesc"]);

        assert_eq!(pb.display_command(), "cmake --build . --target hermesc");
    }

    #[test]
    fn test_command_line_quotes_spaces() {
        let pb = ProcessBuilder::new("cmake")
            .arg("-DIMPORT_HERMESC=C:\\Program Files\\out\\tools\\ImportHermesc.cmake")
            .arg("-DCMAKE_SYSTEM_VERSION=")
            .arg("");

        assert_eq!(
            pb.to_command_line(),
            "cmake \"-DIMPORT_HERMESC=C:\\Program Files\\out\\tools\\ImportHermesc.cmake\" \
             -DCMAKE_SYSTEM_VERSION= \"\""
        );
    }

    #[test]
    fn test_command_line_quotes_cmd_metacharacters() {
        let pb = ProcessBuilder::new("cmake")
            .arg(r"C:\src\R&D\hermes")
            .arg("-DPATH=a|b")
            .arg("x<y>z")
            .arg("caret^")
            .arg("(group)")
            .arg("-DFLAGS=%PATH%")
            .arg("say\"hi\"");

        assert_eq!(
            pb.to_command_line(),
            r#"cmake "C:\src\R&D\hermes" "-DPATH=a|b" "x<y>z" "caret^" "(group)" "-DFLAGS=%%PATH%%" "say""hi""""#
        );
    }

    #[test]
    fn test_plain_args_are_not_quoted() {
        assert_eq!(quote_arg("-DCMAKE_BUILD_TYPE=Release"), "-DCMAKE_BUILD_TYPE=Release");
        assert_eq!(quote_arg(r"C:\out\build"), r"C:\out\build");
    }

    #[test]
    fn test_env_and_cwd_are_recorded() {
        let pb = ProcessBuilder::new("cmake")
            .env("CFLAGS", "-arm64EC")
            .cwd("/out/build");

        assert_eq!(pb.get_envs().get("CFLAGS").map(String::as_str), Some("-arm64EC"));
        assert_eq!(pb.get_cwd(), Some(Path::new("/out/build")));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_reports_exit_code() {
        let err = ProcessBuilder::new("sh")
            .args(["-c", "exit 3"])
            .run()
            .unwrap_err();
        let process_err = err.downcast_ref::<ProcessError>().unwrap();
        assert_eq!(process_err.exit_code(), 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_exec_captures_stdout() {
        let output = ProcessBuilder::new("echo").arg("hello").exec().unwrap();

        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stdout).contains("hello"));
    }
}
