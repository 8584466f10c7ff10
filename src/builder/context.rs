//! Everything a build operation needs, threaded explicitly.

use std::path::PathBuf;

use crate::builder::cmake::CMakeSettings;
use crate::builder::executor::CommandRunner;
use crate::core::layout::{OutputLayout, SourceLayout};
use crate::core::options::BuildOptions;
use crate::util::config::Config;
use crate::util::shell::Shell;

/// Shared state for one orchestrator invocation.
pub struct BuildContext<'a> {
    pub options: &'a BuildOptions,
    pub config: &'a Config,
    pub runner: &'a dyn CommandRunner,
    pub shell: &'a Shell,
    /// Location of `%SystemRoot%`, source of fake-build placeholders.
    pub system_root: Option<PathBuf>,
}

impl<'a> BuildContext<'a> {
    pub fn new(
        options: &'a BuildOptions,
        config: &'a Config,
        runner: &'a dyn CommandRunner,
        shell: &'a Shell,
    ) -> Self {
        BuildContext {
            options,
            config,
            runner,
            shell,
            system_root: std::env::var_os("SystemRoot").map(PathBuf::from),
        }
    }

    /// Override where placeholder binaries are taken from.
    pub fn with_system_root(mut self, system_root: Option<PathBuf>) -> Self {
        self.system_root = system_root;
        self
    }

    pub fn output(&self) -> OutputLayout {
        self.options.output()
    }

    pub fn sources(&self) -> SourceLayout {
        self.options.sources()
    }

    pub fn cmake_settings(&self) -> CMakeSettings {
        CMakeSettings {
            sources: self.options.sources_path.clone(),
            import_hermesc: self.output().import_hermesc(),
            file_version: self
                .options
                .has_file_version()
                .then(|| self.options.file_version.clone()),
            windows_sdk_version: self.options.windows_sdk_version.clone(),
        }
    }
}
