//! Removing output directories and pruning the source tree.

use anyhow::Result;

use crate::core::layout::{OutputLayout, SourceLayout};
use crate::core::options::CleanFlags;
use crate::util::fs::{ensure_dir, remove_dir_all_if_exists};
use crate::util::shell::{Shell, Status};

/// Remove the output root and re-create it empty.
pub fn clean_all(layout: &OutputLayout, shell: &Shell) -> Result<()> {
    shell.status(Status::Cleaning, layout.root().display());
    remove_dir_all_if_exists(layout.root())?;
    ensure_dir(layout.root())
}

/// Remove the host compiler build.
pub fn clean_tools(layout: &OutputLayout, shell: &Shell) -> Result<()> {
    let tools = layout.tools();
    shell.status(Status::Cleaning, tools.display());
    remove_dir_all_if_exists(&tools)
}

/// Remove the staging tree and produced packages.
pub fn clean_pkg(layout: &OutputLayout, shell: &Shell) -> Result<()> {
    for dir in [layout.pkg_staging(), layout.pkg()] {
        shell.status(Status::Cleaning, dir.display());
        remove_dir_all_if_exists(&dir)?;
    }
    Ok(())
}

/// Run the up-front cleanups selected by `flags`.
///
/// Per-job build directories are cleaned by the build matrix instead.
pub fn clean_outputs(layout: &OutputLayout, flags: &CleanFlags, shell: &Shell) -> Result<()> {
    if flags.all {
        clean_all(layout, shell)?;
    }
    if flags.tools {
        clean_tools(layout, shell)?;
    }
    if flags.pkg {
        clean_pkg(layout, shell)?;
    }
    Ok(())
}

/// Delete sources that must not ship in release builds.
///
/// Returns whether anything was removed.
pub fn remove_unused_sources(sources: &SourceLayout, shell: &Shell) -> Result<bool> {
    let juno = sources.unsupported_juno();
    if !juno.exists() {
        return Ok(false);
    }
    shell.status(Status::Removed, juno.display());
    remove_dir_all_if_exists(&juno)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::create_hermes_sources;
    use crate::util::shell::{ColorChoice, Verbosity};
    use std::fs;
    use tempfile::TempDir;

    fn quiet() -> Shell {
        Shell::new(Verbosity::Quiet, ColorChoice::Never)
    }

    fn populated_output(tmp: &TempDir) -> OutputLayout {
        let layout = OutputLayout::new(tmp.path().join("out"));
        for dir in [layout.build(), layout.tools(), layout.pkg_staging(), layout.pkg()] {
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("marker"), "x").unwrap();
        }
        layout
    }

    #[test]
    fn test_clean_all_recreates_root() {
        let tmp = TempDir::new().unwrap();
        let layout = populated_output(&tmp);

        clean_all(&layout, &quiet()).unwrap();
        assert!(layout.root().is_dir());
        assert_eq!(fs::read_dir(layout.root()).unwrap().count(), 0);
    }

    #[test]
    fn test_clean_outputs_is_selective() {
        let tmp = TempDir::new().unwrap();
        let layout = populated_output(&tmp);
        let flags = CleanFlags {
            tools: true,
            pkg: true,
            ..CleanFlags::default()
        };

        clean_outputs(&layout, &flags, &quiet()).unwrap();
        assert!(layout.build().join("marker").exists());
        assert!(!layout.tools().exists());
        assert!(!layout.pkg_staging().exists());
        assert!(!layout.pkg().exists());
    }

    #[test]
    fn test_cleaning_missing_directories_is_noop() {
        let tmp = TempDir::new().unwrap();
        let layout = OutputLayout::new(tmp.path().join("never-created"));
        let flags = CleanFlags {
            tools: true,
            pkg: true,
            ..CleanFlags::default()
        };
        clean_outputs(&layout, &flags, &quiet()).unwrap();
        assert!(!layout.root().exists());
    }

    #[test]
    fn test_remove_unused_sources() {
        let tmp = TempDir::new().unwrap();
        create_hermes_sources(tmp.path());
        let sources = SourceLayout::new(tmp.path());

        assert!(remove_unused_sources(&sources, &quiet()).unwrap());
        assert!(!sources.unsupported_juno().exists());
        assert!(tmp.path().join("unsupported").exists());
        assert!(!remove_unused_sources(&sources, &quiet()).unwrap());
    }
}
