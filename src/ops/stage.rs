//! Copying build outputs into the package staging tree.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::core::job::BuildJob;
use crate::core::layout::OutputLayout;
use crate::util::fs::{copy_file_into, ensure_dir};

/// Shared library, import library and symbols of the engine.
pub const LIB_ARTIFACTS: &[&str] = &["hermes.dll", "hermes.lib", "hermes.pdb"];

/// Command-line tools; not produced for UWP.
pub const TOOL_ARTIFACTS: &[&str] = &["hermes.exe", "hermesc.exe"];

/// File copied in place of every binary by `--fake-build`.
const PLACEHOLDER: &[&str] = &["system32", "kernel32.dll"];

/// Copy the artifacts of a finished build into the staging tree.
///
/// Every expected file must exist; a missing one fails the run.
pub fn stage_built_files(layout: &OutputLayout, job: &BuildJob) -> Result<Vec<PathBuf>> {
    let build_dir = layout.build_dir(job);
    let staging = layout.staging(job);
    ensure_dir(&staging.lib)?;
    ensure_dir(&staging.tools)?;

    let mut staged = Vec::new();
    let lib_source = build_dir.join("API").join("hermes_shared");
    for name in LIB_ARTIFACTS {
        staged.push(copy_file_into(name, &lib_source, &staging.lib)?);
    }

    if !job.is_uwp() {
        let tools_source = build_dir.join("bin");
        for name in TOOL_ARTIFACTS {
            staged.push(copy_file_into(name, &tools_source, &staging.tools)?);
        }
    }

    Ok(staged)
}

/// Populate the staging tree with placeholder copies of
/// `%SystemRoot%\system32\kernel32.dll` instead of real binaries.
pub fn stage_fake_files(
    layout: &OutputLayout,
    job: &BuildJob,
    system_root: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    let Some(system_root) = system_root else {
        bail!("SystemRoot is not set; --fake-build needs it to locate placeholder binaries");
    };
    let placeholder = PLACEHOLDER
        .iter()
        .fold(system_root.to_path_buf(), |path, part| path.join(part));

    let staging = layout.staging(job);
    ensure_dir(&staging.lib)?;
    ensure_dir(&staging.tools)?;

    let mut destinations: Vec<PathBuf> =
        LIB_ARTIFACTS.iter().map(|n| staging.lib.join(n)).collect();
    if !job.is_uwp() {
        destinations.extend(TOOL_ARTIFACTS.iter().map(|n| staging.tools.join(n)));
    }

    for dst in &destinations {
        fs::copy(&placeholder, dst).with_context(|| {
            format!(
                "failed to copy placeholder {} to {}",
                placeholder.display(),
                dst.display()
            )
        })?;
    }

    Ok(destinations)
}
