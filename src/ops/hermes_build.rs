//! Implementation of a full `hermes-build` run.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::builder::context::BuildContext;
use crate::core::options::BuildOptions;
use crate::ops::build_matrix::{build_matrix, MatrixReport};
use crate::ops::clean::{clean_outputs, remove_unused_sources};
use crate::ops::pack::pack;
use crate::ops::version::{update_versions, VersionUpdate};
use crate::util::fs::ensure_dir;
use crate::util::shell::{format_hms, Status};

/// Outcome of [`hermes_build`].
#[derive(Debug, Clone)]
pub struct BuildSummary {
    /// Versions stamped into the sources, if any.
    pub version: Option<VersionUpdate>,
    pub matrix: MatrixReport,
    /// Packages present after packing; empty when packing was not requested.
    pub packages: Vec<PathBuf>,
    pub elapsed: Duration,
}

/// Resolved parameters as `(name, value)` rows.
pub fn parameter_rows(options: &BuildOptions) -> Vec<(&'static str, String)> {
    let join = |values: Vec<&str>| values.join(", ");
    vec![
        ("app-platform", options.app_platform.to_string()),
        (
            "platform",
            join(options.platforms.iter().map(|p| p.as_str()).collect()),
        ),
        (
            "configuration",
            join(options.configurations.iter().map(|c| c.as_str()).collect()),
        ),
        ("sources-path", options.sources_path.display().to_string()),
        ("output-path", options.output_path.display().to_string()),
        ("semantic-version", options.semantic_version.clone()),
        ("file-version", options.file_version.clone()),
        ("windows-sdk-version", options.windows_sdk_version.clone()),
        ("configure", options.stages.configure.to_string()),
        ("build", options.stages.build.to_string()),
        ("test", options.stages.test.to_string()),
        ("pack", options.stages.pack.to_string()),
        ("clean-all", options.clean.all.to_string()),
        ("clean-build", options.clean.build.to_string()),
        ("clean-tools", options.clean.tools.to_string()),
        ("clean-pkg", options.clean.pkg.to_string()),
        ("fake-build", options.fake_build.to_string()),
    ]
}

fn log_parameters(options: &BuildOptions) {
    let rows = parameter_rows(options);
    let width = rows.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, value) in rows {
        tracing::info!("{:<width$} : {}", name, value, width = width);
    }
}

/// Run the whole pipeline: prune, stamp versions, clean, build every job
/// of the matrix, then package.
pub fn hermes_build(ctx: &BuildContext<'_>) -> Result<BuildSummary> {
    let start = Instant::now();
    let options = ctx.options;
    log_parameters(options);

    if options.has_file_version() {
        remove_unused_sources(&ctx.sources(), ctx.shell)?;
    }

    let version = update_versions(options)?;
    if let Some(ref update) = version {
        ctx.shell.status(
            Status::Updated,
            format!("semantic version set to {}", update.semantic_version),
        );
        ctx.shell.status(
            Status::Updated,
            format!("Hermes version set to {}", update.hermes_version),
        );
    }

    let output = ctx.output();
    clean_outputs(&output, &options.clean, ctx.shell)?;
    ensure_dir(output.root())?;

    let matrix = build_matrix(ctx)?;

    let packages = if options.stages.pack {
        pack(ctx)?
    } else {
        Vec::new()
    };

    let elapsed = start.elapsed();
    ctx.shell.status(
        Status::Finished,
        format!("Build took {} to run", format_hms(elapsed)),
    );

    Ok(BuildSummary {
        version,
        matrix,
        packages,
        elapsed,
    })
}
