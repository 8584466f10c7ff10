//! Stamping release versions into the Hermes sources.

use std::path::Path;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use crate::core::layout::SourceLayout;
use crate::core::options::{BuildOptions, DEFAULT_SEMANTIC_VERSION};
use crate::util::fs::{read_to_string, write_string};

/// Versions written by [`update_versions`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionUpdate {
    pub semantic_version: String,
    /// Version written to the `project()` directive of CMakeLists.txt.
    pub hermes_version: String,
}

/// `VERSION <token>` inside the `project(` directive.
static PROJECT_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(project\s*\([^)]*?\bVERSION\s+)[^\s)]+").expect("valid regex")
});

static PACKAGE_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""version": ".*","#).expect("valid regex"));

/// Whether the pipeline supplied versions worth writing.
pub fn should_update(options: &BuildOptions) -> bool {
    !options.semantic_version.trim().is_empty() && options.has_file_version()
}

/// Version for the CMake project: canary builds (`0.0.0-...`) carry no
/// meaningful semantic version, so the file version stands in.
pub fn hermes_version<'a>(semantic_version: &'a str, file_version: &'a str) -> &'a str {
    if semantic_version.starts_with(DEFAULT_SEMANTIC_VERSION) {
        file_version
    } else {
        semantic_version
    }
}

/// Replace the version of the `project()` directive.
///
/// Content without a versioned `project()` directive is returned unchanged.
pub fn rewrite_cmake_version(contents: &str, version: &str) -> String {
    PROJECT_VERSION
        .replace(contents, |caps: &regex::Captures<'_>| {
            format!("{}{}", &caps[1], version)
        })
        .into_owned()
}

/// Replace the first `"version": "...",` field of a package manifest.
pub fn rewrite_package_version(contents: &str, version: &str) -> String {
    let replacement = format!(r#""version": "{}","#, version);
    PACKAGE_VERSION
        .replace(contents, regex::NoExpand(&replacement))
        .into_owned()
}

fn rewrite_file(path: &Path, rewrite: impl FnOnce(&str) -> String) -> Result<()> {
    let contents = read_to_string(path)?;
    let updated = rewrite(&contents);
    if updated == contents {
        tracing::debug!("No version marker in {}", path.display());
    }
    write_string(path, &updated)
}

/// Write the pipeline versions into CMakeLists.txt and npm/package.json.
///
/// Returns `None` without touching any file when no real file version was
/// supplied.
pub fn update_versions(options: &BuildOptions) -> Result<Option<VersionUpdate>> {
    if !should_update(options) {
        return Ok(None);
    }

    let sources = SourceLayout::new(&options.sources_path);
    let semantic_version = options.semantic_version.trim().to_string();
    let hermes_version =
        hermes_version(&semantic_version, options.file_version.trim()).to_string();

    rewrite_file(&sources.cmake_lists(), |c| {
        rewrite_cmake_version(c, &hermes_version)
    })?;
    rewrite_file(&sources.npm_package_json(), |c| {
        rewrite_package_version(c, &semantic_version)
    })?;

    Ok(Some(VersionUpdate {
        semantic_version,
        hermes_version,
    }))
}
