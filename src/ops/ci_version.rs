//! Pipeline version calculation.
//!
//! Computes the semantic and Windows file version of a CI run from the
//! Azure Pipelines environment and renders the logging commands that hand
//! them to later jobs.

use thiserror::Error;

/// Branch marker of pipeline test runs.
const TEST_BRANCH_MARKER: &str = "1es-pt-migration";
const MAIN_BRANCH: &str = "refs/heads/main";
const RELEASE_BRANCH_PREFIX: &str = "refs/heads/rnw/0.";

/// Errors that abort the version calculation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CiVersionError {
    #[error("Environment variable {0} is not set")]
    MissingVariable(&'static str),

    #[error("Build script does not support source branch '{0}'.")]
    UnsupportedBranch(String),

    #[error("Unexpected pre-release build number format encountered: {0}")]
    CanaryBuildNumber(String),

    #[error("Unexpected release build number format encountered: {0}")]
    ReleaseBuildNumber(String),
}

/// Pipeline variables the calculation depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CiEnvironment {
    /// `MustPublish` equals `True`.
    pub must_publish: bool,
    pub source_branch: String,
    pub build_number: String,
    pub source_version: String,
}

impl CiEnvironment {
    /// Read the pipeline variables through `var`.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, CiVersionError> {
        let required = |name: &'static str| var(name).ok_or(CiVersionError::MissingVariable(name));
        Ok(CiEnvironment {
            must_publish: var("MustPublish").as_deref() == Some("True"),
            source_branch: required("Build_SourceBranch")?,
            build_number: required("Build_BuildNumber")?,
            source_version: var("Build_SourceVersion").unwrap_or_default(),
        })
    }
}

/// Result of the calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CiVersion {
    pub semantic_version: String,
    pub file_version: String,
    /// Computed for a pipeline test branch.
    pub is_test: bool,
}

/// Compute versions for a pipeline run.
pub fn compute_version(env: &CiEnvironment) -> Result<CiVersion, CiVersionError> {
    let branch = env.source_branch.as_str();
    if branch.contains(TEST_BRANCH_MARKER) {
        tracing::debug!("Test branch {}, computing canary version", branch);
        return canary_version(env, true);
    }
    if !env.must_publish || branch == MAIN_BRANCH {
        tracing::debug!(
            "Computing canary version (branch {}, must publish {})",
            branch,
            env.must_publish
        );
        return canary_version(env, false);
    }
    if branch.starts_with(RELEASE_BRANCH_PREFIX) {
        tracing::debug!("Release branch {}, computing release version", branch);
        return release_version(env);
    }
    Err(CiVersionError::UnsupportedBranch(branch.to_string()))
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Canary build numbers look like `0.0.2209.28001`.
fn canary_version(env: &CiEnvironment, is_test: bool) -> Result<CiVersion, CiVersionError> {
    let build_number = env.build_number.as_str();
    let parts: Vec<&str> = build_number.split('.').collect();
    let valid = matches!(
        parts.as_slice(),
        ["0", "0", date, rev]
            if date.len() == 4
                && all_digits(date)
                && (4..=5).contains(&rev.len())
                && all_digits(rev)
    );
    if !valid {
        return Err(CiVersionError::CanaryBuildNumber(build_number.to_string()));
    }

    let short_hash: String = env.source_version.chars().take(8).collect();
    tracing::debug!(
        "Canary build number {}: date {}, revision {}, commit {}",
        build_number,
        parts[2],
        parts[3],
        short_hash
    );
    Ok(CiVersion {
        semantic_version: format!("0.0.0-{}.{}-{}", parts[2], parts[3], short_hash),
        file_version: build_number.to_string(),
        is_test,
    })
}

/// Release build numbers are plain semantic versions such as `0.72.4`.
fn release_version(env: &CiEnvironment) -> Result<CiVersion, CiVersionError> {
    let build_number = env.build_number.as_str();
    if build_number.split('.').count() != 3 || semver::Version::parse(build_number).is_err() {
        return Err(CiVersionError::ReleaseBuildNumber(build_number.to_string()));
    }
    Ok(CiVersion {
        semantic_version: build_number.to_string(),
        file_version: format!("{}.0", build_number),
        is_test: false,
    })
}

/// Azure Pipelines logging commands publishing `version`.
pub fn pipeline_commands(version: &CiVersion, must_publish: bool) -> Vec<String> {
    let mut lines = Vec::new();
    if !version.file_version.starts_with(&version.semantic_version) {
        let test_prefix = if version.is_test { "Test " } else { "" };
        let publish_prefix = if must_publish { "CI " } else { "PR " };
        lines.push(format!(
            "##vso[build.updateBuildNumber]{}{}{} -- {}",
            test_prefix, publish_prefix, version.file_version, version.semantic_version
        ));
    }
    lines.push(format!(
        "##vso[task.setVariable variable=semanticVersion;isOutput=true]{}",
        version.semantic_version
    ));
    lines.push(format!(
        "##vso[task.setVariable variable=fileVersion;isOutput=true]{}",
        version.file_version
    ));
    lines
}

/// Logging command that fails the pipeline step.
pub fn pipeline_error(err: &CiVersionError) -> String {
    format!("##[error]{}", err)
}
