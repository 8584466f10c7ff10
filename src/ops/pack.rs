//! NuGet packaging of the staging tree.
//!
//! Packaging assumes earlier jobs populated `lib/native/...` and
//! `tools/native/...`. It adds headers, license and MSBuild integration
//! files, then runs `nuget pack` twice against the same nuspec: a slim
//! package without symbols and a `.Fat` package with them.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::builder::context::BuildContext;
use crate::core::layout::SourceLayout;
use crate::util::fs::{copy_dir_all, copy_file_into, ensure_dir, glob_files, relative_path};
use crate::util::process::{find_executable, ProcessBuilder};
use crate::util::shell::Status;

/// node-api headers that ship in the package.
pub const NODE_API_HEADERS: &[&str] = &[
    "js_native_api.h",
    "js_native_api_types.h",
    "js_runtime_api.h",
];

/// Extra `-Properties` of the slim package.
const SLIM_PROPERTIES: &str = "fat_suffix=;exclude_bin_files=**/*.pdb";

/// Extra `-Properties` of the fat package.
const FAT_PROPERTIES: &str = "fat_suffix=.Fat;exclude_bin_files=*.txt";

/// Source control coordinates stamped into package metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoInfo {
    pub branch: String,
    pub commit: String,
}

/// Read the current branch and commit of the repository containing `path`.
///
/// A detached HEAD reports the branch as `HEAD`.
pub fn repo_info(path: &Path) -> Result<RepoInfo> {
    let repo = git2::Repository::discover(path)
        .with_context(|| format!("failed to open git repository at {}", path.display()))?;
    let head = repo.head().context("failed to resolve HEAD")?;
    let branch = if head.is_branch() {
        head.shorthand().unwrap_or("HEAD").to_string()
    } else {
        "HEAD".to_string()
    };
    let commit = head
        .peel_to_commit()
        .context("HEAD does not point at a commit")?
        .id()
        .to_string();
    Ok(RepoInfo { branch, commit })
}

/// Copy headers, license files and MSBuild integration into `staging`.
pub fn stage_package_files(sources: &SourceLayout, staging: &Path, package_id: &str) -> Result<()> {
    for app in ["win32", "uwp"] {
        ensure_dir(&staging.join("lib").join("native").join(app).join("release"))?;
    }

    let include = staging.join("build").join("native").join("include");
    copy_dir_all(&sources.jsi_headers(), &include.join("jsi"))?;
    for header in NODE_API_HEADERS {
        copy_file_into(header, &sources.node_api_headers(), &include.join("node-api"))?;
    }
    copy_file_into("hermes_api.h", &sources.hermes_shared(), &include.join("hermes"))?;

    let license = staging.join("license");
    copy_file_into("LICENSE", sources.root(), &license)?;
    copy_file_into("NOTICE.txt", &sources.nuget(), &license)?;

    let native = staging.join("build").join("native");
    copy_file_into(&format!("{}.props", package_id), &sources.nuget(), &native)?;
    copy_file_into(&format!("{}.targets", package_id), &sources.nuget(), &native)?;
    copy_file_into(&format!("{}.nuspec", package_id), &sources.nuget(), staging)?;

    let uap = staging.join("lib").join("uap");
    if !uap.exists() {
        ensure_dir(&uap)?;
        fs::write(uap.join("_._"), "")
            .with_context(|| format!("failed to write {}", uap.join("_._").display()))?;
    }
    Ok(())
}

/// `-Properties` shared by both packages.
pub fn base_properties(staging: &Path, version: &str, repo_url: &str, repo: &RepoInfo) -> String {
    format!(
        "nugetroot={};version={};repoUrl={};repoBranch={};repoCommit={}",
        staging.display(),
        version,
        repo_url,
        repo.branch,
        repo.commit
    )
}

/// The slim and fat `nuget pack` invocations.
pub fn pack_commands(
    nuspec: &Path,
    output_dir: &Path,
    base_properties: &str,
) -> [ProcessBuilder; 2] {
    let pack = |extra: &str| {
        ProcessBuilder::new("nuget")
            .arg("pack")
            .arg(nuspec)
            .arg("-OutputDirectory")
            .arg(output_dir)
            .arg("-NoDefaultExcludes")
            .arg("-Properties")
            .arg(format!("{};{}", base_properties, extra))
    };
    [pack(SLIM_PROPERTIES), pack(FAT_PROPERTIES)]
}

/// File names of the slim and fat packages for `version`.
pub fn package_file_names(package_id: &str, version: &str) -> [String; 2] {
    [
        format!("{}.{}.nupkg", package_id, version),
        format!("{}.Fat.{}.nupkg", package_id, version),
    ]
}

/// Packages of this run in `pkg`; leftovers of other versions are ignored.
fn built_packages(pkg: &Path, package_id: &str, version: &str) -> Result<Vec<PathBuf>> {
    let expected = package_file_names(package_id, version);
    let packages = glob_files(pkg, "*.nupkg")?
        .into_iter()
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| expected.iter().any(|e| e == name))
        })
        .collect();
    Ok(packages)
}

/// Assemble the staging tree and produce both NuGet packages.
///
/// Returns the slim and fat `.nupkg` files this run produced.
pub fn pack(ctx: &BuildContext<'_>) -> Result<Vec<PathBuf>> {
    let sources = ctx.sources();
    let output = ctx.output();
    let staging = output.pkg_staging();
    let pkg = output.pkg();
    let package_id = ctx.config.package_id();

    let span = ctx.shell.span(Status::Packing, package_id);

    stage_package_files(&sources, &staging, package_id)?;
    ensure_dir(&pkg)?;

    let repo = repo_info(sources.root())?;
    let properties = base_properties(
        &staging,
        &ctx.options.semantic_version,
        ctx.config.repo_url(),
        &repo,
    );

    match find_executable("nuget") {
        Some(path) => tracing::debug!("Using {}", path.display()),
        None => ctx.shell.warn("nuget was not found on PATH"),
    }

    let nuspec = staging.join(format!("{}.nuspec", package_id));
    for cmd in pack_commands(&nuspec, &pkg, &properties) {
        ctx.runner.run(&cmd)?;
    }

    let packages = built_packages(&pkg, package_id, &ctx.options.semantic_version)?;
    for package in &packages {
        ctx.shell
            .status(Status::Packaged, relative_path(output.root(), package).display());
    }
    span.finish();
    Ok(packages)
}
