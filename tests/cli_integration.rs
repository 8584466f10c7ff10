//! CLI integration tests for hermes-build.
//!
//! These tests drive the binaries end to end. Builds use `--fake-build`
//! with a fake `SystemRoot`, so no Visual Studio installation is needed.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Environment variables that would leak host settings into a test run.
const HOST_VARS: &[&str] = &[
    "HERMES_BUILD_OUTPUT_PATH",
    "HERMES_SEMANTIC_VERSION",
    "HERMES_FILE_VERSION",
    "WINDOWS_SDK_VERSION",
    "HERMES_BUILD_LOG",
];

/// A temporary Hermes checkout plus a fake Windows directory.
struct Fixture {
    tmp: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("hermes");
        let files = [
            (
                "CMakeLists.txt",
                "cmake_minimum_required(VERSION 3.13.0)\nproject(Hermes\n        VERSION 0.12.0\n        LANGUAGES C CXX)\n",
            ),
            (
                "npm/package.json",
                "{\n  \"name\": \"hermes-engine\",\n  \"version\": \"0.12.0\",\n  \"private\": true\n}\n",
            ),
            ("unsupported/juno/README.md", "juno\n"),
        ];
        for (relative, contents) in files {
            let path = src.join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }

        let system32 = tmp.path().join("Windows").join("system32");
        fs::create_dir_all(&system32).unwrap();
        fs::write(system32.join("kernel32.dll"), b"MZ placeholder").unwrap();

        Fixture { tmp }
    }

    fn sources(&self) -> PathBuf {
        self.tmp.path().join("hermes")
    }

    fn out(&self) -> PathBuf {
        self.sources().join("out")
    }

    fn staging(&self) -> PathBuf {
        self.out().join("pkg-staging")
    }

    /// The hermes-build binary, run inside the checkout.
    fn hermes_build(&self) -> Command {
        let mut cmd = Command::cargo_bin("hermes-build").unwrap();
        for var in HOST_VARS {
            cmd.env_remove(var);
        }
        cmd.current_dir(self.sources())
            .env("SystemRoot", self.tmp.path().join("Windows"))
            .env("XDG_CONFIG_HOME", self.tmp.path().join("config"))
            .env("APPDATA", self.tmp.path().join("config"));
        cmd
    }
}

fn read(path: impl AsRef<Path>) -> String {
    fs::read_to_string(path).unwrap()
}

// ============================================================================
// Argument validation
// ============================================================================

#[test]
fn test_help_exits_zero() {
    Command::cargo_bin("hermes-build")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--fake-build"))
        .stdout(predicate::str::contains("--windows-sdk-version"));
}

#[test]
fn test_invalid_platform_is_rejected_before_any_work() {
    let fx = Fixture::new();

    fx.hermes_build()
        .args(["--platform", "arm", "--fake-build", "--clean-all"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid value for platform: arm"))
        .stderr(predicate::str::contains(
            "Valid values are: x64, x86, arm64, arm64ec",
        ));

    assert!(!fx.out().exists());
}

#[test]
fn test_invalid_configuration_and_app_platform() {
    let fx = Fixture::new();

    fx.hermes_build()
        .args(["--configuration", "profile"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid value for configuration: profile"));

    fx.hermes_build()
        .args(["--app-platform", "winrt"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Valid values are: win32, uwp"));
}

#[test]
fn test_usage_errors_exit_with_one() {
    let fx = Fixture::new();

    fx.hermes_build()
        .arg("--bogus")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--bogus"));

    fx.hermes_build()
        .args(["--color", "rainbow"])
        .assert()
        .code(1);

    fx.hermes_build().arg("--platform").assert().code(1);

    assert!(!fx.out().exists());
}

#[test]
fn test_version_exits_zero() {
    Command::cargo_bin("hermes-build")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hermes-build"));
}

// ============================================================================
// Fake builds
// ============================================================================

#[test]
fn test_fake_build_stages_placeholders() {
    let fx = Fixture::new();

    fx.hermes_build()
        .args(["--fake-build", "--platform", "X64,arm64", "--configuration", "Debug"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Build took"));

    for arch in ["x64", "arm64"] {
        let lib = fx.staging().join("lib/native/win32/debug").join(arch);
        let tools = fx.staging().join("tools/native/debug").join(arch);
        for name in ["hermes.dll", "hermes.lib", "hermes.pdb"] {
            assert_eq!(fs::read(lib.join(name)).unwrap(), b"MZ placeholder");
        }
        for name in ["hermes.exe", "hermesc.exe"] {
            assert!(tools.join(name).exists());
        }
    }
    // No real build happened.
    assert!(!fx.out().join("build").exists());
    assert!(!fx.out().join("tools").exists());
}

#[test]
fn test_uwp_fake_build_has_no_tools() {
    let fx = Fixture::new();

    fx.hermes_build()
        .args(["--fake-build", "--uwp", "--test", "--platform", "arm64ec"])
        .assert()
        .success();

    let lib = fx.staging().join("lib/native/uwp/release/arm64ec");
    assert!(lib.join("hermes.dll").exists());
    assert!(!fx.staging().join("tools/native/release/arm64ec/hermes.exe").exists());
}

#[test]
fn test_fake_build_without_system_root_fails() {
    let fx = Fixture::new();

    fx.hermes_build()
        .env_remove("SystemRoot")
        .arg("--fake-build")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("SystemRoot"));
}

#[test]
fn test_output_path_from_environment() {
    let fx = Fixture::new();
    let out = fx.tmp.path().join("elsewhere");

    fx.hermes_build()
        .env("HERMES_BUILD_OUTPUT_PATH", &out)
        .arg("--fake-build")
        .assert()
        .success();

    assert!(out
        .join("pkg-staging/lib/native/win32/release/x64/hermes.dll")
        .exists());
    assert!(!fx.out().exists());
}

// ============================================================================
// Versions and source pruning
// ============================================================================

#[test]
fn test_release_versions_are_stamped() {
    let fx = Fixture::new();

    fx.hermes_build()
        .args([
            "--fake-build",
            "--semantic-version",
            "0.72.4",
            "--file-version",
            "0.72.4.0",
        ])
        .assert()
        .success();

    let cmake = read(fx.sources().join("CMakeLists.txt"));
    assert!(cmake.contains("cmake_minimum_required(VERSION 3.13.0)"));
    assert!(cmake.contains("VERSION 0.72.4\n"));
    assert!(read(fx.sources().join("npm/package.json")).contains("\"version\": \"0.72.4\","));
    assert!(!fx.sources().join("unsupported/juno").exists());
}

#[test]
fn test_unset_file_version_leaves_sources_alone() {
    let fx = Fixture::new();
    let cmake_before = read(fx.sources().join("CMakeLists.txt"));
    let package_before = read(fx.sources().join("npm/package.json"));

    fx.hermes_build()
        .args(["--fake-build", "--semantic-version", "1.2.3", "--file-version", "0.0.0.0"])
        .assert()
        .success();

    assert_eq!(read(fx.sources().join("CMakeLists.txt")), cmake_before);
    assert_eq!(read(fx.sources().join("npm/package.json")), package_before);
    assert!(fx.sources().join("unsupported/juno").exists());
}

// ============================================================================
// Cleaning
// ============================================================================

#[test]
fn test_clean_pkg_without_build() {
    let fx = Fixture::new();
    for dir in ["pkg-staging", "pkg", "tools", "build"] {
        fs::create_dir_all(fx.out().join(dir)).unwrap();
    }

    fx.hermes_build()
        .args(["--clean-pkg", "--no-build"])
        .assert()
        .success();

    assert!(!fx.out().join("pkg-staging").exists());
    assert!(!fx.out().join("pkg").exists());
    assert!(fx.out().join("tools").exists());
    assert!(fx.out().join("build").exists());
}

#[test]
fn test_clean_all_then_fake_build() {
    let fx = Fixture::new();
    fs::create_dir_all(fx.out().join("build/stale")).unwrap();

    fx.hermes_build()
        .args(["--clean-all", "--fake-build"])
        .assert()
        .success();

    assert!(!fx.out().join("build/stale").exists());
    assert!(fx
        .staging()
        .join("lib/native/win32/release/x64/hermes.pdb")
        .exists());
}

// ============================================================================
// set-version-number
// ============================================================================

fn set_version_number() -> Command {
    let mut cmd = Command::cargo_bin("set-version-number").unwrap();
    for var in [
        "MustPublish",
        "Build_SourceBranch",
        "Build_BuildNumber",
        "Build_SourceVersion",
        "HERMES_BUILD_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_set_version_number_canary() {
    set_version_number()
        .env("MustPublish", "True")
        .env("Build_SourceBranch", "refs/heads/main")
        .env("Build_BuildNumber", "0.0.2209.28001")
        .env("Build_SourceVersion", "8af7870c1d2e3f4a")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "##vso[build.updateBuildNumber]CI 0.0.2209.28001 -- 0.0.0-2209.28001-8af7870c",
        ))
        .stdout(predicate::str::contains(
            "##vso[task.setVariable variable=semanticVersion;isOutput=true]0.0.0-2209.28001-8af7870c",
        ))
        .stdout(predicate::str::contains(
            "##vso[task.setVariable variable=fileVersion;isOutput=true]0.0.2209.28001",
        ));
}

#[test]
fn test_set_version_number_release() {
    set_version_number()
        .env("MustPublish", "True")
        .env("Build_SourceBranch", "refs/heads/rnw/0.72-stable")
        .env("Build_BuildNumber", "0.72.4")
        .assert()
        .success()
        .stdout(predicate::str::contains("updateBuildNumber").not())
        .stdout(predicate::str::contains(
            "##vso[task.setVariable variable=fileVersion;isOutput=true]0.72.4.0",
        ));
}

#[test]
fn test_set_version_number_unsupported_branch() {
    set_version_number()
        .env("MustPublish", "True")
        .env("Build_SourceBranch", "refs/heads/feature/x")
        .env("Build_BuildNumber", "0.0.2209.28001")
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "##[error]Build script does not support source branch 'refs/heads/feature/x'.",
        ));
}

#[test]
fn test_set_version_number_logs_decisions() {
    set_version_number()
        .env("HERMES_BUILD_LOG", "hermes_build=debug")
        .env("MustPublish", "False")
        .env("Build_SourceBranch", "refs/heads/feature/x")
        .env("Build_BuildNumber", "0.0.2209.28001")
        .env("Build_SourceVersion", "8af7870c1d2e3f4a")
        .assert()
        .success()
        .stderr(predicate::str::contains("Computing canary version"))
        .stderr(predicate::str::contains("date 2209, revision 28001"))
        .stdout(predicate::str::contains("PR 0.0.2209.28001"));
}
