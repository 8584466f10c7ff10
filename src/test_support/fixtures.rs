//! Test fixtures: a miniature Hermes checkout and fake build outputs.

use std::fs;
use std::path::Path;

use crate::ops::stage::{LIB_ARTIFACTS, TOOL_ARTIFACTS};

/// Top-level CMakeLists.txt of the fixture checkout.
pub const CMAKE_LISTS: &str = r#"cmake_minimum_required(VERSION 3.13.0)

project(Hermes
        VERSION 0.12.0
        LANGUAGES C CXX)

set(HERMES_RELEASE_VERSION ${PROJECT_VERSION})
"#;

/// npm manifest of the fixture checkout.
pub const PACKAGE_JSON: &str = r#"{
  "name": "hermes-engine",
  "version": "0.12.0",
  "private": true,
  "license": "MIT"
}
"#;

/// Files of a checkout, relative to its root.
const SOURCE_FILES: &[(&str, &str)] = &[
    ("LICENSE", "MIT License\n"),
    ("API/jsi/jsi/jsi.h", "#pragma once\n"),
    ("API/jsi/jsi/decorator.h", "#pragma once\n"),
    ("API/jsi/jsi/test/testlib.h", "#pragma once\n"),
    ("API/hermes_shared/hermes_api.h", "#pragma once\n"),
    ("API/hermes_shared/node-api/js_native_api.h", "#pragma once\n"),
    ("API/hermes_shared/node-api/js_native_api_types.h", "#pragma once\n"),
    ("API/hermes_shared/node-api/js_runtime_api.h", "#pragma once\n"),
    ("API/hermes_shared/node-api/node_api.h", "#pragma once\n"),
    (".ado/Nuget/NOTICE.txt", "Third party notices\n"),
    (
        ".ado/Nuget/Microsoft.JavaScript.Hermes.nuspec",
        "<package><metadata><id>Microsoft.JavaScript.Hermes$fat_suffix$</id></metadata></package>\n",
    ),
    (".ado/Nuget/Microsoft.JavaScript.Hermes.props", "<Project />\n"),
    (".ado/Nuget/Microsoft.JavaScript.Hermes.targets", "<Project />\n"),
    ("unsupported/juno/README.md", "juno\n"),
];

fn write(path: &Path, contents: impl AsRef<[u8]>) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Populate `root` with a miniature Hermes checkout.
pub fn create_hermes_sources(root: &Path) {
    write(&root.join("CMakeLists.txt"), CMAKE_LISTS);
    write(&root.join("npm").join("package.json"), PACKAGE_JSON);
    for (relative, contents) in SOURCE_FILES {
        write(&root.join(relative), contents);
    }
}

/// Turn `root` into a git repository on branch `main` with one commit.
/// Returns the commit hash.
pub fn init_git_repo(root: &Path) -> String {
    let mut opts = git2::RepositoryInitOptions::new();
    opts.initial_head("main");
    let repo = git2::Repository::init_opts(root, &opts).unwrap();

    let mut index = repo.index().unwrap();
    index
        .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();

    let sig = git2::Signature::now("Build Bot", "build@example.com").unwrap();
    let oid = repo
        .commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
        .unwrap();
    oid.to_string()
}

/// Files `cmake --build` leaves in a job's build directory.
pub fn write_build_outputs(build_dir: &Path) {
    let lib_dir = build_dir.join("API").join("hermes_shared");
    for name in LIB_ARTIFACTS {
        write(&lib_dir.join(name), format!("built {}", name));
    }
    let bin_dir = build_dir.join("bin");
    for name in TOOL_ARTIFACTS {
        write(&bin_dir.join(name), format!("built {}", name));
    }
}

/// Files the host compiler build leaves in the tools directory.
pub fn write_host_compiler(tools_dir: &Path) {
    write(&tools_dir.join("bin").join("hermesc.exe"), "built hermesc.exe");
    write(&tools_dir.join("ImportHermesc.cmake"), "# import hermesc\n");
}
