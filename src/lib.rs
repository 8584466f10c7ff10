//! hermes-build - Windows build orchestration for the Hermes JavaScript engine
//!
//! This crate provides the library behind the `hermes-build` and
//! `set-version-number` binaries: option resolution, toolchain discovery,
//! the build matrix, artifact staging and NuGet packaging.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities and mocks for hermes-build unit tests.
///
/// This module is only available when compiling with `--cfg test`. It
/// provides a recording command runner and fixture source trees.
#[cfg(test)]
pub mod test_support;

pub use builder::{BuildContext, CommandRunner};
pub use core::{BuildJob, BuildOptions};
pub use util::config::Config;
