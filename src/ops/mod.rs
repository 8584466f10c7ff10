//! High-level operations.
//!
//! This module contains the steps of a `hermes-build` run and the pipeline
//! version calculation.

pub mod build_matrix;
pub mod ci_version;
pub mod clean;
pub mod hermes_build;
pub mod pack;
pub mod stage;
pub mod version;

pub use build_matrix::{build_matrix, BuildMatrix, MatrixReport};
pub use ci_version::{compute_version, CiEnvironment, CiVersion, CiVersionError};
pub use hermes_build::{hermes_build, BuildSummary};
pub use pack::pack;
pub use version::update_versions;
