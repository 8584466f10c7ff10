//! Core data structures for hermes-build.
//!
//! This module contains the foundational types used throughout the crate:
//! - Target enumerations (app platform, architecture, configuration)
//! - Build jobs and their triplets
//! - Output and source tree layouts
//! - Resolved build options

pub mod job;
pub mod layout;
pub mod options;
pub mod platform;

pub use job::BuildJob;
pub use layout::{OutputLayout, SourceLayout, StagingPaths};
pub use options::{resolve, BuildOptions, CleanFlags, OptionError, RawOptions, Stages};
pub use platform::{AppPlatform, Arch, Configuration};
