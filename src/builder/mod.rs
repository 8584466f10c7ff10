//! Native build of the Hermes engine.
//!
//! This module drives CMake and Ninja inside the MSVC developer
//! environment and plans the steps of each build job.

pub mod cmake;
pub mod context;
pub mod executor;
pub mod plan;
pub mod toolchain;

pub use cmake::{CMakeBuilder, CMakeSettings};
pub use context::BuildContext;
pub use executor::{CommandRunner, SystemRunner};
pub use plan::{JobPlan, Step};
pub use toolchain::{ToolchainError, ToolchainLocator};
