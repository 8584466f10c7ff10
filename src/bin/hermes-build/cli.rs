//! CLI definitions using clap.

use std::path::PathBuf;

use clap::Parser;
use hermes_build::core::options::{CleanFlags, RawOptions, Stages};
use hermes_build::util::shell::ColorChoice;

/// hermes-build - Build, test and package Hermes for Windows
#[derive(Parser, Debug)]
#[command(name = "hermes-build")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Generate the Ninja build files
    #[arg(long, overrides_with = "no_configure")]
    pub configure: bool,

    #[arg(long, overrides_with = "configure", hide = true)]
    pub no_configure: bool,

    /// Build and stage artifacts [default: on]
    #[arg(long, overrides_with = "no_build")]
    pub build: bool,

    /// Skip the build stage
    #[arg(long, overrides_with = "build")]
    pub no_build: bool,

    /// Run the CTest suite (ignored for UWP)
    #[arg(long, overrides_with = "no_test")]
    pub test: bool,

    #[arg(long, overrides_with = "test", hide = true)]
    pub no_test: bool,

    /// Create the NuGet packages from the staging tree
    #[arg(long, overrides_with = "no_pack")]
    pub pack: bool,

    #[arg(long, overrides_with = "pack", hide = true)]
    pub no_pack: bool,

    /// Remove the whole output directory first
    #[arg(long)]
    pub clean_all: bool,

    /// Remove each job's build directory before configuring
    #[arg(long)]
    pub clean_build: bool,

    /// Remove the host compiler build
    #[arg(long)]
    pub clean_tools: bool,

    /// Remove the staging tree and packages
    #[arg(long)]
    pub clean_pkg: bool,

    /// Target UWP (same as --app-platform uwp)
    #[arg(long)]
    pub uwp: bool,

    /// Application platform: win32 or uwp
    #[arg(long, value_name = "APP")]
    pub app_platform: Option<String>,

    /// Target architecture: x64, x86, arm64 or arm64ec (repeatable)
    #[arg(long = "platform", value_name = "ARCH", value_delimiter = ',')]
    pub platforms: Vec<String>,

    /// Build configuration: debug or release (repeatable)
    #[arg(long = "configuration", value_name = "CONFIG", value_delimiter = ',')]
    pub configurations: Vec<String>,

    /// Hermes checkout [default: current directory]
    #[arg(long, value_name = "DIR")]
    pub sources_path: Option<PathBuf>,

    /// Root of build outputs [default: <sources-path>/out]
    #[arg(long, value_name = "DIR", env = "HERMES_BUILD_OUTPUT_PATH")]
    pub output_path: Option<PathBuf>,

    /// Package version [default: 0.0.0]
    #[arg(long, value_name = "VERSION", env = "HERMES_SEMANTIC_VERSION")]
    pub semantic_version: Option<String>,

    /// Version stamped into binaries [default: 0.0.0.0]
    #[arg(long, value_name = "VERSION", env = "HERMES_FILE_VERSION")]
    pub file_version: Option<String>,

    /// Windows SDK version for vcvarsall and UWP builds
    #[arg(long, value_name = "VERSION", env = "WINDOWS_SDK_VERSION")]
    pub windows_sdk_version: Option<String>,

    /// Stage placeholder binaries instead of compiling
    #[arg(long)]
    pub fake_build: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Print errors only
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always or never
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,
}

fn flag(yes: bool, no: bool, default: bool) -> bool {
    if yes {
        true
    } else if no {
        false
    } else {
        default
    }
}

impl Cli {
    pub fn stages(&self) -> Stages {
        Stages {
            configure: flag(self.configure, self.no_configure, false),
            build: flag(self.build, self.no_build, true),
            test: flag(self.test, self.no_test, false),
            pack: flag(self.pack, self.no_pack, false),
        }
    }

    pub fn clean_flags(&self) -> CleanFlags {
        CleanFlags {
            all: self.clean_all,
            build: self.clean_build,
            tools: self.clean_tools,
            pkg: self.clean_pkg,
        }
    }

    /// Options as given, before validation.
    pub fn raw_options(&self) -> RawOptions {
        RawOptions {
            app_platform: self.app_platform.clone(),
            uwp: self.uwp,
            platforms: self.platforms.clone(),
            configurations: self.configurations.clone(),
            sources_path: self.sources_path.clone(),
            output_path: self.output_path.clone(),
            semantic_version: self.semantic_version.clone(),
            file_version: self.file_version.clone(),
            windows_sdk_version: self.windows_sdk_version.clone(),
            stages: self.stages(),
            clean: self.clean_flags(),
            fake_build: self.fake_build,
        }
    }
}
