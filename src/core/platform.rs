//! Application platform, CPU architecture and build configuration.
//!
//! Each enum parses case-insensitively and renders as the lowercase token
//! used in directory names (`win32-x64-release`) and on the command line.

use std::fmt;
use std::str::FromStr;

/// Windows application model being targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum AppPlatform {
    /// Classic desktop applications.
    #[default]
    Win32,
    /// Universal Windows Platform (sandboxed app container).
    Uwp,
}

impl AppPlatform {
    /// All accepted values, in help/diagnostic order.
    pub const VALID: &'static [&'static str] = &["win32", "uwp"];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppPlatform::Win32 => "win32",
            AppPlatform::Uwp => "uwp",
        }
    }

    pub fn is_uwp(&self) -> bool {
        matches!(self, AppPlatform::Uwp)
    }
}

impl FromStr for AppPlatform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "win32" => Ok(AppPlatform::Win32),
            "uwp" => Ok(AppPlatform::Uwp),
            _ => Err(format!("invalid app platform '{}'", s)),
        }
    }
}

impl fmt::Display for AppPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Arch {
    X64,
    X86,
    Arm64,
    /// ARM64 "emulation compatible" ABI; compiled with the ARM64 toolset
    /// plus `-arm64EC`.
    Arm64ec,
}

impl Arch {
    /// All accepted values, in help/diagnostic order.
    pub const VALID: &'static [&'static str] = &["x64", "x86", "arm64", "arm64ec"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::X64 => "x64",
            Arch::X86 => "x86",
            Arch::Arm64 => "arm64",
            Arch::Arm64ec => "arm64ec",
        }
    }

    /// Whether this is one of the ARM64 flavours.
    pub fn is_arm64(&self) -> bool {
        matches!(self, Arch::Arm64 | Arch::Arm64ec)
    }

    /// Host/target pair understood by `vcvarsall.bat`. The host is always x64.
    pub fn vcvars_pair(&self) -> &'static str {
        match self {
            Arch::X64 => "x64",
            Arch::X86 => "x64_x86",
            Arch::Arm64 | Arch::Arm64ec => "x64_arm64",
        }
    }
}

impl FromStr for Arch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "x64" => Ok(Arch::X64),
            "x86" => Ok(Arch::X86),
            "arm64" => Ok(Arch::Arm64),
            "arm64ec" => Ok(Arch::Arm64ec),
            _ => Err(format!("invalid platform '{}'", s)),
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Configuration {
    Debug,
    Release,
}

impl Configuration {
    /// All accepted values, in help/diagnostic order.
    pub const VALID: &'static [&'static str] = &["debug", "release"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Configuration::Debug => "debug",
            Configuration::Release => "release",
        }
    }

    /// Value passed as `CMAKE_BUILD_TYPE`.
    ///
    /// Debug builds use Hermes' `FastDebug` type: assertions on, optimized.
    pub fn cmake_build_type(&self) -> &'static str {
        match self {
            Configuration::Release => "Release",
            Configuration::Debug => "FastDebug",
        }
    }
}

impl FromStr for Configuration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(Configuration::Debug),
            "release" => Ok(Configuration::Release),
            _ => Err(format!("invalid configuration '{}'", s)),
        }
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
