//! Build options.
//!
//! A [`BuildOptions`] value is the complete declarative input for one
//! toolchain resolution. It is constructed once per build invocation
//! (from CLI flags and config files) and never mutated afterwards; the
//! resolver derives a fresh configuration from it every time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::arch::{Arch, ArchRequest};

/// Default MinGW tool prefix for 32-bit targets.
pub const DEFAULT_MINGW32_PREFIX: &str = "i686-w64-mingw32-";
/// Default MinGW tool prefix for 64-bit targets.
pub const DEFAULT_MINGW64_PREFIX: &str = "x86_64-w64-mingw32-";

/// Build profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// Optimized build, no debug info by default.
    Release,
    /// Optimized build that keeps debug info usable.
    ReleaseDebug,
    /// Unoptimized build with full debug info.
    Debug,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Release => "release",
            Profile::ReleaseDebug => "release_debug",
            Profile::Debug => "debug",
        }
    }
}

impl FromStr for Profile {
    type Err = OptionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "release" => Ok(Profile::Release),
            "release_debug" => Ok(Profile::ReleaseDebug),
            "debug" => Ok(Profile::Debug),
            _ => Err(OptionParseError::new("profile", s, "release, release_debug, debug")),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the optimizer should favor in release profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizeFor {
    Speed,
    Size,
}

impl FromStr for OptimizeFor {
    type Err = OptionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "speed" => Ok(OptimizeFor::Speed),
            "size" => Ok(OptimizeFor::Size),
            _ => Err(OptionParseError::new("optimize", s, "speed, size")),
        }
    }
}

/// Link-time optimization mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LtoMode {
    /// No link-time optimization.
    Off,
    /// Whole-program optimization.
    Full,
    /// The faster, parallelizable variant where the toolchain has one.
    Thin,
}

impl FromStr for LtoMode {
    type Err = OptionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(LtoMode::Off),
            "full" => Ok(LtoMode::Full),
            "thin" => Ok(LtoMode::Thin),
            _ => Err(OptionParseError::new("lto", s, "off, full, thin")),
        }
    }
}

/// Windows subsystem the linked program runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subsystem {
    /// Windowed application, no console attached.
    Gui,
    /// Console application; portable code can detect this through the
    /// subsystem preprocessor define.
    Console,
}

impl FromStr for Subsystem {
    type Err = OptionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gui" => Ok(Subsystem::Gui),
            "console" => Ok(Subsystem::Console),
            _ => Err(OptionParseError::new("subsystem", s, "gui, console")),
        }
    }
}

/// One GPU rendering backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpuBackend {
    /// Whether the backend is compiled in at all.
    pub enabled: bool,
    /// Whether the API loader is linked statically. When set, the
    /// import library for the backend is not added to the link line.
    pub static_loader: bool,
}

/// GPU backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphicsOptions {
    /// Vulkan renderer (`VULKAN_ENABLED`, links `vulkan` unless the
    /// loader is statically linked through volk).
    pub vulkan: GpuBackend,
    /// OpenGL 3 / GLES3 renderer (`GLES3_ENABLED`, links `opengl32`).
    pub opengl3: GpuBackend,
}

impl Default for GraphicsOptions {
    fn default() -> Self {
        GraphicsOptions {
            vulkan: GpuBackend {
                enabled: true,
                static_loader: false,
            },
            opengl3: GpuBackend {
                enabled: true,
                static_loader: false,
            },
        }
    }
}

/// MinGW tool prefixes per architecture width.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossPrefixes {
    /// Prefix for 32-bit targets (e.g. `i686-w64-mingw32-`).
    pub win32: Option<String>,
    /// Prefix for 64-bit targets (e.g. `x86_64-w64-mingw32-`).
    pub win64: Option<String>,
}

impl CrossPrefixes {
    /// Read prefixes from `MINGW32_PREFIX` / `MINGW64_PREFIX`.
    pub fn from_env() -> Self {
        CrossPrefixes {
            win32: std::env::var("MINGW32_PREFIX").ok().filter(|p| !p.is_empty()),
            win64: std::env::var("MINGW64_PREFIX").ok().filter(|p| !p.is_empty()),
        }
    }

    /// The prefix used for `arch`, falling back to the conventional
    /// MinGW-w64 prefixes when unset.
    pub fn for_arch(&self, arch: Arch) -> &str {
        if arch.is_64_bit() {
            self.win64.as_deref().unwrap_or(DEFAULT_MINGW64_PREFIX)
        } else {
            self.win32.as_deref().unwrap_or(DEFAULT_MINGW32_PREFIX)
        }
    }
}

/// The complete set of build-affecting inputs for one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Target CPU architecture, or `auto`.
    pub arch: ArchRequest,
    /// Build profile.
    pub profile: Profile,
    /// Optimization goal; meaningful in release profiles only.
    pub optimize: OptimizeFor,
    /// Link-time optimization mode.
    pub lto: LtoMode,
    /// Add debugging symbols to release builds.
    pub debug_symbols: bool,
    /// Create a separate file containing debugging symbols. Consumed by
    /// the orchestrator's post-link step; carried through unchanged.
    pub separate_debug_symbols: bool,
    /// Windows subsystem.
    pub subsystem: Subsystem,
    /// Link the C++ runtime libraries statically.
    pub static_cpp: bool,
    /// Use the MinGW toolchain even if MSVC is installed.
    pub use_mingw: bool,
    /// Use the LLVM compiler frontend instead of the default one.
    pub use_llvm: bool,
    /// Use address sanitizer (ASAN).
    pub use_asan: bool,
    /// GPU backend selection.
    pub graphics: GraphicsOptions,
    /// MinGW tool prefixes per architecture width.
    pub mingw_prefixes: CrossPrefixes,
    /// Targeted Windows version, >= 0x0601 (Windows 7). Propagated into
    /// the `WINVER` / `_WIN32_WINNT` defines.
    pub target_win_version: String,
    /// MSVC version override. Ignored by the manually configured
    /// backend, where the developer prompt picked the compiler already.
    pub msvc_version: Option<String>,
    /// Parallel job count hinted to full LTO on the GCC frontend.
    pub jobs: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            arch: ArchRequest::Auto,
            profile: Profile::Release,
            optimize: OptimizeFor::Speed,
            lto: LtoMode::Off,
            debug_symbols: true,
            separate_debug_symbols: false,
            subsystem: Subsystem::Gui,
            static_cpp: true,
            use_mingw: false,
            use_llvm: false,
            use_asan: false,
            graphics: GraphicsOptions::default(),
            mingw_prefixes: CrossPrefixes::default(),
            target_win_version: "0x0601".to_string(),
            msvc_version: None,
            jobs: 1,
        }
    }
}

/// Error returned when parsing an invalid option string.
#[derive(Debug, Clone)]
pub struct OptionParseError {
    option: &'static str,
    value: String,
    valid: &'static str,
}

impl OptionParseError {
    fn new(option: &'static str, value: &str, valid: &'static str) -> Self {
        OptionParseError {
            option,
            value: value.to_string(),
            valid,
        }
    }
}

impl fmt::Display for OptionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid {} `{}`, valid values: {}",
            self.option, self.value, self.valid
        )
    }
}

impl std::error::Error for OptionParseError {}
