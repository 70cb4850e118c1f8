//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Slipway - Windows toolchain resolution for native builds
#[derive(Parser)]
#[command(name = "slipway")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the toolchain configuration for a set of build options
    Resolve(ResolveArgs),

    /// Compile Windows resource scripts into linkable objects
    Windres(WindresArgs),

    /// Report host compiler detection results
    Doctor(DoctorArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Target CPU architecture: x86_32, x86_64, arm32, arm64, or auto [default: auto]
    #[arg(long)]
    pub arch: Option<String>,

    /// Build profile: release, release_debug, debug [default: release]
    #[arg(long)]
    pub profile: Option<String>,

    /// Optimization goal for release profiles: speed, size [default: speed]
    #[arg(long)]
    pub optimize: Option<String>,

    /// Link-time optimization mode: off, full, thin [default: off]
    #[arg(long)]
    pub lto: Option<String>,

    /// Add debugging symbols to release builds [default: true]
    #[arg(long)]
    pub debug_symbols: Option<bool>,

    /// Create a separate file containing debugging symbols
    #[arg(long)]
    pub separate_debug_symbols: bool,

    /// Windows subsystem: gui, console [default: gui]
    #[arg(long)]
    pub subsystem: Option<String>,

    /// Link the C++ runtime libraries statically [default: true]
    #[arg(long)]
    pub static_cpp: Option<bool>,

    /// Use the MinGW toolchain, even if MSVC is installed
    #[arg(long)]
    pub use_mingw: bool,

    /// Use the LLVM compiler frontend
    #[arg(long)]
    pub use_llvm: bool,

    /// Use address sanitizer (ASAN)
    #[arg(long)]
    pub use_asan: bool,

    /// Compile in the Vulkan renderer [default: true]
    #[arg(long)]
    pub vulkan: Option<bool>,

    /// Link the Vulkan loader statically (volk)
    #[arg(long)]
    pub use_volk: bool,

    /// Compile in the OpenGL 3 renderer [default: true]
    #[arg(long)]
    pub opengl3: Option<bool>,

    /// MinGW tool prefix for 32-bit targets
    #[arg(long, env = "MINGW32_PREFIX")]
    pub mingw_prefix_32: Option<String>,

    /// MinGW tool prefix for 64-bit targets
    #[arg(long, env = "MINGW64_PREFIX")]
    pub mingw_prefix_64: Option<String>,

    /// Targeted Windows version, >= 0x0601 (Windows 7) [default: 0x0601]
    #[arg(long)]
    pub target_win_version: Option<String>,

    /// MSVC version to use. Ignored if VCINSTALLDIR is set in the shell env
    #[arg(long)]
    pub msvc_version: Option<String>,

    /// Number of parallel jobs, hinted to link-time optimization
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Output format: text, json
    #[arg(long, default_value = "text")]
    pub format: String,
}

#[derive(Args)]
pub struct WindresArgs {
    /// Resource compilations as SOURCE=OUTPUT pairs
    #[arg(required = true)]
    pub pairs: Vec<String>,

    /// Include search directory passed to the resource compiler
    #[arg(long, default_value = ".")]
    pub include_dir: PathBuf,

    /// Target CPU architecture used to pick the tool prefix [default: auto]
    #[arg(long)]
    pub arch: Option<String>,

    /// MinGW tool prefix for 32-bit targets
    #[arg(long, env = "MINGW32_PREFIX")]
    pub mingw_prefix_32: Option<String>,

    /// MinGW tool prefix for 64-bit targets
    #[arg(long, env = "MINGW64_PREFIX")]
    pub mingw_prefix_64: Option<String>,
}

#[derive(Args)]
pub struct DoctorArgs {
    /// Also probe the 32-bit cross toolchain
    #[arg(long)]
    pub all_widths: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
