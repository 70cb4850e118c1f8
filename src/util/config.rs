//! Configuration file support for Slipway.
//!
//! Slipway reads build-option defaults from two locations:
//! - Global: `~/.slipway/config.toml` - user-wide defaults
//! - Project: `.slipway/config.toml` - project-specific overrides
//!
//! Project config takes precedence over global config, and CLI flags
//! override both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::options::{BuildOptions, LtoMode, OptimizeFor, Profile, Subsystem};
use crate::toolchain::errors::ConfigError;

/// Slipway configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build option defaults
    pub build: BuildDefaults,
}

/// Build option defaults from the `[build]` section.
///
/// Every field is optional; unset fields leave the built-in default (or
/// a value from a lower-precedence config) untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildDefaults {
    /// Target architecture (`x86_32`, `x86_64`, `arm32`, `arm64`, `auto`)
    pub arch: Option<String>,
    pub profile: Option<Profile>,
    pub optimize: Option<OptimizeFor>,
    pub lto: Option<LtoMode>,
    pub debug_symbols: Option<bool>,
    pub separate_debug_symbols: Option<bool>,
    pub subsystem: Option<Subsystem>,
    pub static_cpp: Option<bool>,
    pub use_mingw: Option<bool>,
    pub use_llvm: Option<bool>,
    pub use_asan: Option<bool>,
    pub mingw_prefix_32: Option<String>,
    pub mingw_prefix_64: Option<String>,
    pub target_win_version: Option<String>,
    pub msvc_version: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file doesn't
    /// exist or fails to parse.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        macro_rules! take {
            ($($field:ident),* $(,)?) => {
                $(
                    if other.build.$field.is_some() {
                        self.build.$field = other.build.$field;
                    }
                )*
            };
        }
        take!(
            arch,
            profile,
            optimize,
            lto,
            debug_symbols,
            separate_debug_symbols,
            subsystem,
            static_cpp,
            use_mingw,
            use_llvm,
            use_asan,
            mingw_prefix_32,
            mingw_prefix_64,
            target_win_version,
            msvc_version,
        );
    }

    /// Apply the configured defaults onto a set of build options.
    pub fn apply(&self, opts: &mut BuildOptions) -> Result<(), ConfigError> {
        let b = &self.build;
        if let Some(arch) = &b.arch {
            opts.arch = arch.parse()?;
        }
        if let Some(profile) = b.profile {
            opts.profile = profile;
        }
        if let Some(optimize) = b.optimize {
            opts.optimize = optimize;
        }
        if let Some(lto) = b.lto {
            opts.lto = lto;
        }
        if let Some(debug_symbols) = b.debug_symbols {
            opts.debug_symbols = debug_symbols;
        }
        if let Some(separate) = b.separate_debug_symbols {
            opts.separate_debug_symbols = separate;
        }
        if let Some(subsystem) = b.subsystem {
            opts.subsystem = subsystem;
        }
        if let Some(static_cpp) = b.static_cpp {
            opts.static_cpp = static_cpp;
        }
        if let Some(use_mingw) = b.use_mingw {
            opts.use_mingw = use_mingw;
        }
        if let Some(use_llvm) = b.use_llvm {
            opts.use_llvm = use_llvm;
        }
        if let Some(use_asan) = b.use_asan {
            opts.use_asan = use_asan;
        }
        if b.mingw_prefix_32.is_some() {
            opts.mingw_prefixes.win32 = b.mingw_prefix_32.clone();
        }
        if b.mingw_prefix_64.is_some() {
            opts.mingw_prefixes.win64 = b.mingw_prefix_64.clone();
        }
        if let Some(version) = &b.target_win_version {
            opts.target_win_version = version.clone();
        }
        if b.msvc_version.is_some() {
            opts.msvc_version = b.msvc_version.clone();
        }
        Ok(())
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (`.slipway/config.toml`)
/// 2. Global config (`~/.slipway/config.toml`)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global slipway config directory (`~/.slipway`).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".slipway"))
}

/// Get the global config path (`~/.slipway/config.toml`).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (`.slipway/config.toml`).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".slipway").join("config.toml")
}
