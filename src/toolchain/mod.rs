//! Toolchain resolution for Windows targets.
//!
//! This module turns a [`BuildOptions`](crate::core::options::BuildOptions)
//! value plus a [`HostDetection`] snapshot into a frozen
//! [`ToolchainConfig`] - the complete compiler/linker invocation
//! parameters for one build.
//!
//! Backend selection priority:
//! 1. Manually configured MSVC (a `VCINSTALLDIR` developer prompt), unless
//!    MinGW is forced
//! 2. Auto-detected MSVC installation, unless MinGW is forced
//! 3. MinGW cross toolchain

use std::path::PathBuf;

use serde::Serialize;

use crate::core::arch::Arch;

pub mod errors;
pub mod host;
mod mingw;
mod msvc;
pub mod rescomp;
mod select;

pub use errors::{ConfigError, ResourceError};
pub use host::{HostDetection, ManualMsvcEnv};
pub use rescomp::ResourceCompiler;
pub use select::{resolve, select_backend, validate_arch};

/// Linker stack reservation, bytes. Matches the other desktop targets.
pub const STACK_SIZE: u32 = 8_388_608;

/// The three mutually exclusive toolchain strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    /// MSVC configured by a developer prompt (`VCINSTALLDIR`).
    MsvcManual,
    /// MSVC located by installation detection.
    MsvcAuto,
    /// MinGW, native or cross-compiling.
    Mingw,
}

impl Backend {
    /// Get the backend name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::MsvcManual => "msvc-manual",
            Backend::MsvcAuto => "msvc-auto",
            Backend::Mingw => "mingw",
        }
    }

    /// Whether this backend drives the MSVC toolset. Downstream build
    /// steps branch on this for MSVC-specific quirks such as the
    /// incremental-link workaround when linking programs.
    pub fn is_msvc(&self) -> bool {
        matches!(self, Backend::MsvcManual | Backend::MsvcAuto)
    }
}

/// Resolved tool executable names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolSet {
    /// C compiler
    pub cc: String,
    /// C++ compiler
    pub cxx: String,
    /// Assembler
    pub asm: String,
    /// Archiver / librarian
    pub ar: String,
    /// Archive indexer, where the toolchain has a separate one
    pub ranlib: Option<String>,
    /// Standalone linker; GCC-style toolchains link through the driver
    pub linker: Option<String>,
    /// Resource compiler, present for cross builds only
    pub rc: Option<String>,
}

/// The resolved toolchain configuration for one build.
///
/// Assembled through [`ToolchainBuilder`] and immutable afterwards, so
/// concurrently resolved configurations can never contaminate each
/// other. Two resolutions from identical inputs compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolchainConfig {
    backend: Backend,
    arch: Arch,
    tools: ToolSet,
    cc_flags: Vec<String>,
    cxx_flags: Vec<String>,
    link_flags: Vec<String>,
    ar_flags: Vec<String>,
    defines: Vec<(String, Option<String>)>,
    libs: Vec<String>,
    include_paths: Vec<PathBuf>,
    lib_paths: Vec<PathBuf>,
    program_suffix: String,
    msvc_target_arch: Option<String>,
    msvc_version: Option<String>,
    theora_x86_asm: bool,
    separate_debug_symbols: bool,
}

impl ToolchainConfig {
    /// The selected backend.
    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// The resolved target architecture.
    pub fn arch(&self) -> Arch {
        self.arch
    }

    /// Resolved tool executable names.
    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    /// Flags for both C and C++ compilation.
    pub fn cc_flags(&self) -> &[String] {
        &self.cc_flags
    }

    /// Flags for C++ compilation only.
    pub fn cxx_flags(&self) -> &[String] {
        &self.cxx_flags
    }

    /// Linker flags.
    pub fn link_flags(&self) -> &[String] {
        &self.link_flags
    }

    /// Archiver flags.
    pub fn ar_flags(&self) -> &[String] {
        &self.ar_flags
    }

    /// Preprocessor defines, plain or key/value.
    pub fn defines(&self) -> &[(String, Option<String>)] {
        &self.defines
    }

    /// Libraries to link, without prefix or extension.
    pub fn libs(&self) -> &[String] {
        &self.libs
    }

    /// Include search paths.
    pub fn include_paths(&self) -> &[PathBuf] {
        &self.include_paths
    }

    /// Library search paths.
    pub fn lib_paths(&self) -> &[PathBuf] {
        &self.lib_paths
    }

    /// Suffix appended to produced program names (e.g. `.exe` for cross
    /// builds, `.san` for sanitizer-instrumented builds).
    pub fn program_suffix(&self) -> &str {
        &self.program_suffix
    }

    /// Architecture name handed to MSVC installation setup, when the
    /// auto-detected backend is in use.
    pub fn msvc_target_arch(&self) -> Option<&str> {
        self.msvc_target_arch.as_deref()
    }

    /// MSVC version the build should set up, when known.
    pub fn msvc_version(&self) -> Option<&str> {
        self.msvc_version.as_deref()
    }

    /// Whether the bundled theora codec may use its x86 assembly fast
    /// paths with this compiler.
    pub fn theora_x86_asm(&self) -> bool {
        self.theora_x86_asm
    }

    /// Whether the orchestrator should split debug symbols after linking.
    pub fn separate_debug_symbols(&self) -> bool {
        self.separate_debug_symbols
    }

    /// Shorthand for `backend().is_msvc()`.
    pub fn is_msvc(&self) -> bool {
        self.backend.is_msvc()
    }

    /// Whether a plain define is present.
    pub fn has_define(&self, name: &str) -> bool {
        self.defines.iter().any(|(n, _)| n == name)
    }

    /// The value of a key/value define, if present.
    pub fn define_value(&self, name: &str) -> Option<&str> {
        self.defines
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Whether a compiler flag is present.
    pub fn has_cc_flag(&self, flag: &str) -> bool {
        self.cc_flags.iter().any(|f| f == flag)
    }

    /// Whether a linker flag is present.
    pub fn has_link_flag(&self, flag: &str) -> bool {
        self.link_flags.iter().any(|f| f == flag)
    }
}

/// Incremental builder for [`ToolchainConfig`].
///
/// Configurators accumulate flags in source order; `build` freezes the
/// result. The `*_unique` methods skip flags that are already present,
/// for the handful of flags reachable from more than one rule.
#[derive(Debug)]
pub struct ToolchainBuilder {
    config: ToolchainConfig,
}

impl ToolchainBuilder {
    /// Start a configuration for the given backend, architecture and tools.
    pub fn new(backend: Backend, arch: Arch, tools: ToolSet) -> Self {
        ToolchainBuilder {
            config: ToolchainConfig {
                backend,
                arch,
                tools,
                cc_flags: Vec::new(),
                cxx_flags: Vec::new(),
                link_flags: Vec::new(),
                ar_flags: Vec::new(),
                defines: Vec::new(),
                libs: Vec::new(),
                include_paths: Vec::new(),
                lib_paths: Vec::new(),
                program_suffix: String::new(),
                msvc_target_arch: None,
                msvc_version: None,
                theora_x86_asm: false,
                separate_debug_symbols: false,
            },
        }
    }

    /// Append a compiler flag.
    pub fn cc_flag(mut self, flag: impl Into<String>) -> Self {
        self.config.cc_flags.push(flag.into());
        self
    }

    /// Append multiple compiler flags.
    pub fn cc_flags(mut self, flags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.config.cc_flags.extend(flags.into_iter().map(|f| f.into()));
        self
    }

    /// Insert a compiler flag at the front.
    pub fn cc_flag_front(mut self, flag: impl Into<String>) -> Self {
        self.config.cc_flags.insert(0, flag.into());
        self
    }

    /// Append a compiler flag unless already present.
    pub fn cc_flag_unique(mut self, flag: impl Into<String>) -> Self {
        let flag = flag.into();
        if !self.config.cc_flags.contains(&flag) {
            self.config.cc_flags.push(flag);
        }
        self
    }

    /// Append a C++-only compiler flag.
    pub fn cxx_flag(mut self, flag: impl Into<String>) -> Self {
        self.config.cxx_flags.push(flag.into());
        self
    }

    /// Append a linker flag.
    pub fn link_flag(mut self, flag: impl Into<String>) -> Self {
        self.config.link_flags.push(flag.into());
        self
    }

    /// Append a linker flag unless already present.
    pub fn link_flag_unique(mut self, flag: impl Into<String>) -> Self {
        let flag = flag.into();
        if !self.config.link_flags.contains(&flag) {
            self.config.link_flags.push(flag);
        }
        self
    }

    /// Append an archiver flag.
    pub fn ar_flag(mut self, flag: impl Into<String>) -> Self {
        self.config.ar_flags.push(flag.into());
        self
    }

    /// Add a plain preprocessor define, deduplicated by name.
    pub fn define(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.config.defines.iter().any(|(n, _)| *n == name) {
            self.config.defines.push((name, None));
        }
        self
    }

    /// Add a key/value preprocessor define, deduplicated by name.
    pub fn define_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        if !self.config.defines.iter().any(|(n, _)| *n == name) {
            self.config.defines.push((name, Some(value.into())));
        }
        self
    }

    /// Add a library.
    pub fn lib(mut self, name: impl Into<String>) -> Self {
        self.config.libs.push(name.into());
        self
    }

    /// Add multiple libraries.
    pub fn libs(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.config.libs.extend(names.into_iter().map(|n| n.into()));
        self
    }

    /// Append an include search path.
    pub fn include_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.include_paths.push(path.into());
        self
    }

    /// Splice include search paths in front of the existing ones,
    /// preserving their order.
    pub fn include_paths_front(mut self, paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        let mut front: Vec<PathBuf> = paths.into_iter().map(|p| p.into()).collect();
        front.append(&mut self.config.include_paths);
        self.config.include_paths = front;
        self
    }

    /// Append a library search path.
    pub fn lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.lib_paths.push(path.into());
        self
    }

    /// Append multiple library search paths.
    pub fn lib_paths(mut self, paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.config.lib_paths.extend(paths.into_iter().map(|p| p.into()));
        self
    }

    /// Append to the produced program name suffix.
    pub fn push_suffix(mut self, suffix: &str) -> Self {
        self.config.program_suffix.push_str(suffix);
        self
    }

    /// Record the architecture name for MSVC installation setup.
    pub fn msvc_target_arch(mut self, name: impl Into<String>) -> Self {
        self.config.msvc_target_arch = Some(name.into());
        self
    }

    /// Record the MSVC version to set up.
    pub fn msvc_version(mut self, version: impl Into<String>) -> Self {
        self.config.msvc_version = Some(version.into());
        self
    }

    /// Set whether the theora x86 assembly fast paths are usable.
    pub fn theora_x86_asm(mut self, enabled: bool) -> Self {
        self.config.theora_x86_asm = enabled;
        self
    }

    /// Set whether debug symbols are split into a separate file.
    pub fn separate_debug_symbols(mut self, enabled: bool) -> Self {
        self.config.separate_debug_symbols = enabled;
        self
    }

    /// Freeze the configuration.
    pub fn build(self) -> ToolchainConfig {
        self.config
    }
}
