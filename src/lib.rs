//! Slipway - Windows toolchain resolution for native C/C++ builds
//!
//! This crate resolves the complete compiler/linker configuration for a
//! Windows build target - tool names, flags, preprocessor defines,
//! libraries and search paths - from a declarative set of build options
//! and a snapshot of the host environment. It also drives the external
//! resource compiler (`windres`) that turns `.rc` scripts into linkable
//! objects for cross builds.

pub mod core;
pub mod toolchain;
pub mod util;

pub use crate::core::{
    arch::{Arch, ArchRequest},
    options::{BuildOptions, CrossPrefixes, GraphicsOptions, LtoMode, OptimizeFor, Profile, Subsystem},
};

pub use crate::toolchain::{
    resolve, Backend, ConfigError, HostDetection, ResourceCompiler, ResourceError, ToolchainConfig,
};
