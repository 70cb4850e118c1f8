//! Host-environment detection.
//!
//! Everything the resolver needs to know about the host is captured
//! once into an immutable [`HostDetection`] value. The resolver itself
//! never consults ambient environment state, which keeps resolution a
//! pure function of its inputs.

use std::env;
use std::path::{Path, PathBuf};

use crate::core::arch::Arch;
use crate::core::options::CrossPrefixes;
use crate::util::process::ProcessBuilder;

/// Signals read from the host environment, captured once per invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostDetection {
    /// Present when a developer prompt configured MSVC manually.
    pub msvc_manual: Option<ManualMsvcEnv>,
    /// Version string of an auto-detected MSVC installation.
    pub msvc_version: Option<String>,
}

/// The MSVC environment a developer prompt set up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualMsvcEnv {
    /// Value of `VCINSTALLDIR`.
    pub vc_install_dir: PathBuf,
    /// The compiler flavor the prompt put on `PATH` (`amd64`,
    /// `x86_amd64`, `amd64_x86` or `x86`), when identifiable.
    pub compiler_arch: Option<String>,
    /// Value of `WindowsSdkDir`, when set.
    pub sdk_dir: Option<PathBuf>,
    /// Entries of the `INCLUDE` search-path list.
    pub include_paths: Vec<PathBuf>,
    /// Entries of the `LIB` search-path list.
    pub lib_paths: Vec<PathBuf>,
}

impl HostDetection {
    /// Capture the host environment.
    pub fn from_env() -> Self {
        let msvc_manual = env::var_os("VCINSTALLDIR").map(|dir| {
            let vc_install_dir = PathBuf::from(dir);
            ManualMsvcEnv {
                compiler_arch: detect_compiler_arch(&vc_install_dir),
                sdk_dir: env::var_os("WindowsSdkDir").map(PathBuf::from),
                include_paths: split_path_list(env::var("INCLUDE").ok()),
                lib_paths: split_path_list(env::var("LIB").ok()),
                vc_install_dir,
            }
        });

        HostDetection {
            msvc_manual,
            msvc_version: detect_msvc_version(),
        }
    }

    /// A host with no native compiler signals.
    pub fn none() -> Self {
        HostDetection::default()
    }
}

/// Split a `;`-separated search-path list.
fn split_path_list(value: Option<String>) -> Vec<PathBuf> {
    value
        .map(|v| {
            v.split(';')
                .filter(|p| !p.is_empty())
                .map(PathBuf::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Identify which compiler flavor the developer prompt put on `PATH`.
///
/// The prompt prepends one of the `VC\bin` directories; its name tells
/// us what the compiler targets (`amd64`, `x86_amd64` for the 32-bit
/// hosted 64-bit cross compiler, `amd64_x86` for the reverse, or the
/// plain `bin` directory for 32-bit). Newer prompts also export the
/// target directly in `VSCMD_ARG_TGT_ARCH`.
fn detect_compiler_arch(vc_dir: &Path) -> Option<String> {
    if let Ok(path) = env::var("PATH") {
        for entry in env::split_paths(&path) {
            if !entry.starts_with(vc_dir) {
                continue;
            }
            let Some(name) = entry.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            match name.to_ascii_lowercase().as_str() {
                "amd64" | "x86_amd64" | "amd64_x86" => return Some(name.to_ascii_lowercase()),
                "bin" => return Some("x86".to_string()),
                _ => {}
            }
        }
    }

    match env::var("VSCMD_ARG_TGT_ARCH").ok().as_deref() {
        Some("x64") => Some("amd64".to_string()),
        Some(other) => Some(other.to_string()),
        None => None,
    }
}

/// Probe for an MSVC installation version using `vswhere`.
#[cfg(windows)]
fn detect_msvc_version() -> Option<String> {
    let vswhere = find_vswhere()?;
    let output = ProcessBuilder::new(&vswhere)
        .args([
            "-latest",
            "-products",
            "*",
            "-requires",
            "Microsoft.VisualStudio.Component.VC.Tools.x86.x64",
            "-property",
            "installationVersion",
            "-format",
            "value",
        ])
        .exec()
        .ok()?;

    if !output.status.success() {
        tracing::debug!(
            "vswhere failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        return None;
    }

    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if version.is_empty() {
        None
    } else {
        Some(version)
    }
}

/// Find `vswhere.exe` in its standard location, then on `PATH`.
#[cfg(windows)]
fn find_vswhere() -> Option<PathBuf> {
    let program_files_x86 =
        env::var("ProgramFiles(x86)").unwrap_or_else(|_| "C:\\Program Files (x86)".to_string());

    let standard_path = PathBuf::from(&program_files_x86)
        .join("Microsoft Visual Studio")
        .join("Installer")
        .join("vswhere.exe");

    if standard_path.exists() {
        return Some(standard_path);
    }

    which::which("vswhere").ok()
}

/// MSVC cannot be auto-detected on non-Windows hosts.
#[cfg(not(windows))]
fn detect_msvc_version() -> Option<String> {
    None
}

/// Check whether a MinGW cross toolchain answers for either width.
pub fn mingw_available(prefixes: &CrossPrefixes) -> bool {
    mingw_responds(prefixes.for_arch(Arch::X86_64)) || mingw_responds(prefixes.for_arch(Arch::X86_32))
}

/// Check whether `<prefix>gcc` runs and reports a version.
pub fn mingw_responds(prefix: &str) -> bool {
    let gcc = format!("{prefix}gcc");
    ProcessBuilder::new(&gcc)
        .arg("--version")
        .exec()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_path_list() {
        let paths = split_path_list(Some("C:\\a;C:\\b;;C:\\c".to_string()));
        assert_eq!(
            paths,
            [
                PathBuf::from("C:\\a"),
                PathBuf::from("C:\\b"),
                PathBuf::from("C:\\c")
            ]
        );
        assert!(split_path_list(None).is_empty());
    }

    #[test]
    fn test_none_has_no_signals() {
        let host = HostDetection::none();
        assert!(host.msvc_manual.is_none());
        assert!(host.msvc_version.is_none());
    }

    #[test]
    fn test_mingw_responds_handles_missing_tool() {
        assert!(!mingw_responds("definitely-not-a-real-toolchain-"));
    }

    #[test]
    fn test_mingw_available_with_bogus_prefixes() {
        let prefixes = CrossPrefixes {
            win32: Some("no-such-tool-32-".to_string()),
            win64: Some("no-such-tool-64-".to_string()),
        };
        assert!(!mingw_available(&prefixes));
    }
}
