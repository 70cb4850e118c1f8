//! Target CPU architectures for Windows builds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::toolchain::errors::ConfigError;

/// A concrete target CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Arch {
    /// 32-bit x86
    #[serde(rename = "x86_32")]
    X86_32,
    /// 64-bit x86
    #[serde(rename = "x86_64")]
    X86_64,
    /// 32-bit ARM
    #[serde(rename = "arm32")]
    Arm32,
    /// 64-bit ARM
    #[serde(rename = "arm64")]
    Arm64,
}

/// Architectures the Windows target can build for.
pub const SUPPORTED_ARCHES: &[Arch] = &[Arch::X86_32, Arch::X86_64, Arch::Arm32, Arch::Arm64];

impl Arch {
    /// Get the architecture name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::X86_32 => "x86_32",
            Arch::X86_64 => "x86_64",
            Arch::Arm32 => "arm32",
            Arch::Arm64 => "arm64",
        }
    }

    /// Whether this architecture has 64-bit pointers.
    pub fn is_64_bit(&self) -> bool {
        matches!(self, Arch::X86_64 | Arch::Arm64)
    }

    /// Whether this is an x86-family architecture.
    pub fn is_x86(&self) -> bool {
        matches!(self, Arch::X86_32 | Arch::X86_64)
    }

    /// The architecture of the machine we are running on.
    pub fn host() -> Arch {
        match std::env::consts::ARCH {
            "x86" => Arch::X86_32,
            "x86_64" => Arch::X86_64,
            "arm" => Arch::Arm32,
            "aarch64" => Arch::Arm64,
            other => {
                tracing::warn!("unrecognized host architecture `{}`, assuming x86_64", other);
                Arch::X86_64
            }
        }
    }

    /// The supported set formatted for diagnostics.
    pub fn supported_list() -> String {
        SUPPORTED_ARCHES
            .iter()
            .map(|a| a.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for Arch {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x86_32" => Ok(Arch::X86_32),
            "x86_64" => Ok(Arch::X86_64),
            "arm32" => Ok(Arch::Arm32),
            "arm64" => Ok(Arch::Arm64),
            other => Err(ConfigError::UnsupportedArch {
                arch: other.to_string(),
                supported: Arch::supported_list(),
            }),
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A requested architecture: either an explicit value or `auto`.
///
/// `auto` resolves to the host architecture for the auto-detected and
/// cross backends. The manually configured MSVC backend *requires*
/// `auto`, since the developer prompt already fixed the target and the
/// compiler's reported architecture is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArchRequest {
    /// Derive the architecture from the host or the detected compiler.
    #[default]
    Auto,
    /// A user-specified architecture.
    Explicit(Arch),
}

impl ArchRequest {
    /// Resolve `auto` against the host architecture.
    pub fn or_host(self) -> Arch {
        match self {
            ArchRequest::Auto => Arch::host(),
            ArchRequest::Explicit(arch) => arch,
        }
    }
}

impl FromStr for ArchRequest {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "auto" {
            Ok(ArchRequest::Auto)
        } else {
            s.parse().map(ArchRequest::Explicit)
        }
    }
}

impl fmt::Display for ArchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchRequest::Auto => f.write_str("auto"),
            ArchRequest::Explicit(arch) => arch.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arch_parse_roundtrip() {
        for arch in SUPPORTED_ARCHES {
            assert_eq!(arch.as_str().parse::<Arch>().unwrap(), *arch);
        }
    }

    #[test]
    fn test_arch_parse_rejects_unknown() {
        let err = "x86_128".parse::<Arch>().unwrap_err();
        match err {
            ConfigError::UnsupportedArch { arch, supported } => {
                assert_eq!(arch, "x86_128");
                assert!(supported.contains("x86_64"));
                assert!(supported.contains("arm64"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_arch_request_parse() {
        assert_eq!("auto".parse::<ArchRequest>().unwrap(), ArchRequest::Auto);
        assert_eq!(
            "arm64".parse::<ArchRequest>().unwrap(),
            ArchRequest::Explicit(Arch::Arm64)
        );
        assert!("sparc".parse::<ArchRequest>().is_err());
    }

    #[test]
    fn test_width() {
        assert!(Arch::X86_64.is_64_bit());
        assert!(Arch::Arm64.is_64_bit());
        assert!(!Arch::X86_32.is_64_bit());
        assert!(!Arch::Arm32.is_64_bit());
    }
}
