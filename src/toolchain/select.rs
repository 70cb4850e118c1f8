//! Backend selection and top-level resolution.

use crate::core::arch::{Arch, ArchRequest, SUPPORTED_ARCHES};
use crate::core::options::BuildOptions;

use super::errors::ConfigError;
use super::host::{HostDetection, ManualMsvcEnv};
use super::{mingw, msvc, Backend, ToolchainConfig};

/// Backend choice with the host signals it was made from.
enum Selection<'a> {
    MsvcManual(&'a ManualMsvcEnv),
    MsvcAuto { detected_version: &'a str },
    Mingw,
}

/// Pick the backend. First match wins:
/// 1. A developer prompt configured MSVC manually - an explicit user
///    override, so it beats auto-detection.
/// 2. An MSVC installation was detected.
/// 3. MinGW, which `use_mingw` also forces regardless of host signals.
fn select<'a>(host: &'a HostDetection, opts: &BuildOptions) -> Selection<'a> {
    if !opts.use_mingw {
        if let Some(manual) = &host.msvc_manual {
            return Selection::MsvcManual(manual);
        }
        if let Some(version) = &host.msvc_version {
            return Selection::MsvcAuto {
                detected_version: version,
            };
        }
    }
    Selection::Mingw
}

/// The backend [`resolve`] would use, as a plain tag.
pub fn select_backend(host: &HostDetection, opts: &BuildOptions) -> Backend {
    match select(host, opts) {
        Selection::MsvcManual(_) => Backend::MsvcManual,
        Selection::MsvcAuto { .. } => Backend::MsvcAuto,
        Selection::Mingw => Backend::Mingw,
    }
}

/// Check an explicit architecture against the Windows supported set.
pub fn validate_arch(arch: Arch) -> Result<(), ConfigError> {
    if SUPPORTED_ARCHES.contains(&arch) {
        Ok(())
    } else {
        Err(ConfigError::UnsupportedArch {
            arch: arch.to_string(),
            supported: Arch::supported_list(),
        })
    }
}

/// Resolve the toolchain configuration for one build.
///
/// A pure function of the option set and the host snapshot: no ambient
/// state is consulted, nothing is cached, and identical inputs yield
/// identical configurations. On error no partial configuration exists.
pub fn resolve(opts: &BuildOptions, host: &HostDetection) -> Result<ToolchainConfig, ConfigError> {
    if let ArchRequest::Explicit(arch) = opts.arch {
        validate_arch(arch)?;
    }

    let selection = select(host, opts);
    let backend = match &selection {
        Selection::MsvcManual(_) => Backend::MsvcManual,
        Selection::MsvcAuto { .. } => Backend::MsvcAuto,
        Selection::Mingw => Backend::Mingw,
    };
    tracing::debug!(backend = backend.as_str(), "selected toolchain backend");

    match selection {
        Selection::MsvcManual(manual) => {
            let (arch, setup) = msvc::setup_manual(opts, manual)?;
            Ok(msvc::configure(
                opts,
                arch,
                Some(manual),
                Backend::MsvcManual,
                setup,
            ))
        }
        Selection::MsvcAuto { detected_version } => {
            let arch = opts.arch.or_host();
            let setup = msvc::setup_auto(opts, detected_version, arch);
            Ok(msvc::configure(opts, arch, None, Backend::MsvcAuto, setup))
        }
        Selection::Mingw => {
            let arch = opts.arch.or_host();
            Ok(mingw::configure(opts, arch))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn manual_host() -> HostDetection {
        HostDetection {
            msvc_manual: Some(ManualMsvcEnv {
                vc_install_dir: PathBuf::from("C:\\VC"),
                compiler_arch: Some("amd64".to_string()),
                sdk_dir: Some(PathBuf::from("C:\\SDK")),
                include_paths: Vec::new(),
                lib_paths: Vec::new(),
            }),
            msvc_version: None,
        }
    }

    fn auto_host() -> HostDetection {
        HostDetection {
            msvc_manual: None,
            msvc_version: Some("14.1".to_string()),
        }
    }

    fn both_host() -> HostDetection {
        HostDetection {
            msvc_manual: manual_host().msvc_manual,
            msvc_version: Some("14.1".to_string()),
        }
    }

    #[test]
    fn test_manual_beats_auto_detection() {
        let opts = BuildOptions::default();
        assert_eq!(select_backend(&both_host(), &opts), Backend::MsvcManual);
    }

    #[test]
    fn test_auto_when_no_manual_signal() {
        let opts = BuildOptions::default();
        assert_eq!(select_backend(&auto_host(), &opts), Backend::MsvcAuto);
    }

    #[test]
    fn test_mingw_when_no_native_signals() {
        let opts = BuildOptions::default();
        assert_eq!(select_backend(&HostDetection::none(), &opts), Backend::Mingw);
    }

    #[test]
    fn test_use_mingw_forces_cross_backend() {
        let opts = BuildOptions {
            use_mingw: true,
            ..BuildOptions::default()
        };
        assert_eq!(select_backend(&both_host(), &opts), Backend::Mingw);
        assert_eq!(select_backend(&auto_host(), &opts), Backend::Mingw);
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let opts = BuildOptions {
            arch: ArchRequest::Explicit(Arch::X86_64),
            ..BuildOptions::default()
        };
        let host = auto_host();
        let first = resolve(&opts, &host).unwrap();
        let second = resolve(&opts, &host).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_resolve_auto_native_release_speed_scenario() {
        let opts = BuildOptions {
            arch: ArchRequest::Explicit(Arch::X86_64),
            ..BuildOptions::default()
        };
        let config = resolve(&opts, &auto_host()).unwrap();

        assert_eq!(config.backend(), Backend::MsvcAuto);
        assert_eq!(config.arch(), Arch::X86_64);
        assert!(config.has_cc_flag("/O2"));
        assert!(config.has_link_flag("/OPT:REF"));
        assert!(config.has_define("_WIN64"));
        assert!(!config.has_define("WINDOWS_SUBSYSTEM_CONSOLE"));
        assert_eq!(config.msvc_target_arch(), Some("x86_64"));
        assert_eq!(config.msvc_version(), Some("14.1"));
    }

    #[test]
    fn test_resolve_manual_with_explicit_arch_fails() {
        let opts = BuildOptions {
            arch: ArchRequest::Explicit(Arch::X86_64),
            ..BuildOptions::default()
        };
        let err = resolve(&opts, &manual_host()).unwrap_err();
        assert!(matches!(err, ConfigError::ManualArchOverride { .. }));
    }

    #[test]
    fn test_resolve_manual_derives_arch_from_compiler() {
        let opts = BuildOptions::default();
        let config = resolve(&opts, &manual_host()).unwrap();
        assert_eq!(config.backend(), Backend::MsvcManual);
        assert_eq!(config.arch(), Arch::X86_64);
        // Manual setup never feeds installation detection.
        assert_eq!(config.msvc_target_arch(), None);
    }

    #[test]
    fn test_resource_compiler_follows_backend() {
        use super::super::ResourceCompiler;

        let opts = BuildOptions {
            arch: ArchRequest::Explicit(Arch::X86_64),
            use_mingw: true,
            ..BuildOptions::default()
        };
        let config = resolve(&opts, &HostDetection::none()).unwrap();
        let rc = ResourceCompiler::from_config(&config).unwrap();
        assert_eq!(
            rc.windres(),
            std::path::Path::new("x86_64-w64-mingw32-windres")
        );

        // MSVC builds compile resources through their own toolset.
        let opts = BuildOptions {
            arch: ArchRequest::Explicit(Arch::X86_64),
            ..BuildOptions::default()
        };
        let config = resolve(&opts, &auto_host()).unwrap();
        assert!(ResourceCompiler::from_config(&config).is_none());
    }

    #[test]
    fn test_resolve_mingw_explicit_arch() {
        let opts = BuildOptions {
            arch: ArchRequest::Explicit(Arch::X86_32),
            use_mingw: true,
            ..BuildOptions::default()
        };
        let config = resolve(&opts, &both_host()).unwrap();
        assert_eq!(config.backend(), Backend::Mingw);
        assert_eq!(config.arch(), Arch::X86_32);
        assert!(config.tools().cc.starts_with("i686-w64-mingw32-"));
    }
}
