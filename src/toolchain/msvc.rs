//! MSVC backend configuration.
//!
//! Covers both the manually configured variant (a `VCINSTALLDIR`
//! developer prompt) and the auto-detected installation. The two differ
//! only in how the target architecture and search paths are obtained;
//! flag derivation is shared.

use crate::core::arch::{Arch, ArchRequest};
use crate::core::options::{BuildOptions, LtoMode, OptimizeFor, Profile, Subsystem};

use super::errors::ConfigError;
use super::host::ManualMsvcEnv;
use super::{Backend, ToolSet, ToolchainBuilder, ToolchainConfig, STACK_SIZE};

/// Windows system libraries every MSVC build links against.
const SYSTEM_LIBS: &[&str] = &[
    "winmm", "dsound", "kernel32", "ole32", "oleaut32", "sapi", "user32", "gdi32", "IPHLPAPI",
    "Shlwapi", "wsock32", "Ws2_32", "shell32", "advapi32", "dinput8", "dxguid", "imm32", "bcrypt",
    "Avrt", "dwmapi", "dwrite",
];

/// Backend-specific results of setting up an MSVC variant.
#[derive(Debug)]
pub(crate) struct MsvcSetup {
    /// Architecture name handed to MSVC installation setup (auto only).
    pub target_arch: Option<String>,
    /// Version the build should set up, override or detected.
    pub version: Option<String>,
    /// Whether the theora x86 assembly fast paths are usable.
    pub theora_x86_asm: bool,
}

/// Set up the manually configured MSVC backend.
///
/// The developer prompt already fixed the target, so the architecture
/// must be the `auto` sentinel and is derived from the compiler flavor
/// the prompt put on `PATH`, never the other way around.
pub(crate) fn setup_manual(
    opts: &BuildOptions,
    manual: &ManualMsvcEnv,
) -> Result<(Arch, MsvcSetup), ConfigError> {
    if let ArchRequest::Explicit(arch) = opts.arch {
        return Err(ConfigError::ManualArchOverride {
            arch: arch.to_string(),
        });
    }

    let reported = manual.compiler_arch.as_deref();
    match reported {
        Some("amd64") | Some("x86_amd64") => {
            tracing::info!(
                "found MSVC compiler `{}`, producing a 64-bit executable (forcing arch=x86_64)",
                reported.unwrap_or_default()
            );
            // The 64-bit compiler cannot assemble the inline x86 fast
            // paths of the bundled theora codec.
            Ok((
                Arch::X86_64,
                MsvcSetup {
                    target_arch: None,
                    version: None,
                    theora_x86_asm: false,
                },
            ))
        }
        Some("x86") | Some("amd64_x86") => {
            tracing::info!(
                "found MSVC compiler `{}`, producing a 32-bit executable (forcing arch=x86_32)",
                reported.unwrap_or_default()
            );
            Ok((
                Arch::X86_32,
                MsvcSetup {
                    target_arch: None,
                    version: None,
                    theora_x86_asm: true,
                },
            ))
        }
        other => Err(ConfigError::UnknownCompilerArch {
            reported: other.unwrap_or("none").to_string(),
        }),
    }
}

/// Set up the auto-detected MSVC backend.
///
/// MSVC names 32-bit targets differently, so the two 32-bit
/// architectures are renamed for installation setup; 64-bit names pass
/// through unchanged. Nothing is cached between resolutions - the
/// configuration is rebuilt from the detection result on every call, so
/// a version override always takes effect.
pub(crate) fn setup_auto(opts: &BuildOptions, detected_version: &str, arch: Arch) -> MsvcSetup {
    let target_arch = match arch {
        Arch::X86_32 => "x86",
        Arch::Arm32 => "arm",
        other => other.as_str(),
    };

    let version = opts
        .msvc_version
        .clone()
        .unwrap_or_else(|| detected_version.to_string());

    tracing::info!("found MSVC version {}, arch {}", version, target_arch);

    MsvcSetup {
        target_arch: Some(target_arch.to_string()),
        version: Some(version),
        // The 32-bit auto-detected compiler miscompiles the theora x86
        // assembly, so the fast paths stay off for both widths here.
        theora_x86_asm: false,
    }
}

/// Derive the full MSVC configuration.
pub(crate) fn configure(
    opts: &BuildOptions,
    arch: Arch,
    manual: Option<&ManualMsvcEnv>,
    backend: Backend,
    setup: MsvcSetup,
) -> ToolchainConfig {
    let mut b = ToolchainBuilder::new(backend, arch, msvc_tools(arch));

    if let Some(target_arch) = setup.target_arch {
        b = b.msvc_target_arch(target_arch);
    }
    if let Some(version) = setup.version {
        b = b.msvc_version(version);
    }
    b = b.theora_x86_asm(setup.theora_x86_asm);
    b = b.separate_debug_symbols(opts.separate_debug_symbols);

    // Build type
    match opts.profile {
        Profile::Release => {
            b = match opts.optimize {
                OptimizeFor::Speed => b.cc_flag("/O2"),
                OptimizeFor::Size => b.cc_flag("/O1"),
            };
            b = b.link_flag("/OPT:REF");
            b = b.link_flag("/ENTRY:mainCRTStartup");
        }
        Profile::ReleaseDebug => {
            // Same optimization as release, but keep dead code so the
            // debug info stays usable; no entry-point override either.
            b = match opts.optimize {
                OptimizeFor::Speed => b.cc_flag("/O2"),
                OptimizeFor::Size => b.cc_flag("/O1"),
            };
        }
        Profile::Debug => {
            b = b
                .cc_flag_unique("/Zi")
                .cc_flag_unique("/FS")
                .cc_flag_unique("/Od")
                .cc_flag_unique("/EHsc");
            b = b.link_flag("/DEBUG");
        }
    }

    if opts.debug_symbols {
        b = b.cc_flag_unique("/Zi").cc_flag_unique("/FS");
        b = b.link_flag_unique("/DEBUG");
    }

    b = match opts.subsystem {
        Subsystem::Gui => b.link_flag("/SUBSYSTEM:WINDOWS"),
        Subsystem::Console => b
            .link_flag("/SUBSYSTEM:CONSOLE")
            .define("WINDOWS_SUBSYSTEM_CONSOLE"),
    };

    // Compile/link flags

    b = if opts.static_cpp {
        b.cc_flag_unique("/MT")
    } else {
        b.cc_flag_unique("/MD")
    };

    b = b.cc_flags(["/Gd", "/GR", "/nologo"]);
    // Force Unicode source encoding.
    b = b.cc_flag("/utf-8");
    // All sources are compiled as C++.
    b = b.cxx_flag("/TP");
    // Release objects grew past the 16-bit section limit too, so big
    // objects are allowed unconditionally here (GCC is pickier, see the
    // MinGW configurator).
    b = b.cc_flag("/bigobj");

    if let Some(manual) = manual {
        match &manual.sdk_dir {
            Some(sdk) => b = b.include_paths_front([sdk.join("Include")]),
            None => tracing::warn!("missing environment variable: WindowsSdkDir"),
        }
    }

    b = b
        .define("WINDOWS_ENABLED")
        .define("WASAPI_ENABLED")
        .define("WINMIDI_ENABLED")
        .define("TYPED_METHOD_BIND")
        .define("WIN32")
        .define("MSVC")
        .define_value("WINVER", &opts.target_win_version)
        .define_value("_WIN32_WINNT", &opts.target_win_version);
    // Keep WinDef.h from defining min/max macros.
    b = b.define("NOMINMAX");
    if arch.is_64_bit() {
        b = b.define("_WIN64");
    }

    // Libs

    b = b.libs(SYSTEM_LIBS.iter().copied());

    if opts.graphics.vulkan.enabled {
        b = b.define("VULKAN_ENABLED");
        if !opts.graphics.vulkan.static_loader {
            b = b.lib("vulkan");
        }
    }
    if opts.graphics.opengl3.enabled {
        b = b.define("GLES3_ENABLED");
        if !opts.graphics.opengl3.static_loader {
            b = b.lib("opengl32");
        }
    }

    if let Some(manual) = manual {
        if let Some(sdk) = &manual.sdk_dir {
            b = b.lib_path(sdk.join("Lib"));
        }
    }

    // LTO

    if opts.lto != LtoMode::Off {
        // There is no thin variant of LTCG; both modes map to it.
        b = b.cc_flag_unique("/GL");
        b = b.ar_flag("/LTCG");
        b = b.link_flag_unique("/LTCG");
    }

    if let Some(manual) = manual {
        b = b.include_paths_front(manual.include_paths.iter().cloned());
        b = b.lib_paths(manual.lib_paths.iter().cloned());
    }

    // Sanitizers
    if opts.use_asan {
        b = b.push_suffix(".san");
        b = b.link_flag("/INFERASANLIBS");
        b = b.cc_flag("/fsanitize=address");
    }

    b = b.link_flag_unique(format!("/STACK:{STACK_SIZE}"));

    b.build()
}

/// Tool executable names for the MSVC toolset.
fn msvc_tools(arch: Arch) -> ToolSet {
    let asm = match arch {
        Arch::X86_32 => "ml",
        Arch::X86_64 => "ml64",
        Arch::Arm32 => "armasm",
        Arch::Arm64 => "armasm64",
    };
    ToolSet {
        cc: "cl".to_string(),
        cxx: "cl".to_string(),
        asm: asm.to_string(),
        ar: "lib".to_string(),
        ranlib: None,
        linker: Some("link".to_string()),
        rc: None,
    }
}
