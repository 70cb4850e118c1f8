//! MinGW backend configuration.
//!
//! Used for cross-compiling from a POSIX host and as the fallback on
//! Windows hosts without MSVC. Tool names are derived from a per-width
//! prefix so alternate toolchains (llvm-mingw, msys2) slot in through
//! the prefix options.

use crate::core::arch::Arch;
use crate::core::options::{BuildOptions, LtoMode, OptimizeFor, Profile, Subsystem};

use super::{Backend, ToolSet, ToolchainBuilder, ToolchainConfig, STACK_SIZE};

/// System libraries every MinGW build links against.
const SYSTEM_LIBS: &[&str] = &[
    "mingw32", "dsound", "ole32", "d3d9", "winmm", "gdi32", "iphlpapi", "shlwapi", "wsock32",
    "ws2_32", "kernel32", "oleaut32", "sapi", "dinput8", "dxguid", "ksuser", "imm32", "bcrypt",
    "avrt", "uuid", "dwmapi", "dwrite",
];

/// Derive the full MinGW configuration.
pub(crate) fn configure(opts: &BuildOptions, arch: Arch) -> ToolchainConfig {
    let prefix = opts.mingw_prefixes.for_arch(arch);
    let mut b = ToolchainBuilder::new(Backend::Mingw, arch, mingw_tools(prefix, opts.use_llvm));

    b = b.separate_debug_symbols(opts.separate_debug_symbols);

    // Build type
    match opts.profile {
        Profile::Release => {
            if arch.is_x86() {
                b = b.cc_flag("-msse2");
            }
            b = match opts.optimize {
                // 32-bit codegen is known to misbehave at -O3.
                OptimizeFor::Speed if arch == Arch::X86_32 => b.cc_flag("-O2"),
                OptimizeFor::Speed => b.cc_flag("-O3"),
                OptimizeFor::Size => b.cc_flag_front("-Os"),
            };
            if opts.debug_symbols {
                b = b.cc_flag_front("-g2");
            }
        }
        Profile::ReleaseDebug => {
            b = match opts.optimize {
                OptimizeFor::Speed => b.cc_flag("-O2"),
                OptimizeFor::Size => b.cc_flag_front("-Os"),
            };
            if opts.debug_symbols {
                b = b.cc_flag_front("-g2");
            }
        }
        Profile::Debug => {
            b = b.cc_flag("-g3");
            // Big objects are supposed to be free but break GCC LTO, so
            // they stay restricted to debug builds, which are the only
            // ones that overflow sections and are never built with LTO.
            b = b.cc_flag("-Wa,-mbig-obj");
        }
    }

    b = match opts.subsystem {
        Subsystem::Gui => b.link_flag("-Wl,--subsystem,windows"),
        Subsystem::Console => b
            .link_flag("-Wl,--subsystem,console")
            .define("WINDOWS_SUBSYSTEM_CONSOLE"),
    };

    // Compiler configuration

    if cfg!(not(windows)) {
        // Cross-building from a POSIX host; the suffix must be spelled out.
        b = b.push_suffix(".exe");
    }

    if opts.static_cpp {
        b = b.link_flag("-static");
        if arch == Arch::X86_32 {
            b = b.link_flag("-static-libgcc").link_flag("-static-libstdc++");
        }
    }

    b = b.theora_x86_asm(true);

    if opts.lto != LtoMode::Off {
        if !opts.use_llvm && opts.jobs > 1 {
            // GCC parallelizes full LTO through the job count.
            b = b.cc_flag("-flto");
            b = b.link_flag(format!("-flto={}", opts.jobs));
        } else if opts.lto == LtoMode::Thin {
            b = b.cc_flag("-flto=thin");
            b = b.link_flag("-flto=thin");
        } else {
            b = b.cc_flag("-flto");
            b = b.link_flag("-flto");
        }
    }

    b = b.link_flag_unique(format!("-Wl,--stack,{STACK_SIZE}"));

    // Compile flags

    b = b.cc_flag("-mwindows");

    b = b
        .define("WINDOWS_ENABLED")
        .define("WASAPI_ENABLED")
        .define("WINMIDI_ENABLED")
        .define_value("WINVER", &opts.target_win_version)
        .define_value("_WIN32_WINNT", &opts.target_win_version);
    if arch.is_64_bit() {
        b = b.define("_WIN64");
    }

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

    b = b
        .define("MINGW_ENABLED")
        .define_value("MINGW_HAS_SECURE_API", "1");

    // Sanitizers
    if opts.use_asan {
        b = b.push_suffix(".san");
        b = b.cc_flag("-fsanitize=address");
        b = b.link_flag("-fsanitize=address");
    }

    b.build()
}

/// Tool executable names under a MinGW prefix.
fn mingw_tools(prefix: &str, use_llvm: bool) -> ToolSet {
    if use_llvm {
        ToolSet {
            cc: format!("{prefix}clang"),
            cxx: format!("{prefix}clang++"),
            asm: format!("{prefix}as"),
            ar: format!("{prefix}ar"),
            ranlib: Some(format!("{prefix}ranlib")),
            linker: None,
            rc: Some(format!("{prefix}windres")),
        }
    } else {
        ToolSet {
            cc: format!("{prefix}gcc"),
            cxx: format!("{prefix}g++"),
            asm: format!("{prefix}as"),
            // The gcc wrappers make `ar`/`ranlib` LTO-aware.
            ar: format!("{prefix}gcc-ar"),
            ranlib: Some(format!("{prefix}gcc-ranlib")),
            linker: None,
            rc: Some(format!("{prefix}windres")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::options::{CrossPrefixes, DEFAULT_MINGW32_PREFIX, DEFAULT_MINGW64_PREFIX};

    #[test]
    fn test_default_prefix_tool_names() {
        let config = configure(&BuildOptions::default(), Arch::X86_64);
        assert_eq!(
            config.tools().cc,
            format!("{DEFAULT_MINGW64_PREFIX}gcc")
        );
        assert_eq!(
            config.tools().ar,
            format!("{DEFAULT_MINGW64_PREFIX}gcc-ar")
        );
        assert_eq!(
            config.tools().rc.as_deref(),
            Some("x86_64-w64-mingw32-windres")
        );

        let config = configure(&BuildOptions::default(), Arch::X86_32);
        assert_eq!(
            config.tools().cc,
            format!("{DEFAULT_MINGW32_PREFIX}gcc")
        );
    }

    #[test]
    fn test_custom_prefix_overrides_default() {
        let opts = BuildOptions {
            mingw_prefixes: CrossPrefixes {
                win32: None,
                win64: Some("aarch64-w64-mingw32-".to_string()),
            },
            ..BuildOptions::default()
        };
        let config = configure(&opts, Arch::Arm64);
        assert_eq!(config.tools().cc, "aarch64-w64-mingw32-gcc");
    }

    #[test]
    fn test_llvm_frontend_tool_names() {
        let opts = BuildOptions {
            use_llvm: true,
            ..BuildOptions::default()
        };
        let config = configure(&opts, Arch::X86_64);
        assert_eq!(config.tools().cc, format!("{DEFAULT_MINGW64_PREFIX}clang"));
        assert_eq!(
            config.tools().cxx,
            format!("{DEFAULT_MINGW64_PREFIX}clang++")
        );
        assert_eq!(config.tools().ar, format!("{DEFAULT_MINGW64_PREFIX}ar"));
        assert_eq!(
            config.tools().ranlib.as_deref(),
            Some("x86_64-w64-mingw32-ranlib")
        );
    }

    #[test]
    fn test_speed_optimization_tier_depends_on_width() {
        let opts = BuildOptions {
            debug_symbols: false,
            ..BuildOptions::default()
        };
        let config = configure(&opts, Arch::X86_32);
        assert!(config.has_cc_flag("-O2"));
        assert!(!config.has_cc_flag("-O3"));

        let config = configure(&opts, Arch::X86_64);
        assert!(config.has_cc_flag("-O3"));
        assert!(!config.has_cc_flag("-O2"));
    }

    #[test]
    fn test_size_optimization() {
        let opts = BuildOptions {
            optimize: OptimizeFor::Size,
            debug_symbols: false,
            ..BuildOptions::default()
        };
        let config = configure(&opts, Arch::X86_64);
        assert!(config.has_cc_flag("-Os"));
        assert!(!config.has_cc_flag("-O3"));
    }

    #[test]
    fn test_sse2_baseline_is_x86_only() {
        let opts = BuildOptions {
            debug_symbols: false,
            ..BuildOptions::default()
        };
        assert!(configure(&opts, Arch::X86_64).has_cc_flag("-msse2"));
        assert!(!configure(&opts, Arch::Arm64).has_cc_flag("-msse2"));
    }

    #[test]
    fn test_debug_symbols_prepend_g2() {
        let config = configure(&BuildOptions::default(), Arch::X86_64);
        assert_eq!(config.cc_flags()[0], "-g2");

        let opts = BuildOptions {
            profile: Profile::ReleaseDebug,
            ..BuildOptions::default()
        };
        let config = configure(&opts, Arch::X86_64);
        assert!(config.has_cc_flag("-g2"));
        assert!(config.has_cc_flag("-O2"));
    }

    #[test]
    fn test_debug_profile_flags() {
        let opts = BuildOptions {
            profile: Profile::Debug,
            ..BuildOptions::default()
        };
        let config = configure(&opts, Arch::X86_64);
        assert!(config.has_cc_flag("-g3"));
        assert!(config.has_cc_flag("-Wa,-mbig-obj"));
        assert!(!config.has_cc_flag("-O2"));
        assert!(!config.has_cc_flag("-msse2"));
    }

    #[test]
    fn test_static_runtime_flags_by_width() {
        let config = configure(&BuildOptions::default(), Arch::X86_32);
        assert!(config.has_link_flag("-static"));
        assert!(config.has_link_flag("-static-libgcc"));
        assert!(config.has_link_flag("-static-libstdc++"));

        let config = configure(&BuildOptions::default(), Arch::X86_64);
        assert!(config.has_link_flag("-static"));
        assert!(!config.has_link_flag("-static-libgcc"));

        let opts = BuildOptions {
            static_cpp: false,
            ..BuildOptions::default()
        };
        let config = configure(&opts, Arch::X86_32);
        assert!(!config.has_link_flag("-static"));
    }

    #[test]
    fn test_console_subsystem_pairs_flag_and_define() {
        let opts = BuildOptions {
            subsystem: Subsystem::Console,
            ..BuildOptions::default()
        };
        let config = configure(&opts, Arch::X86_64);
        assert!(config.has_link_flag("-Wl,--subsystem,console"));
        assert!(config.has_define("WINDOWS_SUBSYSTEM_CONSOLE"));

        let config = configure(&BuildOptions::default(), Arch::X86_64);
        assert!(config.has_link_flag("-Wl,--subsystem,windows"));
        assert!(!config.has_define("WINDOWS_SUBSYSTEM_CONSOLE"));
    }

    #[test]
    fn test_lto_gcc_parallel_full() {
        let opts = BuildOptions {
            lto: LtoMode::Full,
            jobs: 8,
            ..BuildOptions::default()
        };
        let config = configure(&opts, Arch::X86_64);
        assert!(config.has_cc_flag("-flto"));
        assert!(config.has_link_flag("-flto=8"));
    }

    #[test]
    fn test_lto_thin_on_llvm() {
        let opts = BuildOptions {
            lto: LtoMode::Thin,
            use_llvm: true,
            jobs: 8,
            ..BuildOptions::default()
        };
        let config = configure(&opts, Arch::X86_64);
        assert!(config.has_cc_flag("-flto=thin"));
        assert!(config.has_link_flag("-flto=thin"));
    }

    #[test]
    fn test_lto_full_single_job() {
        let opts = BuildOptions {
            lto: LtoMode::Full,
            jobs: 1,
            ..BuildOptions::default()
        };
        let config = configure(&opts, Arch::X86_64);
        assert!(config.has_cc_flag("-flto"));
        assert!(config.has_link_flag("-flto"));
        assert!(!config.link_flags().iter().any(|f| f.starts_with("-flto=")));
    }

    #[test]
    fn test_64_bit_marker_define() {
        assert!(configure(&BuildOptions::default(), Arch::X86_64).has_define("_WIN64"));
        assert!(configure(&BuildOptions::default(), Arch::Arm64).has_define("_WIN64"));
        assert!(!configure(&BuildOptions::default(), Arch::X86_32).has_define("_WIN64"));
        assert!(!configure(&BuildOptions::default(), Arch::Arm32).has_define("_WIN64"));
    }

    #[test]
    fn test_mingw_markers_and_stack() {
        let config = configure(&BuildOptions::default(), Arch::X86_64);
        assert!(config.has_define("WINDOWS_ENABLED"));
        assert!(config.has_define("MINGW_ENABLED"));
        assert_eq!(config.define_value("MINGW_HAS_SECURE_API"), Some("1"));
        assert_eq!(config.define_value("WINVER"), Some("0x0601"));
        assert!(config.has_cc_flag("-mwindows"));
        assert!(config.has_link_flag(&format!("-Wl,--stack,{STACK_SIZE}")));
        assert!(config.libs().contains(&"mingw32".to_string()));
        assert!(!config.is_msvc());
        assert!(config.theora_x86_asm());
    }

    #[test]
    fn test_asan_on_cross_builds() {
        let opts = BuildOptions {
            use_asan: true,
            ..BuildOptions::default()
        };
        let config = configure(&opts, Arch::X86_64);
        assert!(config.program_suffix().ends_with(".san"));
        assert!(config.has_cc_flag("-fsanitize=address"));
        assert!(config.has_link_flag("-fsanitize=address"));
    }

    #[cfg(not(windows))]
    #[test]
    fn test_cross_build_program_suffix() {
        let config = configure(&BuildOptions::default(), Arch::X86_64);
        assert!(config.program_suffix().starts_with(".exe"));
    }
}
