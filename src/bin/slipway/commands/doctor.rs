//! `slipway doctor` command

use anyhow::Result;

use slipway::core::options::CrossPrefixes;
use slipway::toolchain::host::mingw_responds;
use slipway::toolchain::select_backend;
use slipway::{Arch, BuildOptions, HostDetection};

use crate::cli::DoctorArgs;

pub fn execute(args: DoctorArgs) -> Result<()> {
    let host = HostDetection::from_env();
    let prefixes = CrossPrefixes::from_env();

    println!(
        "host: {} {}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );

    match &host.msvc_manual {
        Some(manual) => {
            println!("manual MSVC: {}", manual.vc_install_dir.display());
            println!(
                "  compiler arch: {}",
                manual.compiler_arch.as_deref().unwrap_or("not detected")
            );
            match &manual.sdk_dir {
                Some(sdk) => println!("  Windows SDK: {}", sdk.display()),
                None => println!("  Windows SDK: missing (WindowsSdkDir not set)"),
            }
        }
        None => println!("manual MSVC: not configured"),
    }

    match &host.msvc_version {
        Some(version) => println!("detected MSVC: {}", version),
        None => println!("detected MSVC: not found"),
    }

    let prefix64 = prefixes.for_arch(Arch::X86_64).to_string();
    println!(
        "mingw (64-bit, `{}gcc`): {}",
        prefix64,
        if mingw_responds(&prefix64) { "ok" } else { "not found" }
    );
    if args.all_widths {
        let prefix32 = prefixes.for_arch(Arch::X86_32).to_string();
        println!(
            "mingw (32-bit, `{}gcc`): {}",
            prefix32,
            if mingw_responds(&prefix32) { "ok" } else { "not found" }
        );
    }

    let backend = select_backend(&host, &BuildOptions::default());
    println!("default backend: {}", backend.as_str());

    Ok(())
}
