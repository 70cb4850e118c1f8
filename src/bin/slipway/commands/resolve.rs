//! `slipway resolve` command

use anyhow::{bail, Result};

use slipway::util::config::{global_config_path, load_config, project_config_path};
use slipway::{BuildOptions, HostDetection, ToolchainConfig};

use crate::cli::ResolveArgs;

pub fn execute(args: ResolveArgs) -> Result<()> {
    let mut opts = BuildOptions::default();

    // Config file defaults first, CLI flags override.
    let cwd = std::env::current_dir().unwrap_or_default();
    let global = global_config_path().unwrap_or_default();
    let config = load_config(&global, &project_config_path(&cwd));
    config.apply(&mut opts)?;

    apply_cli(&mut opts, &args)?;

    let host = HostDetection::from_env();
    let config = slipway::resolve(&opts, &host)?;

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&config)?),
        "text" => print_text(&config),
        other => bail!("unknown output format `{}`, expected text or json", other),
    }

    Ok(())
}

fn apply_cli(opts: &mut BuildOptions, args: &ResolveArgs) -> Result<()> {
    if let Some(arch) = &args.arch {
        opts.arch = arch.parse()?;
    }
    if let Some(profile) = &args.profile {
        opts.profile = profile.parse()?;
    }
    if let Some(optimize) = &args.optimize {
        opts.optimize = optimize.parse()?;
    }
    if let Some(lto) = &args.lto {
        opts.lto = lto.parse()?;
    }
    if let Some(debug_symbols) = args.debug_symbols {
        opts.debug_symbols = debug_symbols;
    }
    if args.separate_debug_symbols {
        opts.separate_debug_symbols = true;
    }
    if let Some(subsystem) = &args.subsystem {
        opts.subsystem = subsystem.parse()?;
    }
    if let Some(static_cpp) = args.static_cpp {
        opts.static_cpp = static_cpp;
    }
    if args.use_mingw {
        opts.use_mingw = true;
    }
    if args.use_llvm {
        opts.use_llvm = true;
    }
    if args.use_asan {
        opts.use_asan = true;
    }
    if let Some(vulkan) = args.vulkan {
        opts.graphics.vulkan.enabled = vulkan;
    }
    if args.use_volk {
        opts.graphics.vulkan.static_loader = true;
    }
    if let Some(opengl3) = args.opengl3 {
        opts.graphics.opengl3.enabled = opengl3;
    }
    if args.mingw_prefix_32.is_some() {
        opts.mingw_prefixes.win32 = args.mingw_prefix_32.clone();
    }
    if args.mingw_prefix_64.is_some() {
        opts.mingw_prefixes.win64 = args.mingw_prefix_64.clone();
    }
    if let Some(version) = &args.target_win_version {
        opts.target_win_version = version.clone();
    }
    if args.msvc_version.is_some() {
        opts.msvc_version = args.msvc_version.clone();
    }
    if let Some(jobs) = args.jobs {
        opts.jobs = jobs;
    }
    Ok(())
}

fn print_text(config: &ToolchainConfig) {
    println!(
        "# Toolchain for {} ({})",
        config.arch(),
        config.backend().as_str()
    );

    let tools = config.tools();
    println!("  cc: {}", tools.cc);
    println!("  cxx: {}", tools.cxx);
    println!("  asm: {}", tools.asm);
    println!("  ar: {}", tools.ar);
    if let Some(ranlib) = &tools.ranlib {
        println!("  ranlib: {}", ranlib);
    }
    if let Some(linker) = &tools.linker {
        println!("  linker: {}", linker);
    }
    if let Some(rc) = &tools.rc {
        println!("  rc: {}", rc);
    }
    if let Some(version) = config.msvc_version() {
        println!("  msvc version: {}", version);
    }
    if !config.program_suffix().is_empty() {
        println!("  program suffix: {}", config.program_suffix());
    }

    println!("\n# Compile flags:");
    for flag in config.cc_flags() {
        println!("  {}", flag);
    }
    for flag in config.cxx_flags() {
        println!("  {}    # C++ only", flag);
    }

    println!("\n# Defines:");
    for (name, value) in config.defines() {
        match value {
            Some(value) => println!("  {}={}", name, value),
            None => println!("  {}", name),
        }
    }

    println!("\n# Link flags:");
    for flag in config.link_flags() {
        println!("  {}", flag);
    }
    for flag in config.ar_flags() {
        println!("  {}    # archiver", flag);
    }

    println!("\n# Libraries:");
    for lib in config.libs() {
        println!("  {}", lib);
    }

    if !config.include_paths().is_empty() {
        println!("\n# Include paths:");
        for path in config.include_paths() {
            println!("  {}", path.display());
        }
    }
    if !config.lib_paths().is_empty() {
        println!("\n# Library paths:");
        for path in config.lib_paths() {
            println!("  {}", path.display());
        }
    }
}
