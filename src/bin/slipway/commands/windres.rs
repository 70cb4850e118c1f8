//! `slipway windres` command

use std::path::PathBuf;

use anyhow::{bail, Result};

use slipway::core::options::CrossPrefixes;
use slipway::{ArchRequest, ResourceCompiler};

use crate::cli::WindresArgs;

pub fn execute(args: WindresArgs) -> Result<()> {
    let arch = match &args.arch {
        Some(arch) => arch.parse::<ArchRequest>()?.or_host(),
        None => ArchRequest::Auto.or_host(),
    };

    let prefixes = CrossPrefixes {
        win32: args.mingw_prefix_32.clone(),
        win64: args.mingw_prefix_64.clone(),
    };

    let pairs = parse_pairs(&args.pairs)?;

    let windres = format!("{}windres", prefixes.for_arch(arch));
    let rc = ResourceCompiler::new(windres).include_dir(&args.include_dir);

    match rc.compile_all(&pairs) {
        Ok(()) => {
            tracing::info!("compiled {} resource file(s)", pairs.len());
            Ok(())
        }
        Err(err) => {
            for failure in &err.failures {
                eprintln!("error: {}", failure);
            }
            Err(err.into())
        }
    }
}

/// Parse `SOURCE=OUTPUT` pairs.
fn parse_pairs(raw: &[String]) -> Result<Vec<(PathBuf, PathBuf)>> {
    let mut pairs = Vec::with_capacity(raw.len());
    for pair in raw {
        let Some((source, output)) = pair.split_once('=') else {
            bail!(
                "malformed pair `{}`\n\
                 help: Pass resource compilations as SOURCE=OUTPUT, e.g. app.rc=app.res.o",
                pair
            );
        };
        if source.is_empty() || output.is_empty() {
            bail!("malformed pair `{}`: both SOURCE and OUTPUT are required", pair);
        }
        pairs.push((PathBuf::from(source), PathBuf::from(output)));
    }
    Ok(pairs)
}
