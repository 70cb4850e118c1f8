//! Resource script compilation.
//!
//! Windows builds embed icons and version information through a
//! resource script compiled into a linkable object by the external
//! `windres` tool. Each (source, output) pair is one independent
//! invocation; pairs never share an output path, so independent pairs
//! can compile concurrently.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::util::process::ProcessBuilder;

use super::errors::{ResourceError, ResourceFailure};
use super::ToolchainConfig;

/// Driver for the external resource compiler.
#[derive(Debug, Clone)]
pub struct ResourceCompiler {
    windres: PathBuf,
    include_dir: PathBuf,
}

impl ResourceCompiler {
    /// Create a driver for the given `windres` executable.
    pub fn new(windres: impl Into<PathBuf>) -> Self {
        ResourceCompiler {
            windres: windres.into(),
            include_dir: PathBuf::from("."),
        }
    }

    /// Create a driver from a resolved configuration, when it carries a
    /// resource compiler (cross builds only).
    pub fn from_config(config: &ToolchainConfig) -> Option<Self> {
        config.tools().rc.as_ref().map(ResourceCompiler::new)
    }

    /// Set the include search directory passed to the tool.
    pub fn include_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.include_dir = dir.into();
        self
    }

    /// The `windres` executable this driver invokes.
    pub fn windres(&self) -> &Path {
        &self.windres
    }

    /// Compile one resource script into an object file.
    ///
    /// Success means the tool ran and wrote nothing to its error
    /// stream. On failure any partially written object is removed, so
    /// no stale output survives for the linker to pick up.
    pub fn compile(&self, source: &Path, output: &Path) -> Result<(), ResourceFailure> {
        let builder = ProcessBuilder::new(&self.windres)
            .arg("--include-dir")
            .arg(&self.include_dir)
            .arg("-i")
            .arg(source)
            .arg("-o")
            .arg(output);

        tracing::debug!("running `{}`", builder.display_command());

        match builder.exec() {
            Ok(out) if out.stderr.is_empty() => Ok(()),
            Ok(out) => Err(self.fail(
                source,
                output,
                String::from_utf8_lossy(&out.stderr).trim().to_string(),
            )),
            Err(e) => Err(self.fail(source, output, e.to_string())),
        }
    }

    /// Compile every pair, reporting all failures at once.
    ///
    /// Pairs are independent, so they compile concurrently; each
    /// invocation blocks its own worker only. The step fails as a whole
    /// if any pair fails, and the caller must not run dependent link
    /// steps.
    pub fn compile_all(&self, pairs: &[(PathBuf, PathBuf)]) -> Result<(), ResourceError> {
        let failures: Vec<ResourceFailure> = pairs
            .par_iter()
            .filter_map(|(source, output)| self.compile(source, output).err())
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ResourceError { failures })
        }
    }

    fn fail(&self, source: &Path, output: &Path, message: String) -> ResourceFailure {
        if output.exists() {
            if let Err(e) = std::fs::remove_file(output) {
                tracing::warn!("could not remove partial object {}: {}", output.display(), e);
            }
        }
        ResourceFailure {
            source_file: source.to_path_buf(),
            output: output.to_path_buf(),
            message,
        }
    }
}
