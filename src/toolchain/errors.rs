//! Toolchain resolution and resource compilation error types.

use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Fatal configuration error. Resolution never produces a partial
/// configuration alongside one of these; the caller decides whether to
/// terminate the build.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ConfigError {
    /// The requested architecture is not supported on Windows.
    #[error("unsupported CPU architecture `{arch}` for Windows")]
    #[diagnostic(
        code(slipway::toolchain::unsupported_arch),
        help("supported architectures are: {supported}")
    )]
    UnsupportedArch { arch: String, supported: String },

    /// An explicit architecture was combined with a developer-prompt
    /// MSVC environment.
    #[error("the `arch` option cannot be used when VCINSTALLDIR configures the compiler")]
    #[diagnostic(
        code(slipway::toolchain::manual_arch),
        help(
            "the Native/Cross Tools prompt that set VCINSTALLDIR already fixed the \
             target architecture; rerun with arch=auto and the detected compiler \
             architecture will be reported"
        )
    )]
    ManualArchOverride { arch: String },

    /// The developer prompt's compiler reported an architecture we do
    /// not recognize.
    #[error("failed to detect the MSVC compiler architecture (reported `{reported}`)")]
    #[diagnostic(
        code(slipway::toolchain::unknown_compiler_arch),
        help("check your compilation setup, or avoid setting VCINSTALLDIR")
    )]
    UnknownCompilerArch { reported: String },
}

/// A single failed resource compilation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}: {message}", source_file.display())]
pub struct ResourceFailure {
    /// The resource script that failed to compile.
    pub source_file: PathBuf,
    /// The object file that was being produced.
    pub output: PathBuf,
    /// The resource compiler's error-stream output, or the spawn error.
    pub message: String,
}

/// Failure of a resource compilation step.
///
/// Reported as a value so the orchestrator can decide whether to abort
/// the overall build; dependent link steps must not run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ResourceError {
    /// The pairs that failed, in input order.
    pub failures: Vec<ResourceFailure>,
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "resource compilation failed for {} file(s)",
            self.failures.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_arch_message_names_value_and_set() {
        let err = ConfigError::UnsupportedArch {
            arch: "mips".to_string(),
            supported: "x86_32, x86_64, arm32, arm64".to_string(),
        };
        assert!(err.to_string().contains("mips"));
    }

    #[test]
    fn test_resource_error_counts_failures() {
        let err = ResourceError {
            failures: vec![ResourceFailure {
                source_file: PathBuf::from("app.rc"),
                output: PathBuf::from("app.o"),
                message: "syntax error".to_string(),
            }],
        };
        assert_eq!(err.to_string(), "resource compilation failed for 1 file(s)");
        assert!(err.failures[0].to_string().contains("app.rc"));
        assert!(err.failures[0].to_string().contains("syntax error"));
    }
}
