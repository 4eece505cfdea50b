//! Toolchain error types and diagnostics.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error while locating the toolchain or preparing its commands.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ToolchainError {
    #[error("MSVC installation not found: `{variable}` is not set")]
    #[diagnostic(
        code(vcforge::toolchain::not_found),
        help("Run from a Visual Studio command prompt or set `install-hint`")
    )]
    ToolchainNotFound { variable: String },

    #[error("environment script `{}` failed: {message}", .script.display())]
    #[diagnostic(code(vcforge::toolchain::environment_script))]
    EnvironmentScript { script: PathBuf, message: String },

    #[error("conflicting architecture: both `force-32-bit` and `force-64-bit` are set")]
    #[diagnostic(
        code(vcforge::toolchain::conflicting_arch),
        help("Set only one of the two flags")
    )]
    ConflictingArchitecture,
}

impl ToolchainError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ToolchainError::ToolchainNotFound { variable } => {
                Diagnostic::error("MSVC installation not found")
                    .with_context(format!("environment variable `{}` is not set", variable))
                    .with_suggestion(suggestions::NO_TOOLCHAIN)
                    .with_suggestion(suggestions::WRONG_VERSION)
            }

            ToolchainError::EnvironmentScript { script, message } => {
                Diagnostic::error("could not capture the MSVC environment")
                    .with_location(script)
                    .with_context(message.clone())
                    .with_suggestion(suggestions::SCRIPT_FAILED)
            }

            ToolchainError::ConflictingArchitecture => {
                Diagnostic::error("conflicting target architecture")
                    .with_context("both `force-32-bit` and `force-64-bit` are set")
                    .with_suggestion(suggestions::ARCH_CONFLICT)
            }
        }
    }
}
