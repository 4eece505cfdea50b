//! vcforge - an MSVC toolchain adapter.
//!
//! This crate locates a Visual C++ installation and its Windows SDK, and
//! translates portable project settings into `cl`, `link` and `lib`
//! command lines.

pub mod builder;
pub mod core;
pub mod util;

/// Test utilities for vcforge unit tests.
///
/// This module is only available when compiling with `--cfg test`. It
/// provides a fake environment-setup script runner and host probes.
#[cfg(test)]
pub mod test_support;

pub use crate::builder::{BuildSession, CommandSpec, MsvcToolchain, Toolchain, ToolchainError};
pub use crate::core::{OutputKind, ProjectSettings, Subsystem};
pub use crate::util::config::ToolchainConfig;
