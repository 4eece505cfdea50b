//! Native build command generation.
//!
//! This module turns project settings into compiler and linker commands for
//! the MSVC toolchain.

pub mod session;
pub mod toolchain;

pub use session::BuildSession;
pub use toolchain::{
    CommandSpec, MsvcInvocation, MsvcToolchain, ResolvedEnvironment, Toolchain, ToolchainError,
    INTERRUPT_EXIT_CODE,
};
