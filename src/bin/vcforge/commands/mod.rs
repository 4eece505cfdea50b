//! Command implementations

pub mod compile;
pub mod env;
pub mod ext;
pub mod find_lib;
pub mod link;

use std::sync::Arc;

use anyhow::Result;
use vcforge::util::config::load_for_project;
use vcforge::{BuildSession, MsvcToolchain};

/// Create the toolchain adapter for the current directory's configuration.
pub fn toolchain() -> Result<MsvcToolchain> {
    let cwd = std::env::current_dir()?;
    let config = load_for_project(&cwd);
    tracing::debug!("Using MSVC version {}", config.msvc_version());

    Ok(MsvcToolchain::new(Arc::new(BuildSession::new(&config))))
}
