//! Build session - the resolution state shared by every toolchain adapter
//! in one build.
//!
//! The session is created once at build start and handed to each adapter
//! behind an `Arc`. It runs the environment-setup script at most once per
//! target architecture and reuses the captured SDK root afterwards.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::builder::toolchain::env::{
    effective_arch, install_hint_var, parse_sdk_dir, ToolchainLayout, SDK_DIR_KEY,
};
use crate::builder::toolchain::{
    Arch, HostProbe, ResolvedEnvironment, ScriptRunner, ToolchainError, VcvarsRunner,
};
use crate::util::config::ToolchainConfig;

/// Resolution state for one build.
pub struct BuildSession {
    probe: HostProbe,
    runner: Box<dyn ScriptRunner>,
    /// SDK roots captured from the setup script, keyed by architecture
    sdk_dirs: Mutex<HashMap<Arch, PathBuf>>,
}

impl fmt::Debug for BuildSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildSession")
            .field("probe", &self.probe)
            .field("sdk_dirs", &self.sdk_dirs)
            .finish_non_exhaustive()
    }
}

impl BuildSession {
    /// Create a session from the process environment and `vcvarsall.bat`.
    pub fn new(config: &ToolchainConfig) -> Self {
        Self::with_runner(HostProbe::from_process(config), VcvarsRunner)
    }

    /// Create a session from explicit host facts and a script runner.
    pub fn with_runner(probe: HostProbe, runner: impl ScriptRunner + 'static) -> Self {
        BuildSession {
            probe,
            runner: Box::new(runner),
            sdk_dirs: Mutex::new(HashMap::new()),
        }
    }

    /// The host facts this session resolves against.
    pub fn probe(&self) -> &HostProbe {
        &self.probe
    }

    /// Resolve the toolchain for a project's architecture preference.
    ///
    /// Fails before anything is spawned if the installation hint is missing
    /// or both architecture forces are set.
    pub fn resolve(
        &self,
        force_32_bit: bool,
        force_64_bit: bool,
    ) -> Result<ResolvedEnvironment, ToolchainError> {
        let hint = self.probe.install_hint.as_deref().ok_or_else(|| {
            ToolchainError::ToolchainNotFound {
                variable: install_hint_var(self.probe.version),
            }
        })?;

        let host = self.probe.host_arch();
        let build = effective_arch(host, force_32_bit, force_64_bit)?;
        let layout = ToolchainLayout::new(hint, host, build);

        tracing::debug!(
            "MSVC root {} ({} host, building {})",
            layout.root.display(),
            host.script_token(),
            build.script_token()
        );

        let sdk_dir = self.sdk_dir(&layout.script, build)?;
        Ok(ResolvedEnvironment::new(layout, host, build, sdk_dir))
    }

    /// The Windows SDK root for `arch`, running the setup script on first use.
    ///
    /// The lock is held while the script runs so concurrent callers wait for
    /// the first run instead of spawning their own.
    fn sdk_dir(&self, script: &Path, arch: Arch) -> Result<PathBuf, ToolchainError> {
        let mut sdk_dirs = self.sdk_dirs.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(dir) = sdk_dirs.get(&arch) {
            return Ok(dir.clone());
        }

        tracing::info!(
            "Capturing MSVC environment via {} {}",
            script.display(),
            arch.script_token()
        );

        let output = self.runner.run(script, arch)?;
        let dir = parse_sdk_dir(&output).ok_or_else(|| ToolchainError::EnvironmentScript {
            script: script.to_path_buf(),
            message: format!("no `{}` line in output", SDK_DIR_KEY),
        })?;

        tracing::debug!("Windows SDK at {}", dir.display());
        sdk_dirs.insert(arch, dir.clone());
        Ok(dir)
    }
}
