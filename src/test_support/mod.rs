//! Test support utilities for vcforge unit tests.
//!
//! Provides a fake `vcvarsall.bat` runner and host probes so toolchain
//! resolution can be exercised without a Visual Studio installation.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::builder::toolchain::{Arch, HostProbe, ScriptRunner, ToolchainError};
use crate::builder::BuildSession;

/// Common-tools directory used by [`fake_probe`]; the VC root is `/vs/VC`.
pub const FAKE_HINT: &str = "/vs/Common7/Tools";

/// A host probe with an installation hint and the given machine string.
pub fn fake_probe(machine: &str) -> HostProbe {
    HostProbe {
        version: 100,
        install_hint: Some(PathBuf::from(FAKE_HINT)),
        machine: machine.to_string(),
    }
}

/// A session on a 64-bit host backed by [`FakeVcvars`].
pub fn fake_session() -> BuildSession {
    BuildSession::with_runner(fake_probe("AMD64"), FakeVcvars::new())
}

/// Script runner that records its calls and returns canned `set` output.
///
/// By default the SDK root is `/sdk/<arch token>`.
#[derive(Debug, Clone, Default)]
pub struct FakeVcvars {
    calls: Arc<AtomicUsize>,
    output: Option<String>,
}

impl FakeVcvars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `output` verbatim for every architecture.
    pub fn with_output(output: impl Into<String>) -> Self {
        FakeVcvars {
            calls: Arc::default(),
            output: Some(output.into()),
        }
    }

    /// Number of times the script was run, across all clones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ScriptRunner for FakeVcvars {
    fn run(&self, _script: &Path, arch: Arch) -> Result<String, ToolchainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.output.clone().unwrap_or_else(|| {
            format!(
                "Path=C:\\Windows\\system32\r\nWindowsSdkDir=/sdk/{}\r\nINCLUDE=C:\\inc\r\n",
                arch.script_token()
            )
        }))
    }
}
