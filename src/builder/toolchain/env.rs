//! MSVC installation discovery.
//!
//! The toolchain has no fixed location. It is found in three steps:
//! 1. The version-qualified `VS{version}COMNTOOLS` variable points at the
//!    common-tools directory; the VC root sits two levels above it.
//! 2. The host architecture and the project's forced architecture pick the
//!    binary and library subdirectories.
//! 3. `vcvarsall.bat` is run once per architecture and its `set` dump is
//!    scanned for `WindowsSdkDir=`, which locates the Windows SDK.
//!
//! Step 3 is memoized by [`BuildSession`](crate::builder::BuildSession).

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::util::config::ToolchainConfig;
use crate::util::fs::normalize_path;
use crate::util::process::{find_executable, ProcessBuilder};

use super::ToolchainError;

/// Prefix of the `set` output line that carries the Windows SDK root.
pub const SDK_DIR_KEY: &str = "WindowsSdkDir=";

/// Target word size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Arch {
    X86,
    X64,
}

impl Arch {
    /// Map a raw machine string (`PROCESSOR_ARCHITECTURE`, `uname -m`, ...).
    ///
    /// Unrecognized values are treated as 32-bit.
    pub fn from_machine(raw: &str) -> Arch {
        match raw.trim().to_ascii_lowercase().as_str() {
            "amd64" | "x86_64" => Arch::X64,
            _ => Arch::X86,
        }
    }

    /// Argument passed to `vcvarsall.bat`.
    pub fn script_token(&self) -> &'static str {
        match self {
            Arch::X86 => "x86",
            Arch::X64 => "x64",
        }
    }

    /// Value of the linker's `/MACHINE:` flag.
    pub fn machine_token(&self) -> &'static str {
        match self {
            Arch::X86 => "X86",
            Arch::X64 => "X64",
        }
    }

    /// Subdirectory of `<sdk>/lib` holding this architecture's libraries.
    pub fn sdk_lib_suffix(&self) -> Option<&'static str> {
        match self {
            Arch::X86 => None,
            Arch::X64 => Some("x64"),
        }
    }
}

/// Decide the architecture to build for.
///
/// | host | force-32 | force-64 | result |
/// |------|----------|----------|--------|
/// | X64  | no       | no       | X64    |
/// | X86  | no       | no       | X86    |
/// | any  | yes      | no       | X86    |
/// | any  | no       | yes      | X64    |
/// | any  | yes      | yes      | error  |
pub fn effective_arch(host: Arch, force_32: bool, force_64: bool) -> Result<Arch, ToolchainError> {
    match (force_32, force_64) {
        (true, true) => Err(ToolchainError::ConflictingArchitecture),
        (true, false) => Ok(Arch::X86),
        (false, true) => Ok(Arch::X64),
        (false, false) => Ok(host),
    }
}

/// Name of the environment variable pointing at a Visual Studio version's
/// common-tools directory.
pub fn install_hint_var(version: u32) -> String {
    format!("VS{}COMNTOOLS", version)
}

/// The raw machine architecture string of the host.
///
/// `PROCESSOR_ARCHITEW6432` is set for 32-bit processes on a 64-bit host and
/// names the real host, so it is checked first.
pub fn host_machine() -> String {
    std::env::var("PROCESSOR_ARCHITEW6432")
        .or_else(|_| std::env::var("PROCESSOR_ARCHITECTURE"))
        .unwrap_or_else(|_| std::env::consts::ARCH.to_string())
}

/// Facts about the host gathered before any resolution happens.
#[derive(Debug, Clone, PartialEq)]
pub struct HostProbe {
    /// Visual Studio version number
    pub version: u32,
    /// Common-tools directory, if known
    pub install_hint: Option<PathBuf>,
    /// Raw host machine string
    pub machine: String,
}

impl HostProbe {
    /// Probe the current process environment.
    ///
    /// An `install-hint` in the config takes precedence over the environment
    /// variable.
    pub fn from_process(config: &ToolchainConfig) -> Self {
        let version = config.msvc_version();
        let install_hint = config
            .toolchain
            .install_hint
            .clone()
            .or_else(|| std::env::var_os(install_hint_var(version)).map(PathBuf::from));

        HostProbe {
            version,
            install_hint,
            machine: host_machine(),
        }
    }

    /// The host architecture.
    pub fn host_arch(&self) -> Arch {
        Arch::from_machine(&self.machine)
    }
}

/// Directory layout of a VC installation for one architecture, before the
/// Windows SDK is known.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolchainLayout {
    pub root: PathBuf,
    pub bin_dir: PathBuf,
    pub include_dirs: Vec<PathBuf>,
    pub lib_dirs: Vec<PathBuf>,
    pub script: PathBuf,
}

impl ToolchainLayout {
    /// Compute the layout from the common-tools directory.
    ///
    /// 64-bit tools live in `bin/amd64` on a 64-bit host and in the
    /// cross-compiler directory `bin/x86_amd64` on a 32-bit host.
    pub fn new(install_hint: &Path, host: Arch, build: Arch) -> Self {
        let root = normalize_path(&install_hint.join("..").join("..").join("VC"));

        let mut bin_dir = root.join("bin");
        let mut lib_dir = root.join("lib");
        if build == Arch::X64 {
            bin_dir = bin_dir.join(match host {
                Arch::X64 => "amd64",
                Arch::X86 => "x86_amd64",
            });
            lib_dir = lib_dir.join("amd64");
        }

        ToolchainLayout {
            script: root.join("vcvarsall.bat"),
            include_dirs: vec![root.join("include")],
            lib_dirs: vec![lib_dir],
            bin_dir,
            root,
        }
    }
}

/// A located toolchain and SDK for one architecture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedEnvironment {
    /// VC root directory
    pub toolchain_root: PathBuf,
    /// Directory holding cl, link and lib
    pub bin_dir: PathBuf,
    /// Default include directories (toolchain first, then SDK)
    pub include_dirs: Vec<PathBuf>,
    /// Default library directories (toolchain first, then SDK)
    pub lib_dirs: Vec<PathBuf>,
    /// Host architecture
    pub host_arch: Arch,
    /// Architecture being built
    pub build_arch: Arch,
    /// Windows SDK root
    pub sdk_dir: PathBuf,
}

impl ResolvedEnvironment {
    /// Combine a toolchain layout with the SDK root.
    pub fn new(layout: ToolchainLayout, host_arch: Arch, build_arch: Arch, sdk_dir: PathBuf) -> Self {
        let mut include_dirs = layout.include_dirs;
        include_dirs.push(sdk_dir.join("include"));

        let mut lib_dirs = layout.lib_dirs;
        let sdk_lib = sdk_dir.join("lib");
        lib_dirs.push(match build_arch.sdk_lib_suffix() {
            Some(suffix) => sdk_lib.join(suffix),
            None => sdk_lib,
        });

        ResolvedEnvironment {
            toolchain_root: layout.root,
            bin_dir: layout.bin_dir,
            include_dirs,
            lib_dirs,
            host_arch,
            build_arch,
            sdk_dir,
        }
    }

    /// Path to the compiler.
    pub fn compiler(&self) -> PathBuf {
        self.bin_dir.join("cl")
    }

    /// Path to the linker.
    pub fn linker(&self) -> PathBuf {
        self.bin_dir.join("link")
    }

    /// Path to the librarian used for static libraries.
    pub fn archiver(&self) -> PathBuf {
        self.bin_dir.join("lib")
    }
}

/// Extract the Windows SDK root from a `set` dump.
///
/// Only the first line starting with [`SDK_DIR_KEY`] is used; an empty value
/// counts as missing.
pub fn parse_sdk_dir(output: &str) -> Option<PathBuf> {
    output
        .lines()
        .find(|line| line.starts_with(SDK_DIR_KEY))
        .and_then(|line| line.split_once('='))
        .map(|(_, value)| value.trim_end())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Runs the environment-setup script and returns its standard output.
pub trait ScriptRunner: Send + Sync {
    fn run(&self, script: &Path, arch: Arch) -> Result<String, ToolchainError>;
}

/// Runs `vcvarsall.bat <arch>` followed by `set` through `cmd`.
///
/// The two commands are written to a temporary batch file to avoid
/// `cmd /c` quoting issues with paths containing spaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct VcvarsRunner;

impl ScriptRunner for VcvarsRunner {
    fn run(&self, script: &Path, arch: Arch) -> Result<String, ToolchainError> {
        let fail = |message: String| ToolchainError::EnvironmentScript {
            script: script.to_path_buf(),
            message,
        };

        if !script.exists() {
            return Err(fail("script does not exist".to_string()));
        }

        let mut batch = tempfile::Builder::new()
            .prefix("vcforge_vcvars")
            .suffix(".bat")
            .tempfile()
            .map_err(|e| fail(format!("failed to create temp batch file: {}", e)))?;

        write!(
            batch,
            "@echo off\r\ncall \"{}\" {} >nul 2>&1\r\nif errorlevel 1 exit /b 1\r\nset\r\n",
            script.display(),
            arch.script_token()
        )
        .map_err(|e| fail(format!("failed to write temp batch file: {}", e)))?;

        // Close the handle so cmd can open the file; the path is removed on drop.
        let batch_path = batch.into_temp_path();

        let cmd = find_executable("cmd").unwrap_or_else(|| PathBuf::from("cmd"));
        tracing::debug!("Running {} {}", script.display(), arch.script_token());

        let output = ProcessBuilder::new(cmd)
            .arg("/c")
            .arg(&*batch_path)
            .exec_and_check()
            .map_err(|e| fail(format!("{:#}", e)))?;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
