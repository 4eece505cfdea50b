//! Project settings - the portable description of one native build target.
//!
//! Settings are produced by the caller (usually from a `settings.toml`) and
//! are read-only for the duration of a toolchain invocation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::target::OutputKind;

/// MSVC C runtime linkage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MsvcRuntime {
    /// Dynamic CRT (/MD, /MDd) - default
    #[default]
    Dynamic,
    /// Static CRT (/MT, /MTd)
    Static,
}

impl MsvcRuntime {
    /// Get the compiler flag for this runtime (release mode).
    pub fn as_flag(&self) -> &'static str {
        match self {
            MsvcRuntime::Dynamic => "/MD",
            MsvcRuntime::Static => "/MT",
        }
    }

    /// Get the compiler flag for this runtime (debug mode).
    pub fn as_debug_flag(&self) -> &'static str {
        match self {
            MsvcRuntime::Dynamic => "/MDd",
            MsvcRuntime::Static => "/MTd",
        }
    }

    /// Name of the CRT import library the linker should default to.
    pub fn default_lib(&self, debug: bool) -> &'static str {
        match (self, debug) {
            (MsvcRuntime::Dynamic, false) => "msvcrt.lib",
            (MsvcRuntime::Dynamic, true) => "msvcrtd.lib",
            (MsvcRuntime::Static, false) => "libcmt.lib",
            (MsvcRuntime::Static, true) => "libcmtd.lib",
        }
    }
}

/// Linker subsystem.
///
/// `Default` lets the linker infer the subsystem from the entry point and
/// emits no flag at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Subsystem {
    #[default]
    Default,
    Console,
    Windows,
    Native,
    Posix,
    BootApplication,
    EfiApplication,
    EfiBootServiceDriver,
    EfiRom,
    EfiRuntimeDriver,
}

impl Subsystem {
    /// Token used in `/SUBSYSTEM:<token>`, or `None` for `Default`.
    pub fn as_token(&self) -> Option<&'static str> {
        match self {
            Subsystem::Default => None,
            Subsystem::Console => Some("CONSOLE"),
            Subsystem::Windows => Some("WINDOWS"),
            Subsystem::Native => Some("NATIVE"),
            Subsystem::Posix => Some("POSIX"),
            Subsystem::BootApplication => Some("BOOT_APPLICATION"),
            Subsystem::EfiApplication => Some("EFI_APPLICATION"),
            Subsystem::EfiBootServiceDriver => Some("EFI_BOOT_SERVICE_DRIVER"),
            Subsystem::EfiRom => Some("EFI_ROM"),
            Subsystem::EfiRuntimeDriver => Some("EFI_RUNTIME_DRIVER"),
        }
    }

    /// Every subsystem value, in declaration order.
    pub const ALL: [Subsystem; 10] = [
        Subsystem::Default,
        Subsystem::Console,
        Subsystem::Windows,
        Subsystem::Native,
        Subsystem::Posix,
        Subsystem::BootApplication,
        Subsystem::EfiApplication,
        Subsystem::EfiBootServiceDriver,
        Subsystem::EfiRom,
        Subsystem::EfiRuntimeDriver,
    ];
}

/// Compiler diagnostics policy.
///
/// Both `no_warnings` and `warnings_as_errors` may be set at once; the tie is
/// broken by this table, checked top to bottom:
///
/// | no_warnings | warnings_as_errors | policy        | cl flag |
/// |-------------|--------------------|---------------|---------|
/// | true        | any                | `Suppressed`  | `/w`    |
/// | false       | true               | `Errors`      | `/WX`   |
/// | false       | false              | `Default`     | (none)  |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticsPolicy {
    Default,
    Suppressed,
    Errors,
}

impl DiagnosticsPolicy {
    pub fn from_flags(no_warnings: bool, warnings_as_errors: bool) -> Self {
        if no_warnings {
            DiagnosticsPolicy::Suppressed
        } else if warnings_as_errors {
            DiagnosticsPolicy::Errors
        } else {
            DiagnosticsPolicy::Default
        }
    }

    /// The compiler flag for this policy, if any.
    pub fn compiler_flag(&self) -> Option<&'static str> {
        match self {
            DiagnosticsPolicy::Default => None,
            DiagnosticsPolicy::Suppressed => Some("/w"),
            DiagnosticsPolicy::Errors => Some("/WX"),
        }
    }
}

/// Settings for one project, consumed read-only by a toolchain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProjectSettings {
    /// Force 32-bit (x86) output
    pub force_32_bit: bool,

    /// Force 64-bit (x64) output
    pub force_64_bit: bool,

    /// What kind of artifact to produce
    pub output: OutputKind,

    /// Link the C runtime statically (/MT) instead of dynamically (/MD)
    pub static_runtime: bool,

    /// Use the debug C runtime
    pub debug_runtime: bool,

    /// Suppress all compiler warnings
    pub no_warnings: bool,

    /// Treat warnings as errors (compiler and linker)
    pub warnings_as_errors: bool,

    /// Preprocessor defines (`NAME` or `NAME=VALUE`)
    pub defines: Vec<String>,

    /// Preprocessor undefines
    pub undefines: Vec<String>,

    /// User include directories
    pub include_dirs: Vec<PathBuf>,

    /// User library search directories
    pub library_dirs: Vec<PathBuf>,

    /// Libraries to link
    pub libraries: Vec<String>,

    /// Libraries that must be linked statically
    pub static_libraries: Vec<String>,

    /// Libraries that must be linked through their import library
    pub shared_libraries: Vec<String>,

    /// Linker subsystem
    pub subsystem: Subsystem,

    /// Profiling build
    pub profile: bool,

    /// Debug info level (0 = none)
    pub debug_level: u32,

    /// Extra flags appended to the compiler command
    pub extra_compiler_flags: Vec<String>,

    /// Extra flags appended to the linker command
    pub extra_linker_flags: Vec<String>,
}

impl ProjectSettings {
    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse settings: {}", path.display()))
    }

    /// The C runtime selected by `static_runtime`.
    pub fn runtime(&self) -> MsvcRuntime {
        if self.static_runtime {
            MsvcRuntime::Static
        } else {
            MsvcRuntime::Dynamic
        }
    }

    /// The compiler diagnostics policy.
    pub fn diagnostics(&self) -> DiagnosticsPolicy {
        DiagnosticsPolicy::from_flags(self.no_warnings, self.warnings_as_errors)
    }

    /// Whether the linker should emit debug information.
    pub fn wants_debug_info(&self) -> bool {
        self.profile || self.debug_level > 0
    }
}
