//! Output kinds - what a project links into.
//!
//! An OutputKind names the artifact a project produces: an application,
//! a static library, or a shared library.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The kind of artifact being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputKind {
    /// Executable binary (.exe)
    #[default]
    #[serde(alias = "exe", alias = "app")]
    Application,

    /// Static library (.lib)
    #[serde(alias = "staticlib", alias = "static")]
    StaticLibrary,

    /// Shared/dynamic library (.dll)
    #[serde(alias = "sharedlib", alias = "dll", alias = "shared")]
    SharedLibrary,
}

impl OutputKind {
    /// Get the native file extension for this output kind.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputKind::Application => "exe",
            OutputKind::StaticLibrary => "lib",
            OutputKind::SharedLibrary => "dll",
        }
    }

    /// Get the output filename for an artifact named `name`.
    pub fn output_filename(&self, name: &str) -> String {
        format!("{}.{}", name, self.extension())
    }

    /// Check if this output is produced by the archiver instead of the linker.
    pub fn is_archive(&self) -> bool {
        matches!(self, OutputKind::StaticLibrary)
    }

    /// Check if this is a library (static or shared).
    pub fn is_library(&self) -> bool {
        matches!(self, OutputKind::StaticLibrary | OutputKind::SharedLibrary)
    }

    /// Get the kebab-case name used in settings files.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputKind::Application => "application",
            OutputKind::StaticLibrary => "static-library",
            OutputKind::SharedLibrary => "shared-library",
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "application" | "app" | "exe" => Ok(OutputKind::Application),
            "static-library" | "staticlib" | "static" => Ok(OutputKind::StaticLibrary),
            "shared-library" | "sharedlib" | "shared" | "dll" => Ok(OutputKind::SharedLibrary),
            other => Err(format!("unknown output kind `{}`", other)),
        }
    }
}
