//! Toolchain abstraction for native compilers.
//!
//! A toolchain turns [`ProjectSettings`] into compiler and linker commands.
//! Commands are kept as ordered argument lists ([`CommandSpec`]) and are only
//! flattened into a single command line at the process boundary.
//!
//! MSVC is the only implementation; its installation is located through a
//! [`BuildSession`](crate::builder::BuildSession) shared by every adapter in
//! one build.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::settings::ProjectSettings;
use crate::core::target::OutputKind;
use crate::util::process::ProcessBuilder;

pub mod env;
mod error;
mod msvc;

pub use env::{Arch, HostProbe, ResolvedEnvironment, ScriptRunner, VcvarsRunner};
pub use error::ToolchainError;
pub use msvc::{MsvcInvocation, MsvcToolchain};

/// Exit code that every toolchain adapter reports for an interrupted tool.
pub const INTERRUPT_EXIT_CODE: i32 = -1;

/// A command to execute, with program, arguments, and environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
    /// The program to run (e.g., "cl", "link")
    pub program: PathBuf,
    /// Command arguments
    pub args: Vec<String>,
    /// Environment variables to set
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    /// Create a new command spec.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    /// Add an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(|a| a.into()));
        self
    }

    /// Add an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Serialize into a single Windows command line.
    ///
    /// The program is always quoted. Arguments are quoted only when they are
    /// empty or contain whitespace or quotes.
    pub fn to_command_line(&self) -> String {
        let program = self.program.display().to_string();
        let mut line = quote_arg(&program, true).into_owned();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&quote_arg(arg, false));
        }
        line
    }

    /// Convert into a process builder ready to spawn.
    pub fn to_process(&self) -> ProcessBuilder {
        self.env.iter().fold(
            ProcessBuilder::new(&self.program).args(&self.args),
            |pb, (key, value)| pb.env(key, value),
        )
    }
}

/// Quote one argument following the MSVC runtime's command line rules.
///
/// Backslashes are literal unless they precede a quote, in which case they
/// are doubled and the quote is escaped.
fn quote_arg(arg: &str, force: bool) -> Cow<'_, str> {
    let needs_quotes = arg.is_empty() || arg.chars().any(|c| matches!(c, ' ' | '\t' | '\n' | '"'));
    if !force && !needs_quotes {
        return Cow::Borrowed(arg);
    }

    let mut out = String::with_capacity(arg.len() + 2);
    out.push('"');
    let mut backslashes = 0;
    for c in arg.chars() {
        match c {
            '\\' => backslashes += 1,
            '"' => {
                out.extend(std::iter::repeat('\\').take(backslashes * 2 + 1));
                out.push('"');
                backslashes = 0;
            }
            _ => {
                out.extend(std::iter::repeat('\\').take(backslashes));
                out.push(c);
                backslashes = 0;
            }
        }
    }
    out.extend(std::iter::repeat('\\').take(backslashes * 2));
    out.push('"');
    Cow::Owned(out)
}

/// Trait for toolchain adapters.
///
/// Each adapter knows how to generate commands for its specific compiler.
/// Settings are borrowed per call; adapters keep no per-project state.
pub trait Toolchain: Send + Sync {
    /// Short name of the toolchain (e.g., "msvc").
    fn name(&self) -> &'static str;

    /// Generate the base compile command for a project.
    ///
    /// The result is shared by every source file of the project; see
    /// [`Toolchain::extended_compile_command`].
    fn compile_command(&self, settings: &ProjectSettings) -> Result<CommandSpec, ToolchainError>;

    /// Extend a base compile command with one object output and one source input.
    fn extended_compile_command(&self, base: &CommandSpec, output: &Path, input: &Path)
        -> CommandSpec;

    /// Generate the link (or archive) command for a project.
    fn link_command(
        &self,
        settings: &ProjectSettings,
        output: &Path,
        objects: &[PathBuf],
    ) -> Result<CommandSpec, ToolchainError>;

    /// Find a library by name in the given directories.
    fn find_library(&self, name: &str, dirs: &[PathBuf]) -> Option<PathBuf>;

    /// Get the native file extension for an output kind.
    fn output_extension(&self, kind: OutputKind) -> &'static str {
        kind.extension()
    }

    /// Get the object file extension.
    fn object_extension(&self) -> &'static str;

    /// Exit code the orchestrator should treat as "interrupted".
    fn interrupt_exit_code(&self) -> i32 {
        INTERRUPT_EXIT_CODE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_quotes_program_and_spaced_args() {
        let cmd = CommandSpec::new("C:/VC/bin/cl").args(["/nologo", "/IC:/Program Files/x"]);
        assert_eq!(
            cmd.to_command_line(),
            r#""C:/VC/bin/cl" /nologo "/IC:/Program Files/x""#
        );
    }

    #[test]
    fn test_quote_escapes_embedded_quotes() {
        assert_eq!(quote_arg(r#"/DMSG="hi""#, false), r#""/DMSG=\"hi\"""#);
        assert_eq!(quote_arg("", false), r#""""#);
        assert_eq!(quote_arg("plain", false), "plain");
    }

    #[test]
    fn test_quote_doubles_trailing_backslashes() {
        assert_eq!(quote_arg(r"C:\a b\", false), r#""C:\a b\\""#);
        assert_eq!(quote_arg(r"C:\a\b", false), r"C:\a\b");
    }

    #[test]
    fn test_to_process_keeps_args_and_program() {
        let cmd = CommandSpec::new("link")
            .arg("/NOLOGO")
            .env("LIB", "C:/SDK/lib");
        let pb = cmd.to_process();
        assert_eq!(pb.get_program(), Path::new("link"));
        assert_eq!(pb.get_args(), ["/NOLOGO".to_string()]);
    }
}
