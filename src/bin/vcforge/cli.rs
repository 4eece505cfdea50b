//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use vcforge::OutputKind;

/// vcforge - turn portable build settings into MSVC commands
#[derive(Parser)]
#[command(name = "vcforge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the compile command for a project
    Compile(CompileArgs),

    /// Print the link (or archive) command for a project
    Link(LinkArgs),

    /// Show the resolved MSVC environment
    Env(EnvArgs),

    /// Search library directories for a library
    FindLib(FindLibArgs),

    /// Print the file extension for an output kind
    Ext(ExtArgs),
}

#[derive(Args)]
pub struct CompileArgs {
    /// Project settings file (TOML)
    pub settings: PathBuf,

    /// Source files; one extended command is printed per file
    #[arg(long = "source")]
    pub sources: Vec<PathBuf>,

    /// Directory for object files
    #[arg(long, default_value = ".")]
    pub obj_dir: PathBuf,

    /// Print commands as JSON instead of command lines
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct LinkArgs {
    /// Project settings file (TOML)
    pub settings: PathBuf,

    /// Output file
    #[arg(short, long)]
    pub output: PathBuf,

    /// Object files to link
    pub objects: Vec<PathBuf>,

    /// Print the command as JSON instead of a command line
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct EnvArgs {
    /// Resolve for 32-bit output
    #[arg(long, conflicts_with = "force_64")]
    pub force_32: bool,

    /// Resolve for 64-bit output
    #[arg(long)]
    pub force_64: bool,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct FindLibArgs {
    /// Library name, with or without `.lib`
    pub name: String,

    /// Directory to search (repeatable, searched in order)
    #[arg(long = "dir")]
    pub dirs: Vec<PathBuf>,
}

#[derive(Args)]
pub struct ExtArgs {
    /// Output kind (application, static-library, shared-library)
    pub kind: OutputKind,
}
