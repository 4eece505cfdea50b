//! Core data types: project settings and output kinds.

pub mod settings;
pub mod target;

pub use settings::{DiagnosticsPolicy, MsvcRuntime, ProjectSettings, Subsystem};
pub use target::OutputKind;
