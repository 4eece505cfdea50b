//! `vcforge compile` command

use anyhow::Result;

use crate::cli::CompileArgs;
use vcforge::{ProjectSettings, Toolchain};

pub fn execute(args: CompileArgs) -> Result<()> {
    let settings = ProjectSettings::load(&args.settings)?;
    let toolchain = super::toolchain()?;

    let base = toolchain.compile_command(&settings)?;

    let mut commands = vec![base.clone()];
    for source in &args.sources {
        let stem = source
            .file_stem()
            .ok_or_else(|| anyhow::anyhow!("source has no file name: {}", source.display()))?;
        let mut object_name = stem.to_os_string();
        object_name.push(".");
        object_name.push(toolchain.object_extension());
        let object = args.obj_dir.join(object_name);
        commands.push(toolchain.extended_compile_command(&base, &object, source));
    }

    // The base command is only printed on its own when no sources were given.
    let shown = if args.sources.is_empty() {
        &commands[..]
    } else {
        &commands[1..]
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(shown)?);
    } else {
        for cmd in shown {
            println!("{}", cmd.to_command_line());
        }
    }

    Ok(())
}
