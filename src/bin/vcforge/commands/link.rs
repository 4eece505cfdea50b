//! `vcforge link` command

use anyhow::Result;

use crate::cli::LinkArgs;
use vcforge::{ProjectSettings, Toolchain};

pub fn execute(args: LinkArgs) -> Result<()> {
    let settings = ProjectSettings::load(&args.settings)?;
    let toolchain = super::toolchain()?;

    let cmd = toolchain.link_command(&settings, &args.output, &args.objects)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&cmd)?);
    } else {
        println!("{}", cmd.to_command_line());
    }

    Ok(())
}
