//! `vcforge ext` command

use anyhow::Result;

use crate::cli::ExtArgs;
use vcforge::Toolchain;

pub fn execute(args: ExtArgs) -> Result<()> {
    let toolchain = super::toolchain()?;
    println!("{}", toolchain.output_extension(args.kind));
    Ok(())
}
