//! `vcforge find-lib` command

use anyhow::{bail, Result};

use crate::cli::FindLibArgs;
use vcforge::Toolchain;

pub fn execute(args: FindLibArgs) -> Result<()> {
    let toolchain = super::toolchain()?;

    match toolchain.find_library(&args.name, &args.dirs) {
        Some(path) => {
            println!("{}", path.display());
            Ok(())
        }
        None => bail!(
            "library `{}` not found in {} search directories",
            args.name,
            args.dirs.len()
        ),
    }
}
