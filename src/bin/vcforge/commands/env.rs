//! `vcforge env` command

use anyhow::Result;

use crate::cli::EnvArgs;
use vcforge::builder::toolchain::env::install_hint_var;
use vcforge::ProjectSettings;

pub fn execute(args: EnvArgs) -> Result<()> {
    let toolchain = super::toolchain()?;
    let settings = ProjectSettings {
        force_32_bit: args.force_32,
        force_64_bit: args.force_64,
        ..Default::default()
    };

    let invocation = toolchain.setup(&settings)?;
    let env = invocation.env();

    if args.json {
        println!("{}", serde_json::to_string_pretty(env)?);
        return Ok(());
    }

    println!("MSVC environment:");
    println!();
    println!("  Root:   {}", env.toolchain_root.display());
    println!("  Bin:    {}", env.bin_dir.display());
    println!("  SDK:    {}", env.sdk_dir.display());
    println!("  Host:   {}", env.host_arch.machine_token());
    println!("  Target: {}", env.build_arch.machine_token());
    println!();

    println!("Include directories:");
    for dir in &env.include_dirs {
        println!("  {}", dir.display());
    }
    println!();

    println!("Library directories:");
    for dir in &env.lib_dirs {
        println!("  {}", dir.display());
    }
    println!();

    let version = toolchain.session().probe().version;
    println!("Hint variable: {}", install_hint_var(version));

    Ok(())
}
