//! `trellis populate` command

use anyhow::Result;

use crate::cli::PopulateArgs;
use crate::GlobalOptions;
use trellis::ops::{populate, PopulateOptions};

pub fn execute(args: PopulateArgs, global: &GlobalOptions) -> Result<()> {
    let ws = global.workspace()?;

    let opts = PopulateOptions { force: args.force };
    populate(&ws, &opts)?;

    tracing::info!("Project population was successful");
    Ok(())
}
