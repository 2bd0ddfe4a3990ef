//! `trellis init` command

use anyhow::Result;

use crate::cli::InitArgs;
use crate::GlobalOptions;
use trellis::ops::{init_project, InitOptions};

pub fn execute(args: InitArgs, global: &GlobalOptions) -> Result<()> {
    let path = match args.path {
        Some(path) => path,
        None => global.start_dir()?.join(&args.name),
    };

    let opts = InitOptions {
        name: args.name,
        version: args.version,
    };
    init_project(&path, &opts)?;

    Ok(())
}
