//! `trellis validate` command

use anyhow::Result;

use crate::cli::ValidateArgs;
use crate::GlobalOptions;
use trellis::core::manifest;
use trellis::ops::{validate, ValidateOptions};

pub fn execute(args: ValidateArgs, global: &GlobalOptions) -> Result<()> {
    let ws = global.workspace()?;

    let opts = ValidateOptions {
        offline: args.offline,
    };
    let project = validate(&ws, &opts)?;

    if args.print {
        print!("{}", manifest::serialize(&project));
    }

    if args.offline {
        println!("{} is a valid project", project.name());
    } else {
        println!("{} is a valid project and all dependencies are reachable", project.name());
    }
    Ok(())
}
