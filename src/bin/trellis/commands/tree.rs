//! `trellis tree` command

use anyhow::Result;

use crate::cli::TreeArgs;
use crate::GlobalOptions;
use trellis::ops::{format_tree, TreeOptions};

pub fn execute(args: TreeArgs, global: &GlobalOptions) -> Result<()> {
    let ws = global.workspace()?;
    let project = ws.load_project()?;

    let opts = TreeOptions {
        depth: args.depth.unwrap_or(usize::MAX),
        duplicates: args.duplicates,
    };
    print!("{}", format_tree(&project, &opts)?);

    Ok(())
}
