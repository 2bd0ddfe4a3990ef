//! `trellis update` command

use anyhow::Result;

use crate::cli::{UpdateArgs, UpdateCommand, UpdateObjectArgs};
use crate::GlobalOptions;
use trellis::ops::{update_dependency, update_object, UpdateDependencyOptions, UpdateObjectOptions};

pub fn execute(args: UpdateArgs, global: &GlobalOptions) -> Result<()> {
    let ws = global.workspace()?;

    match args.command {
        UpdateCommand::App(args) | UpdateCommand::Lib(args) => {
            update_object(&ws, &object_options(args))
        }
        UpdateCommand::Test(args) => {
            let opts = UpdateObjectOptions {
                name: args.name,
                command: Some(args.command),
                ..UpdateObjectOptions::default()
            };
            update_object(&ws, &opts)
        }
        UpdateCommand::Dep(args) => {
            let opts = UpdateDependencyOptions {
                name: args.name,
                object: args.object,
                location: args.location,
                tag: args.tag,
                release: args.release,
                hash: args.hash,
            };
            update_dependency(&ws, &opts)
        }
    }
}

fn object_options(args: UpdateObjectArgs) -> UpdateObjectOptions {
    UpdateObjectOptions {
        name: args.name,
        language: args.lang,
        compile_options: args.compile_options,
        link_options: args.link_options,
        command: None,
    }
}
