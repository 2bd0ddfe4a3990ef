//! `trellis remove` command

use anyhow::Result;

use crate::cli::{RemoveArgs, RemoveCommand};
use crate::GlobalOptions;
use trellis::core::ObjectType;
use trellis::ops::{remove_dependency, remove_object};

pub fn execute(args: RemoveArgs, global: &GlobalOptions) -> Result<()> {
    let ws = global.workspace()?;

    match args.command {
        RemoveCommand::App(args) => remove_object(&ws, &args.name, Some(ObjectType::App)),
        RemoveCommand::Lib(args) => remove_object(&ws, &args.name, Some(ObjectType::Lib)),
        RemoveCommand::Test(args) => remove_object(&ws, &args.name, Some(ObjectType::Test)),
        RemoveCommand::Dep(args) => remove_dependency(&ws, &args.name, args.object.as_deref()),
    }
}
