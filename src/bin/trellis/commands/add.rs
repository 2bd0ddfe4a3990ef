//! `trellis add` command

use anyhow::Result;

use crate::cli::{AddArgs, AddCommand, AddDepArgs, ObjectArgs};
use crate::GlobalOptions;
use trellis::core::ObjectType;
use trellis::ops::{add_dependency, add_object, AddDependencyOptions, AddObjectOptions};

pub fn execute(args: AddArgs, global: &GlobalOptions) -> Result<()> {
    let ws = global.workspace()?;

    match args.command {
        AddCommand::App(args) => add_object(&ws, &object_options(ObjectType::App, args)),
        AddCommand::Lib(args) => add_object(&ws, &object_options(ObjectType::Lib, args)),
        AddCommand::Test(args) => {
            let mut opts = AddObjectOptions::new(ObjectType::Test, args.name);
            opts.command = args.command;
            add_object(&ws, &opts)
        }
        AddCommand::Dep(args) => add_dependency(&ws, &dependency_options(args)).map(|_| ()),
    }
}

fn object_options(object_type: ObjectType, args: ObjectArgs) -> AddObjectOptions {
    AddObjectOptions {
        name: args.name,
        object_type,
        language: args.lang,
        compile_options: args.compile_options,
        link_options: args.link_options,
        command: String::new(),
    }
}

fn dependency_options(args: AddDepArgs) -> AddDependencyOptions {
    AddDependencyOptions {
        object: args.object,
        name: args.name.unwrap_or_default(),
        location: args.location.unwrap_or_default(),
        tag: args.tag.unwrap_or_default(),
        release: args.release.unwrap_or_default(),
        hash: args.hash.unwrap_or_default(),
    }
}
