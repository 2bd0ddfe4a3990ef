//! Implementation of `trellis add|update|remove {app,lib,test}`.

use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::core::object::{self, BuildInfo, Language, Object, ObjectKind, ObjectType};
use crate::core::Workspace;
use crate::util::fs::{ensure_dir, write_string};

/// Options for adding an app, lib or test.
#[derive(Debug, Clone)]
pub struct AddObjectOptions {
    pub name: String,
    pub object_type: ObjectType,

    /// Language name (`C`, `C++`, `cxx`, ...); ignored for tests
    pub language: String,

    /// `;`-separated compile options
    pub compile_options: String,

    /// `;`-separated link options
    pub link_options: String,

    /// Test command; ignored for apps and libs
    pub command: String,
}

impl AddObjectOptions {
    pub fn new(object_type: ObjectType, name: impl Into<String>) -> Self {
        AddObjectOptions {
            name: name.into(),
            object_type,
            language: "C++".to_string(),
            compile_options: String::new(),
            link_options: String::new(),
            command: String::new(),
        }
    }

    fn to_object(&self) -> Object {
        match self.object_type {
            ObjectType::Test => Object::test(&self.name, &self.command),
            ty => {
                let build = BuildInfo::new(Language::from_name(&self.language))
                    .with_compile_options(&self.compile_options)
                    .with_link_options(&self.link_options);
                if ty == ObjectType::App {
                    Object::app(&self.name, build)
                } else {
                    Object::lib(&self.name, build)
                }
            }
        }
    }
}

/// Add an object to the project and create its source directories.
pub fn add_object(ws: &Workspace, opts: &AddObjectOptions) -> Result<()> {
    object::validate_name(&opts.name)?;

    let mut project = ws.load_project()?;
    if project.object_exists(&opts.name, Some(opts.object_type)) {
        bail!(
            "{} `{}` already exists in project `{}`",
            opts.object_type,
            opts.name,
            project.name()
        );
    }
    if let Some(other) = project.object(&opts.name) {
        tracing::warn!(
            "`{}` already exists in project as a {}",
            opts.name,
            other.object_type()
        );
    }
    if opts.object_type == ObjectType::Test && opts.command.trim().is_empty() {
        tracing::warn!("test `{}` has no command", opts.name);
    }

    let object = opts.to_object();
    if object.object_type() != ObjectType::Test {
        create_sources(ws.root(), &object)?;
    }
    project.upsert(object);
    ws.save_project(&project)?;

    tracing::info!("Added {} `{}` to project `{}`", opts.object_type, opts.name, project.name());
    Ok(())
}

/// Options for changing an existing object. `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct UpdateObjectOptions {
    pub name: String,
    pub language: Option<String>,
    pub compile_options: Option<String>,
    pub link_options: Option<String>,
    pub command: Option<String>,
}

/// Change the build settings of an app or lib, or the command of a test.
pub fn update_object(ws: &Workspace, opts: &UpdateObjectOptions) -> Result<()> {
    let mut project = ws.load_project()?;
    let project_name = project.name().to_string();
    let Some(object) = project.object_mut(&opts.name) else {
        bail!("object `{}` does not exist in project `{}`", opts.name, project_name);
    };

    match object.kind_mut() {
        ObjectKind::App(build) | ObjectKind::Lib(build) => {
            if opts.command.is_some() {
                bail!("`{}` is not a test; only tests have a command", opts.name);
            }
            if let Some(language) = &opts.language {
                build.language = Language::from_name(language);
            }
            if let Some(options) = &opts.compile_options {
                build.compile_options = object::split_options(options);
            }
            if let Some(options) = &opts.link_options {
                build.link_options = object::split_options(options);
            }
        }
        ObjectKind::Test { command } => {
            if opts.language.is_some()
                || opts.compile_options.is_some()
                || opts.link_options.is_some()
            {
                bail!("`{}` is a test; tests only have a command", opts.name);
            }
            if let Some(new_command) = &opts.command {
                *command = new_command.clone();
            }
        }
    }

    ws.save_project(&project)?;
    tracing::info!("Updated `{}` in project `{}`", opts.name, project_name);
    Ok(())
}

/// Remove an object by name. `object_type` restricts which collection is
/// searched; `None` removes the name from all of them.
pub fn remove_object(ws: &Workspace, name: &str, object_type: Option<ObjectType>) -> Result<()> {
    if name.is_empty() {
        bail!("object name must not be empty");
    }

    let mut project = ws.load_project()?;
    if !project.remove(name, object_type) {
        match object_type {
            Some(ty) => bail!("{} `{}` does not exist in project `{}`", ty, name, project.name()),
            None => bail!("object `{}` does not exist in project `{}`", name, project.name()),
        }
    }

    let dangling: Vec<&str> = project
        .objects()
        .filter(|o| o.dependencies().any(|d| d.is_sibling() && d.name() == name))
        .map(|o| o.name())
        .collect();
    if !dangling.is_empty() {
        tracing::warn!(
            "`{}` is still listed as a dependency of: {}",
            name,
            dangling.join(", ")
        );
    }

    ws.save_project(&project)?;
    tracing::info!("Removed `{}` from project `{}`", name, project.name());
    Ok(())
}

/// Create `<kind>/<name>/` and `include/<name>/` with starter files. Existing
/// files are left alone.
fn create_sources(root: &Path, object: &Object) -> Result<()> {
    let name = object.name();
    let language = object.language().unwrap_or_default();
    let (dir, source) = match object.object_type() {
        ObjectType::App => ("apps", app_source(name, language)),
        _ => ("libs", lib_source(name, language)),
    };

    let source_dir = root.join(dir).join(name);
    let include_dir = root.join("include").join(name);
    ensure_dir(&source_dir)?;
    ensure_dir(&include_dir)?;

    let source_path = source_dir.join(format!("{}{}", name, language.source_extension()));
    if !source_path.exists() {
        write_string(&source_path, &source)
            .with_context(|| format!("failed to write {}", source_path.display()))?;
    }

    if object.object_type() == ObjectType::Lib {
        let header_path = include_dir.join(format!("{}{}", name, header_extension(language)));
        if !header_path.exists() {
            write_string(&header_path, &lib_header(name))
                .with_context(|| format!("failed to write {}", header_path.display()))?;
        }
    }
    Ok(())
}

fn header_extension(language: Language) -> &'static str {
    match language {
        Language::C => ".h",
        Language::Cxx => ".hpp",
    }
}

fn app_source(name: &str, language: Language) -> String {
    match language {
        Language::C => format!(
            "#include <stdio.h>\n\nint main(void) {{\n    printf(\"Hello from {name}!\\n\");\n    return 0;\n}}\n"
        ),
        Language::Cxx => format!(
            "#include <iostream>\n\nint main() {{\n    std::cout << \"Hello from {name}!\" << std::endl;\n    return 0;\n}}\n"
        ),
    }
}

fn lib_source(name: &str, language: Language) -> String {
    format!(
        "#include <{name}{ext}>\n\nint {name}_version(void) {{\n    return 0;\n}}\n",
        ext = header_extension(language)
    )
}

fn lib_header(name: &str) -> String {
    let guard = format!("{}_H", name.to_uppercase());
    format!(
        "#ifndef {guard}\n#define {guard}\n\n#ifdef __cplusplus\nextern \"C\" {{\n#endif\n\nint {name}_version(void);\n\n#ifdef __cplusplus\n}}\n#endif\n\n#endif /* {guard} */\n"
    )
}
