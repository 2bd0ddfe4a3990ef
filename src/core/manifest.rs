//! project.toml parsing and serialization.
//!
//! The manifest vocabulary is closed. Root level admits `project`, `version`,
//! `apps`, `libraries` and `tests`; an object admits `name`, `lang`,
//! `compile_options`, `link_options`, `command` and `depends`; a dependency
//! admits `name`, `from`, `tag`, `release`, `hash` and `patch`.
//!
//! ```toml
//! project = "hello"
//! version = "1.0.0"
//!
//! [[apps]]
//! name = "greeter"
//! lang = "CXX"
//! compile_options = "-O2;-Wall"
//!
//! [[apps.depends]]
//! from = "org/dune"
//! release = ">= 2.0, < 3.0"
//! ```
//!
//! Objects and dependencies may also be written as inline tables. Parsing is
//! strict: anything outside the vocabulary, a duplicate key or a missing value
//! fails the whole document with a diagnostic pointing at the offending key.

use std::fmt;
use std::ops::Range;
use std::path::Path;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;
use toml_edit::{value, Array, ArrayOfTables, DocumentMut, ImDocument, Item, Table, TableLike, Value};

use crate::core::dependency::Dependency;
use crate::core::location::{self, LocationKind};
use crate::core::object::{split_options, BuildInfo, Language, Object, ObjectKind, ObjectType};
use crate::core::project::Project;
use crate::core::version::Version;

/// First line of every file trellis writes.
pub const MARKER: &str = "#trellis::generated";

const PREAMBLE: &str = "# This file is maintained by trellis. Comments added by hand may be discarded.";

const ROOT_KEYS: &[&str] = &["project", "version", "apps", "libraries", "tests"];
const OBJECT_KEYS: &[&str] = &["name", "lang", "compile_options", "link_options", "command", "depends"];
const DEPENDENCY_KEYS: &[&str] = &["name", "from", "tag", "release", "hash", "patch"];

/// What went wrong while reading a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestErrorKind {
    Syntax(String),
    UnknownKey { key: String, level: &'static str },
    UnexpectedKey { key: String, level: &'static str },
    DuplicateKey(String),
    MissingValue { key: String, level: &'static str },
    InvalidValue { key: String, expected: &'static str },
    KindMismatch { key: String, object_type: ObjectType },
    DuplicateObject { name: String, collection: &'static str },
    DuplicateDependency { name: String, object: String },
    InvalidLocation { location: String },
    Io(String),
}

impl fmt::Display for ManifestErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestErrorKind::Syntax(msg) => write!(f, "invalid TOML: {}", msg),
            ManifestErrorKind::UnknownKey { key, level } => {
                write!(f, "unknown key `{}` in {}", key, level)
            }
            ManifestErrorKind::UnexpectedKey { key, level } => {
                write!(f, "key `{}` is not allowed in {}", key, level)
            }
            ManifestErrorKind::DuplicateKey(msg) => write!(f, "{}", msg),
            ManifestErrorKind::MissingValue { key, level } => {
                write!(f, "`{}` in {} requires a value", key, level)
            }
            ManifestErrorKind::InvalidValue { key, expected } => {
                write!(f, "`{}` must be {}", key, expected)
            }
            ManifestErrorKind::KindMismatch { key, object_type } => {
                write!(f, "{} objects may not have `{}`", object_type, key)
            }
            ManifestErrorKind::DuplicateObject { name, collection } => {
                write!(f, "multiple objects named `{}` in `{}`", name, collection)
            }
            ManifestErrorKind::DuplicateDependency { name, object } => {
                write!(f, "multiple dependencies named `{}` in `{}`", name, object)
            }
            ManifestErrorKind::InvalidLocation { location } => {
                write!(f, "invalid location `{}`", location)
            }
            ManifestErrorKind::Io(msg) => write!(f, "{}", msg),
        }
    }
}

/// `line:column` of an error, when known.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position(Option<(usize, usize)>);

impl Position {
    fn locate(content: &str, offset: usize) -> Position {
        let before = &content[..offset.min(content.len())];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        Position(Some((line, column)))
    }

    pub fn line_col(&self) -> Option<(usize, usize)> {
        self.0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some((line, col)) => write!(f, " at {}:{}", line, col),
            None => Ok(()),
        }
    }
}

/// A manifest error with the source snippet it refers to.
#[derive(Debug, Error, Diagnostic)]
#[error("{kind}{position}")]
#[diagnostic(code(trellis::manifest))]
pub struct ManifestError {
    pub kind: ManifestErrorKind,
    pub position: Position,
    #[source_code]
    pub src: NamedSource<String>,
    #[label("here")]
    pub span: Option<SourceSpan>,
    #[help]
    pub help: Option<String>,
}

impl ManifestError {
    fn new(kind: ManifestErrorKind, path: &Path, content: &str, span: Option<Range<usize>>) -> Self {
        let position = span
            .as_ref()
            .map_or(Position::default(), |r| Position::locate(content, r.start));
        let help = match &kind {
            ManifestErrorKind::UnknownKey { level, .. } | ManifestErrorKind::UnexpectedKey { level, .. } => {
                Some(format!("{} keys: {}", level, allowed_keys(level).join(", ")))
            }
            ManifestErrorKind::InvalidLocation { .. } => {
                Some("use `org/repo`, `https://github.com/org/repo` or an archive URL".to_string())
            }
            _ => None,
        };
        ManifestError {
            kind,
            position,
            src: NamedSource::new(path.display().to_string(), content.to_string()),
            span: span.map(SourceSpan::from),
            help,
        }
    }

    fn io(path: &Path, err: std::io::Error) -> Self {
        ManifestError::new(
            ManifestErrorKind::Io(format!("failed to access {}: {}", path.display(), err)),
            path,
            "",
            None,
        )
    }
}

fn allowed_keys(level: &str) -> &'static [&'static str] {
    match level {
        "the root" => ROOT_KEYS,
        "a dependency" => DEPENDENCY_KEYS,
        _ => OBJECT_KEYS,
    }
}

fn object_level(ty: ObjectType) -> &'static str {
    match ty {
        ObjectType::App => "an app",
        ObjectType::Lib => "a library",
        ObjectType::Test => "a test",
    }
}

/// Read and parse the manifest at `path`.
pub fn load(path: &Path) -> Result<Project, ManifestError> {
    let content = std::fs::read_to_string(path).map_err(|e| ManifestError::io(path, e))?;
    parse(&content, path)
}

/// Serialize `project` and write it to its path.
pub fn save(project: &Project) -> Result<(), ManifestError> {
    let path = project.path();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ManifestError::io(parent, e))?;
    }
    std::fs::write(path, serialize(project)).map_err(|e| ManifestError::io(path, e))
}

/// True if `content` starts with the marker line.
pub fn has_marker(content: &str) -> bool {
    content.lines().next().is_some_and(|line| line.trim_end() == MARKER)
}

/// Parse manifest text. `path` is recorded on the project and used in diagnostics.
pub fn parse(content: &str, path: &Path) -> Result<Project, ManifestError> {
    let doc = ImDocument::parse(content.to_string()).map_err(|e| {
        let message = e.message().trim().to_string();
        let kind = if message.contains("duplicate key") {
            ManifestErrorKind::DuplicateKey(message)
        } else {
            ManifestErrorKind::Syntax(message)
        };
        ManifestError::new(kind, path, content, e.span())
    })?;

    Parser { content, path }.project(doc.as_table())
}

struct Parser<'a> {
    content: &'a str,
    path: &'a Path,
}

impl Parser<'_> {
    fn error(&self, kind: ManifestErrorKind, span: Option<Range<usize>>) -> ManifestError {
        ManifestError::new(kind, self.path, self.content, span)
    }

    fn key_error(&self, key: &str, level: &'static str, span: Option<Range<usize>>) -> ManifestError {
        let known = ROOT_KEYS
            .iter()
            .chain(OBJECT_KEYS)
            .chain(DEPENDENCY_KEYS)
            .any(|k| *k == key);
        let kind = if known {
            ManifestErrorKind::UnexpectedKey {
                key: key.to_string(),
                level,
            }
        } else {
            ManifestErrorKind::UnknownKey {
                key: key.to_string(),
                level,
            }
        };
        self.error(kind, span)
    }

    /// A non-empty string value.
    fn string(&self, key: &str, item: &Item, level: &'static str) -> Result<String, ManifestError> {
        match item.as_str() {
            Some(s) if !s.trim().is_empty() => Ok(s.to_string()),
            Some(_) => Err(self.error(
                ManifestErrorKind::MissingValue {
                    key: key.to_string(),
                    level,
                },
                item.span(),
            )),
            None => Err(self.error(
                ManifestErrorKind::InvalidValue {
                    key: key.to_string(),
                    expected: "a string",
                },
                item.span(),
            )),
        }
    }

    /// A list of strings, written either as an array or as one `;`-separated string.
    fn string_list(&self, key: &str, item: &Item) -> Result<Vec<String>, ManifestError> {
        if let Some(s) = item.as_str() {
            return Ok(split_options(s));
        }
        let invalid = |span| {
            self.error(
                ManifestErrorKind::InvalidValue {
                    key: key.to_string(),
                    expected: "a string or an array of strings",
                },
                span,
            )
        };
        let array = item.as_array().ok_or_else(|| invalid(item.span()))?;
        array
            .iter()
            .map(|v| v.as_str().map(str::to_string).ok_or_else(|| invalid(v.span())))
            .collect()
    }

    /// The tables of `[[key]]` or `key = [{ ... }, ...]`.
    fn table_list<'i>(&self, key: &str, item: &'i Item) -> Result<Vec<&'i dyn TableLike>, ManifestError> {
        let invalid = |span| {
            self.error(
                ManifestErrorKind::InvalidValue {
                    key: key.to_string(),
                    expected: "an array of tables",
                },
                span,
            )
        };
        match item {
            Item::ArrayOfTables(aot) => Ok(aot.iter().map(|t| t as &dyn TableLike).collect()),
            Item::Value(Value::Array(array)) => array
                .iter()
                .map(|v| match v.as_inline_table() {
                    Some(t) => Ok(t as &dyn TableLike),
                    None => Err(invalid(v.span())),
                })
                .collect(),
            other => Err(invalid(other.span())),
        }
    }

    fn project(&self, root: &dyn TableLike) -> Result<Project, ManifestError> {
        let mut project = Project::default().with_path(self.path);
        let level = "the root";

        for (key, item) in root.iter() {
            let span = key_span(root, key);
            match key {
                "project" => project.set_name(self.string(key, item, level)?),
                "version" => project.set_version(Version::new(self.string(key, item, level)?)),
                "apps" => self.objects(&mut project, "apps", item, ObjectType::App)?,
                "libraries" => self.objects(&mut project, "libraries", item, ObjectType::Lib)?,
                "tests" => self.objects(&mut project, "tests", item, ObjectType::Test)?,
                other => return Err(self.key_error(other, level, span)),
            }
        }

        if project.name().is_empty() {
            return Err(self.error(
                ManifestErrorKind::MissingValue {
                    key: "project".to_string(),
                    level,
                },
                None,
            ));
        }

        Ok(project)
    }

    fn objects(
        &self,
        project: &mut Project,
        key: &'static str,
        item: &Item,
        ty: ObjectType,
    ) -> Result<(), ManifestError> {
        for table in self.table_list(key, item)? {
            let object = self.object(table, ty)?;
            if project.object_exists(object.name(), Some(ty)) {
                return Err(self.error(
                    ManifestErrorKind::DuplicateObject {
                        name: object.name().to_string(),
                        collection: key,
                    },
                    value_span(table, "name"),
                ));
            }
            project.upsert(object);
        }
        Ok(())
    }

    fn object(&self, table: &dyn TableLike, ty: ObjectType) -> Result<Object, ManifestError> {
        let level = object_level(ty);
        let mut name = None;
        let mut build = BuildInfo::default();
        let mut command = String::new();
        let mut dependencies: Vec<(Dependency, Option<Range<usize>>)> = Vec::new();

        for (key, item) in table.iter() {
            let span = key_span(table, key);
            let mismatch = |this: &Self| {
                this.error(
                    ManifestErrorKind::KindMismatch {
                        key: key.to_string(),
                        object_type: ty,
                    },
                    span.clone(),
                )
            };
            match key {
                "name" => name = Some(self.string(key, item, level)?),
                "lang" | "compile_options" | "link_options" if ty == ObjectType::Test => {
                    return Err(mismatch(self));
                }
                "lang" => build.language = Language::from_name(&self.string(key, item, level)?),
                "compile_options" => build.compile_options = self.string_list(key, item)?,
                "link_options" => build.link_options = self.string_list(key, item)?,
                "command" if ty != ObjectType::Test => return Err(mismatch(self)),
                "command" => command = self.string(key, item, level)?,
                "depends" => {
                    for dep_table in self.table_list(key, item)? {
                        let dep = self.dependency(dep_table)?;
                        let dep_span = value_span(dep_table, "name").or_else(|| value_span(dep_table, "from"));
                        dependencies.push((dep, dep_span));
                    }
                }
                other => return Err(self.key_error(other, level, span)),
            }
        }

        let Some(name) = name else {
            return Err(self.error(
                ManifestErrorKind::MissingValue {
                    key: "name".to_string(),
                    level,
                },
                None,
            ));
        };

        let kind = match ty {
            ObjectType::App => ObjectKind::App(build),
            ObjectType::Lib => ObjectKind::Lib(build),
            ObjectType::Test => ObjectKind::Test { command },
        };
        let mut object = Object::new(name, kind);

        for (dep, span) in dependencies {
            if object.dependency_exists(dep.name()) {
                return Err(self.error(
                    ManifestErrorKind::DuplicateDependency {
                        name: dep.name().to_string(),
                        object: object.name().to_string(),
                    },
                    span,
                ));
            }
            object.upsert_dependency(dep);
        }

        Ok(object)
    }

    fn dependency(&self, table: &dyn TableLike) -> Result<Dependency, ManifestError> {
        let level = "a dependency";
        let mut name = String::new();
        let mut from = String::new();
        let mut tag = String::new();
        let mut release = String::new();
        let mut hash = String::new();
        let mut patches = Vec::new();

        for (key, item) in table.iter() {
            match key {
                "name" => name = self.string(key, item, level)?,
                "from" => {
                    from = self.string(key, item, level)?;
                    let kind = location::classify(&from);
                    if !matches!(
                        kind,
                        LocationKind::Archive | LocationKind::GitHubUrl | LocationKind::GitHubShorthand
                    ) {
                        return Err(self.error(
                            ManifestErrorKind::InvalidLocation { location: from },
                            item.span(),
                        ));
                    }
                }
                "tag" => tag = self.string(key, item, level)?,
                "release" => release = self.string(key, item, level)?,
                "hash" => hash = self.string(key, item, level)?,
                "patch" => patches = self.string_list(key, item)?,
                other => return Err(self.key_error(other, level, key_span(table, other))),
            }
        }

        if name.is_empty() && from.is_empty() {
            return Err(self.error(
                ManifestErrorKind::MissingValue {
                    key: "name".to_string(),
                    level,
                },
                None,
            ));
        }

        let mut dep = Dependency::default();
        dep.set(&name, &from, &tag, &release, &hash);
        for patch in patches {
            dep.patch_add(patch);
        }
        Ok(dep)
    }
}

fn key_span(table: &dyn TableLike, key: &str) -> Option<Range<usize>> {
    table.get_key_value(key).and_then(|(k, _)| k.span())
}

fn value_span(table: &dyn TableLike, key: &str) -> Option<Range<usize>> {
    table.get(key).and_then(Item::span)
}

/// Render `project` as manifest text, starting with the marker line.
pub fn serialize(project: &Project) -> String {
    let mut doc = DocumentMut::new();
    doc["project"] = value(project.name());
    if !project.version().is_empty() {
        doc["version"] = value(project.version().raw());
    }

    for (key, objects) in [
        ("apps", objects_to_tables(project.apps())),
        ("libraries", objects_to_tables(project.libs())),
        ("tests", objects_to_tables(project.tests())),
    ] {
        if !objects.is_empty() {
            doc.insert(key, Item::ArrayOfTables(objects));
        }
    }

    format!("{}\n{}\n\n{}", MARKER, PREAMBLE, doc)
}

fn objects_to_tables<'a>(objects: impl Iterator<Item = &'a Object>) -> ArrayOfTables {
    let mut tables = ArrayOfTables::new();
    for object in objects {
        tables.push(object_to_table(object));
    }
    tables
}

fn object_to_table(object: &Object) -> Table {
    let mut table = Table::new();
    table["name"] = value(object.name());

    match object.kind() {
        ObjectKind::App(build) | ObjectKind::Lib(build) => {
            table["lang"] = value(build.language.as_str());
            if !build.compile_options.is_empty() {
                table["compile_options"] = value(build.compile_options.join(";"));
            }
            if !build.link_options.is_empty() {
                table["link_options"] = value(build.link_options.join(";"));
            }
        }
        ObjectKind::Test { command } => {
            if !command.is_empty() {
                table["command"] = value(command.as_str());
            }
        }
    }

    let mut depends = ArrayOfTables::new();
    for dep in object.dependencies() {
        depends.push(dependency_to_table(dep));
    }
    if !depends.is_empty() {
        table.insert("depends", Item::ArrayOfTables(depends));
    }

    table
}

fn dependency_to_table(dep: &Dependency) -> Table {
    let mut table = Table::new();
    table["name"] = value(dep.name());
    for (key, field) in [
        ("from", dep.location()),
        ("tag", dep.tag()),
        ("release", dep.release()),
        ("hash", dep.hash()),
    ] {
        if !field.is_empty() {
            table[key] = value(field);
        }
    }

    let mut patches = Array::new();
    for patch in dep.patch_files() {
        patches.push(patch.to_string_lossy().into_owned());
    }
    if !patches.is_empty() {
        table["patch"] = value(patches);
    }

    table
}
