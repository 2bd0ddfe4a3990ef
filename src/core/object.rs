//! Apps, libraries and tests.
//!
//! An [`Object`] is a named build artifact of a project. Apps and libraries
//! carry a language and compile/link options; tests carry a command. Every
//! object owns its dependencies, keyed by dependency name.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::core::dependency::Dependency;
use crate::core::errors::ValidationError;

static OBJECT_NAME: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[_a-zA-Z][_a-zA-Z0-9]*$").ok());

/// Check an app, lib or test name.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if OBJECT_NAME.as_ref().is_some_and(|re| re.is_match(name)) {
        Ok(())
    } else {
        Err(ValidationError::InvalidObjectName(name.to_string()))
    }
}

/// Source language of an app or lib.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    C,
    Cxx,
}

impl Language {
    /// Map a user-supplied language name. `c++`, `cpp` and `cxx` in any
    /// case mean C++; everything else is C.
    pub fn from_name(name: &str) -> Language {
        match name.trim().to_ascii_lowercase().as_str() {
            "c++" | "cpp" | "cxx" => Language::Cxx,
            _ => Language::C,
        }
    }

    /// The name CMake uses for this language.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::C => "C",
            Language::Cxx => "CXX",
        }
    }

    pub fn source_extension(&self) -> &'static str {
        match self {
            Language::C => ".c",
            Language::Cxx => ".cpp",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which collection of the project an object belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    App,
    Lib,
    Test,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::App => "app",
            ObjectType::Lib => "lib",
            ObjectType::Test => "test",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build settings shared by apps and libs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildInfo {
    pub language: Language,
    pub compile_options: Vec<String>,
    pub link_options: Vec<String>,
}

impl BuildInfo {
    pub fn new(language: Language) -> Self {
        BuildInfo {
            language,
            ..BuildInfo::default()
        }
    }

    pub fn with_compile_options(mut self, options: &str) -> Self {
        self.compile_options = split_options(options);
        self
    }

    pub fn with_link_options(mut self, options: &str) -> Self {
        self.link_options = split_options(options);
        self
    }
}

/// Per-kind payload of an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectKind {
    App(BuildInfo),
    Lib(BuildInfo),
    Test { command: String },
}

impl ObjectKind {
    pub fn object_type(&self) -> ObjectType {
        match self {
            ObjectKind::App(_) => ObjectType::App,
            ObjectKind::Lib(_) => ObjectType::Lib,
            ObjectKind::Test { .. } => ObjectType::Test,
        }
    }
}

/// A named app, library or test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    name: String,
    kind: ObjectKind,
    dependencies: BTreeMap<String, Dependency>,
}

impl Object {
    pub fn new(name: impl Into<String>, kind: ObjectKind) -> Self {
        Object {
            name: name.into(),
            kind,
            dependencies: BTreeMap::new(),
        }
    }

    pub fn app(name: impl Into<String>, build: BuildInfo) -> Self {
        Object::new(name, ObjectKind::App(build))
    }

    pub fn lib(name: impl Into<String>, build: BuildInfo) -> Self {
        Object::new(name, ObjectKind::Lib(build))
    }

    pub fn test(name: impl Into<String>, command: impl Into<String>) -> Self {
        Object::new(
            name,
            ObjectKind::Test {
                command: command.into(),
            },
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut ObjectKind {
        &mut self.kind
    }

    pub fn object_type(&self) -> ObjectType {
        self.kind.object_type()
    }

    /// Build settings, for apps and libs.
    pub fn build_info(&self) -> Option<&BuildInfo> {
        match &self.kind {
            ObjectKind::App(info) | ObjectKind::Lib(info) => Some(info),
            ObjectKind::Test { .. } => None,
        }
    }

    pub fn language(&self) -> Option<Language> {
        self.build_info().map(|info| info.language)
    }

    pub fn command(&self) -> Option<&str> {
        match &self.kind {
            ObjectKind::Test { command } => Some(command),
            _ => None,
        }
    }

    /// Dependencies in name order.
    pub fn dependencies(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies.values()
    }

    pub fn dependency(&self, name: &str) -> Option<&Dependency> {
        self.dependencies.get(name)
    }

    pub fn dependency_mut(&mut self, name: &str) -> Option<&mut Dependency> {
        self.dependencies.get_mut(name)
    }

    pub fn dependency_exists(&self, name: &str) -> bool {
        self.dependencies.contains_key(name)
    }

    /// Insert or replace a dependency by name. Returns true if an entry with
    /// the same name was replaced.
    pub fn upsert_dependency(&mut self, dep: Dependency) -> bool {
        self.dependencies
            .insert(dep.name().to_string(), dep)
            .is_some()
    }

    /// Remove a dependency by name, returning it if present.
    pub fn remove_dependency(&mut self, name: &str) -> Option<Dependency> {
        self.dependencies.remove(name)
    }
}

/// Split a `;`-separated option string, dropping empty tokens.
pub fn split_options(options: &str) -> Vec<String> {
    options
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
