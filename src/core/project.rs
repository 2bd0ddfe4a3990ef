//! The in-memory project model.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::dependency::Dependency;
use crate::core::errors::ValidationError;
use crate::core::object::{self, BuildInfo, Object, ObjectType};
use crate::core::version::Version;
use crate::core::workspace::DEPENDENCIES_DIR;

/// A project: a name, a version and its apps, libraries and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Project {
    /// Path of the manifest this project was loaded from or will be saved to
    path: PathBuf,
    name: String,
    version: Version,
    apps: BTreeMap<String, Object>,
    libs: BTreeMap<String, Object>,
    tests: BTreeMap<String, Object>,
}

impl Project {
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Project {
            name: name.into(),
            version,
            ..Project::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = path.into();
    }

    /// The project root: the directory holding the manifest.
    pub fn root(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new("."))
    }

    /// Where fetched dependencies are stored.
    pub fn dependencies_dir(&self) -> PathBuf {
        self.root().join(DEPENDENCIES_DIR)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    pub fn apps(&self) -> impl Iterator<Item = &Object> {
        self.apps.values()
    }

    pub fn libs(&self) -> impl Iterator<Item = &Object> {
        self.libs.values()
    }

    pub fn tests(&self) -> impl Iterator<Item = &Object> {
        self.tests.values()
    }

    /// Apps and libs, the objects that take part in population.
    pub fn buildable(&self) -> impl Iterator<Item = &Object> {
        self.apps.values().chain(self.libs.values())
    }

    /// Every object: apps, then libs, then tests.
    pub fn objects(&self) -> impl Iterator<Item = &Object> {
        self.buildable().chain(self.tests.values())
    }

    fn collection(&self, ty: ObjectType) -> &BTreeMap<String, Object> {
        match ty {
            ObjectType::App => &self.apps,
            ObjectType::Lib => &self.libs,
            ObjectType::Test => &self.tests,
        }
    }

    fn collection_mut(&mut self, ty: ObjectType) -> &mut BTreeMap<String, Object> {
        match ty {
            ObjectType::App => &mut self.apps,
            ObjectType::Lib => &mut self.libs,
            ObjectType::Test => &mut self.tests,
        }
    }

    /// Insert or replace an object in the collection matching its kind.
    /// Returns the replaced object, if any.
    pub fn upsert(&mut self, object: Object) -> Option<Object> {
        let ty = object.object_type();
        self.collection_mut(ty)
            .insert(object.name().to_string(), object)
    }

    /// Insert or replace an app. Returns true if one was replaced.
    pub fn upsert_app(&mut self, name: &str, build: BuildInfo) -> bool {
        self.upsert(Object::app(name, build)).is_some()
    }

    /// Insert or replace a library. Returns true if one was replaced.
    pub fn upsert_lib(&mut self, name: &str, build: BuildInfo) -> bool {
        self.upsert(Object::lib(name, build)).is_some()
    }

    /// Insert or replace a test. Returns true if one was replaced.
    pub fn upsert_test(&mut self, name: &str, command: &str) -> bool {
        self.upsert(Object::test(name, command)).is_some()
    }

    /// Remove an object by name, from one collection or from all of them.
    pub fn remove(&mut self, name: &str, ty: Option<ObjectType>) -> bool {
        let mut removed = false;
        for candidate in [ObjectType::App, ObjectType::Lib, ObjectType::Test] {
            if ty.map_or(true, |t| t == candidate) {
                removed |= self.collection_mut(candidate).remove(name).is_some();
            }
        }
        removed
    }

    /// Look up an object, searching apps, then libs, then tests.
    pub fn object(&self, name: &str) -> Option<&Object> {
        self.apps
            .get(name)
            .or_else(|| self.libs.get(name))
            .or_else(|| self.tests.get(name))
    }

    pub fn object_mut(&mut self, name: &str) -> Option<&mut Object> {
        if self.apps.contains_key(name) {
            self.apps.get_mut(name)
        } else if self.libs.contains_key(name) {
            self.libs.get_mut(name)
        } else {
            self.tests.get_mut(name)
        }
    }

    pub fn object_exists(&self, name: &str, ty: Option<ObjectType>) -> bool {
        match ty {
            Some(ty) => self.collection(ty).contains_key(name),
            None => self.object(name).is_some(),
        }
    }

    /// Check one dependency of `owner` against this project: a sibling must
    /// name one of its libraries, anything else must have a valid location.
    pub fn validate_dependency(&self, owner: &str, dep: &Dependency) -> Result<(), ValidationError> {
        if dep.is_sibling() {
            if self.libs.contains_key(dep.name()) {
                return Ok(());
            }
            return Err(ValidationError::UnknownSibling {
                object: owner.to_string(),
                dependency: dep.name().to_string(),
            });
        }
        dep.validate().map(|_| ())
    }

    /// Check every object name and every dependency.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for obj in self.objects() {
            object::validate_name(obj.name())?;
            for dep in obj.dependencies() {
                self.validate_dependency(obj.name(), dep)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::object::Language;

    fn sample() -> Project {
        let mut project = Project::new("hello", Version::new("1.2.3")).with_path("/work/hello/project.toml");
        project.upsert_app("greeter", BuildInfo::new(Language::Cxx));
        project.upsert_lib("util", BuildInfo::new(Language::C));
        project.upsert_test("smoke", "./greeter");
        project
    }

    #[test]
    fn test_upsert_replaces_by_name() {
        let mut project = sample();
        assert!(project.upsert_app("greeter", BuildInfo::new(Language::C)));
        assert_eq!(project.apps().count(), 1);
        assert_eq!(project.object("greeter").and_then(Object::language), Some(Language::C));
        assert!(!project.upsert_lib("extra", BuildInfo::default()));
        assert_eq!(project.libs().count(), 2);
    }

    #[test]
    fn test_remove_and_exists() {
        let mut project = sample();
        assert!(project.object_exists("util", Some(ObjectType::Lib)));
        assert!(!project.object_exists("util", Some(ObjectType::App)));
        assert!(project.object_exists("smoke", None));

        assert!(!project.remove("util", Some(ObjectType::App)));
        assert!(project.remove("util", None));
        assert!(!project.object_exists("util", None));
    }

    #[test]
    fn test_paths() {
        let project = sample();
        assert_eq!(project.root(), Path::new("/work/hello"));
        assert_eq!(project.dependencies_dir(), Path::new("/work/hello/dependencies"));
    }

    #[test]
    fn test_validate_siblings() {
        let mut project = sample();
        if let Some(app) = project.object_mut("greeter") {
            app.upsert_dependency(Dependency::sibling("util"));
        }
        assert!(project.validate().is_ok());

        if let Some(app) = project.object_mut("greeter") {
            app.upsert_dependency(Dependency::sibling("missing"));
        }
        assert!(matches!(
            project.validate(),
            Err(ValidationError::UnknownSibling { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_names_and_locations() {
        let mut project = sample();
        project.upsert_lib("9lives", BuildInfo::default());
        assert!(matches!(
            project.validate(),
            Err(ValidationError::InvalidObjectName(_))
        ));

        let mut project = sample();
        if let Some(lib) = project.object_mut("util") {
            lib.upsert_dependency(Dependency::new("../local/thing").with_name("thing"));
        }
        assert!(matches!(
            project.validate(),
            Err(ValidationError::InvalidLocation { .. })
        ));
    }
}
