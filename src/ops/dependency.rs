//! Implementation of `trellis add|update|remove dep`.

use anyhow::{bail, Result};

use crate::core::object;
use crate::core::{Dependency, Workspace};

/// Options for adding a dependency to an object.
#[derive(Debug, Clone, Default)]
pub struct AddDependencyOptions {
    /// Object the dependency is attached to
    pub object: String,

    /// Dependency name; defaults to the repository part of `location`
    pub name: String,

    /// `org/repo`, a GitHub URL, an archive URL, or empty for a sibling lib
    pub location: String,
    pub tag: String,
    pub release: String,
    pub hash: String,
}

impl AddDependencyOptions {
    fn to_dependency(&self) -> Result<Dependency> {
        if self.location.is_empty() {
            if self.name.is_empty() {
                bail!("a dependency needs a location, or a name for a sibling library");
            }
            if !self.tag.is_empty() || !self.release.is_empty() || !self.hash.is_empty() {
                bail!(
                    "sibling dependency `{}` cannot be pinned; remove `tag`, `release` and `hash`",
                    self.name
                );
            }
            return Ok(Dependency::sibling(&self.name));
        }

        let mut dep = Dependency::default();
        dep.set(&self.name, &self.location, &self.tag, &self.release, &self.hash);
        Ok(dep)
    }
}

/// Attach a new dependency to an object.
pub fn add_dependency(ws: &Workspace, opts: &AddDependencyOptions) -> Result<Dependency> {
    let mut project = ws.load_project()?;
    if project.object(&opts.object).is_none() {
        bail!(
            "object `{}` does not exist in project `{}`",
            opts.object,
            project.name()
        );
    }

    let dep = opts.to_dependency()?;
    object::validate_name(dep.name())?;
    project.validate_dependency(&opts.object, &dep)?;

    let Some(owner) = project.object_mut(&opts.object) else {
        bail!("object `{}` does not exist", opts.object);
    };
    if owner.dependency_exists(dep.name()) {
        bail!(
            "`{}` already depends on `{}`; use `trellis update dep` to change it",
            opts.object,
            dep.name()
        );
    }
    owner.upsert_dependency(dep.clone());
    ws.save_project(&project)?;

    tracing::info!("Added dependency {} to `{}`", dep, opts.object);
    Ok(dep)
}

/// Detach dependency `name` from `object`, or from every object when
/// `object` is `None`.
pub fn remove_dependency(ws: &Workspace, name: &str, object: Option<&str>) -> Result<()> {
    let mut project = ws.load_project()?;

    let owners: Vec<String> = match object {
        Some(object) => {
            let Some(owner) = project.object(object) else {
                bail!("object `{}` does not exist in project `{}`", object, project.name());
            };
            if !owner.dependency_exists(name) {
                bail!("`{}` is not a dependency of `{}`", name, object);
            }
            vec![object.to_string()]
        }
        None => owners_of(&project, name),
    };
    if owners.is_empty() {
        bail!("no object in project `{}` depends on `{}`", project.name(), name);
    }

    for owner in &owners {
        if let Some(obj) = project.object_mut(owner) {
            obj.remove_dependency(name);
            tracing::info!("Removed dependency `{}` from `{}`", name, owner);
        }
    }

    ws.save_project(&project)
}

/// Options for changing an existing dependency. `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct UpdateDependencyOptions {
    pub name: String,

    /// Restrict the update to one object; otherwise every object with the
    /// dependency is updated
    pub object: Option<String>,

    pub location: Option<String>,
    pub tag: Option<String>,
    pub release: Option<String>,
    pub hash: Option<String>,
}

/// Change location or pins of an existing dependency.
///
/// Setting a `tag` clears the `release` and vice versa, since the new pin
/// replaces the old one.
pub fn update_dependency(ws: &Workspace, opts: &UpdateDependencyOptions) -> Result<()> {
    if opts.tag.is_some() && opts.release.is_some() {
        bail!("`tag` and `release` cannot be updated together; pick one");
    }

    let mut project = ws.load_project()?;
    let owners: Vec<String> = match &opts.object {
        Some(object) => {
            let Some(owner) = project.object(object) else {
                bail!("object `{}` does not exist in project `{}`", object, project.name());
            };
            if !owner.dependency_exists(&opts.name) {
                bail!("`{}` is not a dependency of `{}`", opts.name, object);
            }
            vec![object.clone()]
        }
        None => owners_of(&project, &opts.name),
    };
    if owners.is_empty() {
        bail!("no object in project `{}` depends on `{}`", project.name(), opts.name);
    }

    for owner in &owners {
        let Some(mut dep) = project
            .object(owner)
            .and_then(|o| o.dependency(&opts.name))
            .cloned()
        else {
            continue;
        };

        if let Some(location) = &opts.location {
            dep.set_location(location);
        }
        if let Some(tag) = &opts.tag {
            dep.set_tag(tag.as_str());
            dep.set_release("");
        }
        if let Some(release) = &opts.release {
            dep.set_release(release.as_str());
            dep.set_tag("");
        }
        if let Some(hash) = &opts.hash {
            dep.set_hash(hash.as_str());
        }

        project.validate_dependency(owner, &dep)?;
        if let Some(obj) = project.object_mut(owner) {
            tracing::info!("Updating dependency {} of `{}`", dep, owner);
            obj.upsert_dependency(dep);
        }
    }

    ws.save_project(&project)
}

fn owners_of(project: &crate::core::Project, dependency: &str) -> Vec<String> {
    project
        .objects()
        .filter(|o| o.dependency_exists(dependency))
        .map(|o| o.name().to_string())
        .collect()
}
