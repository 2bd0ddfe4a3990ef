//! Implementation of `trellis tree`.
//!
//! The tree is built from manifests on disk only: a fetched dependency is
//! expanded when its checkout under `dependencies/` holds a manifest, and
//! shown as a leaf otherwise.

use std::collections::HashSet;
use std::fmt::Write;

use anyhow::Result;

use crate::core::workspace::MANIFEST_NAME;
use crate::core::{manifest, Dependency, Project};

/// Options for rendering a project tree.
#[derive(Debug, Clone)]
pub struct TreeOptions {
    /// Maximum depth of fetched projects to expand
    pub depth: usize,

    /// Expand projects that were already printed
    pub duplicates: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        TreeOptions {
            depth: usize::MAX,
            duplicates: false,
        }
    }
}

/// Render `project`, its objects and their dependencies.
pub fn format_tree(project: &Project, opts: &TreeOptions) -> Result<String> {
    let mut out = String::new();
    let mut seen = HashSet::new();
    writeln!(out, "{} v{}", project.name(), project.version())?;
    write_objects(&mut out, project, "", 0, opts, &mut seen)?;
    Ok(out)
}

fn write_objects(
    out: &mut String,
    project: &Project,
    indent: &str,
    depth: usize,
    opts: &TreeOptions,
    seen: &mut HashSet<String>,
) -> Result<()> {
    let objects: Vec<_> = project.objects().collect();
    for (i, object) in objects.iter().enumerate() {
        let last = i + 1 == objects.len();
        let (branch, child_indent) = branch(indent, last);
        writeln!(out, "{}{}{} {}", indent, branch, object.object_type(), object.name())?;

        let deps: Vec<_> = object.dependencies().collect();
        for (j, dep) in deps.iter().enumerate() {
            let last = j + 1 == deps.len();
            write_dependency(out, project, dep, &child_indent, last, depth, opts, seen)?;
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn write_dependency(
    out: &mut String,
    project: &Project,
    dep: &Dependency,
    indent: &str,
    last: bool,
    depth: usize,
    opts: &TreeOptions,
    seen: &mut HashSet<String>,
) -> Result<()> {
    let (branch, child_indent) = branch(indent, last);

    if dep.is_sibling() {
        writeln!(out, "{}{}{} (sibling)", indent, branch, dep.name())?;
        return Ok(());
    }

    let manifest_path = project.dependencies_dir().join(dep.name()).join(MANIFEST_NAME);
    let fetched = if manifest_path.is_file() {
        Some(manifest::load(&manifest_path)?)
    } else {
        None
    };

    let duplicate = !seen.insert(dep.location().to_string());
    let suffix = match (&fetched, duplicate && !opts.duplicates) {
        (None, _) => " (not populated)".to_string(),
        (Some(nested), true) => format!(" {} v{} (*)", nested.name(), nested.version()),
        (Some(nested), false) => format!(" {} v{}", nested.name(), nested.version()),
    };
    writeln!(out, "{}{}{}{}", indent, branch, dep, suffix)?;

    if let Some(nested) = fetched {
        if depth < opts.depth && (!duplicate || opts.duplicates) {
            write_objects(out, &nested, &child_indent, depth + 1, opts, seen)?;
        }
    }
    Ok(())
}

fn branch(indent: &str, last: bool) -> (&'static str, String) {
    if last {
        ("└── ", format!("{}    ", indent))
    } else {
        ("├── ", format!("{}│   ", indent))
    }
}
