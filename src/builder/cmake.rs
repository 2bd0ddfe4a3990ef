//! CMake emitter.
//!
//! Layout written under `<root>/build`:
//!
//! ```text
//! build/CMakeLists.txt            project preamble, includes the three below
//! build/apps/CMakeLists.txt       one add_subdirectory per app
//! build/apps/<app>/CMakeLists.txt
//! build/libs/CMakeLists.txt       one add_subdirectory per lib
//! build/libs/<lib>/CMakeLists.txt
//! build/tests/CMakeLists.txt      one add_test per test
//! ```
//!
//! Every file starts with the generated-file marker. A file without it is
//! treated as hand-written and is never overwritten unless forced.

use std::path::Path;

use anyhow::{bail, Result};

use crate::builder::BuildEmitter;
use crate::core::manifest::{has_marker, MARKER};
use crate::core::object::{BuildInfo, Language, Object, ObjectType};
use crate::core::workspace::BUILD_DIR;
use crate::core::Project;
use crate::resolver::ResolveMemo;
use crate::util::fs::write_if_changed;

pub const CMAKE_MINIMUM: (u16, u16) = (3, 10);
pub const LISTS_FILE: &str = "CMakeLists.txt";

/// Writes CMakeLists.txt files for a project.
#[derive(Debug, Clone, Default)]
pub struct CMakeEmitter {
    force: bool,
}

impl CMakeEmitter {
    pub fn new() -> Self {
        CMakeEmitter::default()
    }

    /// Overwrite CMakeLists.txt files that lack the generated marker.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        if let Ok(existing) = std::fs::read_to_string(path) {
            if !has_marker(&existing) && !self.force {
                bail!(
                    "refusing to overwrite hand-written {}; it does not start with `{}`",
                    path.display(),
                    MARKER
                );
            }
        }
        if write_if_changed(path, contents)? {
            tracing::debug!("wrote {}", path.display());
        }
        Ok(())
    }
}

impl BuildEmitter for CMakeEmitter {
    fn emit(&self, project: &Project, memo: &ResolveMemo) -> Result<()> {
        tracing::info!("Emitting CMake for project {}", project.name());

        let build = project.root().join(BUILD_DIR);

        self.write(&build.join(LISTS_FILE), &render_root(project))?;

        let apps: Vec<&Object> = project.apps().collect();
        let libs: Vec<&Object> = project.libs().collect();
        for (dir, objects) in [("apps", apps), ("libs", libs)] {
            self.write(
                &build.join(dir).join(LISTS_FILE),
                &render_collection(project, &objects),
            )?;
            for object in objects {
                self.write(
                    &build.join(dir).join(object.name()).join(LISTS_FILE),
                    &render_object(project, object, memo),
                )?;
            }
        }

        self.write(&build.join("tests").join(LISTS_FILE), &render_tests(project))
    }
}

/// `<project>-<object>`
pub fn target_name(project: &Project, object: &str) -> String {
    format!("{}-{}", project.name(), object)
}

fn header() -> String {
    format!("{}\n# Generated by trellis, modify at your own risk\n", MARKER)
}

fn languages(project: &Project) -> &'static str {
    let cxx = project
        .buildable()
        .any(|o| o.language() == Some(Language::Cxx));
    if cxx {
        "C CXX"
    } else {
        "C"
    }
}

/// Top-level `build/CMakeLists.txt`.
pub fn render_root(project: &Project) -> String {
    let version = project.version();
    let mut s = header();
    s.push_str(&format!(
        "cmake_minimum_required(VERSION {}.{})\n",
        CMAKE_MINIMUM.0, CMAKE_MINIMUM.1
    ));
    s.push_str(&format!(
        "project(\"{}\" VERSION {}.{}.{} LANGUAGES {})\n\n",
        project.name(),
        version.major(),
        version.minor(),
        version.patch(),
        languages(project)
    ));
    s.push_str("enable_testing()\n\n");
    for dir in ["libs", "apps", "tests"] {
        s.push_str(&format!(
            "add_subdirectory(${{CMAKE_CURRENT_SOURCE_DIR}}/{dir} ${{CMAKE_CURRENT_BINARY_DIR}}/{dir})\n"
        ));
    }
    s
}

fn render_collection(project: &Project, objects: &[&Object]) -> String {
    let mut s = header();
    if objects.is_empty() {
        s.push_str(&format!("# {} has no objects here\n", project.name()));
    }
    for object in objects {
        s.push_str(&format!(
            "add_subdirectory(${{CMAKE_CURRENT_SOURCE_DIR}}/{})\n",
            object.name()
        ));
    }
    s
}

/// Per-object `CMakeLists.txt` for an app or lib.
pub fn render_object(project: &Project, object: &Object, memo: &ResolveMemo) -> String {
    let target = target_name(project, object.name());
    let is_app = object.object_type() == ObjectType::App;
    let source_dir = if is_app { "apps" } else { "libs" };
    let default_build = BuildInfo::default();
    let build = object.build_info().unwrap_or(&default_build);

    let mut s = header();
    s.push_str(&format!(
        "file(GLOB {target}-source ${{CMAKE_CURRENT_SOURCE_DIR}}/../../../{source_dir}/{name}/*{ext})\n",
        name = object.name(),
        ext = build.language.source_extension(),
    ));
    if is_app {
        s.push_str(&format!("add_executable({target} ${{{target}-source}})\n"));
        s.push_str(&format!(
            "set_target_properties({target} PROPERTIES OUTPUT_NAME {})\n",
            object.name()
        ));
    } else {
        s.push_str(&format!("add_library({target} STATIC ${{{target}-source}})\n"));
    }
    s.push('\n');

    s.push_str(&format!(
        "target_include_directories({target}\n   \
         PUBLIC ${{CMAKE_CURRENT_SOURCE_DIR}}/../../../include\n          \
         ${{CMAKE_CURRENT_SOURCE_DIR}}/../../../include/{name}\n          \
         ${{CMAKE_CURRENT_SOURCE_DIR}}/../../../{source_dir}/{name})\n\n",
        name = object.name(),
    ));

    for option in &build.compile_options {
        s.push_str(&format!("target_compile_options({target} PUBLIC {option})\n"));
    }
    for option in &build.link_options {
        s.push_str(&format!("target_link_libraries({target} PUBLIC {option})\n"));
    }

    for dep in object.dependencies() {
        // Siblings belong to the project being emitted, which is not
        // necessarily the memo's root.
        if dep.is_sibling() {
            let dep_target = target_name(project, dep.name());
            s.push_str(&format!("target_link_libraries({target} PUBLIC {dep_target})\n"));
            continue;
        }

        let Some(resolved) = memo.get(dep.location()) else {
            tracing::warn!(
                "dependency `{}` of `{}` was not populated; skipping it",
                dep.name(),
                object.name()
            );
            continue;
        };
        let dep_target = format!("{}-{}", resolved.name, dep.name());

        // Keyed by location: two locations may hold same-named projects.
        let guard = format!("TRELLIS_INCLUDED_{}", dep.location());
        let libs = resolved.root.join(BUILD_DIR).join("libs");
        s.push_str(&format!(
            "\nget_property(_included GLOBAL PROPERTY {guard})\n\
             if(NOT _included)\n   \
             set_property(GLOBAL PROPERTY {guard} TRUE)\n   \
             add_subdirectory({} ${{CMAKE_BINARY_DIR}}/dependencies/{})\n\
             endif()\n",
            libs.display(),
            dep.location()
        ));
        s.push_str(&format!("target_link_libraries({target} PUBLIC {dep_target})\n"));
    }

    s
}

/// `build/tests/CMakeLists.txt`.
pub fn render_tests(project: &Project) -> String {
    let mut s = header();
    for test in project.tests() {
        let command = test.command().unwrap_or_default().trim();
        if command.is_empty() {
            s.push_str(&format!("# test `{}` has no command\n", test.name()));
            continue;
        }
        s.push_str(&format!(
            "add_test(NAME {} COMMAND {} WORKING_DIRECTORY ${{CMAKE_BINARY_DIR}}/apps)\n",
            target_name(project, test.name()),
            command
        ));
    }
    s
}
