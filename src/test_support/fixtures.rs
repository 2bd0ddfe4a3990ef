//! Manifest fixtures for common test scenarios.

use std::path::{Path, PathBuf};

use crate::core::workspace::MANIFEST_NAME;

/// A project exercising every manifest key except `hash` and `patch`.
pub const FULL_MANIFEST: &str = r#"project = "hello"
version = "1.2.3"

[[apps]]
name = "greeter"
lang = "CXX"
compile_options = "-O2;-Wall"
link_options = "-lm"

[[apps.depends]]
name = "dune"
from = "larryk85/dune"
release = ">= 2.0, < 3.0"

[[apps.depends]]
name = "util"

[[libraries]]
name = "util"
lang = "C"

[[tests]]
name = "smoke"
command = "./greeter --check"
"#;

/// A project with one library named after the project.
pub fn library_manifest(name: &str, version: &str) -> String {
    format!(
        r#"project = "{name}"
version = "{version}"

[[libraries]]
name = "{name}"
lang = "C"
"#
    )
}

/// A project whose single library depends on each of `deps` (`org/repo`).
pub fn library_manifest_with_deps(name: &str, version: &str, deps: &[&str]) -> String {
    let mut manifest = library_manifest(name, version);
    for dep in deps {
        manifest.push_str(&format!("\n[[libraries.depends]]\nfrom = \"{dep}\"\n"));
    }
    manifest
}

/// A root project with one app and one lib that both depend on each of
/// `deps` (`org/repo`).
pub fn diamond_root_manifest(deps: &[&str]) -> String {
    let mut manifest = String::from("project = \"root\"\nversion = \"1.0.0\"\n");

    manifest.push_str("\n[[apps]]\nname = \"app\"\nlang = \"C\"\n");
    for dep in deps {
        manifest.push_str(&format!("\n[[apps.depends]]\nfrom = \"{dep}\"\n"));
    }

    manifest.push_str("\n[[libraries]]\nname = \"core\"\nlang = \"C\"\n");
    for dep in deps {
        manifest.push_str(&format!("\n[[libraries.depends]]\nfrom = \"{dep}\"\n"));
    }
    manifest
}

/// Write `manifest` as `<dir>/project.toml` and return its path.
pub fn write_manifest(dir: &Path, manifest: &str) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(MANIFEST_NAME);
    std::fs::write(&path, manifest).unwrap();
    path
}
