//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Trellis - manage C and C++ projects, their dependencies and CMake build files
#[derive(Parser)]
#[command(name = "trellis")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Directory to search for project.toml from (defaults to the current directory)
    #[arg(short = 'C', long, global = true, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new project with its directory tree and project.toml
    Init(InitArgs),

    /// Fetch dependencies and generate CMake build files
    Populate(PopulateArgs),

    /// Check project.toml and the reachability of its dependencies
    Validate(ValidateArgs),

    /// Add an app, library, test or dependency
    Add(AddArgs),

    /// Change an app, library, test or dependency
    Update(UpdateArgs),

    /// Remove an app, library, test or dependency
    Remove(RemoveArgs),

    /// Display the project's objects and dependency tree
    Tree(TreeArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Project name
    pub name: String,

    /// Directory to create the project in (defaults to ./<name>)
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Version to store in project.toml
    #[arg(long, default_value = "0.0.0")]
    pub version: String,
}

#[derive(Args)]
pub struct PopulateArgs {
    /// Overwrite CMakeLists.txt files that were not generated by trellis
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Skip checking that remote dependencies exist
    #[arg(long)]
    pub offline: bool,

    /// Print the normalized manifest after validating
    #[arg(long)]
    pub print: bool,
}

#[derive(Args)]
pub struct AddArgs {
    #[command(subcommand)]
    pub command: AddCommand,
}

#[derive(Subcommand)]
pub enum AddCommand {
    /// Add an app
    App(ObjectArgs),

    /// Add a library
    Lib(ObjectArgs),

    /// Add a test
    Test(TestArgs),

    /// Add a dependency to an app, library or test
    Dep(AddDepArgs),
}

#[derive(Args)]
pub struct ObjectArgs {
    /// Object name
    pub name: String,

    /// Language: C or C++
    #[arg(short, long, default_value = "C++")]
    pub lang: String,

    /// Compile options, separated by `;`
    #[arg(long, allow_hyphen_values = true, default_value = "")]
    pub compile_options: String,

    /// Link options, separated by `;`
    #[arg(long, allow_hyphen_values = true, default_value = "")]
    pub link_options: String,
}

#[derive(Args)]
pub struct TestArgs {
    /// Test name
    pub name: String,

    /// Command that runs the test
    #[arg(long, allow_hyphen_values = true, default_value = "")]
    pub command: String,
}

#[derive(Args)]
pub struct AddDepArgs {
    /// Object to attach the dependency to
    pub object: String,

    /// `org/repo`, a GitHub URL or an archive URL; omit for a sibling library
    pub location: Option<String>,

    /// Dependency name (defaults to the repository name)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Git tag, branch or commit
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Release version constraint, e.g. ">= 2.0, < 3.0"
    #[arg(short, long, conflicts_with = "tag")]
    pub release: Option<String>,

    /// SHA-256 digest of an archive
    #[arg(long)]
    pub hash: Option<String>,
}

#[derive(Args)]
pub struct UpdateArgs {
    #[command(subcommand)]
    pub command: UpdateCommand,
}

#[derive(Subcommand)]
pub enum UpdateCommand {
    /// Change an app's build settings
    App(UpdateObjectArgs),

    /// Change a library's build settings
    Lib(UpdateObjectArgs),

    /// Change a test's command
    Test(UpdateTestArgs),

    /// Change a dependency's location or pins
    Dep(UpdateDepArgs),
}

#[derive(Args)]
pub struct UpdateObjectArgs {
    /// Object name
    pub name: String,

    /// Language: C or C++
    #[arg(short, long)]
    pub lang: Option<String>,

    /// Compile options, separated by `;`
    #[arg(long, allow_hyphen_values = true)]
    pub compile_options: Option<String>,

    /// Link options, separated by `;`
    #[arg(long, allow_hyphen_values = true)]
    pub link_options: Option<String>,
}

#[derive(Args)]
pub struct UpdateTestArgs {
    /// Test name
    pub name: String,

    /// Command that runs the test
    #[arg(long, allow_hyphen_values = true)]
    pub command: String,
}

#[derive(Args)]
pub struct UpdateDepArgs {
    /// Dependency name
    pub name: String,

    /// Only update the dependency of this object
    #[arg(short, long)]
    pub object: Option<String>,

    /// New location
    #[arg(short, long)]
    pub location: Option<String>,

    /// Pin to a git tag, branch or commit (clears the release)
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Pin to a release constraint (clears the tag)
    #[arg(short, long, conflicts_with = "tag")]
    pub release: Option<String>,

    /// SHA-256 digest of an archive
    #[arg(long)]
    pub hash: Option<String>,
}

#[derive(Args)]
pub struct RemoveArgs {
    #[command(subcommand)]
    pub command: RemoveCommand,
}

#[derive(Subcommand)]
pub enum RemoveCommand {
    /// Remove an app
    App(RemoveObjectArgs),

    /// Remove a library
    Lib(RemoveObjectArgs),

    /// Remove a test
    Test(RemoveObjectArgs),

    /// Remove a dependency
    Dep(RemoveDepArgs),
}

#[derive(Args)]
pub struct RemoveObjectArgs {
    /// Object name
    pub name: String,
}

#[derive(Args)]
pub struct RemoveDepArgs {
    /// Dependency name
    pub name: String,

    /// Only remove the dependency from this object
    #[arg(short, long)]
    pub object: Option<String>,
}

#[derive(Args)]
pub struct TreeArgs {
    /// Maximum depth of fetched projects to expand
    #[arg(short, long)]
    pub depth: Option<usize>,

    /// Expand projects that were already shown
    #[arg(long)]
    pub duplicates: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
