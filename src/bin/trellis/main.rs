//! Trellis CLI - manage C and C++ projects built with CMake

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use miette::{GraphicalReportHandler, GraphicalTheme};
use tracing_subscriber::EnvFilter;

use trellis::core::workspace::WorkspaceError;
use trellis::core::{ManifestError, ValidationError, Workspace};
use trellis::resolver::PopulateError;
use trellis::util::diagnostic::{self, suggestions, Diagnostic};

mod cli;
mod commands;

use cli::{Cli, Commands};

/// Options shared by every command.
pub struct GlobalOptions {
    pub project_dir: Option<PathBuf>,
}

impl GlobalOptions {
    /// Directory commands start from.
    pub fn start_dir(&self) -> Result<PathBuf> {
        match &self.project_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }

    /// The workspace containing the start directory.
    pub fn workspace(&self) -> Result<Workspace> {
        Workspace::discover(&self.start_dir()?)
    }
}

fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("trellis=debug")
        } else {
            EnvFilter::new("trellis=info")
        }
    });

    let color = !cli.no_color && std::io::stderr().is_terminal();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(color)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let global = GlobalOptions {
        project_dir: cli.project_dir,
    };

    if let Err(e) = run(cli.command, &global) {
        report(&e, color);
        std::process::exit(1);
    }
}

fn run(command: Commands, global: &GlobalOptions) -> Result<()> {
    match command {
        Commands::Init(args) => commands::init::execute(args, global),
        Commands::Populate(args) => commands::populate::execute(args, global),
        Commands::Validate(args) => commands::validate::execute(args, global),
        Commands::Add(args) => commands::add::execute(args, global),
        Commands::Update(args) => commands::update::execute(args, global),
        Commands::Remove(args) => commands::remove::execute(args, global),
        Commands::Tree(args) => commands::tree::execute(args, global),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Print `err` with the richest rendering available for its root type.
fn report(err: &anyhow::Error, color: bool) {
    if let Some(manifest_err) = err.downcast_ref::<ManifestError>() {
        let handler = if color {
            GraphicalReportHandler::new()
        } else {
            GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor())
        };
        let mut out = String::new();
        if handler.render_report(&mut out, manifest_err).is_ok() {
            eprint!("{}", out);
            return;
        }
    }

    let diag = if let Some(e) = err.downcast_ref::<PopulateError>() {
        e.to_diagnostic()
    } else if let Some(e) = err.downcast_ref::<ValidationError>() {
        e.to_diagnostic()
    } else if err.downcast_ref::<WorkspaceError>().is_some() {
        Diagnostic::error(err.to_string()).with_suggestion(suggestions::NO_MANIFEST)
    } else {
        let mut diag = Diagnostic::error(err.to_string());
        for cause in err.chain().skip(1) {
            diag = diag.with_context(cause.to_string());
        }
        diag
    };
    diagnostic::emit(&diag, color);
}
