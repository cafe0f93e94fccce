// crates/psmanifest-gen/src/main.rs
// ============================================================================
// Module: Manifest Generator CLI
// Description: CLI entrypoint for PowerShell module manifest generation.
// Purpose: Regenerate or verify a project's `.psd1` manifest.
// Dependencies: clap, psmanifest-config, psmanifest-gen
// ============================================================================

//! ## Overview
//! The manifest generator CLI loads `psmanifest.toml`, merges the generated
//! regions into the project's `.psd1`, and reports one JSON event per run.
//! The `check` command verifies the on-disk manifest is up to date.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::Subcommand;
use psmanifest_config::ProjectConfig;
use psmanifest_gen::ManifestError;
use psmanifest_gen::ManifestGenerator;
use psmanifest_gen::events::FileEventSink;
use psmanifest_gen::events::GenerationEventSink;
use psmanifest_gen::events::NoopEventSink;
use psmanifest_gen::events::StderrEventSink;
use psmanifest_gen::guid::RandomGuidSource;
use psmanifest_gen::state::FsProjectState;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// CLI arguments for manifest generation.
#[derive(Debug, Parser)]
#[command(name = "psmanifest-gen", about = "Generate PowerShell module manifests.")]
struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Supported CLI subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Regenerate the module manifest.
    Generate {
        /// Path to the project config (defaults to `PSMANIFEST_CONFIG` or psmanifest.toml).
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Append generation events to this file instead of stderr.
        #[arg(long, value_name = "FILE")]
        event_log: Option<PathBuf>,
        /// Suppress generation events.
        #[arg(long, conflicts_with = "event_log")]
        quiet: bool,
    },
    /// Verify the module manifest matches the generated output.
    Check {
        /// Path to the project config (defaults to `PSMANIFEST_CONFIG` or psmanifest.toml).
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

// ============================================================================
// SECTION: Command Dispatch
// ============================================================================

/// CLI entrypoint.
fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report_error(&err),
    }
}

/// Dispatches the CLI command.
fn run() -> Result<(), ManifestError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Generate {
            config,
            event_log,
            quiet,
        } => generate(config, event_log, quiet),
        Command::Check {
            config,
        } => check(config),
    }
}

/// Regenerates the manifest for the configured project.
fn generate(
    config: Option<PathBuf>,
    event_log: Option<PathBuf>,
    quiet: bool,
) -> Result<(), ManifestError> {
    let project = ProjectConfig::load(config.as_deref())?;
    let events: Box<dyn GenerationEventSink> = match event_log {
        Some(path) => Box::new(
            FileEventSink::new(&path)
                .map_err(|err| ManifestError::Io(format!("{}: {err}", path.display())))?,
        ),
        None if quiet => Box::new(NoopEventSink),
        None => Box::new(StderrEventSink),
    };
    let generator = ManifestGenerator::new(&FsProjectState, &RandomGuidSource, events.as_ref());
    generator.generate(&project)?;
    Ok(())
}

/// Verifies the manifest for the configured project is up to date.
fn check(config: Option<PathBuf>) -> Result<(), ManifestError> {
    let project = ProjectConfig::load(config.as_deref())?;
    ManifestGenerator::new(&FsProjectState, &RandomGuidSource, &NoopEventSink).check(&project)
}

/// Reports a CLI error to stderr.
fn report_error(err: &ManifestError) -> ExitCode {
    let mut stderr = std::io::stderr();
    let _ = writeln!(stderr, "{err}");
    ExitCode::FAILURE
}
