//! `treb` binary entry point: argument parsing, logging setup and the
//! exit-code mapping described in §6.

mod capabilities;
mod cli;
mod commands;
mod display;
mod register;
mod selectors;

use std::process::ExitCode;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::prelude::*;

fn init_tracing() {
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::Registry::default()
            .with(tracing_subscriber::EnvFilter::from_default_env())
            .with(tracing_subscriber::fmt::layer().with_ansi(!treb_config::interactive::color_disabled()))
            .init();
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let project_root = match &cli.root {
        Some(root) => root.clone(),
        None => match std::env::current_dir() {
            Ok(dir) => dir,
            Err(err) => {
                eprintln!("error: failed to read current directory: {err}");
                return ExitCode::from(1);
            }
        },
    };

    let non_interactive = cli.non_interactive || treb_config::interactive::non_interactive();

    match commands::dispatch(&cli, &project_root, non_interactive) {
        Ok(()) => ExitCode::from(0),
        Err(report) => {
            eprintln!("error: {report:?}");
            ExitCode::from(exit_code_for(&report))
        }
    }
}

/// Maps a failure to the exit codes documented in §6: `1` for user/config
/// errors, `2` when the runner itself failed, `3` on a rejected registry
/// changeset.
fn exit_code_for(report: &eyre::Report) -> u8 {
    if let Some(err) = report.downcast_ref::<treb_core::OrchestratorError>() {
        return match err {
            treb_core::OrchestratorError::Runner(_) => 2,
            treb_core::OrchestratorError::Registry(_) => 3,
            _ => 1,
        };
    }
    if let Some(err) = report.downcast_ref::<treb_registry::RegistryError>() {
        return match err {
            treb_registry::RegistryError::Inconsistent(_) => 3,
            _ => 1,
        };
    }
    if report.downcast_ref::<treb_runner::RunnerError>().is_some() {
        return 2;
    }
    1
}
