//! `budget-scripts` binary: parse arguments, set up logging, dispatch.
use std::process::ExitCode;

use clap::Parser;

use budget_scripts::error::CommandError;
use budget_scripts::{cli, commands, logging};

fn main() -> ExitCode {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();

    if matches!(args.command, cli::Command::Version) {
        commands::version::run();
        return ExitCode::SUCCESS;
    }

    let command = args.command.log_name();
    logging::init_subscriber(args.verbose, command, args.command.reserves_stdout());
    let log = logging::Logger::new(command);

    let result = match &args.command {
        cli::Command::Deploy(opts) => commands::deploy::run(&args.global, opts, &log),
        cli::Command::NewMigration(opts) => commands::migration::run_new(&args.global, opts, &log),
        cli::Command::RemoveMigration(opts) => {
            commands::migration::run_remove(&args.global, opts, &log)
        }
        cli::Command::GetConfig(opts) => commands::get_config::run(&args.global, opts, &log),
        cli::Command::Version => Ok(()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // A failed step has already been logged by `run_step`.
            if log.failure_count() == 0 {
                log.error(&format!("{e:#}"));
            }
            ExitCode::from(exit_code(&e))
        }
    }
}

/// A failed external tool's exit code, else 1.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<CommandError>())
        .map_or(1, CommandError::exit_code)
}
