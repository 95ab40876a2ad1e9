//! Command-line definition parsed with `clap`.
use clap::{Args, Parser, Subcommand};

use crate::config::Variant;

/// Top-level CLI entry point for the budget app utility scripts.
#[derive(Parser, Debug)]
#[command(
    name = "budget-scripts",
    about = "Budget App utility scripts: deploy, schema migrations and configuration",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options accepted by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Override the repository root directory
    #[arg(long, global = true)]
    pub root: Option<std::path::PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build or publish the app and (re)start its services
    #[command(name = "Deploy", alias = "deploy")]
    Deploy(DeployOpts),
    /// Create a new schema migration
    #[command(name = "New-Migration", alias = "new-migration")]
    NewMigration(NewMigrationOpts),
    /// Remove the latest schema migration, or all of them
    #[command(name = "Remove-Migration", alias = "remove-migration")]
    RemoveMigration(RemoveMigrationOpts),
    /// Print a configuration setting
    #[command(name = "Get-Config", alias = "get-config")]
    GetConfig(GetConfigOpts),
    /// Print version information
    #[command(name = "Version", alias = "version")]
    Version,
}

impl Command {
    /// Name used for the per-command log file.
    #[must_use]
    pub const fn log_name(&self) -> &'static str {
        match self {
            Self::Deploy(_) => "deploy",
            Self::NewMigration(_) => "new-migration",
            Self::RemoveMigration(_) => "remove-migration",
            Self::GetConfig(_) => "get-config",
            Self::Version => "version",
        }
    }

    /// Whether stdout carries the command's result and must stay free of
    /// log lines.
    #[must_use]
    pub const fn reserves_stdout(&self) -> bool {
        matches!(self, Self::GetConfig(_) | Self::Version)
    }
}

/// Options for the `Deploy` subcommand.
#[derive(Args, Debug, Clone)]
pub struct DeployOpts {
    /// Deploy the published (Release) version alongside the local one
    #[arg(long)]
    pub published: bool,
}

impl DeployOpts {
    /// Variant selected by `--published`.
    #[must_use]
    pub const fn variant(&self) -> Variant {
        Variant::from_published(self.published)
    }
}

/// Options for the `New-Migration` subcommand.
#[derive(Args, Debug, Clone)]
pub struct NewMigrationOpts {
    /// Name of the migration to create
    #[arg(long)]
    pub name: String,
}

/// Options for the `Remove-Migration` subcommand.
#[derive(Args, Debug, Clone)]
pub struct RemoveMigrationOpts {
    /// Delete every migration along with the Migrations directory
    #[arg(long)]
    pub remove_all: bool,
}

/// Options for the `Get-Config` subcommand.
#[derive(Args, Debug, Clone)]
pub struct GetConfigOpts {
    /// Name of the setting to print
    #[arg(long)]
    pub name: String,

    /// Print the published value instead of the local one
    #[arg(long)]
    pub published: bool,
}

impl GetConfigOpts {
    /// Variant selected by `--published`.
    #[must_use]
    pub const fn variant(&self) -> Variant {
        Variant::from_published(self.published)
    }
}
