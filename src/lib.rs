//! Budget app utility scripts.
//!
//! Deploys the budget app's REST API as an OS service, manages its EF Core
//! schema migrations, and reads the shared `Configuration/config.json`, where
//! every setting has a `Local` and a `Published` value.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: setting lookup from `config.json`
//! - **[`dotnet`]** and **[`service`]**: the .NET CLI and the
//!   platform service manager
//! - **[`commands`]**: top-level subcommand orchestration (`Deploy`,
//!   `New-Migration`, `Remove-Migration`, `Get-Config`)
//! - **[`cli`]**: argument parsing
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod dotnet;
pub mod error;
pub mod exec;
pub mod logging;
pub mod platform;
pub mod service;
