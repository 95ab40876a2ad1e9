//! Domain-specific error types for the budget scripts.
//!
//! Internal modules return typed errors (e.g., [`ConfigError`],
//! [`PlatformError`]) while command handlers at the CLI boundary convert them
//! to [`anyhow::Error`] via the standard `?` operator. The binary recovers a
//! [`CommandError`] from the error chain to choose its exit code.
//!
//! # Error kinds
//!
//! ```text
//! ConfigError     config.json loading and setting lookup
//! PlatformError   unsupported OS, missing privileges
//! MigrationError  schema migration housekeeping
//! CommandError    external tool failures
//! ```

use std::path::PathBuf;

use thiserror::Error;

use crate::config::Variant;

/// Errors that arise from reading `config.json` and resolving settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("Unable to find config file {}", .path.display())]
    FileNotFound {
        /// Expected location of the file.
        path: PathBuf,
    },

    /// The configuration file exists but could not be read.
    #[error("IO error reading config file {}: {source}", .path.display())]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration file is not a JSON object.
    #[error("Invalid JSON in config file {}: {message}", .path.display())]
    Parse {
        /// Path to the malformed file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// The requested setting is not a top-level key of the document.
    #[error("The config file does not include the requested setting \"{0}\"")]
    UnknownSetting(String),

    /// The setting lacks one of its two variants.
    #[error("The setting \"{name}\" does not have a {variant} value defined")]
    MissingVariant {
        /// Setting name.
        name: String,
        /// The variant that is absent.
        variant: Variant,
    },

    /// The selected value is null, an array or an object.
    #[error("The {variant} value of setting \"{name}\" is not a string, number or boolean")]
    NotScalar {
        /// Setting name.
        name: String,
        /// The variant that was selected.
        variant: Variant,
    },

    /// The selected value cannot be interpreted as the requested type.
    #[error("The {variant} value of setting \"{name}\" is invalid: {reason}")]
    InvalidValue {
        /// Setting name.
        name: String,
        /// The variant that was selected.
        variant: Variant,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Errors that arise from platform-specific operations.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The requested operation has no implementation on this platform.
    #[error(
        "Operation '{operation}' must be implemented using platform specific code and is not supported on {platform}"
    )]
    Unsupported {
        /// Name of the operation (e.g. `"create service"`).
        operation: &'static str,
        /// Name of the platform.
        platform: String,
    },

    /// The process lacks administrator / super-user privileges.
    #[error(
        "This command requires administrator / super-user permissions. Retry it from a shell with sufficient permissions."
    )]
    AdministratorPermissionsRequired,
}

/// Errors that arise from schema migration housekeeping.
#[derive(Error, Debug)]
pub enum MigrationError {
    /// The migration name cannot be passed to the migration tool.
    #[error("Invalid migration name '{0}': must be non-empty and contain no whitespace")]
    InvalidName(String),

    /// The migrations directory could not be removed.
    #[error("Failed to remove migrations directory {}: {source}", .path.display())]
    Io {
        /// Directory that could not be removed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors raised by external tool invocations.
#[derive(Error, Debug)]
pub enum CommandError {
    /// The tool could not be started at all.
    #[error("failed to execute: {label}")]
    Spawn {
        /// Program (and context) that was being run.
        label: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The tool ran and exited non-zero.
    #[error("{label} failed (exit {}): {detail}", .code.unwrap_or(-1))]
    Failed {
        /// Program (and context) that was being run.
        label: String,
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
        /// Trimmed standard error, or standard output when stderr is empty.
        /// Empty when the tool wrote straight to the terminal.
        detail: String,
    },

    /// The tool is not on `PATH`.
    #[error("Required program '{0}' not found on PATH")]
    NotFound(String),
}

impl CommandError {
    /// Process exit code to report for this failure.
    ///
    /// Propagates the tool's own exit code when it is a usable non-zero value.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Failed {
                code: Some(code), ..
            } => u8::try_from(*code).ok().filter(|c| *c != 0).unwrap_or(1),
            _ => 1,
        }
    }
}
