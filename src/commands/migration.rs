//! `New-Migration` / `Remove-Migration`: EF Core migrations in `<root>/Schema`.
use std::path::{Path, PathBuf};

use anyhow::Result;

use super::{CommandSetup, StepResult, run_step};
use crate::cli::{GlobalOpts, NewMigrationOpts, RemoveMigrationOpts};
use crate::config::settings::APP_DIRECTORY;
use crate::config::{ConfigResolver, Variant};
use crate::dotnet::Toolchain;
use crate::error::MigrationError;
use crate::logging::{Log, Logger};

/// Schema project directory relative to the repository root.
pub const SCHEMA_DIR: &str = "Schema";
/// Migrations directory relative to the schema project.
pub const MIGRATIONS_DIR: &str = "Migrations";

/// Run the `New-Migration` command.
///
/// # Errors
///
/// Returns an error if the root cannot be resolved or the migration cannot be
/// created.
pub fn run_new(global: &GlobalOpts, opts: &NewMigrationOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let toolchain = setup.toolchain();
    let result = Migrations::new(&setup.root, &setup.config, &toolchain, log, global.dry_run)
        .add(&opts.name);
    log.print_summary();
    result
}

/// Run the `Remove-Migration` command.
///
/// # Errors
///
/// Returns an error if the root cannot be resolved or the removal fails.
pub fn run_remove(global: &GlobalOpts, opts: &RemoveMigrationOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let toolchain = setup.toolchain();
    let result = Migrations::new(&setup.root, &setup.config, &toolchain, log, global.dry_run)
        .remove(opts.remove_all);
    log.print_summary();
    result
}

/// Reject names the migration tool would misparse.
///
/// # Errors
///
/// Returns [`MigrationError::InvalidName`] for empty names or names with
/// whitespace.
pub fn validate_name(name: &str) -> Result<(), MigrationError> {
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(MigrationError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Adds and removes schema migrations for one repository.
pub struct Migrations<'a> {
    root: PathBuf,
    config: &'a ConfigResolver,
    toolchain: &'a Toolchain,
    log: &'a dyn Log,
    dry_run: bool,
}

impl std::fmt::Debug for Migrations<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migrations")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

impl<'a> Migrations<'a> {
    /// Create a migration manager for the repository at `root`.
    #[must_use]
    pub fn new(
        root: impl Into<PathBuf>,
        config: &'a ConfigResolver,
        toolchain: &'a Toolchain,
        log: &'a dyn Log,
        dry_run: bool,
    ) -> Self {
        Self {
            root: root.into(),
            config,
            toolchain,
            log,
            dry_run,
        }
    }

    /// `<root>/Schema`.
    #[must_use]
    pub fn schema_dir(&self) -> PathBuf {
        self.root.join(SCHEMA_DIR)
    }

    /// `<root>/Schema/Migrations`.
    #[must_use]
    pub fn migrations_dir(&self) -> PathBuf {
        self.schema_dir().join(MIGRATIONS_DIR)
    }

    /// MSBuild project extensions of the local build, which the migration
    /// tool needs to load the schema project.
    fn extensions_path(&self) -> Result<PathBuf> {
        let app_dir = self.config.get_string(APP_DIRECTORY, Variant::Local)?;
        Ok(Path::new(&app_dir).join("obj").join(SCHEMA_DIR))
    }

    /// Create a migration called `name` from the local build.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid, `AppDirectory` cannot be
    /// resolved, or the migration tool fails.
    pub fn add(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        let extensions = self.extensions_path()?;
        self.log.stage("Adding migration");
        run_step(self.log, &format!("Add migration {name}"), || {
            if self.dry_run {
                self.log.dry_run(&format!(
                    "would run: dotnet ef migrations add {name} --msbuildprojectextensionspath {}",
                    extensions.display()
                ));
                return Ok(StepResult::DryRun);
            }
            self.toolchain.ensure_available()?;
            self.toolchain
                .ef_add(&self.schema_dir(), name, &extensions)?;
            Ok(StepResult::Ok)
        })
    }

    /// Remove the most recent migration, or every migration when
    /// `remove_all` is set.
    ///
    /// Removing all migrations deletes the migrations directory without
    /// invoking the tool; a missing directory is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be removed or the migration
    /// tool fails.
    pub fn remove(&self, remove_all: bool) -> Result<()> {
        if remove_all {
            self.remove_all()
        } else {
            self.remove_latest()
        }
    }

    fn remove_all(&self) -> Result<()> {
        let dir = self.migrations_dir();
        self.log.stage("Removing all migrations");
        run_step(self.log, "Remove migrations directory", || {
            if !dir.exists() {
                return Ok(StepResult::Skipped(format!(
                    "{} does not exist",
                    dir.display()
                )));
            }
            if self.dry_run {
                self.log
                    .dry_run(&format!("would remove {}", dir.display()));
                return Ok(StepResult::DryRun);
            }
            std::fs::remove_dir_all(&dir).map_err(|source| MigrationError::Io {
                path: dir.clone(),
                source,
            })?;
            self.log.info(&format!("removed {}", dir.display()));
            Ok(StepResult::Ok)
        })
    }

    fn remove_latest(&self) -> Result<()> {
        let extensions = self.extensions_path()?;
        self.log.stage("Removing latest migration");
        run_step(self.log, "Remove latest migration", || {
            if self.dry_run {
                self.log.dry_run(&format!(
                    "would run: dotnet ef migrations remove --msbuildprojectextensionspath {}",
                    extensions.display()
                ));
                return Ok(StepResult::DryRun);
            }
            self.toolchain.ensure_available()?;
            self.toolchain.ef_remove(&self.schema_dir(), &extensions)?;
            Ok(StepResult::Ok)
        })
    }
}
