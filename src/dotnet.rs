//! Thin wrapper over the `dotnet` CLI.
//!
//! Solution-level commands run in the repository root; `dotnet ef` commands
//! run in the schema project directory supplied by the caller. Every call is
//! attached to the terminal so build diagnostics reach the operator.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::error::CommandError;
use crate::exec::Executor;

const DOTNET: &str = "dotnet";

/// `dotnet` invocations needed by the deploy and migration commands.
pub struct Toolchain {
    root: PathBuf,
    executor: Arc<dyn Executor>,
}

impl std::fmt::Debug for Toolchain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Toolchain")
            .field("root", &self.root)
            .field("executor", &"<dyn Executor>")
            .finish()
    }
}

impl Toolchain {
    /// Create a toolchain operating on the solution in `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, executor: Arc<dyn Executor>) -> Self {
        Self {
            root: root.into(),
            executor,
        }
    }

    /// Repository root the solution commands run in.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Fail early when `dotnet` is not on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::NotFound`] if the program cannot be located.
    pub fn ensure_available(&self) -> Result<()> {
        if self.executor.which(DOTNET) {
            Ok(())
        } else {
            Err(CommandError::NotFound(DOTNET.to_string()).into())
        }
    }

    fn solution(&self, args: &[&str]) -> Result<()> {
        self.executor.run_attached_in(&self.root, DOTNET, args)
    }

    /// Remove build artifacts.
    ///
    /// # Errors
    ///
    /// Returns an error if `dotnet clean` fails.
    pub fn clean(&self) -> Result<()> {
        self.solution(&["clean", "--nologo", "-v", "q"])
            .context("cleaning solution")
    }

    /// Build the solution in the default (Debug) configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `dotnet build` fails.
    pub fn build(&self) -> Result<()> {
        self.solution(&["build", "--nologo", "-v", "q"])
            .context("building solution")
    }

    /// Publish the solution in Release configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `dotnet publish` fails.
    pub fn publish(&self) -> Result<()> {
        self.solution(&["publish", "-c", "Release", "--nologo", "-v", "q"])
            .context("publishing solution")
    }

    /// `dotnet ef migrations add <name>` in `schema_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the migration tool fails.
    pub fn ef_add(&self, schema_dir: &Path, name: &str, extensions_path: &Path) -> Result<()> {
        let extensions = extensions_path.to_string_lossy();
        self.executor
            .run_attached_in(
                schema_dir,
                DOTNET,
                &[
                    "ef",
                    "migrations",
                    "add",
                    name,
                    "--msbuildprojectextensionspath",
                    &extensions,
                ],
            )
            .with_context(|| format!("adding migration {name}"))?;
        Ok(())
    }

    /// `dotnet ef migrations remove` in `schema_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the migration tool fails.
    pub fn ef_remove(&self, schema_dir: &Path, extensions_path: &Path) -> Result<()> {
        let extensions = extensions_path.to_string_lossy();
        self.executor
            .run_attached_in(
                schema_dir,
                DOTNET,
                &[
                    "ef",
                    "migrations",
                    "remove",
                    "--msbuildprojectextensionspath",
                    &extensions,
                ],
            )
            .context("removing latest migration")?;
        Ok(())
    }
}
