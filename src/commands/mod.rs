//! Top-level subcommand orchestration.
pub mod deploy;
pub mod get_config;
pub mod migration;
pub mod version;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::{CONFIG_FILE, ConfigResolver};
use crate::dotnet::Toolchain;
use crate::exec::{Executor, SystemExecutor};
use crate::logging::{Log, StepStatus};
use crate::platform::Platform;

/// Environment variable overriding the repository root.
pub const ROOT_ENV: &str = "BUDGET_APP_ROOT";

/// Outcome of a single successful step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepResult {
    /// The step made its change.
    Ok,
    /// Nothing to do, with the reason.
    Skipped(String),
    /// Dry-run mode; the change was only logged.
    DryRun,
}

/// Run one step, record its outcome for the summary, and propagate failure.
///
/// # Errors
///
/// Returns the step's own error after recording it as failed.
pub fn run_step(log: &dyn Log, name: &str, step: impl FnOnce() -> Result<StepResult>) -> Result<()> {
    match step() {
        Ok(StepResult::Ok) => log.record_step(name, StepStatus::Ok, None),
        Ok(StepResult::Skipped(reason)) => {
            log.debug(&format!("{name}: skipped ({reason})"));
            log.record_step(name, StepStatus::Skipped, Some(&reason));
        }
        Ok(StepResult::DryRun) => log.record_step(name, StepStatus::DryRun, None),
        Err(e) => {
            log.error(&format!("{name}: {e:#}"));
            log.record_step(name, StepStatus::Failed, Some(&format!("{e:#}")));
            return Err(e);
        }
    }
    Ok(())
}

/// Shared state produced by the common command setup sequence.
#[derive(Debug)]
pub struct CommandSetup {
    /// Detected operating system.
    pub platform: Platform,
    /// Repository root.
    pub root: PathBuf,
    /// Resolver over `<root>/Configuration/config.json`.
    pub config: ConfigResolver,
    /// Executor used for every external program.
    pub executor: Arc<dyn Executor>,
}

impl CommandSetup {
    /// Detect the platform and resolve the repository root.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be determined.
    pub fn init(global: &GlobalOpts, log: &dyn Log) -> Result<Self> {
        let platform = Platform::detect();
        let root = resolve_root(global)?;
        log.debug(&format!("platform: {}", platform.os));
        log.debug(&format!("root: {}", root.display()));
        Ok(Self {
            platform,
            config: ConfigResolver::for_root(&root),
            root,
            executor: Arc::new(SystemExecutor),
        })
    }

    /// `dotnet` wrapper rooted at the repository.
    #[must_use]
    pub fn toolchain(&self) -> Toolchain {
        Toolchain::new(self.root.clone(), Arc::clone(&self.executor))
    }
}

/// Resolve the repository root from CLI arguments or auto-detection.
///
/// Order: `--root`, `BUDGET_APP_ROOT`, an ancestor of the executable that
/// holds `Configuration/config.json`, then the current directory if it holds
/// `Configuration/`.
///
/// # Errors
///
/// Returns an error if no candidate applies or the chosen path doesn't exist.
pub fn resolve_root(global: &GlobalOpts) -> Result<PathBuf> {
    if let Some(root) = &global.root {
        return canonical(root);
    }

    if let Some(root) = std::env::var_os(ROOT_ENV).filter(|v| !v.is_empty()) {
        return canonical(Path::new(&root));
    }

    // Typically Scripts/target/release/ or a bin/ directory inside the repo.
    if let Ok(exe) = std::env::current_exe()
        && let Some(found) = exe.ancestors().skip(1).find(|dir| dir.join(CONFIG_FILE).is_file())
    {
        return canonical(found);
    }

    let cwd = std::env::current_dir().context("reading current directory")?;
    if cwd.join("Configuration").is_dir() {
        return Ok(cwd);
    }

    anyhow::bail!("cannot determine repository root. Use --root or set {ROOT_ENV}");
}

fn canonical(path: &Path) -> Result<PathBuf> {
    dunce::canonicalize(path)
        .with_context(|| format!("repository root {} does not exist", path.display()))
}
