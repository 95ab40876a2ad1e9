//! Linux services as systemd system units.
//!
//! Units are written to `/etc/systemd/system` and left disabled, so they only
//! run when started explicitly (the equivalent of a manual-start Windows
//! service).
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};

use super::ServiceManager;
use crate::config::settings::{SERVICE_DESCRIPTION, SERVICE_NAME, ServiceDefinition};
use crate::config::{ConfigResolver, Variant};
use crate::exec::Executor;
use crate::platform::{Os, Platform};

/// Default directory for administrator-installed unit files.
pub const DEFAULT_UNIT_DIR: &str = "/etc/systemd/system";

/// Convert a configured service name into a systemd unit name.
///
/// Whitespace runs become `-`; a `.service` suffix is appended if absent.
#[must_use]
pub fn unit_name(service_name: &str) -> String {
    let base = service_name.split_whitespace().collect::<Vec<_>>().join("-");
    if base.ends_with(".service") {
        base
    } else {
        format!("{base}.service")
    }
}

/// Quote a path for use on an `ExecStart=` line when it contains whitespace.
fn exec_quote(path: &Path) -> String {
    let text = path.display().to_string();
    if text.chars().any(char::is_whitespace) {
        format!("\"{}\"", text.replace('"', "\\\""))
    } else {
        text
    }
}

/// Render the unit file for `def`.
#[must_use]
pub fn render_unit(def: &ServiceDefinition) -> String {
    let working_dir = def
        .executable
        .parent()
        .unwrap_or(&def.app_directory)
        .display()
        .to_string();
    let mut unit = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(unit, "[Unit]");
    let _ = writeln!(unit, "Description={SERVICE_DESCRIPTION} ({})", def.name);
    let _ = writeln!(unit, "After=network.target");
    let _ = writeln!(unit);
    let _ = writeln!(unit, "[Service]");
    let _ = writeln!(unit, "Type=simple");
    let _ = writeln!(
        unit,
        "ExecStart={} {}",
        exec_quote(&def.executable),
        def.urls_argument()
    );
    let _ = writeln!(unit, "WorkingDirectory={working_dir}");
    let _ = writeln!(unit);
    let _ = writeln!(unit, "[Install]");
    let _ = writeln!(unit, "WantedBy=multi-user.target");
    unit
}

/// [`ServiceManager`] for Linux hosts running systemd.
pub struct SystemdServiceManager {
    config: ConfigResolver,
    platform: Platform,
    executor: Arc<dyn Executor>,
    unit_dir: PathBuf,
}

impl std::fmt::Debug for SystemdServiceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemdServiceManager")
            .field("config", &self.config)
            .field("executor", &"<dyn Executor>")
            .field("unit_dir", &self.unit_dir)
            .finish_non_exhaustive()
    }
}

impl SystemdServiceManager {
    /// Create a manager writing units to [`DEFAULT_UNIT_DIR`].
    #[must_use]
    pub fn new(config: ConfigResolver, executor: Arc<dyn Executor>) -> Self {
        Self {
            config,
            platform: Platform::new(Os::Linux),
            executor,
            unit_dir: PathBuf::from(DEFAULT_UNIT_DIR),
        }
    }

    /// Override the directory unit files are written to.
    #[must_use]
    pub fn with_unit_dir(mut self, unit_dir: impl Into<PathBuf>) -> Self {
        self.unit_dir = unit_dir.into();
        self
    }

    fn unit(&self, variant: Variant) -> Result<String> {
        Ok(unit_name(&self.service_name(variant)?))
    }

    fn systemctl(&self, args: &[&str]) -> Result<()> {
        self.executor.run("systemctl", args)?;
        Ok(())
    }
}

impl ServiceManager for SystemdServiceManager {
    fn is_elevated(&self) -> Result<bool> {
        let result = self
            .executor
            .run("id", &["-u"])
            .context("checking for super-user privileges")?;
        Ok(result.stdout.trim() == "0")
    }

    fn service_name(&self, variant: Variant) -> Result<String> {
        Ok(self.config.get_string(SERVICE_NAME, variant)?)
    }

    fn exists(&self, variant: Variant) -> Result<bool> {
        let unit = self.unit(variant)?;
        let result = self.executor.run_unchecked("systemctl", &["cat", &unit])?;
        Ok(result.success)
    }

    fn create(&self, variant: Variant) -> Result<()> {
        let def = ServiceDefinition::resolve(&self.config, variant, &self.platform)?;
        let path = self.unit_dir.join(unit_name(&def.name));
        std::fs::write(&path, render_unit(&def))
            .with_context(|| format!("writing unit file {}", path.display()))?;
        self.systemctl(&["daemon-reload"])
            .context("reloading systemd units")
    }

    fn start(&self, variant: Variant) -> Result<()> {
        let unit = self.unit(variant)?;
        self.systemctl(&["start", &unit])
            .with_context(|| format!("starting {unit}"))
    }

    fn stop(&self, variant: Variant) -> Result<()> {
        let unit = self.unit(variant)?;
        self.systemctl(&["stop", &unit])
            .with_context(|| format!("stopping {unit}"))
    }
}
