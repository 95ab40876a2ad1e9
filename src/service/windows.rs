//! Windows services driven through PowerShell service cmdlets.
use std::sync::Arc;

use anyhow::{Context as _, Result};

use super::ServiceManager;
use crate::config::settings::{SERVICE_DESCRIPTION, SERVICE_NAME, ServiceDefinition};
use crate::config::{ConfigResolver, Variant};
use crate::exec::{ExecResult, Executor};
use crate::platform::{Os, Platform};

const POWERSHELL: &str = "powershell.exe";

/// Prints `True` when the current token holds the Administrators role.
const ELEVATION_PROBE: &str = "([Security.Principal.WindowsPrincipal][Security.Principal.WindowsIdentity]::GetCurrent()).IsInRole([Security.Principal.WindowsBuiltInRole]::Administrator)";

/// Quote `value` as a PowerShell single-quoted string literal.
fn ps_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// [`ServiceManager`] for Windows.
pub struct WindowsServiceManager {
    config: ConfigResolver,
    platform: Platform,
    executor: Arc<dyn Executor>,
}

impl std::fmt::Debug for WindowsServiceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowsServiceManager")
            .field("config", &self.config)
            .field("executor", &"<dyn Executor>")
            .finish_non_exhaustive()
    }
}

impl WindowsServiceManager {
    /// Create a manager reading settings from `config`.
    #[must_use]
    pub const fn new(config: ConfigResolver, executor: Arc<dyn Executor>) -> Self {
        Self {
            config,
            platform: Platform::new(Os::Windows),
            executor,
        }
    }

    fn powershell(&self, script: &str) -> Result<ExecResult> {
        self.executor.run(
            POWERSHELL,
            &["-NoProfile", "-NonInteractive", "-Command", script],
        )
    }

    /// PowerShell command registering the service described by `def`.
    fn new_service_script(def: &ServiceDefinition) -> String {
        let binary_path = format!(
            "\"{}\" {}",
            def.executable.display(),
            def.urls_argument()
        );
        format!(
            "New-Service -Name {name} -BinaryPathName ({binary}) -DisplayName {name} -Description {description} -StartupType Manual",
            name = ps_quote(&def.name),
            binary = ps_quote(&binary_path),
            description = ps_quote(SERVICE_DESCRIPTION),
        )
    }
}

impl ServiceManager for WindowsServiceManager {
    fn is_elevated(&self) -> Result<bool> {
        let result = self
            .powershell(ELEVATION_PROBE)
            .context("checking for administrator privileges")?;
        Ok(result.stdout.trim().eq_ignore_ascii_case("true"))
    }

    fn service_name(&self, variant: Variant) -> Result<String> {
        Ok(self.config.get_string(SERVICE_NAME, variant)?)
    }

    fn exists(&self, variant: Variant) -> Result<bool> {
        let name = self.service_name(variant)?;
        let script = format!(
            "Get-Service -Name {} -ErrorAction SilentlyContinue",
            ps_quote(&name)
        );
        let result = self.executor.run_unchecked(
            POWERSHELL,
            &["-NoProfile", "-NonInteractive", "-Command", &script],
        )?;
        Ok(!result.stdout.trim().is_empty())
    }

    fn create(&self, variant: Variant) -> Result<()> {
        let def = ServiceDefinition::resolve(&self.config, variant, &self.platform)?;
        self.powershell(&Self::new_service_script(&def))
            .with_context(|| format!("creating service {}", def.name))?;
        Ok(())
    }

    fn start(&self, variant: Variant) -> Result<()> {
        let name = self.service_name(variant)?;
        self.powershell(&format!("Start-Service -Name {}", ps_quote(&name)))
            .with_context(|| format!("starting service {name}"))?;
        Ok(())
    }

    fn stop(&self, variant: Variant) -> Result<()> {
        let name = self.service_name(variant)?;
        self.powershell(&format!("Stop-Service -Name {}", ps_quote(&name)))
            .with_context(|| format!("stopping service {name}"))?;
        Ok(())
    }
}
