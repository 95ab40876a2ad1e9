//! OS service lifecycle for the REST API.
//!
//! [`ServiceManager`] is the capability set the deployment needs: a privilege
//! probe plus check-exists, create, start and stop for the local and the
//! published service. [`for_platform`] picks the implementation from the
//! detected OS:
//!
//! - **Windows**: PowerShell service cmdlets ([`WindowsServiceManager`])
//! - **Linux**: systemd system units ([`SystemdServiceManager`])
//! - anything else: [`UnsupportedServiceManager`], which fails every call
pub mod systemd;
pub mod unsupported;
pub mod windows;

use std::sync::Arc;

use anyhow::Result;

use crate::config::{ConfigResolver, Variant};
use crate::exec::Executor;
use crate::platform::{Os, Platform};

pub use systemd::SystemdServiceManager;
pub use unsupported::UnsupportedServiceManager;
pub use windows::WindowsServiceManager;

/// Platform-specific control over the REST API services.
///
/// Every method takes the [`Variant`] selecting which of the two services
/// (local or published) to act on. Settings are resolved from the
/// configuration file on each call.
#[cfg_attr(test, mockall::automock)]
pub trait ServiceManager {
    /// Whether the process runs with administrator / super-user privileges.
    ///
    /// # Errors
    ///
    /// Returns an error if the privilege probe cannot be run.
    fn is_elevated(&self) -> Result<bool>;

    /// Configured OS service name for `variant`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name cannot be resolved from configuration.
    fn service_name(&self, variant: Variant) -> Result<String>;

    /// Whether the service for `variant` is registered with the OS.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or the service manager query fails.
    fn exists(&self, variant: Variant) -> Result<bool>;

    /// Register the service for `variant` with the OS.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or the service manager call fails.
    fn create(&self, variant: Variant) -> Result<()>;

    /// Start the service for `variant`.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or the service manager call fails.
    fn start(&self, variant: Variant) -> Result<()>;

    /// Stop the service for `variant`.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or the service manager call fails.
    fn stop(&self, variant: Variant) -> Result<()>;
}

/// Select the service manager for `platform`.
#[must_use]
pub fn for_platform(
    platform: &Platform,
    config: ConfigResolver,
    executor: Arc<dyn Executor>,
) -> Box<dyn ServiceManager> {
    match platform.os {
        Os::Windows => Box::new(WindowsServiceManager::new(config, executor)),
        Os::Linux => Box::new(SystemdServiceManager::new(config, executor)),
        Os::Other(name) => Box::new(UnsupportedServiceManager::new(name)),
    }
}
