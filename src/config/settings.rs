//! Well-known setting names and the service definition derived from them.
use std::path::PathBuf;

use super::{ConfigResolver, Variant};
use crate::error::ConfigError;
use crate::platform::Platform;

/// Name of the OS service hosting the REST API.
pub const SERVICE_NAME: &str = "RestApiServiceName";
/// Directory the application is built or published into.
pub const APP_DIRECTORY: &str = "AppDirectory";
/// Base URL the REST API listens on.
pub const REST_API_URL: &str = "RestApiUrl";
/// Port the REST API listens on.
pub const REST_API_PORT: &str = "RestApiPort";

/// Human-readable description attached to created services.
pub const SERVICE_DESCRIPTION: &str = "REST API for the React Budget App";

/// Everything needed to create or control one REST API service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDefinition {
    /// Which deployment this service belongs to.
    pub variant: Variant,
    /// OS service name.
    pub name: String,
    /// Application directory for this variant.
    pub app_directory: PathBuf,
    /// REST API base URL.
    pub url: String,
    /// REST API port.
    pub port: u16,
    /// Absolute path of the REST API executable.
    pub executable: PathBuf,
}

impl ServiceDefinition {
    /// Resolve the definition for `variant` from the current configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any of the four settings is missing or
    /// invalid.
    pub fn resolve(
        config: &ConfigResolver,
        variant: Variant,
        platform: &Platform,
    ) -> Result<Self, ConfigError> {
        let app_directory = PathBuf::from(config.get_string(APP_DIRECTORY, variant)?);
        let executable = app_directory
            .join("bin")
            .join("RestApi")
            .join(platform.rest_api_executable());
        Ok(Self {
            variant,
            name: config.get_string(SERVICE_NAME, variant)?,
            url: config.get_string(REST_API_URL, variant)?,
            port: config.get_port(REST_API_PORT, variant)?,
            app_directory,
            executable,
        })
    }

    /// Argument passed to the executable to bind the listener.
    #[must_use]
    pub fn urls_argument(&self) -> String {
        format!("--urls={}:{}", self.url, self.port)
    }
}
