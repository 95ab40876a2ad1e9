//! Fallback for operating systems without a service backend.
use anyhow::Result;

use super::ServiceManager;
use crate::config::Variant;
use crate::error::PlatformError;

/// [`ServiceManager`] that fails every operation with
/// [`PlatformError::Unsupported`].
#[derive(Debug, Clone, Copy)]
pub struct UnsupportedServiceManager {
    platform: &'static str,
}

impl UnsupportedServiceManager {
    /// Create a manager for the named platform.
    #[must_use]
    pub const fn new(platform: &'static str) -> Self {
        Self { platform }
    }

    fn unsupported<T>(&self, operation: &'static str) -> Result<T> {
        Err(PlatformError::Unsupported {
            operation,
            platform: self.platform.to_string(),
        }
        .into())
    }
}

impl ServiceManager for UnsupportedServiceManager {
    fn is_elevated(&self) -> Result<bool> {
        self.unsupported("check privileges")
    }

    fn service_name(&self, _variant: Variant) -> Result<String> {
        self.unsupported("resolve service name")
    }

    fn exists(&self, _variant: Variant) -> Result<bool> {
        self.unsupported("check service")
    }

    fn create(&self, _variant: Variant) -> Result<()> {
        self.unsupported("create service")
    }

    fn start(&self, _variant: Variant) -> Result<()> {
        self.unsupported("start service")
    }

    fn stop(&self, _variant: Variant) -> Result<()> {
        self.unsupported("stop service")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn every_operation_is_unsupported() {
        let services = UnsupportedServiceManager::new("freebsd");
        let errors = [
            services.is_elevated().unwrap_err(),
            services.create(Variant::Local).unwrap_err(),
            services.start(Variant::Published).unwrap_err(),
            services.stop(Variant::Local).unwrap_err(),
        ];
        for err in errors {
            assert!(err.to_string().ends_with("not supported on freebsd"));
        }
    }
}
