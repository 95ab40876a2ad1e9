//! `Deploy`: stop services, rebuild, recreate missing services, restart.
use std::sync::Arc;

use anyhow::Result;

use super::{CommandSetup, StepResult, run_step, version};
use crate::cli::{DeployOpts, GlobalOpts};
use crate::config::Variant;
use crate::dotnet::Toolchain;
use crate::error::PlatformError;
use crate::logging::{Log, Logger, StepStatus};
use crate::service::{self, ServiceManager};

/// Run the deploy command.
///
/// # Errors
///
/// Returns an error if the root cannot be resolved or any deployment step
/// fails.
pub fn run(global: &GlobalOpts, opts: &DeployOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let variant = opts.variant();
    log.info(&format!("budget-scripts {}", version::version()));
    log.info(&format!("deploying {variant} version from {}", setup.root.display()));

    let services = service::for_platform(
        &setup.platform,
        setup.config.clone(),
        Arc::clone(&setup.executor),
    );
    let toolchain = setup.toolchain();
    let result = Deployer::new(&toolchain, services.as_ref(), log, global.dry_run).run(variant);

    log.print_summary();
    result
}

/// Services touched by a deploy of `variant`, in the order they are handled.
///
/// The local service is always ensured; the published one only when
/// publishing.
const fn targets(variant: Variant) -> &'static [Variant] {
    match variant {
        Variant::Published => &[Variant::Published, Variant::Local],
        Variant::Local => &[Variant::Local],
    }
}

/// Runs the deployment sequence against a toolchain and a service backend.
pub struct Deployer<'a> {
    toolchain: &'a Toolchain,
    services: &'a dyn ServiceManager,
    log: &'a dyn Log,
    dry_run: bool,
}

impl std::fmt::Debug for Deployer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deployer")
            .field("toolchain", &self.toolchain)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

impl<'a> Deployer<'a> {
    /// Create a deployer.
    #[must_use]
    pub const fn new(
        toolchain: &'a Toolchain,
        services: &'a dyn ServiceManager,
        log: &'a dyn Log,
        dry_run: bool,
    ) -> Self {
        Self {
            toolchain,
            services,
            log,
            dry_run,
        }
    }

    /// Deploy `variant`, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::AdministratorPermissionsRequired`] when not
    /// elevated, otherwise the first build or service error.
    pub fn run(&self, variant: Variant) -> Result<()> {
        self.log.stage("Checking privileges");
        if !self.services.is_elevated()? {
            self.log.record_step(
                "Check privileges",
                StepStatus::Failed,
                Some("not elevated"),
            );
            return Err(PlatformError::AdministratorPermissionsRequired.into());
        }
        self.log.record_step("Check privileges", StepStatus::Ok, None);

        if !self.dry_run {
            self.toolchain.ensure_available()?;
        }

        self.log.stage("Stopping services");
        for &target in targets(variant) {
            let name = self.services.service_name(target)?;
            run_step(self.log, &format!("Stop {name}"), || {
                if !self.services.exists(target)? {
                    return Ok(StepResult::Skipped("not installed".to_string()));
                }
                self.mutate(&format!("stop service {name}"), || {
                    self.log.info(&format!("stopping {name}"));
                    self.services.stop(target)
                })
            })?;
        }

        self.log.stage("Building solution");
        run_step(self.log, "Clean solution", || {
            self.mutate("dotnet clean --nologo -v q", || self.toolchain.clean())
        })?;
        if variant == Variant::Published {
            run_step(self.log, "Publish solution", || {
                self.mutate("dotnet publish -c Release --nologo -v q", || {
                    self.log.info("publishing solution");
                    self.toolchain.publish()
                })
            })?;
        } else {
            run_step(self.log, "Build solution", || {
                self.mutate("dotnet build --nologo -v q", || {
                    self.log.info("building solution");
                    self.toolchain.build()
                })
            })?;
        }

        self.log.stage("Creating services");
        for &target in targets(variant) {
            let name = self.services.service_name(target)?;
            run_step(self.log, &format!("Create {name}"), || {
                if self.services.exists(target)? {
                    return Ok(StepResult::Skipped("already exists".to_string()));
                }
                self.mutate(&format!("create service {name}"), || {
                    self.log.info(&format!("creating {name}"));
                    self.services.create(target)
                })
            })?;
        }

        self.log.stage("Starting services");
        for &target in targets(variant) {
            let name = self.services.service_name(target)?;
            run_step(self.log, &format!("Start {name}"), || {
                self.mutate(&format!("start service {name}"), || {
                    self.log.info(&format!("starting {name}"));
                    self.services.start(target)
                })
            })?;
        }

        Ok(())
    }

    /// Run `action`, or only log `description` in dry-run mode.
    fn mutate(&self, description: &str, action: impl FnOnce() -> Result<()>) -> Result<StepResult> {
        if self.dry_run {
            self.log.dry_run(&format!("would {description}"));
            return Ok(StepResult::DryRun);
        }
        action()?;
        Ok(StepResult::Ok)
    }
}
