// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed budget app repository and a fluent
// builder so each integration test can set up an isolated environment without
// repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::Mutex;

use budget_scripts::config::ConfigResolver;
use budget_scripts::logging::{Log, StepEntry, StepStatus};

/// Configuration covering every setting the deploy and migration commands
/// read.
pub const DEFAULT_CONFIG: &str = r#"{
    "RestApiServiceName": { "Local": "Budget-API-Local", "Published": "Budget-API" },
    "AppDirectory": { "Local": "/srv/budget-local", "Published": "/srv/budget" },
    "RestApiUrl": { "Local": "http://localhost", "Published": "http://0.0.0.0" },
    "RestApiPort": { "Local": 5000, "Published": 8080 }
}"#;

/// Write the minimal repository layout into `root`.
///
/// Creates:
/// - `Configuration/config.json`: [`DEFAULT_CONFIG`]
/// - `Schema/`: schema project directory
pub fn setup_minimal_repo(root: &Path) {
    let conf = root.join("Configuration");
    std::fs::create_dir_all(&conf).expect("create Configuration dir");
    std::fs::create_dir_all(root.join("Schema")).expect("create Schema dir");
    std::fs::write(conf.join("config.json"), DEFAULT_CONFIG).expect("write config.json");
}

/// An isolated test repository backed by a [`tempfile::TempDir`].
pub struct IntegrationTestContext {
    /// Temporary directory containing the test repository.
    pub root: tempfile::TempDir,
    /// Separate cache directory so log files stay out of the user's home.
    pub cache: tempfile::TempDir,
}

impl IntegrationTestContext {
    /// Create a new context with a minimal but valid repository structure.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        setup_minimal_repo(root.path());
        Self {
            root,
            cache: tempfile::tempdir().expect("create cache dir"),
        }
    }

    /// Path to the repository root.
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// `<root>/Schema/Migrations`.
    pub fn migrations_dir(&self) -> PathBuf {
        self.root.path().join("Schema").join("Migrations")
    }

    /// Resolver over this repository's configuration file.
    pub fn config(&self) -> ConfigResolver {
        ConfigResolver::for_root(self.root.path())
    }

    /// Run the compiled binary against this repository.
    pub fn run_cli(&self, args: &[&str]) -> Output {
        self.command(args).output().expect("run budget-scripts")
    }

    /// Run the compiled binary with `bin_dir` searched first on `PATH`.
    pub fn run_cli_with_path(&self, args: &[&str], bin_dir: &Path) -> Output {
        let mut dirs = vec![bin_dir.to_path_buf()];
        if let Some(path) = std::env::var_os("PATH") {
            dirs.extend(std::env::split_paths(&path));
        }
        self.command(args)
            .env("PATH", std::env::join_paths(dirs).expect("join PATH"))
            .output()
            .expect("run budget-scripts")
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_budget-scripts"));
        cmd.args(args)
            .arg("--root")
            .arg(self.root.path())
            .env("XDG_CACHE_HOME", self.cache.path())
            .env_remove("BUDGET_APP_ROOT")
            .env_remove("BUDGET_SCRIPTS_LOG");
        cmd
    }
}

/// Write an executable shell script called `name` into `dir`.
#[cfg(unix)]
pub fn fake_tool(dir: &Path, name: &str, script: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt as _;
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{script}\n")).expect("write fake tool");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("chmod fake tool");
    path
}

/// Fluent builder for [`IntegrationTestContext`].
pub struct TestContextBuilder {
    ctx: IntegrationTestContext,
}

impl TestContextBuilder {
    /// Begin building a new context backed by a minimal repository.
    pub fn new() -> Self {
        Self {
            ctx: IntegrationTestContext::new(),
        }
    }

    /// Replace `Configuration/config.json` with `content`.
    pub fn with_config(self, content: &str) -> Self {
        let path = self.ctx.root.path().join("Configuration").join("config.json");
        std::fs::write(path, content).expect("write config.json");
        self
    }

    /// Delete `Configuration/config.json`.
    pub fn without_config(self) -> Self {
        let path = self.ctx.root.path().join("Configuration").join("config.json");
        std::fs::remove_file(path).expect("remove config.json");
        self
    }

    /// Create `Schema/Migrations/<file>` with placeholder content.
    pub fn with_migration(self, file: &str) -> Self {
        let dir = self.ctx.migrations_dir();
        std::fs::create_dir_all(&dir).expect("create Migrations dir");
        std::fs::write(dir.join(file), "// migration").expect("write migration");
        self
    }

    /// Finish building and return the configured context.
    pub fn build(self) -> IntegrationTestContext {
        self.ctx
    }
}

/// [`Log`] implementation that keeps recorded steps in memory and discards
/// messages.
#[derive(Debug, Default)]
pub struct RecordingLog {
    steps: Mutex<Vec<StepEntry>>,
}

impl RecordingLog {
    /// Recorded steps, in order.
    pub fn steps(&self) -> Vec<StepEntry> {
        self.steps.lock().expect("steps lock").clone()
    }

    /// Recorded statuses, in order.
    pub fn statuses(&self) -> Vec<StepStatus> {
        self.steps().into_iter().map(|s| s.status).collect()
    }
}

impl Log for RecordingLog {
    fn stage(&self, _msg: &str) {}
    fn info(&self, _msg: &str) {}
    fn debug(&self, _msg: &str) {}
    fn warn(&self, _msg: &str) {}
    fn error(&self, _msg: &str) {}
    fn dry_run(&self, _msg: &str) {}

    fn record_step(&self, name: &str, status: StepStatus, message: Option<&str>) {
        self.steps.lock().expect("steps lock").push(StepEntry {
            name: name.to_string(),
            status,
            message: message.map(String::from),
        });
    }
}
