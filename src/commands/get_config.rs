//! `Get-Config`: print one setting value.
use anyhow::Result;

use super::CommandSetup;
use crate::cli::{GetConfigOpts, GlobalOpts};
use crate::config::{ConfigResolver, SettingValue, Variant};
use crate::logging::Log;

/// Run the `Get-Config` command.
///
/// # Errors
///
/// Returns an error if the root cannot be resolved or the setting cannot be
/// read.
pub fn run(global: &GlobalOpts, opts: &GetConfigOpts, log: &dyn Log) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    print(&setup.config, &opts.name, opts.variant(), log)
}

/// Resolve setting `name` for `variant`.
///
/// # Errors
///
/// Returns the resolver's [`ConfigError`](crate::error::ConfigError).
pub fn lookup(config: &ConfigResolver, name: &str, variant: Variant, log: &dyn Log) -> Result<SettingValue> {
    log.debug(&format!(
        "reading {name} ({variant}) from {}",
        config.path().display()
    ));
    Ok(config.get(name, variant)?)
}

/// Print the value of setting `name` to stdout, bare, so the output can be
/// captured by scripts.
///
/// # Errors
///
/// Returns an error if the setting cannot be resolved.
#[allow(clippy::print_stdout)]
pub fn print(config: &ConfigResolver, name: &str, variant: Variant, log: &dyn Log) -> Result<()> {
    let value = lookup(config, name, variant, log)?;
    println!("{value}");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::logging::isolated_logger;

    fn resolver(json: &str) -> (ConfigResolver, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, json).unwrap();
        (ConfigResolver::new(path), dir)
    }

    #[test]
    fn lookup_selects_variant() {
        let (log, _tmp, _guard) = isolated_logger();
        let (config, _dir) = resolver(r#"{"Port": {"Local": 5000, "Published": 8080}}"#);
        assert_eq!(
            lookup(&config, "Port", Variant::Local, &log).unwrap().to_string(),
            "5000"
        );
        assert_eq!(
            lookup(&config, "Port", Variant::Published, &log).unwrap().to_string(),
            "8080"
        );
    }

    #[test]
    fn lookup_keeps_typed_error() {
        let (log, _tmp, _guard) = isolated_logger();
        let (config, _dir) = resolver(r#"{"Port": {"Local": 5000}}"#);
        let err = lookup(&config, "Port", Variant::Local, &log).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::MissingVariant {
                variant: Variant::Published,
                ..
            })
        ));
    }
}
