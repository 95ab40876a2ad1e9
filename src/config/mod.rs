//! Configuration resolver for `Configuration/config.json`.
//!
//! Every top-level key of the document is a setting name whose value is an
//! object with a `Local` and a `Published` field:
//!
//! ```json
//! { "RestApiPort": { "Local": 5000, "Published": 8080 } }
//! ```
//!
//! The file is re-read on every lookup so edits take effect immediately.
pub mod settings;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ConfigError;

/// Location of the configuration file relative to the repository root.
pub const CONFIG_FILE: &str = "Configuration/config.json";

/// Which of the two values of a setting to select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Development deployment.
    Local,
    /// Production deployment.
    Published,
}

impl Variant {
    /// Map the CLI `--published` flag to a variant.
    #[must_use]
    pub const fn from_published(published: bool) -> Self {
        if published { Self::Published } else { Self::Local }
    }

    /// JSON field name holding this variant's value.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Local => "Local",
            Self::Published => "Published",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A scalar setting value.
///
/// Displays strings without surrounding quotes, so the value can be printed
/// straight to stdout by `Get-Config`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    /// JSON string.
    Text(String),
    /// JSON number, kept in its original representation.
    Number(serde_json::Number),
    /// JSON boolean.
    Flag(bool),
}

impl SettingValue {
    /// Convert a JSON value, rejecting null, arrays and objects.
    fn from_json(value: &Value) -> Option<Self> {
        Self::deserialize(value).ok()
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Flag(b) => write!(f, "{b}"),
        }
    }
}

/// Reads settings from a JSON configuration file.
///
/// Holds only the path; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    path: PathBuf,
}

impl ConfigResolver {
    /// Create a resolver for an explicit file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a resolver for `<root>/Configuration/config.json`.
    #[must_use]
    pub fn for_root(root: &Path) -> Self {
        Self::new(root.join(CONFIG_FILE))
    }

    /// Path of the configuration file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up the `variant` value of setting `name`.
    ///
    /// Both variants must be present even though only one is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FileNotFound`], [`ConfigError::Io`] or
    /// [`ConfigError::Parse`] when the file cannot be loaded,
    /// [`ConfigError::UnknownSetting`] when `name` is absent,
    /// [`ConfigError::MissingVariant`] when either variant is absent, and
    /// [`ConfigError::NotScalar`] when the selected value is not a scalar.
    pub fn get(&self, name: &str, variant: Variant) -> Result<SettingValue, ConfigError> {
        let document = self.load()?;
        let entry = document
            .get(name)
            .ok_or_else(|| ConfigError::UnknownSetting(name.to_string()))?;

        for required in [Variant::Local, Variant::Published] {
            if entry.get(required.key()).is_none() {
                return Err(ConfigError::MissingVariant {
                    name: name.to_string(),
                    variant: required,
                });
            }
        }

        entry
            .get(variant.key())
            .and_then(SettingValue::from_json)
            .ok_or_else(|| ConfigError::NotScalar {
                name: name.to_string(),
                variant,
            })
    }

    /// Look up a setting and render it as text.
    ///
    /// # Errors
    ///
    /// Same as [`ConfigResolver::get`].
    pub fn get_string(&self, name: &str, variant: Variant) -> Result<String, ConfigError> {
        Ok(self.get(name, variant)?.to_string())
    }

    /// Look up a setting as a TCP port.
    ///
    /// Accepts a JSON number or a numeric string in the `u16` range.
    ///
    /// # Errors
    ///
    /// Same as [`ConfigResolver::get`], plus [`ConfigError::InvalidValue`]
    /// when the value is not a valid port.
    pub fn get_port(&self, name: &str, variant: Variant) -> Result<u16, ConfigError> {
        let value = self.get(name, variant)?;
        let text = match &value {
            SettingValue::Flag(_) => None,
            other => Some(other.to_string()),
        };
        text.and_then(|t| t.trim().parse::<u16>().ok())
            .ok_or_else(|| ConfigError::InvalidValue {
                name: name.to_string(),
                variant,
                reason: format!("'{value}' is not a port number"),
            })
    }

    /// Read and parse the whole document.
    fn load(&self) -> Result<Map<String, Value>, ConfigError> {
        if !self.path.exists() {
            return Err(ConfigError::FileNotFound {
                path: self.path.clone(),
            });
        }
        let content = std::fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;
        let value: Value = serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        match value {
            Value::Object(map) => Ok(map),
            _ => Err(ConfigError::Parse {
                path: self.path.clone(),
                message: "top-level value must be an object".to_string(),
            }),
        }
    }
}
