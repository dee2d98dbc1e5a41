// ABOUTME: Client settings and parsing for dockwrap.yml.
// ABOUTME: Handles YAML parsing, file discovery, and defaults when no file exists.

use crate::client::{DEFAULT_DOCKERFILE, DEFAULT_REGISTRY_HOST};
use crate::error::{Error, Result};
use crate::process::{DEFAULT_PROBE_INTERVAL, DaemonLossPolicy};
use crate::runtime::RuntimeType;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "dockwrap.yml";
pub const CONFIG_FILENAME_ALT: &str = "dockwrap.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".dockwrap/config.yml";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// CLI flavour looked up on PATH when `executable` is unset.
    #[serde(default)]
    pub runtime: RuntimeType,

    #[serde(default)]
    pub executable: Option<PathBuf>,

    #[serde(default = "default_dockerfile")]
    pub dockerfile: String,

    #[serde(default = "default_registry_host")]
    pub registry_host: String,

    #[serde(default)]
    pub show_output: bool,

    #[serde(default = "default_probe_interval", with = "humantime_serde")]
    pub probe_interval: Duration,

    #[serde(default)]
    pub on_daemon_loss: DaemonLossPolicy,
}

fn default_dockerfile() -> String {
    DEFAULT_DOCKERFILE.to_string()
}

fn default_registry_host() -> String {
    DEFAULT_REGISTRY_HOST.to_string()
}

fn default_probe_interval() -> Duration {
    DEFAULT_PROBE_INTERVAL
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            runtime: RuntimeType::default(),
            executable: None,
            dockerfile: default_dockerfile(),
            registry_host: default_registry_host(),
            show_output: false,
            probe_interval: default_probe_interval(),
            on_daemon_loss: DaemonLossPolicy::default(),
        }
    }
}

impl Settings {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty file means "all defaults".
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Settings = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load the first settings file found in `dir`, or defaults if none exists.
    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!("loading settings from {}", path.display());
                return Self::load(path);
            }
        }

        Ok(Self::default())
    }

    fn validate(&self) -> Result<()> {
        if self.probe_interval.is_zero() {
            return Err(Error::InvalidConfig(
                "probe_interval must be greater than zero".to_string(),
            ));
        }
        if self.dockerfile.is_empty() {
            return Err(Error::InvalidConfig("dockerfile must not be empty".to_string()));
        }
        if self.registry_host.is_empty() {
            return Err(Error::InvalidConfig(
                "registry_host must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
