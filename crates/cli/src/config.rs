//! Configuration management for the bridge setup CLI.
//!
//! Handles loading and saving configuration from ~/.btp-bridge/config.toml

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use common::ServiceStore;
use orchestrator::BridgeConfig;
use serde::{Deserialize, Serialize};

/// CLI configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Workflow engine API endpoint
    #[serde(default = "default_engine_endpoint")]
    pub engine_endpoint: String,

    /// Enclave hosting the chain services
    #[serde(default = "default_enclave")]
    pub enclave: String,

    /// Workflow package with the node and bridge scripts
    #[serde(default = "default_package")]
    pub package: String,

    /// Script with the BTP setup entry points
    #[serde(default = "default_bridge_script")]
    pub bridge_script: String,

    /// Directory of the service registry files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Timeout for engine requests (seconds). Unset waits for the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    /// Output format (table, json)
    #[serde(default = "default_output_format")]
    pub output_format: String,

    /// Enable colored output
    #[serde(default = "default_colored")]
    pub colored: bool,
}

fn default_engine_endpoint() -> String {
    "http://localhost:9710".to_string()
}

fn default_enclave() -> String {
    common::DEFAULT_ENCLAVE.to_string()
}

fn default_package() -> String {
    orchestrator::config::DEFAULT_PACKAGE.to_string()
}

fn default_bridge_script() -> String {
    orchestrator::config::BTP_BRIDGE_SCRIPT.to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_output_format() -> String {
    "table".to_string()
}

fn default_colored() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine_endpoint: default_engine_endpoint(),
            enclave: default_enclave(),
            package: default_package(),
            bridge_script: default_bridge_script(),
            output_dir: default_output_dir(),
            request_timeout_secs: None,
            output_format: default_output_format(),
            colored: default_colored(),
        }
    }
}

impl Config {
    /// Get the path to the config directory
    pub fn config_dir() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Could not determine home directory")?;

        Ok(home_dir.join(".btp-bridge"))
    }

    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from file, or create default if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;

            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Update engine endpoint
    pub fn set_engine_endpoint(&mut self, endpoint: String) -> Result<()> {
        self.engine_endpoint = endpoint;
        self.save()
    }

    /// Update enclave
    pub fn set_enclave(&mut self, enclave: String) -> Result<()> {
        if enclave.trim().is_empty() {
            anyhow::bail!("Enclave name must not be empty");
        }
        self.enclave = enclave;
        self.save()
    }

    /// Update output format
    pub fn set_output_format(&mut self, format: String) -> Result<()> {
        validate_output_format(&format)?;
        self.output_format = format;
        self.save()
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Bridge workflow settings for the orchestrator
    pub fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig {
            enclave: self.enclave.clone(),
            package: self.package.clone(),
            bridge_script: self.bridge_script.clone(),
        }
    }

    /// Registry of the services running in the configured enclave
    pub fn service_store(&self) -> ServiceStore {
        ServiceStore::for_enclave(&self.output_dir, &self.enclave)
    }
}

fn validate_output_format(format: &str) -> Result<()> {
    if format != "table" && format != "json" {
        anyhow::bail!("Invalid output format. Must be 'table' or 'json'");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.engine_endpoint, "http://localhost:9710");
        assert_eq!(config.enclave, "bridge");
        assert_eq!(config.package, "bridge-packages");
        assert_eq!(config.bridge_script, "main.star");
        assert_eq!(config.output_format, "table");
        assert!(config.request_timeout().is_none());
        assert!(config.colored);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: Config = toml::from_str(
            r#"
            enclave = "btp-testnet"
            request_timeout_secs = 600
            "#,
        )
        .unwrap();

        assert_eq!(config.enclave, "btp-testnet");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(600)));
        assert_eq!(config.engine_endpoint, "http://localhost:9710");
        assert_eq!(config.bridge_config().enclave, "btp-testnet");
        assert_eq!(
            config.service_store().path(),
            Path::new("output/services_btp-testnet.json")
        );
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());

        let mut changed = config.clone();
        changed.engine_endpoint = "http://10.0.0.5:9710".to_string();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), changed);
    }

    #[test]
    fn test_invalid_output_format() {
        assert!(validate_output_format("json").is_ok());
        assert!(validate_output_format("yaml").is_err());
    }
}
