//! Service registry of launched nodes.
//!
//! Each launched node is recorded under its service name in a JSON file per
//! enclave (`services_<enclave>.json`). The orchestrator only reads it; node
//! launchers append to it.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Connection details of a launched node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceResponse {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub service_name: String,
    #[serde(rename = "endpoint_public", default, skip_serializing_if = "String::is_empty")]
    pub public_endpoint: String,
    #[serde(rename = "endpoint", default, skip_serializing_if = "String::is_empty")]
    pub private_endpoint: String,
    #[serde(rename = "keypassword", default, skip_serializing_if = "String::is_empty")]
    pub key_password: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub keystore_path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub network: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub network_name: String,
    #[serde(rename = "nid", default, skip_serializing_if = "String::is_empty")]
    pub network_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub chain_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub chain_key: String,
}

impl ServiceResponse {
    /// Canonical compact JSON form, embedded into workflow parameters.
    pub fn encode_to_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Registry content: service name -> connection details.
pub type Services = BTreeMap<String, ServiceResponse>;

/// Service registry errors.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("service name not found: {service_name}")]
    NotFound { service_name: String },

    #[error("failed to access service registry {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode service registry {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode service registry {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read access to previously launched services.
pub trait ServiceRegistry: Send + Sync {
    /// Look up a service by name.
    fn lookup(&self, service_name: &str) -> Result<ServiceResponse, RegistryError>;
}

/// JSON file backed service registry.
#[derive(Debug)]
pub struct ServiceStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ServiceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Registry file of an enclave inside `dir`.
    pub fn for_enclave(dir: impl AsRef<Path>, enclave: &str) -> Self {
        Self::new(dir.as_ref().join(format!("services_{enclave}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every recorded service. A registry file that does not exist yet
    /// is empty.
    pub fn read_all(&self) -> Result<Services, RegistryError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Service registry {} does not exist yet", self.path.display());
                return Ok(Services::new());
            }
            Err(source) => {
                return Err(RegistryError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if contents.trim().is_empty() {
            return Ok(Services::new());
        }

        serde_json::from_str(&contents).map_err(|source| RegistryError::Decode {
            path: self.path.clone(),
            source,
        })
    }

    /// Record a launched service, replacing any entry with the same name.
    pub fn record(&self, response: &ServiceResponse) -> Result<(), RegistryError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut services = self.read_all()?;
        services.insert(response.service_name.clone(), response.clone());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| RegistryError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let contents =
            serde_json::to_string_pretty(&services).map_err(|source| RegistryError::Encode {
                path: self.path.clone(),
                source,
            })?;

        std::fs::write(&self.path, contents).map_err(|source| RegistryError::Io {
            path: self.path.clone(),
            source,
        })?;

        info!(
            "Recorded service {} in {}",
            response.service_name,
            self.path.display()
        );
        Ok(())
    }
}

impl ServiceRegistry for ServiceStore {
    fn lookup(&self, service_name: &str) -> Result<ServiceResponse, RegistryError> {
        let mut services = self.read_all()?;
        services
            .remove(service_name)
            .ok_or_else(|| RegistryError::NotFound {
                service_name: service_name.to_string(),
            })
    }
}
