//! # Runtime Configuration
//!
//! Environment-derived configuration, built once at process start and
//! passed down explicitly; deep components never read the process
//! environment themselves.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `PF_DATA_DIR` | `./data` | Pair store directory |
//! | `PF_GATE_TIMEOUT_SECS` | `30` | Completion gate deadline |
//! | `PF_ORIGIN_KEY_PATH` | `./keys/origin.pub` | Origin public key file |
//! | `PF_SUPPLIER_KEY_PATH_<S>` | unset | Supplier `<S>` public key file |
//! | `PF_OBJECT_STORAGE_ENDPOINT` | unset | Object storage base URL |
//! | `PF_OBJECT_STORAGE_BUCKET` | unset | Object storage bucket name |
//! | `PF_OBJECT_STORAGE_TOKEN` | unset | Optional bearer token |
//! | `PF_TRANSFER_DIR_<S>` | unset | Supplier `<S>` transfer share |

use shared_types::Supplier;
use std::collections::HashMap;
use std::path::PathBuf;

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Pair store configuration.
    pub store: StoreConfig,
    /// Completion gate configuration.
    pub gate: GateConfig,
    /// Encryption key material locations.
    pub keys: KeyConfig,
    /// Delivery sink configuration.
    pub delivery: DeliveryConfig,
}

/// Pair store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding the pair store.
    pub data_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
        }
    }
}

/// Completion gate configuration.
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Seconds the gate waits for the full batch before failing it.
    pub timeout_secs: u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

/// Encryption key material locations.
#[derive(Debug, Clone, Default)]
pub struct KeyConfig {
    /// Path of the originating organization's public key.
    pub origin_key_path: PathBuf,
    /// Supplier identifier → public key path.
    pub supplier_key_paths: HashMap<String, PathBuf>,
}

/// Delivery sink configuration.
#[derive(Debug, Clone, Default)]
pub struct DeliveryConfig {
    /// Object storage, when configured.
    pub object_storage: Option<ObjectStorageConfig>,
    /// Supplier identifier → mounted transfer share directory.
    pub transfer_dirs: HashMap<String, PathBuf>,
}

/// Object storage sink configuration.
#[derive(Debug, Clone)]
pub struct ObjectStorageConfig {
    /// Base URL of the object storage service.
    pub endpoint: String,
    /// Bucket the artifacts are pushed into.
    pub bucket: String,
    /// Optional bearer token.
    pub token: Option<String>,
}

impl RuntimeConfig {
    /// Load the configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        let mut supplier_key_paths = HashMap::new();
        let mut transfer_dirs = HashMap::new();
        for (name, value) in std::env::vars() {
            if let Some(supplier) = name.strip_prefix("PF_SUPPLIER_KEY_PATH_") {
                supplier_key_paths.insert(supplier.to_string(), PathBuf::from(value));
            } else if let Some(supplier) = name.strip_prefix("PF_TRANSFER_DIR_") {
                transfer_dirs.insert(supplier.to_string(), PathBuf::from(value));
            }
        }

        let object_storage = match (
            std::env::var("PF_OBJECT_STORAGE_ENDPOINT"),
            std::env::var("PF_OBJECT_STORAGE_BUCKET"),
        ) {
            (Ok(endpoint), Ok(bucket)) => Some(ObjectStorageConfig {
                endpoint,
                bucket,
                token: std::env::var("PF_OBJECT_STORAGE_TOKEN").ok(),
            }),
            _ => None,
        };

        Self {
            store: StoreConfig {
                data_dir: std::env::var("PF_DATA_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| StoreConfig::default().data_dir),
            },
            gate: GateConfig {
                timeout_secs: std::env::var("PF_GATE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or_else(|| GateConfig::default().timeout_secs),
            },
            keys: KeyConfig {
                origin_key_path: std::env::var("PF_ORIGIN_KEY_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("./keys/origin.pub")),
                supplier_key_paths,
            },
            delivery: DeliveryConfig {
                object_storage,
                transfer_dirs,
            },
        }
    }

    /// The configured public key path for a supplier.
    #[must_use]
    pub fn supplier_key_path(&self, supplier: &Supplier) -> Option<&PathBuf> {
        self.keys.supplier_key_paths.get(supplier.as_str())
    }

    /// The configured transfer share for a supplier.
    #[must_use]
    pub fn supplier_transfer_dir(&self, supplier: &Supplier) -> Option<&PathBuf> {
        self.delivery.transfer_dirs.get(supplier.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let store = StoreConfig::default();
        assert_eq!(store.data_dir, PathBuf::from("./data"));

        let gate = GateConfig::default();
        assert_eq!(gate.timeout_secs, 30);
    }

    #[test]
    fn test_supplier_lookups() {
        let mut config = RuntimeConfig {
            store: StoreConfig::default(),
            gate: GateConfig::default(),
            keys: KeyConfig::default(),
            delivery: DeliveryConfig::default(),
        };
        config
            .keys
            .supplier_key_paths
            .insert("QM".to_string(), PathBuf::from("/keys/qm.pub"));
        config
            .delivery
            .transfer_dirs
            .insert("QM".to_string(), PathBuf::from("/mnt/qm"));

        let qm = Supplier::new("qm");
        assert_eq!(
            config.supplier_key_path(&qm),
            Some(&PathBuf::from("/keys/qm.pub"))
        );
        assert_eq!(
            config.supplier_transfer_dir(&qm),
            Some(&PathBuf::from("/mnt/qm"))
        );
        assert!(config.supplier_key_path(&Supplier::new("PPO")).is_none());
    }
}
