//! Persisted node configuration
//!
//! The store is a single flat JSON object holding the registered wallet
//! address and node id. It is read once at startup and rewritten wholesale
//! whenever either value changes.

use crate::core::{
    error::{Error, Result},
    CONFIG_FILE_NAME,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Wallet and node registration state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredConfig")]
pub struct NodeConfig {
    /// Wallet address registered with `register-user`
    #[serde(rename = "walletAddress")]
    pub wallet_address: Option<String>,

    /// Node id returned by `register-node`
    #[serde(rename = "nodeId")]
    pub node_id: Option<String>,
}

/// On-disk shape. Older releases wrote snake_case keys, which are still read
/// when the camelCase key is absent.
#[derive(Deserialize)]
struct StoredConfig {
    #[serde(rename = "walletAddress", default)]
    wallet_address: Option<String>,
    #[serde(rename = "nodeId", default)]
    node_id: Option<String>,
    #[serde(rename = "wallet_address", default)]
    legacy_wallet_address: Option<String>,
    #[serde(rename = "node_id", default)]
    legacy_node_id: Option<String>,
}

impl From<StoredConfig> for NodeConfig {
    fn from(stored: StoredConfig) -> Self {
        Self {
            wallet_address: non_empty(stored.wallet_address)
                .or_else(|| non_empty(stored.legacy_wallet_address)),
            node_id: non_empty(stored.node_id).or_else(|| non_empty(stored.legacy_node_id)),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Placeholder shown for values that were never registered
pub const NOT_SET: &str = "[Not set]";

impl NodeConfig {
    /// Location of the store inside the given home directory
    pub fn default_path(user_home: &Path) -> PathBuf {
        user_home.join(CONFIG_FILE_NAME)
    }

    /// Load the store, returning an empty configuration when the file does
    /// not exist yet
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No configuration at {}, starting empty", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| Error::ConfigFormat {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Rewrite the whole store
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| Error::ConfigWrite {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Configuration written to {}", path.display());
        Ok(())
    }

    /// True once both values have been registered
    pub fn is_complete(&self) -> bool {
        self.wallet_address.is_some() && self.node_id.is_some()
    }

    /// Wallet address for menu headers
    pub fn display_wallet(&self) -> &str {
        self.wallet_address.as_deref().unwrap_or(NOT_SET)
    }

    /// Node id for menu headers
    pub fn display_node_id(&self) -> &str {
        self.node_id.as_deref().unwrap_or(NOT_SET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_display_helpers() {
        let mut config = NodeConfig::default();
        assert_eq!(config.display_wallet(), "[Not set]");
        assert_eq!(config.display_node_id(), "[Not set]");

        config.node_id = Some("42".to_string());
        assert_eq!(config.display_node_id(), "42");
        assert!(!config.is_complete());
    }

    #[test]
    fn test_missing_file_is_empty() {
        let temp_dir = tempdir().unwrap();
        let config = NodeConfig::load(temp_dir.path().join("absent.json")).unwrap();
        assert_eq!(config, NodeConfig::default());
        assert!(!config.is_complete());
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = tempdir().unwrap();
        let path = NodeConfig::default_path(temp_dir.path());

        let config = NodeConfig {
            wallet_address: Some("0xAbC123".to_string()),
            node_id: Some("6520513".to_string()),
        };
        config.save(&path).unwrap();

        let loaded = NodeConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert!(loaded.is_complete());
    }

    #[test]
    fn test_overwrite_replaces_previous_values() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.json");

        let mut config = NodeConfig {
            wallet_address: Some("0xold".to_string()),
            node_id: None,
        };
        config.save(&path).unwrap();

        config.wallet_address = Some("0xnew".to_string());
        config.node_id = Some("abc-123".to_string());
        config.save(&path).unwrap();

        let loaded = NodeConfig::load(&path).unwrap();
        assert_eq!(loaded.wallet_address.as_deref(), Some("0xnew"));
        assert_eq!(loaded.node_id.as_deref(), Some("abc-123"));
    }

    #[test]
    fn test_written_keys_are_camel_case() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.json");
        NodeConfig {
            wallet_address: Some("0x1".to_string()),
            node_id: Some("42".to_string()),
        }
        .save(&path)
        .unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["walletAddress"], "0x1");
        assert_eq!(raw["nodeId"], "42");
        assert!(raw.get("wallet_address").is_none());
    }

    #[test]
    fn test_legacy_keys_are_read() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nexus_config.json");
        std::fs::write(&path, r#"{"wallet_address": "0xlegacy", "node_id": "777"}"#).unwrap();

        let loaded = NodeConfig::load(&path).unwrap();
        assert_eq!(loaded.wallet_address.as_deref(), Some("0xlegacy"));
        assert_eq!(loaded.node_id.as_deref(), Some("777"));
    }

    #[test]
    fn test_camel_case_wins_over_legacy() {
        let raw = r#"{"walletAddress": "0xnew", "wallet_address": "0xold", "node_id": "9"}"#;
        let config: NodeConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.wallet_address.as_deref(), Some("0xnew"));
        assert_eq!(config.node_id.as_deref(), Some("9"));
    }

    #[test]
    fn test_null_and_blank_values_are_unset() {
        let raw = r#"{"walletAddress": null, "nodeId": "   ", "extra": true}"#;
        let config: NodeConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config, NodeConfig::default());
    }

    #[test]
    fn test_malformed_file_reports_path() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = NodeConfig::load(&path).unwrap_err();
        match err {
            Error::ConfigFormat { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("Expected ConfigFormat error, got {:?}", other),
        }
    }
}
