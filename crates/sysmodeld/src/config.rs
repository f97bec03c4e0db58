//! sysmodeld.toml configuration.
//!
//! Every section is optional; missing values take the defaults below.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Memory,
    Redb,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: Backend,
    /// Directory holding the redb file. Unused by the memory backend.
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Memory,
            path: PathBuf::from("/var/lib/sysmodel"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
    /// JSON lines when true, human-readable output otherwise.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

impl DaemonConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: DaemonConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Read `path` if given, otherwise start from defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.storage.path.join("sysmodel.redb")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let config: DaemonConfig = toml::from_str("").unwrap();
        assert_eq!(config, DaemonConfig::default());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.backend, Backend::Memory);
        assert!(config.logging.json);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let toml_str = r#"
[storage]
backend = "redb"
path = "/data/sm"

[logging]
level = "debug"
"#;
        let config: DaemonConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.storage.backend, Backend::Redb);
        assert_eq!(config.db_path(), PathBuf::from("/data/sm/sysmodel.redb"));
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let err = toml::from_str::<DaemonConfig>("[storage]\nbackend = \"postgres\"\n");
        assert!(err.is_err());
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sysmodeld.toml");
        std::fs::write(&path, "[server]\nport = 9100\n").unwrap();
        let config = DaemonConfig::load(Some(&path)).unwrap();
        assert_eq!(config.server.port, 9100);
        assert!(DaemonConfig::load(Some(&dir.path().join("missing.toml"))).is_err());
        assert_eq!(DaemonConfig::load(None).unwrap(), DaemonConfig::default());
    }
}
