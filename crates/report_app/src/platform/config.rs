use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use report_engine::{ApiSettings, AtomicFileWriter};
use report_logging::report_info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("failed to serialize configuration: {0}")]
    Serialize(String),
    #[error("failed to write configuration: {0}")]
    Write(#[from] report_engine::PersistError),
}

/// Filters applied at start-up, before the user edits any of them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialFilters {
    pub block_types: Vec<String>,
    pub root_block_id: String,
    pub usernames: String,
    pub match_string: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// URL the handler paths are resolved against.
    pub base_url: String,
    pub handler_prefix: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_download_mb: u64,
    pub download_dir: PathBuf,
    pub filters: InitialFilters,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/".to_string(),
            handler_prefix: "handler".to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            max_download_mb: 64,
            download_dir: PathBuf::from("downloads"),
            filters: InitialFilters::default(),
        }
    }
}

impl ClientConfig {
    /// Loads the configuration; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                report_info!("No configuration at {:?}; using defaults", path);
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config = ron::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        report_info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<PathBuf, ConfigError> {
        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(self, pretty)
            .map_err(|err| ConfigError::Serialize(err.to_string()))?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "report_client.ron".to_string());
        let writer = AtomicFileWriter::new(dir);
        Ok(writer.write(&filename, content.as_bytes())?)
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_download_bytes: self.max_download_mb.saturating_mul(1024 * 1024),
        }
    }
}
