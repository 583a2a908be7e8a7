use crate::core::scanner::{Scanner, DEFAULT_EXTENSIONS};
use crate::core::FailurePolicy;
use crate::database::{TableName, DEFAULT_TABLE};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory under the home directory holding the database, logs and config.
pub const DATA_DIR_NAME: &str = ".pictodex";
pub const DATABASE_FILE: &str = "pictodex.db";
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Could not find home directory")]
    NoHomeDir,

    #[error("{0}")]
    Invalid(String),
}

/// Everything an operation needs to know. Nothing below the binary looks at
/// the environment on its own.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory tree to scan.
    pub root: PathBuf,
    /// Holds the database, `logs/` and `config.toml`.
    pub data_dir: PathBuf,
    /// Overrides `<data_dir>/pictodex.db`.
    pub database_path: Option<PathBuf>,
    pub table: String,
    pub extensions: Vec<String>,
    pub failure_policy: FailurePolicy,
    pub log_level: String,
    pub log_to_file: bool,
}

/// On-disk form of [`Config`]; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub root: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    pub table: Option<String>,
    pub extensions: Option<Vec<String>>,
    pub failure_policy: Option<FailurePolicy>,
    pub log_level: Option<String>,
    pub log_to_file: Option<bool>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Config {
    pub fn new(root: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            data_dir: data_dir.into(),
            database_path: None,
            table: DEFAULT_TABLE.to_string(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            failure_policy: FailurePolicy::default(),
            log_level: "info".to_string(),
            log_to_file: true,
        }
    }

    /// Scan the home directory and keep state in `~/.pictodex`.
    pub fn from_home() -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        let data_dir = home.join(DATA_DIR_NAME);
        Ok(Self::new(home, data_dir))
    }

    /// Overlay the keys present in `file`.
    pub fn merge(&mut self, file: ConfigFile) {
        if let Some(root) = file.root {
            self.root = root;
        }
        if let Some(data_dir) = file.data_dir {
            self.data_dir = data_dir;
        }
        if file.database_path.is_some() {
            self.database_path = file.database_path;
        }
        if let Some(table) = file.table {
            self.table = table;
        }
        if let Some(extensions) = file.extensions {
            self.extensions = extensions;
        }
        if let Some(policy) = file.failure_policy {
            self.failure_policy = policy;
        }
        if let Some(level) = file.log_level {
            self.log_level = level;
        }
        if let Some(log_to_file) = file.log_to_file {
            self.log_to_file = log_to_file;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.table_name()?;

        if self.extensions.is_empty() {
            return Err(ConfigError::Invalid(
                "extensions must name at least one file type".to_string(),
            ));
        }
        if self.extensions.iter().any(|e| e.trim_start_matches('.').is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "extensions must not contain empty entries: {:?}",
                self.extensions
            )));
        }

        Ok(())
    }

    pub fn table_name(&self) -> Result<TableName, ConfigError> {
        TableName::new(&self.table).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join(DATABASE_FILE))
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    pub fn default_config_file(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE)
    }

    pub fn scanner(&self) -> Scanner {
        Scanner::new(&self.root).with_extensions(&self.extensions)
    }
}
