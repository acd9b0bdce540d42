use std::{collections::HashMap, env, fs, path::Path};

use serde::Deserialize;
use thiserror::Error;

use crate::task_id::KeyType;

const SETTINGS_FILENAME: &str = "settings.json";
const DOTENV_FILENAME: &str = ".env";

/// Which [`TaskStore`](crate::TaskStore) backs the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Postgres,
    /// Process-local store. Data is lost on restart.
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub tcp_socket_binding: String,
    pub tcp_socket_port: u16,
    #[serde(default)]
    pub database_url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_seconds")]
    pub acquire_timeout_seconds: u64,
    #[serde(default)]
    pub key_type: KeyType,
    #[serde(default)]
    pub storage: StorageKind,
    #[serde(default)]
    pub static_dir: Option<String>,
    /// Empty means any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("cannot parse settings file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("cannot read env file {path}: {source}")]
    DotEnv {
        path: String,
        source: dotenvy::Error,
    },
    #[error("invalid value for {name}: {value}")]
    Env { name: &'static str, value: String },
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout_seconds() -> u64 {
    5
}

fn default_log_filter() -> String {
    "taskboard=info,tower_http=info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tcp_socket_binding: "0.0.0.0".to_string(),
            tcp_socket_port: 5000,
            database_url: String::new(),
            max_connections: default_max_connections(),
            acquire_timeout_seconds: default_acquire_timeout_seconds(),
            key_type: KeyType::default(),
            storage: StorageKind::default(),
            static_dir: None,
            allowed_origins: Vec::new(),
            log_filter: default_log_filter(),
        }
    }
}

impl Settings {
    /// Read `settings.json` from the working directory, then apply
    /// environment overrides. Variables from a `.env` file count too, but
    /// the process environment wins.
    pub fn load() -> Result<Settings, SettingsError> {
        let mut settings = Self::from_file(SETTINGS_FILENAME)?;
        let dotenv = read_dotenv(DOTENV_FILENAME)?;
        settings.apply_env(|name| env::var(name).ok().or_else(|| dotenv.get(name).cloned()))?;
        Ok(settings)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Settings, SettingsError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// `DATABASE_URL`, `PORT` and `TASKBOARD_STORAGE` win over the file.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL").filter(|url| !url.is_empty()) {
            self.database_url = url;
        }
        if let Some(port) = lookup("PORT") {
            self.tcp_socket_port = port.parse().map_err(|_| SettingsError::Env {
                name: "PORT",
                value: port.clone(),
            })?;
        }
        if let Some(storage) = lookup("TASKBOARD_STORAGE") {
            self.storage = match storage.to_ascii_lowercase().as_str() {
                "postgres" => StorageKind::Postgres,
                "memory" => StorageKind::Memory,
                _ => {
                    return Err(SettingsError::Env {
                        name: "TASKBOARD_STORAGE",
                        value: storage,
                    })
                }
            };
        }
        Ok(())
    }

    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.tcp_socket_binding, self.tcp_socket_port)
    }
}

/// Variables from a dotenv file. A missing file is an empty set.
pub fn read_dotenv(path: impl AsRef<Path>) -> Result<HashMap<String, String>, SettingsError> {
    let path = path.as_ref();
    let to_error = |source| SettingsError::DotEnv {
        path: path.display().to_string(),
        source,
    };
    match dotenvy::from_path_iter(path) {
        Ok(iter) => iter.collect::<Result<_, _>>().map_err(to_error),
        Err(e) if e.not_found() => Ok(HashMap::new()),
        Err(e) => Err(to_error(e)),
    }
}
