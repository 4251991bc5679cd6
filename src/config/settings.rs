use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::util::auth::ServerAuth;
use crate::PRODUCT;

const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("No configuration file found (tried {}).", tried.join(", "))]
    NotFound { tried: Vec<String> },

    #[error("{path}: Failed to read config file: {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },

    #[error("{path}: Failed to parse config: {message}")]
    Parse { path: String, message: String },

    #[error("{path}: Missing {key}.")]
    Missing { path: String, key: String },

    #[error("{path}: Invalid {key}: {reason}.")]
    Invalid {
        path: String,
        key: String,
        reason: String,
    },
}

/// Raw contents of the configuration file. Every key is optional; which ones
/// are required depends on the operating mode.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub server_url: Option<String>,
    pub server_auth: Option<String>,
    pub server_verify_certificate: Option<toml::Value>,
    /// Seconds allowed for a plain request, or for a transfer to go without
    /// moving any data.
    pub server_timeout: Option<u64>,
    pub db_type: Option<String>,
    pub db_connect: Option<String>,
    pub root_path: Option<PathBuf>,

    #[serde(skip)]
    source: String,
}

#[derive(Debug, Clone)]
pub struct RemoteSettings {
    pub base_url: String,
    pub auth: ServerAuth,
    pub verify_certificate: bool,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSettings {
    pub db_type: String,
    pub db_connect: String,
    pub root_path: PathBuf,
}

/// Operating mode, decided once from the configuration.
#[derive(Debug, Clone)]
pub enum Settings {
    Remote(RemoteSettings),
    Local(LocalSettings),
}

impl Config {
    /// Picks the config file: the explicit override, else `<exe>.conf` beside
    /// the binary, else `/etc/fvclient.conf`.
    pub fn locate(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
        let candidates = match explicit {
            Some(path) => vec![path.to_path_buf()],
            None => Self::default_paths(),
        };

        for candidate in &candidates {
            if candidate.is_file() {
                return Ok(candidate.clone());
            }
        }

        Err(ConfigError::NotFound {
            tried: candidates
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
        })
    }

    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Ok(exe) = std::env::current_exe() {
            if let Some(path) = beside_executable(&exe) {
                paths.push(path);
            }
        }
        paths.push(PathBuf::from(format!("/etc/{}.conf", PRODUCT)));
        paths
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let source = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: source.clone(),
            source: e,
        })?;

        let mut config = Self::from_toml(&content).map_err(|e| ConfigError::Parse {
            path: source.clone(),
            message: e.to_string(),
        })?;
        config.source = source;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Decides the operating mode. A non-empty `server_url` selects remote
    /// mode; otherwise `db_type`, `db_connect` and `root_path` must all be set.
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        match non_empty(&self.server_url) {
            Some(url) => self.remote_settings(url).map(Settings::Remote),
            None => self.local_settings().map(Settings::Local),
        }
    }

    fn remote_settings(&self, url: &str) -> Result<RemoteSettings, ConfigError> {
        let raw_auth = non_empty(&self.server_auth).ok_or_else(|| self.missing("server_auth"))?;
        let auth = raw_auth
            .parse::<ServerAuth>()
            .map_err(|e| ConfigError::Invalid {
                path: self.source.clone(),
                key: "server_auth".to_string(),
                reason: e.to_string(),
            })?;

        let timeout = Duration::from_secs(self.server_timeout.unwrap_or(DEFAULT_TIMEOUT_SECS));
        if timeout.is_zero() {
            return Err(ConfigError::Invalid {
                path: self.source.clone(),
                key: "server_timeout".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(RemoteSettings {
            base_url: url.trim_end_matches('/').to_string(),
            auth,
            verify_certificate: self.verify_certificate(),
            timeout,
        })
    }

    fn local_settings(&self) -> Result<LocalSettings, ConfigError> {
        let db_type = non_empty(&self.db_type).ok_or_else(|| self.missing("server_url or db_type"))?;
        let db_connect = non_empty(&self.db_connect).ok_or_else(|| self.missing("db_connect"))?;
        let root_path = self
            .root_path
            .as_ref()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| self.missing("root_path"))?;

        Ok(LocalSettings {
            db_type: db_type.to_string(),
            db_connect: db_connect.to_string(),
            root_path: root_path.clone(),
        })
    }

    // absent, "" or false leave certificate checks off
    fn verify_certificate(&self) -> bool {
        match &self.server_verify_certificate {
            None => false,
            Some(toml::Value::String(s)) => !s.is_empty(),
            Some(toml::Value::Boolean(b)) => *b,
            Some(_) => true,
        }
    }

    fn missing(&self, key: &str) -> ConfigError {
        ConfigError::Missing {
            path: self.source.clone(),
            key: key.to_string(),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn beside_executable(exe: &Path) -> Option<PathBuf> {
    let stem = exe.file_stem()?;
    let mut name = stem.to_os_string();
    name.push(".conf");
    Some(exe.with_file_name(name))
}
