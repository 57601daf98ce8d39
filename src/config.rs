use crate::errors::ConfigError;
use crate::utils::path_utils::expand_tilde;
use ini::{Ini, ParseOption};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Env file read when `--env-file` is not given. Absence is not an error.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Every variable the tool needs, in the order they are checked.
pub const REQUIRED_VARS: [&str; 7] = [
    "ACCESS_KEY",
    "SECRET_KEY",
    "ENDPOINT_URL",
    "REGION",
    "BUCKET_NAME",
    "INPUT_FILE_KEY",
    "OUTPUT_FILE_KEY",
];

/// Connection settings for one S3-compatible endpoint
#[derive(Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub access_key: String,
    pub secret_key: String,
    pub endpoint: String,
    pub region: String,
}

impl StorageConfig {
    /// Access key trimmed to its first four characters, for log lines.
    pub fn masked_access_key(&self) -> String {
        let visible: String = self.access_key.chars().take(4).collect();
        format!("{visible}****")
    }
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("access_key", &self.masked_access_key())
            .field("secret_key", &"****")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .finish()
    }
}

/// Everything read at startup. Built once, never mutated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub bucket: String,
    pub input_key: String,
    pub output_key: String,
}

impl AppConfig {
    /// Load configuration from the process environment, falling back to an env file.
    ///
    /// Process variables win over file entries. When `env_file` is `None` the
    /// default `.env` in the working directory is used if it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly given env file cannot be read, or if any
    /// required variable is missing or empty.
    pub fn load(env_file: Option<&Path>) -> Result<Self, ConfigError> {
        let file_values = match env_file {
            Some(path) => {
                let expanded = expand_tilde(path).map_err(ConfigError::Path)?;
                read_env_file(&expanded)?
            }
            None => {
                let default = PathBuf::from(DEFAULT_ENV_FILE);
                if default.is_file() {
                    read_env_file(&default)?
                } else {
                    HashMap::new()
                }
            }
        };

        Self::from_lookup(|name| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.is_empty())
                .or_else(|| file_values.get(name).cloned())
        })
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` naming the first required variable that
    /// the lookup does not supply (empty strings count as missing).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut values = HashMap::new();
        for name in REQUIRED_VARS {
            let value = lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))?;
            values.insert(name, value);
        }
        // every entry was inserted above
        let mut take = |name: &str| values.remove(name).unwrap_or_default();

        Ok(Self {
            storage: StorageConfig {
                access_key: take("ACCESS_KEY"),
                secret_key: take("SECRET_KEY"),
                endpoint: take("ENDPOINT_URL"),
                region: take("REGION"),
            },
            bucket: take("BUCKET_NAME"),
            input_key: take("INPUT_FILE_KEY"),
            output_key: take("OUTPUT_FILE_KEY"),
        })
    }
}

/// Read `KEY=VALUE` lines from a `.env` style file.
///
/// # Errors
///
/// Returns `ConfigError::EnvFile` if the file is missing or not parseable.
pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let conf =
        Ini::load_from_file_opt(path, env_parse_option()).map_err(|e| ConfigError::EnvFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    Ok(collect_general_section(&conf))
}

/// Same as [`read_env_file`] for in-memory content.
///
/// # Errors
///
/// Returns `ConfigError::EnvFile` if the content is not parseable.
pub fn parse_env_str(content: &str) -> Result<HashMap<String, String>, ConfigError> {
    let conf =
        Ini::load_from_str_opt(content, env_parse_option()).map_err(|e| ConfigError::EnvFile {
            path: PathBuf::from("<memory>"),
            reason: e.to_string(),
        })?;
    Ok(collect_general_section(&conf))
}

// Backslashes in secrets are literal
fn env_parse_option() -> ParseOption {
    ParseOption {
        enabled_escape: false,
        ..ParseOption::default()
    }
}

fn collect_general_section(conf: &Ini) -> HashMap<String, String> {
    conf.general_section()
        .iter()
        .map(|(k, v)| {
            let key = k.trim();
            let key = key.strip_prefix("export ").map_or(key, str::trim_start);
            (key.to_string(), v.trim().to_string())
        })
        .collect()
}
