//! # PMOSonos Configuration Module
//!
//! This module provides configuration management for PMOSonos, including:
//! - Loading configuration from YAML files
//! - Merging with embedded default configuration
//! - Environment variable overrides (including the legacy `ABS_*` variables)
//! - Type-safe getters and setters for configuration values
//!
//! The configuration is an explicit value: it is loaded once at startup and
//! handed to the constructors that need it.
//!
//! ## Usage
//!
//! ```no_run
//! use pmoconfig::Config;
//!
//! let config = Config::load_config("")?;
//! let port = config.get_http_port();
//! println!("HTTP port: {}", port);
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Result, anyhow};
use dirs::home_dir;
use serde_yaml::{Mapping, Number, Value};
use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};
use tracing::{info, warn};

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("pmosonos.yaml");

const ENV_CONFIG_DIR: &str = "PMOSONOS_CONFIG";
const ENV_PREFIX: &str = "PMOSONOS_CONFIG__";
const CONFIG_DIR_NAME: &str = ".pmosonos";
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Variables d'environnement historiques du pont et leur chemin dans la configuration
const LEGACY_ENV_VARS: &[(&str, &[&str])] = &[
    ("HTTP_PORT", &["host", "http_port"]),
    ("SOAP_URI", &["host", "base_url"]),
    ("LOG_LEVEL", &["host", "logger", "min_level"]),
    ("ABS_URI", &["audiobookshelf", "url"]),
    ("ABS_LIBRARY_ID", &["audiobookshelf", "library_id"]),
    ("ABS_TOKEN", &["audiobookshelf", "token"]),
];

// Default values for configuration
const DEFAULT_HTTP_PORT: u16 = 8080;
const DEFAULT_LOG_BUFFER_CAPACITY: usize = 1000;
const DEFAULT_LOG_MIN_LEVEL: &str = "INFO";
const DEFAULT_LOG_ENABLE_CONSOLE: bool = true;

/// Macro to generate getter/setter for usize values with default
macro_rules! impl_usize_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> usize {
            self.get_u64($path).map(|n| n as usize).unwrap_or($default)
        }

        pub fn $setter(&self, size: usize) -> Result<()> {
            self.set_value($path, Value::Number(Number::from(size)))
        }
    };
}

/// Macro to generate getter/setter for bool values with default
macro_rules! impl_bool_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> bool {
            self.get_bool($path).unwrap_or($default)
        }

        pub fn $setter(&self, value: bool) -> Result<()> {
            self.set_value($path, Value::Bool(value))
        }
    };
}

/// Configuration manager for PMOSonos
///
/// Values are looked up in two layers: the environment overrides first, then
/// the merged file/default configuration. Only the second layer is ever
/// written back to `config.yaml`, so secrets passed through the environment
/// never end up on disk.
///
/// # Examples
///
/// ```
/// use pmoconfig::Config;
///
/// let config = Config::from_yaml_str("host:\n  http_port: 9000\n")?;
/// assert_eq!(config.get_http_port(), 9000);
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug)]
pub struct Config {
    config_dir: Option<PathBuf>,
    path: Option<PathBuf>,
    data: Mutex<Value>,
    overrides: Value,
}

// Implémentation manuelle de Clone
impl Clone for Config {
    fn clone(&self) -> Self {
        let data = self.data().clone();
        Self {
            config_dir: self.config_dir.clone(),
            path: self.path.clone(),
            data: Mutex::new(data),
            overrides: self.overrides.clone(),
        }
    }
}

impl Config {
    /// Finds a config directory by trying different locations in order
    fn find_config_dir(directory: &str) -> PathBuf {
        // 1. Try provided directory
        if !directory.is_empty() {
            return PathBuf::from(directory);
        }

        // 2. Try environment variable
        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var = ENV_CONFIG_DIR, path = %env_path, "Trying to load config from env");
            return PathBuf::from(env_path);
        }

        // 3. Try current directory
        if Path::new(CONFIG_DIR_NAME).exists() {
            return PathBuf::from(CONFIG_DIR_NAME);
        }

        // 4. Try home directory
        if let Some(home) = home_dir() {
            let home_config = home.join(CONFIG_DIR_NAME);
            if home_config.exists() {
                return home_config;
            }
        }

        PathBuf::from(CONFIG_DIR_NAME)
    }

    /// Validates and prepares a config directory
    fn validate_config_dir(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }

        if !path.is_dir() {
            return Err(anyhow!(
                "Le chemin spécifié n'est pas un répertoire: {}",
                path.display()
            ));
        }

        // Test write permission
        let test_file = path.join(".write_test");
        fs::write(&test_file, b"test")?;
        fs::remove_file(&test_file)?;

        Ok(())
    }

    /// Determines and validates the configuration directory
    ///
    /// The directory is searched in the following order:
    /// 1. The provided `directory` parameter if not empty
    /// 2. The `PMOSONOS_CONFIG` environment variable
    /// 3. `.pmosonos` in the current directory
    /// 4. `.pmosonos` in the user's home directory
    ///
    /// The directory is created if it doesn't exist.
    pub fn config_dir(directory: &str) -> Result<PathBuf> {
        let dir_path = Self::find_config_dir(directory);
        Self::validate_config_dir(&dir_path)?;
        Ok(dir_path)
    }

    /// Loads the configuration from the specified directory
    ///
    /// This method:
    /// 1. Determines the configuration directory
    /// 2. Loads the default embedded configuration
    /// 3. Merges it with the external config.yaml file if present
    /// 4. Saves the merged configuration
    /// 5. Applies environment variable overrides (in memory only)
    pub fn load_config(directory: &str) -> Result<Self> {
        let config_dir = Self::config_dir(directory)?;
        info!(config_dir = %config_dir.display(), "Using config directory");

        let path = config_dir.join(CONFIG_FILE_NAME);
        let mut value = Self::default_value()?;

        match fs::read(&path) {
            Ok(yaml_data) => {
                info!(config_file = %path.display(), "Loaded config file");
                let external: Value = serde_yaml::from_slice(&yaml_data)?;
                merge_yaml(&mut value, &Self::lower_keys_value(external));
            }
            Err(_) => {
                info!(config_file = %path.display(), "Config file not found, using default embedded config");
            }
        }

        let config = Config {
            config_dir: Some(config_dir),
            path: Some(path),
            data: Mutex::new(value),
            overrides: Value::Mapping(Mapping::new()),
        };

        config.save()?;
        Ok(config.with_overrides(env::vars()))
    }

    /// Builds an in-memory configuration from a YAML document merged over the defaults
    ///
    /// Nothing is read from or written to disk, and the environment is ignored.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let mut value = Self::default_value()?;
        let external: Value = serde_yaml::from_str(yaml)?;
        merge_yaml(&mut value, &Self::lower_keys_value(external));

        Ok(Config {
            config_dir: None,
            path: None,
            data: Mutex::new(value),
            overrides: Value::Mapping(Mapping::new()),
        })
    }

    fn default_value() -> Result<Value> {
        let value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;
        Ok(Self::lower_keys_value(value))
    }

    /// Applies overrides taken from `(name, value)` pairs
    ///
    /// Recognised names are `PMOSONOS_CONFIG__SECTION__KEY` and the legacy
    /// variables (`HTTP_PORT`, `SOAP_URI`, `LOG_LEVEL`, `ABS_URI`,
    /// `ABS_LIBRARY_ID`, `ABS_TOKEN`). Values are parsed as YAML scalars.
    pub fn with_overrides<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let yaml_value = Self::convert_env_value(&value);

            if let Some(rest) = key.strip_prefix(ENV_PREFIX) {
                let key_path: Vec<String> = rest.split("__").map(str::to_lowercase).collect();
                let key_path: Vec<&str> = key_path.iter().map(String::as_str).collect();
                if let Err(e) = Self::set_value_internal(&mut self.overrides, &key_path, yaml_value) {
                    warn!(variable = %key, "Ignoring configuration override: {}", e);
                }
            } else if let Some((_, path)) = LEGACY_ENV_VARS.iter().find(|(name, _)| *name == key) {
                if let Err(e) = Self::set_value_internal(&mut self.overrides, path, yaml_value) {
                    warn!(variable = %key, "Ignoring configuration override: {}", e);
                }
            }
        }
        self
    }

    fn data(&self) -> MutexGuard<'_, Value> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Directory holding `config.yaml` (None for in-memory configurations)
    pub fn directory(&self) -> Option<&Path> {
        self.config_dir.as_deref()
    }

    /// Saves the current configuration to the config.yaml file
    ///
    /// In-memory configurations are not saved.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let yaml = serde_yaml::to_string(&*self.data())?;
        fs::write(path, yaml)?;
        Ok(())
    }

    /// Sets a configuration value at the specified path and saves it
    ///
    /// # Arguments
    ///
    /// * `path` - Array of keys representing the path (e.g., `&["host", "http_port"]`)
    /// * `value` - The YAML value to set
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        {
            let mut data = self.data();
            Self::set_value_internal(&mut data, path, value)?;
        }
        self.save()
    }

    fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
        if path.is_empty() {
            *data = value;
            return Ok(());
        }
        if let Value::Mapping(map) = data {
            let key_value = Value::String(path[0].to_lowercase());
            if path.len() == 1 {
                map.insert(key_value, value);
            } else {
                let entry = map
                    .entry(key_value)
                    .or_insert(Value::Mapping(Mapping::new()));
                Self::set_value_internal(entry, &path[1..], value)?;
            }
            Ok(())
        } else {
            Err(anyhow!("Current node is not a map"))
        }
    }

    /// Gets a configuration value at the specified path
    ///
    /// Environment overrides take precedence over the file configuration.
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        if let Ok(value) = Self::get_value_internal(&self.overrides, path) {
            if !value.is_null() {
                return Ok(value);
            }
        }
        Self::get_value_internal(&self.data(), path)
    }

    fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
        let mut current = data;
        for (i, key) in path.iter().enumerate() {
            if let Value::Mapping(map) = current {
                match map.get(Value::String(key.to_lowercase())) {
                    Some(next) => current = next,
                    None => return Err(anyhow!("Path {} does not exist", path[..=i].join("."))),
                }
            } else {
                return Err(anyhow!("Path {} is not a Config", path[..i].join(".")));
            }
        }
        Ok(current.clone())
    }

    /// Non-empty string value (numbers are converted to their textual form)
    pub fn get_string(&self, path: &[&str]) -> Option<String> {
        match self.get_value(path).ok()? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Unsigned integer value (numeric strings are accepted)
    pub fn get_u64(&self, path: &[&str]) -> Option<u64> {
        match self.get_value(path).ok()? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Boolean value (`"true"`/`"false"` strings are accepted)
    pub fn get_bool(&self, path: &[&str]) -> Option<bool> {
        match self.get_value(path).ok()? {
            Value::Bool(b) => Some(b),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn convert_env_value(value: &str) -> Value {
        match serde_yaml::from_str::<Value>(value) {
            Ok(parsed @ (Value::String(_) | Value::Number(_) | Value::Bool(_))) => parsed,
            _ => Value::String(value.to_string()),
        }
    }

    fn lower_keys_value(value: Value) -> Value {
        match value {
            Value::Mapping(map) => {
                let mut new_map = Mapping::new();
                for (k, v) in map {
                    let key = match k {
                        Value::String(s) => Value::String(s.to_lowercase()),
                        other => other,
                    };
                    new_map.insert(key, Self::lower_keys_value(v));
                }
                Value::Mapping(new_map)
            }
            Value::Sequence(seq) => {
                Value::Sequence(seq.into_iter().map(Self::lower_keys_value).collect())
            }
            _ => value,
        }
    }

    /// Gets the public base URL of the bridge
    ///
    /// Falls back to `http://localhost:{port}` when not configured.
    pub fn get_base_url(&self) -> String {
        match self.get_string(&["host", "base_url"]) {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => {
                let fallback = format!("http://localhost:{}", self.get_http_port());
                warn!("Base URL is not configured, using {}", fallback);
                fallback
            }
        }
    }

    /// Gets the HTTP port from configuration
    ///
    /// Returns the configured HTTP port, or the default port (8080) if not configured or invalid.
    pub fn get_http_port(&self) -> u16 {
        match self.get_u64(&["host", "http_port"]) {
            Some(port) if port > 0 && port <= u16::MAX as u64 => port as u16,
            Some(port) => {
                warn!(
                    "Invalid HTTP port '{}', using default {}",
                    port, DEFAULT_HTTP_PORT
                );
                DEFAULT_HTTP_PORT
            }
            None => DEFAULT_HTTP_PORT,
        }
    }

    /// Sets the HTTP port in configuration
    pub fn set_http_port(&self, port: u16) -> Result<()> {
        self.set_value(&["host", "http_port"], Value::Number(Number::from(port)))
    }

    impl_usize_config!(
        get_log_cache_size,
        set_log_cache_size,
        &["host", "logger", "buffer_capacity"],
        DEFAULT_LOG_BUFFER_CAPACITY
    );

    impl_bool_config!(
        get_log_enable_console,
        set_log_enable_console,
        &["host", "logger", "enable_console"],
        DEFAULT_LOG_ENABLE_CONSOLE
    );

    /// Récupère le niveau de log minimum depuis la configuration
    pub fn get_log_min_level(&self) -> String {
        self.get_string(&["host", "logger", "min_level"])
            .unwrap_or_else(|| DEFAULT_LOG_MIN_LEVEL.to_string())
    }

    /// Définit le niveau de log minimum dans la configuration
    pub fn set_log_min_level(&self, level: &str) -> Result<()> {
        self.set_value(&["host", "logger", "min_level"], Value::String(level.to_string()))
    }
}

/// Merges external YAML configuration into default configuration
///
/// - For mappings (objects), it merges keys from external into default
/// - For scalars and sequences, external values replace default values
/// - Null external values keep the default
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (_, Value::Null) => {}
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(), // pour les scalaires ou séquences, on remplace
    }
}
