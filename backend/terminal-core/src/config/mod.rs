//! Emulator configuration.
//!
//! Stored as `config.json` in the config directory. Every section defaults, so
//! an empty object, or no file at all, yields a working mock-backed terminal.

use crate::backend::remote::TlsFiles;
use crate::error::config::ConfigError;
use crate::{DEFAULT_BIND_ADDRESS, DEFAULT_WS_PORT, WS_PATH};

use common::ErrorLocation;

use std::panic::Location;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const CONFIG_VERSION: u32 = 1;

pub const ENV_CONFIG_DIR: &str = "TERMINAL_EMULATOR_CONFIG_DIR";
pub const ENV_PORT: &str = "TERMINAL_EMULATOR_PORT";
pub const ENV_BACKEND: &str = "TERMINAL_EMULATOR_BACKEND";
pub const ENV_HW_MULT: &str = "TERMINAL_EMULATOR_HW_MULT";
pub const ENV_CONSOLE: &str = "TERMINAL_EMULATOR_CONSOLE";

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            path: default_path(),
        }
    }
}

impl ServerConfig {
    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Business backend address. Absent means the in-memory mock.
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_tls_cert")]
    pub tls_cert: PathBuf,
    #[serde(default = "default_tls_key")]
    pub tls_key: PathBuf,
    #[serde(default = "default_tls_ca")]
    pub tls_ca: PathBuf,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            address: None,
            tls_cert: default_tls_cert(),
            tls_key: default_tls_key(),
            tls_ca: default_tls_ca(),
        }
    }
}

impl BackendConfig {
    pub fn tls_files(&self) -> TlsFiles {
        TlsFiles {
            cert: self.tls_cert.clone(),
            key: self.tls_key.clone(),
            ca: self.tls_ca.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareConfig {
    #[serde(default = "default_business_multiplier")]
    pub business_multiplier: f64,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            business_multiplier: default_business_multiplier(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default = "default_console_enabled")]
    pub enabled: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: default_console_enabled(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_directory")]
    pub directory: PathBuf,
    /// `error`, `warn`, `info`, `debug` or `trace`.
    #[serde(default)]
    pub level: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_log_directory(),
            level: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmulatorConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub hardware: HardwareConfig,

    #[serde(default)]
    pub console: ConsoleConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            server: ServerConfig::default(),
            backend: BackendConfig::default(),
            hardware: HardwareConfig::default(),
            console: ConsoleConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_bind_address() -> String {
    DEFAULT_BIND_ADDRESS.to_string()
}
fn default_port() -> u16 {
    DEFAULT_WS_PORT
}
fn default_path() -> String {
    WS_PATH.to_string()
}
fn default_tls_cert() -> PathBuf {
    PathBuf::from("./tls.crt")
}
fn default_tls_key() -> PathBuf {
    PathBuf::from("./tls.key")
}
fn default_tls_ca() -> PathBuf {
    PathBuf::from("./ca.crt")
}
fn default_business_multiplier() -> f64 {
    1.0
}
fn default_console_enabled() -> bool {
    true
}
fn default_log_directory() -> PathBuf {
    PathBuf::from("./logs")
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ============================================
// IMPLEMENTATION
// ============================================

impl EmulatorConfig {
    /// Directory holding `config.json`: `$TERMINAL_EMULATOR_CONFIG_DIR` or `.`.
    pub fn config_dir() -> PathBuf {
        std::env::var_os(ENV_CONFIG_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Load config from {config_dir}/config.json.
    ///
    /// # Returns
    ///
    /// Returns defaults if the file is missing.
    /// Returns `Err(ConfigError)` if the file exists but is corrupted/invalid.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read config file: {}", e);
            ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            }
        })?;

        let config: EmulatorConfig = serde_json::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config JSON: {}", e);
            ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Save config to {config_dir}/config.json using atomic write.
    ///
    /// Uses temp file + rename for atomicity (no corruption on crash).
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_dir.to_path_buf(),
            source: e,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{}.tmp", CONFIG_FILE_NAME));

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })?;

        std::fs::write(&temp_path, json).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_path.clone(),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |reason: String| ConfigError::ValidationError {
            location: ErrorLocation::from(Location::caller()),
            reason,
        };

        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(fail(format!(
                "Invalid version: {} (expected 1-{})",
                self.version, CONFIG_VERSION
            )));
        }

        if self.server.port == 0 {
            return Err(fail("server.port must be non-zero".to_string()));
        }

        if !self.server.path.starts_with('/') {
            return Err(fail(format!(
                "server.path must start with '/': {}",
                self.server.path
            )));
        }

        let multiplier = self.hardware.business_multiplier;
        if !(0.0..=10.0).contains(&multiplier) {
            return Err(fail(format!(
                "Invalid business multiplier: {multiplier} (must be 0.0-10.0)"
            )));
        }

        if let Some(ref address) = self.backend.address {
            if address.trim().is_empty() {
                return Err(fail("backend.address cannot be empty string".to_string()));
            }
        }

        Ok(())
    }

    /// Applies `TERMINAL_EMULATOR_*` overrides read through `lookup`, then
    /// re-validates.
    ///
    /// Pass `|name| std::env::var(name).ok()` for the process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let invalid = |variable: &str, value: &str, reason: &str| ConfigError::OverrideError {
            location: ErrorLocation::from(Location::caller()),
            variable: variable.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        };

        if let Some(value) = lookup(ENV_PORT) {
            self.server.port = value
                .trim()
                .parse()
                .map_err(|_| invalid(ENV_PORT, &value, "expected a port number"))?;
        }

        if let Some(value) = lookup(ENV_BACKEND) {
            let value = value.trim();
            self.backend.address = (!value.is_empty()).then(|| value.to_string());
        }

        if let Some(value) = lookup(ENV_HW_MULT) {
            self.hardware.business_multiplier = value
                .trim()
                .parse()
                .map_err(|_| invalid(ENV_HW_MULT, &value, "expected a number"))?;
        }

        if let Some(value) = lookup(ENV_CONSOLE) {
            self.console.enabled =
                parse_bool(&value).ok_or_else(|| invalid(ENV_CONSOLE, &value, "expected a boolean"))?;
        }

        self.validate()
    }
}
