//! # Configuration Management
//!
//! Protocol constants and the runtime configuration of the codec layer.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()` / `from_toml()`
//! - Environment variables via `from_env()`
//! - Direct instantiation with defaults
//!
//! The wire constants below are fixed by the Winny protocol and are not
//! configurable; changing any of them breaks compatibility with other nodes.

use crate::error::{ProtocolError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::Level;

/// Length prefix (4) plus opcode (1)
pub const HEADER_LEN: usize = 5;

/// Size of the little-endian length prefix
pub const LENGTH_FIELD_LEN: usize = 4;

/// Application name announced in the protocol header
pub const DEFAULT_MAJOR_VERSION: &str = "Winny Ver2.0b1 (poeny)";

/// Build number announced in the protocol header
pub const DEFAULT_MINOR_VERSION: u32 = 12710;

/// Fixed key obfuscating the protocol header payload ("98789asj")
pub const PROTOCOL_HEADER_KEY: [u8; 8] = [0x39, 0x38, 0x37, 0x38, 0x39, 0x61, 0x73, 0x6A];

/// Node hash key; its first byte is replaced by the address checksum
pub const NODE_HASH_KEY: [u8; 13] = [
    0x6F, 0x70, 0x69, 0x65, 0x77, 0x66, 0x36, 0x61, 0x73, 0x63, 0x78, 0x6C, 0x76,
];

/// Largest block of file data carried by one file response
pub const FILE_DATA_LIMIT: usize = 0x10000;

/// Default cap on a single frame accepted by the stream codec (receive buffer size)
pub const DEFAULT_MAX_FRAME_LENGTH: u32 = 0x10_0000;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ProtocolConfig {
    /// What this node announces in its protocol header
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Stream codec limits
    #[serde(default)]
    pub codec: CodecConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ProtocolConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables.
    ///
    /// Unset variables keep their defaults; a variable that is set but
    /// does not parse is an error.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(major) = std::env::var("WINNY_PROTOCOL_MAJOR_VERSION") {
            config.identity.major_version = major;
        }

        if let Ok(minor) = std::env::var("WINNY_PROTOCOL_MINOR_VERSION") {
            config.identity.minor_version = minor.parse::<u32>().map_err(|e| {
                ProtocolError::ConfigError(format!("Invalid WINNY_PROTOCOL_MINOR_VERSION: {e}"))
            })?;
        }

        if let Ok(max) = std::env::var("WINNY_PROTOCOL_MAX_FRAME_LENGTH") {
            config.codec.max_frame_length = max.parse::<u32>().map_err(|e| {
                ProtocolError::ConfigError(format!("Invalid WINNY_PROTOCOL_MAX_FRAME_LENGTH: {e}"))
            })?;
        }

        if let Ok(level) = std::env::var("WINNY_PROTOCOL_LOG_LEVEL") {
            config.logging.log_level = level.parse::<Level>().map_err(|e| {
                ProtocolError::ConfigError(format!("Invalid WINNY_PROTOCOL_LOG_LEVEL: {e}"))
            })?;
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Validate the configuration.
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.identity.validate());
        errors.extend(self.codec.validate());
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProtocolError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Values announced in this node's protocol header
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct IdentityConfig {
    /// Application name string
    pub major_version: String,

    /// Build number
    pub minor_version: u32,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            major_version: String::from(DEFAULT_MAJOR_VERSION),
            minor_version: DEFAULT_MINOR_VERSION,
        }
    }
}

impl IdentityConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.major_version.is_empty() {
            errors.push("Major version string cannot be empty".to_string());
        } else if self.major_version.len() > 255 {
            errors.push(format!(
                "Major version string too long: {} bytes (maximum: 255)",
                self.major_version.len()
            ));
        }

        if self.major_version.as_bytes().contains(&0) {
            errors.push("Major version string cannot contain NUL bytes".to_string());
        }

        errors
    }
}

/// Stream codec limits
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CodecConfig {
    /// Largest declared frame length (opcode + payload) the decoder will buffer
    pub max_frame_length: u32,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_frame_length: DEFAULT_MAX_FRAME_LENGTH,
        }
    }
}

impl CodecConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        // a full file response must always fit
        let minimum = (1 + 24 + FILE_DATA_LIMIT) as u32;
        if self.max_frame_length < minimum {
            errors.push(format!(
                "Max frame length too small: {} (minimum: {minimum})",
                self.max_frame_length
            ));
        } else if self.max_frame_length > 64 * 1024 * 1024 {
            errors.push(format!(
                "Max frame length too large: {} bytes (maximum recommended: 64 MB)",
                self.max_frame_length
            ));
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to log to console
    pub log_to_console: bool,

    /// Whether to log to file
    pub log_to_file: bool,

    /// Path to log file (if log_to_file is true)
    pub log_file_path: Option<String>,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("winny-protocol"),
            log_level: Level::INFO,
            log_to_console: true,
            log_to_file: false,
            log_file_path: None,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        if self.log_to_file {
            if let Some(ref path) = self.log_file_path {
                if let Some(parent) = std::path::Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        errors.push(format!(
                            "Log file directory does not exist: {}",
                            parent.display()
                        ));
                    }
                }
            } else {
                errors.push("log_file_path must be specified when log_to_file is true".to_string());
            }
        }

        if !self.log_to_console && !self.log_to_file {
            errors
                .push("At least one logging output (console or file) must be enabled".to_string());
        }

        errors
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
