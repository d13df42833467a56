//! Configuration file management for certinfo.
//!
//! Settings are layered from defaults, an optional TOML file and the
//! command line, then resolved into the [`CheckOptions`] handed to the
//! collector and the report.
//!
//! # Configuration Precedence
//!
//! 1. Default values (lowest priority)
//! 2. Configuration file (certinfo.toml or specified with --config)
//! 3. Command-line arguments (highest priority)
//!
//! # Example Configuration File
//!
//! ```toml
//! hosts = ["example.com", "example.com:8443"]
//! port = 443
//! timeout = "5s"
//! expires = "168h"
//! output = "json"
//! verbose = false
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::duration::parse_duration;
use crate::output::OutputMode;
use crate::DEFAULT_PORT;

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "certinfo.toml";

/// Layered configuration.
///
/// All fields are optional so partial configurations can be merged.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// Hosts to inspect
    pub hosts: Option<Vec<String>>,
    /// Port used for hosts that do not name one
    pub port: Option<u16>,
    /// TCP dial and handshake timeout, e.g. "5s"
    pub timeout: Option<String>,
    /// Fail when a certificate expires within this window, e.g. "168h"; "0" disables
    pub expires: Option<String>,
    /// Output mode: json, text, none
    pub output: Option<String>,
    /// Log connections
    pub verbose: Option<bool>,
}

/// Settings used for one run, after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOptions {
    pub port: u16,
    pub timeout: Duration,
    pub expires: Duration,
    pub output: OutputMode,
    pub verbose: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        CheckOptions {
            port: DEFAULT_PORT,
            timeout: crate::collector::DEFAULT_TIMEOUT,
            expires: Duration::from_secs(7 * 24 * 3600),
            output: OutputMode::Text,
            verbose: false,
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully parsed configuration
    /// * `Err(ConfigError::Io)` - File could not be read
    /// * `Err(ConfigError::Parse)` - File contains invalid TOML
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;

        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        Ok(config)
    }

    /// Configuration holding the built-in defaults.
    ///
    /// # Default Values
    ///
    /// - `hosts`: None (must be provided)
    /// - `port`: 443
    /// - `timeout`: "5s"
    /// - `expires`: "168h" (7 days)
    /// - `output`: "text"
    /// - `verbose`: false
    pub fn defaults() -> Self {
        Config {
            hosts: None,
            port: Some(DEFAULT_PORT),
            timeout: Some("5s".to_string()),
            expires: Some("168h".to_string()),
            output: Some(OutputMode::Text.to_string()),
            verbose: Some(false),
        }
    }

    /// Merges this configuration with another, prioritizing the other's values.
    ///
    /// For each field, if the `other` config has a value (Some), it overrides
    /// this config's value. If the `other` value is None, keeps the current value.
    pub fn merge_with(mut self, other: Config) -> Self {
        if other.hosts.is_some() {
            self.hosts = other.hosts;
        }
        if other.port.is_some() {
            self.port = other.port;
        }
        if other.timeout.is_some() {
            self.timeout = other.timeout;
        }
        if other.expires.is_some() {
            self.expires = other.expires;
        }
        if other.output.is_some() {
            self.output = other.output;
        }
        if other.verbose.is_some() {
            self.verbose = other.verbose;
        }
        self
    }

    /// Validates the merged configuration.
    ///
    /// Returns the host arguments together with the options for the run.
    /// Unset fields fall back to the defaults.
    pub fn resolve(self) -> Result<(Vec<String>, CheckOptions), ConfigError> {
        let defaults = CheckOptions::default();

        let hosts = self.hosts.unwrap_or_default();
        if hosts.is_empty() {
            return Err(ConfigError::Validation("no hosts specified".to_string()));
        }

        let timeout = match self.timeout {
            Some(value) => parse_duration(&value)
                .map_err(|e| ConfigError::Validation(format!("timeout: {}", e)))?,
            None => defaults.timeout,
        };
        if timeout.is_zero() {
            return Err(ConfigError::Validation(
                "timeout: must be greater than zero".to_string(),
            ));
        }

        let expires = match self.expires {
            Some(value) => parse_duration(&value)
                .map_err(|e| ConfigError::Validation(format!("expires: {}", e)))?,
            None => defaults.expires,
        };

        let output = match self.output {
            Some(value) => value.parse::<OutputMode>().map_err(|_| {
                ConfigError::Validation(format!(
                    "output: unknown mode {:?} (expected json, text or none)",
                    value
                ))
            })?,
            None => defaults.output,
        };

        let options = CheckOptions {
            port: self.port.unwrap_or(defaults.port),
            timeout,
            expires,
            output,
            verbose: self.verbose.unwrap_or(defaults.verbose),
        };
        Ok((hosts, options))
    }

    /// Generates an example configuration file in TOML format.
    pub fn example_toml() -> String {
        let example = Config {
            hosts: Some(vec![
                "example.com".to_string(),
                "example.com:8443".to_string(),
                "https://secure.example.com:9443".to_string(),
            ]),
            port: Some(DEFAULT_PORT),
            timeout: Some("5s".to_string()),
            expires: Some("168h".to_string()),
            output: Some(OutputMode::Text.to_string()),
            verbose: Some(false),
        };

        toml::to_string_pretty(&example)
            .unwrap_or_else(|_| "# Error generating example".to_string())
    }
}

/// Errors that can occur during configuration loading and parsing.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error (file not found, permission denied, etc.)
    Io(String),
    /// TOML parsing error (invalid syntax, type mismatch, etc.)
    Parse(String),
    /// Validation error (missing hosts, bad durations, unknown output mode)
    Validation(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "IO Error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Parse Error: {}", msg),
            ConfigError::Validation(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
