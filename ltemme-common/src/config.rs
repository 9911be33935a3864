//! NAS layer configuration
//!
//! Loaded from YAML. The codec itself only ever sees plain values derived
//! from this (the freshness window and algorithm priority lists).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::logging::LogLevel;

/// Default replay freshness window for received sequence numbers.
pub const DEFAULT_FRESHNESS_WINDOW: u8 = 5;

/// NAS security and codec configuration.
///
/// # Example
///
/// ```
/// use ltemme_common::config::NasConfig;
///
/// let yaml = r#"
/// freshness_window: 8
/// integrity_priority: [EIA2, EIA1]
/// "#;
///
/// let config = NasConfig::from_yaml(yaml).unwrap();
/// assert_eq!(config.freshness_window, 8);
/// assert_eq!(config.integrity_ids().unwrap(), vec![2, 1]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NasConfig {
    /// Number of sequence numbers ahead of the expected one that are still
    /// accepted as fresh
    pub freshness_window: u8,
    /// Integrity algorithms in order of preference ("EIA0".."EIA3")
    pub integrity_priority: Vec<String>,
    /// Ciphering algorithms in order of preference ("EEA0".."EEA3")
    pub ciphering_priority: Vec<String>,
    /// Log level used when no filter is configured
    pub log_level: String,
    /// Optional `EnvFilter` directive string, e.g. `info,ltemme_nas=trace`
    pub log_filter: Option<String>,
}

impl Default for NasConfig {
    fn default() -> Self {
        Self {
            freshness_window: DEFAULT_FRESHNESS_WINDOW,
            integrity_priority: ["EIA2", "EIA1", "EIA3", "EIA0"].map(String::from).to_vec(),
            ciphering_priority: ["EEA0", "EEA2", "EEA1", "EEA3"].map(String::from).to_vec(),
            log_level: LogLevel::Info.to_string(),
            log_filter: None,
        }
    }
}

/// Parse an algorithm name such as `EIA2` into its numeric identifier.
fn parse_algorithm(name: &str, prefix: &str) -> Result<u8, Error> {
    let upper = name.trim().to_ascii_uppercase();
    upper
        .strip_prefix(prefix)
        .and_then(|n| n.parse::<u8>().ok())
        .filter(|id| *id <= 3)
        .ok_or_else(|| Error::Config(format!("unknown {prefix} algorithm: {name}")))
}

impl NasConfig {
    /// Parses a configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, Error> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Loads and validates a configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges and algorithm names.
    ///
    /// The freshness window must fit the 5-bit short sequence number space.
    pub fn validate(&self) -> Result<(), Error> {
        if self.freshness_window == 0 || self.freshness_window > 31 {
            return Err(Error::Config(format!(
                "freshness_window must be in 1..=31, got {}",
                self.freshness_window
            )));
        }
        if self.integrity_priority.is_empty() {
            return Err(Error::Config("integrity_priority must not be empty".into()));
        }
        if self.ciphering_priority.is_empty() {
            return Err(Error::Config("ciphering_priority must not be empty".into()));
        }
        self.integrity_ids()?;
        self.ciphering_ids()?;
        self.log_level
            .parse::<LogLevel>()
            .map_err(Error::Config)?;
        Ok(())
    }

    /// Integrity priority list as numeric EIA identifiers.
    pub fn integrity_ids(&self) -> Result<Vec<u8>, Error> {
        self.integrity_priority
            .iter()
            .map(|n| parse_algorithm(n, "EIA"))
            .collect()
    }

    /// Ciphering priority list as numeric EEA identifiers.
    pub fn ciphering_ids(&self) -> Result<Vec<u8>, Error> {
        self.ciphering_priority
            .iter()
            .map(|n| parse_algorithm(n, "EEA"))
            .collect()
    }

    /// The logging filter: `log_filter` if set, otherwise `log_level`.
    pub fn logging_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(&self.log_level)
    }
}
