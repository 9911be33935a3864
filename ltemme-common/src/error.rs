//! Error types shared by the ltemme crates

use thiserror::Error;

/// Error types for configuration and tooling around the NAS codec.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing errors.
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Invalid hexadecimal input.
    #[error("Hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),
}
