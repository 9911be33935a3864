//! Common types and utilities for the ltemme crates
//!
//! Configuration, logging setup and the shared error type used by the
//! command line tool and the integration tests.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{NasConfig, DEFAULT_FRESHNESS_WINDOW};
pub use error::Error;
pub use logging::{
    format_hex_dump, init_logging, init_logging_with_filter, log_nas_message, HexDump, LogLevel,
    MessageDirection,
};
