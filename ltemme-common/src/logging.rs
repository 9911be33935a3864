//! Logging infrastructure
//!
//! Configurable `tracing` setup plus NAS message logging helpers and hex
//! formatting for debugging.

use std::fmt;
use tracing::Level;
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

/// Log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Trace level - most verbose
    Trace,
    /// Debug level
    Debug,
    /// Info level (default)
    #[default]
    Info,
    /// Warn level
    Warn,
    /// Error level - least verbose
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("unknown log level: {s}")),
        }
    }
}

/// Initialize the tracing subscriber with the specified log level.
///
/// `RUST_LOG` takes precedence when set. Calling this more than once is a
/// no-op.
///
/// # Example
///
/// ```
/// use ltemme_common::logging::{init_logging, LogLevel};
///
/// init_logging(LogLevel::Debug);
/// ```
pub fn init_logging(level: LogLevel) {
    init_logging_with_filter(&level.to_string());
}

/// Initialize logging with a custom filter string.
///
/// # Example
///
/// ```
/// use ltemme_common::logging::init_logging_with_filter;
///
/// // Default to info, but enable debug for the NAS codec
/// init_logging_with_filter("info,ltemme_nas=debug");
/// ```
pub fn init_logging_with_filter(filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_span_events(FmtSpan::NONE)
        .try_init();
}

/// Protocol direction for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageDirection {
    /// Incoming/received message
    Rx,
    /// Outgoing/transmitted message
    Tx,
}

impl fmt::Display for MessageDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageDirection::Rx => f.write_str("RX"),
            MessageDirection::Tx => f.write_str("TX"),
        }
    }
}

/// Log a NAS PDU at debug level with a hex dump at trace level.
///
/// # Example
///
/// ```
/// use ltemme_common::logging::{log_nas_message, MessageDirection};
///
/// let data = [0x07, 0x41, 0x71];
/// log_nas_message(MessageDirection::Rx, "Attach Request", &data);
/// ```
pub fn log_nas_message(direction: MessageDirection, msg_type: &str, data: &[u8]) {
    tracing::debug!(
        direction = %direction,
        msg_type = msg_type,
        len = data.len(),
        "{} NAS message",
        direction
    );
    tracing::trace!(hex = %HexDump(data), "NAS payload");
}

/// Wrapper for hex dump formatting
pub struct HexDump<'a>(pub &'a [u8]);

impl fmt::Display for HexDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Format bytes as a hex dump with offset, hex and ASCII columns.
///
/// ```
/// use ltemme_common::logging::format_hex_dump;
///
/// let dump = format_hex_dump(&[0x07, 0x41]);
/// assert!(dump.starts_with("00000000  07 41"));
/// ```
pub fn format_hex_dump(data: &[u8]) -> String {
    if data.is_empty() {
        return String::from("(empty)");
    }

    data.chunks(16)
        .enumerate()
        .map(|(row, chunk)| {
            let mut hex_col = String::with_capacity(50);
            for i in 0..16 {
                if i == 8 {
                    hex_col.push(' ');
                }
                match chunk.get(i) {
                    Some(b) => hex_col.push_str(&format!("{b:02x} ")),
                    None => hex_col.push_str("   "),
                }
            }
            let ascii: String = chunk
                .iter()
                .map(|b| if b.is_ascii_graphic() || *b == b' ' { *b as char } else { '.' })
                .collect();
            format!("{:08x}  {hex_col} |{ascii}|", row * 16)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
