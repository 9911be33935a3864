//! Test utility functions for integration tests
//!
//! Provides common utilities for test setup and logging.

use tracing_subscriber::{fmt, EnvFilter};

/// Result type for integration tests
pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Initialize logging for tests
///
/// Uses RUST_LOG environment variable if set, otherwise defaults to "info"
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Decode a hex string, ignoring whitespace
pub fn decode_hex(input: &str) -> TestResult<Vec<u8>> {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(hex::decode(cleaned)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_hex() {
        assert_eq!(decode_hex("07 41 71").unwrap(), vec![0x07, 0x41, 0x71]);
        assert!(decode_hex("7").is_err());
    }

    #[test]
    fn test_crate_roots_import_side_by_side() {
        use ltemme_common::*;
        use ltemme_nas::*;

        assert_eq!(MessageDirection::Tx.to_string(), "TX");
        assert_eq!(Direction::Downlink.index(), 1);
    }

    #[test]
    fn test_leaf_message_modules_are_public() {
        use ltemme_nas::ies::IdentityType;
        use ltemme_nas::messages::{self, emm, esm};

        let _: messages::AuthenticationReject = emm::authentication::AuthenticationReject;
        let _: messages::DetachAccept = emm::detach::DetachAccept;
        let _: messages::EsmInformationRequest = esm::information::EsmInformationRequest;
        let request: messages::IdentityRequest = emm::identity::IdentityRequest::new(IdentityType::Imsi);
        assert_eq!(request.identity_type, IdentityType::Imsi);
    }
}
