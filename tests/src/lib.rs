//! Integration test framework for the ltemme NAS layer
#![allow(missing_docs)]
//!
//! This crate provides fixtures that pair an MME-side and a UE-side NAS
//! security context so complete exchanges can be driven through the codec.
//!
//! # Components
//!
//! - [`test_fixtures`] - Keys, session pairs and message builders
//! - [`test_utils`] - Logging setup and small helpers
//!
//! # Test Categories
//!
//! 1. **Attach with security mode** - plain attach, SMC, protected accept/complete
//! 2. **Replay protection** - replays, tampering, freshness window
//! 3. **Service request** - short-form SERVICE REQUEST and 5-bit SQN wrap
//! 4. **Algorithm matrix** - every EIA/EEA pair end to end

pub mod test_fixtures;
pub mod test_utils;

pub use test_fixtures::{attach_request, default_bearer_request, SessionPair, TestKeys, UE_CAPABILITY};
pub use test_utils::{decode_hex, init_test_logging, TestResult};
