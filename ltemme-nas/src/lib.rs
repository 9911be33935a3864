//! EPS NAS security context and message codec
//!
//! Implements the MME side of the EPS NAS layer as defined in 3GPP TS 24.301
//! and TS 33.401:
//! - NAS COUNT management with replay protection
//! - Integrity (EIA0-3) and ciphering (EEA0-3) dispatch
//! - EMM/ESM message decoding and encoding
//! - The secured message pipeline tying them together
//!
//! # Message Structure
//!
//! - [`PlainEmmHeader`]: plain EMM header (2 bytes)
//! - [`PlainEsmHeader`]: plain ESM header (3 bytes)
//! - [`SecuredHeader`]: security protected header (6 bytes)
//! - [`ServiceRequestHeader`]: short-form SERVICE REQUEST (4 bytes)
//!
//! # Example
//!
//! ```rust
//! use ltemme_nas::algorithms::{EeaId, EiaId};
//! use ltemme_nas::enums::{Direction, ProtocolDiscriminator, SecurityHeaderType};
//! use ltemme_nas::secure::{authenticate, decode_secure, encode_secure, AuthResult};
//! use ltemme_nas::security::SecurityContext;
//!
//! let kasme = [0x11u8; 32];
//! let mut mme = SecurityContext::new();
//! mme.establish(&kasme, EiaId::Eia2, EeaId::Eea2);
//! let mut ue = mme.clone();
//!
//! // EMM STATUS, cause 0x16
//! let plain = [0x07, 0x60, 0x16];
//! let pdu = encode_secure(
//!     &mut mme,
//!     ProtocolDiscriminator::EpsMobilityManagement,
//!     SecurityHeaderType::IntegrityProtectedAndCiphered,
//!     Direction::Downlink,
//!     &plain,
//! )
//! .unwrap();
//!
//! assert_eq!(authenticate(&mut ue, &pdu, Direction::Downlink).unwrap(), AuthResult::Authenticated);
//! let msg = decode_secure(&ue, &pdu, Direction::Downlink).unwrap();
//! assert!(msg.emm().is_some());
//! ```

pub mod algorithms;
pub mod codec;
pub mod count;
pub mod dispatch;
pub mod enums;
pub mod error;
pub mod header;
pub mod ies;
pub mod messages;
pub mod secure;
pub mod security;

// Re-export commonly used types
pub use algorithms::{EeaId, EiaId};
pub use codec::{CodecError, CodecResult};
pub use count::{CounterManager, CounterOverflow, COUNT_MAX, DEFAULT_FRESHNESS_WINDOW};
pub use dispatch::{decode_nas, encode_plain, is_auth_required, GenericNasMessage, NasPayload};
pub use enums::{Direction, EmmMessageType, EsmMessageType, ProtocolDiscriminator, SecurityHeaderType};
pub use error::{DecodeError, EncodeError, SecurityError};
pub use header::{
    parse_header, HeaderError, NasHeader, PlainEmmHeader, PlainEsmHeader, SecuredHeader, ServiceRequestHeader,
};
pub use secure::{authenticate, decode_secure, encode_secure, AuthResult};
pub use security::SecurityContext;
