//! Error types of the NAS codec and security pipeline

use thiserror::Error;

use crate::codec::CodecError;
use crate::count::CounterOverflow;
use crate::enums::SecurityHeaderType;
use crate::header::HeaderError;

/// Failures of `decode_nas` and `decode_secure`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Header cannot be parsed (empty or truncated buffer)
    #[error("Invalid NAS header: {0}")]
    HeaderInvalid(#[from] HeaderError),

    /// Ciphering required but no security context is established
    #[error("Security context not established")]
    ContextInvalid,

    /// The cipher produced output of a different length than its input
    #[error("Cipher output length {actual} differs from input length {expected}")]
    CipherLengthMismatch { expected: usize, actual: usize },

    /// Security header type not valid for the requested operation
    #[error("Unsupported security header type: {0:?}")]
    Unsupported(SecurityHeaderType),

    /// Protocol discriminator is neither EMM nor ESM
    #[error("Invalid protocol discriminator: 0x{0:X}")]
    InvalidProtocolDiscriminator(u8),

    /// A plain decode was given an EMM PDU with a security header
    #[error("Expected a plain NAS message, got {0:?}")]
    NotPlain(SecurityHeaderType),

    /// Message header fields after the first octet are truncated
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
}

/// Failures of `encode_secure` and the plain encoders
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// No security context is established
    #[error("Security context not established")]
    ContextInvalid,

    /// The cipher produced output of a different length than its input
    #[error("Cipher output length {actual} differs from input length {expected}")]
    CipherLengthMismatch { expected: usize, actual: usize },

    /// The downlink counter would pass its limit
    #[error("NAS COUNT overflow")]
    CounterOverflow,

    /// Security header type not valid for the requested operation
    #[error("Unsupported security header type: {0:?}")]
    Unsupported(SecurityHeaderType),

    /// A message body could not be encoded
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
}

impl From<CounterOverflow> for EncodeError {
    fn from(_: CounterOverflow) -> Self {
        EncodeError::CounterOverflow
    }
}

/// Failures of message authentication
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecurityError {
    /// Buffer too short for its security header form
    #[error("Invalid NAS header: {0}")]
    HeaderInvalid(#[from] HeaderError),

    /// Stale sequence number
    #[error("Replayed NAS sequence number {0}")]
    Replay(u8),

    /// MAC mismatch
    #[error("NAS message authentication failed")]
    AuthenticationRejected,

    /// No security context is established
    #[error("Security context not established")]
    ContextInvalid,

    /// Counter resynchronisation would pass its limit
    #[error("NAS COUNT overflow")]
    CounterOverflow,
}

impl From<CounterOverflow> for SecurityError {
    fn from(_: CounterOverflow) -> Self {
        SecurityError::CounterOverflow
    }
}
