//! Plain NAS message dispatch
//!
//! Routes plain EMM and ESM PDUs to their leaf codecs by message type.
//! A message type without a leaf codec is not an error: the message keeps
//! its tag and an empty body, and the caller decides what to do with it.
//! A leaf that fails to parse is kept the same way, with the codec error
//! recorded in the body.

use bytes::BufMut;
use tracing::{debug, warn};

use crate::codec::{read_u8, split_nibbles, CodecResult};
use crate::enums::{EmmMessageType, EsmMessageType, ProtocolDiscriminator, SecurityHeaderType};
use crate::error::{DecodeError, EncodeError};
use crate::header::{parse_header, NasHeader, PlainEmmHeader, PlainEsmHeader};
use crate::messages::{EmmBody, EmmMessage, EsmBody, EsmMessage, ServiceRequest};

/// Content of a decoded NAS PDU
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NasPayload {
    /// EPS mobility management message
    Emm(EmmMessage),
    /// EPS session management message
    Esm(EsmMessage),
    /// Short-form SERVICE REQUEST, which has no message type octet
    ServiceRequest(ServiceRequest),
}

/// A decoded NAS PDU
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericNasMessage {
    /// Header of the plain content (security header type Plain, except for
    /// the SERVICE REQUEST)
    pub header: NasHeader,
    /// Message content
    pub payload: NasPayload,
}

impl GenericNasMessage {
    /// The EMM message, if this is one
    pub fn emm(&self) -> Option<&EmmMessage> {
        match &self.payload {
            NasPayload::Emm(msg) => Some(msg),
            _ => None,
        }
    }

    /// The ESM message, if this is one
    pub fn esm(&self) -> Option<&EsmMessage> {
        match &self.payload {
            NasPayload::Esm(msg) => Some(msg),
            _ => None,
        }
    }
}

impl From<EmmMessage> for GenericNasMessage {
    fn from(msg: EmmMessage) -> Self {
        Self {
            header: NasHeader::new(SecurityHeaderType::Plain, ProtocolDiscriminator::EpsMobilityManagement),
            payload: NasPayload::Emm(msg),
        }
    }
}

impl From<EsmMessage> for GenericNasMessage {
    fn from(msg: EsmMessage) -> Self {
        Self {
            header: NasHeader::new(SecurityHeaderType::Plain, ProtocolDiscriminator::EpsSessionManagement),
            payload: NasPayload::Esm(msg),
        }
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode an EMM message starting at its message type octet.
///
/// Fails only when the message type itself is missing.
pub fn decode_emm(buf: &[u8]) -> CodecResult<EmmMessage> {
    let mut buf = buf;
    let message_type = EmmMessageType::from(read_u8(&mut buf)?);
    let body = match EmmBody::decode(message_type, &mut buf) {
        Some(Ok(body)) => body,
        Some(Err(e)) => {
            warn!(?message_type, error = %e, "Malformed EMM message body");
            EmmBody::Malformed(e)
        }
        None => {
            debug!(?message_type, "No decoder for EMM message type, body left empty");
            EmmBody::Empty
        }
    };
    Ok(EmmMessage { message_type, body })
}

/// Decode an ESM message starting at its procedure transaction identity.
///
/// `eps_bearer_identity` comes from the high nibble of the header octet.
pub fn decode_esm(eps_bearer_identity: u8, buf: &[u8]) -> CodecResult<EsmMessage> {
    let mut buf = buf;
    let procedure_transaction_identity = read_u8(&mut buf)?;
    let message_type = EsmMessageType::from(read_u8(&mut buf)?);
    let body = match EsmBody::decode(message_type, &mut buf) {
        Some(Ok(body)) => body,
        Some(Err(e)) => {
            warn!(?message_type, error = %e, "Malformed ESM message body");
            EsmBody::Malformed(e)
        }
        None => {
            debug!(?message_type, "No decoder for ESM message type, body left empty");
            EsmBody::Empty
        }
    };
    Ok(EsmMessage {
        eps_bearer_identity,
        procedure_transaction_identity,
        message_type,
        body,
    })
}

/// Decode a plain NAS PDU.
///
/// The protocol discriminator must be EMM or ESM. An EMM PDU must carry
/// security header type Plain; for ESM the high nibble is the EPS bearer
/// identity.
pub fn decode_nas(buf: &[u8]) -> Result<GenericNasMessage, DecodeError> {
    let (security_header_type, protocol_discriminator) = parse_header(buf)?;
    let (first, rest) = (buf[0], &buf[1..]);

    match protocol_discriminator {
        ProtocolDiscriminator::EpsMobilityManagement => {
            if security_header_type != SecurityHeaderType::Plain {
                return Err(DecodeError::NotPlain(security_header_type));
            }
            let msg = decode_emm(rest)?;
            Ok(msg.into())
        }
        ProtocolDiscriminator::EpsSessionManagement => {
            let (eps_bearer_identity, _) = split_nibbles(first);
            let msg = decode_esm(eps_bearer_identity, rest)?;
            Ok(msg.into())
        }
        ProtocolDiscriminator::Other(pd) => {
            debug!(pd, "Rejecting NAS PDU with unexpected protocol discriminator");
            Err(DecodeError::InvalidProtocolDiscriminator(pd))
        }
    }
}

/// Extract the ESM message from an ESM message container value.
pub fn decapsulate_esm(container: &[u8]) -> Result<EsmMessage, DecodeError> {
    let msg = decode_nas(container)?;
    match msg.payload {
        NasPayload::Esm(esm) => Ok(esm),
        _ => Err(DecodeError::InvalidProtocolDiscriminator(msg.header.protocol_discriminator.into())),
    }
}

// ============================================================================
// Encoding
// ============================================================================

/// Write the plain EMM header: header octet and message type.
pub fn encode_emm_header<B: BufMut>(buf: &mut B, message_type: EmmMessageType) {
    PlainEmmHeader::new(message_type).encode(buf);
}

/// Write the plain ESM header: bearer identity with discriminator, PTI and
/// message type.
pub fn encode_esm_header<B: BufMut>(
    buf: &mut B,
    eps_bearer_identity: u8,
    procedure_transaction_identity: u8,
    message_type: EsmMessageType,
) {
    PlainEsmHeader::new(eps_bearer_identity, procedure_transaction_identity, message_type).encode(buf);
}

/// Encode a plain EMM message.
pub fn encode_emm(msg: &EmmMessage) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::with_capacity(64);
    encode_emm_header(&mut buf, msg.message_type);
    msg.body.encode(&mut buf)?;
    Ok(buf)
}

/// Encode a plain ESM message.
pub fn encode_esm(msg: &EsmMessage) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::with_capacity(64);
    encode_esm_header(
        &mut buf,
        msg.eps_bearer_identity,
        msg.procedure_transaction_identity,
        msg.message_type,
    );
    msg.body.encode(&mut buf)?;
    Ok(buf)
}

/// Encode a full plain PDU: header, message type and body.
///
/// The SERVICE REQUEST only exists in secured form and gives `Unsupported`.
pub fn encode_plain(msg: &GenericNasMessage) -> Result<Vec<u8>, EncodeError> {
    match &msg.payload {
        NasPayload::Emm(emm) => encode_emm(emm),
        NasPayload::Esm(esm) => encode_esm(esm),
        NasPayload::ServiceRequest(_) => Err(EncodeError::Unsupported(SecurityHeaderType::ServiceRequest)),
    }
}

/// Encode an ESM message as the value of an ESM message container IE.
pub fn encapsulate_esm(msg: &EsmMessage) -> Result<Vec<u8>, EncodeError> {
    encode_esm(msg)
}

/// Whether a received EMM message must be integrity protected.
///
/// These are the messages a UE may send before a security context exists
/// (TS 24.301 Section 4.4.4.3).
pub fn is_auth_required(message_type: EmmMessageType) -> bool {
    !matches!(
        message_type,
        EmmMessageType::AttachRequest
            | EmmMessageType::IdentityResponse
            | EmmMessageType::AuthenticationResponse
            | EmmMessageType::AuthenticationFailure
            | EmmMessageType::SecurityModeReject
            | EmmMessageType::DetachRequest
            | EmmMessageType::DetachAccept
            | EmmMessageType::TrackingAreaUpdateRequest
            | EmmMessageType::ExtendedServiceRequest
    )
}
