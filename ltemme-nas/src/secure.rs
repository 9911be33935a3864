//! Secured NAS message pipeline
//!
//! Each call is one transition over the security header type of a PDU:
//!
//! - [`authenticate`] checks freshness and MAC of a received PDU and, when
//!   both pass, resynchronises the receive counter.
//! - [`decode_secure`] strips the security header, deciphers if needed and
//!   hands the plain content to [`crate::dispatch::decode_nas`]. It does not
//!   verify the MAC; callers run [`authenticate`] first.
//! - [`encode_secure`] ciphers, MACs and frames a plain PDU, then advances
//!   the downlink counter.
//!
//! Full-form layout: `[header][MAC:4][SQN][payload]`, MAC over SQN and
//! payload. The SERVICE REQUEST is `[0xC|PD][KSI:3|SQN:5][short MAC:2]`,
//! its short MAC being the last two octets of the MAC over the first two.

use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, trace, warn};

use crate::count::{estimate_full, estimate_short};
use crate::dispatch::{decode_nas, GenericNasMessage, NasPayload};
use crate::enums::{Direction, ProtocolDiscriminator, SecurityHeaderType};
use crate::error::{DecodeError, EncodeError, SecurityError};
use crate::header::{parse_header, NasHeader, SecuredHeader, ServiceRequestHeader};
use crate::messages::ServiceRequest;
use crate::security::SecurityContext;

/// Outcome of [`authenticate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthResult {
    /// Not a secured PDU (plain or reserved security header type)
    NotApplicable,
    /// Sequence number outside the freshness window
    Replay(u8),
    /// MAC verified (or null integrity); the counter was resynchronised
    Authenticated,
    /// MAC mismatch
    Rejected,
}

impl AuthResult {
    /// Map replay and MAC failures onto [`SecurityError`].
    ///
    /// `NotApplicable` passes; whether a plain message is acceptable is the
    /// caller's decision (see [`crate::dispatch::is_auth_required`]).
    pub fn into_result(self) -> Result<(), SecurityError> {
        match self {
            AuthResult::NotApplicable | AuthResult::Authenticated => Ok(()),
            AuthResult::Replay(sqn) => Err(SecurityError::Replay(sqn)),
            AuthResult::Rejected => Err(SecurityError::AuthenticationRejected),
        }
    }

    /// Returns true if the PDU was authenticated
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthResult::Authenticated)
    }
}

/// Verify a received secured PDU against `ctx`.
///
/// On success the receive counter for `direction` is resynchronised to the
/// received sequence number. Replays and MAC failures leave the context
/// untouched.
pub fn authenticate(ctx: &mut SecurityContext, buf: &[u8], direction: Direction) -> Result<AuthResult, SecurityError> {
    if !ctx.is_valid() {
        return Err(SecurityError::ContextInvalid);
    }
    let (security_header_type, _) = parse_header(buf)?;

    if security_header_type.is_integrity_protected() {
        let header = SecuredHeader::decode(&mut &buf[..])?;
        let sqn = header.sequence_number;
        if !ctx.counters().is_fresh_full(direction, sqn) {
            debug!(?direction, sqn, count = ctx.count(direction), "NAS sequence number is not fresh");
            return Ok(AuthResult::Replay(sqn));
        }

        let count = estimate_full(ctx.count(direction), sqn);
        // MAC covers the sequence number and the payload
        let protected = &buf[SecuredHeader::SIZE - 1..];
        let mac = ctx.compute_mac(count, direction, protected, protected.len() * 8);
        if !ctx.is_null_integrity() && mac != header.mac {
            debug!(?direction, sqn, count, "NAS MAC mismatch");
            return Ok(AuthResult::Rejected);
        }

        ctx.counters_mut().accept_full(direction, sqn)?;
        trace!(?direction, count, "NAS message authenticated");
        Ok(AuthResult::Authenticated)
    } else if security_header_type == SecurityHeaderType::ServiceRequest {
        let header = ServiceRequestHeader::decode(&mut &buf[..])?;
        let sqn = header.sequence_number;
        if !ctx.counters().is_fresh_short(direction, sqn) {
            debug!(?direction, sqn, count = ctx.count(direction), "SERVICE REQUEST sequence number is not fresh");
            return Ok(AuthResult::Replay(sqn));
        }

        let count = estimate_short(ctx.count(direction), sqn);
        let protected = &buf[..ServiceRequestHeader::MAC_INPUT_SIZE];
        let mac = ctx.compute_mac(count, direction, protected, protected.len() * 8);
        if !ctx.is_null_integrity() && mac[2..] != header.short_mac {
            debug!(?direction, sqn, count, "SERVICE REQUEST short MAC mismatch");
            return Ok(AuthResult::Rejected);
        }

        ctx.counters_mut().accept_short(direction, sqn)?;
        trace!(?direction, count, "SERVICE REQUEST authenticated");
        Ok(AuthResult::Authenticated)
    } else {
        Ok(AuthResult::NotApplicable)
    }
}

/// Decode a secured PDU into its plain message.
///
/// Integrity-only PDUs need no context. Ciphered PDUs and the SERVICE
/// REQUEST need a valid one; ciphered content is deciphered with the COUNT
/// formed from the stored counter's high bits and the received SQN.
pub fn decode_secure(
    ctx: &SecurityContext,
    buf: &[u8],
    direction: Direction,
) -> Result<GenericNasMessage, DecodeError> {
    let (security_header_type, protocol_discriminator) = parse_header(buf)?;

    match security_header_type {
        SecurityHeaderType::IntegrityProtected | SecurityHeaderType::IntegrityProtectedWithNewEpsSecurityContext => {
            SecuredHeader::decode(&mut &buf[..])?;
            decode_nas(&buf[SecuredHeader::SIZE..])
        }
        SecurityHeaderType::IntegrityProtectedAndCiphered
        | SecurityHeaderType::IntegrityProtectedAndCipheredWithNewEpsSecurityContext => {
            if !ctx.is_valid() {
                return Err(DecodeError::ContextInvalid);
            }
            let header = SecuredHeader::decode(&mut &buf[..])?;
            let count = (ctx.last_count(direction) & 0x00FF_FF00) | u32::from(header.sequence_number);
            let ciphertext = &buf[SecuredHeader::SIZE..];
            let plaintext = ctx.decrypt(count, direction, ciphertext);
            if plaintext.len() != ciphertext.len() {
                return Err(DecodeError::CipherLengthMismatch {
                    expected: ciphertext.len(),
                    actual: plaintext.len(),
                });
            }
            decode_nas(&plaintext)
        }
        SecurityHeaderType::ServiceRequest => {
            if !ctx.is_valid() {
                return Err(DecodeError::ContextInvalid);
            }
            let header = ServiceRequestHeader::decode(&mut &buf[..])?;
            Ok(GenericNasMessage {
                header: NasHeader::new(SecurityHeaderType::ServiceRequest, protocol_discriminator),
                payload: NasPayload::ServiceRequest(ServiceRequest::from(header)),
            })
        }
        other => Err(DecodeError::Unsupported(other)),
    }
}

/// Secure a plain PDU with an explicit COUNT, leaving the counters alone.
pub fn protect(
    ctx: &SecurityContext,
    protocol_discriminator: ProtocolDiscriminator,
    security_header_type: SecurityHeaderType,
    direction: Direction,
    count: u32,
    plaintext: &[u8],
) -> Result<Bytes, EncodeError> {
    if !ctx.is_valid() {
        return Err(EncodeError::ContextInvalid);
    }
    if !security_header_type.is_integrity_protected() {
        return Err(EncodeError::Unsupported(security_header_type));
    }

    let mut protected = BytesMut::with_capacity(1 + plaintext.len());
    protected.put_u8(count as u8);
    if security_header_type.is_ciphered() {
        let ciphertext = ctx.encrypt(count, direction, plaintext);
        if ciphertext.len() != plaintext.len() {
            return Err(EncodeError::CipherLengthMismatch {
                expected: plaintext.len(),
                actual: ciphertext.len(),
            });
        }
        protected.put_slice(&ciphertext);
    } else {
        protected.put_slice(plaintext);
    }
    let mac = ctx.compute_mac(count, direction, &protected, protected.len() * 8);

    let mut out = BytesMut::with_capacity(SecuredHeader::SIZE + plaintext.len());
    NasHeader::new(security_header_type, protocol_discriminator).encode(&mut out);
    out.put_slice(&mac);
    out.put_slice(&protected);
    Ok(out.freeze())
}

/// Secure a plain PDU with the current COUNT for `direction`.
///
/// The downlink counter is advanced afterwards whatever `direction` is;
/// callers protecting uplink traffic use [`protect`] and manage the uplink
/// counter themselves.
pub fn encode_secure(
    ctx: &mut SecurityContext,
    protocol_discriminator: ProtocolDiscriminator,
    security_header_type: SecurityHeaderType,
    direction: Direction,
    plaintext: &[u8],
) -> Result<Bytes, EncodeError> {
    let count = ctx.count(direction);
    let pdu = protect(ctx, protocol_discriminator, security_header_type, direction, count, plaintext)?;
    if direction == Direction::Uplink {
        warn!(count, "encode_secure used for uplink; advancing the downlink counter");
    }
    ctx.counters_mut().increment(Direction::Downlink)?;
    trace!(?direction, count, len = pdu.len(), "NAS message secured");
    Ok(pdu)
}

/// Build a SERVICE REQUEST for `count` (uplink, EMM).
pub fn encode_service_request(ctx: &SecurityContext, ksi: u8, count: u32) -> Result<Bytes, EncodeError> {
    if !ctx.is_valid() {
        return Err(EncodeError::ContextInvalid);
    }
    let mut header = ServiceRequestHeader {
        protocol_discriminator: ProtocolDiscriminator::EpsMobilityManagement,
        ksi: ksi & 0x07,
        sequence_number: (count & 0x1F) as u8,
        short_mac: [0; 2],
    };
    let mut out = BytesMut::with_capacity(ServiceRequestHeader::SIZE);
    header.encode(&mut out);
    let mac = ctx.compute_mac(
        count,
        Direction::Uplink,
        &out[..ServiceRequestHeader::MAC_INPUT_SIZE],
        ServiceRequestHeader::MAC_INPUT_SIZE * 8,
    );
    header.short_mac = [mac[2], mac[3]];
    out.clear();
    header.encode(&mut out);
    Ok(out.freeze())
}
