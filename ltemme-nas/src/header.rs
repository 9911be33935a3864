//! EPS NAS message header structures
//!
//! Implements EPS NAS headers according to 3GPP TS 24.301 Section 9.
//!
//! Every PDU starts with one octet holding the protocol discriminator in the
//! low nibble. For EMM the high nibble is the security header type, for ESM
//! it is the EPS bearer identity.
//!
//! ## Plain EMM Header (2 bytes)
//! ```text
//! +------------------+------------------+
//! | SHT (4) | PD (4) |   Message Type   |
//! +------------------+------------------+
//! ```
//!
//! ## Plain ESM Header (3 bytes)
//! ```text
//! +------------------+------------------+------------------+
//! | EBI (4) | PD (4) |       PTI        |   Message Type   |
//! +------------------+------------------+------------------+
//! ```
//!
//! ## Security Protected Header (6 bytes)
//! ```text
//! +------------------+---------------------------------+------------------+
//! | SHT (4) | PD (4) |  Message Authentication Code (4)| Sequence Number  |
//! +------------------+---------------------------------+------------------+
//! ```
//!
//! ## Service Request (4 bytes, no payload)
//! ```text
//! +------------------+------------------+------------------------------------+
//! | 0xC     | PD (4) | KSI (3) | SQN (5)|          Short MAC (2)             |
//! +------------------+------------------+------------------------------------+
//! ```

use bytes::{Buf, BufMut};
use thiserror::Error;

use crate::codec::{join_nibbles, split_nibbles};
use crate::enums::{EmmMessageType, EsmMessageType, ProtocolDiscriminator, SecurityHeaderType};

/// NAS header decoding errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    #[error("Buffer too short: expected at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },
}

fn ensure_len<B: Buf>(buf: &B, expected: usize) -> Result<(), HeaderError> {
    if buf.remaining() < expected {
        return Err(HeaderError::TooShort {
            expected,
            actual: buf.remaining(),
        });
    }
    Ok(())
}

/// Extract (security header type, protocol discriminator) from octet 0.
///
/// Never reads past the first octet and never mutates the input.
pub fn parse_header(buf: &[u8]) -> Result<(SecurityHeaderType, ProtocolDiscriminator), HeaderError> {
    let first = *buf.first().ok_or(HeaderError::TooShort {
        expected: 1,
        actual: 0,
    })?;
    let (high, low) = split_nibbles(first);
    Ok((SecurityHeaderType::from(high), ProtocolDiscriminator::from(low)))
}

/// First octet of a NAS PDU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NasHeader {
    /// Security header type (EMM); Plain for ESM
    pub security_header_type: SecurityHeaderType,
    /// Protocol discriminator
    pub protocol_discriminator: ProtocolDiscriminator,
}

impl NasHeader {
    /// Create a header
    pub fn new(
        security_header_type: SecurityHeaderType,
        protocol_discriminator: ProtocolDiscriminator,
    ) -> Self {
        Self {
            security_header_type,
            protocol_discriminator,
        }
    }

    /// Header octet value
    pub fn octet(&self) -> u8 {
        join_nibbles(
            self.security_header_type.into(),
            self.protocol_discriminator.into(),
        )
    }

    /// Decode from the first octet of `buf`
    pub fn decode(buf: &[u8]) -> Result<Self, HeaderError> {
        let (security_header_type, protocol_discriminator) = parse_header(buf)?;
        Ok(Self::new(security_header_type, protocol_discriminator))
    }

    /// Encode the header octet
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(self.octet());
    }
}

/// Plain EMM header: header octet + message type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlainEmmHeader {
    /// Message type
    pub message_type: EmmMessageType,
}

impl PlainEmmHeader {
    /// Size of the plain EMM header in bytes
    pub const SIZE: usize = 2;

    /// Create a new plain EMM header
    pub fn new(message_type: EmmMessageType) -> Self {
        Self { message_type }
    }

    /// Encode header octet (Plain, EMM) and message type
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        NasHeader::new(
            SecurityHeaderType::Plain,
            ProtocolDiscriminator::EpsMobilityManagement,
        )
        .encode(buf);
        buf.put_u8(self.message_type.into());
    }
}

/// Plain ESM header: header octet (bearer identity + PD), PTI, message type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlainEsmHeader {
    /// EPS bearer identity (high nibble of octet 0)
    pub eps_bearer_identity: u8,
    /// Procedure transaction identity
    pub procedure_transaction_identity: u8,
    /// Message type
    pub message_type: EsmMessageType,
}

impl PlainEsmHeader {
    /// Size of the plain ESM header in bytes
    pub const SIZE: usize = 3;

    /// Create a new plain ESM header
    pub fn new(eps_bearer_identity: u8, procedure_transaction_identity: u8, message_type: EsmMessageType) -> Self {
        Self {
            eps_bearer_identity: eps_bearer_identity & 0x0F,
            procedure_transaction_identity,
            message_type,
        }
    }

    /// Encode the three header octets
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(join_nibbles(
            self.eps_bearer_identity,
            ProtocolDiscriminator::EpsSessionManagement.into(),
        ));
        buf.put_u8(self.procedure_transaction_identity);
        buf.put_u8(self.message_type.into());
    }
}

/// Security protected header of the full form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecuredHeader {
    /// Security header type (1 to 4)
    pub security_header_type: SecurityHeaderType,
    /// Protocol discriminator
    pub protocol_discriminator: ProtocolDiscriminator,
    /// Message authentication code
    pub mac: [u8; 4],
    /// NAS sequence number (low octet of COUNT)
    pub sequence_number: u8,
}

impl SecuredHeader {
    /// Size of the security protected header in bytes
    pub const SIZE: usize = 6;

    /// Decode the 6 header octets
    pub fn decode<B: Buf>(buf: &mut B) -> Result<Self, HeaderError> {
        ensure_len(buf, Self::SIZE)?;
        let (high, low) = split_nibbles(buf.get_u8());
        let mut mac = [0u8; 4];
        buf.copy_to_slice(&mut mac);
        let sequence_number = buf.get_u8();
        Ok(Self {
            security_header_type: SecurityHeaderType::from(high),
            protocol_discriminator: ProtocolDiscriminator::from(low),
            mac,
            sequence_number,
        })
    }

    /// Encode the 6 header octets
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        NasHeader::new(self.security_header_type, self.protocol_discriminator).encode(buf);
        buf.put_slice(&self.mac);
        buf.put_u8(self.sequence_number);
    }
}

/// SERVICE REQUEST header (security header type 0xC)
///
/// 3GPP TS 24.301 Section 8.2.25
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceRequestHeader {
    /// Protocol discriminator
    pub protocol_discriminator: ProtocolDiscriminator,
    /// KSI (3 bits)
    pub ksi: u8,
    /// Short sequence number (5 bits)
    pub sequence_number: u8,
    /// Last two octets of the MAC
    pub short_mac: [u8; 2],
}

impl ServiceRequestHeader {
    /// Size of the SERVICE REQUEST message in bytes
    pub const SIZE: usize = 4;

    /// Octets covered by the short MAC
    pub const MAC_INPUT_SIZE: usize = 2;

    /// Decode the 4 octets
    pub fn decode<B: Buf>(buf: &mut B) -> Result<Self, HeaderError> {
        ensure_len(buf, Self::SIZE)?;
        let (_, pd) = split_nibbles(buf.get_u8());
        let ksi_sqn = buf.get_u8();
        let mut short_mac = [0u8; 2];
        buf.copy_to_slice(&mut short_mac);
        Ok(Self {
            protocol_discriminator: ProtocolDiscriminator::from(pd),
            ksi: ksi_sqn >> 5,
            sequence_number: ksi_sqn & 0x1F,
            short_mac,
        })
    }

    /// Encode the 4 octets
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        NasHeader::new(SecurityHeaderType::ServiceRequest, self.protocol_discriminator).encode(buf);
        buf.put_u8(((self.ksi & 0x07) << 5) | (self.sequence_number & 0x1F));
        buf.put_slice(&self.short_mac);
    }
}
