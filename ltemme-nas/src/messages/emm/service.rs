//! Service Messages (3GPP TS 24.301 Section 8.2.24-8.2.25)
//!
//! The SERVICE REQUEST has no message type octet: its four octets are the
//! short security header itself, so it is decoded from the header by the
//! secure pipeline rather than from a message body.

use bytes::{Buf, BufMut};

use crate::codec::{read_u8, CodecResult, IeFormat, IeTable, OptionalIes};
use crate::header::ServiceRequestHeader;
use crate::ies::EmmCause;

/// Optional IEs of Service Reject
pub mod service_reject_iei {
    pub const T3442_VALUE: u8 = 0x5B;
    pub const T3346_VALUE: u8 = 0x5F;
}

const SERVICE_REJECT_IES: IeTable = &[
    (service_reject_iei::T3442_VALUE, IeFormat::Tv(1)),
    (service_reject_iei::T3346_VALUE, IeFormat::Tlv),
];

/// Service Request (short form)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceRequest {
    /// Key set identifier (3 bits)
    pub ksi: u8,
    /// Short sequence number (5 bits)
    pub sequence_number: u8,
    /// Short MAC
    pub short_mac: [u8; 2],
}

impl From<ServiceRequestHeader> for ServiceRequest {
    fn from(header: ServiceRequestHeader) -> Self {
        Self {
            ksi: header.ksi,
            sequence_number: header.sequence_number,
            short_mac: header.short_mac,
        }
    }
}

/// Service Reject message (network to UE)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceReject {
    /// EMM cause
    pub emm_cause: EmmCause,
    /// Optional IEs
    pub optional: OptionalIes,
}

impl ServiceReject {
    /// Create a Service Reject
    pub fn new(emm_cause: EmmCause) -> Self {
        Self {
            emm_cause,
            optional: OptionalIes::new(),
        }
    }

    /// Decode from bytes (after the message type)
    pub fn decode<B: Buf>(buf: &mut B) -> CodecResult<Self> {
        let emm_cause = EmmCause::from(read_u8(buf)?);
        let optional = OptionalIes::decode(buf, SERVICE_REJECT_IES)?;
        Ok(Self { emm_cause, optional })
    }

    /// Encode to bytes (after the message type)
    pub fn encode<B: BufMut>(&self, buf: &mut B) -> CodecResult<()> {
        buf.put_u8(self.emm_cause.into());
        self.optional.encode(buf)
    }

    /// T3442 timer value, if present
    pub fn t3442(&self) -> Option<u8> {
        self.optional
            .value(service_reject_iei::T3442_VALUE)
            .and_then(|value| value.first().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::ProtocolDiscriminator;

    #[test]
    fn test_service_request_from_header() {
        let header = ServiceRequestHeader {
            protocol_discriminator: ProtocolDiscriminator::EpsMobilityManagement,
            ksi: 5,
            sequence_number: 3,
            short_mac: [0xAB, 0xCD],
        };
        let request = ServiceRequest::from(header);
        assert_eq!(request.ksi, 5);
        assert_eq!(request.sequence_number, 3);
        assert_eq!(request.short_mac, [0xAB, 0xCD]);
    }

    #[test]
    fn test_service_reject() {
        let data: &[u8] = &[0x16, 0x5B, 0x22];
        let msg = ServiceReject::decode(&mut &data[..]).unwrap();
        assert_eq!(msg.emm_cause, EmmCause::Congestion);
        assert_eq!(msg.t3442(), Some(0x22));

        let mut out = Vec::new();
        msg.encode(&mut out).unwrap();
        assert_eq!(out, data);
    }
}
