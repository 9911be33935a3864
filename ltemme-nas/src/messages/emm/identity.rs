//! Identity Messages (3GPP TS 24.301 Section 8.2.18-8.2.19)

use bytes::{Buf, BufMut};

use crate::codec::{read_lv, read_u8, write_lv, CodecResult};
use crate::ies::{IdentityType, MobileIdentity};

/// Identity Request message (network to UE)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityRequest {
    /// Requested identity (low nibble, spare half octet above)
    pub identity_type: IdentityType,
}

impl IdentityRequest {
    /// Create an Identity Request
    pub fn new(identity_type: IdentityType) -> Self {
        Self { identity_type }
    }

    /// Decode from bytes (after the message type)
    pub fn decode<B: Buf>(buf: &mut B) -> CodecResult<Self> {
        let octet = read_u8(buf)?;
        Ok(Self {
            identity_type: IdentityType::from(octet & 0x07),
        })
    }

    /// Encode to bytes (after the message type)
    pub fn encode<B: BufMut>(&self, buf: &mut B) -> CodecResult<()> {
        buf.put_u8(u8::from(self.identity_type) & 0x07);
        Ok(())
    }
}

/// Identity Response message (UE to network)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityResponse {
    /// Mobile identity (LV, TS 24.008 format)
    pub mobile_identity: MobileIdentity,
}

impl IdentityResponse {
    /// Decode from bytes (after the message type)
    pub fn decode<B: Buf>(buf: &mut B) -> CodecResult<Self> {
        Ok(Self {
            mobile_identity: MobileIdentity::decode(&read_lv(buf)?)?,
        })
    }

    /// Encode to bytes (after the message type)
    pub fn encode<B: BufMut>(&self, buf: &mut B) -> CodecResult<()> {
        write_lv(buf, &self.mobile_identity.encode()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_request() {
        let msg = IdentityRequest::decode(&mut &[0xF1u8][..]).unwrap();
        assert_eq!(msg.identity_type, IdentityType::Imsi);

        let mut out = Vec::new();
        IdentityRequest::new(IdentityType::Imeisv).encode(&mut out).unwrap();
        assert_eq!(out, vec![0x03]);
    }

    #[test]
    fn test_identity_response_imeisv() {
        // IMEISV 3534900698733201 (16 digits, even)
        let data: &[u8] = &[0x09, 0x33, 0x35, 0x94, 0x00, 0x96, 0x78, 0x33, 0x02, 0xF1];
        let msg = IdentityResponse::decode(&mut &data[..]).unwrap();
        assert_eq!(msg.mobile_identity, MobileIdentity::Imeisv("3534900698733201".into()));

        let mut out = Vec::new();
        msg.encode(&mut out).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_identity_response_tmsi() {
        let data: &[u8] = &[0x05, 0xF4, 0x12, 0x34, 0x56, 0x78];
        let msg = IdentityResponse::decode(&mut &data[..]).unwrap();
        assert_eq!(msg.mobile_identity, MobileIdentity::Tmsi(0x1234_5678));
    }
}
