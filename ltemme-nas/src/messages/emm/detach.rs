//! Detach Messages (3GPP TS 24.301 Section 8.2.10-8.2.11)
//!
//! Only the UE-originating direction is decoded; a network-originating
//! Detach Request shares the message type but carries a different body.

use bytes::{Buf, BufMut};

use crate::codec::{join_nibbles, read_lv, read_u8, split_nibbles, write_lv, CodecResult};
use crate::ies::{DetachType, MobileIdentity, NasKsi};

/// Detach Request message (UE originating detach)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetachRequest {
    /// NAS key set identifier (high nibble)
    pub nas_ksi: NasKsi,
    /// Detach type (low nibble)
    pub detach_type: DetachType,
    /// EPS mobile identity (LV)
    pub eps_mobile_identity: MobileIdentity,
}

impl DetachRequest {
    /// Decode from bytes (after the message type)
    pub fn decode<B: Buf>(buf: &mut B) -> CodecResult<Self> {
        let (ksi, detach_type) = split_nibbles(read_u8(buf)?);
        let eps_mobile_identity = MobileIdentity::decode_eps(&read_lv(buf)?)?;
        Ok(Self {
            nas_ksi: NasKsi::from_nibble(ksi),
            detach_type: DetachType::from_nibble(detach_type),
            eps_mobile_identity,
        })
    }

    /// Encode to bytes (after the message type)
    pub fn encode<B: BufMut>(&self, buf: &mut B) -> CodecResult<()> {
        buf.put_u8(join_nibbles(self.nas_ksi.to_nibble(), self.detach_type.to_nibble()));
        write_lv(buf, &self.eps_mobile_identity.encode_eps()?)
    }

    /// Returns true if the UE is switching off
    pub fn is_switch_off(&self) -> bool {
        self.detach_type.switch_off
    }
}

/// Detach Accept message (no IEs)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DetachAccept;

impl DetachAccept {
    /// Decode from bytes (after the message type)
    pub fn decode<B: Buf>(_buf: &mut B) -> CodecResult<Self> {
        Ok(Self)
    }

    /// Encode to bytes (after the message type)
    pub fn encode<B: BufMut>(&self, _buf: &mut B) -> CodecResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ies::Guti;

    #[test]
    fn test_detach_request_switch_off_with_guti() {
        let data: &[u8] = &[
            0x29, 0x0B, 0xF6, 0x00, 0xF1, 0x10, 0x00, 0x01, 0x01, 0xC0, 0x00, 0x00, 0x01,
        ];
        let msg = DetachRequest::decode(&mut &data[..]).unwrap();
        assert_eq!(msg.nas_ksi.ksi, 2);
        assert!(msg.is_switch_off());
        assert_eq!(msg.detach_type.value, 1);
        assert_eq!(
            msg.eps_mobile_identity,
            MobileIdentity::Guti(Guti {
                plmn: [0x00, 0xF1, 0x10],
                mme_group_id: 1,
                mme_code: 1,
                m_tmsi: 0xC000_0001,
            })
        );

        let mut out = Vec::new();
        msg.encode(&mut out).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_detach_request_missing_identity() {
        let data: &[u8] = &[0x71];
        assert!(DetachRequest::decode(&mut &data[..]).is_err());
    }

    #[test]
    fn test_detach_accept_is_empty() {
        let mut out = Vec::new();
        DetachAccept.encode(&mut out).unwrap();
        assert!(out.is_empty());
        assert_eq!(DetachAccept::decode(&mut &[0u8; 0][..]).unwrap(), DetachAccept);
    }
}
