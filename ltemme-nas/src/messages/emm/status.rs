//! EMM Status and EMM Information (3GPP TS 24.301 Section 8.2.13-8.2.14)

use bytes::{Buf, BufMut};

use crate::codec::{read_u8, CodecResult, IeFormat, IeTable, OptionalIes};
use crate::ies::EmmCause;

/// Optional IEs of EMM Information
pub mod emm_information_iei {
    pub const FULL_NAME_FOR_NETWORK: u8 = 0x43;
    pub const SHORT_NAME_FOR_NETWORK: u8 = 0x45;
    pub const LOCAL_TIME_ZONE: u8 = 0x46;
    pub const UNIVERSAL_TIME_AND_LOCAL_TIME_ZONE: u8 = 0x47;
    pub const NETWORK_DAYLIGHT_SAVING_TIME: u8 = 0x49;
}

const EMM_INFORMATION_IES: IeTable = &[
    (emm_information_iei::FULL_NAME_FOR_NETWORK, IeFormat::Tlv),
    (emm_information_iei::SHORT_NAME_FOR_NETWORK, IeFormat::Tlv),
    (emm_information_iei::LOCAL_TIME_ZONE, IeFormat::Tv(1)),
    (emm_information_iei::UNIVERSAL_TIME_AND_LOCAL_TIME_ZONE, IeFormat::Tv(7)),
    (emm_information_iei::NETWORK_DAYLIGHT_SAVING_TIME, IeFormat::Tlv),
];

/// EMM Status message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmmStatus {
    /// EMM cause
    pub emm_cause: EmmCause,
}

impl EmmStatus {
    /// Create an EMM Status
    pub fn new(emm_cause: EmmCause) -> Self {
        Self { emm_cause }
    }

    /// Decode from bytes (after the message type)
    pub fn decode<B: Buf>(buf: &mut B) -> CodecResult<Self> {
        Ok(Self {
            emm_cause: EmmCause::from(read_u8(buf)?),
        })
    }

    /// Encode to bytes (after the message type)
    pub fn encode<B: BufMut>(&self, buf: &mut B) -> CodecResult<()> {
        buf.put_u8(self.emm_cause.into());
        Ok(())
    }
}

/// EMM Information message (network to UE), all IEs optional
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EmmInformation {
    /// Optional IEs
    pub optional: OptionalIes,
}

impl EmmInformation {
    /// Decode from bytes (after the message type)
    pub fn decode<B: Buf>(buf: &mut B) -> CodecResult<Self> {
        Ok(Self {
            optional: OptionalIes::decode(buf, EMM_INFORMATION_IES)?,
        })
    }

    /// Encode to bytes (after the message type)
    pub fn encode<B: BufMut>(&self, buf: &mut B) -> CodecResult<()> {
        self.optional.encode(buf)
    }

    /// Full network name, raw network name IE value
    pub fn full_name(&self) -> Option<&[u8]> {
        self.optional.value(emm_information_iei::FULL_NAME_FOR_NETWORK)
    }

    /// Universal time and local time zone (7 octets, semi-octet BCD)
    pub fn universal_time(&self) -> Option<&[u8]> {
        self.optional
            .value(emm_information_iei::UNIVERSAL_TIME_AND_LOCAL_TIME_ZONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emm_status() {
        let msg = EmmStatus::decode(&mut &[0x61u8][..]).unwrap();
        assert_eq!(msg.emm_cause, EmmCause::MessageTypeNonExistent);
        let mut out = Vec::new();
        EmmStatus::new(EmmCause::Other(0xF0)).encode(&mut out).unwrap();
        assert_eq!(out, vec![0xF0]);
    }

    #[test]
    fn test_emm_information() {
        let data: &[u8] = &[
            0x43, 0x03, 0x80, 0x4F, 0x41, // full name
            0x46, 0x40, // local time zone
            0x47, 0x62, 0x01, 0x51, 0x21, 0x43, 0x65, 0x40, // universal time
        ];
        let msg = EmmInformation::decode(&mut &data[..]).unwrap();
        assert_eq!(msg.full_name(), Some(&[0x80, 0x4F, 0x41][..]));
        assert_eq!(msg.universal_time().map(<[u8]>::len), Some(7));
        assert_eq!(msg.optional.len(), 3);

        let mut out = Vec::new();
        msg.encode(&mut out).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_emm_information_truncated_tv() {
        let data: &[u8] = &[0x47, 0x62, 0x01];
        assert!(EmmInformation::decode(&mut &data[..]).is_err());
    }
}
