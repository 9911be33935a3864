//! Attach Messages (3GPP TS 24.301 Section 8.2.1-8.2.4)
//!
//! - Attach Request (UE to network)
//! - Attach Accept (network to UE)
//! - Attach Complete (UE to network)
//! - Attach Reject (network to UE)

use bytes::{Buf, BufMut};

use crate::codec::{
    join_nibbles, read_lv, read_lv_e, read_u8, split_nibbles, write_lv, write_lv_e, CodecResult, IeFormat,
    IeTable, OptionalIe, OptionalIes,
};
use crate::ies::{EmmCause, EpsAttachType, MobileIdentity, NasKsi, Tai, UeNetworkCapability};

// ============================================================================
// IEI Constants
// ============================================================================

/// Optional IEs of Attach Request
pub mod attach_request_iei {
    pub const OLD_PTMSI_SIGNATURE: u8 = 0x19;
    pub const ADDITIONAL_GUTI: u8 = 0x50;
    pub const LAST_VISITED_TAI: u8 = 0x52;
    pub const DRX_PARAMETER: u8 = 0x5C;
    pub const MS_NETWORK_CAPABILITY: u8 = 0x31;
    pub const OLD_LAI: u8 = 0x13;
    pub const TMSI_STATUS: u8 = 0x90;
    pub const MS_CLASSMARK_2: u8 = 0x11;
    pub const MS_CLASSMARK_3: u8 = 0x20;
    pub const SUPPORTED_CODECS: u8 = 0x40;
    pub const ADDITIONAL_UPDATE_TYPE: u8 = 0xF0;
    pub const VOICE_DOMAIN_PREFERENCE: u8 = 0x5D;
    pub const DEVICE_PROPERTIES: u8 = 0xD0;
    pub const OLD_GUTI_TYPE: u8 = 0xE0;
    pub const MS_NETWORK_FEATURE_SUPPORT: u8 = 0xC0;
    pub const TMSI_BASED_NRI_CONTAINER: u8 = 0x10;
    pub const T3324_VALUE: u8 = 0x6A;
    pub const T3412_EXTENDED_VALUE: u8 = 0x5E;
    pub const EXTENDED_DRX_PARAMETERS: u8 = 0x6E;
}

const ATTACH_REQUEST_IES: IeTable = &[
    (attach_request_iei::OLD_PTMSI_SIGNATURE, IeFormat::Tv(3)),
    (attach_request_iei::ADDITIONAL_GUTI, IeFormat::Tlv),
    (attach_request_iei::LAST_VISITED_TAI, IeFormat::Tv(Tai::SIZE)),
    (attach_request_iei::DRX_PARAMETER, IeFormat::Tv(2)),
    (attach_request_iei::MS_NETWORK_CAPABILITY, IeFormat::Tlv),
    (attach_request_iei::OLD_LAI, IeFormat::Tv(5)),
    (attach_request_iei::TMSI_STATUS, IeFormat::HalfOctet),
    (attach_request_iei::MS_CLASSMARK_2, IeFormat::Tlv),
    (attach_request_iei::MS_CLASSMARK_3, IeFormat::Tlv),
    (attach_request_iei::SUPPORTED_CODECS, IeFormat::Tlv),
    (attach_request_iei::ADDITIONAL_UPDATE_TYPE, IeFormat::HalfOctet),
    (attach_request_iei::VOICE_DOMAIN_PREFERENCE, IeFormat::Tlv),
    (attach_request_iei::DEVICE_PROPERTIES, IeFormat::HalfOctet),
    (attach_request_iei::OLD_GUTI_TYPE, IeFormat::HalfOctet),
    (attach_request_iei::MS_NETWORK_FEATURE_SUPPORT, IeFormat::HalfOctet),
    (attach_request_iei::TMSI_BASED_NRI_CONTAINER, IeFormat::Tlv),
    (attach_request_iei::T3324_VALUE, IeFormat::Tlv),
    (attach_request_iei::T3412_EXTENDED_VALUE, IeFormat::Tlv),
    (attach_request_iei::EXTENDED_DRX_PARAMETERS, IeFormat::Tlv),
];

/// Optional IEs of Attach Accept
pub mod attach_accept_iei {
    pub const GUTI: u8 = 0x50;
    pub const LAI: u8 = 0x13;
    pub const MS_IDENTITY: u8 = 0x23;
    pub const EMM_CAUSE: u8 = 0x53;
    pub const T3402_VALUE: u8 = 0x17;
    pub const T3423_VALUE: u8 = 0x59;
    pub const EQUIVALENT_PLMNS: u8 = 0x4A;
    pub const EMERGENCY_NUMBER_LIST: u8 = 0x34;
    pub const EPS_NETWORK_FEATURE_SUPPORT: u8 = 0x64;
    pub const ADDITIONAL_UPDATE_RESULT: u8 = 0xF0;
    pub const T3412_EXTENDED_VALUE: u8 = 0x5E;
    pub const T3324_VALUE: u8 = 0x6A;
    pub const EXTENDED_DRX_PARAMETERS: u8 = 0x6E;
}

const ATTACH_ACCEPT_IES: IeTable = &[
    (attach_accept_iei::GUTI, IeFormat::Tlv),
    (attach_accept_iei::LAI, IeFormat::Tv(5)),
    (attach_accept_iei::MS_IDENTITY, IeFormat::Tlv),
    (attach_accept_iei::EMM_CAUSE, IeFormat::Tv(1)),
    (attach_accept_iei::T3402_VALUE, IeFormat::Tv(1)),
    (attach_accept_iei::T3423_VALUE, IeFormat::Tv(1)),
    (attach_accept_iei::EQUIVALENT_PLMNS, IeFormat::Tlv),
    (attach_accept_iei::EMERGENCY_NUMBER_LIST, IeFormat::Tlv),
    (attach_accept_iei::EPS_NETWORK_FEATURE_SUPPORT, IeFormat::Tlv),
    (attach_accept_iei::ADDITIONAL_UPDATE_RESULT, IeFormat::HalfOctet),
    (attach_accept_iei::T3412_EXTENDED_VALUE, IeFormat::Tlv),
    (attach_accept_iei::T3324_VALUE, IeFormat::Tlv),
    (attach_accept_iei::EXTENDED_DRX_PARAMETERS, IeFormat::Tlv),
];

/// Optional IEs of Attach Reject
pub mod attach_reject_iei {
    pub const ESM_MESSAGE_CONTAINER: u8 = 0x78;
    pub const T3346_VALUE: u8 = 0x5F;
    pub const T3402_VALUE: u8 = 0x16;
    pub const EXTENDED_EMM_CAUSE: u8 = 0xA0;
}

const ATTACH_REJECT_IES: IeTable = &[
    (attach_reject_iei::ESM_MESSAGE_CONTAINER, IeFormat::TlvE),
    (attach_reject_iei::T3346_VALUE, IeFormat::Tlv),
    (attach_reject_iei::T3402_VALUE, IeFormat::Tlv),
    (attach_reject_iei::EXTENDED_EMM_CAUSE, IeFormat::HalfOctet),
];

// ============================================================================
// Attach Request (3GPP TS 24.301 Section 8.2.4)
// ============================================================================

/// Attach Request message (UE to network)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachRequest {
    /// NAS key set identifier (high nibble)
    pub nas_ksi: NasKsi,
    /// EPS attach type (low nibble)
    pub attach_type: EpsAttachType,
    /// EPS mobile identity (LV)
    pub eps_mobile_identity: MobileIdentity,
    /// UE network capability (LV)
    pub ue_network_capability: UeNetworkCapability,
    /// ESM message container (LV-E), usually a PDN CONNECTIVITY REQUEST
    pub esm_message_container: Vec<u8>,
    /// Optional IEs
    pub optional: OptionalIes,
}

impl AttachRequest {
    /// Create an Attach Request with mandatory fields
    pub fn new(
        nas_ksi: NasKsi,
        attach_type: EpsAttachType,
        eps_mobile_identity: MobileIdentity,
        ue_network_capability: UeNetworkCapability,
        esm_message_container: Vec<u8>,
    ) -> Self {
        Self {
            nas_ksi,
            attach_type,
            eps_mobile_identity,
            ue_network_capability,
            esm_message_container,
            optional: OptionalIes::new(),
        }
    }

    /// Decode from bytes (after the message type)
    pub fn decode<B: Buf>(buf: &mut B) -> CodecResult<Self> {
        let (ksi, attach_type) = split_nibbles(read_u8(buf)?);
        let eps_mobile_identity = MobileIdentity::decode_eps(&read_lv(buf)?)?;
        let ue_network_capability = UeNetworkCapability { value: read_lv(buf)? };
        let esm_message_container = read_lv_e(buf)?;
        let optional = OptionalIes::decode(buf, ATTACH_REQUEST_IES)?;
        Ok(Self {
            nas_ksi: NasKsi::from_nibble(ksi),
            attach_type: EpsAttachType::from(attach_type & 0x07),
            eps_mobile_identity,
            ue_network_capability,
            esm_message_container,
            optional,
        })
    }

    /// Encode to bytes (after the message type)
    pub fn encode<B: BufMut>(&self, buf: &mut B) -> CodecResult<()> {
        buf.put_u8(join_nibbles(self.nas_ksi.to_nibble(), self.attach_type.into()));
        write_lv(buf, &self.eps_mobile_identity.encode_eps()?)?;
        write_lv(buf, &self.ue_network_capability.value)?;
        write_lv_e(buf, &self.esm_message_container)?;
        self.optional.encode(buf)
    }

    /// Last visited registered TAI, if present
    pub fn last_visited_tai(&self) -> Option<Tai> {
        let mut value = self.optional.value(attach_request_iei::LAST_VISITED_TAI)?;
        Tai::decode(&mut value).ok()
    }
}

// ============================================================================
// Attach Accept (3GPP TS 24.301 Section 8.2.1)
// ============================================================================

/// Attach Accept message (network to UE)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachAccept {
    /// EPS attach result (1 EPS only, 2 combined)
    pub attach_result: u8,
    /// T3412 value (GPRS timer)
    pub t3412: u8,
    /// TAI list (LV), raw
    pub tai_list: Vec<u8>,
    /// ESM message container (LV-E)
    pub esm_message_container: Vec<u8>,
    /// Optional IEs
    pub optional: OptionalIes,
}

impl AttachAccept {
    /// Create an Attach Accept with mandatory fields
    pub fn new(attach_result: u8, t3412: u8, tai_list: Vec<u8>, esm_message_container: Vec<u8>) -> Self {
        Self {
            attach_result,
            t3412,
            tai_list,
            esm_message_container,
            optional: OptionalIes::new(),
        }
    }

    /// Add the GUTI IE
    pub fn with_guti(mut self, guti: &MobileIdentity) -> CodecResult<Self> {
        self.optional.set(OptionalIe::tlv(attach_accept_iei::GUTI, guti.encode_eps()?));
        Ok(self)
    }

    /// Decode from bytes (after the message type)
    pub fn decode<B: Buf>(buf: &mut B) -> CodecResult<Self> {
        let (_, attach_result) = split_nibbles(read_u8(buf)?);
        let t3412 = read_u8(buf)?;
        let tai_list = read_lv(buf)?;
        let esm_message_container = read_lv_e(buf)?;
        let optional = OptionalIes::decode(buf, ATTACH_ACCEPT_IES)?;
        Ok(Self {
            attach_result: attach_result & 0x07,
            t3412,
            tai_list,
            esm_message_container,
            optional,
        })
    }

    /// Encode to bytes (after the message type)
    pub fn encode<B: BufMut>(&self, buf: &mut B) -> CodecResult<()> {
        buf.put_u8(self.attach_result & 0x07);
        buf.put_u8(self.t3412);
        write_lv(buf, &self.tai_list)?;
        write_lv_e(buf, &self.esm_message_container)?;
        self.optional.encode(buf)
    }

    /// GUTI, if present
    pub fn guti(&self) -> CodecResult<Option<MobileIdentity>> {
        self.optional
            .value(attach_accept_iei::GUTI)
            .map(MobileIdentity::decode_eps)
            .transpose()
    }
}

// ============================================================================
// Attach Complete (3GPP TS 24.301 Section 8.2.2)
// ============================================================================

/// Attach Complete message (UE to network)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttachComplete {
    /// ESM message container (LV-E)
    pub esm_message_container: Vec<u8>,
}

impl AttachComplete {
    /// Decode from bytes (after the message type)
    pub fn decode<B: Buf>(buf: &mut B) -> CodecResult<Self> {
        Ok(Self {
            esm_message_container: read_lv_e(buf)?,
        })
    }

    /// Encode to bytes (after the message type)
    pub fn encode<B: BufMut>(&self, buf: &mut B) -> CodecResult<()> {
        write_lv_e(buf, &self.esm_message_container)
    }
}

// ============================================================================
// Attach Reject (3GPP TS 24.301 Section 8.2.3)
// ============================================================================

/// Attach Reject message (network to UE)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachReject {
    /// EMM cause
    pub emm_cause: EmmCause,
    /// Optional IEs
    pub optional: OptionalIes,
}

impl AttachReject {
    /// Create an Attach Reject
    pub fn new(emm_cause: EmmCause) -> Self {
        Self {
            emm_cause,
            optional: OptionalIes::new(),
        }
    }

    /// Decode from bytes (after the message type)
    pub fn decode<B: Buf>(buf: &mut B) -> CodecResult<Self> {
        let emm_cause = EmmCause::from(read_u8(buf)?);
        let optional = OptionalIes::decode(buf, ATTACH_REJECT_IES)?;
        Ok(Self { emm_cause, optional })
    }

    /// Encode to bytes (after the message type)
    pub fn encode<B: BufMut>(&self, buf: &mut B) -> CodecResult<()> {
        buf.put_u8(self.emm_cause.into());
        self.optional.encode(buf)
    }

    /// ESM message container, if present
    pub fn esm_message_container(&self) -> Option<&[u8]> {
        self.optional.value(attach_reject_iei::ESM_MESSAGE_CONTAINER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ies::Guti;

    /// Attach Request body: KSI 7 / EPS attach, IMSI 001010123456789,
    /// UE network capability E0E0, ESM container, DRX parameter
    const ATTACH_REQUEST: &[u8] = &[
        0x71, 0x08, 0x09, 0x10, 0x10, 0x10, 0x32, 0x54, 0x76, 0x98, 0x02, 0xE0, 0xE0, 0x00, 0x04,
        0x02, 0x01, 0xD0, 0x11, 0x5C, 0x0A, 0x00,
    ];

    #[test]
    fn test_attach_request_decode() {
        let mut buf = ATTACH_REQUEST;
        let msg = AttachRequest::decode(&mut buf).unwrap();
        assert!(msg.nas_ksi.is_no_key());
        assert_eq!(msg.attach_type, EpsAttachType::EpsAttach);
        assert_eq!(msg.eps_mobile_identity, MobileIdentity::Imsi("001010123456789".into()));
        assert_eq!(msg.ue_network_capability.eea(), 0xE0);
        assert_eq!(msg.esm_message_container, vec![0x02, 0x01, 0xD0, 0x11]);
        assert_eq!(msg.optional.value(attach_request_iei::DRX_PARAMETER), Some(&[0x0A, 0x00][..]));
        assert!(msg.last_visited_tai().is_none());
    }

    #[test]
    fn test_attach_request_reencode() {
        let msg = AttachRequest::decode(&mut &ATTACH_REQUEST[..]).unwrap();
        let mut out = Vec::new();
        msg.encode(&mut out).unwrap();
        assert_eq!(out, ATTACH_REQUEST);
    }

    #[test]
    fn test_attach_request_last_visited_tai() {
        let mut msg = AttachRequest::new(
            NasKsi::no_key(),
            EpsAttachType::EpsAttach,
            MobileIdentity::Imsi("001010000000001".into()),
            UeNetworkCapability { value: vec![0xE0, 0xE0] },
            Vec::new(),
        );
        msg.optional
            .push(OptionalIe::tv(attach_request_iei::LAST_VISITED_TAI, vec![0x00, 0xF1, 0x10, 0x00, 0x01]));
        let tai = msg.last_visited_tai().unwrap();
        assert_eq!(tai.tac, 1);
    }

    #[test]
    fn test_attach_request_truncated() {
        let mut buf = &ATTACH_REQUEST[..5];
        assert!(AttachRequest::decode(&mut buf).is_err());
    }

    #[test]
    fn test_attach_accept_with_guti() {
        let guti = MobileIdentity::Guti(Guti {
            plmn: [0x00, 0xF1, 0x10],
            mme_group_id: 1,
            mme_code: 1,
            m_tmsi: 0x1234_5678,
        });
        let msg = AttachAccept::new(1, 0x21, vec![0x00, 0x00, 0xF1, 0x10, 0x00, 0x01], vec![0x52])
            .with_guti(&guti)
            .unwrap();

        let mut out = Vec::new();
        msg.encode(&mut out).unwrap();
        let decoded = AttachAccept::decode(&mut out.as_slice()).unwrap();
        assert_eq!(decoded, msg);
        assert_eq!(decoded.guti().unwrap(), Some(guti));
    }

    #[test]
    fn test_attach_reject() {
        let data: &[u8] = &[0x13, 0x78, 0x00, 0x02, 0x02, 0x01];
        let msg = AttachReject::decode(&mut &data[..]).unwrap();
        assert_eq!(msg.emm_cause, EmmCause::EsmFailure);
        assert_eq!(msg.esm_message_container(), Some(&[0x02, 0x01][..]));
    }

    #[test]
    fn test_attach_complete() {
        let msg = AttachComplete {
            esm_message_container: vec![0x52, 0x01, 0xC2],
        };
        let mut out = Vec::new();
        msg.encode(&mut out).unwrap();
        assert_eq!(out, vec![0x00, 0x03, 0x52, 0x01, 0xC2]);
        assert_eq!(AttachComplete::decode(&mut out.as_slice()).unwrap(), msg);
    }
}
