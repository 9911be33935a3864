//! Tracking Area Update Messages (3GPP TS 24.301 Section 8.2.26-8.2.29)

use bytes::{Buf, BufMut};

use crate::codec::{
    join_nibbles, read_lv, read_u8, split_nibbles, write_lv, CodecResult, IeFormat, IeTable, OptionalIes,
};
use crate::ies::{EmmCause, EpsUpdateType, MobileIdentity, NasKsi, Tai, UeNetworkCapability};

/// Optional IEs of Tracking Area Update Request
pub mod tau_request_iei {
    pub const NON_CURRENT_NATIVE_NAS_KSI: u8 = 0xB0;
    pub const GPRS_CIPHERING_KEY_SEQUENCE_NUMBER: u8 = 0x80;
    pub const OLD_PTMSI_SIGNATURE: u8 = 0x19;
    pub const ADDITIONAL_GUTI: u8 = 0x50;
    pub const NONCE_UE: u8 = 0x55;
    pub const UE_NETWORK_CAPABILITY: u8 = 0x58;
    pub const LAST_VISITED_TAI: u8 = 0x52;
    pub const DRX_PARAMETER: u8 = 0x5C;
    pub const UE_RADIO_CAPABILITY_UPDATE_NEEDED: u8 = 0xA0;
    pub const EPS_BEARER_CONTEXT_STATUS: u8 = 0x57;
    pub const MS_NETWORK_CAPABILITY: u8 = 0x31;
    pub const OLD_LAI: u8 = 0x13;
    pub const TMSI_STATUS: u8 = 0x90;
    pub const MS_CLASSMARK_2: u8 = 0x11;
    pub const MS_CLASSMARK_3: u8 = 0x20;
    pub const SUPPORTED_CODECS: u8 = 0x40;
    pub const ADDITIONAL_UPDATE_TYPE: u8 = 0xF0;
    pub const VOICE_DOMAIN_PREFERENCE: u8 = 0x5D;
    pub const OLD_GUTI_TYPE: u8 = 0xE0;
    pub const DEVICE_PROPERTIES: u8 = 0xD0;
    pub const MS_NETWORK_FEATURE_SUPPORT: u8 = 0xC0;
    pub const TMSI_BASED_NRI_CONTAINER: u8 = 0x10;
    pub const T3324_VALUE: u8 = 0x6A;
    pub const T3412_EXTENDED_VALUE: u8 = 0x5E;
    pub const EXTENDED_DRX_PARAMETERS: u8 = 0x6E;
}

const TAU_REQUEST_IES: IeTable = &[
    (tau_request_iei::NON_CURRENT_NATIVE_NAS_KSI, IeFormat::HalfOctet),
    (tau_request_iei::GPRS_CIPHERING_KEY_SEQUENCE_NUMBER, IeFormat::HalfOctet),
    (tau_request_iei::OLD_PTMSI_SIGNATURE, IeFormat::Tv(3)),
    (tau_request_iei::ADDITIONAL_GUTI, IeFormat::Tlv),
    (tau_request_iei::NONCE_UE, IeFormat::Tv(4)),
    (tau_request_iei::UE_NETWORK_CAPABILITY, IeFormat::Tlv),
    (tau_request_iei::LAST_VISITED_TAI, IeFormat::Tv(Tai::SIZE)),
    (tau_request_iei::DRX_PARAMETER, IeFormat::Tv(2)),
    (tau_request_iei::UE_RADIO_CAPABILITY_UPDATE_NEEDED, IeFormat::HalfOctet),
    (tau_request_iei::EPS_BEARER_CONTEXT_STATUS, IeFormat::Tlv),
    (tau_request_iei::MS_NETWORK_CAPABILITY, IeFormat::Tlv),
    (tau_request_iei::OLD_LAI, IeFormat::Tv(5)),
    (tau_request_iei::TMSI_STATUS, IeFormat::HalfOctet),
    (tau_request_iei::MS_CLASSMARK_2, IeFormat::Tlv),
    (tau_request_iei::MS_CLASSMARK_3, IeFormat::Tlv),
    (tau_request_iei::SUPPORTED_CODECS, IeFormat::Tlv),
    (tau_request_iei::ADDITIONAL_UPDATE_TYPE, IeFormat::HalfOctet),
    (tau_request_iei::VOICE_DOMAIN_PREFERENCE, IeFormat::Tlv),
    (tau_request_iei::OLD_GUTI_TYPE, IeFormat::HalfOctet),
    (tau_request_iei::DEVICE_PROPERTIES, IeFormat::HalfOctet),
    (tau_request_iei::MS_NETWORK_FEATURE_SUPPORT, IeFormat::HalfOctet),
    (tau_request_iei::TMSI_BASED_NRI_CONTAINER, IeFormat::Tlv),
    (tau_request_iei::T3324_VALUE, IeFormat::Tlv),
    (tau_request_iei::T3412_EXTENDED_VALUE, IeFormat::Tlv),
    (tau_request_iei::EXTENDED_DRX_PARAMETERS, IeFormat::Tlv),
];

/// Optional IEs of Tracking Area Update Reject
pub mod tau_reject_iei {
    pub const T3346_VALUE: u8 = 0x5F;
    pub const EXTENDED_EMM_CAUSE: u8 = 0xA0;
}

const TAU_REJECT_IES: IeTable = &[
    (tau_reject_iei::T3346_VALUE, IeFormat::Tlv),
    (tau_reject_iei::EXTENDED_EMM_CAUSE, IeFormat::HalfOctet),
];

/// Tracking Area Update Request message (UE to network)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingAreaUpdateRequest {
    /// NAS key set identifier (high nibble)
    pub nas_ksi: NasKsi,
    /// EPS update type (low nibble)
    pub update_type: EpsUpdateType,
    /// Old GUTI (LV, EPS mobile identity)
    pub old_guti: MobileIdentity,
    /// Optional IEs
    pub optional: OptionalIes,
}

impl TrackingAreaUpdateRequest {
    /// Decode from bytes (after the message type)
    pub fn decode<B: Buf>(buf: &mut B) -> CodecResult<Self> {
        let (ksi, update_type) = split_nibbles(read_u8(buf)?);
        let old_guti = MobileIdentity::decode_eps(&read_lv(buf)?)?;
        let optional = OptionalIes::decode(buf, TAU_REQUEST_IES)?;
        Ok(Self {
            nas_ksi: NasKsi::from_nibble(ksi),
            update_type: EpsUpdateType::from_nibble(update_type),
            old_guti,
            optional,
        })
    }

    /// Encode to bytes (after the message type)
    pub fn encode<B: BufMut>(&self, buf: &mut B) -> CodecResult<()> {
        buf.put_u8(join_nibbles(self.nas_ksi.to_nibble(), self.update_type.to_nibble()));
        write_lv(buf, &self.old_guti.encode_eps()?)?;
        self.optional.encode(buf)
    }

    /// UE network capability, if present
    pub fn ue_network_capability(&self) -> Option<UeNetworkCapability> {
        self.optional
            .value(tau_request_iei::UE_NETWORK_CAPABILITY)
            .map(|value| UeNetworkCapability { value: value.to_vec() })
    }

    /// Last visited registered TAI, if present
    pub fn last_visited_tai(&self) -> Option<Tai> {
        let mut value = self.optional.value(tau_request_iei::LAST_VISITED_TAI)?;
        Tai::decode(&mut value).ok()
    }
}

/// Tracking Area Update Reject message (network to UE)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingAreaUpdateReject {
    /// EMM cause
    pub emm_cause: EmmCause,
    /// Optional IEs
    pub optional: OptionalIes,
}

impl TrackingAreaUpdateReject {
    /// Create a TAU Reject
    pub fn new(emm_cause: EmmCause) -> Self {
        Self {
            emm_cause,
            optional: OptionalIes::new(),
        }
    }

    /// Decode from bytes (after the message type)
    pub fn decode<B: Buf>(buf: &mut B) -> CodecResult<Self> {
        let emm_cause = EmmCause::from(read_u8(buf)?);
        let optional = OptionalIes::decode(buf, TAU_REJECT_IES)?;
        Ok(Self { emm_cause, optional })
    }

    /// Encode to bytes (after the message type)
    pub fn encode<B: BufMut>(&self, buf: &mut B) -> CodecResult<()> {
        buf.put_u8(self.emm_cause.into());
        self.optional.encode(buf)
    }
}
