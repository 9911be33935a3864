//! Default EPS Bearer Context Activation (3GPP TS 24.301 Section 8.3.4-8.3.6)

use bytes::{Buf, BufMut};

use super::pdn::esm_iei;
use crate::codec::{read_lv, write_lv, CodecResult, IeFormat, IeTable, OptionalIes};
use crate::ies::{AccessPointName, EsmCause, PdnAddress};

/// Optional IEs of Activate Default EPS Bearer Context Request
pub mod activate_default_bearer_request_iei {
    pub const TRANSACTION_IDENTIFIER: u8 = 0x5D;
    pub const NEGOTIATED_QOS: u8 = 0x30;
    pub const NEGOTIATED_LLC_SAPI: u8 = 0x32;
    pub const RADIO_PRIORITY: u8 = 0x80;
    pub const PACKET_FLOW_IDENTIFIER: u8 = 0x34;
    pub const APN_AMBR: u8 = 0x5E;
    pub const ESM_CAUSE: u8 = 0x58;
    pub const CONNECTIVITY_TYPE: u8 = 0xB0;
    pub const WLAN_OFFLOAD_INDICATION: u8 = 0xC0;
    pub const CONTROL_PLANE_ONLY_INDICATION: u8 = 0x90;
    pub const SERVING_PLMN_RATE_CONTROL: u8 = 0x6E;
    pub const EXTENDED_APN_AMBR: u8 = 0x5F;
}

use activate_default_bearer_request_iei as request_iei;

const ACTIVATE_DEFAULT_BEARER_REQUEST_IES: IeTable = &[
    (request_iei::TRANSACTION_IDENTIFIER, IeFormat::Tlv),
    (request_iei::NEGOTIATED_QOS, IeFormat::Tlv),
    (request_iei::NEGOTIATED_LLC_SAPI, IeFormat::Tv(1)),
    (request_iei::RADIO_PRIORITY, IeFormat::HalfOctet),
    (request_iei::PACKET_FLOW_IDENTIFIER, IeFormat::Tlv),
    (request_iei::APN_AMBR, IeFormat::Tlv),
    (request_iei::ESM_CAUSE, IeFormat::Tv(1)),
    (esm_iei::PROTOCOL_CONFIGURATION_OPTIONS, IeFormat::Tlv),
    (request_iei::CONNECTIVITY_TYPE, IeFormat::HalfOctet),
    (request_iei::WLAN_OFFLOAD_INDICATION, IeFormat::HalfOctet),
    (esm_iei::NBIFOM_CONTAINER, IeFormat::Tlv),
    (esm_iei::HEADER_COMPRESSION_CONFIGURATION, IeFormat::Tlv),
    (request_iei::CONTROL_PLANE_ONLY_INDICATION, IeFormat::HalfOctet),
    (esm_iei::EXTENDED_PROTOCOL_CONFIGURATION_OPTIONS, IeFormat::TlvE),
    (request_iei::SERVING_PLMN_RATE_CONTROL, IeFormat::Tlv),
    (request_iei::EXTENDED_APN_AMBR, IeFormat::Tlv),
];

const ACTIVATE_DEFAULT_BEARER_ACCEPT_IES: IeTable = &[
    (esm_iei::PROTOCOL_CONFIGURATION_OPTIONS, IeFormat::Tlv),
    (esm_iei::EXTENDED_PROTOCOL_CONFIGURATION_OPTIONS, IeFormat::TlvE),
];

/// Activate Default EPS Bearer Context Request message (network to UE)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivateDefaultEpsBearerContextRequest {
    /// EPS quality of service (LV), QCI first
    pub eps_qos: Vec<u8>,
    /// Access point name (LV)
    pub access_point_name: AccessPointName,
    /// PDN address (LV)
    pub pdn_address: PdnAddress,
    /// Optional IEs
    pub optional: OptionalIes,
}

impl ActivateDefaultEpsBearerContextRequest {
    /// Create a request with mandatory fields
    pub fn new(eps_qos: Vec<u8>, access_point_name: AccessPointName, pdn_address: PdnAddress) -> Self {
        Self {
            eps_qos,
            access_point_name,
            pdn_address,
            optional: OptionalIes::new(),
        }
    }

    /// Decode from bytes (after the message type)
    pub fn decode<B: Buf>(buf: &mut B) -> CodecResult<Self> {
        let eps_qos = read_lv(buf)?;
        let access_point_name = AccessPointName { value: read_lv(buf)? };
        let pdn_address = PdnAddress::decode(&read_lv(buf)?)?;
        let optional = OptionalIes::decode(buf, ACTIVATE_DEFAULT_BEARER_REQUEST_IES)?;
        Ok(Self {
            eps_qos,
            access_point_name,
            pdn_address,
            optional,
        })
    }

    /// Encode to bytes (after the message type)
    pub fn encode<B: BufMut>(&self, buf: &mut B) -> CodecResult<()> {
        write_lv(buf, &self.eps_qos)?;
        write_lv(buf, &self.access_point_name.value)?;
        write_lv(buf, &self.pdn_address.encode())?;
        self.optional.encode(buf)
    }

    /// QoS class identifier
    pub fn qci(&self) -> Option<u8> {
        self.eps_qos.first().copied()
    }

    /// ESM cause, present when the network granted a different PDN type
    pub fn esm_cause(&self) -> Option<EsmCause> {
        self.optional
            .value(request_iei::ESM_CAUSE)
            .and_then(|value| value.first().copied())
            .map(EsmCause::from)
    }
}

/// Activate Default EPS Bearer Context Accept message (UE to network)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActivateDefaultEpsBearerContextAccept {
    /// Optional IEs
    pub optional: OptionalIes,
}

impl ActivateDefaultEpsBearerContextAccept {
    /// Decode from bytes (after the message type)
    pub fn decode<B: Buf>(buf: &mut B) -> CodecResult<Self> {
        Ok(Self {
            optional: OptionalIes::decode(buf, ACTIVATE_DEFAULT_BEARER_ACCEPT_IES)?,
        })
    }

    /// Encode to bytes (after the message type)
    pub fn encode<B: BufMut>(&self, buf: &mut B) -> CodecResult<()> {
        self.optional.encode(buf)
    }
}
