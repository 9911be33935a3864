//! PDN Connectivity and PDN Disconnect (3GPP TS 24.301 Section 8.3.20, 8.3.22)

use bytes::{Buf, BufMut};

use crate::codec::{join_nibbles, read_u8, split_nibbles, CodecResult, IeFormat, IeTable, OptionalIe, OptionalIes};
use crate::ies::{AccessPointName, PdnType, RequestType};

/// IEIs shared by ESM messages
pub mod esm_iei {
    pub const ESM_INFORMATION_TRANSFER_FLAG: u8 = 0xD0;
    pub const ACCESS_POINT_NAME: u8 = 0x28;
    pub const PROTOCOL_CONFIGURATION_OPTIONS: u8 = 0x27;
    pub const DEVICE_PROPERTIES: u8 = 0xC0;
    pub const NBIFOM_CONTAINER: u8 = 0x33;
    pub const HEADER_COMPRESSION_CONFIGURATION: u8 = 0x66;
    pub const EXTENDED_PROTOCOL_CONFIGURATION_OPTIONS: u8 = 0x7B;
}

const PDN_CONNECTIVITY_REQUEST_IES: IeTable = &[
    (esm_iei::ESM_INFORMATION_TRANSFER_FLAG, IeFormat::HalfOctet),
    (esm_iei::ACCESS_POINT_NAME, IeFormat::Tlv),
    (esm_iei::PROTOCOL_CONFIGURATION_OPTIONS, IeFormat::Tlv),
    (esm_iei::DEVICE_PROPERTIES, IeFormat::HalfOctet),
    (esm_iei::NBIFOM_CONTAINER, IeFormat::Tlv),
    (esm_iei::HEADER_COMPRESSION_CONFIGURATION, IeFormat::Tlv),
    (esm_iei::EXTENDED_PROTOCOL_CONFIGURATION_OPTIONS, IeFormat::TlvE),
];

const PDN_DISCONNECT_REQUEST_IES: IeTable = &[
    (esm_iei::PROTOCOL_CONFIGURATION_OPTIONS, IeFormat::Tlv),
    (esm_iei::EXTENDED_PROTOCOL_CONFIGURATION_OPTIONS, IeFormat::TlvE),
];

/// PDN Connectivity Request message (UE to network)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdnConnectivityRequest {
    /// PDN type (high nibble)
    pub pdn_type: PdnType,
    /// Request type (low nibble)
    pub request_type: RequestType,
    /// Optional IEs
    pub optional: OptionalIes,
}

impl PdnConnectivityRequest {
    /// Create a PDN Connectivity Request
    pub fn new(pdn_type: PdnType, request_type: RequestType) -> Self {
        Self {
            pdn_type,
            request_type,
            optional: OptionalIes::new(),
        }
    }

    /// Decode from bytes (after the message type)
    pub fn decode<B: Buf>(buf: &mut B) -> CodecResult<Self> {
        let (pdn_type, request_type) = split_nibbles(read_u8(buf)?);
        let optional = OptionalIes::decode(buf, PDN_CONNECTIVITY_REQUEST_IES)?;
        Ok(Self {
            pdn_type: PdnType::from(pdn_type & 0x07),
            request_type: RequestType::from(request_type & 0x07),
            optional,
        })
    }

    /// Encode to bytes (after the message type)
    pub fn encode<B: BufMut>(&self, buf: &mut B) -> CodecResult<()> {
        buf.put_u8(join_nibbles(self.pdn_type.into(), self.request_type.into()));
        self.optional.encode(buf)
    }

    /// Set the ESM information transfer flag
    pub fn with_esm_information_transfer_flag(mut self, flag: bool) -> Self {
        self.optional
            .set(OptionalIe::half_octet(esm_iei::ESM_INFORMATION_TRANSFER_FLAG, u8::from(flag)));
        self
    }

    /// Returns true if the UE will send APN and PCO in an ESM Information Response
    pub fn esm_information_transfer_flag(&self) -> bool {
        self.optional
            .lookup(esm_iei::ESM_INFORMATION_TRANSFER_FLAG)
            .is_some_and(|ie| ie.half_value() & 0x01 != 0)
    }

    /// Requested access point name, if present
    pub fn apn(&self) -> Option<AccessPointName> {
        self.optional
            .value(esm_iei::ACCESS_POINT_NAME)
            .map(|value| AccessPointName { value: value.to_vec() })
    }
}

/// PDN Disconnect Request message (UE to network)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdnDisconnectRequest {
    /// Linked EPS bearer identity (low nibble)
    pub linked_eps_bearer_identity: u8,
    /// Optional IEs
    pub optional: OptionalIes,
}

impl PdnDisconnectRequest {
    /// Decode from bytes (after the message type)
    pub fn decode<B: Buf>(buf: &mut B) -> CodecResult<Self> {
        let (_, linked) = split_nibbles(read_u8(buf)?);
        let optional = OptionalIes::decode(buf, PDN_DISCONNECT_REQUEST_IES)?;
        Ok(Self {
            linked_eps_bearer_identity: linked,
            optional,
        })
    }

    /// Encode to bytes (after the message type)
    pub fn encode<B: BufMut>(&self, buf: &mut B) -> CodecResult<()> {
        buf.put_u8(self.linked_eps_bearer_identity & 0x0F);
        self.optional.encode(buf)
    }
}
