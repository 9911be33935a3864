//! ESM Information and ESM Status (3GPP TS 24.301 Section 8.3.13-8.3.15)

use bytes::{Buf, BufMut};

use super::pdn::esm_iei;
use crate::codec::{read_u8, CodecResult, IeFormat, IeTable, OptionalIes};
use crate::ies::{AccessPointName, EsmCause};

const ESM_INFORMATION_RESPONSE_IES: IeTable = &[
    (esm_iei::ACCESS_POINT_NAME, IeFormat::Tlv),
    (esm_iei::PROTOCOL_CONFIGURATION_OPTIONS, IeFormat::Tlv),
    (esm_iei::EXTENDED_PROTOCOL_CONFIGURATION_OPTIONS, IeFormat::TlvE),
];

/// ESM Information Request message (no IEs)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EsmInformationRequest;

impl EsmInformationRequest {
    /// Decode from bytes (after the message type)
    pub fn decode<B: Buf>(_buf: &mut B) -> CodecResult<Self> {
        Ok(Self)
    }

    /// Encode to bytes (after the message type)
    pub fn encode<B: BufMut>(&self, _buf: &mut B) -> CodecResult<()> {
        Ok(())
    }
}

/// ESM Information Response message
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EsmInformationResponse {
    /// Optional IEs
    pub optional: OptionalIes,
}

impl EsmInformationResponse {
    /// Decode from bytes (after the message type)
    pub fn decode<B: Buf>(buf: &mut B) -> CodecResult<Self> {
        Ok(Self {
            optional: OptionalIes::decode(buf, ESM_INFORMATION_RESPONSE_IES)?,
        })
    }

    /// Encode to bytes (after the message type)
    pub fn encode<B: BufMut>(&self, buf: &mut B) -> CodecResult<()> {
        self.optional.encode(buf)
    }

    /// Access point name, if present
    pub fn apn(&self) -> Option<AccessPointName> {
        self.optional
            .value(esm_iei::ACCESS_POINT_NAME)
            .map(|value| AccessPointName { value: value.to_vec() })
    }
}

/// ESM Status message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EsmStatus {
    /// ESM cause
    pub esm_cause: EsmCause,
}

impl EsmStatus {
    /// Decode from bytes (after the message type)
    pub fn decode<B: Buf>(buf: &mut B) -> CodecResult<Self> {
        Ok(Self {
            esm_cause: EsmCause::from(read_u8(buf)?),
        })
    }

    /// Encode to bytes (after the message type)
    pub fn encode<B: BufMut>(&self, buf: &mut B) -> CodecResult<()> {
        buf.put_u8(self.esm_cause.into());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_esm_information_response_apn() {
        let data: &[u8] = &[0x28, 0x04, 0x03, b'i', b'm', b's'];
        let msg = EsmInformationResponse::decode(&mut &data[..]).unwrap();
        assert_eq!(msg.apn().unwrap().to_dotted().unwrap(), "ims");

        let mut out = Vec::new();
        msg.encode(&mut out).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_esm_information_response_empty() {
        let msg = EsmInformationResponse::decode(&mut &[0u8; 0][..]).unwrap();
        assert!(msg.apn().is_none());
    }

    #[test]
    fn test_esm_status() {
        let msg = EsmStatus::decode(&mut &[0x2Bu8][..]).unwrap();
        assert_eq!(msg.esm_cause, EsmCause::InvalidEpsBearerIdentity);
        assert!(EsmStatus::decode(&mut &[0u8; 0][..]).is_err());
    }
}
