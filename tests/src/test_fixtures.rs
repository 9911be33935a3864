//! Test fixtures and session helpers
//!
//! [`SessionPair`] holds the two ends of a NAS security association. The
//! MME side sends with [`encode_secure`]; the UE side protects uplink PDUs
//! with its own uplink COUNT, the way a UE stack would.

use bytes::Bytes;

use ltemme_nas::algorithms::{EeaId, EiaId};
use ltemme_nas::count::DEFAULT_FRESHNESS_WINDOW;
use ltemme_nas::dispatch::{encapsulate_esm, GenericNasMessage};
use ltemme_nas::enums::{Direction, ProtocolDiscriminator, SecurityHeaderType};
use ltemme_nas::error::EncodeError;
use ltemme_nas::ies::{AccessPointName, EpsAttachType, MobileIdentity, NasKsi, PdnAddress, PdnType, RequestType, UeNetworkCapability};
use ltemme_nas::messages::{ActivateDefaultEpsBearerContextRequest, AttachRequest, EsmMessage, PdnConnectivityRequest};
use ltemme_nas::secure::{authenticate, decode_secure, encode_secure, encode_service_request, protect};
use ltemme_nas::security::SecurityContext;

use crate::test_utils::TestResult;

/// UE network capability octets: EEA0-EEA3 and EIA0-EIA3
pub const UE_CAPABILITY: [u8; 2] = [0xF0, 0xF0];

/// Key material shared by both ends
#[derive(Debug, Clone, Copy)]
pub struct TestKeys {
    /// KASME from the AKA run
    pub kasme: [u8; 32],
    /// NAS key set identifier assigned to KASME
    pub ksi: u8,
}

impl Default for TestKeys {
    fn default() -> Self {
        Self {
            kasme: [
                0x23, 0x8e, 0x45, 0x7e, 0x0f, 0x75, 0x8b, 0xad, 0xbc, 0xa8, 0xd3, 0x4b, 0xb2, 0x61, 0x2c, 0x10,
                0x42, 0x8d, 0x42, 0x6e, 0x7f, 0x5e, 0x02, 0x2d, 0xd1, 0x79, 0x3f, 0x0f, 0x81, 0x6b, 0x73, 0x67,
            ],
            ksi: 1,
        }
    }
}

impl TestKeys {
    /// Keys with a custom KASME
    pub fn with_kasme(mut self, kasme: [u8; 32]) -> Self {
        self.kasme = kasme;
        self
    }
}

/// MME and UE security contexts established from the same keys
#[derive(Debug, Clone)]
pub struct SessionPair {
    pub keys: TestKeys,
    pub mme: SecurityContext,
    pub ue: SecurityContext,
}

impl SessionPair {
    /// Establish both ends with the default freshness window
    pub fn new(keys: TestKeys, eia: EiaId, eea: EeaId) -> Self {
        Self::with_freshness_window(keys, eia, eea, DEFAULT_FRESHNESS_WINDOW)
    }

    /// Establish both ends with a custom freshness window
    pub fn with_freshness_window(keys: TestKeys, eia: EiaId, eea: EeaId, window: u8) -> Self {
        let ksi = NasKsi::native(keys.ksi);
        let mut mme = SecurityContext::with_freshness_window(window);
        mme.establish_with_ksi(&keys.kasme, ksi, eia, eea);
        let mut ue = SecurityContext::with_freshness_window(window);
        ue.establish_with_ksi(&keys.kasme, ksi, eia, eea);
        Self { keys, mme, ue }
    }

    /// Secure a downlink PDU at the MME
    pub fn mme_send(&mut self, sht: SecurityHeaderType, plain: &[u8]) -> Result<Bytes, EncodeError> {
        encode_secure(
            &mut self.mme,
            ProtocolDiscriminator::EpsMobilityManagement,
            sht,
            Direction::Downlink,
            plain,
        )
    }

    /// Secure an uplink PDU at the UE and advance its uplink COUNT
    pub fn ue_send(&mut self, sht: SecurityHeaderType, plain: &[u8]) -> Result<Bytes, EncodeError> {
        let count = self.ue.count(Direction::Uplink);
        let pdu = protect(
            &self.ue,
            ProtocolDiscriminator::EpsMobilityManagement,
            sht,
            Direction::Uplink,
            count,
            plain,
        )?;
        self.ue.counters_mut().increment(Direction::Uplink)?;
        Ok(pdu)
    }

    /// Build a SERVICE REQUEST at the UE and advance its uplink COUNT
    pub fn ue_service_request(&mut self) -> Result<Bytes, EncodeError> {
        let count = self.ue.count(Direction::Uplink);
        let pdu = encode_service_request(&self.ue, self.keys.ksi, count)?;
        self.ue.counters_mut().increment(Direction::Uplink)?;
        Ok(pdu)
    }

    /// Authenticate and decode an uplink PDU at the MME
    pub fn mme_receive(&mut self, pdu: &[u8]) -> TestResult<GenericNasMessage> {
        authenticate(&mut self.mme, pdu, Direction::Uplink)?.into_result()?;
        Ok(decode_secure(&self.mme, pdu, Direction::Uplink)?)
    }

    /// Authenticate and decode a downlink PDU at the UE
    pub fn ue_receive(&mut self, pdu: &[u8]) -> TestResult<GenericNasMessage> {
        authenticate(&mut self.ue, pdu, Direction::Downlink)?.into_result()?;
        Ok(decode_secure(&self.ue, pdu, Direction::Downlink)?)
    }
}

/// Initial attach for `imsi` carrying a PDN connectivity request
pub fn attach_request(imsi: &str) -> TestResult<AttachRequest> {
    let pdn = PdnConnectivityRequest::new(PdnType::Ipv4, RequestType::InitialRequest).with_esm_information_transfer_flag(true);
    let esm = EsmMessage::new(0, 1, pdn).ok_or("PDN connectivity request has no message type")?;
    Ok(AttachRequest::new(
        NasKsi::no_key(),
        EpsAttachType::EpsAttach,
        MobileIdentity::Imsi(imsi.to_string()),
        UeNetworkCapability {
            value: UE_CAPABILITY.to_vec(),
        },
        encapsulate_esm(&esm)?,
    ))
}

/// Default bearer activation for `apn` on bearer 5, QCI 9
pub fn default_bearer_request(apn: &str, procedure_transaction_identity: u8) -> TestResult<EsmMessage> {
    let request = ActivateDefaultEpsBearerContextRequest::new(
        vec![0x09],
        AccessPointName::from_dotted(apn)?,
        PdnAddress {
            pdn_type: PdnType::Ipv4,
            address: vec![10, 45, 0, 2],
        },
    );
    EsmMessage::new(5, procedure_transaction_identity, request).ok_or_else(|| "bearer request has no message type".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_pair_shares_keys() {
        let pair = SessionPair::new(TestKeys::default(), EiaId::Eia2, EeaId::Eea2);
        assert!(pair.mme.is_valid());
        assert_eq!(pair.mme.integrity_key(), pair.ue.integrity_key());
        assert_eq!(pair.mme.ciphering_key(), pair.ue.ciphering_key());
        assert_eq!(pair.mme.ksi(), NasKsi::native(1));
    }

    #[test]
    fn test_attach_request_fixture() {
        let attach = attach_request("001010000000001").unwrap();
        assert!(attach.nas_ksi.is_no_key());
        assert_eq!(attach.ue_network_capability.value, UE_CAPABILITY);
        assert!(!attach.esm_message_container.is_empty());
    }
}
