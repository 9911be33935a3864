//! Short-form SERVICE REQUEST scenarios

use integration_tests::{init_test_logging, SessionPair, TestKeys, TestResult};
use ltemme_crypto::kdf::derive_kenb;
use ltemme_nas::algorithms::{EeaId, EiaId};
use ltemme_nas::dispatch::{encode_emm, NasPayload};
use ltemme_nas::enums::{Direction, ProtocolDiscriminator, SecurityHeaderType};
use ltemme_nas::error::DecodeError;
use ltemme_nas::ies::EmmCause;
use ltemme_nas::messages::{EmmMessage, EmmStatus, ServiceRequest};
use ltemme_nas::secure::{authenticate, decode_secure, AuthResult};
use ltemme_nas::security::SecurityContext;

#[test]
fn test_service_request_after_attach() -> TestResult {
    init_test_logging();
    let keys = TestKeys::default();
    let mut pair = SessionPair::new(keys, EiaId::Eia2, EeaId::Eea2);

    // two protected uplink messages before going idle
    let plain = encode_emm(&EmmMessage::from(EmmStatus::new(EmmCause::Congestion)))?;
    for _ in 0..2 {
        let pdu = pair.ue_send(SecurityHeaderType::IntegrityProtectedAndCiphered, &plain)?;
        pair.mme_receive(&pdu)?;
    }

    let pdu = pair.ue_service_request()?;
    assert_eq!(pdu.len(), 4);
    let msg = pair.mme_receive(&pdu)?;
    assert_eq!(msg.header.security_header_type, SecurityHeaderType::ServiceRequest);
    assert_eq!(msg.header.protocol_discriminator, ProtocolDiscriminator::EpsMobilityManagement);
    assert_eq!(
        msg.payload,
        NasPayload::ServiceRequest(ServiceRequest {
            ksi: keys.ksi,
            sequence_number: 2,
            short_mac: [pdu[2], pdu[3]],
        })
    );

    // KeNB for the access stratum follows the SERVICE REQUEST's COUNT
    assert_eq!(pair.mme.count(Direction::Uplink), 3);
    assert_eq!(pair.mme.kenb(), Some(derive_kenb(&keys.kasme, 2)));
    Ok(())
}

#[test]
fn test_service_requests_across_short_sqn_wrap() -> TestResult {
    init_test_logging();
    let mut pair = SessionPair::new(TestKeys::default(), EiaId::Eia1, EeaId::Eea0);
    for expected in 0..70u32 {
        let pdu = pair.ue_service_request()?;
        assert_eq!(u32::from(pdu[1] & 0x1F), expected % 32);
        assert_eq!(authenticate(&mut pair.mme, &pdu, Direction::Uplink)?, AuthResult::Authenticated);
    }
    assert_eq!(pair.mme.count(Direction::Uplink), 70);
    Ok(())
}

#[test]
fn test_service_request_replay_and_tamper() -> TestResult {
    init_test_logging();
    let mut pair = SessionPair::new(TestKeys::default(), EiaId::Eia3, EeaId::Eea3);
    let first = pair.ue_service_request()?;
    pair.mme_receive(&first)?;
    assert_eq!(authenticate(&mut pair.mme, &first, Direction::Uplink)?, AuthResult::Replay(0));

    let second = pair.ue_service_request()?;
    for bit in 0..16 {
        let mut tampered = second.to_vec();
        tampered[2 + bit / 8] ^= 0x80 >> (bit % 8);
        assert_eq!(authenticate(&mut pair.mme, &tampered, Direction::Uplink)?, AuthResult::Rejected);
    }
    // flipping the KSI changes the MAC input
    let mut tampered = second.to_vec();
    tampered[1] ^= 0x20;
    assert_eq!(authenticate(&mut pair.mme, &tampered, Direction::Uplink)?, AuthResult::Rejected);

    assert_eq!(authenticate(&mut pair.mme, &second, Direction::Uplink)?, AuthResult::Authenticated);
    Ok(())
}

#[test]
fn test_service_request_needs_context() -> TestResult {
    init_test_logging();
    let mut pair = SessionPair::new(TestKeys::default(), EiaId::Eia2, EeaId::Eea2);
    let pdu = pair.ue_service_request()?;
    assert_eq!(
        decode_secure(&SecurityContext::new(), &pdu, Direction::Uplink),
        Err(DecodeError::ContextInvalid)
    );
    assert!(matches!(
        decode_secure(&pair.mme, &pdu[..3], Direction::Uplink),
        Err(DecodeError::HeaderInvalid(_))
    ));
    Ok(())
}
