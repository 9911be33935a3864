//! Replay and tampering scenarios against the MME receive path

use integration_tests::{init_test_logging, SessionPair, TestKeys, TestResult};
use ltemme_nas::algorithms::{EeaId, EiaId};
use ltemme_nas::dispatch::encode_emm;
use ltemme_nas::enums::{Direction, SecurityHeaderType};
use ltemme_nas::error::SecurityError;
use ltemme_nas::ies::EmmCause;
use ltemme_nas::messages::{EmmMessage, EmmStatus};
use ltemme_nas::secure::{authenticate, AuthResult};

fn emm_status() -> TestResult<Vec<u8>> {
    Ok(encode_emm(&EmmMessage::from(EmmStatus::new(EmmCause::ProtocolErrorUnspecified)))?)
}

#[test]
fn test_replayed_uplink_is_dropped() -> TestResult {
    init_test_logging();
    let mut pair = SessionPair::new(TestKeys::default(), EiaId::Eia2, EeaId::Eea2);
    let pdu = pair.ue_send(SecurityHeaderType::IntegrityProtectedAndCiphered, &emm_status()?)?;

    pair.mme_receive(&pdu)?;
    assert_eq!(pair.mme.count(Direction::Uplink), 1);

    let result = authenticate(&mut pair.mme, &pdu, Direction::Uplink)?;
    assert_eq!(result, AuthResult::Replay(0));
    assert_eq!(result.into_result(), Err(SecurityError::Replay(0)));
    assert_eq!(pair.mme.count(Direction::Uplink), 1);

    // the session continues with the next genuine PDU
    let next = pair.ue_send(SecurityHeaderType::IntegrityProtectedAndCiphered, &emm_status()?)?;
    pair.mme_receive(&next)?;
    assert_eq!(pair.mme.count(Direction::Uplink), 2);
    Ok(())
}

#[test]
fn test_replay_of_older_pdu_after_newer_ones() -> TestResult {
    init_test_logging();
    let mut pair = SessionPair::new(TestKeys::default(), EiaId::Eia1, EeaId::Eea1);
    let plain = emm_status()?;
    let first = pair.ue_send(SecurityHeaderType::IntegrityProtected, &plain)?;
    pair.mme_receive(&first)?;
    for _ in 0..3 {
        let pdu = pair.ue_send(SecurityHeaderType::IntegrityProtected, &plain)?;
        pair.mme_receive(&pdu)?;
    }
    assert_eq!(authenticate(&mut pair.mme, &first, Direction::Uplink)?, AuthResult::Replay(0));
    Ok(())
}

#[test]
fn test_tampered_payload_is_rejected() -> TestResult {
    init_test_logging();
    let mut pair = SessionPair::new(TestKeys::default(), EiaId::Eia3, EeaId::Eea3);
    let pdu = pair.ue_send(SecurityHeaderType::IntegrityProtectedAndCiphered, &emm_status()?)?;

    for index in 5..pdu.len() {
        let mut tampered = pdu.to_vec();
        tampered[index] ^= 0x40;
        let result = authenticate(&mut pair.mme, &tampered, Direction::Uplink)?;
        assert!(
            matches!(result, AuthResult::Rejected | AuthResult::Replay(_)),
            "octet {} tampering gave {:?}",
            index,
            result
        );
    }
    assert_eq!(pair.mme.count(Direction::Uplink), 0);

    // the untouched PDU is still accepted
    pair.mme_receive(&pdu)?;
    Ok(())
}

#[test]
fn test_tampered_sequence_number_is_rejected() -> TestResult {
    init_test_logging();
    let mut pair = SessionPair::new(TestKeys::default(), EiaId::Eia2, EeaId::Eea0);
    let pdu = pair.ue_send(SecurityHeaderType::IntegrityProtected, &emm_status()?)?;

    // SQN 2 is inside the window, so only the MAC can catch it
    let mut tampered = pdu.to_vec();
    tampered[5] = 2;
    assert_eq!(authenticate(&mut pair.mme, &tampered, Direction::Uplink)?, AuthResult::Rejected);
    assert_eq!(
        AuthResult::Rejected.into_result(),
        Err(SecurityError::AuthenticationRejected)
    );
    assert_eq!(pair.mme.count(Direction::Uplink), 0);
    Ok(())
}

#[test]
fn test_lost_pdus_inside_window_resynchronise() -> TestResult {
    init_test_logging();
    let mut pair = SessionPair::new(TestKeys::default(), EiaId::Eia2, EeaId::Eea2);
    let plain = emm_status()?;
    for _ in 0..3 {
        pair.ue_send(SecurityHeaderType::IntegrityProtectedAndCiphered, &plain)?;
    }
    let pdu = pair.ue_send(SecurityHeaderType::IntegrityProtectedAndCiphered, &plain)?;
    assert_eq!(pdu[5], 3);

    pair.mme_receive(&pdu)?;
    assert_eq!(pair.mme.count(Direction::Uplink), 4);
    assert_eq!(pair.mme.count(Direction::Uplink), pair.ue.count(Direction::Uplink));
    Ok(())
}

#[test]
fn test_sqn_beyond_window_is_treated_as_replay() -> TestResult {
    init_test_logging();
    let mut pair = SessionPair::new(TestKeys::default(), EiaId::Eia2, EeaId::Eea2);
    let plain = emm_status()?;
    for _ in 0..10 {
        pair.ue_send(SecurityHeaderType::IntegrityProtected, &plain)?;
    }
    let pdu = pair.ue_send(SecurityHeaderType::IntegrityProtected, &plain)?;
    assert_eq!(authenticate(&mut pair.mme, &pdu, Direction::Uplink)?, AuthResult::Replay(10));

    // a wider window accepts the same gap
    let mut wide = SessionPair::with_freshness_window(TestKeys::default(), EiaId::Eia2, EeaId::Eea2, 16);
    for _ in 0..10 {
        wide.ue_send(SecurityHeaderType::IntegrityProtected, &plain)?;
    }
    let pdu = wide.ue_send(SecurityHeaderType::IntegrityProtected, &plain)?;
    wide.mme_receive(&pdu)?;
    assert_eq!(wide.mme.count(Direction::Uplink), 11);
    Ok(())
}

#[test]
fn test_wrong_key_is_rejected() -> TestResult {
    init_test_logging();
    let mut sender = SessionPair::new(TestKeys::default().with_kasme([0x01; 32]), EiaId::Eia2, EeaId::Eea2);
    let mut receiver = SessionPair::new(TestKeys::default(), EiaId::Eia2, EeaId::Eea2);
    let pdu = sender.ue_send(SecurityHeaderType::IntegrityProtectedAndCiphered, &emm_status()?)?;
    assert_eq!(authenticate(&mut receiver.mme, &pdu, Direction::Uplink)?, AuthResult::Rejected);
    assert!(receiver.mme_receive(&pdu).is_err());
    Ok(())
}

#[test]
fn test_invalid_context_refuses_secured_pdu() -> TestResult {
    init_test_logging();
    let mut pair = SessionPair::new(TestKeys::default(), EiaId::Eia2, EeaId::Eea2);
    let pdu = pair.ue_send(SecurityHeaderType::IntegrityProtected, &emm_status()?)?;
    pair.mme.reset();
    assert_eq!(
        authenticate(&mut pair.mme, &pdu, Direction::Uplink),
        Err(SecurityError::ContextInvalid)
    );
    Ok(())
}
