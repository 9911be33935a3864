//! Attach with security mode control
//!
//! Drives a full initial attach through the codec: plain ATTACH REQUEST,
//! SECURITY MODE COMMAND/COMPLETE under a new context, then the protected
//! ATTACH ACCEPT/COMPLETE with their piggybacked ESM messages.

use integration_tests::{attach_request, default_bearer_request, init_test_logging, SessionPair, TestKeys, TestResult};
use ltemme_common::config::NasConfig;
use ltemme_crypto::kdf::derive_kenb;
use ltemme_nas::dispatch::{decapsulate_esm, decode_nas, encapsulate_esm, encode_emm, encode_esm, is_auth_required};
use ltemme_nas::enums::{Direction, EmmMessageType, SecurityHeaderType};
use ltemme_nas::ies::{MobileIdentity, NasKsi, NasSecurityAlgorithms};
use ltemme_nas::messages::{
    ActivateDefaultEpsBearerContextAccept, AttachAccept, AttachComplete, EmmBody, EmmMessage, EsmBody, EsmMessage,
    SecurityModeCommand, SecurityModeComplete,
};
use ltemme_nas::secure::{authenticate, AuthResult};
use ltemme_nas::security::select_algorithms;

#[test]
fn test_attach_with_security_mode() -> TestResult {
    init_test_logging();
    let keys = TestKeys::default();

    // UE -> MME: plain ATTACH REQUEST
    let attach = attach_request("001010123456789")?;
    let pdu = encode_emm(&EmmMessage::from(attach.clone()))?;
    let received = decode_nas(&pdu)?;
    let emm = received.emm().ok_or("expected EMM")?;
    assert_eq!(emm.message_type, EmmMessageType::AttachRequest);
    assert!(!is_auth_required(emm.message_type));
    let EmmBody::AttachRequest(request) = &emm.body else {
        return Err("attach request body not decoded".into());
    };
    assert_eq!(request.eps_mobile_identity, MobileIdentity::Imsi("001010123456789".into()));
    let pdn = decapsulate_esm(&request.esm_message_container)?;
    let EsmBody::PdnConnectivityRequest(pdn_request) = &pdn.body else {
        return Err("PDN connectivity request not decoded".into());
    };
    assert!(pdn_request.esm_information_transfer_flag());

    // MME picks algorithms from its configuration and the UE capability
    let config = NasConfig::from_yaml("integrity_priority: [EIA2, EIA1]\nciphering_priority: [EEA2, EEA0]\n")?;
    let capability = request.ue_network_capability.security_capability();
    let (eia, eea) = select_algorithms(&capability, &config.integrity_ids()?, &config.ciphering_ids()?)
        .ok_or("no common algorithms")?;
    let mut pair = SessionPair::with_freshness_window(keys, eia, eea, config.freshness_window);

    // MME -> UE: SECURITY MODE COMMAND, integrity protected with new context
    let smc = SecurityModeCommand::new(
        NasSecurityAlgorithms {
            ciphering: eea,
            integrity: eia,
        },
        NasKsi::native(keys.ksi),
        capability,
    )
    .with_imeisv_request();
    let plain = encode_emm(&EmmMessage::from(smc.clone()))?;
    let pdu = pair.mme_send(SecurityHeaderType::IntegrityProtectedWithNewEpsSecurityContext, &plain)?;
    assert_eq!(&pdu[6..], plain.as_slice());

    let received = pair.ue_receive(&pdu)?;
    let EmmBody::SecurityModeCommand(command) = &received.emm().ok_or("expected EMM")?.body else {
        return Err("security mode command not decoded".into());
    };
    assert_eq!(command, &smc);
    assert!(command.imeisv_requested());
    assert_eq!(command.replayed_ue_security_capability, capability);

    // UE -> MME: SECURITY MODE COMPLETE, ciphered under the new context
    let imeisv = MobileIdentity::Imeisv("3533409600873320".into());
    let complete = SecurityModeComplete::default().with_imeisv(&imeisv)?;
    let plain = encode_emm(&EmmMessage::from(complete))?;
    let pdu = pair.ue_send(SecurityHeaderType::IntegrityProtectedAndCipheredWithNewEpsSecurityContext, &plain)?;
    assert_ne!(&pdu[6..], plain.as_slice());

    let received = pair.mme_receive(&pdu)?;
    let emm = received.emm().ok_or("expected EMM")?;
    assert!(is_auth_required(emm.message_type));
    let EmmBody::SecurityModeComplete(complete) = &emm.body else {
        return Err("security mode complete not decoded".into());
    };
    assert_eq!(complete.imeisv()?, Some(imeisv));

    // MME -> UE: ATTACH ACCEPT carrying the default bearer request
    let bearer = default_bearer_request("internet", pdn.procedure_transaction_identity)?;
    let accept = AttachAccept::new(0x01, 0x21, vec![0x00, 0x00, 0xF1, 0x10, 0x00, 0x01], encapsulate_esm(&bearer)?)
        .with_guti(&guti())?;
    let plain = encode_emm(&EmmMessage::from(accept))?;
    let pdu = pair.mme_send(SecurityHeaderType::IntegrityProtectedAndCiphered, &plain)?;

    let received = pair.ue_receive(&pdu)?;
    let EmmBody::AttachAccept(accept) = &received.emm().ok_or("expected EMM")?.body else {
        return Err("attach accept not decoded".into());
    };
    let bearer = decapsulate_esm(&accept.esm_message_container)?;
    assert_eq!(bearer.eps_bearer_identity, 5);
    let EsmBody::ActivateDefaultEpsBearerContextRequest(request) = &bearer.body else {
        return Err("bearer request not decoded".into());
    };
    assert_eq!(request.access_point_name.to_dotted()?, "internet");
    assert_eq!(request.qci(), Some(9));

    // UE -> MME: ATTACH COMPLETE with the bearer accept
    let bearer_accept = EsmMessage::new(5, 0, ActivateDefaultEpsBearerContextAccept::default())
        .ok_or("bearer accept has no message type")?;
    let complete = AttachComplete {
        esm_message_container: encode_esm(&bearer_accept)?,
    };
    let pdu = pair.ue_send(
        SecurityHeaderType::IntegrityProtectedAndCiphered,
        &encode_emm(&EmmMessage::from(complete))?,
    )?;
    let received = pair.mme_receive(&pdu)?;
    let EmmBody::AttachComplete(complete) = &received.emm().ok_or("expected EMM")?.body else {
        return Err("attach complete not decoded".into());
    };
    assert_eq!(decapsulate_esm(&complete.esm_message_container)?, bearer_accept);

    // Both ends agree on COUNT, and KeNB follows the last uplink COUNT
    assert_eq!(pair.mme.count(Direction::Uplink), 2);
    assert_eq!(pair.mme.count(Direction::Downlink), 2);
    assert_eq!(pair.ue.count(Direction::Uplink), 2);
    assert_eq!(pair.ue.count(Direction::Downlink), 2);
    assert_eq!(pair.mme.kenb(), Some(derive_kenb(&keys.kasme, 1)));
    assert_eq!(pair.mme.kenb(), pair.ue.kenb());
    Ok(())
}

fn guti() -> MobileIdentity {
    MobileIdentity::Guti(ltemme_nas::ies::Guti {
        plmn: [0x00, 0xF1, 0x10],
        mme_group_id: 0x8001,
        mme_code: 0x01,
        m_tmsi: 0xC0FF_EE01,
    })
}

#[test]
fn test_plain_message_after_security_is_flagged() -> TestResult {
    init_test_logging();
    let mut pair = SessionPair::new(TestKeys::default(), ltemme_nas::EiaId::Eia2, ltemme_nas::EeaId::Eea2);

    // A plain ATTACH COMPLETE is not something authenticate can vouch for
    let pdu = encode_emm(&EmmMessage::from(AttachComplete::default()))?;
    assert_eq!(authenticate(&mut pair.mme, &pdu, Direction::Uplink)?, AuthResult::NotApplicable);
    let received = decode_nas(&pdu)?;
    assert!(is_auth_required(received.emm().ok_or("expected EMM")?.message_type));
    Ok(())
}

#[test]
fn test_security_mode_reject_is_accepted_plain() -> TestResult {
    init_test_logging();
    let reject = ltemme_nas::messages::SecurityModeReject {
        emm_cause: ltemme_nas::ies::EmmCause::UeSecurityCapabilitiesMismatch,
    };
    let pdu = encode_emm(&EmmMessage::from(reject))?;
    let received = decode_nas(&pdu)?;
    let emm = received.emm().ok_or("expected EMM")?;
    assert_eq!(emm.message_type, EmmMessageType::SecurityModeReject);
    assert!(!is_auth_required(emm.message_type));
    Ok(())
}
