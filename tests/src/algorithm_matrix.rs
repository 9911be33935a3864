//! Every EIA/EEA pair, both directions, through the secured pipeline

use integration_tests::{init_test_logging, SessionPair, TestKeys, TestResult};
use ltemme_common::config::NasConfig;
use ltemme_nas::algorithms::{EeaId, EiaId};
use ltemme_nas::dispatch::{encode_emm, encode_plain};
use ltemme_nas::enums::{Direction, SecurityHeaderType};
use ltemme_nas::ies::{EmmCause, UeSecurityCapability};
use ltemme_nas::messages::{EmmMessage, EmmStatus, ServiceReject};
use ltemme_nas::security::select_algorithms;
use proptest::prelude::*;

const INTEGRITY: [EiaId; 4] = [EiaId::Eia0, EiaId::Eia1, EiaId::Eia2, EiaId::Eia3];
const CIPHERING: [EeaId; 4] = [EeaId::Eea0, EeaId::Eea1, EeaId::Eea2, EeaId::Eea3];

#[test]
fn test_every_algorithm_pair_round_trips() -> TestResult {
    init_test_logging();
    let uplink = encode_emm(&EmmMessage::from(EmmStatus::new(EmmCause::SemanticallyIncorrectMessage)))?;
    let downlink = encode_emm(&EmmMessage::from(ServiceReject::new(EmmCause::Congestion)))?;

    for eia in INTEGRITY {
        for eea in CIPHERING {
            tracing::info!(?eia, ?eea, "round trip");
            let mut pair = SessionPair::new(TestKeys::default(), eia, eea);
            for _ in 0..3 {
                let pdu = pair.ue_send(SecurityHeaderType::IntegrityProtectedAndCiphered, &uplink)?;
                let msg = pair.mme_receive(&pdu)?;
                assert_eq!(encode_plain(&msg)?, uplink, "{:?}/{:?} uplink", eia, eea);

                let pdu = pair.mme_send(SecurityHeaderType::IntegrityProtectedAndCiphered, &downlink)?;
                if eea == EeaId::Eea0 {
                    assert_eq!(&pdu[6..], downlink.as_slice());
                } else {
                    assert_ne!(&pdu[6..], downlink.as_slice());
                }
                let msg = pair.ue_receive(&pdu)?;
                assert_eq!(encode_plain(&msg)?, downlink, "{:?}/{:?} downlink", eia, eea);
            }
            assert_eq!(pair.mme.count(Direction::Uplink), 3);
            assert_eq!(pair.mme.count(Direction::Downlink), 3);
        }
    }
    Ok(())
}

#[test]
fn test_null_integrity_macs_are_zero() -> TestResult {
    init_test_logging();
    let mut pair = SessionPair::new(TestKeys::default(), EiaId::Eia0, EeaId::Eea2);
    let plain = encode_emm(&EmmMessage::from(EmmStatus::new(EmmCause::Congestion)))?;
    let pdu = pair.mme_send(SecurityHeaderType::IntegrityProtectedAndCiphered, &plain)?;
    assert_eq!(&pdu[1..5], &[0, 0, 0, 0]);
    pair.ue_receive(&pdu)?;
    Ok(())
}

#[test]
fn test_configured_priorities_drive_selection() -> TestResult {
    init_test_logging();
    let config = NasConfig::from_yaml("integrity_priority: [EIA3, EIA2]\nciphering_priority: [EEA3, EEA1]\n")?;
    config.validate()?;

    // UE without ZUC support: EEA0-2, EIA1-2
    let capability = UeSecurityCapability::new(0xE0, 0x60);
    let selected = select_algorithms(&capability, &config.integrity_ids()?, &config.ciphering_ids()?);
    assert_eq!(selected, Some((EiaId::Eia2, EeaId::Eea1)));

    let all = UeSecurityCapability::new(0xF0, 0xF0);
    let selected = select_algorithms(&all, &config.integrity_ids()?, &config.ciphering_ids()?);
    assert_eq!(selected, Some((EiaId::Eia3, EeaId::Eea3)));
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_uplink_survives_arbitrary_counts(
        eia in 0usize..4,
        eea in 0usize..4,
        start in 0u32..0x00FF_0000,
        lost in 0u32..4,
    ) {
        let mut pair = SessionPair::new(TestKeys::default(), INTEGRITY[eia], CIPHERING[eea]);
        pair.mme.counters_mut().set(Direction::Uplink, start).unwrap();
        pair.ue.counters_mut().set(Direction::Uplink, start + lost).unwrap();

        let plain = encode_emm(&EmmMessage::from(EmmStatus::new(EmmCause::Congestion))).unwrap();
        let pdu = pair.ue_send(SecurityHeaderType::IntegrityProtectedAndCiphered, &plain).unwrap();
        let msg = pair.mme_receive(&pdu).unwrap();
        prop_assert_eq!(encode_plain(&msg).unwrap(), plain);
        prop_assert_eq!(pair.mme.count(Direction::Uplink), start + lost + 1);
    }
}
