//! Subcommand implementations

use anyhow::{anyhow, bail, Context, Result};
use tracing::warn;

use ltemme_common::config::NasConfig;
use ltemme_common::logging::{format_hex_dump, log_nas_message, MessageDirection};
use ltemme_crypto::kdf::{derive_kenb, derive_knas_enc, derive_knas_int, KEY_256_SIZE};
use ltemme_nas::algorithms::{EeaId, EiaId};
use ltemme_nas::dispatch::decode_nas;
use ltemme_nas::enums::{Direction, ProtocolDiscriminator, SecurityHeaderType};
use ltemme_nas::header::parse_header;
use ltemme_nas::secure::{authenticate, decode_secure, encode_service_request, protect};
use ltemme_nas::security::SecurityContext;

use crate::SecurityArgs;

fn parse_hex(input: &str) -> Result<Vec<u8>> {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace() && *c != ':').collect();
    hex::decode(&cleaned).with_context(|| format!("Invalid hex input '{}'", input))
}

fn parse_kasme(input: &str) -> Result<[u8; KEY_256_SIZE]> {
    let bytes = parse_hex(input)?;
    <[u8; KEY_256_SIZE]>::try_from(bytes.as_slice())
        .map_err(|_| anyhow!("KASME must be {} bytes, got {}", KEY_256_SIZE, bytes.len()))
}

/// Algorithms from the arguments, falling back to the configured priorities
fn algorithms(config: &NasConfig, security: &SecurityArgs) -> Result<(EiaId, EeaId)> {
    let eia = match security.eia {
        Some(id) => id,
        None => *config.integrity_ids()?.first().context("No integrity algorithm configured")?,
    };
    let eea = match security.eea {
        Some(id) => id,
        None => *config.ciphering_ids()?.first().context("No ciphering algorithm configured")?,
    };
    let eia = EiaId::try_from(eia).map_err(|_| anyhow!("Unknown integrity algorithm EIA{}", eia))?;
    let eea = EeaId::try_from(eea).map_err(|_| anyhow!("Unknown ciphering algorithm EEA{}", eea))?;
    Ok((eia, eea))
}

/// Established context positioned at `--count`, or `None` without `--kasme`
fn security_context(config: &NasConfig, security: &SecurityArgs) -> Result<Option<SecurityContext>> {
    let Some(kasme) = security.kasme.as_deref() else {
        return Ok(None);
    };
    let kasme = parse_kasme(kasme)?;
    let (eia, eea) = algorithms(config, security)?;

    let mut ctx = SecurityContext::with_freshness_window(config.freshness_window);
    ctx.establish(&kasme, eia, eea);
    ctx.counters_mut()
        .set(security.direction.into(), security.count)
        .with_context(|| format!("COUNT {:#x} is out of range", security.count))?;
    Ok(Some(ctx))
}

pub fn decode(config: &NasConfig, pdu: &str, security: &SecurityArgs, dump: bool) -> Result<()> {
    let bytes = parse_hex(pdu)?;
    if dump {
        println!("{}", format_hex_dump(&bytes));
    }
    log_nas_message(MessageDirection::Rx, "input", &bytes);

    let (sht, pd) = parse_header(&bytes).context("Invalid NAS header")?;
    let direction = Direction::from(security.direction);

    let message = if pd == ProtocolDiscriminator::EpsSessionManagement || sht == SecurityHeaderType::Plain {
        decode_nas(&bytes)?
    } else if let Some(mut ctx) = security_context(config, security)? {
        let result = authenticate(&mut ctx, &bytes, direction)?;
        println!("Authentication: {:?}", result);
        result.into_result()?;
        decode_secure(&ctx, &bytes, direction)?
    } else {
        decode_secure(&SecurityContext::new(), &bytes, direction)
            .with_context(|| format!("{:?} PDUs need a security context (--kasme)", sht))?
    };

    println!("{:#?}", message);
    Ok(())
}

pub fn encode(config: &NasConfig, plain: &str, sht: u8, ksi: u8, security: &SecurityArgs) -> Result<()> {
    let ctx = security_context(config, security)?.context("Encoding needs a security context (--kasme)")?;
    let direction = Direction::from(security.direction);
    let sht = SecurityHeaderType::from(sht);

    let pdu = match sht {
        SecurityHeaderType::ServiceRequest => {
            if direction != Direction::Uplink {
                warn!("SERVICE REQUEST is an uplink message; using the uplink direction");
            }
            encode_service_request(&ctx, ksi, security.count)?
        }
        sht if sht.is_integrity_protected() => {
            let plain = parse_hex(plain)?;
            let (_, pd) = parse_header(&plain).context("Invalid plain NAS header")?;
            protect(&ctx, pd, sht, direction, security.count, &plain)?
        }
        other => bail!("Cannot secure with security header type {:?}", other),
    };

    log_nas_message(MessageDirection::Tx, "secured", &pdu);
    println!("{}", hex::encode(&pdu));
    Ok(())
}

pub fn derive(config: &NasConfig, security: &SecurityArgs) -> Result<()> {
    let kasme = parse_kasme(security.kasme.as_deref().context("Key derivation needs --kasme")?)?;
    let (eia, eea) = algorithms(config, security)?;

    println!("KNASint ({:?}): {}", eia, hex::encode(derive_knas_int(&kasme, eia.into())));
    println!("KNASenc ({:?}): {}", eea, hex::encode(derive_knas_enc(&kasme, eea.into())));
    println!(
        "KeNB (uplink COUNT {}): {}",
        security.count,
        hex::encode(derive_kenb(&kasme, security.count))
    );
    Ok(())
}
