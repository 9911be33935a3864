//! Key derivation functions for EPS security
//!
//! Implements the generic KDF of 3GPP TS 33.220 Annex B and the EPS key
//! derivations of TS 33.401 Annex A rooted at KASME:
//! - `KNASint` / `KNASenc`: NAS integrity and ciphering keys
//! - `KeNB`: key handed to the eNodeB at initial context setup
//! - `NH`: next-hop key for handover key chaining

use hmac::{Hmac, Mac};
use sha2::Sha256;

/// HMAC-SHA256 output size in bytes
pub const HMAC_SHA256_SIZE: usize = 32;

/// Key size for 256-bit keys
pub const KEY_256_SIZE: usize = 32;

/// Key size for 128-bit keys
pub const KEY_128_SIZE: usize = 16;

/// FC values for key derivation (3GPP TS 33.401 Annex A.7)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FcValue {
    /// FC = 0x11: Derivation of `KeNB` from KASME
    Kenb = 0x11,
    /// FC = 0x12: Derivation of NH from KASME
    Nh = 0x12,
    /// FC = 0x15: Derivation of NAS and AS algorithm keys
    AlgorithmKey = 0x15,
}

/// Algorithm type distinguisher (TS 33.401 Annex A.7)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AlgorithmTypeDistinguisher {
    /// NAS encryption algorithm
    NasEnc = 0x01,
    /// NAS integrity algorithm
    NasInt = 0x02,
    /// RRC encryption algorithm
    RrcEnc = 0x03,
    /// RRC integrity algorithm
    RrcInt = 0x04,
    /// UP encryption algorithm
    UpEnc = 0x05,
    /// UP integrity algorithm
    UpInt = 0x06,
}

/// Compute HMAC-SHA256 over `input` keyed with `key`.
pub fn hmac_sha256(key: &[u8], input: &[u8]) -> [u8; HMAC_SHA256_SIZE] {
    let mut mac = Hmac::<Sha256>::new_from_slice(key)
        .unwrap_or_else(|_| unreachable!("HMAC-SHA256 accepts keys of any size"));
    mac.update(input);
    let mut output = [0u8; HMAC_SHA256_SIZE];
    output.copy_from_slice(&mac.finalize().into_bytes());
    output
}

/// Generic KDF: `HMAC-SHA256(key, FC || P0 || L0 || ... || Pn || Ln)`
///
/// Each `Li` is the length of `Pi` encoded as two big-endian octets.
pub fn calculate_kdf_key(key: &[u8; KEY_256_SIZE], fc: u8, parameters: &[&[u8]]) -> [u8; KEY_256_SIZE] {
    let mut input = Vec::with_capacity(1 + parameters.iter().map(|p| p.len() + 2).sum::<usize>());
    input.push(fc);
    for param in parameters {
        input.extend_from_slice(param);
        input.extend_from_slice(&(param.len() as u16).to_be_bytes());
    }
    hmac_sha256(key, &input)
}

/// Derive a 128-bit algorithm key from KASME.
///
/// The KDF input is `0x15 || distinguisher || 0x00 0x01 || algorithm_id || 0x00 0x01`
/// and the key is the least significant 128 bits of the 256-bit output.
pub fn derive_nas_key(kasme: &[u8; KEY_256_SIZE], distinguisher: u8, algorithm_id: u8) -> [u8; KEY_128_SIZE] {
    let output = calculate_kdf_key(kasme, FcValue::AlgorithmKey as u8, &[&[distinguisher], &[algorithm_id]]);
    let mut key = [0u8; KEY_128_SIZE];
    key.copy_from_slice(&output[KEY_256_SIZE - KEY_128_SIZE..]);
    key
}

/// Derive `KNASint` for the given EIA algorithm identifier.
pub fn derive_knas_int(kasme: &[u8; KEY_256_SIZE], algorithm_id: u8) -> [u8; KEY_128_SIZE] {
    derive_nas_key(kasme, AlgorithmTypeDistinguisher::NasInt as u8, algorithm_id)
}

/// Derive `KNASenc` for the given EEA algorithm identifier.
pub fn derive_knas_enc(kasme: &[u8; KEY_256_SIZE], algorithm_id: u8) -> [u8; KEY_128_SIZE] {
    derive_nas_key(kasme, AlgorithmTypeDistinguisher::NasEnc as u8, algorithm_id)
}

/// Derive `KeNB` from KASME and the uplink NAS COUNT (TS 33.401 A.3).
pub fn derive_kenb(kasme: &[u8; KEY_256_SIZE], uplink_nas_count: u32) -> [u8; KEY_256_SIZE] {
    calculate_kdf_key(kasme, FcValue::Kenb as u8, &[&uplink_nas_count.to_be_bytes()])
}

/// Derive NH from KASME and the sync input (TS 33.401 A.4).
///
/// The sync input is `KeNB` for the first NH and the previous NH afterwards.
pub fn derive_nh(kasme: &[u8; KEY_256_SIZE], sync_input: &[u8; KEY_256_SIZE]) -> [u8; KEY_256_SIZE] {
    calculate_kdf_key(kasme, FcValue::Nh as u8, &[sync_input])
}
