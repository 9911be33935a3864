//! NAS security context
//!
//! One context per UE session, owned by the session layer and lent to the
//! codec for each call. It holds the derived NAS keys, the selected
//! algorithms and the two COUNT values. Until [`SecurityContext::establish`]
//! succeeds the context is invalid and every protected operation fails.
//!
//! # Example
//!
//! ```
//! use ltemme_nas::algorithms::{EeaId, EiaId};
//! use ltemme_nas::enums::Direction;
//! use ltemme_nas::security::SecurityContext;
//!
//! let mut ctx = SecurityContext::new();
//! assert!(!ctx.is_valid());
//!
//! ctx.establish(&[0x11; 32], EiaId::Eia2, EeaId::Eea0);
//! assert!(ctx.is_valid());
//! assert_eq!(ctx.count(Direction::Downlink), 0);
//! ```

use std::fmt;

use tracing::debug;

use ltemme_crypto::kdf::{derive_kenb, derive_knas_enc, derive_knas_int, KEY_128_SIZE, KEY_256_SIZE};

use crate::algorithms::{cipher_algorithm, integrity_algorithm, EeaId, EiaId, MAC_SIZE};
use crate::count::CounterManager;
use crate::enums::Direction;
use crate::ies::{NasKsi, UeSecurityCapability};

/// NAS signalling always uses bearer 0
pub const NAS_BEARER: u8 = 0;

/// NAS security context
#[derive(Clone, Default)]
pub struct SecurityContext {
    valid: bool,
    integrity_key: [u8; KEY_128_SIZE],
    ciphering_key: [u8; KEY_128_SIZE],
    kasme: Option<[u8; KEY_256_SIZE]>,
    integrity_algorithm: EiaId,
    ciphering_algorithm: EeaId,
    ksi: NasKsi,
    counters: CounterManager,
}

impl fmt::Debug for SecurityContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // key material stays out of logs
        f.debug_struct("SecurityContext")
            .field("valid", &self.valid)
            .field("integrity_algorithm", &self.integrity_algorithm)
            .field("ciphering_algorithm", &self.ciphering_algorithm)
            .field("ksi", &self.ksi)
            .field("counters", &self.counters)
            .finish_non_exhaustive()
    }
}

impl SecurityContext {
    /// Create an invalid context with the default freshness window
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an invalid context with a custom freshness window
    pub fn with_freshness_window(window: u8) -> Self {
        Self {
            counters: CounterManager::with_window(window),
            ..Self::default()
        }
    }

    /// Derive NAS keys from KASME, select algorithms, zero both counters
    /// and mark the context valid.
    pub fn establish(&mut self, kasme: &[u8; KEY_256_SIZE], integrity: EiaId, ciphering: EeaId) {
        self.integrity_key = derive_knas_int(kasme, integrity.into());
        self.ciphering_key = derive_knas_enc(kasme, ciphering.into());
        self.kasme = Some(*kasme);
        self.integrity_algorithm = integrity;
        self.ciphering_algorithm = ciphering;
        self.counters.reset();
        self.valid = true;
        debug!(?integrity, ?ciphering, "NAS security context established");
    }

    /// Like [`establish`](Self::establish), also recording the key set identifier
    pub fn establish_with_ksi(&mut self, kasme: &[u8; KEY_256_SIZE], ksi: NasKsi, integrity: EiaId, ciphering: EeaId) {
        self.establish(kasme, integrity, ciphering);
        self.ksi = ksi;
    }

    /// Return to the invalid state, dropping all key material
    pub fn reset(&mut self) {
        let window = self.counters.window();
        *self = Self::with_freshness_window(window);
    }

    /// Whether keys are established
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Selected integrity algorithm
    pub fn integrity_algorithm(&self) -> EiaId {
        self.integrity_algorithm
    }

    /// Selected ciphering algorithm
    pub fn ciphering_algorithm(&self) -> EeaId {
        self.ciphering_algorithm
    }

    /// `KNASint`
    pub fn integrity_key(&self) -> &[u8; KEY_128_SIZE] {
        &self.integrity_key
    }

    /// `KNASenc`
    pub fn ciphering_key(&self) -> &[u8; KEY_128_SIZE] {
        &self.ciphering_key
    }

    /// NAS key set identifier
    pub fn ksi(&self) -> NasKsi {
        self.ksi
    }

    /// Set the NAS key set identifier
    pub fn set_ksi(&mut self, ksi: NasKsi) {
        self.ksi = ksi;
    }

    /// COUNT state
    pub fn counters(&self) -> &CounterManager {
        &self.counters
    }

    /// Mutable COUNT state
    pub fn counters_mut(&mut self) -> &mut CounterManager {
        &mut self.counters
    }

    /// Stored COUNT for `direction`
    pub fn count(&self, direction: Direction) -> u32 {
        self.counters.get(direction)
    }

    /// Stored COUNT minus one
    pub fn last_count(&self, direction: Direction) -> u32 {
        self.counters.last_count(direction)
    }

    /// `KeNB` for the last uplink COUNT, if a context is established
    pub fn kenb(&self) -> Option<[u8; KEY_256_SIZE]> {
        let kasme = self.kasme.as_ref().filter(|_| self.valid)?;
        Some(derive_kenb(kasme, self.last_count(Direction::Uplink)))
    }

    /// Whether the integrity algorithm is EIA0
    pub fn is_null_integrity(&self) -> bool {
        integrity_algorithm(self.integrity_algorithm).is_null()
    }

    /// MAC over the first `bit_length` bits of `message`
    pub fn compute_mac(&self, count: u32, direction: Direction, message: &[u8], bit_length: usize) -> [u8; MAC_SIZE] {
        integrity_algorithm(self.integrity_algorithm).compute_mac(
            &self.integrity_key,
            count,
            NAS_BEARER,
            direction.bit(),
            message,
            bit_length,
        )
    }

    /// Encrypt with the selected ciphering algorithm
    pub fn encrypt(&self, count: u32, direction: Direction, plaintext: &[u8]) -> Vec<u8> {
        cipher_algorithm(self.ciphering_algorithm).encrypt(
            &self.ciphering_key,
            count,
            NAS_BEARER,
            direction.bit(),
            plaintext,
        )
    }

    /// Decrypt with the selected ciphering algorithm
    pub fn decrypt(&self, count: u32, direction: Direction, ciphertext: &[u8]) -> Vec<u8> {
        cipher_algorithm(self.ciphering_algorithm).decrypt(
            &self.ciphering_key,
            count,
            NAS_BEARER,
            direction.bit(),
            ciphertext,
        )
    }
}

/// Pick the first integrity and ciphering algorithms from the priority
/// lists that the UE supports.
///
/// Returns `None` if either list has no match. Unknown identifiers in the
/// lists are skipped; EIA0 is only chosen when it is listed.
pub fn select_algorithms(
    capability: &UeSecurityCapability,
    integrity_priority: &[u8],
    ciphering_priority: &[u8],
) -> Option<(EiaId, EeaId)> {
    let integrity = integrity_priority
        .iter()
        .filter_map(|id| EiaId::try_from(*id).ok())
        .find(|id| capability.supports_eia(*id))?;
    let ciphering = ciphering_priority
        .iter()
        .filter_map(|id| EeaId::try_from(*id).ok())
        .find(|id| capability.supports_eea(*id))?;
    Some((integrity, ciphering))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ltemme_crypto::kdf::calculate_kdf_key;

    const KASME: [u8; 32] = [0x5A; 32];

    #[test]
    fn test_new_context_is_invalid() {
        let ctx = SecurityContext::new();
        assert!(!ctx.is_valid());
        assert!(ctx.kenb().is_none());
        assert_eq!(ctx.counters().window(), crate::count::DEFAULT_FRESHNESS_WINDOW);
    }

    #[test]
    fn test_establish_derives_keys() {
        let mut ctx = SecurityContext::new();
        ctx.establish(&KASME, EiaId::Eia2, EeaId::Eea1);
        assert!(ctx.is_valid());
        assert_eq!(ctx.integrity_key(), &derive_knas_int(&KASME, 2));
        assert_eq!(ctx.ciphering_key(), &derive_knas_enc(&KASME, 1));
        assert_eq!(ctx.integrity_algorithm(), EiaId::Eia2);
        assert_eq!(ctx.ciphering_algorithm(), EeaId::Eea1);
    }

    #[test]
    fn test_establish_resets_counters() {
        let mut ctx = SecurityContext::new();
        ctx.establish(&KASME, EiaId::Eia1, EeaId::Eea0);
        ctx.counters_mut().increment(Direction::Uplink).unwrap();
        ctx.counters_mut().increment(Direction::Downlink).unwrap();
        ctx.establish(&KASME, EiaId::Eia1, EeaId::Eea0);
        assert_eq!(ctx.count(Direction::Uplink), 0);
        assert_eq!(ctx.count(Direction::Downlink), 0);
    }

    #[test]
    fn test_reset_keeps_window() {
        let mut ctx = SecurityContext::with_freshness_window(9);
        ctx.establish_with_ksi(&KASME, NasKsi::native(2), EiaId::Eia2, EeaId::Eea2);
        assert_eq!(ctx.ksi(), NasKsi::native(2));
        ctx.reset();
        assert!(!ctx.is_valid());
        assert_eq!(ctx.integrity_key(), &[0u8; 16]);
        assert!(ctx.ksi().is_no_key());
        assert_eq!(ctx.counters().window(), 9);
    }

    #[test]
    fn test_kenb_uses_last_uplink_count() {
        let mut ctx = SecurityContext::new();
        ctx.establish(&KASME, EiaId::Eia2, EeaId::Eea0);
        ctx.counters_mut().set(Direction::Uplink, 3).unwrap();
        let expected = calculate_kdf_key(&KASME, 0x11, &[&2u32.to_be_bytes()]);
        assert_eq!(ctx.kenb(), Some(expected));
    }

    #[test]
    fn test_null_integrity() {
        let mut ctx = SecurityContext::new();
        ctx.establish(&KASME, EiaId::Eia0, EeaId::Eea0);
        assert!(ctx.is_null_integrity());
        ctx.establish(&KASME, EiaId::Eia3, EeaId::Eea0);
        assert!(!ctx.is_null_integrity());
    }

    #[test]
    fn test_encrypt_decrypt() {
        let mut ctx = SecurityContext::new();
        ctx.establish(&KASME, EiaId::Eia2, EeaId::Eea2);
        let plain = b"\x07\x5e";
        let ciphered = ctx.encrypt(7, Direction::Uplink, plain);
        assert_ne!(&ciphered[..], &plain[..]);
        assert_eq!(ctx.decrypt(7, Direction::Uplink, &ciphered), plain.to_vec());
    }

    #[test]
    fn test_debug_hides_keys() {
        let mut ctx = SecurityContext::new();
        ctx.establish(&KASME, EiaId::Eia2, EeaId::Eea2);
        let debug = format!("{ctx:?}");
        assert!(!debug.contains("integrity_key"));
        assert!(debug.contains("Eia2"));
    }

    #[test]
    fn test_select_algorithms_follows_priority() {
        // UE supports EEA0, EEA1, EEA2 and EIA1, EIA2
        let cap = UeSecurityCapability::new(0xE0, 0x60);
        assert_eq!(
            select_algorithms(&cap, &[2, 1, 3, 0], &[0, 2, 1, 3]),
            Some((EiaId::Eia2, EeaId::Eea0))
        );
        assert_eq!(
            select_algorithms(&cap, &[3, 1], &[2]),
            Some((EiaId::Eia1, EeaId::Eea2))
        );
    }

    #[test]
    fn test_select_algorithms_no_match() {
        let cap = UeSecurityCapability::new(0x80, 0x20);
        assert_eq!(select_algorithms(&cap, &[1, 3], &[0]), None);
        // EIA0 supported by the UE but not configured
        let cap = UeSecurityCapability::new(0x80, 0x80);
        assert_eq!(select_algorithms(&cap, &[2], &[0]), None);
        assert_eq!(select_algorithms(&cap, &[9, 0], &[0]), Some((EiaId::Eia0, EeaId::Eea0)));
    }
}
