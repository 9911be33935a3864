//! EPS NAS security algorithm registry
//!
//! Each algorithm identifier maps to one implementation in a static,
//! read-only table. EIA0 is the null integrity algorithm: it produces a zero
//! MAC and callers skip MAC comparison for it. EEA0 leaves data unchanged.

use num_enum::{IntoPrimitive, TryFromPrimitive};

use ltemme_crypto::eea::{eea1_apply, eea2_apply, eea3_apply};
use ltemme_crypto::eia::{eia1_compute_mac, eia2_compute_mac, eia3_compute_mac};

/// Key size of every NAS algorithm (128 bits)
pub const KEY_SIZE: usize = 16;

/// MAC size (32 bits)
pub const MAC_SIZE: usize = 4;

/// EPS integrity algorithm identifier (TS 33.401 Section 5.1.4.1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum EiaId {
    /// Null integrity protection
    #[default]
    Eia0 = 0,
    /// 128-EIA1 (SNOW 3G)
    Eia1 = 1,
    /// 128-EIA2 (AES)
    Eia2 = 2,
    /// 128-EIA3 (ZUC)
    Eia3 = 3,
}

/// EPS encryption algorithm identifier (TS 33.401 Section 5.1.3.2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum EeaId {
    /// Null ciphering
    #[default]
    Eea0 = 0,
    /// 128-EEA1 (SNOW 3G)
    Eea1 = 1,
    /// 128-EEA2 (AES)
    Eea2 = 2,
    /// 128-EEA3 (ZUC)
    Eea3 = 3,
}

impl EiaId {
    /// All identifiers in numeric order
    pub const ALL: [EiaId; 4] = [EiaId::Eia0, EiaId::Eia1, EiaId::Eia2, EiaId::Eia3];
}

impl EeaId {
    /// All identifiers in numeric order
    pub const ALL: [EeaId; 4] = [EeaId::Eea0, EeaId::Eea1, EeaId::Eea2, EeaId::Eea3];
}

/// An EPS integrity algorithm
pub trait IntegrityAlgorithm: Send + Sync {
    /// Identifier
    fn id(&self) -> EiaId;

    /// Display name, e.g. `128-EIA2`
    fn name(&self) -> &'static str;

    /// True for EIA0, whose MAC is never checked
    fn is_null(&self) -> bool {
        false
    }

    /// MAC-I over the first `bit_length` bits of `message`
    fn compute_mac(
        &self,
        key: &[u8; KEY_SIZE],
        count: u32,
        bearer: u8,
        direction: u8,
        message: &[u8],
        bit_length: usize,
    ) -> [u8; MAC_SIZE];
}

/// An EPS ciphering algorithm
///
/// Output length always equals input length.
pub trait CipherAlgorithm: Send + Sync {
    /// Identifier
    fn id(&self) -> EeaId;

    /// Display name, e.g. `128-EEA2`
    fn name(&self) -> &'static str;

    /// Encrypt `plaintext`
    fn encrypt(&self, key: &[u8; KEY_SIZE], count: u32, bearer: u8, direction: u8, plaintext: &[u8]) -> Vec<u8>;

    /// Decrypt `ciphertext`
    fn decrypt(&self, key: &[u8; KEY_SIZE], count: u32, bearer: u8, direction: u8, ciphertext: &[u8]) -> Vec<u8> {
        // every EEA is a keystream XOR
        self.encrypt(key, count, bearer, direction, ciphertext)
    }
}

// ============================================================================
// Integrity implementations
// ============================================================================

struct Eia0;
struct Eia1;
struct Eia2;
struct Eia3;

impl IntegrityAlgorithm for Eia0 {
    fn id(&self) -> EiaId {
        EiaId::Eia0
    }

    fn name(&self) -> &'static str {
        "EIA0"
    }

    fn is_null(&self) -> bool {
        true
    }

    fn compute_mac(&self, _: &[u8; KEY_SIZE], _: u32, _: u8, _: u8, _: &[u8], _: usize) -> [u8; MAC_SIZE] {
        [0; MAC_SIZE]
    }
}

impl IntegrityAlgorithm for Eia1 {
    fn id(&self) -> EiaId {
        EiaId::Eia1
    }

    fn name(&self) -> &'static str {
        "128-EIA1"
    }

    fn compute_mac(
        &self,
        key: &[u8; KEY_SIZE],
        count: u32,
        bearer: u8,
        direction: u8,
        message: &[u8],
        bit_length: usize,
    ) -> [u8; MAC_SIZE] {
        eia1_compute_mac(key, count, bearer, direction, message, bit_length)
    }
}

impl IntegrityAlgorithm for Eia2 {
    fn id(&self) -> EiaId {
        EiaId::Eia2
    }

    fn name(&self) -> &'static str {
        "128-EIA2"
    }

    fn compute_mac(
        &self,
        key: &[u8; KEY_SIZE],
        count: u32,
        bearer: u8,
        direction: u8,
        message: &[u8],
        bit_length: usize,
    ) -> [u8; MAC_SIZE] {
        eia2_compute_mac(key, count, bearer, direction, message, bit_length)
    }
}

impl IntegrityAlgorithm for Eia3 {
    fn id(&self) -> EiaId {
        EiaId::Eia3
    }

    fn name(&self) -> &'static str {
        "128-EIA3"
    }

    fn compute_mac(
        &self,
        key: &[u8; KEY_SIZE],
        count: u32,
        bearer: u8,
        direction: u8,
        message: &[u8],
        bit_length: usize,
    ) -> [u8; MAC_SIZE] {
        eia3_compute_mac(key, count, bearer, direction, message, bit_length)
    }
}

// ============================================================================
// Ciphering implementations
// ============================================================================

struct Eea0;
struct Eea1;
struct Eea2;
struct Eea3;

impl CipherAlgorithm for Eea0 {
    fn id(&self) -> EeaId {
        EeaId::Eea0
    }

    fn name(&self) -> &'static str {
        "EEA0"
    }

    fn encrypt(&self, _: &[u8; KEY_SIZE], _: u32, _: u8, _: u8, plaintext: &[u8]) -> Vec<u8> {
        plaintext.to_vec()
    }
}

macro_rules! keystream_cipher {
    ($ty:ident, $id:expr, $name:literal, $apply:path) => {
        impl CipherAlgorithm for $ty {
            fn id(&self) -> EeaId {
                $id
            }

            fn name(&self) -> &'static str {
                $name
            }

            fn encrypt(&self, key: &[u8; KEY_SIZE], count: u32, bearer: u8, direction: u8, plaintext: &[u8]) -> Vec<u8> {
                let mut data = plaintext.to_vec();
                $apply(key, count, bearer, direction, &mut data);
                data
            }
        }
    };
}

keystream_cipher!(Eea1, EeaId::Eea1, "128-EEA1", eea1_apply);
keystream_cipher!(Eea2, EeaId::Eea2, "128-EEA2", eea2_apply);
keystream_cipher!(Eea3, EeaId::Eea3, "128-EEA3", eea3_apply);

// ============================================================================
// Registry
// ============================================================================

static INTEGRITY_ALGORITHMS: [&dyn IntegrityAlgorithm; 4] = [&Eia0, &Eia1, &Eia2, &Eia3];

static CIPHER_ALGORITHMS: [&dyn CipherAlgorithm; 4] = [&Eea0, &Eea1, &Eea2, &Eea3];

/// Implementation of an integrity algorithm
pub fn integrity_algorithm(id: EiaId) -> &'static dyn IntegrityAlgorithm {
    INTEGRITY_ALGORITHMS[u8::from(id) as usize]
}

/// Implementation of a ciphering algorithm
pub fn cipher_algorithm(id: EeaId) -> &'static dyn CipherAlgorithm {
    CIPHER_ALGORITHMS[u8::from(id) as usize]
}
