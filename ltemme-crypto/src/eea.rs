//! EEA (EPS encryption algorithms)
//!
//! - 128-EEA1: SNOW 3G based (UEA2 construction)
//! - 128-EEA2: AES-128 in counter mode
//! - 128-EEA3: ZUC based
//!
//! All three are keystream XORs, so the same call encrypts and decrypts and
//! the output length always equals the input length.
//!
//! Reference: 3GPP TS 33.401 Annex B.1, TS 35.222

use aes::Aes128;
use ctr::cipher::{KeyIvInit, StreamCipher};
use zuc::ZUC128;

use crate::snow3g::uea2_f8;

/// Key size in bytes (128 bits)
pub const KEY_SIZE: usize = 16;

/// IV size in bytes (128 bits)
pub const IV_SIZE: usize = 16;

type Aes128Ctr = ctr::Ctr128BE<Aes128>;

/// `COUNT || BEARER || DIRECTION || 0...` as used by EEA2 and EEA3.
fn count_bearer_direction(count: u32, bearer: u8, direction: u8) -> [u8; 8] {
    let c = count.to_be_bytes();
    [c[0], c[1], c[2], c[3], ((bearer & 0x1F) << 3) | ((direction & 0x01) << 2), 0, 0, 0]
}

/// 128-EEA1 (SNOW 3G), applied in place.
pub fn eea1_apply(key: &[u8; KEY_SIZE], count: u32, bearer: u8, direction: u8, data: &mut [u8]) {
    let bits = (data.len() * 8) as u32;
    uea2_f8(key, count, (bearer & 0x1F) as u32, (direction & 0x01) as u32, data, bits);
}

fn build_eea2_iv(count: u32, bearer: u8, direction: u8) -> [u8; IV_SIZE] {
    let mut iv = [0u8; IV_SIZE];
    iv[..8].copy_from_slice(&count_bearer_direction(count, bearer, direction));
    iv
}

/// 128-EEA2 (AES-CTR), applied in place.
pub fn eea2_apply(key: &[u8; KEY_SIZE], count: u32, bearer: u8, direction: u8, data: &mut [u8]) {
    let iv = build_eea2_iv(count, bearer, direction);
    let mut cipher = Aes128Ctr::new(key.into(), &iv.into());
    cipher.apply_keystream(data);
}

fn build_eea3_iv(count: u32, bearer: u8, direction: u8) -> [u8; IV_SIZE] {
    let half = count_bearer_direction(count, bearer, direction);
    let mut iv = [0u8; IV_SIZE];
    iv[..8].copy_from_slice(&half);
    iv[8..].copy_from_slice(&half);
    iv
}

/// 128-EEA3 (ZUC), applied in place.
pub fn eea3_apply(key: &[u8; KEY_SIZE], count: u32, bearer: u8, direction: u8, data: &mut [u8]) {
    let iv = build_eea3_iv(count, bearer, direction);
    let mut zuc = ZUC128::new(key, &iv);
    for chunk in data.chunks_mut(4) {
        let ks = zuc.generate().to_be_bytes();
        for (byte, k) in chunk.iter_mut().zip(ks) {
            *byte ^= k;
        }
    }
}
