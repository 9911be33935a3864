//! EIA (EPS integrity algorithms)
//!
//! - 128-EIA1: SNOW 3G based (UIA2 construction)
//! - 128-EIA2: AES-128-CMAC based
//! - 128-EIA3: ZUC based
//!
//! Every function authenticates the first `bit_length` bits of `message`
//! and returns the 32-bit MAC-I big-endian.
//!
//! Reference: 3GPP TS 33.401 Annex B.2, TS 35.223

use aes::Aes128;
use cmac::{Cmac, Mac};
use zuc::ZUC128;

use crate::snow3g::uia2_f9;

/// Key size in bytes (128 bits)
pub const KEY_SIZE: usize = 16;

/// MAC size in bytes (32 bits)
pub const MAC_SIZE: usize = 4;

/// Clamp `bit_length` to what `message` can actually hold.
fn effective_bits(message: &[u8], bit_length: usize) -> usize {
    bit_length.min(message.len() * 8)
}

/// 128-EIA1 (SNOW 3G)
///
/// FRESH is `BEARER` left-aligned in a 32-bit word.
pub fn eia1_compute_mac(
    key: &[u8; KEY_SIZE],
    count: u32,
    bearer: u8,
    direction: u8,
    message: &[u8],
    bit_length: usize,
) -> [u8; MAC_SIZE] {
    let fresh = ((bearer & 0x1F) as u32) << 27;
    let bits = effective_bits(message, bit_length) as u64;
    uia2_f9(key, count, fresh, (direction & 0x01) as u32, message, bits).to_be_bytes()
}

/// 128-EIA2 (AES-CMAC)
///
/// CMAC input is `COUNT || BEARER || DIRECTION || 0^26 || MESSAGE`; the MAC
/// is the first 32 bits of the CMAC tag. Bits beyond `bit_length` in the
/// final octet are cleared.
pub fn eia2_compute_mac(
    key: &[u8; KEY_SIZE],
    count: u32,
    bearer: u8,
    direction: u8,
    message: &[u8],
    bit_length: usize,
) -> [u8; MAC_SIZE] {
    let bits = effective_bits(message, bit_length);
    let n_bytes = bits.div_ceil(8);

    let mut input = Vec::with_capacity(8 + n_bytes);
    input.extend_from_slice(&count.to_be_bytes());
    input.push(((bearer & 0x1F) << 3) | ((direction & 0x01) << 2));
    input.extend_from_slice(&[0, 0, 0]);
    input.extend_from_slice(&message[..n_bytes]);

    let trailing = bits % 8;
    if trailing != 0 {
        if let Some(last) = input.last_mut() {
            *last &= 0xFF << (8 - trailing);
        }
    }

    let mut mac = <Cmac<Aes128> as Mac>::new(key.into());
    mac.update(&input);
    let tag = mac.finalize().into_bytes();

    let mut out = [0u8; MAC_SIZE];
    out.copy_from_slice(&tag[..MAC_SIZE]);
    out
}

/// 128-EIA3 IV (TS 35.223 section 4.3)
fn build_eia3_iv(count: u32, bearer: u8, direction: u8) -> [u8; 16] {
    let c = count.to_be_bytes();
    let b = (bearer & 0x1F) << 3;
    let d = (direction & 0x01) << 7;
    [
        c[0], c[1], c[2], c[3], b, 0, 0, 0,
        c[0] ^ d, c[1], c[2], c[3], b, 0, d, 0,
    ]
}

/// 32-bit window of the keystream starting at bit `pos`.
fn keystream_word_at(keystream: &[u32], pos: usize) -> u32 {
    let idx = pos / 32;
    let shift = pos % 32;
    let hi = keystream[idx];
    if shift == 0 {
        hi
    } else {
        (hi << shift) | (keystream[idx + 1] >> (32 - shift))
    }
}

/// 128-EIA3 (ZUC)
pub fn eia3_compute_mac(
    key: &[u8; KEY_SIZE],
    count: u32,
    bearer: u8,
    direction: u8,
    message: &[u8],
    bit_length: usize,
) -> [u8; MAC_SIZE] {
    let bits = effective_bits(message, bit_length);
    let iv = build_eia3_iv(count, bearer, direction);
    let mut zuc = ZUC128::new(key, &iv);

    let l = bits.div_ceil(32) + 2;
    let keystream: Vec<u32> = (0..l).map(|_| zuc.generate()).collect();

    let mut t = 0u32;
    for i in 0..bits {
        if (message[i / 8] >> (7 - (i % 8))) & 1 == 1 {
            t ^= keystream_word_at(&keystream, i);
        }
    }
    t ^= keystream_word_at(&keystream, bits);

    (t ^ keystream[l - 1]).to_be_bytes()
}
