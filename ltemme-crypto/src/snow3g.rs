//! SNOW 3G keystream generator
//!
//! Word-oriented stream cipher underlying 128-EEA1 and 128-EIA1
//! (the UEA2/UIA2 constructions of 3GPP TS 35.215).
//!
//! Reference: ETSI TS 135 216 (SNOW 3G specification)

/// Rijndael S-box, used by S1
const SR: [u8; 256] = [
    0x63, 0x7C, 0x77, 0x7B, 0xF2, 0x6B, 0x6F, 0xC5, 0x30, 0x01, 0x67, 0x2B, 0xFE, 0xD7, 0xAB, 0x76,
    0xCA, 0x82, 0xC9, 0x7D, 0xFA, 0x59, 0x47, 0xF0, 0xAD, 0xD4, 0xA2, 0xAF, 0x9C, 0xA4, 0x72, 0xC0,
    0xB7, 0xFD, 0x93, 0x26, 0x36, 0x3F, 0xF7, 0xCC, 0x34, 0xA5, 0xE5, 0xF1, 0x71, 0xD8, 0x31, 0x15,
    0x04, 0xC7, 0x23, 0xC3, 0x18, 0x96, 0x05, 0x9A, 0x07, 0x12, 0x80, 0xE2, 0xEB, 0x27, 0xB2, 0x75,
    0x09, 0x83, 0x2C, 0x1A, 0x1B, 0x6E, 0x5A, 0xA0, 0x52, 0x3B, 0xD6, 0xB3, 0x29, 0xE3, 0x2F, 0x84,
    0x53, 0xD1, 0x00, 0xED, 0x20, 0xFC, 0xB1, 0x5B, 0x6A, 0xCB, 0xBE, 0x39, 0x4A, 0x4C, 0x58, 0xCF,
    0xD0, 0xEF, 0xAA, 0xFB, 0x43, 0x4D, 0x33, 0x85, 0x45, 0xF9, 0x02, 0x7F, 0x50, 0x3C, 0x9F, 0xA8,
    0x51, 0xA3, 0x40, 0x8F, 0x92, 0x9D, 0x38, 0xF5, 0xBC, 0xB6, 0xDA, 0x21, 0x10, 0xFF, 0xF3, 0xD2,
    0xCD, 0x0C, 0x13, 0xEC, 0x5F, 0x97, 0x44, 0x17, 0xC4, 0xA7, 0x7E, 0x3D, 0x64, 0x5D, 0x19, 0x73,
    0x60, 0x81, 0x4F, 0xDC, 0x22, 0x2A, 0x90, 0x88, 0x46, 0xEE, 0xB8, 0x14, 0xDE, 0x5E, 0x0B, 0xDB,
    0xE0, 0x32, 0x3A, 0x0A, 0x49, 0x06, 0x24, 0x5C, 0xC2, 0xD3, 0xAC, 0x62, 0x91, 0x95, 0xE4, 0x79,
    0xE7, 0xC8, 0x37, 0x6D, 0x8D, 0xD5, 0x4E, 0xA9, 0x6C, 0x56, 0xF4, 0xEA, 0x65, 0x7A, 0xAE, 0x08,
    0xBA, 0x78, 0x25, 0x2E, 0x1C, 0xA6, 0xB4, 0xC6, 0xE8, 0xDD, 0x74, 0x1F, 0x4B, 0xBD, 0x8B, 0x8A,
    0x70, 0x3E, 0xB5, 0x66, 0x48, 0x03, 0xF6, 0x0E, 0x61, 0x35, 0x57, 0xB9, 0x86, 0xC1, 0x1D, 0x9E,
    0xE1, 0xF8, 0x98, 0x11, 0x69, 0xD9, 0x8E, 0x94, 0x9B, 0x1E, 0x87, 0xE9, 0xCE, 0x55, 0x28, 0xDF,
    0x8C, 0xA1, 0x89, 0x0D, 0xBF, 0xE6, 0x42, 0x68, 0x41, 0x99, 0x2D, 0x0F, 0xB0, 0x54, 0xBB, 0x16,
];

/// S-box derived from the Dickson polynomial, used by S2
const SQ: [u8; 256] = [
    0x25, 0x24, 0x73, 0x67, 0xD7, 0xAE, 0x5C, 0x30, 0xA4, 0xEE, 0x6E, 0xCB, 0x7D, 0xB5, 0x82, 0xDB,
    0xE4, 0x8E, 0x48, 0x49, 0x4F, 0x5D, 0x6A, 0x78, 0x70, 0x88, 0xE8, 0x5F, 0x5E, 0x84, 0x65, 0xE2,
    0xD8, 0xE9, 0xCC, 0xED, 0x40, 0x2F, 0x11, 0x28, 0x57, 0xD2, 0xAC, 0xE3, 0x4A, 0x15, 0x1B, 0xB9,
    0xB2, 0x80, 0x85, 0xA6, 0x2E, 0x02, 0x47, 0x29, 0x07, 0x4B, 0x0E, 0xC1, 0x51, 0xAA, 0x89, 0xD4,
    0xCA, 0x01, 0x46, 0xB3, 0xEF, 0xDD, 0x44, 0x7B, 0xC2, 0x7F, 0xBE, 0xC3, 0x9F, 0x20, 0x4C, 0x64,
    0x83, 0xA2, 0x68, 0x42, 0x13, 0xB4, 0x41, 0xCD, 0xBA, 0xC6, 0xBB, 0x6D, 0x4D, 0x71, 0x21, 0xF4,
    0x8D, 0xB0, 0xE5, 0x93, 0xFE, 0x8F, 0xE6, 0xCF, 0x43, 0x45, 0x31, 0x22, 0x37, 0x36, 0x96, 0xFA,
    0xBC, 0x0F, 0x08, 0x52, 0x1D, 0x55, 0x1A, 0xC5, 0x4E, 0x23, 0x69, 0x7A, 0x92, 0xFF, 0x5B, 0x5A,
    0xEB, 0x9A, 0x1C, 0xA9, 0xD1, 0x7E, 0x0D, 0xFC, 0x50, 0x8A, 0xB6, 0x62, 0xF5, 0x0A, 0xF8, 0xDC,
    0x03, 0x3C, 0x0C, 0x39, 0xF1, 0xB8, 0xF3, 0x3D, 0xF2, 0xD5, 0x97, 0x66, 0x81, 0x32, 0xA0, 0x00,
    0x06, 0xCE, 0xF6, 0xEA, 0xB7, 0x17, 0xF7, 0x8C, 0x79, 0xD6, 0xA7, 0xBF, 0x8B, 0x3F, 0x1F, 0x53,
    0x63, 0x75, 0x35, 0x2C, 0x60, 0xFD, 0x27, 0xD3, 0x94, 0xA5, 0x7C, 0xA1, 0x05, 0x58, 0x2D, 0xBD,
    0xD9, 0xC7, 0xAF, 0x6B, 0x54, 0x0B, 0xE0, 0x38, 0x04, 0xC8, 0x9D, 0xE7, 0x14, 0xB1, 0x87, 0x9C,
    0xDF, 0x6F, 0xF9, 0xDA, 0x2A, 0xC4, 0x59, 0x16, 0x74, 0x91, 0xAB, 0x26, 0x61, 0x76, 0x34, 0x2B,
    0xAD, 0x99, 0xFB, 0x72, 0xEC, 0x33, 0x12, 0xDE, 0x98, 0x3B, 0xC0, 0x9B, 0x3E, 0x18, 0x10, 0x3A,
    0x56, 0xE1, 0x77, 0xC9, 0x1E, 0x9E, 0x95, 0xA3, 0x90, 0x19, 0xA8, 0x6C, 0x09, 0xD0, 0xF0, 0x86,
];


#[inline]
const fn mul_x(v: u8, c: u8) -> u8 {
    if v & 0x80 != 0 {
        (v << 1) ^ c
    } else {
        v << 1
    }
}

const fn mul_x_pow(mut v: u8, mut i: u32, c: u8) -> u8 {
    while i > 0 {
        v = mul_x(v, c);
        i -= 1;
    }
    v
}

const fn alpha_table(exponents: [u32; 4]) -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut c = 0;
    while c < 256 {
        let b = c as u8;
        table[c] = ((mul_x_pow(b, exponents[0], 0xA9) as u32) << 24)
            | ((mul_x_pow(b, exponents[1], 0xA9) as u32) << 16)
            | ((mul_x_pow(b, exponents[2], 0xA9) as u32) << 8)
            | (mul_x_pow(b, exponents[3], 0xA9) as u32);
        c += 1;
    }
    table
}

/// MULalpha lookup, computed at compile time
static MUL_ALPHA: [u32; 256] = alpha_table([23, 245, 48, 239]);

/// DIValpha lookup, computed at compile time
static DIV_ALPHA: [u32; 256] = alpha_table([16, 39, 6, 64]);

/// Column mixing shared by S1 and S2, parameterised by the reduction constant.
#[inline]
fn mix(w: [u8; 4], c: u8) -> u32 {
    let [w0, w1, w2, w3] = w;
    let r0 = mul_x(w0, c) ^ w1 ^ w2 ^ mul_x(w3, c) ^ w3;
    let r1 = mul_x(w0, c) ^ w0 ^ mul_x(w1, c) ^ w2 ^ w3;
    let r2 = w0 ^ mul_x(w1, c) ^ w1 ^ mul_x(w2, c) ^ w3;
    let r3 = w0 ^ w1 ^ mul_x(w2, c) ^ w2 ^ mul_x(w3, c);
    u32::from_be_bytes([r0, r1, r2, r3])
}

fn s1(w: u32) -> u32 {
    mix(w.to_be_bytes().map(|b| SR[b as usize]), 0x1B)
}

fn s2(w: u32) -> u32 {
    mix(w.to_be_bytes().map(|b| SQ[b as usize]), 0x69)
}

/// SNOW 3G generator state
pub struct Snow3g {
    lfsr: [u32; 16],
    r1: u32,
    r2: u32,
    r3: u32,
}

impl Snow3g {
    /// Initialise with key words `k0..k3` and IV words `iv0..iv3`
    /// (index 0 is the least significant word, as in TS 35.216).
    pub fn new(key: &[u32; 4], iv: &[u32; 4]) -> Self {
        let [k0, k1, k2, k3] = *key;
        let [iv0, iv1, iv2, iv3] = *iv;
        let ones = u32::MAX;

        let mut snow = Self {
            lfsr: [
                k0 ^ ones,
                k1 ^ ones,
                k2 ^ ones,
                k3 ^ ones,
                k0,
                k1,
                k2,
                k3,
                k0 ^ ones,
                k1 ^ ones ^ iv3,
                k2 ^ ones ^ iv2,
                k3 ^ ones,
                k0 ^ iv1,
                k1,
                k2,
                k3 ^ iv0,
            ],
            r1: 0,
            r2: 0,
            r3: 0,
        };

        for _ in 0..32 {
            let f = snow.clock_fsm();
            snow.clock_lfsr(f);
        }

        // First keystream-mode clock, output discarded
        snow.clock_fsm();
        snow.clock_lfsr(0);
        snow
    }

    /// Build a generator from a 128-bit key and a 128-bit IV, both big-endian.
    pub fn from_bytes(key: &[u8; 16], iv: [u32; 4]) -> Self {
        let word = |i: usize| u32::from_be_bytes([key[i], key[i + 1], key[i + 2], key[i + 3]]);
        Self::new(&[word(12), word(8), word(4), word(0)], &iv)
    }

    fn clock_lfsr(&mut self, f: u32) {
        let s0 = self.lfsr[0];
        let s11 = self.lfsr[11];
        let v = (s0 << 8)
            ^ MUL_ALPHA[(s0 >> 24) as usize]
            ^ self.lfsr[2]
            ^ (s11 >> 8)
            ^ DIV_ALPHA[(s11 & 0xFF) as usize]
            ^ f;
        self.lfsr.copy_within(1.., 0);
        self.lfsr[15] = v;
    }

    fn clock_fsm(&mut self) -> u32 {
        let f = self.lfsr[15].wrapping_add(self.r1) ^ self.r2;
        let r = self.r2.wrapping_add(self.r3 ^ self.lfsr[5]);
        self.r3 = s2(self.r2);
        self.r2 = s1(self.r1);
        self.r1 = r;
        f
    }

    /// Produce the next keystream word.
    pub fn next_word(&mut self) -> u32 {
        let z = self.clock_fsm() ^ self.lfsr[0];
        self.clock_lfsr(0);
        z
    }

    /// Fill `keystream` with consecutive keystream words.
    pub fn generate_keystream(&mut self, keystream: &mut [u32]) {
        for ks in keystream.iter_mut() {
            *ks = self.next_word();
        }
    }
}

/// UEA2 (f8): XOR `data` in place with the SNOW 3G keystream.
///
/// `length` is the message length in bits; only `ceil(length / 8)` bytes of
/// `data` are touched.
pub fn uea2_f8(key: &[u8; 16], count: u32, bearer: u32, direction: u32, data: &mut [u8], length: u32) {
    let bd = ((bearer & 0x1F) << 27) | ((direction & 0x1) << 26);
    let mut snow = Snow3g::from_bytes(key, [bd, count, bd, count]);

    let n_bytes = (length as usize).div_ceil(8).min(data.len());
    for chunk in data[..n_bytes].chunks_mut(4) {
        let ks = snow.next_word().to_be_bytes();
        for (byte, k) in chunk.iter_mut().zip(ks) {
            *byte ^= k;
        }
    }
}

#[inline]
fn mul64x(v: u64, c: u64) -> u64 {
    if v & (1 << 63) != 0 {
        (v << 1) ^ c
    } else {
        v << 1
    }
}

/// MUL64(V, P, c) in GF(2^64)
fn mul64(v: u64, p: u64, c: u64) -> u64 {
    let mut result = 0u64;
    let mut acc = v;
    for i in 0..64 {
        if (p >> i) & 1 != 0 {
            result ^= acc;
        }
        acc = mul64x(acc, c);
    }
    result
}

/// Read the `index`-th 64-bit block of a bit string of `length` bits,
/// zero-padding past the end and masking bits beyond `length`.
fn message_block(data: &[u8], index: usize, length: u64) -> u64 {
    let start = index * 8;
    let mut bytes = [0u8; 8];
    for (j, b) in bytes.iter_mut().enumerate() {
        if let Some(v) = data.get(start + j) {
            *b = *v;
        }
    }
    let block = u64::from_be_bytes(bytes);

    let block_end = (index as u64 + 1) * 64;
    if block_end > length {
        let valid = 64 - (block_end - length);
        if valid == 0 {
            0
        } else {
            block & (u64::MAX << (64 - valid))
        }
    } else {
        block
    }
}

/// UIA2 (f9): 32-bit MAC over the first `length` bits of `data`.
pub fn uia2_f9(key: &[u8; 16], count: u32, fresh: u32, direction: u32, data: &[u8], length: u64) -> u32 {
    let iv = [fresh ^ (direction << 15), count ^ (direction << 31), fresh, count];
    let mut snow = Snow3g::from_bytes(key, iv);
    let mut z = [0u32; 5];
    snow.generate_keystream(&mut z);

    let p = ((z[0] as u64) << 32) | z[1] as u64;
    let q = ((z[2] as u64) << 32) | z[3] as u64;
    const C: u64 = 0x1B;

    let blocks = length.div_ceil(64) as usize;
    let mut eval = 0u64;
    for i in 0..blocks {
        eval = mul64(eval ^ message_block(data, i, length), p, C);
    }
    eval ^= length;
    eval = mul64(eval, q, C);

    ((eval >> 32) as u32) ^ z[4]
}
