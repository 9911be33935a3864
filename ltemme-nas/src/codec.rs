//! NAS IE encoding/decoding traits and utilities
//!
//! Information element formats of 3GPP TS 24.007 Section 11.2:
//! - V: value only, fixed length (including half-octet values)
//! - LV: 1-byte length then value
//! - LV-E: 2-byte length then value
//! - TV / TLV / TLV-E: the above preceded by an IEI, used for optional IEs
//!
//! Optional IEs are gathered into an [`OptionalIes`] table in wire order.
//! Type 1 IEIs (bit 8 set) occupy the high nibble of a single octet and are
//! matched on that nibble; all other IEIs are matched exactly.

use bytes::{Buf, BufMut};
use thiserror::Error;
use tracing::trace;

/// Errors that can occur during NAS encoding/decoding
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Buffer does not have enough bytes for decoding
    #[error("Buffer too short: expected at least {expected} bytes, got {actual}")]
    BufferTooShort {
        /// Expected minimum bytes
        expected: usize,
        /// Actual bytes available
        actual: usize,
    },

    /// Length field exceeds remaining buffer
    #[error("Length exceeds buffer: length field is {length}, but only {remaining} bytes remain")]
    LengthExceedsBuffer {
        /// Length specified in the length field
        length: usize,
        /// Remaining bytes in buffer
        remaining: usize,
    },

    /// Invalid value encountered during decoding
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Invalid Information Element Identifier
    #[error("Invalid IEI: 0x{0:02X}")]
    InvalidIei(u8),

    /// Encoding error
    #[error("Encoding error: {0}")]
    EncodingError(String),
}

/// Result type for NAS codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Trait for encoding NAS messages and Information Elements to bytes
pub trait NasEncode {
    /// Encode this value to the provided buffer
    fn nas_encode<B: BufMut>(&self, buf: &mut B) -> CodecResult<()>;

    /// Returns the encoded size in bytes
    fn encoded_len(&self) -> usize;
}

/// Trait for decoding NAS messages and Information Elements from bytes
pub trait NasDecode: Sized {
    /// Decode a value from the provided buffer
    fn nas_decode<B: Buf>(buf: &mut B) -> CodecResult<Self>;
}

// ============================================================================
// Primitive readers and writers
// ============================================================================

/// Fail with `BufferTooShort` unless `needed` bytes remain.
pub fn ensure_remaining<B: Buf>(buf: &B, needed: usize) -> CodecResult<()> {
    if buf.remaining() < needed {
        return Err(CodecError::BufferTooShort {
            expected: needed,
            actual: buf.remaining(),
        });
    }
    Ok(())
}

/// Read a single octet.
pub fn read_u8<B: Buf>(buf: &mut B) -> CodecResult<u8> {
    ensure_remaining(buf, 1)?;
    Ok(buf.get_u8())
}

/// Read a fixed-length value (format V).
pub fn read_array<B: Buf, const N: usize>(buf: &mut B) -> CodecResult<[u8; N]> {
    ensure_remaining(buf, N)?;
    let mut value = [0u8; N];
    buf.copy_to_slice(&mut value);
    Ok(value)
}

fn read_bytes<B: Buf>(buf: &mut B, length: usize) -> CodecResult<Vec<u8>> {
    if buf.remaining() < length {
        return Err(CodecError::LengthExceedsBuffer {
            length,
            remaining: buf.remaining(),
        });
    }
    let mut value = vec![0u8; length];
    buf.copy_to_slice(&mut value);
    Ok(value)
}

/// Read a value with a 1-byte length prefix (format LV).
pub fn read_lv<B: Buf>(buf: &mut B) -> CodecResult<Vec<u8>> {
    let length = read_u8(buf)? as usize;
    read_bytes(buf, length)
}

/// Read a value with a 2-byte length prefix (format LV-E).
pub fn read_lv_e<B: Buf>(buf: &mut B) -> CodecResult<Vec<u8>> {
    ensure_remaining(buf, 2)?;
    let length = buf.get_u16() as usize;
    read_bytes(buf, length)
}

/// Write a value with a 1-byte length prefix (format LV).
pub fn write_lv<B: BufMut>(buf: &mut B, value: &[u8]) -> CodecResult<()> {
    let length = u8::try_from(value.len()).map_err(|_| {
        CodecError::EncodingError(format!("LV length {} exceeds maximum of 255", value.len()))
    })?;
    buf.put_u8(length);
    buf.put_slice(value);
    Ok(())
}

/// Write a value with a 2-byte length prefix (format LV-E).
pub fn write_lv_e<B: BufMut>(buf: &mut B, value: &[u8]) -> CodecResult<()> {
    let length = u16::try_from(value.len()).map_err(|_| {
        CodecError::EncodingError(format!("LV-E length {} exceeds maximum of 65535", value.len()))
    })?;
    buf.put_u16(length);
    buf.put_slice(value);
    Ok(())
}

/// Split an octet into (high nibble, low nibble).
pub fn split_nibbles(octet: u8) -> (u8, u8) {
    (octet >> 4, octet & 0x0F)
}

/// Join a high and low nibble into one octet.
pub fn join_nibbles(high: u8, low: u8) -> u8 {
    ((high & 0x0F) << 4) | (low & 0x0F)
}

// ============================================================================
// Optional IEs
// ============================================================================

/// Wire format of an optional IE following its IEI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IeFormat {
    /// Type 1: value in the low nibble of the IEI octet
    HalfOctet,
    /// Type 2: IEI only
    TypeOnly,
    /// Type 3: fixed-length value of the given size (excluding the IEI)
    Tv(usize),
    /// Type 4: 1-byte length then value
    Tlv,
    /// Type 6: 2-byte length then value
    TlvE,
}

/// Returns true if `iei` names a type 1 or type 2 IE (single octet).
pub fn is_single_octet_iei(iei: u8) -> bool {
    iei & 0x80 != 0
}

/// A decoded optional IE
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionalIe {
    /// Full IEI octet; for half-octet IEs the low nibble carries the value
    pub iei: u8,
    /// Wire format
    pub format: IeFormat,
    /// Value octets (empty for type 1 and type 2)
    pub value: Vec<u8>,
}

impl OptionalIe {
    /// Build a half-octet IE from its IEI nibble (e.g. `0xC0`) and 4-bit value.
    pub fn half_octet(iei: u8, value: u8) -> Self {
        Self {
            iei: (iei & 0xF0) | (value & 0x0F),
            format: IeFormat::HalfOctet,
            value: Vec::new(),
        }
    }

    /// Build a TLV IE.
    pub fn tlv(iei: u8, value: Vec<u8>) -> Self {
        Self { iei, format: IeFormat::Tlv, value }
    }

    /// Build a TV IE.
    pub fn tv(iei: u8, value: Vec<u8>) -> Self {
        let len = value.len();
        Self { iei, format: IeFormat::Tv(len), value }
    }

    /// Build a TLV-E IE.
    pub fn tlv_e(iei: u8, value: Vec<u8>) -> Self {
        Self { iei, format: IeFormat::TlvE, value }
    }

    /// The 4-bit value of a half-octet IE
    pub fn half_value(&self) -> u8 {
        self.iei & 0x0F
    }

    /// Whether this IE answers to `iei` under the lookup rule
    pub fn matches(&self, iei: u8) -> bool {
        if is_single_octet_iei(iei) && self.format == IeFormat::HalfOctet {
            self.iei & 0xF0 == iei & 0xF0
        } else {
            self.iei == iei
        }
    }
}

impl NasEncode for OptionalIe {
    fn nas_encode<B: BufMut>(&self, buf: &mut B) -> CodecResult<()> {
        buf.put_u8(self.iei);
        match self.format {
            IeFormat::HalfOctet | IeFormat::TypeOnly => Ok(()),
            IeFormat::Tv(len) => {
                if self.value.len() != len {
                    return Err(CodecError::EncodingError(format!(
                        "TV IE 0x{:02X} expects {} value bytes, has {}",
                        self.iei,
                        len,
                        self.value.len()
                    )));
                }
                buf.put_slice(&self.value);
                Ok(())
            }
            IeFormat::Tlv => write_lv(buf, &self.value),
            IeFormat::TlvE => write_lv_e(buf, &self.value),
        }
    }

    fn encoded_len(&self) -> usize {
        1 + match self.format {
            IeFormat::HalfOctet | IeFormat::TypeOnly => 0,
            IeFormat::Tv(len) => len,
            IeFormat::Tlv => 1 + self.value.len(),
            IeFormat::TlvE => 2 + self.value.len(),
        }
    }
}

/// Known optional IEs of one message: `(iei, format)`.
///
/// Half-octet entries are listed with the IEI in the high nibble, e.g. `0xC0`.
pub type IeTable = &'static [(u8, IeFormat)];

fn format_for(table: IeTable, iei: u8) -> IeFormat {
    if is_single_octet_iei(iei) {
        return table
            .iter()
            .find(|(known, _)| known & 0xF0 == iei & 0xF0 && is_single_octet_iei(*known))
            .map(|(_, format)| *format)
            .unwrap_or(IeFormat::HalfOctet);
    }
    if let Some((_, format)) = table.iter().find(|(known, _)| *known == iei) {
        return *format;
    }
    // TS 24.007 11.2.4: IEIs 0x7X are TLV-E in EPS, other unknown ones TLV
    if iei & 0xF0 == 0x70 {
        IeFormat::TlvE
    } else {
        IeFormat::Tlv
    }
}

/// Optional IEs of a message in wire order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionalIes {
    ies: Vec<OptionalIe>,
}

impl OptionalIes {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode every remaining optional IE from `buf`.
    ///
    /// Unknown IEIs are kept, formatted by the TS 24.007 comprehension rules,
    /// so a decoded message re-encodes unchanged.
    pub fn decode<B: Buf>(buf: &mut B, table: IeTable) -> CodecResult<Self> {
        let mut ies = Vec::new();
        while buf.has_remaining() {
            let iei = buf.get_u8();
            let format = format_for(table, iei);
            if !table.iter().any(|(known, _)| {
                *known == iei || (is_single_octet_iei(iei) && known & 0xF0 == iei & 0xF0)
            }) {
                trace!("Unknown optional IEI 0x{:02X}, treating as {:?}", iei, format);
            }
            let value = match format {
                IeFormat::HalfOctet | IeFormat::TypeOnly => Vec::new(),
                IeFormat::Tv(len) => read_bytes(buf, len)?,
                IeFormat::Tlv => read_lv(buf)?,
                IeFormat::TlvE => read_lv_e(buf)?,
            };
            ies.push(OptionalIe { iei, format, value });
        }
        Ok(Self { ies })
    }

    /// Encode all IEs in order.
    pub fn encode<B: BufMut>(&self, buf: &mut B) -> CodecResult<()> {
        for ie in &self.ies {
            ie.nas_encode(buf)?;
        }
        Ok(())
    }

    /// Encoded length of all IEs
    pub fn encoded_len(&self) -> usize {
        self.ies.iter().map(NasEncode::encoded_len).sum()
    }

    /// First IE matching `iei`.
    ///
    /// Half-octet IEIs (`0x80..=0xFF`) match on the high nibble only, so
    /// `lookup(0xC0)` finds an IMEISV request carried as `0xC1`.
    pub fn lookup(&self, iei: u8) -> Option<&OptionalIe> {
        self.ies.iter().find(|ie| ie.matches(iei))
    }

    /// Value bytes of the first IE matching `iei`
    pub fn value(&self, iei: u8) -> Option<&[u8]> {
        self.lookup(iei).map(|ie| ie.value.as_slice())
    }

    /// Append an IE.
    pub fn push(&mut self, ie: OptionalIe) {
        self.ies.push(ie);
    }

    /// Replace the first IE matching `ie.iei`, or append it.
    pub fn set(&mut self, ie: OptionalIe) {
        let key = if ie.format == IeFormat::HalfOctet { ie.iei & 0xF0 } else { ie.iei };
        match self.ies.iter_mut().find(|existing| existing.matches(key)) {
            Some(existing) => *existing = ie,
            None => self.ies.push(ie),
        }
    }

    /// Number of IEs
    pub fn len(&self) -> usize {
        self.ies.len()
    }

    /// Returns true if there are no IEs
    pub fn is_empty(&self) -> bool {
        self.ies.is_empty()
    }

    /// Iterate in wire order
    pub fn iter(&self) -> impl Iterator<Item = &OptionalIe> {
        self.ies.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: IeTable = &[
        (0xC0, IeFormat::HalfOctet),
        (0x55, IeFormat::Tv(4)),
        (0x23, IeFormat::Tlv),
        (0x78, IeFormat::TlvE),
    ];

    #[test]
    fn test_read_lv() {
        let mut buf: &[u8] = &[0x03, 0xAA, 0xBB, 0xCC, 0xDD];
        assert_eq!(read_lv(&mut buf).unwrap(), vec![0xAA, 0xBB, 0xCC]);
        assert_eq!(buf, &[0xDD]);
    }

    #[test]
    fn test_read_lv_length_exceeds_buffer() {
        let mut buf: &[u8] = &[0x05, 0x01];
        assert_eq!(
            read_lv(&mut buf),
            Err(CodecError::LengthExceedsBuffer { length: 5, remaining: 1 })
        );
    }

    #[test]
    fn test_read_lv_e() {
        let mut buf: &[u8] = &[0x00, 0x02, 0x52, 0x01];
        assert_eq!(read_lv_e(&mut buf).unwrap(), vec![0x52, 0x01]);
        let mut short: &[u8] = &[0x00];
        assert!(matches!(read_lv_e(&mut short), Err(CodecError::BufferTooShort { .. })));
    }

    #[test]
    fn test_read_array_too_short() {
        let mut buf: &[u8] = &[1, 2];
        assert_eq!(
            read_array::<_, 4>(&mut buf),
            Err(CodecError::BufferTooShort { expected: 4, actual: 2 })
        );
    }

    #[test]
    fn test_write_lv_rejects_oversized_value() {
        let mut out = Vec::new();
        assert!(write_lv(&mut out, &[0u8; 256]).is_err());
        write_lv(&mut out, &[1, 2]).unwrap();
        assert_eq!(out, vec![2, 1, 2]);
    }

    #[test]
    fn test_nibbles() {
        assert_eq!(split_nibbles(0x71), (0x7, 0x1));
        assert_eq!(join_nibbles(0x2, 0x7), 0x27);
        assert_eq!(join_nibbles(0x12, 0x37), 0x27);
    }

    #[test]
    fn test_optional_ies_decode_and_lookup() {
        let data: &[u8] = &[
            0xC1, // IMEISV request, value 1
            0x55, 0x01, 0x02, 0x03, 0x04, // TV(4)
            0x23, 0x02, 0xAB, 0xCD, // TLV
            0x78, 0x00, 0x01, 0xEE, // TLV-E
        ];
        let mut buf = data;
        let ies = OptionalIes::decode(&mut buf, TABLE).unwrap();
        assert_eq!(ies.len(), 4);

        let imeisv = ies.lookup(0xC0).unwrap();
        assert_eq!(imeisv.half_value(), 1);
        assert_eq!(ies.value(0x55), Some(&[1, 2, 3, 4][..]));
        assert_eq!(ies.value(0x23), Some(&[0xAB, 0xCD][..]));
        assert_eq!(ies.value(0x78), Some(&[0xEE][..]));
        assert!(ies.lookup(0x24).is_none());
        // full-octet IEIs never match on a nibble
        assert!(ies.lookup(0x20).is_none());
    }

    #[test]
    fn test_optional_ies_unknown_iei_comprehension() {
        let data: &[u8] = &[
            0x99, // unknown half octet
            0x3A, 0x01, 0xFF, // unknown TLV
            0x7C, 0x00, 0x01, 0x00, // unknown TLV-E
        ];
        let mut buf = data;
        let ies = OptionalIes::decode(&mut buf, TABLE).unwrap();
        let formats: Vec<IeFormat> = ies.iter().map(|ie| ie.format).collect();
        assert_eq!(formats, vec![IeFormat::HalfOctet, IeFormat::Tlv, IeFormat::TlvE]);
    }

    #[test]
    fn test_optional_ies_reencode_unchanged() {
        let data: &[u8] = &[0xC1, 0x55, 9, 8, 7, 6, 0x3A, 0x01, 0xFF];
        let mut buf = data;
        let ies = OptionalIes::decode(&mut buf, TABLE).unwrap();
        let mut out = Vec::new();
        ies.encode(&mut out).unwrap();
        assert_eq!(out, data);
        assert_eq!(ies.encoded_len(), data.len());
    }

    #[test]
    fn test_optional_ies_truncated_tv() {
        let mut buf: &[u8] = &[0x55, 0x01];
        assert!(OptionalIes::decode(&mut buf, TABLE).is_err());
    }

    #[test]
    fn test_optional_ies_set_replaces() {
        let mut ies = OptionalIes::new();
        ies.set(OptionalIe::half_octet(0xC0, 0));
        ies.set(OptionalIe::tlv(0x23, vec![1]));
        ies.set(OptionalIe::half_octet(0xC0, 1));
        assert_eq!(ies.len(), 2);
        assert_eq!(ies.lookup(0xC0).map(OptionalIe::half_value), Some(1));
    }

    #[test]
    fn test_tv_encode_length_mismatch() {
        let ie = OptionalIe { iei: 0x55, format: IeFormat::Tv(4), value: vec![1] };
        let mut out = Vec::new();
        assert!(ie.nas_encode(&mut out).is_err());
    }
}
