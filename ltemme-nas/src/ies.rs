//! EPS NAS information elements
//!
//! Value parts of the IEs carried by the EMM and ESM leaf messages
//! (3GPP TS 24.301 Section 9.9 and TS 24.008 Section 10.5). Length prefixes
//! are handled by the message codecs through [`crate::codec`].

use bytes::{Buf, BufMut};
use num_enum::{FromPrimitive, IntoPrimitive};

use crate::algorithms::{EeaId, EiaId};
use crate::codec::{read_array, read_lv, read_u8, write_lv, CodecError, CodecResult};

// ============================================================================
// NAS key set identifier (TS 24.301 Section 9.9.3.21)
// ============================================================================

/// Type of security context flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SecurityContextType {
    /// Native security context
    #[default]
    Native,
    /// Mapped security context
    Mapped,
}

/// NAS key set identifier (half octet)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NasKsi {
    /// Type of security context
    pub tsc: SecurityContextType,
    /// Key set identifier (0-6, 7 = no key available)
    pub ksi: u8,
}

impl Default for NasKsi {
    fn default() -> Self {
        Self::no_key()
    }
}

impl NasKsi {
    /// Value indicating no key is available
    pub const NO_KEY_AVAILABLE: u8 = 0x07;

    /// Create a native key set identifier
    pub fn native(ksi: u8) -> Self {
        Self {
            tsc: SecurityContextType::Native,
            ksi: ksi & 0x07,
        }
    }

    /// "No key is available"
    pub fn no_key() -> Self {
        Self::native(Self::NO_KEY_AVAILABLE)
    }

    /// Returns true if no key is available
    pub fn is_no_key(&self) -> bool {
        self.ksi == Self::NO_KEY_AVAILABLE
    }

    /// Encode to a half octet
    pub fn to_nibble(&self) -> u8 {
        let tsc = match self.tsc {
            SecurityContextType::Native => 0,
            SecurityContextType::Mapped => 0x08,
        };
        tsc | (self.ksi & 0x07)
    }

    /// Decode from a half octet
    pub fn from_nibble(value: u8) -> Self {
        let tsc = if value & 0x08 != 0 {
            SecurityContextType::Mapped
        } else {
            SecurityContextType::Native
        };
        Self { tsc, ksi: value & 0x07 }
    }
}

// ============================================================================
// Causes
// ============================================================================

/// EMM cause (TS 24.301 Section 9.9.3.9)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum EmmCause {
    ImsiUnknownInHss = 2,
    IllegalUe = 3,
    ImeiNotAccepted = 5,
    IllegalMe = 6,
    EpsServicesNotAllowed = 7,
    EpsAndNonEpsServicesNotAllowed = 8,
    UeIdentityCannotBeDerived = 9,
    ImplicitlyDetached = 10,
    PlmnNotAllowed = 11,
    TrackingAreaNotAllowed = 12,
    RoamingNotAllowedInTrackingArea = 13,
    EpsServicesNotAllowedInPlmn = 14,
    NoSuitableCellsInTrackingArea = 15,
    MscTemporarilyNotReachable = 16,
    NetworkFailure = 17,
    CsDomainNotAvailable = 18,
    EsmFailure = 19,
    MacFailure = 20,
    SynchFailure = 21,
    Congestion = 22,
    UeSecurityCapabilitiesMismatch = 23,
    SecurityModeRejectedUnspecified = 24,
    NotAuthorizedForCsg = 25,
    NonEpsAuthenticationUnacceptable = 26,
    RequestedServiceOptionNotAuthorized = 35,
    CsServiceTemporarilyNotAvailable = 39,
    NoEpsBearerContextActivated = 40,
    SevereNetworkFailure = 42,
    SemanticallyIncorrectMessage = 95,
    InvalidMandatoryInformation = 96,
    MessageTypeNonExistent = 97,
    MessageTypeNotCompatible = 98,
    InformationElementNonExistent = 99,
    ConditionalIeError = 100,
    MessageNotCompatible = 101,
    ProtocolErrorUnspecified = 111,
    /// Any other value
    #[num_enum(catch_all)]
    Other(u8),
}

/// ESM cause (TS 24.301 Section 9.9.4.4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum EsmCause {
    OperatorDeterminedBarring = 8,
    InsufficientResources = 26,
    MissingOrUnknownApn = 27,
    UnknownPdnType = 28,
    UserAuthenticationFailed = 29,
    RequestRejectedByGateway = 30,
    RequestRejectedUnspecified = 31,
    ServiceOptionNotSupported = 32,
    RequestedServiceOptionNotSubscribed = 33,
    ServiceOptionTemporarilyOutOfOrder = 34,
    PtiAlreadyInUse = 35,
    RegularDeactivation = 36,
    EpsQosNotAccepted = 37,
    NetworkFailure = 38,
    InvalidEpsBearerIdentity = 43,
    PtiMismatch = 47,
    PdnTypeIpv4OnlyAllowed = 50,
    PdnTypeIpv6OnlyAllowed = 51,
    PdnConnectionDoesNotExist = 54,
    InvalidPtiValue = 81,
    SemanticallyIncorrectMessage = 95,
    InvalidMandatoryInformation = 96,
    MessageTypeNonExistent = 97,
    ProtocolErrorUnspecified = 111,
    /// Any other value
    #[num_enum(catch_all)]
    Other(u8),
}

// ============================================================================
// Half-octet values
// ============================================================================

/// EPS attach type (TS 24.301 Section 9.9.3.11)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum EpsAttachType {
    EpsAttach = 1,
    CombinedEpsImsiAttach = 2,
    EpsEmergencyAttach = 6,
    #[num_enum(catch_all)]
    Reserved(u8),
}

/// EPS update type value (TS 24.301 Section 9.9.3.14)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EpsUpdateType {
    /// Bearer establishment requested
    pub active: bool,
    /// Update type value (0 TA updating, 1 combined, 2 combined with IMSI attach, 3 periodic)
    pub value: u8,
}

impl EpsUpdateType {
    /// Decode from a half octet
    pub fn from_nibble(nibble: u8) -> Self {
        Self {
            active: nibble & 0x08 != 0,
            value: nibble & 0x07,
        }
    }

    /// Encode to a half octet
    pub fn to_nibble(&self) -> u8 {
        (u8::from(self.active) << 3) | (self.value & 0x07)
    }
}

/// Detach type (TS 24.301 Section 9.9.3.7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DetachType {
    /// UE is switching off
    pub switch_off: bool,
    /// Type of detach (1 EPS, 2 IMSI, 3 combined)
    pub value: u8,
}

impl DetachType {
    /// Decode from a half octet
    pub fn from_nibble(nibble: u8) -> Self {
        Self {
            switch_off: nibble & 0x08 != 0,
            value: nibble & 0x07,
        }
    }

    /// Encode to a half octet
    pub fn to_nibble(&self) -> u8 {
        (u8::from(self.switch_off) << 3) | (self.value & 0x07)
    }
}

/// Identity type 2 (TS 24.008 Section 10.5.5.9)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum IdentityType {
    Imsi = 1,
    Imei = 2,
    Imeisv = 3,
    Tmsi = 4,
    #[num_enum(catch_all)]
    Other(u8),
}

/// PDN type (TS 24.301 Section 9.9.4.10)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum PdnType {
    Ipv4 = 1,
    Ipv6 = 2,
    Ipv4v6 = 3,
    NonIp = 5,
    #[num_enum(catch_all)]
    Other(u8),
}

/// Request type (TS 24.008 Section 10.5.6.17)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum RequestType {
    InitialRequest = 1,
    Handover = 2,
    Emergency = 4,
    #[num_enum(catch_all)]
    Other(u8),
}

// ============================================================================
// Mobile identities (TS 24.301 Section 9.9.3.12, TS 24.008 Section 10.5.1.4)
// ============================================================================

/// Globally unique temporary identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Guti {
    /// PLMN identity, TS 24.008 BCD layout
    pub plmn: [u8; 3],
    /// MME group ID
    pub mme_group_id: u16,
    /// MME code
    pub mme_code: u8,
    /// M-TMSI
    pub m_tmsi: u32,
}

/// EPS mobile identity or mobile identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MobileIdentity {
    /// IMSI digits
    Imsi(String),
    /// IMEI digits
    Imei(String),
    /// IMEISV digits
    Imeisv(String),
    /// TMSI / P-TMSI / M-TMSI
    Tmsi(u32),
    /// GUTI
    Guti(Guti),
    /// Identity type not decoded here
    Other {
        /// Type of identity
        type_of_identity: u8,
        /// Raw octets including the first
        raw: Vec<u8>,
    },
}

const ID_IMSI: u8 = 1;
const ID_IMEI: u8 = 2;
const ID_IMEISV: u8 = 3;
const ID_TMSI: u8 = 4;
const ID_GUTI: u8 = 6;

// EPS mobile identity numbers IMEI as 3 (TS 24.301 9.9.3.12)
const EPS_ID_IMEI: u8 = 3;

fn decode_digits(first: u8, rest: &[u8]) -> CodecResult<String> {
    let odd = first & 0x08 != 0;
    let mut digits = String::with_capacity(1 + rest.len() * 2);
    let mut push = |nibble: u8| -> CodecResult<()> {
        if nibble > 9 {
            return Err(CodecError::InvalidValue(format!("non-decimal identity digit 0x{nibble:X}")));
        }
        digits.push(char::from(b'0' + nibble));
        Ok(())
    };
    push(first >> 4)?;
    for (i, octet) in rest.iter().enumerate() {
        push(octet & 0x0F)?;
        let last = i + 1 == rest.len();
        if !(last && !odd) {
            push(octet >> 4)?;
        } else if octet >> 4 != 0x0F {
            return Err(CodecError::InvalidValue("missing filler in even identity".into()));
        }
    }
    Ok(digits)
}

fn encode_digits(digits: &str, type_of_identity: u8) -> CodecResult<Vec<u8>> {
    let nibbles: Vec<u8> = digits
        .bytes()
        .map(|b| {
            if b.is_ascii_digit() {
                Ok(b - b'0')
            } else {
                Err(CodecError::EncodingError(format!("non-decimal identity digit {:?}", b as char)))
            }
        })
        .collect::<CodecResult<_>>()?;
    let (first, rest) = nibbles
        .split_first()
        .ok_or_else(|| CodecError::EncodingError("empty identity".into()))?;
    let odd = nibbles.len() % 2 == 1;
    let mut out = vec![(first << 4) | (u8::from(odd) << 3) | type_of_identity];
    for pair in rest.chunks(2) {
        let low = pair[0];
        let high = pair.get(1).copied().unwrap_or(0x0F);
        out.push((high << 4) | low);
    }
    Ok(out)
}

impl MobileIdentity {
    /// Decode the value part of an EPS mobile identity (TS 24.301)
    pub fn decode_eps(value: &[u8]) -> CodecResult<Self> {
        let (&first, rest) = value
            .split_first()
            .ok_or(CodecError::BufferTooShort { expected: 1, actual: 0 })?;
        match first & 0x07 {
            ID_IMSI => Ok(Self::Imsi(decode_digits(first, rest)?)),
            EPS_ID_IMEI => Ok(Self::Imei(decode_digits(first, rest)?)),
            ID_GUTI => {
                let mut buf = rest;
                let plmn = read_array::<_, 3>(&mut buf)?;
                let group = read_array::<_, 2>(&mut buf)?;
                let mme_code = read_u8(&mut buf)?;
                let tmsi = read_array::<_, 4>(&mut buf)?;
                Ok(Self::Guti(Guti {
                    plmn,
                    mme_group_id: u16::from_be_bytes(group),
                    mme_code,
                    m_tmsi: u32::from_be_bytes(tmsi),
                }))
            }
            other => Ok(Self::Other {
                type_of_identity: other,
                raw: value.to_vec(),
            }),
        }
    }

    /// Decode the value part of a mobile identity (TS 24.008)
    pub fn decode(value: &[u8]) -> CodecResult<Self> {
        let (&first, rest) = value
            .split_first()
            .ok_or(CodecError::BufferTooShort { expected: 1, actual: 0 })?;
        match first & 0x07 {
            ID_IMSI => Ok(Self::Imsi(decode_digits(first, rest)?)),
            ID_IMEI => Ok(Self::Imei(decode_digits(first, rest)?)),
            ID_IMEISV => Ok(Self::Imeisv(decode_digits(first, rest)?)),
            ID_TMSI => {
                let tmsi = read_array::<_, 4>(&mut &rest[..])?;
                Ok(Self::Tmsi(u32::from_be_bytes(tmsi)))
            }
            other => Ok(Self::Other {
                type_of_identity: other,
                raw: value.to_vec(),
            }),
        }
    }

    /// Encode as an EPS mobile identity value part
    pub fn encode_eps(&self) -> CodecResult<Vec<u8>> {
        match self {
            Self::Imsi(digits) => encode_digits(digits, ID_IMSI),
            Self::Imei(digits) => encode_digits(digits, EPS_ID_IMEI),
            Self::Guti(guti) => {
                let mut out = Vec::with_capacity(11);
                out.put_u8(0xF0 | ID_GUTI);
                out.put_slice(&guti.plmn);
                out.put_u16(guti.mme_group_id);
                out.put_u8(guti.mme_code);
                out.put_u32(guti.m_tmsi);
                Ok(out)
            }
            Self::Other { raw, .. } => Ok(raw.clone()),
            Self::Imeisv(_) | Self::Tmsi(_) => Err(CodecError::EncodingError(
                "identity has no EPS mobile identity form".into(),
            )),
        }
    }

    /// Encode as a TS 24.008 mobile identity value part
    pub fn encode(&self) -> CodecResult<Vec<u8>> {
        match self {
            Self::Imsi(digits) => encode_digits(digits, ID_IMSI),
            Self::Imei(digits) => encode_digits(digits, ID_IMEI),
            Self::Imeisv(digits) => encode_digits(digits, ID_IMEISV),
            Self::Tmsi(tmsi) => {
                let mut out = vec![0xF0 | ID_TMSI];
                out.put_u32(*tmsi);
                Ok(out)
            }
            Self::Other { raw, .. } => Ok(raw.clone()),
            Self::Guti(_) => Err(CodecError::EncodingError(
                "GUTI has no TS 24.008 mobile identity form".into(),
            )),
        }
    }
}

// ============================================================================
// UE capabilities
// ============================================================================

/// UE network capability (TS 24.301 Section 9.9.3.34), kept as raw octets
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UeNetworkCapability {
    /// Value octets
    pub value: Vec<u8>,
}

impl UeNetworkCapability {
    /// EEA0..EEA7 bitmap (bit 8 = EEA0)
    pub fn eea(&self) -> u8 {
        self.value.first().copied().unwrap_or(0)
    }

    /// EIA0..EIA7 bitmap (bit 8 = EIA0)
    pub fn eia(&self) -> u8 {
        self.value.get(1).copied().unwrap_or(0)
    }

    /// Security capability view of the first two octets
    pub fn security_capability(&self) -> UeSecurityCapability {
        UeSecurityCapability::new(self.eea(), self.eia())
    }
}

/// UE security capability (TS 24.301 Section 9.9.3.36)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct UeSecurityCapability {
    /// EEA0..EEA7 bitmap (bit 8 = EEA0)
    pub eea: u8,
    /// EIA0..EIA7 bitmap (bit 8 = EIA0)
    pub eia: u8,
    /// UEA0..UEA7 bitmap
    pub uea: Option<u8>,
    /// UIA1..UIA7 bitmap
    pub uia: Option<u8>,
    /// GEA1..GEA7 bitmap
    pub gea: Option<u8>,
}

impl UeSecurityCapability {
    /// Capability with EPS bitmaps only
    pub fn new(eea: u8, eia: u8) -> Self {
        Self {
            eea,
            eia,
            ..Default::default()
        }
    }

    /// Whether the UE supports an integrity algorithm
    pub fn supports_eia(&self, id: EiaId) -> bool {
        self.eia & (0x80 >> u8::from(id)) != 0
    }

    /// Whether the UE supports a ciphering algorithm
    pub fn supports_eea(&self, id: EeaId) -> bool {
        self.eea & (0x80 >> u8::from(id)) != 0
    }

    /// Decode the value part (after the length octet)
    pub fn decode(value: &[u8]) -> CodecResult<Self> {
        if value.len() < 2 {
            return Err(CodecError::BufferTooShort {
                expected: 2,
                actual: value.len(),
            });
        }
        Ok(Self {
            eea: value[0],
            eia: value[1],
            uea: value.get(2).copied(),
            uia: value.get(3).copied(),
            gea: value.get(4).copied(),
        })
    }

    /// Encode the value part
    pub fn encode(&self) -> Vec<u8> {
        let mut out = vec![self.eea, self.eia];
        // optional octets are positional
        let optional = [self.uea, self.uia, self.gea];
        let present = optional.iter().rposition(Option::is_some).map_or(0, |i| i + 1);
        out.extend(optional[..present].iter().map(|o| o.unwrap_or(0)));
        out
    }
}

/// NAS security algorithms (TS 24.301 Section 9.9.3.23)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NasSecurityAlgorithms {
    /// Type of ciphering algorithm
    pub ciphering: EeaId,
    /// Type of integrity protection algorithm
    pub integrity: EiaId,
}

impl NasSecurityAlgorithms {
    /// Encode to one octet
    pub fn encode(&self) -> u8 {
        (u8::from(self.ciphering) << 4) | u8::from(self.integrity)
    }

    /// Decode from one octet
    pub fn decode(octet: u8) -> CodecResult<Self> {
        let ciphering = EeaId::try_from((octet >> 4) & 0x07)
            .map_err(|e| CodecError::InvalidValue(format!("ciphering algorithm {}", e.number)))?;
        let integrity = EiaId::try_from(octet & 0x07)
            .map_err(|e| CodecError::InvalidValue(format!("integrity algorithm {}", e.number)))?;
        Ok(Self { ciphering, integrity })
    }
}

// ============================================================================
// Location
// ============================================================================

/// Tracking area identity (TS 24.301 Section 9.9.3.32)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tai {
    /// PLMN identity
    pub plmn: [u8; 3],
    /// Tracking area code
    pub tac: u16,
}

impl Tai {
    /// Size of the value part
    pub const SIZE: usize = 5;

    /// Decode the value part
    pub fn decode<B: Buf>(buf: &mut B) -> CodecResult<Self> {
        let plmn = read_array::<_, 3>(buf)?;
        let tac = u16::from_be_bytes(read_array::<_, 2>(buf)?);
        Ok(Self { plmn, tac })
    }

    /// Encode the value part
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_slice(&self.plmn);
        buf.put_u16(self.tac);
    }
}

// ============================================================================
// ESM
// ============================================================================

/// Access point name (TS 24.301 Section 9.9.4.1), DNS label encoded
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccessPointName {
    /// Label-encoded value octets
    pub value: Vec<u8>,
}

impl AccessPointName {
    /// Build from a dotted name such as `internet.mnc001.mcc001.gprs`
    pub fn from_dotted(name: &str) -> CodecResult<Self> {
        let mut value = Vec::with_capacity(name.len() + 1);
        for label in name.split('.').filter(|l| !l.is_empty()) {
            write_lv(&mut value, label.as_bytes())?;
        }
        Ok(Self { value })
    }

    /// Dotted form of the label-encoded value
    pub fn to_dotted(&self) -> CodecResult<String> {
        let mut buf = self.value.as_slice();
        let mut labels = Vec::new();
        while !buf.is_empty() {
            let label = read_lv(&mut buf)?;
            labels.push(String::from_utf8_lossy(&label).into_owned());
        }
        Ok(labels.join("."))
    }
}

/// PDN address (TS 24.301 Section 9.9.4.9)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdnAddress {
    /// PDN type value
    pub pdn_type: PdnType,
    /// Address information
    pub address: Vec<u8>,
}

impl PdnAddress {
    /// Decode the value part
    pub fn decode(value: &[u8]) -> CodecResult<Self> {
        let (&first, rest) = value
            .split_first()
            .ok_or(CodecError::BufferTooShort { expected: 1, actual: 0 })?;
        Ok(Self {
            pdn_type: PdnType::from(first & 0x07),
            address: rest.to_vec(),
        })
    }

    /// Encode the value part
    pub fn encode(&self) -> Vec<u8> {
        let mut out = vec![u8::from(self.pdn_type) & 0x07];
        out.extend_from_slice(&self.address);
        out
    }
}
