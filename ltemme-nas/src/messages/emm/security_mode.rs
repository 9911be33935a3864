//! Security Mode Control Messages (3GPP TS 24.301 Section 8.2.20-8.2.22)
//!
//! - Security Mode Command (network to UE)
//! - Security Mode Complete (UE to network)
//! - Security Mode Reject (UE to network)

use bytes::{Buf, BufMut};

use crate::codec::{read_lv, read_u8, split_nibbles, write_lv, CodecResult, IeFormat, IeTable, OptionalIe, OptionalIes};
use crate::ies::{EmmCause, MobileIdentity, NasKsi, NasSecurityAlgorithms, UeSecurityCapability};

/// Optional IEs of Security Mode Command
pub mod security_mode_command_iei {
    pub const IMEISV_REQUEST: u8 = 0xC0;
    pub const REPLAYED_NONCE_UE: u8 = 0x55;
    pub const NONCE_MME: u8 = 0x56;
    pub const HASH_MME: u8 = 0x4F;
    pub const REPLAYED_UE_ADDITIONAL_SECURITY_CAPABILITY: u8 = 0x6F;
}

const SECURITY_MODE_COMMAND_IES: IeTable = &[
    (security_mode_command_iei::IMEISV_REQUEST, IeFormat::HalfOctet),
    (security_mode_command_iei::REPLAYED_NONCE_UE, IeFormat::Tv(4)),
    (security_mode_command_iei::NONCE_MME, IeFormat::Tv(4)),
    (security_mode_command_iei::HASH_MME, IeFormat::Tlv),
    (security_mode_command_iei::REPLAYED_UE_ADDITIONAL_SECURITY_CAPABILITY, IeFormat::Tlv),
];

/// Optional IEs of Security Mode Complete
pub mod security_mode_complete_iei {
    pub const IMEISV: u8 = 0x23;
    pub const REPLAYED_NAS_MESSAGE_CONTAINER: u8 = 0x79;
}

const SECURITY_MODE_COMPLETE_IES: IeTable = &[
    (security_mode_complete_iei::IMEISV, IeFormat::Tlv),
    (security_mode_complete_iei::REPLAYED_NAS_MESSAGE_CONTAINER, IeFormat::TlvE),
];

// IMEISV request value "IMEISV requested" (TS 24.008 10.5.5.10)
const IMEISV_REQUESTED: u8 = 0x01;

/// Security Mode Command message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityModeCommand {
    /// Selected NAS security algorithms
    pub selected_algorithms: NasSecurityAlgorithms,
    /// NAS key set identifier (low nibble)
    pub nas_ksi: NasKsi,
    /// Replayed UE security capabilities (LV)
    pub replayed_ue_security_capability: UeSecurityCapability,
    /// Optional IEs
    pub optional: OptionalIes,
}

impl SecurityModeCommand {
    /// Create a Security Mode Command
    pub fn new(
        selected_algorithms: NasSecurityAlgorithms,
        nas_ksi: NasKsi,
        replayed_ue_security_capability: UeSecurityCapability,
    ) -> Self {
        Self {
            selected_algorithms,
            nas_ksi,
            replayed_ue_security_capability,
            optional: OptionalIes::new(),
        }
    }

    /// Request the IMEISV in the Security Mode Complete
    pub fn with_imeisv_request(mut self) -> Self {
        self.optional
            .set(OptionalIe::half_octet(security_mode_command_iei::IMEISV_REQUEST, IMEISV_REQUESTED));
        self
    }

    /// Decode from bytes (after the message type)
    pub fn decode<B: Buf>(buf: &mut B) -> CodecResult<Self> {
        let selected_algorithms = NasSecurityAlgorithms::decode(read_u8(buf)?)?;
        let (_, ksi) = split_nibbles(read_u8(buf)?);
        let replayed_ue_security_capability = UeSecurityCapability::decode(&read_lv(buf)?)?;
        let optional = OptionalIes::decode(buf, SECURITY_MODE_COMMAND_IES)?;
        Ok(Self {
            selected_algorithms,
            nas_ksi: NasKsi::from_nibble(ksi),
            replayed_ue_security_capability,
            optional,
        })
    }

    /// Encode to bytes (after the message type)
    pub fn encode<B: BufMut>(&self, buf: &mut B) -> CodecResult<()> {
        buf.put_u8(self.selected_algorithms.encode());
        buf.put_u8(self.nas_ksi.to_nibble());
        write_lv(buf, &self.replayed_ue_security_capability.encode())?;
        self.optional.encode(buf)
    }

    /// Returns true if the IMEISV is requested
    pub fn imeisv_requested(&self) -> bool {
        self.optional
            .lookup(security_mode_command_iei::IMEISV_REQUEST)
            .is_some_and(|ie| ie.half_value() & 0x07 == IMEISV_REQUESTED)
    }
}

/// Security Mode Complete message
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SecurityModeComplete {
    /// Optional IEs
    pub optional: OptionalIes,
}

impl SecurityModeComplete {
    /// Decode from bytes (after the message type)
    pub fn decode<B: Buf>(buf: &mut B) -> CodecResult<Self> {
        Ok(Self {
            optional: OptionalIes::decode(buf, SECURITY_MODE_COMPLETE_IES)?,
        })
    }

    /// Encode to bytes (after the message type)
    pub fn encode<B: BufMut>(&self, buf: &mut B) -> CodecResult<()> {
        self.optional.encode(buf)
    }

    /// Attach the IMEISV
    pub fn with_imeisv(mut self, imeisv: &MobileIdentity) -> CodecResult<Self> {
        self.optional
            .set(OptionalIe::tlv(security_mode_complete_iei::IMEISV, imeisv.encode()?));
        Ok(self)
    }

    /// IMEISV, if present
    pub fn imeisv(&self) -> CodecResult<Option<MobileIdentity>> {
        self.optional
            .value(security_mode_complete_iei::IMEISV)
            .map(MobileIdentity::decode)
            .transpose()
    }
}

/// Security Mode Reject message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityModeReject {
    /// EMM cause
    pub emm_cause: EmmCause,
}

impl SecurityModeReject {
    /// Decode from bytes (after the message type)
    pub fn decode<B: Buf>(buf: &mut B) -> CodecResult<Self> {
        Ok(Self {
            emm_cause: EmmCause::from(read_u8(buf)?),
        })
    }

    /// Encode to bytes (after the message type)
    pub fn encode<B: BufMut>(&self, buf: &mut B) -> CodecResult<()> {
        buf.put_u8(self.emm_cause.into());
        Ok(())
    }
}
