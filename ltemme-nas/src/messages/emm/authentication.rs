//! Authentication Messages (3GPP TS 24.301 Section 8.2.5-8.2.8)
//!
//! - Authentication Request (network to UE)
//! - Authentication Response (UE to network)
//! - Authentication Reject (network to UE)
//! - Authentication Failure (UE to network)

use bytes::{Buf, BufMut};

use crate::codec::{read_array, read_lv, read_u8, split_nibbles, write_lv, CodecResult, IeFormat, IeTable, OptionalIes};
use crate::ies::{EmmCause, NasKsi};

/// Size of the authentication parameter RAND
pub const RAND_SIZE: usize = 16;

/// IEI of the authentication failure parameter (AUTS)
pub const AUTHENTICATION_FAILURE_PARAMETER_IEI: u8 = 0x30;

const AUTHENTICATION_FAILURE_IES: IeTable = &[(AUTHENTICATION_FAILURE_PARAMETER_IEI, IeFormat::Tlv)];

/// Authentication Request message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationRequest {
    /// NAS key set identifier of the ASME (low nibble)
    pub nas_ksi: NasKsi,
    /// Authentication parameter RAND
    pub rand: [u8; RAND_SIZE],
    /// Authentication parameter AUTN (LV)
    pub autn: Vec<u8>,
}

impl AuthenticationRequest {
    /// Create an Authentication Request
    pub fn new(nas_ksi: NasKsi, rand: [u8; RAND_SIZE], autn: Vec<u8>) -> Self {
        Self { nas_ksi, rand, autn }
    }

    /// Decode from bytes (after the message type)
    pub fn decode<B: Buf>(buf: &mut B) -> CodecResult<Self> {
        let (_, ksi) = split_nibbles(read_u8(buf)?);
        let rand = read_array::<_, RAND_SIZE>(buf)?;
        let autn = read_lv(buf)?;
        Ok(Self {
            nas_ksi: NasKsi::from_nibble(ksi),
            rand,
            autn,
        })
    }

    /// Encode to bytes (after the message type)
    pub fn encode<B: BufMut>(&self, buf: &mut B) -> CodecResult<()> {
        buf.put_u8(self.nas_ksi.to_nibble());
        buf.put_slice(&self.rand);
        write_lv(buf, &self.autn)
    }
}

/// Authentication Response message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationResponse {
    /// Authentication response parameter RES (LV, 4 to 16 octets)
    pub res: Vec<u8>,
}

impl AuthenticationResponse {
    /// Decode from bytes (after the message type)
    pub fn decode<B: Buf>(buf: &mut B) -> CodecResult<Self> {
        Ok(Self { res: read_lv(buf)? })
    }

    /// Encode to bytes (after the message type)
    pub fn encode<B: BufMut>(&self, buf: &mut B) -> CodecResult<()> {
        write_lv(buf, &self.res)
    }
}

/// Authentication Reject message (no IEs)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuthenticationReject;

impl AuthenticationReject {
    /// Decode from bytes (after the message type)
    pub fn decode<B: Buf>(_buf: &mut B) -> CodecResult<Self> {
        Ok(Self)
    }

    /// Encode to bytes (after the message type)
    pub fn encode<B: BufMut>(&self, _buf: &mut B) -> CodecResult<()> {
        Ok(())
    }
}

/// Authentication Failure message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationFailure {
    /// EMM cause (MAC failure, synch failure, non-EPS authentication unacceptable)
    pub emm_cause: EmmCause,
    /// Optional IEs
    pub optional: OptionalIes,
}

impl AuthenticationFailure {
    /// Decode from bytes (after the message type)
    pub fn decode<B: Buf>(buf: &mut B) -> CodecResult<Self> {
        let emm_cause = EmmCause::from(read_u8(buf)?);
        let optional = OptionalIes::decode(buf, AUTHENTICATION_FAILURE_IES)?;
        Ok(Self { emm_cause, optional })
    }

    /// Encode to bytes (after the message type)
    pub fn encode<B: BufMut>(&self, buf: &mut B) -> CodecResult<()> {
        buf.put_u8(self.emm_cause.into());
        self.optional.encode(buf)
    }

    /// Re-synchronisation token AUTS, present with cause "synch failure"
    pub fn auts(&self) -> Option<&[u8]> {
        self.optional.value(AUTHENTICATION_FAILURE_PARAMETER_IEI)
    }
}
