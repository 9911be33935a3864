//! EMM (EPS Mobility Management) Messages
//!
//! This module contains the EMM messages of 3GPP TS 24.301 Section 8.2.
//!
//! ## Attach
//!
//! - [`AttachRequest`], [`AttachAccept`], [`AttachComplete`], [`AttachReject`]
//!
//! ## Detach
//!
//! - [`DetachRequest`] (UE originating), [`DetachAccept`]
//!
//! ## Tracking Area Update
//!
//! - [`TrackingAreaUpdateRequest`], [`TrackingAreaUpdateReject`]
//!
//! ## Authentication
//!
//! - [`AuthenticationRequest`], [`AuthenticationResponse`],
//!   [`AuthenticationReject`], [`AuthenticationFailure`]
//!
//! ## Identification and Security Mode Control
//!
//! - [`IdentityRequest`], [`IdentityResponse`]
//! - [`SecurityModeCommand`], [`SecurityModeComplete`], [`SecurityModeReject`]
//!
//! ## Miscellaneous
//!
//! - [`EmmStatus`], [`EmmInformation`], [`ServiceReject`]
//! - [`ServiceRequest`], built from the short security header

pub mod attach;
pub mod authentication;
pub mod detach;
pub mod identity;
pub mod security_mode;
pub mod service;
pub mod status;
pub mod tau;

pub use attach::*;
pub use authentication::*;
pub use detach::*;
pub use identity::*;
pub use security_mode::*;
pub use service::*;
pub use status::*;
pub use tau::*;

use bytes::{Buf, BufMut};

use crate::codec::{CodecError, CodecResult};
use crate::enums::EmmMessageType;

macro_rules! emm_bodies {
    ($($variant:ident),+ $(,)?) => {
        /// Message-specific content of an EMM message
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum EmmBody {
            /// Message type without a leaf decoder; only the tag is known
            Empty,
            /// Leaf decoder failed; the tag is still valid
            Malformed(CodecError),
            $(
                #[allow(missing_docs)]
                $variant($variant),
            )+
        }

        impl EmmBody {
            /// Decode the body for `message_type`.
            ///
            /// Returns `None` when no leaf decoder exists for the tag.
            pub fn decode<B: Buf>(message_type: EmmMessageType, buf: &mut B) -> Option<CodecResult<Self>> {
                match message_type {
                    $(EmmMessageType::$variant => Some($variant::decode(buf).map(Self::$variant)),)+
                    _ => None,
                }
            }

            /// Message type of a populated body
            pub fn message_type(&self) -> Option<EmmMessageType> {
                match self {
                    Self::Empty | Self::Malformed(_) => None,
                    $(Self::$variant(_) => Some(EmmMessageType::$variant),)+
                }
            }

            /// Encode the body (after the message type).
            pub fn encode<B: BufMut>(&self, buf: &mut B) -> CodecResult<()> {
                match self {
                    Self::Empty => Ok(()),
                    Self::Malformed(e) => Err(CodecError::EncodingError(format!("malformed body: {e}"))),
                    $(Self::$variant(msg) => msg.encode(buf),)+
                }
            }
        }

        $(
            impl From<$variant> for EmmMessage {
                fn from(msg: $variant) -> Self {
                    Self {
                        message_type: EmmMessageType::$variant,
                        body: EmmBody::$variant(msg),
                    }
                }
            }
        )+
    };
}

emm_bodies! {
    AttachRequest,
    AttachAccept,
    AttachComplete,
    AttachReject,
    DetachRequest,
    DetachAccept,
    TrackingAreaUpdateRequest,
    TrackingAreaUpdateReject,
    AuthenticationRequest,
    AuthenticationResponse,
    AuthenticationReject,
    AuthenticationFailure,
    IdentityRequest,
    IdentityResponse,
    SecurityModeCommand,
    SecurityModeComplete,
    SecurityModeReject,
    EmmStatus,
    EmmInformation,
    ServiceReject,
}

/// A decoded plain EMM message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmmMessage {
    /// Message type tag as received, known or not
    pub message_type: EmmMessageType,
    /// Message-specific content
    pub body: EmmBody,
}

impl EmmMessage {
    /// Message with a tag and no content
    pub fn empty(message_type: EmmMessageType) -> Self {
        Self {
            message_type,
            body: EmmBody::Empty,
        }
    }

    /// Returns true if the body was decoded
    pub fn is_populated(&self) -> bool {
        self.body.message_type().is_some()
    }
}
