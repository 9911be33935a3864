//! ESM (EPS Session Management) Messages
//!
//! This module contains the ESM messages of 3GPP TS 24.301 Section 8.3
//! needed for default bearer establishment and release.
//!
//! - [`PdnConnectivityRequest`], [`PdnDisconnectRequest`]
//! - [`ActivateDefaultEpsBearerContextRequest`], [`ActivateDefaultEpsBearerContextAccept`]
//! - [`EsmInformationRequest`], [`EsmInformationResponse`]
//! - [`EsmStatus`]

pub mod bearer;
pub mod information;
pub mod pdn;

pub use bearer::*;
pub use information::*;
pub use pdn::*;

use bytes::{Buf, BufMut};

use crate::codec::{CodecError, CodecResult};
use crate::enums::EsmMessageType;

macro_rules! esm_bodies {
    ($($variant:ident),+ $(,)?) => {
        /// Message-specific content of an ESM message
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum EsmBody {
            /// Message type without a leaf decoder; only the tag is known
            Empty,
            /// Leaf decoder failed; the tag is still valid
            Malformed(CodecError),
            $(
                #[allow(missing_docs)]
                $variant($variant),
            )+
        }

        impl EsmBody {
            /// Decode the body for `message_type`.
            ///
            /// Returns `None` when no leaf decoder exists for the tag.
            pub fn decode<B: Buf>(message_type: EsmMessageType, buf: &mut B) -> Option<CodecResult<Self>> {
                match message_type {
                    $(EsmMessageType::$variant => Some($variant::decode(buf).map(Self::$variant)),)+
                    _ => None,
                }
            }

            /// Message type of a populated body
            pub fn message_type(&self) -> Option<EsmMessageType> {
                match self {
                    Self::Empty | Self::Malformed(_) => None,
                    $(Self::$variant(_) => Some(EsmMessageType::$variant),)+
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
            impl From<$variant> for EsmBody {
                fn from(msg: $variant) -> Self {
                    Self::$variant(msg)
                }
            }
        )+
    };
}

esm_bodies! {
    PdnConnectivityRequest,
    PdnDisconnectRequest,
    ActivateDefaultEpsBearerContextRequest,
    ActivateDefaultEpsBearerContextAccept,
    EsmInformationRequest,
    EsmInformationResponse,
    EsmStatus,
}

/// A decoded plain ESM message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EsmMessage {
    /// EPS bearer identity (high nibble of octet 0)
    pub eps_bearer_identity: u8,
    /// Procedure transaction identity
    pub procedure_transaction_identity: u8,
    /// Message type tag as received, known or not
    pub message_type: EsmMessageType,
    /// Message-specific content
    pub body: EsmBody,
}

impl EsmMessage {
    /// Build a message from a populated body.
    ///
    /// Returns `None` for `Empty` or `Malformed` bodies, which carry no tag.
    pub fn new(eps_bearer_identity: u8, procedure_transaction_identity: u8, body: impl Into<EsmBody>) -> Option<Self> {
        let body = body.into();
        let message_type = body.message_type()?;
        Some(Self {
            eps_bearer_identity,
            procedure_transaction_identity,
            message_type,
            body,
        })
    }

    /// Returns true if the body was decoded
    pub fn is_populated(&self) -> bool {
        self.body.message_type().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ies::{EsmCause, PdnType, RequestType};

    #[test]
    fn test_new_takes_tag_from_body() {
        let msg = EsmMessage::new(0, 1, PdnConnectivityRequest::new(PdnType::Ipv4, RequestType::InitialRequest)).unwrap();
        assert_eq!(msg.message_type, EsmMessageType::PdnConnectivityRequest);
        assert_eq!(msg.procedure_transaction_identity, 1);
        assert!(msg.is_populated());
        assert!(EsmMessage::new(0, 1, EsmBody::Empty).is_none());
    }

    #[test]
    fn test_decode_known_and_unknown_tags() {
        let mut buf: &[u8] = &[0x1F];
        let body = EsmBody::decode(EsmMessageType::EsmStatus, &mut buf).unwrap().unwrap();
        assert_eq!(
            body,
            EsmBody::EsmStatus(EsmStatus {
                esm_cause: EsmCause::RequestRejectedUnspecified
            })
        );
        assert!(EsmBody::decode(EsmMessageType::ModifyEpsBearerContextRequest, &mut buf).is_none());
    }
}
