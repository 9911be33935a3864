//! NAS protocol enumerations
//!
//! Based on 3GPP TS 24.301 and TS 24.007. Enumerations that appear on the
//! wire with reserved or unassigned codes carry a catch-all variant so the
//! raw value survives a decode/encode cycle.

use num_enum::{FromPrimitive, IntoPrimitive};

/// Protocol discriminator (low nibble of NAS octet 1)
/// 3GPP TS 24.007 Section 11.2.3.1.1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum ProtocolDiscriminator {
    /// EPS session management messages
    EpsSessionManagement = 0x2,
    /// EPS mobility management messages
    EpsMobilityManagement = 0x7,
    /// Any other discriminator value
    #[num_enum(catch_all)]
    Other(u8),
}

/// Security header type (high nibble of an EMM PDU's first octet)
/// 3GPP TS 24.301 Section 9.3.1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum SecurityHeaderType {
    /// Plain NAS message, not security protected
    Plain = 0x0,
    /// Integrity protected
    IntegrityProtected = 0x1,
    /// Integrity protected and ciphered
    IntegrityProtectedAndCiphered = 0x2,
    /// Integrity protected with new EPS security context
    IntegrityProtectedWithNewEpsSecurityContext = 0x3,
    /// Integrity protected and ciphered with new EPS security context
    IntegrityProtectedAndCipheredWithNewEpsSecurityContext = 0x4,
    /// Security header for the SERVICE REQUEST message
    ServiceRequest = 0xC,
    /// Reserved codes
    #[num_enum(catch_all)]
    Reserved(u8),
}

impl Default for SecurityHeaderType {
    fn default() -> Self {
        Self::Plain
    }
}

impl SecurityHeaderType {
    /// Returns true for the four full-form integrity protected variants
    pub fn is_integrity_protected(&self) -> bool {
        matches!(
            self,
            SecurityHeaderType::IntegrityProtected
                | SecurityHeaderType::IntegrityProtectedAndCiphered
                | SecurityHeaderType::IntegrityProtectedWithNewEpsSecurityContext
                | SecurityHeaderType::IntegrityProtectedAndCipheredWithNewEpsSecurityContext
        )
    }

    /// Returns true if the payload is ciphered
    pub fn is_ciphered(&self) -> bool {
        matches!(
            self,
            SecurityHeaderType::IntegrityProtectedAndCiphered
                | SecurityHeaderType::IntegrityProtectedAndCipheredWithNewEpsSecurityContext
        )
    }

    /// Returns true if this indicates a new security context
    pub fn is_new_security_context(&self) -> bool {
        matches!(
            self,
            SecurityHeaderType::IntegrityProtectedWithNewEpsSecurityContext
                | SecurityHeaderType::IntegrityProtectedAndCipheredWithNewEpsSecurityContext
        )
    }
}

/// EMM message type
/// 3GPP TS 24.301 Section 9.8.1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum EmmMessageType {
    // Attach
    AttachRequest = 0x41,
    AttachAccept = 0x42,
    AttachComplete = 0x43,
    AttachReject = 0x44,

    // Detach
    DetachRequest = 0x45,
    DetachAccept = 0x46,

    // Tracking area update
    TrackingAreaUpdateRequest = 0x48,
    TrackingAreaUpdateAccept = 0x49,
    TrackingAreaUpdateComplete = 0x4A,
    TrackingAreaUpdateReject = 0x4B,

    // Service request
    ExtendedServiceRequest = 0x4C,
    ControlPlaneServiceRequest = 0x4D,
    ServiceReject = 0x4E,
    ServiceAccept = 0x4F,

    // GUTI reallocation
    GutiReallocationCommand = 0x50,
    GutiReallocationComplete = 0x51,

    // Authentication
    AuthenticationRequest = 0x52,
    AuthenticationResponse = 0x53,
    AuthenticationReject = 0x54,
    AuthenticationFailure = 0x5C,

    // Identity
    IdentityRequest = 0x55,
    IdentityResponse = 0x56,

    // Security mode control
    SecurityModeCommand = 0x5D,
    SecurityModeComplete = 0x5E,
    SecurityModeReject = 0x5F,

    // Miscellaneous
    EmmStatus = 0x60,
    EmmInformation = 0x61,
    DownlinkNasTransport = 0x62,
    UplinkNasTransport = 0x63,
    CsServiceNotification = 0x64,
    DownlinkGenericNasTransport = 0x68,
    UplinkGenericNasTransport = 0x69,

    /// Unassigned message type
    #[num_enum(catch_all)]
    Unknown(u8),
}

/// ESM message type
/// 3GPP TS 24.301 Section 9.8.2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum EsmMessageType {
    ActivateDefaultEpsBearerContextRequest = 0xC1,
    ActivateDefaultEpsBearerContextAccept = 0xC2,
    ActivateDefaultEpsBearerContextReject = 0xC3,
    ActivateDedicatedEpsBearerContextRequest = 0xC5,
    ActivateDedicatedEpsBearerContextAccept = 0xC6,
    ActivateDedicatedEpsBearerContextReject = 0xC7,
    ModifyEpsBearerContextRequest = 0xC9,
    ModifyEpsBearerContextAccept = 0xCA,
    ModifyEpsBearerContextReject = 0xCB,
    DeactivateEpsBearerContextRequest = 0xCD,
    DeactivateEpsBearerContextAccept = 0xCE,
    PdnConnectivityRequest = 0xD0,
    PdnConnectivityReject = 0xD1,
    PdnDisconnectRequest = 0xD2,
    PdnDisconnectReject = 0xD3,
    BearerResourceAllocationRequest = 0xD4,
    BearerResourceAllocationReject = 0xD5,
    BearerResourceModificationRequest = 0xD6,
    BearerResourceModificationReject = 0xD7,
    EsmInformationRequest = 0xD9,
    EsmInformationResponse = 0xDA,
    Notification = 0xDB,
    EsmDummyMessage = 0xDC,
    EsmStatus = 0xE8,
    RemoteUeReport = 0xE9,
    RemoteUeReportResponse = 0xEA,
    EsmDataTransport = 0xEB,

    /// Unassigned message type
    #[num_enum(catch_all)]
    Unknown(u8),
}

/// NAS security direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    /// UE to network
    Uplink = 0,
    /// Network to UE
    Downlink = 1,
}

impl Direction {
    /// Index into per-direction tables
    pub fn index(self) -> usize {
        self as usize
    }

    /// The DIRECTION bit fed to the EIA/EEA algorithms
    pub fn bit(self) -> u8 {
        self as u8
    }
}
