//! EPS NAS Messages
//!
//! This module contains implementations of EPS NAS messages
//! as defined in 3GPP TS 24.301.
//!
//! ## Message Categories
//!
//! - EMM (Mobility Management) messages - [`emm`]
//! - ESM (Session Management) messages - [`esm`]
//!
//! Leaf messages decode and encode the body that follows the message type;
//! the leading header fields are handled by [`crate::dispatch`].

pub mod emm;
pub mod esm;

pub use emm::*;
pub use esm::*;
