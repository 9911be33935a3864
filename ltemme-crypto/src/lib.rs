//! Cryptographic algorithms for the EPS NAS layer
//!
//! - SNOW 3G (EEA1/EIA1)
//! - AES-based (EEA2/EIA2)
//! - ZUC (EEA3/EIA3)
//! - Key derivation from KASME

pub mod eea;
pub mod eia;
pub mod kdf;
pub mod snow3g;
