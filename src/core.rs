//! Key derivation parameters, limits and shared data types.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Smallest modulus size accepted, in bits.
pub const MIN_BITS: u32 = 512;
/// Largest modulus size accepted, in bits.
pub const MAX_BITS: u32 = 4096;
/// Modulus size used when the caller does not pick one.
pub const DEFAULT_BITS: u32 = 2048;
/// Fixed RSA public exponent (F4).
pub const PUBLIC_EXPONENT: u32 = 65537;

/// Parameters for one key derivation.
///
/// Deserializes from any serde format; missing fields take their defaults.
///
/// ```
/// use seeded_rsa::core::KeyParams;
///
/// let params = KeyParams::from_json(r#"{ "bits": 1024 }"#).unwrap();
/// assert_eq!(params.bits, 1024);
/// assert_eq!(KeyParams::from_json("{}").unwrap().bits, 2048);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct KeyParams {
    /// Size of the modulus in bits
    pub bits: u32,
}

impl Default for KeyParams {
    fn default() -> Self {
        Self { bits: DEFAULT_BITS }
    }
}

impl KeyParams {
    pub fn new(bits: u32) -> Self {
        Self { bits }
    }

    /// Parse parameters from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn public_exponent(&self) -> u32 {
        PUBLIC_EXPONENT
    }

    /// Check the parameters without doing any work.
    pub fn validate(&self) -> Result<(), Error> {
        if self.bits < MIN_BITS {
            return Err(Error::InvalidParameter(format!(
                "key size {} is below the minimum of {} bits",
                self.bits, MIN_BITS
            )));
        }
        if self.bits > MAX_BITS {
            return Err(Error::InvalidParameter(format!(
                "key size {} exceeds the maximum of {} bits",
                self.bits, MAX_BITS
            )));
        }
        Ok(())
    }
}

/// Public description of a derived key, safe to publish or log.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PublicKeyInfo {
    /// Type of the cryptographic key (always "RSA")
    pub key_type: String,
    /// Size of the modulus in bits
    pub bits: u32,
    /// SHA-256 fingerprint of the SPKI encoding, `sha256:<hex>`
    pub key_id: String,
    /// PEM-encoded public key
    pub public_key_pem: String,
}
