//! Seed to key pair, end to end.
//!
//! ```text
//! seed -> SHA-256 -> counter-mode stream -> prime search -> RawKeyMaterial
//!      -> { SPKI DER, PKCS#8 DER } -> (optional) provider import
//! ```
//!
//! Each call owns its stream and key material outright, so derivations can
//! run concurrently without coordination. Dropping a call midway discards
//! everything it built.

use tracing::debug;

use crate::core::KeyParams;
use crate::crypto::KeyPair;
use crate::digest::compress;
use crate::encode::{encode, EncodedKeyPair};
use crate::error::Error;
use crate::keygen::generate;
use crate::stream::SeededStream;

/// Derive the encoded key pair for `seed`.
///
/// Identical `(seed, params)` always yield byte-identical output.
///
/// # Errors
///
/// [`Error::InvalidParameter`] if `params` is out of range (checked before
/// any work), otherwise [`Error::InternalGeneration`] or [`Error::Encoding`]
/// if a stage fails. No partial result is ever returned.
pub fn derive_key_pair(seed: &[u8], params: &KeyParams) -> Result<EncodedKeyPair, Error> {
    params.validate()?;

    let mut stream = SeededStream::new(compress(seed));
    let material = generate(&mut stream, params)?;
    let encoded = encode(&material)?;

    debug!(bits = params.bits, key_id = %encoded.key_id(), "derived seeded RSA key pair");
    Ok(encoded)
}

/// Derive a key pair from a seed string and import it for signing.
///
/// ```no_run
/// use seeded_rsa::{core::KeyParams, derive::generate_seeded_rsa};
///
/// let keys = generate_seeded_rsa("alex@example.com:secret", &KeyParams::default()).unwrap();
/// let signature = keys.sign(b"hello world!").unwrap();
/// assert!(keys.verify(&signature, b"hello world!").unwrap());
/// ```
pub fn generate_seeded_rsa(seed: &str, params: &KeyParams) -> Result<KeyPair, Error> {
    let encoded = derive_key_pair(seed.as_bytes(), params)?;
    KeyPair::from_encoded(&encoded)
}

/// Run [`derive_key_pair`] on tokio's blocking pool.
///
/// The prime search has no suspension points, so it is moved off the async
/// executor as a single unit.
#[cfg(feature = "tokio")]
pub async fn derive_key_pair_async(
    seed: Vec<u8>,
    params: KeyParams,
) -> Result<EncodedKeyPair, Error> {
    let seed = zeroize::Zeroizing::new(seed);
    tokio::task::spawn_blocking(move || derive_key_pair(&seed, &params))
        .await
        .map_err(|e| Error::InternalGeneration(format!("derivation task failed: {}", e)))?
}
