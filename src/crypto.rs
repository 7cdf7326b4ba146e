//! RSASSA-PKCS1-v1_5 / SHA-256 operations over derived keys.
//!
//! This is the consuming side of a derivation: it imports the SPKI and
//! PKCS#8 encodings into the RustCrypto `rsa` provider and signs or verifies
//! with them.

use base64::{engine::general_purpose, Engine as _};
use rand::rngs::OsRng;
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::signature::{RandomizedSigner, SignatureEncoding, Verifier};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

use crate::encode::EncodedKeyPair;
use crate::error::Error;

/// Imported key handles ready for signing and verification.
#[derive(Clone)]
pub struct KeyPair {
    pub public_key: RsaPublicKey,
    pub private_key: RsaPrivateKey,
}

impl KeyPair {
    /// Import both halves of an [`EncodedKeyPair`].
    pub fn from_encoded(encoded: &EncodedKeyPair) -> Result<Self, Error> {
        Ok(Self {
            public_key: import_public(encoded.public_key_der())?,
            private_key: import_private(encoded.private_key_der())?,
        })
    }

    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, Error> {
        sign(&self.private_key, message)
    }

    pub fn verify(&self, signature: &[u8], message: &[u8]) -> Result<bool, Error> {
        verify(&self.public_key, signature, message)
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("modulus_bytes", &self.public_key.size())
            .finish_non_exhaustive()
    }
}

/// Load a SubjectPublicKeyInfo (DER) public key.
pub fn import_public(public_key_der: &[u8]) -> Result<RsaPublicKey, Error> {
    RsaPublicKey::from_public_key_der(public_key_der).map_err(|e| Error::Provider(e.to_string()))
}

/// Load a PKCS#8 (DER) private key. The provider checks the key's
/// consistency on import.
pub fn import_private(private_key_der: &[u8]) -> Result<RsaPrivateKey, Error> {
    RsaPrivateKey::from_pkcs8_der(private_key_der).map_err(|e| Error::Provider(e.to_string()))
}

/// Sign `message` with RSASSA-PKCS1-v1_5 over SHA-256.
///
/// The private-key operation is blinded with OS randomness; the resulting
/// signature bytes do not depend on it.
pub fn sign(private_key: &RsaPrivateKey, message: &[u8]) -> Result<Vec<u8>, Error> {
    let signing_key = SigningKey::<Sha256>::new(private_key.clone());
    let signature = signing_key
        .try_sign_with_rng(&mut OsRng, message)
        .map_err(|e| Error::Provider(e.to_string()))?;
    Ok(signature.to_vec())
}

/// Verify an RSASSA-PKCS1-v1_5 / SHA-256 signature.
///
/// Returns `Ok(false)` for a signature that does not match, and
/// [`Error::InvalidSignature`] when its length is not the modulus size.
pub fn verify(public_key: &RsaPublicKey, signature: &[u8], message: &[u8]) -> Result<bool, Error> {
    if signature.len() != public_key.size() {
        return Err(Error::InvalidSignature);
    }
    let verifying_key = VerifyingKey::<Sha256>::new(public_key.clone());
    let signature = Signature::try_from(signature).map_err(|_| Error::InvalidSignature)?;

    match verifying_key.verify(message, &signature) {
        Ok(()) => Ok(true),
        Err(_) => Ok(false),
    }
}

/// Sign `data` with a PKCS#8 private key and return the base64 signature.
pub fn sign_data(private_key_der: &[u8], data: &[u8]) -> Result<String, Error> {
    let private_key = import_private(private_key_der)?;
    let signature = sign(&private_key, data)?;
    Ok(general_purpose::STANDARD.encode(signature))
}

/// Verify a base64 signature over `data` with an SPKI public key.
pub fn verify_signature(public_key_der: &[u8], data: &[u8], signature: &str) -> Result<bool, Error> {
    let public_key = import_public(public_key_der)?;
    let signature_bytes = general_purpose::STANDARD.decode(signature)?;
    verify(&public_key, &signature_bytes, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::KeyParams;
    use crate::derive::derive_key_pair;
    use std::sync::OnceLock;

    fn encoded(seed: &'static str) -> EncodedKeyPair {
        static A: OnceLock<EncodedKeyPair> = OnceLock::new();
        static B: OnceLock<EncodedKeyPair> = OnceLock::new();
        let cell = match seed {
            "a" => &A,
            _ => &B,
        };
        cell.get_or_init(|| derive_key_pair(seed.as_bytes(), &KeyParams::new(1024)).unwrap())
            .clone()
    }

    #[test]
    fn test_import_and_sign_verify() {
        let keys = KeyPair::from_encoded(&encoded("a")).unwrap();
        let message = b"hello world!";

        let signature = keys.sign(message).unwrap();
        assert_eq!(signature.len(), 128);
        assert!(keys.verify(&signature, message).unwrap());
        assert!(!keys.verify(&signature, b"hello world?").unwrap());
    }

    #[test]
    fn test_signatures_are_deterministic() {
        let keys = KeyPair::from_encoded(&encoded("a")).unwrap();
        assert_eq!(keys.sign(b"msg").unwrap(), keys.sign(b"msg").unwrap());
    }

    #[test]
    fn test_cross_key_verification_fails() {
        let a = KeyPair::from_encoded(&encoded("a")).unwrap();
        let b = KeyPair::from_encoded(&encoded("b")).unwrap();

        let signature = a.sign(b"message").unwrap();
        assert!(a.verify(&signature, b"message").unwrap());
        assert!(!b.verify(&signature, b"message").unwrap());
    }

    #[test]
    fn test_sign_data_and_verify_signature() {
        let pair = encoded("a");
        let data = b"Hello, World!";

        let signature = sign_data(pair.private_key_der(), data).unwrap();
        assert!(verify_signature(pair.public_key_der(), data, &signature).unwrap());
        assert!(!verify_signature(pair.public_key_der(), b"Wrong data", &signature).unwrap());

        let other = encoded("b");
        assert!(!verify_signature(other.public_key_der(), data, &signature).unwrap());
    }

    #[test]
    fn test_verify_signature_rejects_bad_base64() {
        let pair = encoded("a");
        let err = verify_signature(pair.public_key_der(), b"data", "not base64!!").unwrap_err();
        assert!(matches!(err, Error::Base64(_)));
    }

    #[test]
    fn test_verify_rejects_wrong_length() {
        let keys = KeyPair::from_encoded(&encoded("a")).unwrap();
        for bad in [&[][..], &[1, 2, 3][..], &[0u8; 129][..]] {
            assert!(matches!(
                keys.verify(bad, b"message"),
                Err(Error::InvalidSignature)
            ));
        }

        let pair = encoded("a");
        let short = general_purpose::STANDARD.encode([7u8; 16]);
        assert!(matches!(
            verify_signature(pair.public_key_der(), b"message", &short),
            Err(Error::InvalidSignature)
        ));
    }

    #[test]
    fn test_import_rejects_garbage() {
        assert!(matches!(
            import_public(b"not a key"),
            Err(Error::Provider(_))
        ));
        assert!(matches!(
            import_private(b"not a key"),
            Err(Error::Provider(_))
        ));
        // Halves are not interchangeable.
        let pair = encoded("a");
        assert!(import_public(pair.private_key_der()).is_err());
        assert!(import_private(pair.public_key_der()).is_err());
    }

    #[test]
    fn test_debug_hides_private_key() {
        let keys = KeyPair::from_encoded(&encoded("a")).unwrap();
        assert_eq!(
            format!("{:?}", keys),
            "KeyPair { modulus_bytes: 128, .. }"
        );
    }
}
