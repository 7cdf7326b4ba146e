//! DER encodings of derived key material.
//!
//! Public keys are written as X.509 SubjectPublicKeyInfo, private keys as
//! PKCS#8 PrivateKeyInfo wrapping a two-prime PKCS#1 RSAPrivateKey. Both use
//! the `rsaEncryption` algorithm identifier with NULL parameters, which is
//! what RSASSA-PKCS1-v1_5 providers expect on import.

use der::asn1::{AnyRef, BitStringRef, UintRef};
use der::pem::LineEnding;
use der::Encode;
use pkcs8::{AlgorithmIdentifierRef, PrivateKeyInfo};
use sha2::{Digest, Sha256};
use spki::SubjectPublicKeyInfoRef;
use zeroize::Zeroizing;

use crate::core::PublicKeyInfo;
use crate::error::Error;
use crate::keygen::RawKeyMaterial;

const PUBLIC_KEY_LABEL: &str = "PUBLIC KEY";
const PRIVATE_KEY_LABEL: &str = "PRIVATE KEY";

/// Encoded public and private halves of a derived key.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedKeyPair {
    bits: u32,
    public_key_der: Vec<u8>,
    private_key_der: Zeroizing<Vec<u8>>,
}

impl EncodedKeyPair {
    /// Modulus size in bits.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// SubjectPublicKeyInfo, DER.
    pub fn public_key_der(&self) -> &[u8] {
        &self.public_key_der
    }

    /// PKCS#8 PrivateKeyInfo, DER.
    pub fn private_key_der(&self) -> &[u8] {
        &self.private_key_der
    }

    pub fn public_key_pem(&self) -> Result<String, Error> {
        to_pem(PUBLIC_KEY_LABEL, &self.public_key_der)
    }

    pub fn private_key_pem(&self) -> Result<Zeroizing<String>, Error> {
        to_pem(PRIVATE_KEY_LABEL, &self.private_key_der).map(Zeroizing::new)
    }

    /// SHA-256 fingerprint of the public key, `sha256:<hex>`.
    pub fn key_id(&self) -> String {
        calculate_key_id(&self.public_key_der)
    }

    /// Publishable summary of the public half.
    pub fn public_key_info(&self) -> Result<PublicKeyInfo, Error> {
        Ok(PublicKeyInfo {
            key_type: "RSA".to_string(),
            bits: self.bits,
            key_id: self.key_id(),
            public_key_pem: self.public_key_pem()?,
        })
    }
}

impl std::fmt::Debug for EncodedKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedKeyPair")
            .field("bits", &self.bits)
            .field("key_id", &self.key_id())
            .finish_non_exhaustive()
    }
}

fn rsa_algorithm() -> AlgorithmIdentifierRef<'static> {
    AlgorithmIdentifierRef {
        oid: pkcs1::ALGORITHM_OID,
        parameters: Some(AnyRef::NULL),
    }
}

fn to_pem(label: &'static str, der: &[u8]) -> Result<String, Error> {
    der::pem::encode_string(label, LineEnding::LF, der)
        .map_err(|e| Error::Encoding(e.to_string()))
}

/// SHA-256 fingerprint of an SPKI DER document, `sha256:<hex>`.
pub fn calculate_key_id(public_key_der: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(public_key_der);
    format!("sha256:{}", hex::encode(hasher.finalize()))
}

/// Encode the public half as SubjectPublicKeyInfo (DER).
pub fn encode_public(key: &RawKeyMaterial) -> Result<Vec<u8>, Error> {
    let n = key.n.to_bytes_be();
    let e = key.e.to_bytes_be();
    let rsa_public_key = pkcs1::RsaPublicKey {
        modulus: UintRef::new(&n)?,
        public_exponent: UintRef::new(&e)?,
    };
    let subject_public_key = rsa_public_key.to_der()?;

    let spki = SubjectPublicKeyInfoRef {
        algorithm: rsa_algorithm(),
        subject_public_key: BitStringRef::from_bytes(&subject_public_key)?,
    };
    Ok(spki.to_der()?)
}

/// Encode the private half, CRT parameters included, as PKCS#8 (DER).
pub fn encode_private(key: &RawKeyMaterial) -> Result<Zeroizing<Vec<u8>>, Error> {
    let n = key.n.to_bytes_be();
    let e = key.e.to_bytes_be();
    let d = Zeroizing::new(key.d.to_bytes_be());
    let p = Zeroizing::new(key.p.to_bytes_be());
    let q = Zeroizing::new(key.q.to_bytes_be());
    let dp = Zeroizing::new(key.dp.to_bytes_be());
    let dq = Zeroizing::new(key.dq.to_bytes_be());
    let qinv = Zeroizing::new(key.qinv.to_bytes_be());

    let rsa_private_key = pkcs1::RsaPrivateKey {
        modulus: UintRef::new(&n)?,
        public_exponent: UintRef::new(&e)?,
        private_exponent: UintRef::new(&d)?,
        prime1: UintRef::new(&p)?,
        prime2: UintRef::new(&q)?,
        exponent1: UintRef::new(&dp)?,
        exponent2: UintRef::new(&dq)?,
        coefficient: UintRef::new(&qinv)?,
        other_prime_infos: None,
    };
    let private_key = Zeroizing::new(rsa_private_key.to_der()?);

    let info = PrivateKeyInfo::new(rsa_algorithm(), &private_key);
    Ok(Zeroizing::new(info.to_der()?))
}

/// Encode both halves.
pub fn encode(key: &RawKeyMaterial) -> Result<EncodedKeyPair, Error> {
    let bits = u32::try_from(key.bits())
        .map_err(|_| Error::Encoding("modulus size out of range".to_string()))?;
    Ok(EncodedKeyPair {
        bits,
        public_key_der: encode_public(key)?,
        private_key_der: encode_private(key)?,
    })
}
