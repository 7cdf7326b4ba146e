//! # seeded-rsa
//!
//! Deterministic RSA keypair derivation from a secret seed.
//!
//! The same seed always produces the same RSA key, so identity key material
//! can be regenerated on demand from a passphrase-like secret instead of
//! being stored. Keys come out as standard DER encodings (SPKI for the public
//! key, PKCS#8 for the private key) ready for RSASSA-PKCS1-v1_5 with SHA-256.
//!
//! ## Features
//!
//! - **Seed Compression**: SHA-256 reduces any seed to a 32-byte digest
//! - **Seeded Byte Stream**: counter-mode SHA-256 expansion of that digest
//! - **RSA Key Generation**: stream-driven prime search with Miller-Rabin
//! - **Key Encoding**: SPKI and PKCS#8 DER, PEM armor, SHA-256 key IDs
//! - **Signing and Verification**: PKCS#1 v1.5 / SHA-256 via the `rsa` crate
//!
//! ## Quick Start
//!
//! ```rust
//! use seeded_rsa::core::KeyParams;
//! use seeded_rsa::crypto::{sign_data, verify_signature};
//! use seeded_rsa::derive::derive_key_pair;
//!
//! let params = KeyParams::new(1024);
//! let keys = derive_key_pair(b"alex@example.com:secret", &params).unwrap();
//!
//! // Deriving again yields identical bytes
//! let again = derive_key_pair(b"alex@example.com:secret", &params).unwrap();
//! assert_eq!(keys.private_key_der(), again.private_key_der());
//!
//! let signature = sign_data(keys.private_key_der(), b"hello world!").unwrap();
//! assert!(verify_signature(keys.public_key_der(), b"hello world!", &signature).unwrap());
//!
//! println!("Key ID: {}", keys.key_id());
//! ```
//!
//! ## Security
//!
//! - Knowing the seed is knowing the private key; the seed needs real entropy
//! - No OS randomness, clock, or global state enters key generation
//! - Seeds, digests, and private key bytes are never logged and are zeroized
//!   when dropped
//!
//! ## Error Handling
//!
//! All fallible operations return `Result<T, Error>`. See [`error::Error`].

pub mod bigint;
pub mod core;
pub mod crypto;
pub mod derive;
pub mod digest;
pub mod encode;
pub mod error;
pub mod keygen;
pub mod stream;

pub use crate::core::KeyParams;
pub use crate::crypto::KeyPair;
pub use crate::derive::{derive_key_pair, generate_seeded_rsa};
pub use crate::encode::EncodedKeyPair;
pub use crate::error::Error;
