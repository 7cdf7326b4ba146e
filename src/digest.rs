//! Seed compression.

use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size in bytes of a [`DigestBlock`].
pub const DIGEST_LEN: usize = 32;

/// SHA-256 output of a seed. Every derived byte traces back to one of these.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct DigestBlock([u8; DIGEST_LEN]);

impl DigestBlock {
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }
}

impl From<[u8; DIGEST_LEN]> for DigestBlock {
    fn from(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }
}

// Never print the digest; it is as sensitive as the seed.
impl std::fmt::Debug for DigestBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DigestBlock(..)")
    }
}

/// Reduce an arbitrary seed to a fixed-size [`DigestBlock`] with SHA-256.
///
/// The empty seed is valid. The hash algorithm is fixed: changing it would
/// change every key ever derived.
pub fn compress(seed: &[u8]) -> DigestBlock {
    let mut hasher = Sha256::new();
    hasher.update(seed);
    DigestBlock(hasher.finalize().into())
}
