//! Deterministic byte stream keyed by a [`DigestBlock`].
//!
//! The stream is SHA-256 in counter mode:
//!
//! ```text
//! block_i = SHA-256(digest || u64_be(i))    i = 0, 1, 2, ...
//! stream  = block_0 || block_1 || block_2 || ...
//! ```
//!
//! Nothing else feeds it: no OS entropy, no clock, no process state. Two
//! streams built from equal digests emit identical bytes.

use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use crate::digest::{DigestBlock, DIGEST_LEN};
use crate::error::Error;

/// Source of randomness-shaped bytes for key generation.
///
/// The key generator draws everything it needs through this trait, so it can
/// never reach for an ambient entropy source behind the caller's back.
pub trait ByteSource {
    /// Fill `dest` with the next `dest.len()` bytes of the sequence.
    fn fill(&mut self, dest: &mut [u8]) -> Result<(), Error>;

    /// Return exactly `n` bytes, continuing where the previous call stopped.
    fn next(&mut self, n: usize) -> Result<Vec<u8>, Error> {
        let mut out = vec![0u8; n];
        self.fill(&mut out)?;
        Ok(out)
    }
}

/// Counter-mode SHA-256 stream.
///
/// Deliberately not `Clone`: a copy would replay bytes already handed out.
pub struct SeededStream {
    digest: DigestBlock,
    /// Index of the next block to compute; `None` once the counter wrapped.
    counter: Option<u64>,
    block: [u8; DIGEST_LEN],
    /// Read position inside `block`; `DIGEST_LEN` means the block is spent.
    offset: usize,
}

impl SeededStream {
    pub fn new(digest: DigestBlock) -> Self {
        Self {
            digest,
            counter: Some(0),
            block: [0u8; DIGEST_LEN],
            offset: DIGEST_LEN,
        }
    }

    /// Shorthand for `SeededStream::new(digest::compress(seed))`.
    pub fn from_seed(seed: &[u8]) -> Self {
        Self::new(crate::digest::compress(seed))
    }

    fn refill(&mut self) -> Result<(), Error> {
        let index = self.counter.ok_or_else(|| {
            Error::InternalGeneration("seeded stream counter exhausted".to_string())
        })?;

        let mut hasher = Sha256::new();
        hasher.update(self.digest.as_bytes());
        hasher.update(index.to_be_bytes());
        self.block = hasher.finalize().into();
        self.offset = 0;
        self.counter = index.checked_add(1);
        Ok(())
    }
}

impl ByteSource for SeededStream {
    fn fill(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        let mut written = 0;
        while written < dest.len() {
            if self.offset == DIGEST_LEN {
                self.refill()?;
            }
            let take = (DIGEST_LEN - self.offset).min(dest.len() - written);
            dest[written..written + take]
                .copy_from_slice(&self.block[self.offset..self.offset + take]);
            self.offset += take;
            written += take;
        }
        Ok(())
    }
}

impl Drop for SeededStream {
    fn drop(&mut self) {
        self.block.zeroize();
        self.offset = DIGEST_LEN;
    }
}

impl std::fmt::Debug for SeededStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeededStream")
            .field("counter", &self.counter)
            .finish_non_exhaustive()
    }
}

// Lets the stream stand in wherever a `rand` generator is expected.
impl RngCore for SeededStream {
    fn next_u32(&mut self) -> u32 {
        let mut buf = [0u8; 4];
        self.fill_bytes(&mut buf);
        u32::from_le_bytes(buf)
    }

    fn next_u64(&mut self) -> u64 {
        let mut buf = [0u8; 8];
        self.fill_bytes(&mut buf);
        u64::from_le_bytes(buf)
    }

    /// # Panics
    ///
    /// Panics if the block counter is exhausted (after 2^64 blocks).
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        if let Err(err) = ByteSource::fill(self, dest) {
            panic!("{}", err);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        ByteSource::fill(self, dest).map_err(rand::Error::new)
    }
}

impl CryptoRng for SeededStream {}
