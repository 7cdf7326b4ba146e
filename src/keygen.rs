//! RSA key generation driven entirely by a [`ByteSource`].

use num_bigint::BigUint;
use num_traits::Zero;
use tracing::{debug, trace};

use crate::bigint::{
    is_probable_prime, mod_inverse, random_candidate, small_primes, MILLER_RABIN_ROUNDS,
};
use crate::core::KeyParams;
use crate::error::Error;
use crate::stream::ByteSource;

/// Draws of `q` allowed before giving up on finding one distinct from `p`.
const MAX_DISTINCT_PRIME_ATTEMPTS: u32 = 8;

/// Candidate budget per bit of prime size. The expected count is around
/// `0.35 * bits`, so hitting this means the byte source is broken.
const CANDIDATES_PER_BIT: u64 = 100;

/// Algebraic RSA key: modulus, exponents, primes and CRT parameters.
///
/// Invariants: `n = p * q`, `p > q`, `e * d = 1 mod (p - 1)(q - 1)`,
/// `dp = d mod (p - 1)`, `dq = d mod (q - 1)`, `qinv * q = 1 mod p`.
#[derive(Clone, PartialEq, Eq)]
pub struct RawKeyMaterial {
    pub n: BigUint,
    pub e: BigUint,
    pub d: BigUint,
    pub p: BigUint,
    pub q: BigUint,
    pub dp: BigUint,
    pub dq: BigUint,
    pub qinv: BigUint,
}

impl RawKeyMaterial {
    /// Bit length of the modulus.
    pub fn bits(&self) -> u64 {
        self.n.bits()
    }
}

impl std::fmt::Debug for RawKeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawKeyMaterial")
            .field("bits", &self.bits())
            .field("e", &self.e)
            .finish_non_exhaustive()
    }
}

/// Prime search state for one key generation.
struct PrimeSearch<'a, S: ByteSource> {
    source: &'a mut S,
    sieve: Vec<u32>,
    e: BigUint,
    candidates: u64,
}

impl<'a, S: ByteSource> PrimeSearch<'a, S> {
    fn new(source: &'a mut S, e: BigUint) -> Self {
        Self {
            source,
            sieve: small_primes(),
            e,
            candidates: 0,
        }
    }

    /// Draw candidates until one is a probable prime `p` with
    /// `gcd(p - 1, e) = 1`. Rejected candidates are discarded, never adjusted.
    fn next_prime(&mut self, bits: u32) -> Result<BigUint, Error> {
        let budget = CANDIDATES_PER_BIT * u64::from(bits);
        for _ in 0..budget {
            self.candidates += 1;
            let candidate = random_candidate(&mut *self.source, bits)?;

            if self.sieve.iter().any(|&p| (&candidate % p).is_zero()) {
                continue;
            }
            // e is prime, so gcd(c - 1, e) = 1 unless e divides c - 1.
            if ((&candidate - 1u8) % &self.e).is_zero() {
                continue;
            }
            if !is_probable_prime(&candidate, MILLER_RABIN_ROUNDS, &mut *self.source)? {
                continue;
            }

            trace!(bits, candidates = self.candidates, "accepted prime");
            return Ok(candidate);
        }

        Err(Error::InternalGeneration(format!(
            "no {}-bit prime found within {} candidates",
            bits, budget
        )))
    }
}

/// Generate RSA key material from `source`.
///
/// Parameters are validated before a single byte is drawn. The private
/// exponent is computed modulo `phi(n) = (p - 1)(q - 1)`.
///
/// # Errors
///
/// [`Error::InvalidParameter`] for an out-of-range key size,
/// [`Error::InternalGeneration`] if the search breaks an invariant, and any
/// error raised by the byte source.
pub fn generate(
    source: &mut impl ByteSource,
    params: &KeyParams,
) -> Result<RawKeyMaterial, Error> {
    params.validate()?;

    let bits = params.bits;
    let e = BigUint::from(params.public_exponent());
    let p_bits = (bits + 1) / 2;
    let q_bits = bits - p_bits;

    debug!(bits, "starting RSA prime search");
    let mut search = PrimeSearch::new(source, e.clone());

    let p = search.next_prime(p_bits)?;
    let mut q = None;
    for _ in 0..MAX_DISTINCT_PRIME_ATTEMPTS {
        let candidate = search.next_prime(q_bits)?;
        if candidate != p {
            q = Some(candidate);
            break;
        }
    }
    let q = q.ok_or_else(|| {
        Error::InternalGeneration(format!(
            "byte source produced p == q {} times",
            MAX_DISTINCT_PRIME_ATTEMPTS
        ))
    })?;
    let candidates = search.candidates;

    let (p, q) = if p < q { (q, p) } else { (p, q) };

    let n = &p * &q;
    if n.bits() != u64::from(bits) {
        return Err(Error::InternalGeneration(format!(
            "modulus has {} bits, expected {}",
            n.bits(),
            bits
        )));
    }

    let p_minus_one = &p - 1u8;
    let q_minus_one = &q - 1u8;
    let phi = &p_minus_one * &q_minus_one;

    let d = mod_inverse(&e, &phi).ok_or_else(|| {
        Error::InternalGeneration("public exponent is not invertible mod phi(n)".to_string())
    })?;
    let dp = &d % &p_minus_one;
    let dq = &d % &q_minus_one;
    let qinv = mod_inverse(&q, &p)
        .ok_or_else(|| Error::InternalGeneration("q is not invertible mod p".to_string()))?;

    debug!(bits, candidates, "RSA key material ready");

    Ok(RawKeyMaterial {
        n,
        e,
        d,
        p,
        q,
        dp,
        dq,
        qinv,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::SeededStream;
    use num_traits::One;

    /// Counts bytes handed out, to check nothing is drawn on early failures.
    struct CountingSource {
        inner: SeededStream,
        drawn: usize,
    }

    impl ByteSource for CountingSource {
        fn fill(&mut self, dest: &mut [u8]) -> Result<(), Error> {
            self.drawn += dest.len();
            self.inner.fill(dest)
        }
    }

    /// Repeats one fixed block forever, so every candidate is identical.
    struct ConstantSource(Vec<u8>);

    impl ByteSource for ConstantSource {
        fn fill(&mut self, dest: &mut [u8]) -> Result<(), Error> {
            for (i, byte) in dest.iter_mut().enumerate() {
                *byte = self.0[i % self.0.len()];
            }
            Ok(())
        }
    }

    fn check_invariants(key: &RawKeyMaterial) {
        let one = BigUint::one();
        let p1 = &key.p - 1u8;
        let q1 = &key.q - 1u8;

        assert_eq!(key.n, &key.p * &key.q);
        assert!(key.p > key.q);
        assert_eq!(key.e, BigUint::from(65537u32));
        assert_eq!((&key.e * &key.d) % (&p1 * &q1), one);
        assert_eq!(key.dp, &key.d % &p1);
        assert_eq!(key.dq, &key.d % &q1);
        assert_eq!((&key.qinv * &key.q) % &key.p, one);

        // Textbook round trip through the CRT exponents.
        let m = BigUint::from(0x1234_5678u32);
        let c = m.modpow(&key.e, &key.n);
        assert_eq!(c.modpow(&key.d, &key.n), m);
        assert_eq!(c.modpow(&key.dp, &key.p), &m % &key.p);
        assert_eq!(c.modpow(&key.dq, &key.q), &m % &key.q);
    }

    #[test]
    fn test_generate_512() {
        let mut stream = SeededStream::from_seed(b"keygen-512");
        let key = generate(&mut stream, &KeyParams::new(512)).unwrap();
        assert_eq!(key.bits(), 512);
        check_invariants(&key);
    }

    #[test]
    fn test_generate_odd_size() {
        let mut stream = SeededStream::from_seed(b"keygen-odd");
        let key = generate(&mut stream, &KeyParams::new(601)).unwrap();
        assert_eq!(key.bits(), 601);
        assert_eq!(key.p.bits(), 301);
        assert_eq!(key.q.bits(), 300);
        check_invariants(&key);
    }

    #[test]
    fn test_generate_is_deterministic() {
        let params = KeyParams::new(768);
        let a = generate(&mut SeededStream::from_seed(b"same"), &params).unwrap();
        let b = generate(&mut SeededStream::from_seed(b"same"), &params).unwrap();
        assert_eq!(a, b);

        let c = generate(&mut SeededStream::from_seed(b"other"), &params).unwrap();
        assert_ne!(a.n, c.n);
    }

    #[test]
    fn test_invalid_bits_rejected_before_drawing() {
        let mut source = CountingSource {
            inner: SeededStream::from_seed(b"unused"),
            drawn: 0,
        };
        let err = generate(&mut source, &KeyParams::new(256)).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
        assert_eq!(source.drawn, 0);

        let err = generate(&mut source, &KeyParams::new(8192)).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
        assert_eq!(source.drawn, 0);
    }

    #[test]
    fn test_constant_source_fails_cleanly() {
        // All-0xff candidates are 2^k - 1 with k even, hence divisible by 3:
        // the candidate budget runs out instead of looping forever.
        let mut source = ConstantSource(vec![0xff]);
        let err = generate(&mut source, &KeyParams::new(512)).unwrap_err();
        assert!(matches!(err, Error::InternalGeneration(_)));
    }

    #[test]
    fn test_repeated_prime_is_rejected() {
        // 0xc000...0031 is a 256-bit prime with both top bits set, no factor
        // below 2048, and 65537 does not divide p - 1. Every candidate and
        // every witness drawn from this source is that same prime.
        let mut prime = vec![0u8; 32];
        prime[0] = 0xc0;
        prime[31] = 0x31;
        let mut source = ConstantSource(prime);

        let err = generate(&mut source, &KeyParams::new(512)).unwrap_err();
        match err {
            Error::InternalGeneration(msg) => assert!(msg.contains("p == q"), "{}", msg),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_debug_hides_secrets() {
        let mut stream = SeededStream::from_seed(b"debug");
        let key = generate(&mut stream, &KeyParams::new(512)).unwrap();
        let rendered = format!("{:?}", key);
        assert!(rendered.contains("bits: 512"));
        assert!(!rendered.contains(&key.d.to_string()));
    }
}
