//! Big integer helpers for the prime search.
//!
//! Thin layer over `num-bigint`. Anything random here is drawn from a
//! [`ByteSource`], never from a thread-local generator.

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Zero};

use crate::error::Error;
use crate::stream::ByteSource;

/// Miller-Rabin rounds applied to every candidate that survives sieving.
pub const MILLER_RABIN_ROUNDS: u32 = 20;

/// Candidates divisible by an odd prime below this bound are dropped before
/// Miller-Rabin runs.
pub const SIEVE_LIMIT: u32 = 2048;

/// Odd primes below [`SIEVE_LIMIT`], in ascending order.
pub fn small_primes() -> Vec<u32> {
    let limit = SIEVE_LIMIT as usize;
    let mut composite = vec![false; limit];
    let mut primes = Vec::new();
    for i in 2..limit {
        if composite[i] {
            continue;
        }
        if i > 2 {
            primes.push(i as u32);
        }
        let mut j = i * i;
        while j < limit {
            composite[j] = true;
            j += i;
        }
    }
    primes
}

/// Modular inverse `a^-1 mod m`, or `None` when `gcd(a, m) != 1`.
pub fn mod_inverse(a: &BigUint, m: &BigUint) -> Option<BigUint> {
    if m.is_zero() {
        return None;
    }

    let modulus = BigInt::from(m.clone());
    let (mut old_r, mut r) = (BigInt::from(a % m), modulus.clone());
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());

    while !r.is_zero() {
        let quotient = &old_r / &r;
        let next_r = &old_r - &quotient * &r;
        old_r = std::mem::replace(&mut r, next_r);
        let next_s = &old_s - &quotient * &s;
        old_s = std::mem::replace(&mut s, next_s);
    }

    if !old_r.is_one() {
        return None;
    }
    old_s.mod_floor(&modulus).to_biguint()
}

/// Draw an odd candidate of exactly `bits` bits with its two top bits set.
///
/// Setting the second-highest bit guarantees that the product of two such
/// candidates has the full combined bit length.
pub fn random_candidate(source: &mut impl ByteSource, bits: u32) -> Result<BigUint, Error> {
    if bits < 2 {
        return Err(Error::InvalidParameter(format!(
            "prime size of {} bits is too small",
            bits
        )));
    }

    let len = ((bits + 7) / 8) as usize;
    let mut bytes = source.next(len)?;
    let excess = len as u32 * 8 - bits;
    bytes[0] &= 0xffu8 >> excess;

    let mut candidate = BigUint::from_bytes_be(&bytes);
    candidate |= BigUint::one() << (bits - 1);
    candidate |= BigUint::one() << (bits - 2);
    candidate |= BigUint::one();
    Ok(candidate)
}

/// Miller-Rabin probable-prime test with witnesses drawn from `source`.
///
/// Each witness consumes `ceil(bits(n) / 8)` bytes and is reduced into
/// `[2, n - 2]`. Small inputs (`n < 5`) are decided directly and draw nothing.
pub fn is_probable_prime(
    n: &BigUint,
    rounds: u32,
    source: &mut impl ByteSource,
) -> Result<bool, Error> {
    let two = BigUint::from(2u8);
    let three = BigUint::from(3u8);

    if n < &two {
        return Ok(false);
    }
    if n == &two || n == &three {
        return Ok(true);
    }
    if n.is_even() {
        return Ok(false);
    }

    let n_minus_one = n - 1u8;
    let mut d = n_minus_one.clone();
    let mut s = 0u32;
    while d.is_even() {
        d >>= 1;
        s += 1;
    }

    let witness_len = ((n.bits() + 7) / 8) as usize;
    let witness_range = n - &three;

    'witness: for _ in 0..rounds {
        let raw = BigUint::from_bytes_be(&source.next(witness_len)?);
        let a = (raw % &witness_range) + &two;

        let mut x = a.modpow(&d, n);
        if x.is_one() || x == n_minus_one {
            continue;
        }

        for _ in 1..s {
            x = x.modpow(&two, n);
            if x == n_minus_one {
                continue 'witness;
            }
        }

        return Ok(false);
    }

    Ok(true)
}
