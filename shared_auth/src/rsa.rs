// signed_ledger/shared_auth/src/rsa.rs

use num_bigint::{BigInt, BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::error::{CryptoError, CryptoResult};

/// Conventional public exponent shared by every key pair.
pub const PUBLIC_EXPONENT: u32 = 65537;

/// Smallest prime size accepted. The modulus has to exceed every padded
/// digest, which is at most 256 bits wide.
pub const MIN_PRIME_BITS: u64 = 256;

pub const DEFAULT_MILLER_RABIN_ROUNDS: usize = 40;
pub const DEFAULT_MAX_KEYGEN_ATTEMPTS: u32 = 16;

// Candidates per prime before giving up. A 2048-bit prime needs ~700 odd
// candidates on average, so this is far beyond any realistic run.
const MAX_PRIME_CANDIDATES: u32 = 200_000;

static SMALL_PRIMES: Lazy<Vec<u32>> = Lazy::new(|| sieve(2000));

/// Public half of a key pair: `(e, n)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    pub exponent: BigUint,
    pub modulus: BigUint,
}

impl PublicKey {
    pub fn new(exponent: BigUint, modulus: BigUint) -> Self {
        PublicKey { exponent, modulus }
    }

    /// `value^e mod n`. Returns `None` when the value does not fit the modulus.
    pub fn apply(&self, value: &BigUint) -> Option<BigUint> {
        if self.modulus.is_zero() || value >= &self.modulus {
            return None;
        }
        Some(value.modpow(&self.exponent, &self.modulus))
    }
}

/// An RSA key pair. Created once per session and never mutated.
#[derive(Clone)]
pub struct KeyPair {
    public_key: PublicKey,
    private_exponent: BigUint,
}

impl KeyPair {
    pub fn from_parts(public_exponent: BigUint, private_exponent: BigUint, modulus: BigUint) -> Self {
        KeyPair {
            public_key: PublicKey::new(public_exponent, modulus),
            private_exponent,
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn public_exponent(&self) -> &BigUint {
        &self.public_key.exponent
    }

    pub fn modulus(&self) -> &BigUint {
        &self.public_key.modulus
    }

    /// The secret exponent.
    ///
    /// # Security Warning
    /// Never log, persist or transmit this value.
    pub fn private_exponent(&self) -> &BigUint {
        &self.private_exponent
    }

    /// `value^d mod n`
    pub(crate) fn apply_private(&self, value: &BigUint) -> BigUint {
        value.modpow(&self.private_exponent, &self.public_key.modulus)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_exponent", &self.public_key.exponent)
            .field("modulus_bits", &self.public_key.modulus.bits())
            .field("private_exponent", &"<redacted>")
            .finish()
    }
}

/// Draws RSA key pairs from two random probable primes.
#[derive(Clone, Debug)]
pub struct KeyGenerator {
    prime_bits: u64,
    rounds: usize,
    max_attempts: u32,
}

impl KeyGenerator {
    pub fn new(prime_bits: u64) -> CryptoResult<Self> {
        if prime_bits < MIN_PRIME_BITS {
            return Err(CryptoError::InvalidKeySize {
                bits: prime_bits,
                minimum: MIN_PRIME_BITS,
            });
        }
        Ok(KeyGenerator {
            prime_bits,
            rounds: DEFAULT_MILLER_RABIN_ROUNDS,
            max_attempts: DEFAULT_MAX_KEYGEN_ATTEMPTS,
        })
    }

    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds.max(1);
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn prime_bits(&self) -> u64 {
        self.prime_bits
    }

    /// Generates a key pair whose modulus is the product of two `prime_bits`
    /// primes. Prime pairs for which `e` has no inverse mod φ(n) are thrown
    /// away and redrawn, up to `max_attempts` times.
    pub fn generate(&self) -> CryptoResult<KeyPair> {
        self.generate_from(|| generate_large_prime(self.prime_bits, self.rounds))
    }

    /// Builds a key pair from primes pulled off `draw`, two per attempt.
    fn generate_from(
        &self,
        mut draw: impl FnMut() -> CryptoResult<BigUint>,
    ) -> CryptoResult<KeyPair> {
        let e = BigUint::from(PUBLIC_EXPONENT);

        for attempt in 1..=self.max_attempts {
            let p = draw()?;
            let q = draw()?;
            if p == q {
                continue;
            }

            let n = &p * &q;
            let phi = (&p - BigUint::one()) * (&q - BigUint::one());

            match modinv(&e, &phi) {
                Some(d) => {
                    debug!(
                        modulus_bits = n.bits(),
                        attempt, "RSA key pair generated"
                    );
                    return Ok(KeyPair::from_parts(e, d, n));
                }
                None => debug!(attempt, "public exponent not coprime to phi(n), redrawing primes"),
            }
        }

        Err(CryptoError::KeyGenerationFailure {
            attempts: self.max_attempts,
        })
    }
}

fn generate_large_prime(bits: u64, rounds: usize) -> CryptoResult<BigUint> {
    let mut rng = OsRng;
    for _ in 0..MAX_PRIME_CANDIDATES {
        let mut candidate = rng.gen_biguint(bits);
        candidate.set_bit(bits - 1, true);
        candidate.set_bit(0, true);
        if is_probably_prime(&candidate, rounds) {
            return Ok(candidate);
        }
    }
    Err(CryptoError::PrimeGenerationFailure { bits })
}

/// Trial division by small primes followed by `rounds` Miller-Rabin rounds.
pub fn is_probably_prime(n: &BigUint, rounds: usize) -> bool {
    let two = BigUint::from(2u32);
    if n < &two {
        return false;
    }

    for &p in SMALL_PRIMES.iter() {
        let p = BigUint::from(p);
        if n == &p {
            return true;
        }
        if (n % &p).is_zero() {
            return false;
        }
    }

    let n_minus_one = n - BigUint::one();
    let mut d = n_minus_one.clone();
    let mut s: u32 = 0;
    while d.is_even() {
        d >>= 1;
        s += 1;
    }

    let mut rng = OsRng;
    'witness: for _ in 0..rounds {
        let a = rng.gen_biguint_range(&two, &n_minus_one);
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
        return false;
    }
    true
}

/// Modular inverse via the extended Euclidean algorithm. `None` when
/// `gcd(a, m) != 1`.
pub fn modinv(a: &BigUint, m: &BigUint) -> Option<BigUint> {
    if m.is_zero() || m.is_one() {
        return None;
    }
    if !a.gcd(m).is_one() {
        return None;
    }

    let m_signed = BigInt::from(m.clone());
    let (mut old_r, mut r) = (BigInt::from(a.clone()), m_signed.clone());
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());

    while !r.is_zero() {
        let quotient = &old_r / &r;
        let next_r = &old_r - &quotient * &r;
        old_r = std::mem::replace(&mut r, next_r);
        let next_s = &old_s - &quotient * &s;
        old_s = std::mem::replace(&mut s, next_s);
    }

    old_s.mod_floor(&m_signed).to_biguint()
}

fn sieve(limit: usize) -> Vec<u32> {
    let mut composite = vec![false; limit + 1];
    let mut primes = Vec::new();
    for i in 2..=limit {
        if composite[i] {
            continue;
        }
        primes.push(i as u32);
        let mut j = i * i;
        while j <= limit {
            composite[j] = true;
            j += i;
        }
    }
    primes
}
