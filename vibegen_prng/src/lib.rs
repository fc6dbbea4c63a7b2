// Deterministic, portable pseudo-random number generator.
//
// Implements xoshiro256++ (Blackman & Vigna, 2019) with SplitMix64 seeding.
// Hand-rolled so the output stream is identical on every platform and never
// shifts under a dependency upgrade.
//
// This crate is the single PRNG used by `vibegen_music`. Every composition
// engine ("vibe") owns exactly one `VibeRng`, seeded from the vibe's `Seed`.
// Text seeds are folded to a `u64` with FNV-1a over their UTF-8 bytes, so
// the seed "apple" means the same stream everywhere.
//
// **Critical constraint: determinism.** Every method on `VibeRng` must produce
// identical output given the same prior state, regardless of platform, compiler
// version, or optimization level. The core generator uses integer arithmetic
// only; floats are derived from it by exact power-of-two division.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Returned by [`VibeRng::choose`] when asked to pick from an empty slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot choose from an empty list")]
pub struct EmptyChoiceError;

/// What a stream was seeded from: either free text or a raw integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Seed {
    Number(u64),
    Text(String),
}

impl Seed {
    /// The 64-bit value fed to SplitMix64.
    pub fn to_u64(&self) -> u64 {
        match self {
            Seed::Number(n) => *n,
            Seed::Text(s) => fnv1a_64(s.as_bytes()),
        }
    }
}

impl From<u64> for Seed {
    fn from(n: u64) -> Self {
        Seed::Number(n)
    }
}

impl From<&str> for Seed {
    fn from(s: &str) -> Self {
        Seed::Text(s.to_string())
    }
}

impl From<String> for Seed {
    fn from(s: String) -> Self {
        Seed::Text(s)
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seed::Number(n) => write!(f, "{n}"),
            Seed::Text(s) => write!(f, "{s:?}"),
        }
    }
}

/// Xoshiro256++ PRNG, the sole source of randomness for a vibe.
///
/// `Clone` and serde support let a host snapshot a stream and resume it
/// later; cloning forks an independent copy of the stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VibeRng {
    s: [u64; 4],
}

impl VibeRng {
    /// Create a new PRNG seeded from a `u64`.
    ///
    /// Uses SplitMix64 to expand the seed into the 256-bit internal state.
    /// Two `VibeRng` instances created with the same seed will produce
    /// identical output sequences.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    /// Create a new PRNG from a text or integer seed.
    pub fn from_seed(seed: &Seed) -> Self {
        Self::new(seed.to_u64())
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Generate a uniform `f64` in [0, 1).
    ///
    /// Uses the upper 53 bits of a `u64` to fill the mantissa of an f64.
    /// 53 bits gives full f64 precision (IEEE 754 double has a 52-bit
    /// mantissa + 1 implicit bit).
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Pick one element uniformly: `list[floor(next_f64() * len)]`.
    ///
    /// Consumes exactly one draw from the stream, even for a one-element
    /// list, so the stream position depends only on how many choices were
    /// made and never on the list contents.
    pub fn choose<'a, T>(&mut self, list: &'a [T]) -> Result<&'a T, EmptyChoiceError> {
        if list.is_empty() {
            return Err(EmptyChoiceError);
        }
        let idx = (self.next_f64() * list.len() as f64) as usize;
        // next_f64 < 1.0, so idx < len; the min guards against float edge cases.
        Ok(&list[idx.min(list.len() - 1)])
    }
}

/// SplitMix64, used only for seeding xoshiro256++ from a single `u64`.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// 64-bit FNV-1a hash, used to fold text seeds into a `u64`.
fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}
