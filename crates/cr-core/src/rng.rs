//! Random number generation.
//!
//! Uses a seeded ChaCha RNG for reproducibility (save/restore).

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Game random number generator.
///
/// Wraps ChaCha8Rng for reproducible random number generation.
/// Note: RNG state is not serialized - games restore with a new seed derived from the original.
#[derive(Debug, Clone)]
pub struct GameRng {
    rng: ChaCha8Rng,
    seed: u64,
}

// Custom serialization - only serialize seed, recreate RNG on deserialize
impl Serialize for GameRng {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.seed.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GameRng {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let seed = u64::deserialize(deserializer)?;
        Ok(GameRng::new(seed))
    }
}

impl GameRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create a new RNG with a random seed
    pub fn from_entropy() -> Self {
        let seed = rand::random();
        Self::new(seed)
    }

    /// Get the seed used to create this RNG
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// random2(n) - returns 0..n-1, or 0 if n <= 0
    pub fn random2(&mut self, n: i32) -> i32 {
        if n <= 0 {
            return 0;
        }
        self.rng.gen_range(0..n)
    }

    /// random_range(low, high) - returns low..=high
    ///
    /// Returns `low` when the range is empty or inverted.
    pub fn random_range(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        self.rng.gen_range(low..=high)
    }

    /// roll_dice(n, m) - sum of n rolls of 1..=m
    pub fn roll_dice(&mut self, n: i32, m: i32) -> i32 {
        if n <= 0 || m <= 0 {
            return 0;
        }
        (0..n).map(|_| self.rng.gen_range(1..=m)).sum()
    }

    /// Returns true with probability 1/2
    pub fn coinflip(&mut self) -> bool {
        self.rng.r#gen()
    }

    /// Returns true with probability 1/n
    pub fn one_chance_in(&mut self, n: i32) -> bool {
        self.random2(n) == 0
    }

    /// Returns true with probability x/y (always false for x <= 0,
    /// always true for x >= y)
    pub fn x_chance_in_y(&mut self, x: i32, y: i32) -> bool {
        if x <= 0 {
            return false;
        }
        if x >= y {
            return true;
        }
        self.random2(y) < x
    }

    /// Divide with the remainder rounded up or down at random,
    /// proportionally to its size.
    pub fn div_rand_round(&mut self, num: i32, den: i32) -> i32 {
        let rem = num % den;
        if rem != 0 {
            num / den + i32::from(self.random2(den.abs()) < rem.abs())
        } else {
            num / den
        }
    }

    /// Choose between two values with equal probability
    pub fn random_choose<T>(&mut self, a: T, b: T) -> T {
        if self.coinflip() { a } else { b }
    }

    /// Choose a random element from a slice
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            Some(&items[self.random2(items.len() as i32) as usize])
        }
    }

    /// Choose an element with probability proportional to its weight.
    ///
    /// Returns None if the total weight is zero.
    pub fn choose_weighted<'a, T>(&mut self, items: &'a [(i32, T)]) -> Option<&'a T> {
        let total: i32 = items.iter().map(|(w, _)| *w).sum();
        if total <= 0 {
            return None;
        }
        let mut roll = self.random2(total);
        for (weight, item) in items {
            roll -= weight;
            if roll < 0 {
                return Some(item);
            }
        }
        None
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}
