//! Chance sources for probabilistic conditions
//!
//! Probabilistic condition kinds roll once per evaluation. The roll goes
//! through [`ChanceSource`] so a deployment can seed it, share it across
//! request threads, or replace it with a fixed outcome.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of random booleans for probabilistic conditions
pub trait ChanceSource: Send + Sync {
    /// Return true with the given probability
    fn chance(&self, probability: f64) -> bool;
}

/// A deterministic random number generator
///
/// Uses xorshift64 so a seeded engine replays the same rolls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRng {
    state: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        // xorshift requires a non-zero state
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Create an RNG seeded from the system clock
    pub fn from_entropy() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x9e37_79b9_7f4a_7c15);
        Self::new(nanos ^ 0x9e37_79b9_7f4a_7c15)
    }

    /// Generate the next raw u64 value
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Generate a random f64 in range [0, 1)
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Generate a random bool with given probability of true
    pub fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::new(12345)
    }
}

/// A [`GameRng`] shared between concurrent evaluations
#[derive(Debug)]
pub struct SharedRng {
    inner: Mutex<GameRng>,
}

impl SharedRng {
    /// Share a seeded generator
    pub fn new(rng: GameRng) -> Self {
        Self {
            inner: Mutex::new(rng),
        }
    }

    /// Share a clock-seeded generator
    pub fn from_entropy() -> Self {
        Self::new(GameRng::from_entropy())
    }
}

impl ChanceSource for SharedRng {
    fn chance(&self, probability: f64) -> bool {
        // A panic while holding the lock cannot leave the state invalid
        let mut rng = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        rng.chance(probability)
    }
}

/// A chance source with a predetermined outcome
#[derive(Debug, Clone, Copy)]
pub struct FixedChance(pub bool);

impl ChanceSource for FixedChance {
    fn chance(&self, _probability: f64) -> bool {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = GameRng::new(42);
        let mut rng2 = GameRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.next_u64(), rng2.next_u64());
        }
    }

    #[test]
    fn test_range() {
        let mut rng = GameRng::new(42);
        for _ in 0..1000 {
            let f = rng.next_f64();
            assert!((0.0..1.0).contains(&f));
        }
    }

    #[test]
    fn test_chance_frequency() {
        let shared = SharedRng::new(GameRng::new(7));
        let hits = (0..10_000).filter(|_| shared.chance(0.3)).count();
        // Loose bounds around the expected 3000
        assert!(hits > 2500 && hits < 3500, "hits = {hits}");
    }

    #[test]
    fn test_chance_edges() {
        let mut rng = GameRng::new(99);
        assert!((0..100).all(|_| !rng.chance(0.0)));
        assert!((0..100).all(|_| rng.chance(1.0)));
    }

    #[test]
    fn test_fixed_chance() {
        assert!(FixedChance(true).chance(0.0));
        assert!(!FixedChance(false).chance(1.0));
    }
}
