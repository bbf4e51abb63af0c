//! Deterministic pseudo-random numbers for cosmetic variation.
//!
//! Star placement, planet spin and trail spawning only need cheap, seedable
//! noise, so a basic xorshift is enough and keeps runs reproducible in tests.

/// xorshift32 generator.
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed.max(1) }
    }

    /// Generate a random f32 in [0.0, 1.0)
    pub fn next_f32(&mut self) -> f32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        // Top 24 bits map exactly onto the f32 mantissa, keeping the result below 1.0
        (x >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Generate a random f32 in [min, max)
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// Returns true with the given probability.
    pub fn chance(&mut self, probability: f32) -> bool {
        self.next_f32() < probability
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_in_unit_range() {
        let mut rng = SimpleRng::new(42);
        for _ in 0..10_000 {
            let v = rng.next_f32();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_zero_seed_does_not_stick() {
        let mut rng = SimpleRng::new(0);
        let a = rng.next_f32();
        let b = rng.next_f32();
        assert_ne!(a, b);
    }

    #[test]
    fn test_chance_extremes() {
        let mut rng = SimpleRng::new(7);
        assert!((0..100).all(|_| !rng.chance(0.0)));
        assert!((0..100).all(|_| rng.chance(1.0)));
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = SimpleRng::new(99);
        let mut b = SimpleRng::new(99);
        for _ in 0..32 {
            assert_eq!(a.next_f32(), b.next_f32());
        }
    }
}
