//! Injectable randomness and a lightweight xorshift32 PRNG

use crate::types::Vec3;

/// Upper bound on rejection-sampling attempts before falling back to +Y.
const MAX_DIRECTION_ATTEMPTS: u32 = 64;

/// A source of uniform floats in [0, 1).
///
/// Everything random in the scene draws from one of these so tests can swap
/// in a seeded or scripted source.
pub trait RandomSource {
    /// Returns a float in [0, 1)
    fn next_f32(&mut self) -> f32;

    /// Returns a float in [min, max)
    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// Returns a random unit direction, uniform on the sphere surface.
    ///
    /// Marsaglia's method: rejects samples outside the unit disc, so there is
    /// no near-zero vector to normalize. A source that keeps producing
    /// rejected samples yields +Y after a bounded number of attempts.
    fn unit_direction(&mut self) -> Vec3 {
        for _ in 0..MAX_DIRECTION_ATTEMPTS {
            let x = self.range(-1.0, 1.0);
            let y = self.range(-1.0, 1.0);
            let s = x * x + y * y;
            if s < 1.0 {
                let factor = 2.0 * (1.0 - s).sqrt();
                return Vec3::new(x * factor, y * factor, 1.0 - 2.0 * s);
            }
        }
        Vec3::UP
    }
}

/// xorshift32 generator
#[derive(Debug, Clone)]
pub struct XorShiftRng {
    state: u32,
}

impl XorShiftRng {
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    /// Seed from the system clock's sub-second nanoseconds
    pub fn from_time() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.subsec_nanos() ^ (d.as_secs() as u32))
            .unwrap_or(0xDEAD_BEEF);
        Self::new(nanos)
    }

    /// Derive an independent generator for another consumer
    pub fn fork(&mut self) -> Self {
        Self::new(self.next_u32() ^ 0x9E37_79B9)
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}

impl RandomSource for XorShiftRng {
    fn next_f32(&mut self) -> f32 {
        // 24 high bits keep the result strictly below 1.0
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_f32(&mut self) -> f32 {
        (**self).next_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Constant(f32);

    impl RandomSource for Constant {
        fn next_f32(&mut self) -> f32 {
            self.0
        }
    }

    #[test]
    fn rng_range_bounds() {
        let mut rng = XorShiftRng::new(42);
        for _ in 0..1000 {
            let v = rng.range(0.0, 10.0);
            assert!((0.0..10.0).contains(&v));
        }
    }

    #[test]
    fn zero_seed_is_remapped() {
        let mut rng = XorShiftRng::new(0);
        assert_ne!(rng.next_u32(), 0);
    }

    #[test]
    fn rng_direction_unit_length() {
        let mut rng = XorShiftRng::new(123);
        for _ in 0..500 {
            let d = rng.unit_direction();
            assert!((d.length() - 1.0).abs() < 1e-3);
        }
    }

    #[test]
    fn direction_is_roughly_uniform() {
        let mut rng = XorShiftRng::new(7);
        let n = 20_000;
        let mut mean = Vec3::ZERO;
        let mut upper = 0;
        for _ in 0..n {
            let d = rng.unit_direction();
            mean += d;
            if d.y > 0.0 {
                upper += 1;
            }
        }
        let mean = mean * (1.0 / n as f32);
        assert!(mean.length() < 0.05, "mean direction drifted: {mean:?}");
        let frac = upper as f32 / n as f32;
        assert!((frac - 0.5).abs() < 0.03);
    }

    #[test]
    fn degenerate_source_falls_back() {
        // Always (-1, -1): outside the unit disc, never accepted
        let mut rng = Constant(0.0);
        assert_eq!(rng.unit_direction(), Vec3::UP);

        // Always (0, 0): centre of the disc, accepted as +Z
        let mut rng = Constant(0.5);
        let d = rng.unit_direction();
        assert!((d.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn fork_diverges() {
        let mut a = XorShiftRng::new(99);
        let mut b = a.fork();
        assert_ne!(a.next_u32(), b.next_u32());
    }
}
