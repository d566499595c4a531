//! Random red-ish box colors.

use image::Rgb;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Color source: red fixed at full intensity, green and blue random.
pub struct Palette {
    rng: StdRng,
}

impl Palette {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic colors.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn next_color(&mut self) -> Rgb<u8> {
        Rgb([255, self.rng.random::<u8>(), self.rng.random::<u8>()])
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colors_are_reddish() {
        let mut palette = Palette::new();
        for _ in 0..50 {
            assert_eq!(palette.next_color().0[0], 255);
        }
    }

    #[test]
    fn test_seeded_is_deterministic() {
        let mut a = Palette::seeded(7);
        let mut b = Palette::seeded(7);
        for _ in 0..10 {
            assert_eq!(a.next_color(), b.next_color());
        }
    }
}
