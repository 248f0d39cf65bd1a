//! Addition problems shown to the player

use rand::Rng;

/// `a + b`, both non-negative
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Equation {
    pub a: u8,
    pub b: u8,
}

impl Equation {
    /// Split `target` into a uniformly chosen `a + b`
    ///
    /// A target of 1 only ever yields `0+1` or `1+0`.
    pub fn split<R: Rng>(target: u8, rng: &mut R) -> Self {
        let a = if target == 1 {
            if rng.random_bool(0.5) { 0 } else { 1 }
        } else {
            rng.random_range(0..=target)
        };
        Self { a, b: target - a }
    }

    /// Pick a target in `1..=max` and split it
    pub fn random<R: Rng>(max: u8, rng: &mut R) -> Self {
        let target = rng.random_range(1..=max.max(1));
        Self::split(target, rng)
    }

    #[inline]
    pub fn answer(&self) -> u8 {
        self.a + self.b
    }

    /// Compact form used on bubbles and cards ("2+3")
    pub fn compact(&self) -> String {
        format!("{}+{}", self.a, self.b)
    }

    /// Question form used by the catcher ("2 + 3 = ?")
    pub fn question(&self) -> String {
        format!("{} + {} = ?", self.a, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_split_sums_to_target() {
        let mut rng = Pcg32::seed_from_u64(7);
        for target in 1..=10 {
            for _ in 0..50 {
                let eq = Equation::split(target, &mut rng);
                assert_eq!(eq.answer(), target);
            }
        }
    }

    #[test]
    fn test_split_of_one_uses_both_orders() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut seen = [false; 2];
        for _ in 0..64 {
            let eq = Equation::split(1, &mut rng);
            assert!(eq == Equation { a: 0, b: 1 } || eq == Equation { a: 1, b: 0 });
            seen[eq.a as usize] = true;
        }
        assert_eq!(seen, [true, true]);
    }

    #[test]
    fn test_random_respects_max() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..200 {
            let eq = Equation::random(5, &mut rng);
            assert!((1..=5).contains(&eq.answer()));
        }
    }

    #[test]
    fn test_text_forms() {
        let eq = Equation { a: 2, b: 3 };
        assert_eq!(eq.compact(), "2+3");
        assert_eq!(eq.question(), "2 + 3 = ?");
    }
}
