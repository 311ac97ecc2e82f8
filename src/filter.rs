//! Probabilistic write sampling.
//!
//! Structured writes are kept with the destination's configured
//! probability. A draw happens once per call; a rejected write returns
//! success to the caller with nothing recorded.

use rand::Rng;

/// Decide whether a write with the given keep-probability goes through.
///
/// Probabilities at or above 1.0 keep everything without drawing. Below
/// 1.0 the write is kept when a uniform [0, 1) draw does not exceed the
/// probability.
#[inline]
pub(crate) fn sample_keep(probability: f32) -> bool {
    if probability >= 1.0 {
        return true;
    }
    sample_keep_with(&mut rand::rng(), probability)
}

/// Same decision against a caller-supplied generator.
#[inline]
pub(crate) fn sample_keep_with<R: Rng + ?Sized>(rng: &mut R, probability: f32) -> bool {
    if probability >= 1.0 {
        return true;
    }
    rng.random::<f32>() <= probability
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_keep_everything_at_or_above_one() {
        for _ in 0..1_000 {
            assert!(sample_keep(1.0));
            assert!(sample_keep(1.1));
        }
    }

    #[test]
    fn test_half_probability_is_roughly_half() {
        let mut rng = StdRng::seed_from_u64(0x10_6b_0f);
        let total = 100_000;
        let kept = (0..total)
            .filter(|_| sample_keep_with(&mut rng, 0.5))
            .count();

        // 6 sigma around the binomial mean is ~950 for n=100k, p=0.5.
        assert!(
            (49_000..=51_000).contains(&kept),
            "kept {kept} of {total}, expected close to 50000"
        );
    }

    #[test]
    fn test_low_probability_drops_most() {
        let mut rng = StdRng::seed_from_u64(7);
        let kept = (0..100_000)
            .filter(|_| sample_keep_with(&mut rng, 0.01))
            .count();

        assert!(kept < 2_000, "kept {kept}, expected around 1000");
    }
}
