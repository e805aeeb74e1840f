//! Intensity-based retention of lidar returns

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Linear drop-off model for weak returns.
///
/// Returns at or above `limit` are always kept. Below it, a return of
/// intensity `i` survives with probability `alpha * i + beta`, which rises
/// from `1 - drop_at_zero` at zero intensity to 1 at the limit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DropoffModel {
    alpha: f32,
    beta: f32,
    limit: f32,
    general_rate: f32,
}

impl DropoffModel {
    /// # Arguments
    /// * `general_rate` - Fraction of rays dropped before casting
    /// * `limit` - Intensity at and above which returns are always kept
    /// * `drop_at_zero` - Drop probability of a zero-intensity return
    #[must_use]
    pub fn new(general_rate: f32, limit: f32, drop_at_zero: f32) -> Self {
        let limit = limit.max(0.0);
        let drop_at_zero = drop_at_zero.clamp(0.0, 1.0);
        let alpha = if limit < f32::EPSILON {
            0.0
        } else {
            drop_at_zero / limit
        };
        DropoffModel {
            alpha,
            beta: 1.0 - drop_at_zero,
            limit,
            general_rate: general_rate.clamp(0.0, 1.0),
        }
    }

    /// Intensity threshold for unconditional retention.
    pub fn limit(&self) -> f32 {
        self.limit
    }

    /// Survival probability of a return with `intensity`.
    pub fn keep_probability(&self, intensity: f32) -> f32 {
        if intensity >= self.limit {
            1.0
        } else {
            (self.alpha * intensity + self.beta).clamp(0.0, 1.0)
        }
    }

    /// Retention test. Draws from `rng` only below the limit.
    pub fn should_keep<R: Rng + ?Sized>(&self, intensity: f32, rng: &mut R) -> bool {
        if intensity >= self.limit {
            return true;
        }
        rng.random::<f32>() < self.alpha * intensity + self.beta
    }

    /// General dropout applied before a ray is cast.
    ///
    /// Returns `true` when the ray should be cast. No draw is made when the
    /// general rate is effectively zero.
    pub fn keep_ray<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        if self.general_rate <= f32::EPSILON {
            return true;
        }
        rng.random::<f32>() >= self.general_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_keep_probability_monotone() {
        let model = DropoffModel::new(0.0, 0.8, 0.4);
        let mut previous = 0.0;
        for step in 0..=100 {
            let p = model.keep_probability(step as f32 / 100.0);
            assert!(p >= previous);
            previous = p;
        }
        assert!((model.keep_probability(0.0) - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_always_keep_at_or_above_limit() {
        let model = DropoffModel::new(0.0, 0.8, 1.0);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        assert!((0..1000).all(|_| model.should_keep(0.8, &mut rng)));
        assert!((0..1000).all(|_| model.should_keep(0.95, &mut rng)));
    }

    #[test]
    fn test_zero_limit_keeps_everything() {
        let model = DropoffModel::new(0.0, 0.0, 0.4);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        assert!((0..1000).all(|_| model.should_keep(0.0, &mut rng)));
    }

    #[test]
    fn test_general_dropout_rate() {
        let model = DropoffModel::new(0.45, 0.8, 0.4);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let cast = (0..10_000).filter(|_| model.keep_ray(&mut rng)).count();
        assert!((5_200..5_800).contains(&cast), "cast {cast}");

        let disabled = DropoffModel::new(0.0, 0.8, 0.4);
        assert!((0..1000).all(|_| disabled.keep_ray(&mut rng)));
    }
}
