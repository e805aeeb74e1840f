//! Precipitation and fog interaction with individual rays
//!
//! Falling snow can return a lidar pulse before it reaches any surface. The
//! probability of such an air-particle hit along the ray follows a two-lobe
//! Gaussian profile over distance from the sensor, scaled by precipitation.

use crate::core_types::vec3::Vec3;
use crate::core_types::weather::WeatherParameters;
use rand::Rng;

/// Centre and width (meters) of the near lobe of the air-hit profile
const NEAR_LOBE: (f32, f32) = (20.0, 8.0);
/// Centre and width (meters) of the far lobe of the air-hit profile
const FAR_LOBE: (f32, f32) = (38.0, 18.0);

/// Fraction of the ray skipped before an air hit can occur
const NEAR_CLIP_FRACTION: f32 = 0.01;

/// Extra air-hit probability at full fog density (fog-corrected profile)
const FOG_HIT_BONUS: f32 = 0.05;

/// Precipitation drop probability per unit of precipitation
const PRECIPITATION_DROP_RATE: f32 = 0.003;

/// Range drop-off slope per unit of precipitation
const RANGE_DROP_SLOPE: f32 = 2.08;
/// Cap on the range drop-off slope
const RANGE_DROP_MAX_RATE: f32 = 0.55;
/// Range lost per unit of fog density
const FOG_RANGE_LOSS: f32 = 0.0025;

/// Shape of the air-particle hit probability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleProfile {
    /// Precipitation-only profile
    Precipitation,
    /// Precipitation profile plus a flat fog term
    FogCorrected,
}

/// Peak probability of an air hit for a given precipitation level.
fn profile_peak(precipitation: f32) -> f32 {
    60.0 / (2000.0 - precipitation * 18.4)
}

fn gaussian_lobe(distance: f32, (centre, width): (f32, f32)) -> f32 {
    let x = (distance - centre) / width;
    (-x * x).exp()
}

/// Probability that a ray interacts with an air particle at `distance` meters.
pub fn air_hit_probability(
    distance: f32,
    weather: &WeatherParameters,
    profile: ParticleProfile,
) -> f32 {
    let peak = profile_peak(weather.precipitation());
    let mut probability =
        peak * gaussian_lobe(distance, NEAR_LOBE) + peak * gaussian_lobe(distance, FAR_LOBE);
    if profile == ParticleProfile::FogCorrected {
        probability += FOG_HIT_BONUS * weather.fog_density() / 100.0;
    }
    probability.clamp(0.0, 1.0)
}

/// Try to move a ray's return onto an air particle in front of the target.
///
/// Picks a uniform position between a point just ahead of the sensor and the
/// surface hit (or the ray end when nothing was hit), then accepts it with
/// [`air_hit_probability`]. Always consumes exactly two uniform draws.
///
/// # Arguments
/// * `origin` - Ray origin in world space
/// * `end` - Ray end point at maximum range
/// * `hit` - Surface hit point, if the ray hit anything
/// * `weather` - Sanitized weather snapshot
/// * `profile` - Which air-hit profile to evaluate
/// * `rng` - Channel random stream
///
/// # Returns
/// The air-particle point, or `None` if the ray passes through.
pub fn perturb_hit_point<R: Rng + ?Sized>(
    origin: &Vec3,
    end: &Vec3,
    hit: Option<&Vec3>,
    weather: &WeatherParameters,
    profile: ParticleProfile,
    rng: &mut R,
) -> Option<Vec3> {
    let start = origin + NEAR_CLIP_FRACTION * (end - origin);
    let target = hit.unwrap_or(end);

    let along: f32 = rng.random();
    let accept: f32 = rng.random();

    let point = start + along * (target - start);
    let distance = (point - origin).norm();

    (accept < air_hit_probability(distance, weather, profile)).then_some(point)
}

/// Random drop of a return caused by precipitation.
///
/// Drop probability is `0.003 * precipitation` (30 % at full precipitation).
/// Returns `true` when the return survives.
pub fn keep_after_precipitation_drop<R: Rng + ?Sized>(precipitation: f32, rng: &mut R) -> bool {
    let drop_probability = PRECIPITATION_DROP_RATE * precipitation.clamp(0.0, 100.0);
    rng.random::<f32>() >= drop_probability
}

/// Effective sensor range after precipitation and fog losses.
///
/// # Arguments
/// * `base_range` - Nominal range (meters)
/// * `precipitation` - Precipitation in `[0, 100]`
/// * `fog_density` - Fog density in `[0, 100]`
///
/// # Returns
/// Reduced range, never below `f32::EPSILON`.
pub fn apply_range_dropoff(base_range: f32, precipitation: f32, fog_density: f32) -> f32 {
    let p = precipitation.clamp(0.0, 100.0);
    let fog = fog_density.clamp(0.0, 100.0);

    let rate = (p * RANGE_DROP_SLOPE / 100.0).min(RANGE_DROP_MAX_RATE);
    let factor = (100.0 - p * rate) / 100.0;
    let range = (base_range - fog * FOG_RANGE_LOSS * base_range) * factor;
    range.max(f32::EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn snowing(precipitation: f32, fog: f32) -> WeatherParameters {
        let mut weather = WeatherParameters::default();
        weather
            .set_temperature(-10.0)
            .set_precipitation(precipitation)
            .set_fog_density(fog);
        weather
    }

    #[test]
    fn test_range_dropoff_endpoints() {
        assert_relative_eq!(apply_range_dropoff(100.0, 0.0, 0.0), 100.0);
        // Full precipitation caps the rate at 0.55
        assert_relative_eq!(apply_range_dropoff(100.0, 100.0, 0.0), 45.0, epsilon = 1e-4);
        assert_relative_eq!(apply_range_dropoff(100.0, 0.0, 100.0), 75.0, epsilon = 1e-4);
        assert_relative_eq!(
            apply_range_dropoff(100.0, 100.0, 100.0),
            33.75,
            epsilon = 1e-4
        );
    }

    #[test]
    fn test_range_dropoff_never_zero() {
        assert!(apply_range_dropoff(0.0, 100.0, 100.0) >= f32::EPSILON);
        assert!(apply_range_dropoff(-5.0, 0.0, 0.0) >= f32::EPSILON);
    }

    #[test]
    fn test_no_precipitation_never_drops() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert!((0..1000).all(|_| keep_after_precipitation_drop(0.0, &mut rng)));
    }

    #[test]
    fn test_full_precipitation_drops_about_thirty_percent() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let kept = (0..10_000)
            .filter(|_| keep_after_precipitation_drop(100.0, &mut rng))
            .count();
        assert!((6_700..7_300).contains(&kept), "kept {kept}");
    }

    #[test]
    fn test_air_hit_profile_peaks_near_twenty_meters() {
        let weather = snowing(100.0, 0.0);
        let near = air_hit_probability(20.0, &weather, ParticleProfile::Precipitation);
        let far = air_hit_probability(90.0, &weather, ParticleProfile::Precipitation);
        assert!(near > far);
        assert!(near <= 1.0);
    }

    #[test]
    fn test_fog_correction_raises_probability() {
        let weather = snowing(50.0, 100.0);
        let plain = air_hit_probability(80.0, &weather, ParticleProfile::Precipitation);
        let fog = air_hit_probability(80.0, &weather, ParticleProfile::FogCorrected);
        assert_relative_eq!(fog - plain, 0.05, epsilon = 1e-5);
    }

    #[test]
    fn test_perturbed_point_lies_on_ray() {
        let weather = snowing(100.0, 100.0);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let origin = Vec3::zeros();
        let end = Vec3::new(100.0, 0.0, 0.0);
        let hit = Vec3::new(40.0, 0.0, 0.0);

        let mut accepted = 0;
        for _ in 0..500 {
            if let Some(p) = perturb_hit_point(
                &origin,
                &end,
                Some(&hit),
                &weather,
                ParticleProfile::FogCorrected,
                &mut rng,
            ) {
                accepted += 1;
                assert!((1.0..=40.0).contains(&p.x));
                assert_relative_eq!(p.y, 0.0);
            }
        }
        assert!(accepted > 0);
    }
}
