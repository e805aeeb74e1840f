//! Per-sample hooks shared by every lidar variant
//!
//! A [`ChannelScanner`](super::ChannelScanner) drives the sample loop and calls
//! into a [`Scannable`] for each step: ray dropout, casting (including the
//! weather perturbation), detection construction and the final noise plus
//! retention pass.

use super::config::LidarDescription;
use crate::attenuation::{keep_after_precipitation_drop, perturb_hit_point, ParticleProfile};
use crate::core_types::detection::DetectionRecord;
use crate::core_types::vec3::{Pose, Vec3};
use crate::core_types::weather::WeatherParameters;
use crate::scene::{HitInfo, RayCaster};
use nalgebra::Point3;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// Random stream owned by one channel
pub type ChannelRng = ChaCha8Rng;

/// Read-only inputs shared by every channel during one tick
#[derive(Clone, Copy)]
pub struct ScanContext<'a> {
    pub ray_caster: &'a dyn RayCaster,
    /// Sanitized weather snapshot
    pub weather: &'a WeatherParameters,
    /// Sensor pose in the world frame
    pub pose: &'a Pose,
    /// Maximum ray length (meters)
    pub range: f32,
}

impl ScanContext<'_> {
    /// World-frame unit direction for a laser at the given angles (degrees).
    pub fn ray_direction(&self, vertical_deg: f32, horizontal_deg: f32) -> Vec3 {
        let (sin_v, cos_v) = vertical_deg.to_radians().sin_cos();
        let (sin_h, cos_h) = horizontal_deg.to_radians().sin_cos();
        self.pose.rotation * Vec3::new(cos_v * cos_h, cos_v * sin_h, sin_v)
    }

    pub fn origin(&self) -> Vec3 {
        self.pose.translation.vector
    }

    /// Transform a world-frame point into the sensor frame.
    pub fn to_sensor_frame(&self, world: &Vec3) -> Vec3 {
        self.pose
            .inverse_transform_point(&Point3::from(*world))
            .coords
    }
}

/// When a sensor runs the air-particle and precipitation-drop stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AirHitPolicy {
    /// Only in below-freezing precipitation
    WhenSnowing,
    /// Every ray
    Always,
}

impl AirHitPolicy {
    pub fn is_active(self, weather: &WeatherParameters) -> bool {
        match self {
            AirHitPolicy::WhenSnowing => weather.is_snowing(),
            AirHitPolicy::Always => true,
        }
    }
}

/// What a ray returned from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShotKind {
    Surface(HitInfo),
    /// Precipitation or fog particle in front of any surface
    Air,
}

/// Accepted ray return, in world coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    pub point: Vec3,
    /// Unit ray direction
    pub direction: Vec3,
    /// Distance from the sensor origin (meters)
    pub distance: f32,
    pub kind: ShotKind,
}

impl Shot {
    pub fn is_air(&self) -> bool {
        matches!(self.kind, ShotKind::Air)
    }
}

/// Sensor-specific behavior plugged into the channel sample loop.
pub trait Scannable: Send + Sync {
    type Detection: DetectionRecord;

    fn description(&self) -> &LidarDescription;

    /// Vertical angle of each laser (degrees).
    fn create_lasers(&self) -> Vec<f32> {
        self.description().laser_angles()
    }

    /// `false` drops the sample before casting.
    fn preprocess_ray(&self, _rng: &mut ChannelRng) -> bool {
        true
    }

    fn air_hit_policy(&self) -> AirHitPolicy;

    fn particle_profile(&self) -> ParticleProfile {
        ParticleProfile::Precipitation
    }

    /// Cast one laser and apply the weather stages.
    fn shoot_laser(
        &self,
        ctx: &ScanContext<'_>,
        vertical_deg: f32,
        horizontal_deg: f32,
        rng: &mut ChannelRng,
    ) -> Option<Shot> {
        shoot_through_weather(
            ctx,
            vertical_deg,
            horizontal_deg,
            self.air_hit_policy(),
            self.particle_profile(),
            rng,
        )
    }

    fn compute_detection(&self, shot: &Shot, ctx: &ScanContext<'_>) -> Self::Detection;

    /// Final in-place adjustment. `false` discards the detection.
    fn postprocess(
        &self,
        _detection: &mut Self::Detection,
        _ctx: &ScanContext<'_>,
        _rng: &mut ChannelRng,
    ) -> bool {
        true
    }
}

/// Cast a ray and, when `policy` is active, run the air-particle
/// perturbation followed by the precipitation drop test.
///
/// A surface hit may be replaced by an air hit in front of it. A miss can
/// still produce an air hit. Either way the precipitation drop decides
/// whether the sample survives.
pub fn shoot_through_weather(
    ctx: &ScanContext<'_>,
    vertical_deg: f32,
    horizontal_deg: f32,
    policy: AirHitPolicy,
    profile: ParticleProfile,
    rng: &mut ChannelRng,
) -> Option<Shot> {
    let origin = ctx.origin();
    let direction = ctx.ray_direction(vertical_deg, horizontal_deg);
    let hit = ctx.ray_caster.cast(&origin, &direction, ctx.range);

    let surface_shot = |hit: HitInfo| Shot {
        point: hit.point,
        direction,
        distance: hit.distance,
        kind: ShotKind::Surface(hit),
    };
    let air_shot = |point: Vec3| Shot {
        point,
        direction,
        distance: (point - origin).norm(),
        kind: ShotKind::Air,
    };

    if !policy.is_active(ctx.weather) {
        return hit.map(surface_shot);
    }

    let end = origin + direction * ctx.range;
    let precipitation = ctx.weather.precipitation();
    match hit {
        Some(hit) => {
            let shot = match perturb_hit_point(
                &origin,
                &end,
                Some(&hit.point),
                ctx.weather,
                profile,
                rng,
            ) {
                Some(point) => air_shot(point),
                None => surface_shot(hit),
            };
            keep_after_precipitation_drop(precipitation, rng).then_some(shot)
        }
        None => {
            let point = perturb_hit_point(&origin, &end, None, ctx.weather, profile, rng)?;
            keep_after_precipitation_drop(precipitation, rng).then(|| air_shot(point))
        }
    }
}

/// Gaussian offset along the ray direction of a sensor-frame point.
///
/// Draws nothing when `stddev` is not positive.
pub fn apply_range_noise(point: &mut Vec3, stddev: f32, rng: &mut ChannelRng) {
    if stddev.is_nan() || stddev <= 0.0 {
        return;
    }
    let Some(unit) = point.try_normalize(f32::EPSILON) else {
        return;
    };
    if let Ok(normal) = Normal::new(0.0_f32, stddev) {
        *point += unit * normal.sample(rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::WeatherPreset;
    use crate::scene::{Shape, StaticScene};
    use approx::assert_relative_eq;
    use rand::SeedableRng;

    fn wall_scene() -> StaticScene {
        StaticScene::new().with_shape(
            Shape::Plane {
                point: Vec3::new(30.0, 0.0, 0.0),
                normal: -Vec3::x(),
            },
            7,
        )
    }

    #[test]
    fn test_ray_direction_axes() {
        let scene = wall_scene();
        let weather = WeatherParameters::default();
        let pose = Pose::identity();
        let ctx = ScanContext {
            ray_caster: &scene,
            weather: &weather,
            pose: &pose,
            range: 100.0,
        };
        let forward = ctx.ray_direction(0.0, 0.0);
        assert_relative_eq!(forward, Vec3::x(), epsilon = 1e-6);
        let left = ctx.ray_direction(0.0, 90.0);
        assert_relative_eq!(left, Vec3::y(), epsilon = 1e-6);
        let up = ctx.ray_direction(90.0, 0.0);
        assert_relative_eq!(up, Vec3::z(), epsilon = 1e-6);
    }

    #[test]
    fn test_clear_weather_passes_hits_through() {
        let scene = wall_scene();
        let weather = WeatherPreset::ClearNoon.parameters().sanitized();
        let pose = Pose::identity();
        let ctx = ScanContext {
            ray_caster: &scene,
            weather: &weather,
            pose: &pose,
            range: 100.0,
        };
        let mut rng = ChannelRng::seed_from_u64(1);
        let shot = shoot_through_weather(
            &ctx,
            0.0,
            0.0,
            AirHitPolicy::WhenSnowing,
            ParticleProfile::Precipitation,
            &mut rng,
        )
        .unwrap();
        assert!(!shot.is_air());
        assert_relative_eq!(shot.distance, 30.0, epsilon = 1e-4);

        let miss = shoot_through_weather(
            &ctx,
            0.0,
            180.0,
            AirHitPolicy::WhenSnowing,
            ParticleProfile::Precipitation,
            &mut rng,
        );
        assert!(miss.is_none());
    }

    #[test]
    fn test_snow_produces_air_hits_on_open_rays() {
        let scene = StaticScene::new();
        let weather = WeatherPreset::HardSnowNoon.parameters().sanitized();
        let pose = Pose::identity();
        let ctx = ScanContext {
            ray_caster: &scene,
            weather: &weather,
            pose: &pose,
            range: 100.0,
        };
        let mut rng = ChannelRng::seed_from_u64(9);
        let air = (0..2000)
            .filter_map(|_| {
                shoot_through_weather(
                    &ctx,
                    0.0,
                    0.0,
                    AirHitPolicy::WhenSnowing,
                    ParticleProfile::Precipitation,
                    &mut rng,
                )
            })
            .inspect(|shot| assert!(shot.is_air()))
            .count();
        assert!(air > 0);
    }

    #[test]
    fn test_range_noise_moves_along_ray() {
        let mut rng = ChannelRng::seed_from_u64(2);
        let mut point = Vec3::new(10.0, 0.0, 0.0);
        apply_range_noise(&mut point, 0.5, &mut rng);
        assert_relative_eq!(point.y, 0.0);
        assert_relative_eq!(point.z, 0.0);

        let mut untouched = Vec3::new(10.0, 0.0, 0.0);
        apply_range_noise(&mut untouched, 0.0, &mut rng);
        assert_eq!(untouched, Vec3::new(10.0, 0.0, 0.0));
    }
}
