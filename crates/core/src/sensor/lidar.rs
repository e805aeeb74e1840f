//! Lidar variants
//!
//! | variant | payload | air-hit stage | intensity | noise | retention |
//! |---|---|---|---|---|---|
//! | [`SemanticLidar`] | cosine, object id, tag | when snowing | none | none | always kept |
//! | [`WeatherLidar`] | intensity | when snowing | atmospheric extinction | temperature driven | drop-off model |
//! | [`MaterialLidar`] | intensity | always, fog corrected | material table | fixed stddev | drop-off model |

use super::config::LidarDescription;
use super::scannable::{
    apply_range_noise, AirHitPolicy, ChannelRng, ScanContext, Scannable, Shot, ShotKind,
};
use crate::attenuation::{
    compute_intensity_with_base, material_intensity, weather_noise_stddev, DropoffModel,
    ParticleProfile, AIR_HIT_INTENSITY,
};
use crate::core_types::detection::{LidarDetection, SemanticLidarDetection};
use crate::core_types::vec3::Vec3;

/// Semantic tag reported for returns off precipitation particles
pub const AIR_PARTICLE_TAG: u32 = 23;

/// Ground-truth lidar: reports what each ray hit, without intensity or noise
#[derive(Debug, Clone)]
pub struct SemanticLidar {
    description: LidarDescription,
}

impl SemanticLidar {
    #[must_use]
    pub fn new(description: LidarDescription) -> Self {
        SemanticLidar { description }
    }
}

impl Scannable for SemanticLidar {
    type Detection = SemanticLidarDetection;

    fn description(&self) -> &LidarDescription {
        &self.description
    }

    fn air_hit_policy(&self) -> AirHitPolicy {
        AirHitPolicy::WhenSnowing
    }

    fn compute_detection(&self, shot: &Shot, ctx: &ScanContext<'_>) -> SemanticLidarDetection {
        let point = ctx.to_sensor_frame(&shot.point);
        match shot.kind {
            ShotKind::Surface(hit) => SemanticLidarDetection {
                point: point.into(),
                cos_inc_angle: (-shot.direction).dot(&hit.normal),
                object_idx: hit.object_idx(),
                object_tag: hit.object_tag,
            },
            // A particle faces the ray head-on
            ShotKind::Air => SemanticLidarDetection {
                point: point.into(),
                cos_inc_angle: 1.0,
                object_idx: 0,
                object_tag: AIR_PARTICLE_TAG,
            },
        }
    }
}

/// Lidar whose intensity follows atmospheric extinction under the current weather
#[derive(Debug, Clone)]
pub struct WeatherLidar {
    description: LidarDescription,
    dropoff: DropoffModel,
}

impl WeatherLidar {
    #[must_use]
    pub fn new(description: LidarDescription) -> Self {
        let dropoff = description.dropoff_model();
        WeatherLidar {
            description,
            dropoff,
        }
    }
}

impl Scannable for WeatherLidar {
    type Detection = LidarDetection;

    fn description(&self) -> &LidarDescription {
        &self.description
    }

    fn preprocess_ray(&self, rng: &mut ChannelRng) -> bool {
        self.dropoff.keep_ray(rng)
    }

    fn air_hit_policy(&self) -> AirHitPolicy {
        AirHitPolicy::WhenSnowing
    }

    fn compute_detection(&self, shot: &Shot, ctx: &ScanContext<'_>) -> LidarDetection {
        let intensity = if shot.is_air() {
            AIR_HIT_INTENSITY
        } else {
            compute_intensity_with_base(
                shot.distance,
                ctx.weather,
                self.description.atmosphere_attenuation_rate,
            )
        };
        LidarDetection::new(ctx.to_sensor_frame(&shot.point), intensity)
    }

    fn postprocess(
        &self,
        detection: &mut LidarDetection,
        ctx: &ScanContext<'_>,
        rng: &mut ChannelRng,
    ) -> bool {
        let mut point = Vec3::from(detection.point);
        apply_range_noise(&mut point, weather_noise_stddev(ctx.weather.temperature()), rng);
        detection.set_point(point);
        self.dropoff.should_keep(detection.intensity, rng)
    }
}

/// Lidar whose intensity comes from the reflectivity of the hit material
#[derive(Debug, Clone)]
pub struct MaterialLidar {
    description: LidarDescription,
    dropoff: DropoffModel,
}

impl MaterialLidar {
    #[must_use]
    pub fn new(description: LidarDescription) -> Self {
        let dropoff = description.dropoff_model();
        MaterialLidar {
            description,
            dropoff,
        }
    }
}

impl Scannable for MaterialLidar {
    type Detection = LidarDetection;

    fn description(&self) -> &LidarDescription {
        &self.description
    }

    fn preprocess_ray(&self, rng: &mut ChannelRng) -> bool {
        self.dropoff.keep_ray(rng)
    }

    fn air_hit_policy(&self) -> AirHitPolicy {
        AirHitPolicy::Always
    }

    fn particle_profile(&self) -> ParticleProfile {
        ParticleProfile::FogCorrected
    }

    fn compute_detection(&self, shot: &Shot, ctx: &ScanContext<'_>) -> LidarDetection {
        let intensity = match shot.kind {
            ShotKind::Surface(hit) => material_intensity(hit.object_tag),
            ShotKind::Air => AIR_HIT_INTENSITY,
        };
        LidarDetection::new(ctx.to_sensor_frame(&shot.point), intensity)
    }

    fn postprocess(
        &self,
        detection: &mut LidarDetection,
        _ctx: &ScanContext<'_>,
        rng: &mut ChannelRng,
    ) -> bool {
        let mut point = Vec3::from(detection.point);
        apply_range_noise(&mut point, self.description.noise_stddev, rng);
        detection.set_point(point);
        self.dropoff.should_keep(detection.intensity, rng)
    }
}
