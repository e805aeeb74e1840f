//! Forward-looking radar
//!
//! Each tick casts a batch of random rays inside the radar frustum and reports
//! one detection per ray that lands on a moving actor. Precipitation and fog
//! shorten the usable range before rays are generated.

use super::config::RadarDescription;
use super::scannable::ChannelRng;
use crate::attenuation::apply_range_dropoff;
use crate::buffer::PointCloudBuffer;
use crate::core_types::detection::RadarDetection;
use crate::core_types::vec3::{Pose, Vec3};
use crate::orchestrator::{advance_phase, Collaborators, TickPhase};
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::f32::consts::TAU;
use tracing::{debug, debug_span, info, warn};

/// Widest frustum half-angle accepted before `tan` blows up (degrees)
const MAX_HALF_FOV: f32 = 89.0;

/// Single-channel radar sensor
pub struct Radar {
    description: RadarDescription,
    collaborators: Collaborators,
    pose: Pose,
    previous_position: Option<Vec3>,
    velocity: Vec3,
    rng: ChannelRng,
    rays: Vec<Vec3>,
    detections: Vec<RadarDetection>,
    buffer: PointCloudBuffer<RadarDetection>,
    effective_range: f32,
}

impl Radar {
    #[must_use]
    pub fn new(description: RadarDescription, collaborators: Collaborators) -> Self {
        info!(
            "Radar created: fov={:.0}°x{:.0}°, range={:.1}m, seed={}",
            description.horizontal_fov,
            description.vertical_fov,
            description.range,
            description.random_seed
        );
        Radar {
            rng: ChannelRng::seed_from_u64(description.random_seed),
            effective_range: description.range,
            description,
            collaborators,
            pose: Pose::identity(),
            previous_position: None,
            velocity: Vec3::zeros(),
            rays: Vec::new(),
            detections: Vec::new(),
            buffer: PointCloudBuffer::new(1),
        }
    }

    /// Move the radar. Ego velocity is derived from successive poses.
    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn description(&self) -> &RadarDescription {
        &self.description
    }

    /// Ego velocity estimated at the last tick (m/s, world frame).
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Range after weather losses at the last tick (meters).
    pub fn effective_range(&self) -> f32 {
        self.effective_range
    }

    pub fn buffer(&self) -> &PointCloudBuffer<RadarDetection> {
        &self.buffer
    }

    /// Cast one tick's worth of rays and return the detections.
    ///
    /// # Arguments
    ///
    /// * `delta_seconds` - Simulated time since the previous tick
    pub fn tick(&mut self, delta_seconds: f32) -> &PointCloudBuffer<RadarDetection> {
        let weather = self.collaborators.weather.current_weather().sanitized();

        // Ego motion from the pose history, tracked even when no rays are cast
        let position = self.pose.translation.vector;
        if delta_seconds.is_finite() && delta_seconds > 0.0 {
            self.velocity = self
                .previous_position
                .map_or_else(Vec3::zeros, |previous| (position - previous) / delta_seconds);
        }
        self.previous_position = Some(position);

        let points = self.description.points_per_tick(delta_seconds);
        if points == 0 {
            warn!("Radar tick skipped: no rays to cast (dt={})", delta_seconds);
            return &self.buffer;
        }

        let range = apply_range_dropoff(
            self.description.range,
            weather.precipitation(),
            weather.fog_density(),
        );
        self.effective_range = range;

        // Ray directions are drawn sequentially so the stream stays reproducible
        let half_h = (self.description.horizontal_fov / 2.0).clamp(0.0, MAX_HALF_FOV);
        let half_v = (self.description.vertical_fov / 2.0).clamp(0.0, MAX_HALF_FOV);
        let max_rx = half_h.to_radians().tan() * range;
        let max_ry = half_v.to_radians().tan() * range;
        let rng = &mut self.rng;
        self.rays.clear();
        self.rays.extend((0..points).map(|_| {
            let radius: f32 = rng.random();
            let angle: f32 = rng.random_range(0.0..TAU);
            let (sin_a, cos_a) = angle.sin_cos();
            Vec3::new(range, max_rx * radius * cos_a, max_ry * radius * sin_a).normalize()
        }));

        let tick_span = debug_span!("radar_tick", rays = points, phase = TickPhase::Idle.as_str());
        let _tick = tick_span.enter();
        let mut phase = TickPhase::Idle;

        advance_phase(&mut phase, &tick_span);
        {
            let _scene = self.collaborators.scene_lock.read();
            let ray_caster = self.collaborators.ray_caster.as_ref();
            let pose = &self.pose;
            let ego_velocity = self.velocity;

            self.detections.clear();
            self.detections
                .par_extend(self.rays.par_iter().filter_map(|local| {
                    let direction = pose.rotation * *local;
                    let hit = ray_caster.cast(&position, &direction, range)?;
                    let actor = hit.actor?;
                    Some(RadarDetection {
                        velocity: (actor.velocity - ego_velocity).dot(&direction),
                        azimuth: local.y.atan2(local.x),
                        altitude: local.z.atan2(local.xy().norm()),
                        depth: hit.distance,
                    })
                }));
        }

        advance_phase(&mut phase, &tick_span);
        self.buffer.reset(1);
        self.buffer.push_channel(&self.detections);
        advance_phase(&mut phase, &tick_span);

        debug!(
            "Radar tick: {} detections from {} rays, range={:.1}m",
            self.detections.len(),
            points,
            range
        );
        &self.buffer
    }
}
