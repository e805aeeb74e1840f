//! Sensor descriptions
//!
//! Plain serde records describing sensor geometry and noise. Defaults match a
//! common 32-channel spinning lidar and a narrow forward radar.

use crate::attenuation::{DropoffModel, DEFAULT_ATMOSPHERIC_ATTENUATION};
use serde::{Deserialize, Serialize};

/// Upper bound on samples a single channel or radar takes in one tick
pub const MAX_SAMPLES_PER_TICK: usize = 1 << 20;

/// Spinning lidar geometry and retention parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LidarDescription {
    /// Number of lasers stacked vertically
    pub channels: u32,
    /// Maximum range (meters)
    pub range: f32,
    /// Samples per second across all channels
    pub points_per_second: u32,
    /// Rotations per second
    pub rotation_frequency: f32,
    /// Angle of the top laser (degrees)
    pub upper_fov: f32,
    /// Angle of the bottom laser (degrees)
    pub lower_fov: f32,
    /// Horizontal field of view swept per rotation (degrees)
    pub horizontal_fov: f32,
    /// Clear-air extinction rate (1/m)
    pub atmosphere_attenuation_rate: f32,
    /// Fraction of rays discarded before casting
    pub dropoff_general_rate: f32,
    /// Intensity at and above which returns are never dropped
    pub dropoff_intensity_limit: f32,
    /// Drop probability of a zero-intensity return
    pub dropoff_zero_intensity: f32,
    /// Positional noise along the ray (meters, standard deviation)
    pub noise_stddev: f32,
    /// Seed for every channel's random stream
    pub random_seed: u64,
}

impl Default for LidarDescription {
    fn default() -> Self {
        LidarDescription {
            channels: 32,
            range: 100.0,
            points_per_second: 56_000,
            rotation_frequency: 10.0,
            upper_fov: 10.0,
            lower_fov: -30.0,
            horizontal_fov: 360.0,
            atmosphere_attenuation_rate: DEFAULT_ATMOSPHERIC_ATTENUATION,
            dropoff_general_rate: 0.45,
            dropoff_intensity_limit: 0.8,
            dropoff_zero_intensity: 0.4,
            noise_stddev: 0.0,
            random_seed: 0,
        }
    }
}

impl LidarDescription {
    /// Retention model built from the drop-off fields.
    pub fn dropoff_model(&self) -> DropoffModel {
        DropoffModel::new(
            self.dropoff_general_rate,
            self.dropoff_intensity_limit,
            self.dropoff_zero_intensity,
        )
    }

    /// Vertical angle of every laser, top to bottom (degrees).
    ///
    /// A single channel points at `upper_fov`.
    pub fn laser_angles(&self) -> Vec<f32> {
        let channels = self.channels;
        if channels == 0 {
            return Vec::new();
        }
        let delta = if channels > 1 {
            (self.upper_fov - self.lower_fov) / u32_to_f32(channels - 1)
        } else {
            0.0
        };
        (0..channels)
            .map(|i| self.upper_fov - u32_to_f32(i) * delta)
            .collect()
    }

    /// Samples each channel takes in a tick of `delta_seconds`.
    ///
    /// Zero for non-finite or non-positive ticks, capped at
    /// [`MAX_SAMPLES_PER_TICK`].
    pub fn points_per_channel(&self, delta_seconds: f32) -> usize {
        if self.channels == 0 || !delta_seconds.is_finite() || delta_seconds <= 0.0 {
            return 0;
        }
        let points =
            (u32_to_f32(self.points_per_second) * delta_seconds / u32_to_f32(self.channels)).round();
        f32_to_usize(points).min(MAX_SAMPLES_PER_TICK)
    }
}

/// Forward radar frustum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarDescription {
    /// Horizontal field of view (degrees)
    pub horizontal_fov: f32,
    /// Vertical field of view (degrees)
    pub vertical_fov: f32,
    /// Maximum range before weather losses (meters)
    pub range: f32,
    /// Rays cast per second
    pub points_per_second: u32,
    /// Seed for the radar's random stream
    pub random_seed: u64,
}

impl Default for RadarDescription {
    fn default() -> Self {
        RadarDescription {
            horizontal_fov: 30.0,
            vertical_fov: 30.0,
            range: 100.0,
            points_per_second: 1500,
            random_seed: 0,
        }
    }
}

impl RadarDescription {
    /// Rays cast in a tick of `delta_seconds`, with the same limits as
    /// [`LidarDescription::points_per_channel`].
    pub fn points_per_tick(&self, delta_seconds: f32) -> usize {
        if !delta_seconds.is_finite() || delta_seconds <= 0.0 {
            return 0;
        }
        f32_to_usize((u32_to_f32(self.points_per_second) * delta_seconds).round())
            .min(MAX_SAMPLES_PER_TICK)
    }
}

#[expect(clippy::cast_precision_loss)]
pub(crate) fn u32_to_f32(value: u32) -> f32 {
    value as f32
}

#[expect(clippy::cast_precision_loss)]
pub(crate) fn usize_to_f32(value: usize) -> f32 {
    value as f32
}

/// Saturating conversion of a non-negative rounded float.
#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn f32_to_usize(value: f32) -> usize {
    if value.is_nan() || value <= 0.0 {
        0
    } else {
        value as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_laser_angles_span_fov() {
        let desc = LidarDescription {
            channels: 5,
            upper_fov: 10.0,
            lower_fov: -30.0,
            ..LidarDescription::default()
        };
        let angles = desc.laser_angles();
        assert_eq!(angles.len(), 5);
        assert_relative_eq!(angles[0], 10.0);
        assert_relative_eq!(angles[2], -10.0);
        assert_relative_eq!(angles[4], -30.0);
    }

    #[test]
    fn test_single_channel_points_up_fov() {
        let desc = LidarDescription {
            channels: 1,
            ..LidarDescription::default()
        };
        assert_eq!(desc.laser_angles(), vec![10.0]);
    }

    #[test]
    fn test_points_per_channel_rounds() {
        let desc = LidarDescription::default();
        // 56000 * 0.05 / 32 = 87.5
        assert_eq!(desc.points_per_channel(0.05), 88);
        assert_eq!(desc.points_per_channel(0.0), 0);
        assert_eq!(desc.points_per_channel(-1.0), 0);
        assert_eq!(desc.points_per_channel(f32::NAN), 0);
    }

    #[test]
    fn test_radar_points_per_tick() {
        let desc = RadarDescription::default();
        assert_eq!(desc.points_per_tick(0.1), 150);
        assert_eq!(desc.points_per_tick(0.0), 0);
    }

    #[test]
    fn test_unbounded_ticks_are_rejected_or_capped() {
        let lidar = LidarDescription::default();
        assert_eq!(lidar.points_per_channel(f32::INFINITY), 0);
        assert_eq!(lidar.points_per_channel(f32::NEG_INFINITY), 0);
        assert_eq!(lidar.points_per_channel(1.0e30), MAX_SAMPLES_PER_TICK);

        let radar = RadarDescription::default();
        assert_eq!(radar.points_per_tick(f32::INFINITY), 0);
        assert_eq!(radar.points_per_tick(f32::NAN), 0);
        assert_eq!(radar.points_per_tick(1.0e30), MAX_SAMPLES_PER_TICK);
    }
}
