//! Per-sample detection records
//!
//! Records are plain `#[repr(C)]` structs so a point-cloud buffer can be
//! written to and read from bytes without per-field serialization.

use crate::core_types::vec3::Vec3;
use bytemuck::{Pod, Zeroable};
use std::fmt::Debug;

/// Common view over every detection payload.
pub trait DetectionRecord: Pod + Send + Sync + Debug + PartialEq {
    /// Sample position in the sensor frame (meters).
    fn point(&self) -> Vec3;
}

/// Lidar return: sensor-local point plus attenuated intensity
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct LidarDetection {
    pub point: [f32; 3],
    /// Return intensity in `[0, 1]`
    pub intensity: f32,
}

impl LidarDetection {
    #[must_use]
    pub fn new(point: Vec3, intensity: f32) -> Self {
        LidarDetection {
            point: point.into(),
            intensity,
        }
    }

    pub fn set_point(&mut self, point: Vec3) {
        self.point = point.into();
    }
}

impl DetectionRecord for LidarDetection {
    fn point(&self) -> Vec3 {
        Vec3::from(self.point)
    }
}

/// Semantic lidar return carrying surface orientation and object identity
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SemanticLidarDetection {
    pub point: [f32; 3],
    /// Cosine between the surface normal and the reversed ray direction
    pub cos_inc_angle: f32,
    /// Actor id of the hit object, 0 for static geometry
    pub object_idx: u32,
    /// Semantic tag of the hit surface
    pub object_tag: u32,
}

impl DetectionRecord for SemanticLidarDetection {
    fn point(&self) -> Vec3 {
        Vec3::from(self.point)
    }
}

/// Radar return in polar form relative to the sensor
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct RadarDetection {
    /// Closing velocity along the ray (m/s, positive away from the sensor)
    pub velocity: f32,
    /// Horizontal angle (radians)
    pub azimuth: f32,
    /// Vertical angle (radians)
    pub altitude: f32,
    /// Range to the hit (meters)
    pub depth: f32,
}

impl DetectionRecord for RadarDetection {
    fn point(&self) -> Vec3 {
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        let (sin_alt, cos_alt) = self.altitude.sin_cos();
        Vec3::new(
            self.depth * cos_alt * cos_az,
            self.depth * cos_alt * sin_az,
            self.depth * sin_alt,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_record_sizes() {
        assert_eq!(std::mem::size_of::<LidarDetection>(), 16);
        assert_eq!(std::mem::size_of::<SemanticLidarDetection>(), 24);
        assert_eq!(std::mem::size_of::<RadarDetection>(), 16);
    }

    #[test]
    fn test_radar_point_from_polar() {
        let det = RadarDetection {
            velocity: 0.0,
            azimuth: std::f32::consts::FRAC_PI_2,
            altitude: 0.0,
            depth: 10.0,
        };
        let p = det.point();
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(p.y, 10.0, epsilon = 1e-5);
        assert_relative_eq!(p.z, 0.0, epsilon = 1e-5);
    }
}
