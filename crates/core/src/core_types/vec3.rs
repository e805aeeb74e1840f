//! Vector and pose aliases for sensor geometry.

use nalgebra::{Isometry3, Vector3};

/// 3D vector type for positions, velocities, and directions.
///
/// This is a simple alias for `nalgebra::Vector3<f32>`, used throughout
/// the sensor pipeline for world hit points, ray directions and
/// sensor-local detection points. Distances are in meters.
pub type Vec3 = Vector3<f32>;

/// Rigid transform of a sensor body in the world frame.
///
/// X points forward, Y left and Z up.
pub type Pose = Isometry3<f32>;
