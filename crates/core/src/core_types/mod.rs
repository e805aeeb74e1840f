//! Core types: weather records, presets, detections and geometry aliases

pub mod detection;
pub mod presets;
pub mod vec3;
pub mod weather;

pub use detection::{DetectionRecord, LidarDetection, RadarDetection, SemanticLidarDetection};
pub use presets::WeatherPreset;
pub use vec3::{Pose, Vec3};
pub use weather::{WeatherField, WeatherParameters, WeatherSchema, UNSET};
