//! Weather-conditioned ranging sensor simulation
//!
//! Models how precipitation, fog, temperature and humidity perturb simulated
//! lidar and radar returns:
//!
//! - Per-ray stochastic air-particle hits in falling snow
//! - Atmospheric and material-based intensity attenuation
//! - Intensity-dependent retention of weak returns
//! - Precipitation and fog range loss for radar
//! - Parallel per-channel ray casting with reproducible random streams
//!
//! The scene, the weather source and the transport that ships finished point
//! clouds are supplied by the host through [`scene::RayCaster`],
//! [`scene::WeatherProvider`] and [`PointCloudBuffer::encode`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use wintersim_core::scene::StaticScene;
//! use wintersim_core::sensor::{LidarDescription, WeatherLidar};
//! use wintersim_core::{Collaborators, SensorTickOrchestrator, WeatherPreset};
//!
//! let collaborators = Collaborators::builder()
//!     .ray_caster(Arc::new(StaticScene::test_yard(-1.7)))
//!     .weather_provider(Arc::new(WeatherPreset::SoftSnowNoon.parameters()))
//!     .build()
//!     .unwrap();
//! let mut lidar =
//!     SensorTickOrchestrator::new(WeatherLidar::new(LidarDescription::default()), collaborators);
//!
//! let cloud = lidar.tick(0.05);
//! assert_eq!(cloud.channel_count(), 32);
//! ```

pub mod attenuation;
pub mod buffer;
pub mod core_types;
pub mod error;
pub mod orchestrator;
pub mod scene;
pub mod sensor;

pub use buffer::PointCloudBuffer;
pub use core_types::{
    DetectionRecord, LidarDetection, Pose, RadarDetection, SemanticLidarDetection, Vec3,
    WeatherField, WeatherParameters, WeatherPreset, WeatherSchema,
};
pub use error::{BufferDecodeError, SetupError, WeatherTupleError};
pub use orchestrator::{Collaborators, CollaboratorsBuilder, SensorTickOrchestrator, TickPhase};
