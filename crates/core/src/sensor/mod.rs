//! Sensors: lidar variants, channel scanning and radar

pub mod channel;
pub mod config;
pub mod lidar;
pub mod radar;
pub mod scannable;

pub use channel::{ChannelScanner, ChannelStats, Sweep};
pub use config::{LidarDescription, RadarDescription, MAX_SAMPLES_PER_TICK};
pub use lidar::{MaterialLidar, SemanticLidar, WeatherLidar, AIR_PARTICLE_TAG};
pub use radar::Radar;
pub use scannable::{
    apply_range_noise, shoot_through_weather, AirHitPolicy, ChannelRng, ScanContext, Scannable,
    Shot, ShotKind,
};
