//! Weather attenuation model
//!
//! Pure functions mapping a weather snapshot and ray geometry to intensity,
//! air-particle hits, range loss and retention decisions. Randomized
//! operations take the caller's random stream so results stay reproducible
//! per channel.

pub mod dropoff;
pub mod intensity;
pub mod material;
pub mod particles;

pub use dropoff::DropoffModel;
pub use intensity::{
    classify_precipitation, compute_intensity, compute_intensity_with_base,
    extinction_coefficient, weather_noise_stddev, DEFAULT_ATMOSPHERIC_ATTENUATION,
};
pub use material::{material_intensity, AIR_HIT_INTENSITY};
pub use particles::{
    air_hit_probability, apply_range_dropoff, keep_after_precipitation_drop, perturb_hit_point,
    ParticleProfile,
};
