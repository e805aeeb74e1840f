//! Shared fixtures for integration tests
#![allow(dead_code)]

use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use wintersim_core::scene::{Shape, StaticScene};
use wintersim_core::{Collaborators, Vec3, WeatherParameters};

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Sensor at the centre of a closed sphere, so every ray hits at `radius`.
pub fn enclosed_scene(radius: f32) -> StaticScene {
    StaticScene::new().with_shape(
        Shape::Sphere {
            center: Vec3::zeros(),
            radius,
        },
        4,
    )
}

pub fn collaborators(scene: StaticScene, weather: WeatherParameters) -> Collaborators {
    Collaborators::builder()
        .ray_caster(Arc::new(scene))
        .weather_provider(Arc::new(weather))
        .build()
        .expect("both collaborators provided")
}
