//! Scene and weather collaborators
//!
//! Sensors never own the world they scan. They query it through
//! [`RayCaster`], read conditions through [`WeatherProvider`], and hold a
//! [`SceneLock`] read guard for the whole parallel ray phase so the scene
//! cannot change under a tick.

pub mod static_scene;

pub use static_scene::{Shape, StaticScene};

use crate::core_types::vec3::Vec3;
use crate::core_types::weather::WeatherParameters;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Moving object that owns a hit surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorRef {
    /// Stable actor id, never 0
    pub id: u32,
    /// World-frame velocity (m/s)
    pub velocity: Vec3,
}

/// Result of a single scene ray query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitInfo {
    /// World-frame hit position
    pub point: Vec3,
    /// Unit surface normal at the hit, facing the ray origin
    pub normal: Vec3,
    /// Distance from the ray origin (meters)
    pub distance: f32,
    /// Semantic tag of the surface
    pub object_tag: u32,
    /// Owning actor, `None` for static geometry
    pub actor: Option<ActorRef>,
}

impl HitInfo {
    /// Actor id, or 0 for static geometry.
    pub fn object_idx(&self) -> u32 {
        self.actor.map_or(0, |actor| actor.id)
    }
}

/// Scene ray query.
///
/// Implementations must be safe to call concurrently from many channel
/// workers while the caller holds the scene read lock.
pub trait RayCaster: Send + Sync {
    /// First surface hit along `direction` (unit vector) within `max_range`.
    fn cast(&self, origin: &Vec3, direction: &Vec3, max_range: f32) -> Option<HitInfo>;
}

impl<T: RayCaster + ?Sized> RayCaster for Arc<T> {
    fn cast(&self, origin: &Vec3, direction: &Vec3, max_range: f32) -> Option<HitInfo> {
        (**self).cast(origin, direction, max_range)
    }
}

/// Source of the current weather snapshot.
pub trait WeatherProvider: Send + Sync {
    fn current_weather(&self) -> WeatherParameters;
}

impl<T: WeatherProvider + ?Sized> WeatherProvider for Arc<T> {
    fn current_weather(&self) -> WeatherParameters {
        (**self).current_weather()
    }
}

impl WeatherProvider for WeatherParameters {
    fn current_weather(&self) -> WeatherParameters {
        *self
    }
}

/// Weather slot shared between a controller and any number of sensors.
///
/// Updates replace the whole record; a sensor tick copies it once at the start.
#[derive(Debug, Clone, Default)]
pub struct SharedWeather {
    inner: Arc<RwLock<WeatherParameters>>,
}

impl SharedWeather {
    #[must_use]
    pub fn new(weather: WeatherParameters) -> Self {
        SharedWeather {
            inner: Arc::new(RwLock::new(weather)),
        }
    }

    /// Replace the current weather.
    pub fn apply(&self, weather: WeatherParameters) {
        let mut slot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *slot = weather;
    }
}

impl WeatherProvider for SharedWeather {
    fn current_weather(&self) -> WeatherParameters {
        *self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Reader/writer lock guarding the scene during ray casting.
///
/// The lock carries no data; the scene itself lives behind the [`RayCaster`].
/// Poisoning is ignored because the guarded state is external.
#[derive(Debug, Clone, Default)]
pub struct SceneLock {
    inner: Arc<RwLock<()>>,
}

impl SceneLock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared access for ray casting.
    pub fn read(&self) -> RwLockReadGuard<'_, ()> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Exclusive access for scene mutation between ticks.
    pub fn write(&self) -> RwLockWriteGuard<'_, ()> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::WeatherPreset;

    #[test]
    fn test_shared_weather_replaces_snapshot() {
        let shared = SharedWeather::new(WeatherPreset::ClearNoon.parameters());
        let sensor_view = shared.clone();

        shared.apply(WeatherPreset::HardSnowNoon.parameters());
        assert_eq!(
            sensor_view.current_weather(),
            WeatherPreset::HardSnowNoon.parameters()
        );
    }

    #[test]
    fn test_scene_lock_allows_concurrent_readers() {
        let lock = SceneLock::new();
        let a = lock.read();
        let b = lock.read();
        drop((a, b));
        let _w = lock.write();
    }

    #[test]
    fn test_object_idx() {
        let mut hit = HitInfo {
            point: Vec3::zeros(),
            normal: Vec3::z(),
            distance: 1.0,
            object_tag: 7,
            actor: None,
        };
        assert_eq!(hit.object_idx(), 0);
        hit.actor = Some(ActorRef {
            id: 42,
            velocity: Vec3::zeros(),
        });
        assert_eq!(hit.object_idx(), 42);
    }
}
