//! Per-tick driver for multi-channel lidars
//!
//! One tick runs a fixed sequence:
//!
//! 1. Snapshot and sanitize the current weather
//! 2. Take the scene read lock
//! 3. Scan every channel in parallel (one rayon task per channel)
//! 4. Release the lock once every channel has joined
//! 5. Merge channel detections into the point-cloud buffer in channel order
//! 6. Advance the horizontal sweep
//!
//! A tick that would take no samples is logged and leaves the previous buffer
//! untouched.

use crate::buffer::PointCloudBuffer;
use crate::core_types::vec3::Pose;
use crate::error::SetupError;
use crate::scene::{RayCaster, SceneLock, WeatherProvider};
use crate::sensor::channel::{ChannelScanner, ChannelStats, Sweep};
use crate::sensor::config::usize_to_f32;
use crate::sensor::scannable::{ScanContext, Scannable};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, debug_span, info, warn, Span};

/// External services a sensor depends on
#[derive(Clone)]
pub struct Collaborators {
    pub ray_caster: Arc<dyn RayCaster>,
    pub weather: Arc<dyn WeatherProvider>,
    pub scene_lock: SceneLock,
}

impl Collaborators {
    #[must_use]
    pub fn builder() -> CollaboratorsBuilder {
        CollaboratorsBuilder::default()
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("scene_lock", &self.scene_lock)
            .finish_non_exhaustive()
    }
}

/// Assembles [`Collaborators`], failing if a required service is missing.
#[derive(Default)]
pub struct CollaboratorsBuilder {
    ray_caster: Option<Arc<dyn RayCaster>>,
    weather: Option<Arc<dyn WeatherProvider>>,
    scene_lock: Option<SceneLock>,
}

impl CollaboratorsBuilder {
    #[must_use]
    pub fn ray_caster<C: RayCaster + 'static>(mut self, ray_caster: Arc<C>) -> Self {
        self.ray_caster = Some(ray_caster);
        self
    }

    #[must_use]
    pub fn weather_provider<W: WeatherProvider + 'static>(mut self, weather: Arc<W>) -> Self {
        self.weather = Some(weather);
        self
    }

    /// Share a lock with the code that mutates the scene. A private lock is
    /// created when none is given.
    #[must_use]
    pub fn scene_lock(mut self, lock: SceneLock) -> Self {
        self.scene_lock = Some(lock);
        self
    }

    pub fn build(self) -> Result<Collaborators, SetupError> {
        Ok(Collaborators {
            ray_caster: self.ray_caster.ok_or(SetupError::MissingRayCaster)?,
            weather: self.weather.ok_or(SetupError::MissingWeatherProvider)?,
            scene_lock: self.scene_lock.unwrap_or_default(),
        })
    }
}

/// Stage of the tick state machine
///
/// A tick walks `Idle → Scanning → Merging → Idle`. The current stage is
/// recorded on the tick's tracing span as the `phase` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickPhase {
    Idle,
    /// Channels are casting rays under the scene read lock
    Scanning,
    /// Channel results are being concatenated into the buffer
    Merging,
}

impl TickPhase {
    /// Stage that follows this one.
    pub fn next(self) -> TickPhase {
        match self {
            TickPhase::Idle => TickPhase::Scanning,
            TickPhase::Scanning => TickPhase::Merging,
            TickPhase::Merging => TickPhase::Idle,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TickPhase::Idle => "idle",
            TickPhase::Scanning => "scanning",
            TickPhase::Merging => "merging",
        }
    }
}

/// Step `phase` forward and record it on `span`.
pub(crate) fn advance_phase(phase: &mut TickPhase, span: &Span) {
    *phase = phase.next();
    span.record("phase", phase.as_str());
}

/// Runs a [`Scannable`] sensor tick by tick
pub struct SensorTickOrchestrator<S: Scannable> {
    sensor: S,
    collaborators: Collaborators,
    pose: Pose,
    channels: Vec<ChannelScanner<S::Detection>>,
    buffer: PointCloudBuffer<S::Detection>,
    /// Sweep position in degrees, in `[0, horizontal_fov)`
    current_horizontal_angle: f32,
    last_stats: ChannelStats,
}

impl<S: Scannable> SensorTickOrchestrator<S> {
    /// Create the channel scanners and the output buffer for `sensor`.
    ///
    /// # Arguments
    ///
    /// * `sensor` - Lidar variant to drive
    /// * `collaborators` - Scene, weather and lock shared with the host
    pub fn new(sensor: S, collaborators: Collaborators) -> Self {
        let seed = sensor.description().random_seed;
        let channels: Vec<_> = sensor
            .create_lasers()
            .into_iter()
            .enumerate()
            .map(|(index, angle)| ChannelScanner::new(index, angle, seed))
            .collect();

        info!(
            "Sensor created: {} channels, range={:.1}m, seed={}",
            channels.len(),
            sensor.description().range,
            seed
        );

        let buffer = PointCloudBuffer::new(channels.len());
        SensorTickOrchestrator {
            sensor,
            collaborators,
            pose: Pose::identity(),
            channels,
            buffer,
            current_horizontal_angle: 0.0,
            last_stats: ChannelStats::default(),
        }
    }

    /// Move the sensor. Takes effect at the next tick.
    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    /// Output of the most recent tick that took samples.
    pub fn buffer(&self) -> &PointCloudBuffer<S::Detection> {
        &self.buffer
    }

    /// Sweep position in degrees.
    pub fn horizontal_angle(&self) -> f32 {
        self.current_horizontal_angle
    }

    /// Totals across channels for the last completed tick.
    pub fn last_stats(&self) -> ChannelStats {
        self.last_stats
    }

    /// Per-channel totals for the last completed tick.
    pub fn channel_stats(&self) -> impl Iterator<Item = ChannelStats> + '_ {
        self.channels.iter().map(ChannelScanner::stats)
    }

    /// Advance the sensor by `delta_seconds` and return the new point cloud.
    ///
    /// # Arguments
    ///
    /// * `delta_seconds` - Simulated time since the previous tick
    ///
    /// # Returns
    ///
    /// The sensor's buffer. Unchanged if the tick took no samples.
    pub fn tick(&mut self, delta_seconds: f32) -> &PointCloudBuffer<S::Detection> {
        // 1. Weather snapshot, fixed for the whole tick
        let weather = self.collaborators.weather.current_weather().sanitized();

        let description = self.sensor.description();
        let points = description.points_per_channel(delta_seconds);
        if self.channels.is_empty() || points == 0 {
            warn!(
                "Sensor tick skipped: {} channels, {} points per channel (dt={})",
                self.channels.len(),
                points,
                delta_seconds
            );
            return &self.buffer;
        }

        let fov = description.horizontal_fov;
        let angle_of_tick = description.rotation_frequency * fov * delta_seconds;
        let sweep = Sweep {
            start: self.current_horizontal_angle,
            step: angle_of_tick / usize_to_f32(points),
            fov,
            points,
        };

        let tick_span = debug_span!(
            "lidar_tick",
            channels = self.channels.len(),
            points,
            phase = TickPhase::Idle.as_str()
        );
        let _tick = tick_span.enter();
        let mut phase = TickPhase::Idle;

        // 2-4. Parallel scan under the scene read lock
        advance_phase(&mut phase, &tick_span);
        {
            let _scene = self.collaborators.scene_lock.read();
            let ctx = ScanContext {
                ray_caster: self.collaborators.ray_caster.as_ref(),
                weather: &weather,
                pose: &self.pose,
                range: description.range,
            };
            let sensor = &self.sensor;
            self.channels
                .par_iter_mut()
                .for_each(|channel| channel.scan(sensor, &ctx, &sweep));
        }

        // 5. Merge in channel order
        advance_phase(&mut phase, &tick_span);
        let total: usize = self.channels.iter().map(|c| c.detections().len()).sum();
        self.buffer.reset(self.channels.len());
        self.buffer.reserve(total);
        let mut stats = ChannelStats::default();
        for channel in &self.channels {
            self.buffer.push_channel(channel.detections());
            stats += channel.stats();
        }
        self.last_stats = stats;

        // 6. Advance the sweep
        if fov > 0.0 {
            self.current_horizontal_angle =
                (self.current_horizontal_angle + angle_of_tick).rem_euclid(fov);
        }
        self.buffer
            .set_horizontal_angle(self.current_horizontal_angle.to_radians());
        advance_phase(&mut phase, &tick_span);

        debug!(
            "Sensor tick: {} detections, {} air hits, {} misses, sweep={:.1}°",
            stats.emitted, stats.air_hits, stats.misses, self.current_horizontal_angle
        );
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::{WeatherParameters, WeatherPreset};
    use crate::scene::{SharedWeather, StaticScene};
    use crate::sensor::{LidarDescription, SemanticLidar};
    use std::sync::Mutex;
    use tracing::field::{Field, Visit};
    use tracing::span;
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    /// Collects every `phase` value recorded on a span.
    #[derive(Clone, Default)]
    struct PhaseLog(Arc<Mutex<Vec<String>>>);

    struct PhaseVisitor<'a>(&'a Mutex<Vec<String>>);

    impl Visit for PhaseVisitor<'_> {
        fn record_str(&mut self, field: &Field, value: &str) {
            if field.name() == "phase" {
                self.0.lock().unwrap().push(value.to_owned());
            }
        }

        fn record_debug(&mut self, _field: &Field, _value: &dyn std::fmt::Debug) {}
    }

    impl<S: tracing::Subscriber> Layer<S> for PhaseLog {
        fn on_record(&self, _id: &span::Id, values: &span::Record<'_>, _ctx: Context<'_, S>) {
            values.record(&mut PhaseVisitor(&self.0));
        }
    }

    fn collaborators() -> Collaborators {
        Collaborators::builder()
            .ray_caster(Arc::new(StaticScene::test_yard(-1.7)))
            .weather_provider(Arc::new(WeatherPreset::ClearNoon.parameters()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_requires_collaborators() {
        let missing_caster = Collaborators::builder()
            .weather_provider(Arc::new(WeatherParameters::default()))
            .build();
        assert_eq!(missing_caster.unwrap_err(), SetupError::MissingRayCaster);

        let missing_weather = Collaborators::builder()
            .ray_caster(Arc::new(StaticScene::new()))
            .build();
        assert_eq!(
            missing_weather.unwrap_err(),
            SetupError::MissingWeatherProvider
        );
    }

    #[test]
    fn test_tick_fills_every_channel() {
        let description = LidarDescription {
            channels: 8,
            points_per_second: 8_000,
            ..LidarDescription::default()
        };
        let mut lidar = SensorTickOrchestrator::new(SemanticLidar::new(description), collaborators());
        let buffer = lidar.tick(0.1);

        assert_eq!(buffer.channel_count(), 8);
        assert!(!buffer.is_empty());
        assert_eq!(lidar.last_stats().requested, 8 * 100);
    }

    #[test]
    fn test_phase_cycle() {
        assert_eq!(TickPhase::Idle.next(), TickPhase::Scanning);
        assert_eq!(TickPhase::Scanning.next(), TickPhase::Merging);
        assert_eq!(TickPhase::Merging.next(), TickPhase::Idle);
    }

    #[test]
    fn test_tick_span_records_each_phase() {
        let log = PhaseLog::default();
        let subscriber = tracing_subscriber::registry().with(log.clone());
        let mut lidar = SensorTickOrchestrator::new(
            SemanticLidar::new(LidarDescription::default()),
            collaborators(),
        );

        tracing::subscriber::with_default(subscriber, || {
            lidar.tick(0.05);
            // Skipped ticks never leave Idle
            lidar.tick(0.0);
        });

        assert_eq!(
            *log.0.lock().unwrap(),
            vec!["scanning", "merging", "idle"]
        );
    }

    #[test]
    fn test_sweep_advances_modulo_fov() {
        let mut lidar = SensorTickOrchestrator::new(
            SemanticLidar::new(LidarDescription::default()),
            collaborators(),
        );
        // 10 Hz * 360° * 0.025 s = 90° per tick
        for expected in [90.0, 180.0, 270.0, 0.0, 90.0] {
            lidar.tick(0.025);
            assert!((lidar.horizontal_angle() - expected).abs() < 1e-3);
        }
        assert!((lidar.buffer().horizontal_angle() - 90f32.to_radians()).abs() < 1e-4);
    }

    #[test]
    fn test_weather_update_between_ticks() {
        let shared = SharedWeather::new(WeatherPreset::ClearNoon.parameters());
        let collaborators = Collaborators::builder()
            .ray_caster(Arc::new(StaticScene::new()))
            .weather_provider(Arc::new(shared.clone()))
            .build()
            .unwrap();
        let mut lidar =
            SensorTickOrchestrator::new(SemanticLidar::new(LidarDescription::default()), collaborators);

        // Open sky and clear weather: nothing comes back
        assert!(lidar.tick(0.05).is_empty());

        shared.apply(WeatherPreset::HardSnowNoon.parameters());
        assert!(!lidar.tick(0.05).is_empty());
        assert!(lidar.last_stats().air_hits > 0);
    }
}
