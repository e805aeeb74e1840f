//! One laser channel of a spinning lidar
//!
//! Each channel owns its detections and its random stream so channels can be
//! scanned in parallel without sharing mutable state.

use super::config::usize_to_f32;
use super::scannable::{ChannelRng, ScanContext, Scannable};
use crate::core_types::detection::DetectionRecord;
use rand::SeedableRng;

/// Per-tick sample accounting for one channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStats {
    /// Samples the channel attempted
    pub requested: usize,
    /// Samples discarded by general dropout before casting
    pub dropped_before_cast: usize,
    /// Samples with no return (open sky or precipitation drop)
    pub misses: usize,
    /// Returns off air particles
    pub air_hits: usize,
    /// Returns rejected by post-processing
    pub rejected: usize,
    /// Detections kept
    pub emitted: usize,
}

impl std::ops::AddAssign for ChannelStats {
    fn add_assign(&mut self, other: Self) {
        self.requested += other.requested;
        self.dropped_before_cast += other.dropped_before_cast;
        self.misses += other.misses;
        self.air_hits += other.air_hits;
        self.rejected += other.rejected;
        self.emitted += other.emitted;
    }
}

/// Horizontal sweep for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sweep {
    /// Sweep angle at the first sample (degrees, in `[0, fov)`)
    pub start: f32,
    /// Angle between consecutive samples (degrees)
    pub step: f32,
    /// Horizontal field of view (degrees)
    pub fov: f32,
    /// Samples per channel
    pub points: usize,
}

impl Sweep {
    /// Laser azimuth of sample `index`, centred on the forward axis (degrees).
    pub fn angle_of(&self, index: usize) -> f32 {
        if self.fov <= 0.0 {
            return 0.0;
        }
        (self.start + self.step * usize_to_f32(index)).rem_euclid(self.fov) - self.fov / 2.0
    }
}

/// Sample loop and detection list of one laser
#[derive(Debug, Clone)]
pub struct ChannelScanner<D> {
    index: usize,
    vertical_angle: f32,
    rng: ChannelRng,
    detections: Vec<D>,
    stats: ChannelStats,
}

impl<D: DetectionRecord> ChannelScanner<D> {
    /// Channel `index` at `vertical_angle` degrees. The random stream is the
    /// sensor seed with the channel index as stream id.
    #[must_use]
    pub fn new(index: usize, vertical_angle: f32, seed: u64) -> Self {
        let mut rng = ChannelRng::seed_from_u64(seed);
        rng.set_stream(index as u64);
        ChannelScanner {
            index,
            vertical_angle,
            rng,
            detections: Vec::new(),
            stats: ChannelStats::default(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn vertical_angle(&self) -> f32 {
        self.vertical_angle
    }

    pub fn detections(&self) -> &[D] {
        &self.detections
    }

    pub fn stats(&self) -> ChannelStats {
        self.stats
    }

    /// Run every sample of `sweep` and replace the channel's detections.
    ///
    /// A sample lost at any stage is not retried, so the detection count is
    /// at most `sweep.points`.
    pub fn scan<S>(&mut self, sensor: &S, ctx: &ScanContext<'_>, sweep: &Sweep)
    where
        S: Scannable<Detection = D> + ?Sized,
    {
        self.detections.clear();
        self.detections.reserve(sweep.points);
        self.stats = ChannelStats {
            requested: sweep.points,
            ..ChannelStats::default()
        };

        for i in 0..sweep.points {
            if !sensor.preprocess_ray(&mut self.rng) {
                self.stats.dropped_before_cast += 1;
                continue;
            }

            let horizontal = sweep.angle_of(i);
            let Some(shot) = sensor.shoot_laser(ctx, self.vertical_angle, horizontal, &mut self.rng)
            else {
                self.stats.misses += 1;
                continue;
            };
            if shot.is_air() {
                self.stats.air_hits += 1;
            }

            let mut detection = sensor.compute_detection(&shot, ctx);
            if sensor.postprocess(&mut detection, ctx, &mut self.rng) {
                self.detections.push(detection);
            } else {
                self.stats.rejected += 1;
            }
        }
        self.stats.emitted = self.detections.len();
    }
}
