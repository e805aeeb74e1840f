use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use nalgebra::{Translation3, UnitQuaternion};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wintersim_core::scene::{ActorRef, SharedWeather, Shape, StaticScene};
use wintersim_core::sensor::{
    LidarDescription, MaterialLidar, Radar, RadarDescription, Scannable, SemanticLidar,
    WeatherLidar,
};
use wintersim_core::{Collaborators, Pose, SensorTickOrchestrator, Vec3, WeatherPreset};

/// Winter sensor simulation demo
#[derive(Parser, Debug)]
#[command(name = "wintersim-demo")]
#[command(about = "Weather-conditioned lidar and radar demo", long_about = None)]
struct Args {
    /// Weather preset name, case and punctuation ignored (see --list-presets)
    #[arg(short, long, default_value = "MidSnowNoon")]
    preset: String,

    /// Number of sensor ticks to run
    #[arg(short, long, default_value_t = 20)]
    ticks: u32,

    /// Tick length in seconds
    #[arg(long, default_value_t = 0.05)]
    dt: f32,

    /// Lidar channel count
    #[arg(short, long, default_value_t = 32)]
    channels: u32,

    /// Random seed shared by lidar and radar
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Lidar variant
    #[arg(short, long, value_enum, default_value_t = Variant::Weather)]
    variant: Variant,

    /// Also run a forward radar against a moving target
    #[arg(long)]
    radar: bool,

    /// Ego speed along +X (m/s)
    #[arg(long, default_value_t = 0.0)]
    speed: f32,

    /// List the weather presets and exit
    #[arg(long)]
    list_presets: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Variant {
    Semantic,
    Weather,
    Material,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    if args.list_presets {
        for preset in WeatherPreset::ALL {
            println!("{}", preset.name());
        }
        return Ok(());
    }

    if args.dt.is_nan() || args.dt <= 0.0 {
        bail!("tick length must be positive, got {}", args.dt);
    }

    let preset = WeatherPreset::from_name(&args.preset)
        .with_context(|| format!("unknown weather preset '{}'", args.preset))?;
    info!(
        "Demo run: preset={}, variant={:?}, ticks={}, dt={}s, seed={}",
        preset.name(),
        args.variant,
        args.ticks,
        args.dt,
        args.seed
    );
    if args.ticks == 0 {
        warn!("No ticks requested, sensors will not run");
    }
    let weather = Arc::new(SharedWeather::new(preset.parameters()));
    let scene = Arc::new(
        StaticScene::test_yard(-1.7).with_actor(
            Shape::Aabb {
                min: Vec3::new(35.0, -1.0, -1.7),
                max: Vec3::new(39.5, 1.0, 0.0),
            },
            10,
            ActorRef {
                id: 1,
                velocity: Vec3::new(-8.0, 0.0, 0.0),
            },
        ),
    );

    let collaborators = Collaborators::builder()
        .ray_caster(Arc::clone(&scene))
        .weather_provider(Arc::clone(&weather))
        .build()?;

    println!("=== Winter Sensor Demo ===\n");
    let w = preset.parameters();
    println!(
        "Weather: {} (precipitation {:.0}, fog {:.0}, {:.1}°C, humidity {:.0}%)",
        preset.name(),
        w.precipitation(),
        w.fog_density(),
        w.temperature(),
        w.relative_humidity()
    );
    println!(
        "Snowing: {}, scene shapes: {}\n",
        w.is_snowing(),
        scene.len()
    );

    let description = LidarDescription {
        channels: args.channels,
        random_seed: args.seed,
        ..LidarDescription::default()
    };
    match args.variant {
        Variant::Semantic => run_lidar(SemanticLidar::new(description), &collaborators, &args),
        Variant::Weather => run_lidar(WeatherLidar::new(description), &collaborators, &args),
        Variant::Material => run_lidar(MaterialLidar::new(description), &collaborators, &args),
    }

    if args.radar {
        run_radar(collaborators, &args);
    }

    Ok(())
}

fn pose_at(args: &Args, tick: u32) -> Pose {
    #[expect(clippy::cast_precision_loss)]
    let x = args.speed * args.dt * tick as f32;
    Pose::from_parts(Translation3::new(x, 0.0, 0.0), UnitQuaternion::identity())
}

fn run_lidar<S: Scannable>(sensor: S, collaborators: &Collaborators, args: &Args) {
    let mut lidar = SensorTickOrchestrator::new(sensor, collaborators.clone());

    println!("Running {:?} lidar...\n", args.variant);
    println!("Tick | Sweep(°) | Points | Air hits | Misses | Dropped | Rejected | Bytes");
    println!("-----|----------|--------|----------|--------|---------|----------|-------");

    let mut total_points = 0;
    let mut total_air = 0;
    for tick in 0..args.ticks {
        lidar.set_pose(pose_at(args, tick));
        let bytes = lidar.tick(args.dt).encode().len();
        let stats = lidar.last_stats();
        total_points += stats.emitted;
        total_air += stats.air_hits;
        println!(
            "{:4} | {:8.1} | {:6} | {:8} | {:6} | {:7} | {:8} | {:6}",
            tick,
            lidar.horizontal_angle(),
            stats.emitted,
            stats.air_hits,
            stats.misses,
            stats.dropped_before_cast,
            stats.rejected,
            bytes
        );
    }

    info!(
        "Lidar finished: {} points, {} air hits over {} ticks",
        total_points, total_air, args.ticks
    );
    println!("\n=== Lidar Complete ===");
    println!("Total points: {}", total_points);
    println!("Air-particle hits: {}", total_air);
    for (index, stats) in lidar.channel_stats().enumerate() {
        println!(
            "  channel {:2}: {:4} of {:4} samples kept",
            index, stats.emitted, stats.requested
        );
    }
}

fn run_radar(collaborators: Collaborators, args: &Args) {
    let mut radar = Radar::new(
        RadarDescription {
            random_seed: args.seed,
            ..RadarDescription::default()
        },
        collaborators,
    );

    println!("\nRunning radar...\n");
    println!("Tick | Range(m) | Detections | Mean velocity(m/s) | Nearest(m)");
    println!("-----|----------|------------|--------------------|-----------");
    for tick in 0..args.ticks {
        radar.set_pose(pose_at(args, tick));
        radar.tick(args.dt);
        let buffer = radar.buffer();
        let records = buffer.records();
        #[expect(clippy::cast_precision_loss)]
        let mean_velocity = if records.is_empty() {
            0.0
        } else {
            records.iter().map(|d| d.velocity).sum::<f32>() / records.len() as f32
        };
        let nearest = records
            .iter()
            .map(|d| d.depth)
            .fold(f32::INFINITY, f32::min);
        println!(
            "{:4} | {:8.1} | {:10} | {:18.2} | {:9.1}",
            tick,
            radar.effective_range(),
            records.len(),
            mean_velocity,
            nearest
        );
    }
}
