//! Headless world driver
//!
//! Generates a world, walks an observer across it and reports what a
//! renderer would have received.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use glam::Vec3;

use blockworld::{StatsRenderer, World, WorldConfig, WorldError};

/// Stream a voxel world without a window
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// RON world config to load instead of the defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the world seed
    #[arg(long)]
    seed: Option<u32>,

    /// Override the view distance in chunks
    #[arg(long)]
    view_distance: Option<i32>,

    /// Mesh chunks on the main thread
    #[arg(long, default_value_t = false)]
    single_threaded: bool,

    /// Number of update ticks to run
    #[arg(long, default_value_t = 600)]
    ticks: u32,

    /// Observer speed along +x, in blocks per tick
    #[arg(long, default_value_t = 0.5)]
    walk: f32,
}

fn run(args: Args) -> Result<(), WorldError> {
    let mut config = match &args.config {
        Some(path) => WorldConfig::load(path)?,
        None => WorldConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(view_distance) = args.view_distance {
        config.view_distance = view_distance;
    }
    if args.single_threaded {
        config.enable_threading = false;
    }

    let mut world = World::new(config)?;
    let mut observer = world.generate_world()?;
    let mut renderer = StatsRenderer::default();

    for tick in 0..args.ticks {
        observer.x += args.walk;
        world.update(observer, &mut renderer);

        if tick % 100 == 0 {
            tracing::info!(
                "tick {}: observer {:?}, {} active, {} allocated, {} queued",
                tick,
                world.observer_chunk(),
                world.active_chunks().len(),
                world.allocated_chunks(),
                world.remesh_queue().len()
            );
        }
    }

    let ground = world.voxel_id(Vec3::new(observer.x, 1.0, observer.z));
    tracing::info!(
        "Done: {} meshes ({} quads), {} activations, {} deactivations, block under observer {}",
        renderer.meshes_uploaded,
        renderer.quads_uploaded,
        renderer.activations,
        renderer.deactivations,
        ground
    );

    world.shutdown();
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting blockworld...");
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
