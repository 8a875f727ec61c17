//! Demo driving agents across a level towards a moving target

use std::error::Error;
use std::path::{Path as FsPath, PathBuf};
use std::thread;
use std::time::Duration;

use clap::Parser;
use gridnav::prelude::*;

const CAVE: &str = include_str!("../assets/levels/cave.ron");

/// Run agents across a level while the target circles its centre
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Level geometry file (.ron or .json); the built-in cave if omitted
    #[arg(short, long)]
    level: Option<PathBuf>,

    /// Navigation config file (.ron or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of frames to simulate
    #[arg(long, default_value_t = 300)]
    ticks: u32,

    /// Number of agents to spawn
    #[arg(long, default_value_t = 4)]
    agents: u32,

    /// Frame length in milliseconds
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,

    /// Print the mesh and the first agent's route when done
    #[arg(long)]
    ascii: bool,
}

fn is_json(path: &FsPath) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

fn load_geometry(path: Option<&FsPath>) -> Result<LevelGeometry, Box<dyn Error>> {
    let geometry = match path {
        Some(path) if is_json(path) => LevelGeometry::load_json(path)?,
        Some(path) => LevelGeometry::load_ron(path)?,
        None => ron::from_str(CAVE)?,
    };
    Ok(geometry)
}

fn load_config(path: Option<&FsPath>) -> Result<NavConfig, Box<dyn Error>> {
    let config = match path {
        Some(path) if is_json(path) => NavConfig::load_json(path)?,
        Some(path) => NavConfig::load_ron(path)?,
        None => NavConfig::default(),
    };
    Ok(config)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let geometry = load_geometry(args.level.as_deref())?;
    let config = load_config(args.config.as_deref())?;
    let mut level = Level::load(&geometry, config)?;

    let (width, height) = level.mesh().world_size();
    let centre = Vec2::new(width as f32, height as f32) * 0.5;
    let orbit = centre.min_element() * 0.6;

    // Spread agents along the top edge, snapped to traversable cells
    for i in 0..args.agents {
        let x = width as f32 * (i as f32 + 0.5) / args.agents.max(1) as f32;
        let spawn = level
            .mesh()
            .closest_active_cell(Vec2::new(x, 0.0))
            .map(|cell| cell.center())
            .ok_or(NavError::NoActiveCell)?;
        level.spawn_agent(spawn);
    }

    log::info!(
        "Running {} ticks of {}ms with {} agent(s) on '{}'",
        args.ticks,
        args.tick_ms,
        level.agents().len(),
        level.name()
    );

    let mut time = Time::new();
    let frame = Duration::from_millis(args.tick_ms);
    let mut target = centre;
    for _ in 0..args.ticks {
        time.update();
        let angle = time.now_ms() as f32 / 1000.0;
        target = centre + Vec2::new(angle.cos(), angle.sin()) * orbit;

        level.tick(time.now_ms(), target);
        thread::sleep(frame);
    }
    level.flush();

    log::info!("{}", level.stats().format_stats());
    for agent in level.agents() {
        log::info!(
            "Agent {:?} at {} with {} waypoint(s) left",
            agent.id(),
            agent.position,
            agent.waypoints().count()
        );
    }

    if args.ascii {
        let route = level
            .agents()
            .first()
            .map(|agent| find_path(level.mesh(), agent.position, target))
            .transpose()?;
        print!("{}", ascii_map(level.mesh(), route.as_ref()));
    }

    Ok(())
}
