use anyhow::Result;
use clap::Parser;
use log::{info, warn};

use road_sim::simulation::{Command, SimWorld, SPAWN_CHANCE_PERCENT};

#[derive(Parser)]
#[command(name = "road_sim")]
#[command(about = "Road network simulation with live rerouting")]
struct Cli {
    /// Number of simulation ticks to run
    #[arg(long, default_value = "600")]
    ticks: u32,

    /// Time delta per tick in seconds
    #[arg(long, default_value = "0.1")]
    delta: f64,

    /// Simulation speed factor (1.0 = normal)
    #[arg(long, default_value = "1.0")]
    speed_factor: f64,

    /// RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut world = match cli.seed {
        Some(seed) => SimWorld::create_demo_world_with_seed(seed),
        None => SimWorld::create_demo_world(),
    };
    world.speed_factor = cli.speed_factor;

    anyhow::ensure!(
        world.graph.junction_count() >= 2,
        "need at least two junctions before starting the simulation"
    );

    info!(
        "starting: {} junctions, {} roads, {} ticks at {}s",
        world.graph.junction_count(),
        world.graph.road_count(),
        cli.ticks,
        cli.delta
    );

    for tick in 1..=cli.ticks {
        if world.roll_percent(SPAWN_CHANCE_PERCENT) {
            world.spawn_random_vehicle()?;
        }

        // Road works halfway through the run: make the central shortcut
        // expensive and watch the vehicles re-route around it.
        if tick == cli.ticks / 2 {
            let command = Command::SetWeight {
                from: "Northgate".into(),
                to: "Midtown".into(),
                weight: 400.0,
            };
            if let Err(err) = world.apply(command) {
                warn!("mid-run weight change rejected: {}", err);
            } else {
                info!("mid-run weight change applied, routes recomputed");
            }
        }

        world.tick(cli.delta);
    }

    info!("SIMULATION COMPLETE");
    info!("Total vehicles spawned: {}", world.stats.vehicles_spawned);
    info!("Total vehicles arrived: {}", world.stats.vehicles_arrived);
    info!("Total vehicles evicted: {}", world.stats.vehicles_evicted);
    info!("Active vehicles: {}", world.vehicle_count());
    info!(
        "Total junctions: {}, total roads: {}",
        world.graph.junction_count(),
        world.graph.road_count()
    );

    Ok(())
}
