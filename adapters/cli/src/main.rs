#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs headless Shadow Operative sessions.

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use shadow_operative_cli::{load_config, load_maze, log_filter, Simulation};
use shadow_operative_core::{MovementMode, WELCOME_BANNER};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Gait {
    Sneak,
    Walk,
    Sprint,
}

impl From<Gait> for MovementMode {
    fn from(gait: Gait) -> Self {
        match gait {
            Gait::Sneak => Self::Sneak,
            Gait::Walk => Self::Walk,
            Gait::Sprint => Self::Sprint,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Headless stealth sessions against the guard AI",
    long_about = None
)]
struct Args {
    /// Seed for guard placement; overrides the config file
    #[arg(long)]
    seed: Option<u64>,

    /// Number of guards; overrides the config file
    #[arg(long)]
    guards: Option<usize>,

    /// Tick limit per session
    #[arg(long, default_value_t = 6_000)]
    max_ticks: u64,

    /// Simulated milliseconds per tick
    #[arg(long, default_value_t = 50)]
    tick_ms: u64,

    /// Gait of the scripted player
    #[arg(long, value_enum, default_value_t = Gait::Sneak)]
    mode: Gait,

    /// TOML file with configuration overrides
    #[arg(long)]
    config: Option<PathBuf>,

    /// Text maze layout replacing the built-in one
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Consecutive sessions to run; each one redeploys guards with the next seed
    #[arg(long, default_value_t = 1)]
    runs: u32,

    /// Print the effective configuration as TOML and exit
    #[arg(long, default_value_t = false)]
    print_config: bool,
}

fn setup_logging() {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = log_filter(directives.as_deref());
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}

/// Entry point for the Shadow Operative command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config.spawning.seed = seed;
    }
    if let Some(guards) = args.guards {
        config.spawning.guard_count = guards;
    }

    if args.print_config {
        let text = toml::to_string_pretty(&config).context("failed to encode configuration")?;
        print!("{text}");
        return Ok(());
    }

    let maze = load_maze(args.layout.as_deref(), config.maze)?;
    let dt = Duration::from_millis(args.tick_ms);
    let mut simulation = Simulation::new(maze, &config, args.mode.into(), dt);

    println!("{WELCOME_BANNER}");
    for run in 0..args.runs {
        if run > 0 {
            simulation.reset(config.spawning.seed.wrapping_add(u64::from(run)));
        }
        let report = simulation.run(args.max_ticks);
        println!("\nrun {}\n{report}", run + 1);
    }
    Ok(())
}
