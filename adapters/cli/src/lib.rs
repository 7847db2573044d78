#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless Shadow Operative sessions driven by a scripted player.

mod autopilot;
mod simulation;

use std::{fs, path::Path};

use anyhow::{Context, Result};
use shadow_operative_core::{GameConfig, MazeConfig};
use shadow_operative_world::{Maze, DEFAULT_LAYOUT};
use tracing_subscriber::EnvFilter;

pub use autopilot::Autopilot;
pub use simulation::{Outcome, Report, Simulation};

/// Filter applied when no log directives are given.
const DEFAULT_LOG_FILTER: &str = "warn";

/// Builds the log filter from `RUST_LOG`-style directives.
///
/// Blank or missing directives fall back to warnings only.
#[must_use]
pub fn log_filter(directives: Option<&str>) -> EnvFilter {
    match directives.map(str::trim).filter(|directives| !directives.is_empty()) {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::new(DEFAULT_LOG_FILTER),
    }
}

/// Loads a TOML configuration file, or the defaults when no path is given.
///
/// Missing keys fall back to their defaults. The result is validated.
pub fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    let config = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            parse_config(&text).with_context(|| format!("invalid config {}", path.display()))?
        }
        None => GameConfig::default(),
    };
    config.validate().context("configuration rejected")?;
    Ok(config)
}

/// Parses configuration text without validating it.
pub fn parse_config(text: &str) -> Result<GameConfig> {
    toml::from_str(text).context("failed to parse TOML")
}

/// Loads a maze layout file, or the built-in layout when no path is given.
pub fn load_maze(path: Option<&Path>, config: MazeConfig) -> Result<Maze> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read layout {}", path.display()))?;
            Maze::from_layout(&text, config)
                .with_context(|| format!("invalid layout {}", path.display()))
        }
        None => Maze::from_layout(DEFAULT_LAYOUT, config).context("built-in layout is invalid"),
    }
}
