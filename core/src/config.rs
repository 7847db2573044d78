//! Immutable tuning values handed to systems at construction time.
//!
//! Every speed and rate is per second; systems receive an explicit `dt`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Complete configuration for a session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Maze geometry parameters.
    pub maze: MazeConfig,
    /// Guard artificial intelligence parameters.
    pub ai: AiConfig,
    /// Player movement and noise parameters.
    pub player: PlayerConfig,
    /// Objective pickup parameters.
    pub objective: ObjectiveConfig,
    /// Guard placement parameters.
    pub spawning: SpawnConfig,
}

impl GameConfig {
    /// Rejects configurations that would make the simulation meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("maze.cell_size", self.maze.cell_size)?;
        positive("maze.sight_precision", self.maze.sight_precision)?;
        self.ai.validate()?;
        positive("player.radius", self.player.radius)?;
        positive("player.walk_speed", self.player.walk_speed)?;
        positive("player.sneak_speed", self.player.sneak_speed)?;
        positive("player.sprint_speed", self.player.sprint_speed)?;
        positive("objective.collect_radius", self.objective.collect_radius)?;
        Ok(())
    }
}

/// Maze geometry parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    /// Side length of a grid cell in world units.
    pub cell_size: f32,
    /// Distance between line-of-sight samples in world units.
    pub sight_precision: f32,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            cell_size: 64.0,
            sight_precision: 2.0,
        }
    }
}

/// Guard artificial intelligence parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Vision cone parameters.
    pub vision: VisionConfig,
    /// Hearing parameters.
    pub hearing: HearingConfig,
    /// Movement speeds per behaviour.
    pub speeds: SpeedConfig,
    /// State machine timers, radii and alertness rates.
    pub behavior: BehaviorConfig,
    /// A* search parameters.
    pub pathfinding: PathfindingConfig,
    /// Steering primitive parameters.
    pub steering: SteeringConfig,
}

impl AiConfig {
    /// Rejects AI settings that would break perception, search or movement.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("ai.vision.distance", self.vision.distance)?;
        positive("ai.vision.angle", self.vision.angle)?;
        if self.vision.alert_bonus < 1.0 {
            return Err(ConfigError::BelowOne {
                field: "ai.vision.alert_bonus",
                value: self.vision.alert_bonus,
            });
        }
        non_negative("ai.vision.alert_focus", self.vision.alert_focus)?;

        positive("ai.speeds.patrol", self.speeds.patrol)?;
        positive("ai.speeds.alert", self.speeds.alert)?;
        positive("ai.speeds.chase", self.speeds.chase)?;
        positive("ai.speeds.search", self.speeds.search)?;

        let behavior = &self.behavior;
        positive("ai.behavior.body_radius", behavior.body_radius)?;
        positive("ai.behavior.catch_radius", behavior.catch_radius)?;
        positive("ai.behavior.search_radius", behavior.search_radius)?;
        positive(
            "ai.behavior.search_step_degrees",
            behavior.search_step_degrees,
        )?;
        unit(
            "ai.behavior.search_inner_ratio",
            behavior.search_inner_ratio,
        )?;
        unit("ai.behavior.search_alertness", behavior.search_alertness)?;
        unit(
            "ai.behavior.alertness_on_sighting",
            behavior.alertness_on_sighting,
        )?;
        unit(
            "ai.behavior.alertness_on_noise",
            behavior.alertness_on_noise,
        )?;
        non_negative("ai.behavior.alertness_gain", behavior.alertness_gain)?;
        non_negative("ai.behavior.alertness_decay", behavior.alertness_decay)?;
        non_negative("ai.behavior.chase_memory", behavior.chase_memory)?;
        non_negative(
            "ai.behavior.path_refresh_interval",
            behavior.path_refresh_interval,
        )?;
        if behavior.patrol_min_offset > behavior.patrol_max_offset {
            return Err(ConfigError::InvertedRange {
                field: "ai.behavior.patrol_min_offset",
            });
        }

        if self.pathfinding.max_expansions == 0 {
            return Err(ConfigError::ZeroExpansionBudget);
        }
        non_negative(
            "ai.pathfinding.safety_margin",
            self.pathfinding.safety_margin,
        )?;
        positive(
            "ai.steering.arrival_tolerance",
            self.steering.arrival_tolerance,
        )?;
        Ok(())
    }
}

/// Vision cone parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Vision distance at zero alertness, in world units.
    pub distance: f32,
    /// Full cone angle at zero alertness, in degrees.
    pub angle: f32,
    /// Distance multiplier reached at full alertness.
    pub alert_bonus: f32,
    /// How strongly full alertness narrows the cone; the angle is divided by `1 + focus`.
    pub alert_focus: f32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            distance: 280.0,
            angle: 85.0,
            alert_bonus: 1.3,
            alert_focus: 0.3,
        }
    }
}

/// Hearing parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HearingConfig {
    /// Range at which a sneaking player is heard.
    pub sneak_range: f32,
    /// Range at which a walking player is heard.
    pub walk_range: f32,
    /// Range at which a sprinting player is heard.
    pub sprint_range: f32,
    /// Noise level that must be exceeded before anything is heard.
    pub min_noise: f32,
}

impl Default for HearingConfig {
    fn default() -> Self {
        Self {
            sneak_range: 80.0,
            walk_range: 160.0,
            sprint_range: 220.0,
            min_noise: 0.1,
        }
    }
}

/// Guard movement speeds in world units per second.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedConfig {
    /// Speed while patrolling.
    pub patrol: f32,
    /// Speed while investigating.
    pub alert: f32,
    /// Speed while chasing.
    pub chase: f32,
    /// Speed while searching.
    pub search: f32,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            patrol: 150.0,
            alert: 228.0,
            chase: 300.0,
            search: 180.0,
        }
    }
}

/// State machine timers, radii and alertness rates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Collision radius of a guard.
    pub body_radius: f32,
    /// Distance under which a guard with line of sight catches the player.
    pub catch_radius: f32,
    /// Outer radius of the search ring.
    pub search_radius: f32,
    /// Inner radius of the search ring as a fraction of `search_radius`.
    pub search_inner_ratio: f32,
    /// Angular spacing between search ring points, in degrees.
    pub search_step_degrees: f32,
    /// Seconds an investigation may last.
    pub investigation_time: f32,
    /// Seconds a search may last.
    pub search_time: f32,
    /// Minimum alertness for a finished investigation to escalate into a search.
    pub search_alertness: f32,
    /// Alertness a guard is raised to when it spots the player.
    pub alertness_on_sighting: f32,
    /// Alertness a guard is raised to when it hears the player.
    pub alertness_on_noise: f32,
    /// Alertness gained per second while chasing.
    pub alertness_gain: f32,
    /// Alertness lost per second while not chasing.
    pub alertness_decay: f32,
    /// Distance at which a guard counts as having reached the last sighting.
    pub arrival_radius: f32,
    /// Seconds a guard keeps heading for the last sighting after losing sight.
    pub chase_memory: f32,
    /// Seconds between path recomputations while chasing or investigating.
    pub path_refresh_interval: f32,
    /// Seconds without progress before a patrolling guard skips its waypoint.
    pub stuck_timeout: f32,
    /// Number of patrol points generated for a guard without an explicit route.
    pub patrol_point_count: usize,
    /// Minimum distance of randomly generated patrol points from the spawn.
    pub patrol_min_offset: f32,
    /// Maximum distance of randomly generated patrol points from the spawn.
    pub patrol_max_offset: f32,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            body_radius: 8.0,
            catch_radius: 35.0,
            search_radius: 150.0,
            search_inner_ratio: 0.5,
            search_step_degrees: 45.0,
            investigation_time: 8.0,
            search_time: 12.0,
            search_alertness: 0.3,
            alertness_on_sighting: 0.6,
            alertness_on_noise: 0.3,
            alertness_gain: 0.5,
            alertness_decay: 0.05,
            arrival_radius: 40.0,
            chase_memory: 1.5,
            path_refresh_interval: 0.4,
            stuck_timeout: 2.0,
            patrol_point_count: 4,
            patrol_min_offset: 50.0,
            patrol_max_offset: 120.0,
        }
    }
}

/// A* search parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathfindingConfig {
    /// Maximum number of nodes expanded by a single search.
    pub max_expansions: usize,
    /// Collapse grid paths into longer straight segments.
    pub smoothing: bool,
    /// Skip the search when a straight corridor to the goal is clear.
    pub direct_path: bool,
    /// Allow diagonal steps that do not cut wall corners.
    pub allow_diagonal: bool,
    /// Cost added per wall orthogonally adjacent to a candidate cell.
    pub wall_avoidance: f32,
    /// Cost added when a step changes direction.
    pub direction_change_penalty: f32,
    /// Clearance added to the body radius when validating cells.
    pub safety_margin: f32,
}

impl Default for PathfindingConfig {
    fn default() -> Self {
        Self {
            max_expansions: 512,
            smoothing: true,
            direct_path: true,
            allow_diagonal: true,
            wall_avoidance: 1.5,
            direction_change_penalty: 0.5,
            safety_margin: 4.0,
        }
    }
}

/// Steering primitive parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    /// Distance under which a target counts as reached.
    pub arrival_tolerance: f32,
    /// Fraction of the remaining turn applied per second.
    pub turn_rate: f32,
    /// Heading offsets from the current facing tried when the direct move is blocked.
    pub probe_angles: [f32; 6],
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            arrival_tolerance: 4.0,
            turn_rate: 8.0,
            probe_angles: [45.0, -45.0, 90.0, -90.0, 135.0, -135.0],
        }
    }
}

/// Player movement and noise parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Collision radius of the player.
    pub radius: f32,
    /// Walking speed in world units per second.
    pub walk_speed: f32,
    /// Sneaking speed in world units per second.
    pub sneak_speed: f32,
    /// Sprinting speed in world units per second.
    pub sprint_speed: f32,
    /// Noise produced by walking at full speed.
    pub noise_base: f32,
    /// Noise multiplier applied while sneaking.
    pub sneak_multiplier: f32,
    /// Noise multiplier applied while sprinting.
    pub sprint_multiplier: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            radius: 7.0,
            walk_speed: 270.0,
            sneak_speed: 168.0,
            sprint_speed: 390.0,
            noise_base: 1.0,
            sneak_multiplier: 0.4,
            sprint_multiplier: 2.5,
        }
    }
}

/// Objective pickup parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectiveConfig {
    /// Distance under which the objective is picked up or delivered.
    pub collect_radius: f32,
}

impl Default for ObjectiveConfig {
    fn default() -> Self {
        Self {
            collect_radius: 30.0,
        }
    }
}

/// Guard placement parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Number of guards placed at session start.
    pub guard_count: usize,
    /// Extra guards deployed once, when the objective is picked up.
    pub reinforcements: usize,
    /// Minimum distance between a guard spawn and the player.
    pub min_player_distance: f32,
    /// Minimum distance between two guard spawns.
    pub min_guard_separation: f32,
    /// Candidate cells tried per guard before giving up on it.
    pub max_attempts: usize,
    /// Seed for guard placement and per-guard randomness.
    pub seed: u64,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            guard_count: 2,
            reinforcements: 4,
            min_player_distance: 220.0,
            min_guard_separation: 150.0,
            max_attempts: 100,
            seed: 0x5eed_0f_5bad0,
        }
    }
}

/// Reasons a configuration is rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// A value that must be strictly positive was zero, negative or NaN.
    #[error("{field} must be positive, got {value}")]
    NonPositive {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Rejected value.
        value: f32,
    },
    /// A value that must not be negative was negative or NaN.
    #[error("{field} must not be negative, got {value}")]
    Negative {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Rejected value.
        value: f32,
    },
    /// A fraction fell outside `[0, 1]`.
    #[error("{field} must lie within [0, 1], got {value}")]
    OutsideUnitRange {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Rejected value.
        value: f32,
    },
    /// A multiplier that may only amplify was below one.
    #[error("{field} must be at least 1, got {value}")]
    BelowOne {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Rejected value.
        value: f32,
    },
    /// The lower bound of a range exceeded its upper bound.
    #[error("{field} exceeds the matching maximum")]
    InvertedRange {
        /// Dotted path of the offending lower bound.
        field: &'static str,
    },
    /// The pathfinder would not be allowed to expand a single node.
    #[error("ai.pathfinding.max_expansions must be at least 1")]
    ZeroExpansionBudget,
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn unit(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutsideUnitRange { field, value })
    }
}
