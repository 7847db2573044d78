#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Shadow Operative engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative session world, and the guard systems. Adapters submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. The guard AI reaches the maze
//! only through the read-only [`WorldQuery`] trait, so any grid representation
//! that answers those questions can host guards.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod config;

pub use config::{
    AiConfig, BehaviorConfig, ConfigError, GameConfig, HearingConfig, MazeConfig, ObjectiveConfig,
    PathfindingConfig, PlayerConfig, SpawnConfig, SpeedConfig, SteeringConfig, VisionConfig,
};
pub use glam::Vec2;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Shadow Operative";

/// Commands that express all permissible session mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Stores the movement input applied to the player on the next tick.
    SetPlayerInput {
        /// Desired movement direction; components are expected in `[-1, 1]`.
        heading: Vec2,
        /// Gait the player moves with.
        mode: MovementMode,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Reports that a guard caught the player, ending the session.
    CatchPlayer {
        /// Guard whose catch check fired first.
        guard: GuardId,
    },
    /// Returns the player to the start and restarts the infiltration.
    ResetSession,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the player changed position during a tick.
    PlayerMoved {
        /// Position before the move.
        from: Vec2,
        /// Position after the move.
        to: Vec2,
        /// Noise produced by the move.
        noise_level: f32,
    },
    /// Announces that the player picked up the objective.
    ObjectiveCollected,
    /// Announces that the player returned to the start carrying the objective.
    PlayerEscaped,
    /// Announces that a guard caught the player.
    PlayerCaught {
        /// Guard credited with the catch.
        guard: GuardId,
    },
    /// Confirms that the session was reset to its initial state.
    SessionReset,
}

/// Progress of the current session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionPhase {
    /// The player is moving toward the objective.
    Infiltrating,
    /// The player carries the objective back to the start.
    Extracting,
    /// A guard caught the player.
    Caught,
    /// The player returned to the start with the objective.
    Escaped,
}

impl SessionPhase {
    /// Reports whether the session has ended.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Caught | Self::Escaped)
    }
}

/// Terminal signal a guard raises toward the game loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Signal {
    /// The guard caught the player.
    Caught,
}

/// Behaviour a guard is currently executing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuardState {
    /// Walking the patrol route.
    #[default]
    Patrol,
    /// Pursuing a visible (or just lost) player.
    Chase,
    /// Sweeping the area around the last sighting or a heard noise.
    Investigate,
    /// Wider, slower sweep after an investigation came up empty.
    Search,
}

impl GuardState {
    /// Every state in declaration order.
    pub const ALL: [Self; 4] = [Self::Patrol, Self::Chase, Self::Investigate, Self::Search];

    /// Lowercase label used by logs and adapters.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Patrol => "patrol",
            Self::Chase => "chase",
            Self::Investigate => "investigate",
            Self::Search => "search",
        }
    }
}

/// Gait chosen by the player, which drives speed and noise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementMode {
    /// Slow and quiet.
    Sneak,
    /// Default gait.
    #[default]
    Walk,
    /// Fast and loud.
    Sprint,
}

/// Unique identifier assigned to a guard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GuardId(u32);

impl GuardId {
    /// Creates a new guard identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Read-only view of the player handed to the guard AI every tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Centre of the player body in world units.
    pub position: Vec2,
    /// Noise produced by the latest move; zero while stationary.
    pub noise_level: f32,
    /// Gait used for the latest move.
    pub mode: MovementMode,
}

impl PlayerSnapshot {
    /// Creates a snapshot of a silent, walking player at the provided position.
    #[must_use]
    pub const fn at(position: Vec2) -> Self {
        Self {
            position,
            noise_level: 0.0,
            mode: MovementMode::Walk,
        }
    }

    /// Returns a copy of the snapshot with the provided noise and gait.
    #[must_use]
    pub const fn with_noise(self, noise_level: f32, mode: MovementMode) -> Self {
        Self {
            noise_level,
            mode,
            ..self
        }
    }
}

/// Circular body moved by the steering primitive.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Centre of the body in world units.
    pub position: Vec2,
    /// Facing in degrees within `[0, 360)`; 0° points along +x, 90° along +y.
    pub facing: f32,
    /// Collision radius in world units.
    pub radius: f32,
}

impl Body {
    /// Creates a body facing along +x.
    #[must_use]
    pub const fn new(position: Vec2, radius: f32) -> Self {
        Self {
            position,
            facing: 0.0,
            radius,
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Coordinates are signed so that points outside the maze still map to a cell,
/// which the world reports as a wall.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: i32,
    row: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Cell displaced by the provided column and row deltas.
    #[must_use]
    pub const fn offset(&self, columns: i32, rows: i32) -> Self {
        Self::new(self.column + columns, self.row + rows)
    }

    /// Cell containing the provided world point.
    #[must_use]
    pub fn containing(point: Vec2, cell_size: f32) -> Self {
        Self::new(
            (point.x / cell_size).floor() as i32,
            (point.y / cell_size).floor() as i32,
        )
    }

    /// World-space centre of the cell.
    #[must_use]
    pub fn center(&self, cell_size: f32) -> Vec2 {
        Vec2::new(
            self.column as f32 * cell_size + cell_size / 2.0,
            self.row as f32 * cell_size + cell_size / 2.0,
        )
    }
}

/// Orthogonal neighbour offsets in the order neighbours are enumerated.
pub const ORTHOGONAL_OFFSETS: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// Diagonal neighbour offsets in the order neighbours are enumerated.
pub const DIAGONAL_OFFSETS: [(i32, i32); 4] = [(1, 1), (-1, -1), (1, -1), (-1, 1)];

/// Read-only geometry queries the guard AI issues against the maze.
pub trait WorldQuery {
    /// Side length of a grid cell in world units.
    fn cell_size(&self) -> f32;

    /// Reports whether the point lies inside a wall; points outside the grid are walls.
    fn is_wall(&self, point: Vec2) -> bool;

    /// Reports whether a body of the given radius fits at the point.
    fn is_valid_position(&self, point: Vec2, radius: f32) -> bool;

    /// Reports whether the straight segment between two points is free of walls.
    fn has_line_of_sight(&self, from: Vec2, to: Vec2) -> bool;

    /// Reports whether the cell is a wall.
    fn is_cell_blocked(&self, cell: CellCoord) -> bool {
        self.is_wall(cell.center(self.cell_size()))
    }

    /// Enumerates the open neighbours of a cell.
    ///
    /// Axis-aligned neighbours come first. Diagonal neighbours are only yielded
    /// when `diagonal` is set and neither adjacent axis-aligned cell is a wall,
    /// so paths never cut through a wall corner.
    fn neighbors(&self, cell: CellCoord, diagonal: bool) -> Vec<CellCoord> {
        let mut neighbors = Vec::with_capacity(8);
        for (columns, rows) in ORTHOGONAL_OFFSETS {
            let candidate = cell.offset(columns, rows);
            if !self.is_cell_blocked(candidate) {
                neighbors.push(candidate);
            }
        }

        if diagonal {
            for (columns, rows) in DIAGONAL_OFFSETS {
                let candidate = cell.offset(columns, rows);
                if self.is_cell_blocked(candidate)
                    || self.is_cell_blocked(cell.offset(columns, 0))
                    || self.is_cell_blocked(cell.offset(0, rows))
                {
                    continue;
                }
                neighbors.push(candidate);
            }
        }

        neighbors
    }
}

/// Bearing from one point to another in degrees within `[0, 360)`.
#[must_use]
pub fn bearing(from: Vec2, to: Vec2) -> f32 {
    let delta = to - from;
    normalize_degrees(delta.y.atan2(delta.x).to_degrees())
}

/// Wraps an angle into `[0, 360)`.
#[must_use]
pub fn normalize_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Signed shortest rotation from `from` to `to` in degrees within `[-180, 180)`.
#[must_use]
pub fn angle_delta(from: f32, to: f32) -> f32 {
    (to - from + 180.0).rem_euclid(360.0) - 180.0
}

/// Unit vector pointing along the provided heading in degrees.
#[must_use]
pub fn heading_vector(degrees: f32) -> Vec2 {
    let radians = degrees.to_radians();
    Vec2::new(radians.cos(), radians.sin())
}

#[cfg(test)]
mod tests {
    use super::{
        angle_delta, bearing, CellCoord, GuardId, GuardState, MovementMode, PlayerSnapshot,
        SessionPhase, Vec2,
    };
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn containing_floors_negative_coordinates() {
        assert_eq!(
            CellCoord::containing(Vec2::new(-1.0, 63.9), 64.0),
            CellCoord::new(-1, 0)
        );
        assert_eq!(
            CellCoord::containing(Vec2::new(128.0, 64.0), 64.0),
            CellCoord::new(2, 1)
        );
    }

    #[test]
    fn center_lies_in_the_middle_of_the_cell() {
        assert_eq!(CellCoord::new(2, 3).center(64.0), Vec2::new(160.0, 224.0));
    }

    #[test]
    fn bearing_uses_screen_axes() {
        let origin = Vec2::ZERO;
        assert!((bearing(origin, Vec2::new(10.0, 0.0)) - 0.0).abs() < 1e-4);
        assert!((bearing(origin, Vec2::new(0.0, 10.0)) - 90.0).abs() < 1e-4);
        assert!((bearing(origin, Vec2::new(-10.0, 0.0)) - 180.0).abs() < 1e-4);
        assert!((bearing(origin, Vec2::new(0.0, -10.0)) - 270.0).abs() < 1e-4);
    }

    #[test]
    fn angle_delta_takes_the_short_way_round() {
        assert!((angle_delta(350.0, 10.0) - 20.0).abs() < 1e-4);
        assert!((angle_delta(10.0, 350.0) + 20.0).abs() < 1e-4);
        assert!((angle_delta(0.0, 90.0) - 90.0).abs() < 1e-4);
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn guard_id_round_trips_through_bincode() {
        assert_round_trip(&GuardId::new(42));
    }

    #[test]
    fn guard_state_round_trips_through_bincode() {
        for state in GuardState::ALL {
            assert_round_trip(&state);
        }
    }

    #[test]
    fn session_phase_round_trips_through_bincode() {
        assert_round_trip(&SessionPhase::Extracting);
    }

    #[test]
    fn player_snapshot_round_trips_through_bincode() {
        let snapshot = PlayerSnapshot::at(Vec2::new(96.0, 160.0))
            .with_noise(2.5, MovementMode::Sprint);
        assert_round_trip(&snapshot);
    }
}
