#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state for Shadow Operative.
//!
//! The world owns the maze and the player. Guards never mutate it: they read
//! the maze through [`shadow_operative_core::WorldQuery`] and report catches
//! back as [`Command::CatchPlayer`].

mod maze;

use std::time::Duration;

use shadow_operative_core::{
    Command, Event, MovementMode, ObjectiveConfig, PlayerConfig, SessionPhase, Vec2, WorldQuery,
    WELCOME_BANNER,
};

pub use maze::{Maze, MazeError, DEFAULT_LAYOUT};

#[derive(Clone, Copy, Debug, Default)]
struct PlayerInput {
    heading: Vec2,
    mode: MovementMode,
}

#[derive(Clone, Copy, Debug)]
struct Player {
    position: Vec2,
    noise_level: f32,
    mode: MovementMode,
}

impl Player {
    const fn at(position: Vec2) -> Self {
        Self {
            position,
            noise_level: 0.0,
            mode: MovementMode::Walk,
        }
    }
}

/// Represents the authoritative Shadow Operative session state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    maze: Maze,
    player_config: PlayerConfig,
    objective_config: ObjectiveConfig,
    player: Player,
    input: PlayerInput,
    phase: SessionPhase,
    tick_index: u64,
}

impl World {
    /// Creates a session with the player standing on the maze start.
    #[must_use]
    pub fn new(maze: Maze, player_config: PlayerConfig, objective_config: ObjectiveConfig) -> Self {
        let player = Player::at(maze.start_position());
        Self {
            banner: WELCOME_BANNER,
            maze,
            player_config,
            objective_config,
            player,
            input: PlayerInput::default(),
            phase: SessionPhase::Infiltrating,
            tick_index: 0,
        }
    }

    fn reset(&mut self) {
        self.player = Player::at(self.maze.start_position());
        self.input = PlayerInput::default();
        self.phase = SessionPhase::Infiltrating;
        self.tick_index = 0;
    }

    fn speed_for(&self, mode: MovementMode) -> f32 {
        match mode {
            MovementMode::Sneak => self.player_config.sneak_speed,
            MovementMode::Walk => self.player_config.walk_speed,
            MovementMode::Sprint => self.player_config.sprint_speed,
        }
    }

    fn noise_multiplier(&self, mode: MovementMode) -> f32 {
        match mode {
            MovementMode::Sneak => self.player_config.sneak_multiplier,
            MovementMode::Walk => 1.0,
            MovementMode::Sprint => self.player_config.sprint_multiplier,
        }
    }

    fn advance_player(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let heading = if self.input.heading.is_finite() {
            self.input.heading.clamp_length_max(1.0)
        } else {
            Vec2::ZERO
        };
        let mode = self.input.mode;
        let step = heading * self.speed_for(mode) * dt.as_secs_f32();
        let radius = self.player_config.radius;

        let from = self.player.position;
        let mut position = from;
        let along_x = Vec2::new(position.x + step.x, position.y);
        if self.maze.is_valid_position(along_x, radius) {
            position = along_x;
        }
        let along_y = Vec2::new(position.x, position.y + step.y);
        if self.maze.is_valid_position(along_y, radius) {
            position = along_y;
        }

        self.player.mode = mode;
        if position == from {
            self.player.noise_level = 0.0;
            return;
        }

        self.player.position = position;
        self.player.noise_level =
            heading.length() * self.player_config.noise_base * self.noise_multiplier(mode);
        out_events.push(Event::PlayerMoved {
            from,
            to: position,
            noise_level: self.player.noise_level,
        });
    }

    fn resolve_objective(&mut self, out_events: &mut Vec<Event>) {
        let reach = self.objective_config.collect_radius;
        match self.phase {
            SessionPhase::Infiltrating
                if self.player.position.distance(self.maze.objective_position()) <= reach =>
            {
                self.phase = SessionPhase::Extracting;
                out_events.push(Event::ObjectiveCollected);
            }
            SessionPhase::Extracting
                if self.player.position.distance(self.maze.start_position()) <= reach =>
            {
                self.phase = SessionPhase::Escaped;
                out_events.push(Event::PlayerEscaped);
            }
            _ => {}
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.phase.is_terminal() && !matches!(command, Command::ResetSession) {
        return;
    }

    match command {
        Command::SetPlayerInput { heading, mode } => {
            world.input = PlayerInput { heading, mode };
        }
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
            world.advance_player(dt, out_events);
            world.resolve_objective(out_events);
        }
        Command::CatchPlayer { guard } => {
            world.phase = SessionPhase::Caught;
            out_events.push(Event::PlayerCaught { guard });
        }
        Command::ResetSession => {
            world.reset();
            out_events.push(Event::SessionReset);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Maze, World};
    use shadow_operative_core::{PlayerSnapshot, SessionPhase, Vec2};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the maze the session runs in.
    #[must_use]
    pub fn maze(world: &World) -> &Maze {
        &world.maze
    }

    /// Captures the player state handed to the guard AI.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        PlayerSnapshot::at(world.player.position)
            .with_noise(world.player.noise_level, world.player.mode)
    }

    /// Reports the progress of the session.
    #[must_use]
    pub fn phase(world: &World) -> SessionPhase {
        world.phase
    }

    /// World-space position of the objective.
    #[must_use]
    pub fn objective(world: &World) -> Vec2 {
        world.maze.objective_position()
    }

    /// Number of ticks processed since the session started or was reset.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shadow_operative_core::{GuardId, MazeConfig};

    const FRAME: Duration = Duration::from_millis(100);

    fn corridor_world() -> World {
        let maze = Maze::from_layout(
            "#######\n#S...E#\n#######",
            MazeConfig::default(),
        )
        .expect("corridor parses");
        World::new(maze, PlayerConfig::default(), ObjectiveConfig::default())
    }

    fn step(world: &mut World, heading: Vec2, mode: MovementMode) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, Command::SetPlayerInput { heading, mode }, &mut events);
        apply(world, Command::Tick { dt: FRAME }, &mut events);
        events
    }

    #[test]
    fn player_starts_on_the_start_cell() {
        let world = corridor_world();
        assert_eq!(query::player(&world).position, Vec2::new(96.0, 96.0));
        assert_eq!(query::phase(&world), SessionPhase::Infiltrating);
        assert_eq!(query::welcome_banner(&world), WELCOME_BANNER);
    }

    #[test]
    fn walking_moves_the_player_and_makes_noise() {
        let mut world = corridor_world();
        let events = step(&mut world, Vec2::X, MovementMode::Walk);

        let player = query::player(&world);
        assert!((player.position.x - 123.0).abs() < 1e-3);
        assert!((player.noise_level - 1.0).abs() < 1e-6);
        assert_eq!(events.first(), Some(&Event::TimeAdvanced { dt: FRAME }));
        assert!(matches!(events.get(1), Some(Event::PlayerMoved { .. })));
        assert_eq!(query::tick_index(&world), 1);
    }

    #[test]
    fn sneaking_is_quieter_than_sprinting() {
        let mut sneaking = corridor_world();
        let mut sprinting = corridor_world();
        let _ = step(&mut sneaking, Vec2::X, MovementMode::Sneak);
        let _ = step(&mut sprinting, Vec2::X, MovementMode::Sprint);

        let quiet = query::player(&sneaking).noise_level;
        let loud = query::player(&sprinting).noise_level;
        assert!(quiet > 0.0);
        assert!(quiet < loud);
    }

    #[test]
    fn standing_still_is_silent() {
        let mut world = corridor_world();
        let _ = step(&mut world, Vec2::X, MovementMode::Sprint);
        let events = step(&mut world, Vec2::ZERO, MovementMode::Sprint);

        assert_eq!(query::player(&world).noise_level, 0.0);
        assert_eq!(events, vec![Event::TimeAdvanced { dt: FRAME }]);
    }

    #[test]
    fn walls_stop_the_player() {
        let mut world = corridor_world();
        for _ in 0..20 {
            let _ = step(&mut world, Vec2::NEG_Y, MovementMode::Sprint);
        }
        let player = query::player(&world);
        let radius = PlayerConfig::default().radius;
        assert!(query::maze(&world).is_valid_position(player.position, radius));
        assert!(player.position.y >= 64.0 + radius);
    }

    #[test]
    fn collecting_and_returning_escapes() {
        let mut world = corridor_world();
        let mut collected = false;
        for _ in 0..100 {
            if step(&mut world, Vec2::X, MovementMode::Walk).contains(&Event::ObjectiveCollected) {
                collected = true;
                break;
            }
        }
        assert!(collected);
        assert_eq!(query::phase(&world), SessionPhase::Extracting);

        let mut escaped = false;
        for _ in 0..100 {
            if step(&mut world, Vec2::NEG_X, MovementMode::Walk).contains(&Event::PlayerEscaped) {
                escaped = true;
                break;
            }
        }
        assert!(escaped);
        assert_eq!(query::phase(&world), SessionPhase::Escaped);
    }

    #[test]
    fn caught_sessions_ignore_everything_but_reset() {
        let mut world = corridor_world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::CatchPlayer {
                guard: GuardId::new(3),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::PlayerCaught {
                guard: GuardId::new(3)
            }]
        );
        assert_eq!(query::phase(&world), SessionPhase::Caught);

        let ignored = step(&mut world, Vec2::X, MovementMode::Walk);
        assert!(ignored.is_empty());

        events.clear();
        apply(&mut world, Command::ResetSession, &mut events);
        assert_eq!(events, vec![Event::SessionReset]);
        assert_eq!(query::phase(&world), SessionPhase::Infiltrating);
        assert_eq!(query::tick_index(&world), 0);
    }

    #[test]
    fn non_finite_input_is_ignored() {
        let mut world = corridor_world();
        let events = step(&mut world, Vec2::new(f32::NAN, 1.0), MovementMode::Walk);
        assert_eq!(events, vec![Event::TimeAdvanced { dt: FRAME }]);
        assert_eq!(query::player(&world).position, Vec2::new(96.0, 96.0));
    }
}
