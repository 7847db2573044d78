use std::{fmt, time::Duration};

use shadow_operative_core::{
    AiConfig, Command, Event, GameConfig, GuardId, GuardState, MovementMode, SessionPhase,
    SpawnConfig,
};
use shadow_operative_system_guards::Guards;
use shadow_operative_system_spawning::Spawning;
use shadow_operative_world::{self as world, query, Maze, World};
use tracing::info;

use crate::Autopilot;

/// How a session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The player brought the objective back to the start.
    Escaped,
    /// A guard caught the player.
    Caught {
        /// Guard credited with the catch.
        guard: GuardId,
    },
    /// The tick limit was reached first.
    TimedOut,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Escaped => write!(f, "escaped"),
            Self::Caught { guard } => write!(f, "caught by guard {}", guard.get()),
            Self::TimedOut => write!(f, "timed out"),
        }
    }
}

/// Summary of a finished session.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    /// How the session ended.
    pub outcome: Outcome,
    /// Ticks simulated.
    pub ticks: u64,
    /// Whether the objective was picked up at some point.
    pub objective_collected: bool,
    /// Number of guards at the end of the session, reinforcements included.
    pub guards: usize,
    /// Guard-ticks spent in each state, in [`GuardState::ALL`] order.
    pub state_ticks: [(GuardState, u64); 4],
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "outcome: {} after {} ticks", self.outcome, self.ticks)?;
        writeln!(f, "objective collected: {}", self.objective_collected)?;
        write!(f, "guards: {}", self.guards)?;
        for (state, ticks) in self.state_ticks {
            write!(f, "\n  {:<12}{ticks}", state.label())?;
        }
        Ok(())
    }
}

/// Headless session: the world, its guards and an autopilot player.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    guards: Guards,
    autopilot: Autopilot,
    ai: AiConfig,
    spawning: SpawnConfig,
    spawner: Spawning,
    mode: MovementMode,
    dt: Duration,
    collected: bool,
    reinforced: bool,
    state_ticks: [(GuardState, u64); 4],
}

impl Simulation {
    /// Creates a session on `maze` and deploys guards with `config.spawning`.
    #[must_use]
    pub fn new(maze: Maze, config: &GameConfig, mode: MovementMode, dt: Duration) -> Self {
        let mut spawner = Spawning::new(config.spawning);
        let guards = spawner.populate(maze.start_position(), &config.ai, &maze);
        Self {
            world: World::new(maze, config.player, config.objective),
            guards,
            autopilot: Autopilot::new(config.ai.pathfinding, config.player, mode),
            ai: config.ai,
            spawning: config.spawning,
            spawner,
            mode,
            dt,
            collected: false,
            reinforced: false,
            state_ticks: GuardState::ALL.map(|state| (state, 0)),
        }
    }

    /// Replaces the deployed guards.
    #[must_use]
    pub fn with_guards(mut self, guards: Guards) -> Self {
        self.guards = guards;
        self
    }

    /// Session state.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Deployed guards.
    #[must_use]
    pub const fn guards(&self) -> &Guards {
        &self.guards
    }

    /// Restarts the session and redeploys guards from `seed`.
    ///
    /// Reinforcements become available again.
    pub fn reset(&mut self, seed: u64) {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::ResetSession, &mut events);

        let maze = query::maze(&self.world);
        self.spawner = Spawning::new(SpawnConfig {
            seed,
            ..self.spawning
        });
        self.guards = self.spawner.populate(maze.start_position(), &self.ai, maze);
        self.autopilot.reset();
        self.collected = false;
        self.reinforced = false;
        self.state_ticks = GuardState::ALL.map(|state| (state, 0));
    }

    /// Advances the session by one tick and returns every event it produced.
    ///
    /// The first objective pickup calls in reinforcements.
    pub fn step(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        let maze = query::maze(&self.world);
        let player = query::player(&self.world);
        let goal = match query::phase(&self.world) {
            SessionPhase::Extracting => maze.start_position(),
            _ => maze.objective_position(),
        };
        let heading = self.autopilot.heading(player.position, goal, maze, self.dt);

        world::apply(
            &mut self.world,
            Command::SetPlayerInput {
                heading,
                mode: self.mode,
            },
            &mut events,
        );
        world::apply(&mut self.world, Command::Tick { dt: self.dt }, &mut events);

        let mut commands = Vec::new();
        self.guards.handle(
            &events,
            &query::player(&self.world),
            query::maze(&self.world),
            &mut commands,
        );
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }

        for (tally, (_, count)) in self.state_ticks.iter_mut().zip(self.guards.state_counts()) {
            tally.1 += count as u64;
        }
        if events.contains(&Event::ObjectiveCollected) {
            self.collected = true;
            if !self.reinforced {
                self.reinforced = true;
                let player = query::player(&self.world).position;
                let _ = self
                    .spawner
                    .reinforce(&mut self.guards, player, &self.ai, query::maze(&self.world));
            }
        }
        events
    }

    /// Runs until the session ends or `max_ticks` ticks have elapsed.
    pub fn run(&mut self, max_ticks: u64) -> Report {
        let mut outcome = Outcome::TimedOut;
        let mut ticks = 0;
        while ticks < max_ticks {
            let events = self.step();
            ticks += 1;
            if let Some(ended) = events.iter().find_map(|event| match event {
                Event::PlayerEscaped => Some(Outcome::Escaped),
                Event::PlayerCaught { guard } => Some(Outcome::Caught { guard: *guard }),
                _ => None,
            }) {
                outcome = ended;
                break;
            }
        }

        info!(%outcome, ticks, "session finished");
        Report {
            outcome,
            ticks,
            objective_collected: self.collected,
            guards: self.guards.len(),
            state_ticks: self.state_ticks,
        }
    }
}
