use std::{collections::VecDeque, time::Duration};

use shadow_operative_core::{MovementMode, PathfindingConfig, PlayerConfig, Vec2, WorldQuery};
use shadow_operative_system_pathfinding::Pathfinder;

/// Ticks without progress before the autopilot discards its route.
const STALL_TICKS: u32 = 8;

/// Distance under which a waypoint counts as reached.
const WAYPOINT_REACH: f32 = 0.5;

/// Scripted player that walks the shortest route toward a goal.
#[derive(Debug)]
pub struct Autopilot {
    pathfinder: Pathfinder,
    speed: f32,
    route: VecDeque<Vec2>,
    goal: Option<Vec2>,
    last_position: Option<Vec2>,
    stalled: u32,
}

impl Autopilot {
    /// Creates an autopilot planning for a player body moving with `mode`.
    #[must_use]
    pub fn new(pathfinding: PathfindingConfig, player: PlayerConfig, mode: MovementMode) -> Self {
        let speed = match mode {
            MovementMode::Sneak => player.sneak_speed,
            MovementMode::Walk => player.walk_speed,
            MovementMode::Sprint => player.sprint_speed,
        };
        // Player collision tests a square; plan for its circumscribed circle.
        let clearance = player.radius * std::f32::consts::SQRT_2;
        Self {
            pathfinder: Pathfinder::new(pathfinding, clearance),
            speed,
            route: VecDeque::new(),
            goal: None,
            last_position: None,
            stalled: 0,
        }
    }

    /// Forgets the current route so the next call plans from scratch.
    pub fn reset(&mut self) {
        self.route.clear();
        self.goal = None;
        self.last_position = None;
        self.stalled = 0;
    }

    /// Remaining waypoints of the current route.
    pub fn route(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.route.iter().copied()
    }

    /// Movement input that brings the player at `position` closer to `goal` within one tick.
    ///
    /// The returned heading never exceeds unit length and is shortened so the
    /// player stops on a waypoint instead of overshooting it.
    pub fn heading<W: WorldQuery>(
        &mut self,
        position: Vec2,
        goal: Vec2,
        world: &W,
        dt: Duration,
    ) -> Vec2 {
        if self.last_position == Some(position) {
            self.stalled += 1;
        } else {
            self.stalled = 0;
        }
        self.last_position = Some(position);

        if self.goal != Some(goal) || self.stalled >= STALL_TICKS {
            self.route = self.pathfinder.find_path(position, goal, world).into();
            self.goal = Some(goal);
            self.stalled = 0;
        }

        while self
            .route
            .front()
            .is_some_and(|waypoint| waypoint.distance(position) <= WAYPOINT_REACH)
        {
            let _ = self.route.pop_front();
        }

        let target = self.route.front().copied().unwrap_or(goal);
        let reach = self.speed * dt.as_secs_f32();
        if reach <= 0.0 {
            return Vec2::ZERO;
        }
        ((target - position) / reach).clamp_length_max(1.0)
    }
}
