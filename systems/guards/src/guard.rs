use std::{collections::VecDeque, time::Duration};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use shadow_operative_core::{
    bearing, AiConfig, Body, GuardId, GuardState, PlayerSnapshot, Signal, Vec2, WorldQuery,
};
use shadow_operative_system_movement::Steering;
use shadow_operative_system_pathfinding::{corridor_is_clear, Pathfinder};
use shadow_operative_system_perception::{Observer, Perception};
use tracing::{debug, trace};

use crate::{patrol::PatrolRoute, search::search_ring, GuardSnapshot};

/// Share of the expected step below which a patrolling guard counts as stalled.
const STALL_FRACTION: f32 = 0.1;

/// A single guard: perception, behaviour state machine and movement.
#[derive(Debug)]
pub struct Guard {
    id: GuardId,
    spawn: Vec2,
    body: Body,
    state: GuardState,
    alertness: f32,
    last_known: Option<Vec2>,
    focus: Option<Vec2>,
    search_points: VecDeque<Vec2>,
    path: VecDeque<Vec2>,
    path_goal: Option<Vec2>,
    since_replan: f32,
    state_elapsed: f32,
    since_sighting: f32,
    stuck_for: f32,
    patrol: PatrolRoute,
    rng: ChaCha8Rng,
    config: AiConfig,
    pathfinder: Pathfinder,
    perception: Perception,
    steering: Steering,
}

impl Guard {
    /// Creates a patrolling guard at `spawn`.
    ///
    /// Routes with fewer than two points, or no route at all, are replaced
    /// by one generated around the spawn. `seed` drives every random choice
    /// the guard makes, so equal seeds give equal behaviour.
    pub fn new<W: WorldQuery>(
        id: GuardId,
        spawn: Vec2,
        patrol_points: Option<Vec<Vec2>>,
        config: &AiConfig,
        seed: u64,
        world: &W,
    ) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let patrol = PatrolRoute::new(patrol_points, spawn, &config.behavior, world, &mut rng);
        let mut body = Body::new(spawn, config.behavior.body_radius);
        if let Some(first) = patrol.current().filter(|point| *point != spawn) {
            body.facing = bearing(spawn, first);
        }

        Self {
            id,
            spawn,
            body,
            state: GuardState::Patrol,
            alertness: 0.0,
            last_known: None,
            focus: None,
            search_points: VecDeque::new(),
            path: VecDeque::new(),
            path_goal: None,
            since_replan: config.behavior.path_refresh_interval,
            state_elapsed: 0.0,
            since_sighting: 0.0,
            stuck_for: 0.0,
            patrol,
            rng,
            config: *config,
            pathfinder: Pathfinder::new(config.pathfinding, config.behavior.body_radius),
            perception: Perception::from_config(config),
            steering: Steering::new(config.steering),
        }
    }

    /// Identifier of the guard.
    #[must_use]
    pub const fn id(&self) -> GuardId {
        self.id
    }

    /// Current position in world units.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.body.position
    }

    /// Current facing in degrees.
    #[must_use]
    pub const fn facing(&self) -> f32 {
        self.body.facing
    }

    /// Behaviour currently executing.
    #[must_use]
    pub const fn state(&self) -> GuardState {
        self.state
    }

    /// Alertness in `[0, 1]`.
    #[must_use]
    pub const fn alertness(&self) -> f32 {
        self.alertness
    }

    /// Where the player was last seen or heard, if ever.
    #[must_use]
    pub const fn last_known_position(&self) -> Option<Vec2> {
        self.last_known
    }

    /// Points of the patrol route in visiting order.
    #[must_use]
    pub fn patrol_route(&self) -> &[Vec2] {
        self.patrol.points()
    }

    /// Remaining waypoints of the active path.
    pub fn path(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.path.iter().copied()
    }

    /// Remaining points of the current investigation or search sweep.
    pub fn search_points(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.search_points.iter().copied()
    }

    /// Read-only view used by renderers and adapters.
    #[must_use]
    pub fn snapshot(&self) -> GuardSnapshot {
        GuardSnapshot {
            id: self.id,
            position: self.body.position,
            facing: self.body.facing,
            state: self.state,
            alertness: self.alertness,
            vision_distance: self.perception.effective_vision_distance(self.alertness),
            vision_angle: self.perception.effective_vision_angle(self.alertness),
        }
    }

    /// Advances the guard by `dt`.
    ///
    /// Returns [`Signal::Caught`] when the guard ends the tick close enough to
    /// the player with a clear line of sight.
    pub fn update<W: WorldQuery>(
        &mut self,
        player: &PlayerSnapshot,
        world: &W,
        dt: Duration,
    ) -> Option<Signal> {
        let seconds = dt.as_secs_f32();
        self.since_replan += seconds;

        let percept = self.perception.perceive(&self.observer(), player, world);
        if percept.visible {
            self.on_sighting(player.position);
        } else if percept.audible && self.state != GuardState::Chase {
            self.on_noise(player.position);
        }
        self.update_alertness(seconds);

        match self.state {
            GuardState::Patrol => self.patrol_step(world, dt),
            GuardState::Chase => self.chase_step(percept.visible, world, dt),
            GuardState::Investigate | GuardState::Search => self.sweep_step(world, dt),
        }

        let guard = self.body.position;
        if self.perception.check_catch(guard, player.position, world) {
            debug!(
                guard = self.id.get(),
                state = self.state.label(),
                "player caught"
            );
            return Some(Signal::Caught);
        }
        None
    }

    fn observer(&self) -> Observer {
        Observer {
            position: self.body.position,
            facing: self.body.facing,
            alertness: self.alertness,
        }
    }

    fn on_sighting(&mut self, player: Vec2) {
        self.last_known = Some(player);
        self.since_sighting = 0.0;
        let floor = self.config.behavior.alertness_on_sighting;
        self.alertness = self.alertness.max(floor).clamp(0.0, 1.0);
        self.transition(GuardState::Chase);
    }

    fn on_noise(&mut self, source: Vec2) {
        let behavior = self.config.behavior;
        let floor = behavior.alertness_on_noise;
        self.alertness = self.alertness.max(floor).clamp(0.0, 1.0);
        self.last_known = Some(source);

        let reach = behavior.arrival_radius;
        let fresh_lead = self.state != GuardState::Investigate
            || self
                .focus
                .map_or(true, |focus| focus.distance(source) > reach);
        if !fresh_lead {
            return;
        }

        self.transition(GuardState::Investigate);
        self.focus = Some(source);
        self.search_points.clear();
        self.state_elapsed = 0.0;
    }

    fn update_alertness(&mut self, seconds: f32) {
        let behavior = &self.config.behavior;
        let next = if self.state == GuardState::Chase {
            self.alertness + behavior.alertness_gain * seconds
        } else {
            self.alertness - behavior.alertness_decay * seconds
        };
        self.alertness = next.clamp(0.0, 1.0);
    }

    fn patrol_step<W: WorldQuery>(&mut self, world: &W, dt: Duration) {
        let Some(target) = self.patrol.current() else {
            return;
        };
        let seconds = dt.as_secs_f32();
        let speed = self.config.speeds.patrol;
        let before = self.body.position;

        let arrived = self.travel(target, speed, world, dt);
        if !arrived && self.body.position.distance(before) < speed * seconds * STALL_FRACTION {
            self.stuck_for += seconds;
        } else {
            self.stuck_for = 0.0;
        }

        if arrived || self.stuck_for >= self.config.behavior.stuck_timeout {
            if !arrived {
                debug!(
                    guard = self.id.get(),
                    ?target,
                    "patrol stalled, skipping point"
                );
            }
            let (spawn, behavior) = (self.spawn, self.config.behavior);
            self.patrol.advance(spawn, &behavior, world, &mut self.rng);
            self.stuck_for = 0.0;
            self.clear_path();
        }
    }

    fn chase_step<W: WorldQuery>(&mut self, visible: bool, world: &W, dt: Duration) {
        let Some(target) = self.last_known else {
            self.transition(GuardState::Patrol);
            return;
        };
        let arrival_radius = self.config.behavior.arrival_radius;

        if !visible {
            self.since_sighting += dt.as_secs_f32();
            if self.body.position.distance(target) <= arrival_radius {
                self.begin_investigation(target, world);
                return;
            }
            if self.since_sighting >= self.config.behavior.chase_memory {
                debug!(guard = self.id.get(), "lost the player");
                self.transition(GuardState::Patrol);
                return;
            }
        }

        let arrived = self.travel(target, self.config.speeds.chase, world, dt);
        if arrived && !visible {
            if self.body.position.distance(target) <= arrival_radius {
                self.begin_investigation(target, world);
            } else {
                debug!(guard = self.id.get(), "pursuit blocked");
                self.transition(GuardState::Patrol);
            }
        }
    }

    fn begin_investigation<W: WorldQuery>(&mut self, center: Vec2, world: &W) {
        self.transition(GuardState::Investigate);
        self.search_points = search_ring(center, &self.config.behavior, world, &mut self.rng);
        if self.search_points.is_empty() {
            self.finish_sweep(world);
        }
    }

    fn sweep_step<W: WorldQuery>(&mut self, world: &W, dt: Duration) {
        self.state_elapsed += dt.as_secs_f32();
        let behavior = self.config.behavior;
        let (limit, speed) = if self.state == GuardState::Investigate {
            (behavior.investigation_time, self.config.speeds.alert)
        } else {
            (behavior.search_time, self.config.speeds.search)
        };
        if self.state_elapsed >= limit {
            self.finish_sweep(world);
            return;
        }

        if let Some(focus) = self.focus {
            let arrived = self.travel(focus, speed, world, dt);
            if arrived || self.body.position.distance(focus) <= behavior.arrival_radius {
                self.focus = None;
                self.clear_path();
                self.search_points = search_ring(focus, &behavior, world, &mut self.rng);
                if self.search_points.is_empty() {
                    self.finish_sweep(world);
                }
            }
            return;
        }

        let Some(point) = self.search_points.front().copied() else {
            self.finish_sweep(world);
            return;
        };
        if self.travel(point, speed, world, dt) {
            let _ = self.search_points.pop_front();
            self.clear_path();
            if self.search_points.is_empty() {
                self.finish_sweep(world);
            }
        }
    }

    fn finish_sweep<W: WorldQuery>(&mut self, world: &W) {
        let escalate = self.state == GuardState::Investigate
            && self.alertness >= self.config.behavior.search_alertness;
        if !escalate {
            self.transition(GuardState::Patrol);
            return;
        }

        self.transition(GuardState::Search);
        self.search_points = search_ring(
            self.body.position,
            &self.config.behavior,
            world,
            &mut self.rng,
        );
        if self.search_points.is_empty() {
            self.transition(GuardState::Patrol);
        }
    }

    /// Moves toward `goal`, following a planned path when the way is not clear.
    ///
    /// Returns `true` once the goal is reached or the body cannot move at all.
    fn travel<W: WorldQuery>(&mut self, goal: Vec2, speed: f32, world: &W, dt: Duration) -> bool {
        let radius = self.body.radius;
        if corridor_is_clear(world, self.body.position, goal, radius) {
            self.path.clear();
            self.path_goal = None;
            return self
                .steering
                .move_toward(&mut self.body, goal, world, speed, dt);
        }

        let arrival_radius = self.config.behavior.arrival_radius;
        let stale = self.path.is_empty()
            || self
                .path_goal
                .map_or(true, |planned| planned.distance(goal) > arrival_radius);
        if stale && self.since_replan >= self.config.behavior.path_refresh_interval {
            self.replan(goal, world);
        }

        while let Some(next) = self.path.get(1).copied() {
            if !corridor_is_clear(world, self.body.position, next, radius) {
                break;
            }
            let _ = self.path.pop_front();
        }

        match self.path.front().copied() {
            Some(waypoint) => {
                if self
                    .steering
                    .move_toward(&mut self.body, waypoint, world, speed, dt)
                {
                    let _ = self.path.pop_front();
                }
                false
            }
            None => self
                .steering
                .move_toward(&mut self.body, goal, world, speed, dt),
        }
    }

    fn replan<W: WorldQuery>(&mut self, goal: Vec2, world: &W) {
        let plan = self.pathfinder.plan(self.body.position, goal, world);
        trace!(
            guard = self.id.get(),
            outcome = ?plan.outcome(),
            expanded = plan.expanded(),
            "replanned"
        );
        self.path = plan.into_waypoints().into();
        self.path_goal = Some(goal);
        self.since_replan = 0.0;
    }

    fn clear_path(&mut self) {
        self.path.clear();
        self.path_goal = None;
        self.since_replan = self.config.behavior.path_refresh_interval;
    }

    fn transition(&mut self, next: GuardState) {
        if self.state == next {
            return;
        }
        debug!(
            guard = self.id.get(),
            from = self.state.label(),
            to = next.label(),
            alertness = self.alertness,
            "guard state changed"
        );
        self.state = next;
        self.state_elapsed = 0.0;
        self.stuck_for = 0.0;
        self.focus = None;
        self.search_points.clear();
        self.clear_path();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Open ground bounded by a wall at `x = 100`, with unobstructed sight.
    struct Ledge;

    impl WorldQuery for Ledge {
        fn cell_size(&self) -> f32 {
            64.0
        }

        fn is_wall(&self, point: Vec2) -> bool {
            point.x > 100.0
        }

        fn is_valid_position(&self, point: Vec2, _radius: f32) -> bool {
            !self.is_wall(point)
        }

        fn has_line_of_sight(&self, _from: Vec2, _to: Vec2) -> bool {
            true
        }
    }

    /// Open ground where nothing is ever in sight, so every move is planned.
    struct Fog;

    impl WorldQuery for Fog {
        fn cell_size(&self) -> f32 {
            64.0
        }

        fn is_wall(&self, _point: Vec2) -> bool {
            false
        }

        fn is_valid_position(&self, _point: Vec2, _radius: f32) -> bool {
            true
        }

        fn has_line_of_sight(&self, _from: Vec2, _to: Vec2) -> bool {
            false
        }
    }

    fn distant_player() -> PlayerSnapshot {
        PlayerSnapshot::at(Vec2::splat(-10_000.0))
    }

    #[test]
    fn stalled_patrol_skips_its_point_after_the_timeout() {
        let config = AiConfig::default();
        let spawn = Vec2::new(100.0, 0.0);
        let beyond_wall = Vec2::new(300.0, 1.0);
        let fallback = Vec2::new(100.0, -50.0);
        let mut guard = Guard::new(
            GuardId::new(0),
            spawn,
            Some(vec![beyond_wall, fallback]),
            &config,
            1,
            &Ledge,
        );
        let tick = Duration::from_millis(100);

        for ticks in 1..=15 {
            assert_eq!(guard.update(&distant_player(), &Ledge, tick), None);
            assert_eq!(guard.patrol.current(), Some(beyond_wall));
            assert!((guard.stuck_for - 0.1 * ticks as f32).abs() < 1e-4);
        }
        assert!(guard.position().distance(spawn) < 2.0);

        for _ in 16..=22 {
            let _ = guard.update(&distant_player(), &Ledge, tick);
        }
        assert_eq!(guard.patrol.current(), Some(fallback));
        assert_eq!(guard.stuck_for, 0.0);
        assert_eq!(guard.state(), GuardState::Patrol);
    }

    #[test]
    fn chase_replans_at_most_once_per_refresh_interval() {
        let mut config = AiConfig::default();
        config.behavior.chase_memory = 100.0;
        config.behavior.path_refresh_interval = 1.0;
        let mut guard = Guard::new(GuardId::new(0), Vec2::ZERO, None, &config, 1, &Fog);
        guard.state = GuardState::Chase;
        let tick = Duration::from_millis(250);

        let mut replanned = Vec::new();
        for ticks in 1..=12 {
            // The lead moves further than the arrival radius every tick.
            guard.last_known = Some(Vec2::new(640.0 + 50.0 * ticks as f32, 0.0));
            let _ = guard.update(&distant_player(), &Fog, tick);
            assert_eq!(guard.state(), GuardState::Chase);
            if guard.since_replan == 0.0 {
                replanned.push(ticks);
            }
        }

        assert_eq!(replanned, vec![1, 5, 9]);
        assert!(guard.path().next().is_some());
    }

    #[test]
    fn chasing_raises_alertness_up_to_one() {
        let config = AiConfig::default();
        let mut guard = Guard::new(GuardId::new(0), Vec2::ZERO, None, &config, 1, &Fog);
        guard.state = GuardState::Chase;
        guard.alertness = 0.9;

        guard.update_alertness(0.1);
        assert!((guard.alertness() - 0.95).abs() < 1e-5);
        guard.update_alertness(0.1);
        assert!((guard.alertness() - 1.0).abs() < 1e-5);
        guard.update_alertness(0.1);
        assert_eq!(guard.alertness(), 1.0);
    }

    #[test]
    fn calm_states_let_alertness_decay_to_zero() {
        let config = AiConfig::default();
        let mut guard = Guard::new(GuardId::new(0), Vec2::ZERO, None, &config, 1, &Fog);
        guard.alertness = 0.5;

        guard.update_alertness(1.0);
        assert!((guard.alertness() - 0.45).abs() < 1e-5);

        guard.alertness = 0.01;
        guard.update_alertness(1.0);
        assert_eq!(guard.alertness(), 0.0);

        guard.state = GuardState::Search;
        guard.alertness = 0.2;
        guard.update_alertness(2.0);
        assert!((guard.alertness() - 0.1).abs() < 1e-5);
    }
}
