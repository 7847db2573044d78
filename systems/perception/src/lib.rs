#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Vision, hearing and catch checks evaluated fresh every tick.
//!
//! Alertness widens how far a guard sees and hears while narrowing its cone,
//! so an alarmed guard scans a longer, more focused wedge.

use shadow_operative_core::{
    angle_delta, bearing, AiConfig, HearingConfig, MovementMode, PlayerSnapshot, Vec2, VisionConfig,
    WorldQuery,
};

/// Pose and state of the guard doing the perceiving.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Observer {
    /// Position of the guard in world units.
    pub position: Vec2,
    /// Facing of the guard in degrees.
    pub facing: f32,
    /// Alertness in `[0, 1]`; values outside the range are clamped.
    pub alertness: f32,
}

/// Result of one perception pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Percept {
    /// The player stands inside the vision cone with a clear line of sight.
    pub visible: bool,
    /// The player's latest noise reached the guard.
    pub audible: bool,
}

/// Stateless perception model parameterised by configuration.
#[derive(Clone, Copy, Debug)]
pub struct Perception {
    vision: VisionConfig,
    hearing: HearingConfig,
    catch_radius: f32,
}

impl Perception {
    /// Creates a perception model from explicit settings.
    #[must_use]
    pub const fn new(vision: VisionConfig, hearing: HearingConfig, catch_radius: f32) -> Self {
        Self {
            vision,
            hearing,
            catch_radius,
        }
    }

    /// Creates a perception model from the guard AI configuration.
    #[must_use]
    pub const fn from_config(config: &AiConfig) -> Self {
        Self::new(config.vision, config.hearing, config.behavior.catch_radius)
    }

    /// Vision distance at the provided alertness.
    #[must_use]
    pub fn effective_vision_distance(&self, alertness: f32) -> f32 {
        let alertness = alertness.clamp(0.0, 1.0);
        self.vision.distance * (1.0 + (self.vision.alert_bonus - 1.0) * alertness)
    }

    /// Full vision cone angle in degrees at the provided alertness.
    #[must_use]
    pub fn effective_vision_angle(&self, alertness: f32) -> f32 {
        let alertness = alertness.clamp(0.0, 1.0);
        self.vision.angle / (1.0 + self.vision.alert_focus * alertness)
    }

    /// Hearing range for a gait at the provided alertness.
    #[must_use]
    pub fn hearing_range(&self, mode: MovementMode, alertness: f32) -> f32 {
        let base = match mode {
            MovementMode::Sneak => self.hearing.sneak_range,
            MovementMode::Walk => self.hearing.walk_range,
            MovementMode::Sprint => self.hearing.sprint_range,
        };
        base * (1.0 + alertness.clamp(0.0, 1.0))
    }

    /// Reports whether the observer sees the target point.
    #[must_use]
    pub fn can_see<W: WorldQuery>(&self, observer: &Observer, target: Vec2, world: &W) -> bool {
        let distance = observer.position.distance(target);
        if distance > self.effective_vision_distance(observer.alertness) {
            return false;
        }

        if distance > f32::EPSILON {
            let offset = angle_delta(observer.facing, bearing(observer.position, target));
            if offset.abs() > self.effective_vision_angle(observer.alertness) / 2.0 {
                return false;
            }
        }

        world.has_line_of_sight(observer.position, target)
    }

    /// Reports whether the player's latest noise reaches the observer.
    #[must_use]
    pub fn can_hear(&self, observer: &Observer, player: &PlayerSnapshot) -> bool {
        if !(player.noise_level > self.hearing.min_noise) {
            return false;
        }
        observer.position.distance(player.position)
            <= self.hearing_range(player.mode, observer.alertness)
    }

    /// Reports whether a guard at `guard` is close enough to catch the player.
    #[must_use]
    pub fn check_catch<W: WorldQuery>(&self, guard: Vec2, player: Vec2, world: &W) -> bool {
        guard.distance(player) < self.catch_radius && world.has_line_of_sight(guard, player)
    }

    /// Runs the vision and hearing checks for one tick.
    #[must_use]
    pub fn perceive<W: WorldQuery>(
        &self,
        observer: &Observer,
        player: &PlayerSnapshot,
        world: &W,
    ) -> Percept {
        Percept {
            visible: self.can_see(observer, player.position, world),
            audible: self.can_hear(observer, player),
        }
    }
}
