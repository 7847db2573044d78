#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bounded steering that moves a body toward a point without entering walls.

use std::time::Duration;

use shadow_operative_core::{
    angle_delta, bearing, heading_vector, normalize_degrees, Body, SteeringConfig, Vec2, WorldQuery,
};

/// Steering primitive shared by every guard.
#[derive(Clone, Copy, Debug)]
pub struct Steering {
    config: SteeringConfig,
}

impl Steering {
    /// Creates a steering primitive with the provided tolerances.
    #[must_use]
    pub const fn new(config: SteeringConfig) -> Self {
        Self { config }
    }

    /// Moves `body` at most `speed * dt` toward `target`.
    ///
    /// Returns `true` once the body is within the arrival tolerance, and also
    /// when every fallback direction is blocked so callers can move on.
    pub fn move_toward<W: WorldQuery>(
        &self,
        body: &mut Body,
        target: Vec2,
        world: &W,
        speed: f32,
        dt: Duration,
    ) -> bool {
        let offset = target - body.position;
        let remaining = offset.length();
        if !remaining.is_finite() || remaining <= self.config.arrival_tolerance {
            return true;
        }

        let step = (speed * dt.as_secs_f32()).min(remaining);
        if step <= 0.0 {
            return false;
        }

        let direction = offset / remaining;
        match self.resolve_step(body, direction * step, world) {
            Some(next) => {
                self.turn_toward(body, bearing(body.position, next), dt);
                body.position = next;
                false
            }
            None => true,
        }
    }

    /// Rotates the body's facing a bounded fraction of the way toward `heading`.
    pub fn turn_toward(&self, body: &mut Body, heading: f32, dt: Duration) {
        let blend = (self.config.turn_rate * dt.as_secs_f32()).clamp(0.0, 1.0);
        body.facing = normalize_degrees(body.facing + angle_delta(body.facing, heading) * blend);
    }

    fn resolve_step<W: WorldQuery>(&self, body: &Body, delta: Vec2, world: &W) -> Option<Vec2> {
        let origin = body.position;
        let step = delta.length();

        let direct = origin + delta;
        let along_x = origin + Vec2::new(delta.x, 0.0);
        let along_y = origin + Vec2::new(0.0, delta.y);
        let probes = self
            .config
            .probe_angles
            .iter()
            .map(|angle| origin + heading_vector(body.facing + angle) * step);

        [direct, along_x, along_y]
            .into_iter()
            .filter(|candidate| *candidate != origin)
            .chain(probes)
            .find(|candidate| world.is_valid_position(*candidate, body.radius))
    }
}
