use std::collections::VecDeque;

use rand::Rng;
use shadow_operative_core::{heading_vector, BehaviorConfig, Vec2, WorldQuery};

use crate::patrol::sample_between;

/// Corners of the fallback square, in visiting order.
const SQUARE_CORNERS: [Vec2; 4] = [
    Vec2::new(1.0, 1.0),
    Vec2::new(1.0, -1.0),
    Vec2::new(-1.0, -1.0),
    Vec2::new(-1.0, 1.0),
];

/// Points swept around `center`, one every `search_step_degrees`.
///
/// Each point sits at a random radius in the configured band; invalid points
/// are dropped. If none survive, a small square around the centre is tried.
/// The result is empty only when the square is blocked too.
pub(crate) fn search_ring<W: WorldQuery, R: Rng>(
    center: Vec2,
    config: &BehaviorConfig,
    world: &W,
    rng: &mut R,
) -> VecDeque<Vec2> {
    let outer = config.search_radius;
    let inner = outer * config.search_inner_ratio;
    let step = config.search_step_degrees.max(1.0);

    let mut points = VecDeque::new();
    let mut angle = 0.0_f32;
    while angle < 360.0 {
        let radius = sample_between(rng, inner, outer);
        let point = center + heading_vector(angle) * radius;
        if world.is_valid_position(point, config.body_radius) {
            points.push_back(point);
        }
        angle += step;
    }

    if points.is_empty() {
        points.extend(square_pattern(center, config.body_radius, world));
    }
    points
}

fn square_pattern<W: WorldQuery>(
    center: Vec2,
    radius: f32,
    world: &W,
) -> impl Iterator<Item = Vec2> + '_ {
    let half = world.cell_size() / 2.0;
    SQUARE_CORNERS
        .into_iter()
        .map(move |corner| center + corner * half)
        .filter(move |point| world.is_valid_position(*point, radius))
}
