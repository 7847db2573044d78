use rand::{seq::SliceRandom, Rng};
use shadow_operative_core::{heading_vector, BehaviorConfig, CellCoord, Vec2, WorldQuery};

/// Cell distances probed along each axis when generating a route.
const AXIS_STEPS: [f32; 2] = [2.0, 4.0];

/// Directions probed in order: +x, +y, -x, -y.
const AXIS_DIRECTIONS: [Vec2; 4] = [Vec2::X, Vec2::Y, Vec2::NEG_X, Vec2::NEG_Y];

/// Cyclic list of points a guard walks while nothing is wrong.
#[derive(Clone, Debug)]
pub(crate) struct PatrolRoute {
    points: Vec<Vec2>,
    index: usize,
    generated: bool,
}

impl PatrolRoute {
    /// Uses supplied points when there are at least two of them, otherwise generates a route.
    pub(crate) fn new<W: WorldQuery, R: Rng>(
        supplied: Option<Vec<Vec2>>,
        spawn: Vec2,
        config: &BehaviorConfig,
        world: &W,
        rng: &mut R,
    ) -> Self {
        match supplied {
            Some(points) if points.len() >= 2 => Self {
                points,
                index: 0,
                generated: false,
            },
            _ => Self {
                points: generate_route(spawn, config, world, rng),
                index: 0,
                generated: true,
            },
        }
    }

    pub(crate) fn current(&self) -> Option<Vec2> {
        self.points.get(self.index).copied()
    }

    pub(crate) fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Moves to the next point; generated routes are rebuilt after a full cycle.
    pub(crate) fn advance<W: WorldQuery, R: Rng>(
        &mut self,
        spawn: Vec2,
        config: &BehaviorConfig,
        world: &W,
        rng: &mut R,
    ) {
        self.index += 1;
        if self.index < self.points.len() {
            return;
        }

        self.index = 0;
        if self.generated {
            self.points = generate_route(spawn, config, world, rng);
        }
    }
}

/// Builds a patrol route around `spawn`.
///
/// Candidates are the points two and four cells away along each axis plus
/// random offsets within the configured band; invalid candidates are dropped
/// and the survivors are shuffled and capped. When fewer than two points
/// remain the route falls back to the spawn and its open neighbouring cells.
pub(crate) fn generate_route<W: WorldQuery, R: Rng>(
    spawn: Vec2,
    config: &BehaviorConfig,
    world: &W,
    rng: &mut R,
) -> Vec<Vec2> {
    let cell_size = world.cell_size();
    let radius = config.body_radius;
    let count = config.patrol_point_count.max(2);

    let mut candidates: Vec<Vec2> = AXIS_DIRECTIONS
        .iter()
        .flat_map(|direction| {
            AXIS_STEPS
                .iter()
                .map(move |steps| spawn + *direction * cell_size * *steps)
        })
        .filter(|point| world.is_valid_position(*point, radius))
        .collect();

    for _ in 0..count {
        let angle = rng.gen_range(0.0..360.0);
        let distance = sample_between(rng, config.patrol_min_offset, config.patrol_max_offset);
        let point = spawn + heading_vector(angle) * distance;
        if world.is_valid_position(point, radius) {
            candidates.push(point);
        }
    }

    candidates.shuffle(rng);
    candidates.truncate(count);
    if candidates.len() >= 2 {
        return candidates;
    }

    default_route(spawn, radius, world)
}

fn default_route<W: WorldQuery>(spawn: Vec2, radius: f32, world: &W) -> Vec<Vec2> {
    let cell_size = world.cell_size();
    let cell = CellCoord::containing(spawn, cell_size);
    let mut route = vec![spawn];
    route.extend(
        world
            .neighbors(cell, false)
            .into_iter()
            .map(|neighbor| neighbor.center(cell_size))
            .filter(|point| world.is_valid_position(*point, radius)),
    );
    route
}

/// Uniform sample in `[low, high]`, collapsing to `low` for empty ranges.
pub(crate) fn sample_between<R: Rng>(rng: &mut R, low: f32, high: f32) -> f32 {
    if high > low {
        rng.gen_range(low..=high)
    } else {
        low
    }
}
