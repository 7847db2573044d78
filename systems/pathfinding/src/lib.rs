#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bounded grid A* used by guards to reach players, noises and patrol points.
//!
//! Plans are computed on cell centres and returned in world units. A plan
//! never fails: when the goal cannot be reached within the expansion budget
//! the caller receives a partial path toward the most promising cell, or an
//! empty path when nothing beyond the start was explored.

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashMap, HashSet},
};

use shadow_operative_core::{CellCoord, PathfindingConfig, Vec2, WorldQuery};
use tracing::{debug, trace};

/// How a plan reached its waypoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PathOutcome {
    /// The goal shares the start cell or lies in a clear straight corridor.
    Direct,
    /// A* reached the goal cell.
    Found,
    /// The search stopped early; waypoints lead toward the goal.
    Partial,
    /// Nothing beyond the start cell could be explored.
    Unreachable,
}

/// Waypoints produced for a single request together with search statistics.
#[derive(Clone, Debug, PartialEq)]
pub struct PathPlan {
    waypoints: Vec<Vec2>,
    expanded: usize,
    outcome: PathOutcome,
}

impl PathPlan {
    /// World-space waypoints ordered from the start toward the goal.
    #[must_use]
    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    /// Consumes the plan and returns its waypoints.
    #[must_use]
    pub fn into_waypoints(self) -> Vec<Vec2> {
        self.waypoints
    }

    /// Number of cells expanded by the search.
    #[must_use]
    pub const fn expanded(&self) -> usize {
        self.expanded
    }

    /// How the plan was obtained.
    #[must_use]
    pub const fn outcome(&self) -> PathOutcome {
        self.outcome
    }
}

/// Grid A* planner configured for one body size.
#[derive(Clone, Copy, Debug)]
pub struct Pathfinder {
    config: PathfindingConfig,
    body_radius: f32,
}

impl Pathfinder {
    /// Creates a planner for bodies of the provided radius.
    #[must_use]
    pub const fn new(config: PathfindingConfig, body_radius: f32) -> Self {
        Self {
            config,
            body_radius,
        }
    }

    /// Plans a path and returns only its waypoints; the result may be empty.
    #[must_use]
    pub fn find_path<W: WorldQuery>(&self, start: Vec2, end: Vec2, world: &W) -> Vec<Vec2> {
        self.plan(start, end, world).into_waypoints()
    }

    /// Plans a path from `start` to `end` and reports how it was obtained.
    #[must_use]
    pub fn plan<W: WorldQuery>(&self, start: Vec2, end: Vec2, world: &W) -> PathPlan {
        let cell_size = world.cell_size();
        let start_cell = CellCoord::containing(start, cell_size);
        let goal_cell = CellCoord::containing(end, cell_size);

        if start_cell == goal_cell
            || (self.config.direct_path && corridor_is_clear(world, start, end, self.body_radius))
        {
            return PathPlan {
                waypoints: vec![end],
                expanded: 0,
                outcome: PathOutcome::Direct,
            };
        }

        let search = self.search(start_cell, goal_cell, world);
        let (target, outcome) = match search.termination {
            Termination::Reached => (goal_cell, PathOutcome::Found),
            Termination::BudgetExhausted(last) => (last, PathOutcome::Partial),
            Termination::Exhausted(closest) => (closest, PathOutcome::Partial),
        };

        if target == start_cell {
            debug!(
                expanded = search.expanded,
                ?start_cell,
                ?goal_cell,
                "no progress possible toward goal"
            );
            return PathPlan {
                waypoints: Vec::new(),
                expanded: search.expanded,
                outcome: PathOutcome::Unreachable,
            };
        }

        let cells = reconstruct(&search.came_from, start_cell, target);
        let mut waypoints: Vec<Vec2> = cells.iter().map(|cell| cell.center(cell_size)).collect();
        if self.config.smoothing {
            waypoints = smooth(world, &waypoints, self.body_radius);
        }

        if outcome == PathOutcome::Partial {
            debug!(
                expanded = search.expanded,
                ?target,
                ?goal_cell,
                "returning partial path"
            );
        } else {
            trace!(
                expanded = search.expanded,
                waypoints = waypoints.len(),
                "path found"
            );
        }

        PathPlan {
            waypoints,
            expanded: search.expanded,
            outcome,
        }
    }

    fn search<W: WorldQuery>(&self, start: CellCoord, goal: CellCoord, world: &W) -> Search {
        let cell_size = world.cell_size();
        let clearance = self.body_radius + self.config.safety_margin;

        let mut open = BinaryHeap::new();
        let mut g_score: HashMap<CellCoord, f32> = HashMap::new();
        let mut came_from: HashMap<CellCoord, CellCoord> = HashMap::new();
        let mut closed: HashSet<CellCoord> = HashSet::new();
        let mut sequence: u64 = 0;

        let _ = g_score.insert(start, 0.0);
        open.push(OpenEntry {
            f: octile(start, goal),
            sequence,
            cell: start,
        });

        let mut expanded = 0;
        let mut last_expanded = start;
        let mut closest = (octile(start, goal), start);

        while let Some(entry) = open.pop() {
            let current = entry.cell;
            if closed.contains(&current) {
                continue;
            }
            if current == goal {
                return Search {
                    came_from,
                    expanded,
                    termination: Termination::Reached,
                };
            }
            if expanded >= self.config.max_expansions {
                return Search {
                    came_from,
                    expanded,
                    termination: Termination::BudgetExhausted(last_expanded),
                };
            }

            let _ = closed.insert(current);
            expanded += 1;
            last_expanded = current;
            let remaining = octile(current, goal);
            if remaining < closest.0 {
                closest = (remaining, current);
            }

            let current_g = g_score.get(&current).copied().unwrap_or(0.0);
            let incoming = came_from.get(&current).map(|previous| step_between(*previous, current));

            for neighbor in world.neighbors(current, self.config.allow_diagonal) {
                if closed.contains(&neighbor)
                    || !world.is_valid_position(neighbor.center(cell_size), clearance)
                {
                    continue;
                }

                let step = step_between(current, neighbor);
                let mut cost = if step.0 != 0 && step.1 != 0 {
                    std::f32::consts::SQRT_2
                } else {
                    1.0
                };
                cost += self.config.wall_avoidance * adjacent_walls(world, neighbor) as f32;
                if incoming.is_some_and(|direction| direction != step) {
                    cost += self.config.direction_change_penalty;
                }

                let tentative = current_g + cost;
                let improves = g_score
                    .get(&neighbor)
                    .map_or(true, |known| tentative < *known);
                if !improves {
                    continue;
                }

                let _ = g_score.insert(neighbor, tentative);
                let _ = came_from.insert(neighbor, current);
                sequence += 1;
                open.push(OpenEntry {
                    f: tentative + octile(neighbor, goal),
                    sequence,
                    cell: neighbor,
                });
            }
        }

        Search {
            came_from,
            expanded,
            termination: Termination::Exhausted(closest.1),
        }
    }
}

/// Reports whether a body of the given radius can travel the straight segment.
///
/// The centre line and both edges of the swept body must have line of sight.
#[must_use]
pub fn corridor_is_clear<W: WorldQuery>(world: &W, from: Vec2, to: Vec2, radius: f32) -> bool {
    if !world.has_line_of_sight(from, to) {
        return false;
    }
    let direction = to - from;
    if direction.length_squared() <= f32::EPSILON || radius <= 0.0 {
        return true;
    }

    let offset = direction.normalize().perp() * radius;
    world.has_line_of_sight(from + offset, to + offset)
        && world.has_line_of_sight(from - offset, to - offset)
}

/// Greedily drops waypoints reachable in a clear corridor from the current anchor.
///
/// The first and last waypoints are always kept.
#[must_use]
pub fn smooth<W: WorldQuery>(world: &W, waypoints: &[Vec2], radius: f32) -> Vec<Vec2> {
    let (Some(first), Some(last)) = (waypoints.first(), waypoints.last()) else {
        return Vec::new();
    };
    if waypoints.len() <= 2 {
        return waypoints.to_vec();
    }

    let mut smoothed = vec![*first];
    let mut anchor = *first;
    for window in waypoints[1..].windows(2) {
        let (candidate, next) = (window[0], window[1]);
        if !corridor_is_clear(world, anchor, next, radius) {
            smoothed.push(candidate);
            anchor = candidate;
        }
    }
    smoothed.push(*last);
    smoothed
}

#[derive(Debug)]
enum Termination {
    Reached,
    BudgetExhausted(CellCoord),
    Exhausted(CellCoord),
}

#[derive(Debug)]
struct Search {
    came_from: HashMap<CellCoord, CellCoord>,
    expanded: usize,
    termination: Termination,
}

#[derive(Clone, Copy, Debug)]
struct OpenEntry {
    f: f32,
    sequence: u64,
    cell: CellCoord,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl Ord for OpenEntry {
    // Reversed so the max-heap pops the lowest f, then the earliest insertion.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn octile(from: CellCoord, to: CellCoord) -> f32 {
    let dx = from.column().abs_diff(to.column()) as f32;
    let dy = from.row().abs_diff(to.row()) as f32;
    (dx + dy) + (std::f32::consts::SQRT_2 - 2.0) * dx.min(dy)
}

fn step_between(from: CellCoord, to: CellCoord) -> (i32, i32) {
    (
        (to.column() - from.column()).signum(),
        (to.row() - from.row()).signum(),
    )
}

fn adjacent_walls<W: WorldQuery>(world: &W, cell: CellCoord) -> usize {
    shadow_operative_core::ORTHOGONAL_OFFSETS
        .iter()
        .filter(|(columns, rows)| world.is_cell_blocked(cell.offset(*columns, *rows)))
        .count()
}

fn reconstruct(
    came_from: &HashMap<CellCoord, CellCoord>,
    start: CellCoord,
    target: CellCoord,
) -> Vec<CellCoord> {
    let mut cells = vec![target];
    let mut current = target;
    while current != start {
        match came_from.get(&current) {
            Some(previous) => {
                current = *previous;
                cells.push(current);
            }
            None => break,
        }
    }
    cells.reverse();
    cells
}
