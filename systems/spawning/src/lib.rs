#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic guard placement for a fresh session.

use std::collections::{HashSet, VecDeque};

use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use shadow_operative_core::{AiConfig, CellCoord, GuardId, SpawnConfig, Vec2, WorldQuery};
use shadow_operative_system_guards::{Guard, Guards};
use tracing::{debug, info};

/// Places guards away from the player and from each other.
#[derive(Debug)]
pub struct Spawning {
    config: SpawnConfig,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a spawning system seeded from the configuration.
    #[must_use]
    pub fn new(config: SpawnConfig) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
        }
    }

    /// Chooses up to `guard_count` spawn points on ground reachable from `player_start`.
    ///
    /// A guard is skipped when no acceptable point turns up within
    /// `max_attempts` draws, so the result may be shorter than requested.
    pub fn spawn_points<W: WorldQuery>(
        &mut self,
        player_start: Vec2,
        body_radius: f32,
        world: &W,
    ) -> Vec<Vec2> {
        let count = self.config.guard_count;
        self.place(count, player_start, body_radius, &[], world)
    }

    /// Builds a roster of patrolling guards with generated routes.
    pub fn populate<W: WorldQuery>(
        &mut self,
        player_start: Vec2,
        ai: &AiConfig,
        world: &W,
    ) -> Guards {
        let points = self.spawn_points(player_start, ai.behavior.body_radius, world);
        let roster = self.recruit(points, 0, ai, world);
        info!(
            requested = self.config.guard_count,
            spawned = roster.len(),
            "guards deployed"
        );
        Guards::new(roster)
    }

    /// Adds up to `reinforcements` patrolling guards to `guards` and returns how many joined.
    ///
    /// Newcomers keep the usual distance from `player` and from every guard
    /// already deployed. Their ids follow the highest existing id.
    pub fn reinforce<W: WorldQuery>(
        &mut self,
        guards: &mut Guards,
        player: Vec2,
        ai: &AiConfig,
        world: &W,
    ) -> usize {
        let occupied: Vec<Vec2> = guards.iter().map(Guard::position).collect();
        let count = self.config.reinforcements;
        let points = self.place(count, player, ai.behavior.body_radius, &occupied, world);
        let recruits = self.recruit(points, guards.next_id().get(), ai, world);
        let joined = recruits.len();
        guards.extend(recruits);
        info!(
            requested = count,
            spawned = joined,
            "reinforcements deployed"
        );
        joined
    }

    fn place<W: WorldQuery>(
        &mut self,
        count: usize,
        player: Vec2,
        body_radius: f32,
        occupied: &[Vec2],
        world: &W,
    ) -> Vec<Vec2> {
        let cell_size = world.cell_size();
        let start = CellCoord::containing(player, cell_size);
        let candidates: Vec<Vec2> = reachable_cells(start, world)
            .into_iter()
            .map(|cell| cell.center(cell_size))
            .filter(|point| world.is_valid_position(*point, body_radius))
            .filter(|point| point.distance(player) >= self.config.min_player_distance)
            .collect();

        let mut placed: Vec<Vec2> = Vec::with_capacity(count);
        for index in 0..count {
            let chosen = (0..self.config.max_attempts)
                .filter_map(|_| candidates.choose(&mut self.rng).copied())
                .find(|point| {
                    occupied
                        .iter()
                        .chain(&placed)
                        .all(|other| other.distance(*point) >= self.config.min_guard_separation)
                });
            match chosen {
                Some(point) => {
                    debug!(guard = index, ?point, "placed guard");
                    placed.push(point);
                }
                None => debug!(guard = index, "no room left for guard"),
            }
        }
        placed
    }

    fn recruit<W: WorldQuery>(
        &mut self,
        points: Vec<Vec2>,
        first_id: u32,
        ai: &AiConfig,
        world: &W,
    ) -> Vec<Guard> {
        points
            .into_iter()
            .zip(first_id..)
            .map(|(spawn, id)| {
                let seed = self.rng.gen::<u64>();
                Guard::new(GuardId::new(id), spawn, None, ai, seed, world)
            })
            .collect()
    }
}

/// Cells reachable from `start` through axis-aligned steps, in breadth-first order.
fn reachable_cells<W: WorldQuery>(start: CellCoord, world: &W) -> Vec<CellCoord> {
    if world.is_cell_blocked(start) {
        return Vec::new();
    }

    let mut visited = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);
    let mut order = Vec::new();
    while let Some(cell) = queue.pop_front() {
        order.push(cell);
        for neighbor in world.neighbors(cell, false) {
            if visited.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Strip;

    impl WorldQuery for Strip {
        fn cell_size(&self) -> f32 {
            10.0
        }

        fn is_wall(&self, point: Vec2) -> bool {
            !(0.0..50.0).contains(&point.x) || !(0.0..10.0).contains(&point.y)
        }

        fn is_valid_position(&self, point: Vec2, _radius: f32) -> bool {
            !self.is_wall(point)
        }

        fn has_line_of_sight(&self, _from: Vec2, _to: Vec2) -> bool {
            true
        }
    }

    #[test]
    fn flood_fill_visits_every_connected_cell_once() {
        let cells = reachable_cells(CellCoord::new(2, 0), &Strip);
        assert_eq!(cells.len(), 5);
        assert_eq!(cells.first(), Some(&CellCoord::new(2, 0)));
        let unique: HashSet<_> = cells.iter().collect();
        assert_eq!(unique.len(), 5);
    }

    #[test]
    fn blocked_start_reaches_nothing() {
        assert!(reachable_cells(CellCoord::new(9, 9), &Strip).is_empty());
    }
}
