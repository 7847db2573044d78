#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Guard behaviour: the per-guard state machine and the roster system that
//! drives every guard once per simulated tick.

mod guard;
mod patrol;
mod search;

use serde::{Deserialize, Serialize};
use shadow_operative_core::{
    Command, Event, GuardId, GuardState, PlayerSnapshot, Signal, Vec2, WorldQuery,
};
use tracing::info;

pub use guard::Guard;

/// Read-only view of a guard for renderers and adapters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GuardSnapshot {
    /// Identifier of the guard.
    pub id: GuardId,
    /// Position in world units.
    pub position: Vec2,
    /// Facing in degrees.
    pub facing: f32,
    /// Behaviour currently executing.
    pub state: GuardState,
    /// Alertness in `[0, 1]`.
    pub alertness: f32,
    /// Current reach of the vision cone.
    pub vision_distance: f32,
    /// Current full width of the vision cone in degrees.
    pub vision_angle: f32,
}

/// Pure system that advances every guard and reports catches as commands.
#[derive(Debug, Default)]
pub struct Guards {
    roster: Vec<Guard>,
}

impl Guards {
    /// Creates a roster; guards are always updated in ascending id order.
    #[must_use]
    pub fn new(mut roster: Vec<Guard>) -> Self {
        roster.sort_by_key(Guard::id);
        Self { roster }
    }

    /// Number of guards in the roster.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roster.len()
    }

    /// Reports whether the roster is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    /// Iterates over the guards in update order.
    pub fn iter(&self) -> impl Iterator<Item = &Guard> {
        self.roster.iter()
    }

    /// Looks up a guard by identifier.
    #[must_use]
    pub fn get(&self, id: GuardId) -> Option<&Guard> {
        self.roster.iter().find(|guard| guard.id() == id)
    }

    /// Identifier following the highest one in the roster.
    #[must_use]
    pub fn next_id(&self) -> GuardId {
        self.roster
            .last()
            .map_or(GuardId::new(0), |guard| GuardId::new(guard.id().get() + 1))
    }

    /// Captures snapshots of every guard in update order.
    #[must_use]
    pub fn snapshots(&self) -> Vec<GuardSnapshot> {
        self.roster.iter().map(Guard::snapshot).collect()
    }

    /// Number of guards currently in each state, in [`GuardState::ALL`] order.
    #[must_use]
    pub fn state_counts(&self) -> [(GuardState, usize); 4] {
        GuardState::ALL.map(|state| {
            let count = self
                .roster
                .iter()
                .filter(|guard| guard.state() == state)
                .count();
            (state, count)
        })
    }

    /// Consumes world events and emits a catch command when a guard reaches the player.
    ///
    /// Every `TimeAdvanced` event updates each guard once. The first catch
    /// ends processing, so later guards and events are skipped.
    pub fn handle<W: WorldQuery>(
        &mut self,
        events: &[Event],
        player: &PlayerSnapshot,
        world: &W,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            let Event::TimeAdvanced { dt } = event else {
                continue;
            };

            for guard in &mut self.roster {
                if let Some(Signal::Caught) = guard.update(player, world, *dt) {
                    info!(guard = guard.id().get(), "guard caught the player");
                    out.push(Command::CatchPlayer { guard: guard.id() });
                    return;
                }
            }
        }
    }
}

impl Extend<Guard> for Guards {
    fn extend<I: IntoIterator<Item = Guard>>(&mut self, guards: I) {
        self.roster.extend(guards);
        self.roster.sort_by_key(Guard::id);
    }
}
