use shadow_operative_core::{
    AiConfig, CellCoord, GuardId, GuardState, MazeConfig, SpawnConfig, Vec2, WorldQuery,
};
use shadow_operative_system_guards::{Guard, Guards};
use shadow_operative_system_spawning::Spawning;
use shadow_operative_world::{Maze, DEFAULT_LAYOUT};

fn level() -> Maze {
    Maze::from_layout(DEFAULT_LAYOUT, MazeConfig::default()).expect("default layout parses")
}

#[test]
fn guards_keep_their_distance() {
    let level = level();
    let config = SpawnConfig {
        guard_count: 4,
        ..SpawnConfig::default()
    };
    let radius = AiConfig::default().behavior.body_radius;

    let points = Spawning::new(config).spawn_points(level.start_position(), radius, &level);

    assert!(!points.is_empty());
    for (index, point) in points.iter().enumerate() {
        assert!(level.is_valid_position(*point, radius));
        assert!(point.distance(level.start_position()) >= config.min_player_distance);
        for other in &points[index + 1..] {
            assert!(point.distance(*other) >= config.min_guard_separation);
        }
    }
}

#[test]
fn same_seed_places_guards_identically() {
    let level = level();
    let config = SpawnConfig::default();

    let first = Spawning::new(config).spawn_points(level.start_position(), 8.0, &level);
    let second = Spawning::new(config).spawn_points(level.start_position(), 8.0, &level);

    assert_eq!(first, second);
    assert_eq!(first.len(), config.guard_count);
}

#[test]
fn seeds_change_the_placement() {
    let level = level();
    let baseline =
        Spawning::new(SpawnConfig::default()).spawn_points(level.start_position(), 8.0, &level);

    let differs = (1..=8_u64).any(|seed| {
        let config = SpawnConfig {
            seed,
            ..SpawnConfig::default()
        };
        Spawning::new(config).spawn_points(level.start_position(), 8.0, &level) != baseline
    });

    assert!(differs);
}

#[test]
fn unreachable_pockets_are_never_used() {
    let pocket = Maze::from_layout("##########\n#S.E#....#\n##########", MazeConfig::default())
        .expect("layout parses");

    let points =
        Spawning::new(SpawnConfig::default()).spawn_points(pocket.start_position(), 8.0, &pocket);

    assert!(points.is_empty());
}

#[test]
fn impossible_constraints_spawn_nobody() {
    let level = level();
    let config = SpawnConfig {
        min_player_distance: 10_000.0,
        ..SpawnConfig::default()
    };

    let ai = AiConfig::default();

    let guards = Spawning::new(config).populate(level.start_position(), &ai, &level);

    assert!(guards.is_empty());
}

#[test]
fn populated_guards_start_patrolling_on_cell_centres() {
    let level = level();
    let ai = AiConfig::default();

    let mut spawning = Spawning::new(SpawnConfig::default());
    let guards = spawning.populate(level.start_position(), &ai, &level);

    assert_eq!(guards.len(), SpawnConfig::default().guard_count);
    for (expected_id, guard) in guards.iter().enumerate() {
        assert_eq!(guard.id().get() as usize, expected_id);
        assert_eq!(guard.state(), GuardState::Patrol);
        let cell = CellCoord::containing(guard.position(), level.cell_size());
        assert_eq!(cell.center(level.cell_size()), guard.position());
        assert!(guard.patrol_route().len() >= 2);
    }
}

#[test]
fn reinforcements_join_after_the_existing_roster() {
    let level = level();
    let ai = AiConfig::default();
    let config = SpawnConfig::default();
    let mut spawning = Spawning::new(config);
    let mut guards = spawning.populate(level.start_position(), &ai, &level);
    let veterans: Vec<Vec2> = guards.iter().map(Guard::position).collect();
    let player = level.objective_position();

    let joined = spawning.reinforce(&mut guards, player, &ai, &level);

    assert!(joined >= 1);
    assert!(joined <= config.reinforcements);
    assert_eq!(guards.len(), veterans.len() + joined);
    let ids: Vec<u32> = guards.iter().map(|guard| guard.id().get()).collect();
    assert_eq!(ids, (0..guards.len() as u32).collect::<Vec<_>>());
    assert!(guards.iter().all(|guard| guard.state() == GuardState::Patrol));
    let positions: Vec<Vec2> = guards.iter().map(Guard::position).collect();
    for (index, recruit) in positions.iter().enumerate().skip(veterans.len()) {
        assert!(recruit.distance(player) >= config.min_player_distance);
        for other in &positions[..index] {
            assert!(recruit.distance(*other) >= config.min_guard_separation);
        }
    }
}

#[test]
fn reinforcements_continue_after_the_highest_id() {
    let level = level();
    let ai = AiConfig::default();
    let spawn = level.start_position();
    let veteran = Guard::new(GuardId::new(9), spawn, None, &ai, 3, &level);
    let mut guards = Guards::new(vec![veteran]);
    let config = SpawnConfig {
        reinforcements: 1,
        ..SpawnConfig::default()
    };

    let joined = Spawning::new(config).reinforce(&mut guards, spawn, &ai, &level);

    assert_eq!(joined, 1);
    assert_eq!(guards.next_id(), GuardId::new(11));
    assert!(guards.get(GuardId::new(10)).is_some());
}

#[test]
fn zero_reinforcements_leave_the_roster_alone() {
    let level = level();
    let ai = AiConfig::default();
    let config = SpawnConfig {
        reinforcements: 0,
        ..SpawnConfig::default()
    };
    let mut spawning = Spawning::new(config);
    let mut guards = spawning.populate(level.start_position(), &ai, &level);
    let before = guards.snapshots();

    let joined = spawning.reinforce(&mut guards, level.objective_position(), &ai, &level);

    assert_eq!(joined, 0);
    assert_eq!(guards.snapshots(), before);
}
