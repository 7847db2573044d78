use shadow_operative_core::{CellCoord, MazeConfig, PathfindingConfig, Vec2, WorldQuery};
use shadow_operative_system_pathfinding::{smooth, PathOutcome, Pathfinder};
use shadow_operative_world::{Maze, DEFAULT_LAYOUT};

const BODY_RADIUS: f32 = 8.0;

fn maze(layout: &str) -> Maze {
    Maze::from_layout(layout, MazeConfig::default()).expect("layout parses")
}

fn centre(column: i32, row: i32) -> Vec2 {
    CellCoord::new(column, row).center(MazeConfig::default().cell_size)
}

fn grid_only(smoothing: bool) -> PathfindingConfig {
    PathfindingConfig {
        smoothing,
        direct_path: false,
        ..PathfindingConfig::default()
    }
}

#[test]
fn open_corridor_yields_every_cell_without_smoothing() {
    let corridor = maze("S....E");
    let pathfinder = Pathfinder::new(grid_only(false), BODY_RADIUS);

    let plan = pathfinder.plan(centre(0, 0), centre(5, 0), &corridor);

    assert_eq!(plan.outcome(), PathOutcome::Found);
    assert_eq!(plan.waypoints().len(), 6);
    assert!(plan
        .waypoints()
        .windows(2)
        .all(|pair| pair[1].x > pair[0].x));
}

#[test]
fn open_corridor_smooths_to_endpoints() {
    let corridor = maze("S....E");
    let pathfinder = Pathfinder::new(grid_only(true), BODY_RADIUS);

    let waypoints = pathfinder.find_path(centre(0, 0), centre(5, 0), &corridor);

    assert_eq!(waypoints, vec![centre(0, 0), centre(5, 0)]);
}

#[test]
fn clear_line_short_circuits_the_search() {
    let corridor = maze("S....E");
    let pathfinder = Pathfinder::new(PathfindingConfig::default(), BODY_RADIUS);
    let goal = Vec2::new(300.0, 30.0);

    let plan = pathfinder.plan(centre(0, 0), goal, &corridor);

    assert_eq!(plan.outcome(), PathOutcome::Direct);
    assert_eq!(plan.expanded(), 0);
    assert_eq!(plan.waypoints(), &[goal]);
}

#[test]
fn same_cell_goal_is_returned_directly() {
    let level = maze(DEFAULT_LAYOUT);
    let pathfinder = Pathfinder::new(grid_only(true), BODY_RADIUS);
    let goal = Vec2::new(100.0, 110.0);

    let waypoints = pathfinder.find_path(Vec2::new(80.0, 80.0), goal, &level);

    assert_eq!(waypoints, vec![goal]);
}

#[test]
fn default_maze_path_reaches_the_objective() {
    let level = maze(DEFAULT_LAYOUT);
    let pathfinder = Pathfinder::new(PathfindingConfig::default(), BODY_RADIUS);

    let plan = pathfinder.plan(level.start_position(), level.objective_position(), &level);

    assert_eq!(plan.outcome(), PathOutcome::Found);
    assert_eq!(plan.waypoints().first(), Some(&level.start_position()));
    assert_eq!(plan.waypoints().last(), Some(&level.objective_position()));
    for pair in plan.waypoints().windows(2) {
        assert!(level.has_line_of_sight(pair[0], pair[1]), "{pair:?}");
    }
    for waypoint in plan.waypoints() {
        assert!(level.is_valid_position(*waypoint, BODY_RADIUS));
    }
}

#[test]
fn planning_is_deterministic() {
    let level = maze(DEFAULT_LAYOUT);
    let pathfinder = Pathfinder::new(PathfindingConfig::default(), BODY_RADIUS);

    let first = pathfinder.plan(level.start_position(), level.objective_position(), &level);
    let second = pathfinder.plan(level.start_position(), level.objective_position(), &level);

    assert_eq!(first, second);
}

#[test]
fn exhausted_budget_returns_partial_progress() {
    let level = maze(DEFAULT_LAYOUT);
    let config = PathfindingConfig {
        max_expansions: 3,
        ..PathfindingConfig::default()
    };
    let pathfinder = Pathfinder::new(config, BODY_RADIUS);

    let plan = pathfinder.plan(level.start_position(), level.objective_position(), &level);

    assert_eq!(plan.outcome(), PathOutcome::Partial);
    assert!(plan.expanded() <= 3);
    assert!(!plan.waypoints().is_empty());
    assert_ne!(plan.waypoints().last(), Some(&level.objective_position()));
}

#[test]
fn walled_off_goal_leads_to_the_closest_cell() {
    let pocket = maze(
        "#######\n\
         #S.#..#\n\
         #..#.E#\n\
         #######",
    );
    let pathfinder = Pathfinder::new(PathfindingConfig::default(), BODY_RADIUS);

    let plan = pathfinder.plan(centre(1, 1), centre(5, 2), &pocket);

    assert_eq!(plan.outcome(), PathOutcome::Partial);
    assert_eq!(plan.expanded(), 4);
    assert_eq!(plan.waypoints().last(), Some(&centre(2, 2)));
}

#[test]
fn enclosed_start_yields_an_empty_path() {
    let cell = maze("#####\n#S#E#\n#####");
    let pathfinder = Pathfinder::new(PathfindingConfig::default(), BODY_RADIUS);

    let plan = pathfinder.plan(centre(1, 1), centre(3, 1), &cell);

    assert_eq!(plan.outcome(), PathOutcome::Unreachable);
    assert!(plan.waypoints().is_empty());
}

#[test]
fn smoothing_keeps_corners_that_block_the_corridor() {
    let elbow = maze(
        "#####\n\
         #S..#\n\
         ###.#\n\
         ###E#\n\
         #####",
    );
    let raw = vec![
        centre(1, 1),
        centre(2, 1),
        centre(3, 1),
        centre(3, 2),
        centre(3, 3),
    ];

    let smoothed = smooth(&elbow, &raw, BODY_RADIUS);

    assert_eq!(smoothed, vec![centre(1, 1), centre(3, 1), centre(3, 3)]);
}
