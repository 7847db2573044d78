//! Tile grid parsed from a text layout and the geometry queries guards issue.

use shadow_operative_core::{CellCoord, MazeConfig, Vec2, WorldQuery};
use thiserror::Error;

/// Layout of the stock level.
///
/// `#` marks a wall, `.` a floor tile, `S` the start and `E` the objective.
pub const DEFAULT_LAYOUT: &str = "\
################
#S..#...#...#..#
#.#.###.#.#.#.##
#.#.......#....#
#.###########.##
#.....#.....#..#
#####.#.###.##.#
#...#...#....#.#
#.#.#####.##.#.#
#.#.....#..#...#
#.#####.##.###E#
################";

const MIN_SIGHT_SAMPLES: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tile {
    Floor,
    Wall,
}

/// Reasons a text layout cannot be turned into a maze.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MazeError {
    /// The layout contained no rows.
    #[error("layout is empty")]
    Empty,
    /// A row's width differs from the first row's width.
    #[error("row {row} has {found} tiles, expected {expected}")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// A character outside the tile alphabet was found.
    #[error("unknown tile {tile:?} at column {column}, row {row}")]
    UnknownTile {
        /// Offending character.
        tile: char,
        /// Zero-based column of the character.
        column: usize,
        /// Zero-based row of the character.
        row: usize,
    },
    /// No start tile was placed.
    #[error("layout has no start tile `S`")]
    MissingStart,
    /// No objective tile was placed.
    #[error("layout has no objective tile `E`")]
    MissingObjective,
    /// More than one tile of a unique kind was placed.
    #[error("layout has more than one {0:?} tile")]
    Duplicate(char),
}

/// Grid of wall and floor tiles with a start and an objective cell.
#[derive(Clone, Debug)]
pub struct Maze {
    columns: i32,
    rows: i32,
    cell_size: f32,
    sight_precision: f32,
    tiles: Vec<Tile>,
    start: CellCoord,
    objective: CellCoord,
}

impl Maze {
    /// Parses a text layout; blank lines and surrounding whitespace are ignored.
    pub fn from_layout(layout: &str, config: MazeConfig) -> Result<Self, MazeError> {
        let lines: Vec<&str> = layout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let Some(first) = lines.first() else {
            return Err(MazeError::Empty);
        };

        let width = first.chars().count();
        let mut tiles = Vec::with_capacity(width * lines.len());
        let mut start = None;
        let mut objective = None;

        for (row, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(MazeError::RaggedRow {
                    row,
                    expected: width,
                    found,
                });
            }

            for (column, tile) in line.chars().enumerate() {
                let cell = CellCoord::new(column as i32, row as i32);
                let parsed = match tile {
                    '#' => Tile::Wall,
                    '.' => Tile::Floor,
                    'S' => {
                        if start.replace(cell).is_some() {
                            return Err(MazeError::Duplicate('S'));
                        }
                        Tile::Floor
                    }
                    'E' => {
                        if objective.replace(cell).is_some() {
                            return Err(MazeError::Duplicate('E'));
                        }
                        Tile::Floor
                    }
                    other => {
                        return Err(MazeError::UnknownTile {
                            tile: other,
                            column,
                            row,
                        })
                    }
                };
                tiles.push(parsed);
            }
        }

        Ok(Self {
            columns: width as i32,
            rows: lines.len() as i32,
            cell_size: config.cell_size,
            sight_precision: config.sight_precision,
            tiles,
            start: start.ok_or(MazeError::MissingStart)?,
            objective: objective.ok_or(MazeError::MissingObjective)?,
        })
    }

    /// Number of columns and rows in the grid.
    #[must_use]
    pub const fn dimensions(&self) -> (i32, i32) {
        (self.columns, self.rows)
    }

    /// Cell the player starts in and must return to.
    #[must_use]
    pub const fn start_cell(&self) -> CellCoord {
        self.start
    }

    /// Cell holding the objective.
    #[must_use]
    pub const fn objective_cell(&self) -> CellCoord {
        self.objective
    }

    /// World-space centre of the start cell.
    #[must_use]
    pub fn start_position(&self) -> Vec2 {
        self.start.center(self.cell_size)
    }

    /// World-space centre of the objective cell.
    #[must_use]
    pub fn objective_position(&self) -> Vec2 {
        self.objective.center(self.cell_size)
    }

    /// Floor cells in row-major order.
    pub fn floor_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (0..self.rows).flat_map(move |row| {
            (0..self.columns)
                .map(move |column| CellCoord::new(column, row))
                .filter(move |cell| self.tile(*cell) == Some(Tile::Floor))
        })
    }

    fn tile(&self, cell: CellCoord) -> Option<Tile> {
        if cell.column() < 0
            || cell.row() < 0
            || cell.column() >= self.columns
            || cell.row() >= self.rows
        {
            return None;
        }
        let index = usize::try_from(cell.row() * self.columns + cell.column()).ok()?;
        self.tiles.get(index).copied()
    }
}

impl WorldQuery for Maze {
    fn cell_size(&self) -> f32 {
        self.cell_size
    }

    fn is_wall(&self, point: Vec2) -> bool {
        let cell = CellCoord::containing(point, self.cell_size);
        self.tile(cell) != Some(Tile::Floor)
    }

    fn is_cell_blocked(&self, cell: CellCoord) -> bool {
        self.tile(cell) != Some(Tile::Floor)
    }

    fn is_valid_position(&self, point: Vec2, radius: f32) -> bool {
        if self.is_wall(point) {
            return false;
        }

        [
            Vec2::new(point.x - radius, point.y - radius),
            Vec2::new(point.x + radius, point.y - radius),
            Vec2::new(point.x - radius, point.y + radius),
            Vec2::new(point.x + radius, point.y + radius),
        ]
        .into_iter()
        .all(|corner| !self.is_wall(corner))
    }

    fn has_line_of_sight(&self, from: Vec2, to: Vec2) -> bool {
        let samples = ((from.distance(to) / self.sight_precision) as usize).max(MIN_SIGHT_SAMPLES);
        (1..samples).all(|step| {
            let t = step as f32 / samples as f32;
            !self.is_wall(from.lerp(to, t))
        })
    }
}
