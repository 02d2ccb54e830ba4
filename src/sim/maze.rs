//! Maze model and spawn point extraction
//!
//! The maze is a cyclic grid: indices wrap around both axes, which is how the
//! side tunnels connect. Cell centres sit at `(x + 0.5, y + 0.5)` in world
//! units, one unit per cell.

use std::fmt;
use std::ops::{Index, IndexMut};

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{SessionError, SessionResult};

/// Cell contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CellType {
    #[default]
    None,
    Wall,
    Food,
    Energizer,
    PlayerSpawn,
    /// Adversary holding area; adversaries spawn here
    GhostHome,
    /// Waypoint adversaries use to re-enter their home after being eaten
    HomeEnter,
}

impl CellType {
    /// Whether eating this cell should clear it
    pub fn is_edible(&self) -> bool {
        matches!(self, CellType::Food | CellType::Energizer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cell {
    pub cell_type: CellType,
}

/// 2D cyclic grid of cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Maze {
    size_x: usize,
    size_y: usize,
    cells: Vec<Cell>,
}

impl Maze {
    /// An all-empty maze
    pub fn new(size_x: usize, size_y: usize) -> Self {
        Self {
            size_x,
            size_y,
            cells: vec![Cell::default(); size_x * size_y],
        }
    }

    pub fn size_x(&self) -> usize {
        self.size_x
    }

    pub fn size_y(&self) -> usize {
        self.size_y
    }

    /// A maze with no cells cannot be indexed
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn wrap(&self, x: i32, y: i32) -> usize {
        let x = x.rem_euclid(self.size_x as i32) as usize;
        let y = y.rem_euclid(self.size_y as i32) as usize;
        y * self.size_x + x
    }

    /// Grid coordinates of the cell containing a world position
    pub fn cell_at(position: Vec2) -> (i32, i32) {
        (position.x.floor() as i32, position.y.floor() as i32)
    }

    /// World position of a cell's centre
    pub fn cell_center(x: i32, y: i32) -> Vec2 {
        Vec2::new(x as f32 + 0.5, y as f32 + 0.5)
    }

    /// Clear an edible cell. Returns the type it had; empty cells stay empty.
    pub fn consume(&mut self, x: i32, y: i32) -> CellType {
        let cell = &mut self[(x, y)];
        let previous = cell.cell_type;
        if previous.is_edible() {
            cell.cell_type = CellType::None;
        }
        previous
    }

    /// Number of food and energizer cells left
    pub fn remaining_food(&self) -> usize {
        self.cells.iter().filter(|c| c.cell_type.is_edible()).count()
    }

    /// Iterate `(x, y, cell)` in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, &Cell)> + '_ {
        self.cells.iter().enumerate().map(move |(i, cell)| {
            ((i % self.size_x) as i32, (i / self.size_x) as i32, cell)
        })
    }
}

impl Index<(i32, i32)> for Maze {
    type Output = Cell;

    fn index(&self, (x, y): (i32, i32)) -> &Cell {
        &self.cells[self.wrap(x, y)]
    }
}

impl IndexMut<(i32, i32)> for Maze {
    fn index_mut(&mut self, (x, y): (i32, i32)) -> &mut Cell {
        let i = self.wrap(x, y);
        &mut self.cells[i]
    }
}

/// Produces the maze for a level (layout extraction lives outside the session)
pub trait MazeSource {
    fn get_map(&mut self) -> Maze;
}

/// Renders the maze; optional collaborator of the session
pub trait MazeVisualizer {
    /// Build or rebuild all visual data for the maze
    fn create_or_refresh(&mut self, maze: &Maze);
    /// Redraw the cell at `position` after it changed
    fn refresh(&mut self, maze: &Maze, position: Vec2);
}

/// Maze parsed from a text layout
///
/// `#` wall, `.` food, `o` energizer, `P` player spawn, `G` ghost home,
/// `H` home enter, space empty. Row `n` of the text is `y = n`.
#[derive(Debug, Clone)]
pub struct TextMaze {
    maze: Maze,
}

impl TextMaze {
    pub fn parse(layout: &str) -> SessionResult<Self> {
        let rows: Vec<&str> = layout.lines().filter(|l| !l.trim().is_empty()).collect();
        let size_y = rows.len();
        let size_x = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        if size_x == 0 || size_y == 0 {
            return Err(SessionError::InvalidLayout("layout is empty".into()));
        }

        let mut maze = Maze::new(size_x, size_y);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let cell_type = match ch {
                    '#' => CellType::Wall,
                    '.' => CellType::Food,
                    'o' => CellType::Energizer,
                    'P' => CellType::PlayerSpawn,
                    'G' => CellType::GhostHome,
                    'H' => CellType::HomeEnter,
                    ' ' => CellType::None,
                    other => {
                        return Err(SessionError::InvalidLayout(format!(
                            "unknown cell '{}' at ({}, {})",
                            other, x, y
                        )));
                    }
                };
                maze[(x as i32, y as i32)].cell_type = cell_type;
            }
        }
        Ok(Self { maze })
    }
}

impl MazeSource for TextMaze {
    fn get_map(&mut self) -> Maze {
        self.maze.clone()
    }
}

/// Which spawn set a position was requested from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnKind {
    Player,
    Adversary,
    HomeEnter,
}

impl fmt::Display for SpawnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpawnKind::Player => write!(f, "player"),
            SpawnKind::Adversary => write!(f, "adversary"),
            SpawnKind::HomeEnter => write!(f, "home-enter"),
        }
    }
}

/// Spawn positions found in the maze, fixed once the maze is built
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoints {
    player: Vec<Vec2>,
    adversary: Vec<Vec2>,
    home_enter: Vec<Vec2>,
}

impl SpawnPoints {
    pub fn extract(maze: &Maze) -> Self {
        let mut points = Self::default();
        for (x, y, cell) in maze.iter() {
            let center = Maze::cell_center(x, y);
            match cell.cell_type {
                CellType::PlayerSpawn => points.player.push(center),
                CellType::GhostHome => points.adversary.push(center),
                CellType::HomeEnter => points.home_enter.push(center),
                _ => {}
            }
        }
        points
    }

    pub fn player(&self) -> &[Vec2] {
        &self.player
    }

    pub fn adversary(&self) -> &[Vec2] {
        &self.adversary
    }

    pub fn home_enter(&self) -> &[Vec2] {
        &self.home_enter
    }

    pub fn is_empty(&self) -> bool {
        self.player.is_empty() && self.adversary.is_empty() && self.home_enter.is_empty()
    }

    pub fn random_player_spawn<R: Rng>(&self, rng: &mut R) -> SessionResult<Vec2> {
        pick(&self.player, rng).ok_or(SessionError::EmptySpawnSet(SpawnKind::Player))
    }

    pub fn random_adversary_spawn<R: Rng>(&self, rng: &mut R) -> SessionResult<Vec2> {
        pick(&self.adversary, rng).ok_or(SessionError::EmptySpawnSet(SpawnKind::Adversary))
    }

    /// Closest home-enter waypoint to `position` (first one wins ties)
    pub fn nearest_home_enter(&self, position: Vec2) -> SessionResult<Vec2> {
        self.home_enter
            .iter()
            .copied()
            .fold(None, |best: Option<Vec2>, p| match best {
                Some(b) if b.distance(position) <= p.distance(position) => Some(b),
                _ => Some(p),
            })
            .ok_or(SessionError::EmptySpawnSet(SpawnKind::HomeEnter))
    }
}

fn pick<R: Rng>(points: &[Vec2], rng: &mut R) -> Option<Vec2> {
    if points.is_empty() {
        None
    } else {
        Some(points[rng.random_range(0..points.len())])
    }
}
