//! Generate a perfect maze and let a mouse find the cheese in it
//!
//! The maze is carved with a recursive backtracker, so every room is
//! reachable from every other room through exactly one path. The mouse
//! keeps its right paw on the wall until it bumps into the cheese.
//!
//! # Examples
//! ## Carve a maze
//! ```
//! use maze_mouse::{FixedOrder, Grid, MazeGenerator};
//!
//! let mut grid = Grid::new(4, 4);
//! let carving = MazeGenerator::with_order(FixedOrder::default()).generate(&mut grid);
//!
//! assert_eq!((grid.width(), grid.depth()), (5, 5));
//! assert_eq!(carving.rooms, carving.walls + 1);
//! assert_eq!(
//!     grid.to_text(),
//!     "
//! ######
//! #...#
//! ####.#
//! #...#
//! ######"
//!         .trim()
//! );
//! ```
//!
//! ## Chase the cheese
//! ```
//! use maze_mouse::{MazeGenerator, NavigationConfig, RunOutcome, Session, SessionState};
//!
//! let generator = MazeGenerator::new(Some(7));
//! let mut session = Session::new(15, 11, generator, NavigationConfig::default());
//! let cheese = session.grid().passages().last().unwrap();
//!
//! session.place_goal(cheese.x, cheese.y).unwrap();
//! session.place_agent_and_start(1, 1).unwrap();
//! let outcome = session.wait().unwrap();
//!
//! assert!(matches!(outcome, RunOutcome::Reached { .. }));
//! assert_eq!(session.state(), SessionState::Reached);
//! ```

use std::fmt;

use rand::distributions::{Distribution, Standard};
use rand::Rng;

pub mod analysis;
pub mod error;
pub mod maze_generator;
pub mod render;
pub mod session;
pub mod wall_follower;

pub use error::{MazeError, Rejection};
pub use maze_generator::{Carving, DirectionOrder, FixedOrder, MazeGenerator, RandomOrder};
pub use session::{MazeObserver, Session, SessionState};
pub use wall_follower::{CancelToken, NavigationConfig, RunOutcome, WallFollower};

/// Location in the maze
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub const fn new(x: usize, y: usize) -> Self {
        Point { x, y }
    }

    /// Neighbouring point `distance` cells towards `direction`.
    ///
    /// Returns `None` if that would leave the first quadrant.
    pub fn towards(self, direction: Direction, distance: usize) -> Option<Point> {
        let (dx, dy) = direction.delta();
        let x = self.x.checked_add_signed(dx * distance as isize)?;
        let y = self.y.checked_add_signed(dy * distance as isize)?;
        Some(Point { x, y })
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Compass direction. North is towards row 0.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Unit step `(dx, dy)` of this direction
    pub const fn delta(self) -> (isize, isize) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    pub const fn turn_right(self) -> Self {
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
        }
    }

    pub const fn turn_left(self) -> Self {
        match self {
            Direction::North => Direction::West,
            Direction::East => Direction::North,
            Direction::South => Direction::East,
            Direction::West => Direction::South,
        }
    }

    pub const fn reverse(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }
}

/// Uniformly random direction
impl Distribution<Direction> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Direction {
        match rng.gen_range(0..4) {
            0 => Direction::North,
            1 => Direction::East,
            2 => Direction::South,
            _ => Direction::West,
        }
    }
}

/// Passage/wall matrix of the maze
///
/// Both dimensions are odd, so that rooms sit on odd coordinates and
/// every pair of neighbouring rooms has exactly one wall cell between
/// them. The outer ring is never carved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    depth: usize,
    /// Passage flags, indexed `[y][x]`
    passages: Vec<Vec<bool>>,
    /// Cells incorporated by the carver, indexed `[y][x]`
    visited: Vec<Vec<bool>>,
}

impl Grid {
    const S_WALL: char = '#';
    const S_PASSAGE: char = '.';

    /// All-wall grid. Even dimensions are bumped to the next odd value
    /// and zero counts as one.
    pub fn new(width: usize, depth: usize) -> Self {
        let width = Self::odd(width);
        let depth = Self::odd(depth);
        Grid {
            width,
            depth,
            passages: vec![vec![false; width]; depth],
            visited: vec![vec![false; width]; depth],
        }
    }

    fn odd(n: usize) -> usize {
        let n = n.max(1);
        if n % 2 == 0 {
            n + 1
        } else {
            n
        }
    }

    /// Parse a layout of `#` walls and `.` passages, one row per line.
    ///
    /// The shape is taken as given, without bumping even dimensions.
    pub fn from_text(text: &str) -> Result<Self, MazeError> {
        let passages = text
            .lines()
            .enumerate()
            .map(|(y, row)| {
                row.chars()
                    .enumerate()
                    .map(|(x, c)| match c {
                        Self::S_PASSAGE => Ok(true),
                        Self::S_WALL => Ok(false),
                        found => Err(MazeError::MalformedLayout { found, x, y }),
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        let width = passages.first().map_or(0, Vec::len);
        if let Some((y, row)) = passages.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(MazeError::RaggedLayout {
                y,
                expected: width,
                found: row.len(),
            });
        }
        let depth = passages.len();
        Ok(Grid {
            width,
            depth,
            visited: vec![vec![false; width]; depth],
            passages,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    fn check(&self, x: usize, y: usize) -> Result<(), MazeError> {
        if x < self.width && y < self.depth {
            Ok(())
        } else {
            Err(MazeError::OutOfBounds {
                x,
                y,
                width: self.width,
                depth: self.depth,
            })
        }
    }

    /// Whether the mouse may stand on `(x, y)`
    pub fn is_passage(&self, x: usize, y: usize) -> Result<bool, MazeError> {
        self.check(x, y)?;
        Ok(self.passages[y][x])
    }

    /// Whether the carver has incorporated `(x, y)`
    pub fn is_visited(&self, x: usize, y: usize) -> Result<bool, MazeError> {
        self.check(x, y)?;
        Ok(self.visited[y][x])
    }

    pub(crate) fn set_passage(&mut self, at: Point, value: bool) {
        self.passages[at.y][at.x] = value;
    }

    pub(crate) fn set_visited(&mut self, at: Point, value: bool) {
        self.visited[at.y][at.x] = value;
    }

    /// Turn every cell back into an unvisited wall
    pub fn clear(&mut self) {
        for row in self.passages.iter_mut().chain(self.visited.iter_mut()) {
            row.fill(false);
        }
    }

    /// Room cells, i.e. cells at odd row and odd column, row by row
    pub fn rooms(&self) -> impl Iterator<Item = Point> + '_ {
        (1..self.depth.saturating_sub(1))
            .step_by(2)
            .flat_map(move |y| {
                (1..self.width.saturating_sub(1))
                    .step_by(2)
                    .map(move |x| Point { x, y })
            })
    }

    /// Every passage cell, row by row
    pub fn passages(&self) -> impl Iterator<Item = Point> + '_ {
        self.passages.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, open)| **open)
                .map(move |(x, _)| Point { x, y })
        })
    }

    /// Layout as `#`/`.` text, the inverse of [Self::from_text]
    pub fn to_text(&self) -> String {
        render::draw(self, Self::S_PASSAGE, Self::S_WALL)
    }
}
