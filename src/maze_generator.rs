//! Map generation

use std::array;

use log::debug;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use crate::{Direction, Grid, Point};

/// Order in which the carver tries the four directions at each room
pub trait DirectionOrder {
    fn next_order(&mut self) -> [Direction; 4];
}

/// Uniformly shuffled directions
pub struct RandomOrder<R = StdRng> {
    random: R,
}

impl RandomOrder {
    pub fn new(seed: Option<u64>) -> Self {
        Self::from_rng(if let Some(state) = seed {
            StdRng::seed_from_u64(state)
        } else {
            StdRng::from_entropy()
        })
    }
}

impl<R: Rng> RandomOrder<R> {
    pub fn from_rng(random: R) -> Self {
        Self { random }
    }
}

impl<R: Rng> DirectionOrder for RandomOrder<R> {
    fn next_order(&mut self) -> [Direction; 4] {
        let mut directions = Direction::ALL;
        directions.shuffle(&mut self.random);
        directions
    }
}

/// The same order at every room; produces one fixed maze per grid size
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedOrder(pub [Direction; 4]);

impl Default for FixedOrder {
    fn default() -> Self {
        FixedOrder(Direction::ALL)
    }
}

impl DirectionOrder for FixedOrder {
    fn next_order(&mut self) -> [Direction; 4] {
        self.0
    }
}

/// Summary of one generation run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Carving {
    /// Rooms turned into passages, including the starting room
    pub rooms: usize,
    /// Walls opened between two rooms
    pub walls: usize,
}

/// Recursive backtracker maze generator
pub struct MazeGenerator<O = RandomOrder> {
    order: O,
}

impl MazeGenerator {
    /// Generator drawing from a seeded or entropy-seeded [StdRng]
    pub fn new(seed: Option<u64>) -> Self {
        Self::with_order(RandomOrder::new(seed))
    }
}

impl<O: DirectionOrder> MazeGenerator<O> {
    pub fn with_order(order: O) -> Self {
        Self { order }
    }

    /// Carve a perfect maze into an all-wall grid
    ///
    /// Starting from room (1, 1), go into random directions. Open the wall
    /// towards a neighbouring room if that room has not been visited yet,
    /// continue from there and backtrack once all directions are tried.
    /// The backtracking stack is kept on the heap, so large grids do not
    /// exhaust the call stack.
    ///
    /// Grids without an interior (width or depth below 3) are left as is.
    pub fn generate(&mut self, grid: &mut Grid) -> Carving {
        let mut carving = Carving::default();
        if grid.width() < 3 || grid.depth() < 3 {
            return carving;
        }

        let start = Point::new(1, 1);
        Self::carve(grid, start);
        carving.rooms += 1;

        let mut stack: Vec<(Point, array::IntoIter<Direction, 4>)> =
            vec![(start, self.order.next_order().into_iter())];

        while let Some((at, directions)) = stack.last_mut() {
            let Some(direction) = directions.next() else {
                stack.pop();
                continue;
            };
            let Some((wall, room)) = Self::neighbour(grid, *at, direction) else {
                continue;
            };
            if grid.visited[room.y][room.x] {
                continue;
            }

            Self::carve(grid, wall);
            Self::carve(grid, room);
            carving.walls += 1;
            carving.rooms += 1;
            stack.push((room, self.order.next_order().into_iter()));
        }

        debug!(
            "carved {} rooms and {} walls into a {}x{} grid",
            carving.rooms,
            carving.walls,
            grid.width(),
            grid.depth()
        );
        carving
    }

    /// Clear the grid and carve a fresh maze into it
    pub fn regenerate(&mut self, grid: &mut Grid) -> Carving {
        grid.clear();
        self.generate(grid)
    }

    fn carve(grid: &mut Grid, at: Point) {
        grid.set_passage(at, true);
        grid.set_visited(at, true);
    }

    /// Wall and room two steps towards `direction`, if that room lies
    /// inside the outer ring
    fn neighbour(grid: &Grid, at: Point, direction: Direction) -> Option<(Point, Point)> {
        let room = at.towards(direction, 2)?;
        let inside =
            (1..grid.width() - 1).contains(&room.x) && (1..grid.depth() - 1).contains(&room.y);
        if !inside {
            return None;
        }
        Some((at.towards(direction, 1)?, room))
    }
}
