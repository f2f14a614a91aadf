//! Mouse that follows the wall on its right-hand side

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{info, trace};
use rand::Rng;

use crate::session::MazeObserver;
use crate::{Direction, Grid, MazeError, Point};

/// Shared flag asking a running mouse to stop
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Tuning of a navigation run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NavigationConfig {
    /// Pause after each step, so that the motion can be watched
    pub step_delay: Option<Duration>,
    /// Seed for the initial bearing of the mouse; entropy if `None`
    pub seed: Option<u64>,
}

/// How a navigation run ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Mouse reached the cheese
    Reached { steps: usize },
    /// Run was cancelled before the cheese was found
    Cancelled { steps: usize },
}

/// Wall-following mouse
///
/// The mouse has no memory of where it has been. In a perfect maze keeping
/// one paw on the right-hand wall amounts to a depth-first walk around the
/// spanning tree, so every cell is eventually reached, although dead ends
/// are explored on the way.
pub struct WallFollower<'a> {
    grid: &'a Grid,
    position: Point,
    bearing: Direction,
}

impl<'a> WallFollower<'a> {
    /// Put the mouse down at `start`, facing a random direction
    pub fn new<R: Rng>(grid: &'a Grid, start: Point, random: &mut R) -> Self {
        Self::with_bearing(grid, start, random.gen())
    }

    pub fn with_bearing(grid: &'a Grid, start: Point, bearing: Direction) -> Self {
        WallFollower {
            grid,
            position: start,
            bearing,
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn bearing(&self) -> Direction {
        self.bearing
    }

    /// Neighbouring cell towards `direction`, if it is a passage.
    /// Cells beyond the edge of the grid count as walls.
    fn open_towards(&self, direction: Direction) -> Option<Point> {
        let next = self.position.towards(direction, 1)?;
        self.grid.is_passage(next.x, next.y).ok()?.then_some(next)
    }

    /// Move one cell
    ///
    /// Try right, straight, left and finally back. The first open cell is
    /// taken and the bearing turns towards it.
    pub fn step(&mut self) -> Result<Point, MazeError> {
        let b = self.bearing;
        let (bearing, next) = [b.turn_right(), b, b.turn_left(), b.reverse()]
            .into_iter()
            .find_map(|d| self.open_towards(d).map(|next| (d, next)))
            .ok_or(MazeError::Stranded { at: self.position })?;

        self.bearing = bearing;
        self.position = next;
        Ok(next)
    }

    /// Lazy sequence of positions up to and including `goal`
    ///
    /// The mouse always takes at least one step, so a walk that starts on
    /// `goal` goes all the way around and back.
    pub fn walk(self, goal: Point) -> Walk<'a> {
        Walk {
            mouse: self,
            goal,
            done: false,
        }
    }

    /// Search for the cheese at `goal`
    ///
    /// Every step is reported to `observer`: first the cell being left, then
    /// the cell entered. `cancel` is polled before each step. The cheese is
    /// only looked for after moving, so a mouse put down on it walks the
    /// whole maze before finding it again.
    pub fn go(
        &mut self,
        goal: Point,
        cancel: &CancelToken,
        observer: &dyn MazeObserver,
        config: &NavigationConfig,
    ) -> Result<RunOutcome, MazeError> {
        let mut steps = 0;
        loop {
            if cancel.is_cancelled() {
                info!("mouse stopped at {} after {steps} steps", self.position);
                return Ok(RunOutcome::Cancelled { steps });
            }

            observer.cell_vacated(self.position);
            let at = self.step()?;
            steps += 1;
            trace!("mouse heading {:?} to {at}", self.bearing);
            observer.agent_moved(at);

            if let Some(delay) = config.step_delay {
                thread::sleep(delay);
            }
            if at == goal {
                break;
            }
        }

        info!("mouse found the cheese at {goal} after {steps} steps");
        observer.navigation_reached(steps);
        Ok(RunOutcome::Reached { steps })
    }
}

/// Iterator over the positions of a walking mouse, see [WallFollower::walk]
pub struct Walk<'a> {
    mouse: WallFollower<'a>,
    goal: Point,
    done: bool,
}

impl Iterator for Walk<'_> {
    type Item = Result<Point, MazeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let step = self.mouse.step();
        self.done = step.as_ref().map_or(true, |at| *at == self.goal);
        Some(step)
    }
}
