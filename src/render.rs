//! Text rendering of the maze and terminal playback of the mouse

use std::io::{self, Write};
use std::sync::Mutex;

use itertools::Itertools;

use crate::session::MazeObserver;
use crate::{Grid, Point};

pub const S_MOUSE: char = '🐭';
pub const S_CHEESE: char = '🧀';
pub const S_VALID: char = '🟩';
pub const S_WALL: char = '🟫';

fn squares(grid: &Grid, passage: char, wall: char) -> Vec<Vec<char>> {
    (0..grid.depth())
        .map(|y| {
            (0..grid.width())
                .map(|x| match grid.is_passage(x, y) {
                    Ok(true) => passage,
                    _ => wall,
                })
                .collect()
        })
        .collect()
}

fn join_squares(squares: &[Vec<char>]) -> String {
    squares.iter().map(|row| row.iter().join("")).join("\n")
}

/// One character per cell, one line per row
pub fn draw(grid: &Grid, passage: char, wall: char) -> String {
    join_squares(&squares(grid, passage, wall))
}

/// Emoji picture of the maze
pub fn emojis(grid: &Grid) -> String {
    draw(grid, S_VALID, S_WALL)
}

/// Observer that redraws the whole maze on the terminal after each change
pub struct TerminalRenderer<W = io::Stdout> {
    squares: Mutex<Vec<Vec<char>>>,
    out: Mutex<W>,
}

impl TerminalRenderer {
    pub fn stdout(grid: &Grid) -> Self {
        Self::new(grid, io::stdout())
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(grid: &Grid, out: W) -> Self {
        TerminalRenderer {
            squares: Mutex::new(squares(grid, S_VALID, S_WALL)),
            out: Mutex::new(out),
        }
    }

    /// Current picture, as it was last printed
    pub fn snapshot(&self) -> String {
        match self.squares.lock() {
            Ok(squares) => join_squares(&squares),
            Err(poisoned) => join_squares(&poisoned.into_inner()),
        }
    }

    /// Change one square and print the picture
    fn paint(&self, at: Point, symbol: char) {
        let Ok(mut squares) = self.squares.lock() else {
            return;
        };
        if let Some(square) = squares.get_mut(at.y).and_then(|row| row.get_mut(at.x)) {
            *square = symbol;
        }
        if let Ok(mut out) = self.out.lock() {
            // Write errors only cost the picture
            let _ = writeln!(out, "\x1B[2J\x1B[1;1H{}", join_squares(&squares))
                .and_then(|_| out.flush());
        }
    }
}

impl<W: Write + Send> MazeObserver for TerminalRenderer<W> {
    fn goal_placed(&self, at: Point) {
        self.paint(at, S_CHEESE);
    }

    fn agent_moved(&self, at: Point) {
        self.paint(at, S_MOUSE);
    }

    fn cell_vacated(&self, at: Point) {
        self.paint(at, S_VALID);
    }
}
