//! Errors raised by the maze, the mouse and the session

use std::fmt;

use thiserror::Error;

use crate::session::SessionState;
use crate::Point;

/// Why a session command was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The command is not allowed in the current session state
    WrongState(SessionState),
    /// The requested cell is a wall
    Wall(Point),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::WrongState(state) => write!(f, "session is {state}"),
            Rejection::Wall(at) => write!(f, "{at} is a wall"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MazeError {
    /// Coordinate outside the grid. The caller and the grid disagree on
    /// the maze shape.
    #[error("cell ({x}, {y}) is outside the {width}x{depth} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        depth: usize,
    },

    /// Command refused; session state is left as it was
    #[error("cannot {action}: {reason}")]
    InvalidStateTransition {
        action: &'static str,
        reason: Rejection,
    },

    /// The mouse has no open neighbour to move to. Only a disconnected
    /// maze can produce this.
    #[error("mouse is stranded at {at}")]
    Stranded { at: Point },

    #[error("unexpected character `{found}` at y={y}, x={x}")]
    MalformedLayout { found: char, x: usize, y: usize },

    #[error("row {y} has {found} cells, expected {expected}")]
    RaggedLayout {
        y: usize,
        expected: usize,
        found: usize,
    },

    #[error("navigation worker panicked")]
    WorkerPanicked,
}
