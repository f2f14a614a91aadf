//! CLI for watching a mouse look for cheese

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use log::info;
use maze_mouse::analysis::MazeGraph;
use maze_mouse::render::TerminalRenderer;
use maze_mouse::{Grid, MazeGenerator, NavigationConfig, Point, RunOutcome, Session};
use rand::{rngs::StdRng, seq::IteratorRandom, SeedableRng};

/// Generate a maze and let a wall-following mouse find the cheese
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Maze width, bumped to the next odd number
    #[arg(long, default_value_t = 41)]
    width: usize,

    /// Maze depth, bumped to the next odd number
    #[arg(long, default_value_t = 31)]
    depth: usize,

    /// Random seed for the maze, the placements and the mouse
    #[arg(long)]
    seed: Option<u64>,

    /// Cheese position as `X,Y`. Random passage if not given.
    #[arg(long, value_parser = parse_point)]
    cheese: Option<Point>,

    /// Mouse position as `X,Y`. Random passage if not given.
    #[arg(long, value_parser = parse_point)]
    mouse: Option<Point>,

    /// Display the chase on the terminal
    #[arg(short, long)]
    playback: bool,

    /// Playback frame length in milliseconds
    #[arg(short, long, default_value_t = 50)]
    frame_length: u64,
}

const MAZE_STREAM: u64 = 0;
const PLACEMENT_STREAM: u64 = 1;
const BEARING_STREAM: u64 = 2;

fn parse_point(s: &str) -> Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `X,Y`, got `{s}`"))?;
    let x = x.trim().parse().map_err(|e| format!("bad x `{x}`: {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("bad y `{y}`: {e}"))?;
    Ok(Point::new(x, y))
}

/// Independent seed for one random stream, so the maze, the placements
/// and the mouse's bearing do not replay the same numbers
fn derived_seed(seed: Option<u64>, stream: u64) -> Option<u64> {
    seed.map(|state| state.wrapping_add(stream))
}

fn random_passage(grid: &Grid, random: &mut StdRng) -> anyhow::Result<Point> {
    grid.passages()
        .choose(random)
        .context("Maze has no passages")
}

/// Generate maze, place cheese and mouse, print report
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let config = NavigationConfig {
        step_delay: args
            .playback
            .then(|| Duration::from_millis(args.frame_length)),
        seed: derived_seed(args.seed, BEARING_STREAM),
    };
    let generator = MazeGenerator::new(derived_seed(args.seed, MAZE_STREAM));
    let mut session = Session::new(args.width, args.depth, generator, config);

    let graph = MazeGraph::from_grid(session.grid());
    info!(
        "maze has {} passages and {} dead ends",
        graph.node_count(),
        graph.dead_ends()
    );

    let mut random = match derived_seed(args.seed, PLACEMENT_STREAM) {
        Some(state) => StdRng::seed_from_u64(state),
        None => StdRng::from_entropy(),
    };
    let cheese = match args.cheese {
        Some(at) => at,
        None => random_passage(session.grid(), &mut random)?,
    };
    let mouse = match args.mouse {
        Some(at) => at,
        None => random_passage(session.grid(), &mut random)?,
    };

    if args.playback {
        let renderer = Arc::new(TerminalRenderer::stdout(session.grid()));
        session = session.with_observer(renderer);
    }

    session
        .place_goal(cheese.x, cheese.y)
        .context("Could not place the cheese")?;
    session
        .place_agent_and_start(mouse.x, mouse.y)
        .context("Could not place the mouse")?;

    match session.wait()? {
        RunOutcome::Reached { steps } => {
            println!("The mouse found the cheese after {steps} steps.");
            Ok(())
        }
        RunOutcome::Cancelled { steps } => bail!("The mouse gave up after {steps} steps"),
    }
}
