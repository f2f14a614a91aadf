//! CLI for maze generation

use clap::Parser;
use maze_mouse::{render, Grid, MazeGenerator};

/// Perfect maze generator
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Generated field width
    #[arg(long, default_value_t = 41)]
    width: usize,

    /// Generated field depth
    #[arg(long, default_value_t = 31)]
    depth: usize,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Print `#` and `.` instead of emojis
    #[arg(long)]
    plain: bool,
}

/// Generate maze, print it
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let mut grid = Grid::new(args.width, args.depth);
    MazeGenerator::new(args.seed).generate(&mut grid);

    if args.plain {
        println!("{}", grid.to_text());
    } else {
        println!("{}", render::emojis(&grid));
    }
    Ok(())
}
