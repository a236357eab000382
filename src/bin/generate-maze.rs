//! CLI for maze generation

use clap::Parser;
use perfect_maze::maze_generator::MazeGenerator;

/// Perfect maze generator
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of cells on a side
    #[arg(long, default_value_t = 15)]
    size: usize,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Mark the shortest path from start to goal
    #[arg(long)]
    solve: bool,
}

/// Generate maze, print it
fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut gen = MazeGenerator::new(args.seed);
    let maze = gen.generate(args.size)?;
    let path = if args.solve {
        Some(maze.solve()?.path)
    } else {
        None
    };
    println!("{}", maze.to_emojis(path.as_deref()));
    Ok(())
}
