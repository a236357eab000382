//! CLI for maze solving

use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};

use anyhow::Context;
use clap::Parser;
use perfect_maze::{player::Player, Maze};

/// The shortest way through a maze
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Display the search on the terminal
    #[arg(short, long)]
    playback: bool,

    /// Playback frame length in milliseconds
    #[arg(short, long, default_value_t = 50)]
    frame_length: u64,

    /// Moves to replay from the start (U, R, D, L or arrows), compared
    /// against the shortest path
    #[arg(short, long)]
    moves: Option<String>,

    /// File, where to read the maze. Use `-` for stdin.
    file: PathBuf,
}

/// Read maze from file, print output
fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let emojis = if args.file.to_str() == Some("-") {
        let mut buf = String::new();
        io::stdin().lock().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(&args.file)
            .with_context(|| format!("Could not read {}", args.file.display()))?
    };
    let maze = Maze::parse_emojis(emojis.trim())?;

    let solution = if args.playback {
        maze.playback(args.frame_length)
    } else {
        maze.solve()
    }
    .context("Maze has no solution")?;

    if let Some(moves) = args.moves {
        let mut player = Player::new(&maze);
        let taken = player.apply(&maze, &moves)?;
        if player.has_won(&maze) {
            println!(
                "The player reached the goal in {} moves, {} more than needed.",
                taken,
                taken.saturating_sub(solution.moves())
            );
        } else {
            println!(
                "The player stopped at {} after {} moves.",
                player.position(),
                taken
            );
        }
    }
    solution.print_report();
    Ok(())
}
