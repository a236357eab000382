//! Walking through a maze by hand

use crate::{Direction, Maze, MazeError, Point};

/// Player making moves from the start of a maze
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Player {
    position: Point,
    moves: usize,
}

impl Player {
    pub fn new(maze: &Maze) -> Self {
        Self {
            position: maze.start(),
            moves: 0,
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Number of moves taken so far
    pub fn moves(&self) -> usize {
        self.moves
    }

    /// Step in `direction`, unless a wall is in the way.
    ///
    /// Returns whether the player moved.
    pub fn try_move(&mut self, maze: &Maze, direction: Direction) -> bool {
        if !maze.is_open(self.position, direction) {
            return false;
        }
        match maze.neighbor(self.position, direction) {
            Some(next) => {
                self.position = next;
                self.moves += 1;
                true
            }
            None => false,
        }
    }

    /// Replay a string of moves, see [Direction::from_char].
    ///
    /// Whitespace is skipped and moves into walls are ignored. Replay stops
    /// when the goal is reached. Returns the number of moves taken.
    pub fn apply(&mut self, maze: &Maze, moves: &str) -> Result<usize, MazeError> {
        let directions = moves
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| {
                Direction::from_char(c)
                    .ok_or_else(|| MazeError::Parse(format!("Unknown move `{}`", c)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let before = self.moves;
        for direction in directions {
            if self.has_won(maze) {
                break;
            }
            self.try_move(maze, direction);
        }
        Ok(self.moves - before)
    }

    pub fn has_won(&self, maze: &Maze) -> bool {
        self.position == maze.goal()
    }
}
