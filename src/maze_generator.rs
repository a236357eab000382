//! Maze generation

use log::debug;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use crate::{Direction, Maze, MazeError, Point};

/// Perfect maze generator
///
/// Passages are carved by randomized depth-first traversal ("recursive
/// backtracking"), so the result is a spanning tree over the grid: exactly
/// one path between any two cells.
pub struct MazeGenerator<R = StdRng> {
    random: R,
}

impl MazeGenerator {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            random: if let Some(state) = seed {
                StdRng::seed_from_u64(state)
            } else {
                StdRng::from_entropy()
            },
        }
    }
}

impl<R: Rng> MazeGenerator<R> {
    /// Generator drawing from the given random source
    pub fn from_rng(random: R) -> Self {
        Self { random }
    }

    /// Generate a `size × size` perfect maze.
    ///
    /// Start lies on a randomly chosen edge of the grid, goal on the opposite
    /// edge. Carving begins at the start.
    ///
    /// Returns error, if `size` is below two.
    pub fn generate(&mut self, size: usize) -> Result<Maze, MazeError> {
        Maze::check_size(size)?;

        let (start, goal) = self.pick_endpoints(size);
        let mut maze = Maze::closed(size, start, goal)?;
        self.carve(&mut maze, start);

        debug!(
            "Generated {0}x{0} maze from {1} to {2}, {3} passages",
            size,
            start,
            goal,
            maze.passage_count()
        );
        Ok(maze)
    }

    /// Pick start on one side of the grid and goal on the opposite side
    fn pick_endpoints(&mut self, size: usize) -> (Point, Point) {
        let last = size - 1;
        let side: usize = self.random.gen_range(0..4);
        let a = self.random.gen_range(0..size);
        let b = self.random.gen_range(0..size);
        match side {
            // Top
            0 => (Point::new(a, 0), Point::new(b, last)),
            // Right
            1 => (Point::new(last, a), Point::new(0, b)),
            // Bottom
            2 => (Point::new(a, last), Point::new(b, 0)),
            // Left
            _ => (Point::new(0, a), Point::new(last, b)),
        }
    }

    fn shuffled_directions(&mut self) -> [Direction; 4] {
        let mut directions = Direction::ALL;
        directions.shuffle(&mut self.random);
        directions
    }

    /// Carve passages depth first, starting from `start`
    ///
    /// Each stack frame holds a cell, its directions in the order drawn when
    /// the cell was entered, and the next direction to try. A cell is entered
    /// at most once, so the loop ends after every cell has been visited.
    fn carve(&mut self, maze: &mut Maze, start: Point) {
        let size = maze.size();
        let mut visited = vec![vec![false; size]; size];
        visited[start.y][start.x] = true;

        let mut stack = vec![(start, self.shuffled_directions(), 0)];
        while let Some((current, directions, cursor)) = stack.last_mut() {
            let Some(&direction) = directions.get(*cursor) else {
                stack.pop();
                continue;
            };
            *cursor += 1;
            let current = *current;

            if let Some(next) = maze.neighbor(current, direction) {
                if !visited[next.y][next.x] {
                    maze.open_between(current, direction, next);
                    visited[next.y][next.x] = true;
                    stack.push((next, self.shuffled_directions(), 0));
                }
            }
        }
    }
}
