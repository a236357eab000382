//! Shortest paths through a maze with A* search
//!
//! The search keeps its own bookkeeping, indexed by cell, and only borrows
//! the [Maze]. Several searches can run over the same maze, and nothing has
//! to be reset between them.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::{debug, trace};

use crate::{Maze, MazeError, Point};

/// Manhattan distance between two cells
pub fn heuristic(a: Point, b: Point) -> usize {
    a.x.abs_diff(b.x) + a.y.abs_diff(b.y)
}

/// Find the shortest path from `start` to `goal`.
///
/// Returns [MazeError::NotFound] if the goal cannot be reached, and
/// [MazeError::OutOfBounds] if either point lies outside of the maze.
pub fn solve(maze: &Maze, start: Point, goal: Point) -> Result<Solution, MazeError> {
    AStar::new(maze, start, goal)?.finish()
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
enum Status {
    Unseen,
    Open,
    Closed,
}

/// Search state of one cell
#[derive(Clone, Copy, Debug)]
struct Node {
    /// Path cost from the start
    g: usize,
    /// `g` plus the estimate to the goal
    f: usize,
    parent: Option<usize>,
    status: Status,
}

impl Node {
    const UNSEEN: Node = Node {
        g: usize::MAX,
        f: usize::MAX,
        parent: None,
        status: Status::Unseen,
    };
}

/// Open set entry, ordered for a min-heap on `f`
///
/// Ties go to the entry pushed first.
#[derive(PartialEq, Eq, Debug)]
struct OpenEntry {
    f: usize,
    counter: usize,
    index: usize,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.counter.cmp(&self.counter))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// State of the search right after a cell has been settled
///
/// Both sets are in row-major order.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Frontier {
    /// The cell that was just taken off the open set
    pub current: Point,
    /// Discovered cells that are not settled yet
    pub open: Vec<Point>,
    /// Settled cells, `current` included
    pub closed: Vec<Point>,
}

/// Solution to the maze
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Solution {
    /// The cells on the shortest path, including start & goal
    pub path: Vec<Point>,
    /// Number of cells the search settled
    pub expanded: usize,
}

impl Solution {
    /// Number of steps along the path
    pub fn moves(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    /// Print report
    pub fn print_report(&self) {
        println!(
            "The shortest path is {} moves ({} cells explored).",
            self.moves(),
            self.expanded
        );
    }
}

/// A* search from one cell to another
///
/// Iterating the search settles one cell per step and yields a [Frontier]
/// snapshot, which lets a caller present the search at its own pace. Use
/// [AStar::finish] to run the remaining steps and get the path.
///
/// # Examples
/// ```
/// use perfect_maze::{maze_generator::MazeGenerator, AStar};
///
/// let maze = MazeGenerator::new(Some(7)).generate(8).unwrap();
/// let mut search = AStar::new(&maze, maze.start(), maze.goal()).unwrap();
/// let frames = search.by_ref().count();
/// let solution = search.finish().unwrap();
/// assert_eq!(frames, solution.expanded);
/// ```
pub struct AStar<'a> {
    maze: &'a Maze,
    start: Point,
    goal: Point,
    nodes: Vec<Node>,
    open: BinaryHeap<OpenEntry>,
    counter: usize,
    expanded: usize,
    reached: bool,
    done: bool,
}

impl<'a> AStar<'a> {
    pub fn new(maze: &'a Maze, start: Point, goal: Point) -> Result<Self, MazeError> {
        maze.check(start)?;
        maze.check(goal)?;

        let size = maze.size();
        let mut search = Self {
            maze,
            start,
            goal,
            nodes: vec![Node::UNSEEN; size * size],
            open: BinaryHeap::new(),
            counter: 0,
            expanded: 0,
            reached: false,
            done: false,
        };
        let index = search.index(start);
        let f = heuristic(start, goal);
        search.nodes[index] = Node {
            g: 0,
            f,
            parent: None,
            status: Status::Open,
        };
        search.push(index, f);
        Ok(search)
    }

    fn index(&self, point: Point) -> usize {
        point.y * self.maze.size() + point.x
    }

    fn point(&self, index: usize) -> Point {
        let size = self.maze.size();
        Point::new(index % size, index / size)
    }

    fn push(&mut self, index: usize, f: usize) {
        self.open.push(OpenEntry {
            f,
            counter: self.counter,
            index,
        });
        self.counter += 1;
    }

    /// Settle the open cell with the lowest `f`
    ///
    /// Returns the settled cell, or `None` once the goal has been settled or
    /// the open set has run out.
    fn step(&mut self) -> Option<Point> {
        if self.done {
            return None;
        }
        while let Some(entry) = self.open.pop() {
            let node = self.nodes[entry.index];
            // Superseded by a cheaper entry for the same cell
            if node.status != Status::Open || entry.f != node.f {
                continue;
            }

            let current = self.point(entry.index);
            self.nodes[entry.index].status = Status::Closed;
            self.expanded += 1;

            if current == self.goal {
                self.reached = true;
                self.done = true;
                return Some(current);
            }

            let maze = self.maze;
            let g = node.g + 1;
            for next in maze.open_neighbors(current) {
                let index = self.index(next);
                let neighbor = self.nodes[index];
                if neighbor.status == Status::Closed {
                    continue;
                }
                if neighbor.status == Status::Unseen || g < neighbor.g {
                    let f = g + heuristic(next, self.goal);
                    self.nodes[index] = Node {
                        g,
                        f,
                        parent: Some(entry.index),
                        status: Status::Open,
                    };
                    self.push(index, f);
                }
            }
            trace!("Settled {} at cost {}", current, node.g);
            return Some(current);
        }

        self.done = true;
        None
    }

    fn frontier(&self, current: Point) -> Frontier {
        let mut open = Vec::new();
        let mut closed = Vec::new();
        for (index, node) in self.nodes.iter().enumerate() {
            match node.status {
                Status::Open => open.push(self.point(index)),
                Status::Closed => closed.push(self.point(index)),
                Status::Unseen => (),
            }
        }
        Frontier {
            current,
            open,
            closed,
        }
    }

    /// Run the search to the end and reconstruct the path.
    pub fn finish(mut self) -> Result<Solution, MazeError> {
        while self.step().is_some() {}

        if !self.reached {
            debug!(
                "No path from {} to {} after settling {} cells",
                self.start, self.goal, self.expanded
            );
            return Err(MazeError::NotFound {
                start: self.start,
                goal: self.goal,
            });
        }

        let mut path = Vec::new();
        let mut cursor = Some(self.index(self.goal));
        while let Some(index) = cursor {
            path.push(self.point(index));
            cursor = self.nodes[index].parent;
        }
        path.reverse();

        debug!(
            "Path from {} to {}: {} moves, {} cells settled",
            self.start,
            self.goal,
            path.len() - 1,
            self.expanded
        );
        Ok(Solution {
            path,
            expanded: self.expanded,
        })
    }
}

impl Iterator for AStar<'_> {
    type Item = Frontier;

    fn next(&mut self) -> Option<Frontier> {
        let current = self.step()?;
        Some(self.frontier(current))
    }
}

#[cfg(test)]
mod tests {
    use petgraph::algo::dijkstra;
    use rand::{rngs::mock::StepRng, rngs::StdRng, Rng, SeedableRng};

    use crate::maze_generator::MazeGenerator;
    use crate::solver::{heuristic, solve, AStar};
    use crate::{Direction, Maze, MazeError, Point};

    /// Each consecutive pair is adjacent with no wall in between
    fn assert_valid_path(maze: &Maze, path: &[Point], start: Point, goal: Point) {
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
        for pair in path.windows(2) {
            let step = Direction::ALL
                .into_iter()
                .find(|&d| maze.neighbor(pair[0], d) == Some(pair[1]));
            match step {
                Some(direction) => assert!(
                    maze.is_open(pair[0], direction),
                    "wall between {} and {}",
                    pair[0],
                    pair[1]
                ),
                None => panic!("{} and {} are not adjacent", pair[0], pair[1]),
            }
        }
    }

    #[test]
    fn manhattan_distance() {
        assert_eq!(heuristic(Point::new(0, 0), Point::new(0, 0)), 0);
        assert_eq!(heuristic(Point::new(1, 4), Point::new(3, 0)), 6);
        assert_eq!(heuristic(Point::new(3, 0), Point::new(1, 4)), 6);
    }

    #[test]
    fn follows_the_only_corridor() {
        let maze = MazeGenerator::from_rng(StepRng::new(0, 0))
            .generate(5)
            .unwrap();
        let solution = maze.solve().unwrap();

        let expected: Vec<Point> = [
            (0, 0),
            (1, 0),
            (2, 0),
            (3, 0),
            (4, 0),
            (4, 1),
            (4, 2),
            (4, 3),
            (4, 4),
            (3, 4),
            (2, 4),
            (1, 4),
            (0, 4),
        ]
        .into_iter()
        .map(|(x, y)| Point::new(x, y))
        .collect();
        assert_eq!(solution.path, expected);
        assert_eq!(solution.moves(), 12);
    }

    #[test]
    fn two_by_two_maze() {
        let maze = MazeGenerator::from_rng(StepRng::new(0, 0))
            .generate(2)
            .unwrap();
        let solution = maze.solve().unwrap();
        assert_eq!(
            solution.path,
            vec![
                Point::new(0, 0),
                Point::new(1, 0),
                Point::new(1, 1),
                Point::new(0, 1)
            ]
        );
    }

    #[test]
    fn start_is_goal() {
        let maze = MazeGenerator::new(Some(3)).generate(4).unwrap();
        let point = Point::new(2, 2);
        let solution = solve(&maze, point, point).unwrap();
        assert_eq!(solution.path, vec![point]);
        assert_eq!(solution.moves(), 0);
        assert_eq!(solution.expanded, 1);
    }

    #[test]
    fn matches_graph_distances() {
        let mut random = StdRng::seed_from_u64(99);
        for seed in 0..20 {
            for size in [2, 3, 5, 8, 13, 21] {
                let maze = MazeGenerator::new(Some(seed)).generate(size).unwrap();
                let (graph, nodes) = maze.to_graph();

                for _ in 0..5 {
                    let start = Point::new(random.gen_range(0..size), random.gen_range(0..size));
                    let goal = Point::new(random.gen_range(0..size), random.gen_range(0..size));
                    let distances = dijkstra(&graph, nodes[start.y][start.x], None, |_| 1usize);

                    let solution = solve(&maze, start, goal).unwrap();
                    assert_valid_path(&maze, &solution.path, start, goal);
                    assert_eq!(
                        Some(&solution.moves()),
                        distances.get(&nodes[goal.y][goal.x]),
                        "seed {} size {} from {} to {}",
                        seed,
                        size,
                        start,
                        goal
                    );
                }
            }
        }
    }

    #[test]
    fn shortest_path_through_loops() {
        // Every interior wall removed: many equally short paths
        let mut maze = Maze::closed(4, Point::new(0, 0), Point::new(3, 3)).unwrap();
        for y in 0..4 {
            for x in 0..4 {
                if x < 3 {
                    maze.remove_wall(Point::new(x, y), Direction::Right).unwrap();
                }
                if y < 3 {
                    maze.remove_wall(Point::new(x, y), Direction::Bottom).unwrap();
                }
            }
        }
        let solution = maze.solve().unwrap();
        assert_eq!(solution.moves(), 6);
        assert_valid_path(&maze, &solution.path, maze.start(), maze.goal());

        // Two ways around a loop, the left one is shorter
        let emojis = "
🟫🟫🟫🟫🟫🟫🟫
🟫🏃🟩🟩🟩🟩🟫
🟫🟩🟫🟫🟫🟩🟫
🟫🟩🟫🟩🟩🟩🟫
🟫🟩🟫🟩🟫🟫🟫
🟫🟩🟩🟩🟩❎🟫
🟫🟫🟫🟫🟫🟫🟫"
            .trim();
        let maze = Maze::parse_emojis(emojis).unwrap();
        let solution = maze.solve().unwrap();
        assert_eq!(solution.moves(), 4);
        assert_valid_path(&maze, &solution.path, maze.start(), maze.goal());
    }

    #[test]
    fn unreachable_goal() {
        let maze = Maze::closed(3, Point::new(0, 0), Point::new(2, 2)).unwrap();
        assert_eq!(
            maze.solve(),
            Err(MazeError::NotFound {
                start: Point::new(0, 0),
                goal: Point::new(2, 2)
            })
        );
    }

    #[test]
    fn points_outside_of_maze() {
        let maze = MazeGenerator::new(Some(1)).generate(3).unwrap();
        assert_eq!(
            solve(&maze, Point::new(0, 3), Point::new(0, 0)),
            Err(MazeError::OutOfBounds { x: 0, y: 3, size: 3 })
        );
        assert!(AStar::new(&maze, Point::new(0, 0), Point::new(9, 9)).is_err());
    }

    #[test]
    fn solving_twice_gives_same_path() {
        let maze = MazeGenerator::new(Some(11)).generate(16).unwrap();
        let first = maze.solve().unwrap();
        let second = maze.solve().unwrap();
        assert_eq!(first.moves(), second.moves());
        assert_eq!(first, second);
    }

    #[test]
    fn frontier_grows_one_cell_at_a_time() {
        let maze = MazeGenerator::new(Some(5)).generate(10).unwrap();
        let mut search = AStar::new(&maze, maze.start(), maze.goal()).unwrap();

        let mut frames = Vec::new();
        for frame in search.by_ref() {
            assert!(frame.closed.contains(&frame.current));
            assert!(!frame.open.contains(&frame.current));
            assert!(frame.closed.windows(2).all(|w| w[0] < w[1]));
            frames.push(frame);
        }
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(frame.closed.len(), i + 1);
        }
        assert_eq!(frames.first().map(|f| f.current), Some(maze.start()));
        assert_eq!(frames.last().map(|f| f.current), Some(maze.goal()));
        assert_eq!(search.next(), None);

        let solution = search.finish().unwrap();
        assert_eq!(solution.expanded, frames.len());
        assert_eq!(solution, maze.solve().unwrap());
    }

    #[test]
    fn frontier_ends_without_goal() {
        let mut maze = Maze::closed(3, Point::new(0, 0), Point::new(2, 2)).unwrap();
        maze.remove_wall(Point::new(0, 0), Direction::Right).unwrap();

        let mut search = AStar::new(&maze, maze.start(), maze.goal()).unwrap();
        let settled: Vec<Point> = search.by_ref().map(|frame| frame.current).collect();
        assert_eq!(settled, vec![Point::new(0, 0), Point::new(1, 0)]);
        assert!(search.finish().is_err());
    }
}
