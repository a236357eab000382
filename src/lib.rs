//! Carve a perfect maze and find the shortest way through it
//!
//! # Examples
//! ## Generate and solve
//! ```
//! use perfect_maze::maze_generator::MazeGenerator;
//!
//! let mut gen = MazeGenerator::new(Some(13));
//! let maze = gen.generate(10).unwrap();
//! let solution = maze.solve().unwrap();
//! assert_eq!(solution.path.first(), Some(&maze.start()));
//! assert_eq!(solution.path.last(), Some(&maze.goal()));
//! solution.print_report();
//! ```
//!
//! ## Solve a maze read from text
//! ```
//! use perfect_maze::Maze;
//!
//! let maze_emojis = "
//! 🟫🟫🟫🟫🟫
//! 🟫🏃🟩🟩🟫
//! 🟫🟫🟫🟩🟫
//! 🟫❎🟩🟩🟫
//! 🟫🟫🟫🟫🟫";
//! let maze = Maze::parse_emojis(maze_emojis.trim()).unwrap();
//! let solution = maze.solve().unwrap();
//! assert_eq!(solution.moves(), 3);
//! ```

use std::fmt;
use std::thread;
use std::time::Duration;

use itertools::Itertools;
use petgraph::graph::NodeIndex;
use petgraph::{Graph, Undirected};
use thiserror::Error;

pub mod maze_generator;
pub mod player;
pub mod solver;

pub use solver::{solve, AStar, Frontier, Solution};

/// Errors from building, reading or solving a maze
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MazeError {
    /// Side length below two, or too large to index
    #[error("maze size must be at least 2, got {0}")]
    InvalidSize(usize),
    #[error("({x}, {y}) is outside of a {size}x{size} maze")]
    OutOfBounds { x: usize, y: usize, size: usize },
    #[error("there is no cell {direction:?} of {at}")]
    NoNeighbor { at: Point, direction: Direction },
    /// The search exhausted its frontier without reaching the goal
    #[error("no path from {start} to {goal}")]
    NotFound { start: Point, goal: Point },
    #[error("could not parse maze: {0}")]
    Parse(String),
}

/// Location in the maze
///
/// Ordering is row-major: first by `y`, then by `x`.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub struct Point {
    pub y: usize,
    pub x: usize,
}

impl Point {
    pub fn new(x: usize, y: usize) -> Self {
        Self { y, x }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the four sides of a cell
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum Direction {
    Top,
    Right,
    Bottom,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Top,
        Direction::Right,
        Direction::Bottom,
        Direction::Left,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Direction::Top => Direction::Bottom,
            Direction::Right => Direction::Left,
            Direction::Bottom => Direction::Top,
            Direction::Left => Direction::Right,
        }
    }

    /// Coordinate change `(dx, dy)` when stepping in this direction
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Top => (0, -1),
            Direction::Right => (1, 0),
            Direction::Bottom => (0, 1),
            Direction::Left => (-1, 0),
        }
    }

    /// Read a move: `U`, `R`, `D`, `L` in either case, or an arrow.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'U' | 'u' | '↑' => Some(Direction::Top),
            'R' | 'r' | '→' => Some(Direction::Right),
            'D' | 'd' | '↓' => Some(Direction::Bottom),
            'L' | 'l' | '←' => Some(Direction::Left),
            _ => None,
        }
    }
}

/// Walls around a cell, `true` blocks the passage
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Walls {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl Walls {
    pub const CLOSED: Walls = Walls {
        top: true,
        right: true,
        bottom: true,
        left: true,
    };

    pub fn get(&self, direction: Direction) -> bool {
        match direction {
            Direction::Top => self.top,
            Direction::Right => self.right,
            Direction::Bottom => self.bottom,
            Direction::Left => self.left,
        }
    }

    pub fn set(&mut self, direction: Direction, wall: bool) {
        match direction {
            Direction::Top => self.top = wall,
            Direction::Right => self.right = wall,
            Direction::Bottom => self.bottom = wall,
            Direction::Left => self.left = wall,
        }
    }
}

/// One grid position with its walls
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Cell {
    x: usize,
    y: usize,
    walls: Walls,
}

impl Cell {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn walls(&self) -> Walls {
        self.walls
    }

    pub fn has_wall(&self, direction: Direction) -> bool {
        self.walls.get(direction)
    }
}

/// Square grid of cells, with the start and goal of the maze
///
/// Cells are indexed `[y][x]`. Walls are kept symmetric: a wall is absent on
/// one side of a cell pair exactly when it is absent on the other side.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Maze {
    size: usize,
    cells: Vec<Vec<Cell>>,
    start: Point,
    goal: Point,
}

impl Maze {
    const S_START: char = '🏃';
    const S_GOAL: char = '❎';
    const S_VALID: char = '🟩';
    const S_WALL: char = '🟫';
    const S_PATH: char = '🟨';
    const S_OPEN: char = '🟧';
    const S_CLOSED: char = '🟦';

    /// Create a `size × size` maze with every wall in place.
    ///
    /// Returns error, if `size` is below two or `start` / `goal` lie
    /// outside of the grid.
    pub fn closed(size: usize, start: Point, goal: Point) -> Result<Self, MazeError> {
        Self::check_size(size)?;
        for point in [start, goal] {
            Self::check_bounds(size, point)?;
        }
        let cells = (0..size)
            .map(|y| {
                (0..size)
                    .map(|x| Cell {
                        x,
                        y,
                        walls: Walls::CLOSED,
                    })
                    .collect()
            })
            .collect();
        Ok(Maze {
            size,
            cells,
            start,
            goal,
        })
    }

    pub(crate) fn check_size(size: usize) -> Result<(), MazeError> {
        if size < 2 || size.checked_mul(size).is_none() {
            return Err(MazeError::InvalidSize(size));
        }
        Ok(())
    }

    fn check_bounds(size: usize, point: Point) -> Result<(), MazeError> {
        if point.x >= size || point.y >= size {
            return Err(MazeError::OutOfBounds {
                x: point.x,
                y: point.y,
                size,
            });
        }
        Ok(())
    }

    pub(crate) fn check(&self, point: Point) -> Result<(), MazeError> {
        Self::check_bounds(self.size, point)
    }

    /// Number of cells on a side
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn goal(&self) -> Point {
        self.goal
    }

    pub fn cell(&self, point: Point) -> Option<&Cell> {
        self.cells.get(point.y)?.get(point.x)
    }

    /// Rows of cells, top to bottom
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.cells
    }

    /// Cell next to `point` in `direction`, if it is inside the grid.
    /// Walls are not considered.
    pub fn neighbor(&self, point: Point, direction: Direction) -> Option<Point> {
        let (dx, dy) = direction.delta();
        let x = point.x.checked_add_signed(dx)?;
        let y = point.y.checked_add_signed(dy)?;
        (x < self.size && y < self.size).then_some(Point { y, x })
    }

    /// Whether one can step from `point` in `direction`
    pub fn is_open(&self, point: Point, direction: Direction) -> bool {
        match (self.cell(point), self.neighbor(point, direction)) {
            (Some(cell), Some(_)) => !cell.has_wall(direction),
            _ => false,
        }
    }

    /// Cells reachable from `point` in one step, in [Direction::ALL] order
    pub fn open_neighbors(&self, point: Point) -> impl Iterator<Item = Point> + '_ {
        Direction::ALL
            .into_iter()
            .filter(move |&direction| self.is_open(point, direction))
            .filter_map(move |direction| self.neighbor(point, direction))
    }

    /// Remove the wall between `point` and its neighbor in `direction`.
    ///
    /// Both sides of the wall are cleared. Returns the neighbor.
    pub fn remove_wall(&mut self, point: Point, direction: Direction) -> Result<Point, MazeError> {
        self.check(point)?;
        let next = self.neighbor(point, direction).ok_or(MazeError::NoNeighbor {
            at: point,
            direction,
        })?;
        self.open_between(point, direction, next);
        Ok(next)
    }

    /// Clear the wall pair between two adjacent in-bounds cells
    pub(crate) fn open_between(&mut self, point: Point, direction: Direction, next: Point) {
        self.cells[point.y][point.x].walls.set(direction, false);
        self.cells[next.y][next.x]
            .walls
            .set(direction.opposite(), false);
    }

    /// Number of passages, i.e. absent walls between adjacent cells
    pub fn passage_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .map(|cell| {
                [Direction::Right, Direction::Bottom]
                    .into_iter()
                    .filter(|&direction| self.is_open(cell.position(), direction))
                    .count()
            })
            .sum()
    }

    /// Graph of the passages between cells
    ///
    /// Weights of the nodes are the (y, x) coordinates of the cells. The
    /// returned matrix holds the node index of each cell, indexed `[y][x]`.
    pub fn to_graph(&self) -> (Graph<(usize, usize), (), Undirected>, Vec<Vec<NodeIndex>>) {
        let mut graph = Graph::new_undirected();
        let nodes: Vec<Vec<NodeIndex>> = (0..self.size)
            .map(|y| (0..self.size).map(|x| graph.add_node((y, x))).collect())
            .collect();

        for cell in self.cells.iter().flatten() {
            let point = cell.position();
            for direction in [Direction::Right, Direction::Bottom] {
                if let (true, Some(next)) =
                    (self.is_open(point, direction), self.neighbor(point, direction))
                {
                    graph.add_edge(nodes[point.y][point.x], nodes[next.y][next.x], ());
                }
            }
        }
        (graph, nodes)
    }

    /// Shortest path from the start of the maze to its goal
    pub fn solve(&self) -> Result<Solution, MazeError> {
        solve(self, self.start, self.goal)
    }

    /// Position of a cell in the square representation, as (row, column)
    fn square_of(point: Point) -> (usize, usize) {
        (2 * point.y + 1, 2 * point.x + 1)
    }

    /// Square representation of the maze, `2 * size + 1` squares on a side
    ///
    /// Cell `(x, y)` is at row `2y + 1`, column `2x + 1`; the squares between
    /// cells are walls or passages. Start and goal are marked.
    pub fn squares(&self) -> Vec<Vec<char>> {
        let side = 2 * self.size + 1;
        let mut squares: Vec<Vec<char>> = (0..side)
            .map(|_| (0..side).map(|_| Self::S_WALL).collect())
            .collect();

        for cell in self.cells.iter().flatten() {
            let point = cell.position();
            let (row, col) = Self::square_of(point);
            squares[row][col] = Self::S_VALID;
            if self.is_open(point, Direction::Right) {
                squares[row][col + 1] = Self::S_VALID;
            }
            if self.is_open(point, Direction::Bottom) {
                squares[row + 1][col] = Self::S_VALID;
            }
        }
        self.mark_endpoints(&mut squares);
        squares
    }

    fn mark_endpoints(&self, squares: &mut [Vec<char>]) {
        let (row, col) = Self::square_of(self.start);
        squares[row][col] = Self::S_START;
        let (row, col) = Self::square_of(self.goal);
        squares[row][col] = Self::S_GOAL;
    }

    fn join_squares(squares: &[Vec<char>]) -> String {
        squares.iter().map(|row| row.iter().join("")).join("\n")
    }

    /// Emoji representation of the maze, optionally with a path marked on it
    pub fn to_emojis(&self, path: Option<&[Point]>) -> String {
        let mut squares = self.squares();
        if let Some(path) = path {
            for point in path {
                let (row, col) = Self::square_of(*point);
                squares[row][col] = Self::S_PATH;
            }
            // Passages between consecutive cells
            for (a, b) in path.iter().tuple_windows() {
                if a.x.abs_diff(b.x) + a.y.abs_diff(b.y) == 1 {
                    squares[a.y + b.y + 1][a.x + b.x + 1] = Self::S_PATH;
                }
            }
            self.mark_endpoints(&mut squares);
        }
        Self::join_squares(&squares)
    }

    /// Parse maze from its emoji representation, see [Maze::to_emojis].
    ///
    /// Path marks are read as passages. The maze does not need to be
    /// perfect: loops and unreachable regions are accepted.
    ///
    /// Returns error, if
    /// - the squares do not form an odd square of at least five rows,
    /// - a character is unknown,
    /// - the border or a lattice corner is not a wall,
    /// - start or goal is missing, duplicated or not on a cell.
    pub fn parse_emojis(emojis: &str) -> Result<Self, MazeError> {
        let squares: Vec<Vec<char>> = emojis
            .lines()
            .map(|row| row.trim_end().chars().collect())
            .collect();

        let side = squares.len();
        if side < 5 || side % 2 == 0 {
            return Err(MazeError::Parse(format!(
                "expected an odd number of rows, at least 5, got {}",
                side
            )));
        }
        if let Some((y, row)) = squares.iter().enumerate().find(|(_, row)| row.len() != side) {
            return Err(MazeError::Parse(format!(
                "row {} has {} squares, expected {}",
                y,
                row.len(),
                side
            )));
        }

        let mut start = None;
        let mut goal = None;
        let mut passages = Vec::new();

        for (y, row) in squares.iter().enumerate() {
            for (x, c) in row.iter().enumerate() {
                let on_border = y == 0 || x == 0 || y == side - 1 || x == side - 1;
                let on_cell = y % 2 == 1 && x % 2 == 1;
                let on_corner = y % 2 == 0 && x % 2 == 0;
                let unexpected = || {
                    MazeError::Parse(format!("Unexpected character `{}` at y={}, x={}", c, y, x))
                };

                match *c {
                    Self::S_WALL if on_cell => return Err(unexpected()),
                    Self::S_WALL => (),
                    _ if on_border || on_corner => return Err(unexpected()),
                    Self::S_VALID | Self::S_PATH if on_cell => (),
                    // Wall square between two cells
                    Self::S_VALID | Self::S_PATH if y % 2 == 1 => {
                        passages.push((Point::new(x / 2 - 1, y / 2), Direction::Right))
                    }
                    Self::S_VALID | Self::S_PATH => {
                        passages.push((Point::new(x / 2, y / 2 - 1), Direction::Bottom))
                    }
                    Self::S_START if on_cell => {
                        if start.replace(Point::new(x / 2, y / 2)).is_some() {
                            return Err(MazeError::Parse("more than one start".into()));
                        }
                    }
                    Self::S_GOAL if on_cell => {
                        if goal.replace(Point::new(x / 2, y / 2)).is_some() {
                            return Err(MazeError::Parse("more than one goal".into()));
                        }
                    }
                    _ => return Err(unexpected()),
                }
            }
        }

        let start = start.ok_or_else(|| MazeError::Parse("Start is not found in maze".into()))?;
        let goal = goal.ok_or_else(|| MazeError::Parse("Goal is not found in maze".into()))?;
        let mut maze = Maze::closed(side / 2, start, goal)?;
        for (point, direction) in passages {
            maze.remove_wall(point, direction)?;
        }
        Ok(maze)
    }

    /// Play the search back on the terminal, then show the path
    ///
    /// ## Arguments
    /// - `step_ms`: Time step for each frame, milliseconds.
    pub fn playback(&self, step_ms: u64) -> Result<Solution, MazeError> {
        fn print_squares(squares: &[Vec<char>]) {
            print!("\x1B[2J\x1B[1;1H");
            println!("{}", Maze::join_squares(squares));
        }

        let mut search = AStar::new(self, self.start, self.goal)?;
        for frame in search.by_ref() {
            let mut squares = self.squares();
            for (cells, mark) in [(&frame.closed, Self::S_CLOSED), (&frame.open, Self::S_OPEN)] {
                for point in cells {
                    let (row, col) = Self::square_of(*point);
                    squares[row][col] = mark;
                }
            }
            self.mark_endpoints(&mut squares);
            print_squares(&squares);
            thread::sleep(Duration::from_millis(step_ms));
        }

        let solution = search.finish()?;
        print!("\x1B[2J\x1B[1;1H");
        println!("{}", self.to_emojis(Some(&solution.path)));
        Ok(solution)
    }
}

impl fmt::Display for Maze {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_emojis(None))
    }
}
