use super::direction::Direction;
use super::grid::{Grid, Idx, Tile, Value, SIZE};

pub type Score = u64;

/// GameState is what a host hands over when it asks for a move.
pub trait GameState {
    fn score(&self) -> Score;
    fn over(&self) -> bool;
    fn grid(&self) -> &Grid;
}

/// Board is a detached snapshot of a game that moves can be simulated on.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Board {
    grid: Grid,
    score: Score,
    over: bool,
}

// public methods
impl Board {
    pub fn new(grid: Grid, score: Score) -> Self {
        let mut board = Self {
            grid,
            score,
            over: false,
        };
        board.over = board.is_terminal();
        board
    }

    /// Copies the host's state; the host's `over` flag is taken as is.
    pub fn from_state<S: GameState + ?Sized>(state: &S) -> Self {
        Self {
            grid: state.grid().clone(),
            score: state.score(),
            over: state.over(),
        }
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn over(&self) -> bool {
        self.over
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Slides every tile towards `direction`, merging equal neighbours once per move.
    /// Returns whether any tile changed position.
    pub fn apply_move(&mut self, direction: Direction) -> bool {
        let vector = direction.vector();
        let mut moved = false;
        self.grid.prepare_tiles();

        for x in traversal(vector.0) {
            for y in traversal(vector.1) {
                let cell = Idx(x, y);
                let tile = match self.grid.cell_content(&cell) {
                    Some(tile) => tile,
                    None => continue,
                };
                let (farthest, next) = self.find_farthest_position(cell, vector);
                let blocker = next.and_then(|n| self.grid.cell_content(&n).map(|t| (n, t)));

                let target = match blocker {
                    Some((next, other)) if other.value() == tile.value() && !other.merged() => {
                        let merged = Tile::merged_from(tile.value());
                        self.grid.remove_tile(&cell);
                        self.grid.insert_tile(&next, merged);
                        self.score += Score::from(merged.value());
                        next
                    }
                    _ => {
                        self.grid.move_tile(&cell, &farthest);
                        farthest
                    }
                };

                if target != cell {
                    moved = true;
                }
            }
        }
        moved
    }

    /// Places a new tile of `value` on the empty cell `idx`.
    pub fn spawn_tile(&mut self, idx: Idx, value: Value) {
        debug_assert!(self.grid.cell_available(&idx), "{} is occupied", idx);
        self.grid.insert_tile(&idx, Tile::new(value));
        if !self.grid.cells_available() {
            self.over = self.is_terminal();
        }
    }

    /// A board is terminal once it is full and no direction changes it.
    pub fn is_terminal(&self) -> bool {
        !self.grid.cells_available() && !self.moves_available()
    }

    pub fn moves_available(&self) -> bool {
        Direction::ALL
            .iter()
            .any(|direction| self.clone().apply_move(*direction))
    }
}

// private methods
impl Board {
    fn find_farthest_position(&self, cell: Idx, vector: (isize, isize)) -> (Idx, Option<Idx>) {
        let mut previous = cell;
        loop {
            match previous.step(vector) {
                Some(next) if self.grid.cell_available(&next) => previous = next,
                next => return (previous, next),
            }
        }
    }
}

// lines farthest along the vector go first so that tiles ahead are settled before those behind
fn traversal(component: isize) -> [usize; SIZE] {
    let mut positions = [0, 1, 2, 3];
    if component == 1 {
        positions.reverse();
    }
    positions
}

impl GameState for Board {
    fn score(&self) -> Score {
        self.score
    }

    fn over(&self) -> bool {
        self.over
    }

    fn grid(&self) -> &Grid {
        &self.grid
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "score: {}", self.score)?;
        write!(f, "{}", self.grid)
    }
}
