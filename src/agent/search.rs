//! Depth-limited expectimax over simulated boards.
//!
//! Player layers take the best of the four moves, chance layers average over
//! every empty cell receiving a 2 or a 4. Every layer spends one unit of depth;
//! a board that is out of depth or stuck is scored with [`heuristic::evaluate`].

use crate::engine::board::Board;
use crate::engine::direction::Direction;
use crate::engine::grid::Value;

use super::heuristic;

/// Tiles the game may spawn and how likely each is.
pub const SPAWN_OUTCOMES: [(Value, f64); 2] = [(2, 0.9), (4, 0.1)];

/// Score of a player layer where no direction changes the board.
pub const NO_MOVE_SCORE: f64 = f64::NEG_INFINITY;

/// Turn selects which layer a search node expands.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Turn {
    Max,
    Chance,
}

/// The move chosen at the root and its expected score.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchResult {
    pub direction: Direction,
    pub score: f64,
}

/// Basic counters for one search.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SearchStats {
    pub nodes: u64,
    pub leaves: u64,
}

#[derive(Clone, Debug)]
pub struct Expectimax {
    depth: u32,
    stats: SearchStats,
}

impl Expectimax {
    pub fn new(depth: u32) -> Self {
        Self {
            depth,
            stats: SearchStats::default(),
        }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Counters from the most recent [`Expectimax::search`].
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Picks the move with the highest expected score, first direction winning ties.
    /// Returns None when the board is over or no direction moves it.
    pub fn search(&mut self, board: &Board) -> Option<SearchResult> {
        self.stats = SearchStats::default();
        if board.over() || self.depth == 0 {
            return None;
        }
        let depth = self.depth - 1;

        let mut best: Option<SearchResult> = None;
        for direction in Direction::ALL {
            let mut child = board.clone();
            if !child.apply_move(direction) {
                continue;
            }
            let score = self.expectimax(&child, Turn::Chance, depth);
            log::trace!("{} scores {}", direction, score);
            if best.map_or(true, |b| score > b.score) {
                best = Some(SearchResult { direction, score });
            }
        }

        log::debug!(
            "searched {} nodes ({} leaves) at depth {}, best {:?}",
            self.stats.nodes,
            self.stats.leaves,
            self.depth,
            best
        );
        best
    }

    /// Expected score of `board` when `turn` is about to play with `depth` plies left.
    pub fn expectimax(&mut self, board: &Board, turn: Turn, depth: u32) -> f64 {
        self.stats.nodes += 1;
        if board.over() || depth == 0 {
            return self.leaf(board);
        }
        match turn {
            Turn::Max => self.max_node(board, depth - 1),
            Turn::Chance => self.chance_node(board, depth - 1),
        }
    }
}

impl Expectimax {
    fn leaf(&mut self, board: &Board) -> f64 {
        self.stats.leaves += 1;
        heuristic::evaluate(board)
    }

    fn max_node(&mut self, board: &Board, depth: u32) -> f64 {
        let mut best = NO_MOVE_SCORE;
        for direction in Direction::ALL {
            let mut child = board.clone();
            if child.apply_move(direction) {
                best = best.max(self.expectimax(&child, Turn::Chance, depth));
            }
        }
        best
    }

    fn chance_node(&mut self, board: &Board, depth: u32) -> f64 {
        let cells = board.grid().available_cells();
        if cells.is_empty() {
            return self.leaf(board);
        }

        let mut total = 0.0;
        for (value, weight) in SPAWN_OUTCOMES {
            for cell in &cells {
                let mut child = board.clone();
                child.spawn_tile(*cell, value);
                total += self.expectimax(&child, Turn::Max, depth) * weight;
            }
        }
        total / cells.len() as f64
    }
}

#[cfg(test)]
mod test {
    use crate::engine::grid::{Grid, Idx};

    use super::*;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn board(rows: [[Value; 4]; 4], score: u64) -> Board {
        Board::new(Grid::from_rows(rows).expect("test rows are valid"), score)
    }

    #[test]
    fn zero_depth_is_a_leaf() {
        let b = board([[0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 64]], 100);
        let mut search = Expectimax::new(6);
        for turn in [Turn::Max, Turn::Chance] {
            assert_eq!(search.expectimax(&b, turn, 0), heuristic::evaluate(&b));
        }
    }

    #[test]
    fn terminal_board_is_a_leaf() {
        let b = board([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]], 500);
        assert!(b.over());
        let mut search = Expectimax::new(6);
        assert_eq!(search.expectimax(&b, Turn::Max, 4), heuristic::evaluate(&b));
        assert_eq!(search.stats().leaves, 1);
        assert_eq!(search.search(&b), None);
    }

    #[test]
    fn max_node_picks_best_move() {
        // one ply: only the moves themselves are compared
        let b = board([[0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 32, 32]], 100);
        let mut search = Expectimax::new(6);
        let right = {
            let mut child = b.clone();
            assert!(child.apply_move(Direction::Right));
            heuristic::evaluate(&child)
        };
        assert_eq!(search.expectimax(&b, Turn::Max, 1), right);
    }

    #[test]
    fn max_node_without_moves_scores_minimum() {
        let mut search = Expectimax::new(6);
        assert_eq!(
            search.expectimax(&Board::default(), Turn::Max, 3),
            NO_MOVE_SCORE
        );
        assert_eq!(search.search(&Board::default()), None);
    }

    #[test]
    fn single_free_cell_weights_spawns() {
        let b = board([[0, 4, 8, 16], [4, 8, 16, 32], [8, 16, 32, 64], [16, 32, 64, 128]], 200);
        let mut search = Expectimax::new(6);

        let mut outcome = |value| {
            let mut child = b.clone();
            child.spawn_tile(Idx(0, 0), value);
            search.expectimax(&child, Turn::Max, 2)
        };
        let two = outcome(2);
        let four = outcome(4);

        let mut search = Expectimax::new(6);
        assert_eq!(
            search.expectimax(&b, Turn::Chance, 3),
            0.9 * two + 0.1 * four
        );
    }

    #[test]
    fn chance_node_averages_over_free_cells() {
        let b = board([[2, 4, 8, 16], [4, 8, 16, 32], [8, 16, 32, 64], [16, 32, 0, 0]], 200);
        let mut search = Expectimax::new(6);

        let cells = b.grid().available_cells();
        assert_eq!(cells.len(), 2);
        let mut expected = 0.0;
        for (value, weight) in SPAWN_OUTCOMES {
            for cell in &cells {
                let mut child = b.clone();
                child.spawn_tile(*cell, value);
                expected += heuristic::evaluate(&child) * weight;
            }
        }
        assert_eq!(search.expectimax(&b, Turn::Chance, 1), expected / 2.0);
    }

    #[test]
    fn search_prefers_merging_into_corner() {
        init_logger();
        let b = board([[0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 32, 32]], 100);
        let mut search = Expectimax::new(6);

        let result = search.search(&b).expect("moves are available");
        assert_eq!(result.direction, Direction::Right);
        assert!(search.stats().nodes > 0);
        assert!(search.stats().leaves <= search.stats().nodes);
    }

    #[test]
    fn search_leaves_the_input_untouched() {
        let b = board([[2, 0, 0, 2], [0, 4, 0, 0], [0, 0, 0, 0], [8, 0, 0, 16]], 64);
        let before = b.clone();
        let mut search = Expectimax::new(4);
        assert!(search.search(&b).is_some());
        assert_eq!(b, before);
    }
}
