//! Move selection for an automated 2048 player.
//!
//! ```
//! use agent48::agent::select_move;
//! use agent48::engine::board::Board;
//! use agent48::engine::direction::Direction;
//! use agent48::engine::grid::Grid;
//!
//! // below the score cutoff the agent falls back to Right, Down, then Left
//! let grid = Grid::from_rows([[0, 0, 0, 2], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]).unwrap();
//! assert_eq!(select_move(&Board::new(grid, 0)), Direction::Down);
//! ```

pub mod heuristic;
pub mod search;

use crate::engine::board::{Board, GameState, Score};
use crate::engine::direction::Direction;

use search::Expectimax;

/// Default search depth in plies, counting player and chance layers alike.
pub const DEFAULT_DEPTH: u32 = 6;

/// Default score below which the agent skips the search.
pub const DEFAULT_SCORE_CUTOFF: Score = 60;

/// Configurable knobs for the agent.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AgentConfig {
    pub depth: u32,
    pub score_cutoff: Score,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            score_cutoff: DEFAULT_SCORE_CUTOFF,
        }
    }
}

/// Policy names the strategy used for one decision.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Policy {
    /// Fixed preference for Right, then Down, then Left.
    Shortcut,
    /// Full expectimax search.
    Expectimax,
}

impl Policy {
    pub fn for_score(score: Score, config: &AgentConfig) -> Self {
        if score < config.score_cutoff {
            Self::Shortcut
        } else {
            Self::Expectimax
        }
    }
}

#[derive(Clone, Debug)]
pub struct Agent {
    config: AgentConfig,
    expectimax: Expectimax,
}

impl Default for Agent {
    fn default() -> Self {
        Self::new(AgentConfig::default())
    }
}

impl Agent {
    pub fn new(config: AgentConfig) -> Self {
        Self {
            config,
            expectimax: Expectimax::new(config.depth),
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Chooses the next move for `state`. The state itself is never modified.
    pub fn select_move<S: GameState + ?Sized>(&mut self, state: &S) -> Direction {
        let board = Board::from_state(state);
        let policy = Policy::for_score(board.score(), &self.config);
        log::trace!("score {} selects {:?}", board.score(), policy);

        match policy {
            Policy::Shortcut => shortcut_move(&board),
            Policy::Expectimax => match self.expectimax.search(&board) {
                Some(result) => result.direction,
                None => {
                    log::warn!("no move changes the board, falling back to shortcut");
                    shortcut_move(&board)
                }
            },
        }
    }
}

/// Chooses a move for `state` with the default configuration.
pub fn select_move<S: GameState + ?Sized>(state: &S) -> Direction {
    Agent::default().select_move(state)
}

/// Right if it moves anything, else Down if it does, else Left. Up is never chosen.
pub fn shortcut_move(board: &Board) -> Direction {
    [Direction::Right, Direction::Down]
        .into_iter()
        .find(|direction| board.clone().apply_move(*direction))
        .unwrap_or(Direction::Left)
}
