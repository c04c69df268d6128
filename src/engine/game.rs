use rand::distributions::{Distribution, WeightedIndex};
use rand::RngCore;

use super::board::{Board, GameState, Score};
use super::direction::Direction;
use super::grid::{Grid, Value};
use crate::error::Result;

const NEW_TILE_CHOICES: [Value; 2] = [2, 4];
const NEW_TILE_WEIGHTS: [u8; 2] = [9, 1];
const START_TILES: usize = 2;

/// Game is a live 2048 game that keeps track of the history of its rounds.
pub struct Game {
    rng: Box<dyn RngCore>,
    rounds: Vec<Board>,
    new_tile_weighted_index: WeightedIndex<u8>,
}

impl Game {
    /// Starts a game with two random tiles drawn from the given random number generator.
    pub fn new(rng: impl RngCore + 'static) -> Result<Self> {
        let mut game = Self::from_board(rng, Board::default())?;
        let mut start = Board::default();
        for _ in 0..START_TILES {
            game.add_random_tile(&mut start);
        }
        game.rounds[0] = start;
        Ok(game)
    }

    /// Continues a game from an existing position.
    pub fn from_board(rng: impl RngCore + 'static, board: Board) -> Result<Self> {
        let mut rounds = Vec::with_capacity(2000);
        rounds.push(board);
        Ok(Self {
            rng: Box::new(rng),
            rounds,
            new_tile_weighted_index: WeightedIndex::new(NEW_TILE_WEIGHTS)?,
        })
    }

    pub fn score(&self) -> Score {
        self.current().score()
    }

    pub fn current(&self) -> &Board {
        self.rounds
            .last()
            .expect("a game must always have at least one round")
    }

    /// Number of moves played so far.
    pub fn moves(&self) -> usize {
        self.rounds.len() - 1
    }

    pub fn max_tile(&self) -> Value {
        self.current().grid().max_value()
    }

    pub fn is_game_over(&self) -> bool {
        self.current().over()
    }

    /// Applies `direction` and spawns a random tile if anything moved.
    /// Returns false and records nothing when the move changes nothing.
    pub fn shift(&mut self, direction: Direction) -> bool {
        let mut round = self.current().clone();
        if !round.apply_move(direction) {
            return false;
        }
        self.add_random_tile(&mut round);
        self.rounds.push(round);
        true
    }
}

impl Game {
    fn add_random_tile(&mut self, board: &mut Board) {
        if let Some(idx) = board.grid().random_available_cell(&mut self.rng) {
            let value = NEW_TILE_CHOICES[self.new_tile_weighted_index.sample(&mut self.rng)];
            board.spawn_tile(idx, value);
        }
    }
}

impl GameState for Game {
    fn score(&self) -> Score {
        self.current().score()
    }

    fn over(&self) -> bool {
        self.current().over()
    }

    fn grid(&self) -> &Grid {
        self.current().grid()
    }
}
