//! agent48 picks moves for an automated 2048 player.
//!
//! [`engine`] simulates the game on detached snapshots and [`agent`] searches
//! those snapshots with expectimax to choose the next direction.

pub mod agent;
pub mod engine;
pub mod error;

pub use agent::select_move;
