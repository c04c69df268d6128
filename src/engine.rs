pub mod board;
pub mod direction;
pub mod game;
pub mod grid;
