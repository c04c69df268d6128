//! Corner-anchored position evaluation.
//!
//! The largest tile is expected to sit in the bottom-right corner with the next
//! tiles laid out leftwards along the bottom row. The cascade below is tuned by
//! hand; its thresholds and asymmetries are kept exactly as they are.

use crate::engine::board::Board;
use crate::engine::grid::{Grid, Idx, Value, SIZE};

const CORNER: Idx = Idx(3, 3);
const SECOND: Idx = Idx(2, 3);
const THIRD: Idx = Idx(1, 3);
const FOURTH: Idx = Idx(0, 3);
// cell above the fourth ranked tile
const ABOVE_FOURTH: Idx = Idx(0, 2);

const BASE: f64 = 3.0;
// values above this earn the chain bonuses
const BONUS_THRESHOLD: Value = 16;

/// Scores a board; higher is better. Falls back to the raw score when the corner is empty.
pub fn evaluate(board: &Board) -> f64 {
    let score = board.score() as f64;
    match board.grid().value(&CORNER) {
        Some(corner) => score * corner_quality(board.grid(), corner),
        None => score,
    }
}

/// Multiplier rewarding the largest tile held in the corner.
pub fn corner_quality(grid: &Grid, corner: Value) -> f64 {
    let mut quality = BASE;
    if grid.tiles().any(|(_, t)| t.value() > corner) {
        quality = 0.0;
    }
    match grid.value(&SECOND) {
        Some(second) if quality != 0.0 => quality + check_second(grid, second),
        _ => quality,
    }
}

fn check_second(grid: &Grid, second: Value) -> f64 {
    let mut check = BASE;
    for value in upper_rows(grid) {
        if second < value {
            check *= 0.5;
        }
    }

    let third = grid.value(&THIRD);
    if let Some(third) = third {
        if 2 * second < third {
            check -= 3.0;
        }
        if second < third {
            check -= 3.0;
        }
        check += check_third(grid, second, third);
    }
    if let Some(fourth) = grid.value(&FOURTH) {
        check += check_fourth(grid, third, fourth);
    }
    check
}

fn check_third(grid: &Grid, second: Value, third: Value) -> f64 {
    let mut check = BASE;
    if third > BONUS_THRESHOLD && third == second {
        check += 1.0;
    }
    // compares the third tile against its own cell, so this bonus never fires
    if third > BONUS_THRESHOLD
        && f64::from(third) >= 0.5 * f64::from(second)
        && grid.value(&THIRD).is_some_and(|own| third < own)
    {
        check += 1.0;
    }
    if upper_rows(grid).any(|value| third < value) {
        check = 0.0;
    }
    if grid.value(&FOURTH).is_some_and(|fourth| third < fourth) {
        check -= 3.0;
    }
    check
}

fn check_fourth(grid: &Grid, third: Option<Value>, fourth: Value) -> f64 {
    let mut check = BASE;
    if fourth <= BONUS_THRESHOLD {
        return check;
    }
    if grid.value(&ABOVE_FOURTH) == Some(fourth) {
        check += 1.0;
    }
    if let Some(third) = third {
        if fourth == third {
            check += 3.0;
        }
        if f64::from(fourth) >= 0.5 * f64::from(third) && fourth < third {
            check += 1.0;
        }
    }
    check
}

// values on every row except the bottom one
fn upper_rows(grid: &Grid) -> impl Iterator<Item = Value> + '_ {
    grid.tiles()
        .filter(|(idx, _)| idx.y() < SIZE - 1)
        .map(|(_, t)| t.value())
}
