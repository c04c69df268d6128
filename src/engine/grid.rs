use std::str::FromStr;

use rand::seq::IteratorRandom;
use rand::Rng;

use crate::error::{Error, Result};

/// Width and height of the board.
pub const SIZE: usize = 4;

pub type Value = u32;

/// Idx is a cell coordinate: `Idx(x, y)` with x the column and y the row.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Idx(pub usize, pub usize);

impl std::fmt::Display for Idx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "idx({0},{1})", self.0, self.1)
    }
}

impl Idx {
    #[inline(always)]
    pub fn x(&self) -> usize {
        self.0
    }

    #[inline(always)]
    pub fn y(&self) -> usize {
        self.1
    }

    /// The neighbouring cell along `vector`, or None when it falls off the grid.
    pub fn step(&self, (dx, dy): (isize, isize)) -> Option<Idx> {
        let x = self.0.checked_add_signed(dx)?;
        let y = self.1.checked_add_signed(dy)?;
        (x < SIZE && y < SIZE).then_some(Idx(x, y))
    }
}

/// Tile is a power-of-two value sitting in a cell.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Tile {
    value: Value,
    // set on tiles produced by a merge during the current move only
    merged: bool,
}

impl Tile {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            merged: false,
        }
    }

    pub(crate) fn merged_from(value: Value) -> Self {
        Self {
            value: value * 2,
            merged: true,
        }
    }

    pub fn value(&self) -> Value {
        self.value
    }

    pub fn merged(&self) -> bool {
        self.merged
    }
}

/// Grid is a 4x4 container of optional tiles stored in a flat array, so cloning is a plain copy.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Grid {
    cells: [Option<Tile>; SIZE * SIZE],
}

// public methods
impl Grid {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a grid from rows of values where 0 marks an empty cell.
    pub fn from_rows(rows: [[Value; SIZE]; SIZE]) -> Result<Self> {
        let mut grid = Self::empty();
        for (y, row) in rows.iter().enumerate() {
            for (x, value) in row.iter().enumerate() {
                let idx = Idx(x, y);
                match *value {
                    0 => continue,
                    v if v >= 2 && v.is_power_of_two() => grid.insert_tile(&idx, Tile::new(v)),
                    v => return Err(Error::InvalidTileValue { value: v, idx }),
                }
            }
        }
        Ok(grid)
    }

    pub fn within_bounds(&self, idx: &Idx) -> bool {
        idx.x() < SIZE && idx.y() < SIZE
    }

    pub fn cell_content(&self, idx: &Idx) -> Option<Tile> {
        if !self.within_bounds(idx) {
            return None;
        }
        self.cells[Self::offset(idx)]
    }

    pub fn value(&self, idx: &Idx) -> Option<Value> {
        self.cell_content(idx).map(|t| t.value())
    }

    pub fn cell_available(&self, idx: &Idx) -> bool {
        self.within_bounds(idx) && self.cell_content(idx).is_none()
    }

    pub fn cells_available(&self) -> bool {
        self.cells.iter().any(Option::is_none)
    }

    pub fn available_cells(&self) -> Vec<Idx> {
        Self::indices()
            .filter(|idx| self.cells[Self::offset(idx)].is_none())
            .collect()
    }

    pub fn random_available_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Idx> {
        Self::indices()
            .filter(|idx| self.cells[Self::offset(idx)].is_none())
            .choose(rng)
    }

    pub fn insert_tile(&mut self, idx: &Idx, tile: Tile) {
        *self.slot_mut(idx) = Some(tile);
    }

    pub fn remove_tile(&mut self, idx: &Idx) -> Option<Tile> {
        self.slot_mut(idx).take()
    }

    /// Moves whatever occupies `from` into `to`.
    pub fn move_tile(&mut self, from: &Idx, to: &Idx) {
        if from == to {
            return;
        }
        if let Some(tile) = self.remove_tile(from) {
            self.insert_tile(to, tile);
        }
    }

    /// Clears the merged marker on every tile ahead of a new move.
    pub fn prepare_tiles(&mut self) {
        for tile in self.cells.iter_mut().flatten() {
            tile.merged = false;
        }
    }

    /// Every occupied cell in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = (Idx, Tile)> + '_ {
        Self::indices().filter_map(|idx| self.cell_content(&idx).map(|tile| (idx, tile)))
    }

    /// Plain values by row, 0 for empty cells.
    pub fn values(&self) -> [[Value; SIZE]; SIZE] {
        let mut rows = [[0; SIZE]; SIZE];
        for (idx, tile) in self.tiles() {
            rows[idx.y()][idx.x()] = tile.value();
        }
        rows
    }

    pub fn max_value(&self) -> Value {
        self.tiles().map(|(_, t)| t.value()).max().unwrap_or(0)
    }
}

// private methods
impl Grid {
    fn indices() -> impl Iterator<Item = Idx> {
        (0..SIZE).flat_map(|y| (0..SIZE).map(move |x| Idx(x, y)))
    }

    fn offset(idx: &Idx) -> usize {
        assert!(idx.x() < SIZE, "invalid x coordinate {}", idx.x());
        assert!(idx.y() < SIZE, "invalid y coordinate {}", idx.y());
        idx.y() * SIZE + idx.x()
    }

    fn slot_mut(&mut self, idx: &Idx) -> &mut Option<Tile> {
        &mut self.cells[Self::offset(idx)]
    }
}

impl FromStr for Grid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let values = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|v| !v.is_empty())
            .map(Value::from_str)
            .collect::<std::result::Result<Vec<Value>, _>>()?;
        if values.len() != SIZE * SIZE {
            return Err(Error::InvalidCellCount(values.len()));
        }
        let mut rows = [[0; SIZE]; SIZE];
        for (i, value) in values.into_iter().enumerate() {
            rows[i / SIZE][i % SIZE] = value;
        }
        Self::from_rows(rows)
    }
}

impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.values() {
            for value in row {
                match value {
                    0 => write!(f, "{:>6}", ".")?,
                    v => write!(f, "{:>6}", v)?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use rstest::*;

    use super::*;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    #[test]
    fn empty_grid_has_every_cell_available() {
        let grid = Grid::empty();
        assert!(grid.cells_available());
        assert_eq!(grid.available_cells().len(), SIZE * SIZE);
        assert_eq!(grid.tiles().count(), 0);
        assert_eq!(grid.max_value(), 0);
    }

    #[test]
    fn from_rows_places_values_by_column_and_row() {
        let grid = Grid::from_rows([[2, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 4, 8]])
            .expect("valid rows");
        assert_eq!(grid.value(&Idx(0, 0)), Some(2));
        assert_eq!(grid.value(&Idx(2, 3)), Some(4));
        assert_eq!(grid.value(&Idx(3, 3)), Some(8));
        assert_eq!(grid.value(&Idx(3, 2)), None);
        assert_eq!(grid.max_value(), 8);
    }

    #[rstest]
    #[case::three(3)]
    #[case::one(1)]
    #[case::six(6)]
    fn from_rows_rejects_non_powers_of_two(#[case] value: Value) {
        let result = Grid::from_rows([[0, 0, 0, 0], [0, value, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
        assert!(matches!(
            result,
            Err(Error::InvalidTileValue { idx: Idx(1, 1), .. })
        ));
    }

    #[rstest]
    #[case::origin(Idx(0, 0), (-1, 0), None)]
    #[case::top_edge(Idx(2, 0), (0, -1), None)]
    #[case::right_edge(Idx(3, 1), (1, 0), None)]
    #[case::bottom_edge(Idx(1, 3), (0, 1), None)]
    #[case::inside(Idx(1, 1), (1, 0), Some(Idx(2, 1)))]
    #[case::inside_up(Idx(1, 1), (0, -1), Some(Idx(1, 0)))]
    fn step(#[case] idx: Idx, #[case] vector: (isize, isize), #[case] expected: Option<Idx>) {
        assert_eq!(idx.step(vector), expected);
    }

    #[test]
    fn out_of_bounds_reads_are_empty() {
        let grid = Grid::from_rows([[2, 2, 2, 2]; SIZE]).expect("valid rows");
        assert!(!grid.within_bounds(&Idx(4, 0)));
        assert_eq!(grid.cell_content(&Idx(4, 0)), None);
        assert!(!grid.cell_available(&Idx(0, 4)));
        assert!(!grid.cells_available());
    }

    #[test]
    #[should_panic(expected = "invalid x coordinate 4")]
    fn out_of_bounds_writes_panic() {
        let mut grid = Grid::empty();
        grid.insert_tile(&Idx(4, 0), Tile::new(2));
    }

    #[test]
    fn insert_move_remove() {
        let mut grid = Grid::empty();
        grid.insert_tile(&Idx(1, 2), Tile::new(4));
        grid.move_tile(&Idx(1, 2), &Idx(3, 2));
        assert_eq!(grid.value(&Idx(1, 2)), None);
        assert_eq!(grid.value(&Idx(3, 2)), Some(4));
        assert_eq!(grid.remove_tile(&Idx(3, 2)), Some(Tile::new(4)));
        assert_eq!(grid, Grid::empty());
    }

    #[test]
    fn prepare_tiles_clears_merged_marker() {
        let mut grid = Grid::empty();
        grid.insert_tile(&Idx(0, 0), Tile::merged_from(2));
        assert!(grid.cell_content(&Idx(0, 0)).is_some_and(|t| t.merged()));
        grid.prepare_tiles();
        assert_eq!(grid.cell_content(&Idx(0, 0)), Some(Tile::new(4)));
    }

    #[test]
    fn random_available_cell_only_picks_free_cells() {
        let mut grid = Grid::from_rows([[2, 2, 2, 2]; SIZE]).expect("valid rows");
        let mut rng = rng();
        assert_eq!(grid.random_available_cell(&mut rng), None);

        grid.remove_tile(&Idx(2, 1));
        for _ in 0..8 {
            assert_eq!(grid.random_available_cell(&mut rng), Some(Idx(2, 1)));
        }
    }

    #[test]
    fn parse() {
        let grid: Grid = "0 2 0 0, 0 0 0 0, 0 0 0 0, 0 0 4 1024"
            .parse()
            .expect("valid board");
        assert_eq!(
            grid.values(),
            [[0, 2, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 4, 1024]]
        );
    }

    #[rstest]
    #[case::too_short("2 2 2")]
    #[case::too_long("0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0")]
    fn parse_rejects_wrong_cell_count(#[case] s: &str) {
        assert!(matches!(s.parse::<Grid>(), Err(Error::InvalidCellCount(_))));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            "0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 x".parse::<Grid>(),
            Err(Error::ParseValue(_))
        ));
    }
}
