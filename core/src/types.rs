use core::fmt;
use serde::{Deserialize, Serialize};

/// Single axis used for row/column indices and board dimensions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// A cell position, `row` from the top and `col` from the left.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub row: Coord,
    pub col: Coord,
}

impl Pos {
    pub const fn new(row: Coord, col: Coord) -> Self {
        Self { row, col }
    }

    /// Moves by `(d_row, d_col)`, `None` when the result falls outside `bounds`.
    pub fn offset(self, (d_row, d_col): (i8, i8), bounds: BoardSize) -> Option<Pos> {
        let row = self.row.checked_add_signed(d_row)?;
        let col = self.col.checked_add_signed(d_col)?;
        let pos = Pos::new(row, col);
        bounds.contains(pos).then_some(pos)
    }

    pub fn neighbors(self, bounds: BoardSize) -> Neighbors {
        Neighbors::new(self, bounds)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSize {
    pub rows: Coord,
    pub cols: Coord,
}

impl BoardSize {
    pub const fn new(rows: Coord, cols: Coord) -> Self {
        Self { rows, cols }
    }

    pub const fn total_cells(&self) -> CellCount {
        (self.rows as CellCount).saturating_mul(self.cols as CellCount)
    }

    pub const fn contains(&self, pos: Pos) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Every position in row-major order.
    pub fn positions(self) -> impl Iterator<Item = Pos> {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| Pos::new(row, col)))
    }
}

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Pos {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.row.into(), self.col.into()]
    }
}

impl ToNdIndex for BoardSize {
    type Output = (usize, usize);

    fn to_nd_index(self) -> Self::Output {
        (self.rows.into(), self.cols.into())
    }
}

/// Moore neighborhood offsets, clockwise from the top-left.
const OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
];

/// The up-to-8 in-bounds neighbors of a cell.
#[derive(Clone, Debug)]
pub struct Neighbors {
    center: Pos,
    bounds: BoardSize,
    index: usize,
}

impl Neighbors {
    fn new(center: Pos, bounds: BoardSize) -> Self {
        Self {
            center,
            bounds,
            index: 0,
        }
    }
}

impl Iterator for Neighbors {
    type Item = Pos;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(&delta) = OFFSETS.get(self.index) {
            self.index += 1;
            if let Some(pos) = self.center.offset(delta, self.bounds) {
                return Some(pos);
            }
        }
        None
    }
}
