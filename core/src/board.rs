use core::ops::Index;
use ndarray::Array2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::*;

/// The minefield: cell grid plus the number of mines placed on it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    cells: Array2<Cell>,
    size: BoardSize,
    mine_count: CellCount,
}

impl Board {
    /// A board of `size` with every cell hidden, unflagged and mine-free.
    pub fn new(size: BoardSize) -> Self {
        Self {
            cells: Array2::default(size.to_nd_index()),
            size,
            mine_count: 0,
        }
    }

    /// Places `count` mines on distinct random cells by rejection sampling.
    ///
    /// At least one cell must remain safe afterwards, otherwise the board is left
    /// untouched and [`GameError::TooManyMines`] is returned.
    pub fn place_mines<R: Rng>(&mut self, count: CellCount, rng: &mut R) -> Result<()> {
        let free = self.size.total_cells() - self.mine_count;
        if count >= free {
            return Err(GameError::TooManyMines);
        }

        let mut placed = 0;
        let mut attempts = 0usize;
        while placed < count {
            attempts += 1;
            let pos = Pos::new(
                rng.random_range(0..self.size.rows),
                rng.random_range(0..self.size.cols),
            );
            let cell = &mut self.cells[pos.to_nd_index()];
            if !cell.has_mine {
                cell.has_mine = true;
                placed += 1;
            }
        }
        self.mine_count += count;
        log::debug!("placed {} mines in {} attempts", count, attempts);
        Ok(())
    }

    /// Places mines on exactly the given cells; repeated positions count once.
    ///
    /// Like [`Board::place_mines`], the board is left untouched on error.
    pub fn place_mines_at(&mut self, positions: &[Pos]) -> Result<()> {
        if positions.iter().any(|&pos| !self.size.contains(pos)) {
            return Err(GameError::InvalidCoords);
        }
        let mut fresh: Vec<Pos> = positions
            .iter()
            .copied()
            .filter(|&pos| !self[pos].has_mine)
            .collect();
        fresh.sort_unstable();
        fresh.dedup();

        let added = CellCount::try_from(fresh.len()).map_err(|_| GameError::TooManyMines)?;
        if added >= self.size.total_cells() - self.mine_count {
            return Err(GameError::TooManyMines);
        }
        for pos in fresh {
            self.cells[pos.to_nd_index()].has_mine = true;
        }
        self.mine_count += added;
        Ok(())
    }

    /// Fills in `nearby_mines` for every safe cell. Mine cells stay at 0.
    pub fn compute_adjacency(&mut self) {
        for pos in self.size.positions() {
            let count = if self[pos].has_mine {
                0
            } else {
                self.count_adjacent_mines(pos)
            };
            self.cells[pos.to_nd_index()].nearby_mines = count;
        }
    }

    fn count_adjacent_mines(&self, pos: Pos) -> u8 {
        // at most 8, always fits
        pos.neighbors(self.size)
            .filter(|&neighbor| self[neighbor].has_mine)
            .count() as u8
    }

    /// Reveals the zero region around `start` and the safe cells bordering it.
    ///
    /// Every unrevealed safe neighbor is revealed (losing its flag) and reported to
    /// `sink`; zero-count neighbors are expanded in turn. Mines are never revealed.
    /// The revealed flag doubles as the visited set, so each cell is reported once.
    pub fn reveal_flood_fill<S: NotificationSink + ?Sized>(&mut self, start: Pos, sink: &mut S) {
        if !self.size.contains(start) {
            return;
        }

        let mut pending = vec![start];
        while let Some(center) = pending.pop() {
            for next in center.neighbors(self.size) {
                let cell = &mut self.cells[next.to_nd_index()];
                if cell.revealed || cell.has_mine {
                    continue;
                }

                cell.revealed = true;
                cell.flagged = false;
                log::trace!("flood revealed {}, nearby mines: {}", next, cell.nearby_mines);
                sink.notify(Notification::CellRevealed(next));

                if cell.nearby_mines == 0 {
                    pending.push(next);
                }
            }
        }
    }

    /// Reveals every mine, leaving flags and safe cells as they are.
    pub fn reveal_all_mines(&mut self) {
        for cell in self.cells.iter_mut().filter(|cell| cell.has_mine) {
            cell.revealed = true;
        }
    }

    pub fn count_revealed_safe(&self) -> CellCount {
        // bounded by total_cells, which is a CellCount
        self.cells.iter().filter(|cell| cell.is_revealed_safe()).count() as CellCount
    }

    pub fn size(&self) -> BoardSize {
        self.size
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.size.total_cells() - self.mine_count
    }

    pub fn flagged_count(&self) -> CellCount {
        self.cells
            .iter()
            .filter(|cell| cell.flagged && cell.is_unrevealed())
            .count() as CellCount
    }

    /// Mines not yet accounted for by a flag, negative when over-flagged.
    pub fn mines_left(&self) -> i32 {
        i32::from(self.mine_count) - i32::from(self.flagged_count())
    }

    pub fn get(&self, pos: Pos) -> Option<&Cell> {
        self.size
            .contains(pos)
            .then(|| &self.cells[pos.to_nd_index()])
    }

    pub(crate) fn get_mut(&mut self, pos: Pos) -> Option<&mut Cell> {
        if self.size.contains(pos) {
            Some(&mut self.cells[pos.to_nd_index()])
        } else {
            None
        }
    }

    /// Cells in row-major order with their positions.
    pub fn iter(&self) -> impl Iterator<Item = (Pos, &Cell)> {
        self.size.positions().map(|pos| (pos, &self.cells[pos.to_nd_index()]))
    }
}

impl Index<Pos> for Board {
    type Output = Cell;

    fn index(&self, pos: Pos) -> &Self::Output {
        &self.cells[pos.to_nd_index()]
    }
}
