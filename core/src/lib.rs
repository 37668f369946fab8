use serde::{Deserialize, Serialize};

pub use board::*;
pub use cell::*;
pub use error::*;
pub use game::*;
pub use input::*;
pub use notify::*;
pub use types::*;

mod board;
mod cell;
mod error;
mod game;
mod input;
mod notify;
mod types;

/// Board dimensions and mine count for one game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: BoardSize,
    pub mines: CellCount,
}

impl GameConfig {
    pub const CLASSIC_ROWS: Coord = 9;
    pub const CLASSIC_COLS: Coord = 9;
    pub const CLASSIC_MINES: CellCount = 10;

    pub const fn new_unchecked(size: BoardSize, mines: CellCount) -> Self {
        Self { size, mines }
    }

    /// Validates that the board is non-empty and leaves at least one safe cell.
    pub fn new(size: BoardSize, mines: CellCount) -> Result<Self> {
        if size.rows == 0 || size.cols == 0 {
            return Err(GameError::InvalidCoords);
        }
        if mines >= size.total_cells() {
            return Err(GameError::TooManyMines);
        }
        Ok(Self::new_unchecked(size, mines))
    }

    /// The only layout the game ships with: 9×9 and 10 mines.
    pub const fn classic() -> Self {
        Self::new_unchecked(
            BoardSize::new(Self::CLASSIC_ROWS, Self::CLASSIC_COLS),
            Self::CLASSIC_MINES,
        )
    }

    pub const fn total_cells(&self) -> CellCount {
        self.size.total_cells()
    }

    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells() - self.mines
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::classic()
    }
}
