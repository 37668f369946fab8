use serde::{Deserialize, Serialize};

/// One grid square.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub revealed: bool,
    pub has_mine: bool,
    pub flagged: bool,
    /// Mines among the Moore neighbors, always 0 on mine cells.
    pub nearby_mines: u8,
}

/// What the player can see of a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    Hidden,
    Flagged,
    Revealed,
}

impl Cell {
    pub const fn state(&self) -> CellState {
        if self.revealed {
            CellState::Revealed
        } else if self.flagged {
            CellState::Flagged
        } else {
            CellState::Hidden
        }
    }

    pub const fn is_unrevealed(&self) -> bool {
        !self.revealed
    }

    pub const fn is_revealed_safe(&self) -> bool {
        self.revealed && !self.has_mine
    }

    /// Zero-count safe cells are the ones a flood-fill continues from.
    pub const fn is_empty(&self) -> bool {
        !self.has_mine && self.nearby_mines == 0
    }
}
