use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::*;

bitflags! {
    /// Logical buttons that went down during a frame.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct MouseButtons: u8 {
        /// Reveal.
        const PRIMARY   = 1;
        /// Toggle flag.
        const SECONDARY = 1 << 1;
    }
}

/// Input collected over one frame: where the pointer is and which buttons were
/// pressed since the previous frame.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameInput {
    /// Pointer position in board pixels, `None` when it is outside the window.
    pub pointer: Option<(f32, f32)>,
    pub pressed: MouseButtons,
}

impl FrameInput {
    pub fn new(pointer: Option<(f32, f32)>, pressed: MouseButtons) -> Self {
        Self { pointer, pressed }
    }

    /// Marks `button` as pressed this frame.
    pub fn press(&mut self, button: MouseButtons) {
        self.pressed |= button;
    }

    /// Forgets the button edges, keeping the pointer for the next frame.
    pub fn end_frame(&mut self) {
        self.pressed = MouseButtons::empty();
    }
}

/// Maps pixel positions onto board cells of a fixed square size.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellMapper {
    pub cell_size: f32,
    pub size: BoardSize,
}

impl CellMapper {
    pub fn new(cell_size: f32, size: BoardSize) -> Self {
        Self { cell_size, size }
    }

    /// The cell under `(x, y)`, or `None` when the point is off the grid.
    pub fn cell_at(&self, x: f32, y: f32) -> Option<Pos> {
        if self.cell_size.is_nan() || self.cell_size <= 0.0 {
            return None;
        }
        let col = (x / self.cell_size).floor();
        let row = (y / self.cell_size).floor();
        if row < 0.0 || col < 0.0 || row >= f32::from(self.size.rows) || col >= f32::from(self.size.cols) {
            return None;
        }
        // both are in 0..Coord::MAX here
        Some(Pos::new(row as Coord, col as Coord))
    }

    /// The pixel rectangle `(x, y, width, height)` covered by `pos`.
    pub fn cell_rect(&self, pos: Pos) -> (f32, f32, f32, f32) {
        (
            f32::from(pos.col) * self.cell_size,
            f32::from(pos.row) * self.cell_size,
            self.cell_size,
            self.cell_size,
        )
    }

    /// Width and height of the whole grid in pixels.
    pub fn grid_extent(&self) -> (f32, f32) {
        (
            f32::from(self.size.cols) * self.cell_size,
            f32::from(self.size.rows) * self.cell_size,
        )
    }
}
