use ninesweep_core::Pos;
use tiny_skia::Color;

/// Opaque 8-bit color, kept `const` so the palette can live in constants.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(in crate::app) struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub(in crate::app) fn color(self) -> Color {
        Color::from_rgba8(self.0, self.1, self.2, 255)
    }
}

pub(in crate::app) const BACKGROUND: Rgb = Rgb(48, 99, 47);
pub(in crate::app) const GRID_LINE: Rgb = Rgb(110, 110, 110);
pub(in crate::app) const NUMBER: Rgb = Rgb(0, 121, 241);
pub(in crate::app) const FLAG: Rgb = Rgb(230, 41, 55);
pub(in crate::app) const MINE: Rgb = Rgb(40, 40, 40);
pub(in crate::app) const LOST: Rgb = Rgb(230, 41, 55);
pub(in crate::app) const WON: Rgb = Rgb(0, 228, 48);
pub(in crate::app) const HINT: Rgb = Rgb(245, 245, 245);

const HIDDEN: [Rgb; 2] = [Rgb(190, 224, 145), Rgb(170, 214, 135)];
const REVEALED: [Rgb; 2] = [Rgb(240, 210, 170), Rgb(225, 195, 150)];

/// Checkerboard fill: green while hidden, sand once revealed.
pub(in crate::app) fn cell_fill(pos: Pos, revealed: bool) -> Rgb {
    let parity = usize::from((u16::from(pos.row) + u16::from(pos.col)) % 2 == 1);
    if revealed {
        REVEALED[parity]
    } else {
        HIDDEN[parity]
    }
}
