//! Immediate-mode drawing of the board and status bar into a [`Pixmap`].
//!
//! Everything is redrawn every frame from the current [`Game`]; the renderer only
//! reads the game and never keeps state of its own.

use ab_glyph::{Font, FontVec, PxScale, ScaleFont, point};
use ninesweep_core::{Cell, CellMapper, CellState, Game, Outcome, Pos};
use tiny_skia::{
    FillRule, FilterQuality, Mask, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke,
    Transform,
};

use crate::app::assets::Sprites;
use crate::app::theme::{self, Rgb};

/// Layout was tuned for 60px cells, other sizes scale from it.
const REFERENCE_CELL: f32 = 60.0;
const NUMBER_PX: f32 = 25.0;
const BANNER_PX: f32 = 30.0;
const HINT_PX: f32 = 20.0;
const MARGIN: f32 = 10.0;
const HINT: &str = "Left-click: Reveal | Right-click: Flag";

fn paint(color: Rgb) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color.color());
    paint.anti_alias = true;
    paint
}

/// Formats a counter as three digits, clamped to `-99..=999`.
pub(in crate::app) fn format_for_counter(num: i32) -> String {
    match num {
        ..-99 => "-99".to_string(),
        -99..0 => format!("-{:02}", -num),
        0..1000 => format!("{:03}", num),
        1000.. => "999".to_string(),
    }
}

fn text_width(font: &FontVec, text: &str, px: f32) -> f32 {
    let scaled = font.as_scaled(PxScale::from(px));
    let mut width = 0.0;
    let mut prev = None;
    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = prev {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        prev = Some(id);
    }
    width
}

/// Draws `text` with its top-left corner at `(x, y)`.
fn draw_text(canvas: &mut Pixmap, font: &FontVec, text: &str, (x, y): (f32, f32), px: f32, color: Rgb) {
    let (width, height) = (canvas.width(), canvas.height());
    let Some(mut mask) = Mask::new(width, height) else {
        return;
    };

    let scale = PxScale::from(px);
    let scaled = font.as_scaled(scale);
    let mut caret = point(x, y + scaled.ascent());
    let mut prev = None;
    {
        let coverage = mask.data_mut();
        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(prev) = prev {
                caret.x += scaled.kern(prev, id);
            }
            prev = Some(id);
            let glyph = id.with_scale_and_position(scale, caret);
            caret.x += scaled.h_advance(id);

            let Some(outlined) = font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, c| {
                let tx = bounds.min.x as i64 + i64::from(gx);
                let ty = bounds.min.y as i64 + i64::from(gy);
                if tx < 0 || ty < 0 || tx >= i64::from(width) || ty >= i64::from(height) {
                    return;
                }
                let index = ty as usize * width as usize + tx as usize;
                let value = (c.clamp(0.0, 1.0) * 255.0) as u8;
                coverage[index] = coverage[index].max(value);
            });
        }
    }

    if let Some(area) = Rect::from_xywh(0.0, 0.0, width as f32, height as f32) {
        canvas.fill_rect(area, &paint(color), Transform::identity(), Some(&mask));
    }
}

pub(in crate::app) struct Renderer {
    mapper: CellMapper,
    status_bar_height: f32,
}

impl Renderer {
    pub(in crate::app) fn new(mapper: CellMapper, status_bar_height: f32) -> Self {
        Self {
            mapper,
            status_bar_height,
        }
    }

    pub(in crate::app) fn draw(&self, canvas: &mut Pixmap, game: &Game, sprites: &Sprites) {
        canvas.fill(theme::BACKGROUND.color());
        for (pos, cell) in game.board().iter() {
            self.draw_cell(canvas, pos, cell, sprites);
        }
        self.draw_status(canvas, game, sprites);
    }

    fn draw_cell(&self, canvas: &mut Pixmap, pos: Pos, cell: &Cell, sprites: &Sprites) {
        let (x, y, w, h) = self.mapper.cell_rect(pos);
        let Some(rect) = Rect::from_xywh(x, y, w, h) else {
            return;
        };

        canvas.fill_rect(
            rect,
            &paint(theme::cell_fill(pos, cell.revealed)),
            Transform::identity(),
            None,
        );
        let outline = PathBuilder::from_rect(rect);
        let stroke = Stroke {
            width: 1.0,
            ..Stroke::default()
        };
        canvas.stroke_path(&outline, &paint(theme::GRID_LINE), &stroke, Transform::identity(), None);

        let unit = self.mapper.cell_size / REFERENCE_CELL;
        let (cx, cy) = (x + w / 2.0, y + h / 2.0);
        match cell.state() {
            CellState::Revealed if cell.has_mine => Self::draw_mine(canvas, rect, sprites.boom.as_ref()),
            CellState::Revealed if cell.nearby_mines > 0 => {
                if let Some(font) = &sprites.font {
                    let text = cell.nearby_mines.to_string();
                    let px = NUMBER_PX * unit;
                    let tw = text_width(font, &text, px);
                    draw_text(canvas, font, &text, (cx - tw / 2.0, cy - px / 2.0), px, theme::NUMBER);
                }
            }
            CellState::Revealed | CellState::Hidden => {}
            CellState::Flagged => {
                let mut pb = PathBuilder::new();
                pb.move_to(cx - 8.0 * unit, cy + 8.0 * unit);
                pb.line_to(cx - 8.0 * unit, cy - 12.0 * unit);
                pb.line_to(cx + 8.0 * unit, cy - 2.0 * unit);
                pb.close();
                if let Some(path) = pb.finish() {
                    canvas.fill_path(&path, &paint(theme::FLAG), FillRule::Winding, Transform::identity(), None);
                }
            }
        }
    }

    fn draw_mine(canvas: &mut Pixmap, rect: Rect, texture: Option<&Pixmap>) {
        match texture {
            Some(texture) => {
                let sx = rect.width() / texture.width() as f32;
                let sy = rect.height() / texture.height() as f32;
                let transform = Transform::from_row(sx, 0.0, 0.0, sy, rect.x(), rect.y());
                let paint = PixmapPaint {
                    quality: FilterQuality::Bilinear,
                    ..PixmapPaint::default()
                };
                canvas.draw_pixmap(0, 0, texture.as_ref(), &paint, transform, None);
            }
            None => {
                let radius = rect.width().min(rect.height()) * 0.3;
                let center = (rect.x() + rect.width() / 2.0, rect.y() + rect.height() / 2.0);
                if let Some(disc) = PathBuilder::from_circle(center.0, center.1, radius) {
                    canvas.fill_path(&disc, &paint(theme::MINE), FillRule::Winding, Transform::identity(), None);
                }
            }
        }
    }

    fn draw_status(&self, canvas: &mut Pixmap, game: &Game, sprites: &Sprites) {
        let Some(font) = &sprites.font else {
            return;
        };
        let (width, top) = self.mapper.grid_extent();
        // keep the text inside short custom status bars
        let fit = |px: f32| px.min(self.status_bar_height - MARGIN).max(1.0);

        match game.outcome() {
            Outcome::Lost => draw_text(canvas, font, "GAME OVER!", (MARGIN, top + MARGIN), fit(BANNER_PX), theme::LOST),
            Outcome::Won => draw_text(canvas, font, "YOU WIN!", (MARGIN, top + MARGIN), fit(BANNER_PX), theme::WON),
            Outcome::Playing => {
                let px = fit(HINT_PX);
                draw_text(canvas, font, HINT, (MARGIN, top + 15.0), px, theme::HINT);

                let counter = format_for_counter(game.mines_left());
                let x = width - MARGIN - text_width(font, &counter, px);
                draw_text(canvas, font, &counter, (x, top + 15.0), px, theme::HINT);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ninesweep_core::{Board, BoardSize};

    const CELL: f32 = 60.0;

    fn game(mines: &[Pos]) -> Game {
        let mut board = Board::new(BoardSize::new(9, 9));
        board.place_mines_at(mines).unwrap();
        board.compute_adjacency();
        Game::from_board(board)
    }

    fn render(game: &Game) -> Pixmap {
        let renderer = Renderer::new(CellMapper::new(CELL, game.board().size()), 50.0);
        let mut canvas = Pixmap::new(540, 590).unwrap();
        renderer.draw(&mut canvas, game, &Sprites::default());
        canvas
    }

    fn rgb_at(canvas: &Pixmap, x: u32, y: u32) -> Rgb {
        let px = canvas.pixel(x, y).unwrap();
        Rgb(px.red(), px.green(), px.blue())
    }

    fn cell_center(pos: Pos) -> (u32, u32) {
        let half = CELL as u32 / 2;
        (u32::from(pos.col) * CELL as u32 + half, u32::from(pos.row) * CELL as u32 + half)
    }

    #[test]
    fn counter_format() {
        assert_eq!(format_for_counter(10), "010");
        assert_eq!(format_for_counter(0), "000");
        assert_eq!(format_for_counter(-3), "-03");
        assert_eq!(format_for_counter(-150), "-99");
        assert_eq!(format_for_counter(1234), "999");
    }

    #[test]
    fn fresh_board_is_a_green_checkerboard() {
        let game = game(&[Pos::new(8, 8)]);
        let canvas = render(&game);

        for pos in [Pos::new(0, 0), Pos::new(0, 1), Pos::new(4, 7)] {
            let (x, y) = cell_center(pos);
            assert_eq!(rgb_at(&canvas, x, y), theme::cell_fill(pos, false), "at {pos}");
        }
        assert_eq!(rgb_at(&canvas, 5, 580), theme::BACKGROUND);
    }

    #[test]
    fn revealed_cells_turn_sand() {
        let mut game = game(&[Pos::new(8, 8)]);
        let pos = Pos::new(7, 7);
        game.handle_primary(pos);
        let canvas = render(&game);

        // corner pixel, clear of the number and the grid line
        let (x, y) = cell_center(pos);
        assert_eq!(rgb_at(&canvas, x - 25, y - 25), theme::cell_fill(pos, true));
    }

    #[test]
    fn flags_are_red_triangles() {
        let mut game = game(&[Pos::new(8, 8)]);
        let pos = Pos::new(2, 3);
        game.handle_secondary(pos);
        let canvas = render(&game);

        let (x, y) = cell_center(pos);
        assert_eq!(rgb_at(&canvas, x - 4, y - 2), theme::FLAG);
        assert_eq!(rgb_at(&canvas, x + 20, y + 20), theme::cell_fill(pos, false));
    }

    #[test]
    fn lost_game_shows_mines() {
        let mines = [Pos::new(0, 0), Pos::new(5, 5)];
        let mut game = game(&mines);
        game.handle_primary(Pos::new(0, 0));
        let canvas = render(&game);

        for pos in mines {
            let (x, y) = cell_center(pos);
            assert_eq!(rgb_at(&canvas, x, y), theme::MINE, "at {pos}");
        }
    }

    #[test]
    fn texture_is_scaled_onto_the_cell() {
        let mut texture = Pixmap::new(4, 4).unwrap();
        texture.fill(theme::LOST.color());
        let sprites = Sprites {
            boom: Some(texture),
            font: None,
        };
        let mut game = game(&[Pos::new(3, 3)]);
        game.handle_primary(Pos::new(3, 3));

        let renderer = Renderer::new(CellMapper::new(CELL, game.board().size()), 50.0);
        let mut canvas = Pixmap::new(540, 590).unwrap();
        renderer.draw(&mut canvas, &game, &sprites);

        let (x, y) = cell_center(Pos::new(3, 3));
        assert_eq!(rgb_at(&canvas, x, y), theme::LOST);
        assert_eq!(rgb_at(&canvas, x - 20, y + 20), theme::LOST);
    }
}
