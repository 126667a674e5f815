//! Terminal raster canvas.
//!
//! Logical pixels are mapped onto half-block "pixels": every terminal cell
//! shows two of them stacked with `▀` (foreground = top, background =
//! bottom). `scale` is the number of logical pixels per half-block pixel on
//! each axis. Text lives in a separate per-cell overlay because a glyph
//! cannot be drawn inside half a cell.

use super::{Canvas, Color, DrawState, Shadow, TextAlign};
use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{
    Attribute, Color as TermColor, Print, ResetColor, SetAttribute, SetBackgroundColor,
    SetForegroundColor,
};
use std::io::{self, Write};

const HALF_BLOCK: char = '\u{2580}';
const BOLD_FONT_SIZE: f64 = 36.0;
const HALO_ALPHA: f32 = 0.35;

#[derive(Clone, Copy, Debug, PartialEq)]
struct TextCell
{
    ch: char,
    color: Color,
    bold: bool,
}

pub struct PixelCanvas
{
    cols: usize,
    rows: usize,
    scale: f64,
    px: Vec<Color>,
    text: Vec<Option<TextCell>>,
    state: DrawState,
}

fn block_span(start: f64, len: f64, scale: f64, limit: usize) -> (usize, usize)
{
    let (start, len) = if len < 0.0 { (start + len, -len) } else { (start, len) };
    let from = (start / scale).floor().max(0.0);
    let to = ((start + len) / scale).ceil().max(0.0);
    let from = (from as usize).min(limit);
    let to = (to as usize).min(limit);
    (from, to.max(from))
}

fn term_color(color: Color) -> TermColor
{
    TermColor::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

impl PixelCanvas
{
    pub fn new(cols: u16, rows: u16, scale: f64) -> Self
    {
        let cols = cols as usize;
        let rows = rows as usize;
        Self {
            cols,
            rows,
            scale: if scale > 0.0 { scale } else { 1.0 },
            px: vec![Color::BLACK; cols * rows * 2],
            text: vec![None; cols * rows],
            state: DrawState::default(),
        }
    }

    /// Reallocates the buffer for a new terminal size. Like resizing an
    /// HTML canvas, this clears the pixels and resets the style state.
    pub fn resize(&mut self, cols: u16, rows: u16)
    {
        self.cols = cols as usize;
        self.rows = rows as usize;
        self.px = vec![Color::BLACK; self.cols * self.rows * 2];
        self.text = vec![None; self.cols * self.rows];
        self.state = DrawState::default();
    }

    pub fn cell_size(&self) -> (u16, u16)
    {
        (self.cols as u16, self.rows as u16)
    }

    fn block_height(&self) -> usize
    {
        self.rows * 2
    }

    fn pixel(&self, bx: usize, by: usize) -> Color
    {
        self.px[by * self.cols + bx]
    }

    fn blend_block(&mut self, bx: usize, by: usize, color: Color)
    {
        let idx = by * self.cols + bx;
        self.px[idx] = color.over(self.px[idx]);
    }

    fn paint_halo(&mut self, core: (usize, usize, usize, usize), rect: [f64; 4], shadow: Shadow)
    {
        let [x, y, width, height] = rect;
        let spread = shadow.blur / 2.0;
        let (hx0, hx1) = block_span(x - spread, width + shadow.blur, self.scale, self.cols);
        let (hy0, hy1) = block_span(y - spread, height + shadow.blur, self.scale, self.block_height());
        let (cx0, cx1, cy0, cy1) = core;
        let halo = shadow.color.with_alpha(shadow.color.a * HALO_ALPHA);
        for by in hy0..hy1 {
            for bx in hx0..hx1 {
                let inside = bx >= cx0 && bx < cx1 && by >= cy0 && by < cy1;
                if !inside {
                    self.blend_block(bx, by, halo);
                }
            }
        }
    }

    fn cover_text(&mut self, bx0: usize, bx1: usize, by0: usize, by1: usize, fill: Color)
    {
        let row_from = by0 / 2;
        let row_to = by1.div_ceil(2).min(self.rows);
        for row in row_from..row_to {
            for col in bx0..bx1.min(self.cols) {
                let idx = row * self.cols + col;
                let Some(cell) = self.text[idx] else {
                    continue;
                };
                self.text[idx] = if fill.is_opaque() {
                    None
                } else {
                    Some(TextCell {
                        color: fill.over(cell.color),
                        ..cell
                    })
                };
            }
        }
    }

    pub fn present(&self, out: &mut impl Write) -> io::Result<()>
    {
        queue!(out, MoveTo(0, 0))?;
        for row in 0..self.rows {
            let mut prev_fg: Option<Color> = None;
            let mut prev_bg: Option<Color> = None;
            let mut bold = false;
            for col in 0..self.cols {
                let top = self.pixel(col, row * 2);
                let bot = self.pixel(col, row * 2 + 1);
                let (ch, fg, bg, want_bold) = match self.text[row * self.cols + col] {
                    Some(cell) => (cell.ch, cell.color.over(bot), bot, cell.bold),
                    None => (HALF_BLOCK, top, bot, false),
                };
                if want_bold != bold {
                    let attr = if want_bold { Attribute::Bold } else { Attribute::NormalIntensity };
                    queue!(out, SetAttribute(attr))?;
                    bold = want_bold;
                }
                if prev_fg != Some(fg) {
                    queue!(out, SetForegroundColor(term_color(fg)))?;
                    prev_fg = Some(fg);
                }
                if prev_bg != Some(bg) {
                    queue!(out, SetBackgroundColor(term_color(bg)))?;
                    prev_bg = Some(bg);
                }
                queue!(out, Print(ch))?;
            }
            queue!(out, SetAttribute(Attribute::Reset), ResetColor)?;
            if row + 1 < self.rows {
                queue!(out, Print("\r\n"))?;
            }
        }
        out.flush()
    }
}

impl Canvas for PixelCanvas
{
    fn width(&self) -> f64
    {
        self.cols as f64 * self.scale
    }

    fn height(&self) -> f64
    {
        self.block_height() as f64 * self.scale
    }

    fn state(&self) -> &DrawState
    {
        &self.state
    }

    fn state_mut(&mut self) -> &mut DrawState
    {
        &mut self.state
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64)
    {
        if !(x.is_finite() && y.is_finite() && width.is_finite() && height.is_finite()) {
            return;
        }
        let (bx0, bx1) = block_span(x, width, self.scale, self.cols);
        let (by0, by1) = block_span(y, height, self.scale, self.block_height());
        if let Some(shadow) = self.state.shadow() {
            self.paint_halo((bx0, bx1, by0, by1), [x, y, width, height], shadow);
        }

        let fill = self.state.fill;
        if !fill.is_visible() {
            return;
        }
        for by in by0..by1 {
            for bx in bx0..bx1 {
                self.blend_block(bx, by, fill);
            }
        }
        self.cover_text(bx0, bx1, by0, by1, fill);
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64)
    {
        if self.rows == 0 || self.cols == 0 || !(x.is_finite() && y.is_finite()) {
            return;
        }
        let size = self.state.font_size;
        let row = ((y - size * 0.3) / self.scale / 2.0).floor();
        if row < 0.0 || row as usize >= self.rows {
            return;
        }
        let row = row as usize;

        let len = text.chars().count() as i64;
        let anchor = (x / self.scale).floor() as i64;
        let start = match self.state.text_align {
            TextAlign::Left => anchor,
            TextAlign::Center => anchor - len / 2,
            TextAlign::Right => anchor - len,
        };
        let cell = TextCell {
            ch: ' ',
            color: self.state.fill,
            bold: size >= BOLD_FONT_SIZE,
        };
        for (offset, ch) in text.chars().enumerate() {
            let col = start + offset as i64;
            if col < 0 || col as usize >= self.cols {
                continue;
            }
            self.text[row * self.cols + col as usize] = Some(TextCell { ch, ..cell });
        }
    }
}
