/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Element positions come from `ui::layout`, which is also what mouse
/// clicks are hit-tested against, so what is drawn is what is clickable.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::color::Color as Rgb;
use crate::domain::variant::Variant;
use crate::sim::world::{GameState, INSTRUCTIONS};
use crate::ui::layout::{
    Element, Layout, Rect, CHANGE_COLOR_LABEL, INSTRUCTION_ROWS, NEW_GAME_LABEL,
};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: [u8; 16],  // up to 16 bytes (supports ZWJ emoji sequences)
    ch_len: u8,
    fg: Color,
    bg: Color,
    wide: bool,    // true = this char occupies 2 terminal columns
    cont: bool,    // true = continuation of previous wide char (skip render)
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so the
    /// gaps between rows match the cells on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0,0,0, 0,0,0,0, 0,0,0,0, 0,0,0,0],
        ch_len: 1,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: false,
    };

    const WIDE_CONT: Cell = Cell {
        ch: [0; 16],
        ch_len: 0,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: true,
    };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell {
        ch: [b'?', 0,0,0, 0,0,0,0, 0,0,0,0, 0,0,0,0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
        wide: false,
        cont: false,
    };

    /// Normalize bg: Color::Reset → BASE_BG so that every cell gets an
    /// explicit background color (never terminal-default).
    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn from_char(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        let len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.ch_len = len;
        cell.fg = fg;
        cell.bg = Self::norm_bg(bg);
        cell
    }

    fn from_char_wide(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::from_char(c, fg, bg);
        cell.wide = true;
        cell
    }

    fn cont_on(bg: Color) -> Self {
        let mut cell = Self::WIDE_CONT;
        cell.bg = Self::norm_bg(bg);
        cell
    }

    fn as_str(&self) -> &str {
        std::str::from_utf8(&self.ch[..self.ch_len as usize]).unwrap_or("")
    }
}

/// Terminal columns taken by `c`. Pictographs (emoji) are double width;
/// everything this game prints otherwise is single width.
fn char_width(c: char) -> usize {
    if (c as u32) >= 0x1F000 { 2 } else { 1 }
}

fn display_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

fn term_color(c: Rgb) -> Color {
    let [r, g, b] = c.channels();
    Color::Rgb { r, g, b }
}

/// Black or white, whichever reads better on `bg`.
fn label_color(bg: Rgb) -> Color {
    if bg.luma() > 140 { Color::Black } else { Color::White }
}

/// Greedy word wrap into lines of at most `width` columns.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let needed = if line.is_empty() { display_width(word) } else { display_width(&line) + 1 + display_width(word) };
        if needed > width && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Wide chars take two columns.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            let w = char_width(ch);
            if cx + w > self.width { break; }
            if w == 2 {
                self.set(cx, y, Cell::from_char_wide(ch, fg, bg));
                self.set(cx + 1, y, Cell::cont_on(bg));
            } else {
                self.set(cx, y, Cell::from_char(ch, fg, bg));
            }
            cx += w;
        }
    }

    /// Write `s` centered within `rect` on `row`.
    fn put_centered(&mut self, rect: Rect, row: usize, s: &str, fg: Color, bg: Color) {
        let x = rect.x + rect.w.saturating_sub(display_width(s)) / 2;
        self.put_str(x, row, s, fg, bg);
    }

    /// Paint `rect` with background `bg`.
    fn fill(&mut self, rect: Rect, bg: Color) {
        for y in rect.y..rect.y + rect.h {
            for x in rect.x..rect.x + rect.w {
                self.set(x, y, Cell::from_char(' ', Color::White, bg));
            }
        }
    }

    #[cfg(test)]
    fn row_text(&self, y: usize) -> String {
        (0..self.width)
            .map(|x| self.get(x, y))
            .filter(|c| !c.cont)
            .map(|c| c.as_str().to_string())
            .collect()
    }
}

// ── Palette ──

const TITLE_FG: Color = Color::Rgb { r: 235, g: 235, b: 245 };
const TEXT_FG: Color = Color::Rgb { r: 160, g: 160, b: 175 };
const SUCCESS_BG: Color = Color::Rgb { r: 30, g: 110, b: 55 };
const FAILURE_BG: Color = Color::Rgb { r: 140, g: 35, b: 40 };
const NEW_GAME_BG: Color = Color::Rgb { r: 210, g: 60, b: 60 };
const CHANGE_COLOR_BG: Color = Color::Rgb { r: 50, g: 100, b: 220 };
const FOCUS_FG: Color = Color::Rgb { r: 255, g: 210, b: 70 };

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    variant: Variant,
    layout: Layout,
}

impl Renderer {
    pub fn new(variant: Variant) -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            variant,
            layout: Layout::compute(0, 0, variant),
        }
    }

    /// Current element positions, for mouse hit-testing.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.apply_size(tw as usize, th as usize);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    fn apply_size(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        // Force full repaint: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);
        self.layout = Layout::compute(w, h, self.variant);
        tracing::debug!(w, h, "layout recomputed");
    }

    pub fn render(&mut self, game: &GameState, pad_connected: bool) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.apply_size(tw as usize, th as usize);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        self.compose(game, pad_connected);

        // Diff and emit
        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors; ResetColor would fall back to the terminal default.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            let mut x = 0;
            while x < self.front.width {
                let cell = self.front.get(x, y);
                let prev = self.back.get(x, y);

                // Skip continuation cells (right half of wide emoji)
                if cell.cont {
                    if cell != prev { need_move = true; }
                    x += 1;
                    continue;
                }

                // For wide cells, also check if the continuation changed
                let cont_changed = cell.wide
                    && x + 1 < self.front.width
                    && self.front.get(x + 1, y) != self.back.get(x + 1, y);

                if cell == prev && !cont_changed {
                    need_move = true;
                    x += 1;
                    continue;
                }

                // Position cursor if needed
                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                // Set colors only if changed
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.as_str()))?;

                if cell.wide {
                    // Wide char printed: cursor advanced 2 columns
                    last_x = x + 1;
                    x += 2; // skip the continuation cell
                } else {
                    last_x = x;
                    x += 1;
                }
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose(&mut self, game: &GameState, pad_connected: bool) {
        self.front.clear();
        self.compose_header();
        self.compose_swatch(game);
        self.compose_score(game);
        self.compose_status(game);
        self.compose_options(game);
        self.compose_actions();
        self.compose_help(pad_connected);
    }

    fn compose_header(&mut self) {
        if let Some(r) = self.layout.rect(Element::Title) {
            self.front.put_centered(r, r.y, "Color Guessing Game", TITLE_FG, Color::Reset);
        }
        if let Some(r) = self.layout.rect(Element::Instructions) {
            for (i, line) in wrap(INSTRUCTIONS, r.w).iter().take(INSTRUCTION_ROWS).enumerate() {
                self.front.put_centered(r, r.y + i, line, TEXT_FG, Color::Reset);
            }
        }
    }

    fn compose_swatch(&mut self, game: &GameState) {
        if let Some(r) = self.layout.rect(Element::ColorBox) {
            self.front.fill(r, term_color(game.target));
        }
    }

    fn compose_score(&mut self, game: &GameState) {
        let Some(r) = self.layout.rect(Element::Score) else { return };
        let text = match game.restart_in() {
            Some(left) => format!("Score: {}   next color in {:.1}s", game.score, left.as_secs_f32()),
            None => format!("Score: {}", game.score),
        };
        self.front.put_centered(r, r.y, &text, TITLE_FG, Color::Reset);
    }

    fn compose_status(&mut self, game: &GameState) {
        let Some(correct) = game.status.is_correct() else { return };
        let Some(r) = self.layout.rect(Element::GameStatus) else { return };
        let (icon, bg) = if correct { ('✔', SUCCESS_BG) } else { ('⚠', FAILURE_BG) };
        self.front.fill(r, bg);
        let text = format!("{icon} {}", game.status.message());
        self.front.put_centered(r, r.y, &text, Color::White, bg);
    }

    fn compose_options(&mut self, game: &GameState) {
        for (i, color) in game.options.iter().enumerate() {
            let Some(r) = self.layout.rect(Element::ColorOption(i)) else { continue };
            let bg = term_color(color);
            self.front.fill(r, bg);
            let mid = r.y + r.h / 2;
            self.front.put_centered(r, mid, &(i + 1).to_string(), label_color(color), bg);

            if i == game.cursor {
                if r.x > 0 {
                    self.front.set(r.x - 1, mid, Cell::from_char('▶', FOCUS_FG, Color::Reset));
                }
                self.front.set(r.x + r.w, mid, Cell::from_char('◀', FOCUS_FG, Color::Reset));
            }
        }
    }

    fn compose_actions(&mut self) {
        if let Some(r) = self.layout.rect(Element::NewGameButton) {
            self.front.put_str(r.x, r.y, NEW_GAME_LABEL, Color::White, NEW_GAME_BG);
        }
        if let Some(r) = self.layout.rect(Element::ChangeColorButton) {
            self.front.put_str(r.x, r.y, CHANGE_COLOR_LABEL, Color::White, CHANGE_COLOR_BG);
        }
    }

    fn compose_help(&mut self, pad_connected: bool) {
        let Some(r) = self.layout.rect(Element::Help) else { return };
        let mut help = String::from("1-6/Enter:Guess  Arrows:Focus  N:New");
        if self.variant.has_change_color() {
            help.push_str("  C:Change");
        }
        help.push_str("  Q:Quit");
        if pad_connected {
            help.push_str("  │ Pad: A Guess  Start New");
        }
        // Help may be wider than the panel; center it on the whole row.
        let row = Rect { x: 0, y: r.y, w: self.front.width, h: 1 };
        self.front.put_centered(row, r.y, &help, Color::DarkGrey, Color::Reset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use crate::sim::step;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// A renderer whose front buffer is sized without touching the terminal.
    fn offscreen(variant: Variant, w: usize, h: usize) -> Renderer {
        let mut r = Renderer::new(variant);
        r.apply_size(w, h);
        r
    }

    fn game() -> GameState {
        GameState::with_target(RulesConfig::default(), Rgb::new(10, 20, 30), StdRng::seed_from_u64(7))
    }

    fn screen(r: &Renderer) -> Vec<String> {
        (0..r.front.height).map(|y| r.front.row_text(y)).collect()
    }

    #[test]
    fn wrap_respects_width() {
        let lines = wrap(INSTRUCTIONS, 60);
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| display_width(l) <= 60));
        assert_eq!(lines.join(" "), INSTRUCTIONS);
    }

    #[test]
    fn emoji_take_two_columns() {
        assert_eq!(display_width("Correct 🎉!"), 11);
        let mut fb = FrameBuffer::new(10, 1);
        fb.put_str(0, 0, "a🎉b", Color::White, Color::Reset);
        assert!(fb.get(1, 0).wide);
        assert!(fb.get(2, 0).cont);
        assert_eq!(fb.get(3, 0).as_str(), "b");
    }

    #[test]
    fn frame_shows_title_score_and_swatch() {
        let mut r = offscreen(Variant::Classic, 80, 24);
        let g = game();
        r.compose(&g, false);
        let rows = screen(&r);
        assert!(rows.iter().any(|l| l.contains("Color Guessing Game")));
        assert!(rows.iter().any(|l| l.contains("Score: 0")));
        assert!(rows.iter().any(|l| l.contains("[ Change Color ]")));

        let swatch = r.layout().rect(Element::ColorBox).unwrap();
        assert_eq!(r.front.get(swatch.x, swatch.y).bg, Color::Rgb { r: 10, g: 20, b: 30 });
    }

    #[test]
    fn status_banner_follows_guess_outcome() {
        let mut r = offscreen(Variant::Classic, 80, 24);
        let mut g = game();
        let target = g.options.iter().position(|c| c == g.target).unwrap();
        step::guess(&mut g, target);
        r.compose(&g, false);
        let rows = screen(&r);
        assert!(rows.iter().any(|l| l.contains("✔ Correct 🎉! Well done!")));
        assert!(rows.iter().any(|l| l.contains("next color in 1.5s")));

        let delay = g.rules.status_delay();
        step::advance(&mut g, delay);
        r.compose(&g, false);
        assert!(!screen(&r).iter().any(|l| l.contains("Well done")));
    }

    #[test]
    fn wrong_guess_shows_warning_banner() {
        let mut r = offscreen(Variant::Classic, 80, 24);
        let mut g = game();
        let decoy = g.options.iter().position(|c| c != g.target).unwrap();
        step::guess(&mut g, decoy);
        r.compose(&g, false);
        let rows = screen(&r);
        assert!(rows.iter().any(|l| l.contains("⚠ Wrong guess! Try again!")));
        assert!(!rows.iter().any(|l| l.contains("next color in")));

        let status = r.layout().rect(Element::GameStatus).unwrap();
        assert_eq!(r.front.get(status.x, status.y).bg, FAILURE_BG);
    }

    #[test]
    fn near_miss_has_no_change_color() {
        let mut r = offscreen(Variant::NearMiss, 80, 24);
        let rules = RulesConfig { variant: Variant::NearMiss, ..RulesConfig::default() };
        let g = GameState::with_target(rules, Rgb::new(1, 2, 3), StdRng::seed_from_u64(8));
        r.compose(&g, false);
        let rows = screen(&r);
        assert!(!rows.iter().any(|l| l.contains("Change")));
        assert!(rows.iter().any(|l| l.contains("[ New Game ]")));
    }

    #[test]
    fn options_are_painted_in_their_colors() {
        let mut r = offscreen(Variant::Classic, 80, 24);
        let g = game();
        r.compose(&g, false);
        for (i, color) in g.options.iter().enumerate() {
            let rect = r.layout().rect(Element::ColorOption(i)).unwrap();
            assert_eq!(r.front.get(rect.x, rect.y).bg, term_color(color));
        }
    }

    #[test]
    fn label_contrast() {
        assert_eq!(label_color(Rgb::new(255, 255, 255)), Color::Black);
        assert_eq!(label_color(Rgb::new(0, 0, 80)), Color::White);
    }
}
