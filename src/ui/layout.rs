/// Screen layout: where each element sits, and which one a click lands on.
///
/// Everything is a centered vertical stack:
///
/// ```text
///   title
///   instructions (2 rows)
///   color box
///   score
///   status banner
///   option grid (3 × 2 buttons)
///   action buttons
///   help line
/// ```
///
/// If the terminal is taller than the stack, the stack is centered
/// vertically; if shorter, the bottom is clipped by the frame buffer.

use crate::domain::options::{OPTION_COLUMNS, OPTION_COUNT};
use crate::domain::variant::Variant;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

impl Rect {
    pub fn contains(&self, col: usize, row: usize) -> bool {
        col >= self.x && col < self.x + self.w && row >= self.y && row < self.y + self.h
    }

    #[cfg(test)]
    fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }
}

/// Every rendered element, with a stable identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Element {
    Title,
    Instructions,
    ColorBox,
    Score,
    GameStatus,
    ColorOption(usize),
    NewGameButton,
    ChangeColorButton,
    Help,
}

impl Element {
    /// Stable identifier, used in logs and by automated drivers.
    pub fn id(self) -> &'static str {
        match self {
            Element::Title => "title",
            Element::Instructions => "gameInstructions",
            Element::ColorBox => "colorBox",
            Element::Score => "score",
            Element::GameStatus => "gameStatus",
            Element::ColorOption(_) => "colorOption",
            Element::NewGameButton => "newGameButton",
            Element::ChangeColorButton => "changeColorButton",
            Element::Help => "help",
        }
    }

    /// Can the player click it?
    pub fn is_clickable(self) -> bool {
        matches!(
            self,
            Element::ColorOption(_) | Element::NewGameButton | Element::ChangeColorButton
        )
    }
}

// ── Dimensions (terminal cells) ──

pub const PANEL_W: usize = 60;
pub const INSTRUCTION_ROWS: usize = 2;
pub const SWATCH_W: usize = 20;
pub const SWATCH_H: usize = 4;
pub const STATUS_W: usize = 40;
pub const BUTTON_W: usize = 10;
pub const BUTTON_H: usize = 3;
const GRID_GAP_X: usize = 3;
const GRID_GAP_Y: usize = 1;
pub const NEW_GAME_LABEL: &str = "[ New Game ]";
pub const CHANGE_COLOR_LABEL: &str = "[ Change Color ]";
const ACTION_GAP: usize = 4;

const GRID_ROWS: usize = OPTION_COUNT.div_ceil(OPTION_COLUMNS);
const GRID_W: usize = OPTION_COLUMNS * BUTTON_W + (OPTION_COLUMNS - 1) * GRID_GAP_X;
const GRID_H: usize = GRID_ROWS * BUTTON_H + (GRID_ROWS - 1) * GRID_GAP_Y;

/// Total rows used by the stack.
pub const CONTENT_H: usize =
    1 + 1 + INSTRUCTION_ROWS + 1 + SWATCH_H + 1 + 1 + 1 + 1 + GRID_H + 1 + 1 + 1 + 1;

#[derive(Clone, Debug)]
pub struct Layout {
    items: Vec<(Element, Rect)>,
}

impl Layout {
    pub fn compute(term_w: usize, term_h: usize, variant: Variant) -> Self {
        let mut items = Vec::with_capacity(16);
        let center = |w: usize| term_w.saturating_sub(w) / 2;
        let mut y = term_h.saturating_sub(CONTENT_H) / 2;

        let mut push = |el: Element, x: usize, y: usize, w: usize, h: usize| {
            items.push((el, Rect { x, y, w, h }));
        };

        let panel_w = PANEL_W.min(term_w.max(1));
        push(Element::Title, center(panel_w), y, panel_w, 1);
        y += 2;
        push(Element::Instructions, center(panel_w), y, panel_w, INSTRUCTION_ROWS);
        y += INSTRUCTION_ROWS + 1;
        push(Element::ColorBox, center(SWATCH_W), y, SWATCH_W, SWATCH_H);
        y += SWATCH_H + 1;
        push(Element::Score, center(panel_w), y, panel_w, 1);
        y += 1;
        push(Element::GameStatus, center(STATUS_W), y, STATUS_W, 1);
        y += 2;

        let grid_x = center(GRID_W);
        for i in 0..OPTION_COUNT {
            let col = i % OPTION_COLUMNS;
            let row = i / OPTION_COLUMNS;
            push(
                Element::ColorOption(i),
                grid_x + col * (BUTTON_W + GRID_GAP_X),
                y + row * (BUTTON_H + GRID_GAP_Y),
                BUTTON_W,
                BUTTON_H,
            );
        }
        y += GRID_H + 1;

        let new_w = NEW_GAME_LABEL.chars().count();
        let change_w = CHANGE_COLOR_LABEL.chars().count();
        if variant.has_change_color() {
            let x = center(new_w + ACTION_GAP + change_w);
            push(Element::NewGameButton, x, y, new_w, 1);
            push(Element::ChangeColorButton, x + new_w + ACTION_GAP, y, change_w, 1);
        } else {
            push(Element::NewGameButton, center(new_w), y, new_w, 1);
        }
        y += 2;

        push(Element::Help, center(panel_w), y, panel_w, 1);

        Layout { items }
    }

    pub fn rect(&self, el: Element) -> Option<Rect> {
        self.items.iter().find(|(e, _)| *e == el).map(|(_, r)| *r)
    }

    /// The clickable element under a terminal cell, if any.
    pub fn hit_test(&self, col: usize, row: usize) -> Option<Element> {
        self.items
            .iter()
            .find(|(e, r)| e.is_clickable() && r.contains(col, row))
            .map(|(e, _)| *e)
    }

    #[cfg(test)]
    fn elements(&self) -> impl Iterator<Item = Element> + '_ {
        self.items.iter().map(|(e, _)| *e)
    }
}
