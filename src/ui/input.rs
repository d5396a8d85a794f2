/// Terminal input collector.
///
/// Drains every pending crossterm event once per frame and keeps:
///   - Keys freshly pressed this frame (edge-triggered; repeats and
///     releases are ignored so one tap is one guess)
///   - Left-button mouse clicks, in terminal cell coordinates
///
/// Resizes need no tracking here: the renderer re-reads the terminal
/// size every frame.

use std::time::Duration;

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};

pub struct InputState {
    /// Keys pressed during the most recent drain_events() call.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for modifier checks.
    pub raw_events: Vec<KeyEvent>,

    /// Left clicks as (column, row).
    pub clicks: Vec<(usize, usize)>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            clicks: Vec::with_capacity(4),
        }
    }

    /// Drain all pending terminal events. Call once per frame.
    pub fn drain_events(&mut self) {
        self.clear();

        // Read all available events without blocking
        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(ev) => self.apply(ev),
                Err(e) => {
                    tracing::warn!(%e, "terminal event read failed");
                    break;
                }
            }
        }
    }

    fn clear(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();
        self.clicks.clear();
    }

    fn apply(&mut self, ev: Event) {
        match ev {
            Event::Key(key) => {
                self.raw_events.push(key);
                if key.kind == KeyEventKind::Press {
                    self.fresh_presses.push(key.code);
                }
            }
            Event::Mouse(mouse) => {
                if mouse.kind == MouseEventKind::Down(MouseButton::Left) {
                    self.clicks.push((mouse.column as usize, mouse.row as usize));
                }
            }
            _ => {}
        }
    }

    /// Was this key freshly pressed this frame?
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    /// Convenience: was any of these keys freshly pressed?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// First digit key `1..=max` pressed this frame, as a zero-based index.
    pub fn digit_pressed(&self, max: usize) -> Option<usize> {
        self.fresh_presses.iter().find_map(|code| match code {
            KeyCode::Char(c) => c
                .to_digit(10)
                .map(|d| d as usize)
                .filter(|d| (1..=max).contains(d))
                .map(|d| d - 1),
            _ => None,
        })
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}
