/// Gamepad input tracker using gilrs.
///
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad / Left Stick    →  Move focus between options
///   A                     →  Guess focused option
///   Start                 →  New Game
///   Y / X                 →  Change Color
///   Select                →  Quit

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.5;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,      // LeftTrigger
    R1,      // RightTrigger
    L2,      // LeftTrigger2
    R2,      // RightTrigger2
    Start,
    Select,
}

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "L2" | "LT" | "LEFTTRIGGER2"  => Some(Btn::L2),
            "R2" | "RT" | "RIGHTTRIGGER2" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South     => Some(Btn::A),
            Button::East      => Some(Btn::B),
            Button::West      => Some(Btn::X),
            Button::North     => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2  => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start     => Some(Btn::Start),
            Button::Select    => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Per-button state: held (continuous) and just_pressed (edge).
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    held: bool,
    just_pressed: bool,
}

/// Action-to-button mapping (loaded from config).
#[derive(Debug, PartialEq)]
struct ActionMap {
    confirm: Vec<Btn>,
    new_game: Vec<Btn>,
    change_color: Vec<Btn>,
    quit: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            confirm:      vec![Btn::A],
            new_game:     vec![Btn::Start],
            change_color: vec![Btn::Y, Btn::X],
            quit:         vec![Btn::Select],
        }
    }
}

/// The four focus directions, D-pad and stick merged.
#[derive(Clone, Copy, Debug, Default)]
struct Directions {
    up: BtnState,
    down: BtnState,
    left: BtnState,
    right: BtnState,
}

impl Directions {
    fn clear_just_pressed(&mut self) {
        for d in [&mut self.up, &mut self.down, &mut self.left, &mut self.right] {
            d.just_pressed = false;
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    // All tracked buttons (indexed by Btn)
    buttons: [BtnState; 10],

    dpad: Directions,
    stick: Directions,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_x: f32,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_y: f32,

    // Action mapping
    action_map: ActionMap,

    pub connected: bool,
}

fn btn_index(btn: Btn) -> usize {
    btn as usize
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = {
            match Gilrs::new() {
                Ok(g) => {
                    let has_pad = g.gamepads().next().is_some();
                    (Some(g), has_pad)
                }
                Err(e) => {
                    tracing::warn!(%e, "gamepad support unavailable");
                    (None, false)
                }
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        let mut state = Self::detached();
        #[cfg(feature = "gamepad")]
        {
            state.gilrs = gilrs_opt;
        }
        state.connected = connected;
        state
    }

    /// A tracker with no backend attached; every query reads false.
    fn detached() -> Self {
        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: None,
            buttons: [BtnState::default(); 10],
            dpad: Directions::default(),
            stick: Directions::default(),
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::default(),
            connected: false,
        }
    }

    /// Load button mapping from config. Unknown names are skipped; an
    /// action left with no valid buttons keeps its default.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        fn parse_list(names: &[String]) -> Vec<Btn> {
            names
                .iter()
                .filter_map(|s| {
                    let btn = Btn::from_name(s);
                    if btn.is_none() {
                        tracing::warn!(name = %s, "unknown gamepad button in config");
                    }
                    btn
                })
                .collect()
        }
        let map = &mut self.action_map;
        let cf = parse_list(&cfg.confirm);
        if !cf.is_empty() { map.confirm = cf; }
        let ng = parse_list(&cfg.new_game);
        if !ng.is_empty() { map.new_game = ng; }
        let cc = parse_list(&cfg.change_color);
        if !cc.is_empty() { map.change_color = cc; }
        let qt = parse_list(&cfg.quit);
        if !qt.is_empty() { map.quit = qt; }
    }

    pub fn update(&mut self) {
        self.clear_just_pressed();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, false, false);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    self.update_axis(axis, value);
                }
                EventType::Connected => {
                    tracing::info!("gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    tracing::info!("gamepad disconnected");
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }

        // Derive stick digital states; one push = one focus step
        let held = [
            self.stick_y > STICK_DEADZONE,
            self.stick_y < -STICK_DEADZONE,
            self.stick_x < -STICK_DEADZONE,
            self.stick_x > STICK_DEADZONE,
        ];
        let s = &mut self.stick;
        for (state, now) in [&mut s.up, &mut s.down, &mut s.left, &mut s.right].into_iter().zip(held) {
            if now && !state.held {
                state.just_pressed = true;
            }
            state.held = now;
        }
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool, just_pressed: bool) {
        // D-pad handled separately (not in Btn enum)
        let dpad = match gilrs_btn {
            Button::DPadUp    => Some(&mut self.dpad.up),
            Button::DPadDown  => Some(&mut self.dpad.down),
            Button::DPadLeft  => Some(&mut self.dpad.left),
            Button::DPadRight => Some(&mut self.dpad.right),
            _ => None,
        };
        if let Some(state) = dpad {
            state.held = held;
            if just_pressed { state.just_pressed = true; }
            return;
        }

        if let Some(btn) = Btn::from_gilrs(gilrs_btn) {
            let idx = btn_index(btn);
            self.buttons[idx].held = held;
            if just_pressed {
                self.buttons[idx].just_pressed = true;
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn update_axis(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::LeftStickX => self.stick_x = value,
            Axis::LeftStickY => self.stick_y = value,
            _ => {}
        }
    }

    // ── Action queries (config-driven) ──

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[btn_index(b)].just_pressed)
    }

    pub fn confirm_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.confirm)
    }
    pub fn new_game_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.new_game)
    }
    pub fn change_color_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.change_color)
    }
    pub fn quit_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.quit)
    }

    // Focus movement (edge-triggered)
    pub fn up_pressed(&self) -> bool {
        self.dpad.up.just_pressed || self.stick.up.just_pressed
    }
    pub fn down_pressed(&self) -> bool {
        self.dpad.down.just_pressed || self.stick.down.just_pressed
    }
    pub fn left_pressed(&self) -> bool {
        self.dpad.left.just_pressed || self.stick.left.just_pressed
    }
    pub fn right_pressed(&self) -> bool {
        self.dpad.right.just_pressed || self.stick.right.just_pressed
    }

    // ── Internal ──

    fn clear_just_pressed(&mut self) {
        for b in &mut self.buttons { b.just_pressed = false; }
        self.dpad.clear_just_pressed();
        self.stick.clear_just_pressed();
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        for b in &mut self.buttons { *b = BtnState::default(); }
        self.dpad = Directions::default();
        self.stick = Directions::default();
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(confirm: &[&str], new_game: &[&str], change_color: &[&str], quit: &[&str]) -> GamepadConfig {
        let v = |names: &[&str]| names.iter().map(|s| s.to_string()).collect();
        GamepadConfig {
            confirm: v(confirm),
            new_game: v(new_game),
            change_color: v(change_color),
            quit: v(quit),
        }
    }

    #[test]
    fn button_names_and_aliases() {
        assert_eq!(Btn::from_name("a"), Some(Btn::A));
        assert_eq!(Btn::from_name("South"), Some(Btn::A));
        assert_eq!(Btn::from_name("rb"), Some(Btn::R1));
        assert_eq!(Btn::from_name("Back"), Some(Btn::Select));
        assert_eq!(Btn::from_name("Turbo"), None);
    }

    #[test]
    fn config_overrides_mapping() {
        let mut gp = GamepadState::detached();
        gp.load_button_config(&cfg(&["B"], &["Start", "L1"], &["Y"], &["Select"]));
        assert_eq!(gp.action_map.confirm, vec![Btn::B]);
        assert_eq!(gp.action_map.new_game, vec![Btn::Start, Btn::L1]);
    }

    #[test]
    fn invalid_names_keep_defaults() {
        let mut gp = GamepadState::detached();
        gp.load_button_config(&cfg(&["Turbo"], &[], &["Y"], &["Select"]));
        assert_eq!(gp.action_map.confirm, ActionMap::default().confirm);
        assert_eq!(gp.action_map.new_game, ActionMap::default().new_game);
    }

    #[test]
    fn presses_are_cleared_each_frame() {
        let mut gp = GamepadState::detached();
        gp.buttons[btn_index(Btn::A)].just_pressed = true;
        gp.dpad.left.just_pressed = true;
        assert!(gp.confirm_pressed());
        assert!(gp.left_pressed());
        gp.clear_just_pressed();
        assert!(!gp.confirm_pressed());
        assert!(!gp.left_pressed());
    }
}
