/// GameState: the complete state of a running session.
///
/// ## Round
///
/// A round is a target color plus the option set derived from it. The two
/// are always replaced together by `roll_round`, so the options can never
/// refer to a previous target.
///
/// ## Status
///
/// `status` is transient feedback for the most recent guess. It is set
/// synchronously by a guess and returned to `Idle` by a `ClearStatus` timer
/// on the game clock (see `sim::timer`).

use std::time::Duration;

use rand::rngs::StdRng;

use crate::config::RulesConfig;
use crate::domain::color::{random_color, Color};
use crate::domain::options::{build_options, OptionSet};
use crate::sim::timer::{Scheduler, TimerKind};

pub const CORRECT_MESSAGE: &str = "Correct 🎉! Well done!";
pub const WRONG_MESSAGE: &str = "Wrong guess! Try again!";
pub const INSTRUCTIONS: &str =
    "Match the color! Click on the button that matches the color shown in the box above.";

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Status {
    #[default]
    Idle,
    Correct,
    Wrong,
}

impl Status {
    /// Banner text; empty while idle.
    pub fn message(self) -> &'static str {
        match self {
            Status::Idle => "",
            Status::Correct => CORRECT_MESSAGE,
            Status::Wrong => WRONG_MESSAGE,
        }
    }

    /// `None` while idle, otherwise whether the last guess was right.
    pub fn is_correct(self) -> Option<bool> {
        match self {
            Status::Idle => None,
            Status::Correct => Some(true),
            Status::Wrong => Some(false),
        }
    }
}

pub struct GameState {
    pub rules: RulesConfig,

    // ── Round ──
    pub target: Color,
    pub options: OptionSet,
    /// Rounds started this session, including the first.
    pub round: u32,

    // ── Meta ──
    pub score: u32,
    pub status: Status,
    /// Focused option for keyboard / gamepad play.
    pub cursor: usize,

    // ── Time ──
    /// Game clock: total time fed to `step::advance`.
    pub clock: Duration,
    pub timers: Scheduler,

    pub rng: StdRng,
}

impl GameState {
    /// Fresh session with a random first target.
    pub fn new(rules: RulesConfig, mut rng: StdRng) -> Self {
        let target = random_color(&mut rng);
        Self::with_target(rules, target, rng)
    }

    /// Fresh session whose first round uses `target`.
    pub fn with_target(rules: RulesConfig, target: Color, mut rng: StdRng) -> Self {
        let options = build_options(target, rules.variant, rules.similar_variation, &mut rng);
        tracing::info!(variant = %rules.variant, %target, "session started");
        GameState {
            rules,
            target,
            options,
            round: 1,
            score: 0,
            status: Status::Idle,
            cursor: 0,
            clock: Duration::ZERO,
            timers: Scheduler::new(),
            rng,
        }
    }

    /// Replace target and options with a new random round.
    pub fn roll_round(&mut self) {
        self.target = random_color(&mut self.rng);
        self.options = build_options(
            self.target,
            self.rules.variant,
            self.rules.similar_variation,
            &mut self.rng,
        );
        self.round += 1;
        tracing::debug!(round = self.round, target = %self.target, "round started");
    }

    /// The round is solved and waiting for its restart timer.
    pub fn round_solved(&self) -> bool {
        self.timers.is_pending(TimerKind::RestartRound)
    }

    /// Time left until the solved round is replaced.
    pub fn restart_in(&self) -> Option<Duration> {
        self.timers
            .due(TimerKind::RestartRound)
            .map(|due| due.saturating_sub(self.clock))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn new_session_starts_idle_with_valid_round() {
        let game = GameState::new(RulesConfig::default(), StdRng::seed_from_u64(9));
        assert_eq!(game.score, 0);
        assert_eq!(game.round, 1);
        assert_eq!(game.status, Status::Idle);
        assert!(game.options.contains(game.target));
        assert!(!game.round_solved());
        assert_eq!(game.restart_in(), None);
    }

    #[test]
    fn roll_round_keeps_options_in_sync_with_target() {
        let mut game = GameState::new(RulesConfig::default(), StdRng::seed_from_u64(10));
        for _ in 0..20 {
            game.roll_round();
            assert!(game.options.contains(game.target));
        }
        assert_eq!(game.round, 21);
    }

    #[test]
    fn status_messages() {
        assert_eq!(Status::Idle.message(), "");
        assert_eq!(Status::Correct.message(), "Correct 🎉! Well done!");
        assert_eq!(Status::Wrong.message(), "Wrong guess! Try again!");
        assert_eq!(Status::Idle.is_correct(), None);
        assert_eq!(Status::Wrong.is_correct(), Some(false));
    }
}
