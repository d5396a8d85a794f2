/// Game transitions: guesses, round changes and the game clock.
///
/// Each function mutates the state in place and returns the events it
/// produced. Nothing here touches the terminal, so every transition is
/// unit tested directly.
///
/// Timer rules:
///   - A guess (re)arms `ClearStatus`; the banner lasts the full delay
///     after the latest guess.
///   - A correct guess arms `RestartRound`. Until it fires, further
///     guesses are ignored: a target can score at most once.
///   - ChangeColor / NewGame replace the round at once and cancel a
///     pending `RestartRound`.

use std::time::Duration;

use crate::domain::color::Color;
use crate::domain::options::{OPTION_COLUMNS, OPTION_COUNT};
use crate::sim::event::GameEvent;
use crate::sim::timer::TimerKind;
use crate::sim::world::{GameState, Status};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FocusMove {
    Left,
    Right,
    Up,
    Down,
}

/// Guess the option at `index`. Out-of-range indices are ignored.
pub fn guess(game: &mut GameState, index: usize) -> Vec<GameEvent> {
    match game.options.get(index) {
        Some(color) => {
            game.cursor = index;
            guess_color(game, color)
        }
        None => Vec::new(),
    }
}

pub fn guess_color(game: &mut GameState, color: Color) -> Vec<GameEvent> {
    if game.round_solved() {
        tracing::debug!(%color, "round already solved; guess ignored");
        return vec![GameEvent::GuessIgnored];
    }

    let mut events = Vec::with_capacity(1);
    let due = game.clock + game.rules.status_delay();

    if color == game.target {
        game.score += 1;
        game.status = Status::Correct;
        game.timers.schedule(TimerKind::RestartRound, due);
        tracing::info!(score = game.score, %color, "correct guess");
        events.push(GameEvent::CorrectGuess { score: game.score });
    } else {
        game.status = Status::Wrong;
        tracing::info!(guessed = %color, target = %game.target, "wrong guess");
        events.push(GameEvent::WrongGuess { guessed: color });
    }

    game.timers.schedule(TimerKind::ClearStatus, due);
    events
}

/// New target and options right away. Score and status are untouched.
/// Only available in variants with a Change Color action.
pub fn change_color(game: &mut GameState) -> Vec<GameEvent> {
    if !game.rules.variant.has_change_color() {
        return Vec::new();
    }
    vec![restart_round(game)]
}

/// Score back to zero, then a new round.
pub fn new_game(game: &mut GameState) -> Vec<GameEvent> {
    tracing::info!(final_score = game.score, "new game");
    game.score = 0;
    vec![GameEvent::ScoreReset, restart_round(game)]
}

/// Move the game clock forward by `dt` and fire whatever came due.
pub fn advance(game: &mut GameState, dt: Duration) -> Vec<GameEvent> {
    game.clock += dt;

    let mut events = Vec::new();
    for kind in game.timers.fire_due(game.clock) {
        match kind {
            TimerKind::RestartRound => {
                game.roll_round();
                events.push(GameEvent::RoundStarted { round: game.round, target: game.target });
            }
            TimerKind::ClearStatus => {
                game.status = Status::Idle;
                events.push(GameEvent::StatusCleared);
            }
        }
    }
    events
}

/// Move the focus cursor within the option grid. Stops at the edges.
pub fn move_cursor(game: &mut GameState, dir: FocusMove) {
    let count = game.options.len().min(OPTION_COUNT);
    if count == 0 {
        return;
    }
    let cur = game.cursor.min(count - 1);
    let col = cur % OPTION_COLUMNS;
    game.cursor = match dir {
        FocusMove::Left if col > 0 => cur - 1,
        FocusMove::Right if col + 1 < OPTION_COLUMNS && cur + 1 < count => cur + 1,
        FocusMove::Up if cur >= OPTION_COLUMNS => cur - OPTION_COLUMNS,
        FocusMove::Down if cur + OPTION_COLUMNS < count => cur + OPTION_COLUMNS,
        _ => cur,
    };
}

fn restart_round(game: &mut GameState) -> GameEvent {
    game.timers.cancel(TimerKind::RestartRound);
    game.roll_round();
    GameEvent::RoundStarted { round: game.round, target: game.target }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use crate::domain::variant::Variant;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const DELAY: Duration = Duration::from_millis(1500);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn game_with(variant: Variant, target: Color) -> GameState {
        let rules = RulesConfig { variant, ..RulesConfig::default() };
        GameState::with_target(rules, target, StdRng::seed_from_u64(42))
    }

    fn game() -> GameState {
        game_with(Variant::Classic, Color::new(10, 20, 30))
    }

    fn target_index(game: &GameState) -> usize {
        game.options.iter().position(|c| c == game.target).expect("target shown")
    }

    fn decoy_index(game: &GameState) -> usize {
        game.options.iter().position(|c| c != game.target).expect("decoy shown")
    }

    fn guess_target(game: &mut GameState) -> Vec<GameEvent> {
        let i = target_index(game);
        guess(game, i)
    }

    fn guess_decoy(game: &mut GameState) -> Vec<GameEvent> {
        let i = decoy_index(game);
        guess(game, i)
    }

    // ── Guessing ──

    #[test]
    fn correct_guess_scores_and_congratulates() {
        let mut g = game();
        let events = guess_color(&mut g, Color::new(10, 20, 30));
        assert_eq!(g.score, 1);
        assert_eq!(g.status, Status::Correct);
        assert_eq!(g.status.message(), "Correct 🎉! Well done!");
        assert_eq!(events, vec![GameEvent::CorrectGuess { score: 1 }]);
    }

    #[test]
    fn wrong_guess_keeps_score() {
        let mut g = game();
        let decoy = g.options.get(decoy_index(&g)).unwrap();
        let events = guess_color(&mut g, decoy);
        assert_eq!(g.score, 0);
        assert_eq!(g.status, Status::Wrong);
        assert_eq!(g.status.message(), "Wrong guess! Try again!");
        assert_eq!(events, vec![GameEvent::WrongGuess { guessed: decoy }]);
    }

    #[test]
    fn guess_by_index_moves_cursor() {
        let mut g = game();
        let i = target_index(&g);
        guess(&mut g, i);
        assert_eq!(g.cursor, i);
        assert_eq!(g.score, 1);
    }

    #[test]
    fn guess_out_of_range_is_ignored() {
        let mut g = game();
        assert!(guess(&mut g, OPTION_COUNT).is_empty());
        assert_eq!(g.status, Status::Idle);
    }

    // ── Timers ──

    #[test]
    fn status_clears_after_delay() {
        let mut g = game();
        guess_decoy(&mut g);
        assert!(advance(&mut g, DELAY - ms(1)).is_empty());
        assert_eq!(g.status, Status::Wrong);
        assert_eq!(advance(&mut g, ms(1)), vec![GameEvent::StatusCleared]);
        assert_eq!(g.status, Status::Idle);
        assert_eq!(g.status.message(), "");
    }

    #[test]
    fn correct_guess_starts_next_round_after_delay() {
        let mut g = game();
        let first = g.target;
        guess_target(&mut g);
        assert!(g.round_solved());
        assert_eq!(g.restart_in(), Some(DELAY));

        advance(&mut g, ms(1000));
        assert_eq!(g.target, first);
        assert_eq!(g.restart_in(), Some(ms(500)));

        let events = advance(&mut g, ms(500));
        assert_eq!(g.round, 2);
        assert_ne!(g.target, first);
        assert!(g.options.contains(g.target));
        assert_eq!(g.status, Status::Idle);
        assert_eq!(
            events,
            vec![
                GameEvent::RoundStarted { round: 2, target: g.target },
                GameEvent::StatusCleared,
            ]
        );
        assert_eq!(g.score, 1);
    }

    #[test]
    fn stale_clear_does_not_erase_newer_status() {
        let mut g = game();
        guess_decoy(&mut g);
        advance(&mut g, ms(1000));
        guess_decoy(&mut g);

        // The first guess's clear would have fired at 1500ms.
        advance(&mut g, ms(600));
        assert_eq!(g.status, Status::Wrong);

        advance(&mut g, ms(900));
        assert_eq!(g.status, Status::Idle);
    }

    #[test]
    fn wrong_then_correct_shows_success_for_full_delay() {
        let mut g = game();
        guess_decoy(&mut g);
        advance(&mut g, ms(1400));
        guess_target(&mut g);
        advance(&mut g, ms(200));
        assert_eq!(g.status, Status::Correct);
        assert_eq!(g.round, 1);
    }

    #[test]
    fn solved_round_cannot_score_twice() {
        let mut g = game();
        let i = target_index(&g);
        guess(&mut g, i);
        assert_eq!(guess(&mut g, i), vec![GameEvent::GuessIgnored]);
        assert_eq!(g.score, 1);
        assert_eq!(g.status, Status::Correct);
    }

    // ── Change color / new game ──

    #[test]
    fn change_color_keeps_score_and_status() {
        let mut g = game();
        guess_decoy(&mut g);
        let first = g.target;
        let events = change_color(&mut g);
        assert_eq!(events.len(), 1);
        assert_ne!(g.target, first);
        assert!(g.options.contains(g.target));
        assert_eq!(g.score, 0);
        assert_eq!(g.status, Status::Wrong);
    }

    #[test]
    fn change_color_cancels_pending_restart() {
        let mut g = game();
        guess_target(&mut g);
        change_color(&mut g);
        assert_eq!(g.round, 2);
        assert!(!g.round_solved());

        advance(&mut g, DELAY);
        assert_eq!(g.round, 2);
        assert_eq!(g.status, Status::Idle);
    }

    #[test]
    fn change_color_unavailable_in_near_miss() {
        let mut g = game_with(Variant::NearMiss, Color::new(10, 20, 30));
        assert!(change_color(&mut g).is_empty());
        assert_eq!(g.target, Color::new(10, 20, 30));
        assert_eq!(g.round, 1);
    }

    #[test]
    fn new_game_resets_score_and_round() {
        let mut g = game();
        for _ in 0..3 {
            guess_target(&mut g);
            advance(&mut g, DELAY);
        }
        assert_eq!(g.score, 3);
        let before = g.target;

        let events = new_game(&mut g);
        assert_eq!(g.score, 0);
        assert_ne!(g.target, before);
        assert!(g.options.contains(g.target));
        assert_eq!(events[0], GameEvent::ScoreReset);
        assert!(matches!(events[1], GameEvent::RoundStarted { .. }));
    }

    #[test]
    fn new_game_works_in_near_miss() {
        let mut g = game_with(Variant::NearMiss, Color::new(10, 20, 30));
        guess_target(&mut g);
        new_game(&mut g);
        assert_eq!(g.score, 0);
        assert!(!g.round_solved());
    }

    #[test]
    fn near_miss_round_restarts_with_new_options() {
        let mut g = game_with(Variant::NearMiss, Color::new(10, 20, 30));
        guess_target(&mut g);
        advance(&mut g, DELAY);
        assert_eq!(g.round, 2);
        assert_eq!(g.options.len(), OPTION_COUNT);
        assert!(g.options.contains(g.target));
    }

    // ── Cursor ──

    #[test]
    fn cursor_walks_the_grid_and_stops_at_edges() {
        let mut g = game();
        g.cursor = 0;
        move_cursor(&mut g, FocusMove::Left);
        assert_eq!(g.cursor, 0);
        move_cursor(&mut g, FocusMove::Up);
        assert_eq!(g.cursor, 0);
        move_cursor(&mut g, FocusMove::Right);
        move_cursor(&mut g, FocusMove::Right);
        assert_eq!(g.cursor, 2);
        move_cursor(&mut g, FocusMove::Right);
        assert_eq!(g.cursor, 2);
        move_cursor(&mut g, FocusMove::Down);
        assert_eq!(g.cursor, 5);
        move_cursor(&mut g, FocusMove::Down);
        assert_eq!(g.cursor, 5);
        move_cursor(&mut g, FocusMove::Left);
        assert_eq!(g.cursor, 4);
        move_cursor(&mut g, FocusMove::Up);
        assert_eq!(g.cursor, 1);
    }
}
