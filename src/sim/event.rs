/// Events emitted by game transitions.
/// The presentation layer consumes these for sound.

use crate::domain::color::Color;

#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(dead_code)]
pub enum GameEvent {
    CorrectGuess { score: u32 },
    WrongGuess { guessed: Color },
    /// A guess arrived while the solved round was waiting to restart.
    GuessIgnored,
    RoundStarted { round: u32, target: Color },
    ScoreReset,
    StatusCleared,
}
