/// Deferred transitions keyed by token.
///
/// Every scheduled task gets a fresh token, and only the newest token of
/// each kind is live. Rescheduling or cancelling a kind leaves the older
/// entry in the queue but turns it stale: when it comes due it is dropped
/// instead of fired. Time is the game clock, never the wall clock, so a
/// fixed sequence of `advance` calls always fires the same tasks.

use std::collections::HashMap;
use std::time::Duration;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TimerKind {
    /// Replace the solved round with a fresh target and options.
    RestartRound,
    /// Return the status banner to idle.
    ClearStatus,
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Token(u64);

#[derive(Clone, Debug)]
struct Pending {
    kind: TimerKind,
    token: Token,
    due: Duration,
}

#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    next_token: u64,
    queue: Vec<Pending>,
    live: HashMap<TimerKind, Token>,
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler::default()
    }

    /// Schedule `kind` to fire at `due`, superseding any pending task of the same kind.
    pub fn schedule(&mut self, kind: TimerKind, due: Duration) -> Token {
        self.next_token += 1;
        let token = Token(self.next_token);
        if let Some(old) = self.live.insert(kind, token) {
            tracing::debug!(?kind, ?old, ?token, "timer superseded");
        }
        self.queue.push(Pending { kind, token, due });
        token
    }

    /// Invalidate the pending task of `kind`, if any.
    pub fn cancel(&mut self, kind: TimerKind) {
        if let Some(token) = self.live.remove(&kind) {
            tracing::debug!(?kind, ?token, "timer cancelled");
        }
    }

    pub fn is_pending(&self, kind: TimerKind) -> bool {
        self.live.contains_key(&kind)
    }

    /// Due time of the live task of `kind`.
    pub fn due(&self, kind: TimerKind) -> Option<Duration> {
        let token = self.live.get(&kind)?;
        self.queue.iter().find(|p| p.token == *token).map(|p| p.due)
    }

    /// Remove everything due at or before `now`. Returns the kinds whose live
    /// task fired, in due order (ties broken by scheduling order).
    pub fn fire_due(&mut self, now: Duration) -> Vec<TimerKind> {
        let (mut due, rest): (Vec<Pending>, Vec<Pending>) =
            self.queue.drain(..).partition(|p| p.due <= now);
        self.queue = rest;
        due.sort_by_key(|p| (p.due, p.token));

        let mut fired = Vec::with_capacity(due.len());
        for p in due {
            if self.live.get(&p.kind) == Some(&p.token) {
                self.live.remove(&p.kind);
                fired.push(p.kind);
            } else {
                tracing::trace!(kind = ?p.kind, token = ?p.token, "stale timer dropped");
            }
        }
        fired
    }

    #[cfg(test)]
    fn queued(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn fires_once_when_due() {
        let mut s = Scheduler::new();
        s.schedule(TimerKind::ClearStatus, ms(1500));
        assert!(s.fire_due(ms(1499)).is_empty());
        assert!(s.is_pending(TimerKind::ClearStatus));
        assert_eq!(s.fire_due(ms(1500)), vec![TimerKind::ClearStatus]);
        assert!(!s.is_pending(TimerKind::ClearStatus));
        assert!(s.fire_due(ms(5000)).is_empty());
    }

    #[test]
    fn rescheduling_makes_the_earlier_task_stale() {
        let mut s = Scheduler::new();
        s.schedule(TimerKind::ClearStatus, ms(1500));
        s.schedule(TimerKind::ClearStatus, ms(2500));
        assert!(s.fire_due(ms(1600)).is_empty());
        assert_eq!(s.due(TimerKind::ClearStatus), Some(ms(2500)));
        assert_eq!(s.fire_due(ms(2500)), vec![TimerKind::ClearStatus]);
        assert_eq!(s.queued(), 0);
    }

    #[test]
    fn cancel_suppresses_firing() {
        let mut s = Scheduler::new();
        s.schedule(TimerKind::RestartRound, ms(100));
        s.cancel(TimerKind::RestartRound);
        assert!(!s.is_pending(TimerKind::RestartRound));
        assert_eq!(s.due(TimerKind::RestartRound), None);
        assert!(s.fire_due(ms(100)).is_empty());
    }

    #[test]
    fn kinds_are_independent_and_ordered() {
        let mut s = Scheduler::new();
        s.schedule(TimerKind::ClearStatus, ms(300));
        s.schedule(TimerKind::RestartRound, ms(200));
        s.cancel(TimerKind::ClearStatus);
        s.schedule(TimerKind::ClearStatus, ms(200));
        assert_eq!(
            s.fire_due(ms(1000)),
            vec![TimerKind::RestartRound, TimerKind::ClearStatus]
        );
    }
}
