//! Timer slots for the draw engine.
//!
//! There are exactly two slots:
//! - the **phase** slot, holding the one deadline that moves the state machine
//!   forward (countdown tick, end of rolling, end of reveal, pauses);
//! - the **display** slot, holding the cosmetic rolling refresh.
//!
//! Arming a slot replaces whatever it held, so a superseded callback can never
//! fire. Every handle carries a fresh [`TimerId`]; nothing is reused.

use std::time::Duration;

/// What a timer does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    CountdownTick,
    RollTick,
    RollEnd,
    RevealEnd,
    NextRound,
    Finish,
}

impl TimerKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::CountdownTick => "countdown_tick",
            Self::RollTick => "roll_tick",
            Self::RollEnd => "roll_end",
            Self::RevealEnd => "reveal_end",
            Self::NextRound => "next_round",
            Self::Finish => "finish",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// A scheduled callback. `deadline` is measured on the engine's clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle {
    pub id: TimerId,
    pub kind: TimerKind,
    pub deadline: Duration,
}

#[derive(Debug, Default)]
pub struct Timers {
    next_id: u64,
    phase: Option<TimerHandle>,
    display: Option<TimerHandle>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&mut self, kind: TimerKind, deadline: Duration) -> TimerHandle {
        self.next_id += 1;
        TimerHandle {
            id: TimerId(self.next_id),
            kind,
            deadline,
        }
    }

    /// Schedule the next phase deadline, cancelling the previous one.
    pub fn arm_phase(&mut self, kind: TimerKind, deadline: Duration) -> TimerHandle {
        let h = self.handle(kind, deadline);
        if let Some(old) = self.phase.replace(h) {
            log::debug!("timer {} superseded by {}", old.kind.label(), kind.label());
        }
        h
    }

    /// Schedule the next display refresh, cancelling the previous one.
    pub fn arm_display(&mut self, kind: TimerKind, deadline: Duration) -> TimerHandle {
        let h = self.handle(kind, deadline);
        self.display = Some(h);
        h
    }

    pub fn cancel_display(&mut self) -> Option<TimerHandle> {
        self.display.take()
    }

    /// Drop both slots. Returns how many timers were pending.
    pub fn cancel_all(&mut self) -> usize {
        usize::from(self.phase.take().is_some()) + usize::from(self.display.take().is_some())
    }

    pub fn pending(&self) -> usize {
        usize::from(self.phase.is_some()) + usize::from(self.display.is_some())
    }

    /// Earliest pending deadline across both slots.
    pub fn next_deadline(&self) -> Option<Duration> {
        match (self.phase, self.display) {
            (Some(p), Some(d)) => Some(p.deadline.min(d.deadline)),
            (Some(h), None) | (None, Some(h)) => Some(h.deadline),
            (None, None) => None,
        }
    }

    /// Remove and return the earliest timer due at `now`. On a tie the phase
    /// timer goes first, so a phase change can cancel the display refresh
    /// that shares its deadline.
    pub fn pop_due(&mut self, now: Duration) -> Option<TimerHandle> {
        let phase_due = self.phase.filter(|h| h.deadline <= now);
        let display_due = self.display.filter(|h| h.deadline <= now);
        match (phase_due, display_due) {
            (Some(p), Some(d)) if d.deadline < p.deadline => self.display.take(),
            (Some(_), _) => self.phase.take(),
            (None, Some(_)) => self.display.take(),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_arming_phase_replaces_previous() {
        let mut t = Timers::new();
        let a = t.arm_phase(TimerKind::CountdownTick, ms(1000));
        let b = t.arm_phase(TimerKind::RollEnd, ms(3000));
        assert_ne!(a.id, b.id);
        assert_eq!(t.pending(), 1);
        assert_eq!(t.pop_due(ms(5000)), Some(b));
        assert_eq!(t.pop_due(ms(5000)), None);
    }

    #[test]
    fn test_nothing_due_before_deadline() {
        let mut t = Timers::new();
        t.arm_phase(TimerKind::RevealEnd, ms(4000));
        assert_eq!(t.pop_due(ms(3999)), None);
        assert_eq!(t.pop_due(ms(4000)).map(|h| h.kind), Some(TimerKind::RevealEnd));
        assert_eq!(t.pending(), 0);
    }

    #[test]
    fn test_earliest_deadline_pops_first() {
        let mut t = Timers::new();
        t.arm_phase(TimerKind::RollEnd, ms(3000));
        t.arm_display(TimerKind::RollTick, ms(100));
        assert_eq!(t.next_deadline(), Some(ms(100)));
        assert_eq!(t.pop_due(ms(5000)).map(|h| h.kind), Some(TimerKind::RollTick));
        assert_eq!(t.pop_due(ms(5000)).map(|h| h.kind), Some(TimerKind::RollEnd));
        assert_eq!(t.pop_due(ms(5000)), None);
    }

    #[test]
    fn test_phase_wins_ties() {
        let mut t = Timers::new();
        t.arm_display(TimerKind::RollTick, ms(3000));
        t.arm_phase(TimerKind::RollEnd, ms(3000));
        assert_eq!(t.pop_due(ms(3000)).map(|h| h.kind), Some(TimerKind::RollEnd));
    }

    #[test]
    fn test_cancel_all_counts_pending() {
        let mut t = Timers::new();
        assert_eq!(t.cancel_all(), 0);
        t.arm_phase(TimerKind::RollEnd, ms(3000));
        t.arm_display(TimerKind::RollTick, ms(100));
        assert_eq!(t.cancel_all(), 2);
        assert_eq!(t.next_deadline(), None);
        assert_eq!(t.pop_due(Duration::MAX), None);
    }
}
