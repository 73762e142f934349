//! Sequential winner-selection state machine.
//!
//! ```text
//!            start (countdown)         tick x3
//! Waiting ─────────────────────▶ Countdown ─────▶ Rolling ──(3u)──▶ Revealing
//!    ▲   └──── start (no countdown) ─────────────────▲                 │
//!    │                                                                  │ (4u)
//!    └──────────── pause 2u, position + 1 ◀── more to draw ◀────────────┤
//!                                                                       │
//!                  Complete ◀── pause 3u ◀────── last position ◀────────┘
//! ```
//!
//! Time only moves when the caller polls. [`DrawEngine::poll`] fires every
//! timer whose deadline has passed on the engine's [`Clock`], in deadline
//! order, and returns the resulting [`DrawEvent`]s. Each follow-up deadline is
//! computed from the deadline that fired rather than from the poll time, so a
//! late poll replays exactly the same schedule.
//!
//! Two RNG streams are kept apart: `outcome_rng` picks winners and is the only
//! thing that touches the pool, `display_rng` feeds the cosmetic rolling
//! display. A seeded draw therefore yields the same winners no matter how
//! many display refreshes happened.

use std::fmt;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::candidate::Candidate;
use crate::clock::Clock;
use crate::config::{DrawConfig, Timings, prize_label};
use crate::error::DrawError;
use crate::timer::{TimerHandle, TimerKind, Timers};

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Waiting,
    Countdown,
    Rolling,
    Revealing,
    Complete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Countdown => write!(f, "countdown"),
            Self::Rolling => write!(f, "rolling"),
            Self::Revealing => write!(f, "revealing"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

// ---------------------------------------------------------------------------
// Records and events
// ---------------------------------------------------------------------------

/// One drawn winner. Created once per selection and never changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerRecord {
    pub position: usize,
    pub prize: String,
    pub candidate: Candidate,
}

/// Something the presentation layer should react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawEvent {
    PhaseChanged { from: Phase, to: Phase },
    CountdownTick { remaining: u32 },
    /// Cosmetic sample shown while rolling. Has no bearing on the outcome.
    Rolling { candidate: Candidate },
    WinnerDrawn(WinnerRecord),
    /// Start of the celebratory overlay for a freshly revealed winner.
    Celebrate { position: usize },
    CelebrationEnded { position: usize },
    /// Emitted exactly once, on entering [`Phase::Complete`].
    Completed(Vec<WinnerRecord>),
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Everything a draw session owns. Read-only outside the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawSession {
    phase: Phase,
    current_position: usize,
    available_pool: Vec<Candidate>,
    winners: Vec<WinnerRecord>,
    displayed: Option<Candidate>,
    countdown: u32,
    celebrating: bool,
}

impl DrawSession {
    fn new(pool: Vec<Candidate>) -> Self {
        Self {
            phase: Phase::Waiting,
            current_position: 1,
            available_pool: pool,
            winners: Vec::new(),
            displayed: None,
            countdown: 0,
            celebrating: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Position being drawn (1-based). Stays on the last position once complete.
    pub fn current_position(&self) -> usize {
        self.current_position
    }

    pub fn current_prize(&self) -> String {
        prize_label(self.current_position)
    }

    pub fn available_pool(&self) -> &[Candidate] {
        &self.available_pool
    }

    pub fn remaining(&self) -> usize {
        self.available_pool.len()
    }

    pub fn winners(&self) -> &[WinnerRecord] {
        &self.winners
    }

    /// Rolling sample, or the revealed winner while revealing.
    pub fn displayed(&self) -> Option<&Candidate> {
        self.displayed.as_ref()
    }

    /// Current countdown value. Meaningful only in [`Phase::Countdown`].
    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    pub fn is_celebrating(&self) -> bool {
        self.celebrating
    }

    /// Structural invariants:
    /// - no winner is still in the pool;
    /// - no candidate won twice;
    /// - positions run 1, 2, 3... without gaps;
    /// - the winner count trails the current position by one until complete.
    pub fn check_invariants(&self, winners_count: usize) -> bool {
        let disjoint = self
            .winners
            .iter()
            .all(|w| !self.available_pool.contains(&w.candidate));
        let distinct = self.winners.iter().enumerate().all(|(i, w)| {
            self.winners[..i]
                .iter()
                .all(|prev| prev.candidate != w.candidate)
        });
        let contiguous = self
            .winners
            .iter()
            .enumerate()
            .all(|(i, w)| w.position == i + 1);
        let count_ok = match self.phase {
            Phase::Complete => self.winners.len() == winners_count,
            // The winner is recorded on entering Revealing, before the
            // position moves on.
            Phase::Revealing => self.winners.len() == self.current_position,
            _ => self.winners.len() + 1 == self.current_position,
        };
        disjoint && distinct && contiguous && count_ok
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct DrawEngine<C: Clock> {
    clock: C,
    config: DrawConfig,
    timings: Timings,
    initial_pool: Vec<Candidate>,
    session: DrawSession,
    timers: Timers,
    outcome_rng: StdRng,
    display_rng: StdRng,
    seed: Option<u64>,
    faulted: bool,
}

impl<C: Clock> DrawEngine<C> {
    /// Build an engine in [`Phase::Waiting`] over `pool`.
    ///
    /// `config` is expected to be validated against `pool.len()` already. If
    /// it was not, the engine refuses to draw from an empty pool with
    /// [`DrawError::EmptyPool`] instead of inventing a winner.
    pub fn new(pool: Vec<Candidate>, config: DrawConfig, timings: Timings, clock: C) -> Self {
        Self {
            clock,
            config,
            timings,
            session: DrawSession::new(pool.clone()),
            initial_pool: pool,
            timers: Timers::new(),
            outcome_rng: StdRng::from_os_rng(),
            display_rng: StdRng::from_os_rng(),
            seed: None,
            faulted: false,
        }
    }

    /// Make winner selection reproducible. The rolling display stays random.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self.outcome_rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn session(&self) -> &DrawSession {
        &self.session
    }

    pub fn phase(&self) -> Phase {
        self.session.phase
    }

    pub fn config(&self) -> &DrawConfig {
        &self.config
    }

    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn is_faulted(&self) -> bool {
        self.faulted
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    /// When the caller should poll next. `None` while waiting for `start`,
    /// once complete, or after teardown.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Begin drawing the current position. Only valid in [`Phase::Waiting`].
    pub fn start(&mut self) -> Result<Vec<DrawEvent>, DrawError> {
        if self.faulted {
            return Err(DrawError::Faulted);
        }
        if self.config.winners_count == 0 {
            let err = DrawError::InvalidConfig { winners_count: 0 };
            self.fault(&err);
            return Err(err);
        }
        if self.session.phase != Phase::Waiting {
            return Err(DrawError::InvalidTransition {
                phase: self.session.phase,
                action: "start",
            });
        }

        let now = self.clock.now();
        let mut events = Vec::new();
        if self.config.use_countdown && self.timings.countdown_from > 0 {
            self.transition(Phase::Countdown, &mut events);
            self.session.countdown = self.timings.countdown_from;
            events.push(DrawEvent::CountdownTick {
                remaining: self.session.countdown,
            });
            self.timers
                .arm_phase(TimerKind::CountdownTick, now + self.timings.countdown_tick);
        } else {
            self.begin_rolling(now, &mut events);
        }
        Ok(events)
    }

    /// Fire every timer that is due and return what happened.
    pub fn poll(&mut self) -> Result<Vec<DrawEvent>, DrawError> {
        if self.faulted {
            return Err(DrawError::Faulted);
        }
        let now = self.clock.now();
        let mut events = Vec::new();
        while let Some(handle) = self.timers.pop_due(now) {
            if let Err(e) = self.fire(handle, &mut events) {
                self.fault(&e);
                return Err(e);
            }
            debug_assert!(
                self.session.check_invariants(self.config.winners_count),
                "draw invariants broken after {}",
                handle.kind.label()
            );
        }
        Ok(events)
    }

    /// Teardown: drop every pending timer. The session state is kept as-is and
    /// nothing moves until [`start`](Self::start) or [`reset`](Self::reset).
    pub fn cancel_pending(&mut self) -> usize {
        let n = self.timers.cancel_all();
        if n > 0 {
            log::debug!("cancelled {n} pending timer(s) in {}", self.session.phase);
        }
        n
    }

    /// Back to the initial state: waiting, position 1, full pool, no winners.
    pub fn reset(&mut self) {
        self.timers.cancel_all();
        self.session = DrawSession::new(self.initial_pool.clone());
        self.faulted = false;
        if let Some(seed) = self.seed {
            self.outcome_rng = StdRng::seed_from_u64(seed);
        }
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    fn transition(&mut self, to: Phase, events: &mut Vec<DrawEvent>) {
        let from = self.session.phase;
        self.session.phase = to;
        log::debug!("position {}: {from} -> {to}", self.session.current_position);
        events.push(DrawEvent::PhaseChanged { from, to });
    }

    fn fire(&mut self, handle: TimerHandle, events: &mut Vec<DrawEvent>) -> Result<(), DrawError> {
        let at = handle.deadline;
        match handle.kind {
            TimerKind::CountdownTick => {
                self.session.countdown = self.session.countdown.saturating_sub(1);
                events.push(DrawEvent::CountdownTick {
                    remaining: self.session.countdown,
                });
                if self.session.countdown == 0 {
                    self.begin_rolling(at, events);
                } else {
                    self.timers
                        .arm_phase(TimerKind::CountdownTick, at + self.timings.countdown_tick);
                }
            }
            TimerKind::RollTick => {
                if self.session.phase != Phase::Rolling {
                    return Ok(());
                }
                if let Some(candidate) = self.sample_display() {
                    self.session.displayed = Some(candidate.clone());
                    events.push(DrawEvent::Rolling { candidate });
                }
                self.timers
                    .arm_display(TimerKind::RollTick, at + self.timings.roll_tick);
            }
            TimerKind::RollEnd => {
                self.timers.cancel_display();
                let winner = self.select_winner()?;
                self.transition(Phase::Revealing, events);
                self.session.displayed = Some(winner.candidate.clone());
                self.session.celebrating = true;
                let position = winner.position;
                events.push(DrawEvent::WinnerDrawn(winner));
                events.push(DrawEvent::Celebrate { position });
                self.timers
                    .arm_phase(TimerKind::RevealEnd, at + self.timings.revealing);
            }
            TimerKind::RevealEnd => {
                self.session.celebrating = false;
                events.push(DrawEvent::CelebrationEnded {
                    position: self.session.current_position,
                });
                if self.session.current_position < self.config.winners_count {
                    self.timers
                        .arm_phase(TimerKind::NextRound, at + self.timings.next_round_pause);
                } else {
                    self.timers
                        .arm_phase(TimerKind::Finish, at + self.timings.finish_pause);
                }
            }
            TimerKind::NextRound => {
                self.session.current_position += 1;
                self.session.displayed = None;
                self.transition(Phase::Waiting, events);
            }
            TimerKind::Finish => {
                self.transition(Phase::Complete, events);
                log::info!("draw complete: {} winner(s)", self.session.winners.len());
                events.push(DrawEvent::Completed(self.session.winners.clone()));
            }
        }
        Ok(())
    }

    fn begin_rolling(&mut self, at: Duration, events: &mut Vec<DrawEvent>) {
        self.transition(Phase::Rolling, events);
        self.session.displayed = None;
        self.timers
            .arm_phase(TimerKind::RollEnd, at + self.timings.rolling);
        if !self.timings.roll_tick.is_zero() {
            self.timers
                .arm_display(TimerKind::RollTick, at + self.timings.roll_tick);
        }
    }

    fn fault(&mut self, err: &DrawError) {
        log::error!(
            "draw engine halted in {} at position {}: {err}",
            self.session.phase,
            self.session.current_position
        );
        self.timers.cancel_all();
        self.faulted = true;
    }

    // -----------------------------------------------------------------------
    // Randomness
    // -----------------------------------------------------------------------

    /// Cosmetic pick for the rolling display. May repeat; never mutates state.
    fn sample_display(&mut self) -> Option<Candidate> {
        self.session
            .available_pool
            .choose(&mut self.display_rng)
            .cloned()
    }

    /// Uniform pick for the current position. The winner leaves the pool by
    /// identity, not by index.
    fn select_winner(&mut self) -> Result<WinnerRecord, DrawError> {
        let position = self.session.current_position;
        let pool = &mut self.session.available_pool;
        if pool.is_empty() {
            return Err(DrawError::EmptyPool { position });
        }
        let idx = self.outcome_rng.random_range(0..pool.len());
        let candidate = pool[idx].clone();
        pool.retain(|c| c != &candidate);

        let record = WinnerRecord {
            position,
            prize: prize_label(position),
            candidate,
        };
        log::info!("{}: {}", record.prize, record.candidate);
        self.session.winners.push(record.clone());
        Ok(record)
    }
}
