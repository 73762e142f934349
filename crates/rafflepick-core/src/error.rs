//! Error taxonomy.
//!
//! Two families that never mix:
//! - [`ValidationError`]: bad user input, caught at the participant/config
//!   boundary. Recoverable; the caller keeps its prior state and retries.
//! - [`DrawError`]: raised by the draw engine. [`DrawError::EmptyPool`] and
//!   [`DrawError::InvalidConfig`] mean an upstream invariant was broken and the
//!   session cannot continue.

use thiserror::Error;

use crate::engine::Phase;

/// User-facing input problems. Never reaches the draw engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no valid participants found; add at least one email address")]
    NoValidParticipants,

    #[error("not enough participants: found {found}, at least {min} required")]
    TooFewParticipants { found: usize, min: usize },

    #[error("winner count {requested} out of range; choose between 1 and {max}")]
    WinnersOutOfRange { requested: usize, max: usize },
}

/// Engine-side failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrawError {
    /// Selection ran with nothing left to pick from. Only reachable when the
    /// configuration skipped validation.
    #[error("candidate pool empty while drawing position {position}")]
    EmptyPool { position: usize },

    /// The config asks for no winners at all. Only reachable when the
    /// configuration skipped validation.
    #[error("cannot draw {winners_count} winners; at least one is required")]
    InvalidConfig { winners_count: usize },

    #[error("cannot {action} while {phase}")]
    InvalidTransition { phase: Phase, action: &'static str },

    /// A previous fatal error stopped the engine.
    #[error("draw engine halted after a fatal error")]
    Faulted,
}

impl DrawError {
    /// Fatal errors leave the session unusable; everything else is caller misuse.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::EmptyPool { .. } | Self::InvalidConfig { .. } | Self::Faulted
        )
    }
}
