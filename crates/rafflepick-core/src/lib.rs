//! # rafflepick-core
//!
//! **Live giveaway draws, one winner at a time.**
//!
//! `rafflepick-core` turns a pasted list of participant emails into an animated,
//! sequential draw: an optional countdown, a rolling display of random
//! names, the reveal, and a pause before the next prize. It has no rendering
//! of its own; a front end polls the engine and draws what it reports.
//!
//! ## Quick Start
//!
//! ```
//! use rafflepick_core::{
//!     DrawConfig, DrawEngine, DrawEvent, DrawResults, ManualClock, Phase, Timings,
//!     validate_participants,
//! };
//! use std::time::Duration;
//!
//! let pool = validate_participants("ana@example.com\nbo@example.com\ncy@example.com")?;
//! let config = DrawConfig::new(2, false).validate(pool.len())?;
//!
//! let clock = ManualClock::new();
//! let mut engine = DrawEngine::new(pool, config, Timings::default(), clock.clone());
//!
//! let mut winners = Vec::new();
//! while engine.phase() != Phase::Complete {
//!     engine.start().unwrap();
//!     clock.advance(Duration::from_secs(10));
//!     for event in engine.poll().unwrap() {
//!         if let DrawEvent::Completed(all) = event {
//!             winners = all;
//!         }
//!     }
//! }
//!
//! let results = DrawResults::new(winners);
//! assert_eq!(results.len(), 2);
//! println!("{}", results.share_message());
//! # Ok::<(), rafflepick_core::ValidationError>(())
//! ```
//!
//! ## Architecture
//!
//! Raw text → [`normalize`] → [`DrawConfig::validate`] → [`DrawEngine`] →
//! [`DrawResults`]
//!
//! The [`Shell`] tracks which of the four screens (setup, config, live,
//! results) a front end should show. Input errors stop at the normalizer or
//! the config as a [`ValidationError`]; the engine only ever reports
//! [`DrawError`].

pub mod candidate;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod results;
pub mod shell;
pub mod timer;

pub use candidate::{
    Candidate, MIN_PARTICIPANTS, count_participants, normalize, read_participants_file,
    read_participants_text, validate_participants,
};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{DrawConfig, MAX_WINNERS, Timings, clamp_winners, max_winners, prize_label};
pub use engine::{DrawEngine, DrawEvent, DrawSession, Phase, WinnerRecord};
pub use error::{DrawError, ValidationError};
pub use results::DrawResults;
pub use shell::{Shell, View};
pub use timer::{TimerHandle, TimerId, TimerKind, Timers};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
