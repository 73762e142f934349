//! Top-level routing between the four screens of a draw.
//!
//! `Setup` → `Config` on valid participants, `Config` → `Live` on a valid
//! configuration, `Live` → `Results` on the engine's completion. "New draw"
//! clears everything back to `Setup` with default settings. Inputs that do not
//! belong to the current view are ignored.

use serde::{Deserialize, Serialize};

use crate::candidate::{Candidate, validate_participants};
use crate::config::DrawConfig;
use crate::engine::WinnerRecord;
use crate::error::ValidationError;
use crate::results::DrawResults;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Setup,
    Config,
    Live,
    Results,
}

impl View {
    pub fn title(self) -> &'static str {
        match self {
            Self::Setup => "Add participants",
            Self::Config => "Configure draw",
            Self::Live => "Live draw",
            Self::Results => "Results",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Shell {
    view: View,
    participants: Vec<Candidate>,
    config: DrawConfig,
    results: Option<DrawResults>,
}

impl Shell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn participants(&self) -> &[Candidate] {
        &self.participants
    }

    pub fn config(&self) -> DrawConfig {
        self.config
    }

    pub fn results(&self) -> Option<&DrawResults> {
        self.results.as_ref()
    }

    /// Setup → Config. On error nothing changes.
    pub fn submit_participants(&mut self, raw: &str) -> Result<usize, ValidationError> {
        if self.view != View::Setup {
            log::warn!("participants submitted outside setup view, ignoring");
            return Ok(self.participants.len());
        }
        let candidates = validate_participants(raw)?;
        let n = candidates.len();
        self.participants = candidates;
        self.view = View::Config;
        Ok(n)
    }

    /// Config → Setup, keeping the participant list and settings.
    pub fn back(&mut self) {
        if self.view == View::Config {
            self.view = View::Setup;
        }
    }

    /// Config → Live. The config is validated against the participant count.
    pub fn submit_config(&mut self, config: DrawConfig) -> Result<(), ValidationError> {
        if self.view != View::Config {
            log::warn!("config submitted outside config view, ignoring");
            return Ok(());
        }
        self.config = config.validate(self.participants.len())?;
        self.view = View::Live;
        Ok(())
    }

    /// Live → Results.
    pub fn complete(&mut self, winners: Vec<WinnerRecord>) {
        if self.view != View::Live {
            log::warn!("draw completion outside live view, ignoring");
            return;
        }
        self.results = Some(DrawResults::new(winners));
        self.view = View::Results;
    }

    /// Drop every piece of state and go back to an empty setup.
    pub fn new_draw(&mut self) {
        *self = Self::default();
    }
}
