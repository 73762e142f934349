//! `rafflepick live` — the interactive draw.

use std::path::PathBuf;
use std::time::Duration;

use rafflepick_core::{DrawConfig, MAX_WINNERS};

use crate::tui::app::App;

pub struct LiveCommandConfig<'a> {
    pub file: Option<&'a str>,
    pub winners: usize,
    pub use_countdown: bool,
    pub unit_ms: u64,
    pub seed: Option<u64>,
    pub export_dir: &'a str,
}

pub fn run(cfg: LiveCommandConfig) {
    // A preloaded file only fills the setup text; validation happens on submit.
    let initial = super::load_raw_input(cfg.file, None);
    let draft = DrawConfig::new(cfg.winners.clamp(1, MAX_WINNERS), cfg.use_countdown);

    let mut app = App::new(
        initial,
        draft,
        Duration::from_millis(cfg.unit_ms),
        cfg.seed,
        PathBuf::from(cfg.export_dir),
    );
    if let Err(e) = app.run() {
        eprintln!("TUI error: {e}");
        std::process::exit(1);
    }
}
