//! `rafflepick draw` — run a whole draw without the TUI.
//!
//! The engine runs on a current-thread tokio runtime: each pending deadline
//! becomes a `sleep_until`, raced against Ctrl+C. On Ctrl+C every pending
//! timer is cancelled and the command exits without results.

use std::future::Future;
use std::io::{self, Write};

use rafflepick_core::{
    DrawConfig, DrawEngine, DrawError, DrawEvent, DrawResults, MonotonicClock, Phase,
    WinnerRecord, validate_participants,
};

const ROLL_WIDTH: usize = 40;

pub struct DrawCommandConfig<'a> {
    pub file: Option<&'a str>,
    pub emails: Option<&'a str>,
    pub winners: usize,
    pub use_countdown: bool,
    pub unit_ms: u64,
    pub seed: Option<u64>,
    pub csv_path: Option<&'a str>,
    pub json_path: Option<&'a str>,
}

#[derive(Debug)]
pub enum DriveOutcome {
    Completed(Vec<WinnerRecord>),
    Cancelled { pending: usize },
    Failed(DrawError),
}

pub fn run(cfg: DrawCommandConfig) {
    let raw = super::load_raw_input(cfg.file, cfg.emails);
    let pool = match validate_participants(&raw) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let config = match DrawConfig::new(cfg.winners, cfg.use_countdown).validate(pool.len()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    println!("Live draw");
    println!("  Participants: {}", pool.len());
    println!("  Winners:      {}", config.winners_count);
    println!(
        "  Countdown:    {}",
        if config.use_countdown { "on" } else { "off" }
    );
    if let Some(seed) = cfg.seed {
        println!("  Seed:         {seed}");
    }

    let timings = super::timings_from_unit_ms(cfg.unit_ms);
    let mut engine = DrawEngine::new(pool, config, timings, MonotonicClock::new());
    if let Some(seed) = cfg.seed {
        engine = engine.with_seed(seed);
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error starting runtime: {e}");
            std::process::exit(1);
        }
    };

    let mut stdout = io::stdout();
    let outcome = rt.block_on(drive(&mut engine, &mut stdout, ctrl_c()));

    match outcome {
        Ok(DriveOutcome::Completed(winners)) => {
            let results = DrawResults::new(winners);
            println!();
            println!("{}", results.share_message());
            if let Some(path) = cfg.csv_path {
                let path = super::resolve_csv_path(path, &results);
                if super::export_csv(&results, &path) {
                    println!("\nCSV written to {}", path.display());
                }
            }
            if let Some(path) = cfg.json_path {
                let path = std::path::Path::new(path);
                if super::export_json(&results, path) {
                    println!("JSON written to {}", path.display());
                }
            }
        }
        Ok(DriveOutcome::Cancelled { pending }) => {
            eprintln!("\nDraw cancelled ({pending} pending timer(s) dropped)");
            std::process::exit(130);
        }
        Ok(DriveOutcome::Failed(e)) => {
            eprintln!("\nError: {e}");
            std::process::exit(2);
        }
        Err(e) => {
            eprintln!("Error writing output: {e}");
            std::process::exit(1);
        }
    }
}

/// Resolves on Ctrl+C. If the handler cannot be installed it never resolves.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Ctrl+C handler unavailable: {e}");
        std::future::pending::<()>().await;
    }
}

/// Drive `engine` to completion, starting each round as soon as it waits.
pub async fn drive<W: Write>(
    engine: &mut DrawEngine<MonotonicClock>,
    out: &mut W,
    cancel: impl Future<Output = ()>,
) -> io::Result<DriveOutcome> {
    tokio::pin!(cancel);
    loop {
        if engine.phase() == Phase::Waiting {
            let s = engine.session();
            writeln!(
                out,
                "\nDrawing {} ({} participants remaining)",
                s.current_prize(),
                s.remaining()
            )?;
            match engine.start() {
                Ok(events) => render(out, &events)?,
                Err(e) => return Ok(DriveOutcome::Failed(e)),
            }
        }

        let Some(deadline) = engine.next_deadline() else {
            // Nothing left to wait for: the session already completed.
            return Ok(DriveOutcome::Completed(engine.session().winners().to_vec()));
        };
        let wake = tokio::time::Instant::from_std(engine.clock().instant_at(deadline));

        tokio::select! {
            () = tokio::time::sleep_until(wake) => {
                let events = match engine.poll() {
                    Ok(events) => events,
                    Err(e) => return Ok(DriveOutcome::Failed(e)),
                };
                render(out, &events)?;
                if let Some(winners) = events.into_iter().find_map(|e| match e {
                    DrawEvent::Completed(w) => Some(w),
                    _ => None,
                }) {
                    return Ok(DriveOutcome::Completed(winners));
                }
            }
            () = &mut cancel => {
                let pending = engine.cancel_pending();
                return Ok(DriveOutcome::Cancelled { pending });
            }
        }
    }
}

fn render<W: Write>(out: &mut W, events: &[DrawEvent]) -> io::Result<()> {
    for event in events {
        match event {
            DrawEvent::PhaseChanged {
                to: Phase::Countdown,
                ..
            } => writeln!(out, "  Drawing in...")?,
            DrawEvent::CountdownTick { remaining } if *remaining > 0 => {
                writeln!(out, "  {remaining}")?;
            }
            DrawEvent::Rolling { candidate } => {
                write!(out, "\r  🎲 {:<ROLL_WIDTH$}", candidate.as_str())?;
            }
            DrawEvent::WinnerDrawn(w) => {
                writeln!(
                    out,
                    "\r  🎉 WINNER! {}: {:<ROLL_WIDTH$}",
                    w.prize,
                    w.candidate.as_str()
                )?;
            }
            DrawEvent::Celebrate { .. } => writeln!(out, "  🎊 🎉 🎊 🎉 🎊")?,
            _ => {}
        }
    }
    out.flush()
}
