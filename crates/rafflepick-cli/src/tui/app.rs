//! TUI application state and event loop.
//!
//! Four screens follow the shell's view: setup (type or paste participants),
//! config (winner count, countdown), live (the draw itself) and results
//! (share / CSV). The draw engine runs on the real clock and is polled once
//! per frame; quitting mid-draw cancels whatever timers it had pending.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;

use rafflepick_core::{
    DrawConfig, DrawEngine, DrawEvent, DrawResults, DrawSession, MonotonicClock, Phase, Shell,
    Timings, View, clamp_winners, count_participants, max_winners,
};

const FRAME_POLL: Duration = Duration::from_millis(50);
const NOTICE_TTL: Duration = Duration::from_secs(4);
/// Confetti lifetime in time units.
const CELEBRATION_UNITS: u32 = 4;

// ---------------------------------------------------------------------------
// Notices and overlay
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// Short-lived message in the status line.
#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    shown_at: Instant,
}

/// Confetti overlay started on each reveal. It expires on its own schedule;
/// the engine never waits for it.
#[derive(Debug, Clone, Copy)]
pub struct Celebration {
    pub position: usize,
    until: Instant,
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    shell: Shell,
    input: String,
    draft: DrawConfig,
    engine: Option<DrawEngine<MonotonicClock>>,
    celebration: Option<Celebration>,
    notice: Option<Notice>,
    unit: Duration,
    seed: Option<u64>,
    export_dir: PathBuf,
    after_exit: Vec<String>,
    running: bool,
}

impl App {
    pub fn new(
        initial_input: String,
        draft: DrawConfig,
        unit: Duration,
        seed: Option<u64>,
        export_dir: PathBuf,
    ) -> Self {
        Self {
            shell: Shell::new(),
            input: initial_input,
            draft,
            engine: None,
            celebration: None,
            notice: None,
            unit,
            seed,
            export_dir,
            after_exit: Vec::new(),
            running: true,
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Restore the terminal before a panic message is printed.
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
            original_hook(info);
        }));

        let result = self.run_loop(&mut terminal);

        let _ = std::panic::take_hook();
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            crossterm::cursor::Show
        )?;

        self.teardown();

        // Anything that could not be shared or saved goes to the normal screen.
        for text in &self.after_exit {
            println!("{text}\n");
        }

        result
    }

    fn run_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> io::Result<()> {
        while self.running {
            terminal.draw(|f| super::ui::draw(f, self))?;

            if event::poll(FRAME_POLL)?
                && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                self.handle_key(key);
            }

            self.tick();
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit();
            return;
        }
        match self.shell.view() {
            View::Setup => self.handle_setup_key(key),
            View::Config => self.handle_config_key(key.code),
            View::Live => self.handle_live_key(key.code),
            View::Results => self.handle_results_key(key.code),
        }
    }

    fn handle_setup_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.quit(),
            KeyCode::Tab => self.submit_participants(),
            KeyCode::Enter => self.input.push('\n'),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.clear();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.push(c);
            }
            _ => {}
        }
    }

    fn handle_config_key(&mut self, code: KeyCode) {
        let pool = self.shell.participants().len();
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit(),
            KeyCode::Left | KeyCode::Char('-') => {
                self.draft.winners_count =
                    clamp_winners(self.draft.winners_count.saturating_sub(1), pool);
            }
            KeyCode::Right | KeyCode::Char('+') => {
                self.draft.winners_count = clamp_winners(self.draft.winners_count + 1, pool);
            }
            KeyCode::Char(d @ '1'..='9') => {
                let n = d as usize - '0' as usize;
                let max = max_winners(pool);
                if n <= max {
                    self.draft.winners_count = n;
                } else {
                    self.notify(
                        NoticeKind::Error,
                        format!("At most {max} winners with {pool} participants"),
                    );
                }
            }
            KeyCode::Char(' ') | KeyCode::Char('c') => {
                self.draft.use_countdown = !self.draft.use_countdown;
            }
            KeyCode::Enter => match self.shell.submit_config(self.draft) {
                Ok(()) => self.start_live(),
                Err(e) => self.notify(NoticeKind::Error, e.to_string()),
            },
            KeyCode::Backspace | KeyCode::Char('b') => self.shell.back(),
            _ => {}
        }
    }

    fn handle_live_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit(),
            KeyCode::Enter | KeyCode::Char(' ') => {
                let Some(engine) = self.engine.as_mut() else {
                    return;
                };
                if engine.phase() != Phase::Waiting {
                    return;
                }
                match engine.start() {
                    Ok(events) => self.handle_events(events),
                    Err(e) => self.notify(NoticeKind::Error, format!("Draw halted: {e}")),
                }
            }
            _ => {}
        }
    }

    fn handle_results_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit(),
            KeyCode::Char('s') => self.share_results(),
            KeyCode::Char('d') => self.download_results(),
            KeyCode::Char('n') => self.new_draw(),
            _ => {}
        }
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    fn submit_participants(&mut self) {
        match self.shell.submit_participants(&self.input) {
            Ok(n) => {
                self.draft.winners_count = clamp_winners(self.draft.winners_count, n);
                self.notify(
                    NoticeKind::Info,
                    format!("{n} participants ready for the draw"),
                );
            }
            Err(e) => self.notify(NoticeKind::Error, e.to_string()),
        }
    }

    fn start_live(&mut self) {
        let timings = Timings::with_unit(self.unit);
        let mut engine = DrawEngine::new(
            self.shell.participants().to_vec(),
            self.shell.config(),
            timings,
            MonotonicClock::new(),
        );
        if let Some(seed) = self.seed {
            engine = engine.with_seed(seed);
        }
        self.engine = Some(engine);
        self.celebration = None;
    }

    /// Advance timers: notices, confetti and the engine.
    pub fn tick(&mut self) {
        let now = Instant::now();
        if self
            .notice
            .as_ref()
            .is_some_and(|n| now.duration_since(n.shown_at) >= NOTICE_TTL)
        {
            self.notice = None;
        }
        if self.celebration.is_some_and(|c| now >= c.until) {
            self.celebration = None;
        }

        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        if engine.is_faulted() {
            return;
        }
        match engine.poll() {
            Ok(events) => self.handle_events(events),
            Err(e) => self.notify(NoticeKind::Error, format!("Draw halted: {e}")),
        }
    }

    fn handle_events(&mut self, events: Vec<DrawEvent>) {
        for event in events {
            match event {
                DrawEvent::Celebrate { position } => {
                    self.celebration = Some(Celebration {
                        position,
                        until: Instant::now() + self.unit * CELEBRATION_UNITS,
                    });
                }
                DrawEvent::Completed(winners) => {
                    self.engine = None;
                    self.shell.complete(winners);
                }
                _ => {}
            }
        }
    }

    /// No share sheet in a terminal, and no clipboard either: the message is
    /// queued and printed once the terminal is restored.
    fn share_results(&mut self) {
        let Some(results) = self.shell.results() else {
            return;
        };
        let message = results.share_message();
        self.after_exit.push(message);
        self.notify(
            NoticeKind::Info,
            "Sharing unavailable here; results will be printed when you quit".into(),
        );
    }

    fn download_results(&mut self) {
        let Some(results) = self.shell.results() else {
            return;
        };
        let path = self.export_dir.join(results.csv_file_name());
        match results.write_csv(&path) {
            Ok(()) => self.notify(NoticeKind::Info, format!("Saved {}", path.display())),
            Err(e) => {
                log::warn!("CSV export to {} failed: {e}", path.display());
                let csv = results.to_csv();
                self.after_exit.push(csv);
                self.notify(
                    NoticeKind::Error,
                    format!("Could not save CSV ({e}); it will be printed when you quit"),
                );
            }
        }
    }

    fn new_draw(&mut self) {
        self.teardown();
        self.shell.new_draw();
        self.input.clear();
        self.draft = DrawConfig::default();
        self.engine = None;
        self.celebration = None;
    }

    fn quit(&mut self) {
        self.teardown();
        self.running = false;
    }

    fn teardown(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            engine.cancel_pending();
        }
    }

    fn notify(&mut self, kind: NoticeKind, text: String) {
        self.notice = Some(Notice {
            kind,
            text,
            shown_at: Instant::now(),
        });
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn view(&self) -> View {
        self.shell.view()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Participants found in the current text, updated as it is typed.
    pub fn live_count(&self) -> usize {
        count_participants(&self.input)
    }

    pub fn participant_count(&self) -> usize {
        self.shell.participants().len()
    }

    pub fn draft(&self) -> DrawConfig {
        self.draft
    }

    pub fn max_winners(&self) -> usize {
        max_winners(self.participant_count())
    }

    pub fn config(&self) -> DrawConfig {
        self.shell.config()
    }

    pub fn session(&self) -> Option<&DrawSession> {
        self.engine.as_ref().map(DrawEngine::session)
    }

    pub fn is_faulted(&self) -> bool {
        self.engine.as_ref().is_some_and(DrawEngine::is_faulted)
    }

    pub fn pending_timers(&self) -> usize {
        self.engine.as_ref().map_or(0, DrawEngine::pending_timers)
    }

    pub fn results(&self) -> Option<&DrawResults> {
        self.shell.results()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn celebration(&self) -> Option<Celebration> {
        self.celebration
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            let code = if c == '\n' {
                KeyCode::Enter
            } else {
                KeyCode::Char(c)
            };
            app.handle_key(key(code));
        }
    }

    fn app_with(input: &str, unit: Duration) -> App {
        App::new(
            input.to_string(),
            DrawConfig::default(),
            unit,
            Some(3),
            std::env::temp_dir(),
        )
    }

    fn to_config(app: &mut App) {
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.view(), View::Config);
    }

    // -----------------------------------------------------------------------
    // Setup
    // -----------------------------------------------------------------------

    #[test]
    fn test_typing_updates_live_count() {
        let mut app = app_with("", Duration::ZERO);
        type_text(&mut app, "a@x.com\nb@x.com,a@x.com");
        assert_eq!(app.live_count(), 2);
        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(app.input(), "a@x.com\nb@x.com,a@x.co");
    }

    #[test]
    fn test_single_participant_is_rejected() {
        let mut app = app_with("solo@x.com", Duration::ZERO);
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.view(), View::Setup);
        let notice = app.notice().unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert!(notice.text.contains("not enough participants"));
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let mut app = app_with("", Duration::ZERO);
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.view(), View::Setup);
        assert!(app.notice().unwrap().text.contains("no valid participants"));
    }

    #[test]
    fn test_ctrl_u_clears_input() {
        let mut app = app_with("a@x.com", Duration::ZERO);
        app.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(app.input(), "");
    }

    // -----------------------------------------------------------------------
    // Config
    // -----------------------------------------------------------------------

    #[test]
    fn test_winner_count_is_capped_by_pool() {
        let mut app = app_with("a@x;b@x;c@x", Duration::ZERO);
        to_config(&mut app);
        assert_eq!(app.max_winners(), 3);

        app.handle_key(key(KeyCode::Char('5')));
        assert_eq!(app.draft().winners_count, 1);
        assert_eq!(app.notice().unwrap().kind, NoticeKind::Error);

        app.handle_key(key(KeyCode::Char('3')));
        assert_eq!(app.draft().winners_count, 3);
        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.draft().winners_count, 3);
        for _ in 0..5 {
            app.handle_key(key(KeyCode::Left));
        }
        assert_eq!(app.draft().winners_count, 1);
    }

    #[test]
    fn test_countdown_toggle_and_back() {
        let mut app = app_with("a@x;b@x", Duration::ZERO);
        to_config(&mut app);
        assert!(app.draft().use_countdown);
        app.handle_key(key(KeyCode::Char('c')));
        assert!(!app.draft().use_countdown);
        app.handle_key(key(KeyCode::Char('b')));
        assert_eq!(app.view(), View::Setup);
        assert_eq!(app.input(), "a@x;b@x");
    }

    // -----------------------------------------------------------------------
    // Live and results
    // -----------------------------------------------------------------------

    #[test]
    fn test_full_draw_with_instant_units() {
        let mut app = app_with("a@x;b@x;c@x", Duration::ZERO);
        to_config(&mut app);
        app.handle_key(key(KeyCode::Char('2')));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.view(), View::Live);
        assert_eq!(app.session().unwrap().phase(), Phase::Waiting);

        // Nothing moves until the round is started.
        app.tick();
        assert_eq!(app.session().unwrap().current_position(), 1);

        app.handle_key(key(KeyCode::Enter));
        app.tick();
        assert_eq!(app.session().unwrap().current_position(), 2);
        assert_eq!(app.session().unwrap().phase(), Phase::Waiting);

        app.handle_key(key(KeyCode::Char(' ')));
        app.tick();
        assert_eq!(app.view(), View::Results);
        let results = app.results().unwrap();
        assert_eq!(results.len(), 2);
        assert!(app.session().is_none());
    }

    #[test]
    fn test_quitting_mid_draw_cancels_timers() {
        let mut app = app_with("a@x;b@x", Duration::from_secs(1));
        to_config(&mut app);
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.session().unwrap().phase(), Phase::Countdown);
        assert_eq!(app.pending_timers(), 1);

        app.handle_key(key(KeyCode::Char('q')));
        assert!(!app.is_running());
        assert_eq!(app.pending_timers(), 0);
    }

    #[test]
    fn test_reveal_starts_celebration() {
        // Rolling ends at 600ms; the phase stays revealing until 2s.
        let mut app = app_with("a@x;b@x", Duration::from_millis(200));
        to_config(&mut app);
        app.handle_key(key(KeyCode::Char('c')));
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Enter));
        std::thread::sleep(Duration::from_millis(700));
        app.tick();
        assert_eq!(app.session().unwrap().phase(), Phase::Revealing);
        assert_eq!(app.celebration().map(|c| c.position), Some(1));
    }

    #[test]
    fn test_download_writes_csv_and_new_draw_resets() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = App::new(
            "a@x;b@x".into(),
            DrawConfig::default(),
            Duration::ZERO,
            None,
            tmp.path().to_path_buf(),
        );
        to_config(&mut app);
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Enter));
        app.tick();
        assert_eq!(app.view(), View::Results);

        app.handle_key(key(KeyCode::Char('d')));
        let name = app.results().unwrap().csv_file_name();
        let csv = std::fs::read_to_string(tmp.path().join(name)).unwrap();
        assert!(csv.starts_with("Position;Email\n🥇 1st Place;"));
        assert_eq!(app.notice().unwrap().kind, NoticeKind::Info);

        app.handle_key(key(KeyCode::Char('n')));
        assert_eq!(app.view(), View::Setup);
        assert_eq!(app.input(), "");
        assert_eq!(app.draft(), DrawConfig::default());
        assert!(app.results().is_none());
    }

    #[test]
    fn test_failed_download_degrades() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = App::new(
            "a@x;b@x".into(),
            DrawConfig::new(1, false),
            Duration::ZERO,
            None,
            tmp.path().join("missing"),
        );
        to_config(&mut app);
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Enter));
        app.tick();
        app.handle_key(key(KeyCode::Char('d')));
        assert_eq!(app.notice().unwrap().kind, NoticeKind::Error);
        assert_eq!(app.view(), View::Results);
    }
}
