//! TUI rendering, one screen per view.
//!
//! ┌──────────────────────────────────────────────┐
//! │  🎟  Rafflepick    Live draw   12 entries     │
//! ├──────────────────────────────────────────────┤
//! │  ● ● ○            🥈 2nd Place                │
//! │                                              │
//! │              🎲 carol@example.com            │
//! │                                              │
//! │  🥇 1st Place   alice@example.com            │
//! ├──────────────────────────────────────────────┤
//! │  Saved ./draw-results-2026-10-17.csv         │
//! ├──────────────────────────────────────────────┤
//! │  enter: draw   q: quit                       │
//! └──────────────────────────────────────────────┘

use super::app::{App, NoticeKind};
use ratatui::{prelude::*, widgets::*};

use rafflepick_core::{MIN_PARTICIPANTS, Phase, View};

pub fn draw(f: &mut Frame, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Min(10),   // main
            Constraint::Length(3), // notice
            Constraint::Length(1), // keys
        ])
        .split(f.area());

    draw_title(f, rows[0], app);
    match app.view() {
        View::Setup => draw_setup(f, rows[1], app),
        View::Config => draw_config(f, rows[1], app),
        View::Live => draw_live(f, rows[1], app),
        View::Results => draw_results(f, rows[1], app),
    }
    draw_notice(f, rows[2], app);
    draw_keys(f, rows[3], app);
}

fn draw_title(f: &mut Frame, area: Rect, app: &App) {
    let count = match app.view() {
        View::Setup => app.live_count(),
        _ => app.participant_count(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Line::from(vec![
            Span::styled(" 🎟  Rafflepick ", Style::default().bold().fg(Color::Cyan)),
            Span::raw("  "),
            Span::styled(app.view().title(), Style::default().bold().fg(Color::Yellow)),
            Span::styled(
                format!("  {count} entr{} ", if count == 1 { "y" } else { "ies" }),
                Style::default().fg(Color::DarkGray),
            ),
        ]));

    f.render_widget(block, area);
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

fn draw_setup(f: &mut Frame, area: Rect, app: &App) {
    let count = app.live_count();
    let status = if count >= MIN_PARTICIPANTS {
        Span::styled(
            format!(" {count} participants found "),
            Style::default().fg(Color::Green),
        )
    } else {
        Span::styled(
            format!(" {count} found, need at least {MIN_PARTICIPANTS} "),
            Style::default().fg(Color::Yellow),
        )
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Participants (one email per line, or comma / semicolon separated) ")
        .title_bottom(Line::from(status));

    let text = if app.input().is_empty() {
        Text::styled(
            "alice@example.com\nbob@example.com, carol@example.com",
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Text::from(format!("{}▏", app.input()))
    };

    // Keep the cursor line in view.
    let lines = app.input().lines().count() as u16 + 1;
    let inner = area.height.saturating_sub(2);
    let scroll = lines.saturating_sub(inner);

    let p = Paragraph::new(text).scroll((scroll, 0)).block(block);
    f.render_widget(p, area);
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn draw_config(f: &mut Frame, area: Rect, app: &App) {
    let draft = app.draft();
    let max = app.max_winners();

    let picker: Vec<Span> = (1..=max)
        .map(|n| {
            let style = if n == draft.winners_count {
                Style::default().bg(Color::Yellow).fg(Color::Black).bold()
            } else {
                Style::default().fg(Color::White)
            };
            Span::styled(format!(" {n} "), style)
        })
        .collect();

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Winners:   ", Style::default().bold()),
            Span::styled(
                format!("(max {max} with {} participants)  ", app.participant_count()),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(picker),
        Line::from(""),
        Line::from(vec![
            Span::styled("Countdown: ", Style::default().bold()),
            if draft.use_countdown {
                Span::styled("3… 2… 1… before each draw", Style::default().fg(Color::Green))
            } else {
                Span::styled("off", Style::default().fg(Color::DarkGray))
            },
        ]),
        Line::from(""),
        Line::from(Span::styled("Prizes", Style::default().bold())),
    ];
    lines.extend(
        draft
            .prize_labels()
            .into_iter()
            .map(|label| Line::from(format!("  {label}"))),
    );

    let block = Block::default().borders(Borders::ALL).title(" Draw settings ");
    let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(block);
    f.render_widget(p, area);
}

// ---------------------------------------------------------------------------
// Live
// ---------------------------------------------------------------------------

fn draw_live(f: &mut Frame, area: Rect, app: &App) {
    let Some(session) = app.session() else {
        let p = Paragraph::new("Preparing draw…")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(p, area);
        return;
    };
    let total = app.config().winners_count;

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    // Progress: one marker per position, filled once drawn.
    let drawn = session.winners().len();
    let mut progress: Vec<Span> = (1..=total)
        .map(|pos| {
            if pos <= drawn {
                Span::styled("● ", Style::default().fg(Color::Green))
            } else if pos == session.current_position() {
                Span::styled("◉ ", Style::default().fg(Color::Yellow))
            } else {
                Span::styled("○ ", Style::default().fg(Color::DarkGray))
            }
        })
        .collect();
    progress.push(Span::styled(
        format!("  {} of {total}", session.current_position()),
        Style::default().fg(Color::DarkGray),
    ));

    let big = match session.phase() {
        Phase::Waiting => Line::from(Span::styled(
            "Press enter to draw",
            Style::default().fg(Color::DarkGray),
        )),
        Phase::Countdown => Line::from(Span::styled(
            format!("{}", session.countdown()),
            Style::default().bold().fg(Color::Yellow),
        )),
        Phase::Rolling => Line::from(Span::styled(
            format!(
                "🎲 {}",
                session.displayed().map_or("…", |c| c.as_str())
            ),
            Style::default().fg(Color::White),
        )),
        Phase::Revealing | Phase::Complete => Line::from(Span::styled(
            format!(
                "🎉 {}",
                session.displayed().map_or("", |c| c.as_str())
            ),
            Style::default().bold().fg(Color::Green),
        )),
    };

    let mut lines = vec![
        Line::from(progress),
        Line::from(""),
        Line::from(Span::styled(
            session.current_prize(),
            Style::default().bold().fg(Color::Cyan),
        ))
        .centered(),
        Line::from(""),
        big.centered(),
    ];
    if session.phase() == Phase::Revealing {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("WINNER!", Style::default().bold())).centered());
    }
    if app.celebration().is_some() {
        lines.push(Line::from(""));
        lines.push(Line::from("🎊 🎉 🎊 🎉 🎊 🎉 🎊").centered());
    }
    if app.is_faulted() {
        lines.push(Line::from(""));
        lines.push(
            Line::from(Span::styled(
                "Draw halted. Press q to quit.",
                Style::default().fg(Color::Red),
            ))
            .centered(),
        );
    }

    let stage = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", session.phase())),
    );
    f.render_widget(stage, cols[0]);

    // The winner being revealed is on stage, not in the list yet.
    let revealing = session.phase() == Phase::Revealing;
    let rows: Vec<Row> = session
        .winners()
        .iter()
        .filter(|w| !(revealing && w.position == session.current_position()))
        .map(|w| Row::new(vec![w.prize.clone(), w.candidate.to_string()]))
        .collect();
    let table = Table::new(rows, [Constraint::Length(14), Constraint::Min(10)]).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Winners · {} left in pool ", session.remaining())),
    );
    f.render_widget(table, cols[1]);
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

fn draw_results(f: &mut Frame, area: Rect, app: &App) {
    let Some(results) = app.results() else {
        return;
    };

    let rows: Vec<Row> = results
        .winners()
        .iter()
        .map(|w| {
            let style = if w.position == 1 {
                Style::default().fg(Color::Yellow).bold()
            } else {
                Style::default()
            };
            Row::new(vec![w.prize.clone(), w.candidate.to_string()]).style(style)
        })
        .collect();

    let header = Row::new(vec!["Position", "Email"])
        .style(Style::default().fg(Color::DarkGray));
    let table = Table::new(rows, [Constraint::Length(14), Constraint::Min(20)])
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(
                    " 🎊 {} winner{} ",
                    results.len(),
                    if results.len() == 1 { "" } else { "s" }
                ))
                .title_bottom(Line::from(Span::styled(
                    format!(" csv → {} ", app.export_dir().join(results.csv_file_name()).display()),
                    Style::default().fg(Color::DarkGray),
                ))),
        );
    f.render_widget(table, area);
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

fn draw_notice(f: &mut Frame, area: Rect, app: &App) {
    let (text, style) = match app.notice() {
        Some(n) if n.kind == NoticeKind::Error => {
            (n.text.as_str(), Style::default().fg(Color::Red))
        }
        Some(n) => (n.text.as_str(), Style::default().fg(Color::Green)),
        None => ("", Style::default()),
    };
    let p = Paragraph::new(text)
        .style(style)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(p, area);
}

fn draw_keys(f: &mut Frame, area: Rect, app: &App) {
    let keys = match app.view() {
        View::Setup => " type/paste emails   enter: new line   tab: continue   ctrl+u: clear   esc: quit",
        View::Config => " ←→ / 1-5: winners   c: countdown   enter: start   b: back   q: quit",
        View::Live => " enter: draw next   q: quit",
        View::Results => " s: share   d: download csv   n: new draw   q: quit",
    };
    let bar = Paragraph::new(keys).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    f.render_widget(bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use rafflepick_core::DrawConfig;
    use ratatui::backend::TestBackend;
    use std::time::Duration;

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_every_view_renders() {
        let mut app = App::new(
            "a@x.com\nb@x.com\nc@x.com".into(),
            DrawConfig::default(),
            Duration::ZERO,
            Some(1),
            std::env::temp_dir(),
        );
        assert!(screen(&app).contains("3 participants found"));

        press(&mut app, KeyCode::Tab);
        assert!(screen(&app).contains("max 3 with 3 participants"));

        press(&mut app, KeyCode::Enter);
        assert!(screen(&app).contains("Press enter to draw"));

        press(&mut app, KeyCode::Enter);
        app.tick();
        let s = screen(&app);
        assert!(s.contains("1st Place"));
        assert!(s.contains("download csv"));
    }
}
