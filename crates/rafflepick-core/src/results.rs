//! Final results of a draw and their export formats.
//!
//! [`DrawResults`] is built once from the winners the engine emitted on
//! completion and is read-only from then on. It renders:
//! - a share message (`{prize}: {candidate}` per line under a header),
//! - a semicolon CSV document (`Position;Email` header),
//! - a JSON report carrying a report id and completion timestamp.

use std::fs;
use std::io;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::WinnerRecord;

pub const SHARE_HEADER: &str = "🎊 Draw results:";
pub const CSV_HEADER: &str = "Position;Email";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawResults {
    id: String,
    completed_at: String,
    winners: Vec<WinnerRecord>,
}

impl DrawResults {
    /// Freeze `winners` as completed now.
    pub fn new(winners: Vec<WinnerRecord>) -> Self {
        Self::completed_at(winners, SystemTime::now())
    }

    pub fn completed_at(winners: Vec<WinnerRecord>, at: SystemTime) -> Self {
        let since_epoch = at.duration_since(UNIX_EPOCH).unwrap_or_default();
        Self {
            id: Uuid::new_v4().to_string(),
            completed_at: format_iso8601(since_epoch),
            winners,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// ISO-8601 UTC completion time, e.g. `2026-10-17T15:04:05Z`.
    pub fn completed_at_iso(&self) -> &str {
        &self.completed_at
    }

    pub fn winners(&self) -> &[WinnerRecord] {
        &self.winners
    }

    pub fn len(&self) -> usize {
        self.winners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.winners.is_empty()
    }

    /// `{prize}: {candidate}` per winner, newline separated.
    pub fn summary(&self) -> String {
        self.winners
            .iter()
            .map(|w| format!("{}: {}", w.prize, w.candidate))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Text to share or copy to a clipboard.
    pub fn share_message(&self) -> String {
        format!("{SHARE_HEADER}\n\n{}", self.summary())
    }

    /// `{prize};{candidate}` rows without the header.
    pub fn csv_rows(&self) -> Vec<String> {
        self.winners
            .iter()
            .map(|w| format!("{};{}", w.prize, w.candidate))
            .collect()
    }

    /// Header line followed by one row per winner. No trailing newline.
    pub fn to_csv(&self) -> String {
        let mut out = String::from(CSV_HEADER);
        for row in self.csv_rows() {
            out.push('\n');
            out.push_str(&row);
        }
        out
    }

    /// Suggested download name, dated by completion day (UTC).
    pub fn csv_file_name(&self) -> String {
        let date = self.completed_at.get(..10).unwrap_or("undated");
        format!("draw-results-{date}.csv")
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn write_csv(&self, path: &Path) -> io::Result<()> {
        fs::write(path, self.to_csv())
    }

    pub fn write_json(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(io::Error::other)?;
        fs::write(path, json)
    }
}

// ---------------------------------------------------------------------------
// Time helpers
// ---------------------------------------------------------------------------

/// Format a duration-since-epoch as a full ISO-8601 timestamp.
/// Example: `2026-02-15T01:30:00Z`
fn format_iso8601(since_epoch: Duration) -> String {
    let (year, month, day, hour, min, sec) = secs_to_utc(since_epoch.as_secs());
    format!("{year:04}-{month:02}-{day:02}T{hour:02}:{min:02}:{sec:02}Z")
}

/// Seconds since Unix epoch to (year, month, day, hour, minute, second) UTC.
/// No leap seconds.
fn secs_to_utc(secs: u64) -> (u64, u64, u64, u64, u64, u64) {
    let sec = secs % 60;
    let min = (secs / 60) % 60;
    let hour = (secs / 3600) % 24;

    let mut days = secs / 86400;
    let mut year = 1970u64;
    loop {
        let days_in_year = if is_leap(year) { 366 } else { 365 };
        if days < days_in_year {
            break;
        }
        days -= days_in_year;
        year += 1;
    }

    let feb = if is_leap(year) { 29 } else { 28 };
    let months_days: [u64; 12] = [31, feb, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    let mut month = 12u64;
    for (i, &md) in months_days.iter().enumerate() {
        if days < md {
            month = i as u64 + 1;
            break;
        }
        days -= md;
    }

    (year, month, days + 1, hour, min, sec)
}

fn is_leap(y: u64) -> bool {
    (y % 4 == 0 && y % 100 != 0) || y % 400 == 0
}
