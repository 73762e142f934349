pub mod draw;
pub mod live;
pub mod parse;

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rafflepick_core::{DrawResults, Timings, read_participants_text};

/// Gather raw participant text from a file and/or an inline list.
/// Either source may be absent; both are concatenated when given.
pub fn read_raw_input(file: Option<&str>, emails: Option<&str>) -> io::Result<String> {
    let mut raw = String::new();
    if let Some(path) = file {
        raw.push_str(&read_participants_text(Path::new(path))?);
    }
    if let Some(inline) = emails {
        if !raw.is_empty() {
            raw.push('\n');
        }
        raw.push_str(inline);
    }
    Ok(raw)
}

/// [`read_raw_input`], exiting with a message on I/O failure.
pub fn load_raw_input(file: Option<&str>, emails: Option<&str>) -> String {
    match read_raw_input(file, emails) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Error reading participants: {e}");
            std::process::exit(1);
        }
    }
}

pub fn timings_from_unit_ms(unit_ms: u64) -> Timings {
    Timings::with_unit(Duration::from_millis(unit_ms))
}

/// A directory gets the results' default file name appended.
pub fn resolve_csv_path(path: &str, results: &DrawResults) -> PathBuf {
    let p = Path::new(path);
    if p.is_dir() {
        p.join(results.csv_file_name())
    } else {
        p.to_path_buf()
    }
}

/// Write the CSV. If that fails, warn and print the document so the results
/// are never lost.
pub fn export_csv(results: &DrawResults, path: &Path) -> bool {
    match results.write_csv(path) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("CSV export to {} failed: {e}", path.display());
            eprintln!("Could not write {}: {e}. CSV follows:", path.display());
            println!("{}", results.to_csv());
            false
        }
    }
}

/// Same fallback as [`export_csv`] for the JSON report.
pub fn export_json(results: &DrawResults, path: &Path) -> bool {
    match results.write_json(path) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("JSON export to {} failed: {e}", path.display());
            eprintln!("Could not write {}: {e}. JSON follows:", path.display());
            match results.to_json() {
                Ok(json) => println!("{json}"),
                Err(e) => eprintln!("Error serializing results: {e}"),
            }
            false
        }
    }
}
