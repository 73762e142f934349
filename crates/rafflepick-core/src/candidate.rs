//! Participant list normalization.
//!
//! Raw input (pasted text or file contents) is split on newlines, commas and
//! semicolons. Each token is trimmed and lowercased; tokens without an `@`
//! are dropped and duplicates collapse to their first occurrence. Domain
//! validity is not checked.

use std::collections::HashSet;
use std::fmt;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Fewest participants accepted for a draw.
pub const MIN_PARTICIPANTS: usize = 2;

const SEPARATORS: &[char] = &['\n', ',', ';'];

/// A unique participant identifier, normally an email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Candidate(String);

impl Candidate {
    /// Normalize a single token. Returns `None` for blank tokens and tokens
    /// without an `@` marker.
    pub fn parse(token: &str) -> Option<Self> {
        let trimmed = token.trim();
        if trimmed.is_empty() || !trimmed.contains('@') {
            return None;
        }
        Some(Self(trimmed.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Candidate {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Parse raw text into distinct candidates, first occurrence order.
/// Empty or whitespace-only input yields an empty list.
pub fn normalize(raw: &str) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    raw.split(SEPARATORS)
        .filter_map(Candidate::parse)
        .filter(|c| seen.insert(c.clone()))
        .collect()
}

/// Live count shown while text is being typed or loaded.
pub fn count_participants(raw: &str) -> usize {
    normalize(raw).len()
}

/// Normalize and enforce the submission rules: at least one valid address,
/// and at least [`MIN_PARTICIPANTS`] overall.
pub fn validate_participants(raw: &str) -> Result<Vec<Candidate>, ValidationError> {
    let candidates = normalize(raw);
    match candidates.len() {
        0 => Err(ValidationError::NoValidParticipants),
        n if n < MIN_PARTICIPANTS => Err(ValidationError::TooFewParticipants {
            found: n,
            min: MIN_PARTICIPANTS,
        }),
        _ => Ok(candidates),
    }
}

/// Raw text of a `.csv` / `.txt` participant file. Invalid UTF-8 is replaced
/// rather than rejected so a stray byte does not lose the whole list.
pub fn read_participants_text(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Read and normalize a participant file.
pub fn read_participants_file(path: &Path) -> io::Result<Vec<Candidate>> {
    read_participants_text(path).map(|text| normalize(&text))
}
