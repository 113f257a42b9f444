//! Operator notes for annotating a run timeline
//!
//! Notes files hold one entry per line in the form `HH:MM:SS - text`.
//! Blank lines are ignored.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use thiserror::Error;

/// Notes longer than this are cut and suffixed with `...`
pub const DEFAULT_MAX_NOTE_LENGTH: usize = 40;

const TIME_FORMAT: &str = "%H:%M:%S";
const ELLIPSIS: &str = "...";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NoteError {
    #[error("line {line}: expected `HH:MM:SS - text`")]
    Malformed { line: usize },

    #[error("line {line}: invalid time `{value}`")]
    Time { line: usize, value: String },
}

/// One operator note
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub time: NaiveTime,
    pub text: String,
}

impl Note {
    /// Place the note on a given day
    pub fn at(&self, day: NaiveDate) -> NaiveDateTime {
        day.and_time(self.time)
    }
}

/// Parse a notes file
///
/// Line numbers in errors are 1-based.
pub fn parse_notes(text: &str, max_len: usize) -> Result<Vec<Note>, NoteError> {
    let mut notes = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        if line.trim().is_empty() {
            continue;
        }

        let (time, body) = line
            .split_once('-')
            .ok_or(NoteError::Malformed { line: line_no })?;
        let time = time.trim();
        let time = NaiveTime::parse_from_str(time, TIME_FORMAT).map_err(|_| NoteError::Time {
            line: line_no,
            value: time.to_string(),
        })?;

        notes.push(Note {
            time,
            text: truncate(body.trim(), max_len),
        });
    }

    Ok(notes)
}

fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let keep = max_len.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_notes() {
        let text = "12:00:01 - power on\n\n  12:05:30 -   LN2 fill started  \n";
        let notes = parse_notes(text, DEFAULT_MAX_NOTE_LENGTH).unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].time, NaiveTime::from_hms_opt(12, 0, 1).unwrap());
        assert_eq!(notes[0].text, "power on");
        assert_eq!(notes[1].text, "LN2 fill started");
    }

    #[test]
    fn test_split_on_first_dash_only() {
        let notes = parse_notes("08:00:00 - t-minus 10 - hold", 40).unwrap();
        assert_eq!(notes[0].text, "t-minus 10 - hold");
    }

    #[test]
    fn test_long_note_truncated() {
        let long = "a".repeat(50);
        let notes = parse_notes(&format!("01:02:03 - {}", long), 40).unwrap();
        assert_eq!(notes[0].text.len(), 40);
        assert!(notes[0].text.ends_with("..."));
        assert_eq!(&notes[0].text[..37], &long[..37]);

        let exact = "b".repeat(40);
        let notes = parse_notes(&format!("01:02:03 - {}", exact), 40).unwrap();
        assert_eq!(notes[0].text, exact);
    }

    #[test]
    fn test_malformed_lines() {
        assert_eq!(
            parse_notes("12:00:00 ok\n", 40),
            Err(NoteError::Malformed { line: 1 })
        );
        assert_eq!(
            parse_notes("\n25:00:00 - late\n", 40),
            Err(NoteError::Time {
                line: 2,
                value: "25:00:00".to_string()
            })
        );
    }

    #[test]
    fn test_note_at_day() {
        let note = Note {
            time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            text: "launch".to_string(),
        };
        let day = NaiveDate::from_ymd_opt(2024, 4, 5).unwrap();
        assert_eq!(note.at(day).to_string(), "2024-04-05 09:30:00");
    }
}
