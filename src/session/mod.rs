//! Housekeeping log discovery and loading
//!
//! Flight and bench runs write `housekeeping_rtd.log` into a directory whose
//! path carries the run start as a `DD-MM-YYYY_HH-MM-SS` segment. This module
//! finds those files, reads them in one go and hands the bytes to the decoder.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use thiserror::Error;
use tracing::{info, warn};

use crate::decoder::{ChipStreams, DecodeError, RtdDecoder};

/// Default RTD log file name
pub const RTD_LOG_NAME: &str = "housekeeping_rtd.log";

/// Format of the run start segment in log paths
pub const START_TIME_FORMAT: &str = "%d-%m-%Y_%H-%M-%S";

/// Session errors
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },
}

fn start_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+-\d+-\d+_\d+-\d+-\d+").expect("valid start pattern"))
}

/// Find the run start time encoded in a log path
///
/// Uses the last `DD-MM-YYYY_HH-MM-SS` match along the path. Returns `None`
/// when no segment matches or the match is not a valid date.
pub fn detect_start(path: &Path) -> Option<NaiveDateTime> {
    let text = path.to_string_lossy();
    let candidate = start_pattern().find_iter(&text).last()?;
    match NaiveDateTime::parse_from_str(candidate.as_str(), START_TIME_FORMAT) {
        Ok(start) => Some(start),
        Err(e) => {
            warn!(path = %path.display(), candidate = candidate.as_str(), error = %e, "Could not infer run start");
            None
        }
    }
}

/// Recursively find files named `name` under `root`, sorted by path
///
/// Symlinked directories are not descended into; symlinks to files match.
pub fn find_logs(root: &Path, name: &str) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut files = Vec::new();
    collect_logs(root, name, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_logs(dir: &Path, name: &str, files: &mut Vec<PathBuf>) -> Result<(), std::io::Error> {
    if !dir.is_dir() {
        return Ok(());
    }

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            collect_logs(&path, name, files)?;
        } else if entry.file_name() == name && path.is_file() {
            files.push(path);
        }
    }

    Ok(())
}

/// Day of the earliest run start found among the logs under `root`
///
/// Notes files only carry a time of day; this is the date they are placed on.
pub fn run_date(root: &Path, name: &str) -> Result<Option<NaiveDate>, std::io::Error> {
    let date = find_logs(root, name)?
        .iter()
        .filter_map(|p| detect_start(p))
        .min()
        .map(|start| start.date());
    Ok(date)
}

/// One decoded RTD log file
#[derive(Debug, Clone)]
pub struct RtdLog {
    pub path: PathBuf,
    /// Run start inferred from the path, if any
    pub start: Option<NaiveDateTime>,
    pub streams: ChipStreams,
}

impl RtdLog {
    /// Read and decode a log file
    pub fn load(path: impl AsRef<Path>, decoder: &RtdDecoder) -> Result<Self, SessionError> {
        let path = path.as_ref().to_path_buf();
        let data = std::fs::read(&path).map_err(|source| SessionError::Io {
            path: path.clone(),
            source,
        })?;
        Self::from_bytes(path, &data, decoder)
    }

    /// Decode an already-read log; `path` is used for start detection only
    pub fn from_bytes(
        path: PathBuf,
        data: &[u8],
        decoder: &RtdDecoder,
    ) -> Result<Self, SessionError> {
        let streams = decoder
            .decode(data)
            .map_err(|source| SessionError::Decode {
                path: path.clone(),
                source,
            })?;
        let start = detect_start(&path);

        info!(
            path = %path.display(),
            bytes = data.len(),
            chip1 = streams.chip1.len(),
            chip2 = streams.chip2.len(),
            start = ?start,
            "Loaded RTD log"
        );

        Ok(Self {
            path,
            start,
            streams,
        })
    }
}

/// Find, load and decode every log under `root`, ordered by run start
///
/// Logs without a detectable start sort first, then by path.
pub fn load_all(root: &Path, name: &str, decoder: &RtdDecoder) -> Result<Vec<RtdLog>, SessionError> {
    let files = find_logs(root, name).map_err(|source| SessionError::Io {
        path: root.to_path_buf(),
        source,
    })?;

    if files.is_empty() {
        warn!(root = %root.display(), name, "No logs found");
    }

    let mut logs = files
        .iter()
        .map(|f| RtdLog::load(f, decoder))
        .collect::<Result<Vec<_>, _>>()?;
    logs.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.path.cmp(&b.path)));
    Ok(logs)
}
