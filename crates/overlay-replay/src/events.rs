//! Recorded match event logs (JSON lines).

use overlay_core::ElixirPhase;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One line of an event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchEvent {
    /// Detector output. `card` is absent or null when classification failed.
    Play {
        #[serde(default)]
        card: Option<String>,
        #[serde(default)]
        evolved: bool,
        t: f64,
    },
    /// Timer tick from the capture loop.
    Tick { t: f64 },
    /// Manual correction from a hotkey.
    Adjust { delta: f64 },
    /// Manual phase override.
    Phase { phase: ElixirPhase },
}

impl MatchEvent {
    pub fn timestamp(&self) -> Option<f64> {
        match self {
            MatchEvent::Play { t, .. } | MatchEvent::Tick { t } => Some(*t),
            MatchEvent::Adjust { .. } | MatchEvent::Phase { .. } => None,
        }
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            MatchEvent::Play { .. } => "play",
            MatchEvent::Tick { .. } => "tick",
            MatchEvent::Adjust { .. } => "adjust",
            MatchEvent::Phase { .. } => "phase",
        }
    }
}

#[derive(Debug, Error)]
pub enum EventLogError {
    #[error("failed to open event log {path:?}: {source}")]
    Open {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to read event log at line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid event at line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

pub fn read_event_log(path: &Path) -> Result<Vec<MatchEvent>, EventLogError> {
    let file = File::open(path).map_err(|source| EventLogError::Open {
        source,
        path: path.to_path_buf(),
    })?;
    parse_event_log(BufReader::new(file))
}

/// Parses one event per non-blank line. Line numbers in errors are 1-based.
pub fn parse_event_log(reader: impl BufRead) -> Result<Vec<MatchEvent>, EventLogError> {
    let mut events = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.map_err(|source| EventLogError::Read {
            line: line_no,
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let event = serde_json::from_str(&line).map_err(|source| EventLogError::Parse {
            line: line_no,
            source,
        })?;
        events.push(event);
    }
    Ok(events)
}
