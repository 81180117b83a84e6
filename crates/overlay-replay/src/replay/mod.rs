mod report;
mod schedule;
mod session;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use overlay_core::{KnowledgeBase, KnowledgeError, OverlaySnapshot};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::config::{ReplayConfig, ResolvedOutputs};
use crate::events::{EventLogError, MatchEvent, read_event_log};

pub use report::MatchReport;
pub use schedule::PhaseSchedule;
pub use session::{EventOutcome, OverlaySession, SessionStats};

/// Replays a recorded event log through a fresh overlay session.
pub struct ReplayRunner {
    config: ReplayConfig,
    outputs: ResolvedOutputs,
    knowledge: KnowledgeBase,
    events: Vec<MatchEvent>,
    logging_enabled: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub events_processed: usize,
    pub rows_written: usize,
    pub stats: SessionStats,
    pub final_snapshot: OverlaySnapshot,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub telemetry_path: Option<PathBuf>,
}

impl ReplayRunner {
    /// Load the knowledge file and event log named by a validated configuration.
    pub fn new(config: ReplayConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let knowledge = KnowledgeBase::from_path(&config.knowledge)?;
        let events = read_event_log(Path::new(&config.events))?;
        event!(
            target: "overlay_replay::runner",
            Level::INFO,
            run_id = %config.run_id,
            cards = knowledge.card_count() as u64,
            events = events.len() as u64,
            "loaded replay inputs"
        );

        Ok(Self {
            logging_enabled: config.logging.enable_structured,
            config,
            outputs,
            knowledge,
            events,
        })
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn events(&self) -> &[MatchEvent] {
        &self.events
    }

    /// Run every event, streaming one snapshot row per event to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut session = OverlaySession::new(
            &self.knowledge,
            self.config.phases.clone(),
            self.config.deck_cap,
        );
        let mut rows_written = 0usize;

        for (index, match_event) in self.events.iter().enumerate() {
            let outcome = session.apply(match_event);
            let row = SnapshotRow {
                run_id: &self.config.run_id,
                index,
                event: match_event,
                outcome: &outcome,
                snapshot: session.snapshot(),
            };
            serde_json::to_writer(&mut writer, &row)?;
            writer.write_all(b"\n")?;
            rows_written += 1;
        }

        writer.flush()?;

        let report = MatchReport::new(&self.config, &session);
        report.write_markdown(&self.outputs.summary_md)?;

        let telemetry_path = if self.logging_enabled {
            Some(self.outputs.report_dir().join("telemetry.jsonl"))
        } else {
            None
        };

        Ok(RunSummary {
            events_processed: session.stats().events,
            rows_written,
            stats: session.stats().clone(),
            final_snapshot: session.snapshot(),
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            telemetry_path,
        })
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[derive(Serialize)]
struct SnapshotRow<'a> {
    run_id: &'a str,
    index: usize,
    event: &'a MatchEvent,
    outcome: &'a EventOutcome,
    snapshot: OverlaySnapshot,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("{0}")]
    Knowledge(#[from] KnowledgeError),
    #[error("{0}")]
    Events(#[from] EventLogError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize snapshot row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
}
