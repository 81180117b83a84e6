use std::path::PathBuf;

use clap::Parser;

use overlay_replay::config::{ReplayConfig, ResolvedOutputs};
use overlay_replay::logging::init_logging;
use overlay_replay::replay::ReplayRunner;

/// Replays a recorded match through the opponent tracker.
#[derive(Debug, Parser)]
#[command(
    name = "overlay-replay",
    author,
    version,
    about = "Offline replay of opponent card and elixir tracking"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "replay/replay.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the event log to replay.
    #[arg(long, value_name = "FILE")]
    events: Option<String>,

    /// Exit after loading the configuration and inputs (nothing is replayed).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = ReplayConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(events) = cli.events {
        config.events = events;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let phase_count = config.phases.len();

    println!(
        "Loaded configuration '{run_id}' with {phase_count} scheduled phase change{} (deck cap: {})",
        if phase_count == 1 { "" } else { "s" },
        config.deck_cap.as_str()
    );

    let _logging_guard = init_logging(&config.logging, &outputs)?;
    let runner = ReplayRunner::new(config, outputs)?;

    if cli.validate_only {
        println!(
            "Validation-only mode: {} events and {} known cards loaded, replay skipped.",
            runner.events().len(),
            runner.knowledge().card_count()
        );
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Replay complete for '{run_id}': {} events → {} rows at {}",
        summary.events_processed,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!(
        "  Plays: {} ({} unknown, {} ignored, {} unpriced)",
        summary.stats.plays,
        summary.stats.unknown_plays,
        summary.stats.ignored_plays,
        summary.stats.unpriced_plays
    );
    let snapshot = &summary.final_snapshot;
    println!("  Discovered deck: {}", snapshot.discovered_deck.join(", "));
    println!("  Inferred hand: {}", snapshot.inferred_hand.join(", "));
    if let Some(next) = snapshot.inferred_next_card.as_deref() {
        println!("  Next card: {next}");
    }
    println!("  Elixir: {:.2} ({})", snapshot.elixir, snapshot.phase);
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(telemetry_path) = summary.telemetry_path.as_ref() {
        println!("Telemetry log: {}", telemetry_path.display());
    }

    Ok(())
}
