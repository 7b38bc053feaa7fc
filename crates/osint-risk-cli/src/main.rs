mod settings;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use osint_risk_core::report::{render_report, OutputFormat};
use osint_risk_core::{
    distribution, score_with_config, FileSnapshotRepository, RiskAssessment, RiskEngine,
    ScoringConfig, Severity, SeverityCounts, SeverityDistribution, SnapshotRepository,
};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "osint-risk",
    author,
    version,
    about = "Risk and completeness metrics for OSINT snapshots"
)]
struct Cli {
    /// Scoring configuration file (TOML, YAML or JSON)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Assess a snapshot file (.json, .json5, .yaml)
    Assess {
        /// Path to the snapshot document
        snapshot: PathBuf,
        /// Emit the report as JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },
    /// Score raw severity counts
    Score {
        #[arg(long, default_value_t = 0)]
        critical: u32,
        #[arg(long, default_value_t = 0)]
        high: u32,
        #[arg(long, default_value_t = 0)]
        medium: u32,
        #[arg(long, default_value_t = 0)]
        low: u32,
        /// Emit JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Serialize)]
struct ScoreOutput {
    assessment: RiskAssessment,
    distribution: SeverityDistribution,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let scoring = settings::load_scoring_config(cli.config.as_deref())?;
    debug!(?scoring, "scoring configuration loaded");

    match cli.command {
        Commands::Assess { snapshot, json } => assess(&snapshot, scoring, json).await?,
        Commands::Score {
            critical,
            high,
            medium,
            low,
            json,
        } => score(
            SeverityCounts::new(critical, high, medium, low),
            &scoring,
            json,
        )?,
    }
    Ok(())
}

async fn assess(path: &Path, scoring: ScoringConfig, json: bool) -> Result<()> {
    let repo = FileSnapshotRepository::new(path);
    let snapshot = repo
        .load_snapshot()
        .await
        .with_context(|| format!("failed to load snapshot from {}", path.display()))?;
    let engine = RiskEngine::with_config(scoring)?;
    let report = engine.assess(&snapshot);
    let format = if json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    print!("{}", render_report(&report, format)?);
    if json {
        println!();
    }
    Ok(())
}

fn score(counts: SeverityCounts, scoring: &ScoringConfig, json: bool) -> Result<()> {
    let output = ScoreOutput {
        assessment: score_with_config(Some(&counts), scoring),
        distribution: distribution(Some(&counts)),
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "Security Score: {}/100 ({}, {})",
        output.assessment.score, output.assessment.label, output.assessment.color_tier
    );
    for severity in Severity::ALL {
        println!(
            "- {severity:<8} {count:>6} ({pct}%)",
            count = counts.get(severity),
            pct = output.distribution.percentage(severity)
        );
    }
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}
