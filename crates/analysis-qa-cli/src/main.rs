//! Analysis QA - command-line front end for the interview analysis QA engine
//!
//! The `analysis-qa` command runs the engine offline over JSON files.
//!
//! ## Commands
//!
//! - `validate`: Parse a raw provider payload and apply the quality gate
//! - `vote`: Score candidate analyses and pick the winner
//! - `recover`: Run the full retry/gate/vote loop against recorded payloads
//! - `normalize`: Normalize one answer value to 0-100
//! - `dimensions`: Heuristic dimension scores per interview
//! - `anomalies`: Outlier and pattern scan over an interview batch
//! - `biases`: Response-bias scan per interview

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn, Level};

use analysis_qa_core::provider::replay::RecordedResponse;
use analysis_qa_core::{
    aggregate_dimension_scores, detect_anomalies, detect_biases, normalize_value,
    parse_provider_payload, tally, validate_with, write_recovery_report, AnalysisRequest,
    Anomaly, AnswerScale, Ballot, Bias, CancellationToken, DimensionScores, Interview, QaConfig,
    QualityThresholds, QualityVerdict, QuestionMetadata, RecoveryOrchestrator, RecoveryReport,
    ReplayProvider, ScoredAnalysis,
};

#[derive(Parser)]
#[command(name = "analysis-qa")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Quality assurance for LLM interview analysis", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// TOML configuration file (recovery policy, dimension keywords)
    #[arg(long, global = true, env = "ANALYSIS_QA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a raw provider response and run the quality gate on it
    Validate {
        /// File holding the raw model output (JSON, optionally code-fenced)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Score a set of candidate analyses and select the winner
    Vote {
        /// JSON array of provider analyses
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Run retry, quality gate and voting against recorded provider responses
    Recover {
        /// JSON array of recorded responses, replayed in order
        #[arg(long)]
        replay: PathBuf,

        /// Interview JSON used as request context
        #[arg(long)]
        interview: Option<PathBuf>,

        /// Directory to persist the digest-verified recovery report
        #[arg(long)]
        report_dir: Option<PathBuf>,
    },

    /// Normalize a single answer value to 0-100
    Normalize {
        /// Raw answer value (number or text)
        value: String,

        /// Declared answer scale
        #[arg(short, long, value_enum, default_value_t = ScaleArg::Unspecified)]
        scale: ScaleArg,
    },

    /// Heuristic dimension scores for each interview
    Dimensions {
        /// JSON array of interviews
        #[arg(short, long)]
        input: PathBuf,

        /// JSON array of question metadata
        #[arg(short, long)]
        questions: PathBuf,
    },

    /// Outlier and straight-lining scan over an interview batch
    Anomalies {
        /// JSON array of interviews
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Response-bias scan for each interview
    Biases {
        /// JSON array of interviews
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ScaleArg {
    Unspecified,
    OneToFive,
    OneToTen,
    Boolean,
    FreeText,
}

impl From<ScaleArg> for AnswerScale {
    fn from(arg: ScaleArg) -> Self {
        match arg {
            ScaleArg::Unspecified => AnswerScale::Unspecified,
            ScaleArg::OneToFive => AnswerScale::OneToFive,
            ScaleArg::OneToTen => AnswerScale::OneToTen,
            ScaleArg::Boolean => AnswerScale::Boolean,
            ScaleArg::FreeText => AnswerScale::FreeText,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    analysis_qa_core::init_tracing(cli.json, level);

    let config = load_config(cli.config.as_deref())?;

    let output = match cli.command {
        Commands::Validate { input } => {
            let raw = std::fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {:?}", input))?;
            to_json(&cmd_validate(&raw, &config.recovery.quality))?
        }
        Commands::Vote { input } => {
            to_json(&cmd_vote(&read_json_file::<Vec<Value>>(&input)?)?)?
        }
        Commands::Recover {
            replay,
            interview,
            report_dir,
        } => {
            let recording: Vec<ReplayEntry> = read_json_file(&replay)?;
            let interview: Option<Interview> =
                interview.as_deref().map(read_json_file::<Interview>).transpose()?;

            let cancel = CancellationToken::new();
            let on_signal = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("interrupt received, cancelling recovery");
                    on_signal.cancel();
                }
            });

            let report = cmd_recover(
                &config,
                recording,
                interview.as_ref(),
                report_dir.as_deref(),
                &cancel,
            )
            .await?;
            to_json(&report)?
        }
        Commands::Normalize { value, scale } => to_json(&cmd_normalize(&value, scale.into()))?,
        Commands::Dimensions { input, questions } => to_json(&cmd_dimensions(
            &config,
            &read_json_file::<Vec<Interview>>(&input)?,
            read_json_file::<Vec<QuestionMetadata>>(&questions)?,
        ))?,
        Commands::Anomalies { input } => {
            to_json(&cmd_anomalies(&read_json_file::<Vec<Interview>>(&input)?)?)?
        }
        Commands::Biases { input } => {
            to_json(&cmd_biases(&read_json_file::<Vec<Interview>>(&input)?))?
        }
    };

    println!("{}", output);
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<QaConfig> {
    match path {
        Some(path) => QaConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {:?}", path)),
        None => Ok(QaConfig::default()),
    }
}

fn read_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {:?}", path))
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output")
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidateOutput {
    /// Set when the payload could not be parsed at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    verdict: Option<QualityVerdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    analysis: Option<ScoredAnalysis>,
}

/// Parse one raw provider response and run the gate on it.
fn cmd_validate(raw: &str, thresholds: &QualityThresholds) -> ValidateOutput {
    match parse_provider_payload(raw) {
        Ok(analysis) => {
            let verdict = validate_with(thresholds, &analysis);
            info!(accepted = verdict.is_accepted(), "quality gate evaluated");
            ValidateOutput {
                parse_error: None,
                verdict: Some(verdict),
                analysis: Some(analysis),
            }
        }
        Err(err) => ValidateOutput {
            parse_error: Some(err.to_string()),
            verdict: None,
            analysis: None,
        },
    }
}

// ---------------------------------------------------------------------------
// vote
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoteOutput {
    ballot: Ballot,
    winner: ScoredAnalysis,
}

fn cmd_vote(candidates: &[Value]) -> Result<VoteOutput> {
    let mut parsed = Vec::with_capacity(candidates.len());
    for (i, candidate) in candidates.iter().enumerate() {
        let analysis = parse_provider_payload(&candidate.to_string())
            .with_context(|| format!("Candidate {} is not a valid analysis", i))?;
        parsed.push(analysis);
    }

    let ballot = tally(&parsed).context("No candidates to vote on")?;
    let winner = parsed.swap_remove(ballot.winner_index);
    Ok(VoteOutput { ballot, winner })
}

// ---------------------------------------------------------------------------
// recover
// ---------------------------------------------------------------------------

/// One entry of a replay recording: a raw payload string, a tagged
/// [`RecordedResponse`], or an inline analysis object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReplayEntry {
    Raw(String),
    Recorded(RecordedResponse),
    Inline(Value),
}

impl From<ReplayEntry> for RecordedResponse {
    fn from(entry: ReplayEntry) -> Self {
        match entry {
            ReplayEntry::Raw(body) => RecordedResponse::Payload { body },
            ReplayEntry::Recorded(recorded) => recorded,
            ReplayEntry::Inline(value) => RecordedResponse::Payload {
                body: value.to_string(),
            },
        }
    }
}

async fn cmd_recover(
    config: &QaConfig,
    recording: Vec<ReplayEntry>,
    interview: Option<&Interview>,
    report_dir: Option<&Path>,
    cancel: &CancellationToken,
) -> Result<RecoveryReport> {
    let provider = Arc::new(ReplayProvider::new(
        recording.into_iter().map(RecordedResponse::from).collect(),
    ));
    let orchestrator = RecoveryOrchestrator::new(provider, config.recovery.clone())
        .context("Invalid recovery policy")?;

    let request = interview
        .map(|iv| AnalysisRequest::for_interview(iv, Default::default()))
        .unwrap_or_default();

    let report = orchestrator.recover_with_report(cancel, &request).await;
    orchestrator.metrics().flush();

    if let Some(dir) = report_dir {
        let path = write_recovery_report(&report, dir)
            .with_context(|| format!("Failed to write recovery report to {:?}", dir))?;
        info!(path = %path.display(), "recovery report written");
    }

    Ok(report)
}

// ---------------------------------------------------------------------------
// normalize / dimensions
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct NormalizeOutput<'a> {
    value: &'a str,
    score: f64,
}

fn cmd_normalize(value: &str, scale: AnswerScale) -> NormalizeOutput<'_> {
    NormalizeOutput {
        value,
        score: normalize_value(value, scale),
    }
}

fn cmd_dimensions(
    config: &QaConfig,
    interviews: &[Interview],
    questions: Vec<QuestionMetadata>,
) -> BTreeMap<String, DimensionScores> {
    let catalog = config.dimension_mapper().catalog(questions);
    interviews
        .iter()
        .map(|iv| (iv.id.clone(), aggregate_dimension_scores(iv, &catalog)))
        .collect()
}

// ---------------------------------------------------------------------------
// anomalies / biases
// ---------------------------------------------------------------------------

fn cmd_anomalies(interviews: &[Interview]) -> Result<Vec<Anomaly>> {
    let anomalies = detect_anomalies(interviews).context("Anomaly scan failed")?;
    info!(
        interviews = interviews.len(),
        anomalies = anomalies.len(),
        "anomaly scan complete"
    );
    Ok(anomalies)
}

fn cmd_biases(interviews: &[Interview]) -> BTreeMap<String, Vec<Bias>> {
    interviews
        .iter()
        .map(|iv| (iv.id.clone(), detect_biases(iv)))
        .collect()
}
