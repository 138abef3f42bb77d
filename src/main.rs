//! CLI entry point for the transcript GPA tool.
//!
//! Provides subcommands for computing GPAs for every policy in a directory
//! and for tagging transcript records with their semester.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use transcript_gpa::{
    gpa::{calculate_all, calculate_isolated},
    output::{append_history, print_json, write_summary},
    policy::load_policies,
    transcript::{load_transcript, semester::tag_transcript_file},
};

#[derive(Parser)]
#[command(name = "transcript_gpa")]
#[command(about = "Compute GPAs from a transcript under institutional GPA policies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a GPA for every policy in a directory
    Compute {
        /// Transcript JSON file with a course_history array
        #[arg(short, long, default_value = "data/transcript.json")]
        transcript: String,

        /// Directory containing GPA policy JSON files
        #[arg(short, long, default_value = "data/gpa_policies")]
        policies: String,

        /// Where to write the GPA summary JSON
        #[arg(short, long, default_value = "data/gpa_summary.json")]
        output: String,

        /// Optional: CSV file to append one row per school to
        #[arg(long)]
        history: Option<String>,

        /// Keep evaluating remaining policies when one fails
        #[arg(long, default_value_t = false)]
        keep_going: bool,
    },
    /// Add a semester field to every course record in a transcript
    TagSemesters {
        /// Transcript JSON file to update in place
        #[arg(short, long, default_value = "data/transcript.json")]
        transcript: String,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/transcript_gpa.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("transcript_gpa.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Compute {
            transcript,
            policies,
            output,
            history,
            keep_going,
        } => compute(&transcript, &policies, &output, history.as_deref(), keep_going),
        Commands::TagSemesters { transcript } => {
            tag_transcript_file(&transcript).map(|tagged| info!(tagged, "Semester tagging complete"))
        }
    };

    if let Err(e) = &outcome {
        error!(error = %format!("{e:#}"), "Error computing GPA");
    }
    outcome
}

/// Loads the transcript and policies, computes every GPA and writes the summary.
#[tracing::instrument(skip(history, keep_going))]
fn compute(
    transcript: &str,
    policies_dir: &str,
    output: &str,
    history: Option<&str>,
    keep_going: bool,
) -> Result<()> {
    let table = load_transcript(transcript)?;
    info!(entries = table.len(), "Loaded course entries");

    let policies = load_policies(policies_dir)?;

    let summary = if keep_going {
        let (summary, errors) = calculate_isolated(&table, &policies);
        if !errors.is_empty() {
            warn!(failures = errors.len(), "Some policies failed; summary is partial");
        }
        summary
    } else {
        calculate_all(&table, &policies)?
    };

    write_summary(output, &summary)?;
    if let Some(history) = history {
        append_history(history, &summary)?;
    }

    info!(output, schools = summary.gpas.len(), "GPA calculation complete");
    print_json(&summary)?;
    Ok(())
}
