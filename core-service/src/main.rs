//! risk-score - review one submission from the command line
//!
//! ```text
//! risk-score <model_bundle.json> <prediction_log.csv> [field=value ...]
//! ```
//!
//! Prints the review outcome as JSON. The audit row is appended exactly as
//! the server would append it.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use risk_review_core::{AuditLog, ModelBundle, RawSubmission, ReviewPipeline, RiskModel};

#[derive(Parser, Debug)]
#[command(name = "risk-score", version, about = "Review one account submission")]
struct Cli {
    /// Model bundle manifest (JSON)
    bundle: PathBuf,

    /// Audit log to append to (created with a header if missing)
    log: PathBuf,

    /// Form fields, e.g. 性別=2 年齡區間=30-39歲 年齡=35
    #[arg(value_parser = parse_field)]
    fields: Vec<(String, String)>,
}

/// `field=value`; the value may be empty or contain further `=`
fn parse_field(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((field, value)) if !field.is_empty() => Ok((field.to_string(), value.to_string())),
        _ => Err(format!("expected field=value, got '{}'", arg)),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let raw: RawSubmission = cli.fields.into_iter().collect();

    let bundle = match ModelBundle::load(&cli.bundle) {
        Ok(bundle) => bundle,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let pipeline = ReviewPipeline::new(
        Arc::new(RiskModel::new(bundle)),
        Arc::new(AuditLog::new(cli.log)),
    );

    match pipeline.review(&raw) {
        Ok(outcome) => match serde_json::to_string_pretty(&outcome) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                log::error!("Failed to encode outcome: {}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            log::error!("Review failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
