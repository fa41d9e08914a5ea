use crate::reports;
use clap::Args;
use keymeta::api::{FileOutcome, Validator};
use keymeta::config::FirmwareLimits;
use keymeta::issue::Issue;
use keymeta::KeymetaError;
use serde::Serialize;
use std::path::PathBuf;
use tracing::error;

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub limits: FirmwareLimits,

    /// Metadata documents to check.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Print results as JSON instead of tables.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Print the canonical form of each valid document.
    #[arg(long, default_value_t = false)]
    pub emit: bool,
}

#[derive(Serialize)]
struct JsonOutcome<'a> {
    file: String,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    issues: &'a [Issue],
}

pub fn run(args: &ValidateArgs, validator: &Validator) -> bool {
    let outcomes = validator.validate_files(&args.files);
    let all_valid = outcomes.iter().all(FileOutcome::is_valid);

    if args.json {
        print_json(&outcomes);
        return all_valid;
    }

    println!("\n=== METADATA AUDIT ===");
    for outcome in &outcomes {
        let file = outcome.path.display().to_string();
        match &outcome.result {
            Ok(meta) => {
                println!("\n✅ {}: {}", file, meta.name);
                if args.emit {
                    match meta.to_json() {
                        Ok(json) => println!("{}", json),
                        Err(e) => error!("{}", e),
                    }
                }
            }
            Err(KeymetaError::Invalid(report)) => reports::print_issue_table(&file, report),
            Err(e) => println!("\n❌ {}: {}", file, e),
        }
    }

    reports::print_summary(&outcomes);
    all_valid
}

fn print_json(outcomes: &[FileOutcome]) {
    let rows: Vec<JsonOutcome> = outcomes
        .iter()
        .map(|o| JsonOutcome {
            file: o.path.display().to_string(),
            valid: o.is_valid(),
            error: match &o.result {
                Err(e) if e.report().is_none() => Some(e.to_string()),
                _ => None,
            },
            issues: o
                .result
                .as_ref()
                .err()
                .and_then(KeymetaError::report)
                .map(|r| r.issues())
                .unwrap_or(&[]),
        })
        .collect();

    match serde_json::to_string_pretty(&rows) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("{}", e),
    }
}
