//! Import command handler

use anyhow::Result;
use colored::*;

use crate::cli::ImportArgs;
use crate::import::{
    ImportOptions, ImportRunner, ImportSummary, InteractiveConfirmation, RunOutcome, SheetResult,
    SystemClock,
};
use crate::store::{load_service_account, EnvTokenProvider, FirestoreClient};

/// Handle the import command
pub async fn handle_import_command(args: ImportArgs) -> Result<()> {
    // Locating the inputs must fail before any store traffic
    if !args.workbook.exists() {
        anyhow::bail!("Workbook not found: {}", args.workbook.display());
    }
    if !args.credentials.exists() {
        anyhow::bail!("Credentials file not found: {}", args.credentials.display());
    }

    let credentials = load_service_account(&args.credentials)?;
    let client = FirestoreClient::new(&credentials, Box::new(EnvTokenProvider::default()));

    println!(
        "Importing {} into project {}",
        args.workbook.display().to_string().cyan(),
        credentials.project_id.bright_green().bold()
    );
    println!();

    let clock = SystemClock;
    let confirmation = InteractiveConfirmation;
    let options = ImportOptions {
        batch_size: args.batch_size,
        force: args.force,
    };
    let runner = ImportRunner::new(&client, &clock, &confirmation, options);

    match runner.run(&args.workbook).await? {
        RunOutcome::Cancelled => {
            println!("{}", "Import cancelled, nothing was written".yellow());
            Ok(())
        }
        RunOutcome::Completed(summary) => {
            print_summary(&summary);
            Ok(())
        }
    }
}

fn print_summary(summary: &ImportSummary) {
    for outcome in &summary.entities {
        match &outcome.result {
            SheetResult::Imported {
                imported,
                skipped,
                batches,
                failures,
            } => {
                let line = format!(
                    "{}: {} imported, {} skipped ({} batches)",
                    outcome.kind, imported, skipped, batches
                );
                if failures.is_empty() {
                    println!("{}", line.green());
                } else {
                    println!("{}", line.yellow());
                    for failure in failures {
                        println!(
                            "  {}",
                            format!(
                                "batch {} rejected ({} documents): {}",
                                failure.batch, failure.size, failure.reason
                            )
                            .red()
                        );
                    }
                }
            }
            SheetResult::SourceFailed(reason) => {
                println!(
                    "{}",
                    format!("{}: not imported: {}", outcome.kind, reason).red()
                );
            }
        }
    }

    println!();
    if summary.has_failures() {
        println!(
            "{}",
            format!(
                "Import finished with failures, {} documents written",
                summary.total_imported()
            )
            .yellow()
            .bold()
        );
    } else {
        println!(
            "{}",
            format!(
                "Import completed, {} documents written",
                summary.total_imported()
            )
            .green()
            .bold()
        );
    }
}
