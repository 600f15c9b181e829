//! Upload command handler

use anyhow::Result;
use colored::*;

use crate::cli::UploadArgs;
use crate::store::{load_service_account, EnvTokenProvider, FirestoreClient};
use crate::upload::{read_export, upload_export};

/// Handle the upload command
pub async fn handle_upload_command(args: UploadArgs) -> Result<()> {
    if !args.file.exists() {
        anyhow::bail!("Export file not found: {}", args.file.display());
    }
    if !args.credentials.exists() {
        anyhow::bail!("Credentials file not found: {}", args.credentials.display());
    }

    let credentials = load_service_account(&args.credentials)?;
    let client = FirestoreClient::new(&credentials, Box::new(EnvTokenProvider::default()));
    let data = read_export(&args.file)?;

    println!(
        "Uploading {} into project {}",
        args.file.display().to_string().cyan(),
        credentials.project_id.bright_green().bold()
    );
    println!();

    let summary = upload_export(&client, &data, args.batch_size).await;

    for outcome in &summary.collections {
        let line = format!("{}: {} uploaded", outcome.collection, outcome.uploaded);
        if outcome.failures.is_empty() {
            println!("{}", line.green());
        } else {
            println!("{}", line.yellow());
            for failure in &outcome.failures {
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

    println!();
    if summary.has_failures() {
        println!(
            "{}",
            format!(
                "Upload finished with failures, {} documents written",
                summary.total_uploaded()
            )
            .yellow()
            .bold()
        );
    } else {
        println!(
            "{}",
            format!(
                "Upload completed, {} documents written",
                summary.total_uploaded()
            )
            .green()
            .bold()
        );
    }

    Ok(())
}
