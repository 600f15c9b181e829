//! Command-line interface

pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "recount-cli",
    version,
    about = "Reference-data importer for ReCount Pro"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Import reference data from an Excel workbook into the store
    Import(ImportArgs),
    /// Upload a raw JSON export into the store, as-is
    Upload(UploadArgs),
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Path to the DBReCountPro workbook (.xlsx)
    #[arg(long)]
    pub workbook: PathBuf,

    /// Path to the service-account key file (JSON)
    #[arg(long)]
    pub credentials: PathBuf,

    /// Import without asking, even when the store already contains data
    #[arg(long)]
    pub force: bool,

    /// Documents per atomic write group (max 500)
    #[arg(long, default_value_t = 500)]
    pub batch_size: usize,
}

#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Path to the exported JSON file
    #[arg(long)]
    pub file: PathBuf,

    /// Path to the service-account key file (JSON)
    #[arg(long)]
    pub credentials: PathBuf,

    /// Documents per atomic write group (max 500)
    #[arg(long, default_value_t = 500)]
    pub batch_size: usize,
}
