mod cli;
mod import;
mod store;
mod upload;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Import(args) => cli::commands::import::handle_import_command(args).await,
        Commands::Upload(args) => cli::commands::upload::handle_upload_command(args).await,
    }
}
