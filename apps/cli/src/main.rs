//! markfill CLI: fill bookmark lists with descriptions and favicons.
//!
//! Looks up every bookmark's description through a website-info service,
//! then lets the user fill in whatever the service could not answer.

mod commands;
mod signals;
mod terminal;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
