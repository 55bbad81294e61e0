//! Binary crate for the `weather-bot` Discord bot.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Logging setup
//! - Wiring the weather command into the Discord framework

use clap::Parser;

mod bot;
mod cli;
mod commands;
mod logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load before logging so RUST_LOG and LOG_FORMAT can live in .env
    dotenvy::dotenv().ok();
    logging::init_logging(&logging::LoggingConfig::from_env());

    let cmd = cli::Cli::parse();
    cmd.run().await
}
