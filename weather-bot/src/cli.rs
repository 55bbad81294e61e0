use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Confirm, Password, PasswordDisplayMode};
use weather_core::{
    Config, ProviderId, Reply, Settings, handle_weather, provider_from_settings,
};

use crate::bot;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-bot", version, about = "Discord bot that reports the current weather")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Connect to Discord and answer weather commands (the default).
    Run,

    /// Look up the current weather once and print it.
    Show {
        /// Location name, e.g. "New York".
        #[arg(required = true, num_args = 1..)]
        location: Vec<String>,
    },

    /// Store an API key for a provider in the config file.
    Configure {
        /// Provider short name, e.g. "weatherapi" or "openweather".
        provider: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command.unwrap_or(Command::Run) {
            Command::Run => {
                let file = Config::load()?;
                let settings = Settings::from_env(&file, true)?;
                bot::start(settings).await
            }
            Command::Show { location } => show(&location.join(" ")).await,
            Command::Configure { provider } => configure(&provider),
        }
    }
}

async fn show(location: &str) -> anyhow::Result<()> {
    let file = Config::load()?;
    let settings = Settings::from_env(&file, false)?;
    let provider = provider_from_settings(&settings.provider)?;

    match handle_weather(provider.as_ref(), location).await {
        Reply::Report(report) => {
            println!("{}", report.to_plain_text());
            Ok(())
        }
        Reply::Error(message) => bail!(message),
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;
    let mut config = Config::load()?;

    let api_key = Password::new(&format!("API key for {id}:"))
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let api_key = api_key.trim().to_string();
    if api_key.is_empty() {
        bail!("API key must not be empty");
    }

    if config.is_provider_configured(id) {
        println!("Replacing the stored {id} API key");
    }

    let had_default = config.default_provider.is_some();
    config.upsert_provider_api_key(id, api_key);

    if had_default && config.default_provider.as_deref() != Some(id.as_str()) {
        let make_default = Confirm::new(&format!("Use {id} as the default provider?"))
            .with_default(false)
            .prompt()
            .context("Failed to read answer")?;

        if make_default {
            config.set_default_provider(id);
        }
    }

    let path = config.save()?;
    println!("Saved {id} credentials to {}", path.display());

    Ok(())
}
