use std::sync::Arc;

use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use tracing::{error, info, warn};
use weather_core::{Settings, WeatherProvider, provider_from_settings};

use crate::commands;

/// State shared by every command invocation. Read-only after startup.
pub struct Data {
    pub provider: Arc<dyn WeatherProvider>,
}

pub type Error = anyhow::Error;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Build the framework, connect to Discord and run until shutdown.
pub async fn start(settings: Settings) -> anyhow::Result<()> {
    let token = settings
        .discord_token
        .clone()
        .context("DISCORD_BOT_TOKEN is required to run the bot")?;

    let provider: Arc<dyn WeatherProvider> =
        Arc::from(provider_from_settings(&settings.provider)?);
    info!(provider = %provider.id(), prefix = %settings.prefix, "starting weather bot");

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::list(),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(settings.prefix.clone()),
                ..Default::default()
            },
            on_error: |err| Box::pin(on_error(err)),
            pre_command: |ctx| {
                Box::pin(async move {
                    info!(
                        command = %ctx.command().qualified_name,
                        user = %ctx.author().name,
                        "received command"
                    );
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Bot started as {}", ready.user.name);
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(Data { provider })
            })
        })
        .build();

    let intents =
        serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::MESSAGE_CONTENT;

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .context("Failed to create Discord client")?;

    tokio::spawn(shutdown_on_ctrl_c(client.shard_manager.clone()));

    client.start().await.context("Discord client stopped with an error")?;
    info!("weather bot stopped");

    Ok(())
}

async fn shutdown_on_ctrl_c(shard_manager: Arc<serenity::ShardManager>) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for ctrl-c: {err}");
        return;
    }

    info!("received ctrl-c, shutting down");
    shard_manager.shutdown_all().await;
}

async fn on_error(err: poise::FrameworkError<'_, Data, Error>) {
    match err {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to set up the bot: {error:#}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!(command = %ctx.command().qualified_name, "command failed: {error:#}");
            if let Err(e) = ctx.say("Something went wrong. Please try again later.").await {
                error!("Failed to report command error: {e}");
            }
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}
