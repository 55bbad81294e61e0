use poise::{CreateReply, serenity_prelude as serenity};
use weather_core::{Reply, WeatherReport, handle_weather};

use crate::bot::{Context, Data, Error};

pub fn list() -> Vec<poise::Command<Data, Error>> {
    vec![weather()]
}

/// Show the current weather for a city
#[poise::command(prefix_command, slash_command, broadcast_typing)]
pub async fn weather(
    ctx: Context<'_>,
    #[description = "City name, e.g. London"]
    #[rest]
    city: Option<String>,
) -> Result<(), Error> {
    // Slash commands must be acknowledged within three seconds
    ctx.defer().await?;

    let location = city.as_deref().unwrap_or_default();
    let reply = handle_weather(ctx.data().provider.as_ref(), location).await;
    ctx.send(render(reply)).await?;

    Ok(())
}

fn render(reply: Reply) -> CreateReply {
    match reply {
        Reply::Report(report) => CreateReply::default().embed(embed(&report)),
        Reply::Error(message) => CreateReply::default().content(message),
    }
}

fn embed(report: &WeatherReport) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new()
        .title(&report.title)
        .description(&report.description)
        .colour(report.colour)
        .fields(report.fields.iter().map(|f| (f.name.as_str(), f.value.as_str(), f.inline)))
        .footer(serenity::CreateEmbedFooter::new(&report.footer));

    if let Some(url) = &report.thumbnail {
        embed = embed.thumbnail(url);
    }

    embed
}
