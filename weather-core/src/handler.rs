//! The weather command, independent of any chat platform.

use tracing::{info, warn};

use crate::{WeatherProvider, WeatherQuery, report::WeatherReport};

/// Outcome of one command invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Report(WeatherReport),
    Error(String),
}

impl Reply {
    #[cfg(test)]
    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_))
    }
}

/// Clean the location, ask the provider once and format the answer.
///
/// Never fails: every problem becomes a [`Reply::Error`] with a message fit
/// for the channel.
pub async fn handle_weather(provider: &dyn WeatherProvider, raw_location: &str) -> Reply {
    let query = match WeatherQuery::parse(raw_location) {
        Ok(query) => query,
        Err(err) => {
            info!(raw = raw_location, "rejected empty location");
            return Reply::Error(err.user_message());
        }
    };

    match provider.current(&query).await {
        Ok(result) => {
            info!(
                location = %query,
                provider = %provider.id(),
                temperature = result.temperature,
                "weather lookup succeeded"
            );
            Reply::Report(WeatherReport::from(&result))
        }
        Err(err) if err.is_user_error() => {
            info!(location = %query, "{err}");
            Reply::Error(err.user_message())
        }
        Err(err) => {
            warn!(location = %query, provider = %provider.id(), "weather lookup failed: {err}");
            Reply::Error(err.user_message())
        }
    }
}
