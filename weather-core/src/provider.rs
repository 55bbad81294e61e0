use crate::{
    ConfigError, WeatherError, WeatherQuery, WeatherResult,
    config::ProviderSettings,
    model::Units,
    provider::{openweather::OpenWeatherProvider, weatherapi::WeatherApiProvider},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, time::Duration};

pub mod openweather;
pub mod weatherapi;

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    OpenWeather,
    #[default]
    WeatherApi,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::WeatherApi => "weatherapi",
        }
    }

    #[cfg(test)]
    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenWeather, ProviderId::WeatherApi]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = ConfigError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "openweather" => Ok(ProviderId::OpenWeather),
            "weatherapi" => Ok(ProviderId::WeatherApi),
            _ => Err(ConfigError::UnknownProvider(value.to_string())),
        }
    }
}

/// Everything a provider needs to issue requests.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderOptions {
    pub api_key: String,
    pub units: Units,
    pub language: String,
    pub timeout: Duration,
    /// Overrides the provider's public endpoint, e.g. for a mock server.
    pub base_url: Option<String>,
}

impl ProviderOptions {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            units: Units::default(),
            language: "en".to_string(),
            timeout: DEFAULT_TIMEOUT,
            base_url: None,
        }
    }

    fn http_client(&self) -> Result<reqwest::Client, WeatherError> {
        let client = reqwest::Client::builder().timeout(self.timeout).build()?;
        Ok(client)
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    /// Fetch current conditions with exactly one outbound request.
    async fn current(&self, query: &WeatherQuery) -> Result<WeatherResult, WeatherError>;
}

/// Construct the configured provider.
pub fn provider_from_settings(
    settings: &ProviderSettings,
) -> Result<Box<dyn WeatherProvider>, WeatherError> {
    let options = settings.options.clone();

    let boxed: Box<dyn WeatherProvider> = match settings.id {
        ProviderId::OpenWeather => Box::new(OpenWeatherProvider::new(options)?),
        ProviderId::WeatherApi => Box::new(WeatherApiProvider::new(options)?),
    };

    Ok(boxed)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
