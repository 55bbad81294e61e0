use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{
    WeatherError,
    model::{Units, WeatherQuery, WeatherResult},
};

use super::{ProviderId, ProviderOptions, WeatherProvider, truncate_body};

const BASE_URL: &str = "https://api.weatherapi.com";

/// WeatherAPI.com reports an unknown `q` with this error code.
const NO_MATCHING_LOCATION: u32 = 1006;

#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    options: ProviderOptions,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(options: ProviderOptions) -> Result<Self, WeatherError> {
        let http = options.http_client()?;
        Ok(Self { options, http })
    }

    fn current_url(&self) -> String {
        let base = self.options.base_url.as_deref().unwrap_or(BASE_URL);
        format!("{}/v1/current.json", base.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    country: String,
    localtime_epoch: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    temp_f: f64,
    feelslike_c: f64,
    feelslike_f: f64,
    humidity: u8,
    wind_kph: f64,
    wind_mph: f64,
    condition: WaCondition,
    last_updated_epoch: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    location: WaLocation,
    current: WaCurrent,
}

#[derive(Debug, Deserialize)]
struct WaErrorBody {
    error: WaErrorDetail,
}

#[derive(Debug, Deserialize)]
struct WaErrorDetail {
    code: u32,
    message: String,
}

impl WaResponse {
    fn into_result(self, units: Units) -> WeatherResult {
        let current = self.current;
        let (temperature, feels_like, wind_speed) = match units {
            Units::Metric => (current.temp_c, current.feelslike_c, current.wind_kph / 3.6),
            Units::Imperial => (current.temp_f, current.feelslike_f, current.wind_mph),
        };

        let ts = current.last_updated_epoch.or(self.location.localtime_epoch);
        let observation_time = ts
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
            .unwrap_or_else(Utc::now);

        WeatherResult {
            provider: ProviderId::WeatherApi,
            location_name: self.location.name,
            country: self.location.country,
            temperature,
            feels_like,
            condition: current.condition.text,
            humidity_pct: current.humidity,
            wind_speed,
            icon_url: current.condition.icon.map(|icon| complete_icon_url(&icon)),
            observation_time,
            units,
        }
    }
}

/// Icons come back protocol-relative (`//cdn.weatherapi.com/...`).
fn complete_icon_url(icon: &str) -> String {
    if icon.starts_with("//") { format!("https:{icon}") } else { icon.to_string() }
}

fn api_error(status: u16, error: WaErrorDetail) -> WeatherError {
    if error.code == NO_MATCHING_LOCATION {
        WeatherError::LocationNotFound
    } else {
        WeatherError::Api { status, message: error.message }
    }
}

fn error_from_body(status: u16, body: &str) -> WeatherError {
    match serde_json::from_str::<WaErrorBody>(body) {
        Ok(WaErrorBody { error }) => api_error(status, error),
        Err(_) => {
            debug!(status, body = %truncate_body(body), "WeatherAPI error body is not JSON");
            WeatherError::Status(status)
        }
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::WeatherApi
    }

    async fn current(&self, query: &WeatherQuery) -> Result<WeatherResult, WeatherError> {
        let res = self
            .http
            .get(self.current_url())
            .query(&[
                ("key", self.options.api_key.as_str()),
                ("q", query.location()),
                ("lang", self.options.language.as_str()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        debug!(status = status.as_u16(), location = %query, "WeatherAPI current response");

        if !status.is_success() {
            return Err(error_from_body(status.as_u16(), &body));
        }

        // WeatherAPI occasionally reports errors with a 200 status.
        if let Ok(WaErrorBody { error }) = serde_json::from_str::<WaErrorBody>(&body) {
            return Err(api_error(status.as_u16(), error));
        }

        let parsed: WaResponse = serde_json::from_str(&body)?;
        Ok(parsed.into_result(self.options.units))
    }
}
