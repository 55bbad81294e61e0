use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::{
    WeatherError,
    model::{WeatherQuery, WeatherResult},
};

use super::{ProviderId, ProviderOptions, WeatherProvider, truncate_body};

const BASE_URL: &str = "https://api.openweathermap.org";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    options: ProviderOptions,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(options: ProviderOptions) -> Result<Self, WeatherError> {
        let http = options.http_client()?;
        Ok(Self { options, http })
    }

    fn current_url(&self) -> String {
        let base = self.options.base_url.as_deref().unwrap_or(BASE_URL);
        format!("{}/data/2.5/weather", base.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize, Default)]
struct OwSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    #[serde(default)]
    sys: OwSys,
}

#[derive(Debug, Deserialize)]
struct OwErrorBody {
    message: String,
}

fn error_from_body(status: StatusCode, body: &str) -> WeatherError {
    if status == StatusCode::NOT_FOUND {
        return WeatherError::LocationNotFound;
    }

    match serde_json::from_str::<OwErrorBody>(body) {
        Ok(err) => WeatherError::Api { status: status.as_u16(), message: err.message },
        Err(_) => {
            debug!(
                status = status.as_u16(),
                body = %truncate_body(body),
                "OpenWeather error body is not JSON"
            );
            WeatherError::Status(status.as_u16())
        }
    }
}

fn icon_url(icon: &str) -> String {
    format!("https://openweathermap.org/img/wn/{icon}@2x.png")
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenWeather
    }

    async fn current(&self, query: &WeatherQuery) -> Result<WeatherResult, WeatherError> {
        let res = self
            .http
            .get(self.current_url())
            .query(&[
                ("q", query.location()),
                ("appid", self.options.api_key.as_str()),
                ("units", self.options.units.as_str()),
                ("lang", self.options.language.as_str()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        debug!(status = status.as_u16(), location = %query, "OpenWeather current response");

        if !status.is_success() {
            return Err(error_from_body(status, &body));
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body)?;

        let observation_time =
            DateTime::<Utc>::from_timestamp(parsed.dt, 0).unwrap_or_else(Utc::now);

        let (condition, icon) = parsed
            .weather
            .into_iter()
            .next()
            .map(|w| (w.description, w.icon))
            .unwrap_or_else(|| ("Unknown".to_string(), None));

        Ok(WeatherResult {
            provider: ProviderId::OpenWeather,
            location_name: parsed.name,
            country: parsed.sys.country,
            temperature: parsed.main.temp,
            feels_like: parsed.main.feels_like,
            condition,
            humidity_pct: parsed.main.humidity,
            wind_speed: parsed.wind.speed,
            icon_url: icon.as_deref().map(icon_url),
            observation_time,
            units: self.options.units,
        })
    }
}
