//! Turning a [`WeatherResult`] into something a person reads.

use serde::Serialize;

use crate::model::WeatherResult;

/// Sky blue, used as the embed accent colour.
pub const REPORT_COLOUR: u32 = 0x87CEEB;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Platform-neutral reply. The bot renders it as an embed, the CLI as text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub title: String,
    pub description: String,
    pub colour: u32,
    pub thumbnail: Option<String>,
    pub fields: Vec<ReportField>,
    pub footer: String,
}

impl WeatherReport {
    pub fn to_plain_text(&self) -> String {
        let details = self
            .fields
            .iter()
            .map(|f| format!("{} {}", f.name.to_lowercase(), f.value))
            .collect::<Vec<_>>()
            .join(", ");

        format!("{}: {} ({details})", self.title, self.description)
    }
}

impl From<&WeatherResult> for WeatherReport {
    fn from(result: &WeatherResult) -> Self {
        let temp_unit = result.units.temperature_suffix();
        let speed_unit = result.units.speed_suffix();

        let title = if result.country.is_empty() {
            format!("Weather in {}", result.location_name)
        } else {
            format!("Weather in {}, {}", result.location_name, result.country)
        };

        let field = |name: &str, value: String| ReportField {
            name: name.to_string(),
            value,
            inline: true,
        };

        Self {
            title,
            description: format!("{}, {:.1}{temp_unit}", result.condition, result.temperature),
            colour: REPORT_COLOUR,
            thumbnail: result.icon_url.clone(),
            fields: vec![
                field("Feels like", format!("{:.1}{temp_unit}", result.feels_like)),
                field("Humidity", format!("{}%", result.humidity_pct)),
                field("Wind", format!("{:.1} {speed_unit}", result.wind_speed)),
            ],
            footer: format!(
                "Updated {} UTC · {}",
                result.observation_time.format("%Y-%m-%d %H:%M"),
                result.provider
            ),
        }
    }
}
