use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{error::WeatherError, provider::ProviderId};

/// A cleaned, non-empty location typed by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherQuery {
    location: String,
}

impl WeatherQuery {
    /// Clean raw user input and reject it if nothing usable is left.
    pub fn parse(raw: &str) -> Result<Self, WeatherError> {
        let location = clean_location(raw);
        if location.is_empty() {
            return Err(WeatherError::EmptyLocation);
        }

        Ok(Self { location })
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

impl fmt::Display for WeatherQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.location)
    }
}

/// Keep letters, whitespace and `-`, then collapse whitespace runs.
pub fn clean_location(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_alphabetic() || c.is_whitespace() || *c == '-')
        .collect();

    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }

    pub fn speed_suffix(&self) -> &'static str {
        match self {
            Units::Metric => "m/s",
            Units::Imperial => "mph",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "metric" | "c" | "celsius" => Ok(Units::Metric),
            "imperial" | "f" | "fahrenheit" => Ok(Units::Imperial),
            _ => Err(format!("unknown units '{value}', expected 'metric' or 'imperial'")),
        }
    }
}

/// Current conditions as reported by a provider.
///
/// Temperatures and wind speed are expressed in `units`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResult {
    pub provider: ProviderId,
    pub location_name: String,
    pub country: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub condition: String,
    pub humidity_pct: u8,
    pub wind_speed: f64,
    pub icon_url: Option<String>,
    pub observation_time: DateTime<Utc>,
    pub units: Units,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_location_strips_symbols_and_digits() {
        assert_eq!(clean_location("  London!!! 123 "), "London");
        assert_eq!(clean_location("New   York"), "New York");
        assert_eq!(clean_location("Stratford-upon-Avon?"), "Stratford-upon-Avon");
    }

    #[test]
    fn clean_location_keeps_non_latin_letters() {
        assert_eq!(clean_location("Москва,  Россия"), "Москва Россия");
    }

    #[test]
    fn parse_rejects_input_without_letters() {
        assert!(matches!(WeatherQuery::parse("   "), Err(WeatherError::EmptyLocation)));
        assert!(matches!(WeatherQuery::parse("42 !!"), Err(WeatherError::EmptyLocation)));
    }

    #[test]
    fn parse_keeps_cleaned_location() {
        let query = WeatherQuery::parse(" paris, france ").expect("valid location");
        assert_eq!(query.location(), "paris france");
        assert_eq!(query.to_string(), "paris france");
    }

    #[test]
    fn units_parse_aliases() {
        assert_eq!(Units::try_from("Imperial"), Ok(Units::Imperial));
        assert_eq!(Units::try_from("c"), Ok(Units::Metric));
        assert!(Units::try_from("kelvin").is_err());
    }
}
