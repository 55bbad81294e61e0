use thiserror::Error;

/// Failures of a single weather lookup.
///
/// Every variant is recoverable: the bot turns it into a chat message via
/// [`WeatherError::user_message`].
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("location is empty after cleaning")]
    EmptyLocation,

    #[error("no matching location found")]
    LocationNotFound,

    #[error("provider returned an error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("provider request failed with HTTP {0}")]
    Status(u16),

    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("failed to parse provider response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The request URL carries the API key as a query parameter, so it is
/// dropped before the error can reach a log line.
impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        WeatherError::Network(err.without_url())
    }
}

impl WeatherError {
    /// Message shown to the person who ran the command.
    pub fn user_message(&self) -> String {
        match self {
            WeatherError::EmptyLocation => {
                "❌ Please enter a city name, e.g., !weather London".to_string()
            }
            WeatherError::LocationNotFound => {
                "City not found. Please check the spelling.".to_string()
            }
            WeatherError::Api { message, .. } => format!("API error: {message}"),
            WeatherError::Status(status) => format!("Request error: HTTP {status}"),
            WeatherError::Network(_) => "Network error. Please try again later.".to_string(),
            WeatherError::Parse(_) => "Error parsing API data.".to_string(),
        }
    }

    /// Whether the failure is the user's input rather than the provider.
    pub fn is_user_error(&self) -> bool {
        matches!(self, WeatherError::EmptyLocation | WeatherError::LocationNotFound)
    }
}

/// Invalid or missing startup configuration. Always fatal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "missing required configuration: {}. Set it in the environment or in a .env file.",
        .0.join(", ")
    )]
    Missing(Vec<&'static str>),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("unknown provider '{0}'. Supported providers: openweather, weatherapi.")]
    UnknownProvider(String),
}
