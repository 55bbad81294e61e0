use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf, time::Duration};

use crate::{
    error::ConfigError,
    model::Units,
    provider::{DEFAULT_TIMEOUT, ProviderId, ProviderOptions},
};

pub const DISCORD_BOT_TOKEN: &str = "DISCORD_BOT_TOKEN";
pub const WEATHER_API_KEY: &str = "WEATHER_API_KEY";
pub const WEATHER_PROVIDER: &str = "WEATHER_PROVIDER";
pub const WEATHER_UNITS: &str = "WEATHER_UNITS";
pub const WEATHER_LANG: &str = "WEATHER_LANG";
pub const WEATHER_TIMEOUT_SECS: &str = "WEATHER_TIMEOUT_SECS";
pub const BOT_PREFIX: &str = "BOT_PREFIX";

pub const DEFAULT_PREFIX: &str = "!";

/// Configuration for a single provider (e.g., API key).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderConfig {
    pub api_key: String,
}

/// Top-level configuration stored on disk.
///
/// Every value can be overridden from the environment, see [`Settings::resolve`].
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Optional default provider id, e.g. "openweather" or "weatherapi".
    pub default_provider: Option<String>,

    /// Example TOML:
    /// [providers.weatherapi]
    /// api_key = "..."
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    pub units: Option<Units>,
    pub language: Option<String>,
    pub timeout_secs: Option<u64>,
    pub prefix: Option<String>,
}

impl Config {
    /// Return the default provider as a strongly-typed ProviderId, if one is set.
    pub fn default_provider_id(&self) -> Result<Option<ProviderId>, ConfigError> {
        self.default_provider.as_deref().map(ProviderId::try_from).transpose()
    }

    /// Store default provider as string.
    pub fn set_default_provider(&mut self, id: ProviderId) {
        self.default_provider = Some(id.as_str().to_string());
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(path)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-bot", "weather-bot")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set/replace a provider API key; the first configured provider becomes the default.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        self.providers.insert(provider_id.as_str().to_string(), ProviderConfig { api_key });

        if self.default_provider.is_none() {
            self.default_provider = Some(provider_id.to_string());
        }
    }

    /// Returns API key for a provider, if present.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.providers.get(provider_id.as_str()).map(|cfg| cfg.api_key.as_str())
    }

    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        self.provider_api_key(provider_id).is_some()
    }
}

/// The provider to use and how to talk to it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub id: ProviderId,
    pub options: ProviderOptions,
}

/// Effective runtime settings: config file merged with the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub discord_token: Option<String>,
    pub provider: ProviderSettings,
    pub prefix: String,
}

impl Settings {
    /// Resolve settings for a one-off lookup. Only the API key is required.
    pub fn resolve<F>(file: &Config, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::resolve_inner(file, env, false)
    }

    /// Resolve settings for running the bot. Both the Discord token and the
    /// API key are required; all missing names are reported together.
    pub fn resolve_for_bot<F>(file: &Config, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::resolve_inner(file, env, true)
    }

    /// Resolve against the process environment.
    pub fn from_env(file: &Config, for_bot: bool) -> Result<Self, ConfigError> {
        Self::resolve_inner(file, process_env, for_bot)
    }

    fn resolve_inner<F>(file: &Config, env: F, need_token: bool) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| env(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        // Provider errors are reported only after every missing variable is known.
        let id = match var(WEATHER_PROVIDER) {
            Some(value) => ProviderId::try_from(value.as_str()),
            None => file.default_provider_id().map(Option::unwrap_or_default),
        };

        let discord_token = var(DISCORD_BOT_TOKEN);
        let api_key = var(WEATHER_API_KEY).or_else(|| {
            let id = id.as_ref().ok()?;
            file.provider_api_key(*id).map(str::to_owned)
        });

        let mut missing = Vec::new();
        if need_token && discord_token.is_none() {
            missing.push(DISCORD_BOT_TOKEN);
        }
        if api_key.is_none() {
            missing.push(WEATHER_API_KEY);
        }
        let Some(api_key) = api_key.filter(|_| missing.is_empty()) else {
            return Err(ConfigError::Missing(missing));
        };
        let id = id?;

        let units = match var(WEATHER_UNITS) {
            Some(value) => Units::try_from(value.as_str())
                .map_err(|reason| ConfigError::Invalid { name: WEATHER_UNITS, reason })?,
            None => file.units.unwrap_or_default(),
        };

        let timeout = match var(WEATHER_TIMEOUT_SECS) {
            Some(value) => parse_timeout(&value)?,
            None => file
                .timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
        };

        let mut options = ProviderOptions::new(api_key);
        options.units = units;
        options.timeout = timeout;
        if let Some(language) = var(WEATHER_LANG).or_else(|| file.language.clone()) {
            options.language = language;
        }

        let prefix = var(BOT_PREFIX)
            .or_else(|| file.prefix.clone())
            .unwrap_or_else(|| DEFAULT_PREFIX.to_string());

        Ok(Self { discord_token, provider: ProviderSettings { id, options }, prefix })
    }
}

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::Invalid {
            name: WEATHER_TIMEOUT_SECS,
            reason: format!("expected a positive number of seconds, got '{value}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderId;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn default_provider_id_is_none_when_not_set() {
        let cfg = Config::default();
        assert_eq!(cfg.default_provider_id(), Ok(None));
    }

    #[test]
    fn set_api_key_and_default_for_provider() {
        let mut cfg = Config::default();

        cfg.upsert_provider_api_key(ProviderId::OpenWeather, "OPEN_KEY".into());

        let default = cfg.default_provider_id().expect("default provider must parse");
        assert_eq!(default, Some(ProviderId::OpenWeather));

        let key = cfg.provider_api_key(ProviderId::OpenWeather);
        assert_eq!(key, Some("OPEN_KEY"));
        assert!(cfg.is_provider_configured(ProviderId::OpenWeather));
    }

    #[test]
    fn upsert_does_not_override_existing_default() {
        let mut cfg = Config::default();

        cfg.upsert_provider_api_key(ProviderId::OpenWeather, "OPEN_KEY".into());
        cfg.upsert_provider_api_key(ProviderId::WeatherApi, "WEATHER_KEY".into());

        assert_eq!(cfg.default_provider_id(), Ok(Some(ProviderId::OpenWeather)));
        assert!(cfg.is_provider_configured(ProviderId::WeatherApi));

        cfg.set_default_provider(ProviderId::WeatherApi);
        assert_eq!(cfg.default_provider_id(), Ok(Some(ProviderId::WeatherApi)));
    }

    #[test]
    fn config_parses_from_toml() {
        let cfg = Config::from_toml(
            r#"
            default_provider = "openweather"
            units = "imperial"
            prefix = "?"

            [providers.openweather]
            api_key = "FILE_KEY"
            "#,
        )
        .expect("valid toml");

        assert_eq!(cfg.units, Some(Units::Imperial));
        assert_eq!(cfg.provider_api_key(ProviderId::OpenWeather), Some("FILE_KEY"));
    }

    #[test]
    fn bot_requires_token_and_key() {
        let err = Settings::resolve_for_bot(&Config::default(), env_from(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing(vec![DISCORD_BOT_TOKEN, WEATHER_API_KEY]));
        assert!(err.to_string().contains("DISCORD_BOT_TOKEN, WEATHER_API_KEY"));
    }

    #[test]
    fn empty_values_count_as_missing() {
        let env = env_from(&[(DISCORD_BOT_TOKEN, "  "), (WEATHER_API_KEY, "key")]);
        let err = Settings::resolve_for_bot(&Config::default(), env).unwrap_err();
        assert_eq!(err, ConfigError::Missing(vec![DISCORD_BOT_TOKEN]));
    }

    #[test]
    fn lookup_only_needs_api_key() {
        let settings = Settings::resolve(&Config::default(), env_from(&[(WEATHER_API_KEY, "k")]))
            .expect("api key is enough");

        assert_eq!(settings.discord_token, None);
        assert_eq!(settings.provider.id, ProviderId::WeatherApi);
        assert_eq!(settings.provider.options.api_key, "k");
        assert_eq!(settings.provider.options.units, Units::Metric);
        assert_eq!(settings.provider.options.language, "en");
        assert_eq!(settings.provider.options.timeout, DEFAULT_TIMEOUT);
        assert_eq!(settings.prefix, "!");
    }

    #[test]
    fn environment_overrides_file() {
        let mut file = Config::default();
        file.upsert_provider_api_key(ProviderId::OpenWeather, "FILE_KEY".into());
        file.units = Some(Units::Imperial);
        file.prefix = Some("?".into());

        let env = env_from(&[
            (DISCORD_BOT_TOKEN, "token"),
            (WEATHER_PROVIDER, "WeatherAPI"),
            (WEATHER_API_KEY, "ENV_KEY"),
            (WEATHER_UNITS, "metric"),
            (WEATHER_LANG, "de"),
            (WEATHER_TIMEOUT_SECS, "3"),
        ]);
        let settings = Settings::resolve_for_bot(&file, env).unwrap();

        assert_eq!(settings.discord_token.as_deref(), Some("token"));
        assert_eq!(settings.provider.id, ProviderId::WeatherApi);
        assert_eq!(settings.provider.options.api_key, "ENV_KEY");
        assert_eq!(settings.provider.options.units, Units::Metric);
        assert_eq!(settings.provider.options.language, "de");
        assert_eq!(settings.provider.options.timeout, Duration::from_secs(3));
        assert_eq!(settings.prefix, "?");
    }

    #[test]
    fn api_key_falls_back_to_file_for_selected_provider() {
        let mut file = Config::default();
        file.upsert_provider_api_key(ProviderId::OpenWeather, "FILE_KEY".into());

        let settings = Settings::resolve(&file, env_from(&[])).unwrap();
        assert_eq!(settings.provider.id, ProviderId::OpenWeather);
        assert_eq!(settings.provider.options.api_key, "FILE_KEY");
    }

    #[test]
    fn missing_variables_win_over_unknown_provider() {
        let env = env_from(&[(WEATHER_PROVIDER, "darksky")]);
        let err = Settings::resolve_for_bot(&Config::default(), env).unwrap_err();
        assert_eq!(err, ConfigError::Missing(vec![DISCORD_BOT_TOKEN, WEATHER_API_KEY]));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let env = env_from(&[(WEATHER_API_KEY, "k"), (WEATHER_TIMEOUT_SECS, "0")]);
        let err = Settings::resolve(&Config::default(), env).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: WEATHER_TIMEOUT_SECS, .. }));

        let env = env_from(&[(WEATHER_API_KEY, "k"), (WEATHER_UNITS, "kelvin")]);
        let err = Settings::resolve(&Config::default(), env).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: WEATHER_UNITS, .. }));

        let env = env_from(&[(WEATHER_API_KEY, "k"), (WEATHER_PROVIDER, "darksky")]);
        let err = Settings::resolve(&Config::default(), env).unwrap_err();
        assert_eq!(err, ConfigError::UnknownProvider("darksky".into()));
    }
}
