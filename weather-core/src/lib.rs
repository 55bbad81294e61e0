//! Core library for the weather Discord bot.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Abstraction over weather providers
//! - Shared domain models (queries, results, reports)
//! - The platform-independent weather command handler
//!
//! It is used by `weather-bot`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod handler;
pub mod model;
pub mod provider;
pub mod report;

pub use config::{Config, ProviderConfig, ProviderSettings, Settings};
pub use error::{ConfigError, WeatherError};
pub use handler::{Reply, handle_weather};
pub use model::{Units, WeatherQuery, WeatherResult};
pub use provider::{ProviderId, ProviderOptions, WeatherProvider, provider_from_settings};
pub use report::{ReportField, WeatherReport};
