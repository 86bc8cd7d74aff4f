use crate::{Config, provider::openweather::OpenWeatherProvider};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};
use thiserror::Error;

pub mod openweather;

pub use openweather::{RawCondition, RawMain, RawWeather, RawWind};

/// Failure of the outbound provider call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderError {
    #[error("API token is not set")]
    MissingCredential,

    /// The provider answered with a non-2xx status.
    #[error("provider responded with status {status}")]
    Status { status: u16, message: Option<String> },

    /// No HTTP response at all (DNS, connect, TLS, ...).
    #[error("provider request failed: {0}")]
    Transport(String),

    #[error("failed to decode provider response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch current conditions for `place`, with descriptions in `language`.
    async fn fetch(&self, place: &str, language: &str) -> Result<RawWeather, ProviderError>;
}

/// Construct the provider described by `config`.
///
/// A missing token is not an error here; the provider reports it on first use.
pub fn provider_from_config(config: &Config) -> Arc<dyn WeatherProvider> {
    Arc::new(OpenWeatherProvider::new(
        config.provider_token().map(str::to_owned),
        config.provider_url.clone(),
    ))
}
