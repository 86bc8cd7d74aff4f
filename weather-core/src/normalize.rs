use thiserror::Error;

use crate::{
    model::{Temperature, WeatherRecord, Wind},
    provider::RawWeather,
};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NormalizeError {
    /// Renderers pick imagery by icon code, so a record without one is unusable.
    #[error("provider response has no weather icon")]
    MissingIcon,
}

/// Description of the first reported condition, `"Unknown"` when there is none.
pub fn detailed_status(raw: &RawWeather) -> String {
    raw.weather
        .first()
        .and_then(|w| w.description.clone())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Map a provider document onto a [`WeatherRecord`].
///
/// Values are copied as-is; rounding is left to whoever formats them.
pub fn normalize(raw: &RawWeather) -> Result<WeatherRecord, NormalizeError> {
    let icon: String = raw
        .weather
        .first()
        .and_then(|w| w.icon.as_deref())
        .filter(|icon| !icon.is_empty())
        .ok_or(NormalizeError::MissingIcon)?
        .chars()
        .take(2)
        .collect();

    Ok(WeatherRecord {
        temperature: Temperature { temp: raw.main.temp, feels_like: raw.main.feels_like },
        wind: Wind { speed: raw.wind.speed, deg: raw.wind.deg % 360 },
        humidity: raw.main.humidity,
        detailed_status: detailed_status(raw),
        pressure: raw.main.pressure,
        visibility: raw.visibility.unwrap_or(WeatherRecord::DEFAULT_VISIBILITY_M),
        icon,
    })
}
