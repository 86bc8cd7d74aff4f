use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Raw `GET /v1/weather` query, with the service defaults applied to absent
/// parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherQuery {
    #[serde(default)]
    pub place: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_lang")]
    pub lang: String,
    /// Only takes part in the cache key; the payload shape does not depend on it.
    #[serde(default = "default_json_flag")]
    pub json: String,
    #[serde(default)]
    pub theme: String,
    #[serde(default = "default_size")]
    pub size: String,
}

fn default_timezone() -> String {
    "Europe/Moscow".to_string()
}

fn default_lang() -> String {
    "ru".to_string()
}

fn default_json_flag() -> String {
    "false".to_string()
}

fn default_size() -> String {
    "big".to_string()
}

impl WeatherQuery {
    /// Query for `place` with every other parameter at its default.
    pub fn for_place(place: impl Into<String>) -> Self {
        Self {
            place: place.into(),
            timezone: default_timezone(),
            lang: default_lang(),
            json: default_json_flag(),
            theme: String::new(),
            size: default_size(),
        }
    }
}

/// Output representation requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Theme {
    /// Plain JSON body (empty `theme`).
    Plain,
    Default,
    City,
}

impl Theme {
    pub const ALLOWED: &'static [&'static str] = &["default", "city"];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "" => Some(Theme::Plain),
            "default" => Some(Theme::Default),
            "city" => Some(Theme::City),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Plain => "",
            Theme::Default => "default",
            Theme::City => "city",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageSize {
    #[default]
    Big,
    Small,
}

impl ImageSize {
    /// Anything other than `small` falls back to `big`.
    pub fn from_query(value: &str) -> Self {
        if value == "small" { ImageSize::Small } else { ImageSize::Big }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::Big => "big",
            ImageSize::Small => "small",
        }
    }

    /// Canvas dimensions of the pixel-city card.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            ImageSize::Big => (1024, 576),
            ImageSize::Small => (512, 288),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    /// °C
    pub temp: f64,
    /// °C
    pub feels_like: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    /// m/s
    pub speed: f64,
    /// Meteorological direction, 0..=359.
    pub deg: u16,
}

/// Canonical weather record handed to the renderers.
///
/// Every field is populated; a visibility the provider left out has already
/// been replaced with [`WeatherRecord::DEFAULT_VISIBILITY_M`].
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    pub temperature: Temperature,
    pub wind: Wind,
    /// Percent, 0..=100.
    pub humidity: u8,
    pub detailed_status: String,
    /// hPa
    pub pressure: f64,
    /// Meters.
    pub visibility: u32,
    /// Two-character icon code, e.g. `"01"`.
    pub icon: String,
}

impl WeatherRecord {
    pub const DEFAULT_VISIBILITY_M: u32 = 10_000;
}

/// Body returned for un-themed requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherJson {
    pub status: String,
    pub temp: f64,
    pub feels_like: f64,
    pub pressure: f64,
    pub visibility: u32,
    pub humidity: u8,
    pub wind: Wind,
    pub condition: String,
    pub icon: String,
}

impl From<&WeatherRecord> for WeatherJson {
    fn from(record: &WeatherRecord) -> Self {
        Self {
            status: "success".to_string(),
            temp: record.temperature.temp,
            feels_like: record.temperature.feels_like,
            pressure: record.pressure,
            visibility: record.visibility,
            humidity: record.humidity,
            wind: record.wind,
            condition: record.detailed_status.clone(),
            icon: record.icon.clone(),
        }
    }
}

/// Body produced for a request: PNG bytes for themed requests, JSON otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponsePayload {
    Png(Bytes),
    Json(WeatherJson),
}

impl ResponsePayload {
    pub fn content_type(&self) -> &'static str {
        match self {
            ResponsePayload::Png(_) => "image/png",
            ResponsePayload::Json(_) => "application/json",
        }
    }
}
