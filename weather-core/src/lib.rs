//! Core library for the weather card service.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Request validation and timezone/language normalization
//! - The weather provider client and its error taxonomy
//! - The response cache and render dispatch (JSON or PNG cards)
//! - [`WeatherService`], which wires all of the above per request
//!
//! It is used by `weather-server`, but carries no HTTP server code itself.

pub mod cache;
pub mod config;
pub mod error;
pub mod language;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod provider;
pub mod render;
pub mod timezone;
pub mod validate;

pub use cache::{CacheKey, Clock, ManualClock, ResponseCache, SystemClock};
pub use config::{CacheConfig, Config};
pub use error::{ApiError, ErrorBody, ErrorCode};
pub use model::{ImageSize, ResponsePayload, Theme, WeatherJson, WeatherQuery, WeatherRecord};
pub use pipeline::{WeatherService, resolve_request};
pub use provider::{ProviderError, RawWeather, WeatherProvider};
pub use render::{RenderError, RenderTarget, Renderer, ThemeRenderer};
pub use timezone::{CanonicalTimezone, normalize_timezone, render_time_zone};
pub use validate::{ValidationError, validate};
