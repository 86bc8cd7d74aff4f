use thiserror::Error;

use crate::{
    language::provider_language,
    model::Theme,
    timezone::{CanonicalTimezone, normalize_timezone},
};

/// Client-side request problems, detected before any network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationCode {
    PlaceNotFound,
    ThemeNotFound,
    LangNotSupported,
    TzNotSupported,
}

impl ValidationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationCode::PlaceNotFound => "place_not_found",
            ValidationCode::ThemeNotFound => "theme_not_found",
            ValidationCode::LangNotSupported => "lang_not_supported",
            ValidationCode::TzNotSupported => "tz_not_supported",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub code: ValidationCode,
    pub message: String,
}

impl ValidationError {
    fn new(code: ValidationCode, message: String) -> Self {
        Self { code, message }
    }
}

/// Parameters that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedParams {
    pub place: String,
    pub theme: Theme,
    pub timezone: CanonicalTimezone,
}

/// Check request parameters in order; the first failing rule wins.
///
/// 1. `place` must be non-empty after trimming.
/// 2. `theme` must be empty, `default` or `city`.
/// 3. The `city` theme needs a language from the provider language table.
/// 4. `raw_timezone` must normalize.
pub fn validate(
    place: &str,
    raw_lang: &str,
    theme: &str,
    raw_timezone: &str,
) -> Result<ValidatedParams, ValidationError> {
    let place = place.trim();
    if place.is_empty() {
        return Err(ValidationError::new(
            ValidationCode::PlaceNotFound,
            "`place` parameter is required and cannot be empty.".to_string(),
        ));
    }

    let theme = Theme::parse(theme).ok_or_else(|| {
        ValidationError::new(
            ValidationCode::ThemeNotFound,
            format!("Theme '{theme}' not found. Allowed: {}.", Theme::ALLOWED.join(", ")),
        )
    })?;

    if theme == Theme::City && provider_language(raw_lang).is_none() {
        return Err(ValidationError::new(
            ValidationCode::LangNotSupported,
            format!("Language '{raw_lang}' not supported for city theme."),
        ));
    }

    let timezone = normalize_timezone(raw_timezone).ok_or_else(|| {
        ValidationError::new(
            ValidationCode::TzNotSupported,
            format!("Timezone '{raw_timezone}' is not recognized."),
        )
    })?;

    Ok(ValidatedParams { place: place.to_string(), theme, timezone })
}
