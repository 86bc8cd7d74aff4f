//! Timezone handling.
//!
//! Two rule sets live here and are kept apart on purpose:
//! [`normalize_timezone`] decides which zones a request may use and what goes
//! into the cache key; [`render_time_zone`] picks the zone used to stamp the
//! clock on a rendered card.

use chrono::{DateTime, FixedOffset, Utc};
use chrono_tz::Tz;
use std::fmt;

/// Zone accepted by [`normalize_timezone`]: an IANA name or an `Etc/GMT±N`
/// fixed-offset zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanonicalTimezone(Tz);

impl CanonicalTimezone {
    pub fn as_str(&self) -> &'static str {
        self.0.name()
    }

    pub fn tz(&self) -> Tz {
        self.0
    }
}

impl fmt::Display for CanonicalTimezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize a caller supplied timezone.
///
/// `UTC±N` (case and whitespace insensitive, sign optional) maps to the POSIX
/// style `Etc/GMT∓N` zone, so `UTC+3` becomes `Etc/GMT-3`. Anything else must
/// be a zone name known to the tz database, matched ignoring case and returned
/// in its canonical spelling.
pub fn normalize_timezone(raw: &str) -> Option<CanonicalTimezone> {
    let clean: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

    if let Some(hours) = parse_utc_hours(&clean.to_uppercase(), false) {
        let name = format!("Etc/GMT{:+}", -hours);
        return name.parse::<Tz>().ok().map(CanonicalTimezone);
    }

    Tz::from_str_insensitive(&clean).ok().map(CanonicalTimezone)
}

/// Parse `UTC` followed by a sign and one or two digits.
fn parse_utc_hours(value: &str, sign_required: bool) -> Option<i32> {
    let rest = value.strip_prefix("UTC")?;

    let (negative, digits) = match rest.as_bytes().first() {
        Some(b'+') => (false, &rest[1..]),
        Some(b'-') => (true, &rest[1..]),
        _ if sign_required => return None,
        _ => (false, rest),
    };

    if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hours: i32 = digits.parse().ok()?;
    Some(if negative { -hours } else { hours })
}

/// Zone used to print the current time on a card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderZone {
    Named(Tz),
    /// Raw hour offset from a literal `UTC±N`.
    Fixed(FixedOffset),
}

impl RenderZone {
    /// `HH:MM UTC±HH:MM` for `now` in this zone.
    pub fn format_clock(&self, now: DateTime<Utc>) -> String {
        match self {
            RenderZone::Named(tz) => now.with_timezone(tz).format("%H:%M UTC%:z").to_string(),
            RenderZone::Fixed(offset) => {
                now.with_timezone(offset).format("%H:%M UTC%:z").to_string()
            }
        }
    }
}

/// Resolve the zone for card time-stamping.
///
/// Absent or empty input means `Europe/Moscow`. A literal `UTC+N`/`UTC-N`
/// (upper case, sign required) is taken as a raw hour offset without any
/// `Etc/GMT` translation. Other input must be a tz database name.
pub fn render_time_zone(tz: Option<&str>) -> Option<RenderZone> {
    let tz = match tz {
        None | Some("") => return Some(RenderZone::Named(chrono_tz::Europe::Moscow)),
        Some(tz) => tz,
    };

    if let Some(hours) = parse_utc_hours(tz, true) {
        return FixedOffset::east_opt(hours * 3600).map(RenderZone::Fixed);
    }

    tz.parse::<Tz>().ok().map(RenderZone::Named)
}
