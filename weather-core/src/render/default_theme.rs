use chrono::{DateTime, Utc};
use image::{
    Rgba, RgbaImage,
    imageops::{FilterType, overlay, resize},
};
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use rusttype::Scale;
use std::path::Path;

use super::{
    RenderError, capitalize, draw_baseline_text, encode_png, load_font, load_image, round_half_up,
};
use crate::{model::WeatherRecord, timezone::render_time_zone};

const WIDTH: u32 = 440;
const HEIGHT: u32 = 145;
const ICON_SIZE: u32 = 90;
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

#[derive(Debug)]
pub struct Labels {
    pub wind_dir: [&'static str; 8],
    pub pressure: &'static str,
    pub humidity: &'static str,
    pub visibility: &'static str,
    pub visibility_range: &'static str,
    pub at_the_moment: &'static str,
}

static EN: Labels = Labels {
    wind_dir: ["N", "NE", "E", "SE", "S", "SW", "W", "NW"],
    pressure: "mmHg",
    humidity: "Humidity",
    visibility: "Visibility",
    visibility_range: "km",
    at_the_moment: "At the moment",
};

static RU: Labels = Labels {
    wind_dir: ["С", "СВ", "В", "ЮВ", "Ю", "ЮЗ", "З", "СЗ"],
    pressure: "мм рт. ст.",
    humidity: "Влажность",
    visibility: "Видимость",
    visibility_range: "км",
    at_the_moment: "На данный момент",
};

/// Labels for `language`; anything without its own set uses English.
pub fn labels(language: &str) -> &'static Labels {
    if language.eq_ignore_ascii_case("ru") { &RU } else { &EN }
}

/// Index into an 8-point compass, `0` being north.
pub fn compass_index(deg: u16) -> usize {
    (round_half_up(f64::from(deg) / 45.0) % 8) as usize
}

/// One text item on the card: text, x, baseline y.
type TextLine = (String, i32, i32);

/// Text drawn at 16 px, in drawing order.
pub fn card_lines(weather: &WeatherRecord, labels: &Labels, clock: &str) -> Vec<TextLine> {
    let wind = format!(
        "{:.1}m/s {}",
        weather.wind.speed,
        labels.wind_dir[compass_index(weather.wind.deg)]
    );
    let pressure = format!("{} {}", round_half_up(weather.pressure / 1.333), labels.pressure);
    let humidity = format!("{}: {}%", labels.humidity, weather.humidity);
    let visibility_km = round_half_up(f64::from(weather.visibility) / 100.0) as f64 / 10.0;
    let visibility = format!("{}: {}{}", labels.visibility, visibility_km, labels.visibility_range);

    vec![
        (format!("{}°C", round_half_up(weather.temperature.temp)), 90, 55),
        (format!("fl: {}°C", round_half_up(weather.temperature.feels_like)), 90, 75),
        (wind, 210, 30),
        (pressure, 180, 50),
        (humidity, 180, 70),
        (visibility, 180, 90),
        (capitalize(&weather.detailed_status), 180, 110),
        (format!("{} {}", labels.at_the_moment, clock), 180, 130),
    ]
}

/// Draw the default card from the assets in `theme_dir`.
pub fn render(
    theme_dir: &Path,
    weather: &WeatherRecord,
    language: &str,
    timezone: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Vec<u8>, RenderError> {
    let zone = render_time_zone(timezone)
        .ok_or_else(|| RenderError::Timezone(timezone.unwrap_or_default().to_string()))?;

    let resources = theme_dir.join("resources");
    let font = load_font(&resources.join("manrope-bold.ttf"))?;
    let background = load_image(&resources.join("background.png"))?;
    let icon = load_image(&theme_dir.join("icons").join(format!("{}.png", weather.icon)))?;
    let wind_arrow = load_image(&resources.join("wind.png"))?;
    let line = load_image(&resources.join("line.png"))?;

    let mut canvas = RgbaImage::new(WIDTH, HEIGHT);
    overlay(&mut canvas, &resize(&background, WIDTH, HEIGHT, FilterType::Triangle), 0, 0);
    overlay(
        &mut canvas,
        &resize(&icon, ICON_SIZE, ICON_SIZE, FilterType::Triangle),
        0,
        i64::from(HEIGHT / 2) - i64::from(ICON_SIZE / 2),
    );

    // Arrow artwork points south; turn it to where the wind blows from.
    let theta = (180.0 - f32::from(weather.wind.deg)).to_radians();
    let arrow = rotate_about_center(&wind_arrow, theta, Interpolation::Bilinear, Rgba([0, 0, 0, 0]));
    overlay(&mut canvas, &arrow, 180, 15);
    overlay(&mut canvas, &line, 170, 8);

    let scale = Scale::uniform(16.0);
    for (text, x, y) in card_lines(weather, labels(language), &zone.format_clock(now)) {
        draw_baseline_text(&mut canvas, WHITE, x, y, scale, &font, &text);
    }
    draw_baseline_text(&mut canvas, WHITE, 5, HEIGHT as i32 - 5, Scale::uniform(10.0), &font, "by oarer");

    encode_png(canvas)
}
