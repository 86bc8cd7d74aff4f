use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{ProviderError, WeatherProvider};

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: Option<String>,
    url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: Option<String>, url: impl Into<String>) -> Self {
        Self {
            api_key,
            url: url.into(),
            http: Client::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMain {
    pub temp: f64,
    pub feels_like: f64,
    pub pressure: f64,
    pub humidity: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawWind {
    pub speed: f64,
    pub deg: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCondition {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Current-weather document as returned by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct RawWeather {
    pub main: RawMain,
    pub wind: RawWind,
    #[serde(default)]
    pub weather: Vec<RawCondition>,
    #[serde(default)]
    pub visibility: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OwErrorBody {
    #[serde(default)]
    message: Option<String>,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch(&self, place: &str, language: &str) -> Result<RawWeather, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::MissingCredential)?;

        let res = self
            .http
            .get(&self.url)
            .query(&[
                ("q", place),
                ("appid", api_key),
                ("lang", language),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| ProviderError::Transport(e.to_string()))?;

        if !status.is_success() {
            debug!(status = status.as_u16(), body = %truncate_body(&body), "provider rejected request");
            let message = serde_json::from_str::<OwErrorBody>(&body).ok().and_then(|b| b.message);
            return Err(ProviderError::Status { status: status.as_u16(), message });
        }

        serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn london() -> serde_json::Value {
        json!({
            "weather": [{ "id": 500, "main": "Rain", "description": "light rain", "icon": "10d" }],
            "main": { "temp": 15.2, "feels_like": 14.6, "pressure": 1012, "humidity": 80 },
            "visibility": 10000,
            "wind": { "speed": 4.1, "deg": 240 },
            "name": "London"
        })
    }

    async fn provider_for(server: &MockServer) -> OpenWeatherProvider {
        OpenWeatherProvider::new(Some("KEY".into()), format!("{}/data/2.5/weather", server.uri()))
    }

    #[tokio::test]
    async fn sends_place_token_language_and_metric_units() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("q", "London"))
            .and(query_param("appid", "KEY"))
            .and(query_param("lang", "en"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(london()))
            .expect(1)
            .mount(&server)
            .await;

        let raw = provider_for(&server).await.fetch("London", "en").await.expect("weather");

        assert_eq!(raw.main.temp, 15.2);
        assert_eq!(raw.main.humidity, 80);
        assert_eq!(raw.wind.deg, 240);
        assert_eq!(raw.visibility, Some(10000));
        assert_eq!(raw.weather[0].icon.as_deref(), Some("10d"));
    }

    #[tokio::test]
    async fn non_success_status_carries_provider_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"cod": "404", "message": "city not found"})),
            )
            .mount(&server)
            .await;

        let err = provider_for(&server).await.fetch("Atlantis", "en").await.unwrap_err();

        assert_eq!(
            err,
            ProviderError::Status { status: 404, message: Some("city not found".into()) }
        );
    }

    #[tokio::test]
    async fn non_json_error_body_has_no_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let err = provider_for(&server).await.fetch("London", "en").await.unwrap_err();

        assert_eq!(err, ProviderError::Status { status: 503, message: None });
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"main": {}})))
            .mount(&server)
            .await;

        let err = provider_for(&server).await.fetch("London", "en").await.unwrap_err();

        assert!(matches!(err, ProviderError::Decode(_)));
    }

    #[tokio::test]
    async fn wind_without_direction_is_a_decode_error() {
        let server = MockServer::start().await;
        let mut body = london();
        body["wind"] = json!({ "speed": 4.1 });
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let err = provider_for(&server).await.fetch("London", "en").await.unwrap_err();

        assert!(matches!(err, ProviderError::Decode(ref msg) if msg.contains("deg")));
    }

    #[tokio::test]
    async fn missing_token_skips_the_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(london()))
            .expect(0)
            .mount(&server)
            .await;

        let provider = OpenWeatherProvider::new(None, server.uri());
        let err = provider.fetch("London", "en").await.unwrap_err();

        assert_eq!(err, ProviderError::MissingCredential);
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        let provider = OpenWeatherProvider::new(Some("KEY".into()), "http://127.0.0.1:9/weather");

        let err = provider.fetch("London", "en").await.unwrap_err();

        assert!(matches!(err, ProviderError::Transport(_)));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let long = "я".repeat(300);
        assert_eq!(truncate_body(&long).chars().count(), 200);
        assert_eq!(truncate_body("short"), "short");
    }
}
