use axum::{
    Extension, Json, Router,
    body::Body,
    extract::{Query, rejection::QueryRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;
use weather_core::{ApiError, ResponsePayload, WeatherQuery, WeatherService};

const GREETING: &str = "Hi!\nThis API was created by: https://github.com/oarer\n\nDocs: https://github.com/oarer/weatherapi";

/// Build the HTTP router around a shared [`WeatherService`].
pub fn router(service: Arc<WeatherService>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/v1/weather", get(weather_handler))
        .fallback(not_found_handler)
        .layer(Extension(service))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
}

async fn root_handler() -> &'static str {
    GREETING
}

async fn not_found_handler() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Oops...\nRoute not found")
}

async fn weather_handler(
    Extension(service): Extension<Arc<WeatherService>>,
    query: Result<Query<WeatherQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return error_response(&ApiError::invalid_query(rejection.body_text())),
    };

    match service.handle(&query).await {
        Ok(payload) => payload_response(payload),
        Err(err) => error_response(&err),
    }
}

fn payload_response(payload: ResponsePayload) -> Response {
    let headers = [(header::CONTENT_TYPE, payload.content_type())];

    match payload {
        ResponsePayload::Png(png) => (StatusCode::OK, headers, Body::from(png)).into_response(),
        ResponsePayload::Json(body) => (StatusCode::OK, headers, Json(body)).into_response(),
    }
}

fn error_response(err: &ApiError) -> Response {
    let status = StatusCode::from_u16(err.status).unwrap_or(StatusCode::BAD_GATEWAY);
    (status, Json(err.body())).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{body::to_bytes, http::Request};
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;
    use weather_core::{
        CanonicalTimezone, ImageSize, ProviderError, RawWeather, RenderError, Renderer,
        ResponseCache, WeatherProvider, WeatherRecord, language::CityLanguage,
    };

    #[derive(Debug)]
    struct StubProvider {
        response: Result<Value, ProviderError>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl WeatherProvider for StubProvider {
        async fn fetch(&self, _place: &str, _language: &str) -> Result<RawWeather, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response
                .clone()
                .map(|body| serde_json::from_value(body).expect("stub body is raw weather"))
        }
    }

    #[derive(Debug)]
    struct StubRenderer;

    #[async_trait]
    impl Renderer for StubRenderer {
        async fn render_default(
            &self,
            _weather: &WeatherRecord,
            _language: &str,
            _timezone: &CanonicalTimezone,
        ) -> Result<Vec<u8>, RenderError> {
            Ok(b"\x89PNG default".to_vec())
        }

        async fn render_city(
            &self,
            _weather: &WeatherRecord,
            _language: CityLanguage,
            _size: ImageSize,
        ) -> Result<Vec<u8>, RenderError> {
            Ok(b"\x89PNG city".to_vec())
        }
    }

    fn london() -> Value {
        json!({
            "weather": [{ "description": "light rain", "icon": "10d" }],
            "main": { "temp": 15.2, "feels_like": 14.1, "pressure": 1008, "humidity": 80 },
            "wind": { "speed": 6.2, "deg": 250 },
            "visibility": 10000
        })
    }

    fn app(response: Result<Value, ProviderError>) -> (Router, Arc<StubProvider>) {
        let provider = Arc::new(StubProvider { response, calls: AtomicUsize::new(0) });
        let service = WeatherService::new(
            provider.clone(),
            Arc::new(StubRenderer),
            ResponseCache::new(ResponseCache::DEFAULT_TTL, 100),
        );
        (router(Arc::new(service)), provider)
    }

    async fn get(app: &Router, uri: &str) -> Response {
        app.clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("response")
    }

    async fn json_body(res: Response) -> Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    fn header_value<'a>(res: &'a Response, name: header::HeaderName) -> &'a str {
        res.headers().get(name).and_then(|v| v.to_str().ok()).unwrap_or_default()
    }

    #[tokio::test]
    async fn root_greets() {
        let (app, _) = app(Ok(london()));

        let res = get(&app, "/").await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(header_value(&res, header::CACHE_CONTROL), "no-store");

        let bytes = to_bytes(res.into_body(), usize::MAX).await.expect("body");
        assert!(String::from_utf8_lossy(&bytes).starts_with("Hi!"));
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let (app, _) = app(Ok(london()));

        let res = get(&app, "/v2/weather").await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(header_value(&res, header::CACHE_CONTROL), "no-store");
    }

    #[tokio::test]
    async fn malformed_query_is_a_json_bad_request() {
        let (app, provider) = app(Ok(london()));

        let res = get(&app, "/v1/weather?place=A&place=B").await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(header_value(&res, header::CONTENT_TYPE), "application/json");
        assert_eq!(header_value(&res, header::CACHE_CONTROL), "no-store");
        let body = json_body(res).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["code"], "invalid_query");
        assert!(body["message"].as_str().is_some_and(|m| m.contains("place")));
        assert!(body.get("error_id").is_none());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn plain_request_returns_json() {
        let (app, _) = app(Ok(london()));

        let res = get(&app, "/v1/weather?place=London&theme=&lang=en").await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(header_value(&res, header::CONTENT_TYPE), "application/json");
        assert_eq!(header_value(&res, header::CACHE_CONTROL), "no-store");

        let body = json_body(res).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["humidity"], 80);
        assert_eq!(body["temp"], 15.2);
        assert_eq!(body["wind"]["speed"], 6.2);
    }

    #[tokio::test]
    async fn themed_request_returns_png() {
        let (app, _) = app(Ok(london()));

        let res = get(&app, "/v1/weather?place=London&theme=city&lang=en&size=small").await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(header_value(&res, header::CONTENT_TYPE), "image/png");
        assert_eq!(header_value(&res, header::CACHE_CONTROL), "no-store");
        let bytes = to_bytes(res.into_body(), usize::MAX).await.expect("body");
        assert_eq!(&bytes[..], b"\x89PNG city");
    }

    #[tokio::test]
    async fn empty_place_is_bad_request() {
        let (app, provider) = app(Ok(london()));

        let res = get(&app, "/v1/weather?place=").await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(header_value(&res, header::CACHE_CONTROL), "no-store");
        let body = json_body(res).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["code"], "place_not_found");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_place_is_bad_request() {
        let (app, _) = app(Ok(london()));

        let res = get(&app, "/v1/weather?lang=en").await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(res).await["code"], "place_not_found");
    }

    #[tokio::test]
    async fn unknown_theme_and_timezone_are_rejected() {
        let (app, _) = app(Ok(london()));

        let res = get(&app, "/v1/weather?place=London&theme=neon").await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(res).await["code"], "theme_not_found");

        let res = get(&app, "/v1/weather?place=London&timezone=Not/AZone").await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(res).await["code"], "tz_not_supported");
    }

    #[tokio::test]
    async fn provider_404_maps_to_place_not_found() {
        let (app, _) = app(Err(ProviderError::Status {
            status: 404,
            message: Some("city not found".into()),
        }));

        let res = get(&app, "/v1/weather?place=Atlantis").await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body = json_body(res).await;
        assert_eq!(body["code"], "place_not_found");
        assert!(body["error_id"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[tokio::test]
    async fn provider_status_is_forwarded() {
        let (app, _) = app(Err(ProviderError::Status { status: 429, message: None }));

        let res = get(&app, "/v1/weather?place=London").await;

        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(json_body(res).await["code"], "api_error");
    }

    #[tokio::test]
    async fn missing_credential_is_internal_error() {
        let (app, _) = app(Err(ProviderError::MissingCredential));

        let res = get(&app, "/v1/weather?place=London").await;

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(res).await;
        assert_eq!(body["code"], "internal_error");
        assert_eq!(body["error"], "API token is not set");
    }

    #[tokio::test]
    async fn parameter_order_does_not_split_the_cache() {
        let (app, provider) = app(Ok(london()));

        let first = get(&app, "/v1/weather?place=London&lang=en&theme=default").await;
        let second = get(&app, "/v1/weather?theme=default&lang=en&place=London").await;

        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(second.status(), StatusCode::OK);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }
}
