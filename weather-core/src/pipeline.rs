//! End-to-end handling of a weather request.
//!
//! validate → resolve language/timezone → cache lookup → on miss: fetch,
//! normalize, render, store.

use std::{fmt::Display, sync::Arc, time::Duration};
use tracing::{debug, error, info, warn};

use crate::{
    Config,
    cache::{CacheKey, ResponseCache},
    error::ApiError,
    language::{CityLanguage, provider_language},
    model::{ImageSize, ResponsePayload, Theme, WeatherQuery},
    normalize::normalize,
    provider::{WeatherProvider, provider_from_config},
    render::{self, RenderTarget, Renderer, ThemeRenderer},
    validate::{ValidationError, validate},
};

/// A validated request, ready for the cache and the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRequest {
    pub place: String,
    /// Language sent to the provider.
    pub language: String,
    pub target: RenderTarget,
    pub key: CacheKey,
}

/// Validate `query` and derive everything the rest of the pipeline needs.
pub fn resolve_request(query: &WeatherQuery) -> Result<ResolvedRequest, ValidationError> {
    let params = validate(&query.place, &query.lang, &query.theme, &query.timezone)?;
    let size = ImageSize::from_query(&query.size);

    let language = match params.theme {
        Theme::City => provider_language(&query.lang).unwrap_or("en").to_string(),
        Theme::Plain | Theme::Default => query.lang.clone(),
    };

    let target = match params.theme {
        Theme::Plain => RenderTarget::PlainJson,
        Theme::Default => {
            RenderTarget::DefaultImage { language: language.clone(), timezone: params.timezone }
        }
        Theme::City => {
            RenderTarget::CityImage { language: CityLanguage::from_code(&language), size }
        }
    };

    let key = CacheKey::new(
        &params.place,
        &language,
        &query.json,
        params.theme.as_str(),
        params.timezone.as_str(),
        size.as_str(),
    );

    Ok(ResolvedRequest { place: params.place, language, target, key })
}

/// Request orchestrator. Owns the provider, the renderer and the cache.
#[derive(Debug, Clone)]
pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
    renderer: Arc<dyn Renderer>,
    cache: ResponseCache,
}

impl WeatherService {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        renderer: Arc<dyn Renderer>,
        cache: ResponseCache,
    ) -> Self {
        Self { provider, renderer, cache }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            provider_from_config(config),
            Arc::new(ThemeRenderer::new(config.themes_dir.clone())),
            ResponseCache::new(Duration::from_secs(config.cache.ttl_secs), config.cache.max_entries),
        )
    }

    pub async fn handle(&self, query: &WeatherQuery) -> Result<ResponsePayload, ApiError> {
        let request = resolve_request(query).map_err(|err| {
            debug!(code = err.code.as_str(), message = %err.message, "rejected request");
            ApiError::from(err)
        })?;

        debug!(cache_key = %request.key, "resolved request");
        let ResolvedRequest { place, language, target, key } = request;

        let mut produced = false;
        let result = self
            .cache
            .get_or_try_insert_with(key, async {
                produced = true;
                self.produce(&place, &language, &target).await
            })
            .await;

        result.map_err(|err| if produced { err } else { joined_failure(&err) })
    }

    async fn produce(
        &self,
        place: &str,
        language: &str,
        target: &RenderTarget,
    ) -> Result<ResponsePayload, ApiError> {
        info!(place, language, "cache miss, querying provider");

        let raw = self
            .provider
            .fetch(place, language)
            .await
            .map_err(|err| report(ApiError::from_provider(&err, place), &err))?;

        let record = normalize(&raw).map_err(|err| report(ApiError::internal(&err), &err))?;

        render::dispatch(self.renderer.as_ref(), &record, target)
            .await
            .map_err(|err| report(ApiError::internal(&err), &err))
    }
}

/// Give a caller that waited on someone else's failed fetch its own error id.
fn joined_failure(shared: &ApiError) -> ApiError {
    let err = shared.reissued();
    if let (Some(error_id), Some(original_error_id)) = (&err.error_id, &shared.error_id) {
        warn!(%error_id, %original_error_id, code = err.code.as_str(), "request joined a failed fetch");
    }
    err
}

/// Log a failure under its error id.
fn report(err: ApiError, cause: &dyn Display) -> ApiError {
    let error_id = err.error_id.as_deref().unwrap_or_default();
    if err.status >= 500 {
        error!(error_id, code = err.code.as_str(), status = err.status, %cause, "request failed");
    } else {
        warn!(error_id, code = err.code.as_str(), status = err.status, %cause, "request failed");
    }
    err
}
