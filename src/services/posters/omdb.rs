//! OMDb poster provider
//!
//! Looks titles up with `GET {api_url}/?t=<title>&apikey=<key>` and reads the
//! `Poster` field. When a Redis cache is configured, answers (including
//! "no poster") are cached per lowercased title.

use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::CachedPoster,
    services::posters::PosterProvider,
};

/// OMDb marks absent fields with this value
const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Deserialize)]
struct OmdbResponse {
    #[serde(rename = "Poster")]
    poster: Option<String>,
    #[serde(rename = "Response")]
    response: Option<String>,
    #[serde(rename = "Error")]
    error: Option<String>,
}

impl OmdbResponse {
    fn poster_url(self) -> Option<String> {
        if self.response.as_deref() == Some("False") {
            tracing::debug!(error = ?self.error, "OMDb returned no match");
            return None;
        }
        self.poster
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty() && p != NOT_AVAILABLE)
    }
}

#[derive(Clone)]
pub struct OmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Option<Cache>,
    cache_ttl: u64,
}

impl OmdbProvider {
    pub fn new(api_key: String, api_url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache: None,
            cache_ttl: 0,
        })
    }

    /// Cache lookups in Redis for `ttl` seconds
    pub fn with_cache(mut self, cache: Cache, ttl: u64) -> Self {
        self.cache = Some(cache);
        self.cache_ttl = ttl;
        self
    }

    async fn fetch_from_api(&self, title: &str) -> AppResult<CachedPoster> {
        let url = format!("{}/", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("t", title), ("apikey", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "OMDb API returned status {}: {}",
                status, body
            )));
        }

        let response_text = response.text().await?;
        let parsed: OmdbResponse = serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                response = %response_text,
                "Failed to deserialize OMDb response"
            );
            AppError::ExternalApi(format!("Failed to parse OMDb response: {}", e))
        })?;

        let poster = parsed.poster_url();
        tracing::debug!(title = %title, found = poster.is_some(), "OMDb lookup completed");
        Ok(poster)
    }
}

#[async_trait::async_trait]
impl PosterProvider for OmdbProvider {
    async fn fetch_poster(&self, title: &str) -> AppResult<Option<String>> {
        match &self.cache {
            Some(cache) => cached!(
                cache,
                CacheKey::Poster(title.to_string()),
                self.cache_ttl,
                self.fetch_from_api(title)
            ),
            None => self.fetch_from_api(title).await,
        }
    }

    fn name(&self) -> &'static str {
        "omdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Option<String> {
        serde_json::from_str::<OmdbResponse>(json).unwrap().poster_url()
    }

    #[test]
    fn test_poster_url_found() {
        let json = r#"{"Title":"Crash Landing on You","Poster":"https://m.media-amazon.com/cloy.jpg","Response":"True"}"#;
        assert_eq!(
            parse(json),
            Some("https://m.media-amazon.com/cloy.jpg".to_string())
        );
    }

    #[test]
    fn test_poster_not_available() {
        let json = r#"{"Title":"Obscure","Poster":"N/A","Response":"True"}"#;
        assert_eq!(parse(json), None);
    }

    #[test]
    fn test_movie_not_found() {
        let json = r#"{"Response":"False","Error":"Movie not found!"}"#;
        assert_eq!(parse(json), None);
    }

    #[test]
    fn test_missing_poster_field() {
        assert_eq!(parse(r#"{"Title":"Vincenzo"}"#), None);
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let provider = OmdbProvider::new(
            "key".to_string(),
            "http://www.omdbapi.com/".to_string(),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(provider.api_url, "http://www.omdbapi.com");
        assert_eq!(provider.name(), "omdb");
        assert!(provider.cache.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_api_is_an_error() {
        let provider = OmdbProvider::new(
            "key".to_string(),
            "http://127.0.0.1:9".to_string(),
            Duration::from_millis(500),
        )
        .unwrap();
        assert!(provider.fetch_poster("Vincenzo").await.is_err());
    }
}
