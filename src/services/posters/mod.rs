//! Poster image lookup
//!
//! Providers resolve a drama title to a poster URL. A lookup failure must never
//! fail a recommendation, so callers go through [`poster_or_placeholder`] or
//! [`fetch_posters`], which substitute the placeholder image for every error.

use std::sync::Arc;
use std::time::Duration;

use crate::error::AppResult;

pub mod omdb;
pub mod placeholder;

pub use omdb::OmdbProvider;
pub use placeholder::PlaceholderProvider;

/// Trait for poster image providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PosterProvider: Send + Sync {
    /// Look up the poster for a title
    ///
    /// `Ok(None)` means the provider answered but has no poster for the title.
    async fn fetch_poster(&self, title: &str) -> AppResult<Option<String>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Resolves a poster, falling back to `placeholder` on a miss, an error, or
/// when the whole lookup (cache read included) takes longer than `timeout`
pub async fn poster_or_placeholder(
    provider: &dyn PosterProvider,
    title: &str,
    placeholder: &str,
    timeout: Duration,
) -> String {
    match tokio::time::timeout(timeout, provider.fetch_poster(title)).await {
        Ok(Ok(Some(url))) => url,
        Ok(Ok(None)) => {
            tracing::debug!(title = %title, provider = provider.name(), "No poster found");
            placeholder.to_string()
        }
        Err(_) => {
            tracing::warn!(
                title = %title,
                provider = provider.name(),
                timeout_ms = timeout.as_millis() as u64,
                "Poster lookup timed out, using placeholder"
            );
            placeholder.to_string()
        }
        Ok(Err(e)) => {
            tracing::warn!(
                error = %e,
                title = %title,
                provider = provider.name(),
                "Poster lookup failed, using placeholder"
            );
            placeholder.to_string()
        }
    }
}

/// Fetch posters for several titles in parallel, one task per title
///
/// Results keep the order of `titles`. A failed or panicked task only
/// affects its own entry, which becomes the placeholder.
pub async fn fetch_posters(
    provider: Arc<dyn PosterProvider>,
    titles: Vec<String>,
    placeholder: &str,
    timeout: Duration,
) -> Vec<String> {
    let mut tasks = Vec::with_capacity(titles.len());

    for title in titles {
        let provider = Arc::clone(&provider);
        let placeholder = placeholder.to_string();
        let task = tokio::spawn(async move {
            poster_or_placeholder(provider.as_ref(), &title, &placeholder, timeout).await
        });
        tasks.push(task);
    }

    let mut posters = Vec::with_capacity(tasks.len());
    for task in tasks {
        match task.await {
            Ok(url) => posters.push(url),
            Err(e) => {
                tracing::error!(error = %e, "Poster task join error");
                posters.push(placeholder.to_string());
            }
        }
    }

    posters
}
