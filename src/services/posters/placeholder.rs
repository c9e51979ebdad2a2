use crate::{error::AppResult, services::posters::PosterProvider};

/// Provider used when no OMDb key is configured; never finds a poster
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderProvider;

#[async_trait::async_trait]
impl PosterProvider for PlaceholderProvider {
    async fn fetch_poster(&self, _title: &str) -> AppResult<Option<String>> {
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "placeholder"
    }
}
