use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::services::{PosterProvider, Recommender};

/// Shared application state
///
/// Everything here is built before the server starts and never mutated, so
/// handlers read it without locking.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub posters: Arc<dyn PosterProvider>,
    pub placeholder_image: Arc<str>,
    /// Upper bound on one poster lookup, cache read included
    pub poster_timeout: Duration,
    pub default_top_n: usize,
    pub max_top_n: usize,
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(
        recommender: Recommender,
        posters: Arc<dyn PosterProvider>,
        config: &Config,
    ) -> Self {
        Self {
            recommender: Arc::new(recommender),
            posters,
            placeholder_image: Arc::from(config.placeholder_image_url.as_str()),
            poster_timeout: Duration::from_secs(config.poster_timeout_secs),
            default_top_n: config.default_top_n,
            max_top_n: config.max_top_n,
            static_dir: PathBuf::from(&config.static_dir),
        }
    }
}
