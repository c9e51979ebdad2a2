use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Path of the CSV drama catalog
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// OMDb API key; without one every poster is the placeholder
    #[serde(default)]
    pub omdb_api_key: Option<String>,

    /// OMDb API base URL
    #[serde(default = "default_omdb_api_url")]
    pub omdb_api_url: String,

    /// Image returned whenever a poster cannot be resolved
    #[serde(default = "default_placeholder_image_url")]
    pub placeholder_image_url: String,

    /// Timeout applied to each poster lookup
    #[serde(default = "default_poster_timeout_secs")]
    pub poster_timeout_secs: u64,

    /// Redis connection URL; poster caching is disabled when unset
    #[serde(default)]
    pub redis_url: Option<String>,

    #[serde(default = "default_poster_cache_ttl_secs")]
    pub poster_cache_ttl_secs: u64,

    /// Neighbours returned when the query has no `top_n`
    #[serde(default = "default_top_n")]
    pub default_top_n: usize,

    #[serde(default = "default_max_top_n")]
    pub max_top_n: usize,

    /// Directory served for every path without an API route (the web UI)
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_catalog_path() -> String {
    "final_drama_dataset.csv".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    7860
}

fn default_omdb_api_url() -> String {
    "http://www.omdbapi.com".to_string()
}

fn default_placeholder_image_url() -> String {
    "https://via.placeholder.com/200".to_string()
}

fn default_poster_timeout_secs() -> u64 {
    5
}

fn default_poster_cache_ttl_secs() -> u64 {
    86400 // 1 day
}

fn default_top_n() -> usize {
    5
}

fn default_max_top_n() -> usize {
    50
}

fn default_static_dir() -> String {
    "static".to_string()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from an explicit set of variables
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        if config.default_top_n > config.max_top_n {
            anyhow::bail!(
                "DEFAULT_TOP_N ({}) must not exceed MAX_TOP_N ({})",
                config.default_top_n,
                config.max_top_n
            );
        }

        Ok(config)
    }

    /// Socket address the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
