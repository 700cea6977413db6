/// Geography file drawn on the map.
pub const GEOJSON_URL: &str = "https://raw.githubusercontent.com/codeforamerica/click_that_hood/master/public/data/africa.geojson";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Settings fixed at build time.
///
/// The API key comes from `API_KEY` in the build environment or a `.env`
/// file next to `Cargo.toml` (see `build.rs`). `COLONY_ATLAS_MODEL` and
/// `COLONY_ATLAS_ENDPOINT` override the service defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub geojson_url: String,
}

impl AppConfig {
    pub fn from_build_env() -> Self {
        Self {
            api_key: option_env!("COLONY_ATLAS_API_KEY")
                .filter(|key| !key.trim().is_empty())
                .map(str::to_string),
            model: option_env!("COLONY_ATLAS_MODEL")
                .unwrap_or(DEFAULT_MODEL)
                .to_string(),
            endpoint: option_env!("COLONY_ATLAS_ENDPOINT")
                .unwrap_or(DEFAULT_ENDPOINT)
                .to_string(),
            geojson_url: GEOJSON_URL.to_string(),
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// URL of the `generateContent` method for the configured model.
    pub fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            geojson_url: GEOJSON_URL.to_string(),
        }
    }
}
