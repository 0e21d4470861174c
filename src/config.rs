//! Runtime configuration: credentials and history locations.
//!
//! Nothing here is compiled in. The binary fills it from flags and
//! environment variables.

use std::path::PathBuf;

use url::Url;

/// History file used when none is configured.
pub const DEFAULT_HISTORY_PATH: &str = ".local-schema/history.json";

/// Place-lookup settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacesConfig {
    /// API key appended to lookup URLs as the `key` query parameter.
    pub api_key: Option<String>,
}

impl PlacesConfig {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    /// Add the API key to a lookup URL as the `key` query parameter.
    ///
    /// The URL is returned unchanged when no key is configured or it
    /// already carries one.
    pub fn authorize(&self, url: &Url) -> Url {
        let mut url = url.clone();
        if let Some(key) = self.api_key.as_deref() {
            if !url.query_pairs().any(|(name, _)| name == "key") {
                url.query_pairs_mut().append_pair("key", key);
            }
        }
        url
    }
}

/// Settings shared by the CLI commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub places: PlacesConfig,
    pub history_path: PathBuf,
    /// Remote history collection; local-only when unset.
    pub history_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            places: PlacesConfig::default(),
            history_path: PathBuf::from(DEFAULT_HISTORY_PATH),
            history_url: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn places_key(mut self, key: Option<String>) -> Self {
        self.places = PlacesConfig::new(key);
        self
    }

    pub fn history_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.history_path = path.into();
        self
    }

    pub fn history_url(mut self, url: Option<String>) -> Self {
        self.history_url = url.filter(|u| !u.trim().is_empty());
        self
    }
}
