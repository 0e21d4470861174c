//! Input loading from files, strings, and HTTP URLs.
//!
//! Forms and place records are plain JSON; both can come from a local
//! file, and place records can also be fetched from a lookup service.

use std::path::Path;

use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::address::PlaceRecord;
use crate::config::PlacesConfig;
use crate::error::LoadError;
use crate::form::FormState;

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
pub(crate) const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Load JSON from a file path.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist,
/// or `LoadError::InvalidJson` if the file isn't valid JSON.
pub fn load_json(path: &Path) -> Result<Value, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    load_json_str(&content)
}

/// Load JSON from a string.
///
/// # Errors
///
/// Returns `LoadError::InvalidJson` if the string isn't valid JSON.
pub fn load_json_str(content: &str) -> Result<Value, LoadError> {
    serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })
}

/// Load JSON from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default).
///
/// # Errors
///
/// Returns `LoadError::InvalidUrl` if the URL doesn't parse, or
/// `LoadError::NetworkError` if the request fails or the response
/// isn't valid JSON.
#[cfg(feature = "remote")]
pub fn load_json_url(url: &str) -> Result<Value, LoadError> {
    fetch_json(parse_url(url)?, url)
}

/// Fetch `target`, reporting failures against `shown`.
///
/// Error messages never contain `target`, which may carry credentials.
#[cfg(feature = "remote")]
fn fetch_json(target: Url, shown: &str) -> Result<Value, LoadError> {
    let network = |source: reqwest::Error| LoadError::NetworkError {
        url: shown.to_string(),
        source: source.without_url(),
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(network)?;

    client
        .get(target)
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.json())
        .map_err(network)
}

#[cfg(not(feature = "remote"))]
fn fetch_json(_target: Url, shown: &str) -> Result<Value, LoadError> {
    Err(LoadError::FileNotFound {
        path: std::path::PathBuf::from(shown),
    })
}

fn parse_url(url: &str) -> Result<Url, LoadError> {
    Url::parse(url).map_err(|source| LoadError::InvalidUrl {
        url: url.to_string(),
        source,
    })
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Load JSON from a file path or URL.
///
/// URL loading requires the `remote` feature.
pub fn load_json_auto(source: &str) -> Result<Value, LoadError> {
    if is_url(source) {
        fetch_json(parse_url(source)?, source)
    } else {
        load_json(Path::new(source))
    }
}

/// Load a form file.
///
/// Missing keys take their defaults; keys of the wrong type are an error.
pub fn load_form(source: &str) -> Result<FormState, LoadError> {
    let value = load_json_auto(source)?;
    parse_form(value)
}

/// Convert loaded JSON into a form.
pub fn parse_form(value: Value) -> Result<FormState, LoadError> {
    serde_json::from_value(value).map_err(|source| LoadError::InvalidForm { source })
}

/// Load a place record from a file or lookup URL.
///
/// URLs get the configured API key appended.
pub fn load_place(source: &str, places: &PlacesConfig) -> Result<PlaceRecord, LoadError> {
    let value = if is_url(source) {
        fetch_json(places.authorize(&parse_url(source)?), source)?
    } else {
        load_json(Path::new(source))?
    };
    parse_place(value)
}

/// Convert loaded JSON into a place record.
///
/// A details response wrapper (`{"result": {...}, "status": ...}`) is
/// unwrapped first.
pub fn parse_place(value: Value) -> Result<PlaceRecord, LoadError> {
    let value = match value {
        Value::Object(mut map) if map.get("result").is_some_and(Value::is_object) => {
            debug!(status = ?map.get("status"), "unwrapping place response");
            map.remove("result").unwrap_or(Value::Null)
        }
        other => other,
    };
    serde_json::from_value(value).map_err(|source| LoadError::InvalidPlace { source })
}
