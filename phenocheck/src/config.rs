//! Configuration for analysis runs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::errors::PhenocheckError;

/// Endpoints of the observation services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Service root, without trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path of the NDVI composite endpoint.
    #[serde(default = "default_ndvi_path")]
    pub ndvi_path: String,
    /// Path of the climate statistics endpoint.
    #[serde(default = "default_climate_path")]
    pub climate_path: String,
    /// Extra headers sent with every request.
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

fn default_base_url() -> String {
    "https://map.silasogis.com".to_string()
}

fn default_ndvi_path() -> String {
    "/ndvi_composite".to_string()
}

fn default_climate_path() -> String {
    "/climate_stats".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            ndvi_path: default_ndvi_path(),
            climate_path: default_climate_path(),
            headers: HashMap::new(),
        }
    }
}

impl ApiConfig {
    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Full URL of the NDVI endpoint.
    #[must_use]
    pub fn ndvi_url(&self) -> String {
        join_url(&self.base_url, &self.ndvi_path)
    }

    /// Full URL of the climate endpoint.
    #[must_use]
    pub fn climate_url(&self) -> String {
        join_url(&self.base_url, &self.climate_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Settings for the analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Upper bound on the joint NDVI + climate fetch, in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_seconds: f64,
    /// Fail the run when observation keys match no period.
    #[serde(default)]
    pub strict_merge: bool,
    /// Service endpoints.
    #[serde(default)]
    pub api: ApiConfig,
}

fn default_fetch_timeout() -> f64 {
    120.0
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_seconds: default_fetch_timeout(),
            strict_merge: false,
            api: ApiConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fetch timeout.
    #[must_use]
    pub fn with_fetch_timeout(mut self, seconds: f64) -> Self {
        self.fetch_timeout_seconds = seconds;
        self
    }

    /// Sets strict merging.
    #[must_use]
    pub fn with_strict_merge(mut self, strict: bool) -> Self {
        self.strict_merge = strict;
        self
    }

    /// Sets the endpoints.
    #[must_use]
    pub fn with_api(mut self, api: ApiConfig) -> Self {
        self.api = api;
        self
    }

    /// The fetch timeout as a duration. Non-positive or non-finite values
    /// fall back to the default.
    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.fetch_timeout_seconds)
            .ok()
            .filter(|d| !d.is_zero())
            .unwrap_or_else(|| Duration::from_secs_f64(default_fetch_timeout()))
    }

    /// Parses a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `PhenocheckError::Serialization` on malformed JSON.
    pub fn from_json_str(json: &str) -> Result<Self, PhenocheckError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `PhenocheckError::Io` if the file cannot be read, or
    /// `PhenocheckError::Serialization` on malformed JSON.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PhenocheckError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "Loaded analysis config");
        Self::from_json_str(&raw)
    }
}
