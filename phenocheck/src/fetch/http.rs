//! `reqwest` client for the observation services.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::payload::{ClimateRequest, NdviRequest};
use super::protocols::ObservationSource;
use crate::config::ApiConfig;
use crate::errors::{FetchError, FetchTarget};
use crate::observations::{ClimateResponse, NdviResponse};

/// Posts requests to the configured NDVI and climate endpoints.
#[derive(Debug, Clone)]
pub struct HttpObservationSource {
    http: reqwest::Client,
    api: ApiConfig,
}

impl HttpObservationSource {
    /// Creates a source with a default client.
    #[must_use]
    pub fn new(api: ApiConfig) -> Self {
        Self::with_client(reqwest::Client::new(), api)
    }

    /// Creates a source around an existing client.
    #[must_use]
    pub fn with_client(http: reqwest::Client, api: ApiConfig) -> Self {
        Self { http, api }
    }

    /// The endpoint configuration.
    #[must_use]
    pub fn api(&self) -> &ApiConfig {
        &self.api
    }

    async fn post_json<B, R>(&self, target: FetchTarget, url: &str, body: &B) -> Result<R, FetchError>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let mut request = self.http.post(url).json(body);
        for (name, value) in &self.api.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        tracing::debug!(%target, url, "Posting observation request");
        let response = request
            .send()
            .await
            .map_err(|e| FetchError::transport(target, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::transport(
                target,
                anyhow::anyhow!("HTTP {}: {}", status.as_u16(), body),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::transport(target, e))?;
        serde_json::from_slice(&bytes).map_err(|e| FetchError::decode(target, e.to_string()))
    }
}

#[async_trait]
impl ObservationSource for HttpObservationSource {
    async fn fetch_ndvi(&self, request: &NdviRequest) -> Result<NdviResponse, FetchError> {
        self.post_json(FetchTarget::Ndvi, &self.api.ndvi_url(), request)
            .await
    }

    async fn fetch_climate(&self, request: &ClimateRequest) -> Result<ClimateResponse, FetchError> {
        self.post_json(FetchTarget::Climate, &self.api.climate_url(), request)
            .await
    }
}
