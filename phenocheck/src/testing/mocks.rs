//! A scriptable observation source.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;

use crate::errors::{FetchError, FetchTarget};
use crate::fetch::{ClimateRequest, NdviRequest, ObservationSource};
use crate::observations::{ClimateResponse, NdviResponse};

/// Returns canned responses and records every request.
///
/// Either side can be set to fail, and both can be slowed down to exercise
/// timeouts.
#[derive(Debug, Default)]
pub struct FakeObservationSource {
    ndvi: Mutex<NdviResponse>,
    climate: Mutex<ClimateResponse>,
    ndvi_failure: Mutex<Option<String>>,
    climate_failure: Mutex<Option<String>>,
    delay: Mutex<Option<Duration>>,
    ndvi_requests: Mutex<Vec<NdviRequest>>,
    climate_requests: Mutex<Vec<ClimateRequest>>,
}

impl FakeObservationSource {
    /// Creates a source answering with empty responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the NDVI response.
    #[must_use]
    pub fn with_ndvi(self, response: NdviResponse) -> Self {
        *self.ndvi.lock() = response;
        self
    }

    /// Sets the climate response.
    #[must_use]
    pub fn with_climate(self, response: ClimateResponse) -> Self {
        *self.climate.lock() = response;
        self
    }

    /// Makes the NDVI fetch fail with a transport error.
    #[must_use]
    pub fn failing_ndvi(self, message: impl Into<String>) -> Self {
        *self.ndvi_failure.lock() = Some(message.into());
        self
    }

    /// Makes the climate fetch fail with a transport error.
    #[must_use]
    pub fn failing_climate(self, message: impl Into<String>) -> Self {
        *self.climate_failure.lock() = Some(message.into());
        self
    }

    /// Delays every response.
    #[must_use]
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock() = Some(delay);
        self
    }

    /// NDVI requests received so far.
    #[must_use]
    pub fn ndvi_requests(&self) -> Vec<NdviRequest> {
        self.ndvi_requests.lock().clone()
    }

    /// Climate requests received so far.
    #[must_use]
    pub fn climate_requests(&self) -> Vec<ClimateRequest> {
        self.climate_requests.lock().clone()
    }

    /// Total number of fetches issued.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.ndvi_requests.lock().len() + self.climate_requests.lock().len()
    }

    /// Clears recorded requests.
    pub fn reset(&self) {
        self.ndvi_requests.lock().clear();
        self.climate_requests.lock().clear();
    }

    async fn pause(&self) {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl ObservationSource for FakeObservationSource {
    async fn fetch_ndvi(&self, request: &NdviRequest) -> Result<NdviResponse, FetchError> {
        self.ndvi_requests.lock().push(request.clone());
        self.pause().await;
        let failure = self.ndvi_failure.lock().clone();
        match failure {
            Some(message) => Err(FetchError::transport(FetchTarget::Ndvi, anyhow::anyhow!(message))),
            None => Ok(self.ndvi.lock().clone()),
        }
    }

    async fn fetch_climate(&self, request: &ClimateRequest) -> Result<ClimateResponse, FetchError> {
        self.climate_requests.lock().push(request.clone());
        self.pause().await;
        let failure = self.climate_failure.lock().clone();
        match failure {
            Some(message) => Err(FetchError::transport(
                FetchTarget::Climate,
                anyhow::anyhow!(message),
            )),
            None => Ok(self.climate.lock().clone()),
        }
    }
}
