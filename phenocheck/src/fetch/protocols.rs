//! The seam between analysis runs and the observation services.

use async_trait::async_trait;
use std::sync::Arc;

use super::payload::{ClimateRequest, NdviRequest};
use crate::errors::FetchError;
use crate::observations::{ClimateResponse, NdviResponse};

/// Supplies NDVI and climate observations for a period batch.
///
/// Implementations do a single attempt per call. Retrying, if any, belongs
/// to the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObservationSource: Send + Sync {
    /// Fetches per-period NDVI statistics.
    async fn fetch_ndvi(&self, request: &NdviRequest) -> Result<NdviResponse, FetchError>;

    /// Fetches per-period temperature and precipitation.
    async fn fetch_climate(&self, request: &ClimateRequest) -> Result<ClimateResponse, FetchError>;
}

#[async_trait]
impl<T: ObservationSource + ?Sized> ObservationSource for Arc<T> {
    async fn fetch_ndvi(&self, request: &NdviRequest) -> Result<NdviResponse, FetchError> {
        (**self).fetch_ndvi(request).await
    }

    async fn fetch_climate(&self, request: &ClimateRequest) -> Result<ClimateResponse, FetchError> {
        (**self).fetch_climate(request).await
    }
}
