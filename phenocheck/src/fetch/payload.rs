//! Request bodies for the observation services.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::FetchError;
use crate::periods::PeriodBatch;

/// A GeoJSON geometry drawn by the user.
///
/// Sent to the NDVI service untouched. Only the outer ring of a polygon is
/// ever read, to place the climate sample point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionOfInterest {
    /// GeoJSON geometry type, normally `Polygon`.
    #[serde(rename = "type")]
    pub geometry_type: String,
    /// Rings of positions; the first ring is the outer boundary.
    pub coordinates: Vec<Vec<Vec<f64>>>,
}

impl RegionOfInterest {
    /// Creates a polygon from its outer ring of `[lon, lat]` positions.
    #[must_use]
    pub fn polygon(outer_ring: Vec<[f64; 2]>) -> Self {
        Self {
            geometry_type: "Polygon".to_string(),
            coordinates: vec![outer_ring.into_iter().map(Vec::from).collect()],
        }
    }

    /// The outer ring, if any.
    #[must_use]
    pub fn outer_ring(&self) -> Option<&[Vec<f64>]> {
        self.coordinates.first().map(Vec::as_slice)
    }
}

/// Arithmetic mean of the outer ring's vertices, as `[lon, lat]`.
///
/// A closed ring repeats its first vertex, which is counted twice. This is
/// a sampling point for climate data, not a geometric centroid.
///
/// # Errors
///
/// Returns `FetchError::InvalidRegion` if the ring is empty or a position
/// has fewer than two values.
pub fn polygon_centroid(roi: &RegionOfInterest) -> Result<[f64; 2], FetchError> {
    let ring = roi
        .outer_ring()
        .filter(|r| !r.is_empty())
        .ok_or_else(|| FetchError::InvalidRegion("polygon has no outer ring".to_string()))?;

    let mut sum = [0.0_f64; 2];
    for position in ring {
        let [lon, lat, ..] = position.as_slice() else {
            return Err(FetchError::InvalidRegion(format!(
                "position {position:?} has fewer than two coordinates"
            )));
        };
        sum[0] += lon;
        sum[1] += lat;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = ring.len() as f64;
    Ok([sum[0] / n, sum[1] / n])
}

/// Body of the NDVI composite request.
///
/// Serializes as `{ "roi": ..., "start_date_period_1": ..., "end_date_period_1": ..., ... }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NdviRequest {
    /// Region to composite over.
    pub roi: RegionOfInterest,
    /// `start_date_period_<n>` / `end_date_period_<n>` fields.
    #[serde(flatten)]
    pub windows: BTreeMap<String, String>,
}

impl NdviRequest {
    /// Builds the request for every period in `batch`.
    #[must_use]
    pub fn new(roi: RegionOfInterest, batch: &PeriodBatch) -> Self {
        let mut windows = BTreeMap::new();
        for period in batch {
            let key = period.key();
            windows.insert(key.start_field(), period.start_iso());
            windows.insert(key.end_field(), period.end_iso());
        }
        Self { roi, windows }
    }

    /// Number of periods requested.
    #[must_use]
    pub fn period_count(&self) -> usize {
        self.windows.len() / 2
    }
}

/// A GeoJSON point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointGeometry {
    /// Always `Point`.
    #[serde(rename = "type")]
    pub geometry_type: String,
    /// `[lon, lat]`.
    pub coordinates: [f64; 2],
}

impl PointGeometry {
    /// Creates a point.
    #[must_use]
    pub fn new(coordinates: [f64; 2]) -> Self {
        Self {
            geometry_type: "Point".to_string(),
            coordinates,
        }
    }
}

/// Body of the climate statistics request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimateRequest {
    /// Where to sample.
    pub point: PointGeometry,
    /// `[start, end]` per period, in period order.
    pub date_periods: Vec<[String; 2]>,
}

impl ClimateRequest {
    /// Builds the request for `batch`, sampled at the centroid of `roi`.
    ///
    /// # Errors
    ///
    /// See [`polygon_centroid`].
    pub fn new(roi: &RegionOfInterest, batch: &PeriodBatch) -> Result<Self, FetchError> {
        Ok(Self {
            point: PointGeometry::new(polygon_centroid(roi)?),
            date_periods: batch.date_windows(),
        })
    }
}
