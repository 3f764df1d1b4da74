//! Boundary with the NDVI and climate services.
//!
//! The core never talks to the network itself; an [`ObservationSource`]
//! does. The `http` feature provides one backed by `reqwest`.

#[cfg(feature = "http")]
mod http;
mod payload;
mod protocols;

#[cfg(feature = "http")]
pub use http::HttpObservationSource;
pub use payload::{polygon_centroid, ClimateRequest, NdviRequest, PointGeometry, RegionOfInterest};
#[cfg(test)]
pub use protocols::MockObservationSource;
pub use protocols::ObservationSource;
