//! Crop reference store.
//!
//! A static table of crop profiles, each with an ordered list of growth
//! stages, their day-offset windows and expected NDVI ranges. The table is
//! loaded once and only read afterwards.

mod profile;
mod store;

pub use profile::{CropProfile, GrowthStage, NdviRange};
pub use store::{global_store, install_global_store, CropOption, CropStore};
