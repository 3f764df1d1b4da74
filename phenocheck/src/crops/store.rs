//! Read-only crop reference table.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use super::profile::CropProfile;
use crate::errors::{LookupError, PhenocheckError, ValidationError};

/// Reference table bundled with the crate.
const BUNDLED_TABLE: &str = include_str!("../../data/phenology_database.json");

/// On-disk document shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CropDocument {
    #[serde(alias = "culturas")]
    crops: Vec<CropProfile>,
}

/// A `(id, display name)` pair for crop selection menus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropOption {
    /// Crop identifier.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Immutable table of crop profiles keyed by identifier.
///
/// Profiles keep the order in which they were loaded.
#[derive(Debug, Clone, Default)]
pub struct CropStore {
    profiles: Vec<CropProfile>,
    index: HashMap<String, usize>,
}

impl CropStore {
    /// Builds a store from profiles, validating each one.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidProfile` for a profile that breaks
    /// its invariants or repeats an earlier id.
    pub fn from_profiles(profiles: Vec<CropProfile>) -> Result<Self, ValidationError> {
        let mut index = HashMap::with_capacity(profiles.len());
        for (position, profile) in profiles.iter().enumerate() {
            profile.validate()?;
            if index.insert(profile.id.clone(), position).is_some() {
                return Err(ValidationError::invalid_profile(
                    profile.id.clone(),
                    "duplicate crop id",
                ));
            }
        }
        Ok(Self { profiles, index })
    }

    /// Parses a reference document from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, PhenocheckError> {
        let document: CropDocument = serde_json::from_str(json)?;
        Ok(Self::from_profiles(document.crops)?)
    }

    /// Parses a reference document from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, PhenocheckError> {
        let document: CropDocument = serde_json::from_reader(reader)?;
        Ok(Self::from_profiles(document.crops)?)
    }

    /// Loads a reference document from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PhenocheckError> {
        let file = std::fs::File::open(path.as_ref())?;
        let store = Self::from_reader(std::io::BufReader::new(file))?;
        tracing::debug!(
            path = %path.as_ref().display(),
            crop_count = store.len(),
            "Loaded crop reference table"
        );
        Ok(store)
    }

    /// Loads the table that ships with the crate.
    pub fn bundled() -> Result<Self, PhenocheckError> {
        Self::from_json_str(BUNDLED_TABLE)
    }

    /// Gets a profile by id.
    #[must_use]
    pub fn get(&self, crop_id: &str) -> Option<&CropProfile> {
        self.index.get(crop_id).map(|&i| &self.profiles[i])
    }

    /// Gets a profile by id, failing if it is unknown.
    ///
    /// # Errors
    ///
    /// Returns `LookupError` if no profile has this id. No fallback crop is
    /// substituted.
    pub fn require(&self, crop_id: &str) -> Result<&CropProfile, LookupError> {
        self.get(crop_id).ok_or_else(|| LookupError::new(crop_id))
    }

    /// Returns true if a profile with this id exists.
    #[must_use]
    pub fn contains(&self, crop_id: &str) -> bool {
        self.index.contains_key(crop_id)
    }

    /// Iterates profiles in load order.
    pub fn iter(&self) -> impl Iterator<Item = &CropProfile> {
        self.profiles.iter()
    }

    /// Lists crops for a selection menu.
    #[must_use]
    pub fn options(&self) -> Vec<CropOption> {
        self.profiles
            .iter()
            .map(|p| CropOption {
                id: p.id.clone(),
                name: p.name.clone(),
            })
            .collect()
    }

    /// Number of profiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Returns true if the store has no profiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

// Process-wide store, set once.
static GLOBAL_STORE: RwLock<Option<Arc<CropStore>>> = RwLock::new(None);

/// Gets the process-wide crop store, loading the bundled table on first use.
pub fn global_store() -> Result<Arc<CropStore>, PhenocheckError> {
    let read = GLOBAL_STORE.read();
    if let Some(ref store) = *read {
        return Ok(Arc::clone(store));
    }
    drop(read);

    let mut write = GLOBAL_STORE.write();
    if let Some(ref store) = *write {
        return Ok(Arc::clone(store));
    }
    let store = Arc::new(CropStore::bundled()?);
    *write = Some(Arc::clone(&store));
    Ok(store)
}

/// Installs the process-wide crop store.
///
/// Intended for startup, when the reference table comes from an external
/// file. Once a store is in place it is never replaced; the rejected store
/// is handed back.
pub fn install_global_store(store: CropStore) -> Result<Arc<CropStore>, CropStore> {
    let mut write = GLOBAL_STORE.write();
    if write.is_some() {
        return Err(store);
    }
    let store = Arc::new(store);
    *write = Some(Arc::clone(&store));
    Ok(store)
}
