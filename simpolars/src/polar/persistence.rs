//! Polar persistence as one JSON object per flap setting.
//!
//! Files are named `flaps{N}.json` and map the airspeed bucket (as a string
//! key) to the smoothed sink rate:
//!
//! ```json
//! { "25": -0.81, "26": -0.84 }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use super::{FlapIndex, PolarMap, PolarStore};
use crate::error::{Result, SimPolarsError};

/// Storage backend for captured polars.
pub trait Persistence {
    /// Write one polar, returning where it went.
    fn save(&self, flap: FlapIndex, map: &PolarMap) -> Result<PathBuf>;

    /// Read the given datasets. Unreadable or malformed ones are skipped.
    fn load(&self, paths: &[PathBuf]) -> Result<Vec<PolarMap>>;
}

/// File name used for a flap setting.
pub fn flap_file_name(flap: FlapIndex) -> String {
    format!("flaps{}.json", flap.get())
}

/// Reverse of [`flap_file_name`].
pub fn parse_flap_file_name(name: &str) -> Option<FlapIndex> {
    let index = name.strip_prefix("flaps")?.strip_suffix(".json")?;
    FlapIndex::new(index.parse().ok()?).ok()
}

/// Save every non-empty polar of `store`.
pub fn save_store(persistence: &dyn Persistence, store: &PolarStore) -> Result<Vec<PathBuf>> {
    store
        .non_empty()
        .map(|(flap, map)| persistence.save(flap, map))
        .collect()
}

/// JSON files in a single directory.
#[derive(Debug, Clone)]
pub struct JsonPolarFiles {
    directory: PathBuf,
}

impl JsonPolarFiles {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the file for `flap`.
    pub fn path_for(&self, flap: FlapIndex) -> PathBuf {
        self.directory.join(flap_file_name(flap))
    }

    /// Saved flap files present in the directory, ordered by flap.
    pub fn existing(&self) -> Result<Vec<(FlapIndex, PathBuf)>> {
        if !self.directory.exists() {
            return Ok(Vec::new());
        }
        let mut found = Vec::new();
        for entry in fs::read_dir(&self.directory)? {
            let path = entry?.path();
            let flap = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(parse_flap_file_name);
            if let Some(flap) = flap {
                found.push((flap, path));
            }
        }
        found.sort();
        Ok(found)
    }
}

impl Persistence for JsonPolarFiles {
    fn save(&self, flap: FlapIndex, map: &PolarMap) -> Result<PathBuf> {
        let path = self.path_for(flap);
        let failed = |source| SimPolarsError::PersistenceFailed {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.directory).map_err(failed)?;
        let json = serde_json::to_string_pretty(map)?;
        fs::write(&path, json).map_err(failed)?;

        tracing::info!(flap = %flap, path = %path.display(), points = map.len(), "Saved polar");
        Ok(path)
    }

    fn load(&self, paths: &[PathBuf]) -> Result<Vec<PolarMap>> {
        let mut datasets = Vec::with_capacity(paths.len());
        for path in paths {
            let text = match fs::read_to_string(path) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable polar file");
                    continue;
                }
            };
            match serde_json::from_str::<PolarMap>(&text) {
                Ok(map) => datasets.push(map),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping malformed polar file");
                }
            }
        }
        Ok(datasets)
    }
}
