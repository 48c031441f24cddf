//! Model artifact persistence
//!
//! An artifact directory holds three pretty-printed JSON files. They are
//! written under temporary names and renamed into place only after all
//! three were written. If a rename fails, the files already moved into
//! place are removed again, so a failed save never leaves new files next to
//! old ones. An interrupted save can still leave an incomplete directory,
//! which then fails to load as missing.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rsvp_spi::{ModelMetadata, Regressor, Result, RsvpError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use crate::regression::{LinearRegression, RandomForestRegressor};

pub const FOREST_FILE: &str = "forest_model.json";
pub const LINEAR_FILE: &str = "linear_model.json";
pub const METADATA_FILE: &str = "model_metadata.json";

/// Fitted models plus the metadata that ties them to the encoder
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    pub forest: RandomForestRegressor,
    pub linear: LinearRegression,
    pub metadata: ModelMetadata,
}

impl ModelArtifact {
    /// True when every artifact file is present in `dir`
    pub fn exists(dir: &Path) -> bool {
        [FOREST_FILE, LINEAR_FILE, METADATA_FILE]
            .iter()
            .all(|name| dir.join(name).is_file())
    }

    /// Write the artifact into `dir`, replacing any previous one
    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;

        let files = [
            (FOREST_FILE, to_json(&self.forest)?),
            (LINEAR_FILE, to_json(&self.linear)?),
            (METADATA_FILE, to_json(&self.metadata)?),
        ];

        let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(files.len());
        for (name, body) in &files {
            let tmp = dir.join(format!(".{}.tmp", name));
            if let Err(e) = fs::write(&tmp, body) {
                discard(staged.iter().map(|(done, _)| done.as_path()).chain([tmp.as_path()]));
                return Err(io_error(&tmp, e));
            }
            staged.push((tmp, dir.join(name)));
        }
        for (idx, (tmp, target)) in staged.iter().enumerate() {
            if let Err(e) = fs::rename(tmp, target) {
                let (moved, pending) = staged.split_at(idx);
                discard(
                    moved
                        .iter()
                        .map(|(_, done)| done.as_path())
                        .chain(pending.iter().map(|(left, _)| left.as_path())),
                );
                return Err(io_error(target, e));
            }
        }

        info!(
            dir = %dir.display(),
            version = %self.metadata.model_version,
            "model artifact saved"
        );
        Ok(())
    }

    /// Read an artifact back from `dir`
    pub fn load(dir: &Path) -> Result<Self> {
        let forest: RandomForestRegressor = read_json(&dir.join(FOREST_FILE))?;
        let linear: LinearRegression = read_json(&dir.join(LINEAR_FILE))?;
        let metadata: ModelMetadata = read_json(&dir.join(METADATA_FILE))?;

        if !forest.is_fitted() || !linear.is_fitted() {
            return Err(RsvpError::ArtifactMalformed {
                path: dir.display().to_string(),
                reason: "contains an unfitted model".to_string(),
            });
        }
        forest
            .validate()
            .map_err(|e| RsvpError::ArtifactMalformed {
                path: dir.join(FOREST_FILE).display().to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            forest,
            linear,
            metadata,
        })
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| RsvpError::Io(format!("cannot serialize artifact: {}", e)))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let body = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => RsvpError::ArtifactMissing {
            path: path.display().to_string(),
        },
        _ => io_error(path, e),
    })?;
    serde_json::from_str(&body).map_err(|e| RsvpError::ArtifactMalformed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn io_error(path: &Path, err: std::io::Error) -> RsvpError {
    RsvpError::Io(format!("{}: {}", path.display(), err))
}

fn discard<'a>(paths: impl IntoIterator<Item = &'a Path>) {
    for path in paths {
        let _ = fs::remove_file(path);
    }
}
