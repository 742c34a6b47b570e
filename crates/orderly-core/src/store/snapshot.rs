//! JSON snapshots of every history.
//!
//! The CLI keeps state between invocations by exporting both repositories to
//! a snapshot file and importing it again on the next start.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    error::{OrderlyError, Result},
    models::{Order, User},
};

/// Every order and user history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub orders: Vec<Vec<Order>>,
    #[serde(default)]
    pub users: Vec<Vec<User>>,
}

impl Snapshot {
    /// Read a snapshot; a missing file yields `None`.
    ///
    /// # Errors
    ///
    /// Returns `OrderlyError::FileSystem` when the file cannot be read and
    /// `OrderlyError::Serialization` when it is not a valid snapshot.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(OrderlyError::FileSystem {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };
        debug!("loaded snapshot from {}", path.display());
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Write the snapshot, creating parent directories as needed.
    ///
    /// The file is written next to its destination and renamed into place.
    ///
    /// # Errors
    ///
    /// Returns `OrderlyError::FileSystem` on any I/O failure.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| OrderlyError::FileSystem {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let json = serde_json::to_string_pretty(self)?;
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, json).map_err(|e| OrderlyError::FileSystem {
            path: staging.clone(),
            source: e,
        })?;
        fs::rename(&staging, path).map_err(|e| OrderlyError::FileSystem {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!("saved snapshot to {}", path.display());
        Ok(())
    }

    /// Returns the default snapshot path following XDG Base Directory
    /// specification: `$XDG_DATA_HOME/orderly/state.json`.
    ///
    /// # Errors
    ///
    /// Returns `OrderlyError::XdgDirectory` when the directory cannot be
    /// determined or created.
    pub fn default_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("orderly")
            .place_data_file("state.json")
            .map_err(|e| OrderlyError::XdgDirectory(e.to_string()))
    }
}
