//! State file handling for the binary.
//!
//! The service itself is in-memory; a [`Session`] seeds it from the state
//! file at startup and writes a fresh snapshot after each mutation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};
use orderly_core::{Service, ServiceBuilder, Snapshot};

/// Accountable of the root order created in a fresh state file.
pub const ROOT_ACCOUNTABLE: &str = "root@root.com";

/// A service bound to the state file it was loaded from.
pub struct Session {
    service: Service,
    state_file: PathBuf,
}

impl Session {
    /// Load the state file (or start empty) and build the service.
    pub fn open(state_file: Option<PathBuf>) -> Result<Self> {
        let state_file = match state_file {
            Some(path) => path,
            None => Snapshot::default_path().context("Failed to resolve default state file")?,
        };
        let snapshot = Snapshot::load(&state_file)
            .with_context(|| format!("Failed to load state from {}", state_file.display()))?;
        if snapshot.is_none() {
            info!("no state at {}, starting fresh", state_file.display());
        }

        let service = ServiceBuilder::new()
            .with_snapshot(snapshot)
            .with_root_order(ROOT_ACCOUNTABLE)
            .build()
            .context("Failed to initialize service")?;

        Ok(Self {
            service,
            state_file,
        })
    }

    pub fn service(&self) -> &Service {
        &self.service
    }

    pub fn state_file(&self) -> &Path {
        &self.state_file
    }

    /// Persist every history to the state file.
    pub fn save(&self) -> Result<()> {
        self.service
            .snapshot()
            .and_then(|snapshot| snapshot.save(&self.state_file))
            .with_context(|| format!("Failed to save state to {}", self.state_file.display()))?;
        debug!("saved state to {}", self.state_file.display());
        Ok(())
    }
}
