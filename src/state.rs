//! Shared application state handed to every handler.

use crate::services::artifact_store::{ArtifactStore, Clock, SystemClock};
use chrono::{DateTime, Utc};
use std::{sync::Arc, time::Duration};

/// One artifact store per family of generated files, plus the clock used
/// for timestamps written into outputs.
#[derive(Clone)]
pub struct AppState {
    /// Outputs of `POST /api/split-pdf`.
    pub splits: ArtifactStore,
    /// Page images from `POST /api/pdf-to-jpg`.
    pub images: ArtifactStore,
    clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(artifact_ttl: Duration) -> Self {
        Self::with_clock(artifact_ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(artifact_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            splits: ArtifactStore::with_clock("split", artifact_ttl, clock.clone()),
            images: ArtifactStore::with_clock("images", artifact_ttl, clock.clone()),
            clock,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}
