//! Represents a generated output file pending download.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A generated file held in an [`ArtifactStore`](crate::services::artifact_store::ArtifactStore).
///
/// The payload is reference-counted, so handing a copy to a download
/// response does not duplicate the bytes.
#[derive(Clone, Debug)]
pub struct Artifact {
    /// Opaque token the client uses to fetch the file.
    pub id: String,

    /// Filename suggested to the client on download.
    pub filename: String,

    /// MIME type served with the payload.
    pub content_type: &'static str,

    /// Raw bytes of the generated file.
    pub payload: Bytes,

    /// When the artifact was inserted. Only the sweep looks at this.
    pub created_at: DateTime<Utc>,
}

impl Artifact {
    /// Age of the artifact relative to `now`.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.created_at
    }
}

/// `{id, filename}` pair returned by operations that produce several files.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ArtifactRef {
    pub id: String,
    pub filename: String,
}
