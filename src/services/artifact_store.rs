//! src/services/artifact_store.rs
//!
//! ArtifactStore: short-lived, in-memory holding area for generated files
//! that a client fetches in a follow-up request. Entries are evicted only by
//! age: a sweep runs at the start of every batch insert and drops anything
//! older than the store's TTL. Nothing survives a restart.

use crate::models::artifact::{Artifact, ArtifactRef};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Default maximum age of an artifact.
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

const MAX_ID_LEN: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArtifactError {
    #[error("artifact `{0}` not found or expired")]
    NotFound(String),
}

pub type ArtifactResult<T> = Result<T, ArtifactError>;

/// Source of the current time, swappable in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// ArtifactStore keeps generated files addressable by id for a limited time.
///
/// One store is created per artifact family (split outputs, page images) and
/// shared through application state; clones share the same map.
#[derive(Clone)]
pub struct ArtifactStore {
    inner: Arc<ArtifactStoreInner>,
}

struct ArtifactStoreInner {
    /// Name used in logs, e.g. "split" or "images".
    name: &'static str,

    /// Live artifacts indexed by id.
    entries: RwLock<HashMap<String, Artifact>>,

    /// Discriminates ids created within the same timestamp tick.
    sequence: AtomicU64,

    ttl: chrono::Duration,

    clock: Arc<dyn Clock>,
}

impl fmt::Debug for ArtifactStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactStore")
            .field("name", &self.inner.name)
            .field("ttl", &self.inner.ttl)
            .field("len", &self.len())
            .finish()
    }
}

impl ArtifactStore {
    /// Create a store using wall-clock time.
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self::with_clock(name, ttl, Arc::new(SystemClock))
    }

    /// Create a store that reads the time from `clock`.
    pub fn with_clock(name: &'static str, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        Self {
            inner: Arc::new(ArtifactStoreInner {
                name,
                entries: RwLock::new(HashMap::new()),
                sequence: AtomicU64::new(0),
                ttl,
                clock,
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    /// Store `payload` under a fresh id and return that id.
    pub fn put(
        &self,
        filename: impl Into<String>,
        content_type: &'static str,
        payload: impl Into<Bytes>,
    ) -> String {
        let created_at = self.inner.clock.now();
        let id = self.next_id(created_at);
        let artifact = Artifact {
            id: id.clone(),
            filename: filename.into(),
            content_type,
            payload: payload.into(),
            created_at,
        };

        debug!(
            store = self.inner.name,
            id = %id,
            filename = %artifact.filename,
            bytes = artifact.payload.len(),
            "stored artifact"
        );
        self.inner.entries.write().insert(id.clone(), artifact);
        id
    }

    /// Sweep expired entries, then store every item in order.
    ///
    /// This is the entry point for operations that produce several files in
    /// one request.
    pub fn put_batch<I, N, P>(&self, content_type: &'static str, items: I) -> Vec<ArtifactRef>
    where
        I: IntoIterator<Item = (N, P)>,
        N: Into<String>,
        P: Into<Bytes>,
    {
        self.sweep(self.inner.clock.now());

        items
            .into_iter()
            .map(|(filename, payload)| {
                let filename = filename.into();
                let id = self.put(filename.clone(), content_type, payload);
                ArtifactRef { id, filename }
            })
            .collect()
    }

    /// Fetch an artifact by id.
    ///
    /// Age is not checked here; an entry past its TTL stays readable until
    /// the next sweep removes it.
    pub fn get(&self, id: &str) -> ArtifactResult<Artifact> {
        if !is_well_formed_id(id) {
            return Err(ArtifactError::NotFound(id.to_string()));
        }
        self.inner
            .entries
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| ArtifactError::NotFound(id.to_string()))
    }

    /// Remove every artifact older than the TTL at `now`. Returns how many
    /// entries were dropped.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let ttl = self.inner.ttl;
        let mut entries = self.inner.entries.write();
        let before = entries.len();
        entries.retain(|_, artifact| artifact.age(now) <= ttl);
        let removed = before - entries.len();

        if removed > 0 {
            debug!(
                store = self.inner.name,
                removed,
                remaining = entries.len(),
                "swept expired artifacts"
            );
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.inner.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `{micros}-{sequence}-{random}`: the timestamp orders ids, the sequence
    /// separates ids minted in the same microsecond, the random suffix makes
    /// them hard to guess.
    fn next_id(&self, now: DateTime<Utc>) -> String {
        let seq = self.inner.sequence.fetch_add(1, Ordering::Relaxed);
        let random = Uuid::new_v4().simple().to_string();
        format!("{}-{}-{}", now.timestamp_micros(), seq, &random[..12])
    }
}

/// Ids are only ever ASCII alphanumerics and dashes.
fn is_well_formed_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_ID_LEN
        && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}
