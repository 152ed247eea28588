//! Outcome of a catalog read.
//!
//! A read always says whether the data behind it is current, served from a
//! snapshot whose refresh just failed, or missing altogether. The
//! caller-facing list is then derived under the configured policy.

use chrono::{DateTime, Utc};
use gallery_core::{GalleryError, Painting};
use std::sync::Arc;

/// How a catalog read was satisfied.
#[derive(Debug, Clone)]
pub enum ReadOutcome {
    /// Served from a snapshot inside the staleness window, or freshly fetched.
    Fresh,
    /// The refresh failed; the last good snapshot exists.
    Stale { error: GalleryError },
    /// The refresh failed and nothing has ever been cached.
    Unavailable { error: GalleryError },
}

impl ReadOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadOutcome::Fresh => "fresh",
            ReadOutcome::Stale { .. } => "stale",
            ReadOutcome::Unavailable { .. } => "unavailable",
        }
    }

    pub fn error(&self) -> Option<&GalleryError> {
        match self {
            ReadOutcome::Fresh => None,
            ReadOutcome::Stale { error } | ReadOutcome::Unavailable { error } => Some(error),
        }
    }
}

/// Result of [`crate::CatalogCache::get`].
#[derive(Debug, Clone)]
pub struct CatalogRead {
    snapshot: Option<Arc<Vec<Painting>>>,
    fetched_at: Option<DateTime<Utc>>,
    outcome: ReadOutcome,
    was_cache_hit: bool,
    serve_stale: bool,
    loading: bool,
}

impl CatalogRead {
    pub(crate) fn from_cache(
        snapshot: Arc<Vec<Painting>>,
        fetched_at: DateTime<Utc>,
        serve_stale: bool,
    ) -> Self {
        Self {
            snapshot: Some(snapshot),
            fetched_at: Some(fetched_at),
            outcome: ReadOutcome::Fresh,
            was_cache_hit: true,
            serve_stale,
            loading: false,
        }
    }

    pub(crate) fn from_store(
        snapshot: Arc<Vec<Painting>>,
        fetched_at: DateTime<Utc>,
        serve_stale: bool,
    ) -> Self {
        Self {
            snapshot: Some(snapshot),
            fetched_at: Some(fetched_at),
            outcome: ReadOutcome::Fresh,
            was_cache_hit: false,
            serve_stale,
            loading: false,
        }
    }

    pub(crate) fn failed(
        previous: Option<(Arc<Vec<Painting>>, DateTime<Utc>)>,
        error: GalleryError,
        serve_stale: bool,
    ) -> Self {
        match previous {
            Some((snapshot, fetched_at)) => Self {
                snapshot: Some(snapshot),
                fetched_at: Some(fetched_at),
                outcome: ReadOutcome::Stale { error },
                was_cache_hit: false,
                serve_stale,
                loading: false,
            },
            None => Self {
                snapshot: None,
                fetched_at: None,
                outcome: ReadOutcome::Unavailable { error },
                was_cache_hit: false,
                serve_stale,
                loading: false,
            },
        }
    }

    pub(crate) fn with_loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    /// True when this read waited on the process's first fetch.
    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn outcome(&self) -> &ReadOutcome {
        &self.outcome
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self.outcome, ReadOutcome::Fresh)
    }

    /// True when no store query was issued for this read.
    pub fn was_cache_hit(&self) -> bool {
        self.was_cache_hit
    }

    /// When the data behind this read was fetched from the store.
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// The snapshot behind this read, regardless of policy.
    pub fn snapshot(&self) -> Option<&Arc<Vec<Painting>>> {
        self.snapshot.as_ref()
    }

    /// Paintings to show, newest first.
    ///
    /// A failed refresh yields an empty list unless stale serving is enabled,
    /// in which case the last good snapshot is returned.
    pub fn paintings(&self) -> Arc<Vec<Painting>> {
        match (&self.outcome, &self.snapshot) {
            (ReadOutcome::Fresh, Some(data)) => Arc::clone(data),
            (ReadOutcome::Stale { .. }, Some(data)) if self.serve_stale => Arc::clone(data),
            _ => Arc::new(Vec::new()),
        }
    }
}
