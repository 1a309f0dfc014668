//! Short-lived memoization of option lists.
//!
//! Entries are keyed by resource name and live for [`OPTIONS_TTL`]. The map
//! sits behind a mutex that is never held across an await point, so two
//! concurrent misses for the same key may both run their loader; the later
//! store wins.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::data::SelectOption;
use crate::error::Result;

pub const OPTIONS_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
struct CacheEntry {
    options:     Vec<SelectOption>,
    captured_at: Instant,
}

#[derive(Debug)]
pub struct OptionsCache {
    ttl:     Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl Default for OptionsCache {
    fn default() -> Self { Self::new() }
}

impl OptionsCache {
    pub fn new() -> Self { Self::with_ttl(OPTIONS_TTL) }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration { self.ttl }

    /// Returns the cached list for `key` while it is younger than the TTL,
    /// otherwise runs `loader` and stores what it returns.
    ///
    /// A failing loader leaves any existing entry untouched.
    pub async fn fetch<F, Fut>(&self, key: &str, loader: F) -> Result<Vec<SelectOption>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<SelectOption>>>,
    {
        if let Some(options) = self.fresh(key) {
            debug!(key, "options cache hit");
            return Ok(options);
        }

        debug!(key, "options cache miss");
        let options = loader().await?;

        self.lock().insert(
            key.to_string(),
            CacheEntry {
                options:     options.clone(),
                captured_at: Instant::now(),
            },
        );
        Ok(options)
    }

    /// Drops the entry for `key`. Returns whether one was present.
    pub fn invalidate(&self, key: &str) -> bool { self.lock().remove(key).is_some() }

    fn fresh(&self, key: &str) -> Option<Vec<SelectOption>> {
        self.lock()
            .get(key)
            .filter(|entry| entry.captured_at.elapsed() < self.ttl)
            .map(|entry| entry.options.clone())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
