//! Single-slot time-limited cache for list endpoints.
//!
//! The slot lock is held only to read or replace the value, never across
//! the fetch itself. Two callers that miss at the same moment will both
//! fetch; the later result wins.

use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use crate::error::Result;

/// One cached value and the moment it was stored.
pub struct TtlCache<T> {
    ttl: Duration,
    slot: Mutex<Option<(T, Instant)>>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Fresh cached value, if any.
    pub fn get(&self) -> Option<T> {
        let slot = self.slot.lock();
        match slot.as_ref() {
            Some((value, stored)) if stored.elapsed() < self.ttl => Some(value.clone()),
            _ => None,
        }
    }

    /// Return the cached value, or run `fetch` and store its result.
    ///
    /// A failed fetch leaves the slot untouched.
    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(value) = self.get() {
            tracing::debug!("Cache hit");
            return Ok(value);
        }
        tracing::debug!("Cache miss, fetching");

        let value = fetch().await?;
        *self.slot.lock() = Some((value.clone(), Instant::now()));
        Ok(value)
    }
}
