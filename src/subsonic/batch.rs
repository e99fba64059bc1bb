//! Bounded fan-out for per-item mutations.
//!
//! Subsonic has no bulk form of some mutations (`setRating`), so each id is
//! sent separately. Ids are processed in chunks of `batch_size`: every
//! request in a chunk runs concurrently and the next chunk starts only when
//! the whole current chunk has finished.

use std::future::Future;

use futures::StreamExt;
use futures::stream::FuturesUnordered;

use crate::error::{Error, Result};

/// Apply `op` to every id, at most `batch_size` at a time.
///
/// A failure does not stop later chunks. The first error (in completion
/// order) is returned once every id has been attempted.
pub async fn for_each_batched<F, Fut>(ids: &[String], batch_size: usize, op: F) -> Result<()>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let batch_size = batch_size.max(1);
    let mut first_error: Option<Error> = None;
    let mut failures = 0usize;

    for chunk in ids.chunks(batch_size) {
        let mut pending: FuturesUnordered<_> = chunk.iter().cloned().map(&op).collect();
        while let Some(result) = pending.next().await {
            if let Err(e) = result {
                failures += 1;
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(err) => {
            tracing::warn!(failures, total = ids.len(), "Batched update partially failed: {}", err);
            Err(err)
        }
        None => Ok(()),
    }
}
