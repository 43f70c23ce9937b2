//! Progress notification between batch chunks
//!
//! Observers are invoked synchronously after each chunk. A failing or
//! panicking observer is logged and ignored; it never aborts the batch.

use serde::{Deserialize, Serialize};
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::warn;

/// Error returned by a progress observer.
pub type ObserverError = Box<dyn std::error::Error + Send + Sync>;

/// Snapshot emitted after each processed chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    /// Share of documents enriched so far, 0-100
    pub percentage: f64,
    /// Half-open range of corpus positions covered by this chunk
    pub chunk_range: (usize, usize),
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub message: String,
}

/// Receives progress after every chunk.
pub trait ProgressObserver {
    fn on_progress(&mut self, update: &ProgressUpdate) -> Result<(), ObserverError>;
}

impl<F> ProgressObserver for F
where
    F: FnMut(&ProgressUpdate) -> Result<(), ObserverError>,
{
    fn on_progress(&mut self, update: &ProgressUpdate) -> Result<(), ObserverError> {
        self(update)
    }
}

/// Logs each update at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl ProgressObserver for LoggingObserver {
    fn on_progress(&mut self, update: &ProgressUpdate) -> Result<(), ObserverError> {
        tracing::info!(
            chunk = update.chunk_index + 1,
            total = update.total_chunks,
            percentage = update.percentage,
            "{}",
            update.message
        );
        Ok(())
    }
}

/// Invoke `observer`, swallowing errors and panics.
///
/// Returns `false` when the observer failed.
pub(crate) fn notify(observer: &mut dyn ProgressObserver, update: &ProgressUpdate) -> bool {
    match catch_unwind(AssertUnwindSafe(|| observer.on_progress(update))) {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            warn!(chunk = update.chunk_index, error = %e, "progress observer failed");
            false
        }
        Err(_) => {
            warn!(chunk = update.chunk_index, "progress observer panicked");
            false
        }
    }
}
