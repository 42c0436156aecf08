// ── Bounded worker pool ──
//
// Runs units of work on a `JoinSet` with at most `size` executing at
// once. Every unit's outcome is collected, including panics, which are
// reported as `CoreError::WorkerPanicked` for that unit alone. A failing
// unit never cancels its siblings.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::error;

use crate::error::CoreError;

/// Controllers processed at once.
pub const CONTROLLER_WORKERS: usize = 5;
/// Sites processed at once per controller.
pub const SITE_WORKERS: usize = 8;
/// Devices processed at once per site (or globally in the flat run).
pub const DEVICE_WORKERS: usize = 8;

/// Outcome of one unit, labelled for reporting.
#[derive(Debug)]
pub struct UnitResult<T> {
    pub unit: String,
    pub result: Result<T, CoreError>,
}

pub struct WorkerPool<T> {
    semaphore: Arc<Semaphore>,
    set: JoinSet<UnitResult<T>>,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// A pool running at most `size` units at once (minimum one).
    pub fn new(size: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(size.max(1))),
            set: JoinSet::new(),
        }
    }

    /// Queue a unit. It starts as soon as a worker slot frees up.
    pub fn spawn<F>(&mut self, unit: impl Into<String>, work: F)
    where
        F: Future<Output = Result<T, CoreError>> + Send + 'static,
    {
        let unit = unit.into();
        let semaphore = Arc::clone(&self.semaphore);
        self.set.spawn(async move {
            // The semaphore is never closed, so this only waits for a slot.
            let _permit = semaphore.acquire_owned().await.ok();
            let result = match AssertUnwindSafe(work).catch_unwind().await {
                Ok(result) => result,
                Err(_) => {
                    error!("Worker for {unit} panicked");
                    Err(CoreError::WorkerPanicked { unit: unit.clone() })
                }
            };
            UnitResult { unit, result }
        });
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Wait for every queued unit and return all outcomes in completion order.
    pub async fn join_all(mut self) -> Vec<UnitResult<T>> {
        let mut results = Vec::with_capacity(self.set.len());
        while let Some(joined) = self.set.join_next().await {
            match joined {
                Ok(unit) => results.push(unit),
                Err(e) => {
                    error!(error = %e, "worker task failed to join");
                    results.push(UnitResult {
                        unit: "worker task".into(),
                        result: Err(CoreError::WorkerPanicked {
                            unit: e.to_string(),
                        }),
                    });
                }
            }
        }
        results
    }
}
