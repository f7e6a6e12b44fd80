//! # Worker Pool
//!
//! Bounded fan-out used by the ICMP host sweep and the TCP port sweep.
//!
//! At most `limit` probes are in flight. The cancellation token is checked when a
//! task is about to be dispatched and again when it starts, so a stop request
//! prevents new probes while the ones already on the wire finish or time out.

use std::future::{Future, ready};
use std::pin::pin;

use futures::StreamExt;
use futures::stream;
use lanscout_common::config::MAX_WORKERS;
use tokio_util::sync::CancellationToken;

/// Hits in completion order, plus how many tasks finished and how many never ran.
#[derive(Debug)]
pub struct PoolOutcome<R> {
    pub results: Vec<R>,
    pub completed: usize,
    pub cancelled: usize,
}

#[derive(Debug, Clone)]
pub struct WorkerPool {
    limit: usize,
    cancel: CancellationToken,
    progress_every: usize,
}

impl WorkerPool {
    pub fn new(limit: usize, cancel: CancellationToken) -> Self {
        Self {
            limit: limit.clamp(1, MAX_WORKERS),
            cancel,
            progress_every: 0,
        }
    }

    /// Call the progress callback every `n` completions. `0` disables it.
    pub fn with_progress_every(mut self, n: usize) -> Self {
        self.progress_every = n;
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Runs `work` over `tasks`, keeping only the `Some` results.
    ///
    /// Tasks are pulled from the iterator as slots free up, so an address range
    /// is never collected up front. `total` only feeds progress and the skipped
    /// count.
    pub async fn run<I, R, F, Fut, P>(&self, tasks: I, total: usize, work: F, mut on_progress: P) -> PoolOutcome<R>
    where
        I: IntoIterator,
        F: Fn(I::Item) -> Fut,
        Fut: Future<Output = Option<R>>,
        P: FnMut(usize, usize),
    {
        let cancel = &self.cancel;
        let work = &work;

        let mut in_flight = pin!(
            stream::iter(tasks)
                .take_while(|_| ready(!cancel.is_cancelled()))
                .map(move |task| async move {
                    if cancel.is_cancelled() {
                        return None;
                    }
                    Some(work(task).await)
                })
                .buffer_unordered(self.limit)
        );

        let mut results = Vec::new();
        let mut completed = 0;
        while let Some(finished) = in_flight.next().await {
            let Some(hit) = finished else {
                continue;
            };
            completed += 1;
            results.extend(hit);
            if self.progress_every > 0 && completed % self.progress_every == 0 {
                on_progress(completed, total);
            }
        }

        PoolOutcome {
            results,
            completed,
            cancelled: total.saturating_sub(completed),
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
