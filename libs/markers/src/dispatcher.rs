use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tokio_util::task::TaskTracker;

use marker_api::{BatchTransport, MarkersEnvelope};

use crate::MarkersError;
use crate::buffer::EventBuffer;

// ═══════════════════════════════════════════════════════════════
//  Stats
// ═══════════════════════════════════════════════════════════════

/// Delivery counters. Failures are only logged, this is how they stay
/// visible to the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub batches_sent: u64,
    pub batches_failed: u64,
    pub markers_sent: u64,
    pub markers_lost: u64,
    pub markers_evicted: u64,
}

#[derive(Debug, Default)]
struct Counters {
    batches_sent: AtomicU64,
    batches_failed: AtomicU64,
    markers_sent: AtomicU64,
    markers_lost: AtomicU64,
}

/// Result of one `flush` call as seen by its initiator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Buffer was empty, no call issued.
    Empty,
    /// One send spawned carrying `markers` records.
    Dispatched { markers: usize },
}

// ═══════════════════════════════════════════════════════════════
//  Dispatcher
// ═══════════════════════════════════════════════════════════════

/// Drains the buffer and hands each batch to the transport on a detached
/// task. The outcome is logged there and never reaches the caller.
pub struct Dispatcher {
    buffer: Arc<EventBuffer>,
    transport: Arc<dyn BatchTransport>,
    runtime: Handle,
    tracker: TaskTracker,
    counters: Arc<Counters>,
}

impl Dispatcher {
    /// `runtime` is where sends are spawned; `flush` may then be called
    /// from any thread, inside the runtime or not.
    pub fn new(buffer: Arc<EventBuffer>, transport: Arc<dyn BatchTransport>, runtime: Handle) -> Self {
        Self {
            buffer,
            transport,
            runtime,
            tracker: TaskTracker::new(),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Drain and send. Returns once the send is spawned.
    ///
    /// The transport precondition is checked before draining: on a missing
    /// credential the records stay buffered and the error goes back to the
    /// initiator.
    pub fn flush(&self) -> Result<FlushOutcome, MarkersError> {
        self.transport.check_ready()?;

        let batch = self.buffer.drain_all();
        if batch.is_empty() {
            return Ok(FlushOutcome::Empty);
        }

        let count = batch.len();
        let envelope = MarkersEnvelope::new(batch);
        let transport = self.transport.clone();
        let counters = self.counters.clone();

        tracing::debug!(markers = count, "dispatching marker batch");
        self.tracker.spawn_on(
            async move {
                let started = Instant::now();
                match transport.send_batch(&envelope).await {
                    Ok(()) => {
                        counters.batches_sent.fetch_add(1, Ordering::Relaxed);
                        counters.markers_sent.fetch_add(count as u64, Ordering::Relaxed);
                        tracing::info!(
                            markers = count,
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            "sent markers"
                        );
                    }
                    Err(e) => {
                        counters.batches_failed.fetch_add(1, Ordering::Relaxed);
                        counters.markers_lost.fetch_add(count as u64, Ordering::Relaxed);
                        // No retry: the batch is dropped here.
                        tracing::error!(
                            markers = count,
                            kind = %e.kind(),
                            error = %e,
                            "error sending markers, batch dropped"
                        );
                    }
                }
            },
            &self.runtime,
        );

        Ok(FlushOutcome::Dispatched { markers: count })
    }

    /// Final drain at process teardown. The send is issued before this
    /// returns; completion is only guaranteed if the caller then awaits
    /// `wait_idle`.
    pub fn shutdown_flush(&self) -> Result<FlushOutcome, MarkersError> {
        let outcome = self.flush();
        self.tracker.close();
        outcome
    }

    /// Wait for in-flight sends, up to `timeout`. Returns `false` on timeout.
    ///
    /// Closes the tracker; sends spawned afterwards are still tracked and
    /// awaited by later calls.
    pub async fn wait_idle(&self, timeout: Duration) -> bool {
        self.tracker.close();
        tokio::time::timeout(timeout, self.tracker.wait()).await.is_ok()
    }

    /// Number of sends still running.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            batches_sent: self.counters.batches_sent.load(Ordering::Relaxed),
            batches_failed: self.counters.batches_failed.load(Ordering::Relaxed),
            markers_sent: self.counters.markers_sent.load(Ordering::Relaxed),
            markers_lost: self.counters.markers_lost.load(Ordering::Relaxed),
            markers_evicted: self.buffer.evicted(),
        }
    }
}
