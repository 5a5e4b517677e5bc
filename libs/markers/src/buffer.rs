use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use marker_api::MarkerRecord;

// ═══════════════════════════════════════════════════════════════
//  EventBuffer
// ═══════════════════════════════════════════════════════════════

/// FIFO of pending markers shared by all producers and the flush path.
///
/// A single mutex guards both `append` and `drain_all`, so a racing append
/// either lands in the snapshot being drained or strictly after it.
///
/// With `max_records` set the buffer becomes a ring: the oldest record is
/// evicted when an append would exceed the bound.
#[derive(Debug)]
pub struct EventBuffer {
    records: Mutex<VecDeque<MarkerRecord>>,
    max_records: Option<usize>,
    evicted: AtomicU64,
}

impl EventBuffer {
    pub fn new(max_records: Option<usize>) -> Self {
        Self {
            records: Mutex::new(VecDeque::new()),
            max_records,
            evicted: AtomicU64::new(0),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<MarkerRecord>> {
        // Critical sections never leave the deque half-updated.
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append at the tail. Returns the buffered count observed inside the
    /// same critical section.
    pub fn append(&self, record: MarkerRecord) -> usize {
        let mut buf = self.lock();
        if let Some(max) = self.max_records {
            while buf.len() >= max {
                let Some(oldest) = buf.pop_front() else { break };
                self.evicted.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    marker_id = %oldest.id,
                    marker = %oldest.name,
                    max_records = max,
                    "marker buffer full, evicting oldest"
                );
            }
        }
        buf.push_back(record);
        buf.len()
    }

    /// Take every buffered record as one ordered snapshot.
    pub fn drain_all(&self) -> Vec<MarkerRecord> {
        let drained = std::mem::take(&mut *self.lock());
        Vec::from(drained)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Total records evicted by the bound since creation.
    pub fn evicted(&self) -> u64 {
        self.evicted.load(Ordering::Relaxed)
    }
}

impl Default for EventBuffer {
    fn default() -> Self {
        Self::unbounded()
    }
}
