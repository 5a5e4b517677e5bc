use std::sync::{Mutex, PoisonError};
use std::time::Duration;

// ═══════════════════════════════════════════════════════════════
//  FlushPolicy
// ═══════════════════════════════════════════════════════════════

/// Dual trigger: buffered count (checked on append) and elapsed time
/// since the last flush (checked on tick), whichever comes first.
#[derive(Debug)]
pub struct FlushPolicy {
    threshold: usize,
    interval: Duration,
    since_flush: Mutex<Duration>,
}

impl FlushPolicy {
    pub fn new(threshold: usize, interval: Duration) -> Self {
        Self {
            threshold,
            interval,
            since_flush: Mutex::new(Duration::ZERO),
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Size trigger.
    pub fn size_reached(&self, buffered: usize) -> bool {
        buffered >= self.threshold
    }

    /// Time trigger. An empty buffer resets the accumulator, so an idle
    /// period never fires a flush on its own.
    pub fn tick(&self, elapsed: Duration, buffer_empty: bool) -> bool {
        let mut since = self.since_flush.lock().unwrap_or_else(PoisonError::into_inner);
        if buffer_empty {
            *since = Duration::ZERO;
            return false;
        }

        *since = since.saturating_add(elapsed);
        if *since >= self.interval {
            *since = Duration::ZERO;
            return true;
        }
        false
    }

    /// Time accumulated since the last flush.
    pub fn since_flush(&self) -> Duration {
        *self.since_flush.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for FlushPolicy {
    fn default() -> Self {
        Self::new(10, Duration::from_secs(10))
    }
}
