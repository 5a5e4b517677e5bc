use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::Serialize;
use tokio::runtime::Handle;

use marker_api::BatchTransport;

use crate::buffer::EventBuffer;
use crate::config::MarkersConfig;
use crate::dispatcher::{DispatchStats, Dispatcher, FlushOutcome};
use crate::factory::MarkerFactory;
use crate::policy::FlushPolicy;

/// What started a flush. Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Size,
    Time,
    Manual,
    Shutdown,
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trigger::Size => f.write_str("size"),
            Trigger::Time => f.write_str("time"),
            Trigger::Manual => f.write_str("manual"),
            Trigger::Shutdown => f.write_str("shutdown"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  MarkersService
// ═══════════════════════════════════════════════════════════════

/// Entry point for host code: `send_marker` from any thread, `tick` from
/// the frame/timer driver, `shutdown_flush` once at teardown.
///
/// None of these return errors. Telemetry failures are logged and never
/// interrupt the host.
pub struct MarkersService {
    factory: MarkerFactory,
    buffer: Arc<EventBuffer>,
    policy: FlushPolicy,
    dispatcher: Dispatcher,
    shut_down: AtomicBool,
    /// Set after a failed flush was logged at error; cleared on success.
    flush_failing: AtomicBool,
}

impl MarkersService {
    pub fn new(config: &MarkersConfig, transport: Arc<dyn BatchTransport>, runtime: Handle) -> Self {
        let buffer = Arc::new(EventBuffer::new(config.max_buffered));
        Self {
            factory: MarkerFactory::new(config.server_id.clone(), config.context.clone().into()),
            policy: FlushPolicy::new(config.flush_threshold, config.flush_interval()),
            dispatcher: Dispatcher::new(buffer.clone(), transport, runtime),
            buffer,
            shut_down: AtomicBool::new(false),
            flush_failing: AtomicBool::new(false),
        }
    }

    /// Validate, buffer, and flush when the size threshold is reached.
    ///
    /// Returns `true` when the marker was buffered.
    pub fn send_marker<T: Serialize>(&self, name: &str, value: T) -> bool {
        let record = match self.factory.create(name, value) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(marker = %name, error = %e, "marker rejected, will not send");
                return false;
            }
        };

        let buffered = self.buffer.append(record);
        if self.policy.size_reached(buffered) {
            self.flush_with(Trigger::Size);
        }
        true
    }

    /// Advance the time trigger by `elapsed` (one host frame or timer period).
    pub fn tick(&self, elapsed: Duration) {
        if self.policy.tick(elapsed, self.buffer.is_empty()) {
            self.flush_with(Trigger::Time);
        }
    }

    /// Flush now, regardless of either trigger.
    pub fn flush(&self) {
        self.flush_with(Trigger::Manual);
    }

    /// Teardown flush. Only the first call does anything.
    pub fn shutdown_flush(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            tracing::debug!("shutdown flush already performed");
            return;
        }
        let buffered = self.buffer.len();
        match self.dispatcher.shutdown_flush() {
            Ok(outcome) => log_outcome(Trigger::Shutdown, outcome),
            Err(e) => {
                tracing::error!(trigger = %Trigger::Shutdown, buffered, error = %e, "flush failed");
            }
        }
    }

    /// Wait for in-flight sends, up to `timeout`. Returns `false` on timeout.
    pub async fn wait_idle(&self, timeout: Duration) -> bool {
        self.dispatcher.wait_idle(timeout).await
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn in_flight(&self) -> usize {
        self.dispatcher.in_flight()
    }

    pub fn stats(&self) -> DispatchStats {
        self.dispatcher.stats()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    fn flush_with(&self, trigger: Trigger) {
        match self.dispatcher.flush() {
            Ok(outcome) => {
                if self.flush_failing.swap(false, Ordering::Relaxed) {
                    tracing::info!(%trigger, "flush recovered");
                }
                log_outcome(trigger, outcome)
            }
            // Every later trigger retries; only the first failure is an error.
            Err(e) if self.flush_failing.swap(true, Ordering::Relaxed) => {
                tracing::debug!(%trigger, buffered = self.buffer.len(), error = %e, "flush still failing");
            }
            Err(e) => {
                tracing::error!(
                    %trigger,
                    buffered = self.buffer.len(),
                    error = %e,
                    "flush failed, markers kept in buffer"
                );
            }
        }
    }
}

fn log_outcome(trigger: Trigger, outcome: FlushOutcome) {
    match outcome {
        FlushOutcome::Empty => tracing::trace!(%trigger, "nothing to flush"),
        FlushOutcome::Dispatched { markers } => {
            tracing::debug!(%trigger, markers, "flush dispatched");
        }
    }
}
