use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::service::MarkersService;

// ═══════════════════════════════════════════════════════════════
//  Ticker — lifecycle driver for hosts without a frame loop
// ═══════════════════════════════════════════════════════════════

/// Call `service.tick(elapsed)` every `period` with the measured elapsed
/// time, and `service.shutdown_flush()` once the token is cancelled.
///
/// The task runs on `runtime`, so the caller need not be inside it.
/// In-flight sends are not awaited here; follow up with
/// `service.wait_idle(..)` after joining the handle.
pub fn spawn_ticker(
    service: Arc<MarkersService>,
    period: Duration,
    token: CancellationToken,
    runtime: &Handle,
) -> JoinHandle<()> {
    runtime.spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last = Instant::now();

        loop {
            tokio::select! {
                now = interval.tick() => {
                    service.tick(now.saturating_duration_since(last));
                    last = now;
                }
                _ = token.cancelled() => break,
            }
        }

        tracing::info!(buffered = service.buffered(), "ticker stopped, flushing markers");
        service.shutdown_flush();
    })
}
