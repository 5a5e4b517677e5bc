use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use marker_api::now_ms;
use markers::{MarkersService, spawn_ticker};
use transport_http::HttpTransport;

use super::config::Effective;
use super::error::GenError;

/// Synthetic payload emitted by the generator.
#[derive(Debug, Serialize)]
struct DemoPayload {
    seq: u64,
    emitted_at_ms: i64,
    source: &'static str,
}

// ═══════════════════════════════════════════════════════════════
//  Main dispatch
// ═══════════════════════════════════════════════════════════════

pub async fn run(args: &Effective) -> Result<(), GenError> {
    let transport = Arc::new(HttpTransport::new(args.transport.clone())?);
    if args.transport.api_key.is_none() {
        tracing::warn!("no API key configured, markers will stay buffered");
    }

    if args.check_version {
        match transport.fetch_sdk_version().await {
            Ok(version) => tracing::info!(%version, "collector sdk version"),
            Err(e) => tracing::warn!(error = %e, "sdk version check failed"),
        }
    }

    let runtime = tokio::runtime::Handle::current();
    let service = Arc::new(MarkersService::new(&args.markers, transport, runtime.clone()));

    let token = CancellationToken::new();
    let ticker = spawn_ticker(service.clone(), args.tick, token.clone(), &runtime);

    tracing::info!(
        marker = %args.marker,
        rate = args.rate,
        count = ?args.count,
        flush_threshold = args.markers.flush_threshold,
        flush_interval_s = args.markers.flush_interval_secs,
        "emitting markers"
    );

    let emitted = emit(args, &service).await;

    // --- Shutdown: the ticker performs the final flush on cancel ---
    token.cancel();
    if let Err(e) = ticker.await {
        tracing::error!(error = %e, "ticker task failed");
        service.shutdown_flush();
    }

    if !service.wait_idle(args.drain).await {
        tracing::warn!(
            in_flight = service.in_flight(),
            drain_s = args.drain.as_secs(),
            "in-flight sends did not finish before exit"
        );
    }

    let emitted = emitted?;
    let stats = service.stats();
    tracing::info!(
        emitted,
        sent = stats.markers_sent,
        lost = stats.markers_lost,
        evicted = stats.markers_evicted,
        unsent = service.buffered(),
        batches = stats.batches_sent,
        failed_batches = stats.batches_failed,
        "shutdown complete"
    );
    Ok(())
}

// ═══════════════════════════════════════════════════════════════
//  Emit loop: rate-limited until count or Ctrl+C
// ═══════════════════════════════════════════════════════════════

async fn emit(args: &Effective, service: &MarkersService) -> Result<u64, GenError> {
    let mut interval = tokio::time::interval(args.period);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut seq = 0u64;
    loop {
        if args.count.is_some_and(|n| seq >= n) {
            break;
        }
        tokio::select! {
            res = &mut ctrl_c => {
                res?;
                tracing::info!("interrupted");
                break;
            }
            _ = interval.tick() => {
                let payload = DemoPayload { seq, emitted_at_ms: now_ms(), source: "markers-gen" };
                service.send_marker(&args.marker, &payload);
                seq += 1;
            }
        }
    }
    Ok(seq)
}
