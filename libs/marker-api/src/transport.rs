use std::future::Future;
use std::pin::Pin;

use crate::{MarkersEnvelope, TransportError};

pub type SendFuture<'a> = Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + 'a>>;

// ════════════════════════════════════════════════════════════════
//  Batch Transport
// ════════════════════════════════════════════════════════════════

/// Outbound side of the pipeline: delivers one envelope per call to the
/// collector (conceptually `POST /v1/markers`).
///
/// Implementations own their own timeout policy. The engine never retries,
/// so a failed `send_batch` means the batch is gone.
pub trait BatchTransport: Send + Sync {
    /// Synchronous precondition checked before the buffer is drained.
    /// Returns `TransportError::MissingCredential` while no API key is set.
    fn check_ready(&self) -> Result<(), TransportError>;

    /// Send one envelope. Awaited only by the dispatcher's detached task.
    fn send_batch<'a>(&'a self, envelope: &'a MarkersEnvelope) -> SendFuture<'a>;
}
