#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use marker_api::{BatchTransport, MarkersEnvelope, SendFuture, TransportError};
use markers::{MarkersConfig, MarkersService};

/// In-memory transport that keeps the encoded body of every call.
#[derive(Default)]
pub struct RecordingTransport {
    missing_key: AtomicBool,
    fail: AtomicBool,
    bodies: Mutex<Vec<Vec<u8>>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn without_key() -> Arc<Self> {
        let t = Self::default();
        t.missing_key.store(true, Ordering::SeqCst);
        Arc::new(t)
    }

    pub fn set_key_present(&self, present: bool) {
        self.missing_key.store(!present, Ordering::SeqCst);
    }

    pub fn fail_sends(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.bodies.lock().unwrap().len()
    }

    /// Decoded envelopes, in call order.
    pub fn envelopes(&self) -> Vec<MarkersEnvelope> {
        self.bodies
            .lock()
            .unwrap()
            .iter()
            .map(|b| serde_json::from_slice(b).unwrap())
            .collect()
    }

    pub fn raw_bodies(&self) -> Vec<Vec<u8>> {
        self.bodies.lock().unwrap().clone()
    }
}

impl BatchTransport for RecordingTransport {
    fn check_ready(&self) -> Result<(), TransportError> {
        if self.missing_key.load(Ordering::SeqCst) {
            return Err(TransportError::MissingCredential);
        }
        Ok(())
    }

    fn send_batch<'a>(&'a self, envelope: &'a MarkersEnvelope) -> SendFuture<'a> {
        Box::pin(async move {
            let body = envelope.to_json_bytes()?;
            self.bodies.lock().unwrap().push(body);
            if self.fail.load(Ordering::SeqCst) {
                return Err(TransportError::Status { status: 502, body: "bad gateway".into() });
            }
            Ok(())
        })
    }
}

pub fn service(transport: Arc<RecordingTransport>) -> Arc<MarkersService> {
    service_with(MarkersConfig::default(), transport)
}

pub fn service_with(config: MarkersConfig, transport: Arc<RecordingTransport>) -> Arc<MarkersService> {
    Arc::new(MarkersService::new(&config, transport, tokio::runtime::Handle::current()))
}
