mod error;
mod record;
mod transport;
mod util;

pub use error::{ErrorKind, TransportError};
pub use record::{MarkerContext, MarkerRecord, MarkersEnvelope};
pub use transport::{BatchTransport, SendFuture};
pub use util::{new_marker_id, now_ms};
