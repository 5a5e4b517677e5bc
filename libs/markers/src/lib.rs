pub mod config;
pub mod error;
mod buffer;
mod dispatcher;
mod driver;
mod factory;
mod policy;
mod service;

pub use buffer::EventBuffer;
pub use config::{ContextConfig, MarkersConfig};
pub use dispatcher::{DispatchStats, Dispatcher, FlushOutcome};
pub use driver::spawn_ticker;
pub use error::{MarkersError, ValidationError};
pub use factory::{MarkerFactory, check_shape};
pub use policy::FlushPolicy;
pub use service::MarkersService;
