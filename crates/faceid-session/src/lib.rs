//! faceid-session — Face-biometric authentication handshake.
//!
//! Fetches a reference face, compares it against the live camera on a fixed
//! cadence, and on a match exchanges a validation request for a token. The
//! [`SessionController`] reports exactly one outcome per attempt and releases
//! the camera on every exit path.

pub mod comparison;
pub mod config;
pub mod controller;
pub mod http;
pub mod outcome;
pub mod reference;
pub mod timer;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{ConfigError, SessionConfig};
pub use controller::{SessionController, SessionError};
pub use http::{HttpClient, HttpResponse, ReqwestClient, RequestDescriptor, TransportError};
pub use outcome::{Callbacks, Outcome, SessionState};

use tracing_subscriber::EnvFilter;

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// For embedding applications that do not set up their own subscriber.
/// Fails if a global subscriber is already installed.
pub fn init_tracing() -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .finish()
        .try_init()
}
