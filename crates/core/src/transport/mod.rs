//! HTTP transport used by indexers.
//!
//! The [`Transport`] trait is the seam between indexer logic and the network;
//! [`ReqwestTransport`] is the production implementation and enforces the
//! per-site minimum interval between requests.

mod reqwest_transport;
mod throttle;
mod types;

pub use reqwest_transport::{ReqwestTransport, TransportConfig};
pub use throttle::RequestThrottle;
pub use types::*;
