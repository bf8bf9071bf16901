// postline-api: Async Rust client for a remote record collection endpoint.

pub mod client;
pub mod error;
pub mod models;
pub mod probe;
pub mod transport;

pub use client::RecordClient;
pub use error::Error;
pub use models::RecordResponse;
pub use probe::ReachabilityProbe;
pub use transport::{TlsMode, TransportConfig};
