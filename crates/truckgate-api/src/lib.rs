// truckgate-api: Async Rust client for the truck gate detection backend.

pub mod cameras;
pub mod client;
pub mod detection;
pub mod error;
pub mod models;
pub mod plates;
pub mod system;
pub mod transport;

pub use client::GateClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
