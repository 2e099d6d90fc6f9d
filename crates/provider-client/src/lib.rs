//! VPN provider API client: authentication, server directory, and WireGuard
//! key registration.

mod client;
mod directory;
mod error;
mod types;

pub use client::ProviderClient;
pub use directory::{Endpoint, Region, ServerDirectory};
pub use error::ProviderError;
pub use types::TunnelGrant;
