//! WireGuard config provisioning against a commercial VPN provider.
//!
//! Authenticates, fetches the server directory, probes candidate endpoints,
//! selects per the configured policy, registers a fresh key pair with each
//! selected endpoint, and writes one config file per success.

pub mod cli;
pub mod config;
pub mod error;
pub mod probe;
pub mod run;
pub mod select;
