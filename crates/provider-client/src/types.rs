//! Wire types for the provider API.

use serde::{Deserialize, Serialize};

/// `POST /v1/auth` request body.
#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// `POST /v1/auth` response body.
#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub token: String,
}

/// Registration request body: just the fresh public key.
#[derive(Debug, Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub public_key: &'a str,
}

/// Raw registration response. The `status` field is validated before any of
/// the tunnel parameters are trusted, so everything besides `status` is
/// optional at the wire level.
#[derive(Debug, Deserialize)]
pub(crate) struct RegisterResponse {
    pub status: String,
    #[serde(default)]
    pub server_public_key: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub dns: Option<Vec<String>>,
}

/// Server-issued tunnel parameters, valid only together with the key pair
/// that requested them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelGrant {
    /// Server's WireGuard public key, base64.
    pub server_public_key: String,
    /// Server's WireGuard listen port.
    pub server_port: u16,
    /// Tunnel address assigned to this client.
    pub client_address: String,
    /// DNS resolvers to use inside the tunnel, in server-given order.
    pub dns: Vec<String>,
}

impl RegisterResponse {
    /// Extract a complete grant, or `None` if any tunnel field is absent.
    pub(crate) fn into_grant(self) -> Option<TunnelGrant> {
        Some(TunnelGrant {
            server_public_key: self.server_public_key?,
            server_port: self.port?,
            client_address: self.address?,
            dns: self.dns?,
        })
    }
}
