//! Provider API HTTP client: login, directory fetch, key registration.

use crate::directory::{Endpoint, ServerDirectory};
use crate::error::ProviderError;
use crate::types::*;
use reqwest::{Certificate, Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use wg_keys::PublicKey;

const DEFAULT_REGISTRATION_PORT: u16 = 443;

/// Client for the provider's account and registration API.
///
/// Login and directory fetch go to the account API at `base_url`. Key
/// registration talks to the chosen endpoint directly over TLS pinned to the
/// configured trust anchor, with the hostname resolved statically to the
/// directory-listed IP so a DNS answer cannot redirect the exchange.
#[derive(Clone)]
pub struct ProviderClient {
    http: Client,
    base_url: String,
    timeout: Duration,
    trust_anchor_pem: Option<Vec<u8>>,
    registration_port: u16,
    plain_http_registration: bool,
}

impl ProviderClient {
    /// Create a client for the account API.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            timeout,
            trust_anchor_pem: None,
            registration_port: DEFAULT_REGISTRATION_PORT,
            plain_http_registration: false,
        })
    }

    /// Pin registration TLS to this PEM certificate instead of the system
    /// root store. Required before calling [`register_key`] outside tests.
    ///
    /// [`register_key`]: ProviderClient::register_key
    pub fn with_trust_anchor(mut self, pem: Vec<u8>) -> Self {
        self.trust_anchor_pem = Some(pem);
        self
    }

    /// Register against `http://{hostname}:{port}` without TLS. Only for
    /// tests against a local mock server.
    pub fn with_plain_http_registration(mut self, port: u16) -> Self {
        self.registration_port = port;
        self.plain_http_registration = true;
        self
    }

    /// Authenticate and obtain a session token.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<SecretString, ProviderError> {
        let request = LoginRequest {
            username,
            password: password.expose_secret(),
        };

        let response = self
            .http
            .post(format!("{}/v1/auth", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                warn!("Provider rejected credentials");
                Err(ProviderError::AuthRejected)
            }
            s if s.is_success() => {
                let body: LoginResponse = response.json().await?;
                debug!("Authenticated against {}", self.base_url);
                Ok(SecretString::new(body.token))
            }
            s => {
                let message = response.text().await.unwrap_or_else(|_| "unknown".into());
                Err(ProviderError::Api {
                    status: s.as_u16(),
                    message,
                })
            }
        }
    }

    /// Fetch and parse the server directory.
    #[instrument(skip(self, token))]
    pub async fn fetch_directory(
        &self,
        token: &SecretString,
    ) -> Result<ServerDirectory, ProviderError> {
        let response = self
            .http
            .get(format!("{}/v1/servers", self.base_url))
            .bearer_auth(token.expose_secret())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::DirectoryUnavailable {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let directory = ServerDirectory::parse(&body)?;
        debug!(
            regions = directory.regions().len(),
            endpoints = directory.endpoint_count(),
            "Fetched server directory"
        );
        Ok(directory)
    }

    /// Exchange a fresh public key with an endpoint's registration service.
    ///
    /// Rejection, transport failure, and malformed responses are all
    /// per-endpoint recoverable; the caller skips the endpoint and continues.
    #[instrument(skip_all, fields(endpoint = %endpoint.hostname))]
    pub async fn register_key(
        &self,
        endpoint: &Endpoint,
        token: &SecretString,
        public_key: &PublicKey,
    ) -> Result<TunnelGrant, ProviderError> {
        let client = self.registration_client(endpoint)?;
        let scheme = if self.plain_http_registration {
            "http"
        } else {
            "https"
        };
        let url = format!(
            "{}://{}:{}/v1/wireguard",
            scheme, endpoint.hostname, self.registration_port
        );

        let encoded_key = public_key.to_base64();
        let request = RegisterRequest {
            public_key: &encoded_key,
        };

        debug!(url = %url, "Sending key registration");

        let response = client
            .post(&url)
            .bearer_auth(token.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Registration transport failure");
                ProviderError::RegistrationUnreachable {
                    endpoint: endpoint.hostname.clone(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let reason = response
                .text()
                .await
                .unwrap_or_else(|_| format!("HTTP {}", status));
            return Err(ProviderError::RegistrationRejected {
                endpoint: endpoint.hostname.clone(),
                reason,
            });
        }

        let body: RegisterResponse =
            response
                .json()
                .await
                .map_err(|_| ProviderError::MalformedRegistration {
                    endpoint: endpoint.hostname.clone(),
                })?;

        if body.status != "success" {
            return Err(ProviderError::RegistrationRejected {
                endpoint: endpoint.hostname.clone(),
                reason: format!("status {}", body.status),
            });
        }

        let grant = body
            .into_grant()
            .ok_or_else(|| ProviderError::MalformedRegistration {
                endpoint: endpoint.hostname.clone(),
            })?;

        // The grant is useless without a parseable server key.
        PublicKey::from_base64(&grant.server_public_key).map_err(|_| {
            ProviderError::MalformedRegistration {
                endpoint: endpoint.hostname.clone(),
            }
        })?;

        debug!(port = grant.server_port, "Registration accepted");
        Ok(grant)
    }

    /// Build the per-endpoint registration client: trust-anchor-only root
    /// store, hostname resolved to the directory-listed IP.
    fn registration_client(&self, endpoint: &Endpoint) -> Result<Client, ProviderError> {
        let addr = SocketAddr::from((endpoint.ip, self.registration_port));
        let mut builder = Client::builder()
            .timeout(self.timeout)
            .resolve(&endpoint.hostname, addr);

        if !self.plain_http_registration {
            let pem = self.trust_anchor_pem.as_deref().ok_or_else(|| {
                ProviderError::TrustAnchor("no trust anchor configured".into())
            })?;
            let cert = Certificate::from_pem(pem)
                .map_err(|e| ProviderError::TrustAnchor(e.to_string()))?;
            builder = builder
                .tls_built_in_root_certs(false)
                .add_root_certificate(cert);
        }

        Ok(builder.build()?)
    }
}
