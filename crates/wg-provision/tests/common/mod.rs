//! Shared helpers for provisioning integration tests.

use provider_client::ProviderClient;
use secrecy::SecretString;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mount the login endpoint, answering with a fixed session token.
pub async fn mount_auth(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/auth"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "session-token"})),
        )
        .mount(server)
        .await;
}

/// Mount the server-directory endpoint.
pub async fn mount_directory(server: &MockServer, doc: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/v1/servers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&doc))
        .mount(server)
        .await;
}

/// Provider client pointed at the mock server for both the account API and
/// (plain HTTP) key registration.
pub fn provider_client(server: &MockServer) -> ProviderClient {
    ProviderClient::new(server.uri(), Duration::from_secs(5))
        .unwrap()
        .with_plain_http_registration(server.address().port())
}

pub fn password() -> SecretString {
    SecretString::new("hunter2".into())
}

/// A registration success body with a freshly generated server key.
pub fn grant_body() -> serde_json::Value {
    serde_json::json!({
        "status": "success",
        "server_public_key": wg_keys::KeyPair::generate().public.to_base64(),
        "port": 51820,
        "address": "10.0.5.2/32",
        "dns": ["10.0.5.1", "1.1.1.1"]
    })
}
