//! Fully-resolved configuration record for one provisioned endpoint.

use provider_client::{Endpoint, TunnelGrant};
use std::fmt;
use wg_keys::KeyPair;

/// Everything needed to render one client config file.
///
/// Constructed only at the registration call site so the grant always
/// belongs to the key pair embedded here; the two are never mixed across
/// endpoints.
pub struct ConfigRecord {
    pub endpoint: Endpoint,
    pub key_pair: KeyPair,
    pub grant: TunnelGrant,
    /// Measured round-trip, when the run probed for latency.
    pub latency_ms: Option<u64>,
}

impl ConfigRecord {
    /// File name unique per (region, endpoint), embedding the measured
    /// latency for operator legibility when one was taken.
    pub fn file_name(&self) -> String {
        match self.latency_ms {
            Some(ms) => format!(
                "{}-{}-{}ms.conf",
                self.endpoint.region_id, self.endpoint.hostname, ms
            ),
            None => format!("{}-{}.conf", self.endpoint.region_id, self.endpoint.hostname),
        }
    }

    /// Render the config in `wg-quick` grammar: `[Interface]`/`[Peer]`
    /// sections with `Key = Value` lines.
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str("[Interface]\n");
        out.push_str(&format!("PrivateKey = {}\n", self.key_pair.private.to_base64()));
        out.push_str(&format!("Address = {}\n", self.grant.client_address));
        out.push_str(&format!("DNS = {}\n", self.grant.dns.join(", ")));
        out.push('\n');
        out.push_str("[Peer]\n");
        out.push_str(&format!("PublicKey = {}\n", self.grant.server_public_key));
        out.push_str(&format!(
            "Endpoint = {}:{}\n",
            self.endpoint.ip, self.grant.server_port
        ));
        out.push_str("AllowedIPs = 0.0.0.0/0, ::/0\n");
        out.push_str("PersistentKeepalive = 25\n");

        out
    }
}

impl fmt::Debug for ConfigRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigRecord")
            .field("endpoint", &self.endpoint)
            .field("key_pair", &self.key_pair)
            .field("latency_ms", &self.latency_ms)
            .finish()
    }
}
