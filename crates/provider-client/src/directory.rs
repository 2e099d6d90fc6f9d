//! Server-directory document parsing.
//!
//! The provider publishes one JSON document listing every region and the
//! servers inside it. Only servers that speak WireGuard become candidate
//! endpoints; a region whose servers all lack WireGuard support is kept with
//! an empty candidate list so it still shows up in listings.

use crate::error::ProviderError;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::net::Ipv4Addr;

/// A named geographic grouping of endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub id: String,
    pub display_name: String,
}

/// A single server offering a WireGuard tunnel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub hostname: String,
    pub ip: Ipv4Addr,
    pub region_id: String,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.hostname, self.ip)
    }
}

// Wire schema of the directory document.

#[derive(Debug, Deserialize)]
struct DirectoryDoc {
    regions: Vec<RegionDoc>,
}

#[derive(Debug, Deserialize)]
struct RegionDoc {
    id: String,
    name: String,
    #[serde(default)]
    servers: Vec<ServerDoc>,
}

#[derive(Debug, Deserialize)]
struct ServerDoc {
    hostname: String,
    ipv4: Ipv4Addr,
    #[serde(default)]
    wireguard: bool,
}

/// Parsed server directory: regions in document order, each mapped to its
/// WireGuard endpoint candidates.
#[derive(Debug, Clone)]
pub struct ServerDirectory {
    regions: Vec<Region>,
    endpoints: HashMap<String, Vec<Endpoint>>,
}

impl ServerDirectory {
    /// Parse the raw directory document.
    pub fn parse(raw: &str) -> Result<Self, ProviderError> {
        let doc: DirectoryDoc = serde_json::from_str(raw)
            .map_err(|e| ProviderError::MalformedDirectory(e.to_string()))?;

        let mut regions = Vec::with_capacity(doc.regions.len());
        let mut endpoints = HashMap::with_capacity(doc.regions.len());

        for region in doc.regions {
            let candidates: Vec<Endpoint> = region
                .servers
                .into_iter()
                .filter(|s| s.wireguard)
                .map(|s| Endpoint {
                    hostname: s.hostname,
                    ip: s.ipv4,
                    region_id: region.id.clone(),
                })
                .collect();

            endpoints.insert(region.id.clone(), candidates);
            regions.push(Region {
                id: region.id,
                display_name: region.name,
            });
        }

        Ok(Self { regions, endpoints })
    }

    /// Regions in document order.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Look up a region by id.
    pub fn region(&self, id: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == id)
    }

    /// WireGuard candidates for a region. Empty slice for a known region
    /// without WireGuard servers, `None` for an unknown region id.
    pub fn endpoints(&self, region_id: &str) -> Option<&[Endpoint]> {
        self.endpoints.get(region_id).map(Vec::as_slice)
    }

    /// Total candidate count across all regions.
    pub fn endpoint_count(&self) -> usize {
        self.endpoints.values().map(Vec::len).sum()
    }
}
