//! Per-region provisioning orchestration.
//!
//! Fatal errors (auth, directory) never reach this module; everything here
//! is per-region or per-endpoint and recoverable. A failed region or
//! endpoint becomes a recorded skip and the run continues.

use crate::probe::{ProbeMode, ProbeResult, Prober};
use crate::select::{select, SelectionMode};
use futures::stream::{self, StreamExt};
use provider_client::{Endpoint, ProviderClient, ServerDirectory};
use secrecy::SecretString;
use std::path::PathBuf;
use tracing::{info, warn};
use wg_config::ConfigRecord;
use wg_keys::KeyPair;

/// One recoverable failure, with enough context to retry manually.
#[derive(Debug)]
pub struct Skip {
    /// Region id or `region/hostname` endpoint identity.
    pub subject: String,
    pub reason: String,
}

/// Outcome of a whole provisioning run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub provisioned: Vec<PathBuf>,
    pub skips: Vec<Skip>,
}

impl RunSummary {
    /// A run counts as successful if at least one config was written.
    pub fn is_success(&self) -> bool {
        !self.provisioned.is_empty()
    }
}

/// Drives probe → select → register → emit for each requested region.
pub struct Provisioner {
    client: ProviderClient,
    prober: Prober,
    mode: SelectionMode,
    output_dir: PathBuf,
    registration_concurrency: usize,
}

impl Provisioner {
    pub fn new(
        client: ProviderClient,
        prober: Prober,
        mode: SelectionMode,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            client,
            prober,
            mode,
            output_dir,
            registration_concurrency: 4,
        }
    }

    /// Provision every requested region, isolating failures per region and
    /// per endpoint.
    pub async fn run(
        &self,
        directory: &ServerDirectory,
        region_ids: &[String],
        token: &SecretString,
    ) -> RunSummary {
        let mut summary = RunSummary::default();

        for region_id in region_ids {
            self.provision_region(directory, region_id, token, &mut summary)
                .await;
        }

        info!(
            provisioned = summary.provisioned.len(),
            skipped = summary.skips.len(),
            "Run complete"
        );
        for skip in &summary.skips {
            warn!(subject = %skip.subject, reason = %skip.reason, "Skipped");
        }

        summary
    }

    async fn provision_region(
        &self,
        directory: &ServerDirectory,
        region_id: &str,
        token: &SecretString,
        summary: &mut RunSummary,
    ) {
        let Some(candidates) = directory.endpoints(region_id) else {
            summary.skips.push(Skip {
                subject: region_id.into(),
                reason: "region not present in server directory".into(),
            });
            return;
        };
        if candidates.is_empty() {
            summary.skips.push(Skip {
                subject: region_id.into(),
                reason: "no WireGuard candidates".into(),
            });
            return;
        }

        let probe_results = match self.mode {
            SelectionMode::Manual { .. } => None,
            SelectionMode::FirstResponsive => {
                Some(self.prober.probe(candidates, ProbeMode::Presence).await)
            }
            SelectionMode::LowestLatency => {
                Some(self.prober.probe(candidates, ProbeMode::Latency).await)
            }
        };

        let chosen = match select(candidates, probe_results.as_deref(), &self.mode) {
            Ok(chosen) => chosen,
            Err(e) => {
                summary.skips.push(Skip {
                    subject: region_id.into(),
                    reason: e.to_string(),
                });
                return;
            }
        };

        info!(
            region = region_id,
            endpoints = chosen.len(),
            "Provisioning selected endpoints"
        );

        let outcomes: Vec<Result<PathBuf, Skip>> = stream::iter(chosen.into_iter().cloned())
            .map(|endpoint| {
                let latency_ms = lookup_latency(probe_results.as_deref(), &endpoint);
                async move { self.provision_endpoint(endpoint, latency_ms, token).await }
            })
            .buffer_unordered(self.registration_concurrency)
            .collect()
            .await;

        for outcome in outcomes {
            match outcome {
                Ok(path) => summary.provisioned.push(path),
                Err(skip) => summary.skips.push(skip),
            }
        }
    }

    /// Register a fresh key pair with one endpoint and write its config.
    ///
    /// The record is built right here from the grant and the key pair that
    /// requested it; grants and keys are never mixed across endpoints.
    async fn provision_endpoint(
        &self,
        endpoint: Endpoint,
        latency_ms: Option<u64>,
        token: &SecretString,
    ) -> Result<PathBuf, Skip> {
        let subject = format!("{}/{}", endpoint.region_id, endpoint.hostname);

        let key_pair = KeyPair::generate();
        let grant = self
            .client
            .register_key(&endpoint, token, &key_pair.public)
            .await
            .map_err(|e| Skip {
                subject: subject.clone(),
                reason: e.to_string(),
            })?;

        let record = ConfigRecord {
            endpoint,
            key_pair,
            grant,
            latency_ms,
        };

        wg_config::emit(&record, &self.output_dir).map_err(|e| Skip {
            subject,
            reason: e.to_string(),
        })
    }
}

fn lookup_latency(results: Option<&[ProbeResult]>, endpoint: &Endpoint) -> Option<u64> {
    results?
        .iter()
        .find(|r| r.endpoint == *endpoint)
        .and_then(|r| r.latency_ms)
}
