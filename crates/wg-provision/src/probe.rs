//! Endpoint reachability and latency probing.
//!
//! A probe is a TCP connect to the endpoint's registration port: it needs no
//! privileges (unlike ICMP) and exercises the same service the registrar
//! talks to next. Latency mode takes three samples and keeps the minimum
//! successful round-trip; connect-time noise only ever inflates a sample, so
//! the minimum is the least biased estimate.

use futures::stream::{self, StreamExt};
use provider_client::Endpoint;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

const LATENCY_SAMPLES: usize = 3;
const DEFAULT_PROBE_PORT: u16 = 443;

/// What a probing pass should measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMode {
    /// One connect per endpoint; binary outcome.
    Presence,
    /// Several connects per endpoint; report the minimum round-trip.
    Latency,
}

/// Outcome of probing one endpoint. One per endpoint per pass.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub endpoint: Endpoint,
    pub reachable: bool,
    pub latency_ms: Option<u64>,
}

/// Probes endpoints concurrently on a bounded pool.
#[derive(Debug, Clone)]
pub struct Prober {
    port: u16,
    timeout: Duration,
    concurrency: usize,
}

impl Prober {
    pub fn new(timeout: Duration, concurrency: usize) -> Self {
        Self {
            port: DEFAULT_PROBE_PORT,
            timeout,
            concurrency,
        }
    }

    /// Probe a non-standard port. Used by tests against local listeners.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Probe every endpoint independently; one endpoint timing out never
    /// blocks or biases another. Results come back in input order.
    pub async fn probe(&self, endpoints: &[Endpoint], mode: ProbeMode) -> Vec<ProbeResult> {
        let mut indexed: Vec<(usize, ProbeResult)> =
            stream::iter(endpoints.iter().cloned().enumerate())
                .map(|(i, endpoint)| async move { (i, self.probe_one(endpoint, mode).await) })
                .buffer_unordered(self.concurrency.max(1))
                .collect()
                .await;

        indexed.sort_by_key(|(i, _)| *i);
        indexed.into_iter().map(|(_, r)| r).collect()
    }

    async fn probe_one(&self, endpoint: Endpoint, mode: ProbeMode) -> ProbeResult {
        let samples = match mode {
            ProbeMode::Presence => 1,
            ProbeMode::Latency => LATENCY_SAMPLES,
        };

        let mut best: Option<u64> = None;
        for _ in 0..samples {
            if let Some(ms) = self.connect_once(&endpoint).await {
                best = Some(best.map_or(ms, |b| b.min(ms)));
            }
        }

        let result = ProbeResult {
            reachable: best.is_some(),
            latency_ms: match mode {
                ProbeMode::Presence => None,
                ProbeMode::Latency => best,
            },
            endpoint,
        };
        debug!(
            endpoint = %result.endpoint,
            reachable = result.reachable,
            latency_ms = ?result.latency_ms,
            "Probe complete"
        );
        result
    }

    /// One connect attempt; `None` on timeout or refusal.
    async fn connect_once(&self, endpoint: &Endpoint) -> Option<u64> {
        let start = Instant::now();
        match timeout(self.timeout, TcpStream::connect((endpoint.ip, self.port))).await {
            Ok(Ok(_stream)) => Some(start.elapsed().as_millis() as u64),
            _ => None,
        }
    }
}
