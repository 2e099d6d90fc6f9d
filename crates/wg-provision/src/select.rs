//! Candidate selection policies.
//!
//! Automatic modes pick at most one endpoint per region from probe results;
//! manual mode indexes into the enumerated candidate list as displayed to
//! the operator (1-based). A region with no usable candidate is a
//! recoverable skip, never a fatal abort.

use crate::probe::ProbeResult;
use provider_client::Endpoint;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("selection index {index} out of range (candidates: {count})")]
    OutOfRange { index: usize, count: usize },

    #[error("no reachable candidate")]
    NoReachableCandidate,
}

/// How to choose among a region's candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionMode {
    /// Operator-chosen 1-based indexes into the displayed list.
    Manual { indexes: Vec<usize> },
    /// First candidate, in list order, that probed reachable.
    FirstResponsive,
    /// Reachable candidate with the strictly smallest measured latency;
    /// ties break to the earlier-listed candidate.
    LowestLatency,
}

/// Pick the endpoints to provision.
///
/// `results` must be in candidate order when present (the prober guarantees
/// this). Automatic modes without probe results have nothing to go on and
/// report no reachable candidate.
pub fn select<'a>(
    candidates: &'a [Endpoint],
    results: Option<&[ProbeResult]>,
    mode: &SelectionMode,
) -> Result<Vec<&'a Endpoint>, SelectionError> {
    match mode {
        SelectionMode::Manual { indexes } => {
            let mut chosen = Vec::with_capacity(indexes.len());
            for &index in indexes {
                if index == 0 || index > candidates.len() {
                    return Err(SelectionError::OutOfRange {
                        index,
                        count: candidates.len(),
                    });
                }
                chosen.push(&candidates[index - 1]);
            }
            Ok(chosen)
        }

        SelectionMode::FirstResponsive => {
            let results = results.ok_or(SelectionError::NoReachableCandidate)?;
            candidates
                .iter()
                .zip(results)
                .find(|(_, r)| r.reachable)
                .map(|(c, _)| vec![c])
                .ok_or(SelectionError::NoReachableCandidate)
        }

        SelectionMode::LowestLatency => {
            let results = results.ok_or(SelectionError::NoReachableCandidate)?;
            let mut best: Option<(&Endpoint, u64)> = None;
            for (candidate, result) in candidates.iter().zip(results) {
                if !result.reachable {
                    continue;
                }
                let Some(ms) = result.latency_ms else {
                    continue;
                };
                // Strict comparison keeps the earlier-listed endpoint on ties.
                if best.map_or(true, |(_, b)| ms < b) {
                    best = Some((candidate, ms));
                }
            }
            best.map(|(c, _)| vec![c])
                .ok_or(SelectionError::NoReachableCandidate)
        }
    }
}
