//! Per-stop candidate search.

use std::collections::BTreeSet;

use modenet_network::{LinkId, Network, NetworkError, StopId};
use rayon::prelude::*;
use serde::Serialize;

use crate::error::Result;
use crate::spatial::LinkIndex;

use super::config::SnapConfig;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Candidate {
    pub link: LinkId,
    pub distance: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StopCandidates {
    pub stop: StopId,
    /// Nearest first.
    pub candidates: Vec<Candidate>,
}

/// Find candidate links for each stop in parallel.
///
/// A link qualifies when it lies within the search radius and permits one
/// of the configured modes (or the stop's own mode when none are
/// configured). Output order follows `stops`.
pub fn find_candidates(
    network: &Network,
    index: &LinkIndex,
    stops: &[StopId],
    config: &SnapConfig,
) -> Result<Vec<StopCandidates>> {
    let graph = network.graph();
    let schedule = network.schedule();

    stops
        .par_iter()
        .map(|id| -> Result<StopCandidates> {
            let stop = schedule
                .stop(id)
                .ok_or_else(|| NetworkError::UnknownStop(id.clone()))?;
            let modes = if config.modes.is_empty() {
                BTreeSet::from([stop.mode.clone()])
            } else {
                config.modes.clone()
            };

            let candidates = index
                .within(stop.location.x(), stop.location.y(), config.search_radius)
                .into_iter()
                .filter(|(link, _)| graph.link(link).is_some_and(|l| l.allows_any(&modes)))
                .take(config.max_candidates)
                .map(|(link, distance)| Candidate {
                    link: link.clone(),
                    distance,
                })
                .collect();

            Ok(StopCandidates {
                stop: id.clone(),
                candidates,
            })
        })
        .collect()
}
