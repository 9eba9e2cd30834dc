use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SnapError};

use super::solver::{AssignmentSolver, GreedySolver, KuhnMunkresSolver};

/// Which solver handles each component of the assignment problem.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverKind {
    /// Optimal assignment via Kuhn–Munkres.
    #[default]
    KuhnMunkres,
    /// Cheapest pairs first. Fast, not always optimal under a link capacity.
    Greedy,
}

impl SolverKind {
    pub fn solver(self) -> Box<dyn AssignmentSolver> {
        match self {
            Self::KuhnMunkres => Box::new(KuhnMunkresSolver),
            Self::Greedy => Box::new(GreedySolver),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    /// Maximum stop-to-link distance, in CRS units.
    pub search_radius: f64,
    /// Modes a candidate link must permit at least one of. Empty means the
    /// stop's own mode.
    pub modes: BTreeSet<String>,
    /// Maximum number of stops per link. `None` leaves links uncapped.
    pub link_capacity: Option<usize>,
    pub solver: SolverKind,
    /// Wall-clock budget for solving, checked before each solver call.
    pub timeout: Option<Duration>,
    /// Nearest candidates kept per stop.
    pub max_candidates: usize,
    /// Largest number of stops handed to one solver call. Bigger components
    /// are solved in blocks of this size, in stop order, which bounds the
    /// time between deadline checks at the cost of exactness across blocks.
    pub max_component_stops: usize,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            search_radius: 30.0,
            modes: BTreeSet::from(["car".to_owned(), "bus".to_owned()]),
            link_capacity: None,
            solver: SolverKind::default(),
            timeout: None,
            max_candidates: 10,
            max_component_stops: 256,
        }
    }
}

impl SnapConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.search_radius.is_finite() || self.search_radius <= 0.0 {
            return Err(SnapError::InvalidConfig(format!(
                "search_radius must be a positive distance, got {}",
                self.search_radius
            )));
        }
        if self.max_candidates == 0 {
            return Err(SnapError::InvalidConfig(
                "max_candidates must be at least 1".to_owned(),
            ));
        }
        if self.max_component_stops == 0 {
            return Err(SnapError::InvalidConfig(
                "max_component_stops must be at least 1".to_owned(),
            ));
        }
        if self.link_capacity == Some(0) {
            return Err(SnapError::InvalidConfig(
                "link_capacity must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}
