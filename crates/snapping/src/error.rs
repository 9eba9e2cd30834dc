//! Error and per-item outcome types for correlation and snapping.

use std::fmt;
use std::time::Duration;

use modenet_network::{NetworkError, StopId};
use serde::Serialize;
use thiserror::Error;

/// Errors that abort a whole snapping run. Nothing has been written to the
/// network when one of these is returned.
#[derive(Debug, Error)]
pub enum SnapError {
    #[error("snapping run was cancelled")]
    Cancelled,

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("invalid snapping configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, SnapError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InfeasibleReason {
    /// No link permitting the stop's modes lies within the search radius.
    NoCandidate,
    /// Every candidate link was already filled to capacity by closer stops.
    CapacityExhausted,
}

impl fmt::Display for InfeasibleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCandidate => write!(f, "no candidate link within the search radius"),
            Self::CapacityExhausted => write!(f, "all candidate links are at capacity"),
        }
    }
}

/// A stop left unsnapped. Reported per stop; never fatal to the batch.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize)]
#[error("stop {stop} left unsnapped: {reason}")]
pub struct SolverInfeasibleError {
    pub stop: StopId,
    pub reason: InfeasibleReason,
}

/// The run hit its deadline; `unresolved` stops were never handed to the
/// solver. Components solved before the deadline are kept.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize)]
#[error("solver deadline reached after {elapsed:?} with {unresolved} stops unresolved")]
pub struct SolverTimeoutError {
    pub unresolved: usize,
    pub elapsed: Duration,
}
