//! Errors raised by structural mutations.
//!
//! Every variant is raised before any state changes, so a failed call leaves
//! both the network and its change log exactly as they were.

use crate::identifiers::*;

#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("Duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },

    #[error("Node not found: {0}")]
    UnknownNode(NodeId),

    #[error("Link not found: {0}")]
    UnknownLink(LinkId),

    #[error("Stop not found: {0}")]
    UnknownStop(StopId),

    #[error("Route not found: {0}")]
    UnknownRoute(RouteId),

    #[error("Service not found: {0}")]
    UnknownService(ServiceId),

    #[error("Route {0} has no stops")]
    EmptyRoute(RouteId),

    #[error("Route {route} is disconnected: link {previous} does not lead into link {next}")]
    DisconnectedRoute {
        route: RouteId,
        previous: LinkId,
        next: LinkId,
    },

    #[error("Reprojection failed: {0}")]
    Reprojection(String),

    #[error("Invalid change: {0}")]
    InvalidChange(String),
}

impl NetworkError {
    pub(crate) fn duplicate(kind: &'static str, id: impl ToString) -> Self {
        Self::DuplicateId {
            kind,
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NetworkError>;
