//! # modenet-network
//!
//! In-memory multi-modal transport network and PT schedule with a complete
//! change history.
//!
//! ## Features
//!
//! - **Stable link identity**: parallel links are addressed by id, never by
//!   their position among edges sharing the same endpoints
//! - **Change log**: every mutation is recorded with before/after snapshots;
//!   the log replays into an identical network
//! - **Fail-fast invariants**: duplicate ids, unknown references, empty or
//!   disconnected routes are rejected before anything changes
//! - **Validation**: per-mode dead-ends, sources and connectivity, plus
//!   schedule well-formedness, returned as reports
//!
//! ## Example
//!
//! ```
//! use modenet_network::prelude::*;
//!
//! let mut network = Network::new("EPSG:27700");
//! network.add_nodes(vec![
//!     Node::new("a", 0.0, 0.0),
//!     Node::new("b", 100.0, 0.0),
//!     Node::new("c", 200.0, 0.0),
//! ])?;
//! network.add_links(vec![
//!     Link::new("ab", "a", "b").with_modes(["car"]),
//!     Link::new("bc", "b", "c").with_modes(["car"]),
//! ])?;
//!
//! let report = validate(&network, &ValidationConfig::default());
//! let car = report.mode("car").unwrap();
//! assert!(car.dead_ends.contains(&NodeId::new("c")));
//! assert!(car.sources.contains(&NodeId::new("a")));
//!
//! network.add_link(Link::new("ca", "c", "a").with_modes(["car"]))?;
//! assert!(validate(&network, &ValidationConfig::default()).is_healthy());
//! assert_eq!(network.change_log().len(), 6);
//! # Ok::<(), modenet_network::NetworkError>(())
//! ```

pub mod attributes;
pub mod changelog;
pub mod error;
pub mod graph;
pub mod identifiers;
pub mod network;
pub mod schedule;
pub mod validation;

// Re-exports for convenience
pub mod prelude {
    pub use crate::attributes::{AttributeMap, AttributeValue};
    pub use crate::changelog::{Change, ChangeEntry, ChangeKind, ChangeLog, EntityKind, Snapshot};
    pub use crate::error::{NetworkError, Result};
    pub use crate::graph::{Graph, Link, LinkPatch, Node, NodePatch};
    pub use crate::identifiers::*;
    pub use crate::network::{Network, Reprojector};
    pub use crate::schedule::{Route, Schedule, Service, Stop, StopPatch};
    pub use crate::validation::{validate, ModeReport, ScheduleIssue, ValidationConfig, ValidationReport};
}

pub use prelude::*;
