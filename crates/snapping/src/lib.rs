//! # modenet-snapping
//!
//! Spatial operations over a [`modenet_network::Network`]:
//!
//! - **Correlation**: group links by an external provenance id (e.g. an OSM
//!   way id) with exact, typed matching and explicit mismatch warnings
//! - **Snapping**: assign PT stops to nearby road links by solving a
//!   capacity-constrained assignment problem
//!
//! Both only read the network. Snapping produces a plan that the caller
//! applies through the network's logged mutation path.
//!
//! ## Example
//!
//! ```
//! use modenet_network::prelude::*;
//! use modenet_snapping::prelude::*;
//!
//! let mut network = Network::new("EPSG:27700");
//! network.add_nodes(vec![Node::new("a", 0.0, 0.0), Node::new("b", 100.0, 0.0)])?;
//! network.add_link(Link::new("ab", "a", "b").with_modes(["bus"]))?;
//! network.add_stop(Stop::new("s1", 40.0, 5.0, "bus"))?;
//!
//! let plan = plan_snapping(&network, &[StopId::new("s1")], &SnapConfig::default())?;
//! assert!(plan.is_complete());
//!
//! plan.apply(&mut network)?;
//! let stop = network.schedule().stop(&StopId::new("s1")).unwrap();
//! assert_eq!(stop.linked_link, Some(LinkId::new("ab")));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod correlation;
pub mod error;
pub mod snapping;
pub mod spatial;

pub mod prelude {
    pub use crate::correlation::{
        correlate, write_mapping_json, write_report_json, CorrelationConfig, CorrelationRecord,
        CorrelationReport, ExternalId, TypeMismatchWarning,
    };
    pub use crate::error::{
        InfeasibleReason, SnapError, SolverInfeasibleError, SolverTimeoutError,
    };
    pub use crate::snapping::{
        plan_snapping, plan_snapping_cancellable, plan_snapping_with, AssignmentProblem, AssignmentSolver,
        GreedySolver, KuhnMunkresSolver, SnapAssignment, SnapConfig, SnapPlan, SolverKind,
    };
    pub use crate::spatial::LinkIndex;
}

pub use prelude::*;
