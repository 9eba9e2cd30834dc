//! Snapping PT stops onto nearby road links.
//!
//! [`plan_snapping`] only reads the network. It returns a [`SnapPlan`],
//! and nothing changes until the caller applies it with
//! [`SnapPlan::apply`], which goes through the network's regular
//! (logged) mutation path.

pub mod candidates;
pub mod config;
pub mod problem;
pub mod solver;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use modenet_network::{LinkId, Network, StopId, StopPatch};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{InfeasibleReason, Result, SnapError, SolverInfeasibleError, SolverTimeoutError};
use crate::spatial::LinkIndex;

pub use candidates::{find_candidates, Candidate, StopCandidates};
pub use config::{SnapConfig, SolverKind};
pub use problem::{AssignmentProblem, Constraint, Solution, Variable};
pub use solver::{AssignmentSolver, GreedySolver, KuhnMunkresSolver};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SnapAssignment {
    pub stop: StopId,
    pub link: LinkId,
    pub distance: f64,
}

/// Outcome of a snapping run. Every requested stop appears in exactly one
/// of `assignments`, `infeasible` or `unresolved`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SnapPlan {
    /// Ordered by stop id.
    pub assignments: Vec<SnapAssignment>,
    pub infeasible: Vec<SolverInfeasibleError>,
    /// Stops never handed to the solver because the deadline passed.
    pub unresolved: Vec<StopId>,
    pub timeout: Option<SolverTimeoutError>,
}

impl SnapPlan {
    /// True when every requested stop was snapped.
    pub fn is_complete(&self) -> bool {
        self.infeasible.is_empty() && self.unresolved.is_empty()
    }

    pub fn link_for(&self, stop: &StopId) -> Option<&LinkId> {
        self.assignments
            .iter()
            .find(|a| &a.stop == stop)
            .map(|a| &a.link)
    }

    pub fn total_distance(&self) -> f64 {
        self.assignments.iter().map(|a| a.distance).sum()
    }

    pub fn unsnapped_count(&self) -> usize {
        self.infeasible.len() + self.unresolved.len()
    }

    /// Set `linked_link` on every snapped stop as one batch. Returns the
    /// number of stops written.
    pub fn apply(&self, network: &mut Network) -> Result<usize> {
        let patches = self
            .assignments
            .iter()
            .map(|a| {
                (
                    a.stop.clone(),
                    StopPatch::default().linked_link(Some(a.link.clone())),
                )
            })
            .collect();
        network.modify_stops(patches)?;
        info!(stops = self.assignments.len(), "applied snapping plan");
        Ok(self.assignments.len())
    }
}

impl fmt::Display for SnapPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.is_complete() { "OK" } else { "PARTIAL" };
        writeln!(
            f,
            "Snapping {status}: {} snapped (total distance {:.2}), {} unsnapped",
            self.assignments.len(),
            self.total_distance(),
            self.unsnapped_count()
        )?;
        for error in &self.infeasible {
            writeln!(f, "  {error}")?;
        }
        if let Some(timeout) = &self.timeout {
            writeln!(f, "  {timeout}")?;
        }
        Ok(())
    }
}

/// Plan the snapping of `stops` onto links of `network`.
pub fn plan_snapping(network: &Network, stops: &[StopId], config: &SnapConfig) -> Result<SnapPlan> {
    plan_snapping_cancellable(network, stops, config, &AtomicBool::new(false))
}

/// [`plan_snapping`] with a cancellation flag, checked before each solver
/// call. A cancelled run returns [`SnapError::Cancelled`] and no plan.
pub fn plan_snapping_cancellable(
    network: &Network,
    stops: &[StopId],
    config: &SnapConfig,
    cancel: &AtomicBool,
) -> Result<SnapPlan> {
    let solver = config.solver.solver();
    plan_snapping_with(network, stops, config, solver.as_ref(), cancel)
}

/// [`plan_snapping_cancellable`] with a caller-supplied solver in place of
/// `config.solver`.
///
/// Components are solved one at a time, in blocks of at most
/// `config.max_component_stops` stops. The deadline is checked before each
/// block: blocks already solved are kept and the stops of every remaining
/// block are reported as unresolved.
pub fn plan_snapping_with(
    network: &Network,
    stops: &[StopId],
    config: &SnapConfig,
    solver: &dyn AssignmentSolver,
    cancel: &AtomicBool,
) -> Result<SnapPlan> {
    config.validate()?;
    let started = Instant::now();
    let deadline = config.timeout.map(|timeout| started + timeout);

    let mut seen = HashSet::new();
    let stops: Vec<StopId> = stops.iter().filter(|s| seen.insert(*s)).cloned().collect();

    let index = LinkIndex::build(network.graph());
    let candidates = find_candidates(network, &index, &stops, config)?;
    if cancel.load(Ordering::Relaxed) {
        return Err(SnapError::Cancelled);
    }

    let mut plan = SnapPlan::default();
    for entry in candidates.iter().filter(|c| c.candidates.is_empty()) {
        plan.infeasible.push(SolverInfeasibleError {
            stop: entry.stop.clone(),
            reason: InfeasibleReason::NoCandidate,
        });
    }

    let problem = AssignmentProblem::formulate(&candidates, config.link_capacity);
    for component in problem.components() {
        let mut used: HashMap<LinkId, usize> = HashMap::new();
        for mut block in component.blocks(config.max_component_stops) {
            if cancel.load(Ordering::Relaxed) {
                return Err(SnapError::Cancelled);
            }
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                plan.unresolved.extend(block.stops);
                continue;
            }
            for (slot, link) in block.used.iter_mut().zip(&block.links) {
                *slot = used.get(link).copied().unwrap_or(0);
            }

            let solution = solver.solve(&block);
            debug!(
                solver = solver.name(),
                stops = block.stops.len(),
                links = block.links.len(),
                assigned = solution.assigned_count(),
                "solved snapping block"
            );
            for (stop, &variable) in solution.assigned.iter().enumerate() {
                match variable.map(|v| &block.variables[v]) {
                    Some(variable) => {
                        let link = block.links[variable.link].clone();
                        *used.entry(link.clone()).or_default() += 1;
                        plan.assignments.push(SnapAssignment {
                            stop: block.stops[stop].clone(),
                            link,
                            distance: variable.cost,
                        });
                    }
                    None => plan.infeasible.push(SolverInfeasibleError {
                        stop: block.stops[stop].clone(),
                        reason: InfeasibleReason::CapacityExhausted,
                    }),
                }
            }
        }
    }

    plan.assignments.sort_by(|a, b| a.stop.cmp(&b.stop));
    plan.infeasible.sort_by(|a, b| a.stop.cmp(&b.stop));
    plan.unresolved.sort();
    if !plan.unresolved.is_empty() {
        let timeout = SolverTimeoutError {
            unresolved: plan.unresolved.len(),
            elapsed: started.elapsed(),
        };
        warn!(%timeout, "snapping deadline reached");
        plan.timeout = Some(timeout);
    }
    for error in &plan.infeasible {
        warn!(%error, "stop left unsnapped");
    }

    info!(
        requested = stops.len(),
        snapped = plan.assignments.len(),
        unsnapped = plan.unsnapped_count(),
        solver = solver.name(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "planned snapping"
    );
    Ok(plan)
}
