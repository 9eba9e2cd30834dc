//! Read-only analyses of a network.
//!
//! Findings are returned as data, never as errors, and nothing is repaired
//! automatically. Reports are deterministic: validating an unchanged network
//! twice yields equal reports.

mod graph;
mod schedule;

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::identifiers::NodeId;
use crate::network::Network;

pub use graph::{analyse_mode, ModeReport};
pub use schedule::{check_schedule, ScheduleIssue};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Modes to analyse. Empty means every mode present in the graph.
    pub modes: BTreeSet<String>,
    /// Nodes where the network is cut off by its study area; they are never
    /// reported as dead-ends or sources.
    pub boundary_nodes: BTreeSet<NodeId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub modes: Vec<ModeReport>,
    pub schedule: Vec<ScheduleIssue>,
}

impl ValidationReport {
    pub fn is_healthy(&self) -> bool {
        self.modes.iter().all(ModeReport::is_healthy) && self.schedule.is_empty()
    }

    pub fn mode(&self, mode: &str) -> Option<&ModeReport> {
        self.modes.iter().find(|m| m.mode == mode)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.is_healthy() { "OK" } else { "FAILED" };
        writeln!(f, "Validation {status}")?;
        for mode in &self.modes {
            write!(f, "{mode}")?;
        }
        if self.schedule.is_empty() {
            writeln!(f, "schedule: no issues")?;
        } else {
            writeln!(f, "schedule: {} issues", self.schedule.len())?;
            for issue in &self.schedule {
                writeln!(f, "  {issue}")?;
            }
        }
        Ok(())
    }
}

/// Run every analysis over `network`.
pub fn validate(network: &Network, config: &ValidationConfig) -> ValidationReport {
    let graph = network.graph();
    let modes = if config.modes.is_empty() {
        graph.modes()
    } else {
        config.modes.clone()
    };

    let modes: Vec<ModeReport> = modes
        .iter()
        .map(|mode| analyse_mode(graph, mode, &config.boundary_nodes))
        .collect();
    let schedule = check_schedule(network.schedule(), graph);

    let report = ValidationReport { modes, schedule };
    info!(
        healthy = report.is_healthy(),
        modes = report.modes.len(),
        schedule_issues = report.schedule.len(),
        "validated network"
    );
    report
}
