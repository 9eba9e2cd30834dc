mod support;

use std::collections::BTreeSet;
use std::sync::atomic::AtomicBool;
use std::thread;
use std::time::Duration;

use approx::assert_relative_eq;
use modenet_network::prelude::*;
use modenet_snapping::prelude::*;

use support::{add_stops, init_tracing, street};

fn capped(capacity: usize) -> SnapConfig {
    SnapConfig {
        link_capacity: Some(capacity),
        ..SnapConfig::default()
    }
}

/// Four stops competing for two links.
fn contested() -> (Network, Vec<StopId>) {
    let mut network = street(2);
    let stops = add_stops(
        &mut network,
        &[(20.0, 5.0), (50.0, 3.0), (80.0, 8.0), (150.0, 4.0)],
    );
    (network, stops)
}

#[test]
fn test_capacity_one_is_an_optimal_bijection() {
    init_tracing();
    let (network, stops) = contested();

    let plan = plan_snapping(&network, &stops, &capped(1)).unwrap();

    let links: BTreeSet<_> = plan.assignments.iter().map(|a| a.link.clone()).collect();
    assert_eq!(links.len(), plan.assignments.len());
    assert_eq!(plan.link_for(&"s1".into()), Some(&LinkId::new("l0")));
    assert_eq!(plan.link_for(&"s3".into()), Some(&LinkId::new("l1")));
    assert_relative_eq!(plan.total_distance(), 7.0);

    // 4 stops, 2 reachable links
    assert_eq!(plan.unsnapped_count(), 2);
    let unsnapped: Vec<_> = plan.infeasible.iter().map(|e| e.stop.as_str()).collect();
    assert_eq!(unsnapped, ["s0", "s2"]);
    assert!(plan
        .infeasible
        .iter()
        .all(|e| e.reason == InfeasibleReason::CapacityExhausted));
}

#[test]
fn test_uncapped_links_take_every_stop() {
    let (network, stops) = contested();

    for solver in [SolverKind::KuhnMunkres, SolverKind::Greedy] {
        let config = SnapConfig {
            solver,
            ..SnapConfig::default()
        };
        let plan = plan_snapping(&network, &stops, &config).unwrap();

        assert!(plan.is_complete());
        assert_eq!(plan.link_for(&"s2".into()), Some(&LinkId::new("l0")));
        assert_relative_eq!(plan.total_distance(), 20.0);
    }
}

#[test]
fn test_stop_without_candidates_does_not_abort_batch() {
    let mut network = street(2);
    let stops = add_stops(&mut network, &[(50.0, 3.0), (50.0, 500.0), (150.0, 2.0)]);

    let plan = plan_snapping(&network, &stops, &capped(1)).unwrap();

    assert_eq!(plan.assignments.len(), 2);
    assert_eq!(
        plan.infeasible,
        [SolverInfeasibleError {
            stop: "s1".into(),
            reason: InfeasibleReason::NoCandidate,
        }]
    );
    assert!(plan.timeout.is_none());
}

#[test]
fn test_stop_modes_limit_candidates() {
    let mut network = street(1);
    network
        .add_stop(Stop::new("station", 50.0, 990.0, "rail"))
        .unwrap();

    let bus_only = plan_snapping(&network, &["station".into()], &SnapConfig::default()).unwrap();
    assert_eq!(bus_only.infeasible.len(), 1);

    let own_mode = SnapConfig {
        modes: BTreeSet::new(),
        ..SnapConfig::default()
    };
    let plan = plan_snapping(&network, &["station".into()], &own_mode).unwrap();
    assert_eq!(plan.link_for(&"station".into()), Some(&LinkId::new("rail")));
}

#[test]
fn test_zero_timeout_leaves_components_unresolved() {
    let mut network = street(3);
    let stops = add_stops(&mut network, &[(50.0, 3.0), (250.0, 3.0), (50.0, 500.0)]);
    let config = SnapConfig {
        timeout: Some(Duration::ZERO),
        ..capped(1)
    };

    let plan = plan_snapping(&network, &stops, &config).unwrap();

    assert!(plan.assignments.is_empty());
    assert_eq!(plan.unresolved, [StopId::new("s0"), StopId::new("s1")]);
    assert_eq!(plan.infeasible.len(), 1);
    assert_eq!(plan.timeout.as_ref().map(|t| t.unresolved), Some(2));
    assert!(plan.to_string().contains("deadline"));
}

/// Greedy, but slow: every call outlasts the deadline used below.
struct Sluggish;

impl AssignmentSolver for Sluggish {
    fn name(&self) -> &'static str {
        "sluggish"
    }

    fn solve(&self, problem: &AssignmentProblem) -> modenet_snapping::snapping::Solution {
        thread::sleep(Duration::from_millis(300));
        GreedySolver.solve(problem)
    }
}

#[test]
fn test_deadline_keeps_solved_components() {
    let mut network = street(5);
    // one stop per component, on l0, l2 and l4
    let stops = add_stops(&mut network, &[(50.0, 3.0), (250.0, 3.0), (450.0, 3.0)]);
    let config = SnapConfig {
        timeout: Some(Duration::from_millis(200)),
        ..capped(1)
    };

    let plan =
        plan_snapping_with(&network, &stops, &config, &Sluggish, &AtomicBool::new(false)).unwrap();

    assert_eq!(plan.link_for(&"s0".into()), Some(&LinkId::new("l0")));
    assert_eq!(plan.unresolved, [StopId::new("s1"), StopId::new("s2")]);
    assert!(plan.infeasible.is_empty());
    assert_eq!(plan.timeout.as_ref().map(|t| t.unresolved), Some(2));
}

#[test]
fn test_blocks_share_link_capacity() {
    let (network, stops) = contested();
    let config = SnapConfig {
        max_component_stops: 1,
        ..capped(1)
    };

    for solver in [SolverKind::KuhnMunkres, SolverKind::Greedy] {
        let plan = plan_snapping(&network, &stops, &SnapConfig { solver, ..config.clone() }).unwrap();

        let links: BTreeSet<_> = plan.assignments.iter().map(|a| a.link.clone()).collect();
        assert_eq!(links.len(), plan.assignments.len());
        assert_eq!(plan.assignments.len(), 2);
        assert_eq!(plan.unsnapped_count(), 2);
    }
}

#[test]
fn test_cancelled_run_returns_no_plan() {
    let (network, stops) = contested();
    let before = network.clone();

    let result = plan_snapping_cancellable(&network, &stops, &capped(1), &AtomicBool::new(true));

    assert!(matches!(result, Err(SnapError::Cancelled)));
    assert!(network.same_state(&before));
    assert_eq!(network.change_log().len(), before.change_log().len());
}

#[test]
fn test_applied_plan_is_logged() {
    let (mut network, stops) = contested();
    let before = network.change_log().len();

    let plan = plan_snapping(&network, &stops, &capped(1)).unwrap();
    let written = plan.apply(&mut network).unwrap();

    assert_eq!(written, 2);
    assert_eq!(network.change_log().len(), before + 2);
    let stop = network.schedule().stop(&"s3".into()).unwrap();
    assert_eq!(stop.linked_link, Some(LinkId::new("l1")));
    assert!(network
        .change_log()
        .since(before as u64)
        .iter()
        .all(|e| e.change.kind == ChangeKind::Modify && e.change.target == EntityKind::Stop));

    let replayed = Network::replay("EPSG:27700", network.change_log().changes()).unwrap();
    assert!(replayed.same_state(&network));
}

#[test]
fn test_stale_plan_is_rejected_whole() {
    let (mut network, stops) = contested();
    let plan = plan_snapping(&network, &stops, &capped(1)).unwrap();
    network.remove_stop(&"s3".into()).unwrap();
    let before = network.clone();

    let err = plan.apply(&mut network).unwrap_err();

    assert!(matches!(err, SnapError::Network(NetworkError::UnknownStop(_))));
    assert!(network.same_state(&before));
}
