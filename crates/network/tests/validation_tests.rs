mod support;

use std::collections::BTreeSet;

use modenet_network::prelude::*;

use support::{corridor, corridor_with_schedule, init_tracing};

#[test]
fn test_corridor_reports_per_mode() {
    init_tracing();
    let network = corridor();

    let report = validate(&network, &ValidationConfig::default());

    let modes: Vec<_> = report.modes.iter().map(|m| m.mode.as_str()).collect();
    assert_eq!(modes, ["bus", "car", "rail"]);

    let car = report.mode("car").unwrap();
    assert_eq!(car.sources, BTreeSet::from([NodeId::new("a")]));
    assert_eq!(car.dead_ends, BTreeSet::from([NodeId::new("d")]));
    assert_eq!(car.link_count, 3);
    assert_eq!(car.components.len(), 1);
    assert_eq!(car.strongly_connected_components, 4);

    let rail = report.mode("rail").unwrap();
    assert_eq!(rail.node_count, 2);
    assert_eq!(rail.sources, BTreeSet::from([NodeId::new("d")]));
    assert_eq!(rail.dead_ends, BTreeSet::from([NodeId::new("a")]));
    assert!(!report.is_healthy());
}

#[test]
fn test_closing_the_loop_makes_mode_healthy() {
    let mut network = corridor();
    network
        .add_link(Link::new("da_car", "d", "a").with_modes(["car"]))
        .unwrap();

    let config = ValidationConfig {
        modes: BTreeSet::from(["car".to_owned()]),
        ..ValidationConfig::default()
    };
    let report = validate(&network, &config);

    assert_eq!(report.modes.len(), 1);
    let car = &report.modes[0];
    assert!(car.is_healthy());
    assert_eq!(car.strongly_connected_components, 1);
}

#[test]
fn test_validation_is_idempotent_and_read_only() {
    let network = corridor_with_schedule();
    let log_len = network.change_log().len();

    let first = validate(&network, &ValidationConfig::default());
    let second = validate(&network, &ValidationConfig::default());

    assert_eq!(first, second);
    assert_eq!(first.to_string(), second.to_string());
    assert_eq!(network.change_log().len(), log_len);
}

#[test]
fn test_boundary_nodes_silence_open_ends() {
    let network = corridor();
    let config = ValidationConfig {
        modes: BTreeSet::from(["bus".to_owned()]),
        boundary_nodes: BTreeSet::from([NodeId::new("a"), NodeId::new("d")]),
    };

    let report = validate(&network, &config);

    assert!(report.mode("bus").unwrap().is_healthy());
}

#[test]
fn test_schedule_issues_after_removing_link_and_stop() {
    let mut network = corridor_with_schedule();
    network
        .modify_stop(&"s2".into(), StopPatch::default().linked_link(Some("bc".into())))
        .unwrap();
    assert!(validate(&network, &ValidationConfig::default()).schedule.is_empty());

    network.remove_link(&"bc".into()).unwrap();
    network.remove_stop(&"s3".into()).unwrap();

    let report = validate(&network, &ValidationConfig::default());
    assert_eq!(
        report.schedule,
        [
            ScheduleIssue::MissingStop {
                service: "svc1".into(),
                route: "r1".into(),
                stop: "s3".into(),
            },
            ScheduleIssue::MissingLink {
                service: "svc1".into(),
                route: "r1".into(),
                link: "bc".into(),
            },
            ScheduleIssue::StopLinkMissing {
                stop: "s2".into(),
                link: "bc".into(),
            },
        ]
    );
    assert!(report.to_string().contains("schedule: 3 issues"));
}

#[test]
fn test_service_without_routes_is_reported() {
    let mut network = corridor_with_schedule();
    network.remove_route(&"r1".into()).unwrap();

    let issues = validate(&network, &ValidationConfig::default()).schedule;

    assert_eq!(
        issues,
        [ScheduleIssue::ServiceWithoutRoutes {
            service: "svc1".into()
        }]
    );
}

#[test]
fn test_report_serialises_to_json() {
    let network = corridor();
    let report = validate(&network, &ValidationConfig::default());

    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["modes"][1]["mode"], "car");
    assert_eq!(json["modes"][1]["dead_ends"][0], "d");
}
