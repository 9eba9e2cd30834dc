mod support;

use modenet_network::prelude::*;

use support::{corridor, corridor_with_schedule};

fn with_stops() -> Network {
    let mut network = corridor();
    network
        .add_stops(vec![
            Stop::new("s1", 5.0, 3.0, "bus"),
            Stop::new("s2", 150.0, 4.0, "bus"),
        ])
        .unwrap();
    network
}

#[test]
fn test_route_without_stops_is_rejected() {
    let mut network = with_stops();
    let before = network.change_log().len();

    let err = network
        .add_service(
            Service::new("svc", "Empty"),
            vec![Route::new("r", "bus").with_links(["ab"])],
        )
        .unwrap_err();

    assert!(matches!(err, NetworkError::EmptyRoute(id) if id == RouteId::new("r")));
    assert!(!network.schedule().has_service(&"svc".into()));
    assert_eq!(network.change_log().len(), before);
}

#[test]
fn test_disconnected_link_path_is_rejected() {
    let mut network = with_stops();

    let err = network
        .add_service(
            Service::new("svc", "Skip"),
            vec![Route::new("r", "bus")
                .with_stops(["s1", "s2"])
                .with_links(["ab", "cd"])],
        )
        .unwrap_err();

    match err {
        NetworkError::DisconnectedRoute { route, previous, next } => {
            assert_eq!(route, RouteId::new("r"));
            assert_eq!(previous, LinkId::new("ab"));
            assert_eq!(next, LinkId::new("cd"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_route_with_unknown_references_is_rejected() {
    let mut network = with_stops();

    assert!(matches!(
        network.add_service(
            Service::new("svc", "Ghost stop"),
            vec![Route::new("r", "bus").with_stops(["s1", "s9"])],
        ),
        Err(NetworkError::UnknownStop(_))
    ));
    assert!(matches!(
        network.add_service(
            Service::new("svc", "Ghost link"),
            vec![Route::new("r", "bus").with_stops(["s1"]).with_links(["zz"])],
        ),
        Err(NetworkError::UnknownLink(_))
    ));
    assert!(matches!(
        network.add_route_to_service(&"nope".into(), Route::new("r", "bus").with_stops(["s1"])),
        Err(NetworkError::UnknownService(_))
    ));
}

#[test]
fn test_add_service_logs_service_then_routes() {
    let mut network = with_stops();
    let before = network.change_log().len();

    network
        .add_service(
            Service::new("svc", "Two routes"),
            vec![
                Route::new("r2", "bus").with_stops(["s2", "s1"]),
                Route::new("r1", "bus").with_stops(["s1", "s2"]).with_links(["ab", "bc"]),
            ],
        )
        .unwrap();

    let targets: Vec<_> = network.change_log().entries()[before..]
        .iter()
        .map(|e| (e.change.target, e.change.target_id.clone()))
        .collect();
    assert_eq!(
        targets,
        [
            (EntityKind::Service, "svc".to_owned()),
            (EntityKind::Route, "r2".to_owned()),
            (EntityKind::Route, "r1".to_owned()),
        ]
    );
    assert_eq!(network.schedule().service_of(&"r1".into()), Some(&ServiceId::new("svc")));
    assert_eq!(network.schedule().route_ids_of(&"svc".into()).len(), 2);
}

#[test]
fn test_remove_service_cascades_to_routes() {
    let mut network = corridor_with_schedule();
    network
        .add_route_to_service(&"svc1".into(), Route::new("r0", "bus").with_stops(["s3"]))
        .unwrap();
    let before = network.change_log().len();

    network.remove_service(&"svc1".into()).unwrap();

    let targets: Vec<_> = network.change_log().entries()[before..]
        .iter()
        .map(|e| (e.change.kind, e.change.target, e.change.target_id.clone()))
        .collect();
    assert_eq!(
        targets,
        [
            (ChangeKind::Remove, EntityKind::Route, "r0".to_owned()),
            (ChangeKind::Remove, EntityKind::Route, "r1".to_owned()),
            (ChangeKind::Remove, EntityKind::Service, "svc1".to_owned()),
        ]
    );
    assert_eq!(network.schedule().route_count(), 0);
    assert_eq!(network.schedule().stop_count(), 3);
}

#[test]
fn test_duplicate_route_ids_are_rejected_across_services() {
    let mut network = corridor_with_schedule();

    let err = network
        .add_service(
            Service::new("svc2", "Copy"),
            vec![Route::new("r1", "bus").with_stops(["s1"])],
        )
        .unwrap_err();

    assert!(matches!(err, NetworkError::DuplicateId { kind: "route", .. }));
    assert!(!network.schedule().has_service(&"svc2".into()));
}

#[test]
fn test_routes_serving_stop() {
    let network = corridor_with_schedule();
    let routes = network.schedule().routes_serving_stop(&"s2".into());
    assert_eq!(routes.into_iter().collect::<Vec<_>>(), [RouteId::new("r1")]);
}

#[test]
fn test_reroute_that_breaks_a_route_is_rejected() {
    let mut network = corridor_with_schedule();
    let before = network.clone();

    let err = network
        .reroute_link(&"bc".into(), &"d".into(), &"c".into())
        .unwrap_err();

    match err {
        NetworkError::DisconnectedRoute { route, previous, next } => {
            assert_eq!(route, RouteId::new("r1"));
            assert_eq!(previous, LinkId::new("ab"));
            assert_eq!(next, LinkId::new("bc"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(network.same_state(&before));
    assert_eq!(network.change_log().len(), before.change_log().len());

    // links no route runs over move freely
    network
        .reroute_link(&"da".into(), &"d".into(), &"b".into())
        .unwrap();
    assert!(validate(&network, &ValidationConfig::default()).schedule.is_empty());
}
