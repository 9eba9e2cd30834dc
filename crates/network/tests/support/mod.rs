#![allow(dead_code)]

use modenet_network::prelude::*;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// a → b → c → d along the x axis, every link open to car and bus, plus a
/// rail link d → a.
pub fn corridor() -> Network {
    let mut network = Network::new("EPSG:27700");
    network
        .add_nodes(vec![
            Node::new("a", 0.0, 0.0),
            Node::new("b", 100.0, 0.0),
            Node::new("c", 200.0, 0.0),
            Node::new("d", 300.0, 0.0),
        ])
        .unwrap();
    network
        .add_links(vec![
            Link::new("ab", "a", "b").with_modes(["car", "bus"]).with_length(100.0),
            Link::new("bc", "b", "c").with_modes(["car", "bus"]).with_length(100.0),
            Link::new("cd", "c", "d").with_modes(["car", "bus"]).with_length(100.0),
            Link::new("da", "d", "a").with_modes(["rail"]).with_length(300.0),
        ])
        .unwrap();
    network
}

/// `corridor` plus three stops and one bus service running a → d.
pub fn corridor_with_schedule() -> Network {
    let mut network = corridor();
    network
        .add_stops(vec![
            Stop::new("s1", 5.0, 3.0, "bus").with_name("First"),
            Stop::new("s2", 150.0, 4.0, "bus").with_name("Middle"),
            Stop::new("s3", 295.0, -2.0, "bus").with_name("Last"),
        ])
        .unwrap();
    network
        .add_service(
            Service::new("svc1", "Bus 1"),
            vec![Route::new("r1", "bus")
                .with_stops(["s1", "s2", "s3"])
                .with_links(["ab", "bc", "cd"])],
        )
        .unwrap();
    network
}
