#![allow(dead_code)]

use modenet_network::prelude::*;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// A street of `links` one-way bus links, each 100 units long, laid end to
/// end along the x axis, plus a rail line 1000 units north.
pub fn street(links: usize) -> Network {
    let mut network = Network::new("EPSG:27700");
    network
        .add_nodes(
            (0..=links)
                .map(|i| Node::new(format!("n{i}"), i as f64 * 100.0, 0.0))
                .chain([Node::new("r0", 0.0, 1000.0), Node::new("r1", 100.0, 1000.0)])
                .collect(),
        )
        .unwrap();
    network
        .add_links(
            (0..links)
                .map(|i| {
                    Link::new(format!("l{i}"), format!("n{i}"), format!("n{}", i + 1))
                        .with_modes(["car", "bus"])
                        .with_length(100.0)
                })
                .chain([Link::new("rail", "r0", "r1").with_modes(["rail"])])
                .collect(),
        )
        .unwrap();
    network
}

/// Add bus stops at the given coordinates, named `s0`, `s1`, ...
pub fn add_stops(network: &mut Network, coords: &[(f64, f64)]) -> Vec<StopId> {
    let stops: Vec<Stop> = coords
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| Stop::new(format!("s{i}"), x, y, "bus"))
        .collect();
    let ids = stops.iter().map(|s| s.id.clone()).collect();
    network.add_stops(stops).unwrap();
    ids
}
