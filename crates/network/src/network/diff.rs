//! Minimal edit scripts between two networks.

use std::collections::BTreeMap;

use super::apply::State;
use super::Network;
use crate::changelog::{Change, Snapshot};
use crate::identifiers::LinkId;

impl Network {
    /// Changes that turn `self` into `other`, ordered so that
    /// [`Network::apply_changes`] accepts them.
    ///
    /// Routes that change owner, or that run over a link whose endpoints
    /// move, are removed and re-added rather than modified. That lets their
    /// old service be removed, and their links move, in between.
    pub fn diff(&self, other: &Network) -> Vec<Change> {
        let (ours, theirs) = (&self.state, &other.state);

        let routes = compare(route_snapshots(ours), route_snapshots(theirs), |a, b| {
            match (a, b) {
                (
                    Snapshot::Route { service: sa, route },
                    Snapshot::Route { service: sb, .. },
                ) => sa != sb || route.links.iter().any(|id| moves(ours, theirs, id)),
                _ => false,
            }
        });
        let services = compare(service_snapshots(ours), service_snapshots(theirs), in_place);
        let stops = compare(stop_snapshots(ours), stop_snapshots(theirs), in_place);
        let links = compare(link_snapshots(ours), link_snapshots(theirs), in_place);
        let nodes = compare(node_snapshots(ours), node_snapshots(theirs), in_place);

        let mut script = Vec::new();
        script.extend(routes.removed);
        script.extend(services.removed);
        script.extend(stops.removed);
        script.extend(links.removed);
        if ours.crs != theirs.crs {
            script.push(Change::modify(
                Snapshot::Crs(ours.crs.clone()),
                Snapshot::Crs(theirs.crs.clone()),
            ));
        }
        script.extend(nodes.upserted);
        script.extend(links.upserted);
        // Old endpoints may only be dropped once links have moved off them.
        script.extend(nodes.removed);
        script.extend(stops.upserted);
        script.extend(services.upserted);
        script.extend(routes.upserted);
        script
    }
}

struct Comparison {
    removed: Vec<Change>,
    upserted: Vec<Change>,
}

fn in_place(_: &Snapshot, _: &Snapshot) -> bool {
    false
}

/// True when link `id` exists on both sides with different endpoints.
fn moves(ours: &State, theirs: &State, id: &LinkId) -> bool {
    match (ours.graph.link(id), theirs.graph.link(id)) {
        (Some(a), Some(b)) => a.from != b.from || a.to != b.to,
        _ => false,
    }
}

/// Split into removals and additions/modifications. Entities for which
/// `rebuild` returns true are removed and re-added, even when unchanged.
fn compare(
    ours: BTreeMap<String, Snapshot>,
    mut theirs: BTreeMap<String, Snapshot>,
    rebuild: impl Fn(&Snapshot, &Snapshot) -> bool,
) -> Comparison {
    let mut removed = Vec::new();
    let mut upserted = Vec::new();

    for (id, before) in ours {
        match theirs.remove(&id) {
            None => removed.push(Change::remove(before)),
            Some(after) if rebuild(&before, &after) => {
                removed.push(Change::remove(before));
                upserted.push(Change::add(after));
            }
            Some(after) if after == before => {}
            Some(after) => upserted.push(Change::modify(before, after)),
        }
    }
    upserted.extend(theirs.into_values().map(Change::add));

    Comparison { removed, upserted }
}

fn node_snapshots(state: &State) -> BTreeMap<String, Snapshot> {
    state
        .graph
        .nodes()
        .map(|n| (n.id.to_string(), Snapshot::Node(n.clone())))
        .collect()
}

fn link_snapshots(state: &State) -> BTreeMap<String, Snapshot> {
    state
        .graph
        .links()
        .map(|l| (l.id.to_string(), Snapshot::Link(l.clone())))
        .collect()
}

fn stop_snapshots(state: &State) -> BTreeMap<String, Snapshot> {
    state
        .schedule
        .stops()
        .map(|s| (s.id.to_string(), Snapshot::Stop(s.clone())))
        .collect()
}

fn service_snapshots(state: &State) -> BTreeMap<String, Snapshot> {
    state
        .schedule
        .services()
        .map(|s| (s.id.to_string(), Snapshot::Service(s.clone())))
        .collect()
}

fn route_snapshots(state: &State) -> BTreeMap<String, Snapshot> {
    state
        .schedule
        .routes()
        .filter_map(|route| {
            let service = state.schedule.service_of(&route.id)?.clone();
            Some((
                route.id.to_string(),
                Snapshot::Route {
                    service,
                    route: route.clone(),
                },
            ))
        })
        .collect()
}
