//! The network object: graph, schedule and change log behind one mutation
//! path.
//!
//! Every mutator validates its whole input first, then builds the list of
//! changes it implies, applies them and appends them to the log. A call that
//! returns `Err` has changed nothing.

mod apply;
mod diff;
pub mod traits;

use std::collections::HashSet;

use tracing::{debug, info};

use crate::changelog::{Change, ChangeLog, Snapshot};
use crate::error::{NetworkError, Result};
use crate::graph::{Graph, Link, LinkPatch, Node, NodePatch};
use crate::identifiers::*;
use crate::schedule::{Route, Schedule, Service, Stop, StopPatch};

use apply::State;
pub use traits::{BoxError, Reprojector};

#[derive(Clone, Debug)]
pub struct Network {
    state: State,
    log: ChangeLog,
}

impl Network {
    /// Create an empty network whose coordinates are in `crs`.
    pub fn new(crs: impl Into<String>) -> Self {
        Self {
            state: State::new(crs.into()),
            log: ChangeLog::new(),
        }
    }

    pub fn crs(&self) -> &str {
        &self.state.crs
    }

    pub fn graph(&self) -> &Graph {
        &self.state.graph
    }

    pub fn schedule(&self) -> &Schedule {
        &self.state.schedule
    }

    pub fn change_log(&self) -> &ChangeLog {
        &self.log
    }

    /// True when both networks hold the same CRS, graph and schedule. Change
    /// logs are not compared.
    pub fn same_state(&self, other: &Network) -> bool {
        self.state == other.state
    }

    fn commit(&mut self, changes: Vec<Change>) {
        if changes.is_empty() {
            return;
        }
        for change in &changes {
            self.state.apply(change);
        }
        debug!(
            count = changes.len(),
            first = %changes[0].target_id,
            "committed changes"
        );
        self.log.append(changes);
    }

    // ========================================================================
    // Graph
    // ========================================================================

    pub fn add_node(&mut self, node: Node) -> Result<()> {
        self.add_nodes(vec![node])
    }

    /// Add several nodes at once. Nothing is added if any id is taken or
    /// repeated within the batch.
    pub fn add_nodes(&mut self, nodes: Vec<Node>) -> Result<()> {
        let mut seen = HashSet::new();
        for node in &nodes {
            if self.graph().has_node(&node.id) || !seen.insert(&node.id) {
                return Err(NetworkError::duplicate("node", &node.id));
            }
        }
        self.commit(nodes.into_iter().map(|n| Change::add(Snapshot::Node(n))).collect());
        Ok(())
    }

    /// Add a link. A link between the same pair of nodes as an existing one
    /// is a legal parallel edge as long as its id is new.
    pub fn add_link(&mut self, link: Link) -> Result<()> {
        self.add_links(vec![link])
    }

    pub fn add_links(&mut self, links: Vec<Link>) -> Result<()> {
        let mut seen = HashSet::new();
        for link in &links {
            self.require_node(&link.from)?;
            self.require_node(&link.to)?;
            if self.graph().has_link(&link.id) || !seen.insert(&link.id) {
                return Err(NetworkError::duplicate("link", &link.id));
            }
        }
        self.commit(links.into_iter().map(|l| Change::add(Snapshot::Link(l))).collect());
        Ok(())
    }

    pub fn remove_link(&mut self, id: &LinkId) -> Result<Link> {
        let link = self.require_link(id)?.clone();
        self.commit(vec![Change::remove(Snapshot::Link(link.clone()))]);
        Ok(link)
    }

    /// Remove a node and, before it, every link touching it (in id order).
    pub fn remove_node(&mut self, id: &NodeId) -> Result<Node> {
        let node = self.require_node(id)?.clone();
        let graph = self.graph();
        let mut changes: Vec<Change> = graph
            .incident_link_ids(id)
            .iter()
            .filter_map(|link_id| graph.link(link_id))
            .map(|link| Change::remove(Snapshot::Link(link.clone())))
            .collect();
        changes.push(Change::remove(Snapshot::Node(node.clone())));
        self.commit(changes);
        Ok(node)
    }

    pub fn modify_node(&mut self, id: &NodeId, patch: NodePatch) -> Result<()> {
        let before = self.require_node(id)?.clone();
        let after = before.patched(patch);
        if after != before {
            self.commit(vec![Change::modify(Snapshot::Node(before), Snapshot::Node(after))]);
        }
        Ok(())
    }

    /// Merge `patch` into a link's attributes. A patch that changes nothing
    /// is not logged.
    pub fn modify_link_attributes(&mut self, id: &LinkId, patch: LinkPatch) -> Result<()> {
        let before = self.require_link(id)?.clone();
        let after = before.patched(patch);
        if after != before {
            self.commit(vec![Change::modify(Snapshot::Link(before), Snapshot::Link(after))]);
        }
        Ok(())
    }

    /// Patch several links as one all-or-nothing batch.
    pub fn modify_links(&mut self, patches: Vec<(LinkId, LinkPatch)>) -> Result<()> {
        let mut changes = Vec::with_capacity(patches.len());
        let mut seen = HashSet::new();
        for (id, patch) in patches {
            let before = self.require_link(&id)?.clone();
            if !seen.insert(id.clone()) {
                return Err(NetworkError::InvalidChange(format!(
                    "link {id} patched twice in one batch"
                )));
            }
            let after = before.patched(patch);
            if after != before {
                changes.push(Change::modify(Snapshot::Link(before), Snapshot::Link(after)));
            }
        }
        self.commit(changes);
        Ok(())
    }

    /// Move a link onto new endpoints, keeping its id and attributes.
    ///
    /// Fails with [`NetworkError::DisconnectedRoute`] if a route running over
    /// the link would no longer be contiguous.
    pub fn reroute_link(&mut self, id: &LinkId, from: &NodeId, to: &NodeId) -> Result<()> {
        let before = self.require_link(id)?.clone();
        self.require_node(from)?;
        self.require_node(to)?;
        if &before.from == from && &before.to == to {
            return Ok(());
        }
        let after = Link {
            from: from.clone(),
            to: to.clone(),
            ..before.clone()
        };
        self.state.check_link_move(&after)?;
        self.commit(vec![Change::modify(Snapshot::Link(before), Snapshot::Link(after))]);
        Ok(())
    }

    /// First integer id, counting up from the node count, that no node uses.
    pub fn generate_node_id(&self) -> NodeId {
        let graph = self.graph();
        fresh_id(graph.node_count(), |id| graph.has_node(&NodeId::new(id))).into()
    }

    /// First integer id, counting up from the link count, that no link uses.
    pub fn generate_link_id(&self) -> LinkId {
        let graph = self.graph();
        fresh_id(graph.link_count(), |id| graph.has_link(&LinkId::new(id))).into()
    }

    // ========================================================================
    // Schedule
    // ========================================================================

    pub fn add_stop(&mut self, stop: Stop) -> Result<()> {
        self.add_stops(vec![stop])
    }

    pub fn add_stops(&mut self, stops: Vec<Stop>) -> Result<()> {
        let mut seen = HashSet::new();
        for stop in &stops {
            if self.schedule().has_stop(&stop.id) || !seen.insert(&stop.id) {
                return Err(NetworkError::duplicate("stop", &stop.id));
            }
            if let Some(link) = &stop.linked_link {
                self.require_link(link)?;
            }
        }
        self.commit(stops.into_iter().map(|s| Change::add(Snapshot::Stop(s))).collect());
        Ok(())
    }

    /// Remove a stop. Routes still calling at it are left as they are and
    /// show up in schedule validation.
    pub fn remove_stop(&mut self, id: &StopId) -> Result<Stop> {
        let stop = self.require_stop(id)?.clone();
        self.commit(vec![Change::remove(Snapshot::Stop(stop.clone()))]);
        Ok(stop)
    }

    pub fn modify_stop(&mut self, id: &StopId, patch: StopPatch) -> Result<()> {
        self.modify_stops(vec![(id.clone(), patch)])
    }

    /// Patch several stops as one all-or-nothing batch.
    pub fn modify_stops(&mut self, patches: Vec<(StopId, StopPatch)>) -> Result<()> {
        let mut changes = Vec::with_capacity(patches.len());
        let mut seen = HashSet::new();
        for (id, patch) in patches {
            let before = self.require_stop(&id)?.clone();
            if !seen.insert(id.clone()) {
                return Err(NetworkError::InvalidChange(format!(
                    "stop {id} patched twice in one batch"
                )));
            }
            if let Some(Some(link)) = &patch.linked_link {
                self.require_link(link)?;
            }
            let after = before.patched(patch);
            if after != before {
                changes.push(Change::modify(Snapshot::Stop(before), Snapshot::Stop(after)));
            }
        }
        self.commit(changes);
        Ok(())
    }

    /// Add a service together with its routes. The service is logged first,
    /// then each route in the order given.
    pub fn add_service(&mut self, service: Service, routes: Vec<Route>) -> Result<()> {
        if self.schedule().has_service(&service.id) {
            return Err(NetworkError::duplicate("service", &service.id));
        }
        let mut seen = HashSet::new();
        for route in &routes {
            if self.schedule().has_route(&route.id) || !seen.insert(&route.id) {
                return Err(NetworkError::duplicate("route", &route.id));
            }
            self.state.check_route(route)?;
        }

        let service_id = service.id.clone();
        let mut changes = vec![Change::add(Snapshot::Service(service))];
        changes.extend(routes.into_iter().map(|route| {
            Change::add(Snapshot::Route {
                service: service_id.clone(),
                route,
            })
        }));
        self.commit(changes);
        Ok(())
    }

    pub fn add_route_to_service(&mut self, service: &ServiceId, route: Route) -> Result<()> {
        if !self.schedule().has_service(service) {
            return Err(NetworkError::UnknownService(service.clone()));
        }
        if self.schedule().has_route(&route.id) {
            return Err(NetworkError::duplicate("route", &route.id));
        }
        self.state.check_route(&route)?;
        self.commit(vec![Change::add(Snapshot::Route {
            service: service.clone(),
            route,
        })]);
        Ok(())
    }

    pub fn remove_route(&mut self, id: &RouteId) -> Result<Route> {
        let schedule = self.schedule();
        let (service, route) = match (schedule.service_of(id), schedule.route(id)) {
            (Some(service), Some(route)) => (service.clone(), route.clone()),
            _ => return Err(NetworkError::UnknownRoute(id.clone())),
        };
        self.commit(vec![Change::remove(Snapshot::Route {
            service,
            route: route.clone(),
        })]);
        Ok(route)
    }

    /// Remove a service and, before it, each of its routes (in id order).
    pub fn remove_service(&mut self, id: &ServiceId) -> Result<Service> {
        let schedule = self.schedule();
        let service = schedule
            .service(id)
            .cloned()
            .ok_or_else(|| NetworkError::UnknownService(id.clone()))?;
        let mut changes: Vec<Change> = schedule
            .routes_of(id)
            .into_iter()
            .map(|route| {
                Change::remove(Snapshot::Route {
                    service: id.clone(),
                    route: route.clone(),
                })
            })
            .collect();
        changes.push(Change::remove(Snapshot::Service(service.clone())));
        self.commit(changes);
        Ok(service)
    }

    // ========================================================================
    // Reprojection
    // ========================================================================

    /// Move every node and stop into the reprojector's target CRS.
    ///
    /// All coordinates are transformed before anything is written; if any
    /// point fails, the network is left untouched. Returns the number of
    /// entities moved.
    pub fn reproject(&mut self, reprojector: &dyn Reprojector) -> Result<usize> {
        let mut changes = Vec::new();
        for id in self.graph().node_ids() {
            let Some(node) = self.graph().node(&id) else {
                continue;
            };
            let location = reprojector
                .reproject(node.location)
                .map_err(|e| reprojection_failed("node", &id, e))?;
            let after = Node {
                location,
                ..node.clone()
            };
            changes.push(Change::modify(Snapshot::Node(node.clone()), Snapshot::Node(after)));
        }
        for id in self.schedule().stop_ids() {
            let Some(stop) = self.schedule().stop(&id) else {
                continue;
            };
            let location = reprojector
                .reproject(stop.location)
                .map_err(|e| reprojection_failed("stop", &id, e))?;
            let after = Stop {
                location,
                ..stop.clone()
            };
            changes.push(Change::modify(Snapshot::Stop(stop.clone()), Snapshot::Stop(after)));
        }

        let moved = changes.len();
        let target = reprojector.target_crs();
        if target != self.crs() {
            changes.push(Change::modify(
                Snapshot::Crs(self.crs().to_owned()),
                Snapshot::Crs(target.to_owned()),
            ));
        }
        info!(from = %self.crs(), to = %target, moved, "reprojected network");
        self.commit(changes);
        Ok(moved)
    }

    // ========================================================================
    // Edit scripts
    // ========================================================================

    /// Apply an externally produced edit script (e.g. from [`Network::diff`]
    /// or another network's change log) as one all-or-nothing batch.
    pub fn apply_changes(&mut self, changes: Vec<Change>) -> Result<()> {
        let mut staged = self.state.clone();
        for change in &changes {
            staged.check(change)?;
            staged.apply(change);
        }
        self.state = staged;
        self.log.append(changes);
        Ok(())
    }

    /// Rebuild a network from an edit script, starting from an empty network
    /// in `crs`.
    pub fn replay<'a>(
        crs: impl Into<String>,
        changes: impl IntoIterator<Item = &'a Change>,
    ) -> Result<Network> {
        let mut network = Network::new(crs);
        network.apply_changes(changes.into_iter().cloned().collect())?;
        Ok(network)
    }

    // ---- Lookup helpers ----

    fn require_node(&self, id: &NodeId) -> Result<&Node> {
        self.graph()
            .node(id)
            .ok_or_else(|| NetworkError::UnknownNode(id.clone()))
    }

    fn require_link(&self, id: &LinkId) -> Result<&Link> {
        self.graph()
            .link(id)
            .ok_or_else(|| NetworkError::UnknownLink(id.clone()))
    }

    fn require_stop(&self, id: &StopId) -> Result<&Stop> {
        self.schedule()
            .stop(id)
            .ok_or_else(|| NetworkError::UnknownStop(id.clone()))
    }
}

fn reprojection_failed(kind: &str, id: impl std::fmt::Display, e: BoxError) -> NetworkError {
    NetworkError::Reprojection(format!("{kind} {id}: {e}"))
}

fn fresh_id(start: usize, taken: impl Fn(&str) -> bool) -> String {
    (start..)
        .map(|n| n.to_string())
        .find(|id| !taken(id))
        .unwrap_or_default()
}
