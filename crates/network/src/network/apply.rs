//! Applying changes to network state.
//!
//! Changes built by `Network`'s own mutators are validated up front and
//! applied with [`State::apply`]. Changes from outside (replayed logs, diff
//! scripts) are first checked one by one with [`State::check`].

use crate::changelog::{Change, ChangeKind, Snapshot};
use crate::error::{NetworkError, Result};
use crate::graph::{Graph, Link};
use crate::schedule::{Route, Schedule};

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct State {
    pub crs: String,
    pub graph: Graph,
    pub schedule: Schedule,
}

impl State {
    pub fn new(crs: String) -> Self {
        Self {
            crs,
            ..Self::default()
        }
    }

    /// Apply a change whose preconditions hold.
    pub fn apply(&mut self, change: &Change) {
        match (change.kind, &change.before, &change.after) {
            (ChangeKind::Remove, Some(before), _) => self.take(before),
            (_, _, Some(after)) => self.put(after),
            _ => debug_assert!(false, "change without snapshot: {change:?}"),
        }
    }

    fn put(&mut self, snapshot: &Snapshot) {
        match snapshot {
            Snapshot::Node(node) => self.graph.insert_node(node.clone()),
            Snapshot::Link(link) => self.graph.insert_link(link.clone()),
            Snapshot::Stop(stop) => self.schedule.insert_stop(stop.clone()),
            Snapshot::Route { service, route } => {
                self.schedule.insert_route(service.clone(), route.clone())
            }
            Snapshot::Service(service) => self.schedule.insert_service(service.clone()),
            Snapshot::Crs(crs) => self.crs = crs.clone(),
        }
    }

    fn take(&mut self, snapshot: &Snapshot) {
        match snapshot {
            Snapshot::Node(node) => {
                self.graph.remove_node(&node.id);
            }
            Snapshot::Link(link) => {
                self.graph.remove_link(&link.id);
            }
            Snapshot::Stop(stop) => {
                self.schedule.remove_stop(&stop.id);
            }
            Snapshot::Route { route, .. } => {
                self.schedule.remove_route(&route.id);
            }
            Snapshot::Service(service) => {
                self.schedule.remove_service(&service.id);
            }
            Snapshot::Crs(_) => {}
        }
    }

    /// Verify that `change` can be applied to the current state without
    /// breaking a structural invariant.
    pub fn check(&self, change: &Change) -> Result<()> {
        let snapshot = match change.kind {
            ChangeKind::Remove => change.before.as_ref(),
            ChangeKind::Add | ChangeKind::Modify => change.after.as_ref(),
        }
        .ok_or_else(|| {
            NetworkError::InvalidChange(format!(
                "{:?} of {} carries no snapshot",
                change.kind, change.target_id
            ))
        })?;

        if snapshot.entity_kind() != change.target || snapshot.entity_id() != change.target_id {
            return Err(NetworkError::InvalidChange(format!(
                "snapshot of {:?} {} does not match target {:?} {}",
                snapshot.entity_kind(),
                snapshot.entity_id(),
                change.target,
                change.target_id
            )));
        }

        let exists = self.contains(snapshot);
        match change.kind {
            ChangeKind::Add if exists => {
                return Err(NetworkError::duplicate(
                    kind_name(snapshot),
                    snapshot.entity_id(),
                ))
            }
            ChangeKind::Modify | ChangeKind::Remove if !exists => {
                return Err(unknown(snapshot));
            }
            _ => {}
        }

        match (change.kind, snapshot) {
            (ChangeKind::Add | ChangeKind::Modify, Snapshot::Link(link)) => {
                for end in [&link.from, &link.to] {
                    if !self.graph.has_node(end) {
                        return Err(NetworkError::UnknownNode(end.clone()));
                    }
                }
                if let Some(current) = self.graph.link(&link.id) {
                    if current.from != link.from || current.to != link.to {
                        self.check_link_move(link)?;
                    }
                }
            }
            (ChangeKind::Remove, Snapshot::Node(node)) => {
                if !self.graph.incident_link_ids(&node.id).is_empty() {
                    return Err(NetworkError::InvalidChange(format!(
                        "node {} still has links",
                        node.id
                    )));
                }
            }
            (ChangeKind::Add | ChangeKind::Modify, Snapshot::Stop(stop)) => {
                let current = self.schedule.stop(&stop.id).and_then(|s| s.linked_link.as_ref());
                if let Some(link) = &stop.linked_link {
                    if current != Some(link) && !self.graph.has_link(link) {
                        return Err(NetworkError::UnknownLink(link.clone()));
                    }
                }
            }
            (ChangeKind::Add | ChangeKind::Modify, Snapshot::Route { service, route }) => {
                if !self.schedule.has_service(service) {
                    return Err(NetworkError::UnknownService(service.clone()));
                }
                self.check_route(route)?;
            }
            (ChangeKind::Remove, Snapshot::Service(service)) => {
                if !self.schedule.route_ids_of(&service.id).is_empty() {
                    return Err(NetworkError::InvalidChange(format!(
                        "service {} still has routes",
                        service.id
                    )));
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// Write-time route invariants: at least one stop, all stops and links
    /// known, and the link path contiguous.
    pub fn check_route(&self, route: &Route) -> Result<()> {
        if route.stops.is_empty() {
            return Err(NetworkError::EmptyRoute(route.id.clone()));
        }
        if let Some(stop) = route.stops.iter().find(|s| !self.schedule.has_stop(s)) {
            return Err(NetworkError::UnknownStop(stop.clone()));
        }
        if let Some(link) = route.links.iter().find(|l| !self.graph.has_link(l)) {
            return Err(NetworkError::UnknownLink(link.clone()));
        }
        match self.graph.first_path_break(&route.links) {
            Some(i) => Err(disconnected(route, i)),
            None => Ok(()),
        }
    }

    /// Routes running over `link` must stay contiguous once it takes its new
    /// endpoints. Routes already broken (by a removed link) are left to
    /// validation.
    pub fn check_link_move(&self, link: &Link) -> Result<()> {
        for id in self.schedule.routes_using_link(&link.id) {
            let Some(route) = self.schedule.route(&id) else {
                continue;
            };
            if self.graph.first_path_break(&route.links).is_some() {
                continue;
            }
            if let Some(i) = self.graph.first_path_break_with(&route.links, Some(link)) {
                return Err(disconnected(route, i));
            }
        }
        Ok(())
    }

    fn contains(&self, snapshot: &Snapshot) -> bool {
        match snapshot {
            Snapshot::Node(node) => self.graph.has_node(&node.id),
            Snapshot::Link(link) => self.graph.has_link(&link.id),
            Snapshot::Stop(stop) => self.schedule.has_stop(&stop.id),
            Snapshot::Route { route, .. } => self.schedule.has_route(&route.id),
            Snapshot::Service(service) => self.schedule.has_service(&service.id),
            Snapshot::Crs(_) => true,
        }
    }
}

fn kind_name(snapshot: &Snapshot) -> &'static str {
    match snapshot {
        Snapshot::Node(_) => "node",
        Snapshot::Link(_) => "link",
        Snapshot::Stop(_) => "stop",
        Snapshot::Route { .. } => "route",
        Snapshot::Service(_) => "service",
        Snapshot::Crs(_) => "crs",
    }
}

fn disconnected(route: &Route, at: usize) -> NetworkError {
    NetworkError::DisconnectedRoute {
        route: route.id.clone(),
        previous: route.links[at].clone(),
        next: route.links[at + 1].clone(),
    }
}

fn unknown(snapshot: &Snapshot) -> NetworkError {
    match snapshot {
        Snapshot::Node(node) => NetworkError::UnknownNode(node.id.clone()),
        Snapshot::Link(link) => NetworkError::UnknownLink(link.id.clone()),
        Snapshot::Stop(stop) => NetworkError::UnknownStop(stop.id.clone()),
        Snapshot::Route { route, .. } => NetworkError::UnknownRoute(route.id.clone()),
        Snapshot::Service(service) => NetworkError::UnknownService(service.id.clone()),
        Snapshot::Crs(crs) => NetworkError::InvalidChange(format!("unknown crs {crs}")),
    }
}
