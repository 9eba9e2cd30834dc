//! PT schedule: services own routes, routes reference shared stops.

mod types;

use std::collections::{BTreeMap, BTreeSet, HashMap};

pub use types::{Route, Service, Stop, StopPatch};

use crate::identifiers::*;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schedule {
    stops: BTreeMap<StopId, Stop>,
    routes: BTreeMap<RouteId, Route>,
    services: BTreeMap<ServiceId, Service>,

    // Ownership indices
    route_service: HashMap<RouteId, ServiceId>,
    service_routes: HashMap<ServiceId, BTreeSet<RouteId>>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- Lookups ----

    pub fn stop(&self, id: &StopId) -> Option<&Stop> {
        self.stops.get(id)
    }

    pub fn route(&self, id: &RouteId) -> Option<&Route> {
        self.routes.get(id)
    }

    pub fn service(&self, id: &ServiceId) -> Option<&Service> {
        self.services.get(id)
    }

    pub fn has_stop(&self, id: &StopId) -> bool {
        self.stops.contains_key(id)
    }

    pub fn has_route(&self, id: &RouteId) -> bool {
        self.routes.contains_key(id)
    }

    pub fn has_service(&self, id: &ServiceId) -> bool {
        self.services.contains_key(id)
    }

    /// The service that owns `route`.
    pub fn service_of(&self, route: &RouteId) -> Option<&ServiceId> {
        self.route_service.get(route)
    }

    /// Routes of `service`, ordered by id.
    pub fn routes_of(&self, service: &ServiceId) -> Vec<&Route> {
        self.service_routes
            .get(service)
            .into_iter()
            .flatten()
            .filter_map(|id| self.routes.get(id))
            .collect()
    }

    pub fn route_ids_of(&self, service: &ServiceId) -> BTreeSet<RouteId> {
        self.service_routes.get(service).cloned().unwrap_or_default()
    }

    /// Routes calling at `stop`.
    pub fn routes_serving_stop(&self, stop: &StopId) -> BTreeSet<RouteId> {
        self.routes
            .values()
            .filter(|r| r.stops.contains(stop))
            .map(|r| r.id.clone())
            .collect()
    }

    /// Routes whose link path uses `link`.
    pub fn routes_using_link(&self, link: &LinkId) -> BTreeSet<RouteId> {
        self.routes
            .values()
            .filter(|r| r.links.contains(link))
            .map(|r| r.id.clone())
            .collect()
    }

    /// Stops in id order.
    pub fn stops(&self) -> impl Iterator<Item = &Stop> {
        self.stops.values()
    }

    /// Routes in id order.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.values()
    }

    /// Services in id order.
    pub fn services(&self) -> impl Iterator<Item = &Service> {
        self.services.values()
    }

    pub fn stop_ids(&self) -> BTreeSet<StopId> {
        self.stops.keys().cloned().collect()
    }

    pub fn route_ids(&self) -> BTreeSet<RouteId> {
        self.routes.keys().cloned().collect()
    }

    pub fn service_ids(&self) -> BTreeSet<ServiceId> {
        self.services.keys().cloned().collect()
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn service_count(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty() && self.routes.is_empty() && self.services.is_empty()
    }

    // ---- Raw edits (callers have already validated) ----

    pub(crate) fn insert_stop(&mut self, stop: Stop) {
        self.stops.insert(stop.id.clone(), stop);
    }

    pub(crate) fn remove_stop(&mut self, id: &StopId) -> Option<Stop> {
        self.stops.remove(id)
    }

    pub(crate) fn insert_service(&mut self, service: Service) {
        self.services.insert(service.id.clone(), service);
    }

    pub(crate) fn remove_service(&mut self, id: &ServiceId) -> Option<Service> {
        debug_assert!(self.route_ids_of(id).is_empty());
        self.service_routes.remove(id);
        self.services.remove(id)
    }

    /// Insert or replace a route under `service`, moving ownership if the
    /// route previously belonged elsewhere.
    pub(crate) fn insert_route(&mut self, service: ServiceId, route: Route) {
        self.remove_route(&route.id);
        self.service_routes
            .entry(service.clone())
            .or_default()
            .insert(route.id.clone());
        self.route_service.insert(route.id.clone(), service);
        self.routes.insert(route.id.clone(), route);
    }

    pub(crate) fn remove_route(&mut self, id: &RouteId) -> Option<(ServiceId, Route)> {
        let route = self.routes.remove(id)?;
        let service = self.route_service.remove(id)?;
        if let Some(routes) = self.service_routes.get_mut(&service) {
            routes.remove(id);
            if routes.is_empty() {
                self.service_routes.remove(&service);
            }
        }
        Some((service, route))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_ownership_moves_between_services() {
        let mut schedule = Schedule::new();
        schedule.insert_service(Service::new("s1", "Line 1"));
        schedule.insert_service(Service::new("s2", "Line 2"));
        schedule.insert_route("s1".into(), Route::new("r1", "bus").with_stops(["a"]));

        schedule.insert_route("s2".into(), Route::new("r1", "bus").with_stops(["a"]));

        assert!(schedule.route_ids_of(&"s1".into()).is_empty());
        assert_eq!(schedule.service_of(&"r1".into()), Some(&ServiceId::new("s2")));
        assert_eq!(schedule.routes_of(&"s2".into()).len(), 1);
    }

    #[test]
    fn test_routes_serving_stop() {
        let mut schedule = Schedule::new();
        schedule.insert_service(Service::new("s1", "Line 1"));
        schedule.insert_route("s1".into(), Route::new("r1", "bus").with_stops(["a", "b"]));
        schedule.insert_route("s1".into(), Route::new("r2", "bus").with_stops(["b", "c"]));

        let serving: Vec<_> = schedule.routes_serving_stop(&"b".into()).into_iter().collect();
        assert_eq!(serving, [RouteId::new("r1"), RouteId::new("r2")]);
    }
}
