//! Schedule well-formedness checks.

use std::fmt;

use serde::Serialize;

use crate::graph::Graph;
use crate::identifiers::*;
use crate::schedule::Schedule;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum ScheduleIssue {
    MissingStop {
        service: ServiceId,
        route: RouteId,
        stop: StopId,
    },
    MissingLink {
        service: ServiceId,
        route: RouteId,
        link: LinkId,
    },
    DisconnectedPath {
        service: ServiceId,
        route: RouteId,
        previous: LinkId,
        next: LinkId,
    },
    EmptyRoute {
        service: ServiceId,
        route: RouteId,
    },
    ServiceWithoutRoutes {
        service: ServiceId,
    },
    StopLinkMissing {
        stop: StopId,
        link: LinkId,
    },
}

impl fmt::Display for ScheduleIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingStop { service, route, stop } => {
                write!(f, "service {service} route {route}: stop {stop} does not exist")
            }
            Self::MissingLink { service, route, link } => {
                write!(f, "service {service} route {route}: link {link} does not exist")
            }
            Self::DisconnectedPath {
                service,
                route,
                previous,
                next,
            } => write!(
                f,
                "service {service} route {route}: link {previous} does not lead into {next}"
            ),
            Self::EmptyRoute { service, route } => {
                write!(f, "service {service} route {route}: no stops")
            }
            Self::ServiceWithoutRoutes { service } => write!(f, "service {service}: no routes"),
            Self::StopLinkMissing { stop, link } => {
                write!(f, "stop {stop}: linked link {link} does not exist")
            }
        }
    }
}

/// All schedule issues, ordered by service, then route, then position.
pub fn check_schedule(schedule: &Schedule, graph: &Graph) -> Vec<ScheduleIssue> {
    let mut issues = Vec::new();

    for service in schedule.service_ids() {
        let routes = schedule.routes_of(&service);
        if routes.is_empty() {
            issues.push(ScheduleIssue::ServiceWithoutRoutes {
                service: service.clone(),
            });
        }

        for route in routes {
            if route.stops.is_empty() {
                issues.push(ScheduleIssue::EmptyRoute {
                    service: service.clone(),
                    route: route.id.clone(),
                });
            }
            for stop in route.stops.iter().filter(|s| !schedule.has_stop(s)) {
                issues.push(ScheduleIssue::MissingStop {
                    service: service.clone(),
                    route: route.id.clone(),
                    stop: stop.clone(),
                });
            }

            let mut missing = false;
            for link in route.links.iter().filter(|l| !graph.has_link(l)) {
                missing = true;
                issues.push(ScheduleIssue::MissingLink {
                    service: service.clone(),
                    route: route.id.clone(),
                    link: link.clone(),
                });
            }
            if missing {
                continue;
            }
            for pair in route.links.windows(2) {
                let connected = matches!(
                    (graph.link(&pair[0]), graph.link(&pair[1])),
                    (Some(a), Some(b)) if a.to == b.from
                );
                if !connected {
                    issues.push(ScheduleIssue::DisconnectedPath {
                        service: service.clone(),
                        route: route.id.clone(),
                        previous: pair[0].clone(),
                        next: pair[1].clone(),
                    });
                }
            }
        }
    }

    for stop_id in schedule.stop_ids() {
        let linked = schedule.stop(&stop_id).and_then(|s| s.linked_link.as_ref());
        if let Some(link) = linked.filter(|l| !graph.has_link(l)) {
            issues.push(ScheduleIssue::StopLinkMissing {
                stop: stop_id.clone(),
                link: link.clone(),
            });
        }
    }

    issues
}
