//! Stops, routes and services.

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::attributes::{merge_attributes, AttributeMap, AttributeValue};
use crate::identifiers::*;

/// A PT boarding location. Stops are shared by reference between routes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: StopId,
    #[serde(default)]
    pub name: String,
    pub location: Point,
    pub mode: String,
    /// Road/rail link the stop is attached to, once snapped.
    pub linked_link: Option<LinkId>,
    #[serde(default)]
    pub attributes: AttributeMap,
}

impl Stop {
    pub fn new(id: impl Into<StopId>, x: f64, y: f64, mode: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            location: Point::new(x, y),
            mode: mode.into(),
            linked_link: None,
            attributes: AttributeMap::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_linked_link(mut self, link: impl Into<LinkId>) -> Self {
        self.linked_link = Some(link.into());
        self
    }

    pub(crate) fn patched(&self, patch: StopPatch) -> Self {
        let mut stop = self.clone();
        if let Some(name) = patch.name {
            stop.name = name;
        }
        if let Some(location) = patch.location {
            stop.location = location;
        }
        if let Some(mode) = patch.mode {
            stop.mode = mode;
        }
        if let Some(linked_link) = patch.linked_link {
            stop.linked_link = linked_link;
        }
        merge_attributes(&mut stop.attributes, patch.attributes);
        stop
    }
}

/// Partial update for a [`Stop`].
///
/// `linked_link: Some(None)` clears an existing snap.
#[derive(Clone, Debug, Default)]
pub struct StopPatch {
    pub name: Option<String>,
    pub location: Option<Point>,
    pub mode: Option<String>,
    pub linked_link: Option<Option<LinkId>>,
    pub attributes: AttributeMap,
}

impl StopPatch {
    pub fn location(mut self, location: Point) -> Self {
        self.location = Some(location);
        self
    }

    pub fn linked_link(mut self, link: Option<LinkId>) -> Self {
        self.linked_link = Some(link);
        self
    }

    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// An ordered stop sequence plus the network path a vehicle drives.
///
/// The owning service is tracked by the [`Schedule`](super::Schedule), not by
/// the route itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: RouteId,
    #[serde(default)]
    pub name: String,
    pub mode: String,
    pub stops: Vec<StopId>,
    #[serde(default)]
    pub links: Vec<LinkId>,
    #[serde(default)]
    pub attributes: AttributeMap,
}

impl Route {
    pub fn new(id: impl Into<RouteId>, mode: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            mode: mode.into(),
            stops: Vec::new(),
            links: Vec::new(),
            attributes: AttributeMap::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_stops<I, S>(mut self, stops: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<StopId>,
    {
        self.stops = stops.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_links<I, S>(mut self, links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<LinkId>,
    {
        self.links = links.into_iter().map(Into::into).collect();
        self
    }
}

/// A line, e.g. "Bus 12". Owns its routes exclusively.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub attributes: AttributeMap,
}

impl Service {
    pub fn new(id: impl Into<ServiceId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            attributes: AttributeMap::new(),
        }
    }
}
