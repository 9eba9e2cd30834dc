use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::attributes::{merge_attributes, AttributeMap, AttributeValue};
use crate::identifiers::{LinkId, NodeId};

/// A directed edge between two nodes.
///
/// The id is the link's identity. Several links may share the same ordered
/// endpoint pair; they are told apart by id only, never by insertion
/// position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: LinkId,
    pub from: NodeId,
    pub to: NodeId,
    /// Free-flow speed in metres per second.
    pub freespeed: f64,
    /// Vehicles per hour.
    pub capacity: f64,
    pub permlanes: f64,
    pub oneway: bool,
    pub modes: BTreeSet<String>,
    /// Metres.
    pub length: f64,
    /// Provenance and any other tag not promoted to a field.
    #[serde(default)]
    pub attributes: AttributeMap,
}

impl Link {
    pub fn new(id: impl Into<LinkId>, from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            freespeed: 0.0,
            capacity: 0.0,
            permlanes: 1.0,
            oneway: true,
            modes: BTreeSet::new(),
            length: 0.0,
            attributes: AttributeMap::new(),
        }
    }

    pub fn with_modes<I, S>(mut self, modes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modes = modes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_length(mut self, length: f64) -> Self {
        self.length = length;
        self
    }

    pub fn with_freespeed(mut self, freespeed: f64) -> Self {
        self.freespeed = freespeed;
        self
    }

    pub fn with_capacity(mut self, capacity: f64) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_permlanes(mut self, permlanes: f64) -> Self {
        self.permlanes = permlanes;
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn allows(&self, mode: &str) -> bool {
        self.modes.contains(mode)
    }

    pub fn allows_any<'a>(&self, modes: impl IntoIterator<Item = &'a String>) -> bool {
        modes.into_iter().any(|m| self.modes.contains(m))
    }

    pub(crate) fn patched(&self, patch: LinkPatch) -> Self {
        let mut link = self.clone();
        if let Some(v) = patch.freespeed {
            link.freespeed = v;
        }
        if let Some(v) = patch.capacity {
            link.capacity = v;
        }
        if let Some(v) = patch.permlanes {
            link.permlanes = v;
        }
        if let Some(v) = patch.oneway {
            link.oneway = v;
        }
        if let Some(v) = patch.modes {
            link.modes = v;
        }
        if let Some(v) = patch.length {
            link.length = v;
        }
        merge_attributes(&mut link.attributes, patch.attributes);
        link
    }
}

/// Partial update for a [`Link`]'s attributes.
///
/// Unset fields are left alone; `attributes` is deep-merged into the
/// existing mapping. Endpoints are changed with `Network::reroute_link`.
#[derive(Clone, Debug, Default)]
pub struct LinkPatch {
    pub freespeed: Option<f64>,
    pub capacity: Option<f64>,
    pub permlanes: Option<f64>,
    pub oneway: Option<bool>,
    pub modes: Option<BTreeSet<String>>,
    pub length: Option<f64>,
    pub attributes: AttributeMap,
}

impl LinkPatch {
    pub fn freespeed(mut self, v: f64) -> Self {
        self.freespeed = Some(v);
        self
    }

    pub fn capacity(mut self, v: f64) -> Self {
        self.capacity = Some(v);
        self
    }

    pub fn permlanes(mut self, v: f64) -> Self {
        self.permlanes = Some(v);
        self
    }

    pub fn oneway(mut self, v: bool) -> Self {
        self.oneway = Some(v);
        self
    }

    pub fn modes<I, S>(mut self, modes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modes = Some(modes.into_iter().map(Into::into).collect());
        self
    }

    pub fn length(mut self, v: f64) -> Self {
        self.length = Some(v);
        self
    }

    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_keeps_unset_fields() {
        let link = Link::new("l1", "a", "b")
            .with_modes(["car"])
            .with_length(120.0)
            .with_freespeed(13.9)
            .with_attribute("osm:way:id", 1001i64);

        let patched = link.patched(LinkPatch::default().capacity(900.0).attribute("lit", true));

        assert_eq!(patched.capacity, 900.0);
        assert_eq!(patched.length, 120.0);
        assert_eq!(patched.freespeed, 13.9);
        assert!(patched.allows("car"));
        assert_eq!(patched.attributes.len(), 2);
    }
}
