use geo::Point;
use serde::{Deserialize, Serialize};

use crate::attributes::{merge_attributes, AttributeMap, AttributeValue};
use crate::identifiers::NodeId;

/// A graph vertex with a coordinate in the network's declared CRS.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub location: Point,
    #[serde(default)]
    pub attributes: AttributeMap,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            location: Point::new(x, y),
            attributes: AttributeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub(crate) fn patched(&self, patch: NodePatch) -> Self {
        let mut node = self.clone();
        if let Some(location) = patch.location {
            node.location = location;
        }
        merge_attributes(&mut node.attributes, patch.attributes);
        node
    }
}

/// Partial update for a [`Node`]. Attributes are deep-merged.
#[derive(Clone, Debug, Default)]
pub struct NodePatch {
    pub location: Option<Point>,
    pub attributes: AttributeMap,
}

impl NodePatch {
    pub fn location(mut self, location: Point) -> Self {
        self.location = Some(location);
        self
    }

    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}
