//! R-tree of link geometries.
//!
//! Each link is indexed as the straight segment between its endpoint
//! nodes. Distances are Euclidean in the network's CRS, so the network
//! should be in a projected CRS (metres) before searching by radius.

use geo::{Coord, Line};
use modenet_network::{Graph, LinkId};
use rstar::{PointDistance, RTree, RTreeObject, AABB};

#[derive(Clone, Debug)]
pub struct LinkSegmentNode {
    pub link: LinkId,
    pub segment: Line,
    aabb: AABB<[f64; 2]>,
}

impl LinkSegmentNode {
    pub fn new(segment: Line, link: LinkId) -> Self {
        let start = [segment.start.x, segment.start.y];
        let end = [segment.end.x, segment.end.y];

        Self {
            link,
            segment,
            aabb: AABB::from_corners(start, end),
        }
    }
}

impl RTreeObject for LinkSegmentNode {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

impl PointDistance for LinkSegmentNode {
    /// Squared distance from `point` to the closest point of the segment.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let a = self.segment.start;
        let ab = self.segment.delta();
        let ap = Coord {
            x: point[0] - a.x,
            y: point[1] - a.y,
        };

        let ab_ab = ab.x * ab.x + ab.y * ab.y;
        let t = if ab_ab == 0.0 {
            0.0
        } else {
            ((ab.x * ap.x + ab.y * ap.y) / ab_ab).clamp(0.0, 1.0)
        };

        let dx = ap.x - t * ab.x;
        let dy = ap.y - t * ab.y;
        dx * dx + dy * dy
    }
}

/// Spatial index over every link of a graph.
pub struct LinkIndex {
    tree: RTree<LinkSegmentNode>,
}

impl LinkIndex {
    pub fn build(graph: &Graph) -> Self {
        let segments = graph
            .links()
            .filter_map(|link| {
                let from = graph.node(&link.from)?.location;
                let to = graph.node(&link.to)?.location;
                Some(LinkSegmentNode::new(Line::new(from.0, to.0), link.id.clone()))
            })
            .collect();

        Self {
            tree: RTree::bulk_load(segments),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Links within `radius` of `(x, y)` with their distance, nearest first.
    /// Ties are broken by link id.
    pub fn within(&self, x: f64, y: f64, radius: f64) -> Vec<(&LinkId, f64)> {
        let point = [x, y];
        let mut found: Vec<(&LinkId, f64)> = self
            .tree
            .locate_within_distance(point, radius * radius)
            .map(|node| (&node.link, node.distance_2(&point).sqrt()))
            .collect();
        found.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        found
    }
}
