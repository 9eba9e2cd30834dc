//! Graph store: nodes and directed, possibly parallel, links.
//!
//! `Graph` is read-only from outside the crate. All structural edits go
//! through [`Network`](crate::network::Network) so that they are validated
//! and logged.

mod index;
mod link;
mod node;

use std::collections::{BTreeMap, BTreeSet};

pub use link::{Link, LinkPatch};
pub use node::{Node, NodePatch};

use crate::identifiers::{LinkId, NodeId};
use index::LinkIndex;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Graph {
    nodes: BTreeMap<NodeId, Node>,
    links: LinkIndex,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- Lookups ----

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn link(&self, id: &LinkId) -> Option<&Link> {
        self.links.get(id)
    }

    pub fn has_node(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn has_link(&self, id: &LinkId) -> bool {
        self.links.contains(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Links in id order.
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.iter()
    }

    pub fn node_ids(&self) -> BTreeSet<NodeId> {
        self.nodes.keys().cloned().collect()
    }

    pub fn link_ids(&self) -> BTreeSet<LinkId> {
        self.links.iter().map(|l| l.id.clone()).collect()
    }

    /// Every link from `from` to `to`, including parallel ones.
    pub fn links_between(&self, from: &NodeId, to: &NodeId) -> BTreeSet<LinkId> {
        self.links.between(from, to).cloned().unwrap_or_default()
    }

    pub fn out_links(&self, node: &NodeId) -> impl Iterator<Item = &Link> {
        self.adjacent(self.links.outgoing(node))
    }

    pub fn in_links(&self, node: &NodeId) -> impl Iterator<Item = &Link> {
        self.adjacent(self.links.incoming(node))
    }

    /// Ids of all links starting or ending at `node`, self-loops counted once.
    pub fn incident_link_ids(&self, node: &NodeId) -> BTreeSet<LinkId> {
        let outgoing = self.links.outgoing(node).into_iter().flatten();
        let incoming = self.links.incoming(node).into_iter().flatten();
        outgoing.chain(incoming).cloned().collect()
    }

    pub fn links_with_mode<'a>(&'a self, mode: &'a str) -> impl Iterator<Item = &'a Link> + 'a {
        self.links.iter().filter(move |l| l.allows(mode))
    }

    /// All modes carried by at least one link.
    pub fn modes(&self) -> BTreeSet<String> {
        self.links
            .iter()
            .flat_map(|l| l.modes.iter().cloned())
            .collect()
    }

    /// Index of the first consecutive pair in `path` where one link does not
    /// end at the node the next one starts from, or where a link is missing.
    pub fn first_path_break(&self, path: &[LinkId]) -> Option<usize> {
        self.first_path_break_with(path, None)
    }

    /// [`first_path_break`](Self::first_path_break) with `replacement` read
    /// in place of the stored link of the same id.
    pub(crate) fn first_path_break_with(
        &self,
        path: &[LinkId],
        replacement: Option<&Link>,
    ) -> Option<usize> {
        let lookup = |id: &LinkId| match replacement {
            Some(link) if &link.id == id => Some(link),
            _ => self.link(id),
        };
        path.windows(2).position(|pair| match (lookup(&pair[0]), lookup(&pair[1])) {
            (Some(previous), Some(next)) => previous.to != next.from,
            _ => true,
        })
    }

    fn adjacent<'a>(
        &'a self,
        ids: Option<&'a BTreeSet<LinkId>>,
    ) -> impl Iterator<Item = &'a Link> + 'a {
        ids.into_iter()
            .flatten()
            .filter_map(move |id| self.links.get(id))
    }

    // ---- Raw edits (callers have already validated) ----

    pub(crate) fn insert_node(&mut self, node: Node) {
        self.nodes.insert(node.id.clone(), node);
    }

    pub(crate) fn remove_node(&mut self, id: &NodeId) -> Option<Node> {
        debug_assert!(self.incident_link_ids(id).is_empty());
        self.nodes.remove(id)
    }

    pub(crate) fn insert_link(&mut self, link: Link) {
        debug_assert!(self.has_node(&link.from) && self.has_node(&link.to));
        self.links.insert(link);
    }

    pub(crate) fn remove_link(&mut self, id: &LinkId) -> Option<Link> {
        self.links.remove(id)
    }
}
