//! Link identity layer.
//!
//! Links are stored by id. Two secondary indices are kept in step with the
//! primary map on every insert and removal: the ordered endpoint pair to the
//! set of parallel link ids, and per-node outgoing/incoming adjacency.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::link::Link;
use crate::identifiers::{LinkId, NodeId};

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct LinkIndex {
    links: BTreeMap<LinkId, Link>,
    by_endpoints: HashMap<(NodeId, NodeId), BTreeSet<LinkId>>,
    outgoing: HashMap<NodeId, BTreeSet<LinkId>>,
    incoming: HashMap<NodeId, BTreeSet<LinkId>>,
}

impl LinkIndex {
    pub fn get(&self, id: &LinkId) -> Option<&Link> {
        self.links.get(id)
    }

    pub fn contains(&self, id: &LinkId) -> bool {
        self.links.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }

    pub fn between(&self, from: &NodeId, to: &NodeId) -> Option<&BTreeSet<LinkId>> {
        self.by_endpoints.get(&(from.clone(), to.clone()))
    }

    pub fn outgoing(&self, node: &NodeId) -> Option<&BTreeSet<LinkId>> {
        self.outgoing.get(node)
    }

    pub fn incoming(&self, node: &NodeId) -> Option<&BTreeSet<LinkId>> {
        self.incoming.get(node)
    }

    /// Insert or replace a link, re-indexing its endpoints.
    pub fn insert(&mut self, link: Link) {
        self.remove(&link.id);

        self.by_endpoints
            .entry((link.from.clone(), link.to.clone()))
            .or_default()
            .insert(link.id.clone());
        self.outgoing
            .entry(link.from.clone())
            .or_default()
            .insert(link.id.clone());
        self.incoming
            .entry(link.to.clone())
            .or_default()
            .insert(link.id.clone());
        self.links.insert(link.id.clone(), link);
    }

    pub fn remove(&mut self, id: &LinkId) -> Option<Link> {
        let link = self.links.remove(id)?;

        let key = (link.from.clone(), link.to.clone());
        if let Some(parallel) = self.by_endpoints.get_mut(&key) {
            parallel.remove(id);
            if parallel.is_empty() {
                self.by_endpoints.remove(&key);
            }
        }
        detach(&mut self.outgoing, &link.from, id);
        detach(&mut self.incoming, &link.to, id);

        Some(link)
    }
}

fn detach(adjacency: &mut HashMap<NodeId, BTreeSet<LinkId>>, node: &NodeId, id: &LinkId) {
    if let Some(ids) = adjacency.get_mut(node) {
        ids.remove(id);
        if ids.is_empty() {
            adjacency.remove(node);
        }
    }
}
