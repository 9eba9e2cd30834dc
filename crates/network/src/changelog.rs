//! Append-only record of every mutation applied to a network.
//!
//! Each entry carries full before/after snapshots of the entity it touched,
//! so the log is an edit script by construction: replaying it in order from
//! an empty network rebuilds the final state.

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::graph::{Link, Node};
use crate::identifiers::ServiceId;
use crate::schedule::{Route, Service, Stop};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Add,
    Modify,
    Remove,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Node,
    Link,
    Stop,
    Route,
    Service,
    /// The network's coordinate reference system.
    Crs,
}

/// Full copy of an entity at one point in time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entity", content = "state", rename_all = "snake_case")]
pub enum Snapshot {
    Node(Node),
    Link(Link),
    Stop(Stop),
    Route { service: ServiceId, route: Route },
    Service(Service),
    Crs(String),
}

impl Snapshot {
    pub fn entity_kind(&self) -> EntityKind {
        match self {
            Self::Node(_) => EntityKind::Node,
            Self::Link(_) => EntityKind::Link,
            Self::Stop(_) => EntityKind::Stop,
            Self::Route { .. } => EntityKind::Route,
            Self::Service(_) => EntityKind::Service,
            Self::Crs(_) => EntityKind::Crs,
        }
    }

    pub fn entity_id(&self) -> &str {
        match self {
            Self::Node(n) => n.id.as_str(),
            Self::Link(l) => l.id.as_str(),
            Self::Stop(s) => s.id.as_str(),
            Self::Route { route, .. } => route.id.as_str(),
            Self::Service(s) => s.id.as_str(),
            Self::Crs(_) => "crs",
        }
    }
}

/// One mutation of one entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub kind: ChangeKind,
    pub target: EntityKind,
    pub target_id: String,
    pub before: Option<Snapshot>,
    pub after: Option<Snapshot>,
}

impl Change {
    pub fn add(after: Snapshot) -> Self {
        Self {
            kind: ChangeKind::Add,
            target: after.entity_kind(),
            target_id: after.entity_id().to_owned(),
            before: None,
            after: Some(after),
        }
    }

    pub fn modify(before: Snapshot, after: Snapshot) -> Self {
        Self {
            kind: ChangeKind::Modify,
            target: after.entity_kind(),
            target_id: after.entity_id().to_owned(),
            before: Some(before),
            after: Some(after),
        }
    }

    pub fn remove(before: Snapshot) -> Self {
        Self {
            kind: ChangeKind::Remove,
            target: before.entity_kind(),
            target_id: before.entity_id().to_owned(),
            before: Some(before),
            after: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangeEntry {
    /// Monotonically increasing, starting at 0 for a fresh network.
    pub seq: u64,
    pub recorded_at: DateTime<Utc>,
    pub change: Change,
}

#[derive(Clone, Debug, Default)]
pub struct ChangeLog {
    entries: Vec<ChangeEntry>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ChangeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&ChangeEntry> {
        self.entries.last()
    }

    /// History of a single entity, oldest first.
    pub fn entries_for<'a>(
        &'a self,
        target: EntityKind,
        id: &'a str,
    ) -> impl Iterator<Item = &'a ChangeEntry> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.change.target == target && e.change.target_id == id)
    }

    /// Entries with `seq >= from`.
    pub fn since(&self, from: u64) -> &[ChangeEntry] {
        let start = self.entries.partition_point(|e| e.seq < from);
        &self.entries[start..]
    }

    /// The bare edit script, without sequence numbers or timestamps.
    pub fn changes(&self) -> impl Iterator<Item = &Change> {
        self.entries.iter().map(|e| &e.change)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.entries)
    }

    pub fn write_json<W: Write>(&self, writer: W) -> serde_json::Result<()> {
        serde_json::to_writer_pretty(writer, &self.entries)
    }

    /// Append a committed batch. All entries share one timestamp.
    pub(crate) fn append(&mut self, changes: Vec<Change>) {
        let recorded_at = Utc::now();
        let mut seq = self.entries.len() as u64;
        for change in changes {
            self.entries.push(ChangeEntry {
                seq,
                recorded_at,
                change,
            });
            seq += 1;
        }
    }
}
