//! Correlation of external reference ids with link ids.
//!
//! Links carry provenance attributes (e.g. the OSM way they were built from).
//! Given a list of external ids, [`correlate`] groups the links whose
//! provenance attribute equals each id. Matching is exact and typed: the
//! integer `1001`, the float `1001.0` and the text `"1001"` are different
//! ids. When a link would only match after such a coercion, the pair is
//! reported as a [`TypeMismatchWarning`] and left unmatched.

mod output;

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};

use modenet_network::attributes::AttributeValue;
use modenet_network::{Graph, LinkId};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub use output::{write_mapping_json, write_report_json};

/// An identifier from an external dataset, with its declared type.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExternalId {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl ExternalId {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
        }
    }

    /// Every id carried by a provenance attribute value. Lists contribute
    /// each element; simulator-style maps contribute their `text` entry.
    pub fn from_attribute(value: &AttributeValue) -> Vec<ExternalId> {
        if let Some(map) = value.as_map() {
            return map.get("text").map(Self::from_attribute).unwrap_or_default();
        }
        value
            .scalars()
            .into_iter()
            .filter_map(|v| match v {
                AttributeValue::Integer(i) => Some(Self::Integer(*i)),
                AttributeValue::Float(f) => Some(Self::Float(*f)),
                AttributeValue::Text(s) => Some(Self::Text(s.clone())),
                _ => None,
            })
            .collect()
    }

    /// Representation shared by ids that are equal up to type coercion.
    fn loose_key(&self) -> String {
        match self {
            Self::Integer(i) => i.to_string(),
            Self::Float(f) if f.is_finite() && f.fract() == 0.0 => format!("{f:.0}"),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => s.trim().to_owned(),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Integer(_) => 0,
            Self::Float(_) => 1,
            Self::Text(_) => 2,
        }
    }
}

impl PartialEq for ExternalId {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ExternalId {}

impl PartialOrd for ExternalId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ExternalId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Hash for ExternalId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Self::Integer(i) => i.hash(state),
            Self::Float(f) => f.to_bits().hash(state),
            Self::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for ExternalId {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for ExternalId {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for ExternalId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationConfig {
    /// Link attribute holding the external provenance id.
    pub attribute_key: String,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            attribute_key: "osm:way:id".to_owned(),
        }
    }
}

/// One line of the correlation report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CorrelationRecord {
    pub external_id: ExternalId,
    pub found: bool,
}

/// A link whose provenance value equals a requested id only after type
/// coercion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TypeMismatchWarning {
    pub external_id: ExternalId,
    pub link: LinkId,
    pub link_value: ExternalId,
}

impl fmt::Display for TypeMismatchWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} id {} not matched to link {} carrying {} value {}",
            self.external_id.type_name(),
            self.external_id,
            self.link,
            self.link_value.type_name(),
            self.link_value
        )
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CorrelationReport {
    /// One record per distinct requested id, in request order.
    pub records: Vec<CorrelationRecord>,
    /// Every requested id with the links matching it (possibly none).
    #[serde(serialize_with = "output::serialize_mapping")]
    pub mapping: BTreeMap<ExternalId, BTreeSet<LinkId>>,
    pub warnings: Vec<TypeMismatchWarning>,
}

impl CorrelationReport {
    pub fn found(&self, id: &ExternalId) -> bool {
        self.links_for(id).is_some_and(|links| !links.is_empty())
    }

    pub fn links_for(&self, id: &ExternalId) -> Option<&BTreeSet<LinkId>> {
        self.mapping.get(id)
    }

    pub fn unmatched(&self) -> impl Iterator<Item = &ExternalId> {
        self.records.iter().filter(|r| !r.found).map(|r| &r.external_id)
    }

    /// True when every requested id matched at least one link.
    pub fn is_complete(&self) -> bool {
        self.records.iter().all(|r| r.found)
    }
}

impl fmt::Display for CorrelationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let found = self.records.iter().filter(|r| r.found).count();
        writeln!(f, "Correlated {found}/{} external ids", self.records.len())?;
        for id in self.unmatched() {
            writeln!(f, "  unmatched: {id}")?;
        }
        for warning in &self.warnings {
            writeln!(f, "  type mismatch: {warning}")?;
        }
        Ok(())
    }
}

/// Match `external_ids` against the provenance attribute of every link.
pub fn correlate(
    graph: &Graph,
    external_ids: &[ExternalId],
    config: &CorrelationConfig,
) -> CorrelationReport {
    let mut exact: BTreeMap<ExternalId, BTreeSet<LinkId>> = BTreeMap::new();
    let mut loose: BTreeMap<String, Vec<(ExternalId, LinkId)>> = BTreeMap::new();
    for link in graph.links() {
        let Some(value) = link.attributes.get(&config.attribute_key) else {
            continue;
        };
        for id in ExternalId::from_attribute(value) {
            loose
                .entry(id.loose_key())
                .or_default()
                .push((id.clone(), link.id.clone()));
            exact.entry(id).or_default().insert(link.id.clone());
        }
    }

    let mut report = CorrelationReport::default();
    for id in external_ids {
        if report.mapping.contains_key(id) {
            continue;
        }
        let links = exact.get(id).cloned().unwrap_or_default();

        let mut mismatched: Vec<_> = loose
            .get(&id.loose_key())
            .into_iter()
            .flatten()
            .filter(|(value, link)| value != id && !links.contains(link))
            .map(|(value, link)| TypeMismatchWarning {
                external_id: id.clone(),
                link: link.clone(),
                link_value: value.clone(),
            })
            .collect();
        mismatched.sort_by(|a, b| a.link.cmp(&b.link).then_with(|| a.link_value.cmp(&b.link_value)));
        for warning in &mismatched {
            warn!(%warning, "external id type mismatch");
        }
        report.warnings.extend(mismatched);

        report.records.push(CorrelationRecord {
            external_id: id.clone(),
            found: !links.is_empty(),
        });
        report.mapping.insert(id.clone(), links);
    }

    info!(
        requested = report.records.len(),
        unmatched = report.unmatched().count(),
        mismatches = report.warnings.len(),
        key = %config.attribute_key,
        "correlated external ids"
    );
    report
}
