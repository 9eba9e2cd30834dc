//! Open-ended attribute mappings.
//!
//! Upstream data sources attach arbitrary, sometimes nested, tag dictionaries
//! to nodes, links and stops. Recognised fields are promoted to typed struct
//! members; everything else lives in an [`AttributeMap`] so provenance data
//! survives edits and re-export.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordered key → value mapping.
pub type AttributeMap = BTreeMap<String, AttributeValue>;

/// A single attribute value.
///
/// Integers and floats are kept apart: `1001` and `1001.0` are different
/// values and compare unequal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<AttributeValue>),
    Map(AttributeMap),
}

impl AttributeValue {
    /// Short name of the value's type, used in reports.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&AttributeMap> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Scalar leaves of this value: itself for scalars, the flattened
    /// elements for lists. Maps have no scalar leaves.
    pub fn scalars(&self) -> Vec<&AttributeValue> {
        match self {
            Self::List(items) => items.iter().flat_map(|v| v.scalars()).collect(),
            Self::Map(_) => Vec::new(),
            scalar => vec![scalar],
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Map(map) => write!(f, "{{{} keys}}", map.len()),
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<AttributeMap> for AttributeValue {
    fn from(v: AttributeMap) -> Self {
        Self::Map(v)
    }
}

impl<T: Into<AttributeValue>> From<Vec<T>> for AttributeValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

/// Deep-merge `patch` into `target`.
///
/// Nested maps merge key by key; any other value in `patch` replaces the
/// value in `target`.
pub fn merge_attributes(target: &mut AttributeMap, patch: AttributeMap) {
    for (key, value) in patch {
        match (target.get_mut(&key), value) {
            (Some(AttributeValue::Map(existing)), AttributeValue::Map(incoming)) => {
                merge_attributes(existing, incoming);
            }
            (_, value) => {
                target.insert(key, value);
            }
        }
    }
}
