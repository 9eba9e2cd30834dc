//! Spatial indexing of link geometries.

pub mod index;

pub use index::{LinkIndex, LinkSegmentNode};
