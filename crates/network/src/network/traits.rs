//! Pluggable collaborator traits.
//!
//! External crates implement these to provide capabilities the core does not
//! own, such as coordinate transformation.

use geo::Point;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Transforms coordinates from the network's current CRS into another one.
pub trait Reprojector: Send + Sync {
    /// Identifier of the CRS produced by [`Reprojector::reproject`],
    /// e.g. `"EPSG:27700"`.
    fn target_crs(&self) -> &str;

    fn reproject(&self, point: Point) -> Result<Point, BoxError>;
}
