pub mod eqarea;

pub use eqarea::EqualAreaGrid;

use serde::{Deserialize, Serialize};

/// Bounds of a grid region in degrees: (southern, northern, western,
/// eastern).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxBounds {
    pub south: f64,
    pub north: f64,
    pub west: f64,
    pub east: f64,
}

impl BoxBounds {
    pub fn new(south: f64, north: f64, west: f64, east: f64) -> Self {
        Self {
            south,
            north,
            west,
            east,
        }
    }

    /// Containment over the half-open region [south, north) x [west, east),
    /// so that adjacent boxes never both claim a point.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        self.south <= lat && lat < self.north && self.west <= lon && lon < self.east
    }

    /// Area-weighted centre of the region.
    ///
    /// The latitude is the centre of mass on the sphere (mean of the sine of
    /// the bounding latitudes), not the arithmetic midpoint; the longitude
    /// is the midpoint.
    pub fn centre(&self) -> (f64, f64) {
        let sin_mid = (self.south.to_radians().sin() + self.north.to_radians().sin()) / 2.0;
        (sin_mid.asin().to_degrees(), (self.west + self.east) / 2.0)
    }

    /// Identifier used in audit logs, derived from the centre.
    pub fn uid(&self) -> String {
        let (lat, lon) = self.centre();
        format!("{:+05.1}{:+06.1}", lat, lon)
    }

    /// Identifier for a box-level series, tagged with the analysis role so
    /// the land, ocean and mixed audit logs can be separated.
    pub fn box_uid(&self, celltype: &str) -> String {
        format!(
            "{}{:+03.0}{:+03.0}{:+05.0}{:+05.0}",
            celltype, self.south, self.north, self.west, self.east
        )
    }
}

/// One parent region of the subbox grid: the box bounds plus its subboxes in
/// deterministic traversal order.
#[derive(Debug, Clone)]
pub struct Region {
    pub bounds: BoxBounds,
    pub subboxes: Vec<BoxBounds>,
}

/// Supplier of the grid geometry consumed by the aggregation stages.
///
/// Implementations must guarantee that `boxes()` partitions the sphere with
/// no gaps or overlaps, that `regions()` enumerates the same boxes in the
/// same order, and that `boxes_in_band()` is consistent with that order.
pub trait GridGeometry {
    /// The large boxes, in band order (north to south, west to east).
    fn boxes(&self) -> Vec<BoxBounds>;

    /// The boxes again, each with its subboxes.
    fn regions(&self) -> Vec<Region>;

    /// Number of boxes in each latitude band, in box order.
    fn boxes_in_band(&self) -> Vec<usize>;
}
