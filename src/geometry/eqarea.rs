//! The equal-area global grid: 80 boxes in 8 latitude bands, each box
//! subdivided into 100 equal-area subboxes (8000 cells per globe).
//!
//! Band boundaries are placed at equal increments of sin(latitude) so that
//! every box within a band, and every subbox within a box, covers the same
//! area of the sphere.

use crate::geometry::{BoxBounds, GridGeometry, Region};
use crate::utils::constants::BOXES_IN_BAND;

/// Sines of the band boundary latitudes, north to south. The resulting
/// latitudes are 90, 64.2, 44.4, 23.6, 0, -23.6, -44.4, -64.2, -90.
const BAND_ALTITUDES: [f64; 9] = [1.0, 0.9, 0.7, 0.4, 0.0, -0.4, -0.7, -0.9, -1.0];

/// Number of equal-area latitude strips (and longitude slices per strip)
/// each box is divided into, giving 100 subboxes per box.
const SUBBOX_SPLIT: usize = 10;

#[derive(Debug, Clone, Default)]
pub struct EqualAreaGrid;

impl EqualAreaGrid {
    pub fn new() -> Self {
        Self
    }

    fn band_bounds(band: usize) -> (f64, f64) {
        let north = BAND_ALTITUDES[band].asin().to_degrees();
        let south = BAND_ALTITUDES[band + 1].asin().to_degrees();
        (south, north)
    }

    /// Split a box into equal-area subboxes: SUBBOX_SPLIT latitude strips of
    /// equal sin(latitude) increment, each cut into SUBBOX_SPLIT longitude
    /// slices. Traversal order is south to north, west to east.
    fn split(bounds: &BoxBounds) -> Vec<BoxBounds> {
        let sin_south = bounds.south.to_radians().sin();
        let sin_north = bounds.north.to_radians().sin();
        let n = SUBBOX_SPLIT as f64;

        let mut subboxes = Vec::with_capacity(SUBBOX_SPLIT * SUBBOX_SPLIT);
        for strip in 0..SUBBOX_SPLIT {
            let lo = sin_south + (sin_north - sin_south) * strip as f64 / n;
            let hi = sin_south + (sin_north - sin_south) * (strip + 1) as f64 / n;
            let s = lo.clamp(-1.0, 1.0).asin().to_degrees();
            let nb = hi.clamp(-1.0, 1.0).asin().to_degrees();
            for slice in 0..SUBBOX_SPLIT {
                let w = bounds.west + (bounds.east - bounds.west) * slice as f64 / n;
                let e = bounds.west + (bounds.east - bounds.west) * (slice + 1) as f64 / n;
                subboxes.push(BoxBounds::new(s, nb, w, e));
            }
        }
        subboxes
    }
}

impl GridGeometry for EqualAreaGrid {
    fn boxes(&self) -> Vec<BoxBounds> {
        let mut boxes = Vec::with_capacity(80);
        for (band, &count) in BOXES_IN_BAND.iter().enumerate() {
            let (south, north) = Self::band_bounds(band);
            for i in 0..count {
                let west = -180.0 + 360.0 * i as f64 / count as f64;
                let east = -180.0 + 360.0 * (i + 1) as f64 / count as f64;
                boxes.push(BoxBounds::new(south, north, west, east));
            }
        }
        boxes
    }

    fn regions(&self) -> Vec<Region> {
        self.boxes()
            .into_iter()
            .map(|bounds| Region {
                bounds,
                subboxes: Self::split(&bounds),
            })
            .collect()
    }

    fn boxes_in_band(&self) -> Vec<usize> {
        BOXES_IN_BAND.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_count() {
        let grid = EqualAreaGrid::new();
        assert_eq!(grid.boxes().len(), 80);
    }

    #[test]
    fn test_subbox_count() {
        let grid = EqualAreaGrid::new();
        let total: usize = grid.regions().iter().map(|r| r.subboxes.len()).sum();
        assert_eq!(total, 8000);
    }

    #[test]
    fn test_boxes_partition_sphere() {
        // Every subbox centre falls inside exactly one box, and that box is
        // its parent region.
        let grid = EqualAreaGrid::new();
        let boxes = grid.boxes();
        for region in grid.regions() {
            for subbox in &region.subboxes {
                let (lat, lon) = subbox.centre();
                let owners: Vec<_> = boxes.iter().filter(|b| b.contains(lat, lon)).collect();
                assert_eq!(owners.len(), 1);
                assert_eq!(*owners[0], region.bounds);
            }
        }
    }

    #[test]
    fn test_boxes_have_equal_area_within_band() {
        let grid = EqualAreaGrid::new();
        let boxes = grid.boxes();
        // Solid angle of a lat/lon box is (sin n - sin s) * (e - w).
        let area = |b: &BoxBounds| {
            (b.north.to_radians().sin() - b.south.to_radians().sin()) * (b.east - b.west)
        };
        let total: f64 = boxes.iter().map(area).sum();
        assert!((total - 2.0 * 360.0).abs() < 1e-6);

        let first = area(&boxes[0]);
        for b in &boxes[1..4] {
            assert!((area(b) - first).abs() < 1e-9);
        }
    }

    #[test]
    fn test_band_edges() {
        let (south, north) = EqualAreaGrid::band_bounds(0);
        assert!((north - 90.0).abs() < 1e-9);
        assert!((south - 64.161).abs() < 1e-3);
    }

    #[test]
    fn test_band_sizes_match_box_order() {
        let grid = EqualAreaGrid::new();
        let boxes = grid.boxes();
        let mut offset = 0;
        for (band, &count) in grid.boxes_in_band().iter().enumerate() {
            let (south, north) = EqualAreaGrid::band_bounds(band);
            for b in &boxes[offset..offset + count] {
                assert!((b.south - south).abs() < 1e-9);
                assert!((b.north - north).abs() < 1e-9);
            }
            offset += count;
        }
        assert_eq!(offset, boxes.len());
    }
}
