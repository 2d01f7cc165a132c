use serde::{Deserialize, Serialize};

use crate::geometry::BoxBounds;
use crate::utils::constants::valid;

/// Aggregate of the stations contributing to one subbox of the grid.
///
/// The series always spans the run timeline (`monm` months from the cell's
/// first year); `d` is the distance-derived quality score, MISSING when the
/// cell has no contributors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridCell {
    pub series: Vec<f64>,
    pub bounds: BoxBounds,
    pub first_year: i32,
    pub stations: usize,
    pub station_months: usize,
    pub d: f64,
}

impl GridCell {
    pub fn uid(&self) -> String {
        self.bounds.uid()
    }

    /// Number of valid months in the combined series.
    pub fn good_count(&self) -> usize {
        self.series.iter().filter(|&&v| valid(v)).count()
    }

    /// 1-based offset of the first valid month, None when empty.
    pub fn first_valid_month(&self) -> Option<usize> {
        self.series.iter().position(|&v| valid(v)).map(|i| i + 1)
    }

    /// 1-based offset of the last valid month, None when empty.
    pub fn last_valid_month(&self) -> Option<usize> {
        self.series.iter().rposition(|&v| valid(v)).map(|i| i + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.stations == 0
    }
}
