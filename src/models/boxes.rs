use serde::{Deserialize, Serialize};

use crate::geometry::BoxBounds;
use crate::utils::constants::valid;

/// Combined series for one of the 80 large boxes.
///
/// The weight series carries the number of cells contributing to each month
/// (as a float, since combination is weight-proportional).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxSeries {
    pub series: Vec<f64>,
    pub weight: Vec<f64>,
    pub ngood: usize,
    pub bounds: BoxBounds,
}

/// Combined series for a latitude band or a compound zone. Zones carry no
/// bounding region, only the series and its parallel weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneSeries {
    pub series: Vec<f64>,
    pub weight: Vec<f64>,
}

impl ZoneSeries {
    pub fn good_count(&self) -> usize {
        self.series.iter().filter(|&&v| valid(v)).count()
    }
}
