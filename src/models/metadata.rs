use serde::{Deserialize, Serialize};

/// Which analysis a run (or a derived series) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    Land,
    Ocean,
    Mixed,
}

/// Process-wide configuration for one analysis.
///
/// Created once per run and threaded unchanged through all stages. The only
/// late-bound fields are the land/ocean valid-month ranges, filled in while
/// the mixed analysis is being constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    pub title: String,
    pub mode: AnalysisMode,

    /// First year of the fixed timeline.
    pub yrbeg: i32,

    /// Record length in months; every series in the run has this length.
    pub monm: usize,

    pub gridding_radius_km: f64,

    /// 1-based (first, last) valid-month range of the land cells selected
    /// into the mixed analysis.
    pub land_month_range: Option<(usize, usize)>,

    /// 1-based (first, last) valid-month range of the ocean cells selected
    /// into the mixed analysis.
    pub ocean_month_range: Option<(usize, usize)>,
}

impl RunMetadata {
    pub fn new(
        title: String,
        mode: AnalysisMode,
        yrbeg: i32,
        monm: usize,
        gridding_radius_km: f64,
    ) -> Self {
        Self {
            title,
            mode,
            yrbeg,
            monm,
            gridding_radius_km,
            land_month_range: None,
            ocean_month_range: None,
        }
    }

    /// Number of whole years in the timeline.
    pub fn years(&self) -> usize {
        self.monm / 12
    }

    /// Year containing the given 1-based month offset.
    pub fn year_of_month(&self, month: usize) -> i32 {
        self.yrbeg + ((month - 1) / 12) as i32
    }
}
