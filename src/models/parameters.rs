use serde::{Deserialize, Serialize};

/// Tunable parameters of the analysis.
///
/// The defaults reproduce the standard configuration; a run normally loads
/// the defaults and overrides a handful of fields from the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    /// Combining radius for station-to-cell gridding, in kilometres.
    pub gridding_radius_km: f64,

    /// Minimum (positive) overlap in months for a station series to be
    /// combined into a cell accumulator.
    pub gridding_min_overlap: usize,

    /// Inclusive reference years for anomalizing gridded cells.
    pub gridding_reference_period: (i32, i32),

    /// Minimum valid months for a cell to be combined into its box, and for
    /// an ocean cell to be preferred over land in the mixed analysis.
    pub subbox_min_valid: usize,

    /// Land cells whose quality score is below this range (km) are selected
    /// over ocean data in the mixed analysis.
    pub subbox_land_range_km: f64,

    /// Minimum overlap when combining cells into boxes, boxes into bands
    /// and bands into zones.
    pub box_min_overlap: usize,

    /// Inclusive reference years for anomalizing box series.
    pub subbox_reference_period: (i32, i32),

    /// Inclusive reference years for anomalizing band and zone series.
    pub box_reference_period: (i32, i32),

    /// Minimum valid months in a year for that year's annual mean.
    pub zone_annual_min_months: usize,

    /// Cell centroids whose rounded latitude is at or beyond this value are
    /// snapped to the exact pole, so that all cells touching a pole combine
    /// as a single point.
    pub pole_snap_latitude: f64,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            gridding_radius_km: 1200.0,
            gridding_min_overlap: 20,
            gridding_reference_period: (1951, 1980),
            subbox_min_valid: 240,
            subbox_land_range_km: 100.0,
            box_min_overlap: 20,
            subbox_reference_period: (1961, 1990),
            box_reference_period: (1951, 1980),
            zone_annual_min_months: 6,
            pole_snap_latitude: 84.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = Parameters::default();
        assert_eq!(p.gridding_radius_km, 1200.0);
        assert_eq!(p.subbox_min_valid, 240);
        assert_eq!(p.zone_annual_min_months, 6);
    }

    #[test]
    fn test_partial_override_from_json() {
        let p: Parameters = serde_json::from_str(r#"{"gridding_radius_km": 250.0}"#).unwrap();
        assert_eq!(p.gridding_radius_km, 250.0);
        assert_eq!(p.box_min_overlap, 20);
    }
}
