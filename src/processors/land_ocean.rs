//! The combined analysis: land cells are paired with ocean cells, a binary
//! land/ocean selector is derived per cell where none is supplied, and the
//! land-only and mixed cell sets are taken through the box, zonal and
//! annual stages.

use crate::error::{AnalysisError, Result};
use crate::geometry::GridGeometry;
use crate::models::{AnalysisMode, GridCell, Parameters, RunMetadata};
use crate::processors::annual::{annzon, AlternateConfig, ZonalAnnual};
use crate::processors::boxes::BoxCombiner;
use crate::processors::zonal::zonav;
use crate::utils::constants::{CELLTYPE_LAND, CELLTYPE_MIXED};
use crate::writers::audit::AuditSink;

/// One subbox of the paired input: the land cell, the ocean cell and an
/// optional externally supplied selector (1 = land, 0 = ocean).
#[derive(Debug, Clone)]
pub struct CellTriple {
    pub weight: Option<f64>,
    pub land: GridCell,
    pub ocean: GridCell,
}

/// Derive the land/ocean selector for one cell pair: land data is used when
/// the ocean record is too sparse or when the land cluster is tight enough
/// to be trusted over it. Binary choice only; no blending.
pub fn derive_weight(land: &GridCell, ocean: &GridCell, params: &Parameters) -> f64 {
    if ocean.good_count() < params.subbox_min_valid || land.d < params.subbox_land_range_km {
        1.0
    } else {
        0.0
    }
}

fn effective_weight(triple: &CellTriple, params: &Parameters) -> Result<f64> {
    match triple.weight {
        Some(w) if w == 0.0 || w == 1.0 => Ok(w),
        Some(w) => Err(AnalysisError::InvalidWeight(w)),
        None => Ok(derive_weight(&triple.land, &triple.ocean, params)),
    }
}

fn iso8601(yrbeg: i32, month: usize) -> String {
    format!("{:04}-{:02}", yrbeg + ((month - 1) / 12) as i32, (month - 1) % 12 + 1)
}

/// Tracks the first/last valid months of the cells selected into the mixed
/// analysis, separately for land and ocean.
#[derive(Debug, Clone, Copy, Default)]
struct MonthRange {
    first: Option<usize>,
    last: Option<usize>,
}

impl MonthRange {
    fn include(&mut self, cell: &GridCell) {
        if let Some(first) = cell.first_valid_month() {
            self.first = Some(self.first.map_or(first, |f| f.min(first)));
        }
        if let Some(last) = cell.last_valid_month() {
            self.last = Some(self.last.map_or(last, |l| l.max(last)));
        }
    }

    fn as_tuple(&self) -> Option<(usize, usize)> {
        match (self.first, self.last) {
            (Some(f), Some(l)) => Some((f, l)),
            _ => None,
        }
    }

    fn describe(&self, yrbeg: i32) -> String {
        match (self.first, self.last) {
            (Some(f), Some(l)) => format!("{} to {}", iso8601(yrbeg, f), iso8601(yrbeg, l)),
            _ => "none".to_string(),
        }
    }
}

/// Run the box, zonal and annual stages over one cell set.
pub fn reduce_cells(
    meta: &RunMetadata,
    cells: Vec<GridCell>,
    geometry: &dyn GridGeometry,
    params: &Parameters,
    alternate: &AlternateConfig,
    celltype: &str,
    audit: &mut dyn AuditSink,
) -> Result<ZonalAnnual> {
    let boxes = BoxCombiner::new(meta, cells, geometry, params, celltype, audit)?;
    let zones = zonav(meta, boxes, &geometry.boxes_in_band(), params)?;
    annzon(meta, &zones, alternate, params)
}

/// The combined land/ocean analysis entry point.
///
/// Consumes one `CellTriple` per subbox and produces the land-only and the
/// land+ocean-combined reductions. A land/ocean valid-month range mismatch
/// in the mixed selection is surfaced as a warning and processing
/// continues; the independently tracked ranges are recorded in the mixed
/// metadata.
#[allow(clippy::too_many_arguments)]
pub fn land_ocean_analysis(
    land_meta: &RunMetadata,
    ocean_meta: &RunMetadata,
    triples: impl IntoIterator<Item = CellTriple>,
    geometry: &dyn GridGeometry,
    params: &Parameters,
    alternate: &AlternateConfig,
    land_audit: &mut dyn AuditSink,
    mixed_audit: &mut dyn AuditSink,
) -> Result<(ZonalAnnual, ZonalAnnual)> {
    let mut land_cells: Vec<GridCell> = Vec::new();
    let mut mixed_cells: Vec<GridCell> = Vec::new();
    let mut land_range = MonthRange::default();
    let mut ocean_range = MonthRange::default();

    for triple in triples {
        let weight = effective_weight(&triple, params)?;
        land_cells.push(triple.land.clone());
        if weight == 1.0 {
            land_range.include(&triple.land);
            mixed_cells.push(triple.land);
        } else {
            ocean_range.include(&triple.ocean);
            mixed_cells.push(triple.ocean);
        }
    }

    if land_range.as_tuple() != ocean_range.as_tuple() {
        tracing::warn!(
            "bad mix of land and ocean data: land range {}; ocean range {}",
            land_range.describe(land_meta.yrbeg),
            ocean_range.describe(ocean_meta.yrbeg)
        );
    }

    let mut land_only_meta = land_meta.clone();
    land_only_meta.mode = AnalysisMode::Land;
    let land_result = reduce_cells(
        &land_only_meta,
        land_cells,
        geometry,
        params,
        alternate,
        CELLTYPE_LAND,
        land_audit,
    )?;

    let mixed_meta = mixed_metadata(land_meta, ocean_meta, &land_range, &ocean_range);
    let mixed_result = reduce_cells(
        &mixed_meta,
        mixed_cells,
        geometry,
        params,
        alternate,
        CELLTYPE_MIXED,
        mixed_audit,
    )?;

    Ok((land_result, mixed_result))
}

/// Mixed metadata starts from the land metadata: the timeline is widened to
/// cover both inputs, and the month ranges observed during cell selection
/// are late-bound here.
fn mixed_metadata(
    land_meta: &RunMetadata,
    ocean_meta: &RunMetadata,
    land_range: &MonthRange,
    ocean_range: &MonthRange,
) -> RunMetadata {
    let first_year = land_meta.yrbeg.min(ocean_meta.yrbeg);
    let land_limit_year = land_meta.yrbeg + (land_meta.monm / 12) as i32;
    let ocean_limit_year = ocean_meta.yrbeg + (ocean_meta.monm / 12) as i32;
    let limit_year = land_limit_year.max(ocean_limit_year);
    let monm = ((limit_year - first_year) * 12) as usize;

    let mut meta = land_meta.clone();
    meta.yrbeg = first_year;
    meta.monm = monm;
    meta.mode = AnalysisMode::Mixed;
    meta.land_month_range = land_range.as_tuple();
    meta.ocean_month_range = ocean_range.as_tuple();
    meta.title = format!(
        "Combined Land--Ocean Temperature Anomaly (C) CR {:4.0}km {} to {}",
        land_meta.gridding_radius_km,
        first_year,
        limit_year - 1
    );
    meta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoxBounds;
    use crate::utils::constants::MISSING;

    fn cell(first_year: i32, series: Vec<f64>, d: f64) -> GridCell {
        GridCell {
            series,
            bounds: BoxBounds::new(0.0, 10.0, 0.0, 10.0),
            first_year,
            stations: 1,
            station_months: 1,
            d,
        }
    }

    #[test]
    fn test_derive_weight_prefers_land_for_sparse_ocean() {
        let params = Parameters::default();
        let land = cell(1880, vec![0.0; 360], 50.0);
        let ocean = cell(1880, vec![MISSING; 360], MISSING);
        assert_eq!(derive_weight(&land, &ocean, &params), 1.0);
    }

    #[test]
    fn test_derive_weight_prefers_rich_ocean_over_loose_land() {
        let params = Parameters::default();
        // Loose land cluster (d above the range), well-populated ocean.
        let land = cell(1880, vec![0.0; 360], 800.0);
        let ocean = cell(1880, vec![0.5; 360], 0.0);
        assert_eq!(derive_weight(&land, &ocean, &params), 0.0);
    }

    #[test]
    fn test_explicit_weight_validated() {
        let params = Parameters::default();
        let triple = CellTriple {
            weight: Some(0.5),
            land: cell(1880, vec![0.0; 12], 0.0),
            ocean: cell(1880, vec![0.0; 12], 0.0),
        };
        assert!(matches!(
            effective_weight(&triple, &params),
            Err(AnalysisError::InvalidWeight(_))
        ));

        let triple = CellTriple {
            weight: Some(1.0),
            ..triple
        };
        assert_eq!(effective_weight(&triple, &params).unwrap(), 1.0);
    }

    #[test]
    fn test_mixed_metadata_widens_timeline() {
        let land = RunMetadata::new("land".into(), AnalysisMode::Land, 1880, 120, 1200.0);
        let ocean = RunMetadata::new("ocean".into(), AnalysisMode::Ocean, 1875, 120, 1200.0);
        let meta = mixed_metadata(&land, &ocean, &MonthRange::default(), &MonthRange::default());

        assert_eq!(meta.yrbeg, 1875);
        // 1875 through 1889 inclusive.
        assert_eq!(meta.monm, 180);
        assert_eq!(meta.mode, AnalysisMode::Mixed);
    }

    #[test]
    fn test_iso8601_formatting() {
        assert_eq!(iso8601(1880, 1), "1880-01");
        assert_eq!(iso8601(1880, 12), "1880-12");
        assert_eq!(iso8601(1880, 13), "1881-01");
    }
}
