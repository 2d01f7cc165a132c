//! Station-to-cell gridding: the first aggregation stage.
//!
//! Every subbox of the equal-area grid selects its contributing stations by
//! great-circle proximity, combines them longest-record-first, and rebases
//! the result to anomalies.

use crate::error::{AnalysisError, Result};
use crate::geometry::{BoxBounds, GridGeometry, Region};
use crate::models::{AnalysisMode, GridCell, Parameters, RunMetadata, StationSeries};
use crate::processors::geo_filter::incircle;
use crate::processors::series::{anomalize, combine, month_presence, zero_bitstring};
use crate::utils::constants::{valid, MISSING};
use crate::utils::coordinates::radius_to_arc;
use crate::utils::progress::ProgressSink;
use crate::writers::audit::{AuditSink, Contribution};

/// Iterator over the ~8000 grid cells, region by region in the geometry's
/// deterministic traversal order.
pub struct SubboxGrid<'a> {
    records: Vec<StationSeries>,
    regions: std::vec::IntoIter<Region>,
    current: Option<RegionState>,
    monm: usize,
    first_year: i32,
    arc: f64,
    radius_km: f64,
    min_overlap: usize,
    reference_period: (i32, i32),
    pole_snap_latitude: f64,
    audit: &'a mut dyn AuditSink,
    progress: &'a mut dyn ProgressSink,
}

struct RegionState {
    bounds: BoxBounds,
    subboxes: std::vec::IntoIter<BoxBounds>,
    empty_cells: usize,
}

/// Build the run metadata and the cell iterator for one gridding pass
/// (the station-data analysis entry point).
///
/// *records* are consumed and re-sorted once, globally, by descending
/// valid-month count; the sort is stable so equal-length records keep their
/// input order. Every record must span the full run timeline.
pub fn grid_subboxes<'a>(
    mut records: Vec<StationSeries>,
    geometry: &dyn GridGeometry,
    params: &Parameters,
    year_begin: i32,
    last_year: i32,
    audit: &'a mut dyn AuditSink,
    progress: &'a mut dyn ProgressSink,
) -> Result<(RunMetadata, SubboxGrid<'a>)> {
    if last_year < year_begin {
        return Err(AnalysisError::Config(format!(
            "last year {} precedes first year {}",
            last_year, year_begin
        )));
    }
    let monm = 12 * (last_year - year_begin + 1) as usize;
    for record in &records {
        if record.series().len() != monm {
            return Err(AnalysisError::InvalidFormat(format!(
                "station {} has {} months, run timeline has {}",
                record.uid,
                record.series().len(),
                monm
            )));
        }
    }

    records.sort_by(|a, b| b.good_count().cmp(&a.good_count()));

    let radius_km = params.gridding_radius_km;
    let title = format!(
        "{:<20.20} ANOM (C) CR {:4.0}KM {}-present",
        "Station Temperatures", radius_km, year_begin
    );
    let meta = RunMetadata::new(
        format!("{:<80}", title),
        AnalysisMode::Land,
        year_begin,
        monm,
        radius_km,
    );

    let grid = SubboxGrid {
        records,
        regions: geometry.regions().into_iter(),
        current: None,
        monm,
        first_year: year_begin,
        arc: radius_to_arc(radius_km),
        radius_km,
        min_overlap: params.gridding_min_overlap,
        reference_period: params.gridding_reference_period,
        pole_snap_latitude: params.pole_snap_latitude,
        audit,
        progress,
    };
    Ok((meta, grid))
}

impl<'a> Iterator for SubboxGrid<'a> {
    type Item = GridCell;

    fn next(&mut self) -> Option<GridCell> {
        loop {
            if self.current.is_none() {
                let region = self.regions.next()?;
                self.current = Some(RegionState {
                    bounds: region.bounds,
                    subboxes: region.subboxes.into_iter(),
                    empty_cells: 0,
                });
            }

            let next_subbox = self
                .current
                .as_mut()
                .and_then(|state| state.subboxes.next());

            match next_subbox {
                Some(subbox) => {
                    let empty_so_far = self.current.as_ref().map_or(0, |s| s.empty_cells);
                    let cell = self.grid_one_cell(subbox, empty_so_far);
                    if cell.is_empty() {
                        if let Some(state) = self.current.as_mut() {
                            state.empty_cells += 1;
                        }
                    }
                    return Some(cell);
                }
                None => {
                    // Region exhausted: emit its summary and move on.
                    if let Some(state) = self.current.take() {
                        self.progress.on_region(&state.bounds, state.empty_cells);
                    }
                }
            }
        }
    }
}

impl<'a> SubboxGrid<'a> {
    fn grid_one_cell(&mut self, subbox: BoxBounds, empty_so_far: usize) -> GridCell {
        let (mut lat, mut lon) = subbox.centre();
        // All cells touching a pole combine as a single point.
        if lat.round() >= self.pole_snap_latitude {
            lat = 90.0;
            lon = 0.0;
        } else if lat.round() <= -self.pole_snap_latitude {
            lat = -90.0;
            lon = 0.0;
        }
        self.progress.on_cell(lat, lon, empty_so_far);

        let contributors: Vec<(&StationSeries, f64)> =
            incircle(&self.records, self.arc, lat, lon).collect();

        let Some(&(seed, seed_weight)) = contributors.first() else {
            return GridCell {
                series: vec![MISSING; self.monm],
                bounds: subbox,
                first_year: self.first_year,
                stations: 0,
                station_months: 0,
                d: MISSING,
            };
        };

        let mut series = seed.series().to_vec();
        let mut weight: Vec<f64> = series
            .iter()
            .map(|&v| if valid(v) { seed_weight } else { 0.0 })
            .collect();
        let mut station_months = seed.good_count();
        let mut stations = 1;
        let mut max_weight = seed_weight;
        let mut contributed = vec![Contribution::new(
            seed.uid.clone(),
            seed_weight,
            month_presence(&series).bitstring(),
        )];

        for &(record, wt) in &contributors[1..] {
            let counts = combine(
                &mut series,
                &mut weight,
                record.series(),
                wt,
                self.min_overlap,
            );
            let new_months = counts.total();
            if new_months == 0 {
                contributed.push(Contribution::new(record.uid.clone(), 0.0, zero_bitstring()));
                continue;
            }
            station_months += new_months;
            stations += 1;
            contributed.push(Contribution::new(record.uid.clone(), wt, counts.bitstring()));
            max_weight = max_weight.max(wt);
        }

        anomalize(&mut series, self.reference_period, self.first_year);

        let cell = GridCell {
            series,
            bounds: subbox,
            first_year: self.first_year,
            stations,
            station_months,
            d: self.radius_km * (1.0 - max_weight),
        };
        self.audit.record(&cell.uid(), "stations", &contributed);
        cell
    }
}
