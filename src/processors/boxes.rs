//! Cell-to-box aggregation: the ~8000 subbox cells are partitioned into the
//! 80 large boxes and combined, longest record first, into one series per
//! box.

use std::cmp::Reverse;

use crate::error::{AnalysisError, Result};
use crate::geometry::{BoxBounds, GridGeometry};
use crate::models::{BoxSeries, GridCell, Parameters, RunMetadata};
use crate::processors::series::{anomalize, combine, month_presence, zero_bitstring};
use crate::utils::constants::{valid, MISSING};
use crate::writers::audit::{AuditSink, Contribution};

/// Iterator of box series, one box per `next()` call in the geometry's box
/// order.
///
/// Construction consumes the whole cell stream: cells are assigned to boxes
/// by centroid containment (first matching box wins), which requires the
/// boxes to partition the sphere. A cell whose centroid matches no box is a
/// structural geometry error.
pub struct BoxCombiner<'a> {
    yrbeg: i32,
    monm: usize,
    boxes: Vec<BoxBounds>,
    contributors: Vec<Vec<GridCell>>,
    index: usize,
    min_valid: usize,
    min_overlap: usize,
    reference_period: (i32, i32),
    celltype: String,
    audit: &'a mut dyn AuditSink,
}

impl<'a> BoxCombiner<'a> {
    pub fn new(
        meta: &RunMetadata,
        cells: impl IntoIterator<Item = GridCell>,
        geometry: &dyn GridGeometry,
        params: &Parameters,
        celltype: &str,
        audit: &'a mut dyn AuditSink,
    ) -> Result<Self> {
        let boxes = geometry.boxes();
        let mut contributors: Vec<Vec<GridCell>> = vec![Vec::new(); boxes.len()];

        for cell in cells {
            let (lat, lon) = cell.bounds.centre();
            let index = boxes
                .iter()
                .position(|b| b.contains(lat, lon))
                .ok_or_else(|| AnalysisError::GeometryMismatch {
                    expected: "every cell centroid inside a box".to_string(),
                    found: format!("cell {} outside all {} boxes", cell.uid(), boxes.len()),
                })?;
            contributors[index].push(cell);
        }

        Ok(Self {
            yrbeg: meta.yrbeg,
            monm: meta.monm,
            boxes,
            contributors,
            index: 0,
            min_valid: params.subbox_min_valid,
            min_overlap: params.box_min_overlap,
            reference_period: params.subbox_reference_period,
            celltype: celltype.to_string(),
            audit,
        })
    }

    /// Pad a cell's series into the box timeline, which may start in a
    /// different year.
    fn padded_series(&self, cell: &GridCell) -> Vec<f64> {
        let mut result = vec![MISSING; self.monm];
        let offset = 12 * (cell.first_year - self.yrbeg) as i64;
        for (i, &v) in cell.series.iter().enumerate() {
            let j = offset + i as i64;
            if j >= 0 && (j as usize) < self.monm {
                result[j as usize] = v;
            }
        }
        result
    }

    fn combine_box(&mut self, bounds: BoxBounds, mut cells: Vec<GridCell>) -> BoxSeries {
        cells.sort_by_cached_key(|c| Reverse(c.good_count()));

        let Some(best) = cells.first() else {
            return BoxSeries {
                series: vec![MISSING; self.monm],
                weight: vec![0.0; self.monm],
                ngood: 0,
                bounds,
            };
        };

        let mut series = self.padded_series(best);
        let mut weight: Vec<f64> = series
            .iter()
            .map(|&v| if valid(v) { 1.0 } else { 0.0 })
            .collect();
        let mut contributed = vec![Contribution::new(
            best.uid(),
            1.0,
            month_presence(&series).bitstring(),
        )];

        for cell in &cells[1..] {
            if cell.good_count() >= self.min_valid {
                let addend = self.padded_series(cell);
                let counts = combine(&mut series, &mut weight, &addend, 1.0, self.min_overlap);
                contributed.push(Contribution::new(cell.uid(), 1.0, counts.bitstring()));
            } else {
                // Below the contribution threshold: recorded, not combined.
                contributed.push(Contribution::new(cell.uid(), 0.0, zero_bitstring()));
            }
        }

        anomalize(&mut series, self.reference_period, self.yrbeg);
        let ngood = series.iter().filter(|&&v| valid(v)).count();

        self.audit
            .record(&bounds.box_uid(&self.celltype), "cells", &contributed);

        BoxSeries {
            series,
            weight,
            ngood,
            bounds,
        }
    }
}

impl<'a> Iterator for BoxCombiner<'a> {
    type Item = BoxSeries;

    fn next(&mut self) -> Option<BoxSeries> {
        if self.index >= self.boxes.len() {
            return None;
        }
        let bounds = self.boxes[self.index];
        let cells = std::mem::take(&mut self.contributors[self.index]);
        self.index += 1;
        Some(self.combine_box(bounds, cells))
    }
}
