//! Zonal averaging: boxes are combined into 8 latitude bands, and the bands
//! into 8 compound zones (tropics, mid-latitudes, hemispheres, global).

use crate::error::{AnalysisError, Result};
use crate::models::{BoxSeries, Parameters, RunMetadata, ZoneSeries};
use crate::processors::series::{anomalize, combine_weighted, sort_perm};
use crate::utils::constants::MISSING;

/// Which bands make up each compound zone, in output order:
/// northern extratropics, tropics, southern extratropics, northern and
/// southern mid-latitudes, the two hemispheres, and the globe.
const BAND_IN_ZONE: [&[usize]; 8] = [
    &[0, 1, 2],
    &[3, 4],
    &[5, 6, 7],
    &[1, 2],
    &[5, 6],
    &[0, 1, 2, 3],
    &[4, 5, 6, 7],
    &[0, 1, 2, 3, 4, 5, 6, 7],
];

/// Combine the box stream into 16 zonal series: the 8 latitude bands in
/// order, then the 8 compound zones.
///
/// *boxes_in_band* declares how many boxes each band takes from the stream,
/// in stream order; the stream must contain exactly that many boxes in
/// total, or the run aborts with a geometry mismatch.
pub fn zonav(
    meta: &RunMetadata,
    mut boxes: impl Iterator<Item = BoxSeries>,
    boxes_in_band: &[usize],
    params: &Parameters,
) -> Result<Vec<ZoneSeries>> {
    let monm = meta.monm;
    let expected: usize = boxes_in_band.iter().sum();
    let mut zones: Vec<ZoneSeries> = Vec::with_capacity(16);
    let mut band_lengths: Vec<usize> = Vec::with_capacity(boxes_in_band.len());

    for (band, &count) in boxes_in_band.iter().enumerate() {
        let mut band_boxes: Vec<BoxSeries> = Vec::with_capacity(count);
        for _ in 0..count {
            let b = boxes.next().ok_or_else(|| AnalysisError::GeometryMismatch {
                expected: format!("{} boxes in {} bands", expected, boxes_in_band.len()),
                found: format!("stream exhausted inside band {}", band),
            })?;
            band_boxes.push(b);
        }

        let lengths: Vec<usize> = band_boxes.iter().map(|b| b.ngood).collect();
        let total_length: usize = lengths.iter().sum();

        let (mut avg, wt) = if total_length == 0 {
            (vec![MISSING; monm], vec![0.0; monm])
        } else {
            let (sorted, perm) = sort_perm(&lengths);
            let seed = &band_boxes[perm[0]];
            let mut avg = seed.series.clone();
            let mut wt = seed.weight.clone();
            for rank in 1..band_boxes.len() {
                if sorted[rank] == 0 {
                    // Sorted by length: everything from here on is empty.
                    break;
                }
                let b = &band_boxes[perm[rank]];
                combine_weighted(&mut avg, &mut wt, &b.series, &b.weight, params.box_min_overlap);
            }
            (avg, wt)
        };

        anomalize(&mut avg, params.box_reference_period, meta.yrbeg);
        let zone = ZoneSeries {
            series: avg,
            weight: wt,
        };
        band_lengths.push(zone.good_count());
        zones.push(zone);
    }

    // The bands partition the boxes; anything left in the stream means the
    // declared band sizes disagree with the geometry.
    if boxes.next().is_some() {
        return Err(AnalysisError::GeometryMismatch {
            expected: format!("{} boxes in {} bands", expected, boxes_in_band.len()),
            found: "extra boxes after the final band".to_string(),
        });
    }

    let (_, rank_order) = sort_perm(&band_lengths);
    for (zone_index, members) in BAND_IN_ZONE.iter().enumerate() {
        // Longest member band seeds the compound zone.
        let first_rank = (0..rank_order.len())
            .find(|&rank| members.contains(&rank_order[rank]))
            .ok_or_else(|| AnalysisError::GeometryMismatch {
                expected: format!("a band for compound zone {}", zone_index),
                found: "no member band".to_string(),
            })?;
        let seed_band = rank_order[first_rank];
        if band_lengths[seed_band] == 0 {
            tracing::warn!("no data for compound zone {}", zone_index);
        }

        let mut avg = zones[seed_band].series.clone();
        let mut wt = zones[seed_band].weight.clone();
        for rank in (first_rank + 1)..rank_order.len() {
            let band = rank_order[rank];
            if !members.contains(&band) {
                continue;
            }
            combine_weighted(
                &mut avg,
                &mut wt,
                &zones[band].series,
                &zones[band].weight,
                params.box_min_overlap,
            );
        }
        anomalize(&mut avg, params.box_reference_period, meta.yrbeg);
        zones.push(ZoneSeries {
            series: avg,
            weight: wt,
        });
    }

    Ok(zones)
}
