use crate::models::StationSeries;
use crate::utils::coordinates::{angle_cosine, chord_length};

/// Filter *records* to the stations within *arc* radians of great-circle
/// distance from the target point (degrees), pairing each with a proximity
/// weight.
///
/// Stations are yielded in input order. The weight is `1 - d/arc` where *d*
/// is the chord length on a unit sphere: exactly 1 at the target point,
/// falling towards 0 as the separation approaches *arc*. A pure, lazy
/// filter; re-iterable because the input slice is.
pub fn incircle<'a>(
    records: &'a [StationSeries],
    arc: f64,
    lat: f64,
    lon: f64,
) -> impl Iterator<Item = (&'a StationSeries, f64)> + 'a {
    let cos_arc = arc.cos();
    records.iter().filter_map(move |record| {
        let cosd = angle_cosine(record.lat, record.lon, lat, lon);
        if cosd > cos_arc {
            let d = chord_length(cosd);
            Some((record, 1.0 - d / arc))
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::constants::MISSING;
    use crate::utils::coordinates::angular_distance;

    fn station(uid: &str, lat: f64, lon: f64) -> StationSeries {
        StationSeries::new(uid.to_string(), lat, lon, vec![MISSING; 12]).unwrap()
    }

    #[test]
    fn test_all_results_within_arc() {
        let records = vec![
            station("A", 0.0, 0.0),
            station("B", 5.0, 5.0),
            station("C", 40.0, 40.0),
            station("D", -3.0, 2.0),
        ];
        let arc = 0.2; // ~11.5 degrees

        for (record, weight) in incircle(&records, arc, 0.0, 0.0) {
            let d = angular_distance(record.lat, record.lon, 0.0, 0.0);
            assert!(d < arc);
            assert!(weight > 0.0 && weight <= 1.0);
        }
        assert_eq!(incircle(&records, arc, 0.0, 0.0).count(), 3);
    }

    #[test]
    fn test_weight_is_one_at_target() {
        let records = vec![station("A", 12.5, -45.0)];
        let results: Vec<_> = incircle(&records, 0.1, 12.5, -45.0).collect();
        assert_eq!(results.len(), 1);
        assert!((results[0].1 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_weight_decreases_with_distance() {
        let records = vec![
            station("NEAR", 1.0, 0.0),
            station("MID", 3.0, 0.0),
            station("FAR", 6.0, 0.0),
        ];
        let weights: Vec<f64> = incircle(&records, 0.2, 0.0, 0.0)
            .map(|(_, w)| w)
            .collect();

        assert_eq!(weights.len(), 3);
        assert!(weights[0] > weights[1]);
        assert!(weights[1] > weights[2]);
    }

    #[test]
    fn test_input_order_preserved() {
        let records = vec![
            station("B", 2.0, 0.0),
            station("A", 1.0, 0.0),
            station("C", 3.0, 0.0),
        ];
        let ids: Vec<&str> = incircle(&records, 0.2, 0.0, 0.0)
            .map(|(r, _)| r.uid.as_str())
            .collect();
        assert_eq!(ids, vec!["B", "A", "C"]);
    }
}
