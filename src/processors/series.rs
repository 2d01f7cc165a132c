//! The series combination primitive and its helpers.
//!
//! Every level of the aggregation hierarchy (stations into cells, cells into
//! boxes, boxes into bands, bands into zones) reuses `combine` with a
//! different minimum-overlap threshold, and rebases its result with
//! `anomalize`.

use crate::utils::constants::{invalid, valid};

/// Per-calendar-month count of values newly populated by one combination.
/// January is position 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MonthCounts([u32; 12]);

impl MonthCounts {
    pub fn counts(&self) -> &[u32; 12] {
        &self.0
    }

    /// Total number of newly populated months across the whole series.
    pub fn total(&self) -> usize {
        self.0.iter().map(|&c| c as usize).sum()
    }

    pub fn any(&self) -> bool {
        self.0.iter().any(|&c| c > 0)
    }

    /// 12-character audit string, '1' marking calendar months that received
    /// data.
    pub fn bitstring(&self) -> String {
        self.0.iter().map(|&c| if c > 0 { '1' } else { '0' }).collect()
    }
}

/// All-zero audit string for contributors that were recorded but not
/// combined.
pub fn zero_bitstring() -> String {
    "0".repeat(12)
}

/// Calendar-month presence mask of a series, used to seed audit records.
pub fn month_presence(series: &[f64]) -> MonthCounts {
    let mut counts = MonthCounts::default();
    for (i, &v) in series.iter().enumerate() {
        if valid(v) {
            counts.0[i % 12] = 1;
        }
    }
    counts
}

/// Combine the series *new* into the accumulator *average* with a scalar
/// incoming weight.
///
/// Overlap is the count of months, over the full series, where both the
/// accumulator and the incoming series are valid. The incoming series is
/// bias-corrected by the mean difference over the overlapping months, then
/// merged: months already present become the weight-proportional mean of
/// the two values; months absent from the accumulator adopt the corrected
/// incoming value outright. *weight* is updated in parallel.
///
/// A positive overlap below *min_overlap* rejects the incoming series
/// entirely (nothing is combined and the returned counts are all zero).
/// An overlap of zero carries no bias information and merges with bias 0,
/// so records disjoint in time can still be united.
pub fn combine(
    average: &mut [f64],
    weight: &mut [f64],
    new: &[f64],
    new_weight: f64,
    min_overlap: usize,
) -> MonthCounts {
    combine_impl(average, weight, new, |_| new_weight, min_overlap)
}

/// As `combine`, with a per-month incoming weight series. Used at the band
/// and zone levels where the incoming weights are contributor counts.
pub fn combine_weighted(
    average: &mut [f64],
    weight: &mut [f64],
    new: &[f64],
    new_weight: &[f64],
    min_overlap: usize,
) -> MonthCounts {
    combine_impl(average, weight, new, |i| new_weight[i], min_overlap)
}

fn combine_impl(
    average: &mut [f64],
    weight: &mut [f64],
    new: &[f64],
    new_weight: impl Fn(usize) -> f64,
    min_overlap: usize,
) -> MonthCounts {
    let mut counts = MonthCounts::default();

    let mut overlap = 0usize;
    let mut sum_average = 0.0;
    let mut sum_new = 0.0;
    for (&a, &n) in average.iter().zip(new.iter()) {
        if valid(a) && valid(n) {
            overlap += 1;
            sum_average += a;
            sum_new += n;
        }
    }

    if overlap > 0 && overlap < min_overlap {
        return counts;
    }
    let bias = if overlap > 0 {
        (sum_average - sum_new) / overlap as f64
    } else {
        0.0
    };

    let months = average.len().min(new.len());
    for i in 0..months {
        let n = new[i];
        if invalid(n) {
            continue;
        }
        let w = new_weight(i);
        if valid(average[i]) {
            average[i] = (weight[i] * average[i] + w * (n + bias)) / (weight[i] + w);
        } else {
            average[i] = n + bias;
            counts.0[i % 12] += 1;
        }
        weight[i] += w;
    }
    counts
}

/// Rebase *data* in place to anomalies against the per-calendar-month mean
/// over *reference_period* (inclusive years). *base_year* is the year of
/// the first series element.
///
/// A calendar month with no valid value inside the reference period falls
/// back to the mean over the whole series; a month with no valid data at
/// all is left untouched.
pub fn anomalize(data: &mut [f64], reference_period: (i32, i32), base_year: i32) {
    let years = data.len() / 12;
    let base = (reference_period.0 - base_year).max(0) as usize;
    let limit = ((reference_period.1 - base_year + 1).max(0) as usize).min(years);

    for m in 0..12 {
        let mut sum = 0.0;
        let mut count = 0usize;
        for y in base..limit {
            let v = data[y * 12 + m];
            if valid(v) {
                sum += v;
                count += 1;
            }
        }
        if count == 0 {
            for y in 0..years {
                let v = data[y * 12 + m];
                if valid(v) {
                    sum += v;
                    count += 1;
                }
            }
        }
        if count == 0 {
            continue;
        }

        let mean = sum / count as f64;
        for y in 0..years {
            let i = y * 12 + m;
            if valid(data[i]) {
                data[i] -= mean;
            }
        }
    }
}

/// Stable descending sort returning the sorted values and the permutation
/// such that `values[perm[x]] == sorted[x]`. Ties keep their original
/// relative order. The input is not mutated.
pub fn sort_perm(values: &[usize]) -> (Vec<usize>, Vec<usize>) {
    let mut perm: Vec<usize> = (0..values.len()).collect();
    perm.sort_by(|&i, &j| values[j].cmp(&values[i]).then(i.cmp(&j)));
    let sorted = perm.iter().map(|&i| values[i]).collect();
    (sorted, perm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::constants::MISSING;

    #[test]
    fn test_combine_with_self_preserves_values() {
        let mut average = vec![1.0, 2.0, MISSING, 4.0];
        let incoming = average.clone();
        let mut weight = vec![1.0, 1.0, 0.0, 1.0];

        let counts = combine(&mut average, &mut weight, &incoming, 1.0, 1);

        assert_eq!(average, vec![1.0, 2.0, MISSING, 4.0]);
        assert_eq!(weight, vec![2.0, 2.0, 0.0, 2.0]);
        assert_eq!(counts.total(), 0);
    }

    #[test]
    fn test_combine_fails_closed_below_overlap() {
        let mut average = vec![1.0, MISSING, 3.0];
        let mut weight = vec![1.0, 0.0, 1.0];
        let incoming = vec![1.5, 2.0, 3.5];

        // Two common months, threshold of three: nothing may change.
        let counts = combine(&mut average, &mut weight, &incoming, 1.0, 3);

        assert_eq!(average, vec![1.0, MISSING, 3.0]);
        assert_eq!(weight, vec![1.0, 0.0, 1.0]);
        assert_eq!(counts.total(), 0);
    }

    #[test]
    fn test_combine_disjoint_series_merge() {
        // No common months: the threshold has nothing to validate and the
        // incoming data is adopted with bias 0.
        let mut average = vec![1.0, MISSING, MISSING, MISSING];
        let mut weight = vec![1.0, 0.0, 0.0, 0.0];
        let incoming = vec![MISSING, 2.0, MISSING, 4.0];

        let counts = combine(&mut average, &mut weight, &incoming, 0.5, 20);

        assert_eq!(average, vec![1.0, 2.0, MISSING, 4.0]);
        assert_eq!(weight, vec![1.0, 0.5, 0.0, 0.5]);
        assert_eq!(counts.total(), 2);
    }

    #[test]
    fn test_combine_applies_bias() {
        // Incoming runs 1.0 warmer over the overlap; its new months must be
        // cooled by the bias before adoption.
        let mut average = vec![0.0, 0.0, MISSING];
        let mut weight = vec![1.0, 1.0, 0.0];
        let incoming = vec![1.0, 1.0, 3.0];

        combine(&mut average, &mut weight, &incoming, 1.0, 2);

        assert!((average[2] - 2.0).abs() < 1e-12);
        // Overlapping months average 0.0 and (1.0 - 1.0).
        assert!(average[0].abs() < 1e-12);
        assert!(average[1].abs() < 1e-12);
    }

    #[test]
    fn test_combine_weight_proportional_mean() {
        let mut average = vec![0.0];
        let mut weight = vec![3.0];
        let incoming = vec![4.0];

        combine(&mut average, &mut weight, &incoming, 1.0, 1);

        // (3*0 + 1*4) / 4
        assert!((average[0] - 1.0).abs() < 1e-12);
        assert!((weight[0] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_month_counts_bitstring() {
        let mut average = vec![MISSING; 24];
        average[0] = 1.0;
        let mut weight = vec![0.0; 24];
        weight[0] = 1.0;
        let mut incoming = vec![MISSING; 24];
        incoming[2] = 0.5; // March, year one
        incoming[14] = 0.7; // March, year two

        let counts = combine(&mut average, &mut weight, &incoming, 1.0, 0);

        assert_eq!(counts.bitstring(), "001000000000");
        assert_eq!(counts.total(), 2);
    }

    #[test]
    fn test_anomalize_reference_mean_is_zero() {
        // Three years, January values 1, 2, 3; reference period covers the
        // first two years.
        let mut data = vec![MISSING; 36];
        data[0] = 1.0;
        data[12] = 2.0;
        data[24] = 3.0;

        anomalize(&mut data, (1880, 1881), 1880);

        // Reference mean 1.5 subtracted everywhere.
        assert!((data[0] + 0.5).abs() < 1e-12);
        assert!((data[12] - 0.5).abs() < 1e-12);
        assert!((data[24] - 1.5).abs() < 1e-12);
        assert!((data[0] + data[12]).abs() < 1e-12);
    }

    #[test]
    fn test_anomalize_falls_back_to_whole_series() {
        // No February data inside the reference period: the whole-series
        // mean is used instead.
        let mut data = vec![MISSING; 36];
        data[25] = 4.0; // February of the third year
        data[13] = 2.0; // February of the second year

        anomalize(&mut data, (1880, 1880), 1880);

        assert!((data[13] + 1.0).abs() < 1e-12);
        assert!((data[25] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_anomalize_leaves_empty_months_untouched() {
        let mut data = vec![MISSING; 24];
        data[0] = 5.0;
        anomalize(&mut data, (1880, 1881), 1880);

        assert!(data[0].abs() < 1e-12);
        for &v in &data[1..] {
            assert_eq!(v, MISSING);
        }
    }

    #[test]
    fn test_sort_perm_descending_with_stable_ties() {
        let values = vec![3, 7, 7, 1, 7];
        let (sorted, perm) = sort_perm(&values);

        assert_eq!(sorted, vec![7, 7, 7, 3, 1]);
        assert_eq!(perm, vec![1, 2, 4, 0, 3]);
        for (rank, &p) in perm.iter().enumerate() {
            assert_eq!(values[p], sorted[rank]);
        }
    }

    #[test]
    fn test_month_presence() {
        let mut series = vec![MISSING; 24];
        series[0] = 1.0;
        series[13] = 2.0; // February, year two
        let mask = month_presence(&series);
        assert_eq!(mask.bitstring(), "110000000000");
    }
}
