use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::Result;
use crate::utils::constants::{valid, MISSING};

/// One station's monthly values over the fixed global timeline.
///
/// The series always has the full run length (months are addressed as
/// `12 * (year - start_year) + month`), with MISSING marking absent months.
/// Immutable once built; the aggregation stages only read it.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StationSeries {
    pub uid: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub lon: f64,

    series: Vec<f64>,
    good_count: usize,
    rel_first_month: usize,
    rel_last_month: usize,
}

impl StationSeries {
    /// Build a station record from a full-timeline series, caching the
    /// valid-month count and the 1-based offsets of the first and last
    /// valid months (0 when the series is entirely empty).
    pub fn new(uid: String, lat: f64, lon: f64, series: Vec<f64>) -> Result<Self> {
        let good_count = series.iter().filter(|&&v| valid(v)).count();
        let rel_first_month = series.iter().position(|&v| valid(v)).map_or(0, |i| i + 1);
        let rel_last_month = series.iter().rposition(|&v| valid(v)).map_or(0, |i| i + 1);

        let station = Self {
            uid,
            lat,
            lon,
            series,
            good_count,
            rel_first_month,
            rel_last_month,
        };
        station.validate()?;
        Ok(station)
    }

    pub fn series(&self) -> &[f64] {
        &self.series
    }

    /// Number of valid months in the record.
    pub fn good_count(&self) -> usize {
        self.good_count
    }

    /// 1-based offset of the first valid month, 0 for an empty record.
    pub fn rel_first_month(&self) -> usize {
        self.rel_first_month
    }

    /// 1-based offset of the last valid month, 0 for an empty record.
    pub fn rel_last_month(&self) -> usize {
        self.rel_last_month
    }

    pub fn is_empty(&self) -> bool {
        self.good_count == 0
    }
}

/// Assembles a `StationSeries` from sparse (year, month) readings.
pub struct StationSeriesBuilder {
    uid: String,
    lat: f64,
    lon: f64,
    start_year: i32,
    values: Vec<f64>,
}

impl StationSeriesBuilder {
    pub fn new(uid: &str, lat: f64, lon: f64, start_year: i32, months: usize) -> Self {
        Self {
            uid: uid.to_string(),
            lat,
            lon,
            start_year,
            values: vec![MISSING; months],
        }
    }

    /// Record one monthly value. *month* is 1-12. Readings outside the run
    /// timeline are ignored.
    pub fn set(&mut self, year: i32, month: u32, value: f64) {
        if !(1..=12).contains(&month) {
            return;
        }
        let index = 12 * (year - self.start_year) as i64 + (month as i64 - 1);
        if index >= 0 && (index as usize) < self.values.len() {
            self.values[index as usize] = value;
        }
    }

    pub fn build(self) -> Result<StationSeries> {
        StationSeries::new(self.uid, self.lat, self.lon, self.values)
    }
}
