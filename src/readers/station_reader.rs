use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::models::{StationSeries, StationSeriesBuilder};

/// One row of the long-format input: a single monthly reading.
#[derive(Debug, Deserialize)]
struct StationRow {
    id: String,
    lat: f64,
    lon: f64,
    year: i32,
    month: u32,
    value: f64,
}

/// Reads station series from a CSV file with columns
/// `id,lat,lon,year,month,value`, one row per station-month.
///
/// Readings outside the run timeline are dropped; stations are returned
/// sorted by identifier so a run is deterministic regardless of row order.
pub struct StationReader {
    start_year: i32,
    months: usize,
}

impl StationReader {
    pub fn new(start_year: i32, months: usize) -> Self {
        Self { start_year, months }
    }

    pub fn read_stations(&self, path: &Path) -> Result<Vec<StationSeries>> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut builders: BTreeMap<String, StationSeriesBuilder> = BTreeMap::new();

        for row in reader.deserialize() {
            let row: StationRow = row?;
            builders
                .entry(row.id.clone())
                .or_insert_with(|| {
                    StationSeriesBuilder::new(&row.id, row.lat, row.lon, self.start_year, self.months)
                })
                .set(row.year, row.month, row.value);
        }

        builders.into_values().map(|b| b.build()).collect()
    }
}
