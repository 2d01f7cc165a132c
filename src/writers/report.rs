use std::path::Path;

use crate::error::Result;
use crate::processors::annual::ZonalAnnual;
use crate::utils::constants::{valid, ZONE_TITLES};

/// Write the annual zonal means as a CSV table: one row per year, one
/// column per zone, blank cells for missing years.
pub fn write_annual_report(path: &Path, result: &ZonalAnnual) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec!["year".to_string()];
    header.extend(ZONE_TITLES.iter().map(|t| t.to_string()));
    writer.write_record(&header)?;

    for (iy, year) in (0..result.meta.years()).zip(result.meta.yrbeg..) {
        let mut row = vec![year.to_string()];
        for zone in 0..result.annual.len() {
            let v = result.annual[zone][iy];
            row.push(if valid(v) {
                format!("{:.4}", v)
            } else {
                String::new()
            });
        }
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write per-cell gridding diagnostics: one row per cell with its centroid,
/// contributor counts and quality score.
pub fn write_cell_report<'a>(
    path: &Path,
    cells: impl IntoIterator<Item = &'a crate::models::GridCell>,
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["cell", "lat", "lon", "stations", "station_months", "d"])?;

    for cell in cells {
        let (lat, lon) = cell.bounds.centre();
        writer.write_record(&[
            cell.uid(),
            format!("{:.2}", lat),
            format!("{:.2}", lon),
            cell.stations.to_string(),
            cell.station_months.to_string(),
            if valid(cell.d) {
                format!("{:.1}", cell.d)
            } else {
                String::new()
            },
        ])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnalysisMode, RunMetadata};
    use crate::utils::constants::MISSING;

    #[test]
    fn test_annual_report_layout() {
        let meta = RunMetadata::new("t".into(), AnalysisMode::Land, 1880, 24, 1200.0);
        let result = ZonalAnnual {
            meta,
            monthly: vec![vec![0.0; 24]; 16],
            weights: vec![vec![1.0; 24]; 16],
            annual: (0..16)
                .map(|z| vec![z as f64 * 0.1, MISSING])
                .collect(),
            min_months: 6,
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("annual.csv");
        write_annual_report(&path, &result).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("year,64N-90N,"));
        assert!(lines[1].starts_with("1880,0.0000,0.1000,"));
        // Missing second year: blank cells.
        assert!(lines[2].starts_with("1881,,"));
    }
}
