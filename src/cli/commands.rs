use std::path::Path;

use crate::cli::args::{Cli, Commands};
use crate::error::Result;
use crate::geometry::{EqualAreaGrid, GridGeometry};
use crate::models::{GridCell, Parameters};
use crate::processors::annual::AlternateConfig;
use crate::processors::land_ocean::reduce_cells;
use crate::processors::subbox::grid_subboxes;
use crate::readers::StationReader;
use crate::utils::constants::CELLTYPE_LAND;
use crate::utils::progress::ConsoleProgress;
use crate::writers::audit::FileAudit;
use crate::writers::report::{write_annual_report, write_cell_report};

pub fn run(cli: Cli) -> Result<()> {
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    match cli.command {
        Commands::Analyze {
            stations,
            output_dir,
            radius,
            first_year,
            last_year,
            alternate_global,
            no_hemispheric_blend,
            silent,
        } => {
            std::fs::create_dir_all(&output_dir)?;

            let params = Parameters {
                gridding_radius_km: radius,
                ..Parameters::default()
            };
            let geometry = EqualAreaGrid::new();

            println!("Gridding station data...");
            println!("Input file: {}", stations.display());
            println!("Radius: {:.0} km, timeline {}-{}", radius, first_year, last_year);

            let (meta, cells) = grid_stations(
                &stations,
                &geometry,
                &params,
                first_year,
                last_year,
                &output_dir.join("cells.log"),
                silent,
            )?;

            let populated = cells.iter().filter(|c| !c.is_empty()).count();
            println!("Gridded {} cells ({} populated)", cells.len(), populated);

            let alternate = AlternateConfig {
                global_mode: alternate_global.into(),
                hemispheric: !no_hemispheric_blend,
            };

            println!("Reducing to zonal and annual means...");
            let mut box_audit = FileAudit::create(&output_dir.join("boxes.log"))?;
            let result = reduce_cells(
                &meta,
                cells,
                &geometry,
                &params,
                &alternate,
                CELLTYPE_LAND,
                &mut box_audit,
            )?;

            let report_path = output_dir.join("annual-zonal-means.csv");
            write_annual_report(&report_path, &result)?;

            println!("Annual report: {}", report_path.display());
            println!("Audit logs: {}", output_dir.display());
            println!("Analysis complete!");
            Ok(())
        }

        Commands::Grid {
            stations,
            output,
            radius,
            first_year,
            last_year,
            silent,
        } => {
            let params = Parameters {
                gridding_radius_km: radius,
                ..Parameters::default()
            };
            let geometry = EqualAreaGrid::new();

            println!("Gridding station data...");
            println!("Input file: {}", stations.display());

            if let Some(parent) = output.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let audit_path = output.with_extension("log");
            let (_, cells) = grid_stations(
                &stations,
                &geometry,
                &params,
                first_year,
                last_year,
                &audit_path,
                silent,
            )?;

            let populated = cells.iter().filter(|c| !c.is_empty()).count();
            write_cell_report(&output, cells.iter())?;

            println!("Gridded {} cells ({} populated)", cells.len(), populated);
            println!("Cell report: {}", output.display());
            Ok(())
        }
    }
}

/// Read the station file and run the gridding pass with a console progress
/// bar and a file-backed audit trail.
fn grid_stations(
    stations: &Path,
    geometry: &dyn GridGeometry,
    params: &Parameters,
    first_year: i32,
    last_year: i32,
    audit_path: &Path,
    silent: bool,
) -> Result<(crate::models::RunMetadata, Vec<GridCell>)> {
    let monm = 12 * (last_year - first_year + 1).max(0) as usize;
    let reader = StationReader::new(first_year, monm);
    let records = reader.read_stations(stations)?;
    println!("Read {} stations", records.len());

    let total_cells: usize = geometry.regions().iter().map(|r| r.subboxes.len()).sum();
    let mut audit = FileAudit::create(audit_path)?;
    let mut progress = ConsoleProgress::new(total_cells as u64, silent);

    let (meta, grid) = grid_subboxes(
        records,
        geometry,
        params,
        first_year,
        last_year,
        &mut audit,
        &mut progress,
    )?;
    let cells: Vec<GridCell> = grid.collect();
    progress.finish();

    Ok((meta, cells))
}
