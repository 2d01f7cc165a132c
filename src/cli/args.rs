use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::processors::annual::GlobalMode;
use crate::utils::constants::BASE_YEAR;

#[derive(Parser)]
#[command(name = "anomaly-gridder")]
#[command(about = "Equal-area gridding and zonal reduction of station temperature anomalies")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Grid station data and run the full zonal and annual reduction
    Analyze {
        #[arg(short, long, help = "Input station CSV (id,lat,lon,year,month,value)")]
        stations: PathBuf,

        #[arg(short, long, help = "Output directory for reports and audit logs")]
        output_dir: PathBuf,

        #[arg(short, long, default_value = "1200", help = "Combining radius in km")]
        radius: f64,

        #[arg(long, default_value_t = BASE_YEAR)]
        first_year: i32,

        #[arg(long, help = "Last year of the run timeline (inclusive)")]
        last_year: i32,

        #[arg(
            long,
            value_enum,
            default_value = "variant2",
            help = "Alternate global-mean blend"
        )]
        alternate_global: GlobalModeArg,

        #[arg(long, default_value = "false", help = "Skip the hemispheric blends")]
        no_hemispheric_blend: bool,

        #[arg(long, default_value = "false", help = "Suppress progress output")]
        silent: bool,
    },

    /// Grid station data only and write per-cell diagnostics
    Grid {
        #[arg(short, long, help = "Input station CSV (id,lat,lon,year,month,value)")]
        stations: PathBuf,

        #[arg(short, long, help = "Output CSV of cell diagnostics")]
        output: PathBuf,

        #[arg(short, long, default_value = "1200", help = "Combining radius in km")]
        radius: f64,

        #[arg(long, default_value_t = BASE_YEAR)]
        first_year: i32,

        #[arg(long, help = "Last year of the run timeline (inclusive)")]
        last_year: i32,

        #[arg(long, default_value = "false", help = "Suppress progress output")]
        silent: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum GlobalModeArg {
    Off,
    Variant1,
    Variant2,
}

impl From<GlobalModeArg> for GlobalMode {
    fn from(arg: GlobalModeArg) -> Self {
        match arg {
            GlobalModeArg::Off => GlobalMode::Disabled,
            GlobalModeArg::Variant1 => GlobalMode::Variant1,
            GlobalModeArg::Variant2 => GlobalMode::Variant2,
        }
    }
}
