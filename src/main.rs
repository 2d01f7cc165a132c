use anomaly_gridder::cli::{run, Cli};
use anomaly_gridder::error::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}
