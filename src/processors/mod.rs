pub mod annual;
pub mod boxes;
pub mod geo_filter;
pub mod land_ocean;
pub mod series;
pub mod subbox;
pub mod zonal;

pub use annual::{annzon, AlternateConfig, GlobalMode, ZonalAnnual};
pub use boxes::BoxCombiner;
pub use geo_filter::incircle;
pub use land_ocean::{land_ocean_analysis, reduce_cells, CellTriple};
pub use subbox::{grid_subboxes, SubboxGrid};
pub use zonal::zonav;
