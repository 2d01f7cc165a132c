pub mod boxes;
pub mod cell;
pub mod metadata;
pub mod parameters;
pub mod station;

pub use boxes::{BoxSeries, ZoneSeries};
pub use cell::GridCell;
pub use metadata::{AnalysisMode, RunMetadata};
pub use parameters::Parameters;
pub use station::{StationSeries, StationSeriesBuilder};
