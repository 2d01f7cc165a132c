pub mod constants;
pub mod coordinates;
pub mod progress;

pub use constants::*;
pub use progress::{ConsoleProgress, NullProgress, ProgressReporter, ProgressSink};
