use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::geometry::BoxBounds;

/// Reporting port for the gridding stages.
///
/// One update is issued per cell (overwritten in place by console
/// implementations) and one summary per parent region (appended). Progress
/// output is not required for correctness; stages accept a `NullProgress`
/// when running headless.
pub trait ProgressSink {
    /// Called once per cell with the (pole-snapped) centroid and the number
    /// of empty cells seen so far in the current region.
    fn on_cell(&mut self, lat: f64, lon: f64, empty_cells: usize);

    /// Called once per region after all of its cells have been emitted.
    fn on_region(&mut self, bounds: &BoxBounds, empty_cells: usize);
}

/// Discards all progress updates.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn on_cell(&mut self, _lat: f64, _lon: f64, _empty_cells: usize) {}

    fn on_region(&mut self, _bounds: &BoxBounds, _empty_cells: usize) {}
}

pub struct ProgressReporter {
    progress_bar: Option<ProgressBar>,
    silent: bool,
}

impl ProgressReporter {
    pub fn new(total: u64, message: &str, silent: bool) -> Self {
        if silent {
            Self {
                progress_bar: None,
                silent: true,
            }
        } else {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
                    .unwrap()
                    .progress_chars("#>-"),
            );
            pb.set_message(message.to_string());
            pb.enable_steady_tick(Duration::from_millis(100));

            Self {
                progress_bar: Some(pb),
                silent: false,
            }
        }
    }

    pub fn new_spinner(message: &str, silent: bool) -> Self {
        if silent {
            Self {
                progress_bar: None,
                silent: true,
            }
        } else {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg}")
                    .unwrap(),
            );
            pb.set_message(message.to_string());
            pb.enable_steady_tick(Duration::from_millis(100));

            Self {
                progress_bar: Some(pb),
                silent: false,
            }
        }
    }

    pub fn update(&self, current: u64) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_position(current);
        }
    }

    pub fn increment(&self, delta: u64) {
        if let Some(ref pb) = self.progress_bar {
            pb.inc(delta);
        }
    }

    pub fn set_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_message(message.to_string());
        }
    }

    pub fn finish_with_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_with_message(message.to_string());
        }
    }

    pub fn finish(&self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish();
        }
    }

    pub fn println(&self, message: &str) {
        if !self.silent {
            if let Some(ref pb) = self.progress_bar {
                pb.println(message);
            } else {
                println!("{}", message);
            }
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish();
        }
    }
}

/// Console progress for the subbox gridding pass: a cell-count bar with the
/// current centroid in the message line, and one appended summary line per
/// completed region.
pub struct ConsoleProgress {
    reporter: ProgressReporter,
    cells_done: u64,
}

impl ConsoleProgress {
    pub fn new(total_cells: u64, silent: bool) -> Self {
        Self {
            reporter: ProgressReporter::new(total_cells, "Gridding subboxes", silent),
            cells_done: 0,
        }
    }

    pub fn finish(&self) {
        self.reporter.finish_with_message("Gridding complete");
    }
}

impl ProgressSink for ConsoleProgress {
    fn on_cell(&mut self, lat: f64, lon: f64, empty_cells: usize) {
        self.cells_done += 1;
        self.reporter.update(self.cells_done);
        self.reporter.set_message(&format!(
            "subbox at {:+05.1}{:+06.1} ({} empty)",
            lat, lon, empty_cells
        ));
    }

    fn on_region(&mut self, bounds: &BoxBounds, empty_cells: usize) {
        let plural = if empty_cells == 1 { "" } else { "s" };
        self.reporter.println(&format!(
            "Region ({:+03.0}/{:+03.0} S/N {:+04.0}/{:+04.0} W/E): {} empty cell{}.",
            bounds.south, bounds.north, bounds.west, bounds.east, empty_cells, plural
        ));
    }
}
