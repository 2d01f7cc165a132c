pub mod audit;
pub mod report;

pub use audit::{AuditSink, Contribution, FileAudit, MemoryAudit, NullAudit};
pub use report::{write_annual_report, write_cell_report};
