pub mod report;

pub use report::{Report, ReportRow, ReportSection};
