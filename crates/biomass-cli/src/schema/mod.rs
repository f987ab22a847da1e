pub mod report;
pub mod sheet;
