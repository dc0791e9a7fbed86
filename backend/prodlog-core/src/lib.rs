// src/lib.rs
//! Productivity log reporting: loads the transaction and attendance sheets
//! (as CSV exports) and turns them into UPT summaries, weekly and
//! process-wise breakdowns and attendance tables, formatted for display.

pub mod aggregator;
pub mod config;
pub mod display;
pub mod duration_format;
pub mod error;
pub mod expected_table;
pub mod loader;
pub mod model;
pub mod report;

#[cfg(test)]
mod aggregator_tests;

pub use aggregator::{
    filter_attendance, group_by_date, group_by_process, group_by_week, summarize_totals,
    DaySummary, ProcessSummary, Totals, TransactionFilter, WeeklySummary,
};
pub use config::AppConfig;
pub use display::{DisplayRecord, FieldDescriptor, FieldKind, SummaryCard};
pub use duration_format::{format_duration, parse_duration};
pub use error::ReportError;
pub use expected_table::ExpectedDurationTable;
pub use model::{AttendanceRecord, Dataset, EmployeeSelection, ProcessorId, Transaction};
pub use report::{Dashboard, DailyReport, FilterOptions, MonthlyReport};
