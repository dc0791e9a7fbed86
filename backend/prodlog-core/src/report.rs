// src/report.rs
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::aggregator::{
    attendance_months, attendance_processors, available_employees, available_months,
    dates_in_month, filter_attendance, group_by_date, group_by_process, group_by_week,
    summarize_totals, TransactionFilter,
};
use crate::display::{
    attendance_records, day_summary_line, day_summary_record, process_records, summary_card,
    weekly_records, DisplayRecord, SummaryCard,
};
use crate::expected_table::ExpectedDurationTable;
use crate::model::{Dataset, EmployeeSelection, BREAK_PROCESS};

// --- Report Structures ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyReport {
    pub card: SummaryCard,
    pub weekly: Vec<DisplayRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub rows: Vec<DisplayRecord>,
    pub summary: DisplayRecord,
    pub summary_line: String,
}

/// Dropdown contents plus the value each dropdown starts on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub months: Vec<String>,
    pub employees: Vec<String>,
    pub attendance_months: Vec<String>,
    pub attendance_processors: Vec<String>,
    pub default_month: Option<String>,
    pub default_employee: Option<String>,
    pub default_date: Option<NaiveDate>,
}

// --- Dashboard ---

/// Answers one filter selection at a time over the loaded sheets.
///
/// Holds no mutable state, so one instance can serve concurrent callers
/// behind an `Arc`; every call recomputes from the immutable dataset.
#[derive(Debug, Clone)]
pub struct Dashboard {
    dataset: Dataset,
    table: ExpectedDurationTable,
    excluded_processes: Vec<String>,
}

impl Dashboard {
    pub fn new(dataset: Dataset, table: ExpectedDurationTable) -> Self {
        Self {
            dataset,
            table,
            excluded_processes: vec![BREAK_PROCESS.to_string()],
        }
    }

    /// Replaces the processes left out of the monthly summary and weekly table.
    pub fn with_excluded_processes(mut self, processes: Vec<String>) -> Self {
        self.excluded_processes = processes;
        self
    }

    /// Summary card and weekly breakdown for a month.
    pub fn monthly(&self, month: &str, employee: &EmployeeSelection) -> MonthlyReport {
        let filter =
            TransactionFilter::new(month, employee.clone()).excluding(&self.excluded_processes);
        let selected = filter.apply(&self.dataset.transactions);
        debug!(
            "Monthly report for {} / {}: {} transactions",
            employee, month, selected.len()
        );

        let totals = summarize_totals(&selected);
        let card = summary_card(month, employee.label(), &totals);
        let weekly = if totals.is_empty() {
            Vec::new()
        } else {
            weekly_records(&group_by_week(&selected))
        };
        MonthlyReport { card, weekly }
    }

    /// Process-wise totals for a month. Breaks stay in as their own row.
    pub fn monthly_processes(
        &self,
        month: &str,
        employee: &EmployeeSelection,
    ) -> Vec<DisplayRecord> {
        let filter = TransactionFilter::new(month, employee.clone()).keep_breaks();
        let selected = filter.apply(&self.dataset.transactions);
        debug!(
            "Monthly process table for {} / {}: {} transactions",
            employee, month, selected.len()
        );
        process_records(&group_by_process(&selected, &self.table))
    }

    /// Process-wise totals and overall efficiency for one day.
    pub fn daily(&self, date: NaiveDate, employee: &EmployeeSelection) -> DailyReport {
        let (processes, day) =
            group_by_date(&self.dataset.transactions, date, employee, &self.table);
        debug!(
            "Daily report for {} / {}: {} process groups",
            employee, date, processes.len()
        );
        DailyReport {
            date,
            rows: process_records(&processes),
            summary: day_summary_record(&day),
            summary_line: day_summary_line(&day),
        }
    }

    /// Attendance rows; `None` month shows every month.
    pub fn attendance(
        &self,
        month: Option<&str>,
        processor: &EmployeeSelection,
    ) -> Vec<DisplayRecord> {
        let records = filter_attendance(&self.dataset.attendance, month, processor);
        debug!(
            "Attendance table for {} / {:?}: {} rows",
            processor, month, records.len()
        );
        attendance_records(&records, &self.dataset.attendance_columns)
    }

    /// Dates with data in `month`, ascending.
    pub fn dates_in_month(&self, month: &str) -> Vec<NaiveDate> {
        dates_in_month(&self.dataset.transactions, month)
    }

    /// Filter options; every default is the first entry in ascending order.
    pub fn options(&self) -> FilterOptions {
        let transactions = &self.dataset.transactions;
        let months = available_months(transactions);
        let employees = available_employees(transactions);
        let default_month = months.first().cloned();
        let default_date = default_month
            .as_deref()
            .and_then(|month| dates_in_month(transactions, month).into_iter().next());

        FilterOptions {
            default_employee: employees.first().cloned(),
            default_month,
            default_date,
            months,
            employees,
            attendance_months: attendance_months(&self.dataset.attendance),
            attendance_processors: attendance_processors(&self.dataset.attendance),
        }
    }
}
