// src/model.rs
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::Serialize;
use std::{convert::Infallible, fmt, str::FromStr};

// --- Constants ---

/// Dropdown value meaning "don't filter on employee".
pub const ALL_EMPLOYEES: &str = "All";

/// Process type excluded from the monthly summary and weekly breakdown.
pub const BREAK_PROCESS: &str = "Break";

const MONTH_FORMAT: &str = "%Y-%m";

// --- Processor identifiers ---

/// An employee identifier that passed load-time validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ProcessorId(String);

impl ProcessorId {
    /// Trims and validates a raw cell value.
    ///
    /// A value is accepted when it is non-empty and, if it reads as a
    /// number, that number is finite and non-zero. Blank cells, `0`,
    /// `0.0` and `nan` left behind by the spreadsheet export all fail.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if is_valid_processor(trimmed) {
            Some(Self(trimmed.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProcessorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_valid_processor(trimmed: &str) -> bool {
    if trimmed.is_empty() {
        return false;
    }
    match trimmed.parse::<f64>() {
        Ok(value) => !value.is_nan() && value != 0.0,
        Err(_) => true,
    }
}

// --- Employee selection ---

/// Employee filter as chosen in a dropdown: everyone, or one processor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EmployeeSelection {
    #[default]
    All,
    One(String),
}

impl EmployeeSelection {
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value == ALL_EMPLOYEES {
            EmployeeSelection::All
        } else {
            EmployeeSelection::One(value.to_string())
        }
    }

    pub fn matches(&self, processor: &str) -> bool {
        match self {
            EmployeeSelection::All => true,
            EmployeeSelection::One(selected) => selected == processor,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            EmployeeSelection::All => ALL_EMPLOYEES,
            EmployeeSelection::One(selected) => selected,
        }
    }
}

impl FromStr for EmployeeSelection {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for EmployeeSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// --- Transaction log ---

/// One row of the productivity log.
///
/// Missing or unparseable cells are `None`. A transaction without a
/// timestamp has no month or date and never matches a month/date filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub processor: String,
    pub process: String,
    pub processed_at: Option<NaiveDateTime>,
    pub actual: Option<Duration>,
    pub expected: Option<Duration>,
}

impl Transaction {
    pub fn new(processor: &str, process: &str) -> Self {
        Self {
            processor: processor.to_string(),
            process: process.to_string(),
            processed_at: None,
            actual: None,
            expected: None,
        }
    }

    pub fn at(mut self, processed_at: NaiveDateTime) -> Self {
        self.processed_at = Some(processed_at);
        self
    }

    pub fn on(self, date: NaiveDate) -> Self {
        self.at(date.and_time(NaiveTime::MIN))
    }

    pub fn actual(mut self, actual: Duration) -> Self {
        self.actual = Some(actual);
        self
    }

    pub fn expected(mut self, expected: Duration) -> Self {
        self.expected = Some(expected);
        self
    }

    /// Calendar date of the processing timestamp.
    pub fn date(&self) -> Option<NaiveDate> {
        self.processed_at.map(|ts| ts.date())
    }

    /// Month key (`YYYY-MM`) of the processing timestamp.
    pub fn month(&self) -> Option<String> {
        self.processed_at
            .map(|ts| ts.format(MONTH_FORMAT).to_string())
    }

    pub fn in_month(&self, month: &str) -> bool {
        self.month().as_deref() == Some(month)
    }
}

// --- Attendance log ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceRecord {
    pub processor: ProcessorId,
    pub month: Option<String>,
    pub working_days: Option<Decimal>,
    /// Columns the sheet carries besides Processor/Month/count, in source order.
    pub extra: Vec<(String, String)>,
}

// --- Dataset ---

/// Both sheets, loaded once and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub transactions: Vec<Transaction>,
    pub attendance: Vec<AttendanceRecord>,
    /// Passthrough column names of the attendance sheet, in source order.
    pub attendance_columns: Vec<String>,
}

impl Dataset {
    pub fn new(
        transactions: Vec<Transaction>,
        attendance: Vec<AttendanceRecord>,
        attendance_columns: Vec<String>,
    ) -> Self {
        Self {
            transactions,
            attendance,
            attendance_columns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processor_validation_rejects_spreadsheet_placeholders() {
        for raw in ["0", "0.0", "00", "", "   ", "nan", "NaN", "-0"] {
            assert!(ProcessorId::parse(raw).is_none(), "{:?} should be rejected", raw);
        }
    }

    #[test]
    fn processor_validation_accepts_names_and_numeric_ids() {
        assert_eq!(ProcessorId::parse("  Anita ").unwrap().as_str(), "Anita");
        assert_eq!(ProcessorId::parse("1042").unwrap().as_str(), "1042");
        assert_eq!(ProcessorId::parse("E-07").unwrap().as_str(), "E-07");
    }

    #[test]
    fn processor_validation_keeps_infinity_spellings() {
        for raw in ["inf", "Infinity", "-inf"] {
            assert!(ProcessorId::parse(raw).is_some(), "{:?} should be kept", raw);
        }
    }

    #[test]
    fn employee_selection_treats_all_and_blank_as_everyone() {
        assert_eq!(EmployeeSelection::parse("All"), EmployeeSelection::All);
        assert_eq!(EmployeeSelection::parse(""), EmployeeSelection::All);
        assert_eq!(
            EmployeeSelection::parse(" Ravi "),
            EmployeeSelection::One("Ravi".to_string())
        );
        assert!(EmployeeSelection::All.matches("anyone"));
        assert!(!EmployeeSelection::One("Ravi".into()).matches("Anita"));
    }

    #[test]
    fn month_and_date_derive_from_timestamp() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();
        let transaction = Transaction::new("A", "Confirmation").on(date);
        assert_eq!(transaction.date(), Some(date));
        assert_eq!(transaction.month().as_deref(), Some("2024-05"));
        assert!(transaction.in_month("2024-05"));
        assert!(!transaction.in_month("2024-06"));
    }

    #[test]
    fn undated_transaction_matches_no_month() {
        let transaction = Transaction::new("A", "Confirmation");
        assert_eq!(transaction.date(), None);
        assert!(!transaction.in_month("2024-05"));
    }
}
