// src/aggregator.rs
use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::expected_table::ExpectedDurationTable;
use crate::model::{
    AttendanceRecord, EmployeeSelection, Transaction, ALL_EMPLOYEES, BREAK_PROCESS,
};

// --- Summary Structures ---

/// Totals over a set of transactions (a month, or one week of it).
#[derive(Debug, Clone, PartialEq)]
pub struct Totals {
    pub actual: Duration,
    pub expected: Duration,
    /// `actual - expected`; negative when the work went faster than standard.
    pub difference: Duration,
    /// Distinct calendar dates with at least one transaction.
    pub working_days: usize,
    pub item_count: usize,
    /// `expected / actual * 100`, or zero when no actual time was logged.
    pub efficiency: Decimal,
}

impl Totals {
    pub fn is_empty(&self) -> bool {
        self.item_count == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklySummary {
    /// Monday of the week.
    pub week_start: NaiveDate,
    pub totals: Totals,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessSummary {
    pub process: String,
    pub total_actual: Duration,
    pub item_count: usize,
    pub average: Duration,
    /// `None` when the process has no entry in the expected-duration table.
    pub expected_per_unit: Option<Duration>,
    /// `expected_per_unit * item_count`, or `total_actual` for unknown processes.
    pub production: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DaySummary {
    pub total_actual: Duration,
    pub total_production: Duration,
    pub efficiency: Decimal,
}

// --- Filtering ---

/// Month / employee / excluded-process selection over the transaction log.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionFilter {
    pub month: String,
    pub employee: EmployeeSelection,
    pub exclude: Vec<String>,
}

impl TransactionFilter {
    /// Filter for one month; breaks are excluded by default.
    pub fn new(month: &str, employee: EmployeeSelection) -> Self {
        Self {
            month: month.to_string(),
            employee,
            exclude: vec![BREAK_PROCESS.to_string()],
        }
    }

    pub fn excluding(mut self, processes: &[String]) -> Self {
        self.exclude = processes.to_vec();
        self
    }

    pub fn keep_breaks(mut self) -> Self {
        self.exclude.clear();
        self
    }

    pub fn matches(&self, transaction: &Transaction) -> bool {
        transaction.in_month(&self.month)
            && self.employee.matches(&transaction.processor)
            && !self.exclude.iter().any(|p| *p == transaction.process)
    }

    pub fn apply<'a>(&self, transactions: &'a [Transaction]) -> Vec<&'a Transaction> {
        transactions.iter().filter(|t| self.matches(t)).collect()
    }
}

// --- Aggregations ---

/// Sums durations, counts working days and computes efficiency.
///
/// Missing durations contribute nothing to the sums but the record still
/// counts as an item. An empty input yields all-zero totals.
pub fn summarize_totals(transactions: &[&Transaction]) -> Totals {
    let actual = sum_durations(transactions.iter().filter_map(|t| t.actual));
    let expected = sum_durations(transactions.iter().filter_map(|t| t.expected));
    let working_days = transactions
        .iter()
        .filter_map(|t| t.date())
        .collect::<HashSet<_>>()
        .len();

    Totals {
        actual,
        expected,
        difference: actual - expected,
        working_days,
        item_count: transactions.len(),
        efficiency: efficiency_percent(expected, actual),
    }
}

/// Splits transactions into Monday-start weeks, ordered by week start.
pub fn group_by_week(transactions: &[&Transaction]) -> Vec<WeeklySummary> {
    let mut weeks: BTreeMap<NaiveDate, Vec<&Transaction>> = BTreeMap::new();
    for transaction in transactions {
        if let Some(date) = transaction.date() {
            weeks.entry(week_start(date)).or_default().push(*transaction);
        }
    }

    weeks
        .into_iter()
        .map(|(week_start, members)| WeeklySummary {
            week_start,
            totals: summarize_totals(&members),
        })
        .collect()
}

/// Per-process totals, ordered by process name. Rows with a blank process
/// name belong to no group.
pub fn group_by_process(
    transactions: &[&Transaction],
    table: &ExpectedDurationTable,
) -> Vec<ProcessSummary> {
    let mut groups: BTreeMap<&str, Vec<&Transaction>> = BTreeMap::new();
    for transaction in transactions {
        if transaction.process.trim().is_empty() {
            continue;
        }
        groups
            .entry(transaction.process.as_str())
            .or_default()
            .push(*transaction);
    }

    groups
        .into_iter()
        .map(|(process, members)| summarize_process(process, &members, table))
        .collect()
}

fn summarize_process(
    process: &str,
    members: &[&Transaction],
    table: &ExpectedDurationTable,
) -> ProcessSummary {
    let item_count = members.len();
    let total_actual = sum_durations(members.iter().filter_map(|t| t.actual));
    let average = match i32::try_from(item_count) {
        Ok(count) if count > 0 => total_actual / count,
        _ => Duration::zero(),
    };
    let expected_per_unit = table.get(process);
    // Unknown processes have no standard, so production degrades to raw time logged
    let production = expected_per_unit
        .and_then(|per_unit| scale_duration(per_unit, item_count))
        .unwrap_or(total_actual);

    ProcessSummary {
        process: process.to_string(),
        total_actual,
        item_count,
        average,
        expected_per_unit,
        production,
    }
}

/// Per-process breakdown of a single calendar date plus the day's overall efficiency.
pub fn group_by_date(
    transactions: &[Transaction],
    date: NaiveDate,
    employee: &EmployeeSelection,
    table: &ExpectedDurationTable,
) -> (Vec<ProcessSummary>, DaySummary) {
    let on_date: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| t.date() == Some(date) && employee.matches(&t.processor))
        .collect();

    let processes = group_by_process(&on_date, table);
    let total_actual = sum_durations(processes.iter().map(|p| p.total_actual));
    let total_production = sum_durations(processes.iter().map(|p| p.production));

    let day = DaySummary {
        total_actual,
        total_production,
        efficiency: efficiency_percent(total_production, total_actual),
    };
    (processes, day)
}

/// Attendance rows for a month (or all months) and a processor (or everyone).
pub fn filter_attendance<'a>(
    records: &'a [AttendanceRecord],
    month: Option<&str>,
    processor: &EmployeeSelection,
) -> Vec<&'a AttendanceRecord> {
    records
        .iter()
        .filter(|r| month.map_or(true, |m| r.month.as_deref() == Some(m)))
        .filter(|r| processor.matches(r.processor.as_str()))
        .collect()
}

/// Sum of the attendance `count` column; blank counts are skipped.
pub fn total_working_days(records: &[AttendanceRecord]) -> Decimal {
    records.iter().filter_map(|r| r.working_days).sum()
}

// --- Filter options ---

/// Months present in the log, ascending.
pub fn available_months(transactions: &[Transaction]) -> Vec<String> {
    transactions
        .iter()
        .filter_map(|t| t.month())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Processors present in the log, ascending, followed by `All`.
pub fn available_employees(transactions: &[Transaction]) -> Vec<String> {
    let mut employees: Vec<String> = transactions
        .iter()
        .map(|t| t.processor.trim())
        .filter(|p| !p.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();
    employees.push(ALL_EMPLOYEES.to_string());
    employees
}

/// Distinct dates within a month, ascending.
pub fn dates_in_month(transactions: &[Transaction], month: &str) -> Vec<NaiveDate> {
    transactions
        .iter()
        .filter(|t| t.in_month(month))
        .filter_map(|t| t.date())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn attendance_months(records: &[AttendanceRecord]) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| r.month.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// `All` followed by the attendance processors, ascending.
pub fn attendance_processors(records: &[AttendanceRecord]) -> Vec<String> {
    let processors = records
        .iter()
        .map(|r| r.processor.as_str())
        .collect::<BTreeSet<_>>();
    std::iter::once(ALL_EMPLOYEES)
        .chain(processors)
        .map(str::to_string)
        .collect()
}

// --- Helpers ---

/// `numerator / denominator * 100`; zero when the denominator isn't positive.
pub fn efficiency_percent(numerator: Duration, denominator: Duration) -> Decimal {
    if denominator <= Duration::zero() {
        return Decimal::ZERO;
    }
    seconds_decimal(numerator)
        .checked_div(seconds_decimal(denominator))
        .and_then(|ratio| ratio.checked_mul(dec!(100)))
        .unwrap_or(Decimal::ZERO)
}

fn seconds_decimal(duration: Duration) -> Decimal {
    match duration.num_nanoseconds() {
        Some(nanos) => Decimal::from_i128_with_scale(i128::from(nanos), 9),
        None => Decimal::from(duration.num_seconds()),
    }
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

// Saturates at the representable range instead of panicking on overflow.
fn sum_durations<I: Iterator<Item = Duration>>(durations: I) -> Duration {
    durations.fold(Duration::zero(), |total, d| {
        total.checked_add(&d).unwrap_or(if d < Duration::zero() {
            Duration::MIN
        } else {
            Duration::MAX
        })
    })
}

fn scale_duration(per_unit: Duration, count: usize) -> Option<Duration> {
    let count = i32::try_from(count).ok()?;
    per_unit.checked_mul(count)
}
