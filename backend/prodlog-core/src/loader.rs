// src/loader.rs
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use std::{fs::File, io::Read, path::Path};
use tracing::{debug, info, warn};

use crate::duration_format::parse_duration;
use crate::error::ReportError;
use crate::expected_table::ExpectedDurationTable;
use crate::model::{AttendanceRecord, Dataset, ProcessorId, Transaction};

// --- Column names (as exported from the workbook) ---

const COL_PROCESSOR: &str = "Processor";
const COL_PROCESS: &str = "Process";
const COL_PROCESS_DATE: &str = "Process Date";
const COL_UPT: &str = "UPT";
const COL_EXPECTED_TIME: &str = "Expected Time";
const COL_MONTH: &str = "Month";
const COL_COUNT: &str = "count";
const COL_EXPECTED_PROCESS: &str = "process";
const COL_EXPECTED_DURATION: &str = "expected";

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parses a Process Date cell. Unrecognized text yields `None`.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

// --- Dataset ---

/// Loads both sheets, reading the transaction log against `table`.
pub fn load_dataset(
    transactions_path: &Path,
    attendance_path: &Path,
    table: &ExpectedDurationTable,
) -> Result<Dataset, ReportError> {
    let transactions = load_transactions(transactions_path, table)?;
    let (attendance, attendance_columns) = load_attendance(attendance_path)?;
    Ok(Dataset::new(transactions, attendance, attendance_columns))
}

fn open(path: &Path) -> Result<File, ReportError> {
    File::open(path).map_err(|e| ReportError::io(e, format!("opening {}", path.display())))
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader)
}

fn column_index(headers: &StringRecord, column: &str, source: &str) -> Result<usize, ReportError> {
    find_column(headers, column).ok_or_else(|| ReportError::MissingColumn {
        file: source.to_string(),
        column: column.to_string(),
    })
}

fn find_column(headers: &StringRecord, column: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case(column))
}

fn cell<'r>(record: &'r StringRecord, index: usize) -> &'r str {
    record.get(index).unwrap_or("").trim()
}

// --- Transaction log ---

pub fn load_transactions(
    path: &Path,
    table: &ExpectedDurationTable,
) -> Result<Vec<Transaction>, ReportError> {
    info!("Loading transaction log from {}", path.display());
    let source = path.display().to_string();
    transactions_from_reader(open(path)?, table, &source)
}

/// Reads the transaction sheet. Bad dates/durations become `None` and are
/// tallied in a single warning; a missing expected duration falls back to
/// the table's standard for that process.
pub fn transactions_from_reader<R: Read>(
    reader: R,
    table: &ExpectedDurationTable,
    source: &str,
) -> Result<Vec<Transaction>, ReportError> {
    let mut reader = csv_reader(reader);
    let headers = reader.headers()?.clone();
    let processor_idx = column_index(&headers, COL_PROCESSOR, source)?;
    let process_idx = column_index(&headers, COL_PROCESS, source)?;
    let date_idx = column_index(&headers, COL_PROCESS_DATE, source)?;
    let upt_idx = column_index(&headers, COL_UPT, source)?;
    let expected_idx = column_index(&headers, COL_EXPECTED_TIME, source)?;

    let mut transactions = Vec::new();
    let mut bad_dates = 0usize;
    let mut bad_durations = 0usize;
    let mut filled_expected = 0usize;

    for result in reader.records() {
        let record = result?;
        let process = cell(&record, process_idx).to_string();

        let processed_at = parse_timestamp(cell(&record, date_idx));
        if processed_at.is_none() {
            bad_dates += 1;
        }

        let actual = parse_duration(cell(&record, upt_idx));
        if actual.is_none() {
            bad_durations += 1;
        }

        let expected = match parse_duration(cell(&record, expected_idx)) {
            Some(expected) => Some(expected),
            None => {
                let standard = table.get(&process);
                if standard.is_some() {
                    filled_expected += 1;
                }
                standard
            }
        };

        transactions.push(Transaction {
            processor: cell(&record, processor_idx).to_string(),
            process,
            processed_at,
            actual,
            expected,
        });
    }

    if bad_dates > 0 || bad_durations > 0 {
        warn!(
            "{}: {} rows with unparseable Process Date, {} with unparseable UPT",
            source, bad_dates, bad_durations
        );
    }
    if filled_expected > 0 {
        debug!(
            "{}: filled {} missing Expected Time values from the standard table",
            source, filled_expected
        );
    }
    info!("Loaded {} transactions from {}", transactions.len(), source);
    Ok(transactions)
}

// --- Attendance log ---

/// Returns the valid attendance rows and the passthrough column names.
pub fn load_attendance(path: &Path) -> Result<(Vec<AttendanceRecord>, Vec<String>), ReportError> {
    info!("Loading attendance sheet from {}", path.display());
    let source = path.display().to_string();
    attendance_from_reader(open(path)?, &source)
}

pub fn attendance_from_reader<R: Read>(
    reader: R,
    source: &str,
) -> Result<(Vec<AttendanceRecord>, Vec<String>), ReportError> {
    let mut reader = csv_reader(reader);
    let headers = reader.headers()?.clone();
    let processor_idx = column_index(&headers, COL_PROCESSOR, source)?;
    let month_idx = column_index(&headers, COL_MONTH, source)?;
    let count_idx = find_column(&headers, COL_COUNT);

    let passthrough: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(index, _)| {
            *index != processor_idx && *index != month_idx && Some(*index) != count_idx
        })
        .map(|(index, name)| (index, name.trim().to_string()))
        .collect();

    let mut records = Vec::new();
    let mut rejected = 0usize;

    for result in reader.records() {
        let record = result?;
        let Some(processor) = ProcessorId::parse(cell(&record, processor_idx)) else {
            rejected += 1;
            continue;
        };

        let month = Some(cell(&record, month_idx))
            .filter(|m| !m.is_empty())
            .map(str::to_string);
        let working_days =
            count_idx.and_then(|index| cell(&record, index).parse::<Decimal>().ok());
        let extra = passthrough
            .iter()
            .map(|(index, name)| (name.clone(), cell(&record, *index).to_string()))
            .collect();

        records.push(AttendanceRecord {
            processor,
            month,
            working_days,
            extra,
        });
    }

    if rejected > 0 {
        debug!("{}: dropped {} rows without a valid processor", source, rejected);
    }
    if count_idx.is_some() {
        info!(
            "Total working days from attendance count: {}",
            crate::aggregator::total_working_days(&records)
        );
    }
    info!("Loaded {} attendance rows from {}", records.len(), source);

    let columns = passthrough.into_iter().map(|(_, name)| name).collect();
    Ok((records, columns))
}

// --- Expected-duration table ---

pub fn load_expected_table(path: &Path) -> Result<ExpectedDurationTable, ReportError> {
    info!("Loading expected UPT table from {}", path.display());
    let source = path.display().to_string();
    expected_table_from_reader(open(path)?, &source)
}

/// Reads a `process,expected` table. Unlike the log sheets, a bad duration
/// here is an error: a silently missing standard would skew production.
pub fn expected_table_from_reader<R: Read>(
    reader: R,
    source: &str,
) -> Result<ExpectedDurationTable, ReportError> {
    let mut reader = csv_reader(reader);
    let headers = reader.headers()?.clone();
    let process_idx = column_index(&headers, COL_EXPECTED_PROCESS, source)?;
    let duration_idx = column_index(&headers, COL_EXPECTED_DURATION, source)?;

    let mut entries = Vec::new();
    for result in reader.records() {
        let record = result?;
        let process = cell(&record, process_idx);
        if process.is_empty() {
            continue;
        }
        let value = cell(&record, duration_idx);
        let duration =
            parse_duration(value).ok_or_else(|| ReportError::InvalidExpectedDuration {
                process: process.to_string(),
                value: value.to_string(),
            })?;
        entries.push((process.to_string(), duration));
    }

    let table = ExpectedDurationTable::from_entries(entries);
    info!("Loaded {} expected UPT entries from {}", table.len(), source);
    Ok(table)
}
