// src/display.rs
use chrono::Duration;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::aggregator::{DaySummary, ProcessSummary, Totals, WeeklySummary};
use crate::duration_format::format_duration;
use crate::model::AttendanceRecord;

/// Shown wherever a value does not exist (unknown standard time, empty selection).
pub const MISSING_VALUE: &str = "—";

// --- Field descriptors ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// `HH:MM:SS`, sign-prefixed when negative.
    Duration,
    /// Like `Duration`, but `—` when absent.
    OptionalDuration,
    /// Whole percent, rounded half to even, e.g. `92%`.
    Percentage,
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn field(name: &'static str, kind: FieldKind) -> FieldDescriptor {
    FieldDescriptor { name, kind }
}

pub const WEEKLY_COLUMNS: [FieldDescriptor; 6] = [
    field("Week", FieldKind::Text),
    field("Actual Time", FieldKind::Duration),
    field("Expected Time", FieldKind::Duration),
    field("Difference", FieldKind::Duration),
    field("Working Days", FieldKind::Count),
    field("Efficiency", FieldKind::Percentage),
];

pub const PROCESS_COLUMNS: [FieldDescriptor; 6] = [
    field("Process", FieldKind::Text),
    field("Total Time", FieldKind::Duration),
    field("Total Items", FieldKind::Count),
    field("Avg Time", FieldKind::Duration),
    field("Expected UPT", FieldKind::OptionalDuration),
    field("Total Production", FieldKind::Duration),
];

pub const SUMMARY_FIELDS: [FieldDescriptor; 5] = [
    field("Actual UPT Time", FieldKind::Duration),
    field("Expected UPT Time", FieldKind::Duration),
    field("Difference", FieldKind::Duration),
    field("Working Days", FieldKind::Count),
    field("Work % Efficiency", FieldKind::Percentage),
];

pub const DAY_SUMMARY_FIELDS: [FieldDescriptor; 3] = [
    field("Total Time", FieldKind::Duration),
    field("Total Production", FieldKind::Duration),
    field("Efficiency", FieldKind::Percentage),
];

/// Fixed leading columns of the attendance table; passthrough columns follow.
pub const ATTENDANCE_COLUMNS: [FieldDescriptor; 3] = [
    field("Processor", FieldKind::Text),
    field("Month", FieldKind::Text),
    field("count", FieldKind::Count),
];

/// A typed value waiting to be rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Duration(Duration),
    OptionalDuration(Option<Duration>),
    Percentage(Decimal),
    Count(Decimal),
}

impl Cell {
    pub fn kind(&self) -> FieldKind {
        match self {
            Cell::Text(_) => FieldKind::Text,
            Cell::Duration(_) => FieldKind::Duration,
            Cell::OptionalDuration(_) => FieldKind::OptionalDuration,
            Cell::Percentage(_) => FieldKind::Percentage,
            Cell::Count(_) => FieldKind::Count,
        }
    }

    pub fn render(&self) -> String {
        match self {
            Cell::Text(text) => text.clone(),
            Cell::Duration(duration) => format_duration(*duration),
            Cell::OptionalDuration(Some(duration)) => format_duration(*duration),
            Cell::OptionalDuration(None) => MISSING_VALUE.to_string(),
            Cell::Percentage(value) => format_percent(*value),
            Cell::Count(value) => value.normalize().to_string(),
        }
    }
}

fn count(value: usize) -> Cell {
    Cell::Count(Decimal::from(value))
}

/// Rounds to a whole percent (half to even) and appends `%`.
pub fn format_percent(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
    format!("{}%", rounded.normalize())
}

// --- Display records ---

/// One table row: field name to display string, in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayRecord {
    fields: Vec<(String, String)>,
}

impl DisplayRecord {
    fn from_cells(columns: &[FieldDescriptor], cells: Vec<Cell>) -> Self {
        debug_assert_eq!(columns.len(), cells.len());
        let fields = columns
            .iter()
            .zip(cells)
            .map(|(column, cell)| {
                debug_assert_eq!(column.kind, cell.kind(), "column {}", column.name);
                (column.name.to_string(), cell.render())
            })
            .collect();
        Self { fields }
    }

    pub fn push(&mut self, name: &str, value: String) {
        self.fields.push((name.to_string(), value));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }
}

impl Serialize for DisplayRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

// --- Table builders ---

pub fn weekly_records(weeks: &[WeeklySummary]) -> Vec<DisplayRecord> {
    weeks
        .iter()
        .map(|week| {
            let totals = &week.totals;
            DisplayRecord::from_cells(
                &WEEKLY_COLUMNS,
                vec![
                    Cell::Text(week.week_start.format("%Y-%m-%d").to_string()),
                    Cell::Duration(totals.actual),
                    Cell::Duration(totals.expected),
                    Cell::Duration(totals.difference),
                    count(totals.working_days),
                    Cell::Percentage(totals.efficiency),
                ],
            )
        })
        .collect()
}

pub fn process_records(processes: &[ProcessSummary]) -> Vec<DisplayRecord> {
    processes
        .iter()
        .map(|process| {
            DisplayRecord::from_cells(
                &PROCESS_COLUMNS,
                vec![
                    Cell::Text(process.process.clone()),
                    Cell::Duration(process.total_actual),
                    count(process.item_count),
                    Cell::Duration(process.average),
                    Cell::OptionalDuration(process.expected_per_unit),
                    Cell::Duration(process.production),
                ],
            )
        })
        .collect()
}

pub fn day_summary_record(day: &DaySummary) -> DisplayRecord {
    DisplayRecord::from_cells(
        &DAY_SUMMARY_FIELDS,
        vec![
            Cell::Duration(day.total_actual),
            Cell::Duration(day.total_production),
            Cell::Percentage(day.efficiency),
        ],
    )
}

/// `Total Time: 07:31:02 | Total Production: 06:58:40 | Efficiency: 93%`
pub fn day_summary_line(day: &DaySummary) -> String {
    day_summary_record(day)
        .fields()
        .iter()
        .map(|(name, value)| format!("{}: {}", name, value))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Attendance rows; passthrough values are placed under `extra_columns`.
pub fn attendance_records(
    records: &[&AttendanceRecord],
    extra_columns: &[String],
) -> Vec<DisplayRecord> {
    records
        .iter()
        .map(|record| {
            let mut row = DisplayRecord::from_cells(
                &ATTENDANCE_COLUMNS[..2],
                vec![
                    Cell::Text(record.processor.to_string()),
                    Cell::Text(record.month.clone().unwrap_or_default()),
                ],
            );
            let working_days = record
                .working_days
                .map(|days| Cell::Count(days).render())
                .unwrap_or_default();
            row.push(ATTENDANCE_COLUMNS[2].name, working_days);
            for column in extra_columns {
                let value = record
                    .extra
                    .iter()
                    .find(|(name, _)| name == column)
                    .map(|(_, value)| value.clone())
                    .unwrap_or_default();
                row.push(column, value);
            }
            row
        })
        .collect()
}

// --- Summary card ---

/// Headline card of the monthly dashboard.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SummaryCard {
    pub title: String,
    pub has_data: bool,
    pub fields: DisplayRecord,
}

pub fn summary_card(month: &str, employee: &str, totals: &Totals) -> SummaryCard {
    if totals.is_empty() {
        let mut fields = DisplayRecord::default();
        for descriptor in SUMMARY_FIELDS {
            let value = match descriptor.kind {
                FieldKind::Count => "0",
                _ => MISSING_VALUE,
            };
            fields.push(descriptor.name, value.to_string());
        }
        return SummaryCard {
            title: format!("No data for {} in {}", employee, month),
            has_data: false,
            fields,
        };
    }

    SummaryCard {
        title: format!("Summary for {} - {}", employee, month),
        has_data: true,
        fields: DisplayRecord::from_cells(
            &SUMMARY_FIELDS,
            vec![
                Cell::Duration(totals.actual),
                Cell::Duration(totals.expected),
                Cell::Duration(totals.difference),
                count(totals.working_days),
                Cell::Percentage(totals.efficiency),
            ],
        ),
    }
}

// --- Text rendering ---

/// Renders rows as a left-aligned plain-text table with a header line.
pub fn render_table(rows: &[DisplayRecord]) -> String {
    let Some(first) = rows.first() else {
        return "(no rows)\n".to_string();
    };
    let headers: Vec<&str> = first.names().collect();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (index, (_, value)) in row.fields().iter().enumerate() {
            if let Some(width) = widths.get_mut(index) {
                *width = (*width).max(value.chars().count());
            }
        }
    }

    let mut out = String::new();
    push_line(&mut out, headers.iter().copied(), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, rule.iter().map(String::as_str), &widths);
    for row in rows {
        push_line(&mut out, row.fields().iter().map(|(_, v)| v.as_str()), &widths);
    }
    out
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line = cells
        .zip(widths)
        .map(|(cell, width)| {
            let padding = width.saturating_sub(cell.chars().count());
            format!("{}{}", cell, " ".repeat(padding))
        })
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}
