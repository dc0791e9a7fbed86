// src/main.rs
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use prodlog_core::display::render_table;
use prodlog_core::loader::{load_dataset, load_expected_table};
use prodlog_core::{AppConfig, Dashboard, EmployeeSelection, ExpectedDurationTable, ReportError};

// --- CLI ---

#[derive(Parser, Debug)]
#[command(
    name = "prodlog",
    version,
    about = "UPT productivity and attendance reports from exported worksheets"
)]
struct Cli {
    /// Transaction sheet CSV (overrides PRODLOG_TRANSACTIONS_PATH)
    #[arg(long, global = true)]
    transactions: Option<PathBuf>,

    /// Attendance sheet CSV (overrides PRODLOG_ATTENDANCE_PATH)
    #[arg(long, global = true)]
    attendance: Option<PathBuf>,

    /// `process,expected` CSV replacing the standard expected UPT table
    #[arg(long, global = true)]
    expected_table: Option<PathBuf>,

    /// Print JSON instead of text tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Monthly summary card with the weekly breakdown
    Summary {
        /// Month as YYYY-MM (defaults to the first month in the log)
        #[arg(long)]
        month: Option<String>,
        /// Processor name or "All" (defaults to the first processor)
        #[arg(long)]
        employee: Option<EmployeeSelection>,
    },
    /// Process-wise totals for a month
    Processes {
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        employee: Option<EmployeeSelection>,
    },
    /// Process-wise totals and efficiency for one day
    Daily {
        /// Date as YYYY-MM-DD (defaults to the first date of --month)
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        employee: Option<EmployeeSelection>,
    },
    /// Attendance rows, optionally for one month and processor
    Attendance {
        #[arg(long)]
        month: Option<String>,
        #[arg(long, default_value = "All")]
        processor: EmployeeSelection,
    },
    /// Available months, employees and dates with their defaults
    Options,
}

// --- Main Application Logic ---

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::from_env().context("Failed to read PRODLOG_* configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Some(path) = cli.transactions.clone() {
        config.transactions_path = path;
    }
    if let Some(path) = cli.attendance.clone() {
        config.attendance_path = path;
    }
    if let Some(path) = cli.expected_table.clone() {
        config.expected_table_path = Some(path);
    }
    info!("Configuration loaded: {:?}", config);

    let table = match &config.expected_table_path {
        Some(path) => load_expected_table(path)
            .with_context(|| format!("Failed to load expected UPT table {}", path.display()))?,
        None => ExpectedDurationTable::standard(),
    };
    let dataset = load_dataset(&config.transactions_path, &config.attendance_path, &table)
        .context("Failed to load worksheets")?;
    let dashboard = Dashboard::new(dataset, table)
        .with_excluded_processes(config.excluded_processes.clone());

    run(&cli, &dashboard)
}

fn run(cli: &Cli, dashboard: &Dashboard) -> Result<()> {
    let options = dashboard.options();
    let default_employee = || {
        options
            .default_employee
            .as_deref()
            .map(EmployeeSelection::parse)
            .unwrap_or_default()
    };
    let pick_month = |month: &Option<String>| -> Result<String> {
        month
            .clone()
            .or_else(|| options.default_month.clone())
            .ok_or_else(|| {
                ReportError::InvalidSelection("the log has no dated transactions".into()).into()
            })
    };

    match &cli.command {
        Command::Summary { month, employee } => {
            let month = pick_month(month)?;
            let employee = employee.clone().unwrap_or_else(default_employee);
            let report = dashboard.monthly(&month, &employee);
            if cli.json {
                return print_json(&report);
            }
            println!("{}", report.card.title);
            print!("{}", render_table(std::slice::from_ref(&report.card.fields)));
            if report.card.has_data {
                println!("\nWeekly Productivity Details");
                print!("{}", render_table(&report.weekly));
            }
        }
        Command::Processes { month, employee } => {
            let month = pick_month(month)?;
            let employee = employee.clone().unwrap_or_else(default_employee);
            let rows = dashboard.monthly_processes(&month, &employee);
            if cli.json {
                return print_json(&rows);
            }
            println!("Monthly Process-wise Productivity Details ({} - {})", employee, month);
            print!("{}", render_table(&rows));
        }
        Command::Daily {
            date,
            month,
            employee,
        } => {
            let date = match date {
                Some(date) => *date,
                None => {
                    let month = pick_month(month)?;
                    dashboard
                        .dates_in_month(&month)
                        .into_iter()
                        .next()
                        .ok_or_else(|| {
                            let reason = format!("no dated transactions in {}", month);
                            ReportError::InvalidSelection(reason)
                        })?
                }
            };
            let employee = employee.clone().unwrap_or_else(default_employee);
            let report = dashboard.daily(date, &employee);
            if cli.json {
                return print_json(&report);
            }
            println!("Daily Process-wise Productivity Details ({} - {})", employee, date);
            print!("{}", render_table(&report.rows));
            println!("\n{}", report.summary_line);
        }
        Command::Attendance { month, processor } => {
            let rows = dashboard.attendance(month.as_deref(), processor);
            if rows.is_empty() {
                warn!("No attendance rows for {} / {:?}", processor, month);
            }
            if cli.json {
                return print_json(&rows);
            }
            println!("Attendance Tracker");
            print!("{}", render_table(&rows));
        }
        Command::Options => {
            if cli.json {
                return print_json(&options);
            }
            println!("Months:                {}", options.months.join(", "));
            println!("Employees:             {}", options.employees.join(", "));
            println!("Attendance months:     {}", options.attendance_months.join(", "));
            println!("Attendance processors: {}", options.attendance_processors.join(", "));
            if let Some(month) = &options.default_month {
                let dates: Vec<String> = dashboard
                    .dates_in_month(month)
                    .iter()
                    .map(|d| d.to_string())
                    .collect();
                println!("Dates in {}:      {}", month, dates.join(", "));
            }
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
    println!("{}", json);
    Ok(())
}
