// src/config.rs
use serde::Deserialize;
use std::path::PathBuf;

use crate::error::ReportError;
use crate::model::BREAK_PROCESS;

pub const ENV_PREFIX: &str = "PRODLOG_";

// --- General App Configuration ---

/// Settings read from `PRODLOG_*` environment variables (and `.env`).
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// CSV export of the transaction sheet.
    #[serde(default = "default_transactions_path")]
    pub transactions_path: PathBuf,
    /// CSV export of the attendance sheet.
    #[serde(default = "default_attendance_path")]
    pub attendance_path: PathBuf,
    /// Optional `process,expected` CSV replacing the standard table.
    #[serde(default)]
    pub expected_table_path: Option<PathBuf>,
    /// Processes left out of the monthly summary and weekly breakdown (comma separated).
    #[serde(default = "default_excluded_processes")]
    pub excluded_processes: Vec<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_transactions_path() -> PathBuf {
    PathBuf::from("a_sheet1.csv")
}

fn default_attendance_path() -> PathBuf {
    PathBuf::from("a_sheet2.csv")
}

fn default_excluded_processes() -> Vec<String> {
    vec![BREAK_PROCESS.to_string()]
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            transactions_path: default_transactions_path(),
            attendance_path: default_attendance_path(),
            expected_table_path: None,
            excluded_processes: default_excluded_processes(),
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ReportError> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        Ok(envy::prefixed(ENV_PREFIX).from_env::<AppConfig>()?)
    }

    /// Same as `from_env`, but over an explicit set of variables.
    pub fn from_vars<I>(vars: I) -> Result<Self, ReportError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::prefixed(ENV_PREFIX).from_iter::<_, AppConfig>(vars)?)
    }
}
