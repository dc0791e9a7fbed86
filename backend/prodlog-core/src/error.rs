// src/error.rs
use thiserror::Error;

// --- Error Handling ---

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("File I/O error ({context}): {source}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },
    #[error("CSV parsing failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("Column '{column}' is missing from {file}")]
    MissingColumn { file: String, column: String },
    #[error("Expected duration '{value}' for process '{process}' is not a valid H:MM:SS span")]
    InvalidExpectedDuration { process: String, value: String },
    #[error("Configuration error: {0}")]
    Config(#[from] envy::Error),
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),
}

impl ReportError {
    pub fn io(source: std::io::Error, context: impl Into<String>) -> Self {
        ReportError::Io {
            source,
            context: context.into(),
        }
    }
}
