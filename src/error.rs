//! Error types for the bulk upload pipeline

use thiserror::Error;

pub type Result<T> = std::result::Result<T, UploadError>;

/// Everything that can end an upload attempt or stop start-up.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Could not read spreadsheet: {0}")]
    Decode(#[from] DecodeError),

    /// Header row lacks required columns
    #[error("Missing required columns: {}", missing.join(", "))]
    SchemaValidation { missing: Vec<String> },

    #[error("Submission failed: {0}")]
    Submission(#[from] SubmissionError),

    #[error("Unknown upload type: {0}")]
    UnknownUploadType(String),

    #[error("The file has a header row but no data rows")]
    EmptyFile,

    #[error("Cannot {action} while {from}")]
    InvalidTransition { from: &'static str, action: &'static str },

    #[error("A submission is still in progress")]
    SessionBusy,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("{0}")]
    Workbook(#[from] calamine::Error),

    #[error("{0}")]
    Csv(#[from] csv::Error),

    #[error("workbook has no worksheets")]
    NoWorksheet,

    #[error("file is {size}, the limit is {limit}")]
    TooLarge { size: String, limit: String },
}

#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("failed to send request: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server answered {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("could not start async runtime: {0}")]
    Runtime(String),
}
