//! Bulk provisioning desk for the back-office portal: pick an upload type,
//! load a spreadsheet, check its header against the type's schema, preview it
//! and submit the batch to the back-office API.

pub mod config;
pub mod error;
pub mod upload;
pub mod utils;

pub use config::AppConfig;
pub use error::{DecodeError, Result, SubmissionError, UploadError};
