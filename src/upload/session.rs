use crate::error::{Result, SubmissionError, UploadError};
use crate::upload::decoder::SpreadsheetDecoder;
use crate::upload::gateway::SubmissionGateway;
use crate::upload::preview::{project_preview, Preview};
use crate::upload::registry::SchemaRegistry;
use crate::upload::types::{
    DecodedSheet, RawRow, SubmissionReceipt, UploadTypeDescriptor, ValidatedBatch,
    ValidationOutcome,
};
use crate::upload::validator::validate;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    Validating {
        upload_type: String,
        file_name: String,
    },
    Ready(ValidatedBatch),
    Uploading(ValidatedBatch),
    Success {
        upload_type: String,
        submitted: usize,
        receipt: SubmissionReceipt,
    },
    /// `retained` holds the batch when a submission failed, so it can be sent
    /// again without reloading the file.
    Error {
        message: String,
        retained: Option<ValidatedBatch>,
    },
}

impl Default for SessionState {
    fn default() -> Self {
        Self::Idle
    }
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Validating { .. } => "validating",
            SessionState::Ready(_) => "ready",
            SessionState::Uploading(_) => "uploading",
            SessionState::Success { .. } => "finished",
            SessionState::Error { .. } => "failed",
        }
    }
}

/// One upload form's lifecycle, from file selection to the server's answer.
#[derive(Debug, Default)]
pub struct UploadSession {
    state: SessionState,
}

impl UploadSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn batch(&self) -> Option<&ValidatedBatch> {
        match &self.state {
            SessionState::Ready(batch) | SessionState::Uploading(batch) => Some(batch),
            SessionState::Error { retained, .. } => retained.as_ref(),
            _ => None,
        }
    }

    pub fn preview(&self, limit: usize) -> Option<Preview<'_>> {
        match &self.state {
            SessionState::Ready(batch) | SessionState::Uploading(batch) => {
                Some(project_preview(&batch.rows, limit))
            }
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            SessionState::Error { message, .. } => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn can_submit(&self) -> bool {
        matches!(self.state, SessionState::Ready(_))
    }

    pub fn can_retry(&self) -> bool {
        matches!(self.state, SessionState::Error { retained: Some(_), .. })
    }

    pub fn is_uploading(&self) -> bool {
        matches!(self.state, SessionState::Uploading(_))
    }

    /// Back to `Idle`. Refused while a submission is in flight.
    pub fn reset(&mut self) -> Result<()> {
        if self.is_uploading() {
            return Err(UploadError::SessionBusy);
        }
        if !matches!(self.state, SessionState::Idle) {
            debug!("Resetting upload session from {}", self.state.name());
        }
        self.state = SessionState::Idle;
        Ok(())
    }

    /// A new file was picked. Any earlier outcome is discarded first.
    pub fn begin_validation(&mut self, upload_type: &str, file_name: &str) -> Result<()> {
        self.reset()?;
        info!("Validating '{}' as {}", file_name, upload_type);
        self.state = SessionState::Validating {
            upload_type: upload_type.to_string(),
            file_name: file_name.to_string(),
        };
        Ok(())
    }

    /// Settle a file picked with `begin_validation`. The decoded sheet is
    /// checked against `descriptor` here, so `Ready` always holds a non-empty
    /// batch whose first row carries every required label.
    pub fn finish_validation(
        &mut self,
        decoded: Result<DecodedSheet>,
        descriptor: &UploadTypeDescriptor,
    ) -> Result<()> {
        let checked = decoded.and_then(|sheet| check_sheet(sheet, descriptor));
        self.settle_validation(checked)
    }

    fn settle_validation(&mut self, checked: Result<CheckedSheet>) -> Result<()> {
        let (upload_type, file_name) = match &self.state {
            SessionState::Validating {
                upload_type,
                file_name,
            } => (upload_type.clone(), file_name.clone()),
            other => {
                return Err(UploadError::InvalidTransition {
                    from: other.name(),
                    action: "finish validation",
                })
            }
        };

        self.state = match checked {
            Ok(CheckedSheet {
                rows,
                extra_columns,
            }) => {
                info!("'{}' is valid: {} rows ready", file_name, rows.len());
                SessionState::Ready(ValidatedBatch {
                    upload_type,
                    file_name,
                    rows,
                    extra_columns,
                })
            }
            Err(e) => {
                warn!("'{}' rejected: {}", file_name, e);
                SessionState::Error {
                    message: e.to_string(),
                    retained: None,
                }
            }
        };
        Ok(())
    }

    /// Decode and validate a picked file in one step. Problems with the file
    /// end up in the `Error` state; only a busy session returns `Err`.
    pub fn load_file(
        &mut self,
        registry: &SchemaRegistry,
        decoder: &SpreadsheetDecoder,
        upload_type: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<&SessionState> {
        self.begin_validation(upload_type, file_name)?;

        let checked = registry
            .descriptor_for(upload_type)
            .and_then(|descriptor| {
                let sheet = decoder.decode(file_name, bytes)?;
                check_sheet(sheet, descriptor)
            });

        self.settle_validation(checked)?;
        Ok(&self.state)
    }

    /// Like `load_file`, reading the file from disk. An unreadable file still
    /// replaces whatever the session held before.
    pub fn load_path(
        &mut self,
        registry: &SchemaRegistry,
        decoder: &SpreadsheetDecoder,
        upload_type: &str,
        path: &Path,
    ) -> Result<&SessionState> {
        let file_name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        match std::fs::read(path) {
            Ok(bytes) => self.load_file(registry, decoder, upload_type, &file_name, bytes),
            Err(e) => {
                self.begin_validation(upload_type, &file_name)?;
                self.settle_validation(Err(UploadError::Io(e)))?;
                Ok(&self.state)
            }
        }
    }

    /// User confirmed. Returns the batch to send.
    pub fn begin_upload(&mut self) -> Result<ValidatedBatch> {
        let batch = match &self.state {
            SessionState::Ready(batch) => batch.clone(),
            SessionState::Uploading(_) => return Err(UploadError::SessionBusy),
            other => {
                return Err(UploadError::InvalidTransition {
                    from: other.name(),
                    action: "submit",
                })
            }
        };

        info!(
            "Uploading {} rows from '{}'",
            batch.rows.len(),
            batch.file_name
        );
        self.state = SessionState::Uploading(batch.clone());
        Ok(batch)
    }

    pub fn finish_upload(
        &mut self,
        outcome: std::result::Result<SubmissionReceipt, SubmissionError>,
    ) -> Result<()> {
        let batch = match std::mem::take(&mut self.state) {
            SessionState::Uploading(batch) => batch,
            other => {
                let from = other.name();
                self.state = other;
                return Err(UploadError::InvalidTransition {
                    from,
                    action: "finish upload",
                });
            }
        };

        self.state = match outcome {
            Ok(receipt) => {
                info!(
                    "Batch '{}' accepted ({} rows)",
                    batch.upload_type,
                    batch.rows.len()
                );
                SessionState::Success {
                    upload_type: batch.upload_type,
                    submitted: batch.rows.len(),
                    receipt,
                }
            }
            Err(e) => {
                let error = UploadError::from(e);
                warn!("Batch '{}' not accepted: {}", batch.upload_type, error);
                SessionState::Error {
                    message: error.to_string(),
                    retained: Some(batch),
                }
            }
        };
        Ok(())
    }

    /// Make a batch whose submission failed ready to send again.
    pub fn retry(&mut self) -> Result<()> {
        match std::mem::take(&mut self.state) {
            SessionState::Error {
                retained: Some(batch),
                ..
            } => {
                debug!("Batch from '{}' ready for resubmission", batch.file_name);
                self.state = SessionState::Ready(batch);
                Ok(())
            }
            other => {
                let from = other.name();
                self.state = other;
                Err(UploadError::InvalidTransition {
                    from,
                    action: "retry",
                })
            }
        }
    }

    /// Confirm and wait for the server in one step.
    pub async fn submit(&mut self, gateway: &SubmissionGateway) -> Result<&SessionState> {
        let batch = self.begin_upload()?;
        let outcome = gateway.submit(&batch.upload_type, &batch.rows).await;
        self.finish_upload(outcome)?;
        Ok(&self.state)
    }
}

struct CheckedSheet {
    rows: Vec<RawRow>,
    extra_columns: Vec<String>,
}

fn check_sheet(sheet: DecodedSheet, descriptor: &UploadTypeDescriptor) -> Result<CheckedSheet> {
    if sheet.rows.is_empty() {
        return Err(UploadError::EmptyFile);
    }

    let extra_columns = sheet
        .headers
        .into_iter()
        .filter(|h| !descriptor.required_labels().any(|l| l == h.as_str()))
        .collect();

    match validate(sheet.rows, descriptor) {
        ValidationOutcome::Valid(rows) => Ok(CheckedSheet {
            rows,
            extra_columns,
        }),
        ValidationOutcome::Invalid(missing) => Err(UploadError::SchemaValidation { missing }),
    }
}
