use bulk_uploader::upload::{SessionState, SubmissionReceipt, UploadSession};
use bulk_uploader::SubmissionError;
use derivative::Derivative;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;

pub type SubmissionOutcome = Result<SubmissionReceipt, SubmissionError>;

#[derive(Derivative, Default)]
#[derivative(Debug)]
pub struct DeskState {
    pub selected_type: Option<String>,
    pub file_path: Option<PathBuf>,
    pub session: UploadSession,
    /// Problems outside the session, e.g. a template that would not open
    pub notice: Option<String>,
    #[derivative(Debug = "ignore")]
    pub outcome_receiver: Option<Receiver<SubmissionOutcome>>,
}

impl DeskState {
    pub fn clear(&mut self) {
        let selected_type = self.selected_type.take();
        *self = DeskState {
            selected_type,
            ..DeskState::default()
        };
    }

    pub fn file_name(&self) -> Option<String> {
        self.file_path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
    }

    pub fn get_status_text(&self) -> String {
        match self.session.state() {
            SessionState::Idle => String::new(),
            SessionState::Validating { file_name, .. } => format!("🔍 Checking {}", file_name),
            SessionState::Ready(batch) => format!(
                "✅ {} rows from {} ready to submit",
                batch.rows.len(),
                batch.file_name
            ),
            SessionState::Uploading(batch) => format!("📤 Submitting {} rows...", batch.rows.len()),
            SessionState::Success {
                submitted, receipt, ..
            } => format!(
                "✅ Submitted {} rows (HTTP {}). The batch is awaiting approval.",
                submitted, receipt.status
            ),
            SessionState::Error { message, .. } => format!("❌ {}", message),
        }
    }
}
