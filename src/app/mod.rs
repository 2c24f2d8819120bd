mod state;
mod ui;

use bulk_uploader::upload::{SchemaRegistry, SpreadsheetDecoder, SubmissionGateway};
use bulk_uploader::{AppConfig, SubmissionError, UploadError};
use eframe::{egui, App};
use std::path::PathBuf;
use std::sync::mpsc as std_mpsc;
use tracing::{info, warn};

use state::DeskState;

pub struct BulkUploader {
    config: AppConfig,
    registry: SchemaRegistry,
    decoder: SpreadsheetDecoder,
    gateway: SubmissionGateway,
    state: DeskState,
}

impl BulkUploader {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig, registry: SchemaRegistry) -> Self {
        info!(
            "Initializing bulk upload desk with {} upload types, submitting to {}",
            registry.len(),
            config.base_url
        );
        Self {
            decoder: SpreadsheetDecoder::new(config.max_file_bytes),
            gateway: SubmissionGateway::new(&config.base_url),
            config,
            registry,
            state: DeskState::default(),
        }
    }

    pub fn reset_upload_state(&mut self) {
        if let Err(e) = self.state.session.reset() {
            self.state.notice = Some(e.to_string());
            return;
        }
        info!("Clearing the upload form");
        self.state.clear();
    }

    pub fn select_upload_type(&mut self, key: String) {
        if self.state.selected_type.as_deref() == Some(key.as_str()) {
            return;
        }
        if let Err(e) = self.state.session.reset() {
            self.state.notice = Some(e.to_string());
            return;
        }

        info!("Upload type changed to {}", key);
        self.state.selected_type = Some(key);
        self.state.file_path = None;
        self.state.notice = None;
    }

    pub fn open_template(&mut self) {
        let Some(key) = self.state.selected_type.as_deref() else {
            return;
        };

        let path = match self.registry.descriptor_for(key) {
            Ok(descriptor) => self.config.template_path(descriptor),
            Err(e) => {
                self.state.notice = Some(e.to_string());
                return;
            }
        };

        info!("Opening template {}", path.display());
        if let Err(e) = open::that(&path) {
            warn!("Could not open template {}: {}", path.display(), e);
            self.state.notice = Some(format!(
                "Could not open template {}: {}",
                path.display(),
                e
            ));
        }
    }

    pub fn load_file(&mut self, path: PathBuf) {
        let Some(upload_type) = self.state.selected_type.clone() else {
            self.state.notice = Some("Select an upload type first".to_string());
            return;
        };
        if self.state.session.is_uploading() {
            self.state.notice = Some(UploadError::SessionBusy.to_string());
            return;
        }

        self.state.notice = None;
        if let Err(e) =
            self.state
                .session
                .load_path(&self.registry, &self.decoder, &upload_type, &path)
        {
            self.state.notice = Some(e.to_string());
            return;
        }
        self.state.file_path = Some(path);
    }

    pub fn start_upload(&mut self) {
        let batch = match self.state.session.begin_upload() {
            Ok(batch) => batch,
            Err(e) => {
                self.state.notice = Some(e.to_string());
                return;
            }
        };

        let (sender, receiver) = std_mpsc::channel();
        self.state.outcome_receiver = Some(receiver);
        let gateway = self.gateway.clone();

        std::thread::spawn(move || {
            let outcome = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt.block_on(gateway.submit(&batch.upload_type, &batch.rows)),
                Err(e) => Err(SubmissionError::Runtime(e.to_string())),
            };
            let _ = sender.send(outcome);
        });
    }

    pub fn retry_upload(&mut self) {
        if let Err(e) = self.state.session.retry() {
            self.state.notice = Some(e.to_string());
        }
    }

    pub fn update_state(&mut self, ctx: &egui::Context) {
        let Some(receiver) = &self.state.outcome_receiver else {
            return;
        };

        let outcome = match receiver.try_recv() {
            Ok(outcome) => outcome,
            Err(std_mpsc::TryRecvError::Empty) => {
                ctx.request_repaint();
                return;
            }
            Err(std_mpsc::TryRecvError::Disconnected) => Err(SubmissionError::Runtime(
                "submission worker stopped without an answer".to_string(),
            )),
        };

        self.state.outcome_receiver = None;
        if let Err(e) = self.state.session.finish_upload(outcome) {
            self.state.notice = Some(e.to_string());
        }
        ctx.request_repaint();
    }
}

impl App for BulkUploader {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_state(ctx);
        self.render(ctx);
    }
}
