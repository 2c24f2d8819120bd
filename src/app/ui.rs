use super::BulkUploader;
use bulk_uploader::upload::SessionState;
use eframe::egui::{self, Align, Color32, RichText};
use rfd::FileDialog;

const ACCENT: Color32 = Color32::from_rgb(161, 89, 225);
const ERROR_RED: Color32 = Color32::from_rgb(220, 50, 50);
const SUCCESS_GREEN: Color32 = Color32::from_rgb(0, 180, 0);

impl BulkUploader {
    pub fn render(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let total_height = ui.available_height();
            let footer_height = 40.0;
            let footer_margin = 15.0;
            let content_height = total_height - footer_height - footer_margin;

            egui::ScrollArea::vertical()
                .max_height(content_height)
                .show(ui, |ui| {
                    ui.add_space(20.0);
                    ui.vertical_centered(|ui| {
                        ui.heading("Bulk Upload");
                        ui.add_space(5.0);
                        ui.label(
                            RichText::new("Load a filled-in template, check it, and submit it for approval")
                                .color(ui.visuals().text_color().gamma_multiply(0.7)),
                        );
                    });

                    ui.add_space(20.0);
                    self.render_type_picker(ui);

                    ui.add_space(10.0);
                    self.render_file_picker(ui);

                    ui.add_space(20.0);
                    self.render_actions(ui);

                    ui.add_space(20.0);
                    let status = self.state.get_status_text();
                    if !status.is_empty() {
                        ui.group(|ui| {
                            let color = match self.state.session.state() {
                                SessionState::Error { .. } => ERROR_RED,
                                SessionState::Success { .. } => SUCCESS_GREEN,
                                _ => ui.visuals().text_color(),
                            };
                            ui.colored_label(color, status);
                            if self.state.session.is_uploading() {
                                ui.add(egui::Spinner::new().color(ACCENT));
                            }
                        });
                    }

                    if self.state.session.preview(self.config.preview_rows).is_some() {
                        ui.add_space(10.0);
                        self.render_preview(ui);
                    }

                    ui.add_space(20.0);
                });

            ui.with_layout(egui::Layout::bottom_up(Align::Center), |ui| {
                ui.add_space(footer_margin);
                self.render_footer(ui);
            });
        });
    }

    fn render_type_picker(&mut self, ui: &mut egui::Ui) {
        let mut choice = self.state.selected_type.clone();
        let selected_text = choice
            .as_deref()
            .and_then(|key| self.registry.descriptor_for(key).ok())
            .map(|d| d.label.clone())
            .unwrap_or_else(|| "Choose an upload type".to_string());
        let busy = self.state.session.is_uploading();

        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.label("Upload type");
                ui.add_enabled_ui(!busy, |ui| {
                    egui::ComboBox::from_id_source("upload_type")
                        .selected_text(selected_text)
                        .width(260.0)
                        .show_ui(ui, |ui| {
                            for descriptor in self.registry.descriptors() {
                                ui.selectable_value(
                                    &mut choice,
                                    Some(descriptor.key.clone()),
                                    descriptor.label.as_str(),
                                );
                            }
                        });
                });

                ui.add_enabled_ui(choice.is_some(), |ui| {
                    if ui.button("⬇ Template").clicked() {
                        self.open_template();
                    }
                });
            });

            if let Some(descriptor) = choice
                .as_deref()
                .and_then(|key| self.registry.descriptor_for(key).ok())
            {
                let labels: Vec<&str> = descriptor.required_labels().collect();
                ui.add_space(4.0);
                ui.label(
                    RichText::new(format!("Required columns: {}", labels.join(", ")))
                        .color(ui.visuals().text_color().gamma_multiply(0.7)),
                );
            }
        });

        if let Some(key) = choice {
            self.select_upload_type(key);
        }
    }

    fn render_file_picker(&mut self, ui: &mut egui::Ui) {
        let can_pick = self.state.selected_type.is_some() && !self.state.session.is_uploading();

        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.add_enabled_ui(can_pick, |ui| {
                    if ui.button("📁 Select Spreadsheet").clicked() {
                        if let Some(path) = FileDialog::new()
                            .add_filter("Spreadsheets", &["xlsx", "xlsm", "xlsb", "xls", "ods", "csv"])
                            .pick_file()
                        {
                            self.load_file(path);
                        }
                    }
                });
                if let Some(name) = self.state.file_name() {
                    ui.label(format!("Selected: {}", name));
                }
            });
        });
    }

    fn render_actions(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            if self.state.session.can_retry() {
                if ui.button("🔄 Submit Again").clicked() {
                    self.retry_upload();
                }
                ui.add_space(5.0);
            }

            ui.add_enabled_ui(self.state.session.can_submit(), |ui| {
                let button = egui::Button::new("📤 Submit for Approval")
                    .min_size(egui::vec2(200.0, 40.0));
                if ui.add(button).clicked() {
                    self.start_upload();
                }
            });

            ui.add_space(5.0);
            ui.add_enabled_ui(!self.state.session.is_uploading(), |ui| {
                if ui.button("🗑 Clear").clicked() {
                    self.reset_upload_state();
                }
            });
        });
    }

    fn render_preview(&self, ui: &mut egui::Ui) {
        let Some(preview) = self.state.session.preview(self.config.preview_rows) else {
            return;
        };
        let Some(batch) = self.state.session.batch() else {
            return;
        };
        let Ok(descriptor) = self.registry.descriptor_for(&batch.upload_type) else {
            return;
        };

        ui.label(format!(
            "Showing {} of {} rows",
            preview.rows.len(),
            preview.total_rows
        ));

        egui::ScrollArea::both()
            .id_source("preview")
            .max_height(260.0)
            .show(ui, |ui| {
                egui::Frame::none()
                    .fill(ui.style().visuals.extreme_bg_color)
                    .inner_margin(8.0)
                    .show(ui, |ui| {
                        egui::Grid::new("preview_grid")
                            .striped(true)
                            .spacing([16.0, 4.0])
                            .show(ui, |ui| {
                                ui.label(RichText::new("#").strong());
                                for label in descriptor.required_labels() {
                                    ui.label(RichText::new(label).strong());
                                }
                                ui.end_row();

                                for (i, cells) in preview.table(descriptor).into_iter().enumerate() {
                                    ui.label((i + 1).to_string());
                                    for cell in cells {
                                        ui.label(cell);
                                    }
                                    ui.end_row();
                                }
                            });
                    });
            });

        if !batch.extra_columns.is_empty() {
            ui.label(
                RichText::new(format!(
                    "Extra columns, submitted as-is: {}",
                    batch.extra_columns.join(", ")
                ))
                .color(ui.visuals().text_color().gamma_multiply(0.7)),
            );
        }

        if preview.truncated {
            ui.label(
                RichText::new(format!(
                    "{} more rows will be submitted but are not shown",
                    preview.hidden_rows()
                ))
                .italics(),
            );
        }
    }

    fn render_footer(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.label(
                RichText::new(format!("Submitting to {}", self.gateway.endpoint()))
                    .small()
                    .color(ui.visuals().text_color().gamma_multiply(0.6)),
            );
        });

        if let Some(notice) = &self.state.notice {
            ui.add_space(5.0);
            ui.vertical_centered(|ui| {
                ui.colored_label(ERROR_RED, notice);
            });
        }
    }
}
