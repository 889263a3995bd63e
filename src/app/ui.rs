use super::NikoUploader;
use crate::upload::UploadStatus;
use crate::utils::file_size::FileSizeUtils;
use eframe::egui::{self, Color32, RichText, Sense, Stroke};

const ACCENT: Color32 = Color32::from_rgb(161, 89, 225);
const SUCCESS: Color32 = Color32::from_rgb(0, 180, 0);
const FAILURE: Color32 = Color32::from_rgb(220, 50, 50);

impl NikoUploader {
    pub fn render(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_space(20.0);
                ui.vertical_centered(|ui| {
                    ui.heading("PDF Compress Upload");
                    ui.add_space(5.0);
                    ui.label(
                        RichText::new(self.picker.config().describe())
                            .color(ui.visuals().text_color().gamma_multiply(0.7)),
                    );
                });

                ui.add_space(20.0);
                self.render_drop_zone(ui);

                if !self.state.files().is_empty() {
                    ui.add_space(20.0);
                    self.render_file_list(ui);
                    ui.add_space(10.0);
                    self.render_actions(ui);
                }

                ui.add_space(20.0);
                self.render_status(ui);
            });
        });
    }

    fn render_drop_zone(&mut self, ui: &mut egui::Ui) {
        let size = egui::vec2(ui.available_width(), 120.0);
        let (rect, response) = ui.allocate_exact_size(size, Sense::click());
        let drag_active = self.picker.is_drag_active();
        let locked = self.state.is_uploading();

        let visuals = if drag_active || response.hovered() {
            ui.visuals().widgets.hovered
        } else {
            ui.visuals().widgets.inactive
        };
        ui.painter().rect(rect, 6.0, visuals.bg_fill, visuals.bg_stroke);
        if drag_active {
            ui.painter().rect_stroke(rect, 6.0, Stroke::new(2.0, ACCENT));
        }

        let text = if drag_active {
            "Drop the files here ..."
        } else {
            "Drag & drop some files here, or click to select files"
        };
        ui.painter().text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            text,
            egui::FontId::proportional(15.0),
            ui.visuals().text_color(),
        );

        if response.clicked() && !locked {
            if let Some(files) = self.picker.open_dialog() {
                self.on_files_accepted(files);
            }
        }
    }

    fn render_file_list(&mut self, ui: &mut egui::Ui) {
        let locked = self.state.is_uploading();
        let mut remove = None;

        ui.group(|ui| {
            ui.label(RichText::new("Files to upload:").strong());
            ui.add_space(6.0);

            for (index, file) in self.state.files().iter().enumerate() {
                ui.horizontal(|ui| {
                    ui.label(file.name.as_str());
                    ui.label(
                        RichText::new(FileSizeUtils::format_size(file.size))
                            .color(ui.visuals().text_color().gamma_multiply(0.6)),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.add_enabled(!locked, egui::Button::new("Remove")).clicked() {
                            remove = Some(index);
                        }
                        if ui.button("Preview").clicked() {
                            file.open_preview();
                        }
                    });
                });

                // Bars only appear once the file has started sending
                if let Some(percent) = self.state.progress().get(&file.name).filter(|p| *p > 0) {
                    ui.add(
                        egui::ProgressBar::new(percent as f32 / 100.0)
                            .show_percentage()
                            .animate(false)
                            .fill(ACCENT),
                    );
                }
                ui.add_space(4.0);
            }
        });

        if let Some(index) = remove {
            self.remove_file(index);
        }
    }

    fn render_actions(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            let uploading = self.state.is_uploading();
            let label = if uploading {
                "⏳ Uploading..."
            } else {
                "📤 Upload Files"
            };
            let button = egui::Button::new(label).min_size(egui::vec2(200.0, 40.0));
            if ui.add_enabled(!uploading, button).clicked() {
                self.upload_selected_files();
            }

            if uploading {
                ui.add_space(6.0);
                let overall = self.state.get_progress_percentage();
                ui.add(egui::ProgressBar::new(overall).animate(true).fill(ACCENT));
                if ui.button("Cancel").clicked() {
                    self.cancel_in_flight();
                }
            }
        });
    }

    fn render_status(&mut self, ui: &mut egui::Ui) {
        let Some(text) = self.state.get_status_text() else {
            return;
        };

        ui.vertical_centered(|ui| match self.state.status() {
            UploadStatus::Success => {
                ui.colored_label(SUCCESS, format!("✅ {}", text));
            }
            UploadStatus::Error => {
                ui.colored_label(FAILURE, format!("❌ {}", text));
                if let Some(cause) = self.state.last_error() {
                    ui.label(
                        RichText::new(cause).color(ui.visuals().text_color().gamma_multiply(0.7)),
                    );
                }
                ui.add_space(5.0);
                if ui.button("Dismiss").clicked() {
                    self.state.dismiss_error();
                }
            }
            UploadStatus::Uploading | UploadStatus::Idle => {}
        });
    }
}
