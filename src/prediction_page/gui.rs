use crate::prediction_page::core::Event;
use crate::prediction_page::main::PredictionPage;
use crate::prediction_page::render::{
    choice_at, PageView, PredictionView, ResultsView, StatusLine, HEADER, ORIGINAL_SUBHEADER,
    PREDICTION_SUBHEADER, RESULTS_SUBHEADER, SELECT_LABEL, SELECT_SUBHEADER, UPLOAD_NOTE,
    UPLOAD_SUBHEADER,
};
use eframe::egui;
use std::path::Path;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "bmp", "gif", "webp", "tiff"];

struct PageWindow {
    page: PredictionPage,
    event_sender: Sender<Event>,
    event_receiver: Receiver<Event>,
    texture: Option<(u64, egui::TextureHandle)>,
    read_error: Option<String>,
}

impl PageWindow {
    /// Applies `event` on the UI thread and runs its effects on worker threads.
    fn send(&mut self, ctx: &egui::Context, event: Event) {
        for effect in self.page.apply(event) {
            let run_effect = self.page.run_effect().clone();
            let event_sender = self.event_sender.clone();
            let ctx = ctx.clone();
            std::thread::spawn(move || {
                let event = run_effect.run_effect(effect);
                let _ = event_sender.send(event);
                ctx.request_repaint();
            });
        }
    }

    fn drain_events(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.event_receiver.try_recv() {
            self.send(ctx, event);
        }
    }

    fn upload_file(&mut self, ctx: &egui::Context, path: &Path) {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        match std::fs::read(path) {
            Ok(bytes) => {
                self.read_error = None;
                self.send(
                    ctx,
                    Event::ImageUploaded {
                        name,
                        bytes: Arc::from(bytes),
                    },
                );
            }
            Err(e) => {
                self.read_error = Some(format!("Could not read {}: {}", name, e));
            }
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context, view: &PageView) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if !view.show_upload_prompt {
            return;
        }

        // only the last file counts, like a single-file uploader
        if let Some(file) = dropped.into_iter().last() {
            match (file.bytes, file.path) {
                (Some(bytes), _) => {
                    self.read_error = None;
                    self.send(
                        ctx,
                        Event::ImageUploaded {
                            name: file.name,
                            bytes,
                        },
                    );
                }
                (None, Some(path)) => self.upload_file(ctx, &path),
                (None, None) => {}
            }
        }
    }

    fn texture_for(&mut self, ctx: &egui::Context, results: &ResultsView) -> egui::TextureHandle {
        if let Some((upload_id, texture)) = &self.texture {
            if *upload_id == results.upload_id {
                return texture.clone();
            }
        }

        let rgba = results.image.image.to_rgba8();
        let size = [rgba.width() as usize, rgba.height() as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
        let texture = ctx.load_texture(
            format!("upload-{}", results.upload_id),
            color_image,
            egui::TextureOptions::default(),
        );

        self.texture = Some((results.upload_id, texture.clone()));
        texture
    }

    fn show_model_select(&mut self, ctx: &egui::Context, ui: &mut egui::Ui, view: &PageView) {
        ui.label(egui::RichText::new(SELECT_SUBHEADER).strong().size(18.0));

        let mut picked = None;
        egui::ComboBox::from_label(SELECT_LABEL)
            .selected_text(view.options[view.selected_index])
            .width(220.0)
            .show_ui(ui, |ui| {
                for (index, option) in view.options.iter().enumerate() {
                    if ui
                        .selectable_label(index == view.selected_index, *option)
                        .clicked()
                    {
                        picked = Some(index);
                    }
                }
            });

        if let Some(index) = picked {
            self.send(ctx, Event::ModelSelected(choice_at(index)));
        }

        match &view.model_status {
            Some(StatusLine::Loading { model_file }) => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(format!("Loading model: {}", model_file));
                });
            }
            Some(StatusLine::Loaded { display_name }) => {
                ui.colored_label(
                    egui::Color32::from_rgb(40, 160, 60),
                    format!("Model {} loaded successfully!", display_name),
                );
                ui.label("Now you can use the model for predictions or further analysis:");
            }
            Some(StatusLine::Failed { message }) => {
                ui.colored_label(egui::Color32::from_rgb(200, 40, 40), message.as_str());
            }
            None => {}
        }
    }

    fn show_upload(&mut self, ctx: &egui::Context, ui: &mut egui::Ui, view: &PageView) {
        ui.add_space(12.0);
        ui.label(egui::RichText::new(UPLOAD_SUBHEADER).strong().size(18.0));
        ui.label(egui::RichText::new(UPLOAD_NOTE).italics());

        ui.horizontal(|ui| {
            if ui.button("Browse files").clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("images", &IMAGE_EXTENSIONS)
                    .pick_file()
                {
                    self.upload_file(ctx, &path);
                }
            }
            ui.label("or drop an image on the window");
        });

        if let Some(name) = &view.decoding {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(format!("Reading {}", name));
            });
        }

        let error = self.read_error.as_ref().or(view.upload_error.as_ref());
        if let Some(message) = error {
            ui.colored_label(egui::Color32::from_rgb(200, 40, 40), message.as_str());
        }
    }

    fn show_results(&mut self, ctx: &egui::Context, ui: &mut egui::Ui, results: &ResultsView) {
        let texture = self.texture_for(ctx, results);
        let width = self.page.config().image_display_width;
        let height = width * results.image.height() as f32 / results.image.width().max(1) as f32;

        ui.add_space(12.0);
        ui.label(egui::RichText::new(RESULTS_SUBHEADER).strong().size(18.0));

        ui.columns(2, |columns| {
            columns[0].label(egui::RichText::new(ORIGINAL_SUBHEADER).strong());
            columns[0].add(egui::Image::new((texture.id(), egui::vec2(width, height))));
            columns[0].label(egui::RichText::new(&results.caption).small().weak());

            let ui = &mut columns[1];
            ui.label(egui::RichText::new(PREDICTION_SUBHEADER).strong());
            match &results.prediction {
                PredictionView::WaitingForModel => {
                    ui.label("Waiting for the model to finish loading...");
                }
                PredictionView::Running => {
                    ui.spinner();
                }
                PredictionView::Label { best, others } => {
                    ui.heading(best.label.as_str());
                    ui.label(format!("{:.1}% confidence", best.confidence * 100.0));
                    for other in others {
                        ui.label(
                            egui::RichText::new(format!(
                                "{} ({:.1}%)",
                                other.label,
                                other.confidence * 100.0
                            ))
                            .weak(),
                        );
                    }
                }
                PredictionView::Failed(message) => {
                    ui.colored_label(egui::Color32::from_rgb(200, 40, 40), message.as_str());
                }
            }
        });
    }
}

impl eframe::App for PageWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events(ctx);

        let view = self.page.view();
        self.handle_dropped_files(ctx, &view);
        let view = self.page.view();

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading(HEADER);
                ui.add_space(8.0);

                self.show_model_select(ctx, ui, &view);

                if view.show_upload_prompt {
                    self.show_upload(ctx, ui, &view);
                }

                if let Some(results) = &view.results {
                    self.show_results(ctx, ui, results);
                }
            });
        });
    }
}

impl Drop for PageWindow {
    fn drop(&mut self) {
        self.page.end_session();
    }
}

pub fn run(page: PredictionPage) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([720.0, 640.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    let (event_sender, event_receiver) = channel();
    let window = PageWindow {
        page,
        event_sender,
        event_receiver,
        texture: None,
        read_error: None,
    };

    // Blocks until the window is closed
    eframe::run_native(
        "Prediction",
        options,
        Box::new(|_cc| Box::new(window)),
    )
    .map_err(|e| e.to_string())?;

    Ok(())
}
