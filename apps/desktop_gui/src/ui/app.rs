use std::time::Duration;

use client_core::{DisplayField, ImagePanel, ImageSource, LookupController, RenderedView};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::UiEvent,
    orchestration::dispatch_backend_command,
    reducer::{ImageState, LookupScreen},
};
use crate::media::{placeholder_image, PreviewImage};

const IMAGE_MAX_WIDTH: f32 = 240.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImageKey {
    Remote(u64),
    Placeholder,
}

struct ImageTexture {
    key: ImageKey,
    handle: egui::TextureHandle,
}

pub struct LookupApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    screen: LookupScreen,
    texture: Option<ImageTexture>,
}

impl LookupApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        controller: LookupController,
    ) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            screen: LookupScreen::new(controller),
            texture: None,
        }
    }

    fn dispatch(&mut self, cmd: BackendCommand) {
        if let Err(err) = dispatch_backend_command(&self.cmd_tx, cmd.clone()) {
            self.screen.dispatch_failed(cmd, &err);
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            if let Some(cmd) = self.screen.apply(event) {
                self.dispatch(cmd);
            }
        }
    }

    fn submit(&mut self) {
        match self.screen.submit() {
            Ok(cmd) => self.dispatch(cmd),
            Err(err) => tracing::debug!("submission ignored: {err}"),
        }
    }

    fn render_form(&mut self, ui: &mut egui::Ui) {
        ui.add_space(8.0);
        ui.heading("Product Lookup");
        ui.add_space(4.0);
        ui.horizontal(|ui| {
            ui.label("Product ID");
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.screen.product_id_input)
                    .hint_text("Enter product ID")
                    .desired_width(260.0),
            );
            let entered =
                response.lost_focus() && ui.input(|input| input.key_pressed(egui::Key::Enter));
            let can_submit = self.screen.can_submit();
            let clicked = ui
                .add_enabled(can_submit, egui::Button::new("Get Product"))
                .clicked();
            if can_submit && (clicked || entered) {
                self.submit();
            }
        });
        ui.add_space(8.0);
    }

    fn render_results(&mut self, ui: &mut egui::Ui, view: &RenderedView) {
        if view.loading_visible {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading product details...");
            });
        }

        if let Some(message) = &view.error_banner {
            egui::Frame::group(ui.style())
                .stroke(egui::Stroke::new(1.0, ui.visuals().error_fg_color))
                .show(ui, |ui| {
                    ui.colored_label(ui.visuals().error_fg_color, message.as_str());
                });
        }

        if view.product_fields.is_some() {
            ui.horizontal_top(|ui| {
                if let Some(panel) = &view.image {
                    self.render_image(ui, panel);
                    ui.add_space(12.0);
                }
                egui::Grid::new("product_fields")
                    .num_columns(2)
                    .striped(true)
                    .spacing([16.0, 6.0])
                    .show(ui, |ui| {
                        for field in DisplayField::ALL {
                            if let Some(text) = view.field(field) {
                                ui.strong(field.label());
                                ui.label(text);
                                ui.end_row();
                            }
                        }
                    });
            });
        }
    }

    fn render_image(&mut self, ui: &mut egui::Ui, panel: &ImagePanel) {
        let key = match &panel.source {
            ImageSource::Placeholder => ImageKey::Placeholder,
            ImageSource::Remote(_) => match &self.screen.image {
                ImageState::Ready { seq, .. } => ImageKey::Remote(*seq),
                _ => {
                    ui.spinner();
                    return;
                }
            },
        };
        if let Some(texture) = self.texture_for(ui.ctx(), key) {
            ui.add(egui::Image::new(&texture).max_width(IMAGE_MAX_WIDTH))
                .on_hover_text(panel.alt.as_str());
        }
    }

    fn texture_for(&mut self, ctx: &egui::Context, key: ImageKey) -> Option<egui::TextureHandle> {
        if let Some(texture) = &self.texture {
            if texture.key == key {
                return Some(texture.handle.clone());
            }
        }

        let color_image = match key {
            ImageKey::Placeholder => color_image(&placeholder_image()),
            ImageKey::Remote(seq) => match &self.screen.image {
                ImageState::Ready { seq: ready, image } if *ready == seq => color_image(image),
                _ => return None,
            },
        };
        let handle = ctx.load_texture(
            format!("product-image:{key:?}"),
            color_image,
            egui::TextureOptions::LINEAR,
        );
        self.texture = Some(ImageTexture {
            key,
            handle: handle.clone(),
        });
        Some(handle)
    }
}

fn color_image(preview: &PreviewImage) -> egui::ColorImage {
    egui::ColorImage::from_rgba_unmultiplied([preview.width, preview.height], &preview.rgba)
}

impl eframe::App for LookupApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::TopBottomPanel::top("lookup_form").show(ctx, |ui| self.render_form(ui));

        if let Some(status) = self.screen.status.clone() {
            egui::TopBottomPanel::bottom("status_line").show(ctx, |ui| {
                ui.small(status);
            });
        }

        let view = self.screen.controller.render();
        egui::CentralPanel::default().show(ctx, |ui| self.render_results(ui, &view));

        if self.screen.has_work_in_flight() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
