use crate::draw::capture::Anchor;
use crate::draw::input::{RawPointerEvent, SurfaceOrigin};
use crate::draw::model::{Color, Tool, MAX_STROKE_WIDTH, MIN_STROKE_WIDTH};
use crate::error::SubmitRejected;
use crate::session::{ResultId, SessionController};
use eframe::egui::{
    self, Color32, ColorImage, Id, PointerButton, Pos2, Rect, Sense, TextureHandle,
    TextureOptions,
};
use std::time::{Duration, Instant};

const ERROR_MESSAGE: &str = "Something went wrong, try again";
const IN_FLIGHT_REPAINT: Duration = Duration::from_millis(50);

/// Desktop front end. Renders what the session exposes and forwards input;
/// all state lives in the `SessionController`.
pub struct MathCanvasApp {
    controller: SessionController,
    texture: Option<TextureHandle>,
    uploaded_revision: Option<u64>,
    canvas_origin: Pos2,
}

impl MathCanvasApp {
    pub fn new(controller: SessionController) -> Self {
        Self {
            controller,
            texture: None,
            uploaded_revision: None,
            canvas_origin: Pos2::ZERO,
        }
    }

    fn toolbar(&mut self, ui: &mut egui::Ui, now: Instant) {
        ui.horizontal_wrapped(|ui| {
            if ui.button("Reset").clicked() {
                self.controller.request_reset();
            }

            let tool = self.controller.tools().active_tool();
            if ui.selectable_label(tool == Tool::Pencil, "Pencil").clicked() {
                self.controller.select_tool(Tool::Pencil);
            }
            if ui.selectable_label(tool == Tool::Eraser, "Eraser").clicked() {
                self.controller.select_tool(Tool::Eraser);
            }

            if self.controller.layout_mode().is_mobile() {
                ui.menu_button("Brush", |ui| {
                    self.color_picker(ui);
                    self.width_slider(ui);
                });
            } else {
                self.width_slider(ui);
                self.color_picker(ui);
            }

            let solve = ui.add_enabled(
                self.controller.submit_enabled(),
                egui::Button::new("Solve"),
            );
            if solve.clicked() {
                match self.controller.submit(now) {
                    Ok(()) | Err(SubmitRejected::EmptyCanvas) => {}
                    Err(err) => tracing::debug!("solve ignored: {err}"),
                }
            }
        });
    }

    fn width_slider(&mut self, ui: &mut egui::Ui) {
        let mut width = self.controller.tools().active_width().get();
        let slider = egui::Slider::new(&mut width, MIN_STROKE_WIDTH..=MAX_STROKE_WIDTH).text("Size");
        if ui.add(slider).changed() {
            self.controller.set_active_width(width);
        }
    }

    fn color_picker(&mut self, ui: &mut egui::Ui) {
        let color = self.controller.tools().color();
        let mut rgba = Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a);
        if ui.color_edit_button_srgba(&mut rgba).changed() {
            let [r, g, b, a] = rgba.to_srgba_unmultiplied();
            self.controller.select_color(Color::rgba(r, g, b, a));
        }
    }

    fn canvas(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let rect = ui.available_rect_before_wrap();
        let screen = ctx.screen_rect();
        self.canvas_origin = rect.min;
        self.controller.resize_viewport(
            screen.width(),
            screen.height(),
            SurfaceOrigin {
                left: rect.left(),
                top: rect.top(),
            },
        );
        self.upload_surface(ctx);

        let (response, painter) = ui.allocate_painter(rect.size(), Sense::drag());
        painter.rect_filled(response.rect, 0.0, Color32::WHITE);
        if let Some(texture) = &self.texture {
            painter.image(
                texture.id(),
                response.rect,
                Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                Color32::WHITE,
            );
        }

        if !self.forward_touches(ctx, response.rect) {
            self.forward_mouse(&response);
        }
    }

    fn upload_surface(&mut self, ctx: &egui::Context) {
        let revision = self.controller.surface().revision();
        if self.uploaded_revision == Some(revision) {
            return;
        }
        if let Some(buffer) = self.controller.surface().buffer() {
            let image = ColorImage::from_rgba_unmultiplied(
                [buffer.width as usize, buffer.height as usize],
                &buffer.pixels,
            );
            if let Some(texture) = self.texture.as_mut() {
                texture.set(image, TextureOptions::NEAREST);
            } else {
                self.texture = Some(ctx.load_texture("ink", image, TextureOptions::NEAREST));
            }
        }
        self.uploaded_revision = Some(revision);
    }

    /// Returns `true` when this frame carried touch events.
    fn forward_touches(&mut self, ctx: &egui::Context, canvas: Rect) -> bool {
        let touches: Vec<(egui::TouchPhase, Pos2)> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Touch { phase, pos, .. } => Some((*phase, *pos)),
                    _ => None,
                })
                .collect()
        });
        for (phase, pos) in &touches {
            let raw = RawPointerEvent::touch(pos.x, pos.y);
            match phase {
                egui::TouchPhase::Start if canvas.contains(*pos) => {
                    self.controller.pointer_down(&raw)
                }
                egui::TouchPhase::Start => {}
                egui::TouchPhase::Move => self.controller.pointer_move(&raw),
                egui::TouchPhase::End | egui::TouchPhase::Cancel => self.controller.pointer_up(),
            }
        }
        !touches.is_empty()
    }

    fn forward_mouse(&mut self, response: &egui::Response) {
        let origin = response.rect.min;
        let local = |pos: Pos2| RawPointerEvent::mouse(pos.x - origin.x, pos.y - origin.y);

        if response.drag_started_by(PointerButton::Primary) {
            if let Some(pos) = response.interact_pointer_pos() {
                self.controller.pointer_down(&local(pos));
            }
        } else if response.dragged_by(PointerButton::Primary) {
            if let Some(pos) = response.interact_pointer_pos() {
                self.controller.pointer_move(&local(pos));
            }
        } else if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.controller.pointer_down(&local(pos));
                self.controller.pointer_up();
            }
        }
        if response.drag_stopped() {
            self.controller.pointer_up();
        }
    }

    fn results(&mut self, ctx: &egui::Context) {
        let origin = self.canvas_origin;
        let mut moved: Vec<(ResultId, Anchor)> = Vec::new();
        for result in self.controller.placed_results() {
            let shown = egui::Area::new(Id::new(("result", result.id.raw())))
                .default_pos(origin + egui::vec2(result.position.x, result.position.y))
                .movable(true)
                .order(egui::Order::Foreground)
                .show(ctx, |ui| {
                    ui.label(
                        egui::RichText::new(&result.renderable_expression)
                            .size(24.0)
                            .color(Color32::BLACK),
                    );
                });
            if shown.response.drag_stopped() {
                let offset = shown.response.rect.min - origin;
                moved.push((
                    result.id,
                    Anchor {
                        x: offset.x,
                        y: offset.y,
                    },
                ));
            }
        }
        for (id, position) in moved {
            self.controller.reposition(id, position);
        }
    }

    fn error_banner(&mut self, ctx: &egui::Context) {
        if !self.controller.error_visible() {
            return;
        }
        egui::Area::new(Id::new("error_banner"))
            .anchor(egui::Align2::CENTER_TOP, egui::vec2(0.0, 16.0))
            .order(egui::Order::Tooltip)
            .show(ctx, |ui| {
                egui::Frame::none()
                    .fill(Color32::from_rgb(239, 68, 68))
                    .rounding(6.0)
                    .inner_margin(egui::Margin::symmetric(16.0, 10.0))
                    .show(ui, |ui| {
                        ui.label(egui::RichText::new(ERROR_MESSAGE).color(Color32::WHITE));
                    });
            });
    }
}

impl eframe::App for MathCanvasApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.controller.tick(now);

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| self.toolbar(ui, now));
        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| self.canvas(ui, ctx));
        self.results(ctx);
        self.error_banner(ctx);

        if !self.controller.submit_enabled() || self.controller.reset_in_progress() {
            ctx.request_repaint_after(IN_FLIGHT_REPAINT);
        }
        if let Some(deadline) = self.controller.next_wakeup() {
            ctx.request_repaint_after(deadline.saturating_duration_since(now));
        }
    }
}
