//! Interactive chain simulation viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns a [`Simulation`] plus the
//! configuration being edited, and implements [`eframe::App`] to drive
//! ticks and draw each completed snapshot.

use eframe::App;
use glam::Vec2;
use snake_core::{Config, ConfigError, Phase, Simulation};
use std::time::Duration;
use tracing::warn;

/// Fixed tick length used by the "Step" button.
const STEP_DT: Duration = Duration::from_millis(16);

/// Main application state for the viewer.
///
/// The typical per-frame update is:
/// 1. Handle UI interactions / input.
/// 2. If `running` is `true`, tick the simulation by the frame delta,
///    clamped to [`Config::max_tick`].
/// 3. Render nodes and chain links from the fresh snapshot.
///
/// ### Fields
/// - `sim` - The running simulation.
/// - `cfg` - Configuration edited in the side panel; applied on "Apply".
///
/// - `running` - Whether the simulation advances every frame.
/// - `zoom` - Zoom factor on top of fitting the unit square to the panel.
/// - `pan` - Screen-space pan offset in pixels.
/// - `show_links` - Whether parent→target links are drawn.
///
/// - `last_dt` - Simulated time of the last tick (for display only).
/// - `config_error` - Message from the last rejected "Apply".
pub struct Viewer {
    sim: Simulation,
    cfg: Config,

    running: bool,
    zoom: f32,
    pan: egui::Vec2,
    show_links: bool,

    last_dt: Duration,
    config_error: Option<String>,
}

impl Viewer {
    /// Creates a viewer over a fresh simulation built from `cfg`.
    ///
    /// ### Returns
    /// The viewer, or the [`ConfigError`] that made `cfg` unusable.
    pub fn new(cfg: Config) -> Result<Self, ConfigError> {
        let sim = Simulation::new(cfg.clone())?;
        Ok(Self {
            sim,
            cfg,
            running: true,
            zoom: 1.0,
            pan: egui::vec2(0.0, 0.0),
            show_links: true,
            last_dt: Duration::ZERO,
            config_error: None,
        })
    }

    /// Restarts with a new random seed, keeping the current node count.
    fn reset(&mut self) {
        let seed = rand::random();
        let node_count = self.sim.config().node_count;
        if let Err(err) = self.sim.reset(seed, node_count) {
            warn!(%err, "reset rejected");
        }
        self.cfg.seed = seed;
    }

    /// Rebuilds the simulation from the edited configuration.
    fn apply_config(&mut self) {
        match Simulation::new(self.cfg.clone()) {
            Ok(sim) => {
                self.sim = sim;
                self.config_error = None;
            }
            Err(err) => {
                warn!(%err, "config rejected");
                self.config_error = Some(err.to_string());
            }
        }
    }

    /// Advances the simulation by a real frame delta.
    fn advance(&mut self, frame_dt: f32) {
        let dt = Duration::from_secs_f32(frame_dt.max(0.0)).min(self.sim.config().max_tick);
        self.sim.tick(dt);
        self.last_dt = dt;
    }

    /// Pixels per world unit for the given drawing area.
    fn scale(&self, rect: egui::Rect) -> f32 {
        rect.width().min(rect.height()) * 0.95 * self.zoom
    }

    /// Converts a unit-square position to screen-space.
    ///
    /// `(0.5, 0.5)` lands at the center of `rect` (plus `pan`); the y-axis
    /// is flipped so that positive y goes up.
    fn world_to_screen(&self, p: Vec2, rect: egui::Rect) -> egui::Pos2 {
        let center = rect.center();
        let s = self.scale(rect);
        egui::pos2(
            center.x + (p.x - 0.5) * s + self.pan.x,
            center.y - (p.y - 0.5) * s + self.pan.y,
        )
    }

    /// Converts a screen-space position back to the unit square.
    ///
    /// This is the inverse of [`Viewer::world_to_screen`] (up to floating
    /// point rounding).
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> Vec2 {
        let center = rect.center();
        let s = self.scale(rect);
        let x = (p.x - center.x - self.pan.x) / s + 0.5;
        let y = (center.y - p.y + self.pan.y) / s + 0.5;
        Vec2::new(x, y)
    }

    /// Helper to draw a labeled `f32` [`egui::DragValue`].
    fn labeled_drag_f32(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut f32,
        range: std::ops::RangeInclusive<f32>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Builds the top panel UI (run controls, stepping, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.running = !self.running;
                }

                if ui.button("Step").clicked() {
                    self.sim.tick(STEP_DT);
                    self.last_dt = STEP_DT;
                }

                if ui.button("Reset").clicked() {
                    self.reset();
                }

                ui.checkbox(&mut self.show_links, "Links");

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 0.25..=8.0).text("Zoom"));
            });
        });
    }

    /// Builds the bottom status bar (phase, chains, tick timings).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        let timings = self.sim.timings();
        let phase = match self.sim.phase() {
            Phase::Growth => "growth".to_owned(),
            Phase::Explosion { elapsed } => format!("explosion {:.1} s", elapsed.as_secs_f32()),
        };

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!(
                    "update {:.3} ms (bin {:.3} / nn {:.3} / pos {:.3})",
                    ms(timings.update),
                    ms(timings.binning),
                    ms(timings.nearest_neighbor),
                    ms(timings.position_update),
                ));
                ui.separator();
                ui.label(format!("dt = {:.1} ms", ms(self.last_dt)));
                ui.label(format!("tick = {}", self.sim.tick_count()));
                ui.separator();
                ui.label(format!("chains = {}", self.sim.store().chain_count()));
                ui.label(format!("nodes = {}", self.sim.store().len()));
                ui.label(format!("phase = {phase}"));
            });
        });
    }

    /// Builds the right-hand configuration panel.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Config");

                ui.separator();
                ui.label("Population");
                ui.horizontal(|ui| {
                    ui.label("node_count:");
                    ui.add(
                        egui::DragValue::new(&mut self.cfg.node_count)
                            .range(1..=16_000)
                            .speed(10.0),
                    );
                });
                ui.horizontal(|ui| {
                    ui.label("seed:");
                    ui.add(egui::DragValue::new(&mut self.cfg.seed));
                });

                ui.separator();
                ui.label("Growth");
                Self::labeled_drag_f32(
                    ui,
                    "cruise_speed:",
                    &mut self.cfg.cruise_speed,
                    0.001..=2.0,
                    0.005,
                );
                Self::labeled_drag_f32(
                    ui,
                    "merge_threshold:",
                    &mut self.cfg.merge_threshold,
                    0.0001..=0.1,
                    0.0001,
                );
                Self::labeled_drag_f32(
                    ui,
                    "follow_distance:",
                    &mut self.cfg.follow_distance,
                    0.0..=0.1,
                    0.0001,
                );

                ui.separator();
                ui.label("Explosion");
                Self::labeled_drag_f32(
                    ui,
                    "max_velocity:",
                    &mut self.cfg.max_explosion_velocity,
                    0.0..=5.0,
                    0.05,
                );
                let mut secs = self.cfg.explosion_duration.as_secs_f32();
                Self::labeled_drag_f32(ui, "duration (s):", &mut secs, 0.1..=60.0, 0.1);
                self.cfg.explosion_duration = Duration::from_secs_f32(secs);

                ui.separator();
                if ui.button("Apply").clicked() {
                    self.apply_config();
                }
                if ui.button("Reset cfg to default").clicked() {
                    self.cfg = Config::default();
                }
                if let Some(err) = &self.config_error {
                    ui.colored_label(egui::Color32::LIGHT_RED, err);
                }
            });
    }

    /// Builds the central panel where the chains are drawn.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            // Pan with drag.
            if response.dragged() {
                self.pan += response.drag_delta();
            }

            // Zoom around the mouse cursor.
            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let pointer_screen = response.hover_pos().unwrap_or(rect.center());
                let world_before = self.screen_to_world(pointer_screen, rect);

                let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                self.zoom = (self.zoom * factor).clamp(0.25, 8.0);

                let screen_after = self.world_to_screen(world_before, rect);
                self.pan += pointer_screen - screen_after;
            }

            // Tick before drawing so the frame shows a completed tick.
            if self.running {
                let frame_dt = ctx.input(|i| i.stable_dt);
                self.advance(frame_dt);
                ctx.request_repaint();
            }

            // Unit square outline.
            let corners = [
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, 1.0),
            ]
            .map(|c| self.world_to_screen(c, rect));
            painter.add(egui::Shape::closed_line(
                corners.to_vec(),
                egui::Stroke::new(1.0, egui::Color32::from_gray(60)),
            ));

            let store = self.sim.store();
            let positions = self.sim.snapshot();

            if self.show_links {
                let stroke = egui::Stroke::new(1.0, egui::Color32::LIGHT_GREEN);
                for (i, &p) in positions.iter().enumerate() {
                    if !store.has_parent(i) {
                        continue;
                    }
                    if let Some(t) = store.target(i) {
                        let a = self.world_to_screen(p, rect);
                        let b = self.world_to_screen(positions[t], rect);
                        painter.line_segment([a, b], stroke);
                    }
                }
            }

            let color = match self.sim.phase() {
                Phase::Growth => egui::Color32::WHITE,
                Phase::Explosion { .. } => egui::Color32::LIGHT_RED,
            };
            for &p in positions {
                painter.circle_filled(self.world_to_screen(p, rect), 1.5, color);
            }
        });
    }
}

fn ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_rect() -> egui::Rect {
        egui::Rect::from_min_size(egui::Pos2::new(0.0, 0.0), egui::vec2(800.0, 600.0))
    }

    fn small_viewer() -> Viewer {
        Viewer::new(Config {
            node_count: 50,
            ..Config::default()
        })
        .expect("valid config")
    }

    #[test]
    fn world_to_screen_and_back_is_roundtrip() {
        let mut viewer = small_viewer();
        // Use non-trivial zoom and pan to exercise the math.
        viewer.zoom = 2.0;
        viewer.pan = egui::vec2(15.0, -7.0);
        let rect = test_rect();

        let world_points = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.25),
            Vec2::new(-0.35, 0.825),
        ];

        let eps = 1e-5;

        for p in world_points {
            let screen = viewer.world_to_screen(p, rect);
            let back = viewer.screen_to_world(screen, rect);

            assert!(
                (back.x - p.x).abs() < eps && (back.y - p.y).abs() < eps,
                "roundtrip mismatch: p={:?}, back={:?}",
                p,
                back
            );
        }
    }

    #[test]
    fn unit_square_center_maps_to_panel_center() {
        let viewer = small_viewer();
        let rect = test_rect();
        assert_eq!(
            viewer.world_to_screen(Vec2::splat(0.5), rect),
            rect.center()
        );
    }

    #[test]
    fn new_rejects_invalid_config() {
        let cfg = Config {
            node_count: 0,
            ..Config::default()
        };
        assert!(Viewer::new(cfg).is_err());
    }

    #[test]
    fn advance_clamps_long_frames() {
        let mut viewer = small_viewer();

        viewer.advance(3.0);

        assert_eq!(viewer.last_dt, viewer.sim.config().max_tick);
        assert_eq!(viewer.sim.tick_count(), 1);
    }

    #[test]
    fn reset_keeps_node_count_and_regrows() {
        let mut viewer = small_viewer();
        for _ in 0..5 {
            viewer.advance(0.016);
        }

        viewer.reset();

        assert_eq!(viewer.sim.store().len(), 50);
        assert_eq!(viewer.sim.tick_count(), 0);
        assert_eq!(viewer.sim.phase(), Phase::Growth);
        assert_eq!(viewer.cfg.seed, viewer.sim.config().seed);
    }

    #[test]
    fn apply_config_reports_rejections() {
        let mut viewer = small_viewer();

        viewer.cfg.merge_threshold = 0.0;
        viewer.apply_config();
        assert!(viewer.config_error.is_some());
        assert_eq!(viewer.sim.store().len(), 50);

        viewer.cfg = Config {
            node_count: 20,
            ..Config::default()
        };
        viewer.apply_config();
        assert!(viewer.config_error.is_none());
        assert_eq!(viewer.sim.store().len(), 20);
    }
}
