pub mod ring;
pub mod timer;

use winit::window::Window;

use self::ring::FrameHistory;
use self::timer::{SystemPhase, SystemTimers, PHASE_COUNT};

use crate::ecs::systems::TickReport;
use crate::render::GpuState;

/// Number of frame times to keep in the histogram.
const FRAME_HISTORY_LEN: usize = 300;
/// Seconds between FPS log lines.
const FPS_LOG_INTERVAL: f64 = 5.0;
/// Frame budget marked on the histogram.
const TARGET_FRAME: f64 = 1.0 / 60.0;

/// Knobs the overlay can turn. The app owns them; the overlay edits them in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Controls {
    pub paused: bool,
    pub attention_radius: f32,
    pub show_trails: bool,
}

/// Read-only numbers shown by the overlay each frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct GardenStats {
    pub flowers: usize,
    pub butterflies: usize,
    pub tick_count: u64,
    pub sim_time: f64,
    pub focus: [f32; 3],
    pub report: TickReport,
}

/// Debug overlay powered by egui.
pub struct DebugOverlay {
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,

    pub visible: bool,

    /// Rolling window of frame times (seconds).
    pub frame_times: FrameHistory,
    pub fps: f64,

    pub present_mode_index: usize,
    pub present_mode_changed: bool,

    frame_count: u64,
    log_timer: f64,
    log_frame_count: u32,
}

const PRESENT_MODES: [wgpu::PresentMode; 3] = [
    wgpu::PresentMode::Mailbox,
    wgpu::PresentMode::Fifo,
    wgpu::PresentMode::Immediate,
];

const PRESENT_MODE_LABELS: [&str; 3] = ["Mailbox", "Fifo (vsync)", "Immediate"];

impl DebugOverlay {
    pub fn new(window: &Window, gpu: &GpuState) -> Self {
        let egui_ctx = egui::Context::default();

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            Some(gpu.device.limits().max_texture_dimension_2d as usize),
        );

        let egui_renderer = egui_wgpu::Renderer::new(
            &gpu.device,
            gpu.surface_config.format,
            egui_wgpu::RendererOptions {
                depth_stencil_format: None,
                msaa_samples: 1,
                dithering: true,
                predictable_texture_filtering: false,
            },
        );

        let present_mode_index = PRESENT_MODES
            .iter()
            .position(|m| *m == gpu.surface_config.present_mode)
            .unwrap_or(1);

        Self {
            egui_ctx,
            egui_state,
            egui_renderer,
            visible: false,
            frame_times: FrameHistory::new(FRAME_HISTORY_LEN),
            fps: 0.0,
            present_mode_index,
            present_mode_changed: false,
            frame_count: 0,
            log_timer: 0.0,
            log_frame_count: 0,
        }
    }

    /// Record a frame time, update rolling stats, and periodically log.
    pub fn record_frame(&mut self, dt: f64) {
        self.frame_count += 1;
        self.frame_times.push(dt);
        if let Some(summary) = self.frame_times.summary() {
            self.fps = 1.0 / summary.avg.max(f64::EPSILON);
        }

        self.log_frame_count += 1;
        self.log_timer += dt;
        if self.log_timer >= FPS_LOG_INTERVAL {
            if let Some(summary) = self.frame_times.summary() {
                log::info!(
                    "FPS: {:.0} | avg: {:.2}ms | min: {:.2}ms | max: {:.2}ms | total frames: {}",
                    self.log_frame_count as f64 / self.log_timer,
                    summary.avg * 1000.0,
                    summary.min * 1000.0,
                    summary.max * 1000.0,
                    self.frame_count,
                );
            }
            self.log_timer = 0.0;
            self.log_frame_count = 0;
        }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    /// Forward a winit event to egui. Returns true if egui consumed it.
    pub fn on_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        let response = self.egui_state.on_window_event(window, event);
        response.consumed
    }

    /// The selected present mode.
    pub fn selected_present_mode(&self) -> wgpu::PresentMode {
        PRESENT_MODES[self.present_mode_index]
    }

    /// Run the egui frame and produce paint output.
    /// Returns (clipped_primitives, textures_delta, screen_descriptor).
    pub fn run_frame(
        &mut self,
        window: &Window,
        screen_w: u32,
        screen_h: u32,
        stats: &GardenStats,
        timers: &SystemTimers,
        controls: &mut Controls,
    ) -> (
        Vec<egui::epaint::ClippedPrimitive>,
        egui::TexturesDelta,
        egui_wgpu::ScreenDescriptor,
    ) {
        let raw_input = self.egui_state.take_egui_input(window);

        let ui_state = UiSnapshot {
            visible: self.visible,
            fps: self.fps,
            summary: self.frame_times.summary(),
            frame_times: self.frame_times.iter().collect(),
            system_durations: timers.durations_us,
            stats: *stats,
        };

        let mut present_mode_index = self.present_mode_index;

        let ctx = self.egui_ctx.clone();
        let full_output = ctx.run(raw_input, |ctx| {
            draw_ui(ctx, &ui_state, controls, &mut present_mode_index);
        });

        if present_mode_index != self.present_mode_index {
            self.present_mode_changed = true;
        }
        self.present_mode_index = present_mode_index;

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let pixels_per_point = full_output.pixels_per_point;
        let clipped_primitives = self.egui_ctx.tessellate(full_output.shapes, pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [screen_w, screen_h],
            pixels_per_point,
        };

        (clipped_primitives, full_output.textures_delta, screen_descriptor)
    }

    /// Upload egui textures and buffers. Call before draw_egui render pass.
    pub fn prepare_egui(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::epaint::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) -> Vec<wgpu::CommandBuffer> {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor)
    }

    /// Render egui into the given render pass.
    pub fn render_egui(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::epaint::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    /// Free textures after present.
    pub fn free_textures(&mut self, textures_delta: &egui::TexturesDelta) {
        for &id in &textures_delta.free {
            self.egui_renderer.free_texture(&id);
        }
    }

}

// ---------------------------------------------------------------------------
// UI snapshot + free-function draw (avoids borrow conflicts with egui_ctx)
// ---------------------------------------------------------------------------

struct UiSnapshot {
    visible: bool,
    fps: f64,
    summary: Option<ring::FrameSummary>,
    frame_times: Vec<f64>,
    system_durations: [f64; PHASE_COUNT],
    stats: GardenStats,
}

fn draw_ui(
    ctx: &egui::Context,
    s: &UiSnapshot,
    controls: &mut Controls,
    present_mode_index: &mut usize,
) {
    if !s.visible {
        return;
    }

    let panel_frame = egui::Frame::NONE
        .fill(egui::Color32::from_rgba_unmultiplied(20, 20, 20, 220))
        .corner_radius(6.0)
        .inner_margin(10.0);

    egui::Window::new("Garden")
        .default_pos([10.0, 10.0])
        .default_width(320.0)
        .resizable(true)
        .frame(panel_frame)
        .show(ctx, |ui| {
            ui.style_mut().visuals.override_text_color = Some(egui::Color32::from_gray(220));

            ui.heading("Performance");
            ui.label(format!("FPS: {:.1}", s.fps));
            if let Some(f) = s.summary {
                ui.label(format!(
                    "Frame: {:.2}ms avg | {:.2} min | {:.2} max",
                    f.avg * 1000.0,
                    f.min * 1000.0,
                    f.max * 1000.0,
                ));
            }
            ui.add_space(4.0);

            frame_histogram(ui, &s.frame_times);
            ui.add_space(4.0);

            system_timers(ui, &s.system_durations);
            ui.add_space(4.0);

            ui.heading("Garden");
            let st = &s.stats;
            ui.label(format!(
                "Flowers: {} ({} open) | Butterflies: {}",
                st.flowers, st.report.open_flowers, st.butterflies
            ));
            ui.label(format!(
                "Last tick: {} goals | {} arrived | {} stalled",
                st.report.goals_assigned, st.report.arrived, st.report.stalled
            ));
            ui.label(format!(
                "Focus: ({:.2}, {:.2}, {:.2})",
                st.focus[0], st.focus[1], st.focus[2]
            ));
            ui.label(format!("Ticks: {} | Time: {:.1}s", st.tick_count, st.sim_time));
            ui.add_space(4.0);

            ui.heading("Controls");
            ui.checkbox(&mut controls.paused, "Pause Simulation");
            ui.horizontal(|ui| {
                ui.label("Attention:");
                ui.add(
                    egui::Slider::new(&mut controls.attention_radius, 0.0..=10.0).suffix(" m"),
                );
            });
            ui.checkbox(&mut controls.show_trails, "Show Trails");
            ui.horizontal(|ui| {
                ui.label("Present:");
                egui::ComboBox::from_id_salt("present_mode")
                    .selected_text(PRESENT_MODE_LABELS[*present_mode_index])
                    .show_ui(ui, |ui| {
                        for (i, label) in PRESENT_MODE_LABELS.iter().enumerate() {
                            ui.selectable_value(present_mode_index, i, *label);
                        }
                    });
            });
            ui.add_space(4.0);

            ui.label("F12: Toggle | Space: Pause | T: Trails | ESC: Quit");
        });
}

fn frame_histogram(ui: &mut egui::Ui, frame_times: &[f64]) {
    ui.heading("Frame Time History");
    if frame_times.is_empty() {
        return;
    }
    let max_time = frame_times
        .iter()
        .copied()
        .fold(0.0f64, f64::max)
        .max(0.020);

    let (response, painter) = ui.allocate_painter(egui::vec2(300.0, 60.0), egui::Sense::hover());
    let rect = response.rect;

    let bar_width = rect.width() / frame_times.len() as f32;
    let target_y = rect.bottom() - (TARGET_FRAME / max_time) as f32 * rect.height();

    for (i, &t) in frame_times.iter().enumerate() {
        let h = (t / max_time) as f32 * rect.height();
        let x = rect.left() + i as f32 * bar_width;
        let color = if t > TARGET_FRAME {
            egui::Color32::from_rgb(255, 100, 80)
        } else {
            egui::Color32::from_rgb(80, 200, 120)
        };
        painter.rect_filled(
            egui::Rect::from_min_max(
                egui::pos2(x, rect.bottom() - h),
                egui::pos2(x + bar_width - 1.0, rect.bottom()),
            ),
            0.0,
            color,
        );
    }

    painter.line_segment(
        [
            egui::pos2(rect.left(), target_y),
            egui::pos2(rect.right(), target_y),
        ],
        egui::Stroke::new(1.0, egui::Color32::from_rgb(255, 255, 100)),
    );
}

fn system_timers(ui: &mut egui::Ui, durations: &[f64; PHASE_COUNT]) {
    ui.heading("System Timers");
    let total: f64 = durations.iter().sum::<f64>().max(1.0);
    let max_us = durations.iter().copied().fold(0.0f64, f64::max).max(1.0);

    for phase in SystemPhase::ALL {
        let us = durations[phase as usize];
        let pct = us / total * 100.0;
        let bar_frac = (us / max_us) as f32;

        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(format!("{:<12}", phase.label())).monospace());
            ui.label(egui::RichText::new(format!("{:>5.0}us ({:>2.0}%)", us, pct)).monospace());

            let (response, painter) =
                ui.allocate_painter(egui::vec2(80.0, 12.0), egui::Sense::hover());
            let r = response.rect;
            painter.rect_filled(
                egui::Rect::from_min_max(
                    r.left_top(),
                    egui::pos2(r.left() + r.width() * bar_frac, r.bottom()),
                ),
                2.0,
                egui::Color32::from_rgb(100, 180, 255),
            );
        });
    }
    ui.label(
        egui::RichText::new(format!("Total: {:.0}us ({:.2}ms)", total, total / 1000.0)).monospace(),
    );
}
